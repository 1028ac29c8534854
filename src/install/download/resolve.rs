//! Release track resolution
//!
//! Maps a version request onto exactly one catalog record. Whenever several
//! records qualify the first one in catalog order wins; no semantic-version
//! sort happens, so the catalog must already be newest-first.

use std::fmt;

use log::debug;

use super::github::ReleaseRecord;
use crate::error::{Result, SetupError};

/// Abstract version request
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum VersionRequest {
    Latest,
    /// Current LTS line (`stable` or `lts`)
    Stable,
    Preview,
    Explicit(String),
}

impl VersionRequest {
    /// Interpret raw user input. Keywords are case-insensitive, an empty
    /// string means `stable`, anything else is an explicit version.
    pub fn parse(raw: &str) -> Self {
        let trimmed = raw.trim();
        match trimmed.to_ascii_lowercase().as_str() {
            "" | "stable" | "lts" => VersionRequest::Stable,
            "latest" => VersionRequest::Latest,
            "preview" => VersionRequest::Preview,
            _ => VersionRequest::Explicit(trimmed.to_string()),
        }
    }
}

impl fmt::Display for VersionRequest {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            VersionRequest::Latest => f.write_str("latest"),
            VersionRequest::Stable => f.write_str("stable"),
            VersionRequest::Preview => f.write_str("preview"),
            VersionRequest::Explicit(v) => f.write_str(v),
        }
    }
}

/// Strip the leading `v` from a release tag
pub fn normalize_version(tag: &str) -> &str {
    tag.strip_prefix(['v', 'V']).unwrap_or(tag)
}

/// Select the release a request refers to
pub fn resolve<'a>(
    request: &VersionRequest,
    releases: &'a [ReleaseRecord],
    lts_prefix: &str,
) -> Result<&'a ReleaseRecord> {
    let found = match request {
        VersionRequest::Latest => releases.iter().find(|r| !r.is_prerelease),
        VersionRequest::Stable => releases
            .iter()
            .find(|r| !r.is_prerelease && r.tag.starts_with(lts_prefix)),
        VersionRequest::Preview => releases.iter().find(|r| r.is_prerelease),
        VersionRequest::Explicit(raw) => {
            let prefixed = format!("v{}", normalize_version(raw));
            return releases
                .iter()
                .find(|r| r.tag == prefixed)
                .or_else(|| releases.iter().find(|r| r.tag == *raw))
                .inspect(|r| debug!("Explicit version {} matched tag {}", raw, r.tag))
                .ok_or_else(|| SetupError::ReleaseNotFound(raw.clone()));
        }
    };

    found
        .inspect(|r| debug!("Track {} resolved to {}", request, r.tag))
        .ok_or_else(|| SetupError::NoReleaseFound {
            track: request.to_string(),
        })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn release(tag: &str, prerelease: bool) -> ReleaseRecord {
        ReleaseRecord {
            tag: tag.to_string(),
            is_prerelease: prerelease,
            assets: Vec::new(),
        }
    }

    /// Newest first, as the API returns it
    fn catalog() -> Vec<ReleaseRecord> {
        vec![
            release("v7.6.0-preview.2", true),
            release("v7.5.1", false),
            release("v7.4.7", false),
            release("v7.6.0-preview.1", true),
            release("v7.5.0", false),
            release("v7.4.6", false),
            release("v7.2.24", false),
        ]
    }

    #[test]
    fn parse_keywords() {
        assert_eq!(VersionRequest::parse("LATEST"), VersionRequest::Latest);
        assert_eq!(VersionRequest::parse("stable"), VersionRequest::Stable);
        assert_eq!(VersionRequest::parse("Lts"), VersionRequest::Stable);
        assert_eq!(VersionRequest::parse(""), VersionRequest::Stable);
        assert_eq!(VersionRequest::parse("preview"), VersionRequest::Preview);
        assert_eq!(
            VersionRequest::parse(" 7.4.6 "),
            VersionRequest::Explicit("7.4.6".to_string())
        );
    }

    #[test]
    fn latest_is_first_non_prerelease() {
        let releases = catalog();
        let r = resolve(&VersionRequest::Latest, &releases, "v7.4.").unwrap();
        assert_eq!(r.tag, "v7.5.1");
    }

    #[test]
    fn stable_is_first_matching_lts_prefix() {
        let releases = catalog();
        let r = resolve(&VersionRequest::Stable, &releases, "v7.4.").unwrap();
        assert_eq!(r.tag, "v7.4.7");
        let r = resolve(&VersionRequest::Stable, &releases, "v7.2.").unwrap();
        assert_eq!(r.tag, "v7.2.24");
    }

    #[test]
    fn preview_is_first_prerelease() {
        let releases = catalog();
        let r = resolve(&VersionRequest::Preview, &releases, "v7.4.").unwrap();
        assert_eq!(r.tag, "v7.6.0-preview.2");
    }

    #[test]
    fn catalog_order_wins_over_version_order() {
        // Deliberately out of semver order
        let releases = vec![release("v7.4.1", false), release("v7.4.9", false)];
        let r = resolve(&VersionRequest::Stable, &releases, "v7.4.").unwrap();
        assert_eq!(r.tag, "v7.4.1");
    }

    #[test]
    fn explicit_with_and_without_prefix() {
        let releases = catalog();
        let a = resolve(
            &VersionRequest::Explicit("7.4.6".to_string()),
            &releases,
            "v7.4.",
        )
        .unwrap();
        let b = resolve(
            &VersionRequest::Explicit("v7.4.6".to_string()),
            &releases,
            "v7.4.",
        )
        .unwrap();
        assert_eq!(a, b);
        assert_eq!(a.tag, "v7.4.6");
    }

    #[test]
    fn explicit_falls_back_to_raw_tag() {
        let releases = vec![release("7.0.0-custom", false)];
        let r = resolve(
            &VersionRequest::Explicit("7.0.0-custom".to_string()),
            &releases,
            "v7.4.",
        )
        .unwrap();
        assert_eq!(r.tag, "7.0.0-custom");
    }

    #[test]
    fn explicit_missing_is_release_not_found() {
        let releases = catalog();
        let err = resolve(
            &VersionRequest::Explicit("9.9.9".to_string()),
            &releases,
            "v7.4.",
        )
        .unwrap_err();
        assert!(matches!(err, SetupError::ReleaseNotFound(ref v) if v == "9.9.9"));
    }

    #[test]
    fn empty_tracks_are_no_release_found() {
        let only_previews = vec![release("v7.6.0-preview.1", true)];
        for request in [VersionRequest::Latest, VersionRequest::Stable] {
            let err = resolve(&request, &only_previews, "v7.4.").unwrap_err();
            assert!(matches!(err, SetupError::NoReleaseFound { .. }));
        }

        let no_previews = vec![release("v7.4.6", false)];
        let err = resolve(&VersionRequest::Preview, &no_previews, "v7.4.").unwrap_err();
        assert!(matches!(err, SetupError::NoReleaseFound { ref track } if track == "preview"));
    }

    #[test]
    fn normalize_strips_single_prefix() {
        assert_eq!(normalize_version("v7.4.6"), "7.4.6");
        assert_eq!(normalize_version("7.4.6"), "7.4.6");
        assert_eq!(normalize_version("v7.5.0-preview.1"), "7.5.0-preview.1");
    }
}
