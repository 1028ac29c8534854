//! GitHub release catalog client

use std::time::Duration;

use log::{debug, info};
use reqwest::header::{ACCEPT, AUTHORIZATION, HeaderMap, HeaderValue};
use serde::{Deserialize, Serialize};

use crate::error::{Result, SetupError};

const CATALOG_CONNECT_TIMEOUT: Duration = Duration::from_secs(30);

/// Published release as returned by the releases API
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
pub struct ReleaseRecord {
    #[serde(rename = "tag_name")]
    pub tag: String,
    #[serde(rename = "prerelease", default)]
    pub is_prerelease: bool,
    #[serde(default)]
    pub assets: Vec<AssetRecord>,
}

/// Release asset metadata
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
pub struct AssetRecord {
    pub name: String,
    #[serde(rename = "browser_download_url")]
    pub download_url: String,
    #[serde(rename = "size", default)]
    pub size_bytes: u64,
}

/// Fetch all releases, newest first (the API's natural order).
///
/// The token is optional: anonymous requests work but hit a much lower rate
/// limit. Failures are not retried here.
pub async fn fetch_releases(
    catalog_url: &str,
    user_agent: &str,
    token: Option<&str>,
) -> Result<Vec<ReleaseRecord>> {
    let fetch_err = |source: reqwest::Error| SetupError::CatalogFetch {
        url: catalog_url.to_string(),
        source,
    };

    let mut headers = HeaderMap::new();
    headers.insert(
        ACCEPT,
        HeaderValue::from_static("application/vnd.github+json"),
    );
    if let Some(token) = token.filter(|t| !t.is_empty()) {
        // A token that is not a valid header value is dropped rather than sent mangled
        match HeaderValue::from_str(&format!("Bearer {token}")) {
            Ok(mut value) => {
                value.set_sensitive(true);
                headers.insert(AUTHORIZATION, value);
            }
            Err(_) => log::warn!("Ignoring auth token with invalid characters"),
        }
    } else {
        debug!("No auth token supplied, using anonymous catalog access");
    }

    let client = reqwest::Client::builder()
        .user_agent(user_agent)
        .default_headers(headers)
        .connect_timeout(CATALOG_CONNECT_TIMEOUT)
        .build()
        .map_err(fetch_err)?;

    info!("Fetching release catalog from {}", catalog_url);
    let releases: Vec<ReleaseRecord> = client
        .get(catalog_url)
        .send()
        .await
        .and_then(|r| r.error_for_status())
        .map_err(fetch_err)?
        .json()
        .await
        .map_err(fetch_err)?;

    debug!("Catalog returned {} releases", releases.len());
    Ok(releases)
}
