/* This Source Code Form is subject to the terms of the Mozilla Public
 * License, v. 2.0. If a copy of the MPL was not distributed with this
 * file, You can obtain one at https://mozilla.org/MPL/2.0/. */

//! Navigation targets that depend on page context at dispatch time.

use serde::Deserialize;
use url::Url;

use crate::shell::host::PageDom;

/// `<meta>` tag the console renders with the signed-in session's context.
pub const SESSION_DATA_SELECTOR: &str = "meta[name='awsc-session-data']";
const REGION_PLACEHOLDER: &str = "{region}";

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum NavigationError {
    EmptyTarget,
    InvalidCurrentUrl { url: String, reason: String },
    SessionDataMissing,
    SessionDataInvalid { reason: String },
    SessionRegionMissing,
}

impl std::fmt::Display for NavigationError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::EmptyTarget => write!(f, "navigation target is empty"),
            Self::InvalidCurrentUrl { url, reason } => {
                write!(f, "current page url `{url}` is unusable: {reason}")
            }
            Self::SessionDataMissing => write!(f, "AWS session data not found"),
            Self::SessionDataInvalid { reason } => {
                write!(f, "AWS session data is not valid JSON: {reason}")
            }
            Self::SessionRegionMissing => write!(f, "current region not found in session data"),
        }
    }
}

impl std::error::Error for NavigationError {}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct SessionData {
    #[serde(default)]
    infrastructure_region: Option<String>,
}

/// Reject empty and `#` placeholder targets.
pub fn ensure_navigable(target: String) -> Result<String, NavigationError> {
    let trimmed = target.trim();
    if trimmed.is_empty() || trimmed == "#" {
        return Err(NavigationError::EmptyTarget);
    }
    Ok(target)
}

/// Region of the signed-in session, read from the console's session meta tag.
pub fn session_region<D: PageDom>(dom: &D) -> Result<String, NavigationError> {
    let meta = dom
        .query_first(SESSION_DATA_SELECTOR)
        .ok_or(NavigationError::SessionDataMissing)?;
    let content = dom
        .attribute(&meta, "content")
        .filter(|content| !content.trim().is_empty())
        .ok_or(NavigationError::SessionDataMissing)?;
    let data: SessionData =
        serde_json::from_str(&content).map_err(|err| NavigationError::SessionDataInvalid {
            reason: err.to_string(),
        })?;

    data.infrastructure_region
        .filter(|region| !region.is_empty())
        .ok_or(NavigationError::SessionRegionMissing)
}

/// Substitute the session region for every `{region}` in `template`.
pub fn session_region_href<D: PageDom>(dom: &D, template: &str) -> Result<String, NavigationError> {
    let region = session_region(dom)?;
    Ok(template.replace(REGION_PLACEHOLDER, &region))
}

/// `path` resolved against the origin of `current_url`.
pub fn origin_href(current_url: &str, path: &str) -> Result<String, NavigationError> {
    let url = Url::parse(current_url).map_err(|err| NavigationError::InvalidCurrentUrl {
        url: current_url.to_string(),
        reason: err.to_string(),
    })?;
    let origin = url.origin();
    if !origin.is_tuple() {
        return Err(NavigationError::InvalidCurrentUrl {
            url: current_url.to_string(),
            reason: "opaque origin".to_string(),
        });
    }
    Ok(format!("{}{path}", origin.ascii_serialization()))
}
