/* This Source Code Form is subject to the terms of the Mozilla Public
 * License, v. 2.0. If a copy of the MPL was not distributed with this
 * file, You can obtain one at https://mozilla.org/MPL/2.0/. */

//! Region detection and region-rewrite of console URLs.
//!
//! The console encodes the active region in up to three places: the first
//! host label (`us-east-1.console.aws.amazon.com`), a `region` query
//! parameter, and a `region=` token inside the fragment used by the
//! single-page consoles. Switching region rewrites all of them consistently
//! and leaves everything else byte-for-byte intact.

use url::{Host, Url};

pub const REGION_QUERY_PARAM: &str = "region";
const REGION_FRAGMENT_TOKEN: &str = "region=";

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RegionRewriteError {
    InvalidRegion { region: String },
    InvalidUrl { url: String, reason: String },
    MissingHost { url: String },
    UnsupportedHost { host: String },
    InvalidHost { host: String, reason: String },
}

impl std::fmt::Display for RegionRewriteError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::InvalidRegion { region } => write!(f, "`{region}` is not a usable region code"),
            Self::InvalidUrl { url, reason } => write!(f, "cannot parse `{url}`: {reason}"),
            Self::MissingHost { url } => write!(f, "`{url}` has no host to rewrite"),
            Self::UnsupportedHost { host } => {
                write!(f, "host `{host}` is an address, not a console domain")
            }
            Self::InvalidHost { host, reason } => {
                write!(f, "rewritten host `{host}` was rejected: {reason}")
            }
        }
    }
}

impl std::error::Error for RegionRewriteError {}

/// Whether `label` looks like a region code: `us-east-1`, `us-gov-west-1`,
/// `ap-southeast-5`.
pub fn is_region_code(label: &str) -> bool {
    let parts: Vec<&str> = label.split('-').collect();
    let [first, middle @ .., last] = parts.as_slice() else {
        return false;
    };
    !middle.is_empty()
        && first.len() == 2
        && first.chars().all(|c| c.is_ascii_lowercase())
        && middle
            .iter()
            .all(|part| !part.is_empty() && part.chars().all(|c| c.is_ascii_lowercase()))
        && !last.is_empty()
        && last.chars().all(|c| c.is_ascii_digit())
}

fn is_region_value_char(c: char) -> bool {
    c.is_ascii_alphanumeric() || c == '-'
}

/// The region a console URL currently points at, if it names one.
///
/// The host label wins over the query parameter, which wins over a fragment
/// token.
pub fn current_region(url: &str) -> Option<String> {
    let parsed = Url::parse(url).ok()?;

    if let Some(Host::Domain(domain)) = parsed.host()
        && let Some((first_label, _)) = domain.split_once('.')
        && is_region_code(first_label)
    {
        return Some(first_label.to_string());
    }

    if let Some((_, value)) = parsed
        .query_pairs()
        .find(|(name, value)| name == REGION_QUERY_PARAM && !value.is_empty())
    {
        return Some(value.into_owned());
    }

    let fragment = parsed.fragment()?;
    fragment_region_values(fragment)
        .into_iter()
        .find(|value| !value.is_empty())
        .map(str::to_string)
}

/// Point `current_url` at `region`.
///
/// * host: a leading region label is replaced, otherwise the region is
///   prepended as a new first label;
/// * query: an existing `region` parameter gets the new value, other
///   parameters are untouched and no parameter is added;
/// * fragment: the value after every `region=` token is replaced.
pub fn rewrite_region_url(current_url: &str, region: &str) -> Result<Url, RegionRewriteError> {
    if region.is_empty() || !region.chars().all(is_region_value_char) {
        return Err(RegionRewriteError::InvalidRegion {
            region: region.to_string(),
        });
    }

    let mut url = Url::parse(current_url).map_err(|err| RegionRewriteError::InvalidUrl {
        url: current_url.to_string(),
        reason: err.to_string(),
    })?;

    let domain = match url.host() {
        Some(Host::Domain(domain)) => domain.to_string(),
        Some(other) => {
            return Err(RegionRewriteError::UnsupportedHost {
                host: other.to_string(),
            });
        }
        None => {
            return Err(RegionRewriteError::MissingHost {
                url: current_url.to_string(),
            });
        }
    };

    let new_host = rewrite_host(&domain, region);
    url.set_host(Some(&new_host))
        .map_err(|err| RegionRewriteError::InvalidHost {
            host: new_host.clone(),
            reason: err.to_string(),
        })?;

    if let Some(query) = url.query().map(str::to_owned) {
        url.set_query(Some(&rewrite_query(&query, region)));
    }

    if let Some(fragment) = url.fragment().map(str::to_owned)
        && fragment.contains(REGION_FRAGMENT_TOKEN)
    {
        url.set_fragment(Some(&rewrite_fragment(&fragment, region)));
    }

    Ok(url)
}

fn rewrite_host(domain: &str, region: &str) -> String {
    match domain.split_once('.') {
        Some((first_label, rest)) if is_region_code(first_label) => format!("{region}.{rest}"),
        _ => format!("{region}.{domain}"),
    }
}

fn rewrite_query(query: &str, region: &str) -> String {
    query
        .split('&')
        .map(|pair| {
            let name = pair.split_once('=').map_or(pair, |(name, _)| name);
            if name == REGION_QUERY_PARAM {
                format!("{REGION_QUERY_PARAM}={region}")
            } else {
                pair.to_string()
            }
        })
        .collect::<Vec<_>>()
        .join("&")
}

/// Start offsets (just past `region=`) of every token that is not the tail
/// of a longer word such as `subregion=`.
fn fragment_token_offsets(fragment: &str) -> Vec<usize> {
    fragment
        .match_indices(REGION_FRAGMENT_TOKEN)
        .filter(|(index, _)| {
            fragment[..*index]
                .chars()
                .next_back()
                .is_none_or(|c| !(c.is_ascii_alphanumeric() || c == '_'))
        })
        .map(|(index, token)| index + token.len())
        .collect()
}

fn fragment_region_values(fragment: &str) -> Vec<&str> {
    fragment_token_offsets(fragment)
        .into_iter()
        .map(|start| {
            let tail = &fragment[start..];
            let len = tail.find(|c: char| !is_region_value_char(c)).unwrap_or(tail.len());
            &tail[..len]
        })
        .collect()
}

fn rewrite_fragment(fragment: &str, region: &str) -> String {
    let mut rewritten = String::with_capacity(fragment.len() + region.len());
    let mut copied_up_to = 0;

    for start in fragment_token_offsets(fragment) {
        let tail = &fragment[start..];
        let value_len = tail.find(|c: char| !is_region_value_char(c)).unwrap_or(tail.len());
        rewritten.push_str(&fragment[copied_up_to..start]);
        rewritten.push_str(region);
        copied_up_to = start + value_len;
    }

    rewritten.push_str(&fragment[copied_up_to..]);
    rewritten
}
