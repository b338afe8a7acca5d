use std::fmt;

use url::{Url, form_urlencoded};

/// Query parameters that carry tracking noise rather than content identity.
/// Stripping them keeps two shares of the same video on one cache key.
const TRACKING_PARAMS: &[&str] = &[
    "fbclid", "gclid", "msclkid", "mc_eid", "igshid", "si", "ref", "ref_src", "feature",
];

const ALLOWED_SCHEMES: &[&str] = &["http", "https"];

/// Normalized form of a submitted URL, used as the cache and dedup key.
///
/// Two submissions canonicalizing to the same value are considered requests
/// for the same transcript.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct CanonicalUrl(String);

impl CanonicalUrl {
    pub fn parse(raw: &str) -> Result<Self, UrlError> {
        let url = Url::parse(raw.trim()).map_err(|e| UrlError::Malformed(e.to_string()))?;

        if !ALLOWED_SCHEMES.contains(&url.scheme()) {
            return Err(UrlError::UnsupportedScheme(url.scheme().to_string()));
        }

        let host = url
            .host_str()
            .ok_or(UrlError::MissingHost)?
            .to_ascii_lowercase();

        let mut canonical = format!("{}://{}", url.scheme(), host);
        // `Url::port` is already None when the port is the scheme default.
        if let Some(port) = url.port() {
            canonical.push_str(&format!(":{}", port));
        }

        let path = url.path();
        if path.len() > 1 && path.ends_with('/') {
            canonical.push_str(path.trim_end_matches('/'));
        } else {
            canonical.push_str(path);
        }

        let mut pairs: Vec<(String, String)> = url
            .query_pairs()
            .filter(|(k, _)| !is_tracking_param(k))
            .map(|(k, v)| (k.into_owned(), v.into_owned()))
            .collect();
        pairs.sort();

        if !pairs.is_empty() {
            // Re-encode after sorting: `query_pairs` decoded the components,
            // and joining them raw would let an encoded `&` or `=` inside a
            // value collide with a genuinely separate pair.
            let mut query = form_urlencoded::Serializer::new(String::new());
            for (k, v) in &pairs {
                query.append_pair(k, v);
            }
            canonical.push('?');
            canonical.push_str(&query.finish());
        }

        // Fragments never reach the origin server and are dropped.
        Ok(Self(canonical))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

fn is_tracking_param(key: &str) -> bool {
    key.starts_with("utm_") || TRACKING_PARAMS.contains(&key)
}

impl fmt::Display for CanonicalUrl {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

#[derive(Debug, thiserror::Error)]
pub enum UrlError {
    #[error("malformed url: {0}")]
    Malformed(String),
    #[error("unsupported scheme: {0}")]
    UnsupportedScheme(String),
    #[error("url has no host")]
    MissingHost,
}
