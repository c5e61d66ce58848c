use std::sync::LazyLock;

use regex::Regex;
use url::Url;

use crate::resolver::error::ResolveError;
use crate::resolver::types::ProviderKind;

static URL_IN_TEXT: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r#"https?://[^\s"'<>，。（）()]+"#).unwrap());

/// Path and query of a share link. Hash-routed links such as
/// `https://music.163.com/#/playlist?id=1` are read from their fragment.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LinkParts {
    /// The URL as found in the input text.
    pub url: String,
    pub host: String,
    pub path: String,
    pub query: Vec<(String, String)>,
}

impl LinkParts {
    pub fn parse(provider: ProviderKind, text: &str) -> Result<Self, ResolveError> {
        let raw = extract_url(text)
            .ok_or_else(|| ResolveError::malformed(provider, "no http(s) URL in link"))?;
        let url = Url::parse(raw)
            .map_err(|e| ResolveError::malformed(provider, format!("{raw}: {e}")))?;

        let host = url.host_str().unwrap_or_default().to_string();
        let mut path = url.path().to_string();
        let mut query: Vec<(String, String)> = url.query_pairs().into_owned().collect();

        if let Some(fragment) = url.fragment().filter(|f| f.starts_with('/')) {
            if let Ok(routed) = url.join(fragment) {
                path = routed.path().to_string();
                query.extend(routed.query_pairs().into_owned());
            }
        }

        Ok(Self {
            url: raw.to_string(),
            host,
            path,
            query,
        })
    }

    pub fn param(&self, name: &str) -> Option<&str> {
        self.query
            .iter()
            .find(|(key, value)| key == name && !value.is_empty())
            .map(|(_, value)| value.as_str())
    }

    /// The path segment that follows `marker`, e.g. `123` in `/n/ryqq/playlist/123`.
    pub fn segment_after(&self, marker: &str) -> Option<&str> {
        let mut segments = self.path.split('/').filter(|s| !s.is_empty());
        segments.find(|s| *s == marker)?;
        segments.next()
    }
}

/// First `http(s)://` token in a share text.
pub fn extract_url(text: &str) -> Option<&str> {
    URL_IN_TEXT.find(text).map(|m| m.as_str())
}

pub fn numeric_id(provider: ProviderKind, value: &str) -> Result<u64, ResolveError> {
    value
        .parse()
        .map_err(|_| ResolveError::malformed(provider, format!("playlist id `{value}` is not numeric")))
}
