//! Short-link redirects: `/github` forwards to the configured GitHub link.

use std::time::Duration;
use url::Url;

use crate::filter::{LinkEntry, platform_key};

/// Pause between announcing a redirect and performing it.
pub const REDIRECT_DELAY: Duration = Duration::from_millis(100);

/// Finds the link whose normalized platform equals the normalized last path
/// segment. First match in config order wins.
pub fn find_redirect<'a>(path: &str, links: &'a [LinkEntry]) -> Option<&'a LinkEntry> {
    let segment = path.split('/').filter(|s| !s.is_empty()).last()?;
    let key = platform_key(segment);
    if key.is_empty() {
        return None;
    }
    links.iter().find(|link| platform_key(&link.platform) == key)
}

pub fn redirect_message(link: &LinkEntry) -> String {
    let host = Url::parse(&link.url)
        .ok()
        .and_then(|url| url.host_str().map(str::to_string))
        .unwrap_or_else(|| link.url.clone());
    format!("Redirecting to {}...", host)
}
