//! Filter engine for the links section.
//! Pure functions over the loaded links plus an explicit `FilterState`; the
//! caller owns the state and re-runs `filter_links` whenever it changes.

use regex::{Captures, RegexBuilder};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// Category value that disables category filtering.
pub const ALL_CATEGORIES: &str = "all";

/// HTML marker used by the site for matched substrings.
pub const HTML_HIGHLIGHT: (&str, &str) = ("<span class=\"search-highlight\">", "</span>");

#[derive(Clone, Debug, Deserialize, Serialize, PartialEq, Eq)]
pub struct LinkEntry {
    pub platform: String,
    pub url: String,
    pub category: String,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct FilterState {
    search_query: String,
    active_category: String,
}

impl Default for FilterState {
    fn default() -> Self {
        Self {
            search_query: String::new(),
            active_category: ALL_CATEGORIES.to_string(),
        }
    }
}

impl FilterState {
    pub fn new(search_query: &str, active_category: &str) -> Self {
        Self {
            search_query: search_query.trim().to_string(),
            active_category: active_category.to_string(),
        }
    }

    pub fn search_query(&self) -> &str {
        &self.search_query
    }

    pub fn active_category(&self) -> &str {
        &self.active_category
    }

    pub fn set_search_query(&mut self, query: &str) {
        self.search_query = query.trim().to_string();
    }

    pub fn clear_search(&mut self) {
        self.search_query.clear();
    }

    pub fn set_category(&mut self, category: &str) {
        self.active_category = category.to_string();
    }

    fn matches(&self, link: &LinkEntry) -> bool {
        let matches_category =
            self.active_category == ALL_CATEGORIES || link.category == self.active_category;
        let matches_search = self.search_query.is_empty()
            || link
                .platform
                .to_lowercase()
                .contains(&self.search_query.to_lowercase());
        matches_category && matches_search
    }
}

/// Returns the links visible under `state`, in their original order.
pub fn filter_links(links: &[LinkEntry], state: &FilterState) -> Vec<LinkEntry> {
    links
        .iter()
        .filter(|link| state.matches(link))
        .cloned()
        .collect()
}

/// Wraps every case-insensitive occurrence of `query` in `text` with the
/// `open`/`close` markers. The query is matched literally.
pub fn highlight(text: &str, query: &str, (open, close): (&str, &str)) -> String {
    if query.is_empty() {
        return text.to_string();
    }

    let pattern = match RegexBuilder::new(&regex::escape(query))
        .case_insensitive(true)
        .build()
    {
        Ok(pattern) => pattern,
        Err(e) => {
            tracing::debug!(query, error = %e, "highlight pattern rejected");
            return text.to_string();
        }
    };

    pattern
        .replace_all(text, |caps: &Captures| format!("{open}{}{close}", &caps[0]))
        .into_owned()
}

/// "all" followed by each distinct link category in first-seen order.
pub fn categories(links: &[LinkEntry]) -> Vec<String> {
    let mut categories = vec![ALL_CATEGORIES.to_string()];
    for link in links {
        if !categories.contains(&link.category) {
            categories.push(link.category.clone());
        }
    }
    categories
}

/// Button label for a category.
pub fn category_label<'a>(category: &'a str, names: &'a HashMap<String, String>) -> &'a str {
    if category == ALL_CATEGORIES {
        return "All";
    }
    names.get(category).map(String::as_str).unwrap_or(category)
}

/// Lowercases and strips everything outside `[a-z0-9]`.
pub fn platform_key(name: &str) -> String {
    name.to_lowercase()
        .chars()
        .filter(|c| c.is_ascii_lowercase() || c.is_ascii_digit())
        .collect()
}

pub fn icon_for<'a>(platform: &str, icon_map: &'a HashMap<String, String>) -> Option<&'a str> {
    icon_map
        .get(&platform_key(platform))
        .or_else(|| icon_map.get("default"))
        .map(String::as_str)
}
