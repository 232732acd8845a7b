//! Application state: start-up sequence, section navigation and the links view.
//! Start-up runs strictly in order: structured data update, redirect lookup,
//! navigation check, then the default section. A redirect short-circuits
//! everything after it.

use anyhow::Result;
use serde_json::Value;

use crate::config::{Config, ConfigError, NavigationItem};
use crate::filter::{FilterState, filter_links, highlight, icon_for};
use crate::redirect::{find_redirect, redirect_message};
use crate::schema::update_schema_data;
use crate::submit::ContactForm;

pub const SECTIONS: [&str; 5] = [
    "linksSection",
    "portfolioSection",
    "experienceSection",
    "projectsSection",
    "contactSection",
];

pub const DEFAULT_SECTION: &str = "linksSection";

#[derive(Debug)]
pub enum Startup {
    Redirect { url: String, message: String },
    Ready(App),
}

/// A link as it should be displayed under the current filter.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct LinkView {
    pub display: String,
    pub url: String,
    pub icon: Option<String>,
}

/// Navigation button state.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct NavView<'a> {
    pub item: &'a NavigationItem,
    pub icon: &'a str,
    pub active: bool,
}

#[derive(Debug)]
pub struct App {
    config: Config,
    filter: FilterState,
    active_section: String,
    contact: ContactForm,
}

impl App {
    /// Runs start-up for a request path against an already loaded config.
    /// `schema` is the page's JSON-LD document, if it has one.
    pub fn start(config: Config, path: &str, schema: Option<&mut Value>) -> Result<Startup> {
        if let Some(schema) = schema {
            update_schema_data(schema, &config.links)?;
        }

        if let Some(link) = find_redirect(path, &config.links) {
            tracing::info!(path, url = %link.url, "redirecting");
            return Ok(Startup::Redirect {
                url: link.url.clone(),
                message: redirect_message(link),
            });
        }

        if let Some(item) = config
            .navigation
            .iter()
            .find(|item| !SECTIONS.contains(&item.id.as_str()))
        {
            return Err(ConfigError::UnknownSection(item.id.clone()).into());
        }

        Ok(Startup::Ready(App {
            config,
            filter: FilterState::default(),
            active_section: DEFAULT_SECTION.to_string(),
            contact: ContactForm::default(),
        }))
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    pub fn filter(&self) -> &FilterState {
        &self.filter
    }

    pub fn filter_mut(&mut self) -> &mut FilterState {
        &mut self.filter
    }

    pub fn contact(&self) -> &ContactForm {
        &self.contact
    }

    pub fn active_section(&self) -> &str {
        &self.active_section
    }

    /// Switches the visible section. Unknown ids leave the current one active.
    pub fn show_section(&mut self, id: &str) -> bool {
        if !SECTIONS.contains(&id) {
            tracing::warn!(section = id, "unknown section");
            return false;
        }
        self.active_section = id.to_string();
        true
    }

    pub fn navigation(&self) -> Vec<NavView<'_>> {
        self.config
            .navigation
            .iter()
            .map(|item| {
                let active = item.id == self.active_section;
                NavView {
                    item,
                    icon: if active { item.active_icon.as_str() } else { item.icon.as_str() },
                    active,
                }
            })
            .collect()
    }

    /// Filtered links with matches wrapped in `marker`.
    pub fn visible_links(&self, marker: (&str, &str)) -> Vec<LinkView> {
        filter_links(&self.config.links, &self.filter)
            .into_iter()
            .map(|link| LinkView {
                display: highlight(&link.platform, self.filter.search_query(), marker),
                icon: icon_for(&link.platform, &self.config.icon_map).map(str::to_string),
                url: link.url,
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::tests::sample_config;
    use crate::filter::HTML_HIGHLIGHT;
    use pretty_assertions::assert_eq;
    use serde_json::json;

    fn ready(path: &str) -> App {
        match App::start(sample_config(), path, None).unwrap() {
            Startup::Ready(app) => app,
            Startup::Redirect { url, .. } => panic!("unexpected redirect to {url}"),
        }
    }

    #[test]
    fn test_redirect_path_skips_rendering() {
        match App::start(sample_config(), "/github", None).unwrap() {
            Startup::Redirect { url, message } => {
                assert_eq!(url, "https://github.com/someone");
                assert_eq!(message, "Redirecting to github.com...");
            }
            Startup::Ready(_) => panic!("expected a redirect"),
        }
    }

    #[test]
    fn test_structured_data_updated_before_redirect() {
        let mut schema = json!({ "@type": "Person", "sameAs": [] });
        let startup = App::start(sample_config(), "/github", Some(&mut schema)).unwrap();
        assert!(matches!(startup, Startup::Redirect { .. }));
        assert_eq!(schema["sameAs"].as_array().unwrap().len(), 4);
        assert_eq!(schema["sameAs"][0], "https://github.com/someone");
    }

    #[test]
    fn test_invalid_structured_data_stops_start_up() {
        let mut schema = json!("not an object");
        let err = App::start(sample_config(), "/github", Some(&mut schema)).unwrap_err();
        assert_eq!(err.to_string(), "Structured data must be a JSON object");
    }

    #[test]
    fn test_redirect_precedes_navigation_check() {
        let mut config = sample_config();
        config.navigation[0].id = "blogSection".to_string();
        assert!(matches!(
            App::start(config, "/github", None).unwrap(),
            Startup::Redirect { .. }
        ));
    }

    #[test]
    fn test_root_path_starts_on_links() {
        let app = ready("/");
        assert_eq!(app.active_section(), DEFAULT_SECTION);
        assert_eq!(app.visible_links(HTML_HIGHLIGHT).len(), 4);
    }

    #[test]
    fn test_unknown_navigation_target_is_fatal() {
        let mut config = sample_config();
        config.navigation[0].id = "blogSection".to_string();
        let err = App::start(config, "/", None).unwrap_err();
        assert_eq!(
            err.to_string(),
            "Navigation item 'blogSection' has no matching content section"
        );
    }

    #[test]
    fn test_show_section_swaps_icons() {
        let mut app = ready("/");
        let icons: Vec<_> = app.navigation().iter().map(|n| n.icon).collect();
        assert_eq!(icons, vec!["bi-link-45deg", "bi-envelope"]);

        assert!(app.show_section("contactSection"));
        let nav = app.navigation();
        assert!(!nav[0].active);
        assert_eq!(nav[0].icon, "bi-link");
        assert!(nav[1].active);
        assert_eq!(nav[1].icon, "bi-envelope-fill");
    }

    #[test]
    fn test_show_unknown_section_is_ignored() {
        let mut app = ready("/");
        assert!(!app.show_section("nowhere"));
        assert_eq!(app.active_section(), DEFAULT_SECTION);
    }

    #[test]
    fn test_visible_links_highlight_and_icons() {
        let mut app = ready("/");
        app.filter_mut().set_search_query("git");
        assert_eq!(
            app.visible_links(("[", "]")),
            vec![LinkView {
                display: "[Git]Hub".to_string(),
                url: "https://github.com/someone".to_string(),
                icon: Some("bi-github".to_string()),
            }]
        );
    }
}
