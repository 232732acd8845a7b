//! Config module.
//! Loads the site configuration from a directory of JSON documents
//! (telegram.json, links.json, portfolio.json, experience.json, projects.json,
//! navigation.json, ui.json), validates the assembled bundle and deserializes it.
//! Validation runs on the raw JSON so that missing keys and wrong shapes are
//! reported by name before serde sees them.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use thiserror::Error;
use url::Url;

use crate::filter::LinkEntry;

const REQUIRED_PROPERTIES: [&str; 8] = [
    "telegram",
    "links",
    "portfolio",
    "experience",
    "projects",
    "navigation",
    "iconMap",
    "categoryNames",
];

const ARRAY_PROPERTIES: [&str; 5] = ["links", "portfolio", "experience", "projects", "navigation"];

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read {}: {source}", .path.display())]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to parse {}: {source}", .path.display())]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    #[error("Missing required configuration property: {0}")]
    MissingProperty(&'static str),

    #[error("Invalid telegram configuration")]
    InvalidTelegram,

    #[error("Configuration property {0} must be an array")]
    NotAnArray(&'static str),

    #[error("Invalid link at index {index}: missing platform, url, or category")]
    InvalidLink { index: usize },

    #[error("Invalid URL at index {index}: {url}")]
    InvalidUrl { index: usize, url: String },

    #[error("Invalid navigation item at index {index}: missing required properties")]
    InvalidNavigation { index: usize },

    #[error("Navigation item '{0}' has no matching content section")]
    UnknownSection(String),

    #[error("Configuration does not match the expected shape: {0}")]
    Shape(#[source] serde_json::Error),
}

/// Bot credentials for the contact form.
#[derive(Clone, Debug, Default, Deserialize, Serialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct TelegramConfig {
    #[serde(default, deserialize_with = "null_as_default")]
    pub bot_token: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub chat_id: ChatId,
}

// An unset credential may be written as null; it is still only a warning.
fn null_as_default<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: serde::Deserializer<'de>,
    T: Default + Deserialize<'de>,
{
    Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}

/// Telegram accepts either a numeric chat id or an `@channel` username.
#[derive(Clone, Debug, Deserialize, Serialize, PartialEq, Eq)]
#[serde(untagged)]
pub enum ChatId {
    Id(i64),
    Name(String),
}

impl Default for ChatId {
    fn default() -> Self {
        ChatId::Name(String::new())
    }
}

impl ChatId {
    pub fn is_empty(&self) -> bool {
        matches!(self, ChatId::Name(name) if name.is_empty())
    }
}

#[derive(Clone, Debug, Deserialize, Serialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct NavigationItem {
    pub id: String,
    pub name: String,
    pub icon: String,
    pub active_icon: String,
}

// Section entries are not validated: absent or null fields load as empty.
#[derive(Clone, Debug, Default, Deserialize, Serialize, PartialEq)]
#[serde(default, rename_all = "camelCase")]
pub struct PortfolioItem {
    #[serde(deserialize_with = "null_as_default")]
    pub title: String,
    #[serde(deserialize_with = "null_as_default")]
    pub description: String,
    #[serde(deserialize_with = "null_as_default")]
    pub image: String,
    #[serde(deserialize_with = "null_as_default")]
    pub live_url: String,
    #[serde(deserialize_with = "null_as_default")]
    pub details_url: String,
}

#[derive(Clone, Debug, Default, Deserialize, Serialize, PartialEq)]
#[serde(default)]
pub struct Experience {
    #[serde(deserialize_with = "null_as_default")]
    pub date: String,
    #[serde(deserialize_with = "null_as_default")]
    pub title: String,
    #[serde(deserialize_with = "null_as_default")]
    pub company: String,
    #[serde(deserialize_with = "null_as_default")]
    pub icon: String,
    #[serde(deserialize_with = "null_as_default")]
    pub duties: Vec<String>,
}

#[derive(Clone, Debug, Default, Deserialize, Serialize, PartialEq)]
#[serde(default)]
pub struct ProjectTag {
    #[serde(deserialize_with = "null_as_default")]
    pub name: String,
    #[serde(deserialize_with = "null_as_default")]
    pub icon: String,
}

#[derive(Clone, Debug, Default, Deserialize, Serialize, PartialEq)]
#[serde(default, rename_all = "camelCase")]
pub struct Project {
    #[serde(deserialize_with = "null_as_default")]
    pub title: String,
    #[serde(deserialize_with = "null_as_default")]
    pub description: String,
    #[serde(deserialize_with = "null_as_default")]
    pub tags: Vec<ProjectTag>,
    #[serde(deserialize_with = "null_as_default")]
    pub source_url: String,
    #[serde(deserialize_with = "null_as_default")]
    pub live_url: String,
}

/// The validated configuration bundle. Read-only after load.
#[derive(Clone, Debug, Deserialize, Serialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Config {
    pub telegram: TelegramConfig,
    pub links: Vec<LinkEntry>,
    pub portfolio: Vec<PortfolioItem>,
    pub experience: Vec<Experience>,
    pub projects: Vec<Project>,
    pub navigation: Vec<NavigationItem>,
    pub icon_map: HashMap<String, String>,
    pub category_names: HashMap<String, String>,
}

impl Config {
    /// Validates a raw bundle and converts it into the typed form.
    pub fn from_bundle(bundle: Value) -> Result<Self, ConfigError> {
        validate_config(&bundle)?;
        serde_json::from_value(bundle).map_err(ConfigError::Shape)
    }
}

/// Loads every configuration document under `dir` concurrently, assembles the
/// bundle and validates it.
pub async fn load_config(dir: &Path) -> Result<Config, ConfigError> {
    let result = load_bundle(dir).await.and_then(Config::from_bundle);
    if let Err(e) = &result {
        tracing::error!(dir = %dir.display(), error = %e, "Error loading configuration");
    }
    result
}

async fn load_bundle(dir: &Path) -> Result<Value, ConfigError> {
    let (telegram, links, portfolio, experience, projects, navigation, ui) = tokio::try_join!(
        read_json(dir.join("telegram.json")),
        read_json(dir.join("links.json")),
        read_json(dir.join("portfolio.json")),
        read_json(dir.join("experience.json")),
        read_json(dir.join("projects.json")),
        read_json(dir.join("navigation.json")),
        read_json(dir.join("ui.json")),
    )?;

    let mut bundle = Map::new();
    bundle.insert("telegram".into(), telegram);
    bundle.insert("links".into(), links);
    bundle.insert("portfolio".into(), portfolio);
    bundle.insert("experience".into(), experience);
    bundle.insert("projects".into(), projects);
    bundle.insert("navigation".into(), navigation);
    // Only lift what ui.json actually has, so a missing map is reported as missing.
    for key in ["iconMap", "categoryNames"] {
        if let Some(value) = ui.get(key) {
            bundle.insert(key.into(), value.clone());
        }
    }

    Ok(Value::Object(bundle))
}

async fn read_json(path: PathBuf) -> Result<Value, ConfigError> {
    let text = match tokio::fs::read_to_string(&path).await {
        Ok(text) => text,
        Err(source) => return Err(ConfigError::Read { path, source }),
    };
    serde_json::from_str(&text).map_err(|source| ConfigError::Parse { path, source })
}

/// Checks the shape of a configuration bundle.
///
/// Empty bot credentials only produce a warning: the site still loads and the
/// contact form reports the problem when it is used.
pub fn validate_config(config: &Value) -> Result<(), ConfigError> {
    for prop in REQUIRED_PROPERTIES {
        if config.get(prop).is_none() {
            return Err(ConfigError::MissingProperty(prop));
        }
    }

    let telegram = config
        .get("telegram")
        .and_then(Value::as_object)
        .ok_or(ConfigError::InvalidTelegram)?;

    if !is_truthy(telegram.get("botToken")) || !is_truthy(telegram.get("chatId")) {
        tracing::warn!(
            "Telegram bot token or chat ID not configured. Contact form may not work properly."
        );
    }

    for prop in ARRAY_PROPERTIES {
        if !config[prop].is_array() {
            return Err(ConfigError::NotAnArray(prop));
        }
    }

    for (index, link) in entries(config, "links").enumerate() {
        if !["platform", "url", "category"]
            .iter()
            .all(|key| is_truthy(link.get(key)))
        {
            return Err(ConfigError::InvalidLink { index });
        }

        let url = match &link["url"] {
            Value::String(url) => url.clone(),
            other => other.to_string(),
        };
        if Url::parse(&url).is_err() || !link["url"].is_string() {
            return Err(ConfigError::InvalidUrl { index, url });
        }
    }

    for (index, item) in entries(config, "navigation").enumerate() {
        if !["id", "name", "icon", "activeIcon"]
            .iter()
            .all(|key| is_truthy(item.get(key)))
        {
            return Err(ConfigError::InvalidNavigation { index });
        }
    }

    Ok(())
}

fn entries<'a>(config: &'a Value, prop: &str) -> impl Iterator<Item = &'a Value> {
    config[prop].as_array().into_iter().flatten()
}

/// JSON truthiness as the config files are authored: absent, null, false, 0 and
/// "" all count as "not provided".
fn is_truthy(value: Option<&Value>) -> bool {
    match value {
        None | Some(Value::Null) => false,
        Some(Value::Bool(b)) => *b,
        Some(Value::Number(n)) => n.as_f64().is_some_and(|n| n != 0.0),
        Some(Value::String(s)) => !s.is_empty(),
        Some(Value::Array(_)) | Some(Value::Object(_)) => true,
    }
}
