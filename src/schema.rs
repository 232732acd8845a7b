//! JSON-LD structured data kept in sync with the configured links.
//! The update is the first start-up step, ahead of the redirect check.

use anyhow::{Context, Result, bail};
use serde_json::Value;
use std::path::Path;

use crate::filter::LinkEntry;

/// Replaces `sameAs` with the link URLs, leaving every other key alone.
pub fn update_schema_data(schema: &mut Value, links: &[LinkEntry]) -> Result<()> {
    let Some(object) = schema.as_object_mut() else {
        bail!("Structured data must be a JSON object");
    };
    let urls = links.iter().map(|link| Value::String(link.url.clone())).collect();
    object.insert("sameAs".to_string(), Value::Array(urls));
    Ok(())
}

pub async fn read_schema(path: &Path) -> Result<Value> {
    let text = tokio::fs::read_to_string(path)
        .await
        .with_context(|| format!("Failed to read structured data: {}", path.display()))?;
    serde_json::from_str(&text)
        .with_context(|| format!("Failed to parse structured data: {}", path.display()))
}

/// Rewrites a JSON-LD file in place.
pub async fn write_schema(path: &Path, schema: &Value) -> Result<()> {
    let pretty = serde_json::to_string_pretty(schema)?;
    tokio::fs::write(path, pretty)
        .await
        .with_context(|| format!("Failed to write structured data: {}", path.display()))?;
    tracing::info!(path = %path.display(), "structured data updated");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::tests::sample_config;
    use pretty_assertions::assert_eq;
    use serde_json::json;

    #[test]
    fn test_same_as_replaced() {
        let links = sample_config().links;
        let mut schema = json!({
            "@context": "https://schema.org",
            "@type": "Person",
            "name": "Someone",
            "sameAs": ["https://old.example"]
        });
        update_schema_data(&mut schema, &links[..2]).unwrap();
        assert_eq!(
            schema,
            json!({
                "@context": "https://schema.org",
                "@type": "Person",
                "name": "Someone",
                "sameAs": ["https://github.com/someone", "https://stackoverflow.com/users/1"]
            })
        );
    }

    #[test]
    fn test_non_object_rejected() {
        let mut schema = json!([1, 2]);
        assert!(update_schema_data(&mut schema, &[]).is_err());
    }

    #[tokio::test]
    async fn test_file_rewritten_in_place() {
        let links = sample_config().links;
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("person.jsonld");
        std::fs::write(&path, r#"{"@type": "Person"}"#).unwrap();

        let mut schema = read_schema(&path).await.unwrap();
        update_schema_data(&mut schema, &links).unwrap();
        write_schema(&path, &schema).await.unwrap();

        let written: Value = serde_json::from_str(&std::fs::read_to_string(&path).unwrap()).unwrap();
        assert_eq!(written["@type"], "Person");
        assert_eq!(written["sameAs"].as_array().unwrap().len(), 4);
    }

    #[tokio::test]
    async fn test_unparsable_file_reports_path() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("person.jsonld");
        std::fs::write(&path, "<script>").unwrap();

        let err = read_schema(&path).await.unwrap_err();
        assert!(err.to_string().starts_with("Failed to parse structured data"));
    }
}
