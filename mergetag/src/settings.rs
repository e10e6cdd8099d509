//! Configuration for mergetag's handlers.

use std::path::Path;

use eyre::{Result, WrapErr};
use log::debug;
use serde::{Deserialize, Serialize};
use serde_json::Value as JsonValue;

use crate::fs::maybe_canonicalize;
use crate::overlay::VariableMap;
use crate::Value;

/// Values injected alongside a sample profile when rendering a test email.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct TestFields {
    pub campaign: String,
    pub variant: String,
    pub unsubscribe_url: String,
}

impl Default for TestFields {
    fn default() -> Self {
        Self {
            campaign: "test_campaign".to_string(),
            variant: "test_variant".to_string(),
            unsubscribe_url: "https://www.topview.ai".to_string(),
        }
    }
}

impl TestFields {
    /// Adds the synthetic fields to `vars`, replacing any existing entries
    /// with the same names.
    pub fn apply(&self, vars: &mut VariableMap) {
        vars.insert("campaign".to_string(), Value::from(self.campaign.as_str()));
        vars.insert("variant".to_string(), Value::from(self.variant.as_str()));
        vars.insert(
            "unsubscribe_url".to_string(),
            Value::from(self.unsubscribe_url.as_str()),
        );
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    /// Columns an import preview must produce.
    pub required_columns: Vec<String>,
    /// Lowercase file extensions accepted for image uploads.
    pub image_extensions: Vec<String>,
    pub test_fields: TestFields,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            required_columns: ["name", "email", "country", "region", "city"]
                .iter()
                .map(ToString::to_string)
                .collect(),
            image_extensions: ["jpg", "jpeg", "png", "webp", "gif"]
                .iter()
                .map(ToString::to_string)
                .collect(),
            test_fields: TestFields::default(),
        }
    }
}

impl Settings {
    /// Loads settings from a JSON, YAML or TOML file. A file that does not
    /// exist yields the defaults.
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        match maybe_canonicalize(path)? {
            Some(path) => {
                let value = Value::load_from_file(&path)?;
                let settings = serde_json::from_value(JsonValue::from(value))
                    .wrap_err_with(|| format!("invalid settings in {}", path.display()))?;
                debug!("Loaded settings from {}", path.display());
                Ok(settings)
            }
            None => {
                debug!(
                    "No such settings file, using defaults: {}",
                    path.display()
                );
                Ok(Self::default())
            }
        }
    }

    /// Required columns that `columns` lacks, in configuration order.
    pub fn missing_columns(&self, columns: &[String]) -> Vec<String> {
        self.required_columns
            .iter()
            .filter(|required| !columns.contains(required))
            .cloned()
            .collect()
    }

    /// Whether the file name ends in one of the accepted image extensions,
    /// ignoring case.
    pub fn is_allowed_image(&self, file_name: &str) -> bool {
        match file_name.rsplit_once('.') {
            Some((_, ext)) => {
                let ext = ext.to_lowercase();
                self.image_extensions.iter().any(|allowed| *allowed == ext)
            }
            None => false,
        }
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn image_extensions() {
        let settings = Settings::default();
        assert!(settings.is_allowed_image("banner.PNG"));
        assert!(settings.is_allowed_image("photo.final.jpeg"));
        assert!(!settings.is_allowed_image("notes.txt"));
        assert!(!settings.is_allowed_image("png"));
        assert!(!settings.is_allowed_image(""));
    }

    #[test]
    fn missing_columns_in_order() {
        let settings = Settings::default();
        let columns = vec!["email".to_string(), "name".to_string(), "zip".to_string()];
        assert_eq!(
            settings.missing_columns(&columns),
            vec!["country", "region", "city"]
        );
    }

    #[test]
    fn partial_settings_keep_defaults() {
        let settings: Settings = serde_json::from_value(serde_json::json!({
            "test_fields": { "campaign": "spring" }
        }))
        .unwrap();
        assert_eq!(settings.test_fields.campaign, "spring");
        assert_eq!(settings.test_fields.variant, "test_variant");
        assert_eq!(settings.required_columns.len(), 5);
    }

    #[test]
    fn missing_file_yields_defaults() {
        let settings = Settings::load("does/not/exist/mergetag.yml").unwrap();
        assert_eq!(settings, Settings::default());
    }

    #[test]
    fn test_fields_overwrite() {
        let mut vars = VariableMap::new();
        vars.insert("campaign".to_string(), Value::from("real"));
        vars.insert("first_name".to_string(), Value::from("Ada"));
        TestFields::default().apply(&mut vars);
        assert_eq!(vars.get("campaign"), Some(&Value::from("test_campaign")));
        assert_eq!(vars.get("first_name"), Some(&Value::from("Ada")));
        assert_eq!(vars.len(), 4);
    }
}
