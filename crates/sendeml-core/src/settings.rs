//! Batch settings loaded from a JSON file.
//!
//! The document is checked key by key against the expected shape before any
//! typed value is built, so one pass reports every problem at once.

use std::path::Path;

use serde::Serialize;
use serde_json::{Map, Value};

/// Settings for one batch: where to connect, the envelope, and the files to send.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Settings {
    /// SMTP server host name or address.
    pub smtp_host: String,
    /// SMTP server port.
    pub smtp_port: u16,
    /// Envelope sender.
    pub from_address: String,
    /// Envelope recipients, in order.
    pub to_addresses: Vec<String>,
    /// Message files to send, in order.
    pub eml_files: Vec<String>,
    /// Replace the `Date:` header before sending.
    pub update_date: bool,
    /// Replace the `Message-ID:` header before sending.
    pub update_message_id: bool,
    /// Send each file over its own connection.
    pub use_parallel: bool,
}

/// A single problem found while validating a settings document.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum Violation {
    /// A required key is absent.
    #[error("{key}: Key does not exist")]
    MissingKey {
        /// JSON key.
        key: &'static str,
    },

    /// A key holds a value of the wrong JSON type.
    #[error("{key}: Invalid type: {value}")]
    InvalidType {
        /// JSON key.
        key: &'static str,
        /// Offending value as JSON text.
        value: String,
    },

    /// A key that must hold an array holds something else.
    #[error("{key}: Invalid type (array): {value}")]
    NotArray {
        /// JSON key.
        key: &'static str,
        /// Offending value as JSON text.
        value: String,
    },

    /// An array element is not a string.
    #[error("{key}: Invalid type (element): {value}")]
    InvalidElement {
        /// JSON key of the array.
        key: &'static str,
        /// Offending element as JSON text.
        value: String,
    },

    /// The port is an integer outside 1-65535.
    #[error("{key}: Invalid port: {value}")]
    PortOutOfRange {
        /// JSON key.
        key: &'static str,
        /// Offending value as JSON text.
        value: String,
    },
}

impl Violation {
    /// Returns the JSON key this violation refers to.
    #[must_use]
    pub const fn key(&self) -> &'static str {
        match self {
            Self::MissingKey { key }
            | Self::InvalidType { key, .. }
            | Self::NotArray { key, .. }
            | Self::InvalidElement { key, .. }
            | Self::PortOutOfRange { key, .. } => key,
        }
    }
}

/// Errors raised while loading settings.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// The settings file does not exist.
    #[error("Json file does not exist")]
    NotFound,

    /// The settings file could not be read.
    #[error("{0}")]
    Io(#[from] std::io::Error),

    /// The settings file is not valid JSON.
    #[error("{0}")]
    Json(#[from] serde_json::Error),

    /// The document is not a JSON object.
    #[error("Invalid type (root): {0}")]
    NotObject(String),

    /// The document has the wrong shape.
    #[error("{}", join_violations(.0))]
    Invalid(Vec<Violation>),
}

fn join_violations(violations: &[Violation]) -> String {
    violations
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join(", ")
}

/// Collects violations while extracting typed values from a JSON object.
///
/// Every extractor returns `None` exactly when it records a violation.
struct Validator<'a> {
    map: &'a Map<String, Value>,
    violations: Vec<Violation>,
}

impl<'a> Validator<'a> {
    const fn new(map: &'a Map<String, Value>) -> Self {
        Self {
            map,
            violations: Vec::new(),
        }
    }

    fn required(&mut self, key: &'static str) -> Option<&'a Value> {
        let value = self.map.get(key);
        if value.is_none() {
            self.violations.push(Violation::MissingKey { key });
        }
        value
    }

    fn string(&mut self, key: &'static str) -> Option<String> {
        let value = self.required(key)?;
        if let Some(s) = value.as_str() {
            return Some(s.to_string());
        }
        self.violations.push(Violation::InvalidType {
            key,
            value: value.to_string(),
        });
        None
    }

    fn port(&mut self, key: &'static str) -> Option<u16> {
        let value = self.required(key)?;
        if !(value.is_u64() || value.is_i64()) {
            self.violations.push(Violation::InvalidType {
                key,
                value: value.to_string(),
            });
            return None;
        }

        let port = value
            .as_u64()
            .and_then(|n| u16::try_from(n).ok())
            .filter(|&p| p != 0);
        if port.is_none() {
            self.violations.push(Violation::PortOutOfRange {
                key,
                value: value.to_string(),
            });
        }
        port
    }

    fn string_array(&mut self, key: &'static str) -> Option<Vec<String>> {
        let value = self.required(key)?;
        let Some(items) = value.as_array() else {
            self.violations.push(Violation::NotArray {
                key,
                value: value.to_string(),
            });
            return None;
        };

        let mut strings = Vec::with_capacity(items.len());
        let mut valid = true;
        for item in items {
            match item.as_str() {
                Some(s) => strings.push(s.to_string()),
                None => {
                    valid = false;
                    self.violations.push(Violation::InvalidElement {
                        key,
                        value: item.to_string(),
                    });
                }
            }
        }
        valid.then_some(strings)
    }

    fn optional_bool(&mut self, key: &'static str, default: bool) -> Option<bool> {
        let Some(value) = self.map.get(key) else {
            return Some(default);
        };
        let flag = value.as_bool();
        if flag.is_none() {
            self.violations.push(Violation::InvalidType {
                key,
                value: value.to_string(),
            });
        }
        flag
    }
}

impl Settings {
    /// Validates a parsed JSON document and builds settings from it.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Invalid`] listing every violation found.
    pub fn from_value(value: &Value) -> Result<Self, ConfigError> {
        let Some(map) = value.as_object() else {
            return Err(ConfigError::NotObject(value.to_string()));
        };

        let mut v = Validator::new(map);
        let fields = (
            v.string("smtpHost"),
            v.port("smtpPort"),
            v.string("fromAddress"),
            v.string_array("toAddresses"),
            v.string_array("emlFiles"),
            v.optional_bool("updateDate", true),
            v.optional_bool("updateMessageId", true),
            v.optional_bool("useParallel", false),
        );

        match fields {
            (
                Some(smtp_host),
                Some(smtp_port),
                Some(from_address),
                Some(to_addresses),
                Some(eml_files),
                Some(update_date),
                Some(update_message_id),
                Some(use_parallel),
            ) => Ok(Self {
                smtp_host,
                smtp_port,
                from_address,
                to_addresses,
                eml_files,
                update_date,
                update_message_id,
                use_parallel,
            }),
            _ => Err(ConfigError::Invalid(v.violations)),
        }
    }

    /// Parses and validates a JSON settings document.
    ///
    /// # Errors
    ///
    /// Returns an error if the text is not JSON or fails validation.
    pub fn from_json(json: &str) -> Result<Self, ConfigError> {
        let value: Value = serde_json::from_str(json)?;
        Self::from_value(&value)
    }

    /// Loads settings from a JSON file.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::NotFound`] if the file does not exist, or any
    /// read, parse or validation error.
    pub async fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        if !tokio::fs::try_exists(path).await? {
            return Err(ConfigError::NotFound);
        }
        let json = tokio::fs::read_to_string(path).await?;
        Self::from_json(&json)
    }

    /// Returns the settings shown in the usage text.
    #[must_use]
    pub fn sample() -> Self {
        Self {
            smtp_host: "172.16.3.151".to_string(),
            smtp_port: 25,
            from_address: "a001@ah62.example.jp".to_string(),
            to_addresses: vec![
                "a001@ah62.example.jp".to_string(),
                "a002@ah62.example.jp".to_string(),
                "a003@ah62.example.jp".to_string(),
            ],
            eml_files: vec![
                "test1.eml".to_string(),
                "test2.eml".to_string(),
                "test3.eml".to_string(),
            ],
            update_date: true,
            update_message_id: true,
            use_parallel: false,
        }
    }
}

/// Renders [`Settings::sample`] as pretty-printed JSON.
///
/// # Errors
///
/// Returns an error if serialization fails.
pub fn make_json_sample() -> serde_json::Result<String> {
    serde_json::to_string_pretty(&Settings::sample())
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use serde_json::json;

    fn valid() -> Value {
        json!({
            "smtpHost": "172.16.3.151",
            "smtpPort": 25,
            "fromAddress": "a001@ah62.example.jp",
            "toAddresses": ["a001@ah62.example.jp", "a002@ah62.example.jp"],
            "emlFiles": ["test1.eml", "test2.eml"],
            "updateDate": false,
            "updateMessageId": true,
            "useParallel": true
        })
    }

    fn violations(value: &Value) -> Vec<Violation> {
        match Settings::from_value(value) {
            Err(ConfigError::Invalid(violations)) => violations,
            other => panic!("expected violations, got {other:?}"),
        }
    }

    #[test]
    fn test_valid_settings() {
        let settings = Settings::from_value(&valid()).unwrap();
        assert_eq!(settings.smtp_host, "172.16.3.151");
        assert_eq!(settings.smtp_port, 25);
        assert_eq!(settings.to_addresses.len(), 2);
        assert_eq!(settings.eml_files, vec!["test1.eml", "test2.eml"]);
        assert!(!settings.update_date);
        assert!(settings.update_message_id);
        assert!(settings.use_parallel);
    }

    #[test]
    fn test_optional_flags_default() {
        let mut value = valid();
        let map = value.as_object_mut().unwrap();
        map.remove("updateDate");
        map.remove("updateMessageId");
        map.remove("useParallel");

        let settings = Settings::from_value(&value).unwrap();
        assert!(settings.update_date);
        assert!(settings.update_message_id);
        assert!(!settings.use_parallel);
    }

    #[test]
    fn test_missing_to_addresses() {
        let mut value = valid();
        value.as_object_mut().unwrap().remove("toAddresses");

        let violations = violations(&value);
        assert_eq!(
            violations,
            vec![Violation::MissingKey { key: "toAddresses" }]
        );
        assert_eq!(violations[0].to_string(), "toAddresses: Key does not exist");
    }

    #[test]
    fn test_numeric_element() {
        let mut value = valid();
        value["toAddresses"] = json!(["a001@ah62.example.jp", 1]);

        let violations = violations(&value);
        assert_eq!(violations.len(), 1);
        assert_eq!(violations[0].key(), "toAddresses");
        assert_eq!(
            violations[0].to_string(),
            "toAddresses: Invalid type (element): 1"
        );
    }

    #[test]
    fn test_not_an_array() {
        let mut value = valid();
        value["emlFiles"] = json!("test1.eml");

        assert_eq!(
            violations(&value)[0].to_string(),
            "emlFiles: Invalid type (array): \"test1.eml\""
        );
    }

    #[test]
    fn test_wrong_types() {
        let mut value = valid();
        value["smtpHost"] = json!(1);
        value["smtpPort"] = json!("25");
        value["useParallel"] = json!("yes");

        let violations = violations(&value);
        let messages: Vec<String> = violations.iter().map(ToString::to_string).collect();
        assert_eq!(
            messages,
            vec![
                "smtpHost: Invalid type: 1",
                "smtpPort: Invalid type: \"25\"",
                "useParallel: Invalid type: \"yes\"",
            ]
        );
    }

    #[test]
    fn test_port_out_of_range() {
        for port in [json!(0), json!(65536), json!(-1)] {
            let mut value = valid();
            value["smtpPort"] = port;
            assert!(matches!(
                violations(&value)[..],
                [Violation::PortOutOfRange {
                    key: "smtpPort",
                    ..
                }]
            ));
        }

        let mut value = valid();
        value["smtpPort"] = json!(25.5);
        assert!(matches!(
            violations(&value)[..],
            [Violation::InvalidType { key: "smtpPort", .. }]
        ));
    }

    #[test]
    fn test_every_violation_reported() {
        let value = json!({ "smtpPort": 25, "toAddresses": [true, "x", null] });

        let err = Settings::from_value(&value).unwrap_err();
        assert_eq!(
            err.to_string(),
            "smtpHost: Key does not exist, \
             fromAddress: Key does not exist, \
             toAddresses: Invalid type (element): true, \
             toAddresses: Invalid type (element): null, \
             emlFiles: Key does not exist"
        );
    }

    #[test]
    fn test_root_not_object() {
        let err = Settings::from_value(&json!([1, 2])).unwrap_err();
        assert!(matches!(err, ConfigError::NotObject(_)));
    }

    #[test]
    fn test_invalid_json() {
        let err = Settings::from_json("{ \"smtpHost\": ").unwrap_err();
        assert!(matches!(err, ConfigError::Json(_)));
    }

    #[test]
    fn test_sample_round_trip() {
        let sample = make_json_sample().unwrap();
        assert!(sample.contains("\"toAddresses\""));
        assert!(sample.contains("\"useParallel\": false"));
        assert_eq!(Settings::from_json(&sample).unwrap(), Settings::sample());
    }

    #[tokio::test]
    async fn test_load_from_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("settings.json");
        tokio::fs::write(&path, valid().to_string()).await.unwrap();

        let settings = Settings::load(&path).await.unwrap();
        assert_eq!(settings.from_address, "a001@ah62.example.jp");
    }

    #[tokio::test]
    async fn test_load_missing_file() {
        let dir = tempfile::tempdir().unwrap();
        let err = Settings::load(dir.path().join("nothing.json"))
            .await
            .unwrap_err();
        assert!(matches!(err, ConfigError::NotFound));
        assert_eq!(err.to_string(), "Json file does not exist");
    }
}
