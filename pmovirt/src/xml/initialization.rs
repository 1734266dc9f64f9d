//! Lecture des données d'initialisation (cloud-config)
//!
//! The text is YAML: a leading `#cloud_config` line is a comment, double
//! quoted multi-line scalars fold their line breaks into single spaces.
//! Only the keys accepted by `<initialization>` are kept, in input order.

use serde_yaml::Value;
use tracing::warn;

use crate::errors::{Result, VirtError};

/// Keys accepted inside `<initialization>`.
pub const INITIALIZATION_KEYS: &[&str] = &[
    "host_name",
    "domain",
    "timezone",
    "user_name",
    "root_password",
    "authorized_ssh_keys",
    "regenerate_ssh_keys",
    "custom_script",
    "dns_servers",
    "dns_search",
];

/// Ordered `(element, text)` pairs extracted from cloud-config text.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct InitializationData {
    pub fields: Vec<(String, String)>,
}

impl InitializationData {
    pub fn parse(content: &str) -> Result<Self> {
        let value: Value = serde_yaml::from_str(content)
            .map_err(|e| VirtError::InvalidInitialization(e.to_string()))?;

        let mapping = match value {
            Value::Mapping(mapping) => mapping,
            // Comments only
            Value::Null => return Ok(Self::default()),
            other => {
                return Err(VirtError::InvalidInitialization(format!(
                    "expected a mapping, found {}",
                    kind_of(&other)
                )));
            }
        };

        let mut fields = Vec::new();
        for (key, value) in mapping {
            let Some(key) = key.as_str() else {
                continue;
            };
            if !INITIALIZATION_KEYS.contains(&key) {
                continue;
            }
            match value_text(&value) {
                Some(text) => fields.push((key.to_string(), text)),
                None => warn!(key, "Ignoring non-scalar initialization value"),
            }
        }

        Ok(Self { fields })
    }

    pub fn get(&self, key: &str) -> Option<&str> {
        self.fields
            .iter()
            .find(|(k, _)| k == key)
            .map(|(_, v)| v.as_str())
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }
}

fn scalar_text(value: &Value) -> Option<String> {
    match value {
        Value::String(s) => Some(s.clone()),
        Value::Bool(b) => Some(b.to_string()),
        Value::Number(n) => Some(n.to_string()),
        _ => None,
    }
}

fn value_text(value: &Value) -> Option<String> {
    match value {
        Value::Sequence(items) => {
            let parts: Option<Vec<String>> = items.iter().map(scalar_text).collect();
            parts.map(|parts| parts.join(" "))
        }
        other => scalar_text(other),
    }
}

fn kind_of(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Sequence(_) => "a sequence",
        Value::Mapping(_) => "a mapping",
        Value::Tagged(_) => "a tagged value",
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn folds_multiline_script_and_keeps_order() {
        let content = "#cloud_config\nroot_password: some_password\nregenerate_ssh_keys: false\ncustom_script: \"#!/bin/bash\necho 'hi'\"";
        let data = InitializationData::parse(content).unwrap();
        assert_eq!(
            data.fields,
            vec![
                ("root_password".to_string(), "some_password".to_string()),
                ("regenerate_ssh_keys".to_string(), "false".to_string()),
                ("custom_script".to_string(), "#!/bin/bash echo 'hi'".to_string()),
            ]
        );
    }

    #[test]
    fn ignores_unknown_keys_and_joins_sequences() {
        let content = "packages:\n  - vim\nhost_name: vm1\ndns_servers:\n  - 10.0.0.1\n  - 10.0.0.2\n";
        let data = InitializationData::parse(content).unwrap();
        assert_eq!(data.get("packages"), None);
        assert_eq!(data.get("host_name"), Some("vm1"));
        assert_eq!(data.get("dns_servers"), Some("10.0.0.1 10.0.0.2"));
    }

    #[test]
    fn comment_only_text_is_empty() {
        let data = InitializationData::parse("#cloud_config\n").unwrap();
        assert!(data.is_empty());
    }

    #[test]
    fn rejects_non_mapping_text() {
        let err = InitializationData::parse("- a\n- b\n").unwrap_err();
        assert!(matches!(err, VirtError::InvalidInitialization(_)));
    }
}
