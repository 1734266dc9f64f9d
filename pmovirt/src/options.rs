//! Caller-supplied attribute mappings.
//!
//! An [`AttributeOptions`] is the loose key/value bag handed to one action.
//! Keys outside the action's recognized set are ignored by the builders.
//! Boolean fields are read as `Option<bool>`: `Some(true)`, `Some(false)` and
//! `None` (absent) are three distinct states and `None` never means `false`.

use std::collections::BTreeMap;

use tracing::warn;

/// A single attribute value.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AttrValue {
    Str(String),
    Int(i64),
    /// Unsigned quantity (byte counts), kept as given.
    UInt(u64),
    Bool(bool),
    /// Identifier of another API resource (storage domain, network...).
    Ref(String),
}

impl AttrValue {
    /// Text form used as element content or attribute value.
    pub fn to_text(&self) -> String {
        match self {
            AttrValue::Str(s) | AttrValue::Ref(s) => s.clone(),
            AttrValue::Int(n) => n.to_string(),
            AttrValue::UInt(n) => n.to_string(),
            AttrValue::Bool(b) => b.to_string(),
        }
    }

    pub fn as_bool(&self) -> Option<bool> {
        match self {
            AttrValue::Bool(b) => Some(*b),
            AttrValue::Str(s) => match s.as_str() {
                "true" => Some(true),
                "false" => Some(false),
                _ => None,
            },
            _ => None,
        }
    }

    pub fn as_int(&self) -> Option<i64> {
        match self {
            AttrValue::Int(n) => Some(*n),
            AttrValue::UInt(n) => i64::try_from(*n).ok(),
            AttrValue::Str(s) => s.trim().parse().ok(),
            _ => None,
        }
    }
}

impl From<&str> for AttrValue {
    fn from(value: &str) -> Self {
        AttrValue::Str(value.to_string())
    }
}

impl From<String> for AttrValue {
    fn from(value: String) -> Self {
        AttrValue::Str(value)
    }
}

impl From<i64> for AttrValue {
    fn from(value: i64) -> Self {
        AttrValue::Int(value)
    }
}

impl From<u64> for AttrValue {
    fn from(value: u64) -> Self {
        AttrValue::UInt(value)
    }
}

impl From<bool> for AttrValue {
    fn from(value: bool) -> Self {
        AttrValue::Bool(value)
    }
}

/// Unordered attribute mapping for one action.
///
/// Backed by a `BTreeMap` so iteration (and thus any document built from
/// iterated keys) is deterministic.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AttributeOptions {
    values: BTreeMap<String, AttrValue>,
}

impl AttributeOptions {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder-style insert.
    pub fn with(mut self, key: &str, value: impl Into<AttrValue>) -> Self {
        self.insert(key, value);
        self
    }

    /// Builder-style insert of a resource identifier.
    pub fn with_ref(mut self, key: &str, id: &str) -> Self {
        self.insert(key, AttrValue::Ref(id.to_string()));
        self
    }

    pub fn insert(&mut self, key: &str, value: impl Into<AttrValue>) -> Option<AttrValue> {
        self.values.insert(key.to_string(), value.into())
    }

    pub fn remove(&mut self, key: &str) -> Option<AttrValue> {
        self.values.remove(key)
    }

    pub fn get(&self, key: &str) -> Option<&AttrValue> {
        self.values.get(key)
    }

    pub fn contains_key(&self, key: &str) -> bool {
        self.values.contains_key(key)
    }

    /// Text of a value, whatever its type.
    pub fn text(&self, key: &str) -> Option<String> {
        self.get(key).map(AttrValue::to_text)
    }

    /// Tri-state boolean lookup.
    pub fn flag(&self, key: &str) -> Option<bool> {
        self.get(key).and_then(AttrValue::as_bool)
    }

    /// Keys among `keys` that are present but carry no boolean value.
    pub fn non_boolean_flags<'a>(&self, keys: &[&'a str]) -> Vec<&'a str> {
        keys.iter()
            .copied()
            .filter(|key| matches!(self.get(key), Some(value) if value.as_bool().is_none()))
            .collect()
    }

    pub fn int(&self, key: &str) -> Option<i64> {
        self.get(key).and_then(AttrValue::as_int)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &AttrValue)> {
        self.values.iter().map(|(k, v)| (k.as_str(), v))
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }
}

impl<K: Into<String>, V: Into<AttrValue>> FromIterator<(K, V)> for AttributeOptions {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        Self {
            values: iter
                .into_iter()
                .map(|(k, v)| (k.into(), v.into()))
                .collect(),
        }
    }
}

/// Recognized fields of a disk creation request.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DiskOptions {
    pub name: Option<String>,
    pub interface: Option<String>,
    pub format: Option<String>,
    pub size: Option<String>,
    pub sparse: Option<bool>,
    pub bootable: Option<bool>,
    pub wipe_after_delete: Option<bool>,
    pub propagate_errors: Option<bool>,
    /// Storage domain the disk is allocated on.
    pub storage: Option<String>,
}

const DISK_FLAGS: [&str; 4] = ["sparse", "bootable", "wipe_after_delete", "propagate_errors"];

impl DiskOptions {
    pub fn from_attributes(options: &AttributeOptions) -> Self {
        for key in options.non_boolean_flags(&DISK_FLAGS) {
            warn!(key, value = ?options.get(key), "Ignoring non-boolean disk flag");
        }
        Self {
            name: options.text("name"),
            interface: options.text("interface"),
            format: options.text("format"),
            size: options.text("size"),
            sparse: options.flag("sparse"),
            bootable: options.flag("bootable"),
            wipe_after_delete: options.flag("wipe_after_delete"),
            propagate_errors: options.flag("propagate_errors"),
            storage: options.text("storage"),
        }
    }
}

/// Recognized fields of a NIC creation request.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct NicOptions {
    pub name: String,
    pub interface: Option<String>,
    pub network_id: Option<String>,
    pub mac_address: Option<String>,
}

impl NicOptions {
    pub fn from_attributes(options: &AttributeOptions) -> Self {
        Self {
            name: options.text("name").unwrap_or_default(),
            interface: options.text("interface"),
            network_id: options.text("network_id"),
            mac_address: options.text("mac_address"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn flag_keeps_absent_distinct_from_false() {
        let options = AttributeOptions::new()
            .with("sparse", true)
            .with("bootable", false);

        assert_eq!(options.flag("sparse"), Some(true));
        assert_eq!(options.flag("bootable"), Some(false));
        assert_eq!(options.flag("wipe_after_delete"), None);
    }

    #[test]
    fn disk_options_ignore_unrecognized_keys() {
        let options = AttributeOptions::new()
            .with("name", "disk1")
            .with("actual_size", 1316855808_i64)
            .with_ref("storage", "sd-1");

        let disk = DiskOptions::from_attributes(&options);
        assert_eq!(disk.name.as_deref(), Some("disk1"));
        assert_eq!(disk.storage.as_deref(), Some("sd-1"));
        assert_eq!(disk.size, None);
    }

    #[test]
    fn non_boolean_disk_flags_are_reported_and_left_out() {
        let options = AttributeOptions::new()
            .with("name", "d")
            .with("sparse", "yes")
            .with("bootable", 1_i64)
            .with("wipe_after_delete", "false");

        assert_eq!(options.non_boolean_flags(&DISK_FLAGS), vec!["sparse", "bootable"]);

        let disk = DiskOptions::from_attributes(&options);
        assert_eq!(disk.sparse, None);
        assert_eq!(disk.bootable, None);
        assert_eq!(disk.wipe_after_delete, Some(false));
    }

    #[test]
    fn unsigned_sizes_keep_their_full_range() {
        let options = AttributeOptions::new().with("memory", u64::MAX);
        assert_eq!(options.text("memory").as_deref(), Some("18446744073709551615"));
        assert_eq!(options.int("memory"), None);
    }

    #[test]
    fn int_values_render_verbatim() {
        let options = AttributeOptions::new().with("size", 10737418240_i64);
        assert_eq!(options.text("size").as_deref(), Some("10737418240"));
        assert_eq!(options.int("size"), Some(10737418240));
    }
}
