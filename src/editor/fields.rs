use serde::de::{MapAccess, Visitor};
use serde::ser::SerializeMap;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;

/// Insertion-ordered field number -> value mapping.
///
/// The editor presents fields in the order the operator added them, so a
/// HashMap loses information and a BTreeMap reorders ("11" before "2"). A
/// small Vec-backed map keeps the presentation order with unique keys; the
/// order carries no meaning once the message reaches the encoder.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct FieldMap {
    entries: Vec<(String, String)>,
}

impl FieldMap {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn contains(&self, number: &str) -> bool {
        self.entries.iter().any(|(k, _)| k == number)
    }

    pub fn get(&self, number: &str) -> Option<&str> {
        self.entries
            .iter()
            .find(|(k, _)| k == number)
            .map(|(_, v)| v.as_str())
    }

    /// Insert a field with an empty value. Empty or already-present numbers
    /// leave the map unchanged; returns whether an entry was added.
    pub fn add(&mut self, number: &str) -> bool {
        let number = number.trim();
        if number.is_empty() || self.contains(number) {
            return false;
        }
        self.entries.push((number.to_string(), String::new()));
        true
    }

    /// Set a field value, creating the entry if the number is not present.
    pub fn set(&mut self, number: &str, value: &str) {
        let number = number.trim();
        if number.is_empty() {
            return;
        }
        if let Some(entry) = self.entries.iter_mut().find(|(k, _)| k == number) {
            entry.1 = value.to_string();
        } else {
            self.entries.push((number.to_string(), value.to_string()));
        }
    }

    /// Remove a field; no-op when absent. Returns whether an entry existed.
    pub fn remove(&mut self, number: &str) -> bool {
        let before = self.entries.len();
        self.entries.retain(|(k, _)| k != number);
        self.entries.len() != before
    }

    pub fn clear(&mut self) {
        self.entries.clear();
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.entries.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }

    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.entries.iter().map(|(k, _)| k.as_str())
    }
}

impl FromIterator<(String, String)> for FieldMap {
    fn from_iter<I: IntoIterator<Item = (String, String)>>(iter: I) -> Self {
        let mut map = FieldMap::new();
        for (number, value) in iter {
            map.set(&number, &value);
        }
        map
    }
}

impl Serialize for FieldMap {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.entries.len()))?;
        for (k, v) in &self.entries {
            map.serialize_entry(k, v)?;
        }
        map.end()
    }
}

impl<'de> Deserialize<'de> for FieldMap {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        struct FieldMapVisitor;

        impl<'de> Visitor<'de> for FieldMapVisitor {
            type Value = FieldMap;

            fn expecting(&self, f: &mut fmt::Formatter) -> fmt::Result {
                f.write_str("a map of field numbers to string values")
            }

            fn visit_map<A: MapAccess<'de>>(self, mut access: A) -> Result<Self::Value, A::Error> {
                let mut map = FieldMap::new();
                while let Some((k, v)) = access.next_entry::<String, String>()? {
                    map.set(&k, &v);
                }
                Ok(map)
            }
        }

        deserializer.deserialize_map(FieldMapVisitor)
    }
}

/// Human-readable names for well-known ISO8583 data elements, used as input
/// placeholders and template listings.
pub fn field_label(number: &str) -> Option<&'static str> {
    let label = match number {
        "2" => "PAN (Primary Account Number)",
        "3" => "Processing Code",
        "4" => "Transaction Amount",
        "7" => "Transmission Date/Time",
        "11" => "System Trace Audit Number",
        "12" => "Local Transaction Time",
        "13" => "Local Transaction Date",
        "32" => "Acquiring Institution ID",
        "37" => "Retrieval Reference Number",
        "39" => "Response Code",
        "41" => "Terminal ID",
        "42" => "Merchant ID",
        "90" => "Original Data Elements",
        _ => return None,
    };
    Some(label)
}
