//! Field extraction port over parsed request documents.
//!
//! The engine never touches raw JSON directly; it reads typed values through
//! [`Document`] and treats absence and unparseable values uniformly as
//! `None`. [`JsonDocument`] is the serde_json-backed adapter used in
//! production and tests alike.

use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde_json::Value;

use crate::error::DomainRuleError;

/// Business dates travel as `yyyy-MM-dd` strings.
const DATE_FORMAT: &str = "%Y-%m-%d";

pub trait Document {
    /// Names of every top-level parameter present in the document.
    fn parameter_names(&self) -> Vec<String>;

    /// Whether a parameter is present at all, regardless of its value.
    fn exists(&self, name: &str) -> bool;

    fn long_named(&self, name: &str) -> Option<i64>;

    fn decimal_named(&self, name: &str) -> Option<Decimal>;

    fn string_named(&self, name: &str) -> Option<String>;

    fn bool_named(&self, name: &str) -> Option<bool>;

    fn date_named(&self, name: &str) -> Option<NaiveDate>;

    /// Entries of an array-valued parameter, each exposed as a nested
    /// document. `None` when absent or not an array.
    fn array_named(&self, name: &str) -> Option<Vec<Box<dyn Document>>>;

    /// Whether the parameter holds an array value. Distinguishes "absent"
    /// from "present but of the wrong shape".
    fn is_array(&self, name: &str) -> bool;
}

/// Rejects any parameter outside the context's allow-list before business
/// rules run.
pub fn ensure_supported_parameters(
    doc: &dyn Document,
    supported: &[&str],
) -> Result<(), DomainRuleError> {
    let unsupported: Vec<String> = doc
        .parameter_names()
        .into_iter()
        .filter(|name| !supported.contains(&name.as_str()))
        .collect();
    if unsupported.is_empty() {
        Ok(())
    } else {
        Err(DomainRuleError::UnsupportedParameters(unsupported))
    }
}

/// Request document backed by a parsed `serde_json` object.
#[derive(Debug, Clone)]
pub struct JsonDocument {
    root: Value,
}

impl JsonDocument {
    /// Parses a raw request body. Blank bodies, malformed JSON and non-object
    /// roots are all structural rejections.
    pub fn parse(body: &str) -> Result<Self, DomainRuleError> {
        if body.trim().is_empty() {
            return Err(DomainRuleError::InvalidJson);
        }
        let root: Value = serde_json::from_str(body).map_err(|_| DomainRuleError::InvalidJson)?;
        Self::from_value(root)
    }

    pub fn from_value(root: Value) -> Result<Self, DomainRuleError> {
        if root.is_object() {
            Ok(Self { root })
        } else {
            Err(DomainRuleError::InvalidJson)
        }
    }

    fn field(&self, name: &str) -> Option<&Value> {
        self.root.get(name).filter(|v| !v.is_null())
    }
}

impl Document for JsonDocument {
    fn parameter_names(&self) -> Vec<String> {
        match self.root.as_object() {
            Some(map) => map.keys().cloned().collect(),
            None => Vec::new(),
        }
    }

    fn exists(&self, name: &str) -> bool {
        self.root.get(name).is_some()
    }

    fn long_named(&self, name: &str) -> Option<i64> {
        match self.field(name)? {
            Value::Number(n) => n.as_i64(),
            Value::String(s) => s.trim().parse().ok(),
            _ => None,
        }
    }

    fn decimal_named(&self, name: &str) -> Option<Decimal> {
        match self.field(name)? {
            // going through the display form avoids binary float artifacts
            Value::Number(n) => n.to_string().parse().ok(),
            Value::String(s) => s.trim().parse().ok(),
            _ => None,
        }
    }

    fn string_named(&self, name: &str) -> Option<String> {
        match self.field(name)? {
            Value::String(s) => Some(s.clone()),
            other => Some(other.to_string()),
        }
    }

    fn bool_named(&self, name: &str) -> Option<bool> {
        match self.field(name)? {
            Value::Bool(b) => Some(*b),
            Value::String(s) => match s.trim() {
                "true" => Some(true),
                "false" => Some(false),
                _ => None,
            },
            _ => None,
        }
    }

    fn date_named(&self, name: &str) -> Option<NaiveDate> {
        let raw = self.field(name)?.as_str()?;
        NaiveDate::parse_from_str(raw.trim(), DATE_FORMAT).ok()
    }

    fn array_named(&self, name: &str) -> Option<Vec<Box<dyn Document>>> {
        let entries = self.field(name)?.as_array()?;
        Some(
            entries
                .iter()
                .filter_map(|entry| JsonDocument::from_value(entry.clone()).ok())
                .map(|doc| Box::new(doc) as Box<dyn Document>)
                .collect(),
        )
    }

    fn is_array(&self, name: &str) -> bool {
        self.field(name).is_some_and(Value::is_array)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn blank_and_malformed_bodies_are_structural_rejections() {
        assert!(matches!(JsonDocument::parse("   "), Err(DomainRuleError::InvalidJson)));
        assert!(matches!(JsonDocument::parse("{oops"), Err(DomainRuleError::InvalidJson)));
        assert!(matches!(JsonDocument::parse("[1,2]"), Err(DomainRuleError::InvalidJson)));
    }

    #[test]
    fn typed_accessors_tolerate_string_encodings() {
        let doc = JsonDocument::parse(
            r#"{"clientId": "12", "principal": "5000.50", "isTopup": "true", "submittedOnDate": "2024-03-01"}"#,
        )
        .unwrap();

        assert_eq!(doc.long_named("clientId"), Some(12));
        assert_eq!(doc.decimal_named("principal"), Some("5000.50".parse().unwrap()));
        assert_eq!(doc.bool_named("isTopup"), Some(true));
        assert_eq!(
            doc.date_named("submittedOnDate"),
            NaiveDate::from_ymd_opt(2024, 3, 1)
        );
    }

    #[test]
    fn present_but_unparseable_values_read_as_none() {
        let doc = JsonDocument::parse(r#"{"isTopup": "yes", "clientId": true}"#).unwrap();
        assert!(doc.exists("isTopup"));
        assert_eq!(doc.bool_named("isTopup"), None);
        assert_eq!(doc.long_named("clientId"), None);
    }

    #[test]
    fn null_parameters_exist_but_extract_as_absent() {
        let doc = JsonDocument::parse(r#"{"groupId": null}"#).unwrap();
        assert!(doc.exists("groupId"));
        assert_eq!(doc.long_named("groupId"), None);
    }

    #[test]
    fn nested_arrays_come_back_as_documents() {
        let doc = JsonDocument::from_value(json!({
            "disbursementData": [
                {"expectedDisbursementDate": "2024-05-01", "principal": 100},
                {"expectedDisbursementDate": "2024-06-01", "principal": 200}
            ]
        }))
        .unwrap();

        let entries = doc.array_named("disbursementData").unwrap();
        assert_eq!(entries.len(), 2);
        assert_eq!(
            entries[1].date_named("expectedDisbursementDate"),
            NaiveDate::from_ymd_opt(2024, 6, 1)
        );
        assert!(doc.is_array("disbursementData"));
    }

    #[test]
    fn unsupported_parameters_are_reported_by_name() {
        let doc = JsonDocument::parse(r#"{"clientId": 1, "smuggled": 2}"#).unwrap();
        let err = ensure_supported_parameters(&doc, &["clientId"]).unwrap_err();
        match err {
            DomainRuleError::UnsupportedParameters(names) => assert_eq!(names, vec!["smuggled"]),
            other => panic!("unexpected error: {other:?}"),
        }
    }
}
