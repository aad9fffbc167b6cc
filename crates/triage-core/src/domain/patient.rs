//! Raw patient records and listing pages as delivered by the remote service.
//!
//! Nothing here is trusted. Decoding never fails: fields that are missing or
//! carry an unexpected JSON type are kept as raw values (or defaulted) and it
//! is the scorer's job to decide whether they are usable.

use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;
use tracing::warn;

/// One patient as received from the listing endpoint.
///
/// The clinical fields stay as raw JSON values; `Value::Null` stands for both
/// an explicit `null` and an absent field.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RawPatientRecord {
    #[serde(default, deserialize_with = "lenient_identifier")]
    pub patient_id: String,
    #[serde(
        default,
        deserialize_with = "lenient_name",
        skip_serializing_if = "Option::is_none"
    )]
    pub name: Option<String>,
    #[serde(default)]
    pub age: Value,
    #[serde(default)]
    pub temperature: Value,
    #[serde(default)]
    pub blood_pressure: Value,
}

impl RawPatientRecord {
    pub fn new(
        patient_id: impl Into<String>,
        age: Value,
        temperature: Value,
        blood_pressure: Value,
    ) -> Self {
        Self {
            patient_id: patient_id.into(),
            name: None,
            age,
            temperature,
            blood_pressure,
        }
    }

    /// Lenient conversion from a JSON value.
    ///
    /// Returns `None` only when the value is not an object at all.
    pub fn from_json(value: Value) -> Option<Self> {
        if !value.is_object() {
            return None;
        }
        serde_json::from_value(value).ok()
    }
}

// Numeric ids are stringified so they still reach the output lists.
fn lenient_identifier<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(match Value::deserialize(deserializer)? {
        Value::String(s) => s,
        Value::Number(n) => n.to_string(),
        _ => String::new(),
    })
}

fn lenient_name<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(match Value::deserialize(deserializer)? {
        Value::String(s) => Some(s),
        _ => None,
    })
}

/// One decoded page of the patient listing.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct PatientPage {
    /// Records in server order.
    pub records: Vec<RawPatientRecord>,
    /// Whether the server advertised a further page.
    pub has_next: bool,
    /// Count of decode problems: an unreadable body, or list entries that
    /// were not objects and had to be dropped.
    pub decode_issues: usize,
}

impl PatientPage {
    pub fn new(records: Vec<RawPatientRecord>, has_next: bool) -> Self {
        Self {
            records,
            has_next,
            decode_issues: 0,
        }
    }

    /// Decode a response body.
    ///
    /// A body that is not valid JSON becomes an empty, final page with one
    /// decode issue recorded.
    pub fn decode(body: &[u8]) -> Self {
        match serde_json::from_slice::<Value>(body) {
            Ok(value) => Self::from_json(value),
            Err(e) => {
                warn!(error = %e, "listing body is not valid JSON; treating as empty final page");
                Self {
                    decode_issues: 1,
                    ..Self::default()
                }
            }
        }
    }

    /// Decode an already parsed JSON document.
    ///
    /// Accepts the listing envelope (`{"data": [...], "pagination": {...}}`)
    /// or a bare array of records, which is treated as a final page.
    pub fn from_json(value: Value) -> Self {
        match value {
            Value::Object(mut envelope) => {
                let has_next = envelope
                    .get("pagination")
                    .and_then(|p| p.get("hasNext"))
                    .and_then(Value::as_bool)
                    .unwrap_or(false);

                let mut page = match envelope.remove("data") {
                    Some(Value::Array(items)) => Self::from_items(items),
                    _ => Self::default(),
                };
                page.has_next = has_next;
                page
            }
            Value::Array(items) => Self::from_items(items),
            other => {
                warn!(kind = %json_kind(&other), "listing body is not an object; treating as empty final page");
                Self {
                    decode_issues: 1,
                    ..Self::default()
                }
            }
        }
    }

    fn from_items(items: Vec<Value>) -> Self {
        let mut page = Self::default();
        for (index, item) in items.into_iter().enumerate() {
            match RawPatientRecord::from_json(item) {
                Some(record) => page.records.push(record),
                None => {
                    warn!(index, "dropping listing entry that is not an object");
                    page.decode_issues += 1;
                }
            }
        }
        page
    }
}

fn json_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "bool",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_decode_full_page() {
        let body = json!({
            "data": [
                {"patient_id": "DEMO001", "name": "A", "age": 45, "temperature": 98.6, "blood_pressure": "120/80"},
                {"patient_id": "DEMO002", "age": "52", "temperature": "99.1", "blood_pressure": "130/85"}
            ],
            "pagination": {"page": 1, "hasNext": true}
        });

        let page = PatientPage::decode(body.to_string().as_bytes());
        assert!(page.has_next);
        assert_eq!(page.decode_issues, 0);
        assert_eq!(page.records.len(), 2);
        assert_eq!(page.records[0].patient_id, "DEMO001");
        assert_eq!(page.records[0].name.as_deref(), Some("A"));
        assert_eq!(page.records[1].age, json!("52"));
        assert_eq!(page.records[1].name, None);
    }

    #[test]
    fn test_missing_fields_default_to_null() {
        let record = RawPatientRecord::from_json(json!({"patient_id": "X"})).unwrap();
        assert_eq!(record.age, Value::Null);
        assert_eq!(record.temperature, Value::Null);
        assert_eq!(record.blood_pressure, Value::Null);
    }

    #[test]
    fn test_numeric_identifier_is_stringified() {
        let record = RawPatientRecord::from_json(json!({"patient_id": 42})).unwrap();
        assert_eq!(record.patient_id, "42");

        let record = RawPatientRecord::from_json(json!({"patient_id": null})).unwrap();
        assert_eq!(record.patient_id, "");
    }

    #[test]
    fn test_odd_name_is_ignored() {
        let record = RawPatientRecord::from_json(json!({"patient_id": "X", "name": 7})).unwrap();
        assert_eq!(record.name, None);
        assert_eq!(RawPatientRecord::from_json(json!(["X", null])), None);
    }

    #[test]
    fn test_out_of_range_number_stays_inside_its_field() {
        let body = br#"{
            "data": [
                {"patient_id": "A", "age": 40, "temperature": 98.6, "blood_pressure": "120/80"},
                {"patient_id": "B", "age": 1e400, "temperature": 98.6, "blood_pressure": "120/80"}
            ],
            "pagination": {"hasNext": true}
        }"#;

        let page = PatientPage::decode(body);
        assert!(page.has_next);
        assert_eq!(page.decode_issues, 0);
        let ids: Vec<_> = page.records.iter().map(|r| r.patient_id.as_str()).collect();
        assert_eq!(ids, vec!["A", "B"]);
        assert!(page.records[1].age.is_number());
    }

    #[test]
    fn test_missing_has_next_stops() {
        let page = PatientPage::from_json(json!({"data": []}));
        assert!(!page.has_next);

        let page = PatientPage::from_json(json!({"data": [], "pagination": {"hasNext": "yes"}}));
        assert!(!page.has_next);
    }

    #[test]
    fn test_invalid_json_is_empty_final_page() {
        let page = PatientPage::decode(b"<html>Bad Gateway</html>");
        assert!(page.records.is_empty());
        assert!(!page.has_next);
        assert_eq!(page.decode_issues, 1);
    }

    #[test]
    fn test_non_object_entries_are_dropped() {
        let page = PatientPage::from_json(json!({
            "data": [{"patient_id": "A"}, "garbage", 7, {"patient_id": "B"}],
            "pagination": {"hasNext": false}
        }));
        let ids: Vec<_> = page.records.iter().map(|r| r.patient_id.as_str()).collect();
        assert_eq!(ids, vec!["A", "B"]);
        assert_eq!(page.decode_issues, 2);
    }

    #[test]
    fn test_bare_array_is_final_page() {
        let page = PatientPage::from_json(json!([{"patient_id": "A"}]));
        assert_eq!(page.records.len(), 1);
        assert!(!page.has_next);
    }

    #[test]
    fn test_data_not_an_array() {
        let page = PatientPage::from_json(json!({"data": {"patient_id": "A"}, "pagination": {"hasNext": true}}));
        assert!(page.records.is_empty());
        assert!(page.has_next);
    }
}
