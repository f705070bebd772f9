use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Core fields every record carries, in output order.
pub const RECORD_FIELDS: [&str; 6] = ["location", "type", "description", "dates", "impact", "status"];

/// One closure/construction item extracted from a page.
///
/// All fields are free text as the model wrote them. `status` is by
/// convention one of `upcoming`, `ongoing` or `completed` but is not checked.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ConstructionRecord {
    #[serde(default)]
    pub location: String,
    #[serde(rename = "type", default)]
    pub kind: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub dates: String,
    #[serde(default)]
    pub impact: String,
    #[serde(default)]
    pub status: String,
    #[serde(default)]
    pub source_url: String,
    /// Keys the model added beyond the core set.
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl ConstructionRecord {
    /// Build a record from one model-produced object, stamping `source_url`.
    ///
    /// Missing core fields become empty strings and non-string scalars are
    /// rendered as JSON text, so nothing the model said is lost.
    pub fn from_object(mut object: Map<String, Value>, source_url: &str) -> Self {
        let mut take = |key: &str| object.remove(key).map(value_to_text).unwrap_or_default();

        let location = take("location");
        let kind = take("type");
        let description = take("description");
        let dates = take("dates");
        let impact = take("impact");
        let status = take("status");
        object.remove("source_url");

        Self {
            location,
            kind,
            description,
            dates,
            impact,
            status,
            source_url: source_url.to_string(),
            extra: object,
        }
    }
}

fn value_to_text(value: Value) -> String {
    match value {
        Value::Null => String::new(),
        Value::String(s) => s,
        other => other.to_string(),
    }
}

/// One entry of the model's JSON array.
///
/// Objects become records. Anything else is carried through untouched so the
/// output mirrors what the model returned.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Extracted {
    Record(ConstructionRecord),
    Other(Value),
}

impl Extracted {
    pub fn from_value(value: Value, source_url: &str) -> Self {
        match value {
            Value::Object(object) => Self::Record(ConstructionRecord::from_object(object, source_url)),
            other => Self::Other(other),
        }
    }

    pub fn as_record(&self) -> Option<&ConstructionRecord> {
        match self {
            Self::Record(record) => Some(record),
            Self::Other(_) => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_source_url_is_overwritten() {
        let object = json!({
            "location": "Ocean Dr & Doddridge St",
            "type": "road work",
            "source_url": "https://made-up.example/",
        });
        let Value::Object(object) = object else {
            unreachable!()
        };

        let record = ConstructionRecord::from_object(object, "https://city.gov/page/");
        assert_eq!(record.source_url, "https://city.gov/page/");
        assert_eq!(record.kind, "road work");
        assert!(record.extra.is_empty());
    }

    #[test]
    fn test_lenient_field_conversion() {
        let Value::Object(object) = json!({
            "location": null,
            "dates": 2025,
            "lanes_closed": 2,
        }) else {
            unreachable!()
        };

        let record = ConstructionRecord::from_object(object, "https://city.gov/");
        assert_eq!(record.location, "");
        assert_eq!(record.dates, "2025");
        assert_eq!(record.description, "");
        assert_eq!(record.extra.get("lanes_closed"), Some(&json!(2)));
    }

    #[test]
    fn test_serializes_type_key_and_extras() {
        let Value::Object(object) = json!({"type": "utility work", "contractor": "Acme"}) else {
            unreachable!()
        };
        let record = ConstructionRecord::from_object(object, "https://city.gov/");
        let json = serde_json::to_value(&record).unwrap();

        assert_eq!(json["type"], "utility work");
        assert_eq!(json["contractor"], "Acme");
        assert_eq!(json["source_url"], "https://city.gov/");
        for field in RECORD_FIELDS {
            assert!(json.get(field).is_some(), "missing {field}");
        }
    }

    #[test]
    fn test_non_object_passes_through() {
        let entry = Extracted::from_value(json!("just a string"), "https://city.gov/");
        assert_eq!(entry, Extracted::Other(json!("just a string")));
        assert!(entry.as_record().is_none());
        assert_eq!(serde_json::to_value(&entry).unwrap(), json!("just a string"));
    }
}
