//! Fixed-schema records produced by the extraction steps.
//!
//! A `StructuredRecord` always holds exactly the fields of its schema. Anything the
//! model could not determine carries the `"N/A"` sentinel.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::llm_client::prompts::JSON_ONLY_INSTRUCTION;
use crate::screening::prompts::{JD_PARSE_PROMPT_TEMPLATE, RESUME_PARSE_PROMPT_TEMPLATE};

/// Marker for "field not determined". Distinct from absence, which never happens.
pub const NOT_AVAILABLE: &str = "N/A";

/// Describes one extraction target: its field set and the prompt that asks for it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RecordSchema {
    pub label: &'static str,
    pub fields: &'static [&'static str],
    /// Contains a `{text}` placeholder.
    pub prompt_template: &'static str,
}

pub const RESUME_SCHEMA: RecordSchema = RecordSchema {
    label: "resume",
    fields: &[
        "name",
        "email",
        "phone",
        "linkedin",
        "github",
        "portfolio url",
        "education",
        "experience",
        "skills",
        "projects",
        "certifications",
        "publications",
        "awards",
        "summary",
        "other",
    ],
    prompt_template: RESUME_PARSE_PROMPT_TEMPLATE,
};

pub const JOB_DESCRIPTION_SCHEMA: RecordSchema = RecordSchema {
    label: "job description",
    fields: &[
        "title",
        "company",
        "location",
        "type",
        "experience required",
        "qualifications",
        "required skills",
        "preferred skills",
        "salary",
        "work type",
        "summary",
        "other",
    ],
    prompt_template: JD_PARSE_PROMPT_TEMPLATE,
};

impl RecordSchema {
    pub fn render_prompt(&self, text: &str) -> String {
        format!(
            "{}\n{JSON_ONLY_INSTRUCTION}",
            self.prompt_template.replace("{text}", text)
        )
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct StructuredRecord(Map<String, Value>);

impl StructuredRecord {
    /// The default record: every schema field set to the sentinel.
    pub fn placeholder(schema: &RecordSchema) -> Self {
        Self(
            schema
                .fields
                .iter()
                .map(|f| (f.to_string(), Value::from(NOT_AVAILABLE)))
                .collect(),
        )
    }

    /// Projects a parsed model object onto the schema. Extra keys are dropped,
    /// missing, null or blank values become the sentinel.
    pub fn from_object(schema: &RecordSchema, mut parsed: Map<String, Value>) -> Self {
        Self(
            schema
                .fields
                .iter()
                .map(|field| {
                    let value = parsed
                        .remove(*field)
                        .filter(|v| !is_blank(v))
                        .unwrap_or_else(|| Value::from(NOT_AVAILABLE));
                    (field.to_string(), value)
                })
                .collect(),
        )
    }

    #[cfg(test)]
    pub fn get(&self, field: &str) -> Option<&Value> {
        self.0.get(field)
    }

    #[cfg(test)]
    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.0.keys().map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Fields holding something other than the sentinel.
    pub fn filled(&self) -> usize {
        self.0.values().filter(|v| *v != NOT_AVAILABLE).count()
    }

    /// True when no field carries a genuine value.
    pub fn is_placeholder(&self) -> bool {
        self.filled() == 0
    }
}

fn is_blank(value: &Value) -> bool {
    match value {
        Value::Null => true,
        Value::String(s) => s.trim().is_empty(),
        _ => false,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use std::collections::BTreeSet;

    fn key_set(record: &StructuredRecord) -> BTreeSet<&str> {
        record.keys().collect()
    }

    fn schema_set(schema: &RecordSchema) -> BTreeSet<&'static str> {
        schema.fields.iter().copied().collect()
    }

    #[test]
    fn test_placeholder_covers_schema_with_sentinel() {
        for schema in [RESUME_SCHEMA, JOB_DESCRIPTION_SCHEMA] {
            let record = StructuredRecord::placeholder(&schema);
            assert_eq!(key_set(&record), schema_set(&schema));
            assert!(record.is_placeholder());
        }
    }

    #[test]
    fn test_from_object_drops_extra_and_fills_missing() {
        let parsed = json!({
            "title": "Backend Engineer",
            "required skills": ["Python", "Django"],
            "favourite colour": "teal"
        });
        let Value::Object(map) = parsed else { unreachable!() };

        let record = StructuredRecord::from_object(&JOB_DESCRIPTION_SCHEMA, map);

        assert_eq!(key_set(&record), schema_set(&JOB_DESCRIPTION_SCHEMA));
        assert_eq!(record.get("title"), Some(&json!("Backend Engineer")));
        assert_eq!(record.get("required skills"), Some(&json!(["Python", "Django"])));
        assert_eq!(record.get("salary"), Some(&json!(NOT_AVAILABLE)));
        assert!(record.get("favourite colour").is_none());
        assert!(!record.is_placeholder());
        assert_eq!(record.filled(), 2);
        assert_eq!(record.len(), JOB_DESCRIPTION_SCHEMA.fields.len());
    }

    #[test]
    fn test_null_and_blank_values_become_sentinel() {
        let Value::Object(map) = json!({"name": null, "email": "  ", "phone": "555-0100"}) else {
            unreachable!()
        };
        let record = StructuredRecord::from_object(&RESUME_SCHEMA, map);
        assert_eq!(record.get("name"), Some(&json!(NOT_AVAILABLE)));
        assert_eq!(record.get("email"), Some(&json!(NOT_AVAILABLE)));
        assert_eq!(record.get("phone"), Some(&json!("555-0100")));
    }

    #[test]
    fn test_prompt_templates_name_every_field() {
        for schema in [RESUME_SCHEMA, JOB_DESCRIPTION_SCHEMA] {
            for field in schema.fields {
                assert!(
                    schema.prompt_template.contains(&format!("\"{field}\"")),
                    "{} prompt is missing field {field}",
                    schema.label
                );
            }
        }
    }

    #[test]
    fn test_render_prompt_embeds_text() {
        let prompt = RESUME_SCHEMA.render_prompt("Ada Lovelace, analyst");
        assert!(prompt.contains("Ada Lovelace, analyst"));
        assert!(!prompt.contains("{text}"));
        assert!(prompt.ends_with(JSON_ONLY_INSTRUCTION));
    }

    #[test]
    fn test_record_serializes_as_flat_object() {
        let record = StructuredRecord::placeholder(&JOB_DESCRIPTION_SCHEMA);
        let value = serde_json::to_value(&record).unwrap();
        assert_eq!(value["work type"], "N/A");
        assert_eq!(value.as_object().unwrap().len(), JOB_DESCRIPTION_SCHEMA.fields.len());
    }
}
