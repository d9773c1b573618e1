//! Match scoring: one model call comparing a parsed résumé with a parsed job description.
//!
//! The weighted rubric lives in the prompt only. The returned score is taken as-is
//! apart from clamping it into 0..=100.

use std::sync::Arc;

use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::{info, warn};

use crate::errors::ScreenError;
use crate::llm_client::prompts::JSON_ONLY_INSTRUCTION;
use crate::llm_client::ModelInvoker;
use crate::screening::prompts::MATCH_PROMPT_TEMPLATE;
use crate::screening::recovery::parse_json_object;
use crate::screening::schema::StructuredRecord;

/// Keys the model has been seen to use for the improvement list, in priority order.
const SUGGESTION_KEYS: [&str; 3] = ["suggestions", "Suggestions", "improvements"];

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct MatchResult {
    /// Always within 0..=100.
    pub match_score: u32,
    pub matching_skills: Vec<String>,
    pub missing_skills: Vec<String>,
    pub suggestions: Vec<String>,
}

impl MatchResult {
    /// Reads a result leniently from whatever object the model produced.
    pub fn from_json(value: &Value) -> Self {
        let suggestions = SUGGESTION_KEYS
            .iter()
            .find_map(|key| value.get(*key))
            .map(string_list)
            .unwrap_or_default();

        Self {
            match_score: value.get("match_score").and_then(read_score).unwrap_or(0),
            matching_skills: value
                .get("matching_skills")
                .map(string_list)
                .unwrap_or_default(),
            missing_skills: value
                .get("missing_skills")
                .map(string_list)
                .unwrap_or_default(),
            suggestions,
        }
    }
}

fn read_score(value: &Value) -> Option<u32> {
    let raw = match value {
        Value::Number(n) => n.as_f64()?,
        Value::String(s) => s.trim().trim_end_matches('%').trim().parse::<f64>().ok()?,
        _ => return None,
    };
    if !raw.is_finite() {
        return None;
    }
    Some(raw.round().clamp(0.0, 100.0) as u32)
}

fn string_list(value: &Value) -> Vec<String> {
    match value {
        Value::Array(items) => items
            .iter()
            .filter_map(|item| match item {
                Value::String(s) => Some(s.trim().to_string()),
                Value::Null => None,
                other => Some(other.to_string()),
            })
            .filter(|s| !s.is_empty())
            .collect(),
        Value::String(s) if !s.trim().is_empty() => vec![s.trim().to_string()],
        _ => vec![],
    }
}

pub struct MatchScorer {
    llm: Arc<dyn ModelInvoker>,
}

impl MatchScorer {
    pub fn new(llm: Arc<dyn ModelInvoker>) -> Self {
        Self { llm }
    }

    /// Scores the candidate. Any failure along the way yields `MatchResult::default()`.
    pub async fn score(&self, resume: &StructuredRecord, jd: &StructuredRecord) -> MatchResult {
        match self.try_score(resume, jd).await {
            Ok(result) => {
                info!(
                    "Match score: {}/100 ({} matching, {} missing)",
                    result.match_score,
                    result.matching_skills.len(),
                    result.missing_skills.len()
                );
                result
            }
            Err(e) => {
                warn!("Match analysis degraded to defaults: {e}");
                MatchResult::default()
            }
        }
    }

    async fn try_score(
        &self,
        resume: &StructuredRecord,
        jd: &StructuredRecord,
    ) -> Result<MatchResult, ScreenError> {
        let prompt = build_match_prompt(resume, jd)?;
        let raw = self.llm.invoke(&prompt).await?.into_text();
        let value = parse_json_object(&raw).inspect_err(|_| {
            warn!("Unparseable match response: {raw}");
        })?;
        Ok(MatchResult::from_json(&value))
    }
}

fn build_match_prompt(
    resume: &StructuredRecord,
    jd: &StructuredRecord,
) -> Result<String, ScreenError> {
    let to_json = |record: &StructuredRecord| {
        serde_json::to_string_pretty(record).map_err(|e| ScreenError::Extraction(e.to_string()))
    };
    let resume_json = to_json(resume)?;
    let jd_json = to_json(jd)?;
    let body = fill_placeholders(
        MATCH_PROMPT_TEMPLATE,
        &[
            ("{resume_json}", resume_json.as_str()),
            ("{jd_json}", jd_json.as_str()),
        ],
    );
    Ok(format!("{body}\n{JSON_ONLY_INSTRUCTION}"))
}

/// Substitutes every placeholder in one left-to-right pass over `template`.
/// Inserted values are never scanned again, so record text that happens to
/// contain a placeholder stays literal.
fn fill_placeholders(template: &str, values: &[(&str, &str)]) -> String {
    let mut out = String::with_capacity(template.len());
    let mut rest = template;

    while let Some((at, key, value)) = values
        .iter()
        .filter_map(|(key, value)| rest.find(key).map(|at| (at, *key, *value)))
        .min_by_key(|(at, _, _)| *at)
    {
        out.push_str(&rest[..at]);
        out.push_str(value);
        rest = &rest[at + key.len()..];
    }

    out.push_str(rest);
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::llm_client::stub::ScriptedInvoker;
    use crate::llm_client::LlmError;
    use crate::screening::schema::{JOB_DESCRIPTION_SCHEMA, RESUME_SCHEMA};
    use serde_json::json;

    fn records() -> (StructuredRecord, StructuredRecord) {
        let Value::Object(resume) = json!({"name": "Ada", "skills": ["Python", "Django"]}) else {
            unreachable!()
        };
        let Value::Object(jd) = json!({"title": "Developer", "required skills": ["Python", "React"]})
        else {
            unreachable!()
        };
        (
            StructuredRecord::from_object(&RESUME_SCHEMA, resume),
            StructuredRecord::from_object(&JOB_DESCRIPTION_SCHEMA, jd),
        )
    }

    #[test]
    fn test_from_json_reads_canonical_shape() {
        let result = MatchResult::from_json(&json!({
            "match_score": 72,
            "matching_skills": ["Python", "Django"],
            "missing_skills": ["React"],
            "suggestions": ["Add a React project", "Quantify impact"]
        }));
        assert_eq!(result.match_score, 72);
        assert_eq!(result.matching_skills, vec!["Python", "Django"]);
        assert_eq!(result.missing_skills, vec!["React"]);
        assert_eq!(result.suggestions.len(), 2);
    }

    #[test]
    fn test_suggestion_key_aliases() {
        let capital = MatchResult::from_json(&json!({"Suggestions": ["a"]}));
        assert_eq!(capital.suggestions, vec!["a"]);
        let improvements = MatchResult::from_json(&json!({"improvements": ["b"]}));
        assert_eq!(improvements.suggestions, vec!["b"]);
        let both = MatchResult::from_json(&json!({"improvements": ["b"], "suggestions": ["a"]}));
        assert_eq!(both.suggestions, vec!["a"]);
    }

    #[test]
    fn test_score_is_lenient_and_clamped() {
        assert_eq!(read_score(&json!(64.6)), Some(65));
        assert_eq!(read_score(&json!("80%")), Some(80));
        assert_eq!(read_score(&json!(" 55 ")), Some(55));
        assert_eq!(read_score(&json!(140)), Some(100));
        assert_eq!(read_score(&json!(-3)), Some(0));
        assert_eq!(read_score(&json!("high")), None);
        assert_eq!(read_score(&json!(null)), None);
    }

    #[test]
    fn test_string_list_shapes() {
        assert_eq!(string_list(&json!(["a", 3, null, " "])), vec!["a", "3"]);
        assert_eq!(string_list(&json!("React")), vec!["React"]);
        assert!(string_list(&json!("N/A ")).len() == 1);
        assert!(string_list(&json!({"k": "v"})).is_empty());
    }

    #[test]
    fn test_missing_fields_default() {
        let result = MatchResult::from_json(&json!({}));
        assert_eq!(result, MatchResult::default());
    }

    #[tokio::test]
    async fn test_prompt_embeds_both_records_and_rubric() {
        let invoker = Arc::new(ScriptedInvoker::new().reply("{\"match_score\": 50}"));
        let (resume, jd) = records();
        let result = MatchScorer::new(invoker.clone()).score(&resume, &jd).await;

        assert_eq!(result.match_score, 50);
        let prompt = &invoker.prompts()[0];
        assert!(prompt.contains("\"Ada\""));
        assert!(prompt.contains("\"React\""));
        assert!(prompt.contains("Technical skill match (30%)"));
        assert!(!prompt.contains("{resume_json}"));
    }

    #[test]
    fn test_fill_placeholders_is_single_pass() {
        let filled = fill_placeholders(
            "R: {a}\nJ: {b}\nR again: {a}",
            &[("{a}", "mentions {b}"), ("{b}", "jd")],
        );
        assert_eq!(filled, "R: mentions {b}\nJ: jd\nR again: mentions {b}");
    }

    #[tokio::test]
    async fn test_placeholder_text_in_resume_stays_literal() {
        let invoker = Arc::new(ScriptedInvoker::new().reply("{\"match_score\": 10}"));
        let Value::Object(resume) = json!({"name": "{jd_json}", "skills": ["Python"]}) else {
            unreachable!()
        };
        let resume = StructuredRecord::from_object(&RESUME_SCHEMA, resume);
        let (_, jd) = records();

        MatchScorer::new(invoker.clone()).score(&resume, &jd).await;

        let prompt = &invoker.prompts()[0];
        assert!(prompt.contains("\"name\": \"{jd_json}\""));
        assert_eq!(prompt.matches("\"Developer\"").count(), 1);
        assert!(prompt.find("\"{jd_json}\"") < prompt.find("\"Developer\""));
    }

    #[tokio::test]
    async fn test_unparseable_reply_defaults() {
        for reply in ["no idea", "{\"match_score\": 7", "{broken}"] {
            let invoker = Arc::new(ScriptedInvoker::new().reply(reply));
            let (resume, jd) = records();
            let result = MatchScorer::new(invoker).score(&resume, &jd).await;
            assert_eq!(result, MatchResult::default(), "reply {reply:?}");
        }
    }

    #[tokio::test]
    async fn test_model_failure_defaults() {
        let invoker = Arc::new(ScriptedInvoker::new().fail(LlmError::RateLimited { retries: 3 }));
        let (resume, jd) = records();
        let result = MatchScorer::new(invoker).score(&resume, &jd).await;
        assert_eq!(result.match_score, 0);
        assert!(result.missing_skills.is_empty());
        assert!(result.suggestions.is_empty());
    }
}
