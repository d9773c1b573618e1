//! Structured extraction: turns free text into a fixed-schema record with one model call.
//!
//! Shared by résumé and job-description parsing; the two differ only in schema and
//! input length cap.

use std::sync::Arc;

use tracing::{debug, info};

use crate::errors::ScreenError;
use crate::llm_client::ModelInvoker;
use crate::screening::recovery::recover_record;
use crate::screening::schema::{
    RecordSchema, StructuredRecord, JOB_DESCRIPTION_SCHEMA, RESUME_SCHEMA,
};

pub struct StructuredExtractor {
    llm: Arc<dyn ModelInvoker>,
    schema: RecordSchema,
    max_chars: usize,
}

impl StructuredExtractor {
    pub fn new(llm: Arc<dyn ModelInvoker>, schema: RecordSchema, max_chars: usize) -> Self {
        Self {
            llm,
            schema,
            max_chars,
        }
    }

    pub fn resume(llm: Arc<dyn ModelInvoker>, max_chars: usize) -> Self {
        Self::new(llm, RESUME_SCHEMA, max_chars)
    }

    pub fn job_description(llm: Arc<dyn ModelInvoker>, max_chars: usize) -> Self {
        Self::new(llm, JOB_DESCRIPTION_SCHEMA, max_chars)
    }

    /// Extracts a record from `text`.
    ///
    /// Fails only on blank input or when the model call itself fails. Malformed model
    /// output always comes back as the placeholder record.
    pub async fn extract(&self, text: &str) -> Result<StructuredRecord, ScreenError> {
        let text = text.trim();
        if text.is_empty() {
            return Err(ScreenError::Input("text is required".to_string()));
        }

        let text = truncate_chars(text, self.max_chars);
        info!(schema = self.schema.label, chars = text.chars().count(), "extracting");
        let prompt = self.schema.render_prompt(text);
        let raw = self.llm.invoke(&prompt).await?.into_text();
        debug!(schema = self.schema.label, "raw model response: {raw}");

        let record = recover_record(&self.schema, raw.trim());
        info!(
            schema = self.schema.label,
            "extracted {}/{} fields",
            record.filled(),
            record.len()
        );
        Ok(record)
    }
}

/// Cuts `text` to at most `max_chars` characters, respecting char boundaries.
pub fn truncate_chars(text: &str, max_chars: usize) -> &str {
    match text.char_indices().nth(max_chars) {
        Some((idx, _)) => {
            debug!("input truncated to {max_chars} characters");
            &text[..idx]
        }
        None => text,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::llm_client::stub::ScriptedInvoker;
    use crate::llm_client::LlmError;
    use crate::screening::schema::NOT_AVAILABLE;
    use serde_json::json;

    fn extractor(invoker: Arc<ScriptedInvoker>) -> StructuredExtractor {
        StructuredExtractor::resume(invoker, 5000)
    }

    #[tokio::test]
    async fn test_blank_input_is_rejected_without_model_call() {
        let invoker = Arc::new(ScriptedInvoker::new());
        let ex = extractor(invoker.clone());

        for text in ["", "   ", "\n\t "] {
            let err = ex.extract(text).await.unwrap_err();
            assert!(matches!(err, ScreenError::Input(ref m) if m == "text is required"));
        }
        assert_eq!(invoker.calls(), 0);
    }

    #[tokio::test]
    async fn test_extracts_record_from_chatty_reply() {
        let invoker = Arc::new(ScriptedInvoker::new().reply(
            "Here is the JSON:\n{\"name\": \"Ada\", \"skills\": [\"Python\", \"Django\"], \"hobby\": \"chess\"}",
        ));
        let record = extractor(invoker.clone())
            .extract("Ada. Python developer with 2 years Django experience.")
            .await
            .unwrap();

        assert_eq!(record.get("name"), Some(&json!("Ada")));
        assert_eq!(record.get("skills"), Some(&json!(["Python", "Django"])));
        assert_eq!(record.get("email"), Some(&json!(NOT_AVAILABLE)));
        assert!(record.get("hobby").is_none());
        assert_eq!(invoker.calls(), 1);
        assert!(invoker.prompts()[0].contains("2 years Django experience"));
    }

    #[tokio::test]
    async fn test_bare_text_reply_is_accepted() {
        let invoker = Arc::new(ScriptedInvoker::new().reply_text("{\"title\": \"Engineer\"}"));
        let record = StructuredExtractor::job_description(invoker, 3000)
            .extract("We need an engineer.")
            .await
            .unwrap();
        assert_eq!(record.get("title"), Some(&json!("Engineer")));
        assert_eq!(record.len(), JOB_DESCRIPTION_SCHEMA.fields.len());
    }

    #[tokio::test]
    async fn test_garbage_reply_yields_placeholder() {
        let invoker = Arc::new(ScriptedInvoker::new().reply("Sorry, I can't help with that."));
        let record = extractor(invoker).extract("some resume").await.unwrap();
        assert!(record.is_placeholder());
        assert_eq!(record.len(), RESUME_SCHEMA.fields.len());
    }

    #[tokio::test]
    async fn test_model_failure_propagates() {
        let invoker = Arc::new(ScriptedInvoker::new().fail(LlmError::Api {
            status: 401,
            message: "invalid x-api-key".to_string(),
        }));
        let err = extractor(invoker).extract("some resume").await.unwrap_err();
        assert!(matches!(err, ScreenError::ModelInvocation(_)));
    }

    #[tokio::test]
    async fn test_long_input_is_truncated_in_prompt() {
        let invoker = Arc::new(ScriptedInvoker::new().reply("{}"));
        let ex = StructuredExtractor::resume(invoker.clone(), 10);
        ex.extract("abcdefghijKLMNOP").await.unwrap();
        let prompt = &invoker.prompts()[0];
        assert!(prompt.contains("abcdefghij"));
        assert!(!prompt.contains("KLMNOP"));
    }

    #[test]
    fn test_truncate_respects_char_boundaries() {
        assert_eq!(truncate_chars("résumé", 3), "rés");
        assert_eq!(truncate_chars("short", 50), "short");
        assert_eq!(truncate_chars("", 0), "");
    }
}
