//! Scripted `ModelInvoker` for tests. Replies are served in order; every prompt is recorded.

use std::collections::VecDeque;
use std::sync::Mutex;

use async_trait::async_trait;

use super::{LlmError, ModelInvoker, ModelReply};

#[derive(Default)]
pub struct ScriptedInvoker {
    replies: Mutex<VecDeque<Result<ModelReply, LlmError>>>,
    prompts: Mutex<Vec<String>>,
}

impl ScriptedInvoker {
    pub fn new() -> Self {
        Self::default()
    }

    /// Queues a chat-style reply.
    pub fn reply(self, content: &str) -> Self {
        self.push(Ok(ModelReply::Message {
            content: content.to_string(),
        }))
    }

    /// Queues a completion-style reply.
    pub fn reply_text(self, text: &str) -> Self {
        self.push(Ok(ModelReply::Text(text.to_string())))
    }

    pub fn fail(self, error: LlmError) -> Self {
        self.push(Err(error))
    }

    fn push(self, reply: Result<ModelReply, LlmError>) -> Self {
        self.replies.lock().unwrap().push_back(reply);
        self
    }

    pub fn prompts(&self) -> Vec<String> {
        self.prompts.lock().unwrap().clone()
    }

    pub fn calls(&self) -> usize {
        self.prompts.lock().unwrap().len()
    }
}

#[async_trait]
impl ModelInvoker for ScriptedInvoker {
    async fn invoke(&self, prompt: &str) -> Result<ModelReply, LlmError> {
        self.prompts.lock().unwrap().push(prompt.to_string());
        self.replies
            .lock()
            .unwrap()
            .pop_front()
            .unwrap_or(Err(LlmError::EmptyContent))
    }
}
