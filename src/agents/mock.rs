//! Scripted LLM provider shared by the stage and orchestrator tests.

use std::collections::VecDeque;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Mutex;

use async_trait::async_trait;

use crate::error::LlmError;
use crate::llm::{Choice, GenerationRequest, GenerationResponse, LlmProvider, Message, Usage};

/// Returns scripted replies in order, then the fallback (if any).
pub(crate) struct MockLlmProvider {
    script: Mutex<VecDeque<Result<String, String>>>,
    fallback: Option<Result<String, String>>,
    calls: AtomicUsize,
    prompts: Mutex<Vec<String>>,
}

impl MockLlmProvider {
    /// Answers every call with `response`.
    pub(crate) fn always(response: impl Into<String>) -> Self {
        Self::build(Vec::new(), Some(Ok(response.into())))
    }

    /// Fails every call with `message`.
    pub(crate) fn failing(message: impl Into<String>) -> Self {
        Self::build(Vec::new(), Some(Err(message.into())))
    }

    /// Answers with `responses` in order; further calls fail.
    pub(crate) fn scripted(responses: Vec<Result<&str, &str>>) -> Self {
        let script = responses
            .into_iter()
            .map(|r| r.map(str::to_string).map_err(str::to_string))
            .collect();
        Self::build(script, None)
    }

    /// Answers with `responses` in order, then `fallback` forever.
    pub(crate) fn scripted_then(responses: Vec<&str>, fallback: &str) -> Self {
        let script = responses.into_iter().map(|r| Ok(r.to_string())).collect();
        Self::build(script, Some(Ok(fallback.to_string())))
    }

    fn build(script: Vec<Result<String, String>>, fallback: Option<Result<String, String>>) -> Self {
        Self {
            script: Mutex::new(script.into()),
            fallback,
            calls: AtomicUsize::new(0),
            prompts: Mutex::new(Vec::new()),
        }
    }

    pub(crate) fn call_count(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    /// User prompts received so far.
    pub(crate) fn prompts(&self) -> Vec<String> {
        self.prompts.lock().expect("lock not poisoned").clone()
    }
}

#[async_trait]
impl LlmProvider for MockLlmProvider {
    async fn generate(&self, request: GenerationRequest) -> Result<GenerationResponse, LlmError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        if let Some(prompt) = request.user_prompt() {
            self.prompts
                .lock()
                .expect("lock not poisoned")
                .push(prompt.to_string());
        }

        let next = self
            .script
            .lock()
            .expect("lock not poisoned")
            .pop_front()
            .or_else(|| self.fallback.clone())
            .unwrap_or_else(|| Err("no scripted response left".to_string()));

        match next {
            Ok(content) => Ok(GenerationResponse {
                id: "mock-id".to_string(),
                model: "mock-model".to_string(),
                choices: vec![Choice {
                    index: 0,
                    message: Message::assistant(content),
                    finish_reason: "stop".to_string(),
                }],
                usage: Usage {
                    prompt_tokens: 100,
                    completion_tokens: 200,
                    total_tokens: 300,
                },
            }),
            Err(message) => Err(LlmError::ApiError {
                code: 500,
                message,
            }),
        }
    }
}
