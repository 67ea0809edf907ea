//! Recording test doubles for the retriever and generator seams.

use std::sync::Mutex;

use manual_core::{AppError, AppResult};

use crate::rag::Generator;
use crate::retriever::Retriever;
use crate::types::Passage;

/// One recorded `search` call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SearchCall {
    pub query: String,
    pub scope: Option<String>,
    pub top_k: usize,
}

/// One recorded `generate` call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GenerateCall {
    pub system: String,
    pub user: String,
}

/// Retriever returning a fixed list (or failing) and recording its calls.
pub struct RecordingRetriever {
    passages: Vec<Passage>,
    fail: bool,
    pub calls: Mutex<Vec<SearchCall>>,
}

impl RecordingRetriever {
    pub fn returning(passages: Vec<Passage>) -> Self {
        Self {
            passages,
            fail: false,
            calls: Mutex::new(Vec::new()),
        }
    }

    pub fn failing() -> Self {
        Self {
            passages: Vec::new(),
            fail: true,
            calls: Mutex::new(Vec::new()),
        }
    }

    pub fn calls(&self) -> Vec<SearchCall> {
        self.calls.lock().unwrap().clone()
    }
}

#[async_trait::async_trait]
impl Retriever for RecordingRetriever {
    fn name(&self) -> &str {
        "recording"
    }

    async fn search(
        &self,
        query: &str,
        scope: Option<&str>,
        top_k: usize,
    ) -> AppResult<Vec<Passage>> {
        self.calls.lock().unwrap().push(SearchCall {
            query: query.to_string(),
            scope: scope.map(str::to_string),
            top_k,
        });

        if self.fail {
            return Err(AppError::Retrieval("vector store unreachable".to_string()));
        }

        Ok(self.passages.iter().take(top_k).cloned().collect())
    }
}

/// Generator replaying a canned answer (or failing) and recording its calls.
pub struct RecordingGenerator {
    answer: String,
    fail: bool,
    pub calls: Mutex<Vec<GenerateCall>>,
}

impl RecordingGenerator {
    pub fn answering(answer: &str) -> Self {
        Self {
            answer: answer.to_string(),
            fail: false,
            calls: Mutex::new(Vec::new()),
        }
    }

    pub fn failing() -> Self {
        Self {
            answer: String::new(),
            fail: true,
            calls: Mutex::new(Vec::new()),
        }
    }

    pub fn calls(&self) -> Vec<GenerateCall> {
        self.calls.lock().unwrap().clone()
    }
}

#[async_trait::async_trait]
impl Generator for RecordingGenerator {
    fn name(&self) -> &str {
        "recording"
    }

    async fn generate(&self, system_instruction: &str, user_message: &str) -> AppResult<String> {
        self.calls.lock().unwrap().push(GenerateCall {
            system: system_instruction.to_string(),
            user: user_message.to_string(),
        });

        if self.fail {
            return Err(AppError::Generation("rate limit exceeded".to_string()));
        }

        Ok(self.answer.clone())
    }
}

/// Passage with the given id and text in scope "model-a".
pub fn passage(id: &str, text: &str) -> Passage {
    Passage::new(id, text, "manual-1", "model-a").unwrap()
}
