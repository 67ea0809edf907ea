//! Retrieval-augmented answering over manual passages.
//!
//! Retrieves passages, bounds the context, renders the grounding prompt,
//! generates the answer and cites exactly the passages the model saw.

pub mod ask;
pub mod budget;
pub mod citations;
pub mod generator;

pub use ask::{AnswerOrchestrator, QueryOptions, NO_RELEVANT_SECTIONS};
pub use generator::{create_generator, Generator, LlmGenerator};
