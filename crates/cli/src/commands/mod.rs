//! Command handlers for the Owner Manual CLI.

pub mod ask;
pub mod prompts;
pub mod search;
pub mod serve;

pub use ask::AskCommand;
pub use prompts::PromptsCommand;
pub use search::SearchCommand;
pub use serve::ServeCommand;
