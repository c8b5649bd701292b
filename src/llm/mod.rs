pub mod client;
pub mod prompt;

pub use client::{ChatMessage, LlmClient};
pub use prompt::{build_system_prompt, ASSISTANT_TEMPLATE};
