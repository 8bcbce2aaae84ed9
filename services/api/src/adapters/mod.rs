pub mod chat_llm;
pub mod submissions;

pub use chat_llm::OpenAiChatAdapter;
pub use submissions::MockSubmissionAdapter;
