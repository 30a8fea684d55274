pub mod assistant_llm;
pub mod db;
pub mod push;

pub use assistant_llm::OpenAiAssistantAdapter;
pub use db::DbAdapter;
pub use push::LoggingPushNotifier;
