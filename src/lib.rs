pub mod commands;
pub mod config;
pub mod index;
pub mod llm;
pub mod manager;
pub mod processor;
pub mod providers;

// Re-export commonly used items
pub use config::AppConfig;
pub use manager::ResumeManager;
pub use processor::metadata::ResumeMetadata;
pub use providers::traits::CompletionProvider;
