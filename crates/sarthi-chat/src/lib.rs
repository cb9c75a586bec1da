//! Agri-Sarthi Chat — prompt assembly and answer generation.
//!
//! The prompt wraps the advisor persona and retrieved context in the
//! Mistral instruction format. Generation goes through a local model
//! server; when none is reachable a deterministic Hindi template keeps
//! the service answering.

pub mod generator;
pub mod ollama;
pub mod prompt;

pub use generator::{fallback_answer, GeneratorBackend, NoopGenerator};
pub use ollama::OllamaGenerator;
pub use prompt::build_prompt;
