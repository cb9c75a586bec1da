//! Agri-Sarthi Core — error types and environment configuration.

pub mod config;
pub mod error;

pub use config::{DataPaths, RetrievalMode, SarthiConfig};
pub use error::{Error, Result};
