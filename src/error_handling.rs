//! Error types shared by every layer of the crate.

pub mod types;

pub use types::{ConfigError, ControllerError, StorageError, WebError, WorkflowError};
