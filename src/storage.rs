//! Storage subsystem
//!
//! This module provides abstractions and implementations for persisting
//! câmaras, vereadores, sessões, presenças, projetos and votos.
//!
//! Components:
//! - `storage_trait`: the Storage trait defining a uniform API.
//! - `types`: query filters and write outcomes shared by storage backends.
//! - `database_storage`: SQLite implementation using SeaORM.
//! - `memory_storage`: process-local implementation for tests and throwaway runs.
//! - `db_entities`: SeaORM entity models for the database backend.

use chrono::{DateTime, SubsecRound, Utc};

pub mod database_storage;
pub mod db_entities;
#[cfg(test)]
pub(crate) mod interleaved_storage;
pub mod memory_storage;
pub mod storage_trait;
pub mod types;

pub use database_storage::DatabaseStorage;
pub use memory_storage::MemoryStorage;
pub use storage_trait::Storage;
pub use types::{GuardedInsert, ProjetoFilter, SessaoFilter};

/// Current time at the precision kept by the storage backends (microseconds).
pub fn timestamp() -> DateTime<Utc> {
    Utc::now().trunc_subsecs(6)
}
