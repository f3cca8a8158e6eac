//! Storage Trait
//!
//! This module defines the `Storage` trait, the persistence collaborator used by
//! the council registry, the session lifecycle manager, the attendance tracker
//! and the voting engine.
//!
//! Implementors of this trait are responsible for:
//! - Persisting and retrieving câmaras, vereadores, sessões, presenças, projetos and votos
//! - Applying status transitions atomically (compare-and-swap on the stored status)
//! - Enforcing the (sessao, vereador) and (projeto, vereador) keys
//! - Refusing presença and voto writes once the parent sessão or projeto is closed
//! - Cascading deletes from a câmara or a sessão to the rows that belong to it
//!
//! Every method is a single logical statement. All methods return a `Result`
//! to handle potential storage errors.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use uuid::Uuid;

use crate::attendance::presenca::Presenca;
use crate::council::types::{Camara, Vereador};
use crate::error_handling::types::StorageError;
use crate::session_management::{Sessao, SessaoChanges, SessaoStatus};
use crate::storage::types::{GuardedInsert, ProjetoFilter, SessaoFilter};
use crate::voting::types::{Projeto, ProjetoStatus, Voto};

#[async_trait]
pub trait Storage: Send + Sync {
    async fn save_camara(&self, camara: &Camara) -> Result<(), StorageError>;

    async fn get_camara(&self, id: Uuid) -> Result<Option<Camara>, StorageError>;

    /// Deletes a câmara and everything it owns. Returns `false` when no row matched.
    async fn delete_camara(&self, id: Uuid) -> Result<bool, StorageError>;

    async fn save_vereador(&self, vereador: &Vereador) -> Result<(), StorageError>;

    async fn get_vereador(&self, id: Uuid) -> Result<Option<Vereador>, StorageError>;

    async fn get_vereadores(&self, camara_id: Uuid) -> Result<Vec<Vereador>, StorageError>;

    /// Inserts a new session. Fails with `UniqueViolation` if the id exists.
    async fn save_sessao(&self, sessao: &Sessao) -> Result<(), StorageError>;

    async fn get_sessao(&self, id: Uuid) -> Result<Option<Sessao>, StorageError>;

    /// Retrieves sessions, optionally filtered, ordered by scheduled date.
    async fn get_sessoes(&self, filter: Option<SessaoFilter>) -> Result<Vec<Sessao>, StorageError>;

    /// Applies `changes` only if the stored status is one of `guard`.
    ///
    /// Returns `false` when no row matched (missing id or status outside the guard).
    async fn update_sessao(
        &self,
        id: Uuid,
        changes: &SessaoChanges,
        guard: &[SessaoStatus],
        at: DateTime<Utc>,
    ) -> Result<bool, StorageError>;

    /// Sets the status to `to` only if the stored status is one of `from`.
    async fn transition_sessao(
        &self,
        id: Uuid,
        from: &[SessaoStatus],
        to: SessaoStatus,
        at: DateTime<Utc>,
    ) -> Result<bool, StorageError>;

    /// Deletes the session only if its status is one of `guard`, cascading to
    /// its presenças and to the projetos presented in it (with their votos).
    async fn delete_sessao(&self, id: Uuid, guard: &[SessaoStatus]) -> Result<bool, StorageError>;

    /// Inserts or replaces the record for (sessao_id, vereador_id) while the
    /// session's status is one of `guard`.
    ///
    /// Returns `false` when the session is missing or outside the guard.
    /// Conflict policy: last write wins. Implementations update first and
    /// insert when nothing was updated; if a concurrent insert wins the key
    /// in between, the update is applied again.
    async fn upsert_presenca(
        &self,
        presenca: &Presenca,
        guard: &[SessaoStatus],
    ) -> Result<bool, StorageError>;

    /// Inserts the record only if none exists for the key and the session's
    /// status is one of `guard`. The status check and the insert are atomic.
    async fn insert_presenca_if_absent(
        &self,
        presenca: &Presenca,
        guard: &[SessaoStatus],
    ) -> Result<GuardedInsert, StorageError>;

    async fn get_presencas(&self, sessao_id: Uuid) -> Result<Vec<Presenca>, StorageError>;

    async fn save_projeto(&self, projeto: &Projeto) -> Result<(), StorageError>;

    async fn get_projeto(&self, id: Uuid) -> Result<Option<Projeto>, StorageError>;

    async fn get_projetos(
        &self,
        filter: Option<ProjetoFilter>,
    ) -> Result<Vec<Projeto>, StorageError>;

    /// Sets the status to `to` only if the stored status is one of `from`.
    async fn transition_projeto(
        &self,
        id: Uuid,
        from: &[ProjetoStatus],
        to: ProjetoStatus,
        at: DateTime<Utc>,
    ) -> Result<bool, StorageError>;

    /// Inserts a vote while the projeto's status is one of `guard`.
    ///
    /// Returns `false` when the projeto is missing or outside the guard. A
    /// second vote for the same (projeto_id, vereador_id) fails with
    /// `StorageError::UniqueViolation`.
    async fn save_voto(&self, voto: &Voto, guard: &[ProjetoStatus]) -> Result<bool, StorageError>;

    async fn get_voto(
        &self,
        projeto_id: Uuid,
        vereador_id: Uuid,
    ) -> Result<Option<Voto>, StorageError>;

    async fn get_votos(&self, projeto_id: Uuid) -> Result<Vec<Voto>, StorageError>;
}
