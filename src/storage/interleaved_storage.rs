//! Storage wrapper for tests that need another writer to act between a
//! service's read and its write.

use std::sync::Arc;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use uuid::Uuid;

use crate::attendance::presenca::Presenca;
use crate::council::types::{Camara, Vereador};
use crate::error_handling::types::StorageError;
use crate::session_management::{Sessao, SessaoChanges, SessaoStatus};
use crate::storage::storage_trait::Storage;
use crate::storage::timestamp;
use crate::storage::types::{GuardedInsert, ProjetoFilter, SessaoFilter};
use crate::voting::types::{Projeto, ProjetoStatus, Voto};

/// What happens right before the wrapped call reaches the inner storage.
#[derive(Debug, Clone)]
pub enum Interleave {
    /// `save_voto` finds its projeto already closed as `rejeitado`.
    CloseProjetoBeforeVote,
    /// Presença writes find their session already `finalizada`.
    FinalizeSessaoBeforePresenca,
    /// `insert_presenca_if_absent` fails for this vereador.
    FailAbsenceOf(Uuid),
    /// This vote is stored just before the projeto leaves `em_votacao`.
    VoteBeforeClose(Voto),
}

pub struct InterleavedStorage {
    inner: Arc<dyn Storage>,
    interleave: Interleave,
}

impl InterleavedStorage {
    pub fn new(inner: Arc<dyn Storage>, interleave: Interleave) -> Self {
        Self { inner, interleave }
    }

    async fn before_presenca(&self, presenca: &Presenca) -> Result<(), StorageError> {
        if let Interleave::FinalizeSessaoBeforePresenca = self.interleave {
            self.inner
                .transition_sessao(
                    presenca.sessao_id,
                    &SessaoStatus::NAO_TERMINAIS,
                    SessaoStatus::Finalizada,
                    timestamp(),
                )
                .await?;
        }
        Ok(())
    }
}

#[async_trait]
impl Storage for InterleavedStorage {
    async fn save_camara(&self, camara: &Camara) -> Result<(), StorageError> {
        self.inner.save_camara(camara).await
    }

    async fn get_camara(&self, id: Uuid) -> Result<Option<Camara>, StorageError> {
        self.inner.get_camara(id).await
    }

    async fn delete_camara(&self, id: Uuid) -> Result<bool, StorageError> {
        self.inner.delete_camara(id).await
    }

    async fn save_vereador(&self, vereador: &Vereador) -> Result<(), StorageError> {
        self.inner.save_vereador(vereador).await
    }

    async fn get_vereador(&self, id: Uuid) -> Result<Option<Vereador>, StorageError> {
        self.inner.get_vereador(id).await
    }

    async fn get_vereadores(&self, camara_id: Uuid) -> Result<Vec<Vereador>, StorageError> {
        self.inner.get_vereadores(camara_id).await
    }

    async fn save_sessao(&self, sessao: &Sessao) -> Result<(), StorageError> {
        self.inner.save_sessao(sessao).await
    }

    async fn get_sessao(&self, id: Uuid) -> Result<Option<Sessao>, StorageError> {
        self.inner.get_sessao(id).await
    }

    async fn get_sessoes(&self, filter: Option<SessaoFilter>) -> Result<Vec<Sessao>, StorageError> {
        self.inner.get_sessoes(filter).await
    }

    async fn update_sessao(
        &self,
        id: Uuid,
        changes: &SessaoChanges,
        guard: &[SessaoStatus],
        at: DateTime<Utc>,
    ) -> Result<bool, StorageError> {
        self.inner.update_sessao(id, changes, guard, at).await
    }

    async fn transition_sessao(
        &self,
        id: Uuid,
        from: &[SessaoStatus],
        to: SessaoStatus,
        at: DateTime<Utc>,
    ) -> Result<bool, StorageError> {
        self.inner.transition_sessao(id, from, to, at).await
    }

    async fn delete_sessao(&self, id: Uuid, guard: &[SessaoStatus]) -> Result<bool, StorageError> {
        self.inner.delete_sessao(id, guard).await
    }

    async fn upsert_presenca(
        &self,
        presenca: &Presenca,
        guard: &[SessaoStatus],
    ) -> Result<bool, StorageError> {
        self.before_presenca(presenca).await?;
        self.inner.upsert_presenca(presenca, guard).await
    }

    async fn insert_presenca_if_absent(
        &self,
        presenca: &Presenca,
        guard: &[SessaoStatus],
    ) -> Result<GuardedInsert, StorageError> {
        if let Interleave::FailAbsenceOf(vereador_id) = self.interleave {
            if vereador_id == presenca.vereador_id {
                return Err(StorageError::WriteFailed("disk I/O error".into()));
            }
        }
        self.before_presenca(presenca).await?;
        self.inner.insert_presenca_if_absent(presenca, guard).await
    }

    async fn get_presencas(&self, sessao_id: Uuid) -> Result<Vec<Presenca>, StorageError> {
        self.inner.get_presencas(sessao_id).await
    }

    async fn save_projeto(&self, projeto: &Projeto) -> Result<(), StorageError> {
        self.inner.save_projeto(projeto).await
    }

    async fn get_projeto(&self, id: Uuid) -> Result<Option<Projeto>, StorageError> {
        self.inner.get_projeto(id).await
    }

    async fn get_projetos(
        &self,
        filter: Option<ProjetoFilter>,
    ) -> Result<Vec<Projeto>, StorageError> {
        self.inner.get_projetos(filter).await
    }

    async fn transition_projeto(
        &self,
        id: Uuid,
        from: &[ProjetoStatus],
        to: ProjetoStatus,
        at: DateTime<Utc>,
    ) -> Result<bool, StorageError> {
        if let Interleave::VoteBeforeClose(voto) = &self.interleave {
            if voto.projeto_id == id && from.contains(&ProjetoStatus::EmVotacao) {
                self.inner.save_voto(voto, &ProjetoStatus::ABERTOS).await?;
            }
        }
        self.inner.transition_projeto(id, from, to, at).await
    }

    async fn save_voto(&self, voto: &Voto, guard: &[ProjetoStatus]) -> Result<bool, StorageError> {
        if let Interleave::CloseProjetoBeforeVote = self.interleave {
            self.inner
                .transition_projeto(
                    voto.projeto_id,
                    &[ProjetoStatus::EmVotacao],
                    ProjetoStatus::Rejeitado,
                    timestamp(),
                )
                .await?;
        }
        self.inner.save_voto(voto, guard).await
    }

    async fn get_voto(
        &self,
        projeto_id: Uuid,
        vereador_id: Uuid,
    ) -> Result<Option<Voto>, StorageError> {
        self.inner.get_voto(projeto_id, vereador_id).await
    }

    async fn get_votos(&self, projeto_id: Uuid) -> Result<Vec<Voto>, StorageError> {
        self.inner.get_votos(projeto_id).await
    }
}
