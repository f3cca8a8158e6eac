use std::sync::Arc;

use chrono::SubsecRound;
use log::{debug, info, warn};
use uuid::Uuid;

use crate::error_handling::types::WorkflowError;
use crate::session_management::sessao::{NovaSessao, Sessao, SessaoChanges, SessaoUpdate};
use crate::session_management::{AcaoSessao, SessaoStatus, TipoSessao};
use crate::storage::{timestamp, SessaoFilter, Storage};

/// Applies operator actions to legislative sessions.
///
/// Every transition is a conditional write on the stored status, so two
/// operators racing on the same session cannot both succeed. When the write
/// matches no row the session is read again to report why.
///
/// # Fields Overview
///
/// - `storage`: persistence handle shared with the other services
#[derive(Clone)]
pub struct SessionLifecycleManager {
    storage: Arc<dyn Storage>,
}

fn required(field: &str, value: Option<String>) -> Result<String, WorkflowError> {
    value.ok_or_else(|| WorkflowError::Validation(format!("{} is required", field)))
}

fn parse_tipo(raw: &str) -> Result<TipoSessao, WorkflowError> {
    raw.trim().parse::<TipoSessao>().map_err(WorkflowError::Validation)
}

fn non_blank_titulo(titulo: String) -> Result<String, WorkflowError> {
    let titulo = titulo.trim().to_string();
    if titulo.is_empty() {
        return Err(WorkflowError::Validation("titulo must not be blank".into()));
    }
    Ok(titulo)
}

impl SessionLifecycleManager {
    pub fn new(storage: Arc<dyn Storage>) -> Self {
        Self { storage }
    }

    /// Schedules a new session. The status is always `agendada`.
    pub async fn create(&self, nova: NovaSessao) -> Result<Sessao, WorkflowError> {
        let titulo = non_blank_titulo(required("titulo", nova.titulo)?)?;
        let descricao = required("descricao", nova.descricao)?;
        let data = nova
            .data
            .ok_or_else(|| WorkflowError::Validation("data is required".into()))?;
        let tipo = parse_tipo(&required("tipo", nova.tipo)?)?;
        let camara_id = nova
            .camara_id
            .ok_or_else(|| WorkflowError::Validation("camara_id is required".into()))?;

        if self.storage.get_camara(camara_id).await?.is_none() {
            return Err(WorkflowError::NotFound {
                entity: "camara",
                id: camara_id,
            });
        }

        let now = timestamp();
        let sessao = Sessao {
            id: Uuid::new_v4(),
            titulo,
            descricao,
            data: data.trunc_subsecs(6),
            tipo,
            status: SessaoStatus::Agendada,
            camara_id,
            created_at: now,
            updated_at: now,
        };
        self.storage.save_sessao(&sessao).await?;
        info!("Sessao {} scheduled for {} ({})", sessao.id, sessao.data, sessao.tipo);
        Ok(sessao)
    }

    pub async fn get(&self, id: Uuid) -> Result<Sessao, WorkflowError> {
        self.storage
            .get_sessao(id)
            .await?
            .ok_or(WorkflowError::NotFound { entity: "sessao", id })
    }

    pub async fn list(&self, filter: SessaoFilter) -> Result<Vec<Sessao>, WorkflowError> {
        Ok(self.storage.get_sessoes(Some(filter)).await?)
    }

    pub async fn iniciar(&self, id: Uuid) -> Result<Sessao, WorkflowError> {
        self.apply(id, AcaoSessao::Iniciar).await
    }

    pub async fn finalizar(&self, id: Uuid) -> Result<Sessao, WorkflowError> {
        self.apply(id, AcaoSessao::Finalizar).await
    }

    pub async fn cancelar(&self, id: Uuid) -> Result<Sessao, WorkflowError> {
        self.apply(id, AcaoSessao::Cancelar).await
    }

    async fn apply(&self, id: Uuid, acao: AcaoSessao) -> Result<Sessao, WorkflowError> {
        let at = timestamp();
        let applied = self
            .storage
            .transition_sessao(id, acao.origens(), acao.destino(), at)
            .await?;

        let sessao = self.get(id).await?;
        if !applied {
            warn!("Rejected {} on sessao {} in status {}", acao.nome(), id, sessao.status);
            return Err(WorkflowError::InvalidTransition {
                entity: "sessao",
                from: sessao.status.to_string(),
                action: acao.nome(),
            });
        }
        info!("Sessao {} -> {}", id, sessao.status);
        Ok(sessao)
    }

    /// Edits titulo, descricao, data or tipo of a session that is not terminal.
    pub async fn update(&self, id: Uuid, update: SessaoUpdate) -> Result<Sessao, WorkflowError> {
        let changes = SessaoChanges {
            titulo: update.titulo.map(non_blank_titulo).transpose()?,
            descricao: update.descricao,
            data: update.data.map(|d| d.trunc_subsecs(6)),
            tipo: update.tipo.as_deref().map(parse_tipo).transpose()?,
        };
        if changes.is_empty() {
            return Err(WorkflowError::Validation("update has no editable field".into()));
        }

        let applied = self
            .storage
            .update_sessao(id, &changes, &SessaoStatus::NAO_TERMINAIS, timestamp())
            .await?;
        let sessao = self.get(id).await?;
        if !applied {
            return Err(WorkflowError::InvalidState {
                entity: "sessao",
                id,
                status: sessao.status.to_string(),
            });
        }
        debug!("Sessao {} updated", id);
        Ok(sessao)
    }

    /// Deletes a session that is not terminal, along with its presenças and
    /// the projetos presented in it.
    pub async fn delete(&self, id: Uuid) -> Result<(), WorkflowError> {
        if self.storage.delete_sessao(id, &SessaoStatus::NAO_TERMINAIS).await? {
            info!("Sessao {} deleted", id);
            return Ok(());
        }
        let sessao = self.get(id).await?;
        Err(WorkflowError::InvalidTransition {
            entity: "sessao",
            from: sessao.status.to_string(),
            action: "excluir",
        })
    }
}
