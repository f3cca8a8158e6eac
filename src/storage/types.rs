use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::session_management::{Sessao, SessaoStatus, TipoSessao};
use crate::voting::types::{Projeto, ProjetoStatus};

/// Outcome of an insert that only goes through while the parent row
/// (the sessão of a presença, the projeto of a voto) has an allowed status.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GuardedInsert {
    Inserted,
    /// A row already exists for the key and was left untouched
    Existing,
    /// The parent row is missing or its status is outside the guard
    Refused,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SessaoFilter {
    pub camara_id: Option<Uuid>,
    pub status: Option<SessaoStatus>,
    pub tipo: Option<TipoSessao>,
    /// Sessions scheduled at or after this instant
    pub data_de: Option<DateTime<Utc>>,
    /// Sessions scheduled at or before this instant
    pub data_ate: Option<DateTime<Utc>>,
}

impl SessaoFilter {
    pub fn by_camara(camara_id: Uuid) -> Self {
        SessaoFilter {
            camara_id: Some(camara_id),
            ..Default::default()
        }
    }

    pub fn matches(&self, sessao: &Sessao) -> bool {
        if let Some(camara_id) = self.camara_id {
            if sessao.camara_id != camara_id {
                return false;
            }
        }
        if let Some(status) = self.status {
            if sessao.status != status {
                return false;
            }
        }
        if let Some(tipo) = self.tipo {
            if sessao.tipo != tipo {
                return false;
            }
        }
        if let Some(de) = self.data_de {
            if sessao.data < de {
                return false;
            }
        }
        if let Some(ate) = self.data_ate {
            if sessao.data > ate {
                return false;
            }
        }
        true
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ProjetoFilter {
    pub camara_id: Option<Uuid>,
    pub sessao_id: Option<Uuid>,
    pub status: Option<ProjetoStatus>,
}

impl ProjetoFilter {
    pub fn by_sessao(sessao_id: Uuid) -> Self {
        ProjetoFilter {
            sessao_id: Some(sessao_id),
            ..Default::default()
        }
    }

    pub fn matches(&self, projeto: &Projeto) -> bool {
        if let Some(camara_id) = self.camara_id {
            if projeto.camara_id != camara_id {
                return false;
            }
        }
        if let Some(sessao_id) = self.sessao_id {
            if projeto.sessao_id != Some(sessao_id) {
                return false;
            }
        }
        if let Some(status) = self.status {
            if projeto.status != status {
                return false;
            }
        }
        true
    }
}
