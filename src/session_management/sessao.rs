use crate::session_management::{SessaoStatus, TipoSessao};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Sessao {
    pub id: Uuid,
    pub titulo: String,
    pub descricao: String,
    /// Scheduled date of the session
    pub data: DateTime<Utc>,
    pub tipo: TipoSessao,
    pub status: SessaoStatus,
    pub camara_id: Uuid,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Payload for scheduling a session.
///
/// Every field is optional at the wire level so that a missing field is
/// reported as a validation error instead of a deserialization failure.
/// `tipo` stays a raw string for the same reason.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct NovaSessao {
    pub titulo: Option<String>,
    pub descricao: Option<String>,
    pub data: Option<DateTime<Utc>>,
    pub tipo: Option<String>,
    pub camara_id: Option<Uuid>,
}

/// Partial update of the editable fields of a session.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct SessaoUpdate {
    pub titulo: Option<String>,
    pub descricao: Option<String>,
    pub data: Option<DateTime<Utc>>,
    pub tipo: Option<String>,
}

/// Validated form of a `SessaoUpdate`, as handed to storage.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SessaoChanges {
    pub titulo: Option<String>,
    pub descricao: Option<String>,
    pub data: Option<DateTime<Utc>>,
    pub tipo: Option<TipoSessao>,
}

impl SessaoChanges {
    pub fn is_empty(&self) -> bool {
        self.titulo.is_none()
            && self.descricao.is_none()
            && self.data.is_none()
            && self.tipo.is_none()
    }

    /// Apply the changes on an in-memory copy of a session.
    pub fn apply_to(&self, sessao: &mut Sessao, at: DateTime<Utc>) {
        if let Some(ref titulo) = self.titulo {
            sessao.titulo = titulo.clone();
        }
        if let Some(ref descricao) = self.descricao {
            sessao.descricao = descricao.clone();
        }
        if let Some(data) = self.data {
            sessao.data = data;
        }
        if let Some(tipo) = self.tipo {
            sessao.tipo = tipo;
        }
        sessao.updated_at = at;
    }
}
