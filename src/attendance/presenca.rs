use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Attendance of one councilmember at one session.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Presenca {
    pub sessao_id: Uuid,
    pub vereador_id: Uuid,
    pub presente: bool,
    pub registrado_em: DateTime<Utc>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct RegistroPresenca {
    pub presente: bool,
}

/// Outcome of marking every missing councilmember absent.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct MarcacaoAusencias {
    pub sessao_id: Uuid,
    /// Councilmembers that received a new `presente = false` record
    pub marcados: Vec<Uuid>,
    /// Councilmembers whose existing record was left untouched
    pub preservados: usize,
    pub falhas: Vec<FalhaAusencia>,
}

impl MarcacaoAusencias {
    pub fn has_failures(&self) -> bool {
        !self.falhas.is_empty()
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FalhaAusencia {
    pub vereador_id: Uuid,
    pub erro: String,
}
