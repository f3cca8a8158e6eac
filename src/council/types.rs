use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// A municipal council, the tenant owning sessions, projects and members.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Camara {
    pub id: Uuid,
    pub nome: String,
    pub cidade: String,
    pub created_at: DateTime<Utc>,
}

/// A councilmember. Only active members are picked up by bulk attendance.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Vereador {
    pub id: Uuid,
    pub camara_id: Uuid,
    pub nome: String,
    pub partido: Option<String>,
    pub ativo: bool,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct NovaCamara {
    #[serde(default)]
    pub nome: String,
    #[serde(default)]
    pub cidade: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct NovoVereador {
    #[serde(default)]
    pub nome: String,
    pub partido: Option<String>,
    #[serde(default = "default_ativo")]
    pub ativo: bool,
}

fn default_ativo() -> bool {
    true
}
