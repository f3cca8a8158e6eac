//! Session lifecycle core module.
//!
//! This module provides the status and type enums of a legislative session,
//! the session data structures, and the manager applying state transitions.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Submodule for session data structures.
pub mod sessao;
/// Submodule for the lifecycle manager implementation.
pub mod session_manager;

pub use sessao::{NovaSessao, Sessao, SessaoChanges, SessaoUpdate};
pub use session_manager::SessionLifecycleManager;

/// Represents the current status of a session.
///
/// Variants:
/// - `Agendada`: scheduled, the initial status.
/// - `EmAndamento`: the session is being held.
/// - `Finalizada`: the session ended normally. Terminal.
/// - `Cancelada`: the session was called off. Terminal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SessaoStatus {
    Agendada,
    EmAndamento,
    Finalizada,
    Cancelada,
}

impl SessaoStatus {
    /// Statuses from which a session may still change.
    pub const NAO_TERMINAIS: [SessaoStatus; 2] =
        [SessaoStatus::Agendada, SessaoStatus::EmAndamento];

    pub fn as_str(&self) -> &'static str {
        match self {
            SessaoStatus::Agendada => "agendada",
            SessaoStatus::EmAndamento => "em_andamento",
            SessaoStatus::Finalizada => "finalizada",
            SessaoStatus::Cancelada => "cancelada",
        }
    }

    pub fn is_terminal(&self) -> bool {
        matches!(self, SessaoStatus::Finalizada | SessaoStatus::Cancelada)
    }
}

impl fmt::Display for SessaoStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for SessaoStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "agendada" => Ok(SessaoStatus::Agendada),
            "em_andamento" => Ok(SessaoStatus::EmAndamento),
            "finalizada" => Ok(SessaoStatus::Finalizada),
            "cancelada" => Ok(SessaoStatus::Cancelada),
            other => Err(format!("unknown session status '{}'", other)),
        }
    }
}

/// Kind of legislative session.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TipoSessao {
    Ordinaria,
    Extraordinaria,
    Solene,
    Especial,
    InstalacaoLegislatura,
    Secreta,
    Comunitaria,
}

impl TipoSessao {
    pub fn as_str(&self) -> &'static str {
        match self {
            TipoSessao::Ordinaria => "ordinaria",
            TipoSessao::Extraordinaria => "extraordinaria",
            TipoSessao::Solene => "solene",
            TipoSessao::Especial => "especial",
            TipoSessao::InstalacaoLegislatura => "instalacao_legislatura",
            TipoSessao::Secreta => "secreta",
            TipoSessao::Comunitaria => "comunitaria",
        }
    }
}

impl fmt::Display for TipoSessao {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for TipoSessao {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "ordinaria" => Ok(TipoSessao::Ordinaria),
            "extraordinaria" => Ok(TipoSessao::Extraordinaria),
            "solene" => Ok(TipoSessao::Solene),
            "especial" => Ok(TipoSessao::Especial),
            "instalacao_legislatura" => Ok(TipoSessao::InstalacaoLegislatura),
            "secreta" => Ok(TipoSessao::Secreta),
            "comunitaria" => Ok(TipoSessao::Comunitaria),
            other => Err(format!("unknown session type '{}'", other)),
        }
    }
}

/// Operator actions that move a session between statuses.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AcaoSessao {
    Iniciar,
    Finalizar,
    Cancelar,
}

impl AcaoSessao {
    pub fn nome(&self) -> &'static str {
        match self {
            AcaoSessao::Iniciar => "iniciar",
            AcaoSessao::Finalizar => "finalizar",
            AcaoSessao::Cancelar => "cancelar",
        }
    }

    /// Statuses the action may start from.
    pub fn origens(&self) -> &'static [SessaoStatus] {
        match self {
            AcaoSessao::Iniciar => &[SessaoStatus::Agendada],
            AcaoSessao::Finalizar => &[SessaoStatus::EmAndamento],
            AcaoSessao::Cancelar => &SessaoStatus::NAO_TERMINAIS,
        }
    }

    pub fn destino(&self) -> SessaoStatus {
        match self {
            AcaoSessao::Iniciar => SessaoStatus::EmAndamento,
            AcaoSessao::Finalizar => SessaoStatus::Finalizada,
            AcaoSessao::Cancelar => SessaoStatus::Cancelada,
        }
    }

    pub fn permitida(&self, atual: SessaoStatus) -> bool {
        self.origens().contains(&atual)
    }
}
