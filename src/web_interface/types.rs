use std::sync::Arc;

use serde::Serialize;

use crate::attendance::AttendanceTracker;
use crate::council::CouncilDirectory;
use crate::session_management::SessionLifecycleManager;
use crate::storage::Storage;
use crate::voting::VotingEngine;

/// API error payload
#[derive(Debug, Serialize)]
pub struct ApiError {
    /// Machine-readable kind (`validation`, `not_found`, ...)
    pub error: &'static str,
    pub message: String,
}

#[derive(Serialize)]
pub struct HealthResponse {
    pub status: &'static str,
    pub version: &'static str,
}

/// The services reachable from HTTP handlers, all sharing one storage handle.
#[derive(Clone)]
pub struct Services {
    pub camaras: CouncilDirectory,
    pub sessoes: SessionLifecycleManager,
    pub presencas: AttendanceTracker,
    pub votacao: VotingEngine,
}

impl Services {
    pub fn new(storage: Arc<dyn Storage>) -> Self {
        Self {
            camaras: CouncilDirectory::new(storage.clone()),
            sessoes: SessionLifecycleManager::new(storage.clone()),
            presencas: AttendanceTracker::new(storage.clone()),
            votacao: VotingEngine::new(storage),
        }
    }
}
