use std::sync::Arc;

use log::{debug, info, warn};
use uuid::Uuid;

use crate::attendance::presenca::{FalhaAusencia, MarcacaoAusencias, Presenca};
use crate::error_handling::types::WorkflowError;
use crate::session_management::{Sessao, SessaoStatus};
use crate::storage::{timestamp, GuardedInsert, Storage};

/// Records who attended a session.
#[derive(Clone)]
pub struct AttendanceTracker {
    storage: Arc<dyn Storage>,
}

impl AttendanceTracker {
    pub fn new(storage: Arc<dyn Storage>) -> Self {
        Self { storage }
    }

    async fn open_sessao(&self, sessao_id: Uuid) -> Result<Sessao, WorkflowError> {
        let sessao = self
            .storage
            .get_sessao(sessao_id)
            .await?
            .ok_or(WorkflowError::NotFound {
                entity: "sessao",
                id: sessao_id,
            })?;
        if sessao.status.is_terminal() {
            return Err(closed(&sessao));
        }
        Ok(sessao)
    }

    /// Error for a write the storage refused because the session left the
    /// non-terminal statuses after it was read.
    async fn refused(&self, sessao_id: Uuid) -> WorkflowError {
        match self.storage.get_sessao(sessao_id).await {
            Ok(Some(sessao)) => {
                warn!("Sessao {} closed as {} during a write", sessao_id, sessao.status);
                closed(&sessao)
            }
            Ok(None) => WorkflowError::NotFound {
                entity: "sessao",
                id: sessao_id,
            },
            Err(e) => e.into(),
        }
    }

    /// Sets the attendance of one vereador. Repeating the call with the same
    /// value is a no-op; a different value replaces the previous one.
    pub async fn registrar_presenca(
        &self,
        sessao_id: Uuid,
        vereador_id: Uuid,
        presente: bool,
    ) -> Result<Presenca, WorkflowError> {
        let sessao = self.open_sessao(sessao_id).await?;
        let vereador = self
            .storage
            .get_vereador(vereador_id)
            .await?
            .ok_or(WorkflowError::NotFound {
                entity: "vereador",
                id: vereador_id,
            })?;
        if vereador.camara_id != sessao.camara_id {
            return Err(WorkflowError::Validation(format!(
                "vereador {} does not belong to the camara of sessao {}",
                vereador_id, sessao_id
            )));
        }

        let presenca = Presenca {
            sessao_id,
            vereador_id,
            presente,
            registrado_em: timestamp(),
        };
        if !self
            .storage
            .upsert_presenca(&presenca, &SessaoStatus::NAO_TERMINAIS)
            .await?
        {
            return Err(self.refused(sessao_id).await);
        }
        debug!("Presenca {}/{} = {}", sessao_id, vereador_id, presente);
        Ok(presenca)
    }

    pub async fn listar_presencas(&self, sessao_id: Uuid) -> Result<Vec<Presenca>, WorkflowError> {
        if self.storage.get_sessao(sessao_id).await?.is_none() {
            return Err(WorkflowError::NotFound {
                entity: "sessao",
                id: sessao_id,
            });
        }
        Ok(self.storage.get_presencas(sessao_id).await?)
    }

    /// Marks every active vereador without a record as absent.
    ///
    /// Existing records are never overwritten. A failure on one vereador is
    /// reported in the result and does not stop the others. If the session
    /// closes midway the batch stops with `InvalidState`; rows already written
    /// are kept.
    pub async fn marcar_todos_ausentes(
        &self,
        sessao_id: Uuid,
    ) -> Result<MarcacaoAusencias, WorkflowError> {
        let sessao = self.open_sessao(sessao_id).await?;
        if self.storage.get_camara(sessao.camara_id).await?.is_none() {
            return Err(WorkflowError::NotFound {
                entity: "camara",
                id: sessao.camara_id,
            });
        }

        let mut report = MarcacaoAusencias {
            sessao_id,
            ..Default::default()
        };
        let vereadores = self.storage.get_vereadores(sessao.camara_id).await?;
        for vereador in vereadores.into_iter().filter(|v| v.ativo) {
            let ausente = Presenca {
                sessao_id,
                vereador_id: vereador.id,
                presente: false,
                registrado_em: timestamp(),
            };
            let outcome = self
                .storage
                .insert_presenca_if_absent(&ausente, &SessaoStatus::NAO_TERMINAIS)
                .await;
            match outcome {
                Ok(GuardedInsert::Inserted) => report.marcados.push(vereador.id),
                Ok(GuardedInsert::Existing) => report.preservados += 1,
                Ok(GuardedInsert::Refused) => return Err(self.refused(sessao_id).await),
                Err(e) => {
                    warn!("Could not mark vereador {} absent: {}", vereador.id, e);
                    report.falhas.push(FalhaAusencia {
                        vereador_id: vereador.id,
                        erro: e.to_string(),
                    });
                }
            }
        }

        info!(
            "Sessao {}: {} marked absent, {} preserved, {} failed",
            sessao_id,
            report.marcados.len(),
            report.preservados,
            report.falhas.len()
        );
        Ok(report)
    }
}

fn closed(sessao: &Sessao) -> WorkflowError {
    WorkflowError::InvalidState {
        entity: "sessao",
        id: sessao.id,
        status: sessao.status.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::council::types::{Camara, Vereador};
    use crate::error_handling::types::StorageError;
    use crate::session_management::TipoSessao;
    use crate::storage::interleaved_storage::{Interleave, InterleavedStorage};
    use crate::storage::MemoryStorage;
    use tokio_test::{assert_err, assert_ok};

    struct Fixture {
        storage: Arc<dyn Storage>,
        tracker: AttendanceTracker,
        sessao_id: Uuid,
        camara_id: Uuid,
        vereadores: Vec<Uuid>,
    }

    async fn vereador(
        storage: &Arc<dyn Storage>,
        camara_id: Uuid,
        nome: &str,
        ativo: bool,
    ) -> Uuid {
        let v = Vereador {
            id: Uuid::new_v4(),
            camara_id,
            nome: nome.into(),
            partido: None,
            ativo,
            created_at: timestamp(),
        };
        storage.save_vereador(&v).await.unwrap();
        v.id
    }

    async fn fixture() -> Fixture {
        let storage: Arc<dyn Storage> = Arc::new(MemoryStorage::new());
        let camara = Camara {
            id: Uuid::new_v4(),
            nome: "Câmara".into(),
            cidade: "Caeté".into(),
            created_at: timestamp(),
        };
        storage.save_camara(&camara).await.unwrap();
        let mut vereadores = Vec::new();
        for nome in ["Ana", "Beto", "Caio"] {
            vereadores.push(vereador(&storage, camara.id, nome, true).await);
        }
        let now = timestamp();
        let sessao = Sessao {
            id: Uuid::new_v4(),
            titulo: "Ordinária".into(),
            descricao: "".into(),
            data: now,
            tipo: TipoSessao::Ordinaria,
            status: SessaoStatus::EmAndamento,
            camara_id: camara.id,
            created_at: now,
            updated_at: now,
        };
        storage.save_sessao(&sessao).await.unwrap();
        Fixture {
            tracker: AttendanceTracker::new(storage.clone()),
            storage,
            sessao_id: sessao.id,
            camara_id: camara.id,
            vereadores,
        }
    }

    #[tokio::test]
    async fn test_last_write_wins() {
        let f = fixture().await;
        let v = f.vereadores[0];
        assert_ok!(f.tracker.registrar_presenca(f.sessao_id, v, true).await);
        assert_ok!(f.tracker.registrar_presenca(f.sessao_id, v, false).await);

        let presencas = assert_ok!(f.tracker.listar_presencas(f.sessao_id).await);
        assert_eq!(presencas.len(), 1);
        assert!(!presencas[0].presente);
    }

    #[tokio::test]
    async fn test_registrar_is_idempotent() {
        let f = fixture().await;
        let v = f.vereadores[1];
        assert_ok!(f.tracker.registrar_presenca(f.sessao_id, v, true).await);
        assert_ok!(f.tracker.registrar_presenca(f.sessao_id, v, true).await);
        let presencas = assert_ok!(f.tracker.listar_presencas(f.sessao_id).await);
        assert_eq!(presencas.len(), 1);
        assert!(presencas[0].presente);
    }

    #[tokio::test]
    async fn test_marcar_todos_ausentes_preserves_existing() {
        let f = fixture().await;
        let inativo = vereador(&f.storage, f.camara_id, "Dora", false).await;
        assert_ok!(f.tracker.registrar_presenca(f.sessao_id, f.vereadores[0], true).await);

        let report = assert_ok!(f.tracker.marcar_todos_ausentes(f.sessao_id).await);
        assert_eq!(report.marcados.len(), 2);
        assert_eq!(report.preservados, 1);
        assert!(!report.has_failures());
        assert!(!report.marcados.contains(&inativo));

        let again = assert_ok!(f.tracker.marcar_todos_ausentes(f.sessao_id).await);
        assert!(again.marcados.is_empty());
        assert_eq!(again.preservados, 3);

        let presencas = assert_ok!(f.tracker.listar_presencas(f.sessao_id).await);
        assert_eq!(presencas.len(), 3);
        let ana = presencas.iter().find(|p| p.vereador_id == f.vereadores[0]).unwrap();
        assert!(ana.presente);
        assert_eq!(presencas.iter().filter(|p| !p.presente).count(), 2);
    }

    #[tokio::test]
    async fn test_terminal_session_rejects_writes() {
        let f = fixture().await;
        assert!(f
            .storage
            .transition_sessao(
                f.sessao_id,
                &[SessaoStatus::EmAndamento],
                SessaoStatus::Finalizada,
                timestamp(),
            )
            .await
            .unwrap());

        let err = assert_err!(
            f.tracker
                .registrar_presenca(f.sessao_id, f.vereadores[0], true)
                .await
        );
        assert_eq!(err.kind(), "invalid_state");
        let err = assert_err!(f.tracker.marcar_todos_ausentes(f.sessao_id).await);
        assert_eq!(err.kind(), "invalid_state");
        assert_ok!(f.tracker.listar_presencas(f.sessao_id).await);
    }

    #[tokio::test]
    async fn test_vereador_checks() {
        let f = fixture().await;
        let err = assert_err!(
            f.tracker
                .registrar_presenca(f.sessao_id, Uuid::new_v4(), true)
                .await
        );
        assert!(matches!(err, WorkflowError::NotFound { entity: "vereador", .. }));

        let outra = Camara {
            id: Uuid::new_v4(),
            nome: "Outra".into(),
            cidade: "Nova Lima".into(),
            created_at: timestamp(),
        };
        f.storage.save_camara(&outra).await.unwrap();
        let estranho = vereador(&f.storage, outra.id, "Edu", true).await;
        let err = assert_err!(f.tracker.registrar_presenca(f.sessao_id, estranho, true).await);
        assert_eq!(err.kind(), "validation");

        let err = assert_err!(f.tracker.listar_presencas(Uuid::new_v4()).await);
        assert_eq!(err.kind(), "not_found");
    }

    #[tokio::test]
    async fn test_presenca_racing_finalizar_is_refused() {
        let f = fixture().await;
        let racing: Arc<dyn Storage> = Arc::new(InterleavedStorage::new(
            f.storage.clone(),
            Interleave::FinalizeSessaoBeforePresenca,
        ));
        let tracker = AttendanceTracker::new(racing);

        let err = assert_err!(
            tracker
                .registrar_presenca(f.sessao_id, f.vereadores[0], true)
                .await
        );
        assert!(matches!(
            err,
            WorkflowError::InvalidState { ref status, .. } if status == "finalizada"
        ));
        assert!(assert_ok!(f.tracker.listar_presencas(f.sessao_id).await).is_empty());
    }

    #[tokio::test]
    async fn test_marcar_todos_ausentes_racing_finalizar_stops() {
        let f = fixture().await;
        let racing: Arc<dyn Storage> = Arc::new(InterleavedStorage::new(
            f.storage.clone(),
            Interleave::FinalizeSessaoBeforePresenca,
        ));
        let tracker = AttendanceTracker::new(racing);

        let err = assert_err!(tracker.marcar_todos_ausentes(f.sessao_id).await);
        assert_eq!(err.kind(), "invalid_state");
        assert!(assert_ok!(f.tracker.listar_presencas(f.sessao_id).await).is_empty());
    }

    #[tokio::test]
    async fn test_marcar_todos_ausentes_reports_row_failures() {
        let f = fixture().await;
        let quebrado = f.vereadores[1];
        let failing: Arc<dyn Storage> = Arc::new(InterleavedStorage::new(
            f.storage.clone(),
            Interleave::FailAbsenceOf(quebrado),
        ));
        let tracker = AttendanceTracker::new(failing);

        let report = assert_ok!(tracker.marcar_todos_ausentes(f.sessao_id).await);
        assert!(report.has_failures());
        assert_eq!(report.falhas.len(), 1);
        assert_eq!(report.falhas[0].vereador_id, quebrado);
        assert_eq!(
            report.falhas[0].erro,
            StorageError::WriteFailed("disk I/O error".into()).to_string()
        );
        assert_eq!(report.marcados.len(), 2);
        assert!(report.marcados.contains(&f.vereadores[0]));
        assert!(report.marcados.contains(&f.vereadores[2]));
        assert_eq!(report.preservados, 0);

        let presencas = assert_ok!(f.tracker.listar_presencas(f.sessao_id).await);
        assert_eq!(presencas.len(), 2);
        assert!(presencas.iter().all(|p| p.vereador_id != quebrado));
    }
}
