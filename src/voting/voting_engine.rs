use std::sync::Arc;

use chrono::SubsecRound;
use log::{debug, info, warn};
use uuid::Uuid;

use crate::error_handling::types::{StorageError, WorkflowError};
use crate::storage::{timestamp, ProjetoFilter, Storage};
use crate::voting::types::{
    Apuracao, NovoProjeto, Projeto, ProjetoStatus, ResultadoVotacao, Voto, VotoValor,
};

/// Runs the voting state machine of projetos.
///
/// Vote uniqueness is left to the storage key on (projeto, vereador), and the
/// `em_votacao` gate is re-checked by storage in the same step as the insert.
/// The lookups before the insert only produce the nicer error in the common case.
#[derive(Clone)]
pub struct VotingEngine {
    storage: Arc<dyn Storage>,
}

fn not_found(id: Uuid) -> WorkflowError {
    WorkflowError::NotFound { entity: "projeto", id }
}

fn voting_closed(projeto: &Projeto) -> WorkflowError {
    WorkflowError::VotingClosed {
        projeto_id: projeto.id,
        status: projeto.status.to_string(),
    }
}

fn required_text(field: &str, value: Option<String>) -> Result<String, WorkflowError> {
    let value = value.map(|v| v.trim().to_string()).unwrap_or_default();
    if value.is_empty() {
        return Err(WorkflowError::Validation(format!("{} is required", field)));
    }
    Ok(value)
}

impl VotingEngine {
    pub fn new(storage: Arc<dyn Storage>) -> Self {
        Self { storage }
    }

    /// Registers a projeto in status `apresentado`.
    pub async fn apresentar(&self, novo: NovoProjeto) -> Result<Projeto, WorkflowError> {
        let titulo = required_text("titulo", novo.titulo)?;
        let autor = required_text("autor", novo.autor)?;
        let camara_id = novo
            .camara_id
            .ok_or_else(|| WorkflowError::Validation("camara_id is required".into()))?;

        if self.storage.get_camara(camara_id).await?.is_none() {
            return Err(WorkflowError::NotFound {
                entity: "camara",
                id: camara_id,
            });
        }
        if let Some(sessao_id) = novo.sessao_id {
            let sessao = self
                .storage
                .get_sessao(sessao_id)
                .await?
                .ok_or(WorkflowError::NotFound {
                    entity: "sessao",
                    id: sessao_id,
                })?;
            if sessao.camara_id != camara_id {
                return Err(WorkflowError::Validation(format!(
                    "sessao {} belongs to another camara",
                    sessao_id
                )));
            }
        }

        let now = timestamp();
        let projeto = Projeto {
            id: Uuid::new_v4(),
            titulo,
            descricao: novo.descricao.unwrap_or_default(),
            autor,
            sessao_id: novo.sessao_id,
            camara_id,
            status: ProjetoStatus::Apresentado,
            data_apresentacao: novo
                .data_apresentacao
                .map(|d| d.trunc_subsecs(6))
                .unwrap_or(now),
            created_at: now,
            updated_at: now,
        };
        self.storage.save_projeto(&projeto).await?;
        info!("Projeto {} presented by {}", projeto.id, projeto.autor);
        Ok(projeto)
    }

    pub async fn get_projeto(&self, id: Uuid) -> Result<Projeto, WorkflowError> {
        self.storage.get_projeto(id).await?.ok_or_else(|| not_found(id))
    }

    pub async fn list_projetos(
        &self,
        filter: ProjetoFilter,
    ) -> Result<Vec<Projeto>, WorkflowError> {
        Ok(self.storage.get_projetos(Some(filter)).await?)
    }

    pub async fn listar_votos(&self, projeto_id: Uuid) -> Result<Vec<Voto>, WorkflowError> {
        self.get_projeto(projeto_id).await?;
        Ok(self.storage.get_votos(projeto_id).await?)
    }

    /// Opens the projeto for voting.
    pub async fn iniciar_votacao(&self, id: Uuid) -> Result<Projeto, WorkflowError> {
        let applied = self
            .storage
            .transition_projeto(
                id,
                &[ProjetoStatus::Apresentado],
                ProjetoStatus::EmVotacao,
                timestamp(),
            )
            .await?;
        let projeto = self.get_projeto(id).await?;
        if !applied {
            return Err(WorkflowError::InvalidTransition {
                entity: "projeto",
                from: projeto.status.to_string(),
                action: "iniciar_votacao",
            });
        }
        info!("Voting opened on projeto {}", id);
        Ok(projeto)
    }

    /// Casts the vote of one vereador. Votes are final.
    pub async fn votar(
        &self,
        projeto_id: Uuid,
        vereador_id: Uuid,
        voto: &str,
    ) -> Result<Voto, WorkflowError> {
        let projeto = self.get_projeto(projeto_id).await?;
        if !projeto.status.aceita_votos() {
            return Err(voting_closed(&projeto));
        }

        let vereador = self
            .storage
            .get_vereador(vereador_id)
            .await?
            .ok_or(WorkflowError::NotFound {
                entity: "vereador",
                id: vereador_id,
            })?;
        if vereador.camara_id != projeto.camara_id {
            return Err(WorkflowError::Validation(format!(
                "vereador {} does not belong to the camara of projeto {}",
                vereador_id, projeto_id
            )));
        }

        if self.storage.get_voto(projeto_id, vereador_id).await?.is_some() {
            return Err(WorkflowError::DuplicateVote {
                projeto_id,
                vereador_id,
            });
        }

        let valor = voto.parse::<VotoValor>().map_err(WorkflowError::Validation)?;
        let voto = Voto {
            projeto_id,
            vereador_id,
            voto: valor,
            registrado_em: timestamp(),
        };
        match self.storage.save_voto(&voto, &ProjetoStatus::ABERTOS).await {
            Ok(true) => {}
            Ok(false) => {
                let projeto = self.get_projeto(projeto_id).await?;
                warn!(
                    "Vote by {} arrived after projeto {} closed as {}",
                    vereador_id, projeto_id, projeto.status
                );
                return Err(voting_closed(&projeto));
            }
            Err(StorageError::UniqueViolation) => {
                warn!(
                    "Concurrent duplicate vote by {} on projeto {}",
                    vereador_id, projeto_id
                );
                return Err(WorkflowError::DuplicateVote {
                    projeto_id,
                    vereador_id,
                });
            }
            Err(e) => return Err(e.into()),
        }
        debug!(
            "Vereador {} voted {} on projeto {}",
            vereador_id, valor, projeto_id
        );
        Ok(voto)
    }

    /// Current tally. Available in every status.
    pub async fn contar_votos(&self, projeto_id: Uuid) -> Result<Apuracao, WorkflowError> {
        let votos = self.listar_votos(projeto_id).await?;
        Ok(Apuracao::from_votos(&votos))
    }

    /// Closes the voting and records the outcome.
    pub async fn finalizar_votacao(&self, id: Uuid) -> Result<ResultadoVotacao, WorkflowError> {
        let projeto = self.get_projeto(id).await?;
        if projeto.status != ProjetoStatus::EmVotacao {
            return Err(WorkflowError::InvalidTransition {
                entity: "projeto",
                from: projeto.status.to_string(),
                action: "finalizar_votacao",
            });
        }

        let apuracao = Apuracao::from_votos(&self.storage.get_votos(id).await?);
        let resultado = apuracao.resultado();
        let applied = self
            .storage
            .transition_projeto(id, &[ProjetoStatus::EmVotacao], resultado, timestamp())
            .await?;
        if !applied {
            let projeto = self.get_projeto(id).await?;
            return Err(WorkflowError::InvalidTransition {
                entity: "projeto",
                from: projeto.status.to_string(),
                action: "finalizar_votacao",
            });
        }

        // No vote lands after the close, so this count is final. It differs
        // only when a vote committed between the first count and the close.
        let apuracao = Apuracao::from_votos(&self.storage.get_votos(id).await?);
        if apuracao.resultado() != resultado {
            warn!(
                "Projeto {} received votes while closing, outcome revised to {}",
                id,
                apuracao.resultado()
            );
            self.storage
                .transition_projeto(id, &[resultado], apuracao.resultado(), timestamp())
                .await?;
        }
        let projeto = self.get_projeto(id).await?;

        info!(
            "Projeto {} {} (sim {}, nao {}, abstencao {})",
            id, projeto.status, apuracao.sim, apuracao.nao, apuracao.abstencao
        );
        Ok(ResultadoVotacao { projeto, apuracao })
    }
}
