use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use uuid::Uuid;

/// Voting status of a projeto.
///
/// `apresentado --iniciar_votacao--> em_votacao --finalizar_votacao--> aprovado | rejeitado`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ProjetoStatus {
    Apresentado,
    EmVotacao,
    Aprovado,
    Rejeitado,
}

impl ProjetoStatus {
    /// Statuses in which votes are admitted.
    pub const ABERTOS: [ProjetoStatus; 1] = [ProjetoStatus::EmVotacao];

    pub fn as_str(&self) -> &'static str {
        match self {
            ProjetoStatus::Apresentado => "apresentado",
            ProjetoStatus::EmVotacao => "em_votacao",
            ProjetoStatus::Aprovado => "aprovado",
            ProjetoStatus::Rejeitado => "rejeitado",
        }
    }

    pub fn is_terminal(&self) -> bool {
        matches!(self, ProjetoStatus::Aprovado | ProjetoStatus::Rejeitado)
    }

    pub fn aceita_votos(&self) -> bool {
        ProjetoStatus::ABERTOS.contains(self)
    }
}

impl fmt::Display for ProjetoStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ProjetoStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "apresentado" => Ok(ProjetoStatus::Apresentado),
            "em_votacao" => Ok(ProjetoStatus::EmVotacao),
            "aprovado" => Ok(ProjetoStatus::Aprovado),
            "rejeitado" => Ok(ProjetoStatus::Rejeitado),
            other => Err(format!("unknown projeto status '{}'", other)),
        }
    }
}

/// A single vote value. Stored and serialized as ASCII labels; the accented
/// spellings are accepted on input.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum VotoValor {
    #[serde(rename = "sim")]
    Sim,
    #[serde(rename = "nao", alias = "não")]
    Nao,
    #[serde(rename = "abstencao", alias = "abstenção")]
    Abstencao,
}

impl VotoValor {
    pub fn as_str(&self) -> &'static str {
        match self {
            VotoValor::Sim => "sim",
            VotoValor::Nao => "nao",
            VotoValor::Abstencao => "abstencao",
        }
    }
}

impl fmt::Display for VotoValor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for VotoValor {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "sim" => Ok(VotoValor::Sim),
            "nao" | "não" => Ok(VotoValor::Nao),
            "abstencao" | "abstenção" => Ok(VotoValor::Abstencao),
            other => Err(format!("unknown vote value '{}'", other)),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Projeto {
    pub id: Uuid,
    pub titulo: String,
    pub descricao: String,
    pub autor: String,
    pub sessao_id: Option<Uuid>,
    pub camara_id: Uuid,
    pub status: ProjetoStatus,
    pub data_apresentacao: DateTime<Utc>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct NovoProjeto {
    pub titulo: Option<String>,
    pub descricao: Option<String>,
    pub autor: Option<String>,
    pub sessao_id: Option<Uuid>,
    pub camara_id: Option<Uuid>,
    pub data_apresentacao: Option<DateTime<Utc>>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Voto {
    pub projeto_id: Uuid,
    pub vereador_id: Uuid,
    pub voto: VotoValor,
    pub registrado_em: DateTime<Utc>,
}

/// Raw vote submission. `voto` stays a string so an unknown label is a
/// validation error rather than a body rejection.
#[derive(Debug, Clone, Deserialize)]
pub struct NovoVoto {
    pub vereador_id: Uuid,
    pub voto: String,
}

/// Vote counts of a projeto.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Apuracao {
    pub sim: u32,
    pub nao: u32,
    pub abstencao: u32,
    /// Distinct voters
    pub total: u32,
}

impl Apuracao {
    pub fn from_votos(votos: &[Voto]) -> Self {
        let mut apuracao = Apuracao::default();
        for voto in votos {
            match voto.voto {
                VotoValor::Sim => apuracao.sim += 1,
                VotoValor::Nao => apuracao.nao += 1,
                VotoValor::Abstencao => apuracao.abstencao += 1,
            }
            apuracao.total += 1;
        }
        apuracao
    }

    /// Simple majority of the votes cast: approved only when `sim` strictly
    /// outnumbers `nao`. Ties reject; abstentions count for neither side.
    pub fn resultado(&self) -> ProjetoStatus {
        if self.sim > self.nao {
            ProjetoStatus::Aprovado
        } else {
            ProjetoStatus::Rejeitado
        }
    }
}

/// Final status of a projeto together with the tally that produced it.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ResultadoVotacao {
    pub projeto: Projeto,
    pub apuracao: Apuracao,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn voto(valor: VotoValor) -> Voto {
        Voto {
            projeto_id: Uuid::nil(),
            vereador_id: Uuid::new_v4(),
            voto: valor,
            registrado_em: Utc::now(),
        }
    }

    #[test]
    fn test_apuracao_counts_each_value() {
        let votos = vec![voto(VotoValor::Sim), voto(VotoValor::Sim), voto(VotoValor::Nao)];
        let apuracao = Apuracao::from_votos(&votos);
        assert_eq!(
            apuracao,
            Apuracao {
                sim: 2,
                nao: 1,
                abstencao: 0,
                total: 3
            }
        );
        assert_eq!(apuracao.resultado(), ProjetoStatus::Aprovado);
    }

    #[test]
    fn test_tie_is_rejected() {
        let apuracao = Apuracao {
            sim: 1,
            nao: 1,
            abstencao: 0,
            total: 2,
        };
        assert_eq!(apuracao.resultado(), ProjetoStatus::Rejeitado);
        assert_eq!(Apuracao::default().resultado(), ProjetoStatus::Rejeitado);
    }

    #[test]
    fn test_abstentions_do_not_decide() {
        let apuracao = Apuracao {
            sim: 1,
            nao: 0,
            abstencao: 5,
            total: 6,
        };
        assert_eq!(apuracao.resultado(), ProjetoStatus::Aprovado);
    }

    #[test]
    fn test_voto_valor_accepts_accented_labels() {
        assert_eq!("não".parse::<VotoValor>().unwrap(), VotoValor::Nao);
        assert_eq!("Abstenção".parse::<VotoValor>().unwrap(), VotoValor::Abstencao);
        assert_eq!(" SIM ".parse::<VotoValor>().unwrap(), VotoValor::Sim);
        assert!("talvez".parse::<VotoValor>().is_err());

        let parsed: VotoValor = serde_json::from_str("\"não\"").unwrap();
        assert_eq!(parsed, VotoValor::Nao);
        assert_eq!(serde_json::to_string(&VotoValor::Nao).unwrap(), "\"nao\"");
    }
}
