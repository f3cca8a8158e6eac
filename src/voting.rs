//! Voting on projetos.
//!
//! A projeto is presented, opened for voting, receives at most one voto per
//! vereador and is closed as approved or rejected by simple majority.

pub mod types;
pub mod voting_engine;

pub use types::{
    Apuracao, NovoProjeto, NovoVoto, Projeto, ProjetoStatus, ResultadoVotacao, Voto, VotoValor,
};
pub use voting_engine::VotingEngine;
