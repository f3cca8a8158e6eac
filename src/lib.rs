pub mod attendance;
pub mod configuration;
pub mod controller;
pub mod council;
pub mod error_handling;
pub mod session_management;
pub mod storage;
pub mod voting;
pub mod web_interface;

pub use controller::Controller;
pub use session_management::{SessaoStatus, TipoSessao};
pub use voting::{ProjetoStatus, VotoValor};
