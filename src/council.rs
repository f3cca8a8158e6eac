//! Council registry.
//!
//! Câmaras own every other record in the system; vereadores are the members
//! who attend sessions and vote on projetos.

pub mod council_directory;
pub mod types;

pub use council_directory::CouncilDirectory;
pub use types::{Camara, NovaCamara, NovoVereador, Vereador};
