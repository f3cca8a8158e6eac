//! Attendance of vereadores at legislative sessions.

pub mod attendance_tracker;
pub mod presenca;

pub use attendance_tracker::AttendanceTracker;
pub use presenca::{FalhaAusencia, MarcacaoAusencias, Presenca, RegistroPresenca};
