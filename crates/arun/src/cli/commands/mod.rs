//! CLI commands

mod completions;
mod doctor;
mod init;
mod pick;
mod run;

pub use completions::CompletionsCommand;
pub use doctor::DoctorCommand;
pub use init::InitCommand;
pub use pick::PickCommand;
pub use run::RunCommand;
