//! Subcommand implementations. Each writes user-facing output to the
//! supplied writer so it can be captured in tests.

pub mod fetch;
pub mod parse_ini;
pub mod matrix;
pub mod update;
pub mod verify;
