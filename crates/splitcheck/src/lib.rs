//! Command-line front end for the `splitcheck_core` comparison engine
//!
//! Reads already-decoded experiment rows (a JSON array of objects), runs the
//! control vs. variant analysis and emits the report as JSON.

pub mod commands;
pub mod io;
pub mod logging;

pub use commands::{Cli, Command, run};
pub use logging::init_logging;
