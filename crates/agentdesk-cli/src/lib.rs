//! AgentDesk command-line front end.
//!
//! A thin shell over `agentdesk-store`: each command opens a resource tab,
//! applies the Query Spec from its flags, fetches, and prints or writes the
//! Derived View.

pub mod cli;
pub mod commands;
pub mod error;
pub mod logging;

pub use cli::{Cli, Command};
pub use error::CliError;
