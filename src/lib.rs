//! dust-cli is a command-line client for the Dust assistant API.
//!
//! The crate is organized around a small set of collaborating layers:
//! - [`api`] resolves workspace endpoints, executes authenticated requests,
//!   classifies failures, consumes event streams, and maps responses into
//!   typed entities.
//! - [`core`] owns configuration loading and the layering of flags,
//!   environment, and the config file.
//! - [`utils`] holds URL building, auth headers, the chat transcript, and
//!   timezone lookup.
//! - [`logging`] installs the diagnostic subscriber.
//!
//! The binary (`src/main.rs`) routes through [`crate::cli::main`], which
//! dispatches into the one-shot commands and the interactive chat REPL.

pub mod api;
pub mod cli;
pub mod core;
pub mod logging;
pub mod utils;
