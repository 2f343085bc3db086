//! Applies SQL script files to a database.
//!
//! A [`Run`] resolves a root path into script files ([`script`]), splits each script into
//! statement blocks at every `;` ([`statement`]), and executes the blocks of one script as a
//! single batch on a [`Connection`] ([`runner`]). The first failing block aborts the run.

pub mod backend;
pub mod connection;
pub mod error;
pub mod run;
pub mod runner;
pub mod script;
pub mod statement;

pub use connection::{Batch, BatchResults, Connection, ConnectionError};
pub use error::{Error, Result};
pub use run::{FileReport, Run, RunConfig, RunSummary};
