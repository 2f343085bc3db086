use std::io;
use std::path::PathBuf;

use miette::Diagnostic;
use thiserror::Error;

use crate::connection::ConnectionError;

#[derive(Debug, Error, Diagnostic)]
pub enum Error {
    #[error("failed to access {}", path.display())]
    #[diagnostic(code(sqlrun::discovery))]
    Discovery {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("failed to walk directory {}", path.display())]
    #[diagnostic(code(sqlrun::discovery))]
    Walk {
        path: PathBuf,
        #[source]
        source: walkdir::Error,
    },

    #[error("failed to read sql file {}", path.display())]
    #[diagnostic(code(sqlrun::read))]
    Read {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("{} is not a sql file", path.display())]
    #[diagnostic(
        code(sqlrun::extension),
        help("script files must end with `.sql`; pass `--allow-any-extension` to skip this check")
    )]
    Extension { path: PathBuf },

    #[error("error running sql file {}: error executing statement block #{ordinal} `{block}`", path.display())]
    #[diagnostic(code(sqlrun::execution))]
    Execution {
        path: PathBuf,
        ordinal: usize,
        block: String,
        #[source]
        source: ConnectionError,
    },

    #[error("unsupported database url `{url}`")]
    #[diagnostic(
        code(sqlrun::url),
        help("expected `postgres://...`, `postgresql://...`, `sqlite://<path>` or `sqlite::memory:`")
    )]
    UnsupportedUrl { url: String },

    #[error("unable to connect to database")]
    #[diagnostic(code(sqlrun::connect))]
    Connect(#[source] ConnectionError),

    #[error("failed to write report")]
    #[diagnostic(code(sqlrun::report))]
    Report(#[from] io::Error),
}

pub type Result<T> = std::result::Result<T, Error>;
