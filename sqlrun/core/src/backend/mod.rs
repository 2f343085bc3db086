//! Connections to concrete databases, selected by URL scheme.

mod postgres;
mod sqlite;

use std::path::PathBuf;

use strum::Display;
use tracing::info;

pub use self::postgres::PostgresConnection;
pub use self::sqlite::SqliteConnection;
use crate::connection::Connection;
use crate::error::{Error, Result};

const SQLITE_MEMORY: &str = ":memory:";

#[derive(Debug, Clone, PartialEq, Eq, Display)]
#[strum(serialize_all = "lowercase")]
pub enum DatabaseUrl {
    /// A `postgres://` or `postgresql://` connection string, passed to the driver unchanged.
    Postgres(String),
    /// `sqlite::memory:` or `sqlite://:memory:`.
    #[strum(serialize = "sqlite")]
    SqliteMemory,
    /// `sqlite://<path>` or `sqlite:<path>`.
    #[strum(serialize = "sqlite")]
    SqliteFile(PathBuf),
}

impl DatabaseUrl {
    pub fn parse(url: &str) -> Result<Self> {
        if url.starts_with("postgres://") || url.starts_with("postgresql://") {
            return Ok(Self::Postgres(url.to_string()));
        }
        let location = url
            .strip_prefix("sqlite://")
            .or_else(|| url.strip_prefix("sqlite:"))
            .filter(|location| !location.is_empty())
            .ok_or_else(|| Error::UnsupportedUrl {
                url: url.to_string(),
            })?;
        if location == SQLITE_MEMORY {
            Ok(Self::SqliteMemory)
        } else {
            Ok(Self::SqliteFile(PathBuf::from(location)))
        }
    }

    pub fn connect(&self) -> Result<Box<dyn Connection>> {
        let conn: Box<dyn Connection> = match self {
            Self::Postgres(url) => Box::new(PostgresConnection::connect(url)?),
            Self::SqliteMemory => Box::new(SqliteConnection::open_in_memory()?),
            Self::SqliteFile(path) => Box::new(SqliteConnection::open(path)?),
        };
        info!(backend = %self, "connected to database");
        Ok(conn)
    }
}

/// Opens a connection for `url`.
pub fn connect(url: &str) -> Result<Box<dyn Connection>> {
    DatabaseUrl::parse(url)?.connect()
}
