use std::path::Path;

use crate::connection::{Connection, ConnectionResult};
use crate::error::{Error, Result};

pub struct SqliteConnection {
    conn: rusqlite::Connection,
}

impl SqliteConnection {
    pub fn open(path: impl AsRef<Path>) -> Result<Self> {
        let conn = rusqlite::Connection::open(path).map_err(|e| Error::Connect(e.into()))?;
        Ok(Self { conn })
    }

    pub fn open_in_memory() -> Result<Self> {
        let conn = rusqlite::Connection::open_in_memory().map_err(|e| Error::Connect(e.into()))?;
        Ok(Self { conn })
    }

    /// Returns the underlying connection, e.g. to inspect the effects of a run.
    #[inline]
    pub fn inner(&self) -> &rusqlite::Connection {
        &self.conn
    }
}

impl Connection for SqliteConnection {
    fn execute_single(&mut self, sql: &str) -> ConnectionResult<()> {
        Ok(self.conn.execute_batch(sql)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::connection::{Batch, ConnectionError, execute_in_transaction};

    #[test]
    fn test_execute_blank_statements() {
        let mut conn = SqliteConnection::open_in_memory().unwrap();
        conn.execute_single("").unwrap();
        conn.execute_single(" \n ").unwrap();
    }

    #[test]
    fn test_execute_reports_driver_error() {
        let mut conn = SqliteConnection::open_in_memory().unwrap();
        let err = conn.execute_single("SELEC 1").unwrap_err();
        assert!(matches!(err, ConnectionError::Sqlite(_)));
        assert!(err.to_string().contains("syntax error"), "{err}");
    }

    #[test]
    fn test_execute_persists_to_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("app.db");
        {
            let mut conn = SqliteConnection::open(&path).unwrap();
            conn.execute_single("create table t(x int); insert into t values (7)")
                .unwrap();
        }
        let conn = SqliteConnection::open(&path).unwrap();
        let x: i64 = conn
            .inner()
            .query_row("select x from t", [], |row| row.get(0))
            .unwrap();
        assert_eq!(x, 7);
    }

    fn count(conn: &SqliteConnection) -> i64 {
        conn.inner()
            .query_row("select count(*) from t", [], |row| row.get(0))
            .unwrap()
    }

    #[test]
    fn test_transaction_undoes_earlier_statements() {
        let mut conn = SqliteConnection::open_in_memory().unwrap();
        conn.execute_single("create table t(x int)").unwrap();

        let mut batch = Batch::new();
        batch.queue("insert into t values (1)");
        batch.queue(" SELEC 1");
        batch.queue(" insert into t values (2)");
        let results: Vec<_> = execute_in_transaction(&mut conn, batch).collect();
        assert_eq!(results.len(), 2);
        assert!(results[1].is_err());
        assert_eq!(count(&conn), 0);
    }

    #[test]
    fn test_transaction_commits_whole_batch() {
        let mut conn = SqliteConnection::open_in_memory().unwrap();
        conn.execute_single("create table t(x int)").unwrap();

        let mut batch = Batch::new();
        batch.queue("insert into t values (1)");
        batch.queue(" insert into t values (2)");
        batch.queue(" ");
        assert!(execute_in_transaction(&mut conn, batch).all(|r| r.is_ok()));
        assert_eq!(count(&conn), 2);
    }
}
