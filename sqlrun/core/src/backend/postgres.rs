use postgres::{Client, NoTls};

use crate::connection::{Batch, BatchResults, Connection, ConnectionResult, execute_in_transaction};
use crate::error::{Error, Result};

/// A PostgreSQL connection without TLS.
///
/// Statements go through the simple query protocol, which accepts empty statements and several
/// `;`-separated statements in one command. A batch runs inside a single transaction, so a
/// failing statement rolls back the statements of the same batch that already ran.
pub struct PostgresConnection {
    client: Client,
}

impl PostgresConnection {
    pub fn connect(url: &str) -> Result<Self> {
        let client = Client::connect(url, NoTls).map_err(|e| Error::Connect(e.into()))?;
        Ok(Self { client })
    }
}

impl Connection for PostgresConnection {
    fn execute_single(&mut self, sql: &str) -> ConnectionResult<()> {
        Ok(self.client.batch_execute(sql)?)
    }

    fn execute_batch(&mut self, batch: Batch) -> BatchResults<'_> {
        execute_in_transaction(self, batch)
    }
}
