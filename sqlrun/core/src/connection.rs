//! The database capability the runner executes against.
//!
//! A [`Connection`] is owned by exactly one [`Run`](crate::run::Run) and is only ever used through
//! `&mut`, so implementations do not need any internal synchronization.

use std::error::Error;
use std::fmt;
use std::str::Utf8Error;
use std::vec;

use thiserror::Error;
use tracing::warn;

#[derive(Debug, Error)]
pub enum ConnectionError {
    #[error(transparent)]
    Postgres(#[from] postgres::Error),

    #[error(transparent)]
    Sqlite(#[from] rusqlite::Error),

    #[error("statement is not valid utf-8: {0}")]
    Encoding(#[from] Utf8Error),

    #[error(transparent)]
    Custom(#[from] Box<dyn Error + Send + Sync + 'static>),
}

pub type ConnectionResult<T> = Result<T, ConnectionError>;

/// An ordered group of statements submitted together.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct Batch {
    statements: Vec<String>,
}

impl Batch {
    #[inline]
    pub fn new() -> Self {
        Self::default()
    }

    #[inline]
    pub fn queue(&mut self, sql: impl Into<String>) {
        self.statements.push(sql.into());
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.statements.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.statements.is_empty()
    }

    #[inline]
    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.statements.iter().map(String::as_str)
    }
}

impl IntoIterator for Batch {
    type IntoIter = std::vec::IntoIter<String>;
    type Item = String;

    #[inline]
    fn into_iter(self) -> Self::IntoIter {
        self.statements.into_iter()
    }
}

/// Results of a submitted [`Batch`], one per queued statement, in submission order.
///
/// Results can only be read once and only front to back. Dropping the value discards every
/// result that has not been read yet.
pub struct BatchResults<'c> {
    inner: Box<dyn Iterator<Item = ConnectionResult<()>> + 'c>,
}

impl<'c> BatchResults<'c> {
    pub fn new<I>(results: I) -> Self
    where
        I: Iterator<Item = ConnectionResult<()>> + 'c,
    {
        Self {
            inner: Box::new(results),
        }
    }
}

impl Iterator for BatchResults<'_> {
    type Item = ConnectionResult<()>;

    #[inline]
    fn next(&mut self) -> Option<Self::Item> {
        self.inner.next()
    }
}

impl fmt::Debug for BatchResults<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("BatchResults").finish_non_exhaustive()
    }
}

pub trait Connection {
    /// Executes `sql` as a single command. The text may hold several statements if the
    /// underlying driver accepts that.
    fn execute_single(&mut self, sql: &str) -> ConnectionResult<()>;

    /// Submits every statement of `batch` and returns their results in order.
    ///
    /// The default implementation executes each statement through
    /// [`execute_single`](Connection::execute_single) when its result is read, so statements
    /// after the last read result are never sent to the database.
    fn execute_batch(&mut self, batch: Batch) -> BatchResults<'_> {
        let mut statements = batch.into_iter();
        BatchResults::new(std::iter::from_fn(move || {
            statements.next().map(|sql| self.execute_single(&sql))
        }))
    }
}

impl<C: Connection + ?Sized> Connection for Box<C> {
    #[inline]
    fn execute_single(&mut self, sql: &str) -> ConnectionResult<()> {
        (**self).execute_single(sql)
    }

    #[inline]
    fn execute_batch(&mut self, batch: Batch) -> BatchResults<'_> {
        (**self).execute_batch(batch)
    }
}

/// Runs `batch` on `conn` inside one transaction.
///
/// `BEGIN` is sent before the first statement and `COMMIT` after the last one, as part of reading
/// its result. A failed statement, or dropping the results before the last one is read, sends
/// `ROLLBACK`, so either every statement of the batch takes effect or none does.
pub fn execute_in_transaction<'c, C>(conn: &'c mut C, batch: Batch) -> BatchResults<'c>
where
    C: Connection + ?Sized,
{
    BatchResults::new(TransactionResults {
        conn,
        statements: batch.into_iter(),
        state: TransactionState::Idle,
    })
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum TransactionState {
    Idle,
    Open,
    Finished,
}

struct TransactionResults<'c, C: Connection + ?Sized> {
    conn: &'c mut C,
    statements: vec::IntoIter<String>,
    state: TransactionState,
}

impl<C: Connection + ?Sized> TransactionResults<'_, C> {
    fn rollback(&mut self) {
        self.state = TransactionState::Finished;
        if let Err(e) = self.conn.execute_single("ROLLBACK") {
            warn!(error = %e, "failed to roll back batch");
        }
    }
}

impl<C: Connection + ?Sized> Iterator for TransactionResults<'_, C> {
    type Item = ConnectionResult<()>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.state == TransactionState::Finished {
            return None;
        }
        let sql = self.statements.next()?;
        if self.state == TransactionState::Idle {
            if let Err(e) = self.conn.execute_single("BEGIN") {
                self.state = TransactionState::Finished;
                return Some(Err(e));
            }
            self.state = TransactionState::Open;
        }
        if let Err(e) = self.conn.execute_single(&sql) {
            self.rollback();
            return Some(Err(e));
        }
        if self.statements.as_slice().is_empty() {
            self.state = TransactionState::Finished;
            return Some(self.conn.execute_single("COMMIT"));
        }
        Some(Ok(()))
    }
}

impl<C: Connection + ?Sized> Drop for TransactionResults<'_, C> {
    fn drop(&mut self) {
        if self.state == TransactionState::Open {
            self.rollback();
        }
    }
}
