//! Executing one script against a connection.

use std::path::Path;
use std::time::{Duration, Instant};

use tracing::{debug, warn};

use crate::connection::{Batch, Connection, ConnectionError};
use crate::error::{Error, Result};
use crate::statement::{StatementBlock, split_blocks};

/// The first statement block of a script that the database rejected.
#[derive(Debug)]
pub struct BlockFailure {
    ordinal: usize,
    block: String,
    error: ConnectionError,
}

impl BlockFailure {
    fn new(block: &StatementBlock<'_>, error: ConnectionError) -> Self {
        Self {
            ordinal: block.ordinal(),
            block: block.to_string_lossy(),
            error,
        }
    }

    /// Returns the 1-based position of the failing block.
    #[inline]
    pub fn ordinal(&self) -> usize {
        self.ordinal
    }

    #[inline]
    pub fn block(&self) -> &str {
        &self.block
    }

    #[inline]
    pub fn error(&self) -> &ConnectionError {
        &self.error
    }
}

#[derive(Debug)]
pub struct ExecutionResult {
    elapsed: Duration,
    executed: usize,
    failure: Option<BlockFailure>,
}

impl ExecutionResult {
    /// Returns the wall-clock time spent on the script, up to the last block or the first
    /// failure.
    #[inline]
    pub fn elapsed(&self) -> Duration {
        self.elapsed
    }

    /// Returns the number of blocks that executed successfully.
    #[inline]
    pub fn executed(&self) -> usize {
        self.executed
    }

    #[inline]
    pub fn failure(&self) -> Option<&BlockFailure> {
        self.failure.as_ref()
    }

    #[inline]
    pub fn is_success(&self) -> bool {
        self.failure.is_none()
    }

    /// Converts a failed execution into [`Error::Execution`] attributed to `path`.
    pub fn into_result(self, path: &Path) -> Result<Duration> {
        match self.failure {
            None => Ok(self.elapsed),
            Some(BlockFailure {
                ordinal,
                block,
                error,
            }) => Err(Error::Execution {
                path: path.to_path_buf(),
                ordinal,
                block,
                source: error,
            }),
        }
    }
}

/// Splits `content` into statement blocks and runs them as one batch on `conn`.
///
/// Results are read in block order and reading stops at the first failed block, so no block
/// after it is executed.
pub fn execute<C>(content: &[u8], conn: &mut C) -> ExecutionResult
where
    C: Connection + ?Sized,
{
    let start = Instant::now();
    let blocks: Vec<_> = split_blocks(content).collect();

    let mut batch = Batch::new();
    for block in &blocks {
        match block.to_str() {
            Ok(sql) => batch.queue(sql),
            Err(e) => {
                warn!(ordinal = block.ordinal(), "statement block is not valid utf-8");
                return ExecutionResult {
                    elapsed: start.elapsed(),
                    executed: 0,
                    failure: Some(BlockFailure::new(block, e.into())),
                };
            }
        }
    }

    let mut results = conn.execute_batch(batch);
    let mut executed = 0;
    let mut failure = None;
    for block in &blocks {
        match results.next() {
            Some(Ok(())) => {
                debug!(ordinal = block.ordinal(), "statement block executed");
                executed += 1;
            }
            Some(Err(e)) => {
                warn!(ordinal = block.ordinal(), error = %e, "statement block failed");
                failure = Some(BlockFailure::new(block, e));
                break;
            }
            None => {
                let e = ConnectionError::Custom("batch returned fewer results than queued".into());
                failure = Some(BlockFailure::new(block, e));
                break;
            }
        }
    }
    drop(results);

    ExecutionResult {
        elapsed: start.elapsed(),
        executed,
        failure,
    }
}
