use std::io::Write;
use std::path::{Path, PathBuf};
use std::time::Duration;

use tracing::{error, info, info_span};

use crate::connection::Connection;
use crate::error::{Error, Result};
use crate::runner;
use crate::script::{self, ScriptFile, has_sql_extension};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RunConfig {
    /// A script file, or a directory searched recursively for `.sql` files.
    pub root: PathBuf,
    /// Reject scripts whose file name does not end with `.sql`.
    pub require_sql_extension: bool,
}

impl RunConfig {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self {
            root: root.into(),
            require_sql_extension: true,
        }
    }

    pub fn with_require_sql_extension(mut self, require: bool) -> Self {
        self.require_sql_extension = require;
        self
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FileReport {
    pub path: PathBuf,
    pub elapsed: Duration,
    pub blocks: usize,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RunSummary {
    pub files: Vec<FileReport>,
}

impl RunSummary {
    /// Returns the sum of the time spent executing each file.
    pub fn total_time(&self) -> Duration {
        self.files.iter().map(|f| f.elapsed).sum()
    }
}

/// One invocation against a root path.
///
/// The run owns its connection for its whole lifetime. Files execute one at a time in traversal
/// order and the run stops at the first error.
pub struct Run<C = Box<dyn Connection>> {
    config: RunConfig,
    conn: C,
}

impl<C: Connection> Run<C> {
    pub fn new(config: RunConfig, conn: C) -> Self {
        Self { config, conn }
    }

    #[inline]
    pub fn config(&self) -> &RunConfig {
        &self.config
    }

    #[inline]
    pub fn connection(&self) -> &C {
        &self.conn
    }

    pub fn into_connection(self) -> C {
        self.conn
    }

    /// Executes every script under the configured root.
    ///
    /// For each script that succeeds, a `<basename>(<elapsed>)` line is written to `out`.
    pub fn execute<W: Write>(&mut self, out: &mut W) -> Result<RunSummary> {
        let mut summary = RunSummary::default();
        for script in script::resolve(&self.config.root)? {
            let script = script.inspect_err(|e| error!(error = %e, "failed to load script"))?;
            let report = self.execute_script(&script)?;
            writeln!(out, "{}({:?})", script.base_name(), report.elapsed)?;
            summary.files.push(report);
        }
        info!(
            files = summary.files.len(),
            elapsed = ?summary.total_time(),
            "run completed"
        );
        Ok(summary)
    }

    fn execute_script(&mut self, script: &ScriptFile) -> Result<FileReport> {
        let path = script.path();
        let _span = info_span!("script", path = %path.display()).entered();
        self.check_extension(path)?;

        let result = runner::execute(script.content(), &mut self.conn);
        let blocks = result.executed();
        let elapsed = result
            .into_result(path)
            .inspect_err(|e| error!(error = %e, "script failed"))?;
        info!(blocks, ?elapsed, "script executed");
        Ok(FileReport {
            path: path.to_path_buf(),
            elapsed,
            blocks,
        })
    }

    fn check_extension(&self, path: &Path) -> Result<()> {
        if self.config.require_sql_extension && !has_sql_extension(path) {
            return Err(Error::Extension {
                path: path.to_path_buf(),
            });
        }
        Ok(())
    }
}
