//! Error types for splicer.
//!
//! All failures funnel into [`SplicerError`], defined with `thiserror` and
//! decorated with `miette` diagnostics so the CLI can render codes and help
//! text. No component attempts local recovery: every condition raised inside
//! a stage propagates to the pipeline driver, which names the failing stage
//! and aborts the remaining stages.

use std::path::PathBuf;

use miette::Diagnostic;
use thiserror::Error;

/// Error types that can occur while driving a build.
#[derive(Error, Debug, Diagnostic)]
pub enum SplicerError {
    /// A mark offset pointed before the start of the argument list, or
    /// `reset_to_mark` was called with no mark recorded.
    ///
    /// This is a programmer error in stage code, never retried.
    #[error("invalid command mark: offset {offset} exceeds argument count {len}")]
    #[diagnostic(
        code(splicer::command::invalid_mark),
        help(
            "mark(offset) counts back from the end of the argument list; record a mark before \
             calling reset_to_mark."
        )
    )]
    InvalidMark {
        /// The offset passed to `mark`
        offset: usize,
        /// The argument list length at the time of the call
        len: usize,
    },

    /// An external tool exited with a non-zero status.
    ///
    /// Carries the captured exit code and whatever standard error text was
    /// collected. In inherited-output mode the child's stderr went straight
    /// to the console and `stderr` is empty here.
    #[error("'{program}' exited with status {code}")]
    #[diagnostic(code(splicer::command::non_zero_exit))]
    NonZeroExit {
        /// The program token of the failed command
        program: String,
        /// The captured exit code (-1 if terminated by signal)
        code: i32,
        /// Captured standard error, if the command ran in capture mode
        stderr: String,
    },

    /// An external tool could not be spawned at all.
    #[error("failed to spawn '{program}'")]
    #[diagnostic(
        code(splicer::command::spawn_error),
        help("Ensure the tool is installed and on PATH.")
    )]
    SpawnError {
        /// The program token that could not be spawned
        program: String,
        /// The underlying I/O error
        #[source]
        source: std::io::Error,
    },

    /// A tool or library artifact could not be downloaded into the cache.
    ///
    /// Not retried within a run; re-running the pipeline retries naturally
    /// since nothing is cached on failure.
    #[error("failed to download '{uri}'")]
    #[diagnostic(
        code(splicer::cache::download_error),
        help("Check network connectivity and the configured repository URL, then re-run.")
    )]
    DownloadError {
        /// The URI that could not be fetched
        uri: String,
        /// Description of the transfer failure
        message: String,
    },

    /// A source module contained no sentinel marker line.
    ///
    /// Without the sentinel the whole module would be treated as private
    /// header and nothing would be emitted, so generation aborts instead of
    /// silently producing an empty module.
    #[error("no sentinel line '{sentinel}' in source module '{path}'")]
    #[diagnostic(
        code(splicer::merge::sentinel_missing),
        help(
            "Every spliced module must contain the sentinel line separating its private header \
             from its publishable body."
        )
    )]
    MergeSentinelMissing {
        /// The module that lacked the sentinel
        path: PathBuf,
        /// The sentinel line that was expected
        sentinel: String,
    },

    /// A pipeline stage failed; wraps the triggering condition.
    #[error("stage '{stage}' failed")]
    #[diagnostic(code(splicer::pipeline::stage_failed))]
    StageFailed {
        /// Name of the stage that raised the condition
        stage: &'static str,
        /// The condition that aborted the stage
        #[source]
        source: Box<SplicerError>,
    },

    /// File system I/O error during build operations.
    #[error("I/O error accessing '{path}'")]
    #[diagnostic(code(splicer::io_error))]
    IoError {
        /// The path that caused the I/O error
        path: PathBuf,
        /// The underlying I/O error
        #[source]
        source: std::io::Error,
    },

    /// Invalid or missing configuration.
    #[error("configuration error: {message}")]
    #[diagnostic(code(splicer::config::error))]
    ConfigError {
        /// Description of the configuration error
        message: String,
    },
}

impl SplicerError {
    /// Wrap an I/O error with the path it concerned.
    pub fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::IoError {
            path: path.into(),
            source,
        }
    }
}

/// Type alias for Results in this crate
pub type Result<T> = std::result::Result<T, SplicerError>;
