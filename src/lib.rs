//! # splicer
//!
//! A self-hosting build driver for a single-file tool: it formats, compiles,
//! tests, documents, and packages its project, and regenerates the project's
//! distributable source file by splicing several internal source modules
//! into one publishable unit, overwriting the published copy only when
//! content actually changed.
//!
//! ## Overview
//!
//! The pipeline is a fixed, linear sequence of eight stages:
//!
//! ```text
//! format -> clean -> generate -> compile -> test -> javadoc -> jar -> jdeps
//! ```
//!
//! The first failing stage aborts the remaining stages and the process exits
//! non-zero naming the stage and its triggering condition. There is no
//! retry, no partial-success state, and no incremental build graph.
//!
//! ## Key pieces
//!
//! - **Command building**: every stage drives its external tool through a
//!   [`command::CommandBuilder`], an argument list with a mark/reset
//!   checkpoint so one built prefix can be replayed with different suffixes
//!   (the jar stage packages three archives this way).
//! - **Generation**: [`merge`] splices the source modules into one unit,
//!   hoisting each module's import declarations into a single sorted,
//!   deduplicated block; [`publish`] replaces the published file atomically,
//!   and only when content ignoring the generation-timestamp line changed.
//! - **Tool cache**: [`cache`] resolves formatter/test-runner jars by URI
//!   and library jars by coordinate, downloading only when absent.
//!
//! ## Architecture
//!
//! - [`cli`]: Command-line interface definitions using clap
//! - [`commands`]: Stage implementations and the pipeline driver
//! - [`command`]: External command construction and execution
//! - [`cache`]: Tool and library artifact cache
//! - [`merge`]: Source module merging
//! - [`publish`]: Conditional publication of the generated unit
//! - [`config`]: Immutable build configuration
//! - [`error`]: Error types and handling with thiserror + miette
//!
//! ## Library Usage
//!
//! splicer is primarily a CLI tool, but the pipeline is reachable as a
//! library:
//!
//! ```no_run
//! use splicer::cli::{Cli, Commands};
//! use splicer::commands;
//!
//! let cli = Cli::builder()
//!     .project_root(".")
//!     .command(Commands::Generate)
//!     .build()?;
//! commands::execute(&cli)?;
//! # Ok::<(), Box<dyn std::error::Error>>(())
//! ```
//!
//! ## Error Handling
//!
//! The crate uses `thiserror` for strongly-typed errors and `miette` for
//! rich diagnostic output; every failure propagates to the pipeline driver
//! untouched.

// Re-export public modules for library usage
pub mod cache;
pub mod cli;
pub mod command;
pub mod commands;
pub mod config;
pub mod error;
pub mod logging;
pub mod merge;
pub mod publish;
