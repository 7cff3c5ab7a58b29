//! # splicer CLI
//!
//! The command-line entry point for splicer, a self-hosting build driver
//! that regenerates a project's single-file distributable and drives the
//! surrounding build stages through external tools.
//!
//! ## Commands
//!
//! - **build**: run the full pipeline (format, clean, generate, compile,
//!   test, javadoc, jar, jdeps)
//! - **format** / **clean** / **generate** / **compile** / **test** /
//!   **javadoc** / **jar** / **jdeps**: run one stage in isolation
//!
//! ## Quick Start
//!
//! ```bash
//! # Full pipeline, validating formatting
//! splicer build
//!
//! # Regenerate the published file only
//! splicer generate
//!
//! # Rewrite sources in place while building
//! splicer build --replace
//! ```
//!
//! ## Environment Variables
//!
//! - `SPLICER_PROJECT_ROOT`: Project root (default: current directory)
//! - `SPLICER_TOOLS_DIR`: Tool cache directory
//! - `SPLICER_VERBOSE`: Enable verbose output
//! - `SPLICER_QUIET`: Silence all output except errors
//! - `SPLICER_FORMAT_REPLACE`: Rewrite sources instead of validating

use std::io::IsTerminal;

use splicer::cli::Cli;

fn main() -> miette::Result<()> {
    // Install miette's fancy panic and error report handler
    miette::set_panic_hook();

    // Configure miette handler based on terminal capabilities
    if std::io::stderr().is_terminal() {
        miette::set_hook(Box::new(|_| {
            Box::new(
                miette::GraphicalReportHandler::new()
                    .with_theme(miette::GraphicalTheme::unicode_nocolor())
                    .with_context_lines(3),
            )
        }))?;
    } else {
        // Use a simpler handler for non-TTY environments (CI, logs, etc.)
        miette::set_hook(Box::new(|_| {
            Box::new(
                miette::GraphicalReportHandler::new()
                    .with_theme(miette::GraphicalTheme::none())
                    .with_context_lines(0),
            )
        }))?;
    }

    let cli = Cli::parse_args();
    splicer::commands::execute(&cli).map_err(Into::into)
}
