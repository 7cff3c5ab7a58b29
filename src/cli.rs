//! Command-line interface definitions for splicer.
//!
//! The CLI exposes the full pipeline as `splicer build` plus one subcommand
//! per stage for running a single step in isolation. Global options locate
//! the project and the tool cache and control output verbosity.
//!
//! # Example
//!
//! ```no_run
//! use splicer::cli::{Cli, Commands};
//!
//! let cli = Cli::parse_args();
//! match cli.command() {
//!     Commands::Build { .. } => eprintln!("running the full pipeline"),
//!     Commands::Generate => eprintln!("regenerating the published file"),
//!     _ => {}
//! }
//! ```

use std::path::{Component, Path, PathBuf};

use clap::{Parser, Subcommand};

use crate::error::{Result, SplicerError};

/// Main command-line interface for splicer.
#[derive(Parser)]
#[command(
    name = "splicer",
    bin_name = "splicer",
    author,
    version,
    about = "A self-hosting build driver that splices a tool's modules into one publishable source file",
    long_about = None,
    propagate_version = true
)]
pub struct Cli {
    #[command(flatten)]
    global_opts: GlobalOpts,

    #[command(subcommand)]
    command: Commands,
}

/// Global options that apply to all splicer commands.
#[derive(Parser)]
pub struct GlobalOpts {
    /// Project root the build operates in (defaults to the current directory)
    #[arg(long, global = true, default_value = ".", env = "SPLICER_PROJECT_ROOT")]
    project_root: PathBuf,

    /// Tool cache directory (defaults to `<project-root>/.splicer/tools`)
    #[arg(long, global = true, env = "SPLICER_TOOLS_DIR")]
    tools_dir: Option<PathBuf>,

    /// Enable verbose output (use multiple times for more verbosity)
    #[arg(short, long, global = true, action = clap::ArgAction::Count, env = "SPLICER_VERBOSE")]
    verbose: u8,

    /// Silence all output except for errors
    #[arg(
        short,
        long,
        global = true,
        conflicts_with = "verbose",
        env = "SPLICER_QUIET"
    )]
    quiet: bool,
}

impl GlobalOpts {
    /// Create a new builder for constructing `GlobalOpts` programmatically.
    pub fn builder() -> GlobalOptsBuilder {
        GlobalOptsBuilder::default()
    }

    /// Get the absolute project root.
    pub fn get_project_root(&self) -> PathBuf {
        normalize_path(&self.project_root)
    }

    /// Get the effective tool cache directory.
    pub fn get_tools_dir(&self) -> PathBuf {
        match &self.tools_dir {
            Some(dir) => normalize_path(dir),
            None => self.get_project_root().join(".splicer").join("tools"),
        }
    }

    /// Get the project root as given.
    pub fn project_root(&self) -> &Path {
        &self.project_root
    }

    /// Get the tools directory option.
    pub fn tools_dir(&self) -> Option<&Path> {
        self.tools_dir.as_deref()
    }

    /// Get the verbose level.
    pub fn verbose(&self) -> u8 {
        self.verbose
    }

    /// Check if quiet mode is enabled.
    pub fn quiet(&self) -> bool {
        self.quiet
    }
}

/// Builder for constructing `GlobalOpts` without command-line parsing.
#[derive(Default)]
pub struct GlobalOptsBuilder {
    project_root: Option<PathBuf>,
    tools_dir: Option<PathBuf>,
    verbose: u8,
    quiet: bool,
}

impl GlobalOptsBuilder {
    /// Set the project root.
    pub fn project_root(mut self, root: impl Into<PathBuf>) -> Self {
        self.project_root = Some(root.into());
        self
    }

    /// Set the tool cache directory.
    pub fn tools_dir(mut self, dir: Option<impl Into<PathBuf>>) -> Self {
        self.tools_dir = dir.map(|d| d.into());
        self
    }

    /// Set the verbosity level.
    pub fn verbose(mut self, level: u8) -> Self {
        self.verbose = level;
        self
    }

    /// Enable or disable quiet mode.
    pub fn quiet(mut self, quiet: bool) -> Self {
        self.quiet = quiet;
        self
    }

    /// Build the `GlobalOpts` instance.
    pub fn build(self) -> GlobalOpts {
        GlobalOpts {
            project_root: self.project_root.unwrap_or_else(|| PathBuf::from(".")),
            tools_dir: self.tools_dir,
            verbose: self.verbose,
            quiet: self.quiet,
        }
    }
}

impl Cli {
    /// Get the global options.
    pub fn global_opts(&self) -> &GlobalOpts {
        &self.global_opts
    }

    /// Get the command.
    pub fn command(&self) -> &Commands {
        &self.command
    }

    /// Create a builder for programmatic construction.
    pub fn builder() -> CliBuilder {
        CliBuilder::default()
    }

    /// Parse command line arguments.
    pub fn parse_args() -> Self {
        Self::parse()
    }
}

/// Builder for [`Cli`]
#[derive(Debug, Default)]
pub struct CliBuilder {
    project_root: Option<PathBuf>,
    tools_dir: Option<PathBuf>,
    verbose: u8,
    quiet: bool,
    command: Option<Commands>,
}

impl CliBuilder {
    /// Set the project root.
    pub fn project_root(mut self, root: impl Into<PathBuf>) -> Self {
        self.project_root = Some(root.into());
        self
    }

    /// Set the tool cache directory.
    pub fn tools_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.tools_dir = Some(dir.into());
        self
    }

    /// Set the verbose level.
    pub fn verbose(mut self, level: u8) -> Self {
        self.verbose = level;
        self
    }

    /// Enable quiet mode.
    pub fn quiet(mut self, enabled: bool) -> Self {
        self.quiet = enabled;
        self
    }

    /// Set the command.
    pub fn command(mut self, command: Commands) -> Self {
        self.command = Some(command);
        self
    }

    /// Build the Cli instance.
    pub fn build(self) -> Result<Cli> {
        let command = self.command.ok_or(SplicerError::ConfigError {
            message: "Command is required".to_string(),
        })?;

        Ok(Cli {
            global_opts: GlobalOpts::builder()
                .project_root(self.project_root.unwrap_or_else(|| PathBuf::from(".")))
                .tools_dir(self.tools_dir)
                .verbose(self.verbose)
                .quiet(self.quiet)
                .build(),
            command,
        })
    }
}

/// Normalize a path to be absolute and clean, without requiring it to exist.
///
/// Relative paths are joined onto the current directory; `.` components are
/// dropped and `..` pops its predecessor where possible. Symlinks are not
/// resolved.
fn normalize_path(path: impl AsRef<Path>) -> PathBuf {
    let path = path.as_ref();
    let absolute = if path.is_relative() {
        std::env::current_dir()
            .unwrap_or_else(|_| PathBuf::from("."))
            .join(path)
    } else {
        path.to_path_buf()
    };

    let mut result = PathBuf::new();
    for component in absolute.components() {
        match component {
            Component::CurDir => {}
            Component::ParentDir => {
                if !result.pop() {
                    result.push(component);
                }
            }
            _ => result.push(component),
        }
    }
    result
}

/// Available splicer subcommands: the full pipeline plus one command per
/// stage.
#[derive(Debug, Subcommand)]
pub enum Commands {
    /// Run the full build pipeline
    ///
    /// Executes every stage in fixed order: format, clean, generate,
    /// compile, test, javadoc, jar, jdeps. The first failing stage aborts
    /// the rest and the process exits non-zero naming the stage.
    Build {
        /// Rewrite sources in place during the format stage instead of
        /// validating them
        #[arg(long, env = "SPLICER_FORMAT_REPLACE")]
        replace: bool,
    },

    /// Check (or rewrite) source formatting with the external formatter
    Format {
        /// Rewrite sources in place instead of validating them
        #[arg(long, env = "SPLICER_FORMAT_REPLACE")]
        replace: bool,
    },

    /// Delete the build output directory
    Clean,

    /// Regenerate the published single-file source
    ///
    /// Splices the configured source modules into one unit, hoisting their
    /// import declarations into a single sorted block, and replaces the
    /// published file only if content (ignoring the generation timestamp
    /// line) actually changed.
    Generate,

    /// Compile main and test sources
    Compile,

    /// Run the test suite via the console test runner
    Test,

    /// Generate API documentation for the published file
    Javadoc,

    /// Package the compiled classes, sources, and documentation archives
    Jar,

    /// Analyze the packaged archive's module dependencies
    Jdeps,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cli_parsing() {
        let cli = Cli::parse_from(["splicer", "generate"]);
        assert!(matches!(cli.command(), Commands::Generate));
        assert_eq!(cli.global_opts().project_root(), Path::new("."));
        assert!(cli.global_opts().tools_dir().is_none());
        assert!(
            cli.global_opts()
                .get_tools_dir()
                .ends_with(".splicer/tools")
        );
        assert_eq!(cli.global_opts().verbose(), 0);
        assert!(!cli.global_opts().quiet());
    }

    #[test]
    fn test_verbose_flag() {
        let cli = Cli::parse_from(["splicer", "-vv", "clean"]);
        assert_eq!(cli.global_opts().verbose(), 2);
        assert!(matches!(cli.command(), Commands::Clean));
    }

    #[test]
    fn test_build_replace_flag() {
        let cli = Cli::parse_from(["splicer", "build", "--replace"]);
        assert!(matches!(cli.command(), Commands::Build { replace: true }));

        let cli = Cli::parse_from(["splicer", "build"]);
        assert!(matches!(cli.command(), Commands::Build { replace: false }));
    }

    #[test]
    fn test_custom_tools_dir() {
        let cli = Cli::parse_from(["splicer", "--tools-dir", "cache/tools", "format"]);
        assert_eq!(
            cli.global_opts().tools_dir(),
            Some(Path::new("cache/tools"))
        );
        assert!(cli.global_opts().get_tools_dir().ends_with("cache/tools"));
        assert!(matches!(cli.command(), Commands::Format { replace: false }));
    }

    #[test]
    fn test_global_flag_positioning() {
        // Global flags can be placed anywhere
        let cli = Cli::parse_from(["splicer", "jdeps", "--verbose"]);
        assert_eq!(cli.global_opts().verbose(), 1);
        assert!(matches!(cli.command(), Commands::Jdeps));
    }

    #[test]
    fn test_cli_builder() {
        let cli = Cli::builder()
            .project_root("work/project")
            .verbose(2)
            .command(Commands::Generate)
            .build()
            .expect("Failed to build CLI");

        assert_eq!(
            cli.global_opts().project_root(),
            Path::new("work/project")
        );
        assert_eq!(cli.global_opts().verbose(), 2);
        assert!(matches!(cli.command(), Commands::Generate));

        let missing = Cli::builder().build();
        assert!(missing.is_err());
    }

    #[test]
    fn test_normalize_path() {
        let normalized = normalize_path("./target/./build");
        assert!(normalized.is_absolute());
        assert!(!normalized.to_string_lossy().contains("/./"));

        let normalized = normalize_path("target/../other/target");
        assert!(normalized.is_absolute());
        assert!(normalized.ends_with("other/target"));

        let abs = PathBuf::from("/opt/project");
        assert_eq!(normalize_path(&abs), abs);
    }
}
