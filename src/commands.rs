//! Implementation of splicer subcommands and the build pipeline.
//!
//! The entry point is [`execute`], which dispatches the parsed CLI to either
//! the full pipeline or a single stage. Stages run strictly in the fixed
//! order of [`Stage::ORDER`]; the first failure aborts everything after it
//! and is reported wrapped in the failing stage's name.

use std::fmt;
use std::fs;
use std::path::{Path, PathBuf};

use chrono::{SecondsFormat, Utc};
use walkdir::WalkDir;

use crate::cache::ToolCache;
use crate::cli::{Cli, Commands};
use crate::command::{CommandBuilder, OutputMode};
use crate::config::{BuildConfig, FormatMode};
use crate::error::{Result, SplicerError};
use crate::logging::Logger;
use crate::merge::merge;
use crate::publish::publish_if_changed;

/// One named, ordered step of the build pipeline.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Stage {
    Format,
    Clean,
    Generate,
    Compile,
    Test,
    Javadoc,
    Jar,
    Jdeps,
}

impl Stage {
    /// The fixed execution order of the pipeline.
    pub const ORDER: [Stage; 8] = [
        Stage::Format,
        Stage::Clean,
        Stage::Generate,
        Stage::Compile,
        Stage::Test,
        Stage::Javadoc,
        Stage::Jar,
        Stage::Jdeps,
    ];

    /// Lowercase stage name as used in banners and failure reports.
    pub fn name(self) -> &'static str {
        match self {
            Stage::Format => "format",
            Stage::Clean => "clean",
            Stage::Generate => "generate",
            Stage::Compile => "compile",
            Stage::Test => "test",
            Stage::Javadoc => "javadoc",
            Stage::Jar => "jar",
            Stage::Jdeps => "jdeps",
        }
    }
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Everything a stage needs: configuration, logging, and the tool cache.
pub struct BuildContext {
    config: BuildConfig,
    log: Logger,
    cache: ToolCache,
}

impl BuildContext {
    /// Build a context from configuration and verbosity settings.
    pub fn new(config: BuildConfig, verbose: u8, quiet: bool) -> Self {
        let cache = ToolCache::new(config.tools_dir.clone(), config.repository_base.clone());
        Self {
            config,
            log: Logger::new(verbose, quiet),
            cache,
        }
    }

    /// The configuration this context runs with.
    pub fn config(&self) -> &BuildConfig {
        &self.config
    }
}

/// Execute the command specified by the parsed CLI.
pub fn execute(cli: &Cli) -> Result<()> {
    let opts = cli.global_opts();
    let mut config = BuildConfig::new(opts.get_project_root());
    config.tools_dir = opts.get_tools_dir();

    if matches!(
        cli.command(),
        Commands::Build { replace: true } | Commands::Format { replace: true }
    ) {
        config.format_mode = FormatMode::Replace;
    }

    let ctx = BuildContext::new(config, opts.verbose(), opts.quiet());
    match cli.command() {
        Commands::Build { .. } => run_pipeline(&ctx),
        Commands::Format { .. } => run_stage(&ctx, Stage::Format),
        Commands::Clean => run_stage(&ctx, Stage::Clean),
        Commands::Generate => run_stage(&ctx, Stage::Generate),
        Commands::Compile => run_stage(&ctx, Stage::Compile),
        Commands::Test => run_stage(&ctx, Stage::Test),
        Commands::Javadoc => run_stage(&ctx, Stage::Javadoc),
        Commands::Jar => run_stage(&ctx, Stage::Jar),
        Commands::Jdeps => run_stage(&ctx, Stage::Jdeps),
    }
}

/// Run all stages in fixed order, aborting at the first failure.
pub fn run_pipeline(ctx: &BuildContext) -> Result<()> {
    run_stages(&Stage::ORDER, |stage| run_stage(ctx, stage))
}

/// Drive `run` over `stages` in order; the first failure is wrapped in the
/// failing stage's name and stops the iteration.
pub fn run_stages(stages: &[Stage], mut run: impl FnMut(Stage) -> Result<()>) -> Result<()> {
    for &stage in stages {
        run(stage).map_err(|source| SplicerError::StageFailed {
            stage: stage.name(),
            source: Box::new(source),
        })?;
    }
    Ok(())
}

/// Run a single stage, printing its banner first.
pub fn run_stage(ctx: &BuildContext, stage: Stage) -> Result<()> {
    ctx.log.stage(stage);
    match stage {
        Stage::Format => format_sources(ctx),
        Stage::Clean => clean(ctx),
        Stage::Generate => generate(ctx),
        Stage::Compile => compile(ctx),
        Stage::Test => test(ctx),
        Stage::Javadoc => javadoc(ctx),
        Stage::Jar => jar(ctx),
        Stage::Jdeps => jdeps(ctx),
    }
}

/// A source file the formatter and compiler should see.
fn is_source_file(path: &Path) -> bool {
    path.extension().is_some_and(|ext| ext == "java")
        && path
            .file_name()
            .is_none_or(|name| name != "module-info.java")
}

/// The source modules spliced into the published file, in emission order.
///
/// An explicitly configured module list wins; otherwise every source file
/// under the main source root, in sorted order.
fn source_modules(config: &BuildConfig) -> Result<Vec<PathBuf>> {
    if !config.modules.is_empty() {
        return Ok(config.modules.clone());
    }
    let mut modules = Vec::new();
    for entry in WalkDir::new(&config.source_main).sort_by_file_name() {
        let entry = entry.map_err(|e| {
            let path = e.path().unwrap_or(&config.source_main).to_path_buf();
            SplicerError::io(path, e.into())
        })?;
        if entry.file_type().is_file() && is_source_file(entry.path()) {
            modules.push(entry.path().to_path_buf());
        }
    }
    Ok(modules)
}

fn class_path(entries: &[PathBuf]) -> String {
    let separator = if cfg!(windows) { ";" } else { ":" };
    entries
        .iter()
        .map(|p| p.to_string_lossy().into_owned())
        .collect::<Vec<_>>()
        .join(separator)
}

/// format: run the external formatter over every source file.
fn format_sources(ctx: &BuildContext) -> Result<()> {
    let config = &ctx.config;
    let formatter = ctx.cache.resolve_by_uri(
        &config.formatter_uri,
        &config.tools_dir.join("google-java-format"),
        Some(&config.formatter_file),
        None,
    )?;

    let mut command = CommandBuilder::new("java");
    command.add("-jar").add(formatter);
    command.add(config.format_mode.flag());
    if config.format_mode == FormatMode::Validate {
        command.add("--set-exit-if-changed");
    }
    for root in [&config.source_main, &config.source_test] {
        if root.is_dir() {
            command.add_all(root, is_source_file)?;
        }
    }
    command.dump(|line| ctx.log.verbose(1, line));
    command.execute()
}

/// clean: delete the build output directory.
fn clean(ctx: &BuildContext) -> Result<()> {
    let target = &ctx.config.target_dir;
    if target.exists() {
        fs::remove_dir_all(target).map_err(|source| SplicerError::io(target, source))?;
        ctx.log.info(format!("deleted {}", target.display()));
    } else {
        ctx.log.verbose(1, format!("nothing to delete at {}", target.display()));
    }
    Ok(())
}

/// generate: splice the source modules into the published single-file
/// source, replacing it only on a real content change.
fn generate(ctx: &BuildContext) -> Result<()> {
    let config = &ctx.config;
    let modules = source_modules(config)?;
    if modules.is_empty() {
        return Err(SplicerError::ConfigError {
            message: format!(
                "no source modules found under '{}'",
                config.source_main.display()
            ),
        });
    }

    // First line is the generation timestamp; it is blanked before the
    // change comparison and must stay on line one.
    let mut header = vec![format!(
        "/* THIS FILE IS GENERATED -- {} */",
        Utc::now().to_rfc3339_opts(SecondsFormat::Secs, true)
    )];
    header.extend(config.header.iter().cloned());
    header.push(String::new());
    let import_index = header.len();
    header.push(String::new());

    let merged = merge(
        &header,
        import_index,
        &modules,
        &config.sentinel,
        &config.import_prefix,
    )?;

    publish_if_changed(
        &merged,
        &config.generated_file(),
        &config.published_file,
        &ctx.log,
    )?;
    Ok(())
}

/// compile: main classes from the generated file, then test classes against
/// them and the resolved test libraries.
fn compile(ctx: &BuildContext) -> Result<()> {
    let config = &ctx.config;

    fs::create_dir_all(&config.classes_main)
        .map_err(|source| SplicerError::io(&config.classes_main, source))?;
    let mut main = CommandBuilder::new("javac");
    main.add("-g").add("-d").add(config.classes_main.clone());
    main.add(config.generated_file());
    main.dump(|line| ctx.log.verbose(1, line));
    main.execute()?;

    if !config.source_test.is_dir() {
        ctx.log.verbose(1, "no test sources to compile");
        return Ok(());
    }

    let jupiter = ctx.cache.resolve_library(
        "org.junit.jupiter",
        "junit-jupiter-api",
        &config.junit_jupiter_version,
    )?;
    let platform = ctx.cache.resolve_library(
        "org.junit.platform",
        "junit-platform-commons",
        &config.junit_platform_version,
    )?;
    let opentest4j = ctx.cache.resolve_library(
        "org.opentest4j",
        "opentest4j",
        &config.opentest4j_version,
    )?;

    fs::create_dir_all(&config.classes_test)
        .map_err(|source| SplicerError::io(&config.classes_test, source))?;
    let mut tests = CommandBuilder::new("javac");
    tests.add("-g").add("-d").add(config.classes_test.clone());
    tests.add("--class-path").add(class_path(&[
        config.classes_main.clone(),
        jupiter,
        platform,
        opentest4j,
    ]));
    tests.add_all(&config.source_test, is_source_file)?;
    tests.dump(|line| ctx.log.verbose(1, line));
    tests.execute()
}

/// test: run the console test runner over the compiled classes.
fn test(ctx: &BuildContext) -> Result<()> {
    let config = &ctx.config;
    let file = format!(
        "junit-platform-console-standalone-{}.jar",
        config.junit_platform_version
    );
    let uri = format!(
        "{}/org/junit/platform/junit-platform-console-standalone/{}/{}",
        config.repository_base, config.junit_platform_version, file
    );
    let runner = ctx.cache.resolve_by_uri(
        &uri,
        &config.tools_dir.join("junit-platform-console-standalone"),
        Some(&file),
        None,
    )?;

    let mut command = CommandBuilder::new("java").output(OutputMode::Inherit);
    command.add("-ea").add("-jar").add(runner);
    command.add("execute");
    command
        .add("--class-path")
        .add(config.classes_test.clone());
    command
        .add("--class-path")
        .add(config.classes_main.clone());
    command.add("--scan-classpath");
    command.execute()
}

/// javadoc: document the published file.
fn javadoc(ctx: &BuildContext) -> Result<()> {
    let config = &ctx.config;
    fs::create_dir_all(&config.javadoc_dir)
        .map_err(|source| SplicerError::io(&config.javadoc_dir, source))?;

    let mut command = CommandBuilder::new("javadoc");
    command
        .add("-quiet")
        .add("-Xdoclint:all,-missing")
        .add("-package")
        .add("-linksource")
        .add("-link")
        .add(config.javadoc_link.as_str())
        .add("-d")
        .add(config.javadoc_dir.clone())
        .add(config.published_file.clone());
    command.dump(|line| ctx.log.verbose(1, line));
    command.execute()
}

/// jar: package classes, sources, and documentation, replaying one shared
/// `jar --create` prefix for the three archives.
fn jar(ctx: &BuildContext) -> Result<()> {
    let config = &ctx.config;
    fs::create_dir_all(&config.artifacts_dir)
        .map_err(|source| SplicerError::io(&config.artifacts_dir, source))?;

    let name = &config.artifact_name;
    let archives = [
        (format!("{name}.jar"), &config.classes_main),
        (format!("{name}-sources.jar"), &config.source_main),
        (format!("{name}-javadoc.jar"), &config.javadoc_dir),
    ];

    let mut command = CommandBuilder::new("jar");
    command.add("--create");
    command.mark(0)?;
    for (archive, root) in archives {
        command.reset_to_mark()?;
        command
            .add("--file")
            .add(config.artifacts_dir.join(archive));
        command.add("-C").add(root.clone()).add(".");
        command.dump(|line| ctx.log.verbose(1, line));
        command.execute()?;
    }
    Ok(())
}

/// jdeps: dependency summary of the packaged archive.
fn jdeps(ctx: &BuildContext) -> Result<()> {
    let config = &ctx.config;
    let archive = config
        .artifacts_dir
        .join(format!("{}.jar", config.artifact_name));

    let mut command = CommandBuilder::new("jdeps");
    command.add("-summary").add("-recursive").add(archive);
    command.execute()
}
