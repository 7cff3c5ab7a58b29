//! Build configuration.
//!
//! Every fixed path, tool coordinate, and version string the pipeline uses
//! lives in one immutable [`BuildConfig`] passed into the stages at
//! construction time. Nothing here is derived at runtime beyond joining
//! paths onto the project root.

use std::path::PathBuf;

/// Which mode the external formatter runs in.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum FormatMode {
    /// Check formatting and fail on violations (CI default).
    Validate,
    /// Rewrite files in place.
    Replace,
}

impl FormatMode {
    /// The formatter's command-line flag for this mode.
    pub fn flag(self) -> &'static str {
        match self {
            FormatMode::Validate => "--dry-run",
            FormatMode::Replace => "--replace",
        }
    }
}

/// Immutable configuration for one pipeline run.
#[derive(Clone, Debug)]
pub struct BuildConfig {
    /// Repository root the build operates in
    pub project_root: PathBuf,
    /// Cache directory for downloaded tool and library jars
    pub tools_dir: PathBuf,
    /// Main source root
    pub source_main: PathBuf,
    /// Test source root
    pub source_test: PathBuf,
    /// Root for all build output
    pub target_dir: PathBuf,
    /// Compiled main classes
    pub classes_main: PathBuf,
    /// Compiled test classes
    pub classes_test: PathBuf,
    /// Generated API documentation
    pub javadoc_dir: PathBuf,
    /// Packaged archives
    pub artifacts_dir: PathBuf,

    /// Base name for packaged archives (`<name>.jar`, `<name>-sources.jar`, ...)
    pub artifact_name: String,
    /// The published single-file source at the repository root
    pub published_file: PathBuf,
    /// Source modules spliced into the published file, in emission order
    pub modules: Vec<PathBuf>,
    /// Line separating a module's private header from its publishable body
    pub sentinel: String,
    /// Prefix identifying import declarations hoisted into the shared block
    pub import_prefix: String,
    /// License/header lines emitted after the generation timestamp
    pub header: Vec<String>,

    /// Formatter mode for the format stage
    pub format_mode: FormatMode,
    /// URI of the formatter's self-contained jar
    pub formatter_uri: String,
    /// Cache file name for the formatter jar
    pub formatter_file: String,

    /// Remote repository base URL for library resolution
    pub repository_base: String,
    /// JUnit Jupiter version
    pub junit_jupiter_version: String,
    /// JUnit Platform version
    pub junit_platform_version: String,
    /// OpenTest4J version
    pub opentest4j_version: String,
    /// Cross-reference link base for the javadoc stage
    pub javadoc_link: String,
}

impl BuildConfig {
    /// Default configuration rooted at `project_root`.
    pub fn new(project_root: impl Into<PathBuf>) -> Self {
        let root = project_root.into();
        let target = root.join("target").join("build");
        let formatter_version = "1.22.0";
        Self {
            tools_dir: root.join(".splicer").join("tools"),
            source_main: root.join("src").join("main").join("java"),
            source_test: root.join("src").join("test").join("java"),
            classes_main: target.join("classes").join("main"),
            classes_test: target.join("classes").join("test"),
            javadoc_dir: target.join("javadoc"),
            artifacts_dir: target.join("artifacts"),
            target_dir: target,
            artifact_name: "tool".to_string(),
            published_file: root.join("Tool.java"),
            modules: Vec::new(),
            sentinel: "// -- publish --".to_string(),
            import_prefix: "import ".to_string(),
            header: Vec::new(),
            format_mode: FormatMode::Validate,
            formatter_uri: format!(
                "https://repo1.maven.org/maven2/com/google/googlejavaformat/google-java-format/{v}/google-java-format-{v}-all-deps.jar",
                v = formatter_version
            ),
            formatter_file: format!("google-java-format-{formatter_version}-all-deps.jar"),
            repository_base: "https://repo1.maven.org/maven2".to_string(),
            junit_jupiter_version: "5.10.2".to_string(),
            junit_platform_version: "1.10.2".to_string(),
            opentest4j_version: "1.3.0".to_string(),
            javadoc_link: "https://docs.oracle.com/en/java/javase/21/docs/api".to_string(),
            project_root: root,
        }
    }

    /// Path of the generated scratch copy of the published file.
    pub fn generated_file(&self) -> PathBuf {
        let name = self
            .published_file
            .file_name()
            .map(|n| n.to_os_string())
            .unwrap_or_else(|| "Generated".into());
        self.target_dir.join(name)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_paths_rooted_at_project() {
        let config = BuildConfig::new("/work/project");
        assert!(config.target_dir.starts_with("/work/project"));
        assert!(config.classes_main.starts_with(&config.target_dir));
        assert!(config.artifacts_dir.starts_with(&config.target_dir));
        assert_eq!(
            config.generated_file(),
            config.target_dir.join("Tool.java")
        );
    }

    #[test]
    fn test_format_mode_flags() {
        assert_eq!(FormatMode::Validate.flag(), "--dry-run");
        assert_eq!(FormatMode::Replace.flag(), "--replace");
    }
}
