//! External command construction and execution.
//!
//! Every build stage drives its external tools through [`CommandBuilder`]: an
//! ordered argument list built up incrementally, with a mark/reset checkpoint
//! so a shared command prefix can be replayed with different suffixes (the
//! jar stage packages three archives from one prefix this way).

use std::ffi::OsString;
use std::path::Path;
use std::process::{Command, Stdio};

use walkdir::WalkDir;

use crate::error::{Result, SplicerError};

/// How the child process's stdout/stderr are handled.
///
/// Some stages stream tool output live to the console (javac, the test
/// runner); others want a silent run with stderr captured for the error
/// report.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum OutputMode {
    /// Child inherits the driver's stdio; output is visible as it happens.
    #[default]
    Inherit,
    /// Child output is collected; stderr is carried in the failure condition.
    Capture,
}

/// An external command under construction.
///
/// The argument list is mutable only through append operations; a recorded
/// mark can later truncate the list back to a checkpoint, discarding
/// everything appended after it.
#[derive(Debug)]
pub struct CommandBuilder {
    program: String,
    args: Vec<OsString>,
    mark: Option<usize>,
    output: OutputMode,
}

impl CommandBuilder {
    /// Start building a command for `program`.
    pub fn new(program: impl Into<String>) -> Self {
        Self {
            program: program.into(),
            args: Vec::new(),
            mark: None,
            output: OutputMode::default(),
        }
    }

    /// Set how child output is handled (default: inherit).
    pub fn output(mut self, mode: OutputMode) -> Self {
        self.output = mode;
        self
    }

    /// Append one argument token.
    pub fn add(&mut self, token: impl Into<OsString>) -> &mut Self {
        self.args.push(token.into());
        self
    }

    /// Append the path of every file under `root` satisfying `predicate`.
    ///
    /// Traversal is sorted by file name, so the resulting argument order is
    /// deterministic across platforms. Files failing the predicate are
    /// skipped silently; directories are never appended.
    pub fn add_all(
        &mut self,
        root: &Path,
        mut predicate: impl FnMut(&Path) -> bool,
    ) -> Result<&mut Self> {
        for entry in WalkDir::new(root).sort_by_file_name() {
            let entry = entry.map_err(|e| {
                let path = e.path().unwrap_or(root).to_path_buf();
                SplicerError::io(path, e.into())
            })?;
            if entry.file_type().is_file() && predicate(entry.path()) {
                self.args.push(entry.path().as_os_str().to_os_string());
            }
        }
        Ok(self)
    }

    /// Record a checkpoint at `current length - offset`.
    ///
    /// A later [`reset_to_mark`](Self::reset_to_mark) truncates the argument
    /// list back to the checkpoint, so the tokens before it form a reusable
    /// prefix.
    pub fn mark(&mut self, offset: usize) -> Result<&mut Self> {
        let len = self.args.len();
        if offset > len {
            return Err(SplicerError::InvalidMark { offset, len });
        }
        self.mark = Some(len - offset);
        Ok(self)
    }

    /// Truncate the argument list back to the recorded mark.
    pub fn reset_to_mark(&mut self) -> Result<&mut Self> {
        let Some(mark) = self.mark else {
            return Err(SplicerError::InvalidMark {
                offset: 0,
                len: self.args.len(),
            });
        };
        self.args.truncate(mark);
        Ok(self)
    }

    /// Emit the program and every argument, one token per line, to `sink`.
    ///
    /// Purely observational; execution semantics are unaffected.
    pub fn dump(&mut self, mut sink: impl FnMut(&str)) -> &mut Self {
        sink(&self.program);
        for arg in &self.args {
            sink(&arg.to_string_lossy());
        }
        self
    }

    /// The program token.
    pub fn program(&self) -> &str {
        &self.program
    }

    /// The current argument tokens, lossily decoded for inspection.
    pub fn arguments(&self) -> Vec<String> {
        self.args
            .iter()
            .map(|a| a.to_string_lossy().into_owned())
            .collect()
    }

    /// Spawn the command and wait for completion.
    ///
    /// Succeeds silently on exit code zero. A non-zero exit surfaces as
    /// [`SplicerError::NonZeroExit`] carrying the code and, in capture mode,
    /// the child's stderr text.
    pub fn execute(&mut self) -> Result<()> {
        let mut command = Command::new(&self.program);
        command.args(&self.args);

        let (status, stderr) = match self.output {
            OutputMode::Inherit => {
                let status = command
                    .stdin(Stdio::null())
                    .status()
                    .map_err(|source| SplicerError::SpawnError {
                        program: self.program.clone(),
                        source,
                    })?;
                (status, String::new())
            }
            OutputMode::Capture => {
                let output = command
                    .stdin(Stdio::null())
                    .output()
                    .map_err(|source| SplicerError::SpawnError {
                        program: self.program.clone(),
                        source,
                    })?;
                (
                    output.status,
                    String::from_utf8_lossy(&output.stderr).into_owned(),
                )
            }
        };

        if status.success() {
            return Ok(());
        }
        Err(SplicerError::NonZeroExit {
            program: self.program.clone(),
            code: status.code().unwrap_or(-1),
            stderr,
        })
    }
}

#[cfg(test)]
mod tests {
    use std::fs;

    use tempfile::TempDir;

    use super::*;

    #[test]
    fn test_replay_prefix_after_reset() {
        let mut command = CommandBuilder::new("javac");
        command.add("-g");
        command.mark(0).unwrap();
        command.add("A.java");
        assert_eq!(command.arguments(), ["-g", "A.java"]);

        command.reset_to_mark().unwrap();
        command.add("B.java");
        assert_eq!(command.arguments(), ["-g", "B.java"]);
    }

    #[test]
    fn test_mark_offset_counts_back_from_end() {
        let mut command = CommandBuilder::new("jar");
        command.add("--create").add("--file").add("out.jar");
        command.mark(2).unwrap();
        command.reset_to_mark().unwrap();
        assert_eq!(command.arguments(), ["--create"]);
    }

    #[test]
    fn test_mark_offset_beyond_length() {
        let mut command = CommandBuilder::new("jar");
        command.add("--create");
        let err = command.mark(5).unwrap_err();
        assert!(matches!(
            err,
            SplicerError::InvalidMark { offset: 5, len: 1 }
        ));
    }

    #[test]
    fn test_reset_without_mark() {
        let mut command = CommandBuilder::new("jar");
        command.add("--create");
        assert!(matches!(
            command.reset_to_mark(),
            Err(SplicerError::InvalidMark { .. })
        ));
    }

    #[test]
    fn test_add_all_filters_and_sorts() {
        let temp_dir = TempDir::new().unwrap();
        let root = temp_dir.path();
        fs::create_dir(root.join("sub")).unwrap();
        fs::write(root.join("b.java"), "").unwrap();
        fs::write(root.join("a.java"), "").unwrap();
        fs::write(root.join("notes.txt"), "").unwrap();
        fs::write(root.join("sub/c.java"), "").unwrap();

        let mut command = CommandBuilder::new("javac");
        command
            .add_all(root, |p| p.extension().is_some_and(|e| e == "java"))
            .unwrap();

        let args = command.arguments();
        assert_eq!(args.len(), 3);
        assert!(args[0].ends_with("a.java"));
        assert!(args[1].ends_with("b.java"));
        assert!(args[2].ends_with("c.java"));
    }

    #[test]
    fn test_add_all_missing_root() {
        let temp_dir = TempDir::new().unwrap();
        let mut command = CommandBuilder::new("javac");
        let result = command.add_all(&temp_dir.path().join("absent"), |_| true);
        assert!(matches!(result, Err(SplicerError::IoError { .. })));
    }

    #[test]
    fn test_dump_emits_program_and_tokens() {
        let mut command = CommandBuilder::new("java");
        command.add("-jar").add("tool.jar");
        let mut lines = Vec::new();
        command.dump(|line| lines.push(line.to_string()));
        assert_eq!(lines, ["java", "-jar", "tool.jar"]);
    }

    #[test]
    #[cfg(unix)]
    fn test_execute_success() {
        let mut command = CommandBuilder::new("true");
        command.execute().unwrap();
    }

    #[test]
    #[cfg(unix)]
    fn test_execute_nonzero_captures_stderr() {
        let mut command = CommandBuilder::new("sh").output(OutputMode::Capture);
        command.add("-c").add("echo oops >&2; exit 3");
        let err = command.execute().unwrap_err();
        match err {
            SplicerError::NonZeroExit {
                program,
                code,
                stderr,
            } => {
                assert_eq!(program, "sh");
                assert_eq!(code, 3);
                assert!(stderr.contains("oops"));
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn test_execute_missing_program() {
        let mut command = CommandBuilder::new("definitely-not-a-real-tool-3141");
        assert!(matches!(
            command.execute(),
            Err(SplicerError::SpawnError { .. })
        ));
    }
}
