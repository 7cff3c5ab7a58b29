use std::fs;
use std::path::Path;

use assert_fs::TempDir;
use splicer::cli::{Cli, Commands};
use splicer::commands::execute;
use splicer::error::Result;

/// Create a project with two source modules ready for splicing.
///
/// Each module carries a private header (license note plus imports) ended by
/// the sentinel line, followed by its publishable body.
pub fn setup_project() -> TempDir {
    let temp_dir = TempDir::new().unwrap();
    let sources = temp_dir.path().join("src/main/java");
    fs::create_dir_all(&sources).unwrap();

    fs::write(
        sources.join("Alpha.java"),
        "// internal build header\n\
         import java.util.List;\n\
         import java.util.Map;\n\
         // -- publish --\n\
         class Alpha {}\n",
    )
    .unwrap();

    fs::write(
        sources.join("Beta.java"),
        "// internal build header\n\
         import java.util.List;\n\
         import java.io.IOException;\n\
         // -- publish --\n\
         class Beta {}\n",
    )
    .unwrap();

    temp_dir
}

/// Execute one splicer command against `project_root` through the library.
pub fn run(command: Commands, project_root: &Path) -> Result<()> {
    let cli = Cli::builder()
        .project_root(project_root)
        .quiet(true)
        .command(command)
        .build()?;
    execute(&cli)
}
