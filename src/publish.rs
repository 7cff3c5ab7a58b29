//! Conditional publication of the generated unit.
//!
//! The freshly merged source is always written to a scratch path, but the
//! published copy at the repository root is only replaced when content
//! actually changed. The first line of both files embeds a generation
//! timestamp and is blanked before comparison so it never triggers a
//! rewrite. Replacement goes through a temporary file in the destination
//! directory followed by a rename, so a killed process cannot leave a
//! half-written published file.

use std::fs;
use std::io::Write;
use std::path::Path;

use tempfile::NamedTempFile;

use crate::error::{Result, SplicerError};
use crate::logging::Logger;

/// blake3 hash of `lines` with the first line blanked, as lowercase hex.
fn normalized_hash(lines: &[String]) -> String {
    let mut hasher = blake3::Hasher::new();
    for (index, line) in lines.iter().enumerate() {
        if index > 0 {
            hasher.update(line.as_bytes());
        }
        hasher.update(b"\n");
    }
    hasher.finalize().to_hex().to_string()
}

fn write_lines(path: &Path, lines: &[String]) -> Result<()> {
    let mut content = lines.join("\n");
    content.push('\n');
    fs::write(path, content).map_err(|source| SplicerError::io(path, source))
}

/// Write `generated` to `generated_path` and replace `published_path` with
/// it if their normalized content differs.
///
/// Returns whether the published file was replaced. Running generation twice
/// without source edits in between yields `true` then `false`: the second
/// run sees identical normalized content and leaves the published file
/// untouched.
pub fn publish_if_changed(
    generated: &[String],
    generated_path: &Path,
    published_path: &Path,
    log: &Logger,
) -> Result<bool> {
    if let Some(parent) = generated_path.parent() {
        fs::create_dir_all(parent).map_err(|source| SplicerError::io(parent, source))?;
    }
    // The scratch copy is overwritten unconditionally.
    write_lines(generated_path, generated)?;
    log.info(format!("generated {}", generated_path.display()));

    let generated_hash = normalized_hash(generated);
    let published_hash = match fs::read_to_string(published_path) {
        Ok(content) => {
            let lines: Vec<String> = content.lines().map(str::to_string).collect();
            Some(normalized_hash(&lines))
        }
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => None,
        Err(source) => return Err(SplicerError::io(published_path, source)),
    };

    log.verbose(1, format!("generated hash is {generated_hash}"));
    match &published_hash {
        Some(hash) => log.verbose(1, format!("published hash is {hash}")),
        None => log.verbose(1, "published file does not exist yet"),
    }

    if published_hash.as_deref() == Some(generated_hash.as_str()) {
        log.info(format!("{} is up to date", published_path.display()));
        return Ok(false);
    }

    let parent = published_path.parent().ok_or_else(|| SplicerError::ConfigError {
        message: format!(
            "published path '{}' has no parent directory",
            published_path.display()
        ),
    })?;
    let mut temp = NamedTempFile::new_in(parent).map_err(|source| SplicerError::io(parent, source))?;
    let mut content = generated.join("\n");
    content.push('\n');
    temp.write_all(content.as_bytes())
        .map_err(|source| SplicerError::io(temp.path().to_path_buf(), source))?;
    temp.persist(published_path)
        .map_err(|e| SplicerError::io(published_path, e.error))?;

    log.info(format!(
        "copied new {} version - don't forget to publish (commit/push)",
        published_path.display()
    ));
    Ok(true)
}
