//! Source module merging.
//!
//! The generate stage splices several source modules into one publishable
//! unit. Each module carries a private header terminated by a sentinel line;
//! the header is never copied, but any import declarations found in it are
//! hoisted into a shared block emitted once, sorted and deduplicated, at a
//! reserved index inside the output header.

use std::collections::BTreeSet;
use std::fs;
use std::path::{Path, PathBuf};

use crate::error::{Result, SplicerError};

/// Append the publishable body of `module` to `out`, collecting header
/// imports into `imports`.
///
/// Lines up to and including the sentinel are header: import declarations
/// among them are recorded, everything else is discarded. Lines after the
/// sentinel are appended verbatim. A module without the sentinel aborts with
/// [`SplicerError::MergeSentinelMissing`] rather than silently contributing
/// nothing.
pub fn merge_module(
    out: &mut Vec<String>,
    imports: &mut BTreeSet<String>,
    module: &Path,
    sentinel: &str,
    import_prefix: &str,
) -> Result<()> {
    let content =
        fs::read_to_string(module).map_err(|source| SplicerError::io(module, source))?;

    let mut head = true;
    for line in content.lines() {
        if head {
            if line.starts_with(import_prefix) {
                imports.insert(line.to_string());
            }
            if line == sentinel {
                head = false;
            }
            continue;
        }
        out.push(line.to_string());
    }

    if head {
        return Err(SplicerError::MergeSentinelMissing {
            path: module.to_path_buf(),
            sentinel: sentinel.to_string(),
        });
    }
    Ok(())
}

/// Merge `modules` into one generated unit.
///
/// The output starts with `header` verbatim; module bodies follow in module
/// order with exactly one blank line between consecutive modules. The
/// collected import set is spliced into the output at `import_index`, which
/// must point inside the header.
pub fn merge(
    header: &[String],
    import_index: usize,
    modules: &[PathBuf],
    sentinel: &str,
    import_prefix: &str,
) -> Result<Vec<String>> {
    if import_index > header.len() {
        return Err(SplicerError::ConfigError {
            message: format!(
                "import index {import_index} lies outside the {}-line output header",
                header.len()
            ),
        });
    }

    let mut out: Vec<String> = header.to_vec();
    let mut imports = BTreeSet::new();

    for (position, module) in modules.iter().enumerate() {
        if position > 0 {
            out.push(String::new());
        }
        merge_module(&mut out, &mut imports, module, sentinel, import_prefix)?;
    }

    out.splice(import_index..import_index, imports);
    Ok(out)
}
