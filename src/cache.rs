//! Tool and library artifact cache.
//!
//! External tools the pipeline needs (the formatter jar, the test runner,
//! library jars for the test class-path) are resolved to local files under
//! the cache directory, downloading only when absent. Nothing is invalidated
//! within a run; version strings are embedded in file names.

use std::fs;
use std::path::{Path, PathBuf};

use crate::error::{Result, SplicerError};

/// Transfers a remote resource to a local file.
///
/// The seam exists so tests can substitute a fake and count fetches; the
/// production implementation is [`HttpTransfer`].
pub trait Transfer {
    /// Fetch `uri` into the file at `dest`.
    fn fetch(&self, uri: &str, dest: &Path) -> Result<()>;
}

/// Blocking HTTP transfer.
pub struct HttpTransfer;

impl Transfer for HttpTransfer {
    fn fetch(&self, uri: &str, dest: &Path) -> Result<()> {
        let response = reqwest::blocking::get(uri).map_err(|e| SplicerError::DownloadError {
            uri: uri.to_string(),
            message: e.to_string(),
        })?;
        if !response.status().is_success() {
            return Err(SplicerError::DownloadError {
                uri: uri.to_string(),
                message: format!("HTTP {}", response.status()),
            });
        }
        let bytes = response.bytes().map_err(|e| SplicerError::DownloadError {
            uri: uri.to_string(),
            message: format!("failed to read response body: {e}"),
        })?;
        fs::write(dest, &bytes).map_err(|e| SplicerError::DownloadError {
            uri: uri.to_string(),
            message: format!("failed to write '{}': {e}", dest.display()),
        })?;
        Ok(())
    }
}

/// Resolves named external artifacts to local file paths.
pub struct ToolCache {
    tools_dir: PathBuf,
    repository_base: String,
    transfer: Box<dyn Transfer>,
}

impl ToolCache {
    /// Cache rooted at `tools_dir`, resolving libraries from
    /// `repository_base`, downloading over HTTP.
    pub fn new(tools_dir: impl Into<PathBuf>, repository_base: impl Into<String>) -> Self {
        Self::with_transfer(tools_dir, repository_base, Box::new(HttpTransfer))
    }

    /// Cache with a custom transfer implementation.
    pub fn with_transfer(
        tools_dir: impl Into<PathBuf>,
        repository_base: impl Into<String>,
        transfer: Box<dyn Transfer>,
    ) -> Self {
        Self {
            tools_dir: tools_dir.into(),
            repository_base: repository_base.into(),
            transfer,
        }
    }

    /// The cache root for downloaded tools.
    pub fn tools_dir(&self) -> &Path {
        &self.tools_dir
    }

    /// Resolve `uri` to a local file under `destination_dir`.
    ///
    /// An existing file (matched by name, optionally validated by `accept`)
    /// short-circuits without network access; otherwise the resource is
    /// downloaded, creating parent directories as needed. Idempotent within
    /// a run.
    pub fn resolve_by_uri(
        &self,
        uri: &str,
        destination_dir: &Path,
        file_name_hint: Option<&str>,
        accept: Option<&dyn Fn(&Path) -> bool>,
    ) -> Result<PathBuf> {
        let file_name = match file_name_hint {
            Some(name) => name.to_string(),
            None => uri
                .rsplit('/')
                .next()
                .filter(|s| !s.is_empty())
                .ok_or_else(|| SplicerError::ConfigError {
                    message: format!("cannot derive a file name from URI '{uri}'"),
                })?
                .to_string(),
        };

        let destination = destination_dir.join(&file_name);
        if destination.is_file() && accept.is_none_or(|accept| accept(&destination)) {
            return Ok(destination);
        }

        fs::create_dir_all(destination_dir)
            .map_err(|source| SplicerError::io(destination_dir, source))?;
        self.transfer.fetch(uri, &destination)?;
        Ok(destination)
    }

    /// Resolve a `group:artifact:version` library coordinate to a local jar.
    ///
    /// The coordinate maps deterministically into the cache path and file
    /// name; same download-if-absent semantics as
    /// [`resolve_by_uri`](Self::resolve_by_uri).
    pub fn resolve_library(&self, group: &str, artifact: &str, version: &str) -> Result<PathBuf> {
        let file_name = format!("{artifact}-{version}.jar");
        let uri = format!(
            "{base}/{group}/{artifact}/{version}/{file_name}",
            base = self.repository_base,
            group = group.replace('.', "/"),
        );
        let destination_dir = self.tools_dir.join(artifact);
        self.resolve_by_uri(&uri, &destination_dir, Some(&file_name), None)
    }
}

#[cfg(test)]
mod tests {
    use std::fs;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc;

    use tempfile::TempDir;

    use super::*;

    /// Transfer fake that records every fetch.
    struct CountingTransfer {
        calls: Arc<AtomicUsize>,
        payload: &'static str,
    }

    impl Transfer for CountingTransfer {
        fn fetch(&self, _uri: &str, dest: &Path) -> Result<()> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            fs::write(dest, self.payload).map_err(|source| SplicerError::io(dest, source))
        }
    }

    fn counting_cache(tools_dir: &Path) -> (ToolCache, Arc<AtomicUsize>) {
        let calls = Arc::new(AtomicUsize::new(0));
        let cache = ToolCache::with_transfer(
            tools_dir,
            "https://repo.example.org/maven2",
            Box::new(CountingTransfer {
                calls: Arc::clone(&calls),
                payload: "jar-bytes",
            }),
        );
        (cache, calls)
    }

    #[test]
    fn test_resolve_by_uri_downloads_once() {
        let temp_dir = TempDir::new().unwrap();
        let (cache, calls) = counting_cache(temp_dir.path());
        let dest_dir = temp_dir.path().join("formatter");

        let uri = "https://repo.example.org/tools/formatter-1.0.jar";
        let first = cache.resolve_by_uri(uri, &dest_dir, None, None).unwrap();
        let second = cache.resolve_by_uri(uri, &dest_dir, None, None).unwrap();

        assert_eq!(first, second);
        assert_eq!(first, dest_dir.join("formatter-1.0.jar"));
        assert_eq!(calls.load(Ordering::SeqCst), 1);
        assert_eq!(fs::read_to_string(&first).unwrap(), "jar-bytes");
    }

    #[test]
    fn test_resolve_by_uri_honors_file_name_hint() {
        let temp_dir = TempDir::new().unwrap();
        let (cache, _) = counting_cache(temp_dir.path());
        let dest_dir = temp_dir.path().join("tools");

        let path = cache
            .resolve_by_uri(
                "https://repo.example.org/some/opaque/path",
                &dest_dir,
                Some("runner.jar"),
                None,
            )
            .unwrap();
        assert_eq!(path, dest_dir.join("runner.jar"));
    }

    #[test]
    fn test_resolve_by_uri_rejected_by_accept_redownloads() {
        let temp_dir = TempDir::new().unwrap();
        let (cache, calls) = counting_cache(temp_dir.path());
        let dest_dir = temp_dir.path().join("tools");
        fs::create_dir_all(&dest_dir).unwrap();
        fs::write(dest_dir.join("tool.jar"), "truncated").unwrap();

        let accept = |path: &Path| fs::metadata(path).map(|m| m.len() > 100).unwrap_or(false);
        cache
            .resolve_by_uri(
                "https://repo.example.org/tool.jar",
                &dest_dir,
                None,
                Some(&accept),
            )
            .unwrap();
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn test_resolve_library_coordinate_mapping() {
        let temp_dir = TempDir::new().unwrap();
        let (cache, calls) = counting_cache(temp_dir.path());

        let path = cache
            .resolve_library("org.junit.jupiter", "junit-jupiter-api", "5.10.2")
            .unwrap();
        assert_eq!(
            path,
            temp_dir
                .path()
                .join("junit-jupiter-api")
                .join("junit-jupiter-api-5.10.2.jar")
        );
        assert_eq!(calls.load(Ordering::SeqCst), 1);

        // Second resolution reuses the cached jar.
        cache
            .resolve_library("org.junit.jupiter", "junit-jupiter-api", "5.10.2")
            .unwrap();
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }
}
