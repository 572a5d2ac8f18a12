pub mod ghostscript;

use std::ffi::{OsStr, OsString};
use std::path::{Path, PathBuf};

use crate::error::{Result, ShrinkError};
use crate::preset::QualityPreset;

/// An external program that rewrites a PDF under a quality preset.
/// Implementations only describe the invocation; running it is the runner's job.
pub trait Engine {
    /// Executable names to look for, highest priority first.
    fn candidates(&self) -> &[String];

    /// Full argument list for one non-interactive run.
    fn build_args(&self, preset: QualityPreset, input: &Path, output: &Path) -> Vec<OsString>;
}

/// Find the first candidate present on `search_path` (a `PATH`-style value).
///
/// Candidates are tried in priority order; for each, every directory is
/// scanned before moving to the next name.
pub fn resolve_executable(candidates: &[String], search_path: Option<&OsStr>) -> Result<PathBuf> {
    let dirs: Vec<PathBuf> = search_path
        .map(|p| std::env::split_paths(p).collect())
        .unwrap_or_default();

    for name in candidates {
        for dir in &dirs {
            if let Some(found) = probe(dir, name) {
                log::debug!("resolved `{name}` to {}", found.display());
                return Ok(found);
            }
        }
    }

    Err(ShrinkError::ExecutableNotFound {
        tried: candidates.to_vec(),
    })
}

fn probe(dir: &Path, name: &str) -> Option<PathBuf> {
    let direct = dir.join(name);
    if is_executable(&direct) {
        return Some(direct);
    }
    if cfg!(windows) {
        let exe = dir.join(format!("{name}.exe"));
        if is_executable(&exe) {
            return Some(exe);
        }
    }
    None
}

#[cfg(unix)]
fn is_executable(path: &Path) -> bool {
    use std::os::unix::fs::PermissionsExt;
    path.metadata()
        .map(|m| m.is_file() && m.permissions().mode() & 0o111 != 0)
        .unwrap_or(false)
}

#[cfg(not(unix))]
fn is_executable(path: &Path) -> bool {
    path.is_file()
}
