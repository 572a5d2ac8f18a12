//! What happens to files around an engine run: temp-file swap, backup, open.

use std::fs::{self, File, OpenOptions};
use std::io;
use std::path::{Path, PathBuf};

use tempfile::TempPath;

use crate::compressor::{CompressionResult, Compressor, input_size};
use crate::engine::Engine;
use crate::error::{Result, ShrinkError};
use crate::opener::Opener;
use crate::preset::QualityPreset;

/// One run as requested on the command line.
#[derive(Debug, Clone)]
pub struct CompressionRequest {
    pub input: PathBuf,
    /// `None` selects temp-file mode: compress to scratch, then replace `input`.
    pub output: Option<PathBuf>,
    pub preset: QualityPreset,
    pub backup: bool,
    pub open: bool,
    pub backup_suffix: String,
}

#[derive(Debug)]
pub struct Outcome {
    pub result: CompressionResult,
    /// File now holding the compressed bytes.
    pub final_path: PathBuf,
    pub backup_path: Option<PathBuf>,
}

/// Where the engine writes.
enum Target {
    Explicit(PathBuf),
    InPlace(TempPath),
}

impl Target {
    fn prepare(request: &CompressionRequest) -> Result<Self> {
        match &request.output {
            Some(out) if !same_file(&request.input, out) => Ok(Self::Explicit(out.clone())),
            _ => {
                let dir = request
                    .input
                    .parent()
                    .filter(|p| !p.as_os_str().is_empty())
                    .unwrap_or(Path::new("."));
                let temp = tempfile::Builder::new()
                    .prefix(".pdfshrink-")
                    .suffix(".pdf")
                    .tempfile_in(dir)
                    .map_err(|e| {
                        ShrinkError::io(format!("failed to create temp file in {}", dir.display()), e)
                    })?
                    .into_temp_path();
                Ok(Self::InPlace(temp))
            }
        }
    }

    fn engine_output(&self) -> &Path {
        match self {
            Self::Explicit(path) => path.as_path(),
            Self::InPlace(temp) => temp.as_ref(),
        }
    }
}

/// True when both paths name one existing file (`..`, symlinks resolved).
fn same_file(a: &Path, b: &Path) -> bool {
    match (fs::canonicalize(a), fs::canonicalize(b)) {
        (Ok(a), Ok(b)) => a == b,
        _ => false,
    }
}

/// Write `src`'s bytes into the existing file at `dest`, keeping its
/// permissions and identity.
fn overwrite(src: &Path, dest: &Path) -> io::Result<u64> {
    let mut from = File::open(src)?;
    let mut to = OpenOptions::new().write(true).truncate(true).open(dest)?;
    io::copy(&mut from, &mut to)
}

/// `report.pdf` -> `report_BACKUP.pdf`; `notes` -> `notes_BACKUP`.
pub fn backup_path(input: &Path, suffix: &str) -> PathBuf {
    let stem = input
        .file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_default();
    let name = match input.extension() {
        Some(ext) => format!("{stem}{suffix}.{}", ext.to_string_lossy()),
        None => format!("{stem}{suffix}"),
    };
    input.with_file_name(name)
}

/// Compress per `request`, then back up / replace / open as asked.
///
/// In temp-file mode the original is only touched after the engine has
/// succeeded, and the backup is written before the original is overwritten.
/// The temp file is removed on every path, success or not. An output path
/// naming the input file itself is handled as temp-file mode.
pub fn process<E: Engine, O: Opener>(
    compressor: &Compressor<E>,
    request: &CompressionRequest,
    opener: &O,
) -> Result<Outcome> {
    input_size(&request.input)?;
    let target = Target::prepare(request)?;
    let result = compressor.compress(&request.input, target.engine_output(), request.preset)?;

    let (final_path, backup_path) = match target {
        Target::Explicit(out) => {
            if request.backup {
                log::warn!(
                    "--backup ignored: {} is left untouched when --out is given",
                    request.input.display()
                );
            }
            (out, None)
        }
        Target::InPlace(temp) => {
            let backup = if request.backup {
                let dest = backup_path(&request.input, &request.backup_suffix);
                fs::copy(&request.input, &dest).map_err(|e| {
                    ShrinkError::io(format!("failed to write backup {}", dest.display()), e)
                })?;
                log::info!("backed up original to {}", dest.display());
                Some(dest)
            } else {
                None
            };

            overwrite(&temp, &request.input).map_err(|e| {
                ShrinkError::io(format!("failed to replace {}", request.input.display()), e)
            })?;
            temp.close()
                .map_err(|e| ShrinkError::io("failed to remove temp file", e))?;
            (request.input.clone(), backup)
        }
    };

    if request.open
        && let Err(e) = opener.open(&final_path)
    {
        log::warn!("could not open {}: {e}", final_path.display());
    }

    Ok(Outcome {
        result,
        final_path,
        backup_path,
    })
}
