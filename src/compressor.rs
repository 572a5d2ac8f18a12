use std::ffi::OsString;
use std::fs;
use std::path::Path;
use std::time::Duration;

use crate::engine::{self, Engine};
use crate::error::{Result, ShrinkError};
use crate::preset::QualityPreset;
use crate::runner;

/// Sizes before and after one engine run.
#[derive(Debug, Clone, PartialEq)]
pub struct CompressionResult {
    pub initial_size: u64,
    pub final_size: u64,
    pub elapsed_ms: u128,
}

impl CompressionResult {
    /// `1 - final / initial`. Negative when the engine grew the file.
    pub fn ratio(&self) -> f64 {
        1.0 - self.final_size as f64 / self.initial_size as f64
    }

    /// Human-readable summary: percentage saved, final size in MB.
    pub fn report(&self) -> String {
        format!(
            "Compression by {:.0}%.\nFinal file size is {:.5}MB\nDone.",
            self.ratio() * 100.0,
            self.final_size as f64 / 1_000_000.0
        )
    }

    /// One-line footer with timing.
    pub fn footer(&self) -> String {
        format!(
            "[pdfshrink] ok ({}ms, {} -> {} bytes)",
            self.elapsed_ms, self.initial_size, self.final_size
        )
    }
}

/// Runs an [`Engine`] against one input/output pair.
pub struct Compressor<E: Engine> {
    engine: E,
    search_path: Option<OsString>,
    timeout: Option<Duration>,
}

impl<E: Engine> Compressor<E> {
    /// Engine lookups will use the process `PATH` as seen at each call.
    pub fn new(engine: E, timeout: Option<Duration>) -> Self {
        Self {
            engine,
            search_path: None,
            timeout,
        }
    }

    /// Pin the search path instead of reading `PATH`.
    #[cfg(test)]
    pub fn with_search_path(mut self, search_path: impl Into<OsString>) -> Self {
        self.search_path = Some(search_path.into());
        self
    }

    pub fn resolve(&self) -> Result<std::path::PathBuf> {
        let from_env;
        let path = match &self.search_path {
            Some(p) => Some(p.as_os_str()),
            None => {
                from_env = std::env::var_os("PATH");
                from_env.as_deref()
            }
        };
        engine::resolve_executable(self.engine.candidates(), path)
    }

    /// Compress `input` into `output` (created or overwritten).
    ///
    /// Input checks and engine lookup happen before anything is spawned. The
    /// output is truncated before the run, so a stale file never counts as
    /// output. Any engine failure removes whatever was left at `output`.
    pub fn compress(
        &self,
        input: &Path,
        output: &Path,
        preset: QualityPreset,
    ) -> Result<CompressionResult> {
        let initial_size = input_size(input)?;
        let program = self.resolve()?;

        log::info!(
            "compressing {} with preset {preset} via {}",
            input.display(),
            program.display()
        );
        let args = self.engine.build_args(preset, input, output);

        fs::File::create(output).map_err(|e| {
            ShrinkError::io(format!("failed to prepare output {}", output.display()), e)
        })?;

        let run = match runner::exec(&program, &args, self.timeout) {
            Ok(run) => run,
            Err(e) => {
                discard(output);
                return Err(e);
            }
        };

        if !run.success() {
            discard(output);
            return Err(ShrinkError::EngineInvocation {
                status: run.describe_status(),
                stderr: run.stderr,
            });
        }

        let final_size = fs::metadata(output).map(|m| m.len()).unwrap_or(0);
        if final_size == 0 {
            discard(output);
            return Err(ShrinkError::EngineInvocation {
                status: "no output produced".into(),
                stderr: run.stderr,
            });
        }

        let result = CompressionResult {
            initial_size,
            final_size,
            elapsed_ms: run.elapsed_ms,
        };
        if result.ratio() < 0.0 {
            log::warn!(
                "output is larger than input ({} > {} bytes)",
                final_size,
                initial_size
            );
        }
        Ok(result)
    }
}

/// Size of a readable, non-empty regular file.
pub fn input_size(input: &Path) -> Result<u64> {
    let meta = fs::metadata(input).map_err(|_| ShrinkError::InputNotFound(input.to_path_buf()))?;
    if !meta.is_file() {
        return Err(ShrinkError::InputNotFound(input.to_path_buf()));
    }
    if meta.len() == 0 {
        return Err(ShrinkError::ZeroByteInput(input.to_path_buf()));
    }
    Ok(meta.len())
}

fn discard(output: &Path) {
    if fs::remove_file(output).is_ok() {
        log::debug!("removed partial output {}", output.display());
    }
}


#[cfg(all(test, unix))]
mod tests {
    use super::testing::*;
    use super::*;
    use crate::engine::ghostscript::Ghostscript;

    #[test]
    fn test_ratio() {
        let r = CompressionResult {
            initial_size: 1000,
            final_size: 250,
            elapsed_ms: 0,
        };
        assert!((r.ratio() - 0.75).abs() < f64::EPSILON);
        assert_eq!(r.report(), "Compression by 75%.\nFinal file size is 0.00025MB\nDone.");
    }

    #[test]
    fn test_ratio_negative_when_grown() {
        let r = CompressionResult {
            initial_size: 100,
            final_size: 150,
            elapsed_ms: 0,
        };
        assert!(r.ratio() < 0.0);
        assert!(r.report().starts_with("Compression by -50%."));
    }

    #[test]
    fn test_compress_writes_output() {
        let dir = tempfile::tempdir().unwrap();
        let input = dir.path().join("in.pdf");
        let original = write_pdf(&input);
        let output = dir.path().join("out.pdf");

        let result = compressor(dir.path(), SHRINKING)
            .compress(&input, &output, QualityPreset::Screen)
            .unwrap();

        assert_eq!(result.initial_size, original.len() as u64);
        assert_eq!(result.final_size, fs::metadata(&output).unwrap().len());
        assert!(fs::read(&output).unwrap().starts_with(b"%PDF"));
        assert_eq!(fs::read(&input).unwrap(), original);
    }

    #[test]
    fn test_engine_receives_preset() {
        let dir = tempfile::tempdir().unwrap();
        let input = dir.path().join("in.pdf");
        write_pdf(&input);
        let output = dir.path().join("out.pdf");

        compressor(dir.path(), ECHO_ARGS)
            .compress(&input, &output, QualityPreset::Prepress)
            .unwrap();

        let seen = fs::read_to_string(&output).unwrap();
        let lines: Vec<&str> = seen.lines().collect();
        assert!(lines.contains(&"-dPDFSETTINGS=/prepress"));
        assert_eq!(lines.last().copied(), Some(input.to_str().unwrap()));
    }

    #[test]
    fn test_same_level_is_deterministic() {
        let dir = tempfile::tempdir().unwrap();
        let input = dir.path().join("in.pdf");
        write_pdf(&input);
        let c = compressor(dir.path(), SHRINKING);

        let a = c.compress(&input, &dir.path().join("a.pdf"), QualityPreset::Ebook).unwrap();
        let b = c.compress(&input, &dir.path().join("b.pdf"), QualityPreset::Ebook).unwrap();
        assert_eq!(a.final_size, b.final_size);
    }

    #[test]
    fn test_missing_input_fails_before_spawn() {
        let dir = tempfile::tempdir().unwrap();
        let output = dir.path().join("out.pdf");
        // An engine that can't be found proves nothing was resolved or spawned.
        let c = Compressor::new(Ghostscript::default(), None).with_search_path(dir.path());

        let err = c
            .compress(Path::new("/no/such.pdf"), &output, QualityPreset::Ebook)
            .unwrap_err();
        assert!(matches!(err, ShrinkError::InputNotFound(_)));
        assert!(!output.exists());
    }

    #[test]
    fn test_zero_byte_input() {
        let dir = tempfile::tempdir().unwrap();
        let input = dir.path().join("empty.pdf");
        fs::write(&input, b"").unwrap();
        let output = dir.path().join("out.pdf");

        let err = compressor(dir.path(), SHRINKING)
            .compress(&input, &output, QualityPreset::Ebook)
            .unwrap_err();
        assert!(matches!(err, ShrinkError::ZeroByteInput(_)));
        assert!(!output.exists());
    }

    #[test]
    fn test_directory_input_rejected() {
        let dir = tempfile::tempdir().unwrap();
        let err = compressor(dir.path(), SHRINKING)
            .compress(dir.path(), &dir.path().join("out.pdf"), QualityPreset::Ebook)
            .unwrap_err();
        assert!(matches!(err, ShrinkError::InputNotFound(_)));
    }

    #[test]
    fn test_missing_engine_creates_nothing() {
        let dir = tempfile::tempdir().unwrap();
        let input = dir.path().join("in.pdf");
        write_pdf(&input);
        let output = dir.path().join("out.pdf");
        let empty = tempfile::tempdir().unwrap();

        let c = Compressor::new(Ghostscript::default(), None).with_search_path(empty.path());
        let err = c.compress(&input, &output, QualityPreset::Ebook).unwrap_err();
        assert!(matches!(err, ShrinkError::ExecutableNotFound { .. }));
        assert!(!output.exists());
    }

    #[test]
    fn test_nonzero_exit_is_failure() {
        let dir = tempfile::tempdir().unwrap();
        let input = dir.path().join("in.pdf");
        write_pdf(&input);
        let output = dir.path().join("out.pdf");

        let err = compressor(dir.path(), FAILING)
            .compress(&input, &output, QualityPreset::Ebook)
            .unwrap_err();
        match err {
            ShrinkError::EngineInvocation { status, stderr } => {
                assert_eq!(status, "exit 1");
                assert!(stderr.contains("/syntaxerror"));
            }
            other => panic!("unexpected error: {other}"),
        }
        assert!(!output.exists(), "partial output must be discarded");
    }

    #[test]
    fn test_missing_output_is_failure() {
        let dir = tempfile::tempdir().unwrap();
        let input = dir.path().join("in.pdf");
        write_pdf(&input);

        let err = compressor(dir.path(), SILENT)
            .compress(&input, &dir.path().join("out.pdf"), QualityPreset::Ebook)
            .unwrap_err();
        assert!(matches!(err, ShrinkError::EngineInvocation { .. }));
    }

    #[test]
    fn test_stale_output_is_not_success() {
        let dir = tempfile::tempdir().unwrap();
        let input = dir.path().join("in.pdf");
        write_pdf(&input);
        let output = dir.path().join("out.pdf");
        fs::write(&output, b"%PDF-1.4 from last week\n").unwrap();

        let err = compressor(dir.path(), SILENT)
            .compress(&input, &output, QualityPreset::Ebook)
            .unwrap_err();
        match err {
            ShrinkError::EngineInvocation { status, .. } => assert_eq!(status, "no output produced"),
            other => panic!("unexpected error: {other}"),
        }
        assert!(!output.exists());
    }

    #[test]
    fn test_timeout_discards_output() {
        let dir = tempfile::tempdir().unwrap();
        let input = dir.path().join("in.pdf");
        write_pdf(&input);
        let output = dir.path().join("out.pdf");
        fs::write(&output, b"stale").unwrap();

        let c = Compressor::new(
            ScriptEngine::new(dir.path(), HANGING),
            Some(Duration::from_millis(200)),
        );
        let err = c.compress(&input, &output, QualityPreset::Ebook).unwrap_err();
        assert!(matches!(err, ShrinkError::EngineTimeout { .. }));
        assert!(!output.exists());
    }
}
