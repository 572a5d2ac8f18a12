use std::path::PathBuf;
use std::time::Duration;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ShrinkError {
    #[error("no Ghostscript executable was found on PATH (tried {})", tried.join("/"))]
    ExecutableNotFound { tried: Vec<String> },

    #[error("input file not found: {}", .0.display())]
    InputNotFound(PathBuf),

    #[error("input file is empty, nothing to compress: {}", .0.display())]
    ZeroByteInput(PathBuf),

    #[error("invalid compression level {0} (expected 0-4)")]
    InvalidQualityLevel(u8),

    #[error("engine failed ({status}){}", stderr_suffix(stderr))]
    EngineInvocation { status: String, stderr: String },

    #[error("engine did not finish within {limit:?} and was killed")]
    EngineTimeout { limit: Duration },

    #[error("{context}")]
    Io {
        context: String,
        #[source]
        source: std::io::Error,
    },
}

impl ShrinkError {
    pub fn io(context: impl Into<String>, source: std::io::Error) -> Self {
        Self::Io {
            context: context.into(),
            source,
        }
    }

    /// Process exit code for this failure.
    pub fn exit_code(&self) -> u8 {
        match self {
            Self::InputNotFound(_) | Self::ZeroByteInput(_) | Self::InvalidQualityLevel(_) => 2,
            Self::ExecutableNotFound { .. } => 3,
            Self::EngineInvocation { .. } | Self::EngineTimeout { .. } => 4,
            Self::Io { .. } => 1,
        }
    }
}

fn stderr_suffix(stderr: &str) -> String {
    let trimmed = stderr.trim();
    if trimmed.is_empty() {
        String::new()
    } else {
        format!(": {trimmed}")
    }
}

pub type Result<T> = std::result::Result<T, ShrinkError>;
