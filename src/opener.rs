use std::ffi::OsString;
use std::path::Path;
use std::process::{Command, Stdio};

use crate::error::{Result, ShrinkError};

/// Platform command that hands a file to the default viewer.
pub fn open_command(path: &Path) -> (&'static str, Vec<OsString>) {
    if cfg!(target_os = "macos") {
        ("open", vec![path.into()])
    } else if cfg!(windows) {
        (
            "cmd",
            vec!["/C".into(), "start".into(), "".into(), path.into()],
        )
    } else {
        ("xdg-open", vec![path.into()])
    }
}

/// Shows a finished file to the user.
pub trait Opener {
    fn open(&self, path: &Path) -> Result<()>;
}

/// The desktop's default viewer.
pub struct SystemOpener;

impl Opener for SystemOpener {
    /// Launch the viewer without waiting for it.
    fn open(&self, path: &Path) -> Result<()> {
        let (program, args) = open_command(path);
        log::info!("opening {} with {program}", path.display());
        Command::new(program)
            .args(&args)
            .stdin(Stdio::null())
            .stdout(Stdio::null())
            .stderr(Stdio::null())
            .spawn()
            .map(drop)
            .map_err(|e| ShrinkError::io(format!("failed to launch `{program}`"), e))
    }
}
