use std::ffi::OsString;
use std::path::Path;

use super::Engine;
use crate::preset::QualityPreset;

pub const DEFAULT_NAMES: [&str; 3] = ["gs", "gswin32", "gswin64"];

/// Flags preceding the preset: no pause, batch, quiet, sandboxed, pdfwrite at 1.4.
const FIXED_FLAGS: [&str; 6] = [
    "-dNOPAUSE",
    "-dBATCH",
    "-dQUIET",
    "-dSAFER",
    "-sDEVICE=pdfwrite",
    "-dCompatibilityLevel=1.4",
];

/// Ghostscript driven through the `pdfwrite` device.
pub struct Ghostscript {
    names: Vec<String>,
}

impl Ghostscript {
    pub fn new(names: Vec<String>) -> Self {
        Self { names }
    }
}

impl Default for Ghostscript {
    fn default() -> Self {
        Self::new(DEFAULT_NAMES.iter().map(|s| s.to_string()).collect())
    }
}

impl Engine for Ghostscript {
    fn candidates(&self) -> &[String] {
        &self.names
    }

    fn build_args(&self, preset: QualityPreset, input: &Path, output: &Path) -> Vec<OsString> {
        let mut args: Vec<OsString> = FIXED_FLAGS.iter().map(OsString::from).collect();
        args.push(preset.engine_flag().into());

        let mut out_flag = OsString::from("-sOutputFile=");
        out_flag.push(output);
        args.push(out_flag);

        args.push(input.into());
        args
    }
}
