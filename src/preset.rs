use crate::error::{Result, ShrinkError};

/// Ghostscript `PDFSETTINGS` profile, indexed by the user-facing level 0-4.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum QualityPreset {
    /// Engine's own default profile.
    Default,
    Screen,
    Ebook,
    Printer,
    Prepress,
}

impl QualityPreset {
    pub const ALL: [QualityPreset; 5] = [
        Self::Default,
        Self::Screen,
        Self::Ebook,
        Self::Printer,
        Self::Prepress,
    ];

    pub fn from_level(level: u8) -> Result<Self> {
        Self::ALL
            .get(usize::from(level))
            .copied()
            .ok_or(ShrinkError::InvalidQualityLevel(level))
    }

    pub fn level(self) -> u8 {
        match self {
            Self::Default => 0,
            Self::Screen => 1,
            Self::Ebook => 2,
            Self::Printer => 3,
            Self::Prepress => 4,
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            Self::Default => "default",
            Self::Screen => "screen",
            Self::Ebook => "ebook",
            Self::Printer => "printer",
            Self::Prepress => "prepress",
        }
    }

    /// The `-dPDFSETTINGS=` flag value.
    pub fn engine_flag(self) -> String {
        format!("-dPDFSETTINGS=/{}", self.name())
    }
}

impl std::fmt::Display for QualityPreset {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} ({})", self.name(), self.level())
    }
}
