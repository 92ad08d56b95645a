/// Border accent colors used by the status banner.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BannerColor {
    /// Cyan: informational (sending, submitting).
    Info,
    /// Orange: work in flight.
    Working,
    /// Green: terminal success.
    Success,
    /// Red: terminal failure.
    Error,
}

impl BannerColor {
    /// CSS hex value for surfaces that draw the banner.
    pub fn hex(self) -> &'static str {
        match self {
            Self::Info => "#4fc3f7",
            Self::Working => "#ffb74d",
            Self::Success => "#66bb6a",
            Self::Error => "#ef5350",
        }
    }
}
