use std::fmt::{Display, Formatter};

/// Alert severity levels
///
/// Severity drives the embed color, the log verbosity of the pass-through
/// log entry, and whether the configured mention target is pinged. Only
/// [`AlertLevel::Error`] pings.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum AlertLevel {
    Debug,
    Info,
    #[default]
    Error,
}

impl AlertLevel {
    /// Embed color used for this severity.
    pub fn color(self) -> u32 {
        match self {
            AlertLevel::Debug => 0xffd300,
            AlertLevel::Info => 0x3cb043,
            AlertLevel::Error => 0xd30000,
        }
    }

    /// Whether this severity pings the configured mention target.
    pub fn mentions(self) -> bool {
        matches!(self, AlertLevel::Error)
    }
}

impl Display for AlertLevel {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            AlertLevel::Debug => write!(f, "debug"),
            AlertLevel::Info => write!(f, "info"),
            AlertLevel::Error => write!(f, "error"),
        }
    }
}
