//! Source-line information attached to call instructions.

use std::fmt;

/// A source line number attached to a call instruction.
///
/// Missing debug information is represented by the absence of a
/// [`DebugLocation`] rather than by this type itself — callers that need
/// the synthetic line `0` fallback call [`DebugLocation::line_or_synthetic`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, derive_more::From)]
#[repr(transparent)]
pub struct DebugLocation(u32);

impl DebugLocation {
    /// Creates a debug location from a 1-based source line number.
    #[must_use]
    pub const fn new(line: u32) -> Self {
        Self(line)
    }

    /// The line number as it was recorded by the IR.
    #[must_use]
    pub const fn line(self) -> u32 {
        self.0
    }

    /// The synthetic line number (`0`) used when a call site carries no
    /// debug information.
    pub const MISSING: u32 = 0;

    /// Returns the line number of `location`, or the synthetic `0` line
    /// if `location` is absent.
    #[must_use]
    pub const fn line_or_synthetic(location: Option<Self>) -> u32 {
        match location {
            Some(loc) => loc.0,
            None => Self::MISSING,
        }
    }
}

impl fmt::Display for DebugLocation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "line {}", self.0)
    }
}
