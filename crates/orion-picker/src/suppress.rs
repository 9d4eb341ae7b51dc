//! One-shot suppression of the reaction to a programmatic field write.

/// Armed immediately before the picker writes a field itself; the next
/// observation of that field consumes it and skips the reaction.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct SuppressToken {
    armed: bool,
}

impl SuppressToken {
    pub fn arm(&mut self) {
        self.armed = true;
    }

    /// Returns `true` exactly once per [`arm`](Self::arm).
    pub fn consume(&mut self) -> bool {
        std::mem::take(&mut self.armed)
    }

    pub fn reset(&mut self) {
        self.armed = false;
    }

    #[must_use]
    pub fn is_armed(&self) -> bool {
        self.armed
    }
}
