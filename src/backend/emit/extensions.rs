//! Capability tracking.

use shadec_core::SemanticVersion;

/// Minimum CUDA SM version required by what a pass has emitted so far.
///
/// The tracked version starts at the caller's floor and only ever moves up.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ExtensionTracker {
    sm_version: SemanticVersion,
}

impl ExtensionTracker {
    pub fn new(floor: SemanticVersion) -> Self {
        Self { sm_version: floor }
    }

    /// Raise the requirement to at least `version`; returns `true` if it moved.
    pub fn require_sm_version(&mut self, version: SemanticVersion) -> bool {
        if version > self.sm_version {
            tracing::debug!(from = %self.sm_version, to = %version, "raised required SM version");
            self.sm_version = version;
            true
        } else {
            false
        }
    }

    /// Same as [`Self::require_sm_version`] for the packed integer form used by decorations.
    pub fn require_packed_sm_version(&mut self, packed: u64) -> bool {
        self.require_sm_version(SemanticVersion::from_integer(packed))
    }

    pub fn sm_version(&self) -> SemanticVersion {
        self.sm_version
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn never_drops_below_floor() {
        let mut tracker = ExtensionTracker::new(SemanticVersion::new(6, 0, 0));
        assert!(!tracker.require_sm_version(SemanticVersion::new(5, 0, 0)));
        assert_eq!(tracker.sm_version(), SemanticVersion::new(6, 0, 0));
    }

    #[test]
    fn keeps_the_maximum() {
        let mut tracker = ExtensionTracker::new(SemanticVersion::new(5, 0, 0));
        assert!(tracker.require_sm_version(SemanticVersion::new(7, 0, 0)));
        assert!(!tracker.require_sm_version(SemanticVersion::new(6, 1, 0)));
        assert!(tracker.require_packed_sm_version(SemanticVersion::new(8, 0, 0).to_integer()));
        assert_eq!(tracker.sm_version(), SemanticVersion::new(8, 0, 0));
    }
}
