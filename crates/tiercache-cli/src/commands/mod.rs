//! Command implementations.
//!
//! Every command returns whether the server reported full success; the
//! failure summary is printed by the command itself before its details.

pub mod cache;
pub mod health;
pub mod warm;

/// Result of a command that reached the server.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Outcome {
    Success,
    Failed,
}

impl Outcome {
    pub fn from_success(success: bool) -> Self {
        if success { Self::Success } else { Self::Failed }
    }

    /// Combines two steps; failed if either failed.
    pub fn and(self, other: Outcome) -> Self {
        Self::from_success(self == Self::Success && other == Self::Success)
    }
}
