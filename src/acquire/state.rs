/// Acquisition state definitions
///
/// Every scrape request walks through these states exactly once, from
/// `Submitted` to one of the two terminal states.
use crate::ZenoError;
use std::fmt;

/// Current state of one scrape request
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum AcquireState {
    // ===== Active States =====
    /// Request accepted, URL validated
    Submitted,

    /// One-hop fetch issued
    Requested,

    /// Headers received, body deliberately not downloaded
    Aborted,

    /// Headers and body received
    Fetched,

    /// Document type decided
    Classified,

    /// Text and title extracted
    Extracted,

    // ===== Terminal States =====
    /// Handed to the catalog
    Finalized,

    /// Dropped without persistence
    Failed,
}

impl AcquireState {
    /// Returns true if no further transition is possible
    pub fn is_terminal(&self) -> bool {
        matches!(self, Self::Finalized | Self::Failed)
    }

    /// Returns true if `next` is a legal successor of this state
    ///
    /// `Failed` is reachable from every non-terminal state.
    pub fn can_transition_to(&self, next: AcquireState) -> bool {
        if self.is_terminal() {
            return false;
        }
        if next == Self::Failed {
            return true;
        }

        matches!(
            (self, next),
            (Self::Submitted, Self::Requested)
                | (Self::Requested, Self::Aborted)
                | (Self::Requested, Self::Fetched)
                | (Self::Aborted, Self::Classified)
                | (Self::Fetched, Self::Classified)
                | (Self::Classified, Self::Extracted)
                | (Self::Classified, Self::Finalized)
                | (Self::Extracted, Self::Finalized)
        )
    }

    /// Moves to `next`, rejecting illegal transitions
    pub fn advance(&mut self, next: AcquireState) -> Result<(), ZenoError> {
        if !self.can_transition_to(next) {
            return Err(ZenoError::InvalidTransition {
                from: *self,
                to: next,
            });
        }
        *self = next;
        Ok(())
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Submitted => "submitted",
            Self::Requested => "requested",
            Self::Aborted => "aborted",
            Self::Fetched => "fetched",
            Self::Classified => "classified",
            Self::Extracted => "extracted",
            Self::Finalized => "finalized",
            Self::Failed => "failed",
        }
    }
}

impl fmt::Display for AcquireState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}
