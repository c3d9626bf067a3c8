use std::fmt;

use serde::{Deserialize, Serialize};
use ts_rs::TS;

/// Lifecycle of a certificate request.
///
/// `pending → generating → signing → uploading → completed`, with `error`
/// reachable from every non-terminal state. The intermediate states are
/// progress labels for the UI; the worker itself only ever writes the
/// terminal ones.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, TS)]
#[serde(rename_all = "lowercase")]
#[ts(export)]
pub enum RequestStatus {
    Pending,
    Generating,
    Signing,
    Uploading,
    Completed,
    Error,
}

impl RequestStatus {
    /// Position along the forward sequence. `Error` sits outside it.
    fn rank(self) -> Option<u8> {
        match self {
            Self::Pending => Some(0),
            Self::Generating => Some(1),
            Self::Signing => Some(2),
            Self::Uploading => Some(3),
            Self::Completed => Some(4),
            Self::Error => None,
        }
    }

    pub fn is_terminal(self) -> bool {
        matches!(self, Self::Completed | Self::Error)
    }

    /// Whether `self → next` is a legal move.
    pub fn can_transition_to(self, next: RequestStatus) -> bool {
        if self.is_terminal() {
            return false;
        }
        match (self.rank(), next.rank()) {
            (_, None) => true,
            (Some(from), Some(to)) => to > from,
            (None, Some(_)) => false,
        }
    }

    /// The message the UI shows while a request sits in this state.
    pub fn progress_label(self) -> &'static str {
        match self {
            Self::Pending => "Processing Certificates...",
            Self::Generating => "Generating PDF...",
            Self::Signing => "Applying Digital Signature...",
            Self::Uploading => "Uploading Certificate...",
            Self::Completed => "Your certificate is ready!",
            Self::Error => "Certificate generation failed",
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Pending => "pending",
            Self::Generating => "generating",
            Self::Signing => "signing",
            Self::Uploading => "uploading",
            Self::Completed => "completed",
            Self::Error => "error",
        }
    }
}

impl fmt::Display for RequestStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
