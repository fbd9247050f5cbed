use serde::Serialize;
use strum::AsRefStr;

/// The only failure text ever published, whatever went wrong.
pub const GENERIC_ERROR_MESSAGE: &str = "Unexpected error. Failed to load item list.";

/// Where the item list currently is in its refresh cycle.
///
/// Every refresh moves to `Loading` first, then to exactly one of the
/// other three variants once the fetch settles.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, AsRefStr)]
#[serde(tag = "status", rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum LoadStatus {
    Loading,
    /// Nothing to show: the fetch was empty or every item was filtered out.
    Empty,
    Error { message: String },
    Success,
}

impl LoadStatus {
    /// `Error` carrying [`GENERIC_ERROR_MESSAGE`].
    pub fn failed() -> Self {
        Self::Error {
            message: GENERIC_ERROR_MESSAGE.to_owned(),
        }
    }

    pub fn is_loading(&self) -> bool {
        matches!(self, Self::Loading)
    }

    /// `true` once a cycle has settled (anything but `Loading`).
    pub fn is_terminal(&self) -> bool {
        !self.is_loading()
    }

    pub fn error_message(&self) -> Option<&str> {
        match self {
            Self::Error { message } => Some(message),
            _ => None,
        }
    }
}
