//! Outcome taxonomy shared by every core error type.

use std::fmt::{Display, Formatter};

/// Coarse error classification surfaced to callers.
///
/// - `NotFound` and `ValidationFailed` are expected, recoverable outcomes.
/// - `StorageFault` means the operation did not complete; it is fatal only
///   when raised while opening the store.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    NotFound,
    ValidationFailed,
    StorageFault,
}

impl ErrorKind {
    /// Stable lowercase label used in logs and FFI envelopes.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::NotFound => "not_found",
            Self::ValidationFailed => "validation_failed",
            Self::StorageFault => "storage_fault",
        }
    }
}

impl Display for ErrorKind {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}
