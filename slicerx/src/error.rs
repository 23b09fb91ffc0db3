use thiserror::Error;

/// Errors raised while assembling a slice.
///
/// Once a slice is built nothing it does can fail: transitions absorb malformed payloads
/// as no-ops and task failures become data in the lifecycle fields.
#[derive(Error, Debug, Clone, Eq, PartialEq)]
pub enum SliceError {
    #[error("Invalid slice options: {0}")]
    InvalidOptions(String),

    #[error("Slice name must not be empty")]
    EmptyName,

    #[error("Unknown container kind: {0}")]
    UnknownContainerKind(String),

    #[error("Unknown naming mode: {0}")]
    UnknownNamingMode(String),

    /// Only raised when the builder is in strict mode.
    #[error("Unknown operation `{operation}` for {kind} slices")]
    UnknownOperation { operation: String, kind: String },

    #[error("Invalid initial value: {0}")]
    InvalidInitialValue(String),

    #[error("Command `{0}` is registered more than once")]
    DuplicateCommand(String),
}
