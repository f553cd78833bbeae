//! Common result and error types for the Kairos toolchain.

/// The standard result type for fallible internal operations.
///
/// `Ok` holds the (possibly degraded) result of a parse or analysis step.
/// `Err` means an invariant inside Kairos itself was broken. Problems with
/// the user's library, netlist or constraints are reported through the
/// `DiagnosticSink` and the operation still returns `Ok`.
pub type KairosResult<T> = Result<T, InternalError>;

/// An internal error indicating a bug in Kairos, not a problem with the input.
#[derive(Debug, thiserror::Error)]
#[error("internal error: {message}")]
pub struct InternalError {
    /// Description of the broken invariant.
    pub message: String,
}

impl InternalError {
    /// Creates a new internal error with the given message.
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn display_prefix() {
        let err = InternalError::new("node 7 has no instance");
        assert_eq!(format!("{err}"), "internal error: node 7 has no instance");
    }

    #[test]
    fn question_mark_propagates() {
        fn inner() -> KairosResult<u32> {
            Err(InternalError::new("boom"))
        }
        fn outer() -> KairosResult<u32> {
            let v = inner()?;
            Ok(v + 1)
        }
        assert_eq!(outer().unwrap_err().message, "boom");
    }
}
