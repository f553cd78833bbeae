//! Fatal library errors.

/// Errors that prevent a library from being built at all.
#[derive(Debug, thiserror::Error)]
pub enum LibraryError {
    /// No top-level `library(name) { ... }` group exists.
    #[error("invalid library: {0}")]
    InvalidLibrary(String),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn display() {
        let err = LibraryError::InvalidLibrary("no `library` group found".to_string());
        assert_eq!(
            err.to_string(),
            "invalid library: no `library` group found"
        );
    }
}
