//! Tracker errors.

use thiserror::Error;

/// Errors raised while assembling a tracker.
#[derive(Debug, Error)]
pub enum TrackerError {
    /// A required platform collaborator was not supplied to the builder.
    #[error("missing required collaborator: {0}")]
    MissingCollaborator(&'static str),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_missing_collaborator_message() {
        let err = TrackerError::MissingCollaborator("wifi source");

        assert_eq!(err.to_string(), "missing required collaborator: wifi source");
    }
}
