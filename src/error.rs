use thiserror::Error;

/// Errors surfaced across the tracker boundary.
///
/// Only input validation is ever reported to the caller; a rejected frame
/// leaves the track set untouched, so the caller may drop the frame (or
/// substitute an empty detection list) and keep feeding the tracker.
#[derive(Debug, Error)]
pub enum TrackError {
    #[error("invalid detection at index {index}: {reason}")]
    InvalidDetection { index: usize, reason: String },
}
