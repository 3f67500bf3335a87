//! Online multi-object tracking by detection (SORT).
//!
//! Feed [`SortTracker::update`] one frame of detector boxes at a time; it
//! associates them to persistent tracks with a constant-velocity Kalman
//! filter per object, an IoU cost matrix, and optimal bipartite assignment,
//! and returns the confirmed tracks' boxes with stable integer identities.

pub mod bbox;
pub mod detection;
pub mod error;
pub mod iou_matching;
pub mod kalman_filter;
pub mod linear_assignment;
pub mod track;
pub mod tracker;

pub use bbox::Bbox;
pub use detection::Detection;
pub use error::TrackError;
pub use track::{Track, TrackState};
pub use tracker::{SortConfig, SortTracker, TrackedBox};
