use crate::bbox::Bbox;
use crate::detection::Detection;
use crate::error::TrackError;
use crate::iou_matching::iou_matrix;
use crate::kalman_filter::{KalmanFilter, DEFAULT_MEASUREMENT_NOISE, DEFAULT_PROCESS_NOISE};
use crate::linear_assignment::min_cost_matching;
use crate::track::Track;
use log::debug;

/// Tracker tuning knobs. The defaults are the usual starting point for
/// frame-rate video; all of them are expected to be retuned per deployment.
#[derive(Debug, Clone)]
pub struct SortConfig {
    /// Minimum IoU for a track-detection pair to count as a match.
    pub iou_threshold: f64,
    /// Frames a track may go unmatched before it is deleted.
    pub max_age: u32,
    /// Consecutive hits before a new track is reported.
    pub min_hits: u32,
    /// Diagonal of the measurement noise covariance over `(cx, cy, s, r)`.
    pub measurement_noise: [f64; 4],
    /// Diagonal of the process noise covariance over the full 7-dim state.
    pub process_noise: [f64; 7],
}

impl Default for SortConfig {
    fn default() -> Self {
        SortConfig {
            iou_threshold: 0.3,
            max_age: 1,
            min_hits: 3,
            measurement_noise: DEFAULT_MEASUREMENT_NOISE,
            process_noise: DEFAULT_PROCESS_NOISE,
        }
    }
}

/// One reported object: its current box estimate and stable identity.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TrackedBox {
    pub bbox: Bbox,
    pub track_id: u64,
}

/// Online multi-object tracker over per-frame bounding-box detections.
///
/// Owns the live track set exclusively; every frame runs the full
/// predict -> associate -> update/create/delete cycle synchronously before
/// the next frame's detections are accepted. Identities are monotonically
/// increasing and never reused, even after deletion.
pub struct SortTracker {
    config: SortConfig,
    kf: KalmanFilter,
    tracks: Vec<Track>,
    next_id: u64,
}

impl SortTracker {
    pub fn new(config: SortConfig) -> Self {
        let kf = KalmanFilter::new(config.measurement_noise, config.process_noise);
        SortTracker {
            config,
            kf,
            tracks: Vec::new(),
            next_id: 1,
        }
    }

    /// All live tracks, confirmed or not. Mostly useful for diagnostics;
    /// callers consuming tracking output should use the list returned by
    /// [`update`](Self::update).
    pub fn tracks(&self) -> &[Track] {
        &self.tracks
    }

    /// Run one tracking cycle over the frame's detections and return every
    /// confirmed track's box and identity. Output order carries no meaning
    /// across frames; look tracks up by id.
    ///
    /// Confirmed tracks that went unmatched this frame but are still within
    /// `max_age` are reported too, with their predicted box. This differs
    /// from classic SORT, which only reports tracks matched in the current
    /// frame; here an object briefly lost to occlusion keeps being reported
    /// until it expires.
    ///
    /// A malformed detection fails the whole frame before any track state is
    /// touched. The caller may drop the frame and continue; the tracker
    /// remains usable with its prior state intact.
    pub fn update(&mut self, detections: &[Detection]) -> Result<Vec<TrackedBox>, TrackError> {
        for (index, detection) in detections.iter().enumerate() {
            detection.validate(index)?;
        }

        for track in &mut self.tracks {
            track.predict(&self.kf);
        }

        let track_boxes: Vec<Bbox> = self.tracks.iter().map(Track::bbox).collect();
        let detection_boxes: Vec<Bbox> = detections.iter().map(|d| d.bbox).collect();
        let matching = min_cost_matching(
            &iou_matrix(&track_boxes, &detection_boxes),
            self.config.iou_threshold,
        );
        debug!(
            "{} tracks x {} detections: {} matched, {} tracks coasting, {} new",
            self.tracks.len(),
            detections.len(),
            matching.matches.len(),
            matching.unmatched_tracks.len(),
            matching.unmatched_detections.len()
        );

        for &(track_idx, detection_idx) in &matching.matches {
            self.tracks[track_idx].update(&self.kf, &detections[detection_idx]);
        }
        for &track_idx in &matching.unmatched_tracks {
            self.tracks[track_idx].mark_missed();
        }
        for &detection_idx in &matching.unmatched_detections {
            self.initiate_track(&detections[detection_idx]);
        }
        self.tracks.retain(|track| !track.is_deleted());

        Ok(self
            .tracks
            .iter()
            .filter(|track| track.is_confirmed())
            .map(|track| TrackedBox {
                bbox: track.bbox(),
                track_id: track.track_id(),
            })
            .collect())
    }

    fn initiate_track(&mut self, detection: &Detection) {
        let track = Track::new(
            &self.kf,
            detection,
            self.next_id,
            self.config.min_hits,
            self.config.max_age,
        );
        self.tracks.push(track);
        self.next_id += 1;
    }
}
