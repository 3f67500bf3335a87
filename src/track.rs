use crate::bbox::Bbox;
use crate::detection::Detection;
use crate::kalman_filter::KalmanFilter;
use log::trace;
use ndarray::{Array1, Array2};

/// Track lifecycle. A track is born `Tentative`, becomes `Confirmed` after
/// enough consecutive hits, and is `Deleted` once it outlives its last match.
/// Only `Confirmed` tracks are ever reported to the caller.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TrackState {
    Tentative,
    Confirmed,
    Deleted,
}

/// One persistent object hypothesis: a stable identity plus the Kalman state
/// estimating its bounding-box motion.
#[derive(Debug, Clone)]
pub struct Track {
    pub(crate) mean: Array1<f64>,
    pub(crate) covariance: Array2<f64>,
    track_id: u64,
    hits: u32,
    hit_streak: u32,
    time_since_update: u32,
    age: u32,
    state: TrackState,
    min_hits: u32,
    max_age: u32,
}

impl Track {
    pub(crate) fn new(
        kf: &KalmanFilter,
        detection: &Detection,
        track_id: u64,
        min_hits: u32,
        max_age: u32,
    ) -> Self {
        let (mean, covariance) = kf.initiate(detection.bbox.to_xysr());
        let state = if min_hits <= 1 {
            TrackState::Confirmed
        } else {
            TrackState::Tentative
        };
        trace!("track {track_id} born at {:?}", detection.bbox);
        Track {
            mean,
            covariance,
            track_id,
            hits: 1,
            hit_streak: 1,
            time_since_update: 0,
            age: 0,
            state,
            min_hits,
            max_age,
        }
    }

    pub fn track_id(&self) -> u64 {
        self.track_id
    }

    pub fn state(&self) -> TrackState {
        self.state
    }

    pub fn hits(&self) -> u32 {
        self.hits
    }

    pub fn hit_streak(&self) -> u32 {
        self.hit_streak
    }

    pub fn time_since_update(&self) -> u32 {
        self.time_since_update
    }

    pub fn age(&self) -> u32 {
        self.age
    }

    pub fn is_tentative(&self) -> bool {
        self.state == TrackState::Tentative
    }

    pub fn is_confirmed(&self) -> bool {
        self.state == TrackState::Confirmed
    }

    pub fn is_deleted(&self) -> bool {
        self.state == TrackState::Deleted
    }

    /// Current bounding box, derived from the state mean.
    pub fn bbox(&self) -> Bbox {
        Bbox::from_xysr(&[self.mean[0], self.mean[1], self.mean[2], self.mean[3]])
    }

    /// Advance the motion estimate one frame. Called exactly once per frame
    /// per live track, before association.
    pub(crate) fn predict(&mut self, kf: &KalmanFilter) {
        // a predicted scale at or below zero has no box interpretation;
        // zero the scale velocity instead of letting the area go negative
        if self.mean[2] + self.mean[6] <= 0.0 {
            self.mean[6] = 0.0;
        }

        let (mean, covariance) = kf.predict(&self.mean, &self.covariance);
        self.mean = mean;
        self.covariance = covariance;

        self.age += 1;
        if self.time_since_update > 0 {
            self.hit_streak = 0;
        }
        self.time_since_update += 1;
    }

    /// Correct the estimate with a matched detection box.
    ///
    /// A degenerate correction (singular innovation covariance, non-finite
    /// state) is recovered internally by resetting the covariance to its
    /// creation-time default and correcting against that; it never surfaces
    /// and never leaves NaN in the reported box.
    pub(crate) fn update(&mut self, kf: &KalmanFilter, detection: &Detection) {
        let measurement = detection.bbox.to_xysr();
        match kf.update(&self.mean, &self.covariance, measurement) {
            Ok((mean, covariance)) => {
                self.mean = mean;
                self.covariance = covariance;
            }
            Err(err) => {
                trace!("track {}: {err}; resetting covariance", self.track_id);
                self.covariance = kf.initial_covariance();
                if let Ok((mean, covariance)) = kf.update(&self.mean, &self.covariance, measurement)
                {
                    self.mean = mean;
                    self.covariance = covariance;
                }
            }
        }

        self.hits += 1;
        self.hit_streak += 1;
        self.time_since_update = 0;

        if self.state == TrackState::Tentative && self.hit_streak >= self.min_hits {
            trace!(
                "track {} confirmed after {} consecutive hits",
                self.track_id,
                self.hit_streak
            );
            self.state = TrackState::Confirmed;
        }
    }

    /// Note a frame without a matching detection. The miss itself is already
    /// recorded by `predict`; here the track only expires once it has gone
    /// unmatched for longer than `max_age`.
    pub(crate) fn mark_missed(&mut self) {
        if self.time_since_update > self.max_age {
            trace!(
                "track {} deleted after {} frames without a match",
                self.track_id,
                self.time_since_update
            );
            self.state = TrackState::Deleted;
        }
    }
}
