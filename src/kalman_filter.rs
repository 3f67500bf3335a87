use anyhow::{anyhow, Result};
use ndarray::{Array1, Array2};
use rulinalg::matrix::Matrix;
use rulinalg::vector::Vector;

/// Measurement noise diagonal for `(cx, cy, s, r)`. Scale and aspect ratio
/// are observed with more uncertainty than position.
pub const DEFAULT_MEASUREMENT_NOISE: [f64; 4] = [1.0, 1.0, 10.0, 10.0];

/// Process noise diagonal for `(cx, cy, s, r, vcx, vcy, vs)`. The scale
/// velocity term is near zero: object area is assumed to change slowly
/// between frames.
pub const DEFAULT_PROCESS_NOISE: [f64; 7] = [1.0, 1.0, 1.0, 1.0, 0.01, 0.01, 1e-4];

const DIM_X: usize = 7;
const DIM_Z: usize = 4;

/// Shared constant-velocity filter for bounding-box motion.
///
/// State is `[cx, cy, s, r, vcx, vcy, vs]`: box center, scale (area), aspect
/// ratio, and the velocities of the first three. The aspect ratio carries no
/// velocity. The struct only holds the model matrices; each track owns its
/// `(mean, covariance)` pair and passes it in.
#[derive(Debug, Clone)]
pub struct KalmanFilter {
    motion_mat: Array2<f64>,
    update_mat: Array2<f64>,
    measurement_cov: Array2<f64>,
    process_cov: Array2<f64>,
}

impl KalmanFilter {
    pub fn new(measurement_noise: [f64; 4], process_noise: [f64; 7]) -> Self {
        // dt = 1 frame: each position component gains its paired velocity
        let mut motion_mat = Array2::eye(DIM_X);
        for i in 0..3 {
            motion_mat[[i, i + 4]] = 1.0;
        }

        let mut update_mat = Array2::zeros((DIM_Z, DIM_X));
        for i in 0..DIM_Z {
            update_mat[[i, i]] = 1.0;
        }

        let mut measurement_cov = Array2::zeros((DIM_Z, DIM_Z));
        for (i, v) in measurement_noise.iter().enumerate() {
            measurement_cov[[i, i]] = *v;
        }

        let mut process_cov = Array2::zeros((DIM_X, DIM_X));
        for (i, v) in process_noise.iter().enumerate() {
            process_cov[[i, i]] = *v;
        }

        KalmanFilter {
            motion_mat,
            update_mat,
            measurement_cov,
            process_cov,
        }
    }

    /// Initial `(mean, covariance)` for a track born from `measurement`.
    /// Velocities start at zero and stay low-confidence until observed.
    pub fn initiate(&self, measurement: [f64; 4]) -> (Array1<f64>, Array2<f64>) {
        let mut mean = Array1::zeros(DIM_X);
        for (i, v) in measurement.iter().enumerate() {
            mean[i] = *v;
        }
        (mean, self.initial_covariance())
    }

    /// Creation-time covariance: tight on the observed components, wide on
    /// the unobserved velocities. Also the reset target when a correction
    /// turns degenerate.
    pub fn initial_covariance(&self) -> Array2<f64> {
        let diag = [10.0, 10.0, 10.0, 10.0, 1e4, 1e4, 1e4];
        let mut covariance = Array2::zeros((DIM_X, DIM_X));
        for (i, v) in diag.iter().enumerate() {
            covariance[[i, i]] = *v;
        }
        covariance
    }

    /// Advance the state one frame under the constant-velocity model.
    pub fn predict(&self, mean: &Array1<f64>, covariance: &Array2<f64>) -> (Array1<f64>, Array2<f64>) {
        let mean = self.motion_mat.dot(mean);
        let covariance = self.motion_mat.dot(covariance).dot(&self.motion_mat.t()) + &self.process_cov;
        (mean, covariance)
    }

    /// Standard linear correction against an observed `(cx, cy, s, r)` box.
    ///
    /// The Kalman gain comes from solving `S * K' = (P H')'` row by row, one
    /// linear system per state dimension. Fails if the innovation covariance
    /// is singular or the corrected state is non-finite; the track layer
    /// handles that by resetting its covariance.
    pub fn update(
        &self,
        mean: &Array1<f64>,
        covariance: &Array2<f64>,
        measurement: [f64; 4],
    ) -> Result<(Array1<f64>, Array2<f64>)> {
        let projected_mean = self.update_mat.dot(mean);
        let projected_cov =
            self.update_mat.dot(covariance).dot(&self.update_mat.t()) + &self.measurement_cov;

        let ph_t = covariance.dot(&self.update_mat.t());
        let innovation_cov = Matrix::new(DIM_Z, DIM_Z, projected_cov.iter().copied().collect::<Vec<f64>>());

        let mut kalman_gain = Array2::zeros((DIM_X, DIM_Z));
        for i in 0..DIM_X {
            let rhs = Vector::new(ph_t.row(i).to_vec());
            let gain_row = innovation_cov
                .clone()
                .solve(rhs)
                .map_err(|e| anyhow!("innovation covariance solve failed: {}", e))?;
            for j in 0..DIM_Z {
                kalman_gain[[i, j]] = gain_row[j];
            }
        }

        let mut innovation = Array1::zeros(DIM_Z);
        for i in 0..DIM_Z {
            innovation[i] = measurement[i] - projected_mean[i];
        }

        let new_mean = mean + &kalman_gain.dot(&innovation);
        let new_covariance = covariance - &kalman_gain.dot(&projected_cov).dot(&kalman_gain.t());

        if new_mean.iter().any(|v| !v.is_finite()) {
            return Err(anyhow!("non-finite state after correction"));
        }

        Ok((new_mean, new_covariance))
    }
}

impl Default for KalmanFilter {
    fn default() -> Self {
        KalmanFilter::new(DEFAULT_MEASUREMENT_NOISE, DEFAULT_PROCESS_NOISE)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::bbox::Bbox;
    use approx::assert_abs_diff_eq;

    #[test]
    fn initiate_copies_measurement_with_zero_velocity() {
        let kf = KalmanFilter::default();
        let (mean, covariance) = kf.initiate([30.0, 30.0, 1600.0, 1.0]);

        assert_abs_diff_eq!(mean[0], 30.0);
        assert_abs_diff_eq!(mean[1], 30.0);
        assert_abs_diff_eq!(mean[2], 1600.0);
        assert_abs_diff_eq!(mean[3], 1.0);
        for i in 4..7 {
            assert_abs_diff_eq!(mean[i], 0.0);
            assert_abs_diff_eq!(covariance[[i, i]], 1e4);
        }
    }

    #[test]
    fn predict_applies_velocity_to_position() {
        let kf = KalmanFilter::default();
        let (mut mean, covariance) = kf.initiate([10.0, 20.0, 100.0, 1.0]);
        mean[4] = 2.0;
        mean[5] = -1.0;

        let (predicted, _) = kf.predict(&mean, &covariance);
        assert_abs_diff_eq!(predicted[0], 12.0);
        assert_abs_diff_eq!(predicted[1], 19.0);
        // aspect ratio has no velocity pairing
        assert_abs_diff_eq!(predicted[3], 1.0);
    }

    #[test]
    fn predict_grows_covariance() {
        let kf = KalmanFilter::default();
        let (mean, covariance) = kf.initiate([10.0, 20.0, 100.0, 1.0]);
        let (_, predicted_cov) = kf.predict(&mean, &covariance);
        for i in 0..4 {
            assert!(predicted_cov[[i, i]] > covariance[[i, i]]);
        }
    }

    #[test]
    fn update_pulls_state_toward_measurement() {
        let kf = KalmanFilter::default();
        let (mean, covariance) = kf.initiate([10.0, 10.0, 100.0, 1.0]);
        let (mean, covariance) = kf.predict(&mean, &covariance);

        let (corrected, _) = kf.update(&mean, &covariance, [14.0, 10.0, 100.0, 1.0]).unwrap();
        assert!(corrected[0] > mean[0]);
        assert!(corrected[0] <= 14.0);
        assert!(corrected.iter().all(|v| v.is_finite()));
    }

    #[test]
    fn repeated_identical_measurements_converge() {
        let kf = KalmanFilter::default();
        let target = Bbox::new(10.0, 10.0, 50.0, 50.0).to_xysr();
        let (mut mean, mut covariance) = kf.initiate(target);

        for _ in 0..20 {
            let (m, c) = kf.predict(&mean, &covariance);
            let (m, c) = kf.update(&m, &c, target).unwrap();
            mean = m;
            covariance = c;
        }

        let settled = Bbox::from_xysr(mean.as_slice().unwrap());
        assert_abs_diff_eq!(settled.x1, 10.0, epsilon = 0.5);
        assert_abs_diff_eq!(settled.y1, 10.0, epsilon = 0.5);
        assert_abs_diff_eq!(settled.x2, 50.0, epsilon = 0.5);
        assert_abs_diff_eq!(settled.y2, 50.0, epsilon = 0.5);
    }
}
