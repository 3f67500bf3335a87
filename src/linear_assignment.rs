use lapjv::{lapjv, Matrix};
use log::debug;
use ndarray::Array2;

/// Cost larger than any real `1 - IoU` entry. Pads the matrix square and
/// prices pairings that must never win.
pub const INFTY_COST: f64 = 1e5;

/// Result of one frame's track-to-detection association. Indices refer to
/// the rows and columns of the IoU matrix the matching was solved over.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct Matching {
    pub matches: Vec<(usize, usize)>,
    pub unmatched_tracks: Vec<usize>,
    pub unmatched_detections: Vec<usize>,
}

impl Matching {
    fn unmatched(n_tracks: usize, n_detections: usize) -> Self {
        Matching {
            matches: Vec::new(),
            unmatched_tracks: (0..n_tracks).collect(),
            unmatched_detections: (0..n_detections).collect(),
        }
    }
}

/// Maximum-total-IoU one-to-one matching over `iou`, solved as `1 - IoU`
/// minimization with the Jonker-Volgenant algorithm.
///
/// Any proposed pair whose IoU falls below `iou_threshold` is rejected and
/// both members return to the unmatched sets. An empty side yields an empty
/// matching; infeasibility is never an error. Ties resolve to whichever
/// optimal permutation the solver settles on, stable for identical input.
pub fn min_cost_matching(iou: &Array2<f64>, iou_threshold: f64) -> Matching {
    let (n_tracks, n_detections) = iou.dim();
    if n_tracks == 0 || n_detections == 0 {
        return Matching::unmatched(n_tracks, n_detections);
    }
    if n_tracks == 1 && n_detections == 1 {
        return if iou[[0, 0]] >= iou_threshold {
            Matching {
                matches: vec![(0, 0)],
                ..Matching::default()
            }
        } else {
            Matching::unmatched(1, 1)
        };
    }

    // lapjv wants a square matrix; pad the short side with sentinel cost
    let side = n_tracks.max(n_detections);
    let mut data = vec![INFTY_COST; side * side];
    for row in 0..n_tracks {
        for col in 0..n_detections {
            data[row * side + col] = 1.0 - iou[[row, col]];
        }
    }

    let solution = Matrix::from_shape_vec((side, side), data)
        .ok()
        .and_then(|cost| lapjv(&cost).ok());
    let row_to_col = match solution {
        Some((row_to_col, _)) => row_to_col,
        None => {
            debug!("assignment solve failed on a {side}x{side} matrix; dropping all pairs");
            return Matching::unmatched(n_tracks, n_detections);
        }
    };

    let mut matching = Matching::default();
    let mut detection_matched = vec![false; n_detections];
    for (row, &col) in row_to_col.iter().enumerate().take(n_tracks) {
        if col < n_detections && iou[[row, col]] >= iou_threshold {
            matching.matches.push((row, col));
            detection_matched[col] = true;
        } else {
            matching.unmatched_tracks.push(row);
        }
    }
    matching.unmatched_detections = detection_matched
        .iter()
        .enumerate()
        .filter_map(|(col, &hit)| if hit { None } else { Some(col) })
        .collect();

    matching
}

#[cfg(test)]
mod tests {
    use super::*;
    use ndarray::array;

    #[test]
    fn empty_inputs_give_empty_matching() {
        let m = min_cost_matching(&Array2::zeros((0, 3)), 0.3);
        assert!(m.matches.is_empty());
        assert!(m.unmatched_tracks.is_empty());
        assert_eq!(m.unmatched_detections, vec![0, 1, 2]);

        let m = min_cost_matching(&Array2::zeros((2, 0)), 0.3);
        assert!(m.matches.is_empty());
        assert_eq!(m.unmatched_tracks, vec![0, 1]);
        assert!(m.unmatched_detections.is_empty());
    }

    #[test]
    fn unique_optimum_on_3x3() {
        let iou = array![[0.9, 0.1, 0.0], [0.1, 0.8, 0.2], [0.0, 0.2, 0.7]];
        let mut m = min_cost_matching(&iou, 0.3);
        m.matches.sort_unstable();
        assert_eq!(m.matches, vec![(0, 0), (1, 1), (2, 2)]);
        assert!(m.unmatched_tracks.is_empty());
        assert!(m.unmatched_detections.is_empty());
    }

    #[test]
    fn optimal_beats_greedy() {
        // Greedy would take (0, 0) at 0.6 and strand track 1; the optimal
        // total is the anti-diagonal 0.5 + 0.5.
        let iou = array![[0.6, 0.5], [0.5, 0.0]];
        let mut m = min_cost_matching(&iou, 0.3);
        m.matches.sort_unstable();
        assert_eq!(m.matches, vec![(0, 1), (1, 0)]);
    }

    #[test]
    fn weak_pairs_are_rejected() {
        let iou = array![[0.1]];
        let m = min_cost_matching(&iou, 0.3);
        assert!(m.matches.is_empty());
        assert_eq!(m.unmatched_tracks, vec![0]);
        assert_eq!(m.unmatched_detections, vec![0]);
    }

    #[test]
    fn rectangular_leaves_extra_detections_unmatched() {
        let iou = array![[0.9, 0.0, 0.0], [0.0, 0.8, 0.0]];
        let mut m = min_cost_matching(&iou, 0.3);
        m.matches.sort_unstable();
        assert_eq!(m.matches, vec![(0, 0), (1, 1)]);
        assert!(m.unmatched_tracks.is_empty());
        assert_eq!(m.unmatched_detections, vec![2]);
    }

    #[test]
    fn rectangular_leaves_extra_tracks_unmatched() {
        let iou = array![[0.9], [0.0], [0.2]];
        let m = min_cost_matching(&iou, 0.3);
        assert_eq!(m.matches, vec![(0, 0)]);
        assert_eq!(m.unmatched_tracks, vec![1, 2]);
        assert!(m.unmatched_detections.is_empty());
    }
}
