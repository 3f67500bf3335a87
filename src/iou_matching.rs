use crate::bbox::Bbox;
use ndarray::Array2;

/// Pairwise IoU between predicted track boxes (rows) and current-frame
/// detection boxes (columns). Pure function of the two box lists; only the
/// list indices order the output.
pub fn iou_matrix(track_boxes: &[Bbox], detection_boxes: &[Bbox]) -> Array2<f64> {
    let mut matrix = Array2::zeros((track_boxes.len(), detection_boxes.len()));
    for (row, track_box) in track_boxes.iter().enumerate() {
        for (col, detection_box) in detection_boxes.iter().enumerate() {
            matrix[[row, col]] = track_box.iou(detection_box);
        }
    }
    matrix
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;

    #[test]
    fn matrix_shape_matches_inputs() {
        let tracks = vec![Bbox::new(0.0, 0.0, 10.0, 10.0); 3];
        let detections = vec![Bbox::new(0.0, 0.0, 10.0, 10.0); 2];
        assert_eq!(iou_matrix(&tracks, &detections).dim(), (3, 2));
        assert_eq!(iou_matrix(&[], &detections).dim(), (0, 2));
        assert_eq!(iou_matrix(&tracks, &[]).dim(), (3, 0));
    }

    #[test]
    fn entries_are_pairwise_ious() {
        let tracks = vec![
            Bbox::new(0.0, 0.0, 10.0, 10.0),
            Bbox::new(100.0, 100.0, 110.0, 110.0),
        ];
        let detections = vec![
            Bbox::new(0.0, 0.0, 10.0, 10.0),
            Bbox::new(0.0, 0.0, 5.0, 10.0),
        ];

        let m = iou_matrix(&tracks, &detections);
        assert_abs_diff_eq!(m[[0, 0]], 1.0);
        assert_abs_diff_eq!(m[[0, 1]], 0.5);
        assert_abs_diff_eq!(m[[1, 0]], 0.0);
        assert_abs_diff_eq!(m[[1, 1]], 0.0);
    }

    #[test]
    fn identical_input_gives_identical_output() {
        let tracks = vec![Bbox::new(1.5, 2.5, 20.25, 17.75)];
        let detections = vec![Bbox::new(3.0, 1.0, 19.0, 16.5)];
        let a = iou_matrix(&tracks, &detections);
        let b = iou_matrix(&tracks, &detections);
        assert_eq!(a[[0, 0]].to_bits(), b[[0, 0]].to_bits());
    }
}
