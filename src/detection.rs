use crate::bbox::Bbox;
use crate::error::TrackError;

/// One detector output for the current frame. Consumed within a single
/// tracking cycle, never retained.
///
/// The confidence score is carried through for caller-side pre-filtering;
/// the tracker itself only consumes the box geometry.
#[derive(Debug, Clone, Copy)]
pub struct Detection {
    pub bbox: Bbox,
    pub confidence: f64,
}

impl Detection {
    pub fn new(x1: f64, y1: f64, x2: f64, y2: f64, confidence: f64) -> Self {
        Detection {
            bbox: Bbox::new(x1, y1, x2, y2),
            confidence,
        }
    }

    pub fn from_bbox(bbox: Bbox, confidence: f64) -> Self {
        Detection { bbox, confidence }
    }

    /// Reject malformed input before it can reach any track state.
    pub(crate) fn validate(&self, index: usize) -> Result<(), TrackError> {
        let b = &self.bbox;
        if !(b.x1.is_finite() && b.y1.is_finite() && b.x2.is_finite() && b.y2.is_finite()) {
            return Err(TrackError::InvalidDetection {
                index,
                reason: "non-finite box coordinates".into(),
            });
        }
        if b.x1 >= b.x2 || b.y1 >= b.y2 {
            return Err(TrackError::InvalidDetection {
                index,
                reason: format!(
                    "inverted or empty box ({}, {}, {}, {})",
                    b.x1, b.y1, b.x2, b.y2
                ),
            });
        }
        if !self.confidence.is_finite() || !(0.0..=1.0).contains(&self.confidence) {
            return Err(TrackError::InvalidDetection {
                index,
                reason: format!("confidence {} outside [0, 1]", self.confidence),
            });
        }
        Ok(())
    }
}
