/// Axis-aligned bounding box in image pixel coordinates, `(x1, y1)` top-left
/// and `(x2, y2)` bottom-right.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Bbox {
    pub x1: f64,
    pub y1: f64,
    pub x2: f64,
    pub y2: f64,
}

impl Bbox {
    pub fn new(x1: f64, y1: f64, x2: f64, y2: f64) -> Self {
        Bbox { x1, y1, x2, y2 }
    }

    pub fn width(&self) -> f64 {
        self.x2 - self.x1
    }

    pub fn height(&self) -> f64 {
        self.y2 - self.y1
    }

    pub fn area(&self) -> f64 {
        self.width() * self.height()
    }

    /// Convert to the `(cx, cy, s, r)` measurement the filter observes:
    /// box center, scale `s` = area, aspect ratio `r` = width / height.
    pub fn to_xysr(&self) -> [f64; 4] {
        let w = self.width();
        let h = self.height();
        [self.x1 + w / 2.0, self.y1 + h / 2.0, w * h, w / h]
    }

    /// Recover a box from the first four state components `(cx, cy, s, r)`,
    /// with `w = sqrt(s * r)` and `h = s / w`.
    pub fn from_xysr(state: &[f64]) -> Self {
        let w = (state[2] * state[3]).sqrt();
        let h = state[2] / w;
        Bbox {
            x1: state[0] - w / 2.0,
            y1: state[1] - h / 2.0,
            x2: state[0] + w / 2.0,
            y2: state[1] + h / 2.0,
        }
    }

    /// Intersection over union; overlap on each axis is clamped to zero so
    /// disjoint boxes score exactly 0.
    pub fn iou(&self, other: &Bbox) -> f64 {
        let inter_w = (self.x2.min(other.x2) - self.x1.max(other.x1)).max(0.0);
        let inter_h = (self.y2.min(other.y2) - self.y1.max(other.y1)).max(0.0);
        let intersection = inter_w * inter_h;
        let union = self.area() + other.area() - intersection;
        if union <= 0.0 {
            return 0.0;
        }
        intersection / union
    }
}
