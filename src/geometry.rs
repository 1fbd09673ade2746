use serde::{Deserialize, Serialize};

/// A point on the simulator canvas.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Position {
    pub x: f64,
    pub y: f64,
}

impl Position {
    pub fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }

    /// Point at `fraction` of the way from `self` to `other`.
    pub fn lerp(&self, other: &Position, fraction: f64) -> Position {
        Position {
            x: self.x + (other.x - self.x) * fraction,
            y: self.y + (other.y - self.y) * fraction,
        }
    }
}

impl From<(f64, f64)> for Position {
    fn from((x, y): (f64, f64)) -> Self {
        Self { x, y }
    }
}

pub fn squared_dist(a: &Position, b: &Position) -> f64 {
    let dx = b.x - a.x;
    let dy = b.y - a.y;
    dx * dx + dy * dy
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn squared_distance_is_symmetric() {
        let a = Position::new(1.0, 2.0);
        let b = Position::new(4.0, 6.0);
        assert_eq!(squared_dist(&a, &b), 25.0);
        assert_eq!(squared_dist(&b, &a), 25.0);
        assert_eq!(squared_dist(&a, &a), 0.0);
    }

    #[test]
    fn lerp_walks_the_segment() {
        let a = Position::new(0.0, 0.0);
        let b = Position::new(10.0, -20.0);
        assert_eq!(a.lerp(&b, 0.0), a);
        assert_eq!(a.lerp(&b, 0.5), Position::new(5.0, -10.0));
        assert_eq!(a.lerp(&b, 1.0), b);
    }
}
