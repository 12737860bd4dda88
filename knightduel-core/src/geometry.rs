//! Path segments and the proper-crossing test

use serde::{Deserialize, Serialize};

use crate::board::Square;

/// One knight move drawn as a line on the board plane
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Segment {
    pub from: Square,
    pub to: Square,
}

impl Segment {
    pub const fn new(from: Square, to: Square) -> Self {
        Self { from, to }
    }

    pub fn shares_endpoint(&self, other: &Segment) -> bool {
        self.from == other.from
            || self.from == other.to
            || self.to == other.from
            || self.to == other.to
    }

    pub fn crosses(&self, other: &Segment) -> bool {
        segments_cross(self, other)
    }
}

/// Strict counter-clockwise orientation of (a, b, c); collinear is false
#[inline]
fn ccw(a: Square, b: Square, c: Square) -> bool {
    let (ax, ay) = (a.row as i32, a.col as i32);
    let (bx, by) = (b.row as i32, b.col as i32);
    let (cx, cy) = (c.row as i32, c.col as i32);
    (cy - ay) * (bx - ax) > (by - ay) * (cx - ax)
}

/// Two segments cross iff they share no endpoint and their orientations
/// strictly alternate. Touching at an endpoint is not a crossing.
pub fn segments_cross(s1: &Segment, s2: &Segment) -> bool {
    if s1.shares_endpoint(s2) {
        return false;
    }
    let (a, b) = (s1.from, s1.to);
    let (c, d) = (s2.from, s2.to);
    ccw(a, c, d) != ccw(b, c, d) && ccw(a, b, c) != ccw(a, b, d)
}

pub fn crosses_any(segment: &Segment, segments: &[Segment]) -> bool {
    segments.iter().any(|s| segments_cross(segment, s))
}

/// Consecutive segments of a path
pub fn segments_from_path(path: &[Square]) -> Vec<Segment> {
    path.windows(2).map(|w| Segment::new(w[0], w[1])).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn seg(a: (u8, u8), b: (u8, u8)) -> Segment {
        Segment::new(Square::new(a.0, a.1), Square::new(b.0, b.1))
    }

    #[test]
    fn test_crossing_pair() {
        let s1 = seg((0, 0), (2, 1));
        let s2 = seg((0, 1), (2, 0));
        assert!(segments_cross(&s1, &s2));
        assert!(segments_cross(&s2, &s1));
    }

    #[test]
    fn test_shared_endpoint_never_crosses() {
        let s1 = seg((0, 0), (2, 1));
        let s2 = seg((2, 1), (0, 2));
        let s3 = seg((0, 0), (1, 2));
        assert!(!segments_cross(&s1, &s2));
        assert!(!segments_cross(&s1, &s3));
        assert!(!segments_cross(&s1, &s1));
    }

    #[test]
    fn test_disjoint_segments() {
        let s1 = seg((0, 0), (2, 1));
        let s2 = seg((5, 5), (7, 6));
        assert!(!segments_cross(&s1, &s2));
    }

    #[test]
    fn test_collinear_is_not_crossing() {
        let s1 = seg((0, 0), (2, 1));
        let s2 = seg((4, 2), (6, 3));
        assert!(!segments_cross(&s1, &s2));
    }

    #[test]
    fn test_segments_from_path() {
        let path = [Square::new(0, 0), Square::new(2, 1), Square::new(4, 2)];
        let segs = segments_from_path(&path);
        assert_eq!(segs, vec![seg((0, 0), (2, 1)), seg((2, 1), (4, 2))]);
        assert!(segments_from_path(&path[..1]).is_empty());
    }

    #[test]
    fn test_crosses_any() {
        let drawn = vec![seg((0, 0), (2, 1)), seg((5, 5), (7, 6))];
        assert!(crosses_any(&seg((0, 1), (2, 0)), &drawn));
        assert!(!crosses_any(&seg((2, 1), (4, 2)), &drawn));
    }
}
