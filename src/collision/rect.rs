//! Axis-aligned rectangles and overlap correction
//!
//! Screen-style coordinates: `position` is the top-left corner and y grows
//! downward, so `top() < bottom()`.

use glam::Vec2;
use serde::{Deserialize, Serialize};

/// Axis-aligned rectangle (position + size)
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Rect {
    pub position: Vec2,
    pub size: Vec2,
}

impl Rect {
    pub const fn new(x: f32, y: f32, width: f32, height: f32) -> Self {
        Self {
            position: Vec2::new(x, y),
            size: Vec2::new(width, height),
        }
    }

    #[inline]
    pub fn left(&self) -> f32 {
        self.position.x
    }

    #[inline]
    pub fn right(&self) -> f32 {
        self.position.x + self.size.x
    }

    #[inline]
    pub fn top(&self) -> f32 {
        self.position.y
    }

    #[inline]
    pub fn bottom(&self) -> f32 {
        self.position.y + self.size.y
    }

    pub fn center(&self) -> Vec2 {
        self.position + self.size * 0.5
    }

    pub fn contains_point(&self, p: Vec2) -> bool {
        p.x >= self.left() && p.x < self.right() && p.y >= self.top() && p.y < self.bottom()
    }

    /// Positive-area overlap. Rectangles that only share an edge do not
    /// intersect.
    pub fn intersects(&self, other: &Rect) -> bool {
        self.left() < other.right()
            && other.left() < self.right()
            && self.top() < other.bottom()
            && other.top() < self.bottom()
    }

    /// Same rectangle moved by `delta`
    pub fn translated(&self, delta: Vec2) -> Rect {
        Rect {
            position: self.position + delta,
            size: self.size,
        }
    }
}

/// Side of the static rectangle the moving one was pushed out through
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SideHit {
    Left,
    Right,
    Top,
    Bottom,
}

/// Result of separating a moving rectangle from a static one
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Reposition {
    /// Corrected top-left position of the moving rectangle
    pub position: Vec2,
    /// Static edge the moving rectangle now sits flush against
    pub side: SideHit,
}

impl Reposition {
    /// Offset from the moving rectangle's original position
    pub fn offset(&self, moving: &Rect) -> Vec2 {
        self.position - moving.position
    }
}

/// Minimum push that places `moving` flush against the nearest edge of
/// `fixed`.
///
/// The four candidate pushes are compared by absolute distance; ties resolve
/// in left, right, top, bottom order.
pub fn reposition_from_collision(fixed: &Rect, moving: &Rect) -> Reposition {
    let candidates = [
        (SideHit::Left, Vec2::new(fixed.left() - moving.right(), 0.0)),
        (SideHit::Right, Vec2::new(fixed.right() - moving.left(), 0.0)),
        (SideHit::Top, Vec2::new(0.0, fixed.top() - moving.bottom())),
        (SideHit::Bottom, Vec2::new(0.0, fixed.bottom() - moving.top())),
    ];

    let mut best = candidates[0];
    for candidate in &candidates[1..] {
        if candidate.1.abs().max_element() < best.1.abs().max_element() {
            best = *candidate;
        }
    }

    Reposition {
        position: moving.position + best.1,
        side: best.0,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn test_overlap_on_right_edge() {
        let fixed = Rect::new(0.0, 0.0, 10.0, 10.0);
        let moving = Rect::new(8.0, 0.0, 10.0, 10.0);

        let result = reposition_from_collision(&fixed, &moving);
        assert_eq!(result.side, SideHit::Right);
        assert!((result.position.x - 10.0).abs() < 1e-5);
        assert!(result.position.y.abs() < 1e-5);
    }

    #[test]
    fn test_overlap_from_above() {
        // Box resting 2 units into the top of the floor
        let floor = Rect::new(0.0, 100.0, 200.0, 20.0);
        let moving = Rect::new(50.0, 92.0, 10.0, 10.0);

        let result = reposition_from_collision(&floor, &moving);
        assert_eq!(result.side, SideHit::Top);
        assert!((result.position.y - 90.0).abs() < 1e-5);
        assert!((result.position.x - 50.0).abs() < 1e-5);
    }

    #[test]
    fn test_tie_prefers_left_then_right_then_top() {
        // Identical boxes: every push is 10 units, left wins
        let fixed = Rect::new(0.0, 0.0, 10.0, 10.0);
        let result = reposition_from_collision(&fixed, &fixed);
        assert_eq!(result.side, SideHit::Left);
        assert!((result.position.x + 10.0).abs() < 1e-5);

        // Right and top tie at 5, right wins
        let moving = Rect::new(5.0, -5.0, 10.0, 10.0);
        let result = reposition_from_collision(&fixed, &moving);
        assert_eq!(result.side, SideHit::Right);
    }

    #[test]
    fn test_top_wins_tie_with_bottom() {
        // Centred on a wide, short box: horizontal pushes are 15, vertical ones 10
        let fixed = Rect::new(0.0, 0.0, 20.0, 10.0);
        let moving = Rect::new(5.0, 0.0, 10.0, 10.0);
        assert_eq!(moving.center(), fixed.center());

        let result = reposition_from_collision(&fixed, &moving);
        assert_eq!(result.side, SideHit::Top);
        assert!((result.position.y + 10.0).abs() < 1e-5);
        assert!((result.position.x - 5.0).abs() < 1e-5);
    }

    #[test]
    fn test_contains_point_is_half_open() {
        let rect = Rect::new(0.0, 0.0, 10.0, 10.0);
        assert!(rect.contains_point(Vec2::ZERO));
        assert!(rect.contains_point(rect.center()));
        assert!(!rect.contains_point(Vec2::new(10.0, 5.0)));
        assert!(!rect.contains_point(Vec2::new(5.0, 10.0)));
        assert!(!rect.contains_point(Vec2::new(-0.1, 5.0)));
    }

    #[test]
    fn test_touching_edges_do_not_intersect() {
        let a = Rect::new(0.0, 0.0, 10.0, 10.0);
        let b = Rect::new(10.0, 0.0, 10.0, 10.0);
        assert!(!a.intersects(&b));
        assert!(a.intersects(&b.translated(Vec2::new(-0.5, 0.0))));
    }

    proptest! {
        #![proptest_config(ProptestConfig { max_global_rejects: 8192, ..ProptestConfig::default() })]

        #[test]
        fn prop_correction_separates(
            x in -50.0f32..50.0,
            y in -50.0f32..50.0,
            w in 1.0f32..40.0,
            h in 1.0f32..40.0,
        ) {
            let fixed = Rect::new(0.0, 0.0, 20.0, 20.0);
            let moving = Rect::new(x, y, w, h);
            prop_assume!(fixed.intersects(&moving));

            let result = reposition_from_collision(&fixed, &moving);
            let corrected = Rect { position: result.position, size: moving.size };
            // Flush is not overlapping; allow float noise on the shared edge
            let shrunk = Rect {
                position: corrected.position + Vec2::splat(1e-3),
                size: corrected.size - Vec2::splat(2e-3),
            };
            prop_assert!(!fixed.intersects(&shrunk));
        }
    }
}
