//! Integer screen geometry shared by layouts and the editing field.
//!
//! Coordinates grow rightwards and downwards; a rectangle is its top-left corner plus a
//! non-negative size.

pub type KDCoordinate = i32;

/// Width of one glyph of the editing font.
pub const GLYPH_WIDTH: KDCoordinate = 10;
/// Height of one glyph of the editing font.
pub const GLYPH_HEIGHT: KDCoordinate = 18;
/// Baseline of a single glyph, measured from its top.
pub const GLYPH_BASELINE: KDCoordinate = GLYPH_HEIGHT / 2;

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub struct KDPoint {
    pub x: KDCoordinate,
    pub y: KDCoordinate,
}

impl KDPoint {
    pub const ORIGIN: KDPoint = KDPoint { x: 0, y: 0 };

    pub const fn new(x: KDCoordinate, y: KDCoordinate) -> Self {
        KDPoint { x, y }
    }

    pub fn translated_by(self, other: KDPoint) -> KDPoint {
        KDPoint::new(self.x + other.x, self.y + other.y)
    }

    pub fn opposite(self) -> KDPoint {
        KDPoint::new(-self.x, -self.y)
    }
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub struct KDSize {
    pub width: KDCoordinate,
    pub height: KDCoordinate,
}

impl KDSize {
    pub const ZERO: KDSize = KDSize {
        width: 0,
        height: 0,
    };

    pub const fn new(width: KDCoordinate, height: KDCoordinate) -> Self {
        KDSize { width, height }
    }
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub struct KDRect {
    pub x: KDCoordinate,
    pub y: KDCoordinate,
    pub width: KDCoordinate,
    pub height: KDCoordinate,
}

impl KDRect {
    pub const fn new(x: KDCoordinate, y: KDCoordinate, width: KDCoordinate, height: KDCoordinate) -> Self {
        KDRect {
            x,
            y,
            width,
            height,
        }
    }

    pub fn from_origin_and_size(origin: KDPoint, size: KDSize) -> Self {
        KDRect::new(origin.x, origin.y, size.width, size.height)
    }

    pub fn origin(&self) -> KDPoint {
        KDPoint::new(self.x, self.y)
    }

    pub fn size(&self) -> KDSize {
        KDSize::new(self.width, self.height)
    }

    #[inline]
    pub fn left(&self) -> KDCoordinate {
        self.x
    }

    #[inline]
    pub fn right(&self) -> KDCoordinate {
        self.x + self.width
    }

    #[inline]
    pub fn top(&self) -> KDCoordinate {
        self.y
    }

    #[inline]
    pub fn bottom(&self) -> KDCoordinate {
        self.y + self.height
    }

    pub fn is_empty(&self) -> bool {
        self.width <= 0 || self.height <= 0
    }

    /// Whether `point` lies inside (right and bottom edges excluded).
    pub fn contains(&self, point: KDPoint) -> bool {
        point.x >= self.left() && point.x < self.right() && point.y >= self.top() && point.y < self.bottom()
    }

    pub fn translated_by(&self, offset: KDPoint) -> KDRect {
        KDRect::new(self.x + offset.x, self.y + offset.y, self.width, self.height)
    }

    /// Smallest rectangle containing both; an empty rectangle is neutral.
    pub fn union(&self, other: &KDRect) -> KDRect {
        if self.is_empty() {
            return *other;
        }
        if other.is_empty() {
            return *self;
        }
        let left = self.left().min(other.left());
        let top = self.top().min(other.top());
        let right = self.right().max(other.right());
        let bottom = self.bottom().max(other.bottom());
        KDRect::new(left, top, right - left, bottom - top)
    }

    pub fn intersects(&self, other: &KDRect) -> bool {
        self.left() < other.right()
            && other.left() < self.right()
            && self.top() < other.bottom()
            && other.top() < self.bottom()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rect_edges_and_union() {
        let a = KDRect::new(0, 0, 10, 18);
        let b = KDRect::new(20, -5, 5, 5);
        let u = a.union(&b);
        assert_eq!(u, KDRect::new(0, -5, 25, 23));
        assert!(a.contains(KDPoint::new(9, 17)));
        assert!(!a.contains(KDPoint::new(10, 0)));
        assert!(!a.intersects(&b));
        assert_eq!(KDRect::default().union(&a), a);
    }
}
