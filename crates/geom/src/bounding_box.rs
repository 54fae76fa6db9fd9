use crate::math::{point, Box2D, Point, Vector};
use arrayvec::ArrayVec;

/// An axis-aligned bounding box that can be empty.
///
/// Unlike `Box2D`, the empty state is tracked explicitly: a box that was
/// never given a point is empty, while a box containing a single point is not.
#[derive(Copy, Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serialization", derive(Serialize, Deserialize))]
pub struct BoundingBox {
    min: Point,
    max: Point,
    empty: bool,
}

impl Default for BoundingBox {
    fn default() -> Self {
        BoundingBox::empty()
    }
}

impl BoundingBox {
    /// A box containing no point.
    pub fn empty() -> Self {
        BoundingBox {
            min: point(0.0, 0.0),
            max: point(0.0, 0.0),
            empty: true,
        }
    }

    /// Constructs a non-empty box from its corners.
    ///
    /// The corners are reordered if needed.
    pub fn from_corners(a: Point, b: Point) -> Self {
        BoundingBox {
            min: a.min(b),
            max: a.max(b),
            empty: false,
        }
    }

    /// Constructs the smallest box containing all of the points.
    pub fn from_points<Iter>(points: Iter) -> Self
    where
        Iter: IntoIterator<Item = Point>,
    {
        let mut bbox = BoundingBox::empty();
        for p in points {
            bbox.union_point(p);
        }

        bbox
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.empty
    }

    #[inline]
    pub fn min(&self) -> Point {
        self.min
    }

    #[inline]
    pub fn max(&self) -> Point {
        self.max
    }

    /// Returns a zero vector for empty boxes.
    pub fn size(&self) -> Vector {
        if self.empty {
            return Vector::zero();
        }

        self.max - self.min
    }

    pub fn center(&self) -> Point {
        self.min.lerp(self.max, 0.5)
    }

    /// Forget every point unioned so far.
    pub fn clear(&mut self) {
        self.empty = true;
    }

    /// Returns true if `p` is inside the box, boundary included.
    pub fn contains(&self, p: Point) -> bool {
        !self.empty
            && p.x >= self.min.x
            && p.x <= self.max.x
            && p.y >= self.min.y
            && p.y <= self.max.y
    }

    pub fn intersects(&self, other: &BoundingBox) -> bool {
        !self.empty
            && !other.empty
            && self.min.x <= other.max.x
            && other.min.x <= self.max.x
            && self.min.y <= other.max.y
            && other.min.y <= self.max.y
    }

    /// Grows the box so that it contains `p`.
    ///
    /// Returns true if the box became larger.
    pub fn union_point(&mut self, p: Point) -> bool {
        let grew = !self.contains(p);
        if self.empty {
            self.empty = false;
            self.min = p;
            self.max = p;
        } else {
            self.min = self.min.min(p);
            self.max = self.max.max(p);
        }

        grew
    }

    /// Grows the box so that it contains `other`.
    ///
    /// Returns true if the box became larger.
    pub fn union_box(&mut self, other: &BoundingBox) -> bool {
        if other.empty {
            return false;
        }

        let a = self.union_point(other.min);
        let b = self.union_point(other.max);

        a || b
    }

    /// Restricts the box to its intersection with `other`.
    pub fn intersect_against(&mut self, other: &BoundingBox) {
        if !self.intersects(other) {
            self.empty = true;
            return;
        }

        self.min = self.min.max(other.min);
        self.max = self.max.min(other.max);
    }

    /// Moves both sides of the box outward by `delta`; negative components are
    /// treated as zero. Empty boxes stay empty.
    pub fn enlarge(&mut self, delta: Vector) {
        if self.empty {
            return;
        }

        let delta = Vector::new(delta.x.max(0.0), delta.y.max(0.0));
        self.min -= delta;
        self.max += delta;
    }

    pub fn translate(&mut self, by: Vector) {
        if !self.empty {
            self.min += by;
            self.max += by;
        }
    }

    /// Returns the four corners of the box pushed outward by `radius`, in the
    /// order (min, min), (max, min), (max, max), (min, max).
    ///
    /// An empty box produces an empty polygon.
    pub fn inflated_polygon(&self, radius: f32) -> ArrayVec<Point, 4> {
        let mut polygon = ArrayVec::new();
        if self.empty {
            return polygon;
        }

        let min = self.min;
        let max = self.max;
        polygon.push(point(min.x - radius, min.y - radius));
        polygon.push(point(max.x + radius, min.y - radius));
        polygon.push(point(max.x + radius, max.y + radius));
        polygon.push(point(min.x - radius, max.y + radius));

        polygon
    }

    /// Splits the box in two halves at its horizontal center.
    ///
    /// The first box covers the lower x values.
    pub fn split_x(&self) -> (BoundingBox, BoundingBox) {
        if self.empty {
            return (*self, *self);
        }

        let mid = (self.min.x + self.max.x) * 0.5;
        (
            BoundingBox::from_corners(self.min, point(mid, self.max.y)),
            BoundingBox::from_corners(point(mid, self.min.y), self.max),
        )
    }

    /// Splits the box in two halves at its vertical center.
    ///
    /// The first box covers the lower y values.
    pub fn split_y(&self) -> (BoundingBox, BoundingBox) {
        if self.empty {
            return (*self, *self);
        }

        let mid = (self.min.y + self.max.y) * 0.5;
        (
            BoundingBox::from_corners(self.min, point(self.max.x, mid)),
            BoundingBox::from_corners(point(self.min.x, mid), self.max),
        )
    }

    pub fn to_box2d(&self) -> Option<Box2D> {
        if self.empty {
            return None;
        }

        Some(Box2D {
            min: self.min,
            max: self.max,
        })
    }
}

impl From<Box2D> for BoundingBox {
    fn from(b: Box2D) -> Self {
        BoundingBox::from_corners(b.min, b.max)
    }
}

#[test]
fn union_reports_growth() {
    let mut bbox = BoundingBox::empty();
    assert!(bbox.is_empty());
    assert!(bbox.union_point(point(1.0, 2.0)));
    assert!(!bbox.is_empty());
    assert_eq!(bbox.size(), Vector::zero());

    assert!(!bbox.union_point(point(1.0, 2.0)));
    assert!(bbox.union_point(point(-1.0, 5.0)));
    assert_eq!(bbox.min(), point(-1.0, 2.0));
    assert_eq!(bbox.max(), point(1.0, 5.0));

    let inner = BoundingBox::from_corners(point(0.0, 3.0), point(0.5, 4.0));
    assert!(!bbox.union_box(&inner));
    assert!(!bbox.union_box(&BoundingBox::empty()));
}

#[test]
fn split_halves_cover_the_box() {
    let bbox = BoundingBox::from_corners(point(0.0, 0.0), point(10.0, 4.0));

    let (left, right) = bbox.split_x();
    assert_eq!(left.max().x, 5.0);
    assert_eq!(right.min().x, 5.0);
    let mut union = left;
    union.union_box(&right);
    assert_eq!(union, bbox);

    let (bottom, top) = bbox.split_y();
    assert_eq!(bottom.max(), point(10.0, 2.0));
    assert_eq!(top.min(), point(0.0, 2.0));
}

#[test]
fn inflated_polygon_of_empty_box() {
    assert!(BoundingBox::empty().inflated_polygon(1.0).is_empty());

    let bbox = BoundingBox::from_corners(point(0.0, 0.0), point(1.0, 1.0));
    let polygon = bbox.inflated_polygon(1.0);
    assert_eq!(polygon[0], point(-1.0, -1.0));
    assert_eq!(polygon[1], point(2.0, -1.0));
    assert_eq!(polygon[2], point(2.0, 2.0));
    assert_eq!(polygon[3], point(-1.0, 2.0));
}

#[test]
fn enlarge_and_intersect() {
    let mut a = BoundingBox::from_corners(point(0.0, 0.0), point(2.0, 2.0));
    a.enlarge(Vector::new(1.0, -3.0));
    assert_eq!(a.min(), point(-1.0, 0.0));
    assert_eq!(a.max(), point(3.0, 2.0));

    let b = BoundingBox::from_corners(point(1.0, 1.0), point(5.0, 5.0));
    a.intersect_against(&b);
    assert_eq!(a.min(), point(1.0, 1.0));
    assert_eq!(a.max(), point(3.0, 2.0));

    let far = BoundingBox::from_corners(point(10.0, 10.0), point(11.0, 11.0));
    a.intersect_against(&far);
    assert!(a.is_empty());
}
