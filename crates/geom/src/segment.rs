use crate::bounding_box::BoundingBox;
use crate::math::{point, vector, Point, Vector};
use crate::Axis;

use core::f32::consts::{FRAC_PI_2, PI};
use core::ops::Range;

#[cfg(not(feature = "std"))]
use num_traits::Float;

/// The geometric nature of a tessellated [`Segment`].
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serialization", derive(Serialize, Deserialize))]
pub enum SegmentKind {
    Line,
    Arc,
}

/// A piece of a tessellated edge: a line segment or an arc of circle.
///
/// Besides geometry, a segment carries the distance values that stroking
/// shaders use (for dashing for example). They are filled by
/// [`TessellatedPathBuilder`](crate::TessellatedPathBuilder) and kept
/// consistent when a segment is split.
#[derive(Copy, Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serialization", derive(Serialize, Deserialize))]
pub struct Segment {
    pub kind: SegmentKind,
    pub start: Point,
    pub end: Point,
    /// Only meaningful for arcs.
    pub center: Point,
    /// Only meaningful for arcs.
    pub radius: f32,
    /// Angle of the start point around the center. Only meaningful for arcs.
    pub start_angle: f32,
    /// Angle of the end point around the center. Only meaningful for arcs.
    /// It is smaller than `start_angle` for clockwise arcs.
    pub end_angle: f32,
    pub length: f32,
    pub distance_from_edge_start: f32,
    pub distance_from_contour_start: f32,
    pub edge_length: f32,
    pub contour_length: f32,
    /// Unit tangent at the start of the segment.
    pub enter_unit_vector: Vector,
    /// Unit tangent at the end of the segment.
    pub leaving_unit_vector: Vector,
    /// True if the segment continues the previous one without any change of
    /// direction, in which case no bevel is needed between them.
    pub continuation_with_predecessor: bool,
    pub first_segment_of_edge: bool,
    pub last_segment_of_edge: bool,
    pub contour_id: u32,
    pub edge_id: u32,
}

/// How a segment relates to an axis-aligned splitting line.
#[derive(Clone, Debug, PartialEq)]
pub enum SegmentSplit {
    /// The segment lies on the lower side of the line.
    CompletelyBefore,
    /// The segment lies on the upper side of the line.
    CompletelyAfter,
    /// The segment starts on the lower side and ends on the upper side.
    StartBefore { before: Segment, after: Segment },
    /// The segment starts on the upper side and ends on the lower side.
    StartAfter { before: Segment, after: Segment },
}

fn unit_or_zero(v: Vector) -> Vector {
    let len = v.length();
    if len > 0.0 {
        v / len
    } else {
        Vector::zero()
    }
}

impl Segment {
    /// Creates a line segment with no distance information.
    pub fn line(start: Point, end: Point) -> Self {
        let dir = unit_or_zero(end - start);
        Segment {
            kind: SegmentKind::Line,
            start,
            end,
            center: start,
            radius: 0.0,
            start_angle: 0.0,
            end_angle: 0.0,
            length: (end - start).length(),
            distance_from_edge_start: 0.0,
            distance_from_contour_start: 0.0,
            edge_length: 0.0,
            contour_length: 0.0,
            enter_unit_vector: dir,
            leaving_unit_vector: dir,
            continuation_with_predecessor: false,
            first_segment_of_edge: false,
            last_segment_of_edge: false,
            contour_id: 0,
            edge_id: 0,
        }
    }

    /// Creates an arc of circle going from `angles.start` to `angles.end`
    /// (in radians) around `center`.
    pub fn arc(center: Point, radius: f32, angles: Range<f32>) -> Self {
        let start = arc_point(center, radius, angles.start);
        let end = arc_point(center, radius, angles.end);
        Segment {
            kind: SegmentKind::Arc,
            start,
            end,
            center,
            radius,
            start_angle: angles.start,
            end_angle: angles.end,
            length: radius * (angles.end - angles.start).abs(),
            distance_from_edge_start: 0.0,
            distance_from_contour_start: 0.0,
            edge_length: 0.0,
            contour_length: 0.0,
            enter_unit_vector: arc_tangent(&angles, angles.start),
            leaving_unit_vector: arc_tangent(&angles, angles.end),
            continuation_with_predecessor: false,
            first_segment_of_edge: false,
            last_segment_of_edge: false,
            contour_id: 0,
            edge_id: 0,
        }
    }

    #[inline]
    pub fn is_arc(&self) -> bool {
        self.kind == SegmentKind::Arc
    }

    /// Normal vector at the start of the segment.
    pub fn enter_normal(&self) -> Vector {
        vector(-self.enter_unit_vector.y, self.enter_unit_vector.x)
    }

    /// Normal vector at the end of the segment.
    pub fn leaving_normal(&self) -> Vector {
        vector(-self.leaving_unit_vector.y, self.leaving_unit_vector.x)
    }

    /// Returns the smallest box containing the segment.
    pub fn bounding_box(&self) -> BoundingBox {
        let mut bbox = BoundingBox::from_corners(self.start, self.end);
        if self.kind == SegmentKind::Arc {
            let lo = self.start_angle.min(self.end_angle);
            let hi = self.start_angle.max(self.end_angle);
            // Axis extremes sit at multiples of pi/2.
            let mut k = (lo / FRAC_PI_2).ceil();
            while k * FRAC_PI_2 <= hi {
                bbox.union_point(arc_point(self.center, self.radius, k * FRAC_PI_2));
                k += 1.0;
            }
        }

        bbox
    }

    /// Computes how the segment relates to the line `axis == value` and splits
    /// it exactly if it crosses the line.
    ///
    /// Points with a coordinate strictly below `value` are "before" the line.
    /// The piece that follows the other along the unsplit segment is
    /// flagged as a continuation of its predecessor.
    pub fn compute_split(&self, axis: Axis, value: f32) -> SegmentSplit {
        let start_before = axis.of(self.start) < value;
        let end_before = axis.of(self.end) < value;

        match (start_before, end_before) {
            (true, true) => return SegmentSplit::CompletelyBefore,
            (false, false) => return SegmentSplit::CompletelyAfter,
            _ => {}
        }

        let (first, second) = match self.kind {
            SegmentKind::Arc if self.radius > 0.0 => self.split_arc(axis, value),
            _ => self.split_line(axis, value),
        };

        if start_before {
            SegmentSplit::StartBefore {
                before: first,
                after: second,
            }
        } else {
            SegmentSplit::StartAfter {
                before: second,
                after: first,
            }
        }
    }

    fn split_line(&self, axis: Axis, value: f32) -> (Segment, Segment) {
        let s = axis.of(self.start);
        let e = axis.of(self.end);
        let t = ((value - s) / (e - s)).max(0.0).min(1.0);
        let mut p = self.start.lerp(self.end, t);
        // Land exactly on the splitting line.
        match axis {
            Axis::X => p.x = value,
            Axis::Y => p.y = value,
        }

        let mut first = *self;
        let mut second = *self;
        first.end = p;
        first.length = self.length * t;
        second.start = p;
        second.length = self.length - first.length;

        self.finish_split(&mut first, &mut second);

        (first, second)
    }

    fn split_arc(&self, axis: Axis, value: f32) -> (Segment, Segment) {
        let a0 = self.start_angle;
        let a1 = self.end_angle;
        let theta = arc_crossing(self.center, self.radius, a0..a1, axis, value);

        let mut p = arc_point(self.center, self.radius, theta);
        match axis {
            Axis::X => p.x = value,
            Axis::Y => p.y = value,
        }

        let mut first = *self;
        let mut second = *self;
        first.end = p;
        first.end_angle = theta;
        first.length = self.radius * (theta - a0).abs();
        first.leaving_unit_vector = arc_tangent(&(a0..a1), theta);
        second.start = p;
        second.start_angle = theta;
        second.length = (self.length - first.length).max(0.0);
        second.enter_unit_vector = first.leaving_unit_vector;

        self.finish_split(&mut first, &mut second);

        (first, second)
    }

    fn finish_split(&self, first: &mut Segment, second: &mut Segment) {
        first.last_segment_of_edge = false;
        second.first_segment_of_edge = false;
        second.continuation_with_predecessor = true;
        second.distance_from_edge_start = self.distance_from_edge_start + first.length;
        second.distance_from_contour_start = self.distance_from_contour_start + first.length;
    }
}

fn arc_point(center: Point, radius: f32, angle: f32) -> Point {
    point(
        center.x + radius * angle.cos(),
        center.y + radius * angle.sin(),
    )
}

// Direction of travel along the arc at `angle`.
fn arc_tangent(angles: &Range<f32>, angle: f32) -> Vector {
    let sign = if angles.end >= angles.start { 1.0 } else { -1.0 };
    vector(-angle.sin() * sign, angle.cos() * sign)
}

// Returns the first angle, in parameter order, at which the arc crosses the
// line `axis == value`. The end points are expected to be on both sides of
// the line.
fn arc_crossing(center: Point, radius: f32, angles: Range<f32>, axis: Axis, value: f32) -> f32 {
    let lo = angles.start.min(angles.end);
    let hi = angles.start.max(angles.end);
    let k = ((value - axis.of(center)) / radius).max(-1.0).min(1.0);

    let bases = match axis {
        Axis::X => {
            let a = k.acos();
            [a, -a]
        }
        Axis::Y => {
            let a = k.asin();
            [a, PI - a]
        }
    };

    let two_pi = 2.0 * PI;
    let mut best: Option<f32> = None;
    for base in &bases {
        let mut theta = base + ((lo - base) / two_pi).ceil() * two_pi;
        while theta <= hi {
            let closer = match best {
                Some(b) => (theta - angles.start).abs() < (b - angles.start).abs(),
                None => true,
            };
            if closer {
                best = Some(theta);
            }
            theta += two_pi;
        }
    }

    // Rounding can push a crossing that sits exactly on an end point out of
    // the range. The closest end is then the crossing.
    best.unwrap_or_else(|| {
        let s = arc_point(center, radius, angles.start);
        let e = arc_point(center, radius, angles.end);
        if (axis.of(s) - value).abs() <= (axis.of(e) - value).abs() {
            angles.start
        } else {
            angles.end
        }
    })
}

#[cfg(test)]
fn assert_almost_eq(a: f32, b: f32) {
    if (a - b).abs() > 1e-4 {
        panic!("assert almost equal: {:?} != {:?}", a, b);
    }
}

#[test]
fn split_line_segment() {
    let mut s = Segment::line(point(0.0, 0.0), point(10.0, 0.0));
    s.distance_from_edge_start = 5.0;
    s.distance_from_contour_start = 7.0;
    s.first_segment_of_edge = true;
    s.last_segment_of_edge = true;

    assert_eq!(s.compute_split(Axis::X, 20.0), SegmentSplit::CompletelyBefore);
    assert_eq!(s.compute_split(Axis::X, -1.0), SegmentSplit::CompletelyAfter);
    assert_eq!(s.compute_split(Axis::Y, 0.0), SegmentSplit::CompletelyAfter);

    match s.compute_split(Axis::X, 4.0) {
        SegmentSplit::StartBefore { before, after } => {
            assert_eq!(before.start, s.start);
            assert_eq!(before.end, point(4.0, 0.0));
            assert_eq!(after.start, point(4.0, 0.0));
            assert_eq!(after.end, s.end);
            assert_almost_eq(before.length, 4.0);
            assert_almost_eq(after.length, 6.0);
            assert_almost_eq(after.distance_from_edge_start, 9.0);
            assert_almost_eq(after.distance_from_contour_start, 11.0);
            assert!(before.first_segment_of_edge);
            assert!(!before.last_segment_of_edge);
            assert!(!after.first_segment_of_edge);
            assert!(after.last_segment_of_edge);
            assert!(after.continuation_with_predecessor);
        }
        other => panic!("unexpected split {:?}", other),
    }
}

#[test]
fn split_reversed_line_segment() {
    let s = Segment::line(point(10.0, 3.0), point(0.0, 3.0));
    match s.compute_split(Axis::X, 4.0) {
        SegmentSplit::StartAfter { before, after } => {
            // `after` comes first along the segment.
            assert_eq!(after.start, point(10.0, 3.0));
            assert_eq!(after.end, point(4.0, 3.0));
            assert_eq!(before.start, point(4.0, 3.0));
            assert_eq!(before.end, point(0.0, 3.0));
            assert!(before.continuation_with_predecessor);
            assert!(!after.continuation_with_predecessor);
        }
        other => panic!("unexpected split {:?}", other),
    }
}

#[test]
fn split_arc_segment() {
    // Quarter circle from (1, 0) to (0, 1).
    let s = Segment::arc(point(0.0, 0.0), 1.0, 0.0..FRAC_PI_2);
    assert_almost_eq(s.length, FRAC_PI_2);

    match s.compute_split(Axis::X, 0.5) {
        SegmentSplit::StartAfter { before, after } => {
            assert_almost_eq(after.end.x, 0.5);
            assert_almost_eq(after.end.y, 0.75f32.sqrt());
            assert_eq!(after.end, before.start);
            assert_almost_eq(after.end_angle, PI / 3.0);
            assert_almost_eq(before.start_angle, PI / 3.0);
            assert_almost_eq(after.length + before.length, s.length);
            assert_almost_eq(after.leaving_unit_vector.x, before.enter_unit_vector.x);
        }
        other => panic!("unexpected split {:?}", other),
    }

    match s.compute_split(Axis::Y, 0.5) {
        SegmentSplit::StartBefore { before, after } => {
            assert_almost_eq(before.end.y, 0.5);
            assert_almost_eq(before.end_angle, PI / 6.0);
            assert_eq!(after.start, before.end);
        }
        other => panic!("unexpected split {:?}", other),
    }
}

#[test]
fn arc_bounding_box_includes_extremes() {
    // Half circle through the top.
    let s = Segment::arc(point(0.0, 0.0), 2.0, 0.0..PI);
    let bbox = s.bounding_box();
    assert_almost_eq(bbox.max().y, 2.0);
    assert_almost_eq(bbox.min().x, -2.0);
    assert_almost_eq(bbox.max().x, 2.0);
}
