//! Tessellated paths: per-edge arrays of segments plus the joins and caps
//! of every contour.
//!
//! The tessellator that flattens curves into segments is not part of this
//! crate. [`TessellatedPathBuilder`] takes already flattened geometry, groups
//! it into edges and contours and computes the distance values, joins and
//! caps.

use crate::bounding_box::BoundingBox;
use crate::join::{Cap, Join};
use crate::math::Point;
use crate::segment::Segment;

use alloc::vec::Vec;
use core::ops::Range;

/// A contiguous run of segments plus the segment that precedes it, if any.
///
/// Chains produced from a path's edges have no previous segment. Chains
/// produced by splitting an edge at a partition boundary keep a copy of the
/// segment on the other side of the boundary so that continuity between the
/// two pieces is preserved.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct SegmentChain<'l> {
    pub segments: &'l [Segment],
    pub prev_to_start: Option<&'l Segment>,
}

impl<'l> SegmentChain<'l> {
    pub fn is_empty(&self) -> bool {
        self.segments.is_empty()
    }
}

/// The tessellated geometry of a path.
#[derive(Clone, Debug, Default)]
#[cfg_attr(feature = "serialization", derive(Serialize, Deserialize))]
pub struct TessellatedPath {
    segments: Vec<Segment>,
    edges: Vec<Range<usize>>,
    joins: Vec<Join>,
    caps: Vec<Cap>,
    bounding_box: BoundingBox,
    has_arcs: bool,
    max_distance: f32,
}

impl TessellatedPath {
    pub fn builder() -> TessellatedPathBuilder {
        TessellatedPathBuilder::new()
    }

    pub fn is_empty(&self) -> bool {
        self.segments.is_empty()
    }

    /// All segments of all edges.
    pub fn segments(&self) -> &[Segment] {
        &self.segments
    }

    pub fn number_edges(&self) -> usize {
        self.edges.len()
    }

    pub fn edge(&self, index: usize) -> &[Segment] {
        &self.segments[self.edges[index].clone()]
    }

    /// One chain per edge, in edge order.
    pub fn edge_chains(&self) -> impl Iterator<Item = SegmentChain> + '_ {
        self.edges.iter().map(move |range| SegmentChain {
            segments: &self.segments[range.clone()],
            prev_to_start: None,
        })
    }

    pub fn joins(&self) -> &[Join] {
        &self.joins
    }

    pub fn caps(&self) -> &[Cap] {
        &self.caps
    }

    pub fn bounding_box(&self) -> &BoundingBox {
        &self.bounding_box
    }

    /// Returns true if any of the segments is an arc.
    pub fn has_arcs(&self) -> bool {
        self.has_arcs
    }

    /// Upper bound of the distance between the segments and the curves they
    /// approximate.
    pub fn max_distance(&self) -> f32 {
        self.max_distance
    }
}

// Tangent directions closer than this are considered continuous.
const CONTINUITY_THRESHOLD: f32 = 1.0 - 1e-4;

/// Assembles a [`TessellatedPath`] contour by contour.
///
/// ```
/// use strata_geom::TessellatedPath;
/// use strata_geom::math::point;
///
/// let mut builder = TessellatedPath::builder();
/// builder.begin(point(0.0, 0.0));
/// builder.line_to(point(10.0, 0.0));
/// builder.end_edge();
/// builder.line_to(point(10.0, 10.0));
/// builder.end(false);
/// let path = builder.build();
///
/// assert_eq!(path.number_edges(), 2);
/// assert_eq!(path.joins().len(), 1);
/// assert_eq!(path.caps().len(), 2);
/// ```
#[derive(Clone, Debug, Default)]
pub struct TessellatedPathBuilder {
    path: TessellatedPath,
    current: Option<Point>,
    contour_start: Point,
    first_edge_of_contour: usize,
    edge_start: usize,
    contour_id: u32,
}

impl TessellatedPathBuilder {
    pub fn new() -> Self {
        TessellatedPathBuilder::default()
    }

    /// Starts a new contour. An unfinished contour is ended as open.
    pub fn begin(&mut self, at: Point) {
        if self.current.is_some() {
            self.end(false);
        }

        self.current = Some(at);
        self.contour_start = at;
        self.first_edge_of_contour = self.path.edges.len();
        self.edge_start = self.path.segments.len();
    }

    /// Appends a line segment to the current edge.
    pub fn line_to(&mut self, to: Point) {
        let from = match self.current {
            Some(p) => p,
            None => {
                self.begin(to);
                return;
            }
        };

        self.add_segment(Segment::line(from, to));
    }

    /// Appends an arc of circle to the current edge.
    ///
    /// A line is inserted if the arc does not start at the current position.
    pub fn arc_to(&mut self, center: Point, radius: f32, angles: Range<f32>) {
        let arc = Segment::arc(center, radius, angles);
        match self.current {
            Some(p) if (p - arc.start).square_length() > 1e-12 => {
                self.add_segment(Segment::line(p, arc.start));
            }
            None => self.begin(arc.start),
            _ => {}
        }

        self.path.has_arcs = true;
        self.add_segment(arc);
    }

    /// Appends an already built segment to the current edge.
    pub fn add_segment(&mut self, mut segment: Segment) {
        if self.current.is_none() {
            self.begin(segment.start);
        }

        segment.contour_id = self.contour_id;
        segment.edge_id = self.path.edges.len() as u32;
        segment.continuation_with_predecessor = false;
        if self.path.segments.len() > self.edge_start {
            let prev = &self.path.segments[self.path.segments.len() - 1];
            segment.continuation_with_predecessor =
                prev.leaving_unit_vector.dot(segment.enter_unit_vector) >= CONTINUITY_THRESHOLD;
        }

        self.path.bounding_box.union_box(&segment.bounding_box());
        self.current = Some(segment.end);
        self.path.segments.push(segment);
    }

    /// Reports the tessellation error of the segments added so far. The path
    /// keeps the largest reported value.
    pub fn record_max_distance(&mut self, distance: f32) {
        self.path.max_distance = self.path.max_distance.max(distance);
    }

    /// Closes the current edge. The next segment starts a new edge and a join
    /// will be generated between the two.
    pub fn end_edge(&mut self) {
        let end = self.path.segments.len();
        if end == self.edge_start {
            return;
        }

        let range = self.edge_start..end;
        let mut distance = 0.0;
        for segment in &mut self.path.segments[range.clone()] {
            segment.distance_from_edge_start = distance;
            distance += segment.length;
        }

        let edge_length = distance;
        for segment in &mut self.path.segments[range.clone()] {
            segment.edge_length = edge_length;
        }

        self.path.segments[range.start].first_segment_of_edge = true;
        self.path.segments[range.end - 1].last_segment_of_edge = true;

        self.path.edges.push(range);
        self.edge_start = end;
    }

    /// Ends the current contour.
    ///
    /// Closed contours get a closing edge back to the first point (if needed)
    /// and a join between their last and first edges. Open contours get a
    /// cap at both ends.
    pub fn end(&mut self, close: bool) {
        let current = match self.current.take() {
            Some(p) => p,
            None => return,
        };

        self.end_edge();
        if close && (current - self.contour_start).square_length() > 1e-12 {
            self.current = Some(current);
            self.add_segment(Segment::line(current, self.contour_start));
            self.current = None;
            self.end_edge();
        }

        let edges = self.first_edge_of_contour..self.path.edges.len();
        if edges.is_empty() {
            return;
        }

        let segment_range = self.path.edges[edges.start].start..self.path.edges[edges.end - 1].end;
        let mut distance = 0.0;
        for segment in &mut self.path.segments[segment_range.clone()] {
            segment.distance_from_contour_start = distance;
            distance += segment.length;
        }

        let contour_length = distance;
        for segment in &mut self.path.segments[segment_range.clone()] {
            segment.contour_length = contour_length;
        }

        let mut distance_to_join = 0.0;
        let last_join = if close { edges.end } else { edges.end - 1 };
        for e in edges.start..last_join {
            let enter = &self.path.segments[self.path.edges[e].end - 1];
            let next_edge = if e + 1 == edges.end { edges.start } else { e + 1 };
            let leave = &self.path.segments[self.path.edges[next_edge].start];

            distance_to_join += enter.edge_length;
            let mut join = Join::new(enter.end, enter.leaving_unit_vector, leave.enter_unit_vector);
            join.distance_from_previous_join = enter.edge_length;
            join.distance_from_contour_start = distance_to_join;
            join.contour_length = contour_length;
            join.source_index = self.path.joins.len() as u32;
            self.path.joins.push(join);
        }

        if !close {
            let first = self.path.segments[segment_range.start];
            let last = self.path.segments[segment_range.end - 1];

            let mut start_cap = Cap::new(first.start, -first.enter_unit_vector, true);
            start_cap.edge_length = first.edge_length;
            start_cap.contour_length = contour_length;
            start_cap.source_index = self.path.caps.len() as u32;
            self.path.caps.push(start_cap);

            let mut end_cap = Cap::new(last.end, last.leaving_unit_vector, false);
            end_cap.edge_length = last.edge_length;
            end_cap.contour_length = contour_length;
            end_cap.distance_from_edge_start = last.edge_length;
            end_cap.distance_from_contour_start = contour_length;
            end_cap.source_index = self.path.caps.len() as u32;
            self.path.caps.push(end_cap);
        }

        self.contour_id += 1;
    }

    pub fn build(mut self) -> TessellatedPath {
        self.end(false);
        self.path
    }
}

#[cfg(test)]
use crate::math::point;

#[test]
fn closed_square() {
    let mut builder = TessellatedPath::builder();
    builder.begin(point(0.0, 0.0));
    builder.line_to(point(1.0, 0.0));
    builder.end_edge();
    builder.line_to(point(1.0, 1.0));
    builder.end_edge();
    builder.line_to(point(0.0, 1.0));
    builder.end(true);
    let path = builder.build();

    assert_eq!(path.number_edges(), 4);
    assert_eq!(path.joins().len(), 4);
    assert!(path.caps().is_empty());
    assert!(!path.has_arcs());

    let last = path.segments().last().unwrap();
    assert_eq!(last.end, point(0.0, 0.0));
    assert_eq!(last.contour_length, 4.0);
    assert_eq!(last.distance_from_contour_start, 3.0);

    for (i, join) in path.joins().iter().enumerate() {
        assert_eq!(join.source_index, i as u32);
        assert_eq!(join.distance_from_previous_join, 1.0);
    }
    assert_eq!(path.joins()[3].position, point(0.0, 0.0));
}

#[test]
fn open_polyline_has_caps() {
    let mut builder = TessellatedPath::builder();
    builder.begin(point(0.0, 0.0));
    builder.line_to(point(2.0, 0.0));
    builder.line_to(point(4.0, 0.0));
    builder.end_edge();
    builder.line_to(point(4.0, 3.0));
    builder.end(false);
    let path = builder.build();

    assert_eq!(path.number_edges(), 2);
    assert_eq!(path.joins().len(), 1);
    assert_eq!(path.caps().len(), 2);

    let edge = path.edge(0);
    assert!(edge[0].first_segment_of_edge);
    assert!(!edge[0].last_segment_of_edge);
    assert!(edge[1].continuation_with_predecessor);
    assert_eq!(edge[1].distance_from_edge_start, 2.0);
    assert_eq!(edge[1].edge_length, 4.0);

    let caps = path.caps();
    assert!(caps[0].is_starting_cap);
    assert_eq!(caps[0].unit_vector, crate::math::vector(-1.0, 0.0));
    assert!(!caps[1].is_starting_cap);
    assert_eq!(caps[1].position, point(4.0, 3.0));
    assert_eq!(caps[1].distance_from_contour_start, 7.0);
}

#[test]
fn arcs_are_tracked() {
    use core::f32::consts::PI;

    let mut builder = TessellatedPath::builder();
    builder.begin(point(1.0, 0.0));
    builder.arc_to(point(0.0, 0.0), 1.0, 0.0..PI);
    builder.end(false);
    let path = builder.build();

    assert!(path.has_arcs());
    assert_eq!(path.max_distance(), 0.0);
    assert_eq!(path.segments().len(), 1);
    assert!((path.bounding_box().max().y - 1.0).abs() < 1e-5);
    assert_eq!(path.edge_chains().count(), 1);
}

#[test]
fn largest_tessellation_error_is_kept() {
    let mut builder = TessellatedPath::builder();
    builder.begin(point(0.0, 0.0));
    builder.line_to(point(5.0, 1.0));
    builder.record_max_distance(0.25);
    builder.end_edge();
    builder.line_to(point(10.0, 0.0));
    builder.record_max_distance(0.1);
    builder.end(false);

    assert_eq!(builder.build().max_distance(), 0.25);
}
