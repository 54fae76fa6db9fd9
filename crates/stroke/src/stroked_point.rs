//! Linear packing: polygonal stroking geometry.
//!
//! Every vertex is a [`StrokedPoint`]: a position on the path plus offset
//! vectors that the vertex shader scales by the stroking radius. Segments are
//! drawn as two quads sharing the path, joins and caps as triangle fans.
//!
//! All vertices of an item share the item's depth value.

use crate::attribute::{pack_vec4, unpack_vec4, AttributeSink, PackingSize, PainterAttribute};
use crate::geom::math::{vector, Point, Vector};
use crate::geom::utils::number_segments_for_tessellation;
use crate::geom::{Cap, Join, Segment, SegmentChain};
use crate::{Index, JoinStyle};

use core::f32::consts::PI;

#[cfg(not(feature = "std"))]
use num_traits::Float;

/// How the vertex shader computes the offset of a [`StrokedPoint`].
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serialization", derive(Serialize, Deserialize))]
#[repr(u32)]
pub enum OffsetType {
    /// Point of a segment quad or of a bevel between segments.
    SubEdge = 0,
    /// Point shared with the edge: offset is `pre_offset` times the radius.
    SharedWithEdge,
    RoundedJoin,
    MiterClipJoin,
    MiterBevelJoin,
    MiterJoin,
    RoundedCap,
    SquareCap,
    AdjustableCap,
}

impl OffsetType {
    pub fn from_bits(bits: u32) -> Option<Self> {
        use OffsetType::*;
        Some(match bits {
            0 => SubEdge,
            1 => SharedWithEdge,
            2 => RoundedJoin,
            3 => MiterClipJoin,
            4 => MiterBevelJoin,
            5 => MiterJoin,
            6 => RoundedCap,
            7 => SquareCap,
            8 => AdjustableCap,
            _ => return None,
        })
    }
}

/// The cap geometries of the linear packing.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serialization", derive(Serialize, Deserialize))]
pub enum CapType {
    Square,
    Rounded,
    /// A rectangle that the shader collapses or extends, used by dashing.
    Adjustable,
}

/// A vertex of the linear packing.
#[derive(Copy, Clone, Debug, Default, PartialEq)]
pub struct StrokedPoint {
    pub position: Point,
    pub pre_offset: Vector,
    pub auxiliary_offset: Vector,
    pub distance_from_edge_start: f32,
    pub distance_from_contour_start: f32,
    pub edge_length: f32,
    pub contour_length: f32,
    pub packed_data: u32,
}

impl StrokedPoint {
    pub const OFFSET_TYPE_BIT0: u32 = 0;
    pub const OFFSET_TYPE_NUM_BITS: u32 = 4;
    pub const BOUNDARY_BIT: u32 = 4;
    pub const DEPTH_BIT0: u32 = 5;
    pub const DEPTH_NUM_BITS: u32 = 20;
    pub const JOIN_BIT: u32 = 25;
    pub const NUMBER_COMMON_BITS: u32 = 26;

    // Sub-edge points.
    pub const END_SUB_EDGE_BIT: u32 = 26;
    pub const BEVEL_EDGE_BIT: u32 = 27;

    // Rounded join points.
    pub const NORMAL0_Y_SIGN_BIT: u32 = 26;
    pub const NORMAL1_Y_SIGN_BIT: u32 = 27;
    pub const SIN_SIGN_BIT: u32 = 28;

    // Miter join points.
    pub const LAMBDA_NEGATED_BIT: u32 = 26;

    // Adjustable and flat cap points.
    pub const CAP_ENDING_BIT: u32 = 26;
    pub const CAP_IS_END_CONTOUR_BIT: u32 = 27;

    pub const MAX_DEPTH: u32 = (1 << Self::DEPTH_NUM_BITS) - 1;

    pub const BOUNDARY_MASK: u32 = 1 << Self::BOUNDARY_BIT;
    pub const JOIN_MASK: u32 = 1 << Self::JOIN_BIT;
    pub const END_SUB_EDGE_MASK: u32 = 1 << Self::END_SUB_EDGE_BIT;
    pub const BEVEL_EDGE_MASK: u32 = 1 << Self::BEVEL_EDGE_BIT;
    pub const NORMAL0_Y_SIGN_MASK: u32 = 1 << Self::NORMAL0_Y_SIGN_BIT;
    pub const NORMAL1_Y_SIGN_MASK: u32 = 1 << Self::NORMAL1_Y_SIGN_BIT;
    pub const SIN_SIGN_MASK: u32 = 1 << Self::SIN_SIGN_BIT;
    pub const LAMBDA_NEGATED_MASK: u32 = 1 << Self::LAMBDA_NEGATED_BIT;
    pub const CAP_ENDING_MASK: u32 = 1 << Self::CAP_ENDING_BIT;
    pub const CAP_IS_END_CONTOUR_MASK: u32 = 1 << Self::CAP_IS_END_CONTOUR_BIT;

    /// Packs the common bits. Depth values past [`Self::MAX_DEPTH`] are
    /// clamped.
    pub fn pack_bits(on_boundary: bool, offset_type: OffsetType, depth: u32) -> u32 {
        let depth = depth.min(Self::MAX_DEPTH);
        ((offset_type as u32) << Self::OFFSET_TYPE_BIT0)
            | ((on_boundary as u32) << Self::BOUNDARY_BIT)
            | (depth << Self::DEPTH_BIT0)
    }

    fn pack_join_bits(on_boundary: bool, offset_type: OffsetType, depth: u32) -> u32 {
        Self::pack_bits(on_boundary, offset_type, depth) | Self::JOIN_MASK
    }

    pub fn offset_type(&self) -> Option<OffsetType> {
        OffsetType::from_bits(
            (self.packed_data >> Self::OFFSET_TYPE_BIT0) & ((1 << Self::OFFSET_TYPE_NUM_BITS) - 1),
        )
    }

    pub fn depth(&self) -> u32 {
        (self.packed_data >> Self::DEPTH_BIT0) & Self::MAX_DEPTH
    }

    pub fn on_boundary(&self) -> bool {
        self.packed_data & Self::BOUNDARY_MASK != 0
    }

    pub fn pack(&self) -> PainterAttribute {
        PainterAttribute {
            attrib0: pack_vec4(
                self.position.x,
                self.position.y,
                self.pre_offset.x,
                self.pre_offset.y,
            ),
            attrib1: pack_vec4(
                self.distance_from_edge_start,
                self.distance_from_contour_start,
                self.auxiliary_offset.x,
                self.auxiliary_offset.y,
            ),
            attrib2: [
                self.packed_data,
                self.edge_length.to_bits(),
                self.contour_length.to_bits(),
                0,
            ],
        }
    }

    pub fn unpack(attribute: &PainterAttribute) -> Self {
        let a0 = unpack_vec4(attribute.attrib0);
        let a1 = unpack_vec4(attribute.attrib1);
        StrokedPoint {
            position: Point::new(a0[0], a0[1]),
            pre_offset: vector(a0[2], a0[3]),
            distance_from_edge_start: a1[0],
            distance_from_contour_start: a1[1],
            auxiliary_offset: vector(a1[2], a1[3]),
            packed_data: attribute.attrib2[0],
            edge_length: f32::from_bits(attribute.attrib2[1]),
            contour_length: f32::from_bits(attribute.attrib2[2]),
        }
    }

    fn at_join(join: &Join) -> Self {
        StrokedPoint {
            position: join.position,
            distance_from_edge_start: join.distance_from_previous_join,
            edge_length: join.distance_from_previous_join,
            contour_length: join.contour_length,
            distance_from_contour_start: join.distance_from_contour_start,
            ..StrokedPoint::default()
        }
    }

    fn at_cap(cap: &Cap) -> Self {
        StrokedPoint {
            position: cap.position,
            distance_from_edge_start: if cap.is_starting_cap { 0.0 } else { cap.edge_length },
            edge_length: cap.edge_length,
            contour_length: cap.contour_length,
            distance_from_contour_start: if cap.is_starting_cap {
                0.0
            } else {
                cap.contour_length
            },
            ..StrokedPoint::default()
        }
    }

    fn at_segment_start(segment: &Segment) -> Self {
        StrokedPoint {
            position: segment.start,
            distance_from_edge_start: segment.distance_from_edge_start,
            distance_from_contour_start: segment.distance_from_contour_start,
            edge_length: segment.edge_length,
            contour_length: segment.contour_length,
            ..StrokedPoint::default()
        }
    }

    fn at_segment_end(segment: &Segment) -> Self {
        StrokedPoint {
            position: segment.end,
            distance_from_edge_start: segment.distance_from_edge_start + segment.length,
            distance_from_contour_start: segment.distance_from_contour_start + segment.length,
            edge_length: segment.edge_length,
            contour_length: segment.contour_length,
            ..StrokedPoint::default()
        }
    }

    fn with(mut self, pre_offset: Vector, auxiliary_offset: Vector, packed_data: u32) -> Self {
        self.pre_offset = pre_offset;
        self.auxiliary_offset = auxiliary_offset;
        self.packed_data = packed_data;
        self
    }
}

/// A bevel fills the gap between two segments that are not continuations of
/// one another. Cusps, where the direction flips, get none.
pub(crate) fn segment_has_bevel(prev: Option<&Segment>, segment: &Segment) -> bool {
    match prev {
        Some(prev) => {
            !segment.continuation_with_predecessor
                && prev.leaving_unit_vector.dot(segment.enter_unit_vector) >= 0.0
        }
        None => false,
    }
}

/// Returns the side multiplier and the start and end normals of the bevel
/// between `prev` and `segment`.
pub(crate) fn compute_bevel_lambda(
    is_inner_bevel: bool,
    prev: &Segment,
    segment: &Segment,
) -> (f32, Vector, Vector) {
    let end_bevel = segment.enter_normal();
    let start_bevel = prev.leaving_normal();
    let mut lambda = if end_bevel.dot(prev.leaving_unit_vector) < 0.0 {
        -1.0
    } else {
        1.0
    };
    if is_inner_bevel {
        lambda = -lambda;
    }

    (lambda, start_bevel, end_bevel)
}

/// Size of a chain: 6 attributes and 12 indices per segment plus two
/// triangles for the bevels.
pub fn chain_size(chain: &SegmentChain) -> PackingSize {
    let mut size = PackingSize::ZERO;
    let mut prev = chain.prev_to_start;
    for segment in chain.segments {
        if segment_has_bevel(prev, segment) {
            size += PackingSize::new(6, 6);
        }
        size += PackingSize::new(6, 12);
        prev = Some(segment);
    }

    size
}

/// Packs a chain. The indices are written in reverse order.
pub fn pack_chain(
    chain: &SegmentChain,
    depth: u32,
    attributes: &mut [PainterAttribute],
    indices: &mut [Index],
    index_adjust: Index,
) {
    let mut sink = AttributeSink::new(attributes, indices, index_adjust);
    let mut prev = chain.prev_to_start;
    for segment in chain.segments {
        let bevel = match prev {
            Some(prev) if segment_has_bevel(Some(prev), segment) => Some(prev),
            _ => None,
        };

        if let Some(prev) = bevel {
            pack_bevel(false, prev, segment, depth, &mut sink);
        }
        pack_segment(segment, depth, &mut sink);
        if let Some(prev) = bevel {
            pack_bevel(true, prev, segment, depth, &mut sink);
        }

        prev = Some(segment);
    }

    debug_assert_eq!(sink.written(), chain_size(chain));
    sink.reverse_indices_from(0);
}

fn pack_bevel(
    is_inner_bevel: bool,
    prev: &Segment,
    segment: &Segment,
    depth: u32,
    sink: &mut AttributeSink,
) {
    let (lambda, start_bevel, end_bevel) = compute_bevel_lambda(is_inner_bevel, prev, segment);
    let first = sink.vertex();
    sink.push_triangle(first, first + 1, first + 2);

    let pt = StrokedPoint::at_segment_start(segment);
    let bits = StrokedPoint::BEVEL_EDGE_MASK;
    let zero = vector(0.0, 0.0);
    sink.push_vertex(
        pt.with(zero, zero, bits | StrokedPoint::pack_bits(false, OffsetType::SubEdge, depth))
            .pack(),
    );
    sink.push_vertex(
        pt.with(
            start_bevel * lambda,
            zero,
            bits | StrokedPoint::pack_bits(true, OffsetType::SubEdge, depth),
        )
        .pack(),
    );
    sink.push_vertex(
        pt.with(
            end_bevel * lambda,
            zero,
            bits | StrokedPoint::pack_bits(true, OffsetType::SubEdge, depth),
        )
        .pack(),
    );
}

// The two quads of a segment, sharing the points on the path:
//
//   0 ---- 3     +normal
//   |      |
//   2 ---- 5     on the path
//   |      |
//   1 ---- 4     -normal
const SEGMENT_TRIANGLES: [Index; 12] = [0, 2, 5, 0, 5, 3, 2, 1, 4, 2, 4, 5];
const BOUNDARY: [bool; 3] = [true, true, false];
const NORMAL_SIGN: [f32; 3] = [1.0, -1.0, 0.0];

fn pack_segment(segment: &Segment, depth: u32, sink: &mut AttributeSink) {
    let first = sink.vertex();
    for i in SEGMENT_TRIANGLES.iter() {
        sink.push_index(first + i);
    }

    let delta = segment.end - segment.start;
    let begin_normal = segment.enter_normal();
    let end_normal = segment.leaving_normal();

    let start = StrokedPoint::at_segment_start(segment);
    for k in 0..3 {
        sink.push_vertex(
            start
                .with(
                    begin_normal * NORMAL_SIGN[k],
                    delta,
                    StrokedPoint::pack_bits(BOUNDARY[k], OffsetType::SubEdge, depth),
                )
                .pack(),
        );
    }

    let end = StrokedPoint::at_segment_end(segment);
    for k in 0..3 {
        sink.push_vertex(
            end.with(
                end_normal * NORMAL_SIGN[k],
                -delta,
                StrokedPoint::END_SUB_EDGE_MASK
                    | StrokedPoint::pack_bits(BOUNDARY[k], OffsetType::SubEdge, depth),
            )
            .pack(),
        );
    }
}

/// Number of points on the arc of a rounded join, end points included.
fn rounded_join_arc_points(join: &Join, threshold: f32) -> u32 {
    number_segments_for_tessellation(join.join_angle, threshold).max(2)
}

fn rounded_cap_arc_points(threshold: f32) -> u32 {
    number_segments_for_tessellation(PI, threshold).max(2)
}

/// Size of a join. `threshold` only matters for rounded joins.
pub fn join_size(style: JoinStyle, join: &Join, threshold: f32) -> PackingSize {
    match style {
        JoinStyle::NoJoins => PackingSize::ZERO,
        JoinStyle::Bevel => PackingSize::new(3, 3),
        JoinStyle::MiterClip => PackingSize::new(5, 9),
        JoinStyle::MiterBevel | JoinStyle::Miter => PackingSize::new(4, 6),
        JoinStyle::Rounded => {
            let n = rounded_join_arc_points(join, threshold) as usize;
            PackingSize::new(1 + n, 3 * (n - 1))
        }
    }
}

/// Packs a join as a triangle fan around the join position.
pub fn pack_join(
    style: JoinStyle,
    join: &Join,
    threshold: f32,
    depth: u32,
    attributes: &mut [PainterAttribute],
    indices: &mut [Index],
    index_adjust: Index,
) {
    let mut sink = AttributeSink::new(attributes, indices, index_adjust);
    let pt = StrokedPoint::at_join(join);
    let zero = vector(0.0, 0.0);
    let n0 = join.enter_normal();
    let n1 = join.leaving_normal();
    let shared = |on_boundary| StrokedPoint::pack_join_bits(on_boundary, OffsetType::SharedWithEdge, depth);

    match style {
        JoinStyle::NoJoins => {}
        JoinStyle::Bevel => {
            sink.push_vertex(pt.with(n0 * join.lambda, zero, shared(true)).pack());
            sink.push_vertex(pt.with(zero, zero, shared(false)).pack());
            sink.push_vertex(pt.with(n1 * join.lambda, zero, shared(true)).pack());
        }
        JoinStyle::MiterClip => {
            let miter = |on_boundary| StrokedPoint::pack_join_bits(on_boundary, OffsetType::MiterClipJoin, depth);
            sink.push_vertex(pt.with(zero, zero, shared(false)).pack());
            sink.push_vertex(pt.with(n0 * join.lambda, zero, shared(true)).pack());
            sink.push_vertex(pt.with(n0, n1, miter(true)).pack());
            sink.push_vertex(
                pt.with(n1, n0, miter(true) | StrokedPoint::LAMBDA_NEGATED_MASK)
                    .pack(),
            );
            sink.push_vertex(pt.with(n1 * join.lambda, zero, shared(true)).pack());
        }
        JoinStyle::MiterBevel | JoinStyle::Miter => {
            let offset_type = if style == JoinStyle::Miter {
                OffsetType::MiterJoin
            } else {
                OffsetType::MiterBevelJoin
            };
            sink.push_vertex(pt.with(zero, zero, shared(false)).pack());
            sink.push_vertex(pt.with(n0 * join.lambda, zero, shared(true)).pack());
            sink.push_vertex(
                pt.with(n0, n1, StrokedPoint::pack_join_bits(true, offset_type, depth))
                    .pack(),
            );
            sink.push_vertex(pt.with(n1 * join.lambda, zero, shared(true)).pack());
        }
        JoinStyle::Rounded => {
            let num_arc_points = rounded_join_arc_points(join, threshold);
            pack_rounded_join(join, num_arc_points, depth, &mut sink);
        }
    }

    let end = sink.vertex();
    sink.push_triangle_fan(0, end);
    debug_assert_eq!(sink.written(), join_size(style, join, threshold));
}

fn pack_rounded_join(join: &Join, num_arc_points: u32, depth: u32, sink: &mut AttributeSink) {
    let pt = StrokedPoint::at_join(join);
    let zero = vector(0.0, 0.0);
    let n0 = join.enter_normal() * join.lambda;
    let n1 = join.leaving_normal() * join.lambda;
    let shared = |on_boundary| StrokedPoint::pack_join_bits(on_boundary, OffsetType::SharedWithEdge, depth);

    sink.push_vertex(pt.with(zero, zero, shared(false)).pack());
    sink.push_vertex(pt.with(n0, zero, shared(true)).pack());

    // The shader reconstructs the normals from their x components and the
    // sign bits.
    let pre_offset = vector(n0.x, n1.x);
    let delta_theta = join.join_angle / (num_arc_points - 1) as f32;
    for i in 1..num_arc_points - 1 {
        let t = i as f32 / (num_arc_points - 1) as f32;
        let (s, c) = (delta_theta * i as f32).sin_cos();
        // (c + is) * n0 as complex numbers.
        let rotated = vector(c * n0.x - s * n0.y, c * n0.y + s * n0.x);

        let mut bits = StrokedPoint::pack_join_bits(true, OffsetType::RoundedJoin, depth);
        if n0.y < 0.0 {
            bits |= StrokedPoint::NORMAL0_Y_SIGN_MASK;
        }
        if n1.y < 0.0 {
            bits |= StrokedPoint::NORMAL1_Y_SIGN_MASK;
        }
        if rotated.y < 0.0 {
            bits |= StrokedPoint::SIN_SIGN_MASK;
        }
        sink.push_vertex(pt.with(pre_offset, vector(t, rotated.x), bits).pack());
    }

    sink.push_vertex(pt.with(n1, zero, shared(true)).pack());
}

/// Size of a cap. `threshold` only matters for rounded caps.
pub fn cap_size(cap_type: CapType, threshold: f32) -> PackingSize {
    match cap_type {
        CapType::Square => PackingSize::new(5, 9),
        CapType::Adjustable => PackingSize::new(6, 12),
        CapType::Rounded => {
            let n = rounded_cap_arc_points(threshold) as usize;
            PackingSize::new(1 + n, 3 * (n - 1))
        }
    }
}

/// Packs a cap as a triangle fan around the cap position.
pub fn pack_cap(
    cap_type: CapType,
    cap: &Cap,
    threshold: f32,
    depth: u32,
    attributes: &mut [PainterAttribute],
    indices: &mut [Index],
    index_adjust: Index,
) {
    let mut sink = AttributeSink::new(attributes, indices, index_adjust);
    let pt = StrokedPoint::at_cap(cap);
    let zero = vector(0.0, 0.0);
    let v = cap.unit_vector;
    let n = vector(-v.y, v.x);
    let shared = |on_boundary| StrokedPoint::pack_bits(on_boundary, OffsetType::SharedWithEdge, depth);

    match cap_type {
        CapType::Square => {
            let square = StrokedPoint::pack_bits(true, OffsetType::SquareCap, depth);
            sink.push_vertex(pt.with(zero, zero, shared(false)).pack());
            sink.push_vertex(pt.with(n, zero, shared(true)).pack());
            sink.push_vertex(pt.with(n, v, square).pack());
            sink.push_vertex(pt.with(-n, v, square).pack());
            sink.push_vertex(pt.with(-n, zero, shared(true)).pack());
        }
        CapType::Adjustable => {
            let end_contour = if cap.is_starting_cap {
                0
            } else {
                StrokedPoint::CAP_IS_END_CONTOUR_MASK
            };
            let bits = |on_boundary| {
                StrokedPoint::pack_bits(on_boundary, OffsetType::AdjustableCap, depth) | end_contour
            };
            let ending = StrokedPoint::CAP_ENDING_MASK;

            sink.push_vertex(pt.with(zero, v, bits(false)).pack());
            sink.push_vertex(pt.with(n, v, bits(true)).pack());
            sink.push_vertex(pt.with(n, v, bits(true) | ending).pack());
            sink.push_vertex(pt.with(zero, v, bits(false) | ending).pack());
            sink.push_vertex(pt.with(-n, v, bits(true) | ending).pack());
            sink.push_vertex(pt.with(-n, v, bits(true)).pack());
        }
        CapType::Rounded => {
            let num_arc_points = rounded_cap_arc_points(threshold);
            let delta_theta = PI / (num_arc_points - 1) as f32;
            let rounded = StrokedPoint::pack_bits(true, OffsetType::RoundedCap, depth);

            sink.push_vertex(pt.with(zero, zero, shared(false)).pack());
            sink.push_vertex(pt.with(n, zero, shared(true)).pack());
            for i in 1..num_arc_points - 1 {
                let (s, c) = (delta_theta * i as f32).sin_cos();
                sink.push_vertex(pt.with(n, vector(s, c), rounded).pack());
            }
            sink.push_vertex(pt.with(-n, zero, shared(true)).pack());
        }
    }

    let end = sink.vertex();
    sink.push_triangle_fan(0, end);
    debug_assert_eq!(sink.written(), cap_size(cap_type, threshold));
}

#[cfg(test)]
fn polyline(points: &[Point]) -> alloc::vec::Vec<Segment> {
    let mut segments = alloc::vec::Vec::new();
    let mut distance = 0.0;
    for pair in points.windows(2) {
        let mut segment = Segment::line(pair[0], pair[1]);
        segment.distance_from_edge_start = distance;
        distance += segment.length;
        segments.push(segment);
    }
    for segment in &mut segments {
        segment.edge_length = distance;
        segment.contour_length = distance;
    }

    segments
}

#[test]
fn chain_with_bevels() {
    use crate::geom::math::point;

    let segments = polyline(&[point(0.0, 0.0), point(10.0, 0.0), point(10.0, 10.0), point(20.0, 10.0)]);
    let chain = SegmentChain {
        segments: &segments,
        prev_to_start: None,
    };

    // Two bevels: between the first and second, second and third segments.
    let size = chain_size(&chain);
    assert_eq!(size, PackingSize::new(3 * 6 + 2 * 6, 3 * 12 + 2 * 6));

    let mut attributes = alloc::vec![PainterAttribute::default(); size.attributes];
    let mut indices = alloc::vec![0; size.indices];
    pack_chain(&chain, 7, &mut attributes, &mut indices, 100);

    for attribute in &attributes {
        let pt = StrokedPoint::unpack(attribute);
        assert_eq!(pt.depth(), 7);
        assert_eq!(pt.offset_type(), Some(OffsetType::SubEdge));
    }

    // Reversed: the first segment's triangles come last.
    assert_eq!(&indices[indices.len() - 3..], &[105, 102, 100]);
    assert!(indices.iter().all(|i| *i >= 100 && *i < 100 + size.attributes as u32));

    let first = StrokedPoint::unpack(&attributes[0]);
    assert_eq!(first.position, point(0.0, 0.0));
    assert_eq!(first.pre_offset, vector(0.0, 1.0));
    assert!(first.on_boundary());
    let end = StrokedPoint::unpack(&attributes[3]);
    assert_eq!(end.distance_from_edge_start, 10.0);
    assert_ne!(end.packed_data & StrokedPoint::END_SUB_EDGE_MASK, 0);
}

#[test]
fn cusps_and_continuations_have_no_bevel() {
    use crate::geom::math::point;

    let segments = polyline(&[point(0.0, 0.0), point(10.0, 0.0), point(0.0, 0.0)]);
    assert!(!segment_has_bevel(Some(&segments[0]), &segments[1]));

    let mut segments = polyline(&[point(0.0, 0.0), point(10.0, 0.0), point(10.0, 10.0)]);
    assert!(segment_has_bevel(Some(&segments[0]), &segments[1]));
    segments[1].continuation_with_predecessor = true;
    assert!(!segment_has_bevel(Some(&segments[0]), &segments[1]));
}

#[test]
fn join_and_cap_sizes_match_packing() {
    use crate::geom::math::point;

    let join = Join::new(point(5.0, 5.0), vector(1.0, 0.0), vector(0.0, 1.0));
    let styles = [
        JoinStyle::Bevel,
        JoinStyle::MiterClip,
        JoinStyle::MiterBevel,
        JoinStyle::Miter,
        JoinStyle::Rounded,
    ];
    for style in &styles {
        let size = join_size(*style, &join, 0.01);
        let mut attributes = alloc::vec![PainterAttribute::default(); size.attributes];
        let mut indices = alloc::vec![0; size.indices];
        pack_join(*style, &join, 0.01, 3, &mut attributes, &mut indices, 0);
        for attribute in &attributes {
            let pt = StrokedPoint::unpack(attribute);
            assert_eq!(pt.depth(), 3);
            assert_ne!(pt.packed_data & StrokedPoint::JOIN_MASK, 0);
            assert_eq!(pt.position, point(5.0, 5.0));
        }
    }
    assert_eq!(join_size(JoinStyle::NoJoins, &join, 0.01), PackingSize::ZERO);

    let cap = Cap::new(point(0.0, 0.0), vector(-1.0, 0.0), true);
    for cap_type in &[CapType::Square, CapType::Rounded, CapType::Adjustable] {
        let size = cap_size(*cap_type, 0.01);
        let mut attributes = alloc::vec![PainterAttribute::default(); size.attributes];
        let mut indices = alloc::vec![0; size.indices];
        pack_cap(*cap_type, &cap, 0.01, 9, &mut attributes, &mut indices, 0);
        assert!(attributes.iter().all(|a| StrokedPoint::unpack(a).depth() == 9));
    }
    assert_eq!(cap_size(CapType::Square, 0.01), PackingSize::new(5, 9));
}

#[test]
fn depth_is_clamped() {
    let bits = StrokedPoint::pack_bits(true, OffsetType::MiterJoin, u32::MAX);
    let pt = StrokedPoint {
        packed_data: bits,
        ..StrokedPoint::default()
    };
    assert_eq!(pt.depth(), StrokedPoint::MAX_DEPTH);
    assert_eq!(pt.offset_type(), Some(OffsetType::MiterJoin));
    assert!(pt.on_boundary());
}
