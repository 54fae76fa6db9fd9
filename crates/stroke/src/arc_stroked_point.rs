//! Arc packing: stroking geometry made of arc primitives.
//!
//! Arc segments are drawn as a band of quads around the arc which the
//! fragment shader trims to the stroke. Rounded joins and caps become a
//! handful of such arcs instead of a finely tessellated fan, and the segments
//! at the ends of an edge carry dashed cappers.

use crate::attribute::{pack_vec4, unpack_vec4, AttributeSink, PackingSize, PainterAttribute};
use crate::geom::math::{vector, Point, Vector};
use crate::geom::{Cap, Join, Segment, SegmentChain};
use crate::stroked_point::{compute_bevel_lambda, segment_has_bevel};
use crate::Index;

use core::f32::consts::{FRAC_PI_4, PI};

#[cfg(not(feature = "std"))]
use num_traits::Float;

/// How the vertex shader computes the offset of an [`ArcStrokedPoint`].
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serialization", derive(Serialize, Deserialize))]
#[repr(u32)]
pub enum ArcOffsetType {
    ArcPoint = 0,
    LineSegment,
    DashedCapper,
}

/// Number of arcs a rounded cap is made of.
pub const ARCS_PER_CAP: u32 = 4;

/// A vertex of the arc packing.
#[derive(Copy, Clone, Debug, Default, PartialEq)]
pub struct ArcStrokedPoint {
    pub position: Point,
    pub offset_direction: Vector,
    /// Radius and arc angle for arc points, the segment delta for line
    /// segments, the direction of extension for dashed cappers.
    pub data: Vector,
    pub distance_from_edge_start: f32,
    pub distance_from_contour_start: f32,
    pub edge_length: f32,
    pub contour_length: f32,
    pub packed_data: u32,
}

impl ArcStrokedPoint {
    pub const OFFSET_TYPE_BIT0: u32 = 0;
    pub const OFFSET_TYPE_NUM_BITS: u32 = 2;
    pub const BOUNDARY_BIT: u32 = 2;
    pub const END_SEGMENT_BIT: u32 = 3;
    pub const DISTANCE_CONSTANT_ON_PRIMITIVE_BIT: u32 = 4;
    pub const JOIN_BIT: u32 = 5;
    pub const DEPTH_BIT0: u32 = 6;
    pub const DEPTH_NUM_BITS: u32 = 20;
    pub const NUMBER_COMMON_BITS: u32 = 26;

    // Arc points.
    pub const BEYOND_BOUNDARY_BIT: u32 = 26;
    pub const INNER_STROKING_BIT: u32 = 27;
    pub const MOVE_TO_ARC_CENTER_BIT: u32 = 28;

    // Dashed capper points.
    pub const EXTEND_BIT: u32 = 26;

    pub const MAX_DEPTH: u32 = (1 << Self::DEPTH_NUM_BITS) - 1;

    pub const BOUNDARY_MASK: u32 = 1 << Self::BOUNDARY_BIT;
    pub const END_SEGMENT_MASK: u32 = 1 << Self::END_SEGMENT_BIT;
    pub const DISTANCE_CONSTANT_ON_PRIMITIVE_MASK: u32 =
        1 << Self::DISTANCE_CONSTANT_ON_PRIMITIVE_BIT;
    pub const JOIN_MASK: u32 = 1 << Self::JOIN_BIT;
    pub const BEYOND_BOUNDARY_MASK: u32 = 1 << Self::BEYOND_BOUNDARY_BIT;
    pub const INNER_STROKING_MASK: u32 = 1 << Self::INNER_STROKING_BIT;
    pub const MOVE_TO_ARC_CENTER_MASK: u32 = 1 << Self::MOVE_TO_ARC_CENTER_BIT;
    pub const EXTEND_MASK: u32 = 1 << Self::EXTEND_BIT;

    /// Packs the common bits. Depth values past [`Self::MAX_DEPTH`] are
    /// clamped.
    pub fn pack_bits(on_boundary: bool, offset_type: ArcOffsetType, depth: u32) -> u32 {
        let depth = depth.min(Self::MAX_DEPTH);
        ((offset_type as u32) << Self::OFFSET_TYPE_BIT0)
            | ((on_boundary as u32) << Self::BOUNDARY_BIT)
            | (depth << Self::DEPTH_BIT0)
    }

    pub fn offset_type(&self) -> Option<ArcOffsetType> {
        match (self.packed_data >> Self::OFFSET_TYPE_BIT0) & ((1 << Self::OFFSET_TYPE_NUM_BITS) - 1) {
            0 => Some(ArcOffsetType::ArcPoint),
            1 => Some(ArcOffsetType::LineSegment),
            2 => Some(ArcOffsetType::DashedCapper),
            _ => None,
        }
    }

    pub fn depth(&self) -> u32 {
        (self.packed_data >> Self::DEPTH_BIT0) & Self::MAX_DEPTH
    }

    #[inline]
    pub fn radius(&self) -> f32 {
        self.data.x
    }

    #[inline]
    pub fn arc_angle(&self) -> f32 {
        self.data.y
    }

    pub fn pack(&self) -> PainterAttribute {
        PainterAttribute {
            attrib0: pack_vec4(
                self.position.x,
                self.position.y,
                self.offset_direction.x,
                self.offset_direction.y,
            ),
            attrib1: pack_vec4(
                self.distance_from_edge_start,
                self.distance_from_contour_start,
                self.data.x,
                self.data.y,
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
        ArcStrokedPoint {
            position: Point::new(a0[0], a0[1]),
            offset_direction: vector(a0[2], a0[3]),
            distance_from_edge_start: a1[0],
            distance_from_contour_start: a1[1],
            data: vector(a1[2], a1[3]),
            packed_data: attribute.attrib2[0],
            edge_length: f32::from_bits(attribute.attrib2[1]),
            contour_length: f32::from_bits(attribute.attrib2[2]),
        }
    }

    fn at_join(join: &Join) -> Self {
        ArcStrokedPoint {
            position: join.position,
            distance_from_edge_start: join.distance_from_previous_join,
            edge_length: join.distance_from_previous_join,
            contour_length: join.contour_length,
            distance_from_contour_start: join.distance_from_contour_start,
            ..ArcStrokedPoint::default()
        }
    }

    fn at_cap(cap: &Cap) -> Self {
        ArcStrokedPoint {
            position: cap.position,
            distance_from_edge_start: cap.distance_from_edge_start,
            edge_length: cap.edge_length,
            contour_length: cap.contour_length,
            distance_from_contour_start: cap.distance_from_contour_start,
            ..ArcStrokedPoint::default()
        }
    }

    fn at_segment_start(segment: &Segment) -> Self {
        ArcStrokedPoint {
            position: segment.start,
            distance_from_edge_start: segment.distance_from_edge_start,
            distance_from_contour_start: segment.distance_from_contour_start,
            edge_length: segment.edge_length,
            contour_length: segment.contour_length,
            ..ArcStrokedPoint::default()
        }
    }

    fn at_segment_end(segment: &Segment) -> Self {
        ArcStrokedPoint {
            position: segment.end,
            distance_from_edge_start: segment.distance_from_edge_start + segment.length,
            distance_from_contour_start: segment.distance_from_contour_start + segment.length,
            edge_length: segment.edge_length,
            contour_length: segment.contour_length,
            ..ArcStrokedPoint::default()
        }
    }

    fn with(mut self, offset_direction: Vector, packed_data: u32) -> Self {
        self.offset_direction = offset_direction;
        self.packed_data = packed_data;
        self
    }
}

fn use_arc_bevel(prev: &Segment, segment: &Segment) -> bool {
    prev.is_arc() || segment.is_arc()
}

fn has_start_dashed_capper(segment: &Segment) -> bool {
    segment.first_segment_of_edge && segment.contour_length > 0.0
}

fn has_end_dashed_capper(segment: &Segment) -> bool {
    segment.last_segment_of_edge && segment.contour_length > 0.0
}

/// Number of arcs needed for a join: one per started quarter of pi.
fn join_arc_count(join: &Join) -> u32 {
    1 + (join.join_angle.abs() / FRAC_PI_4) as u32
}

/// Emits `count` arcs sweeping from `n_start` to `n_end` around `pt`.
///
/// Uses `3 * count + 2` attributes and `9 * count` indices.
fn pack_arc_join(
    pt: ArcStrokedPoint,
    count: u32,
    n_start: Vector,
    delta_angle: f32,
    n_end: Vector,
    depth: u32,
    is_join: bool,
    sink: &mut AttributeSink,
) {
    let per_element = delta_angle / count as f32;
    let (sin, cos) = per_element.sin_cos();
    let join_mask = if is_join { ArcStrokedPoint::JOIN_MASK } else { 0 };
    let arc_value = join_mask
        | ArcStrokedPoint::DISTANCE_CONSTANT_ON_PRIMITIVE_MASK
        | ArcStrokedPoint::pack_bits(true, ArcOffsetType::ArcPoint, depth);
    let beyond_arc_value = arc_value | ArcStrokedPoint::BEYOND_BOUNDARY_MASK;

    let mut pt = pt;
    pt.data = vector(0.0, per_element);

    let center = sink.vertex();
    sink.push_vertex(
        pt.with(
            vector(0.0, 0.0),
            join_mask
                | ArcStrokedPoint::DISTANCE_CONSTANT_ON_PRIMITIVE_MASK
                | ArcStrokedPoint::pack_bits(false, ArcOffsetType::ArcPoint, depth),
        )
        .pack(),
    );

    let mut theta = n_start;
    for i in 0..=count {
        let n = if i == 0 {
            n_start
        } else if i == count {
            n_end
        } else {
            theta
        };

        if i != 0 {
            sink.push_vertex(pt.with(n, beyond_arc_value | ArcStrokedPoint::END_SEGMENT_MASK).pack());
        }

        let start = sink.vertex();
        sink.push_vertex(pt.with(n, arc_value).pack());

        if i != count {
            sink.push_vertex(pt.with(n, beyond_arc_value).pack());

            let next = sink.vertex();
            sink.push_triangle(center, start, next + 1);
            sink.push_triangle(start, start + 1, next);
            sink.push_triangle(start, next, next + 1);
        }

        // Rotate by per_element, as complex numbers.
        theta = vector(
            theta.x * cos - theta.y * sin,
            theta.x * sin + theta.y * cos,
        );
    }
}

/// Same as [`pack_arc_join`], computing the sweep from the two normals.
fn pack_arc_join_between(
    pt: ArcStrokedPoint,
    count: u32,
    n0: Vector,
    n1: Vector,
    depth: u32,
    is_join: bool,
    sink: &mut AttributeSink,
) {
    // n1 * conj(n0) as complex numbers.
    let re = n1.x * n0.x + n1.y * n0.y;
    let im = n1.y * n0.x - n1.x * n0.y;
    pack_arc_join(pt, count, n0, im.atan2(re), n1, depth, is_join, sink);
}

fn pack_bevel(
    is_inner_bevel: bool,
    prev: &Segment,
    segment: &Segment,
    depth: u32,
    sink: &mut AttributeSink,
) {
    let (lambda, start_bevel, end_bevel) = compute_bevel_lambda(is_inner_bevel, prev, segment);
    let pt = ArcStrokedPoint::at_segment_start(segment);

    if use_arc_bevel(prev, segment) {
        pack_arc_join_between(
            pt,
            1,
            start_bevel * lambda,
            end_bevel * lambda,
            depth,
            false,
            sink,
        );
        return;
    }

    let first = sink.vertex();
    sink.push_triangle(first, first + 1, first + 2);

    let bits = |on_boundary| {
        ArcStrokedPoint::DISTANCE_CONSTANT_ON_PRIMITIVE_MASK
            | ArcStrokedPoint::pack_bits(on_boundary, ArcOffsetType::LineSegment, depth)
    };
    sink.push_vertex(pt.with(vector(0.0, 0.0), bits(false)).pack());
    sink.push_vertex(pt.with(start_bevel * lambda, bits(true)).pack());
    sink.push_vertex(pt.with(end_bevel * lambda, bits(true)).pack());
}

const DASHED_CAPPER_TRIANGLES: [Index; 12] = [0, 3, 4, 0, 4, 1, 1, 4, 5, 1, 5, 2];

fn pack_dashed_capper(at_start: bool, segment: &Segment, depth: u32, sink: &mut AttributeSink) {
    let first = sink.vertex();
    for i in DASHED_CAPPER_TRIANGLES.iter() {
        sink.push_index(first + i);
    }

    let mut packed = ArcStrokedPoint::pack_bits(true, ArcOffsetType::DashedCapper, depth);
    let mut packed_mid = ArcStrokedPoint::pack_bits(false, ArcOffsetType::DashedCapper, depth);
    let (mut pt, normal) = if at_start {
        let mut pt = ArcStrokedPoint::at_segment_start(segment);
        pt.data = -segment.enter_unit_vector;
        (pt, segment.enter_normal())
    } else {
        let mut pt = ArcStrokedPoint::at_segment_end(segment);
        pt.data = segment.leaving_unit_vector;
        packed |= ArcStrokedPoint::END_SEGMENT_MASK;
        packed_mid |= ArcStrokedPoint::END_SEGMENT_MASK;
        (pt, segment.leaving_normal())
    };

    let zero = vector(0.0, 0.0);
    let extend_mask = ArcStrokedPoint::EXTEND_MASK;
    for &(extend, offset, bits) in &[
        (0, normal, packed),
        (0, zero, packed_mid),
        (0, -normal, packed),
        (extend_mask, normal, packed),
        (extend_mask, zero, packed_mid),
        (extend_mask, -normal, packed),
    ] {
        pt = pt.with(offset, bits | extend);
        sink.push_vertex(pt.pack());
    }
}

const LINE_SEGMENT_TRIANGLES: [Index; 12] = [0, 2, 5, 0, 5, 3, 2, 1, 4, 2, 4, 5];

fn pack_line_segment(segment: &Segment, depth: u32, sink: &mut AttributeSink) {
    let first = sink.vertex();
    for i in LINE_SEGMENT_TRIANGLES.iter() {
        sink.push_index(first + i);
    }

    const BOUNDARY: [bool; 3] = [true, true, false];
    const NORMAL_SIGN: [f32; 3] = [1.0, -1.0, 0.0];
    let delta = segment.end - segment.start;

    let mut start = ArcStrokedPoint::at_segment_start(segment);
    start.data = delta;
    for k in 0..3 {
        let bits = ArcStrokedPoint::pack_bits(BOUNDARY[k], ArcOffsetType::LineSegment, depth);
        sink.push_vertex(start.with(segment.enter_normal() * NORMAL_SIGN[k], bits).pack());
    }

    let mut end = ArcStrokedPoint::at_segment_end(segment);
    end.data = -delta;
    for k in 0..3 {
        let bits = ArcStrokedPoint::END_SEGMENT_MASK
            | ArcStrokedPoint::pack_bits(BOUNDARY[k], ArcOffsetType::LineSegment, depth);
        sink.push_vertex(end.with(segment.leaving_normal() * NORMAL_SIGN[k], bits).pack());
    }
}

// Points, begin and end of the segment each time:
//   0, 1: inner stroking boundary
//   2, 3: on the arc
//   4, 5: outer stroking boundary
//   6, 7: beyond the outer boundary
//   8, 9: collapse to the center when the stroke is wider than the radius
//   10, 11: beyond the inner boundary
const ARC_SEGMENT_TRIANGLES: [Index; 24] = [
    4, 6, 7, 4, 7, 5, 2, 4, 5, 2, 5, 3, 8, 0, 1, 9, 2, 3, 0, 1, 10, 1, 10, 11,
];

fn pack_arc_segment(segment: &Segment, depth: u32, sink: &mut AttributeSink) {
    let first = sink.vertex();
    for i in ARC_SEGMENT_TRIANGLES.iter() {
        sink.push_index(first + i);
    }

    let data = vector(segment.radius, segment.end_angle - segment.start_angle);
    let mut begin = ArcStrokedPoint::at_segment_start(segment);
    begin.data = data;
    let mut end = ArcStrokedPoint::at_segment_end(segment);
    end.data = data;

    let (s, c) = segment.start_angle.sin_cos();
    let begin_radial = vector(c, s);
    let (s, c) = segment.end_angle.sin_cos();
    let end_radial = vector(c, s);

    let arc = |on_boundary| ArcStrokedPoint::pack_bits(on_boundary, ArcOffsetType::ArcPoint, depth);
    let end_mask = ArcStrokedPoint::END_SEGMENT_MASK;
    let pairs = [
        (ArcStrokedPoint::INNER_STROKING_MASK | arc(true), None),
        (arc(false), None),
        (arc(true), None),
        (ArcStrokedPoint::BEYOND_BOUNDARY_MASK | arc(true), None),
        (
            ArcStrokedPoint::MOVE_TO_ARC_CENTER_MASK | arc(false),
            Some(
                ArcStrokedPoint::MOVE_TO_ARC_CENTER_MASK
                    | ArcStrokedPoint::INNER_STROKING_MASK
                    | arc(true),
            ),
        ),
        (
            ArcStrokedPoint::BEYOND_BOUNDARY_MASK
                | ArcStrokedPoint::INNER_STROKING_MASK
                | arc(true),
            None,
        ),
    ];

    for &(begin_bits, end_bits) in &pairs {
        sink.push_vertex(begin.with(begin_radial, begin_bits).pack());
        let end_bits = end_bits.unwrap_or(begin_bits) | end_mask;
        sink.push_vertex(end.with(end_radial, end_bits).pack());
    }
}

/// Size of a chain packed with arcs.
pub fn chain_size(chain: &SegmentChain) -> PackingSize {
    let mut size = PackingSize::ZERO;
    let mut prev = chain.prev_to_start;
    for segment in chain.segments {
        if let Some(p) = prev.filter(|p| segment_has_bevel(Some(*p), segment)) {
            size += if use_arc_bevel(p, segment) {
                PackingSize::new(10, 18)
            } else {
                PackingSize::new(6, 6)
            };
        }
        if has_start_dashed_capper(segment) {
            size += PackingSize::new(6, 12);
        }
        if has_end_dashed_capper(segment) {
            size += PackingSize::new(6, 12);
        }
        size += if segment.is_arc() {
            PackingSize::new(12, 24)
        } else {
            PackingSize::new(6, 12)
        };
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
        let bevel = prev.filter(|p| segment_has_bevel(Some(*p), segment));

        if let Some(p) = bevel {
            pack_bevel(false, p, segment, depth, &mut sink);
        }
        if has_start_dashed_capper(segment) {
            pack_dashed_capper(true, segment, depth, &mut sink);
        }
        if segment.is_arc() {
            pack_arc_segment(segment, depth, &mut sink);
        } else {
            pack_line_segment(segment, depth, &mut sink);
        }
        if let Some(p) = bevel {
            pack_bevel(true, p, segment, depth, &mut sink);
        }
        if has_end_dashed_capper(segment) {
            pack_dashed_capper(false, segment, depth, &mut sink);
        }

        prev = Some(segment);
    }

    debug_assert_eq!(sink.written(), chain_size(chain));
    sink.reverse_indices_from(0);
}

/// Size of a rounded join packed with arcs.
pub fn join_size(join: &Join) -> PackingSize {
    let count = join_arc_count(join) as usize;
    PackingSize::new(3 * count + 2, 9 * count)
}

/// Packs a rounded join.
pub fn pack_join(
    join: &Join,
    depth: u32,
    attributes: &mut [PainterAttribute],
    indices: &mut [Index],
    index_adjust: Index,
) {
    let mut sink = AttributeSink::new(attributes, indices, index_adjust);
    pack_arc_join(
        ArcStrokedPoint::at_join(join),
        join_arc_count(join),
        join.enter_normal() * join.lambda,
        join.join_angle,
        join.leaving_normal() * join.lambda,
        depth,
        true,
        &mut sink,
    );
    debug_assert_eq!(sink.written(), join_size(join));
}

/// Size of a rounded cap packed with arcs.
pub fn cap_size() -> PackingSize {
    PackingSize::new(3 * ARCS_PER_CAP as usize + 2, 9 * ARCS_PER_CAP as usize)
}

/// Packs a rounded cap as a half circle of [`ARCS_PER_CAP`] arcs.
pub fn pack_cap(
    cap: &Cap,
    depth: u32,
    attributes: &mut [PainterAttribute],
    indices: &mut [Index],
    index_adjust: Index,
) {
    let mut sink = AttributeSink::new(attributes, indices, index_adjust);
    let v = cap.unit_vector;
    let n = vector(v.y, -v.x);
    pack_arc_join(
        ArcStrokedPoint::at_cap(cap),
        ARCS_PER_CAP,
        n,
        PI,
        -n,
        depth,
        true,
        &mut sink,
    );
    debug_assert_eq!(sink.written(), cap_size());
}

#[test]
fn arc_join_counts() {
    use crate::geom::math::point;

    // About 0.65 pi: three arcs.
    let sharp = Join::new(point(0.0, 0.0), vector(1.0, 0.0), vector(-0.5, 1.0).normalize());
    assert_eq!(join_size(&sharp), PackingSize::new(11, 27));

    let shallow = Join::new(point(0.0, 0.0), vector(1.0, 0.0), vector(1.0, 0.1).normalize());
    assert_eq!(join_size(&shallow), PackingSize::new(5, 9));

    assert_eq!(cap_size(), PackingSize::new(14, 36));
}

#[test]
fn arc_join_indices_stay_in_range() {
    use crate::geom::math::point;

    let join = Join::new(point(3.0, 4.0), vector(1.0, 0.0), vector(-1.0, 0.01).normalize());
    let size = join_size(&join);
    let mut attributes = alloc::vec![PainterAttribute::default(); size.attributes];
    let mut indices = alloc::vec![0; size.indices];
    pack_join(&join, 12, &mut attributes, &mut indices, 40);

    assert!(indices.iter().all(|i| *i >= 40 && *i < 40 + size.attributes as u32));
    for attribute in &attributes {
        let pt = ArcStrokedPoint::unpack(attribute);
        assert_eq!(pt.depth(), 12);
        assert_eq!(pt.offset_type(), Some(ArcOffsetType::ArcPoint));
        assert_ne!(pt.packed_data & ArcStrokedPoint::JOIN_MASK, 0);
    }

    // The first and last arc points follow the join normals.
    let first = ArcStrokedPoint::unpack(&attributes[1]);
    assert_eq!(first.offset_direction, join.enter_normal() * join.lambda);
    let last = ArcStrokedPoint::unpack(&attributes[size.attributes - 1]);
    assert_eq!(last.offset_direction, join.leaving_normal() * join.lambda);
}

#[test]
fn chain_with_arcs_and_cappers() {
    use crate::geom::math::point;
    use core::f32::consts::FRAC_PI_2;

    let mut line = Segment::line(point(0.0, 0.0), point(10.0, 0.0));
    line.first_segment_of_edge = true;
    line.contour_length = 10.0 + 5.0 * FRAC_PI_2;
    let mut arc = Segment::arc(point(10.0, 5.0), 5.0, -FRAC_PI_2..0.0);
    arc.last_segment_of_edge = true;
    arc.contour_length = line.contour_length;
    arc.distance_from_edge_start = 10.0;

    let segments = [line, arc];
    let chain = SegmentChain {
        segments: &segments,
        prev_to_start: None,
    };

    // Start capper, line, arc bevel pair, arc, end capper.
    let size = chain_size(&chain);
    assert_eq!(size, PackingSize::new(6 + 6 + 10 + 12 + 6, 12 + 12 + 18 + 24 + 12));

    let mut attributes = alloc::vec![PainterAttribute::default(); size.attributes];
    let mut indices = alloc::vec![0; size.indices];
    pack_chain(&chain, 2, &mut attributes, &mut indices, 0);

    let capper = ArcStrokedPoint::unpack(&attributes[0]);
    assert_eq!(capper.offset_type(), Some(ArcOffsetType::DashedCapper));
    assert_eq!(capper.data, vector(-1.0, -0.0));

    let last = ArcStrokedPoint::unpack(&attributes[size.attributes - 1]);
    assert_eq!(last.offset_type(), Some(ArcOffsetType::DashedCapper));
    assert_ne!(last.packed_data & ArcStrokedPoint::EXTEND_MASK, 0);
    assert!(attributes.iter().all(|a| ArcStrokedPoint::unpack(a).depth() == 2));
}
