use crate::geom::{BoundingBox, Cap, Join, Segment};

use alloc::vec::Vec;
use core::ops::Range;

/// Refers to a segment added to a [`SubsetBuilder`].
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub struct SegmentHandle(usize);

impl SegmentHandle {
    #[inline]
    pub fn index(self) -> usize {
        self.0
    }
}

/// A chain as stored by builders and subsets: a range into the segment
/// storage plus a copy of the segment preceding the chain, if any.
#[derive(Clone, Debug, PartialEq)]
pub(crate) struct ChainRange {
    pub range: Range<usize>,
    pub prev_to_start: Option<Segment>,
}

/// Stages the content of a subset before it is frozen.
///
/// Segments are added to chains: call [`start_chain`](Self::start_chain)
/// before the first segment of every chain.
#[derive(Clone, Debug, Default)]
pub struct SubsetBuilder {
    pub(crate) bounding_box: BoundingBox,
    pub(crate) join_bounding_box: BoundingBox,
    pub(crate) segments: Vec<Segment>,
    pub(crate) chains: Vec<ChainRange>,
    pub(crate) joins: Vec<Join>,
    pub(crate) caps: Vec<Cap>,
}

impl SubsetBuilder {
    pub fn new() -> Self {
        SubsetBuilder::default()
    }

    /// Begins a new chain. The segment preceding the chain, if any, is copied
    /// into the chain.
    pub fn start_chain(&mut self, prev: Option<&Segment>) {
        let start = self.segments.len();
        self.chains.push(ChainRange {
            range: start..start,
            prev_to_start: prev.copied(),
        });
    }

    /// Appends a segment to the current chain.
    ///
    /// The returned handle stays valid for the lifetime of the builder.
    pub fn add_segment(&mut self, segment: Segment) -> SegmentHandle {
        debug_assert!(!self.chains.is_empty(), "add_segment called before start_chain");
        if self.chains.is_empty() {
            self.start_chain(None);
        }

        self.bounding_box.union_box(&segment.bounding_box());
        self.segments.push(segment);
        if let Some(chain) = self.chains.last_mut() {
            chain.range.end += 1;
        }

        SegmentHandle(self.segments.len() - 1)
    }

    pub fn add_join(&mut self, join: Join) {
        self.join_bounding_box.union_point(join.position);
        self.joins.push(join);
    }

    pub fn add_cap(&mut self, cap: Cap) {
        self.caps.push(cap);
    }

    pub fn segment(&self, handle: SegmentHandle) -> &Segment {
        &self.segments[handle.0]
    }

    pub fn number_segments(&self) -> usize {
        self.segments.len()
    }

    pub fn number_chains(&self) -> usize {
        self.chains.len()
    }

    pub fn bounding_box(&self) -> &BoundingBox {
        &self.bounding_box
    }

    pub fn join_bounding_box(&self) -> &BoundingBox {
        &self.join_bounding_box
    }

    pub fn is_empty(&self) -> bool {
        self.segments.is_empty() && self.joins.is_empty() && self.caps.is_empty()
    }
}

#[test]
fn chains_and_handles() {
    use crate::geom::math::point;

    let mut builder = SubsetBuilder::new();
    assert!(builder.is_empty());

    builder.start_chain(None);
    let a = builder.add_segment(Segment::line(point(0.0, 0.0), point(1.0, 0.0)));
    let b = builder.add_segment(Segment::line(point(1.0, 0.0), point(1.0, 2.0)));
    let prev = *builder.segment(b);
    builder.start_chain(Some(&prev));
    builder.add_segment(Segment::line(point(1.0, 2.0), point(3.0, 2.0)));

    assert_eq!(a.index(), 0);
    assert_eq!(b.index(), 1);
    assert_eq!(builder.number_chains(), 2);
    assert_eq!(builder.chains[0].range, 0..2);
    assert_eq!(builder.chains[1].range, 2..3);
    assert_eq!(builder.chains[1].prev_to_start.map(|s| s.end), Some(point(1.0, 2.0)));
    assert_eq!(builder.bounding_box().max(), point(3.0, 2.0));
    assert!(builder.join_bounding_box().is_empty());
}
