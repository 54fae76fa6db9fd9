use crate::builder::{ChainRange, SubsetBuilder};
use crate::geom::math::{Vector, Vector3D};
use crate::geom::{
    clip_against_planes, Axis, BoundingBox, Cap, ClipMatrix, Join, Segment, SegmentChain,
    SegmentSplit, TessellatedPath,
};
use crate::selection::{SelectionInflation, SelectionScratch, SubsetSelection};

use alloc::vec::Vec;

/// Parameters of the recursive partitioning.
#[derive(Copy, Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serialization", derive(Serialize, Deserialize))]
#[non_exhaustive]
pub struct PartitionOptions {
    /// A subset with at least this many segments is split.
    ///
    /// Default value: `PartitionOptions::DEFAULT_SPLIT_THRESHOLD`.
    pub split_threshold: usize,

    /// Subsets deeper than this are never split.
    ///
    /// Default value: `PartitionOptions::DEFAULT_MAX_DEPTH`.
    pub max_depth: u32,
}

impl PartitionOptions {
    pub const DEFAULT_SPLIT_THRESHOLD: usize = 50;
    pub const DEFAULT_MAX_DEPTH: u32 = 10;

    pub const DEFAULT: Self = PartitionOptions {
        split_threshold: Self::DEFAULT_SPLIT_THRESHOLD,
        max_depth: Self::DEFAULT_MAX_DEPTH,
    };

    #[inline]
    pub const fn with_split_threshold(mut self, threshold: usize) -> Self {
        self.split_threshold = threshold;
        self
    }

    #[inline]
    pub const fn with_max_depth(mut self, depth: u32) -> Self {
        self.max_depth = depth;
        self
    }
}

impl Default for PartitionOptions {
    fn default() -> Self {
        Self::DEFAULT
    }
}

/// A node of the partition tree.
///
/// Every subset owns a copy of its geometry, including subsets that have
/// children, so that any node of the tree can be drawn on its own.
#[derive(Clone, Debug)]
pub struct Subset {
    id: u32,
    depth: u32,
    children: Option<[u32; 2]>,
    segments: Vec<Segment>,
    chains: Vec<ChainRange>,
    joins: Vec<Join>,
    caps: Vec<Cap>,
    bounding_box: BoundingBox,
    join_bounding_box: BoundingBox,
}

impl Subset {
    fn from_builder(id: u32, depth: u32, builder: SubsetBuilder) -> Self {
        let SubsetBuilder {
            bounding_box,
            join_bounding_box,
            segments,
            mut chains,
            joins,
            caps,
        } = builder;

        chains.retain(|chain| !chain.range.is_empty());

        Subset {
            id,
            depth,
            children: None,
            segments,
            chains,
            joins,
            caps,
            bounding_box,
            join_bounding_box,
        }
    }

    /// The position of this subset in the creation order.
    #[inline]
    pub fn id(&self) -> u32 {
        self.id
    }

    /// Number of splits between the root and this subset.
    #[inline]
    pub fn depth(&self) -> u32 {
        self.depth
    }

    #[inline]
    pub fn has_children(&self) -> bool {
        self.children.is_some()
    }

    /// IDs of the two children, the first one covering the lower side of the
    /// split.
    #[inline]
    pub fn children(&self) -> Option<[u32; 2]> {
        self.children
    }

    pub fn segments(&self) -> &[Segment] {
        &self.segments
    }

    pub fn number_chains(&self) -> usize {
        self.chains.len()
    }

    pub fn chain(&self, index: usize) -> SegmentChain {
        let chain = &self.chains[index];
        SegmentChain {
            segments: &self.segments[chain.range.clone()],
            prev_to_start: chain.prev_to_start.as_ref(),
        }
    }

    pub fn segment_chains(&self) -> impl ExactSizeIterator<Item = SegmentChain> + '_ {
        self.chains.iter().map(move |chain| SegmentChain {
            segments: &self.segments[chain.range.clone()],
            prev_to_start: chain.prev_to_start.as_ref(),
        })
    }

    pub fn joins(&self) -> &[Join] {
        &self.joins
    }

    pub fn caps(&self) -> &[Cap] {
        &self.caps
    }

    /// Bounding box of the segments.
    pub fn bounding_box(&self) -> &BoundingBox {
        &self.bounding_box
    }

    /// Bounding box of the join positions.
    pub fn join_bounding_box(&self) -> &BoundingBox {
        &self.join_bounding_box
    }

    /// Picks the axis and value to split at: the median of the segment end
    /// points along the axis that cuts through the fewest segments.
    ///
    /// Returns `None` if one of the children would not be smaller than this
    /// subset.
    fn choose_splitting_coordinate(&self) -> Option<(Axis, f32)> {
        let last = self.segments.last()?;
        let size = self.segments.len();

        let mut values = [0.0; 2];
        let mut straddles = [0usize; 2];
        let mut child_counts = [[0usize; 2]; 2];

        let mut qs = Vec::with_capacity(size + 3);
        for (c, axis) in Axis::ALL.iter().enumerate() {
            qs.clear();
            qs.push(axis.of(self.bounding_box.min()));
            qs.push(axis.of(self.bounding_box.max()));
            qs.extend(self.segments.iter().map(|s| axis.of(s.start)));
            qs.push(axis.of(last.end));
            qs.sort_unstable_by(f32::total_cmp);
            values[c] = qs[qs.len() / 2];

            for segment in &self.segments {
                let start_before = axis.of(segment.start) < values[c];
                let end_before = axis.of(segment.end) < values[c];
                if start_before != end_before {
                    straddles[c] += 1;
                    child_counts[c][0] += 1;
                    child_counts[c][1] += 1;
                } else {
                    child_counts[c][start_before as usize] += 1;
                }
            }
        }

        let candidate = if straddles[0] < straddles[1] { 0 } else { 1 };
        if child_counts[candidate][0] < size && child_counts[candidate][1] < size {
            Some((Axis::ALL[candidate], values[candidate]))
        } else {
            None
        }
    }

    /// Distributes the content of this subset on both sides of the line
    /// `axis == value`.
    fn split(&self, axis: Axis, value: f32) -> (SubsetBuilder, SubsetBuilder) {
        let mut before = SubsetBuilder::new();
        let mut after = SubsetBuilder::new();

        for chain in self.segment_chains() {
            process_chain(axis, value, chain, &mut before, &mut after);
        }

        for join in &self.joins {
            if axis.of(join.position) > value {
                after.add_join(*join);
            } else {
                before.add_join(*join);
            }
        }

        for cap in &self.caps {
            if axis.of(cap.position) > value {
                after.add_cap(*cap);
            } else {
                before.add_cap(*cap);
            }
        }

        (before, after)
    }
}

#[derive(Copy, Clone, Debug, PartialEq)]
enum Side {
    Before,
    After,
}

/// Splits a chain across the line `axis == value`.
///
/// Each time the chain crosses the line, a new chain is started on the other
/// side with the last segment added so far as its previous segment.
fn process_chain(
    axis: Axis,
    value: f32,
    chain: SegmentChain,
    before_split: &mut SubsetBuilder,
    after_split: &mut SubsetBuilder,
) {
    let mut last_added_to = None;
    let mut prev = chain.prev_to_start.copied();

    for segment in chain.segments {
        match segment.compute_split(axis, value) {
            SegmentSplit::CompletelyBefore => {
                if last_added_to != Some(Side::Before) {
                    before_split.start_chain(prev.as_ref());
                    last_added_to = Some(Side::Before);
                }
                before_split.add_segment(*segment);
                prev = Some(*segment);
            }
            SegmentSplit::CompletelyAfter => {
                if last_added_to != Some(Side::After) {
                    after_split.start_chain(prev.as_ref());
                    last_added_to = Some(Side::After);
                }
                after_split.add_segment(*segment);
                prev = Some(*segment);
            }
            SegmentSplit::StartBefore { before, after } => {
                if last_added_to != Some(Side::Before) {
                    before_split.start_chain(prev.as_ref());
                }
                before_split.add_segment(before);
                after_split.start_chain(Some(&before));
                after_split.add_segment(after);
                prev = Some(after);
                last_added_to = Some(Side::After);
            }
            SegmentSplit::StartAfter { before, after } => {
                if last_added_to != Some(Side::After) {
                    after_split.start_chain(prev.as_ref());
                }
                after_split.add_segment(after);
                before_split.start_chain(Some(&after));
                before_split.add_segment(before);
                prev = Some(before);
                last_added_to = Some(Side::Before);
            }
        }
    }
}

/// A tessellated path recursively partitioned into [`Subset`]s.
///
/// The tree is built once and never modified afterwards, so it can be
/// queried from several threads as long as each query uses its own
/// [`SubsetSelection`].
#[derive(Clone, Debug)]
pub struct PartitionedTessellatedPath {
    subsets: Vec<Subset>,
    has_arcs: bool,
    max_distance: f32,
    options: PartitionOptions,
}

impl PartitionedTessellatedPath {
    /// Partitions a path with the default options.
    pub fn new(path: &TessellatedPath) -> Self {
        Self::with_options(path, &PartitionOptions::DEFAULT)
    }

    pub fn with_options(path: &TessellatedPath, options: &PartitionOptions) -> Self {
        let mut builder = SubsetBuilder::new();
        for chain in path.edge_chains() {
            builder.start_chain(None);
            for segment in chain.segments {
                builder.add_segment(*segment);
            }
        }

        for join in path.joins() {
            let mut join = *join;
            join.source_index = builder.joins.len() as u32;
            builder.add_join(join);
        }

        for cap in path.caps() {
            let mut cap = *cap;
            cap.source_index = builder.caps.len() as u32;
            builder.add_cap(cap);
        }

        let mut partitioned = Self::from_builder(builder, options);
        partitioned.max_distance = path.max_distance();

        partitioned
    }

    /// Partitions the content of a builder.
    ///
    /// The join and cap indices are kept as they are. The segments are
    /// assumed exact: [`max_distance`](Self::max_distance) is zero.
    pub fn from_builder(builder: SubsetBuilder, options: &PartitionOptions) -> Self {
        let has_arcs = builder.segments.iter().any(Segment::is_arc);
        let num_segments = builder.segments.len();

        let mut subsets = Vec::new();
        build_subset(&mut subsets, builder, 0, options);

        log::debug!(
            "partitioned {} segments into {} subsets",
            num_segments,
            subsets.len()
        );

        PartitionedTessellatedPath {
            subsets,
            has_arcs,
            max_distance: 0.0,
            options: *options,
        }
    }

    pub fn options(&self) -> &PartitionOptions {
        &self.options
    }

    pub fn has_arcs(&self) -> bool {
        self.has_arcs
    }

    /// The tessellation error of the source path.
    pub fn max_distance(&self) -> f32 {
        self.max_distance
    }

    pub fn number_subsets(&self) -> usize {
        self.subsets.len()
    }

    /// Returns the subset with a given ID.
    pub fn subset(&self, id: u32) -> &Subset {
        &self.subsets[id as usize]
    }

    /// All subsets, in ID order.
    pub fn subsets(&self) -> &[Subset] {
        &self.subsets
    }

    pub fn root_subset(&self) -> &Subset {
        &self.subsets[0]
    }

    /// All joins of the path.
    pub fn joins(&self) -> &[Join] {
        self.root_subset().joins()
    }

    /// All caps of the path.
    pub fn caps(&self) -> &[Cap] {
        self.root_subset().caps()
    }

    /// Culls the tree against a set of clip planes.
    ///
    /// The clip equations are in clip coordinates and are mapped to local
    /// coordinates with `clip_to_local`. `one_pixel_width` is the size of a
    /// pixel in clip coordinates, used to apply the pixel-space part of the
    /// inflation.
    ///
    /// If `select_miter_joins` is true, a second pass using the join bounding
    /// boxes and the miter inflation values produces the join subset IDs.
    /// Otherwise the join subsets are the edge subsets.
    pub fn select_subsets<'l>(
        &'l self,
        clip_equations: &[Vector3D],
        clip_to_local: &ClipMatrix,
        one_pixel_width: Vector,
        inflation: &SelectionInflation,
        select_miter_joins: bool,
        out: &mut SubsetSelection<'l>,
    ) {
        out.clear(Some(self));

        self.select_into(
            false,
            clip_equations,
            clip_to_local,
            one_pixel_width,
            inflation,
            &mut out.scratch,
            &mut out.subset_ids,
        );

        out.joins_follow_edges = !select_miter_joins;
        if select_miter_joins {
            self.select_into(
                true,
                clip_equations,
                clip_to_local,
                one_pixel_width,
                inflation,
                &mut out.scratch,
                &mut out.join_subset_ids,
            );
        }

        log::trace!(
            "selected subsets {:?}, join subsets {:?}",
            out.subset_ids(),
            out.join_subset_ids()
        );
    }

    #[allow(clippy::too_many_arguments)]
    fn select_into(
        &self,
        miter_hunting: bool,
        clip_equations: &[Vector3D],
        clip_to_local: &ClipMatrix,
        one_pixel_width: Vector,
        inflation: &SelectionInflation,
        scratch: &mut SelectionScratch,
        dst: &mut Vec<u32>,
    ) {
        let (pixels_room, item_room) = if miter_hunting {
            (
                inflation.pixel_space_distance_miter_joins,
                inflation.item_space_distance_miter_joins,
            )
        } else {
            (inflation.pixel_space_distance, inflation.item_space_distance)
        };

        scratch.clip_equations.clear();
        for eq in clip_equations {
            let mut eq = *eq;
            // Push the plane outward by the requested number of pixels.
            let f = eq.x.abs() * one_pixel_width.x + eq.y.abs() * one_pixel_width.y;
            eq.z += pixels_room * f;
            scratch.clip_equations.push(clip_to_local.transform_equation(&eq));
        }

        dst.clear();
        if !self.subsets.is_empty() {
            self.select_recursive(0, miter_hunting, item_room, scratch, dst);
        }
    }

    // Returns true if this subset was added to `dst` (possibly in place of
    // its children).
    fn select_recursive(
        &self,
        id: u32,
        miter_hunting: bool,
        item_room: f32,
        scratch: &mut SelectionScratch,
        dst: &mut Vec<u32>,
    ) -> bool {
        let subset = &self.subsets[id as usize];
        let bbox = if miter_hunting {
            &subset.join_bounding_box
        } else {
            &subset.bounding_box
        };

        if bbox.is_empty() {
            return false;
        }

        let polygon = bbox.inflated_polygon(item_room);
        let unclipped = clip_against_planes(
            &scratch.clip_equations,
            &polygon,
            &mut scratch.clipped,
            &mut scratch.clip,
        );

        if scratch.clipped.is_empty() {
            return false;
        }

        match subset.children {
            Some([child0, child1]) if !unclipped => {
                let r0 = self.select_recursive(child0, miter_hunting, item_room, scratch, dst);
                let r1 = self.select_recursive(child1, miter_hunting, item_room, scratch, dst);
                if r0 && r1 {
                    debug_assert_eq!(dst.last(), Some(&child1));
                    dst.pop();
                    debug_assert_eq!(dst.last(), Some(&child0));
                    dst.pop();
                    dst.push(id);
                    return true;
                }

                false
            }
            _ => {
                dst.push(id);
                true
            }
        }
    }
}

fn build_subset(
    subsets: &mut Vec<Subset>,
    builder: SubsetBuilder,
    depth: u32,
    options: &PartitionOptions,
) -> u32 {
    let id = subsets.len() as u32;
    subsets.push(Subset::from_builder(id, depth, builder));

    let split = {
        let subset = &subsets[id as usize];
        if subset.segments.len() >= options.split_threshold && depth <= options.max_depth {
            let split = subset
                .choose_splitting_coordinate()
                .map(|(axis, value)| (axis, value, subset.split(axis, value)));
            if split.is_none() {
                log::debug!(
                    "subset {} ({} segments) has no useful split",
                    id,
                    subset.segments.len()
                );
            }
            split
        } else {
            None
        }
    };

    if let Some((axis, value, (before, after))) = split {
        log::debug!(
            "splitting subset {} at {:?} = {} ({} | {} segments)",
            id,
            axis,
            value,
            before.number_segments(),
            after.number_segments()
        );

        let child0 = build_subset(subsets, before, depth + 1, options);
        let child1 = build_subset(subsets, after, depth + 1, options);
        subsets[id as usize].children = Some([child0, child1]);
    }

    id
}
