use crate::geom::math::{Point, Vector3D};
use crate::geom::ClipScratch;
use crate::partition::{PartitionedTessellatedPath, Subset};

use alloc::vec::Vec;

/// How much the subsets' bounding boxes are grown before being tested against
/// the clip planes.
///
/// Pixel-space distances push the clip planes outward; item-space distances
/// inflate the bounding boxes. The miter values are used when selecting the
/// subsets whose joins are drawn as miters, since miter tips can extend far
/// from the join position.
#[derive(Copy, Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serialization", derive(Serialize, Deserialize))]
#[non_exhaustive]
pub struct SelectionInflation {
    pub pixel_space_distance: f32,
    pub item_space_distance: f32,
    pub pixel_space_distance_miter_joins: f32,
    pub item_space_distance_miter_joins: f32,
}

impl SelectionInflation {
    pub const DEFAULT: Self = SelectionInflation {
        pixel_space_distance: 0.0,
        item_space_distance: 0.0,
        pixel_space_distance_miter_joins: 0.0,
        item_space_distance_miter_joins: 0.0,
    };

    #[inline]
    pub const fn with_pixel_space_distance(mut self, distance: f32) -> Self {
        self.pixel_space_distance = distance;
        self
    }

    #[inline]
    pub const fn with_item_space_distance(mut self, distance: f32) -> Self {
        self.item_space_distance = distance;
        self
    }

    #[inline]
    pub const fn with_pixel_space_distance_miter_joins(mut self, distance: f32) -> Self {
        self.pixel_space_distance_miter_joins = distance;
        self
    }

    #[inline]
    pub const fn with_item_space_distance_miter_joins(mut self, distance: f32) -> Self {
        self.item_space_distance_miter_joins = distance;
        self
    }
}

impl Default for SelectionInflation {
    fn default() -> Self {
        Self::DEFAULT
    }
}

#[derive(Clone, Debug, Default)]
pub(crate) struct SelectionScratch {
    pub clip_equations: Vec<Vector3D>,
    pub clipped: Vec<Point>,
    pub clip: ClipScratch,
}

/// The result of [`PartitionedTessellatedPath::select_subsets`].
///
/// A selection can be reused across queries to avoid reallocating its
/// buffers.
#[derive(Clone, Debug, Default)]
pub struct SubsetSelection<'l> {
    source: Option<&'l PartitionedTessellatedPath>,
    pub(crate) subset_ids: Vec<u32>,
    pub(crate) join_subset_ids: Vec<u32>,
    pub(crate) joins_follow_edges: bool,
    pub(crate) scratch: SelectionScratch,
}

impl<'l> SubsetSelection<'l> {
    pub fn new() -> Self {
        SubsetSelection {
            joins_follow_edges: true,
            ..SubsetSelection::default()
        }
    }

    /// Empties the selection and sets the path it refers to.
    pub fn clear(&mut self, source: Option<&'l PartitionedTessellatedPath>) {
        self.source = source;
        self.subset_ids.clear();
        self.join_subset_ids.clear();
        self.joins_follow_edges = true;
    }

    /// The path the subsets were selected from.
    pub fn source(&self) -> Option<&'l PartitionedTessellatedPath> {
        self.source
    }

    /// IDs of the subsets whose edges and caps should be drawn.
    pub fn subset_ids(&self) -> &[u32] {
        &self.subset_ids
    }

    /// IDs of the subsets whose joins should be drawn.
    pub fn join_subset_ids(&self) -> &[u32] {
        if self.joins_follow_edges {
            &self.subset_ids
        } else {
            &self.join_subset_ids
        }
    }

    /// Returns true if the join subsets were selected separately.
    pub fn has_separate_join_subsets(&self) -> bool {
        !self.joins_follow_edges
    }

    pub fn is_empty(&self) -> bool {
        self.subset_ids.is_empty() && self.join_subset_ids().is_empty()
    }

    /// Iterates over the selected edge subsets.
    pub fn subsets(&self) -> impl Iterator<Item = &'l Subset> + '_ {
        let source = self.source;
        self.subset_ids
            .iter()
            .filter_map(move |id| source.map(|path| path.subset(*id)))
    }

    /// Iterates over the selected join subsets.
    pub fn join_subsets(&self) -> impl Iterator<Item = &'l Subset> + '_ {
        let source = self.source;
        self.join_subset_ids()
            .iter()
            .filter_map(move |id| source.map(|path| path.subset(*id)))
    }
}
