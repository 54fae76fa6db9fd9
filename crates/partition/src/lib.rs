#![deny(bare_trait_objects)]
#![allow(clippy::float_cmp)]
#![no_std]

//! Spatial partitioning of tessellated paths and glyph runs.
//!
//! This crate is reexported in [strata](../strata/index.html).
//!
//! # Overview
//!
//! A [`PartitionedTessellatedPath`] recursively splits the segments, joins
//! and caps of a [`TessellatedPath`](strata_geom::TessellatedPath) into a
//! binary tree of [`Subset`]s. Each subset owns its geometry and two bounding
//! boxes: one for the edges and one for the joins. At draw time the tree is
//! culled against a set of clip planes with
//! [`select_subsets`](PartitionedTessellatedPath::select_subsets), producing a
//! [`SubsetSelection`] that the stroking code consumes.
//!
//! ```
//! use strata_geom::TessellatedPath;
//! use strata_geom::math::{point, vector, vector3};
//! use strata_geom::ClipMatrix;
//! use strata_partition::{PartitionedTessellatedPath, SelectionInflation, SubsetSelection};
//!
//! let mut builder = TessellatedPath::builder();
//! builder.begin(point(0.0, 0.0));
//! builder.line_to(point(100.0, 0.0));
//! builder.line_to(point(100.0, 100.0));
//! builder.end(true);
//! let path = PartitionedTessellatedPath::new(&builder.build());
//!
//! let mut selection = SubsetSelection::new();
//! path.select_subsets(
//!     &[vector3(1.0, 0.0, 0.0)],
//!     &ClipMatrix::IDENTITY,
//!     vector(1.0, 1.0),
//!     &SelectionInflation::DEFAULT,
//!     false,
//!     &mut selection,
//! );
//!
//! assert_eq!(selection.subset_ids(), &[0]);
//! ```
//!
//! [`GlyphSequence`] applies the same idea to runs of glyphs, with subsets
//! built lazily and glyphs that straddle a split kept in the parent.

extern crate alloc;

#[cfg(any(test, feature = "std"))]
extern crate std;

#[cfg(feature = "serialization")]
#[macro_use]
pub extern crate serde;

pub extern crate strata_geom as geom;

mod builder;
pub mod glyph_sequence;
mod partition;
mod selection;

#[cfg(test)]
mod tests;

pub use crate::geom::math;

#[doc(inline)]
pub use crate::builder::{SegmentHandle, SubsetBuilder};
#[doc(inline)]
pub use crate::glyph_sequence::{
    GlyphLayout, GlyphMetrics, GlyphScratch, GlyphSequence, GlyphSequenceOptions, GlyphSource,
    GlyphSubset, ScreenOrientation,
};
#[doc(inline)]
pub use crate::partition::{PartitionOptions, PartitionedTessellatedPath, Subset};
#[doc(inline)]
pub use crate::selection::{SelectionInflation, SubsetSelection};
