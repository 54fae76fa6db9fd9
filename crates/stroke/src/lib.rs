#![deny(bare_trait_objects)]
#![deny(unconditional_recursion)]
#![allow(clippy::float_cmp)]
#![allow(clippy::too_many_arguments)]
#![no_std]

//! Stroking attribute generation.
//!
//! This crate is reexported in [strata](../strata/index.html).
//!
//! # Overview
//!
//! The [`StrokingAttributeWriter`] turns a
//! [`SubsetSelection`](strata_partition::SubsetSelection) into vertex and
//! index data for a stroking shader. Items are emitted in three phases: the
//! segment chains of the edges, then the joins, then the caps. Every item
//! receives a depth value and depth values strictly decrease over a whole
//! draw, so that a stroke never paints over itself.
//!
//! The output buffers are provided by the caller and never resized. A draw
//! that does not fit is resumed with a [`WriteState`] which the caller keeps
//! between calls:
//!
//! ```
//! use strata_geom::{ClipMatrix, TessellatedPath};
//! use strata_geom::math::{point, vector};
//! use strata_partition::{PartitionedTessellatedPath, SelectionInflation, SubsetSelection};
//! use strata_stroke::*;
//!
//! let mut builder = TessellatedPath::builder();
//! builder.begin(point(0.0, 0.0));
//! builder.line_to(point(50.0, 0.0));
//! builder.line_to(point(50.0, 50.0));
//! builder.end(false);
//! let path = PartitionedTessellatedPath::new(&builder.build());
//!
//! let mut selection = SubsetSelection::new();
//! path.select_subsets(&[], &ClipMatrix::IDENTITY, vector(1.0, 1.0), &SelectionInflation::DEFAULT, false, &mut selection);
//!
//! let shaders = StrokeShaderSet::new()
//!     .with_shader(Packing::Linear, ShaderVariant::Antialiased, ShaderBinding::new("stroke"));
//!
//! let mut writer = StrokingAttributeWriter::new();
//! writer.set_source(&selection, &shaders, &StrokingMethod::DEFAULT, Packing::Linear, ShaderVariant::Antialiased, true);
//!
//! let mut attributes = vec![PainterAttribute::default(); 64];
//! let mut indices = vec![0; 128];
//! let mut state = WriteState::new();
//! let mut more = writer.initialize_state(&mut state);
//! while more {
//!     let result = writer.write_data(&mut attributes, &mut indices, 0, &mut state).unwrap();
//!     // Upload result.attributes_written and result.indices_written here.
//!     more = result.more;
//! }
//! ```

extern crate alloc;

#[cfg(any(test, feature = "std"))]
extern crate std;

#[cfg(feature = "serialization")]
#[macro_use]
pub extern crate serde;

pub extern crate strata_geom as geom;
pub extern crate strata_partition as partition;

pub mod arc_stroked_point;
mod attribute;
mod error;
mod shader;
pub mod stroked_point;
mod writer;

#[cfg(test)]
mod tests;

pub use crate::geom::math;

#[doc(inline)]
pub use crate::attribute::{PackingSize, PainterAttribute};
#[doc(inline)]
pub use crate::error::WriteError;
#[doc(inline)]
pub use crate::shader::{ShaderBinding, StrokeShaderSet};
#[doc(inline)]
pub use crate::writer::{DrawPhase, DrawnItem, StrokingAttributeWriter, WriteResult, WriteState};

/// The integer type of the emitted indices.
pub type Index = u32;

/// Line join types.
///
/// The miter joins are drawn from the join subsets of the selection which can
/// differ from the edge subsets when the selection was made with
/// `select_miter_joins`.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serialization", derive(Serialize, Deserialize))]
pub enum JoinStyle {
    /// No join geometry is emitted.
    NoJoins,
    Bevel,
    /// A miter clipped at the miter limit.
    MiterClip,
    /// A miter that falls back to a bevel past the miter limit.
    MiterBevel,
    /// A miter that is truncated to the miter limit.
    Miter,
    Rounded,
}

/// Line cap types.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serialization", derive(Serialize, Deserialize))]
pub enum CapStyle {
    /// The stroke stops at the end point. No cap geometry is emitted.
    Flat,
    Square,
    Rounded,
    /// A rectangle whose length the shader adjusts, for dashed strokes.
    /// Always packed linearly.
    Adjustable,
}

/// The two vertex encodings understood by the stroking shaders.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serialization", derive(Serialize, Deserialize))]
pub enum Packing {
    /// Polygonal geometry, see [`stroked_point`].
    Linear,
    /// Geometry made of arc primitives, see [`arc_stroked_point`].
    Arc,
}

impl Packing {
    pub(crate) fn index(self) -> usize {
        match self {
            Packing::Linear => 0,
            Packing::Arc => 1,
        }
    }
}

/// Selects between the shader variants of a [`StrokeShaderSet`].
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serialization", derive(Serialize, Deserialize))]
pub enum ShaderVariant {
    Antialiased,
    NonAntialiased,
}

impl ShaderVariant {
    pub(crate) fn index(self) -> usize {
        match self {
            ShaderVariant::Antialiased => 0,
            ShaderVariant::NonAntialiased => 1,
        }
    }
}

/// How a path is stroked.
#[derive(Copy, Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serialization", derive(Serialize, Deserialize))]
#[non_exhaustive]
pub struct StrokingMethod {
    /// Default value: `JoinStyle::Bevel`.
    pub join_style: JoinStyle,

    /// Default value: `CapStyle::Flat`.
    pub cap_style: CapStyle,

    /// Maximum distance, relative to the stroking radius, between rounded
    /// joins and caps and their polygonal approximation.
    ///
    /// Only used with linear packing.
    /// Default value: `StrokingMethod::DEFAULT_TESSELLATION_THRESHOLD`.
    pub tessellation_threshold: f32,
}

impl StrokingMethod {
    pub const DEFAULT_JOIN_STYLE: JoinStyle = JoinStyle::Bevel;
    pub const DEFAULT_CAP_STYLE: CapStyle = CapStyle::Flat;
    pub const DEFAULT_TESSELLATION_THRESHOLD: f32 = 0.1;

    pub const DEFAULT: Self = StrokingMethod {
        join_style: Self::DEFAULT_JOIN_STYLE,
        cap_style: Self::DEFAULT_CAP_STYLE,
        tessellation_threshold: Self::DEFAULT_TESSELLATION_THRESHOLD,
    };

    #[inline]
    pub const fn with_join_style(mut self, join_style: JoinStyle) -> Self {
        self.join_style = join_style;
        self
    }

    #[inline]
    pub const fn with_cap_style(mut self, cap_style: CapStyle) -> Self {
        self.cap_style = cap_style;
        self
    }

    #[inline]
    pub const fn with_tessellation_threshold(mut self, threshold: f32) -> Self {
        self.tessellation_threshold = threshold;
        self
    }

    /// The packing used for joins: arcs only apply to rounded joins.
    pub fn join_packing(&self, requested: Packing) -> Packing {
        match (requested, self.join_style) {
            (Packing::Arc, JoinStyle::Rounded) => Packing::Arc,
            _ => Packing::Linear,
        }
    }

    /// The packing used for caps: arcs only apply to rounded caps.
    pub fn cap_packing(&self, requested: Packing) -> Packing {
        match (requested, self.cap_style) {
            (Packing::Arc, CapStyle::Rounded) => Packing::Arc,
            _ => Packing::Linear,
        }
    }
}

impl Default for StrokingMethod {
    fn default() -> Self {
        Self::DEFAULT
    }
}
