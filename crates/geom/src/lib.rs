#![deny(bare_trait_objects)]
#![deny(unconditional_recursion)]
#![allow(clippy::float_cmp)]
#![allow(clippy::many_single_char_names)]
#![no_std]

//! Geometric building blocks shared by the strata crates.
//!
//! This crate is reexported in [strata](../strata/index.html).
//!
//! # Overview.
//!
//! The types in this crate describe geometry that has already been flattened
//! by a tessellator:
//!
//! - [`Segment`] records: line segments and circular arcs with the distance
//!   values a stroking shader needs,
//! - [`Join`] and [`Cap`] records: points where edges meet or where open
//!   contours end,
//! - [`TessellatedPath`]: the per-edge arrays of segments together with the
//!   joins and caps of a path,
//! - [`BoundingBox`]: an axis-aligned box with a distinguished empty state,
//! - clip plane helpers used to cull boxes against the current clip state.
//!
//! No curve evaluation happens past this point. Splitting a segment at an
//! axis-aligned line is exact for both lines and arcs.

extern crate alloc;

#[cfg(any(test, feature = "std"))]
extern crate std;

// Reexport dependencies.
pub use arrayvec;
pub use euclid;

#[cfg(feature = "serialization")]
#[macro_use]
pub extern crate serde;

mod bounding_box;
pub mod clip;
mod join;
mod segment;
pub mod tessellated_path;
pub mod utils;

#[doc(inline)]
pub use crate::bounding_box::BoundingBox;
#[doc(inline)]
pub use crate::clip::{clip_against_plane, clip_against_planes, ClipMatrix, ClipScratch};
#[doc(inline)]
pub use crate::join::{Cap, Join};
#[doc(inline)]
pub use crate::segment::{Segment, SegmentKind, SegmentSplit};
#[doc(inline)]
pub use crate::tessellated_path::{SegmentChain, TessellatedPath, TessellatedPathBuilder};

pub mod math {
    //! f32 version of the euclid types used everywhere. The other strata
    //! crates reexport them.

    use crate::euclid;

    /// Alias for ```euclid::default::Point2D<f32>```.
    pub type Point = euclid::default::Point2D<f32>;

    /// Alias for ```euclid::default::Vector2D<f32>```.
    pub type Vector = euclid::default::Vector2D<f32>;

    /// Alias for ```euclid::default::Vector3D<f32>```.
    ///
    /// Clip half-planes are stored in this form: a point `p` is inside the
    /// plane `eq` when `eq.x * p.x + eq.y * p.y + eq.z >= 0`.
    pub type Vector3D = euclid::default::Vector3D<f32>;

    /// Alias for ```euclid::default::Size2D<f32>```.
    pub type Size = euclid::default::Size2D<f32>;

    /// Alias for ```euclid::default::Box2D<f32>```.
    pub type Box2D = euclid::default::Box2D<f32>;

    /// Alias for ```euclid::default::Transform2D<f32>```.
    pub type Transform = euclid::default::Transform2D<f32>;

    /// An angle in radians (f32).
    pub type Angle = euclid::Angle<f32>;

    /// Shorthand for `Vector::new(x, y)`.
    #[inline]
    pub fn vector(x: f32, y: f32) -> Vector {
        Vector::new(x, y)
    }

    /// Shorthand for `Point::new(x, y)`.
    #[inline]
    pub fn point(x: f32, y: f32) -> Point {
        Point::new(x, y)
    }

    /// Shorthand for `Size::new(w, h)`.
    #[inline]
    pub fn size(w: f32, h: f32) -> Size {
        Size::new(w, h)
    }

    /// Shorthand for `Vector3D::new(x, y, z)`.
    #[inline]
    pub fn vector3(x: f32, y: f32, z: f32) -> Vector3D {
        Vector3D::new(x, y, z)
    }
}

/// One of the two coordinate axes.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serialization", derive(Serialize, Deserialize))]
pub enum Axis {
    X,
    Y,
}

impl Axis {
    /// Both axes, in the order the partitioning code visits them.
    pub const ALL: [Axis; 2] = [Axis::X, Axis::Y];

    /// Returns the coordinate of `p` along this axis.
    #[inline]
    pub fn of(self, p: math::Point) -> f32 {
        match self {
            Axis::X => p.x,
            Axis::Y => p.y,
        }
    }

    #[inline]
    pub fn other(self) -> Axis {
        match self {
            Axis::X => Axis::Y,
            Axis::Y => Axis::X,
        }
    }
}
