#![deny(bare_trait_objects)]
#![no_std]

//! A rectangle packer for texture atlases.
//!
//! This crate is reexported in [strata](../strata/index.html).
//!
//! [`RectAtlas`] places rectangles in a fixed size plane using a tree of
//! nodes. A node holding one rectangle is split in three when it receives a
//! second one, and deleting rectangles merges the free nodes back.
//!
//! ```
//! use strata_atlas::{size2, Padding, RectAtlas};
//!
//! let mut atlas = RectAtlas::new(size2(256, 256));
//!
//! let glyph = atlas.add_rectangle(size2(20, 30), &Padding::uniform(1)).unwrap();
//! assert_eq!(glyph.size, size2(22, 32));
//! assert_eq!(glyph.unpadded_size, size2(20, 30));
//!
//! assert!(atlas.add_rectangle(size2(300, 10), &Padding::ZERO).is_none());
//!
//! atlas.delete_rectangle(glyph.id).unwrap();
//! assert!(atlas.is_empty());
//! ```

extern crate alloc;

#[cfg(any(test, feature = "std"))]
extern crate std;

#[cfg(feature = "serialization")]
#[macro_use]
pub extern crate serde;

extern crate thiserror;

mod atlas;

pub use crate::atlas::RectAtlas;

use thiserror::Error;

/// Integer position in the atlas.
pub type AtlasPoint = euclid::default::Point2D<i32>;
/// Integer size in the atlas.
pub type AtlasSize = euclid::default::Size2D<i32>;

pub use euclid::point2;
pub use euclid::size2;

/// Extra space reserved around a rectangle.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serialization", derive(Serialize, Deserialize))]
pub struct Padding {
    pub left: i32,
    pub right: i32,
    pub top: i32,
    pub bottom: i32,
}

impl Padding {
    pub const ZERO: Self = Padding {
        left: 0,
        right: 0,
        top: 0,
        bottom: 0,
    };

    #[inline]
    pub const fn new(left: i32, right: i32, top: i32, bottom: i32) -> Self {
        Padding {
            left,
            right,
            top,
            bottom,
        }
    }

    #[inline]
    pub const fn uniform(padding: i32) -> Self {
        Padding::new(padding, padding, padding, padding)
    }

    #[inline]
    pub fn horizontal(&self) -> i32 {
        self.left + self.right
    }

    #[inline]
    pub fn vertical(&self) -> i32 {
        self.top + self.bottom
    }
}

/// Identifies a rectangle of a [`RectAtlas`].
///
/// IDs are not reused: once the rectangle is deleted or the atlas is
/// cleared the ID becomes stale.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serialization", derive(Serialize, Deserialize))]
pub struct RectId {
    pub(crate) index: u32,
    pub(crate) serial: u32,
}

impl RectId {
    /// The ID shared by all zero-area rectangles.
    pub const EMPTY: Self = RectId {
        index: u32::MAX,
        serial: 0,
    };

    #[inline]
    pub fn is_empty(&self) -> bool {
        *self == RectId::EMPTY
    }
}

/// A rectangle placed in the atlas.
///
/// `min` and `size` describe the padded region, which never overlaps the
/// padded region of another live rectangle.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serialization", derive(Serialize, Deserialize))]
pub struct Rectangle {
    pub id: RectId,
    pub min: AtlasPoint,
    pub size: AtlasSize,
    pub unpadded_min: AtlasPoint,
    pub unpadded_size: AtlasSize,
}

impl Rectangle {
    /// The sentinel returned for zero-area requests.
    pub const EMPTY: Self = Rectangle {
        id: RectId::EMPTY,
        min: AtlasPoint::new(0, 0),
        size: AtlasSize::new(0, 0),
        unpadded_min: AtlasPoint::new(0, 0),
        unpadded_size: AtlasSize::new(0, 0),
    };

    #[inline]
    pub fn max(&self) -> AtlasPoint {
        self.min + self.size
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.id.is_empty()
    }
}

#[derive(Error, Copy, Clone, Debug, PartialEq, Eq)]
pub enum AtlasError {
    #[error("The rectangle does not belong to this atlas.")]
    UnknownRectangle,
    #[error("The rectangle was already deleted or the atlas was cleared.")]
    StaleRectangle,
}
