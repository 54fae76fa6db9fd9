#![deny(bare_trait_objects)]

//! Clip-culled stroking of tessellated paths for GPU rendering.
//!
//! # Crates
//!
//! This meta-crate (`strata`) reexports the following sub-crates for convenience:
//!
//! * **strata_geom** - Segment, join and cap records, bounding boxes and clip planes.
//! * **strata_partition** - Spatial partitioning of tessellated paths and glyph runs,
//!   and clip-driven selection of the visible subsets.
//! * **strata_stroke** - Packing of the selected geometry into shader attributes,
//!   written in resumable chunks.
//! * **strata_atlas** - A rectangle packer for texture atlases.
//!
//! Each `strata_<name>` crate is reexported as a `<name>` module in `strata`. For example:
//!
//! ```ignore
//! extern crate strata_partition;
//! use strata_partition::PartitionedTessellatedPath;
//! ```
//!
//! Is equivalent to:
//!
//! ```ignore
//! extern crate strata;
//! use strata::partition::PartitionedTessellatedPath;
//! ```
//!
//! # Feature flags
//!
//! serialization using serde can be enabled on each crate using the
//! `serialization` feature flag (disabled by default).
//!
//! # Stroking a path
//!
//! A path is tessellated into segments, partitioned once, and then culled
//! against the clip planes every time it is drawn:
//!
//! ```
//! use strata::geom::{ClipMatrix, TessellatedPath};
//! use strata::math::{point, vector, vector3};
//! use strata::partition::{PartitionedTessellatedPath, SelectionInflation, SubsetSelection};
//! use strata::stroke::*;
//!
//! let mut builder = TessellatedPath::builder();
//! builder.begin(point(0.0, 0.0));
//! for i in 1..200 {
//!     let y = if i % 2 == 0 { 0.0 } else { 10.0 };
//!     builder.line_to(point(i as f32 * 5.0, y));
//!     builder.end_edge();
//! }
//! builder.end(false);
//! let path = PartitionedTessellatedPath::new(&builder.build());
//!
//! // Only keep what is left of x = 100.
//! let mut selection = SubsetSelection::new();
//! path.select_subsets(
//!     &[vector3(-1.0, 0.0, 100.0)],
//!     &ClipMatrix::IDENTITY,
//!     vector(1.0, 1.0),
//!     &SelectionInflation::DEFAULT.with_item_space_distance(2.0),
//!     false,
//!     &mut selection,
//! );
//!
//! let shaders = StrokeShaderSet::new()
//!     .with_shader(Packing::Linear, ShaderVariant::Antialiased, ShaderBinding::new(0u32));
//! let method = StrokingMethod::DEFAULT
//!     .with_join_style(JoinStyle::Rounded)
//!     .with_cap_style(CapStyle::Square);
//!
//! let mut writer = StrokingAttributeWriter::new();
//! writer.set_source(&selection, &shaders, &method, Packing::Linear, ShaderVariant::Antialiased, true);
//!
//! let mut attributes = vec![PainterAttribute::default(); 1024];
//! let mut indices = vec![0; 2048];
//! let mut uploaded = 0;
//! let mut state = WriteState::new();
//! let mut more = writer.initialize_state(&mut state);
//! while more {
//!     let result = writer.write_data(&mut attributes, &mut indices, uploaded, &mut state).unwrap();
//!     uploaded += result.attributes_written as u32;
//!     more = result.more;
//! }
//! ```

pub extern crate strata_atlas;
pub extern crate strata_geom;
pub extern crate strata_partition;
pub extern crate strata_stroke;

pub use strata_atlas as atlas;
pub use strata_geom as geom;
pub use strata_partition as partition;
pub use strata_stroke as stroke;

pub use geom::math;

#[test]
fn reexports() {
    use crate::math::point;

    let mut builder = geom::TessellatedPath::builder();
    builder.begin(point(0.0, 0.0));
    builder.line_to(point(10.0, 0.0));
    builder.end(false);
    let path = partition::PartitionedTessellatedPath::new(&builder.build());
    assert_eq!(path.number_subsets(), 1);

    let mut rects = atlas::RectAtlas::new(atlas::size2(8, 8));
    assert!(rects.add_rectangle(atlas::size2(8, 8), &atlas::Padding::ZERO).is_some());
}
