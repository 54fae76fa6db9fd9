//! Spatial partitioning of glyph runs.
//!
//! Glyphs are only known by their boxes here: the box of a glyph is derived
//! from its metrics, the format size and the layout. Subsets are built the
//! first time they are queried. Glyphs that straddle the splitting line of a
//! subset stay in that subset rather than being cut.

use crate::geom::math::{point, Point, Size, Vector, Vector3D};
use crate::geom::{clip_against_planes, Axis, BoundingBox, ClipMatrix, ClipScratch};

use crate::geom::arrayvec::ArrayVec;

use alloc::vec::Vec;
use core::cell::OnceCell;

/// Direction of the y axis on screen.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serialization", derive(Serialize, Deserialize))]
pub enum ScreenOrientation {
    YIncreasesDownwards,
    YIncreasesUpwards,
}

/// Whether glyphs are laid out along a horizontal or vertical line.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serialization", derive(Serialize, Deserialize))]
pub enum GlyphLayout {
    Horizontal,
    Vertical,
}

/// Font-unit metrics of a glyph.
#[derive(Copy, Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serialization", derive(Serialize, Deserialize))]
pub struct GlyphMetrics {
    pub units_per_em: f32,
    pub size: Size,
    /// Offset from the pen position to the glyph's bottom-left corner in
    /// horizontal layout.
    pub horizontal_layout_offset: Vector,
    /// Offset from the pen position to the glyph's bottom-left corner in
    /// vertical layout.
    pub vertical_layout_offset: Vector,
}

/// A glyph added to a sequence.
///
/// Glyphs without metrics get an empty box and are never placed in a
/// subset.
#[derive(Copy, Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serialization", derive(Serialize, Deserialize))]
pub struct GlyphSource {
    pub glyph_code: u32,
    pub metrics: Option<GlyphMetrics>,
}

/// Parameters of a [`GlyphSequence`].
#[derive(Copy, Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serialization", derive(Serialize, Deserialize))]
#[non_exhaustive]
pub struct GlyphSequenceOptions {
    /// A subset with more glyphs than this is split.
    ///
    /// Default value: `GlyphSequenceOptions::DEFAULT_SPLITTING_SIZE`.
    pub splitting_size: usize,

    /// Subsets at this depth are never split.
    ///
    /// Default value: `GlyphSequenceOptions::DEFAULT_MAX_DEPTH`.
    pub max_depth: u32,

    /// The size at which glyphs are formatted, in local units per em.
    ///
    /// Default value: `GlyphSequenceOptions::DEFAULT_FORMAT_SIZE`.
    pub format_size: f32,

    /// Default value: `ScreenOrientation::YIncreasesDownwards`.
    pub orientation: ScreenOrientation,

    /// Default value: `GlyphLayout::Horizontal`.
    pub layout: GlyphLayout,
}

impl GlyphSequenceOptions {
    pub const DEFAULT_SPLITTING_SIZE: usize = 300;
    pub const DEFAULT_MAX_DEPTH: u32 = 10;
    pub const DEFAULT_FORMAT_SIZE: f32 = 16.0;

    pub const DEFAULT: Self = GlyphSequenceOptions {
        splitting_size: Self::DEFAULT_SPLITTING_SIZE,
        max_depth: Self::DEFAULT_MAX_DEPTH,
        format_size: Self::DEFAULT_FORMAT_SIZE,
        orientation: ScreenOrientation::YIncreasesDownwards,
        layout: GlyphLayout::Horizontal,
    };

    #[inline]
    pub fn format_size(size: f32) -> Self {
        Self::DEFAULT.with_format_size(size)
    }

    #[inline]
    pub const fn with_format_size(mut self, size: f32) -> Self {
        self.format_size = size;
        self
    }

    #[inline]
    pub const fn with_splitting_size(mut self, size: usize) -> Self {
        self.splitting_size = size;
        self
    }

    #[inline]
    pub const fn with_max_depth(mut self, depth: u32) -> Self {
        self.max_depth = depth;
        self
    }

    #[inline]
    pub const fn with_orientation(mut self, orientation: ScreenOrientation) -> Self {
        self.orientation = orientation;
        self
    }

    #[inline]
    pub const fn with_layout(mut self, layout: GlyphLayout) -> Self {
        self.layout = layout;
        self
    }
}

impl Default for GlyphSequenceOptions {
    fn default() -> Self {
        Self::DEFAULT
    }
}

#[derive(Copy, Clone, Debug)]
struct AddedGlyph {
    source: GlyphSource,
    position: Point,
    bounding_box: BoundingBox,
}

#[derive(Copy, Clone, Debug, PartialEq)]
enum Placement {
    Child0 = 0,
    Child1 = 1,
    Parent = 2,
}

fn place(axis: Axis, value: f32, bbox: &BoundingBox) -> Placement {
    let min_v = axis.of(bbox.min());
    let max_v = axis.of(bbox.max());

    let hits_mid = min_v < value && value < max_v;
    let hits_child0 = value > min_v || hits_mid;
    let hits_child1 = value < max_v || hits_mid;

    match (hits_child0, hits_child1) {
        (true, true) => Placement::Parent,
        (_, true) => Placement::Child1,
        _ => Placement::Child0,
    }
}

#[derive(Copy, Clone, Debug, PartialEq)]
struct GlyphSplit {
    axis: Axis,
    value: f32,
    children: [u32; 2],
}

/// A node of a glyph sequence's partition tree.
#[derive(Clone, Debug)]
pub struct GlyphSubset {
    id: u32,
    generation: u32,
    glyphs: Vec<u32>,
    bounding_box: BoundingBox,
    split: Option<GlyphSplit>,
    bounding_path: OnceCell<ArrayVec<Point, 4>>,
}

impl GlyphSubset {
    fn new(id: u32, generation: u32, glyphs: Vec<u32>, bounding_box: BoundingBox) -> Self {
        GlyphSubset {
            id,
            generation,
            glyphs,
            bounding_box,
            split: None,
            bounding_path: OnceCell::new(),
        }
    }

    pub fn id(&self) -> u32 {
        self.id
    }

    /// Indices of the glyphs owned by this subset, in the order they were
    /// added to the sequence.
    ///
    /// Glyphs that fall into a child subset are not listed here.
    pub fn glyphs(&self) -> &[u32] {
        &self.glyphs
    }

    pub fn bounding_box(&self) -> &BoundingBox {
        &self.bounding_box
    }

    pub fn children(&self) -> Option<[u32; 2]> {
        self.split.map(|split| split.children)
    }

    /// The bounding box as a closed polygon, or an empty slice if the box is
    /// empty.
    pub fn bounding_path(&self) -> &[Point] {
        self.bounding_path.get_or_init(|| {
            let mut path = ArrayVec::new();
            if !self.bounding_box.is_empty() {
                let a = self.bounding_box.min();
                let b = self.bounding_box.max();
                path.push(point(a.x, a.y));
                path.push(point(a.x, b.y));
                path.push(point(b.x, b.y));
                path.push(point(b.x, a.y));
            }
            path
        })
    }
}

/// Clip buffers for [`GlyphSequence::select_subsets`].
#[derive(Clone, Debug, Default)]
pub struct GlyphScratch {
    clip_equations: Vec<Vector3D>,
    clipped: Vec<Point>,
    clip: ClipScratch,
}

impl GlyphScratch {
    pub fn new() -> Self {
        GlyphScratch::default()
    }
}

/// A run of glyphs partitioned for clip-driven culling.
///
/// ```
/// use strata_partition::{GlyphSequence, GlyphSequenceOptions, GlyphSource};
/// use strata_partition::glyph_sequence::GlyphScratch;
/// use strata_geom::ClipMatrix;
/// use strata_geom::math::{point, vector3};
///
/// let mut sequence = GlyphSequence::new(GlyphSequenceOptions::DEFAULT);
/// sequence.add_glyph(GlyphSource { glyph_code: 1, metrics: None }, point(0.0, 0.0));
///
/// let mut selected = Vec::new();
/// sequence.select_subsets(
///     &[vector3(1.0, 0.0, 0.0)],
///     &ClipMatrix::IDENTITY,
///     &mut GlyphScratch::new(),
///     &mut selected,
/// );
/// // The only glyph has no metrics and is never drawn.
/// assert!(selected.is_empty());
/// ```
#[derive(Clone, Debug)]
pub struct GlyphSequence {
    options: GlyphSequenceOptions,
    glyphs: Vec<AddedGlyph>,
    subsets: Vec<GlyphSubset>,
}

impl GlyphSequence {
    pub fn new(options: GlyphSequenceOptions) -> Self {
        GlyphSequence {
            options,
            glyphs: Vec::new(),
            subsets: Vec::new(),
        }
    }

    pub fn options(&self) -> &GlyphSequenceOptions {
        &self.options
    }

    pub fn number_glyphs(&self) -> usize {
        self.glyphs.len()
    }

    /// Returns the source and position of an added glyph.
    pub fn added_glyph(&self, index: u32) -> (&GlyphSource, Point) {
        let glyph = &self.glyphs[index as usize];
        (&glyph.source, glyph.position)
    }

    pub fn glyph_bounding_box(&self, index: u32) -> &BoundingBox {
        &self.glyphs[index as usize].bounding_box
    }

    pub fn add_glyph(&mut self, source: GlyphSource, position: Point) {
        let index = self.glyphs.len() as u32;
        let bounding_box = match source.metrics {
            Some(metrics) => self.glyph_box(&metrics, position),
            None => BoundingBox::empty(),
        };

        self.glyphs.push(AddedGlyph {
            source,
            position,
            bounding_box,
        });

        if !self.subsets.is_empty() {
            self.route_glyph(index);
        }
    }

    /// Adds glyphs at the given positions.
    ///
    /// Both slices are expected to have the same length; extra elements of
    /// the longer one are ignored.
    pub fn add_glyphs(&mut self, sources: &[GlyphSource], positions: &[Point]) {
        debug_assert_eq!(sources.len(), positions.len());
        self.glyphs.reserve(sources.len());
        for (source, position) in sources.iter().zip(positions) {
            self.add_glyph(*source, *position);
        }
    }

    fn glyph_box(&self, metrics: &GlyphMetrics, position: Point) -> BoundingBox {
        let scale = self.options.format_size / metrics.units_per_em;
        let glyph_size = metrics.size * scale;
        let offset = match self.options.layout {
            GlyphLayout::Horizontal => metrics.horizontal_layout_offset,
            GlyphLayout::Vertical => metrics.vertical_layout_offset,
        };

        let (p_bl, p_tr) = match self.options.orientation {
            ScreenOrientation::YIncreasesDownwards => {
                let bl = point(scale * offset.x, -scale * offset.y);
                let tr = point(bl.x + glyph_size.width, bl.y - glyph_size.height);
                (bl, tr)
            }
            ScreenOrientation::YIncreasesUpwards => {
                let bl = (offset * scale).to_point();
                let tr = point(bl.x + glyph_size.width, bl.y + glyph_size.height);
                (bl, tr)
            }
        };

        BoundingBox::from_corners(position + p_bl.to_vector(), position + p_tr.to_vector())
    }

    /// Builds the partition tree if it does not exist yet.
    ///
    /// This happens automatically the first time subsets are queried.
    pub fn make_subsets_ready(&mut self) {
        if !self.subsets.is_empty() {
            return;
        }

        let mut bounding_box = BoundingBox::empty();
        let mut glyphs = Vec::with_capacity(self.glyphs.len());
        for (index, glyph) in self.glyphs.iter().enumerate() {
            if !glyph.bounding_box.is_empty() {
                bounding_box.union_box(&glyph.bounding_box);
                glyphs.push(index as u32);
            }
        }

        self.subsets
            .push(GlyphSubset::new(0, 0, glyphs, bounding_box));
        self.maybe_split(0);

        log::debug!(
            "built {} glyph subsets for {} glyphs",
            self.subsets.len(),
            self.glyphs.len()
        );
    }

    pub fn number_subsets(&mut self) -> usize {
        self.make_subsets_ready();
        self.subsets.len()
    }

    pub fn subset(&mut self, id: u32) -> &GlyphSubset {
        self.make_subsets_ready();
        &self.subsets[id as usize]
    }

    /// Writes into `out` the IDs of the subsets that own glyphs and whose
    /// bounding box is not entirely clipped.
    ///
    /// Once a box is found to be entirely inside the clip planes, all of its
    /// descendants are selected without further clipping.
    pub fn select_subsets(
        &mut self,
        clip_equations: &[Vector3D],
        clip_to_local: &ClipMatrix,
        scratch: &mut GlyphScratch,
        out: &mut Vec<u32>,
    ) {
        out.clear();
        if self.glyphs.is_empty() {
            return;
        }

        self.make_subsets_ready();

        scratch.clip_equations.clear();
        scratch
            .clip_equations
            .extend(clip_equations.iter().map(|eq| clip_to_local.transform_equation(eq)));

        self.select_recursive(0, scratch, out);

        log::trace!("selected glyph subsets {:?}", out);
    }

    fn select_recursive(&self, id: u32, scratch: &mut GlyphScratch, out: &mut Vec<u32>) {
        let subset = &self.subsets[id as usize];
        let polygon = subset.bounding_box.inflated_polygon(0.0);
        let unclipped = clip_against_planes(
            &scratch.clip_equations,
            &polygon,
            &mut scratch.clipped,
            &mut scratch.clip,
        );

        if scratch.clipped.is_empty() {
            return;
        }

        if !subset.glyphs.is_empty() {
            out.push(id);
        }

        if let Some(split) = subset.split {
            for child in &split.children {
                if unclipped {
                    self.select_all(*child, out);
                } else {
                    self.select_recursive(*child, scratch, out);
                }
            }
        }
    }

    fn select_all(&self, id: u32, out: &mut Vec<u32>) {
        let subset = &self.subsets[id as usize];
        if !subset.glyphs.is_empty() {
            out.push(id);
        }

        if let Some(split) = subset.split {
            self.select_all(split.children[0], out);
            self.select_all(split.children[1], out);
        }
    }

    // Walks a glyph added after the tree was built down to the subset that
    // should own it.
    fn route_glyph(&mut self, index: u32) {
        let bbox = self.glyphs[index as usize].bounding_box;
        if bbox.is_empty() {
            return;
        }

        let mut id = 0;
        loop {
            let subset = &mut self.subsets[id as usize];
            if subset.bounding_box.union_box(&bbox) {
                subset.bounding_path = OnceCell::new();
            }

            match subset.split {
                Some(split) => match place(split.axis, split.value, &bbox) {
                    Placement::Parent => {
                        subset.glyphs.push(index);
                        return;
                    }
                    Placement::Child0 => id = split.children[0],
                    Placement::Child1 => id = split.children[1],
                },
                None => {
                    subset.glyphs.push(index);
                    self.maybe_split(id);
                    return;
                }
            }
        }
    }

    fn maybe_split(&mut self, id: u32) {
        let subset = &self.subsets[id as usize];
        if subset.split.is_none()
            && subset.generation < self.options.max_depth
            && subset.glyphs.len() > self.options.splitting_size
        {
            self.split(id);
        }
    }

    // Splits a subset at the middle of its box along the axis that the fewest
    // glyphs straddle.
    fn split(&mut self, id: u32) {
        let subset = &self.subsets[id as usize];
        if subset.bounding_box.is_empty() {
            return;
        }

        let mid = subset.bounding_box.center();
        let mut in_both = [0usize; 2];
        for glyph in &subset.glyphs {
            let bbox = &self.glyphs[*glyph as usize].bounding_box;
            for (c, axis) in Axis::ALL.iter().enumerate() {
                if place(*axis, axis.of(mid), bbox) == Placement::Parent {
                    in_both[c] += 1;
                }
            }
        }

        let c = if in_both[0] < in_both[1] { 0 } else { 1 };
        if in_both[c] == subset.glyphs.len() {
            log::debug!("glyph subset {} cannot be split", id);
            return;
        }

        let axis = Axis::ALL[c];
        let value = axis.of(mid);
        let mut lists: [Vec<u32>; 3] = [Vec::new(), Vec::new(), Vec::new()];
        for glyph in &subset.glyphs {
            let bbox = &self.glyphs[*glyph as usize].bounding_box;
            lists[place(axis, value, bbox) as usize].push(*glyph);
        }

        let (box0, box1) = match axis {
            Axis::X => subset.bounding_box.split_x(),
            Axis::Y => subset.bounding_box.split_y(),
        };
        let generation = subset.generation + 1;

        let [list0, list1, parent_list] = lists;
        self.subsets[id as usize].glyphs = parent_list;

        log::debug!(
            "splitting glyph subset {} at {:?} = {} ({} | {} | {} glyphs)",
            id,
            axis,
            value,
            list0.len(),
            list1.len(),
            self.subsets[id as usize].glyphs.len()
        );

        let child0 = self.add_child(generation, list0, box0);
        let child1 = self.add_child(generation, list1, box1);
        self.subsets[id as usize].split = Some(GlyphSplit {
            axis,
            value,
            children: [child0, child1],
        });
    }

    fn add_child(&mut self, generation: u32, glyphs: Vec<u32>, bounding_box: BoundingBox) -> u32 {
        let id = self.subsets.len() as u32;
        self.subsets
            .push(GlyphSubset::new(id, generation, glyphs, bounding_box));
        self.maybe_split(id);

        id
    }
}

#[cfg(test)]
use crate::geom::math::{size, vector, vector3};

#[cfg(test)]
fn test_metrics() -> GlyphMetrics {
    GlyphMetrics {
        units_per_em: 1024.0,
        size: size(320.0, 448.0),
        horizontal_layout_offset: vector(32.0, 384.0),
        vertical_layout_offset: vector(-160.0, 0.0),
    }
}

#[cfg(test)]
fn glyph(code: u32) -> GlyphSource {
    GlyphSource {
        glyph_code: code,
        metrics: Some(test_metrics()),
    }
}

#[cfg(test)]
fn glyph_grid(sequence: &mut GlyphSequence, columns: u32, rows: u32) {
    for row in 0..rows {
        for column in 0..columns {
            let p = point(column as f32 * 20.0, row as f32 * 30.0);
            sequence.add_glyph(glyph(row * columns + column), p);
        }
    }
}

#[cfg(test)]
fn owners(sequence: &mut GlyphSequence) -> Vec<u32> {
    let mut owners = alloc::vec![u32::MAX; sequence.number_glyphs()];
    for id in 0..sequence.number_subsets() as u32 {
        for g in sequence.subset(id).glyphs() {
            assert_eq!(owners[*g as usize], u32::MAX, "glyph {} owned twice", g);
            owners[*g as usize] = id;
        }
    }

    owners
}

#[test]
fn glyph_boxes_follow_orientation_and_layout() {
    let mut down = GlyphSequence::new(GlyphSequenceOptions::format_size(32.0));
    down.add_glyph(glyph(0), point(100.0, 100.0));
    let bbox = down.glyph_bounding_box(0);
    assert_eq!(bbox.min(), point(101.0, 74.0));
    assert_eq!(bbox.max(), point(111.0, 88.0));

    let mut up = GlyphSequence::new(
        GlyphSequenceOptions::format_size(32.0).with_orientation(ScreenOrientation::YIncreasesUpwards),
    );
    up.add_glyph(glyph(0), point(100.0, 100.0));
    let bbox = up.glyph_bounding_box(0);
    assert_eq!(bbox.min(), point(101.0, 112.0));
    assert_eq!(bbox.max(), point(111.0, 126.0));

    let mut vertical = GlyphSequence::new(
        GlyphSequenceOptions::format_size(32.0)
            .with_orientation(ScreenOrientation::YIncreasesUpwards)
            .with_layout(GlyphLayout::Vertical),
    );
    vertical.add_glyph(glyph(0), point(0.0, 0.0));
    let bbox = vertical.glyph_bounding_box(0);
    assert_eq!(bbox.min(), point(-5.0, 0.0));
    assert_eq!(bbox.max(), point(5.0, 14.0));
}

#[test]
fn glyphs_without_metrics_are_not_placed() {
    let mut sequence = GlyphSequence::new(GlyphSequenceOptions::DEFAULT);
    sequence.add_glyph(glyph(0), point(0.0, 0.0));
    sequence.add_glyph(GlyphSource { glyph_code: 1, metrics: None }, point(10.0, 0.0));
    sequence.add_glyph(glyph(2), point(20.0, 0.0));

    assert_eq!(sequence.number_glyphs(), 3);
    assert_eq!(sequence.number_subsets(), 1);
    assert_eq!(sequence.subset(0).glyphs(), &[0, 2]);
    assert_eq!(sequence.added_glyph(1).0.glyph_code, 1);

    // Also when added after the subsets exist.
    sequence.add_glyph(GlyphSource { glyph_code: 3, metrics: None }, point(30.0, 0.0));
    assert_eq!(sequence.subset(0).glyphs(), &[0, 2]);
}

#[test]
fn large_runs_are_split() {
    let options = GlyphSequenceOptions::format_size(32.0).with_splitting_size(16);
    let mut sequence = GlyphSequence::new(options);
    glyph_grid(&mut sequence, 32, 8);

    assert!(sequence.number_subsets() > 1);

    let owners = owners(&mut sequence);
    assert!(owners.iter().all(|id| *id != u32::MAX));

    for id in 0..sequence.number_subsets() as u32 {
        let subset = sequence.subset(id).clone();
        assert_eq!(subset.id(), id);
        for g in subset.glyphs() {
            let bbox = *sequence.glyph_bounding_box(*g);
            let mut union = *subset.bounding_box();
            assert!(!union.union_box(&bbox), "glyph {} outside of subset {}", g, id);
        }
    }
}

#[test]
fn glyphs_added_later_are_routed() {
    let options = GlyphSequenceOptions::format_size(32.0).with_splitting_size(16);
    let mut sequence = GlyphSequence::new(options);
    glyph_grid(&mut sequence, 8, 4);
    let before = sequence.number_subsets();

    for i in 0..64 {
        sequence.add_glyph(glyph(1000 + i), point((i % 16) as f32 * 20.0, 200.0 + (i / 16) as f32 * 30.0));
    }

    assert!(sequence.number_subsets() > before);
    let owners = owners(&mut sequence);
    assert!(owners.iter().all(|id| *id != u32::MAX));

    let root = sequence.subset(0).clone();
    for g in 0..sequence.number_glyphs() as u32 {
        let mut union = *root.bounding_box();
        assert!(!union.union_box(sequence.glyph_bounding_box(g)));
    }
    assert_eq!(root.bounding_path().len(), 4);
}

#[test]
fn selection_keeps_visible_glyphs() {
    let options = GlyphSequenceOptions::format_size(32.0).with_splitting_size(16);
    let mut sequence = GlyphSequence::new(options);
    glyph_grid(&mut sequence, 32, 8);
    let owners = owners(&mut sequence);

    // Keep x <= 150.
    let clip = [vector3(-1.0, 0.0, 150.0)];
    let mut scratch = GlyphScratch::new();
    let mut selected = Vec::new();
    sequence.select_subsets(&clip, &ClipMatrix::IDENTITY, &mut scratch, &mut selected);

    assert!(!selected.is_empty());
    assert!(selected.len() < sequence.number_subsets());

    for g in 0..sequence.number_glyphs() as u32 {
        let visible = sequence.glyph_bounding_box(g).min().x <= 150.0;
        if visible {
            assert!(selected.contains(&owners[g as usize]), "glyph {} not selected", g);
        }
    }

    for id in &selected {
        let subset = sequence.subset(*id);
        assert!(!subset.glyphs().is_empty());
        assert!(subset.bounding_box().min().x <= 150.0);
    }

    // Everything visible.
    sequence.select_subsets(&[vector3(1.0, 0.0, 1000.0)], &ClipMatrix::IDENTITY, &mut scratch, &mut selected);
    let non_empty = (0..sequence.number_subsets() as u32)
        .filter(|id| !sequence.subset(*id).glyphs().is_empty())
        .count();
    assert_eq!(selected.len(), non_empty);
}
