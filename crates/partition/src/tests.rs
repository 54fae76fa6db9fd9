use crate::geom::math::{point, vector, vector3, Point, Vector3D};
use crate::geom::{BoundingBox, ClipMatrix, Segment, TessellatedPath};
use crate::*;

use alloc::vec::Vec;
use core::f32::consts::PI;

// A closed square with `n` line segments per side, one edge per side.
fn square(origin: Point, side: f32, n: u32) -> TessellatedPath {
    let corners = [
        origin,
        point(origin.x + side, origin.y),
        point(origin.x + side, origin.y + side),
        point(origin.x, origin.y + side),
    ];

    let mut builder = TessellatedPath::builder();
    builder.begin(corners[0]);
    for i in 0..4 {
        let from = corners[i];
        let to = corners[(i + 1) % 4];
        for s in 1..=n {
            builder.line_to(from.lerp(to, s as f32 / n as f32));
        }
        if i < 3 {
            builder.end_edge();
        }
    }
    builder.end(true);

    builder.build()
}

fn circle(center: Point, radius: f32, arcs: u32) -> TessellatedPath {
    let step = 2.0 * PI / arcs as f32;
    let mut builder = TessellatedPath::builder();
    builder.begin(point(center.x + radius, center.y));
    for i in 0..arcs {
        builder.arc_to(center, radius, i as f32 * step..(i + 1) as f32 * step);
    }
    builder.end(true);

    builder.build()
}

fn parents(path: &PartitionedTessellatedPath) -> Vec<Option<u32>> {
    let mut parents = alloc::vec![None; path.number_subsets()];
    for subset in path.subsets() {
        if let Some([a, b]) = subset.children() {
            parents[a as usize] = Some(subset.id());
            parents[b as usize] = Some(subset.id());
        }
    }

    parents
}

fn leaves(path: &PartitionedTessellatedPath) -> impl Iterator<Item = &Subset> {
    path.subsets().iter().filter(|s| !s.has_children())
}

fn select(
    path: &PartitionedTessellatedPath,
    clip: &[Vector3D],
    inflation: &SelectionInflation,
    miter: bool,
) -> Vec<u32> {
    let mut selection = SubsetSelection::new();
    path.select_subsets(
        clip,
        &ClipMatrix::IDENTITY,
        vector(1.0, 1.0),
        inflation,
        miter,
        &mut selection,
    );

    if miter {
        selection.join_subset_ids().to_vec()
    } else {
        assert_eq!(selection.join_subset_ids(), selection.subset_ids());
        selection.subset_ids().to_vec()
    }
}

fn covered(id: u32, selected: &[u32], parents: &[Option<u32>]) -> bool {
    let mut current = Some(id);
    while let Some(id) = current {
        if selected.contains(&id) {
            return true;
        }
        current = parents[id as usize];
    }

    false
}

#[test]
fn square_is_partitioned() {
    let path = PartitionedTessellatedPath::new(&square(point(0.0, 0.0), 200.0, 40));

    assert!(path.number_subsets() >= 2);
    assert_eq!(path.root_subset().segments().len(), 160);
    assert_eq!(path.root_subset().number_chains(), 4);
    assert_eq!(path.joins().len(), 4);
    assert!(path.caps().is_empty());
    assert!(!path.has_arcs());
    assert_eq!(path.max_distance(), 0.0);

    for (i, subset) in path.subsets().iter().enumerate() {
        assert_eq!(subset.id(), i as u32);
    }

    let parents = parents(&path);

    // Keep x <= 100.
    let left_half = [vector3(-1.0, 0.0, 100.0)];
    let selected = select(&path, &left_half, &SelectionInflation::DEFAULT, false);
    assert!(!selected.is_empty());
    for id in &selected {
        assert!(path.subset(*id).bounding_box().min().x <= 100.0);
    }

    // Keep x <= 90.
    let clip = [vector3(-1.0, 0.0, 90.0)];
    let selected = select(&path, &clip, &SelectionInflation::DEFAULT, false);
    let mut excluded = 0;
    for subset in path.subsets() {
        if subset.bounding_box().min().x > 90.0 {
            assert!(!covered(subset.id(), &selected, &parents));
            excluded += 1;
        }
    }
    assert!(excluded > 0);
}

#[test]
fn splits_shrink() {
    let path = PartitionedTessellatedPath::new(&square(point(-50.0, 10.0), 300.0, 100));

    for subset in path.subsets() {
        if let Some([a, b]) = subset.children() {
            let n = subset.segments().len();
            assert!(path.subset(a).segments().len() < n);
            assert!(path.subset(b).segments().len() < n);
            assert_eq!(path.subset(a).depth(), subset.depth() + 1);
        }
    }
}

#[test]
fn leaves_cover_every_segment() {
    let source = square(point(0.0, 0.0), 200.0, 40);
    let path = PartitionedTessellatedPath::new(&source);

    let total: f32 = source.segments().iter().map(|s| s.length).sum();
    let leaf_total: f32 = leaves(&path)
        .flat_map(|s| s.segments().iter())
        .map(|s| s.length)
        .sum();
    assert!((total - leaf_total).abs() < 1e-2);

    // Every point along the source segments falls into the range of a leaf
    // piece of the same edge.
    for segment in source.segments() {
        let covering_length: f32 = leaves(&path)
            .flat_map(|s| s.segments().iter())
            .filter(|piece| {
                piece.edge_id == segment.edge_id
                    && piece.distance_from_edge_start >= segment.distance_from_edge_start - 1e-3
                    && piece.distance_from_edge_start + piece.length
                        <= segment.distance_from_edge_start + segment.length + 1e-3
            })
            .map(|piece| piece.length)
            .sum();
        assert!((covering_length - segment.length).abs() < 1e-3);
    }

    // Joins and caps end up in exactly one leaf.
    let mut join_count = alloc::vec![0; path.joins().len()];
    for leaf in leaves(&path) {
        for join in leaf.joins() {
            join_count[join.source_index as usize] += 1;
        }
    }
    assert!(join_count.iter().all(|c| *c == 1));
}

#[test]
fn tessellation_error_is_carried() {
    let mut builder = TessellatedPath::builder();
    builder.begin(point(0.0, 0.0));
    for i in 1..100 {
        builder.line_to(point(i as f32, (i % 3) as f32));
    }
    builder.record_max_distance(0.5);
    builder.end(false);

    let path = PartitionedTessellatedPath::new(&builder.build());
    assert_eq!(path.max_distance(), 0.5);
}

#[test]
fn split_chains_keep_continuity() {
    let path = PartitionedTessellatedPath::new(&circle(point(10.0, -20.0), 100.0, 64));
    assert!(path.has_arcs());
    assert!(path.number_subsets() >= 2);

    for subset in path.subsets() {
        for chain in subset.segment_chains() {
            assert!(!chain.is_empty());
            let first = chain.segments[0];
            if let Some(prev) = chain.prev_to_start {
                assert!((prev.end - first.start).length() < 1e-3);
            }
            for pair in chain.segments.windows(2) {
                assert!((pair[0].end - pair[1].start).length() < 1e-3);
            }
        }

        let mut bbox = *subset.bounding_box();
        for segment in subset.segments() {
            assert!(!bbox.union_box(&segment.bounding_box()));
        }
    }
}

#[test]
fn selection_is_sound() {
    let path = PartitionedTessellatedPath::with_options(
        &square(point(0.0, 0.0), 200.0, 64),
        &PartitionOptions::DEFAULT.with_split_threshold(16),
    );
    let parents = parents(&path);

    // Keep x <= 60 and y >= 30.
    let clip = [vector3(-1.0, 0.0, 60.0), vector3(0.0, 1.0, -30.0)];
    let selected = select(&path, &clip, &SelectionInflation::DEFAULT, false);
    assert!(!selected.is_empty());

    let visible = BoundingBox::from_corners(point(-1000.0, 30.0), point(60.0, 1000.0));
    for leaf in leaves(&path) {
        if leaf.bounding_box().intersects(&visible) {
            assert!(covered(leaf.id(), &selected, &parents), "leaf {} not covered", leaf.id());
        }
    }

    // No selected subset is a descendant of another one.
    for id in &selected {
        if let Some(parent) = parents[*id as usize] {
            assert!(!covered(parent, &selected, &parents));
        }
    }
}

#[test]
fn selection_collapses_to_the_root() {
    let path = PartitionedTessellatedPath::new(&square(point(0.0, 0.0), 200.0, 40));

    let everything = [vector3(1.0, 0.0, 1000.0)];
    assert_eq!(select(&path, &everything, &SelectionInflation::DEFAULT, false), &[0]);
    assert_eq!(select(&path, &[], &SelectionInflation::DEFAULT, false), &[0]);

    let nothing = [vector3(1.0, 0.0, -1000.0)];
    assert!(select(&path, &nothing, &SelectionInflation::DEFAULT, false).is_empty());
}

#[test]
fn inflation_grows_the_selection() {
    let path = PartitionedTessellatedPath::new(&square(point(0.0, 0.0), 200.0, 40));

    // Keep x <= -10: nothing without inflation.
    let clip = [vector3(-1.0, 0.0, -10.0)];
    assert!(select(&path, &clip, &SelectionInflation::DEFAULT, false).is_empty());

    let item_space = SelectionInflation::DEFAULT.with_item_space_distance(20.0);
    assert!(!select(&path, &clip, &item_space, false).is_empty());

    let pixel_space = SelectionInflation::DEFAULT.with_pixel_space_distance(20.0);
    assert!(!select(&path, &clip, &pixel_space, false).is_empty());
}

#[test]
fn miter_hunting_uses_join_boxes() {
    let path = PartitionedTessellatedPath::new(&square(point(0.0, 0.0), 200.0, 40));

    // The joins sit on the corners: keep 50 <= x <= 150 and 50 <= y <= 150,
    // which no corner reaches.
    let clip = [
        vector3(1.0, 0.0, -50.0),
        vector3(-1.0, 0.0, 150.0),
        vector3(0.0, 1.0, -50.0),
        vector3(0.0, -1.0, 150.0),
    ];
    assert!(select(&path, &clip, &SelectionInflation::DEFAULT, true).is_empty());

    let short = SelectionInflation::DEFAULT.with_item_space_distance_miter_joins(40.0);
    assert!(select(&path, &clip, &short, true).is_empty());

    // Miter tips reaching 60 units past a corner get into the clip box.
    let miter = SelectionInflation::DEFAULT.with_item_space_distance_miter_joins(60.0);
    let join_subsets = select(&path, &clip, &miter, true);
    assert!(!join_subsets.is_empty());
    for id in &join_subsets {
        assert!(!path.subset(*id).join_bounding_box().is_empty());
    }
}

#[test]
fn custom_builder_input() {
    let mut builder = SubsetBuilder::new();
    for row in 0..8 {
        builder.start_chain(None);
        for i in 0..10 {
            let y = row as f32 * 10.0;
            builder.add_segment(Segment::line(point(i as f32, y), point(i as f32 + 1.0, y)));
        }
    }

    let path = PartitionedTessellatedPath::from_builder(
        builder,
        &PartitionOptions::DEFAULT.with_split_threshold(20).with_max_depth(1),
    );

    assert!(path.number_subsets() > 1);
    assert!(path.subsets().iter().all(|s| s.depth() <= 2));
    assert!(path.root_subset().join_bounding_box().is_empty());
}
