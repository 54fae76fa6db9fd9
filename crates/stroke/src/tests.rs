use crate::geom::math::{point, vector, vector3};
use crate::geom::{Cap, ClipMatrix, Join, Segment, TessellatedPath};
use crate::partition::{
    PartitionOptions, PartitionedTessellatedPath, SelectionInflation, SubsetBuilder,
    SubsetSelection,
};
use crate::stroked_point::{self, StrokedPoint};
use crate::*;

use alloc::vec::Vec;
use core::f32::consts::PI;

type Writer<'l> = StrokingAttributeWriter<'l, &'static str>;

fn shaders() -> StrokeShaderSet<&'static str> {
    StrokeShaderSet::new()
        .with_shader(Packing::Linear, ShaderVariant::Antialiased, ShaderBinding::new("linear"))
        .with_shader(
            Packing::Arc,
            ShaderVariant::Antialiased,
            ShaderBinding::new("arc").with_coverage_shader("arc-coverage"),
        )
        .with_shader(Packing::Linear, ShaderVariant::NonAntialiased, ShaderBinding::new("linear-aliased"))
}

// One chain of five segments, one join and two caps, in a single subset.
fn small_path() -> PartitionedTessellatedPath {
    let points = [
        point(0.0, 0.0),
        point(10.0, 0.0),
        point(20.0, 5.0),
        point(30.0, 5.0),
        point(40.0, 0.0),
        point(50.0, 0.0),
    ];

    let mut builder = SubsetBuilder::new();
    builder.start_chain(None);
    for pair in points.windows(2) {
        builder.add_segment(Segment::line(pair[0], pair[1]));
    }
    builder.add_join(Join::new(points[2], vector(1.0, 0.5).normalize(), vector(1.0, 0.0)));
    builder.add_cap(Cap::new(points[0], vector(-1.0, 0.0), true));
    builder.add_cap(Cap::new(points[5], vector(1.0, 0.0), false));

    PartitionedTessellatedPath::from_builder(builder, &PartitionOptions::DEFAULT)
}

// An open zig-zag of `n` two-segment edges, ending with an arc.
fn large_path(n: u32) -> TessellatedPath {
    let mut builder = TessellatedPath::builder();
    let mut from = point(0.0, 0.0);
    builder.begin(from);
    for i in 0..n {
        let to = point((i + 1) as f32 * 20.0, if i % 2 == 0 { 15.0 } else { 0.0 });
        builder.line_to(from.lerp(to, 0.3));
        builder.line_to(to);
        builder.end_edge();
        from = to;
    }
    builder.arc_to(point(n as f32 * 20.0, 40.0), 25.0, -PI * 0.5..PI * 0.5);
    builder.end(false);

    builder.build()
}

fn select_all(path: &PartitionedTessellatedPath) -> SubsetSelection {
    let mut selection = SubsetSelection::new();
    path.select_subsets(
        &[],
        &ClipMatrix::IDENTITY,
        vector(1.0, 1.0),
        &SelectionInflation::DEFAULT,
        false,
        &mut selection,
    );

    selection
}

struct Session {
    attributes: Vec<PainterAttribute>,
    indices: Vec<Index>,
    calls: usize,
    shaders: Vec<Option<&'static str>>,
}

// Runs a whole session with buffers of the given sizes, concatenating the
// output as if it went to one large buffer.
fn run(writer: &Writer, attribute_capacity: usize, index_capacity: usize) -> Session {
    let mut session = Session {
        attributes: Vec::new(),
        indices: Vec::new(),
        calls: 0,
        shaders: Vec::new(),
    };

    let mut attributes = alloc::vec![PainterAttribute::default(); attribute_capacity];
    let mut indices = alloc::vec![0; index_capacity];
    let mut state = WriteState::new();
    let mut more = writer.initialize_state(&mut state);
    while more {
        session.shaders.push(state.shader_override().map(|s| s.shader));
        let result = writer
            .write_data(
                &mut attributes,
                &mut indices,
                session.attributes.len() as Index,
                &mut state,
            )
            .unwrap();
        assert!(result.attributes_written > 0);
        session.attributes.extend_from_slice(&attributes[..result.attributes_written]);
        session.indices.extend_from_slice(&indices[..result.indices_written]);
        session.calls += 1;
        more = result.more;
        assert!(session.calls < 100_000);
    }
    assert!(state.is_done());
    assert_eq!(state.depth(), 0);

    session
}

#[test]
fn small_path_session() {
    let path = small_path();
    assert_eq!(path.number_subsets(), 1);
    let selection = select_all(&path);
    let shaders = shaders();

    let mut writer = Writer::new();
    let method = StrokingMethod::DEFAULT
        .with_join_style(JoinStyle::Bevel)
        .with_cap_style(CapStyle::Square);
    writer.set_source(&selection, &shaders, &method, Packing::Linear, ShaderVariant::Antialiased, true);

    let mut state = WriteState::new();
    assert!(writer.initialize_state(&mut state));
    assert_eq!(state.depth(), 4);
    assert_eq!(writer.total_depth(), 4);
    assert_eq!(state.phase(), DrawPhase::Edges);
    assert_eq!(state.shader_override().map(|s| s.shader), Some("linear"));
    assert!(!writer.requires_coverage_buffer());

    let chain_size = stroked_point::chain_size(&path.root_subset().chain(0));
    assert_eq!(state.min_attributes_for_next(), chain_size.attributes);
    assert_eq!(state.min_indices_for_next(), chain_size.indices);

    let mut attributes = alloc::vec![PainterAttribute::default(); 1000];
    let mut indices = alloc::vec![0; 1000];

    // Edges first, and the call stops at the end of the phase.
    let result = writer.write_data(&mut attributes, &mut indices, 0, &mut state).unwrap();
    assert_eq!(result.attributes_written, chain_size.attributes);
    assert_eq!(result.indices_written, chain_size.indices);
    assert!(result.more);
    assert_eq!(state.phase(), DrawPhase::Joins);
    assert_eq!(state.depth(), 3);
    assert!(attributes[..result.attributes_written]
        .iter()
        .all(|a| StrokedPoint::unpack(a).depth() == 3));

    let result = writer.write_data(&mut attributes, &mut indices, 0, &mut state).unwrap();
    assert_eq!((result.attributes_written, result.indices_written), (3, 3));
    assert_eq!(state.phase(), DrawPhase::Caps);
    assert_eq!(state.depth(), 2);

    let result = writer.write_data(&mut attributes, &mut indices, 0, &mut state).unwrap();
    assert_eq!((result.attributes_written, result.indices_written), (10, 18));
    assert!(!result.more);
    assert_eq!(state.depth(), 0);
    assert!(state.shader_override().is_none());

    // Once done, nothing else is written.
    let result = writer.write_data(&mut attributes, &mut indices, 0, &mut state).unwrap();
    assert_eq!(result.attributes_written, 0);
    assert!(!result.more);
}

#[test]
fn chunking_does_not_change_the_output() {
    let path = PartitionedTessellatedPath::with_options(
        &large_path(60),
        &PartitionOptions::DEFAULT.with_split_threshold(8),
    );
    assert!(path.number_subsets() > 1);
    let selection = select_all(&path);
    let shaders = shaders();

    for &(packing, join_style, cap_style) in &[
        (Packing::Linear, JoinStyle::Rounded, CapStyle::Square),
        (Packing::Linear, JoinStyle::MiterClip, CapStyle::Rounded),
        (Packing::Arc, JoinStyle::Rounded, CapStyle::Rounded),
        (Packing::Arc, JoinStyle::Miter, CapStyle::Square),
    ] {
        let mut writer = Writer::new();
        let method = StrokingMethod::DEFAULT
            .with_join_style(join_style)
            .with_cap_style(cap_style);
        writer.set_source(&selection, &shaders, &method, packing, ShaderVariant::Antialiased, true);

        let whole = run(&writer, 1 << 16, 1 << 17);
        assert_eq!(whole.calls, 3);

        let max = writer.max_item_size();
        for &extra in &[0, 7, 100] {
            let chunked = run(&writer, max.attributes + extra, max.indices + extra);
            assert!(chunked.calls > whole.calls);
            assert_eq!(chunked.attributes, whole.attributes);
            assert_eq!(chunked.indices, whole.indices);
        }

        let total: usize = DrawPhase::ALL
            .iter()
            .map(|phase| writer.phase_size(*phase).attributes)
            .sum();
        assert_eq!(whole.attributes.len(), total);
        assert!(whole.indices.iter().all(|i| (*i as usize) < total));
    }
}

#[test]
fn depth_strictly_decreases() {
    let path = PartitionedTessellatedPath::with_options(
        &large_path(30),
        &PartitionOptions::DEFAULT.with_split_threshold(8),
    );
    let selection = select_all(&path);

    let mut writer = Writer::new();
    let method = StrokingMethod::DEFAULT
        .with_join_style(JoinStyle::MiterBevel)
        .with_cap_style(CapStyle::Rounded);
    writer.set_source(&selection, &shaders(), &method, Packing::Linear, ShaderVariant::Antialiased, true);

    let session = run(&writer, 300, 600);
    let depths: Vec<u32> = session
        .attributes
        .iter()
        .map(|a| StrokedPoint::unpack(a).depth())
        .collect();

    assert_eq!(depths[0], writer.total_depth() - 1);
    assert_eq!(depths[depths.len() - 1], 0);
    for pair in depths.windows(2) {
        assert!(pair[0] == pair[1] || pair[0] == pair[1] + 1);
    }

    let items: usize = DrawPhase::ALL.iter().map(|phase| writer.items(*phase).count()).sum();
    assert_eq!(items as u32, writer.total_depth());
}

#[test]
fn phases_switch_shaders() {
    let path = PartitionedTessellatedPath::new(&large_path(10));
    let selection = select_all(&path);

    let mut writer = Writer::new();
    let method = StrokingMethod::DEFAULT
        .with_join_style(JoinStyle::Bevel)
        .with_cap_style(CapStyle::Rounded);
    writer.set_source(&selection, &shaders(), &method, Packing::Arc, ShaderVariant::Antialiased, true);

    // Bevels are polygonal: only the edges and the rounded caps use arcs.
    assert_eq!(writer.phase_packing(DrawPhase::Edges), Some(Packing::Arc));
    assert_eq!(writer.phase_packing(DrawPhase::Joins), Some(Packing::Linear));
    assert_eq!(writer.phase_packing(DrawPhase::Caps), Some(Packing::Arc));
    assert!(writer.requires_coverage_buffer());

    let session = run(&writer, 1 << 14, 1 << 15);
    assert_eq!(session.shaders, &[Some("arc"), Some("linear"), Some("arc")]);

    // The non-antialiased arc shader is missing.
    writer.set_source(&selection, &shaders(), &method, Packing::Arc, ShaderVariant::NonAntialiased, true);
    let session = run(&writer, 1 << 14, 1 << 15);
    assert_eq!(session.shaders, &[None, Some("linear-aliased"), None]);
}

#[test]
fn skipped_phases() {
    let path = small_path();
    let selection = select_all(&path);
    let shaders = shaders();
    let mut writer = Writer::new();

    // Flat caps and no joins: only the edges.
    let method = StrokingMethod::DEFAULT
        .with_join_style(JoinStyle::NoJoins)
        .with_cap_style(CapStyle::Flat);
    writer.set_source(&selection, &shaders, &method, Packing::Linear, ShaderVariant::Antialiased, true);
    assert_eq!(writer.total_depth(), 1);
    assert_eq!(writer.items(DrawPhase::Joins).count(), 0);
    assert_eq!(writer.items(DrawPhase::Caps).count(), 0);
    assert_eq!(run(&writer, 1000, 1000).calls, 1);

    // No edges: the session starts with the joins.
    let method = StrokingMethod::DEFAULT.with_cap_style(CapStyle::Square);
    writer.set_source(&selection, &shaders, &method, Packing::Linear, ShaderVariant::Antialiased, false);
    let mut state = WriteState::new();
    assert!(writer.initialize_state(&mut state));
    assert_eq!(state.phase(), DrawPhase::Joins);
    assert_eq!(state.depth(), 3);

    // Nothing at all.
    let method = StrokingMethod::DEFAULT
        .with_join_style(JoinStyle::NoJoins)
        .with_cap_style(CapStyle::Flat);
    writer.set_source(&selection, &shaders, &method, Packing::Linear, ShaderVariant::Antialiased, false);
    assert!(!writer.initialize_state(&mut state));
    assert!(state.is_done());
}

#[test]
fn adjustable_caps_are_packed_linearly() {
    let path = small_path();
    let selection = select_all(&path);
    let method = StrokingMethod::DEFAULT
        .with_join_style(JoinStyle::NoJoins)
        .with_cap_style(CapStyle::Adjustable);
    let mut writer = Writer::new();
    writer.set_source(&selection, &shaders(), &method, Packing::Arc, ShaderVariant::Antialiased, true);

    assert_eq!(writer.phase_packing(DrawPhase::Caps), Some(Packing::Linear));
    assert_eq!(writer.phase_size(DrawPhase::Caps), PackingSize::new(12, 24));
    assert_eq!(writer.total_depth(), 3);

    let session = run(&writer, 1000, 1000);
    assert_eq!(session.shaders, &[Some("arc"), Some("linear")]);

    let caps = &session.attributes[session.attributes.len() - 12..];
    for (i, attribute) in caps.iter().enumerate() {
        let pt = StrokedPoint::unpack(attribute);
        assert_eq!(pt.offset_type(), Some(stroked_point::OffsetType::AdjustableCap));
        let end_contour = pt.packed_data & StrokedPoint::CAP_IS_END_CONTOUR_MASK != 0;
        assert_eq!(end_contour, i >= 6);
    }
}

#[test]
fn buffer_too_small() {
    let path = small_path();
    let selection = select_all(&path);
    let mut writer = Writer::new();
    writer.set_source(
        &selection,
        &shaders(),
        &StrokingMethod::DEFAULT,
        Packing::Linear,
        ShaderVariant::Antialiased,
        true,
    );

    let mut state = WriteState::new();
    writer.initialize_state(&mut state);
    let saved = state.clone();

    let mut attributes = alloc::vec![PainterAttribute::default(); 4];
    let mut indices = alloc::vec![0; 4];
    let result = writer.write_data(&mut attributes, &mut indices, 0, &mut state);
    assert_eq!(
        result,
        Err(WriteError::BufferTooSmall {
            required_attributes: saved.min_attributes_for_next(),
            required_indices: saved.min_indices_for_next(),
            available_attributes: 4,
            available_indices: 4,
        })
    );
    assert_eq!(state, saved);
    assert!(attributes.iter().all(|a| *a == PainterAttribute::default()));
}

#[test]
fn index_overflow() {
    let path = small_path();
    let selection = select_all(&path);
    let mut writer = Writer::new();
    writer.set_source(
        &selection,
        &shaders(),
        &StrokingMethod::DEFAULT,
        Packing::Linear,
        ShaderVariant::Antialiased,
        true,
    );

    let mut state = WriteState::new();
    writer.initialize_state(&mut state);
    let mut attributes = alloc::vec![PainterAttribute::default(); 1000];
    let mut indices = alloc::vec![0; 1000];
    let result = writer.write_data(&mut attributes, &mut indices, Index::MAX - 10, &mut state);
    assert_eq!(result, Err(WriteError::IndexOverflow));
}

#[test]
fn miter_joins_follow_the_join_subsets() {
    let source = large_path(40);
    let path = PartitionedTessellatedPath::with_options(
        &source,
        &PartitionOptions::DEFAULT.with_split_threshold(8),
    );

    // Keep x <= 200.
    let clip = [vector3(-1.0, 0.0, 200.0)];
    let mut miters = SubsetSelection::new();
    let inflation = SelectionInflation::DEFAULT.with_item_space_distance_miter_joins(50.0);
    path.select_subsets(&clip, &ClipMatrix::IDENTITY, vector(1.0, 1.0), &inflation, true, &mut miters);
    assert!(miters.has_separate_join_subsets());

    let shaders = shaders();
    let method = StrokingMethod::DEFAULT.with_join_style(JoinStyle::Miter);
    let mut writer = Writer::new();
    writer.set_source(&miters, &shaders, &method, Packing::Linear, ShaderVariant::Antialiased, true);

    let expected: usize = miters.join_subsets().map(|s| s.joins().len()).sum();
    assert_eq!(writer.items(DrawPhase::Joins).count(), expected);
    assert!(expected < source.joins().len());
    assert!(writer
        .items(DrawPhase::Joins)
        .all(|item| matches!(item, DrawnItem::Join(_))));

    let session = run(&writer, 2000, 4000);
    assert!(!session.attributes.is_empty());
}
