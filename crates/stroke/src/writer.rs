use crate::arc_stroked_point as arc;
use crate::attribute::{PackingSize, PainterAttribute};
use crate::error::WriteError;
use crate::geom::{Cap, Join, SegmentChain};
use crate::partition::SubsetSelection;
use crate::shader::{ShaderBinding, StrokeShaderSet};
use crate::stroked_point::{self as linear, CapType};
use crate::{CapStyle, Index, JoinStyle, Packing, ShaderVariant, StrokingMethod};

use alloc::vec::Vec;
use core::ops::Range;

/// The phases of a stroke, in drawing order.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serialization", derive(Serialize, Deserialize))]
pub enum DrawPhase {
    Edges,
    Joins,
    Caps,
    /// Everything was written.
    Done,
}

impl DrawPhase {
    pub const ALL: [DrawPhase; 3] = [DrawPhase::Edges, DrawPhase::Joins, DrawPhase::Caps];

    fn index(self) -> Option<usize> {
        match self {
            DrawPhase::Edges => Some(0),
            DrawPhase::Joins => Some(1),
            DrawPhase::Caps => Some(2),
            DrawPhase::Done => None,
        }
    }

    fn next(self) -> Self {
        match self {
            DrawPhase::Edges => DrawPhase::Joins,
            DrawPhase::Joins => DrawPhase::Caps,
            DrawPhase::Caps | DrawPhase::Done => DrawPhase::Done,
        }
    }
}

/// One unit of output: it is either written entirely or not at all.
#[derive(Copy, Clone, Debug, PartialEq)]
pub enum DrawnItem<'l> {
    Chain(SegmentChain<'l>),
    Join(&'l Join),
    Cap(&'l Cap),
}

#[derive(Copy, Clone, Debug)]
struct SizedItem<'l> {
    item: DrawnItem<'l>,
    size: PackingSize,
}

#[derive(Clone, Debug)]
struct SubsetItems {
    subset: u32,
    items: Range<usize>,
}

struct PhaseItems<'l, H> {
    packing: Packing,
    items: Vec<SizedItem<'l>>,
    // Only subsets with at least one item.
    subsets: Vec<SubsetItems>,
    size: PackingSize,
    shader: Option<ShaderBinding<H>>,
}

impl<'l, H> PhaseItems<'l, H> {
    fn new() -> Self {
        PhaseItems {
            packing: Packing::Linear,
            items: Vec::new(),
            subsets: Vec::new(),
            size: PackingSize::ZERO,
            shader: None,
        }
    }

    fn clear(&mut self) {
        self.packing = Packing::Linear;
        self.items.clear();
        self.subsets.clear();
        self.size = PackingSize::ZERO;
        self.shader = None;
    }

    fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    fn push(&mut self, item: DrawnItem<'l>, size: PackingSize) {
        self.size += size;
        self.items.push(SizedItem { item, size });
    }

    /// Closes the items pushed since `start` as the items of `subset`.
    fn end_subset(&mut self, subset: u32, start: usize) {
        let end = self.items.len();
        if end > start {
            self.subsets.push(SubsetItems {
                subset,
                items: start..end,
            });
        }
    }

    fn item(&self, subset: usize, item: usize) -> Option<&SizedItem<'l>> {
        let range = &self.subsets.get(subset)?.items;
        if item >= range.len() {
            return None;
        }

        self.items.get(range.start + item)
    }

    /// Depth consumed by the phase: one unit per item.
    fn depth_range(&self) -> u32 {
        self.items.len() as u32
    }
}

/// Resumable cursor of a write session.
///
/// The state is owned by the caller and passed to every
/// [`write_data`](StrokingAttributeWriter::write_data) call. It can be cloned
/// to save and restore a position in the session.
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serialization", derive(Serialize, Deserialize))]
pub struct WriteState<H> {
    phase: DrawPhase,
    subset: usize,
    item: usize,
    depth: u32,
    min_attributes_for_next: usize,
    min_indices_for_next: usize,
    shader_override: Option<ShaderBinding<H>>,
}

impl<H> WriteState<H> {
    /// A state with nothing left to draw. Call
    /// [`initialize_state`](StrokingAttributeWriter::initialize_state) to
    /// start a session.
    pub fn new() -> Self {
        WriteState {
            phase: DrawPhase::Done,
            subset: 0,
            item: 0,
            depth: 0,
            min_attributes_for_next: 0,
            min_indices_for_next: 0,
            shader_override: None,
        }
    }

    pub fn phase(&self) -> DrawPhase {
        self.phase
    }

    /// Position of the current subset among the subsets of the phase that
    /// have items.
    pub fn subset(&self) -> usize {
        self.subset
    }

    /// Position of the next item in the current subset.
    pub fn item(&self) -> usize {
        self.item
    }

    /// The depth budget left: the depth of the last written item.
    pub fn depth(&self) -> u32 {
        self.depth
    }

    /// Number of attributes the next item needs.
    pub fn min_attributes_for_next(&self) -> usize {
        self.min_attributes_for_next
    }

    /// Number of indices the next item needs.
    pub fn min_indices_for_next(&self) -> usize {
        self.min_indices_for_next
    }

    /// The shaders to bind before drawing the data of the current phase.
    ///
    /// Changes when a phase ends, which always coincides with the end of a
    /// [`write_data`](StrokingAttributeWriter::write_data) call.
    pub fn shader_override(&self) -> Option<&ShaderBinding<H>> {
        self.shader_override.as_ref()
    }

    pub fn is_done(&self) -> bool {
        self.phase == DrawPhase::Done
    }
}

impl<H> Default for WriteState<H> {
    fn default() -> Self {
        Self::new()
    }
}

/// What a [`write_data`](StrokingAttributeWriter::write_data) call produced.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub struct WriteResult {
    pub attributes_written: usize,
    pub indices_written: usize,
    /// False once every phase is exhausted.
    pub more: bool,
}

/// Streams the stroking geometry of a [`SubsetSelection`] into fixed-size
/// buffers.
///
/// The items of every phase are gathered and measured once in
/// [`set_source`](Self::set_source). A session then starts with
/// [`initialize_state`](Self::initialize_state) and continues with calls to
/// [`write_data`](Self::write_data) until it reports that there is no more
/// data. Each call writes as many whole items as fit and stops at the end of
/// a phase so that the caller can switch shaders.
pub struct StrokingAttributeWriter<'l, H> {
    phases: [PhaseItems<'l, H>; 3],
    method: StrokingMethod,
    cap_type: CapType,
    total_depth: u32,
    max_item_size: PackingSize,
}

impl<'l, H: Clone> StrokingAttributeWriter<'l, H> {
    pub fn new() -> Self {
        StrokingAttributeWriter {
            phases: [PhaseItems::new(), PhaseItems::new(), PhaseItems::new()],
            method: StrokingMethod::DEFAULT,
            cap_type: CapType::Square,
            total_depth: 0,
            max_item_size: PackingSize::ZERO,
        }
    }

    /// Gathers and measures the items to draw.
    ///
    /// - Edges are drawn with `packing` when `draw_edges` is set.
    /// - Joins come from the join subsets of the selection. They use arc
    ///   packing only when `packing` is arc and the joins are rounded.
    ///   `JoinStyle::NoJoins` skips them.
    /// - Caps use arc packing only when `packing` is arc and the caps are
    ///   rounded. `CapStyle::Flat` skips them.
    ///
    /// Each phase is bound to the shader of its packing and `variant`.
    pub fn set_source(
        &mut self,
        selection: &SubsetSelection<'l>,
        shaders: &StrokeShaderSet<H>,
        method: &StrokingMethod,
        packing: Packing,
        variant: ShaderVariant,
        draw_edges: bool,
    ) {
        for phase in &mut self.phases {
            phase.clear();
        }
        self.method = *method;
        self.total_depth = 0;
        self.max_item_size = PackingSize::ZERO;

        let path = match selection.source() {
            Some(path) => path,
            None => return,
        };
        let threshold = method.tessellation_threshold;

        if draw_edges {
            let phase = &mut self.phases[0];
            phase.packing = packing;
            for &id in selection.subset_ids() {
                let start = phase.items.len();
                for chain in path.subset(id).segment_chains() {
                    if chain.is_empty() {
                        continue;
                    }
                    let size = match packing {
                        Packing::Linear => linear::chain_size(&chain),
                        Packing::Arc => arc::chain_size(&chain),
                    };
                    phase.push(DrawnItem::Chain(chain), size);
                }
                phase.end_subset(id, start);
            }
        }

        if method.join_style != JoinStyle::NoJoins {
            let phase = &mut self.phases[1];
            phase.packing = method.join_packing(packing);
            for &id in selection.join_subset_ids() {
                let start = phase.items.len();
                for join in path.subset(id).joins() {
                    let size = match phase.packing {
                        Packing::Linear => linear::join_size(method.join_style, join, threshold),
                        Packing::Arc => arc::join_size(join),
                    };
                    phase.push(DrawnItem::Join(join), size);
                }
                phase.end_subset(id, start);
            }
        }

        let cap_type = match method.cap_style {
            CapStyle::Flat => None,
            CapStyle::Square => Some(CapType::Square),
            CapStyle::Rounded => Some(CapType::Rounded),
            CapStyle::Adjustable => Some(CapType::Adjustable),
        };
        if let Some(cap_type) = cap_type {
            self.cap_type = cap_type;
            let phase = &mut self.phases[2];
            phase.packing = method.cap_packing(packing);
            for &id in selection.subset_ids() {
                let start = phase.items.len();
                for cap in path.subset(id).caps() {
                    let size = match phase.packing {
                        Packing::Linear => linear::cap_size(cap_type, threshold),
                        Packing::Arc => arc::cap_size(),
                    };
                    phase.push(DrawnItem::Cap(cap), size);
                }
                phase.end_subset(id, start);
            }
        }

        for (phase, kind) in self.phases.iter_mut().zip(DrawPhase::ALL.iter()) {
            if phase.is_empty() {
                continue;
            }
            phase.shader = shaders.shader(phase.packing, variant).cloned();
            if phase.shader.is_none() {
                log::warn!("No {:?} {:?} shader for the {:?} phase", phase.packing, variant, kind);
            }
            for item in &phase.items {
                self.max_item_size.attributes = self.max_item_size.attributes.max(item.size.attributes);
                self.max_item_size.indices = self.max_item_size.indices.max(item.size.indices);
            }
            self.total_depth += phase.depth_range();
        }

        log::debug!(
            "stroking source: {} chains, {} joins, {} caps, depth range {}",
            self.phases[0].items.len(),
            self.phases[1].items.len(),
            self.phases[2].items.len(),
            self.total_depth,
        );
    }

    /// Whether a bound phase shader needs a coverage buffer pass.
    pub fn requires_coverage_buffer(&self) -> bool {
        self.phases.iter().any(|phase| {
            phase
                .shader
                .as_ref()
                .map_or(false, ShaderBinding::requires_coverage_buffer)
        })
    }

    /// Sum of the depth ranges of all items.
    pub fn total_depth(&self) -> u32 {
        self.total_depth
    }

    /// The largest attribute and index counts of a single item. Buffers at
    /// least this large never fail with [`WriteError::BufferTooSmall`].
    pub fn max_item_size(&self) -> PackingSize {
        self.max_item_size
    }

    /// Total attribute and index counts of a phase.
    pub fn phase_size(&self, phase: DrawPhase) -> PackingSize {
        phase
            .index()
            .map_or(PackingSize::ZERO, |i| self.phases[i].size)
    }

    /// The packing a phase is written with.
    pub fn phase_packing(&self, phase: DrawPhase) -> Option<Packing> {
        phase.index().map(|i| self.phases[i].packing)
    }

    /// The items of a phase, in drawing order.
    pub fn items(&self, phase: DrawPhase) -> impl Iterator<Item = DrawnItem<'l>> + '_ {
        let items: &[SizedItem<'l>] = match phase.index() {
            Some(i) => &self.phases[i].items,
            None => &[],
        };

        items.iter().map(|item| item.item)
    }

    /// Starts a session. Returns false when there is nothing to draw.
    pub fn initialize_state(&self, state: &mut WriteState<H>) -> bool {
        state.depth = self.total_depth;
        self.enter_phase(state, DrawPhase::Edges)
    }

    /// Moves the state to the first non-empty phase starting at `phase`.
    fn enter_phase(&self, state: &mut WriteState<H>, mut phase: DrawPhase) -> bool {
        while let Some(i) = phase.index() {
            if !self.phases[i].is_empty() {
                break;
            }
            phase = phase.next();
        }

        state.phase = phase;
        state.subset = 0;
        state.item = 0;
        state.shader_override = phase.index().and_then(|i| self.phases[i].shader.clone());
        self.update_next_size(state);

        phase != DrawPhase::Done
    }

    fn update_next_size(&self, state: &mut WriteState<H>) {
        let size = state
            .phase
            .index()
            .and_then(|i| self.phases[i].item(state.subset, state.item))
            .map_or(PackingSize::ZERO, |item| item.size);
        state.min_attributes_for_next = size.attributes;
        state.min_indices_for_next = size.indices;
    }

    /// Writes whole items into `attributes` and `indices` until either the
    /// next item does not fit or the current phase ends.
    ///
    /// Indices refer to attributes as if `attributes` started at
    /// `attrib_offset`. Each item's depth budget is taken off the state
    /// before the item is written, so the depth of the items strictly
    /// decreases over a session.
    ///
    /// Fails without writing anything if the first pending item does not fit
    /// or if its indices would overflow.
    pub fn write_data(
        &self,
        attributes: &mut [PainterAttribute],
        indices: &mut [Index],
        attrib_offset: Index,
        state: &mut WriteState<H>,
    ) -> Result<WriteResult, WriteError> {
        let mut written = PackingSize::ZERO;
        let phase_index = match state.phase.index() {
            Some(i) => i,
            None => return Ok(result(written, false)),
        };
        let phase = &self.phases[phase_index];

        loop {
            let item = match phase.item(state.subset, state.item) {
                Some(item) => *item,
                None => {
                    // Stale state: the source changed under it.
                    let more = self.enter_phase(state, state.phase.next());
                    return Ok(result(written, more));
                }
            };

            let available_attributes = attributes.len() - written.attributes;
            let available_indices = indices.len() - written.indices;
            if !item.size.fits(available_attributes, available_indices) {
                if written.is_empty() {
                    log::warn!(
                        "Buffer too small for the next {:?} item of subset {}: {:?}",
                        state.phase,
                        phase.subsets[state.subset].subset,
                        item.size
                    );
                    return Err(WriteError::BufferTooSmall {
                        required_attributes: item.size.attributes,
                        required_indices: item.size.indices,
                        available_attributes,
                        available_indices,
                    });
                }
                return Ok(result(written, true));
            }

            let end = written.attributes + item.size.attributes;
            if attrib_offset as u64 + end as u64 > Index::MAX as u64 + 1 {
                if written.is_empty() {
                    return Err(WriteError::IndexOverflow);
                }
                return Ok(result(written, true));
            }
            let index_adjust = attrib_offset + written.attributes as Index;

            state.depth = state.depth.saturating_sub(1);
            self.pack_item(
                phase.packing,
                &item.item,
                state.depth,
                &mut attributes[written.attributes..end],
                &mut indices[written.indices..written.indices + item.size.indices],
                index_adjust,
            );
            written += item.size;

            state.item += 1;
            if state.item >= phase.subsets[state.subset].items.len() {
                state.item = 0;
                state.subset += 1;
                if state.subset >= phase.subsets.len() {
                    let more = self.enter_phase(state, state.phase.next());
                    log::trace!(
                        "end of phase {}: {:?} written, next {:?}",
                        phase_index,
                        written,
                        state.phase
                    );
                    return Ok(result(written, more));
                }
            }
            self.update_next_size(state);
        }
    }

    fn pack_item(
        &self,
        packing: Packing,
        item: &DrawnItem,
        depth: u32,
        attributes: &mut [PainterAttribute],
        indices: &mut [Index],
        index_adjust: Index,
    ) {
        let threshold = self.method.tessellation_threshold;
        match (*item, packing) {
            (DrawnItem::Chain(chain), Packing::Linear) => {
                linear::pack_chain(&chain, depth, attributes, indices, index_adjust)
            }
            (DrawnItem::Chain(chain), Packing::Arc) => {
                arc::pack_chain(&chain, depth, attributes, indices, index_adjust)
            }
            (DrawnItem::Join(join), Packing::Linear) => linear::pack_join(
                self.method.join_style,
                join,
                threshold,
                depth,
                attributes,
                indices,
                index_adjust,
            ),
            (DrawnItem::Join(join), Packing::Arc) => {
                arc::pack_join(join, depth, attributes, indices, index_adjust)
            }
            (DrawnItem::Cap(cap), Packing::Linear) => linear::pack_cap(
                self.cap_type,
                cap,
                threshold,
                depth,
                attributes,
                indices,
                index_adjust,
            ),
            (DrawnItem::Cap(cap), Packing::Arc) => {
                arc::pack_cap(cap, depth, attributes, indices, index_adjust)
            }
        }
    }
}

impl<'l, H: Clone> Default for StrokingAttributeWriter<'l, H> {
    fn default() -> Self {
        Self::new()
    }
}

fn result(written: PackingSize, more: bool) -> WriteResult {
    WriteResult {
        attributes_written: written.attributes,
        indices_written: written.indices,
        more,
    }
}
