use crate::{point2, size2, AtlasError, AtlasPoint, AtlasSize, Padding, RectId, Rectangle};

use alloc::vec::Vec;

const ROOT: u32 = 0;
const NONE: u32 = u32::MAX;

#[derive(Copy, Clone, Debug, PartialEq)]
enum NodeKind {
    Free,
    /// A leaf holding one rectangle at its minimum corner.
    Occupied { slot: u32, size: AtlasSize },
    /// Children are sorted by increasing area.
    Split([u32; 3]),
    Unused { next: u32 },
}

#[derive(Copy, Clone, Debug)]
struct Node {
    min: AtlasPoint,
    size: AtlasSize,
    kind: NodeKind,
}

impl Node {
    fn area(&self) -> i64 {
        self.size.width as i64 * self.size.height as i64
    }

    fn contains(&self, p: AtlasPoint) -> bool {
        p.x >= self.min.x
            && p.y >= self.min.y
            && p.x < self.min.x + self.size.width
            && p.y < self.min.y + self.size.height
    }
}

#[derive(Copy, Clone, Debug)]
struct Slot {
    node: u32,
    rectangle: Option<Rectangle>,
}

/// A tree based rectangle packer over a fixed size plane.
///
/// Each leaf of the tree is either free or holds one rectangle placed at its
/// minimum corner. When a leaf that already holds a rectangle receives a
/// second one, it is split into three children: the existing rectangle and
/// two free nodes along the axis with the most slack. Deleting rectangles
/// merges the three children of a split back into a free leaf once they are
/// all free.
///
/// Rejections are remembered: a request at least as large as the last
/// rejected one in both dimensions fails without walking the tree, until the
/// atlas is cleared. This can reject rectangles that would fit after some
/// deletions.
pub struct RectAtlas {
    nodes: Vec<Node>,
    unused_nodes: u32,
    slots: Vec<Slot>,
    free_slots: Vec<u32>,
    next_serial: u32,
    first_serial: u32,
    last_rejected: Option<AtlasSize>,
    live_rectangles: usize,
}

impl RectAtlas {
    pub fn new(size: AtlasSize) -> Self {
        let mut atlas = RectAtlas {
            nodes: Vec::new(),
            unused_nodes: NONE,
            slots: Vec::new(),
            free_slots: Vec::new(),
            next_serial: 1,
            first_serial: 1,
            last_rejected: None,
            live_rectangles: 0,
        };
        atlas.reset(size);

        atlas
    }

    /// The size of the plane.
    #[inline]
    pub fn size(&self) -> AtlasSize {
        self.nodes[ROOT as usize].size
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.live_rectangles == 0
    }

    /// Number of live rectangles, not counting zero-area ones.
    #[inline]
    pub fn number_rectangles(&self) -> usize {
        self.live_rectangles
    }

    pub fn rectangle(&self, id: RectId) -> Option<&Rectangle> {
        if id.is_empty() {
            return Some(&Rectangle::EMPTY);
        }

        self.slots
            .get(id.index as usize)
            .and_then(|slot| slot.rectangle.as_ref())
            .filter(|rect| rect.id == id)
    }

    pub fn rectangles(&self) -> impl Iterator<Item = &Rectangle> + '_ {
        self.slots.iter().filter_map(|slot| slot.rectangle.as_ref())
    }

    /// Places a rectangle of `size` surrounded by `padding`.
    ///
    /// Returns `None` if there is no room for it. Zero-area requests all get
    /// [`Rectangle::EMPTY`] without touching the tree.
    pub fn add_rectangle(&mut self, size: AtlasSize, padding: &Padding) -> Option<Rectangle> {
        if size.width <= 0 || size.height <= 0 {
            return Some(Rectangle::EMPTY);
        }

        let padded = size2(
            size.width + padding.horizontal(),
            size.height + padding.vertical(),
        );

        if let Some(rejected) = self.last_rejected {
            if padded.width >= rejected.width && padded.height >= rejected.height {
                log::trace!("atlas: {:?} fast rejected (last rejection {:?})", padded, rejected);
                return None;
            }
        }

        let slot = match self.free_slots.last() {
            Some(slot) => *slot,
            None => self.slots.len() as u32,
        };

        let node = match self.add(ROOT, slot, padded) {
            Some(node) => node,
            None => {
                log::trace!("atlas: no room for {:?}", padded);
                self.last_rejected = Some(padded);
                return None;
            }
        };

        let min = self.nodes[node as usize].min;
        let rectangle = Rectangle {
            id: RectId {
                index: slot,
                serial: self.next_serial,
            },
            min,
            size: padded,
            unpadded_min: point2(min.x + padding.left, min.y + padding.top),
            unpadded_size: size,
        };
        self.next_serial += 1;
        self.live_rectangles += 1;

        let entry = Slot {
            node,
            rectangle: Some(rectangle),
        };
        if slot as usize == self.slots.len() {
            self.slots.push(entry);
        } else {
            self.free_slots.pop();
            self.slots[slot as usize] = entry;
        }

        Some(rectangle)
    }

    /// Frees the space of a rectangle.
    ///
    /// Deleting [`RectId::EMPTY`] always succeeds.
    pub fn delete_rectangle(&mut self, id: RectId) -> Result<(), AtlasError> {
        if id.is_empty() {
            return Ok(());
        }

        if id.serial >= self.next_serial || id.serial == 0 {
            return Err(AtlasError::UnknownRectangle);
        }

        let leaf = match self.slots.get(id.index as usize) {
            Some(Slot {
                node,
                rectangle: Some(rect),
            }) if rect.id == id => *node,
            _ if id.serial < self.first_serial => {
                log::warn!("atlas: deleting {:?} which predates the last clear", id);
                return Err(AtlasError::StaleRectangle);
            }
            Some(_) => return Err(AtlasError::StaleRectangle),
            None => return Err(AtlasError::UnknownRectangle),
        };

        let ancestors = self.ancestors(leaf).ok_or(AtlasError::UnknownRectangle)?;

        self.nodes[leaf as usize].kind = NodeKind::Free;
        self.slots[id.index as usize].rectangle = None;
        self.free_slots.push(id.index);
        self.live_rectangles -= 1;

        for &parent in ancestors.iter().rev() {
            let children = match self.nodes[parent as usize].kind {
                NodeKind::Split(children) => children,
                _ => break,
            };

            let all_free = children
                .iter()
                .all(|child| self.nodes[*child as usize].kind == NodeKind::Free);
            if !all_free {
                break;
            }

            for child in &children {
                self.release_node(*child);
            }
            self.nodes[parent as usize].kind = NodeKind::Free;
            log::trace!("atlas: merged node {} back into a free leaf", parent);
        }

        Ok(())
    }

    /// Removes all rectangles. Existing IDs become stale.
    pub fn clear(&mut self) {
        let size = self.size();
        self.reset(size);
    }

    fn reset(&mut self, size: AtlasSize) {
        self.nodes.clear();
        self.nodes.push(Node {
            min: point2(0, 0),
            size,
            kind: NodeKind::Free,
        });
        self.unused_nodes = NONE;
        self.slots.clear();
        self.free_slots.clear();
        self.first_serial = self.next_serial;
        self.last_rejected = None;
        self.live_rectangles = 0;
    }

    /// Returns the leaf the rectangle was placed in.
    fn add(&mut self, index: u32, slot: u32, size: AtlasSize) -> Option<u32> {
        let node = self.nodes[index as usize];
        if size.width > node.size.width || size.height > node.size.height {
            return None;
        }

        match node.kind {
            NodeKind::Free => {
                self.nodes[index as usize].kind = NodeKind::Occupied { slot, size };
                Some(index)
            }
            NodeKind::Occupied {
                slot: existing,
                size: existing_size,
            } => {
                let dx = node.size.width - existing_size.width;
                let dy = node.size.height - existing_size.height;
                let mut split_x = dx >= size.width;
                let mut split_y = dy >= size.height;
                if !split_x && !split_y {
                    return None;
                }
                if split_x && split_y {
                    if dx > dy {
                        split_y = false;
                    } else {
                        split_x = false;
                    }
                }
                debug_assert!(split_x != split_y);

                self.split(index, existing, existing_size, split_x);
                self.add(index, slot, size)
            }
            NodeKind::Split(children) => {
                for child in &children {
                    if let Some(leaf) = self.add(*child, slot, size) {
                        return Some(leaf);
                    }
                }
                None
            }
            NodeKind::Unused { .. } => None,
        }
    }

    // The rectangle keeps the minimum corner. With `split_x` the free space
    // is a column to its right spanning the whole height plus the space
    // below it, otherwise a row below it spanning the whole width plus the
    // space to its right.
    fn split(&mut self, index: u32, slot: u32, rect_size: AtlasSize, split_x: bool) {
        let Node { min, size, .. } = self.nodes[index as usize];

        let rect = self.new_node(min, rect_size, NodeKind::Occupied { slot, size: rect_size });
        self.slots[slot as usize].node = rect;

        let (a, b) = if split_x {
            (
                self.new_node(
                    point2(min.x, min.y + rect_size.height),
                    size2(rect_size.width, size.height - rect_size.height),
                    NodeKind::Free,
                ),
                self.new_node(
                    point2(min.x + rect_size.width, min.y),
                    size2(size.width - rect_size.width, size.height),
                    NodeKind::Free,
                ),
            )
        } else {
            (
                self.new_node(
                    point2(min.x + rect_size.width, min.y),
                    size2(size.width - rect_size.width, rect_size.height),
                    NodeKind::Free,
                ),
                self.new_node(
                    point2(min.x, min.y + rect_size.height),
                    size2(size.width, size.height - rect_size.height),
                    NodeKind::Free,
                ),
            )
        };

        let mut children = [a, b, rect];
        let nodes = &self.nodes;
        children.sort_unstable_by_key(|child| nodes[*child as usize].area());
        self.nodes[index as usize].kind = NodeKind::Split(children);
    }

    // Nodes do not store their parent. Children tile their parent, so the
    // chain is found by descending from the root towards the leaf's corner.
    fn ancestors(&self, leaf: u32) -> Option<Vec<u32>> {
        let target = self.nodes[leaf as usize].min;
        let mut chain = Vec::new();
        let mut current = ROOT;
        while current != leaf {
            let children = match self.nodes[current as usize].kind {
                NodeKind::Split(children) => children,
                _ => return None,
            };
            chain.push(current);
            current = *children
                .iter()
                .find(|child| self.nodes[**child as usize].contains(target))?;
        }

        Some(chain)
    }

    fn new_node(&mut self, min: AtlasPoint, size: AtlasSize, kind: NodeKind) -> u32 {
        let node = Node { min, size, kind };
        let index = self.unused_nodes;
        if index != NONE {
            if let NodeKind::Unused { next } = self.nodes[index as usize].kind {
                self.unused_nodes = next;
                self.nodes[index as usize] = node;
                return index;
            }
        }

        self.nodes.push(node);
        (self.nodes.len() - 1) as u32
    }

    fn release_node(&mut self, index: u32) {
        self.nodes[index as usize].kind = NodeKind::Unused {
            next: self.unused_nodes,
        };
        self.unused_nodes = index;
    }
}

#[cfg(test)]
fn overlap(a: &Rectangle, b: &Rectangle) -> bool {
    let (a_max, b_max) = (a.max(), b.max());
    a.min.x < b_max.x && b.min.x < a_max.x && a.min.y < b_max.y && b.min.y < a_max.y
}

#[cfg(test)]
fn check_layout(atlas: &RectAtlas) {
    let rects: Vec<&Rectangle> = atlas.rectangles().collect();
    assert_eq!(rects.len(), atlas.number_rectangles());
    for (i, a) in rects.iter().enumerate() {
        assert!(a.min.x >= 0 && a.min.y >= 0);
        assert!(a.max().x <= atlas.size().width && a.max().y <= atlas.size().height);
        for b in &rects[i + 1..] {
            assert!(!overlap(a, b), "{:?} overlaps {:?}", a, b);
        }
    }
}

#[cfg(test)]
fn live_nodes(atlas: &RectAtlas) -> usize {
    atlas
        .nodes
        .iter()
        .filter(|node| !matches!(node.kind, NodeKind::Unused { .. }))
        .count()
}

#[test]
fn padding() {
    let mut atlas = RectAtlas::new(size2(64, 64));
    let rect = atlas
        .add_rectangle(size2(10, 12), &Padding::new(1, 2, 3, 4))
        .unwrap();

    assert_eq!(rect.min, point2(0, 0));
    assert_eq!(rect.size, size2(13, 19));
    assert_eq!(rect.unpadded_min, point2(1, 3));
    assert_eq!(rect.unpadded_size, size2(10, 12));
    assert_eq!(atlas.rectangle(rect.id), Some(&rect));
}

#[test]
fn zero_area_rectangles() {
    let mut atlas = RectAtlas::new(size2(16, 16));
    let a = atlas.add_rectangle(size2(0, 10), &Padding::uniform(2)).unwrap();
    let b = atlas.add_rectangle(size2(5, 0), &Padding::ZERO).unwrap();

    assert!(a.is_empty());
    assert_eq!(a, b);
    assert!(atlas.is_empty());
    assert_eq!(live_nodes(&atlas), 1);
    assert_eq!(atlas.delete_rectangle(a.id), Ok(()));
    assert_eq!(atlas.delete_rectangle(a.id), Ok(()));
}

#[test]
fn fill_and_empty() {
    let mut atlas = RectAtlas::new(size2(100, 100));
    let mut ids = Vec::new();
    for _ in 0..100 {
        let rect = atlas.add_rectangle(size2(10, 10), &Padding::ZERO).unwrap();
        ids.push(rect.id);
    }
    check_layout(&atlas);

    for id in &ids {
        atlas.delete_rectangle(*id).unwrap();
    }
    assert!(atlas.is_empty());
    assert_eq!(live_nodes(&atlas), 1);

    let full = atlas.add_rectangle(size2(100, 100), &Padding::ZERO).unwrap();
    assert_eq!(full.min, point2(0, 0));
}

#[test]
fn freed_space_is_reused() {
    let mut atlas = RectAtlas::new(size2(100, 100));
    let mut ids = Vec::new();
    for _ in 0..100 {
        ids.push(atlas.add_rectangle(size2(10, 10), &Padding::ZERO).unwrap().id);
    }

    let mut freed = 0;
    for id in ids.iter().step_by(7) {
        atlas.delete_rectangle(*id).unwrap();
        freed += 1;
    }

    for _ in 0..freed {
        assert!(atlas.add_rectangle(size2(10, 10), &Padding::ZERO).is_some());
    }
    assert_eq!(atlas.number_rectangles(), 100);
    check_layout(&atlas);
}

#[test]
fn mixed_sizes_never_overlap() {
    let mut atlas = RectAtlas::new(size2(512, 512));
    let mut seed: u32 = 7;
    let mut next = move || {
        seed = seed.wrapping_mul(1_103_515_245).wrapping_add(12345);
        (seed >> 16) % 40 + 1
    };

    let mut ids = Vec::new();
    for i in 0..400 {
        let size = size2(next() as i32, next() as i32);
        if let Some(rect) = atlas.add_rectangle(size, &Padding::uniform(1)) {
            ids.push(rect.id);
        }
        if i % 3 == 0 && !ids.is_empty() {
            let id = ids.swap_remove((next() as usize) % ids.len());
            atlas.delete_rectangle(id).unwrap();
        }
    }

    assert!(!ids.is_empty());
    check_layout(&atlas);
}

#[test]
fn rejections_are_remembered() {
    let mut atlas = RectAtlas::new(size2(100, 100));
    let first = atlas.add_rectangle(size2(60, 60), &Padding::ZERO).unwrap();
    assert!(atlas.add_rectangle(size2(60, 60), &Padding::ZERO).is_none());

    // Fits once the first one is gone, but the last rejection was smaller.
    atlas.delete_rectangle(first.id).unwrap();
    assert!(atlas.add_rectangle(size2(70, 70), &Padding::ZERO).is_none());

    // Smaller in one dimension goes through.
    assert!(atlas.add_rectangle(size2(70, 50), &Padding::ZERO).is_some());

    atlas.clear();
    assert!(atlas.add_rectangle(size2(70, 70), &Padding::ZERO).is_some());
}

#[test]
fn delete_errors() {
    let mut atlas = RectAtlas::new(size2(32, 32));
    let a = atlas.add_rectangle(size2(4, 4), &Padding::ZERO).unwrap();
    let b = atlas.add_rectangle(size2(4, 4), &Padding::ZERO).unwrap();

    assert_eq!(atlas.delete_rectangle(a.id), Ok(()));
    assert_eq!(atlas.delete_rectangle(a.id), Err(AtlasError::StaleRectangle));
    assert!(atlas.rectangle(a.id).is_none());

    let never_issued = RectId {
        index: 3,
        serial: 1000,
    };
    assert_eq!(
        atlas.delete_rectangle(never_issued),
        Err(AtlasError::UnknownRectangle)
    );

    atlas.clear();
    assert_eq!(atlas.delete_rectangle(b.id), Err(AtlasError::StaleRectangle));

    // The slot of `b` is reused by a new rectangle with a new ID.
    let c = atlas.add_rectangle(size2(4, 4), &Padding::ZERO).unwrap();
    assert_ne!(c.id, b.id);
    assert_eq!(atlas.delete_rectangle(b.id), Err(AtlasError::StaleRectangle));
    assert_eq!(atlas.delete_rectangle(c.id), Ok(()));
}
