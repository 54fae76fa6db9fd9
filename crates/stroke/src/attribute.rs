use crate::Index;

/// One vertex as consumed by the stroking shaders.
///
/// Floating point values are stored as their bit patterns.
#[repr(C)]
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, Hash, bytemuck::Pod, bytemuck::Zeroable)]
#[cfg_attr(feature = "serialization", derive(Serialize, Deserialize))]
pub struct PainterAttribute {
    pub attrib0: [u32; 4],
    pub attrib1: [u32; 4],
    pub attrib2: [u32; 4],
}

#[inline]
pub(crate) fn pack_vec4(x: f32, y: f32, z: f32, w: f32) -> [u32; 4] {
    [x.to_bits(), y.to_bits(), z.to_bits(), w.to_bits()]
}

#[inline]
pub(crate) fn unpack_vec4(v: [u32; 4]) -> [f32; 4] {
    [
        f32::from_bits(v[0]),
        f32::from_bits(v[1]),
        f32::from_bits(v[2]),
        f32::from_bits(v[3]),
    ]
}

/// The exact number of attributes and indices an item is packed into.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serialization", derive(Serialize, Deserialize))]
pub struct PackingSize {
    pub attributes: usize,
    pub indices: usize,
}

impl PackingSize {
    pub const ZERO: Self = PackingSize {
        attributes: 0,
        indices: 0,
    };

    #[inline]
    pub const fn new(attributes: usize, indices: usize) -> Self {
        PackingSize {
            attributes,
            indices,
        }
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.attributes == 0 && self.indices == 0
    }

    /// Returns true if both counts fit in the given capacities.
    #[inline]
    pub fn fits(&self, attributes: usize, indices: usize) -> bool {
        self.attributes <= attributes && self.indices <= indices
    }
}

impl core::ops::Add for PackingSize {
    type Output = Self;
    fn add(self, other: Self) -> Self {
        PackingSize {
            attributes: self.attributes + other.attributes,
            indices: self.indices + other.indices,
        }
    }
}

impl core::ops::AddAssign for PackingSize {
    fn add_assign(&mut self, other: Self) {
        self.attributes += other.attributes;
        self.indices += other.indices;
    }
}

/// Cursor over the destination slices of one item.
///
/// Indices are pushed relative to the item's first vertex and offset by
/// `index_adjust` on the way out.
pub(crate) struct AttributeSink<'a> {
    attributes: &'a mut [PainterAttribute],
    indices: &'a mut [Index],
    vertex: usize,
    index: usize,
    index_adjust: Index,
}

impl<'a> AttributeSink<'a> {
    pub fn new(
        attributes: &'a mut [PainterAttribute],
        indices: &'a mut [Index],
        index_adjust: Index,
    ) -> Self {
        AttributeSink {
            attributes,
            indices,
            vertex: 0,
            index: 0,
            index_adjust,
        }
    }

    /// Local index of the next vertex.
    #[inline]
    pub fn vertex(&self) -> Index {
        self.vertex as Index
    }

    #[inline]
    pub fn push_vertex(&mut self, attribute: PainterAttribute) {
        self.attributes[self.vertex] = attribute;
        self.vertex += 1;
    }

    #[inline]
    pub fn push_index(&mut self, local: Index) {
        self.indices[self.index] = local + self.index_adjust;
        self.index += 1;
    }

    #[inline]
    pub fn push_triangle(&mut self, a: Index, b: Index, c: Index) {
        self.push_index(a);
        self.push_index(b);
        self.push_index(c);
    }

    /// Fan over the local vertices `begin..end`, pivoting on `begin`.
    pub fn push_triangle_fan(&mut self, begin: Index, end: Index) {
        let n = crate::geom::utils::write_triangle_fan(
            begin + self.index_adjust,
            end + self.index_adjust,
            &mut self.indices[self.index..],
        );
        self.index += n;
    }

    /// Reverses the indices written since `start`.
    pub fn reverse_indices_from(&mut self, start: usize) {
        self.indices[start..self.index].reverse();
    }

    #[inline]
    pub fn written(&self) -> PackingSize {
        PackingSize::new(self.vertex, self.index)
    }
}

#[test]
fn sink_offsets_indices() {
    let mut attributes = [PainterAttribute::default(); 4];
    let mut indices = [0; 6];
    let mut sink = AttributeSink::new(&mut attributes, &mut indices, 10);
    for _ in 0..4 {
        sink.push_vertex(PainterAttribute::default());
    }
    sink.push_triangle_fan(0, 4);
    assert_eq!(sink.written(), PackingSize::new(4, 6));
    sink.reverse_indices_from(0);
    assert_eq!(indices, [13, 12, 10, 12, 11, 10]);
}

#[test]
fn attribute_is_plain_data() {
    let attribute = PainterAttribute {
        attrib0: pack_vec4(1.0, -2.0, 0.5, 0.0),
        attrib1: [0; 4],
        attrib2: [7, 0, 0, 0],
    };
    let bytes: &[u8] = bytemuck::bytes_of(&attribute);
    assert_eq!(bytes.len(), 48);
    assert_eq!(unpack_vec4(attribute.attrib0), [1.0, -2.0, 0.5, 0.0]);
}
