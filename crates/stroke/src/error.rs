/// An error returned by [`StrokingAttributeWriter::write_data`](crate::StrokingAttributeWriter::write_data).
///
/// Nothing is written to the destination buffers when an error is returned.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub enum WriteError {
    /// The destination buffers cannot hold the next pending item.
    ///
    /// Buffers must be at least as large as the largest item, see
    /// [`StrokingAttributeWriter::max_item_size`](crate::StrokingAttributeWriter::max_item_size).
    BufferTooSmall {
        required_attributes: usize,
        required_indices: usize,
        available_attributes: usize,
        available_indices: usize,
    },
    /// The vertex indices no longer fit in an [`Index`](crate::Index).
    IndexOverflow,
}

#[cfg(feature = "std")]
impl core::fmt::Display for WriteError {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match self {
            WriteError::BufferTooSmall {
                required_attributes,
                required_indices,
                available_attributes,
                available_indices,
            } => {
                std::write!(
                    f,
                    "Buffer too small: the next item needs {} attributes and {} indices, got {} and {}",
                    required_attributes,
                    required_indices,
                    available_attributes,
                    available_indices,
                )
            }
            WriteError::IndexOverflow => {
                std::write!(f, "Index overflow")
            }
        }
    }
}

#[cfg(feature = "std")]
impl std::error::Error for WriteError {}
