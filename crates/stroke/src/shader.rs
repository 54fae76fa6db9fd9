use crate::{Packing, ShaderVariant};

/// A shader handle and the optional shader that must first render the
/// coverage buffer.
///
/// Handles are opaque: the writer only passes them back to the caller.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serialization", derive(Serialize, Deserialize))]
pub struct ShaderBinding<H> {
    pub shader: H,
    pub coverage_shader: Option<H>,
}

impl<H> ShaderBinding<H> {
    pub fn new(shader: H) -> Self {
        ShaderBinding {
            shader,
            coverage_shader: None,
        }
    }

    pub fn with_coverage_shader(mut self, coverage_shader: H) -> Self {
        self.coverage_shader = Some(coverage_shader);
        self
    }

    pub fn requires_coverage_buffer(&self) -> bool {
        self.coverage_shader.is_some()
    }
}

/// The stroking shaders, one per packing and shader variant.
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serialization", derive(Serialize, Deserialize))]
pub struct StrokeShaderSet<H> {
    // Indexed by packing, then variant.
    bindings: [[Option<ShaderBinding<H>>; 2]; 2],
}

impl<H> StrokeShaderSet<H> {
    pub fn new() -> Self {
        StrokeShaderSet {
            bindings: [[None, None], [None, None]],
        }
    }

    pub fn with_shader(mut self, packing: Packing, variant: ShaderVariant, binding: ShaderBinding<H>) -> Self {
        self.set_shader(packing, variant, binding);
        self
    }

    pub fn set_shader(&mut self, packing: Packing, variant: ShaderVariant, binding: ShaderBinding<H>) {
        self.bindings[packing.index()][variant.index()] = Some(binding);
    }

    pub fn shader(&self, packing: Packing, variant: ShaderVariant) -> Option<&ShaderBinding<H>> {
        self.bindings[packing.index()][variant.index()].as_ref()
    }
}

impl<H> Default for StrokeShaderSet<H> {
    fn default() -> Self {
        Self::new()
    }
}

#[test]
fn shader_lookup() {
    let shaders = StrokeShaderSet::new()
        .with_shader(Packing::Linear, ShaderVariant::Antialiased, ShaderBinding::new(1u32))
        .with_shader(Packing::Arc, ShaderVariant::Antialiased, ShaderBinding::new(2).with_coverage_shader(3));

    assert_eq!(shaders.shader(Packing::Linear, ShaderVariant::Antialiased).map(|b| b.shader), Some(1));
    assert!(shaders.shader(Packing::Linear, ShaderVariant::NonAntialiased).is_none());
    let arc = shaders.shader(Packing::Arc, ShaderVariant::Antialiased);
    assert_eq!(arc.map(|b| b.requires_coverage_buffer()), Some(true));
}
