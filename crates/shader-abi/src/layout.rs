//! Slot registry shared by the host and the shader build.
//!
//! The discriminants are the ABI. The host maps them onto wgpu concepts
//! (`MeshPositions`/`MeshGenerics` are vertex buffer slots and their
//! attributes' shader locations; `Uniforms`/`PlaneUniforms`/
//! `EncodingUniforms` are bind group bindings), and the WGSL source declares
//! the same numbers. Never duplicate these values anywhere else.

/// Buffer slots. Within the namespace the values are unique and contiguous
/// from zero; they never change once a shader has been built against them.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(u32)]
pub enum BufferIndex {
    MeshPositions = 0,
    MeshGenerics = 1,
    Uniforms = 2,
    PlaneUniforms = 3,
    EncodingUniforms = 4,
}

impl BufferIndex {
    pub const ALL: [BufferIndex; 5] = [
        BufferIndex::MeshPositions,
        BufferIndex::MeshGenerics,
        BufferIndex::Uniforms,
        BufferIndex::PlaneUniforms,
        BufferIndex::EncodingUniforms,
    ];

    /// Stable slot index for this role.
    #[inline]
    pub const fn slot(self) -> u32 {
        self as u32
    }
}

/// Vertex attribute shader locations.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(u32)]
pub enum VertexAttribute {
    Position = 0,
    Texcoord = 1,
}

impl VertexAttribute {
    pub const ALL: [VertexAttribute; 2] = [VertexAttribute::Position, VertexAttribute::Texcoord];

    #[inline]
    pub const fn slot(self) -> u32 {
        self as u32
    }
}

/// Texture slots.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(u32)]
pub enum TextureIndex {
    Color = 0,
}

impl TextureIndex {
    pub const ALL: [TextureIndex; 1] = [TextureIndex::Color];

    #[inline]
    pub const fn slot(self) -> u32 {
        self as u32
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn assert_contiguous_from_zero(slots: &[u32]) {
        for (i, &s) in slots.iter().enumerate() {
            assert_eq!(s, i as u32, "slot {} out of order", i);
        }
    }

    #[test]
    fn buffer_slots_are_stable_and_contiguous() {
        let slots: Vec<u32> = BufferIndex::ALL.iter().map(|b| b.slot()).collect();
        assert_contiguous_from_zero(&slots);

        // Pin the exact values the shaders were built against.
        assert_eq!(BufferIndex::MeshPositions.slot(), 0);
        assert_eq!(BufferIndex::MeshGenerics.slot(), 1);
        assert_eq!(BufferIndex::Uniforms.slot(), 2);
        assert_eq!(BufferIndex::PlaneUniforms.slot(), 3);
        assert_eq!(BufferIndex::EncodingUniforms.slot(), 4);
    }

    #[test]
    fn vertex_attribute_slots_are_stable_and_contiguous() {
        let slots: Vec<u32> = VertexAttribute::ALL.iter().map(|a| a.slot()).collect();
        assert_contiguous_from_zero(&slots);
        assert_eq!(VertexAttribute::Position.slot(), 0);
        assert_eq!(VertexAttribute::Texcoord.slot(), 1);
    }

    #[test]
    fn texture_slots_are_stable() {
        assert_eq!(TextureIndex::Color.slot(), 0);
    }
}
