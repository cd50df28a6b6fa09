//! Ring allocators for the per-frame uniform blocks.
//!
//! One producer (the frame loop) writes each slot at most once per frame;
//! slots are 256-byte aligned so they can be bound with dynamic offsets.
//! Frame uniforms cycle through `MAX_FRAMES_IN_FLIGHT * 2` slots (one per
//! eye), plane uniforms through `MAX_PLANES_DRAWN` slots.

use shader_abi::{FrameUniforms, PlaneUniform};

/// How many frames may be recorded before the GPU catches up.
pub const MAX_FRAMES_IN_FLIGHT: usize = 3;
/// Stereo.
pub const EYE_COUNT: usize = 2;
/// Upper bound on plane uniform writes per ring cycle.
pub const MAX_PLANES_DRAWN: usize = 512;

/// Byte offset of a frame-uniform slot.
#[inline]
pub fn frame_slot_offset(frame_index: usize, eye: u32) -> u64 {
    debug_assert!(frame_index < MAX_FRAMES_IN_FLIGHT);
    debug_assert!((eye as usize) < EYE_COUNT);
    (FrameUniforms::aligned_size() * (frame_index * EYE_COUNT + eye as usize)) as u64
}

/// Byte offset of a plane-uniform slot.
#[inline]
pub fn plane_slot_offset(slot: usize) -> u64 {
    debug_assert!(slot < MAX_PLANES_DRAWN);
    (PlaneUniform::aligned_size() * slot) as u64
}

/// Ring of frame-uniform slots, one per in-flight frame per eye.
pub struct FrameUniformRing {
    pub buffer: wgpu::Buffer,
    frame_index: usize,
}

impl FrameUniformRing {
    pub fn new(device: &wgpu::Device) -> Self {
        let size = (FrameUniforms::aligned_size() * MAX_FRAMES_IN_FLIGHT * EYE_COUNT) as u64;
        let buffer = device.create_buffer(&wgpu::BufferDescriptor {
            label: Some("Frame Uniform Ring"),
            size,
            usage: wgpu::BufferUsages::UNIFORM | wgpu::BufferUsages::COPY_DST,
            mapped_at_creation: false,
        });
        Self {
            buffer,
            frame_index: 0,
        }
    }

    /// Advances to the next in-flight slot pair. Call once per frame,
    /// before the per-eye writes.
    pub fn begin_frame(&mut self) {
        self.frame_index = (self.frame_index + 1) % MAX_FRAMES_IN_FLIGHT;
    }

    /// Writes this eye's block and returns the dynamic offset to bind.
    pub fn write(&self, queue: &wgpu::Queue, eye: u32, uniforms: &FrameUniforms) -> u32 {
        let offset = frame_slot_offset(self.frame_index, eye);
        queue.write_buffer(&self.buffer, offset, uniforms.as_bytes());
        offset as u32
    }
}

/// Ring of plane-uniform slots. Each `write` takes the next slot; planes
/// written in the same frame land in distinct slots and stay independent.
pub struct PlaneUniformRing {
    pub buffer: wgpu::Buffer,
    next: usize,
}

impl PlaneUniformRing {
    pub fn new(device: &wgpu::Device) -> Self {
        let size = (PlaneUniform::aligned_size() * MAX_PLANES_DRAWN) as u64;
        let buffer = device.create_buffer(&wgpu::BufferDescriptor {
            label: Some("Plane Uniform Ring"),
            size,
            usage: wgpu::BufferUsages::UNIFORM | wgpu::BufferUsages::COPY_DST,
            mapped_at_creation: false,
        });
        Self { buffer, next: 0 }
    }

    /// Writes one plane's block into the next slot and returns the dynamic
    /// offset to bind for its draw.
    pub fn write(&mut self, queue: &wgpu::Queue, uniform: &PlaneUniform) -> u32 {
        let offset = plane_slot_offset(self.next);
        self.next = (self.next + 1) % MAX_PLANES_DRAWN;
        queue.write_buffer(&self.buffer, offset, uniform.as_bytes());
        offset as u32
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    #[test]
    fn frame_slots_are_disjoint_and_aligned() {
        let mut seen = HashSet::new();
        for frame in 0..MAX_FRAMES_IN_FLIGHT {
            for eye in 0..EYE_COUNT as u32 {
                let off = frame_slot_offset(frame, eye);
                assert_eq!(off % 256, 0);
                assert!(seen.insert(off), "offset {off} reused");
            }
        }
        assert_eq!(seen.len(), MAX_FRAMES_IN_FLIGHT * EYE_COUNT);
    }

    #[test]
    fn eyes_of_one_frame_are_adjacent() {
        let aligned = FrameUniforms::aligned_size() as u64;
        for frame in 0..MAX_FRAMES_IN_FLIGHT {
            assert_eq!(
                frame_slot_offset(frame, 1) - frame_slot_offset(frame, 0),
                aligned
            );
        }
    }

    #[test]
    fn plane_slots_are_disjoint_within_a_cycle() {
        let mut seen = HashSet::new();
        for slot in 0..MAX_PLANES_DRAWN {
            let off = plane_slot_offset(slot);
            assert_eq!(off % 256, 0);
            assert!(seen.insert(off));
        }
    }
}
