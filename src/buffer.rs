//! Typed GPU buffers and host readback utilities.
//!
//! This module defines a [`GpuBuffer`] wrapper around [`wgpu::Buffer`]
//! that tracks the number of typed elements stored in the buffer and
//! provides the three buffer roles the transpose driver needs: an
//! uploaded input, a shader-writable output, and a mappable staging
//! buffer for readback.  The wrapper does not own any CPU-side copy of
//! the data; it merely references GPU memory.  All interactions with
//! the GPU go through a [`crate::GpuContext`].

use bytemuck::{cast_slice, Pod};
use wgpu::{Buffer, BufferDescriptor, BufferUsages};

use crate::GpuContext;

/// A typed GPU buffer.
///
/// Wraps a `wgpu::Buffer` together with the element count and a
/// phantom type parameter.  The underlying buffer size in bytes is
/// `len * size_of::<T>()`.
pub struct GpuBuffer<T: Pod> {
    pub buffer: Buffer,
    pub len: usize,
    _marker: std::marker::PhantomData<T>,
}

impl<T: Pod> GpuBuffer<T> {
    /// The buffer's size in bytes, as wgpu copy commands want it.
    pub fn byte_len(&self) -> u64 {
        (self.len * std::mem::size_of::<T>()) as u64
    }

    /// Create a read-only storage buffer holding a copy of `data`.
    ///
    /// The contents are uploaded through `Queue::write_buffer`, which
    /// avoids requiring the `MAP_WRITE` usage flag.  Writing
    /// immediately after creation is safe because the GPU has not yet
    /// seen the buffer.
    pub fn upload(context: &GpuContext, data: &[T], label: &str) -> Self {
        let bytes = cast_slice(data);
        let buffer = context.device.create_buffer(&BufferDescriptor {
            label: Some(label),
            size: bytes.len() as u64,
            usage: BufferUsages::STORAGE | BufferUsages::COPY_DST,
            mapped_at_creation: false,
        });
        context.queue.write_buffer(&buffer, 0, bytes);
        Self {
            buffer,
            len: data.len(),
            _marker: std::marker::PhantomData,
        }
    }

    /// Create an uninitialized output buffer of `len` elements.
    ///
    /// The usage flags `STORAGE | COPY_SRC` let a compute shader write
    /// it and a later copy command move it into a staging buffer.
    pub fn output(context: &GpuContext, len: usize, label: &str) -> Self {
        let buffer = context.device.create_buffer(&BufferDescriptor {
            label: Some(label),
            size: (len * std::mem::size_of::<T>()) as u64,
            usage: BufferUsages::STORAGE | BufferUsages::COPY_SRC,
            mapped_at_creation: false,
        });
        Self {
            buffer,
            len,
            _marker: std::marker::PhantomData,
        }
    }

    /// Create a staging buffer of `len` elements for host readback.
    ///
    /// Usage flags are `COPY_DST | MAP_READ`; such a buffer cannot be
    /// bound to a shader, only be the target of a copy and then mapped.
    pub fn staging(context: &GpuContext, len: usize, label: &str) -> Self {
        let buffer = context.device.create_buffer(&BufferDescriptor {
            label: Some(label),
            size: (len * std::mem::size_of::<T>()) as u64,
            usage: BufferUsages::COPY_DST | BufferUsages::MAP_READ,
            mapped_at_creation: false,
        });
        Self {
            buffer,
            len,
            _marker: std::marker::PhantomData,
        }
    }

    /// Read the contents of a staging buffer back to the CPU.
    ///
    /// The buffer must have been created with [`Self::staging`] and
    /// filled by a copy command that has been submitted.  Blocks the
    /// current thread until the GPU has finished writing and the data
    /// is mapped, then unmaps the buffer before returning.
    pub fn read_to_vec(&self, context: &GpuContext) -> Result<Vec<T>, String> {
        let slice = self.buffer.slice(..);
        // The callback is unused because we synchronously poll below.
        slice.map_async(wgpu::MapMode::Read, |_| {});
        context.wait_idle()?;
        let data = slice.get_mapped_range();
        let result: Vec<T> = cast_slice(&data).to_vec();
        // Drop the mapped view before unmapping; it borrows the buffer.
        drop(data);
        self.buffer.unmap();
        Ok(result)
    }
}
