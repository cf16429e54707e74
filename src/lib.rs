//! Matrix transpose on the GPU, two ways.
//!
//! This crate is a small demonstration of how memory-access patterns
//! dominate the performance of bandwidth-bound GPU kernels.  It
//! implements the same operation — transposing a dense row-major `f32`
//! matrix — with two compute shaders:
//!
//! * a **naive** kernel where every invocation reads one element and
//!   writes it straight to its transposed position, leaving the global
//!   writes scattered across memory, and
//! * a **tiled** kernel that stages a square tile in workgroup memory,
//!   barriers, and writes it back transposed so that both the global
//!   reads and the global writes stay coalesced.  The tile is padded by
//!   one column so the column-wise reads do not all land on the same
//!   shared-memory bank.
//!
//! The API is synchronous and blocking: launches wait for the GPU to
//! finish before returning.  The `wgpu-transpose` binary drives both
//! kernels over the same input, validates the tiled output against a
//! CPU reference transpose, and prints average timings.

pub mod buffer;
pub mod context;
pub mod kernels;
pub mod matrix;
pub mod transpose;

// Re‑export the most common types at the crate root so that users can
// simply `use wgpu_transpose::*;`.
pub use buffer::GpuBuffer;
pub use context::GpuContext;
pub use kernels::TILE_SIZE;
pub use matrix::Matrix;
pub use transpose::{Kernel, TransposePass};
