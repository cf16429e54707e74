//! WGSL source for the two transpose kernels.
//!
//! Both shaders see the same bindings: a read-only storage buffer with
//! the row-major `W x H` input at binding 0 and a read/write storage
//! buffer for the `H x W` output at binding 1.  The matrix dimensions
//! are baked into the source as constants, so the generators return an
//! owned `String` per matrix size.

/// Side length of a square tile, and of each kernel's workgroup.
pub const TILE_SIZE: usize = 16;

/// Entry point name of the naive kernel.
pub const NAIVE_ENTRY: &str = "transpose_naive";

/// Entry point name of the tiled kernel.
pub const TILED_ENTRY: &str = "transpose_tiled";

/// One invocation per element, no staging.
///
/// Consecutive invocations along x read consecutive input addresses
/// (coalesced) but write addresses `H` elements apart, which is exactly
/// the scattered pattern the tiled kernel exists to avoid.
pub fn naive_wgsl(width: usize, height: usize) -> String {
    format!(
        r#"
const W: u32 = {width}u;
const H: u32 = {height}u;

@group(0) @binding(0) var<storage, read>       inp: array<f32>;
@group(0) @binding(1) var<storage, read_write> outp: array<f32>;

@compute @workgroup_size({TILE_SIZE}, {TILE_SIZE})
fn {NAIVE_ENTRY}(@builtin(global_invocation_id) gid: vec3<u32>) {{
    let x = gid.x;
    let y = gid.y;
    if (x >= W || y >= H) {{
        return;
    }}
    outp[y + x * H] = inp[x + y * W];
}}
"#
    )
}

/// Tile-staged transpose with a padded workgroup tile.
///
/// The tile's row stride is `TILE + 1`: workgroup memory is banked by
/// column index, and without the extra column the column-wise reads
/// after the barrier would all hit one bank and serialize.
///
/// Out-of-bounds invocations skip their loads and stores but still
/// execute `workgroupBarrier()` — every invocation in a workgroup must
/// reach the barrier or behavior is undefined, so there is no early
/// return anywhere above it.
pub fn tiled_wgsl(width: usize, height: usize) -> String {
    let stride = TILE_SIZE + 1;
    format!(
        r#"
const W: u32 = {width}u;
const H: u32 = {height}u;
const TILE: u32 = {TILE_SIZE}u;
const TILE_STRIDE: u32 = {stride}u; // padded row stride

@group(0) @binding(0) var<storage, read>       inp: array<f32>;
@group(0) @binding(1) var<storage, read_write> outp: array<f32>;

var<workgroup> tile: array<f32, TILE_STRIDE * TILE>;

@compute @workgroup_size({TILE_SIZE}, {TILE_SIZE})
fn {TILED_ENTRY}(@builtin(local_invocation_id) lid: vec3<u32>,
                 @builtin(workgroup_id)        wid: vec3<u32>) {{
    // Coalesced read: local coordinates are not transposed here.
    let x = wid.x * TILE + lid.x;
    let y = wid.y * TILE + lid.y;
    if (x < W && y < H) {{
        tile[lid.x + lid.y * TILE_STRIDE] = inp[x + y * W];
    }}

    workgroupBarrier();

    // Coalesced write: swap the workgroup's grid coordinates and read
    // the tile at transposed local coordinates.
    let tx = wid.y * TILE + lid.x;
    let ty = wid.x * TILE + lid.y;
    if (tx < H && ty < W) {{
        outp[tx + ty * H] = tile[lid.y + lid.x * TILE_STRIDE];
    }}
}}
"#
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn shaders_bake_in_dimensions() {
        let naive = naive_wgsl(256, 4096);
        assert!(naive.contains("const W: u32 = 256u;"));
        assert!(naive.contains("const H: u32 = 4096u;"));
        assert!(naive.contains(NAIVE_ENTRY));

        let tiled = tiled_wgsl(256, 4096);
        assert!(tiled.contains("const TILE: u32 = 16u;"));
        assert!(tiled.contains("const TILE_STRIDE: u32 = 17u;"));
        assert!(tiled.contains("workgroupBarrier()"));
        assert!(tiled.contains(TILED_ENTRY));
    }
}
