//! Criterion benchmarks comparing the two GPU transpose kernels and
//! the CPU reference.
//!
//! Run with `cargo bench`.  Each GPU measurement covers one dispatch
//! plus the device sync, so it is representative of the real latency
//! of a blocking launch; pipeline and buffer setup happen once outside
//! the measured region.

use criterion::{criterion_group, criterion_main, Criterion};

use wgpu_transpose::{GpuBuffer, GpuContext, Kernel, Matrix, TransposePass};

fn transpose_benchmark(c: &mut Criterion) {
    let context = match GpuContext::new_blocking(None) {
        Ok(context) => context,
        Err(message) => {
            eprintln!("skipping GPU benchmarks: {message}");
            return;
        }
    };
    // Large enough for the access-pattern difference to dominate the
    // fixed launch overhead.
    let input = Matrix::sequential(2048, 2048);
    let buffer = GpuBuffer::upload(&context, &input.data, "bench_input");

    for kernel in [Kernel::Naive, Kernel::Tiled] {
        let pass = TransposePass::new(&context, kernel, &buffer, input.width, input.height)
            .expect("pipeline creation");
        // Warm-up launch outside the measured region.
        pass.launch_blocking(&context).expect("warm-up launch");
        c.bench_function(&format!("gpu {} transpose", kernel.name()), |bencher| {
            bencher.iter(|| pass.launch_blocking(&context).expect("launch"));
        });
    }

    c.bench_function("cpu reference transpose", |bencher| {
        bencher.iter(|| input.transposed());
    });
}

criterion_group!(benches, transpose_benchmark);
criterion_main!(benches);
