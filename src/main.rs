//! Driver binary: transpose a matrix with both kernels, validate the
//! tiled result against the CPU reference, and print average timings.

use std::process;

use clap::Parser;

use wgpu_transpose::buffer::GpuBuffer;
use wgpu_transpose::context::{self, GpuContext};
use wgpu_transpose::matrix::Matrix;
use wgpu_transpose::transpose::{Kernel, TransposePass};

/// Absolute tolerance for the output comparison.  A transpose only
/// moves values, so anything beyond exact equality signals a broken
/// kernel rather than rounding.
const VALIDATION_TOLERANCE: f32 = 1e-6;

#[derive(Parser, Debug)]
#[command(name = "wgpu-transpose")]
#[command(about = "Compare naive and tiled GPU matrix transpose kernels")]
struct Args {
    /// Adapter index to use (see --list-adapters); defaults to the
    /// high-performance adapter chosen by wgpu
    #[arg(long)]
    adapter: Option<usize>,

    /// List available adapters and exit
    #[arg(long, default_value_t = false)]
    list_adapters: bool,

    /// Matrix width (number of columns)
    #[arg(long, default_value_t = 256)]
    width: usize,

    /// Matrix height (number of rows)
    #[arg(long, default_value_t = 4096)]
    height: usize,

    /// Timed launches per kernel
    #[arg(long, default_value_t = 100)]
    iterations: u32,
}

fn main() {
    env_logger::init();
    let args = Args::parse();
    // Any host or device error is fatal: report it and stop.  A
    // validation mismatch is a test outcome, not an error.
    if let Err(message) = run(&args) {
        eprintln!("error: {message}");
        process::exit(1);
    }
}

fn run(args: &Args) -> Result<(), String> {
    if args.list_adapters {
        for (index, info) in context::list_adapters().iter().enumerate() {
            println!("{index}: {} ({:?}, {:?})", info.name, info.backend, info.device_type);
        }
        return Ok(());
    }
    if args.width == 0 || args.height == 0 {
        return Err("matrix dimensions must be non-zero".into());
    }

    let context = GpuContext::new_blocking(args.adapter)?;
    println!(
        "Transposing a {} x {} matrix ({} timed launches per kernel)",
        args.width, args.height, args.iterations
    );

    let input = Matrix::sequential(args.width, args.height);
    let input_buffer = GpuBuffer::upload(&context, &input.data, "transpose_input");
    let naive = TransposePass::new(&context, Kernel::Naive, &input_buffer, args.width, args.height)?;
    let tiled = TransposePass::new(&context, Kernel::Tiled, &input_buffer, args.width, args.height)?;

    let naive_avg = naive.time(&context, args.iterations)?;
    let tiled_avg = tiled.time(&context, args.iterations)?;
    println!("naive transpose: {:8.4} ms/launch", naive_avg.as_secs_f64() * 1e3);
    println!("tiled transpose: {:8.4} ms/launch", tiled_avg.as_secs_f64() * 1e3);

    let gpu_output = tiled.read_output(&context)?;
    let reference = input.transposed();
    match reference.first_mismatch(&gpu_output, VALIDATION_TOLERANCE) {
        None => println!("Test PASSED"),
        Some(index) => {
            println!(
                "mismatch at element {index}: expected {}, got {}",
                reference.data[index], gpu_output[index]
            );
            println!("Test FAILED");
        }
    }
    Ok(())
}
