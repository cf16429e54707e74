//! Building and launching the transpose pipelines.
//!
//! A [`TransposePass`] owns everything needed to run one of the two
//! kernels over a fixed input buffer: the compiled shader module, bind
//! group, pipeline, output buffer and a staging buffer for readback.
//! Creating the pass is the expensive part; launching it again is
//! cheap, which is what makes the warm-up-then-measure loop in
//! [`TransposePass::time`] meaningful.
//!
//! Launches are asynchronous on the GPU side.  Every blocking entry
//! point here ends with a full device sync, so callers never observe a
//! half-finished launch.

use std::num::NonZeroU64;
use std::time::{Duration, Instant};

use wgpu::{ShaderModuleDescriptor, ShaderSource};

use crate::buffer::GpuBuffer;
use crate::context::GpuContext;
use crate::kernels::{self, TILE_SIZE};

/// Which of the two transpose implementations to run.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Kernel {
    /// One element per invocation, scattered global writes.
    Naive,
    /// Tile staging in padded workgroup memory, coalesced reads and
    /// writes.
    Tiled,
}

impl Kernel {
    /// Human-readable name used in console output and buffer labels.
    pub fn name(self) -> &'static str {
        match self {
            Kernel::Naive => "naive",
            Kernel::Tiled => "tiled",
        }
    }

    fn wgsl(self, width: usize, height: usize) -> String {
        match self {
            Kernel::Naive => kernels::naive_wgsl(width, height),
            Kernel::Tiled => kernels::tiled_wgsl(width, height),
        }
    }

    fn entry_point(self) -> &'static str {
        match self {
            Kernel::Naive => kernels::NAIVE_ENTRY,
            Kernel::Tiled => kernels::TILED_ENTRY,
        }
    }
}

/// A compiled transpose pipeline bound to one input/output buffer pair.
pub struct TransposePass {
    kernel: Kernel,
    pipeline: wgpu::ComputePipeline,
    bind_group: wgpu::BindGroup,
    output: GpuBuffer<f32>,
    staging: GpuBuffer<f32>,
    groups_x: u32,
    groups_y: u32,
}

/// Ceiling division for workgroup counts.
fn groups_for(extent: usize) -> u32 {
    ((extent + TILE_SIZE - 1) / TILE_SIZE) as u32
}

impl TransposePass {
    /// Compile `kernel` for a `width x height` input and bind it to
    /// `input`, which must hold exactly `width * height` elements.
    ///
    /// The output buffer is allocated here with the same element count
    /// as the input; the transpose swaps the logical dimensions, never
    /// the size.
    pub fn new(
        context: &GpuContext,
        kernel: Kernel,
        input: &GpuBuffer<f32>,
        width: usize,
        height: usize,
    ) -> Result<Self, String> {
        if input.len != width * height {
            return Err(format!(
                "input buffer holds {} elements, expected {width} x {height} = {}",
                input.len,
                width * height
            ));
        }
        let device = &context.device;
        // Any WGSL syntax error surfaces at module creation.
        let module = device.create_shader_module(ShaderModuleDescriptor {
            label: Some(kernel.name()),
            source: ShaderSource::Wgsl(kernel.wgsl(width, height).into()),
        });
        let output = GpuBuffer::<f32>::output(context, input.len, "transpose_output");
        let staging = GpuBuffer::<f32>::staging(context, input.len, "transpose_staging");
        // Two bindings: read-only input at 0, read/write output at 1.
        let element_size = NonZeroU64::new(std::mem::size_of::<f32>() as u64).unwrap();
        let bind_group_layout = device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
            label: Some("transpose_bind_group_layout"),
            entries: &[
                wgpu::BindGroupLayoutEntry {
                    binding: 0,
                    visibility: wgpu::ShaderStages::COMPUTE,
                    ty: wgpu::BindingType::Buffer {
                        ty: wgpu::BufferBindingType::Storage { read_only: true },
                        has_dynamic_offset: false,
                        min_binding_size: Some(element_size),
                    },
                    count: None,
                },
                wgpu::BindGroupLayoutEntry {
                    binding: 1,
                    visibility: wgpu::ShaderStages::COMPUTE,
                    ty: wgpu::BindingType::Buffer {
                        ty: wgpu::BufferBindingType::Storage { read_only: false },
                        has_dynamic_offset: false,
                        min_binding_size: Some(element_size),
                    },
                    count: None,
                },
            ],
        });
        let bind_group = device.create_bind_group(&wgpu::BindGroupDescriptor {
            label: Some("transpose_bind_group"),
            layout: &bind_group_layout,
            entries: &[
                wgpu::BindGroupEntry {
                    binding: 0,
                    resource: input.buffer.as_entire_binding(),
                },
                wgpu::BindGroupEntry {
                    binding: 1,
                    resource: output.buffer.as_entire_binding(),
                },
            ],
        });
        let pipeline_layout = device.create_pipeline_layout(&wgpu::PipelineLayoutDescriptor {
            label: Some("transpose_pipeline_layout"),
            bind_group_layouts: &[&bind_group_layout],
            push_constant_ranges: &[],
        });
        let pipeline = device.create_compute_pipeline(&wgpu::ComputePipelineDescriptor {
            label: Some(kernel.name()),
            layout: Some(&pipeline_layout),
            module: &module,
            entry_point: Some(kernel.entry_point()),
            compilation_options: wgpu::PipelineCompilationOptions::default(),
            cache: None,
        });
        Ok(Self {
            kernel,
            pipeline,
            bind_group,
            output,
            staging,
            // One workgroup per tile; the grid may overshoot the matrix,
            // the shaders guard for that.
            groups_x: groups_for(width),
            groups_y: groups_for(height),
        })
    }

    /// Record `launches` back-to-back dispatches into one command
    /// buffer and submit it.  Does not wait for completion.
    fn submit_launches(&self, context: &GpuContext, launches: u32) {
        let mut encoder = context
            .device
            .create_command_encoder(&wgpu::CommandEncoderDescriptor {
                label: Some("transpose_encoder"),
            });
        {
            let mut cpass = encoder.begin_compute_pass(&wgpu::ComputePassDescriptor {
                label: Some(self.kernel.name()),
                timestamp_writes: None,
            });
            cpass.set_pipeline(&self.pipeline);
            cpass.set_bind_group(0, &self.bind_group, &[]);
            for _ in 0..launches {
                cpass.dispatch_workgroups(self.groups_x, self.groups_y, 1);
            }
        }
        context.queue.submit([encoder.finish()]);
    }

    /// Run the kernel once and block until the device is idle.
    pub fn launch_blocking(&self, context: &GpuContext) -> Result<(), String> {
        self.submit_launches(context, 1);
        context.wait_idle()
    }

    /// Measure the average launch time over `iterations` runs.
    ///
    /// One untimed warm-up launch absorbs first-use costs (pipeline
    /// compilation on some backends, cache population) so the timed
    /// region reflects steady state.  The timer stops only after a full
    /// device sync; without it we would measure launch overhead rather
    /// than execution.
    pub fn time(&self, context: &GpuContext, iterations: u32) -> Result<Duration, String> {
        self.launch_blocking(context)?;
        let iterations = iterations.max(1);
        let start = Instant::now();
        self.submit_launches(context, iterations);
        context.wait_idle()?;
        let elapsed = start.elapsed();
        log::debug!(
            "{}: {} launches in {:?}",
            self.kernel.name(),
            iterations,
            elapsed
        );
        Ok(elapsed / iterations)
    }

    /// Copy the output buffer into the staging buffer and read it back.
    ///
    /// The returned vector is the transposed matrix in row-major order
    /// (width and height swapped relative to the input).
    pub fn read_output(&self, context: &GpuContext) -> Result<Vec<f32>, String> {
        let mut encoder = context
            .device
            .create_command_encoder(&wgpu::CommandEncoderDescriptor {
                label: Some("transpose_readback_encoder"),
            });
        encoder.copy_buffer_to_buffer(
            &self.output.buffer,
            0,
            &self.staging.buffer,
            0,
            self.output.byte_len(),
        );
        context.queue.submit([encoder.finish()]);
        self.staging.read_to_vec(context)
    }
}
