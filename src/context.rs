//! GPU context initialization and adapter selection.
//!
//! This module provides a thin wrapper around wgpu's instance, adapter,
//! device and queue objects.  Creating a [`GpuContext`] instantiates
//! the GPU and prepares it for compute workloads.  The constructor
//! hides the asynchronous nature of requesting an adapter and device by
//! blocking on the futures with the [`pollster`] crate.
//!
//! By default the highest-throughput adapter on the system is chosen
//! (wgpu's `HighPerformance` power preference).  Callers can instead
//! pin a specific adapter by index into the list returned by
//! [`list_adapters`], which is how the binary's `--adapter` flag works.

use wgpu::{Adapter, AdapterInfo, Device, Instance, Queue};

/// Enumerate every adapter wgpu can see across all backends.
///
/// The indices of the returned descriptions are the values accepted by
/// [`GpuContext::new_blocking`] for explicit adapter selection.
pub fn list_adapters() -> Vec<AdapterInfo> {
    let instance = Instance::new(&wgpu::InstanceDescriptor::default());
    instance
        .enumerate_adapters(wgpu::Backends::all())
        .iter()
        .map(Adapter::get_info)
        .collect()
}

/// A GPU context encapsulates all state needed to submit compute work.
///
/// The context holds on to the `Instance`, `Adapter`, `Device` and
/// `Queue`.  Those types have internal reference counting so they can
/// cheaply be cloned if you need multiple references.  If no adapter is
/// available, or the selected one does not support compute shaders, an
/// error is returned.
pub struct GpuContext {
    /// The global GPU instance.  Headless compute still needs it to
    /// request an adapter.
    pub instance: Instance,
    /// The physical device selected for computation.
    pub adapter: Adapter,
    /// Logical device used to create resources and command encoders.
    pub device: Device,
    /// Command submission queue used to send recorded command buffers
    /// to the GPU.
    pub queue: Queue,
}

impl GpuContext {
    /// Create a new GPU context synchronously.
    ///
    /// With `adapter_index: None` the default high-performance adapter
    /// is requested; `Some(i)` selects the i-th entry of
    /// [`list_adapters`] instead.  Blocks the current thread while the
    /// asynchronous adapter and device requests finish.
    pub fn new_blocking(adapter_index: Option<usize>) -> Result<Self, String> {
        // In wgpu 26 the instance is constructed via an
        // `InstanceDescriptor`; the default enables all supported
        // backends.
        let instance = Instance::new(&wgpu::InstanceDescriptor::default());
        let adapter = match adapter_index {
            Some(index) => {
                let mut adapters = instance.enumerate_adapters(wgpu::Backends::all());
                if index >= adapters.len() {
                    return Err(format!(
                        "adapter index {index} out of range: {} adapter(s) available",
                        adapters.len()
                    ));
                }
                adapters.swap_remove(index)
            }
            None => {
                // No surface involved: this is a headless tool, so the
                // power preference alone drives the choice.
                pollster::block_on(instance.request_adapter(&wgpu::RequestAdapterOptions {
                    power_preference: wgpu::PowerPreference::HighPerformance,
                    ..Default::default()
                }))
                .map_err(|e| format!("unable to find a suitable GPU adapter: {e}"))?
            }
        };
        let info = adapter.get_info();
        log::info!("using adapter \"{}\" ({:?})", info.name, info.backend);
        // Downlevel devices may not support compute on all backends;
        // abort early if unsupported.
        let capabilities = adapter.get_downlevel_capabilities();
        if !capabilities.flags.contains(wgpu::DownlevelFlags::COMPUTE_SHADERS) {
            return Err(format!(
                "adapter \"{}\" does not support compute shaders",
                info.name
            ));
        }
        // Request a logical device and queue.  In wgpu 26 the
        // `DeviceDescriptor` explicitly separates required features and
        // limits.  We require no special features and use downlevel
        // defaults for limits; `Trace::Off` disables GPU trace capture.
        let (device, queue) = pollster::block_on(adapter.request_device(&wgpu::DeviceDescriptor {
            label: Some("transpose_device"),
            required_features: wgpu::Features::empty(),
            required_limits: wgpu::Limits::downlevel_defaults(),
            memory_hints: wgpu::MemoryHints::MemoryUsage,
            trace: wgpu::Trace::Off,
        }))
        .map_err(|e| format!("failed to create GPU device: {e}"))?;

        Ok(Self {
            instance,
            adapter,
            device,
            queue,
        })
    }

    /// Block until every previously submitted command buffer has
    /// finished executing on the device.
    ///
    /// Kernel launches are asynchronous with respect to the host, so
    /// timing code must call this before stopping its clock and before
    /// reading results back.
    pub fn wait_idle(&self) -> Result<(), String> {
        self.device
            .poll(wgpu::PollType::Wait)
            .map(|_| ())
            .map_err(|e| format!("device polling failed: {e}"))
    }
}
