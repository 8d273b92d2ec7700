//! NVIDIA GPU session through NVML (Linux/Windows).
//!
//! The NVML library is loaded at runtime, so a host without the driver
//! simply fails `NvmlSession::init`.

use crate::error::Result;

#[cfg(not(target_os = "macos"))]
mod backend {
    use super::Result;
    use crate::{
        error::CoreError,
        model::{GpuMemory, GpuUtilization},
        platform::{GpuDevice, GpuSession},
    };
    use nvml_wrapper::{enum_wrappers::device::TemperatureSensor, error::NvmlError, Device, Nvml};

    fn gpu_error(err: NvmlError) -> CoreError {
        CoreError::gpu(err.to_string())
    }

    /// Initialized NVML library handle; shut down on drop.
    pub struct NvmlSession {
        nvml: Nvml,
    }

    impl NvmlSession {
        pub fn init() -> Result<Self> {
            let nvml = Nvml::init().map_err(|e| match e {
                NvmlError::LibloadingError(_) | NvmlError::DriverNotLoaded => {
                    CoreError::source_unavailable(format!("NVML: {e}"))
                }
                other => gpu_error(other),
            })?;

            Ok(Self { nvml })
        }
    }

    impl GpuSession for NvmlSession {
        fn device_count(&self) -> Result<u32> {
            self.nvml.device_count().map_err(gpu_error)
        }

        fn device(&self, index: u32) -> Result<Box<dyn GpuDevice + '_>> {
            let device = self.nvml.device_by_index(index).map_err(gpu_error)?;
            Ok(Box::new(NvmlDevice { device }))
        }
    }

    struct NvmlDevice<'nvml> {
        device: Device<'nvml>,
    }

    impl GpuDevice for NvmlDevice<'_> {
        fn name(&self) -> Result<String> {
            self.device.name().map_err(gpu_error)
        }

        fn uuid(&self) -> Result<String> {
            self.device.uuid().map_err(gpu_error)
        }

        fn memory(&self) -> Result<GpuMemory> {
            let info = self.device.memory_info().map_err(gpu_error)?;
            Ok(GpuMemory {
                total: info.total,
                used: info.used,
                free: info.free,
            })
        }

        fn utilization(&self) -> Result<GpuUtilization> {
            let rates = self.device.utilization_rates().map_err(gpu_error)?;
            Ok(GpuUtilization {
                core: rates.gpu,
                memory: rates.memory,
            })
        }

        fn temperature(&self) -> Result<u32> {
            self.device
                .temperature(TemperatureSensor::Gpu)
                .map_err(gpu_error)
        }

        fn fan_speed(&self) -> Result<u32> {
            self.device.fan_speed(0).map_err(gpu_error)
        }
    }
}

#[cfg(target_os = "macos")]
mod backend {
    use super::Result;
    use crate::{
        error::CoreError,
        platform::{GpuDevice, GpuSession},
    };

    /// NVML does not exist on macOS; `init` always reports the source as absent.
    pub struct NvmlSession;

    impl NvmlSession {
        pub fn init() -> Result<Self> {
            Err(CoreError::unsupported_platform("NVML on macOS"))
        }
    }

    impl GpuSession for NvmlSession {
        fn device_count(&self) -> Result<u32> {
            Ok(0)
        }

        fn device(&self, index: u32) -> Result<Box<dyn GpuDevice + '_>> {
            Err(CoreError::gpu(format!("no device {index}")))
        }
    }
}

pub use backend::NvmlSession;
