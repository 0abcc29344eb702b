use candle_core::Device;

use crate::error::{PipelineError, Result};

/// Where the model should run. Resolved to a concrete device at build time.
#[derive(Debug, Clone, Default)]
pub enum DeviceRequest {
    /// CPU inference (default).
    #[default]
    Cpu,
    /// CUDA GPU by index.
    Cuda(usize),
}

impl DeviceRequest {
    pub fn resolve(self) -> Result<Device> {
        match self {
            DeviceRequest::Cpu => Ok(Device::Cpu),
            DeviceRequest::Cuda(i) => Device::new_cuda(i).map_err(|e| {
                PipelineError::Device(format!(
                    "Failed to init CUDA device {i}: {e}. Try CPU as fallback."
                ))
            }),
        }
    }
}
