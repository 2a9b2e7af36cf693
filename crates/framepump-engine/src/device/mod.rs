//! GPU device + surface management.
//!
//! Only what a host needs to present frames into a window:
//! - creating the wgpu Instance/Adapter/Device/Queue
//! - creating & configuring the Surface (swapchain)
//! - acquiring frames and presenting a cleared target

mod error;
mod gpu;
mod init;
mod surface;
mod window_gpu;

pub use error::SurfaceErrorAction;
pub use gpu::{Gpu, GpuFrame};
pub use init::GpuInit;
pub use window_gpu::WindowGpu;
