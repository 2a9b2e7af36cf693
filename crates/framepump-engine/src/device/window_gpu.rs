use anyhow::Result;
use ouroboros::self_referencing;
use winit::dpi::PhysicalSize;
use winit::window::Window;

use super::surface::is_drawable;
use super::{Gpu, GpuInit, SurfaceErrorAction};

/// A window together with the GPU context presenting into it.
///
/// `Gpu` borrows the window for its surface, so both live in one
/// self-referencing value and are released together.
#[self_referencing]
pub struct WindowGpu {
    window: Window,

    #[borrows(window)]
    #[covariant]
    gpu: Gpu<'this>,
}

impl WindowGpu {
    /// Takes ownership of `window` and blocks until its GPU context is ready.
    pub fn create(window: Window, init: GpuInit) -> Result<Self> {
        WindowGpu::try_new(window, |w| pollster::block_on(Gpu::new(w, init)))
    }

    pub fn resize(&mut self, new_size: PhysicalSize<u32>) {
        self.with_gpu_mut(|gpu| gpu.resize(new_size));
    }

    /// Clears the whole surface to `color` and presents it.
    ///
    /// A minimized (zero-sized) window skips the frame.
    pub fn clear(&mut self, color: wgpu::Color) -> Result<(), SurfaceErrorAction> {
        self.with_mut(|fields| {
            let gpu = fields.gpu;
            if !is_drawable(gpu.size()) {
                return Err(SurfaceErrorAction::SkipFrame);
            }

            let mut frame = match gpu.begin_frame() {
                Ok(f) => f,
                Err(err) => return Err(gpu.handle_surface_error(err)),
            };

            // Pass is dropped before the encoder moves into submit().
            {
                let _rpass = frame.encoder.begin_render_pass(&wgpu::RenderPassDescriptor {
                    label: Some("framepump clear"),
                    color_attachments: &[Some(wgpu::RenderPassColorAttachment {
                        view: &frame.view,
                        resolve_target: None,
                        ops: wgpu::Operations {
                            load: wgpu::LoadOp::Clear(color),
                            store: wgpu::StoreOp::Store,
                        },
                        depth_slice: None,
                    })],
                    depth_stencil_attachment: None,
                    timestamp_writes: None,
                    occlusion_query_set: None,
                    multiview_mask: None,
                });
            }

            fields.window.pre_present_notify();
            gpu.submit(frame);
            Ok(())
        })
    }
}
