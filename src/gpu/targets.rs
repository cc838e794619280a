//! Offscreen render targets shared by the passes.

use crate::passes::Target;

/// Format of every offscreen target.
pub const TARGET_FORMAT: wgpu::TextureFormat = wgpu::TextureFormat::Rgba16Float;

/// A texture plus its default view.
pub struct TargetTexture {
    pub texture: wgpu::Texture,
    pub view: wgpu::TextureView,
}

/// Noisy, Normals, History, Denoised and TaaOutput, all the same size.
pub struct RenderTargets {
    pub noisy: TargetTexture,
    pub normals: TargetTexture,
    pub history: TargetTexture,
    pub denoised: TargetTexture,
    pub taa_output: TargetTexture,
    width: u32,
    height: u32,
}

impl RenderTargets {
    pub fn new(device: &wgpu::Device, width: u32, height: u32) -> Self {
        let width = width.max(1);
        let height = height.max(1);
        Self {
            noisy: create_target(device, Target::Noisy, width, height),
            normals: create_target(device, Target::Normals, width, height),
            history: create_target(device, Target::History, width, height),
            denoised: create_target(device, Target::Denoised, width, height),
            taa_output: create_target(device, Target::TaaOutput, width, height),
            width,
            height,
        }
    }

    /// Offscreen texture for `target`. `None` for the swapchain.
    pub fn get(&self, target: Target) -> Option<&TargetTexture> {
        match target {
            Target::Noisy => Some(&self.noisy),
            Target::Normals => Some(&self.normals),
            Target::History => Some(&self.history),
            Target::Denoised => Some(&self.denoised),
            Target::TaaOutput => Some(&self.taa_output),
            Target::Swapchain => None,
        }
    }

    pub fn size(&self) -> (u32, u32) {
        (self.width, self.height)
    }

    pub fn extent(&self) -> wgpu::Extent3d {
        wgpu::Extent3d {
            width: self.width,
            height: self.height,
            depth_or_array_layers: 1,
        }
    }

    /// Full-texture copy from one target to another.
    pub fn copy(&self, encoder: &mut wgpu::CommandEncoder, from: Target, to: Target) {
        let (Some(src), Some(dst)) = (self.get(from), self.get(to)) else {
            log::warn!("cannot copy {} -> {}", from.label(), to.label());
            return;
        };
        encoder.copy_texture_to_texture(src.texture.as_image_copy(), dst.texture.as_image_copy(), self.extent());
    }
}

fn create_target(device: &wgpu::Device, target: Target, width: u32, height: u32) -> TargetTexture {
    let texture = device.create_texture(&wgpu::TextureDescriptor {
        label: Some(target.label()),
        size: wgpu::Extent3d {
            width,
            height,
            depth_or_array_layers: 1,
        },
        mip_level_count: 1,
        sample_count: 1,
        dimension: wgpu::TextureDimension::D2,
        format: TARGET_FORMAT,
        usage: wgpu::TextureUsages::RENDER_ATTACHMENT
            | wgpu::TextureUsages::TEXTURE_BINDING
            | wgpu::TextureUsages::COPY_SRC
            | wgpu::TextureUsages::COPY_DST,
        view_formats: &[],
    });
    let view = texture.create_view(&wgpu::TextureViewDescriptor::default());
    TargetTexture { texture, view }
}
