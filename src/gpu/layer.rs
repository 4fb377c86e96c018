use wgpu::{BindGroup, BindGroupLayout, Buffer, BufferUsages, Device, Queue, Sampler, Texture};

use crate::canvas::{Canvas, PixelCanvas};

/// Texel format of every layer; canvases hold premultiplied sRGB-encoded bytes
pub const LAYER_FORMAT: wgpu::TextureFormat = wgpu::TextureFormat::Rgba8UnormSrgb;

/// Placement of one layer on the surface (32 bytes, aligned to 16)
#[repr(C)]
#[derive(Clone, Copy, Debug, PartialEq, bytemuck::Pod, bytemuck::Zeroable)]
pub struct LayerParams {
    /// x, y, width, height in surface pixels
    pub rect: [f32; 4],
    /// Surface size in pixels
    pub viewport: [f32; 2],
    pub opacity: f32,
    pub _padding: f32,
}

impl LayerParams {
    /// `rect` scaled by `scale` about its own centre
    pub fn scaled(rect: [f32; 4], scale: f32, viewport: (u32, u32), opacity: f32) -> Self {
        let [x, y, w, h] = rect;
        let (sw, sh) = (w * scale, h * scale);
        Self {
            rect: [x + (w - sw) * 0.5, y + (h - sh) * 0.5, sw, sh],
            viewport: [viewport.0.max(1) as f32, viewport.1.max(1) as f32],
            opacity: opacity.clamp(0.0, 1.0),
            _padding: 0.0,
        }
    }
}

/// One composited surface: an RGBA texture fed from a [`PixelCanvas`], plus
/// the uniform that places it
pub struct Layer {
    texture: Texture,
    params_buffer: Buffer,
    bind_group: BindGroup,
    width: u32,
    height: u32,
}

impl Layer {
    pub fn new(
        device: &Device,
        layout: &BindGroupLayout,
        sampler: &Sampler,
        width: u32,
        height: u32,
        label: &str,
    ) -> Self {
        // A zero-sized texture is invalid; keep a 1x1 stand-in until a real size arrives
        let (width, height) = (width.max(1), height.max(1));

        let texture = device.create_texture(&wgpu::TextureDescriptor {
            label: Some(label),
            size: wgpu::Extent3d {
                width,
                height,
                depth_or_array_layers: 1,
            },
            mip_level_count: 1,
            sample_count: 1,
            dimension: wgpu::TextureDimension::D2,
            format: LAYER_FORMAT,
            usage: wgpu::TextureUsages::TEXTURE_BINDING | wgpu::TextureUsages::COPY_DST,
            view_formats: &[],
        });
        let view = texture.create_view(&wgpu::TextureViewDescriptor::default());

        let params_buffer = device.create_buffer(&wgpu::BufferDescriptor {
            label: Some("layer-params-buffer"),
            size: std::mem::size_of::<LayerParams>() as u64,
            usage: BufferUsages::UNIFORM | BufferUsages::COPY_DST,
            mapped_at_creation: false,
        });

        let bind_group = device.create_bind_group(&wgpu::BindGroupDescriptor {
            label: Some("layer-bind-group"),
            layout,
            entries: &[
                wgpu::BindGroupEntry {
                    binding: 0,
                    resource: wgpu::BindingResource::TextureView(&view),
                },
                wgpu::BindGroupEntry {
                    binding: 1,
                    resource: wgpu::BindingResource::Sampler(sampler),
                },
                wgpu::BindGroupEntry {
                    binding: 2,
                    resource: params_buffer.as_entire_binding(),
                },
            ],
        });

        Self {
            texture,
            params_buffer,
            bind_group,
            width,
            height,
        }
    }

    pub fn matches(&self, canvas: &PixelCanvas) -> bool {
        self.width == canvas.width() && self.height == canvas.height()
    }

    pub fn bind_group(&self) -> &BindGroup {
        &self.bind_group
    }

    /// Copy the canvas into the texture. Skipped while sizes disagree; the
    /// owner recreates the layer on resize.
    pub fn upload(&self, queue: &Queue, canvas: &PixelCanvas) {
        if canvas.is_empty() || !self.matches(canvas) {
            return;
        }
        queue.write_texture(
            wgpu::TexelCopyTextureInfo {
                texture: &self.texture,
                mip_level: 0,
                origin: wgpu::Origin3d::ZERO,
                aspect: wgpu::TextureAspect::All,
            },
            canvas.as_rgba(),
            wgpu::TexelCopyBufferLayout {
                offset: 0,
                bytes_per_row: Some(4 * self.width),
                rows_per_image: Some(self.height),
            },
            wgpu::Extent3d {
                width: self.width,
                height: self.height,
                depth_or_array_layers: 1,
            },
        );
    }

    pub fn update_params(&self, queue: &Queue, params: &LayerParams) {
        queue.write_buffer(&self.params_buffer, 0, bytemuck::bytes_of(params));
    }
}
