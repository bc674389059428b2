use globe_assets::TextureImage;
use globe_render::RenderError;

/// Maps are sampled as stored; shader output is likewise written unconverted.
pub(crate) const TEXTURE_FORMAT: wgpu::TextureFormat = wgpu::TextureFormat::Rgba8Unorm;

/// Texture extent for `image`, refused when either edge exceeds `max_dimension`.
pub(crate) fn texture_extent(
    image: &TextureImage,
    max_dimension: u32,
) -> Result<wgpu::Extent3d, RenderError> {
    if image.width > max_dimension || image.height > max_dimension {
        return Err(RenderError::TextureTooLarge {
            label: image.label.clone(),
            width: image.width,
            height: image.height,
            max: max_dimension,
        });
    }
    Ok(wgpu::Extent3d {
        width: image.width,
        height: image.height,
        depth_or_array_layers: 1,
    })
}

/// Upload a decoded map and return its view.
pub(crate) fn upload(
    device: &wgpu::Device,
    queue: &wgpu::Queue,
    image: &TextureImage,
) -> Result<wgpu::TextureView, RenderError> {
    let size = texture_extent(image, device.limits().max_texture_dimension_2d)?;
    let texture = device.create_texture(&wgpu::TextureDescriptor {
        label: Some(image.label.as_str()),
        size,
        mip_level_count: 1,
        sample_count: 1,
        dimension: wgpu::TextureDimension::D2,
        format: TEXTURE_FORMAT,
        usage: wgpu::TextureUsages::TEXTURE_BINDING | wgpu::TextureUsages::COPY_DST,
        view_formats: &[],
    });
    queue.write_texture(
        wgpu::TexelCopyTextureInfo {
            texture: &texture,
            mip_level: 0,
            origin: wgpu::Origin3d::ZERO,
            aspect: wgpu::TextureAspect::All,
        },
        &image.pixels,
        wgpu::TexelCopyBufferLayout {
            offset: 0,
            bytes_per_row: Some(image.bytes_per_row()),
            rows_per_image: Some(image.height),
        },
        size,
    );
    tracing::debug!(
        "uploaded texture {} ({}x{})",
        image.label,
        image.width,
        image.height
    );
    Ok(texture.create_view(&wgpu::TextureViewDescriptor::default()))
}

pub(crate) fn globe_sampler(device: &wgpu::Device) -> wgpu::Sampler {
    device.create_sampler(&wgpu::SamplerDescriptor {
        label: Some("globe_sampler"),
        address_mode_u: wgpu::AddressMode::ClampToEdge,
        address_mode_v: wgpu::AddressMode::ClampToEdge,
        address_mode_w: wgpu::AddressMode::ClampToEdge,
        mag_filter: wgpu::FilterMode::Linear,
        min_filter: wgpu::FilterMode::Linear,
        mipmap_filter: wgpu::FilterMode::Nearest,
        ..Default::default()
    })
}
