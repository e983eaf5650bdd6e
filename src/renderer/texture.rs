//! GPU 纹理资源
//!
//! - [`Texture2D`]：物体表面的漫反射纹理
//! - [`TextureCube`]：天空盒与环境反射使用的立方体贴图

use std::path::Path;
use tracing::debug;

use crate::core::error::{Result, TextureError};
use crate::gfx::WgpuContext;
use crate::renderer::cube_map::{block_info, mip_size, CubeFace, CubeMapImage, DdsCubeMap};

/// 2D 纹理 + 视图 + 采样器
pub struct Texture2D {
    pub texture: wgpu::Texture,
    pub view: wgpu::TextureView,
    pub sampler: wgpu::Sampler,
}

impl Texture2D {
    /// 从图片文件创建（任意 `image` 支持的格式，按 sRGB 处理）
    pub fn from_file(ctx: &WgpuContext, path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        if !path.exists() {
            return Err(TextureError::FileNotFound(path.to_path_buf()).into());
        }
        let image = image::open(path)?.to_rgba8();
        let (width, height) = image.dimensions();
        crate::asset_info!(path = %path.display(), width, height, "Loaded texture");
        Self::from_rgba(ctx, width, height, image.as_raw(), &path.display().to_string())
    }

    /// 从紧密排列的 RGBA8 像素创建
    pub fn from_rgba(ctx: &WgpuContext, width: u32, height: u32, data: &[u8], label: &str) -> Result<Self> {
        let expected = width as usize * height as usize * 4;
        if width == 0 || height == 0 || data.len() != expected {
            return Err(TextureError::InvalidLayout(format!(
                "RGBA data for {}x{} texture must be {} bytes, got {}",
                width,
                height,
                expected,
                data.len()
            ))
            .into());
        }

        let size = wgpu::Extent3d {
            width,
            height,
            depth_or_array_layers: 1,
        };
        let texture = ctx.device.create_texture(&wgpu::TextureDescriptor {
            label: Some(label),
            size,
            mip_level_count: 1,
            sample_count: 1,
            dimension: wgpu::TextureDimension::D2,
            format: wgpu::TextureFormat::Rgba8UnormSrgb,
            usage: wgpu::TextureUsages::TEXTURE_BINDING | wgpu::TextureUsages::COPY_DST,
            view_formats: &[],
        });

        ctx.queue.write_texture(
            wgpu::ImageCopyTexture {
                texture: &texture,
                mip_level: 0,
                origin: wgpu::Origin3d::ZERO,
                aspect: wgpu::TextureAspect::All,
            },
            data,
            wgpu::ImageDataLayout {
                offset: 0,
                bytes_per_row: Some(4 * width),
                rows_per_image: Some(height),
            },
            size,
        );

        let view = texture.create_view(&wgpu::TextureViewDescriptor::default());
        let sampler = ctx.device.create_sampler(&wgpu::SamplerDescriptor {
            label: Some("Texture2D Sampler"),
            address_mode_u: wgpu::AddressMode::Repeat,
            address_mode_v: wgpu::AddressMode::Repeat,
            address_mode_w: wgpu::AddressMode::Repeat,
            mag_filter: wgpu::FilterMode::Linear,
            min_filter: wgpu::FilterMode::Linear,
            mipmap_filter: wgpu::FilterMode::Linear,
            ..Default::default()
        });

        Ok(Self { texture, view, sampler })
    }

    /// 1x1 白色纹理，没有贴图的物体使用
    pub fn white(ctx: &WgpuContext) -> Result<Self> {
        Self::from_rgba(ctx, 1, 1, &[255, 255, 255, 255], "White Texture")
    }
}

/// 立方体贴图 + Cube 视图 + 采样器
pub struct TextureCube {
    pub texture: wgpu::Texture,
    pub view: wgpu::TextureView,
    pub sampler: wgpu::Sampler,
    pub face_size: u32,
    pub mip_levels: u32,
}

impl TextureCube {
    /// 从单个文件创建
    ///
    /// 扩展名为 `.dds`（不区分大小写）时按 DDS 立方体贴图读取，
    /// DDS 自带的 mip 链原样使用，`generate_mips` 被忽略；
    /// 其他格式按水平十字布局的单张图片读取。
    pub fn from_file(ctx: &WgpuContext, path: impl AsRef<Path>, generate_mips: bool) -> Result<Self> {
        let path = path.as_ref();
        let is_dds = path
            .extension()
            .and_then(|ext| ext.to_str())
            .map_or(false, |ext| ext.eq_ignore_ascii_case("dds"));

        crate::asset_info!(path = %path.display(), dds = is_dds, "Loading cube texture");
        if is_dds {
            let dds = DdsCubeMap::load(path)?;
            Self::from_dds(ctx, &dds)
        } else {
            let image = CubeMapImage::load_cross(path, generate_mips)?;
            Self::from_image(ctx, &image)
        }
    }

    /// 从六张面图片创建（顺序 +X, -X, +Y, -Y, +Z, -Z）
    pub fn from_files<P: AsRef<Path>>(ctx: &WgpuContext, paths: &[P], generate_mips: bool) -> Result<Self> {
        let image = CubeMapImage::load_faces(paths, generate_mips)?;
        Self::from_image(ctx, &image)
    }

    /// 上传已组装好的 RGBA8 立方体贴图
    pub fn from_image(ctx: &WgpuContext, image: &CubeMapImage) -> Result<Self> {
        let cube = Self::create(ctx, image.face_size, image.mip_levels, image.format);

        for face in CubeFace::ALL {
            for level in 0..image.mip_levels {
                let size = mip_size(image.face_size, level);
                write_face(
                    ctx,
                    &cube.texture,
                    face,
                    level,
                    image.mip_data(face, level),
                    size * CubeMapImage::BYTES_PER_PIXEL,
                    size,
                    size,
                );
            }
        }

        debug!(size = image.face_size, mips = image.mip_levels, "Uploaded cube texture");
        Ok(cube)
    }

    /// 上传 DDS 立方体贴图
    pub fn from_dds(ctx: &WgpuContext, dds: &DdsCubeMap) -> Result<Self> {
        if dds.is_compressed() && !ctx.supports(wgpu::Features::TEXTURE_COMPRESSION_BC) {
            return Err(TextureError::MissingFeature(format!(
                "{:?} requires TEXTURE_COMPRESSION_BC",
                dds.format
            ))
            .into());
        }
        if dds.format == wgpu::TextureFormat::Rgba32Float && !ctx.supports(wgpu::Features::FLOAT32_FILTERABLE) {
            return Err(TextureError::MissingFeature(
                "filtering Rgba32Float cube maps requires FLOAT32_FILTERABLE".to_string(),
            )
            .into());
        }
        if block_info(dds.format).is_none() {
            return Err(TextureError::UnsupportedFormat(format!("{:?}", dds.format)).into());
        }

        let cube = Self::create(ctx, dds.face_size, dds.mip_levels, dds.format);

        for face in CubeFace::ALL {
            for level in 0..dds.mip_levels {
                let layout = dds.layout(level);
                write_face(
                    ctx,
                    &cube.texture,
                    face,
                    level,
                    dds.mip_data(face, level),
                    layout.bytes_per_row,
                    layout.rows,
                    layout.physical_size,
                );
            }
        }

        debug!(size = dds.face_size, mips = dds.mip_levels, format = ?dds.format, "Uploaded DDS cube texture");
        Ok(cube)
    }

    fn create(ctx: &WgpuContext, face_size: u32, mip_levels: u32, format: wgpu::TextureFormat) -> Self {
        let texture = ctx.device.create_texture(&wgpu::TextureDescriptor {
            label: Some("Cube Texture"),
            size: wgpu::Extent3d {
                width: face_size,
                height: face_size,
                depth_or_array_layers: 6,
            },
            mip_level_count: mip_levels,
            sample_count: 1,
            dimension: wgpu::TextureDimension::D2,
            format,
            usage: wgpu::TextureUsages::TEXTURE_BINDING | wgpu::TextureUsages::COPY_DST,
            view_formats: &[],
        });

        let view = texture.create_view(&wgpu::TextureViewDescriptor {
            label: Some("Cube Texture View"),
            dimension: Some(wgpu::TextureViewDimension::Cube),
            array_layer_count: Some(6),
            ..Default::default()
        });

        let sampler = ctx.device.create_sampler(&wgpu::SamplerDescriptor {
            label: Some("Cube Sampler"),
            address_mode_u: wgpu::AddressMode::ClampToEdge,
            address_mode_v: wgpu::AddressMode::ClampToEdge,
            address_mode_w: wgpu::AddressMode::ClampToEdge,
            mag_filter: wgpu::FilterMode::Linear,
            min_filter: wgpu::FilterMode::Linear,
            mipmap_filter: wgpu::FilterMode::Linear,
            ..Default::default()
        });

        Self {
            texture,
            view,
            sampler,
            face_size,
            mip_levels,
        }
    }
}

/// 写入立方体贴图的一个面的一层 mip
///
/// `extent` 为按块对齐后的物理尺寸。
#[allow(clippy::too_many_arguments)]
fn write_face(
    ctx: &WgpuContext,
    texture: &wgpu::Texture,
    face: CubeFace,
    level: u32,
    data: &[u8],
    bytes_per_row: u32,
    rows: u32,
    extent: u32,
) {
    ctx.queue.write_texture(
        wgpu::ImageCopyTexture {
            texture,
            mip_level: level,
            origin: wgpu::Origin3d {
                x: 0,
                y: 0,
                z: face.layer(),
            },
            aspect: wgpu::TextureAspect::All,
        },
        data,
        wgpu::ImageDataLayout {
            offset: 0,
            bytes_per_row: Some(bytes_per_row),
            rows_per_image: Some(rows),
        },
        wgpu::Extent3d {
            width: extent,
            height: extent,
            depth_or_array_layers: 1,
        },
    );
}
