//! 立方体贴图的 CPU 侧数据
//!
//! 三种来源：
//! - 单张水平十字布局图片（4 x 3 个面）
//! - 六张独立的面图片
//! - 带完整六个面的 DDS 文件
//!
//! 面的顺序与 D3D / wgpu 的数组层一致：+X, -X, +Y, -Y, +Z, -Z。

use std::io::Read;
use std::path::Path;

use ddsfile::{Caps2, D3DFormat, Dds, DxgiFormat};
use image::imageops::{self, FilterType};
use image::RgbaImage;
use tracing::debug;

use crate::core::error::{Result, TextureError};

/// 立方体贴图的六个面
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CubeFace {
    PositiveX,
    NegativeX,
    PositiveY,
    NegativeY,
    PositiveZ,
    NegativeZ,
}

impl CubeFace {
    /// 按数组层顺序排列的全部六个面
    pub const ALL: [CubeFace; 6] = [
        CubeFace::PositiveX,
        CubeFace::NegativeX,
        CubeFace::PositiveY,
        CubeFace::NegativeY,
        CubeFace::PositiveZ,
        CubeFace::NegativeZ,
    ];

    /// 纹理数组层索引
    pub fn layer(self) -> u32 {
        self as u32
    }

    /// 在水平十字布局中的 (列, 行)
    ///
    /// ```text
    ///      +----+
    ///      | +Y |
    /// +----+----+----+----+
    /// | -X | +Z | +X | -Z |
    /// +----+----+----+----+
    ///      | -Y |
    ///      +----+
    /// ```
    pub fn cross_cell(self) -> (u32, u32) {
        match self {
            CubeFace::PositiveX => (2, 1),
            CubeFace::NegativeX => (0, 1),
            CubeFace::PositiveY => (1, 0),
            CubeFace::NegativeY => (1, 2),
            CubeFace::PositiveZ => (1, 1),
            CubeFace::NegativeZ => (3, 1),
        }
    }

    /// 面上纹理坐标 `(u, v)`（范围 [-1, 1]，v 向下）对应的采样方向
    pub fn direction(self, u: f32, v: f32) -> [f32; 3] {
        match self {
            CubeFace::PositiveX => [1.0, -v, -u],
            CubeFace::NegativeX => [-1.0, -v, u],
            CubeFace::PositiveY => [u, 1.0, v],
            CubeFace::NegativeY => [u, -1.0, -v],
            CubeFace::PositiveZ => [u, -v, 1.0],
            CubeFace::NegativeZ => [-u, -v, -1.0],
        }
    }
}

/// 完整 mip 链的层数：`floor(log2(size)) + 1`
pub fn full_mip_count(size: u32) -> u32 {
    if size == 0 {
        0
    } else {
        32 - size.leading_zeros()
    }
}

/// 第 `level` 层 mip 的边长（最小为 1）
pub fn mip_size(size: u32, level: u32) -> u32 {
    size.checked_shr(level).unwrap_or(0).max(1)
}

/// RGBA8 立方体贴图
///
/// `faces[face][level]` 为对应面、对应 mip 层级的紧密排列像素。
#[derive(Debug, Clone)]
pub struct CubeMapImage {
    pub face_size: u32,
    pub mip_levels: u32,
    pub format: wgpu::TextureFormat,
    pub faces: [Vec<Vec<u8>>; 6],
}

impl CubeMapImage {
    /// 每像素字节数
    pub const BYTES_PER_PIXEL: u32 = 4;

    /// 从水平十字布局的单张图片切出六个面
    ///
    /// 宽必须能被 4 整除、高能被 3 整除，且 `宽 / 4 == 高 / 3`。
    pub fn from_cross(image: &RgbaImage, generate_mips: bool) -> Result<Self> {
        let (width, height) = image.dimensions();
        if width == 0 || width % 4 != 0 || height % 3 != 0 || width / 4 != height / 3 {
            return Err(TextureError::InvalidLayout(format!(
                "horizontal cross needs width/4 == height/3, got {}x{}",
                width, height
            ))
            .into());
        }

        let size = width / 4;
        let faces = CubeFace::ALL.map(|face| {
            let (column, row) = face.cross_cell();
            imageops::crop_imm(image, column * size, row * size, size, size).to_image()
        });

        Ok(Self::from_square_faces(faces, generate_mips))
    }

    /// 从六张图片（按 +X, -X, +Y, -Y, +Z, -Z 顺序）组装
    ///
    /// 所有面必须是尺寸相同的正方形。
    pub fn from_faces(images: Vec<RgbaImage>, generate_mips: bool) -> Result<Self> {
        let faces: [RgbaImage; 6] = images
            .try_into()
            .map_err(|images: Vec<RgbaImage>| TextureError::FaceCount(images.len()))?;

        let (width, height) = faces[0].dimensions();
        if width == 0 || width != height {
            return Err(TextureError::FaceMismatch(format!(
                "face {:?} is {}x{}, faces must be square",
                CubeFace::ALL[0],
                width,
                height
            ))
            .into());
        }

        for (face, image) in CubeFace::ALL.iter().zip(faces.iter()).skip(1) {
            if image.dimensions() != (width, height) {
                return Err(TextureError::FaceMismatch(format!(
                    "face {:?} is {}x{}, expected {}x{}",
                    face,
                    image.width(),
                    image.height(),
                    width,
                    height
                ))
                .into());
            }
        }

        Ok(Self::from_square_faces(faces, generate_mips))
    }

    /// 读取单张十字布局图片
    pub fn load_cross(path: &Path, generate_mips: bool) -> Result<Self> {
        let image = open_rgba(path)?;
        Self::from_cross(&image, generate_mips)
    }

    /// 读取六张面图片
    pub fn load_faces<P: AsRef<Path>>(paths: &[P], generate_mips: bool) -> Result<Self> {
        if paths.len() != 6 {
            return Err(TextureError::FaceCount(paths.len()).into());
        }
        let images = paths
            .iter()
            .map(|p| open_rgba(p.as_ref()))
            .collect::<Result<Vec<_>>>()?;
        Self::from_faces(images, generate_mips)
    }

    /// 程序生成的渐变天空（地平线到天顶），天空贴图加载失败时使用
    pub fn gradient(face_size: u32, horizon: [u8; 4], zenith: [u8; 4], ground: [u8; 4]) -> Self {
        let size = face_size.max(1);
        let lerp = |a: [u8; 4], b: [u8; 4], t: f32| -> [u8; 4] {
            let mut out = [0u8; 4];
            for i in 0..4 {
                out[i] = (a[i] as f32 + (b[i] as f32 - a[i] as f32) * t).round() as u8;
            }
            out
        };

        let faces = CubeFace::ALL.map(|face| {
            RgbaImage::from_fn(size, size, |x, y| {
                let u = 2.0 * (x as f32 + 0.5) / size as f32 - 1.0;
                let v = 2.0 * (y as f32 + 0.5) / size as f32 - 1.0;
                let [dx, dy, dz] = face.direction(u, v);
                let height = dy / (dx * dx + dy * dy + dz * dz).sqrt();
                let color = if height >= 0.0 {
                    lerp(horizon, zenith, height.sqrt())
                } else {
                    lerp(horizon, ground, (-height).sqrt())
                };
                image::Rgba(color)
            })
        });

        Self::from_square_faces(faces, false)
    }

    fn from_square_faces(faces: [RgbaImage; 6], generate_mips: bool) -> Self {
        let face_size = faces[0].width();
        let mip_levels = if generate_mips { full_mip_count(face_size) } else { 1 };

        let faces = faces.map(|base| {
            let mut chain = Vec::with_capacity(mip_levels as usize);
            let mut previous = base;
            for level in 1..mip_levels {
                let size = mip_size(face_size, level);
                let next = imageops::resize(&previous, size, size, FilterType::Triangle);
                chain.push(std::mem::replace(&mut previous, next).into_raw());
            }
            chain.push(previous.into_raw());
            chain
        });

        debug!(face_size, mip_levels, "Assembled cube map");

        Self {
            face_size,
            mip_levels,
            format: wgpu::TextureFormat::Rgba8UnormSrgb,
            faces,
        }
    }

    /// 指定面、指定层级的像素
    pub fn mip_data(&self, face: CubeFace, level: u32) -> &[u8] {
        &self.faces[face as usize][level as usize]
    }
}

fn open_rgba(path: &Path) -> Result<RgbaImage> {
    if !path.exists() {
        return Err(TextureError::FileNotFound(path.to_path_buf()).into());
    }
    Ok(image::open(path)?.to_rgba8())
}

/// 像素格式的块信息：(块边长, 每块字节数)
///
/// 非压缩格式的块边长为 1。
pub fn block_info(format: wgpu::TextureFormat) -> Option<(u32, u32)> {
    use wgpu::TextureFormat as F;
    match format {
        F::Rgba8Unorm | F::Rgba8UnormSrgb | F::Bgra8Unorm | F::Bgra8UnormSrgb => Some((1, 4)),
        F::Rgba16Float => Some((1, 8)),
        F::Rgba32Float => Some((1, 16)),
        F::Bc1RgbaUnorm | F::Bc1RgbaUnormSrgb => Some((4, 8)),
        F::Bc2RgbaUnorm | F::Bc2RgbaUnormSrgb
        | F::Bc3RgbaUnorm | F::Bc3RgbaUnormSrgb
        | F::Bc7RgbaUnorm | F::Bc7RgbaUnormSrgb => Some((4, 16)),
        _ => None,
    }
}

/// 一层 mip 在内存中的布局
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MipLayout {
    /// 逻辑尺寸（像素）
    pub size: u32,
    /// 按块对齐后的物理尺寸（像素）
    pub physical_size: u32,
    pub bytes_per_row: u32,
    pub rows: u32,
}

impl MipLayout {
    pub fn compute(format: wgpu::TextureFormat, face_size: u32, level: u32) -> Option<Self> {
        let (block, block_bytes) = block_info(format)?;
        let size = mip_size(face_size, level);
        let blocks = ((size + block - 1) / block).max(1);
        Some(Self {
            size,
            physical_size: blocks * block,
            bytes_per_row: blocks * block_bytes,
            rows: blocks,
        })
    }

    pub fn byte_len(&self) -> usize {
        self.bytes_per_row as usize * self.rows as usize
    }
}

/// 从 DDS 文件解析出的立方体贴图
///
/// DDS 数据按面存放，每个面连续包含自己的整条 mip 链。
#[derive(Debug, Clone)]
pub struct DdsCubeMap {
    pub face_size: u32,
    pub mip_levels: u32,
    pub format: wgpu::TextureFormat,
    layouts: Vec<MipLayout>,
    face_bytes: usize,
    data: Vec<u8>,
}

impl DdsCubeMap {
    pub fn parse<R: Read>(reader: R) -> Result<Self> {
        let dds = Dds::read(reader)?;

        let all_faces = Caps2::CUBEMAP_POSITIVEX | Caps2::CUBEMAP_NEGATIVEX
            | Caps2::CUBEMAP_POSITIVEY | Caps2::CUBEMAP_NEGATIVEY
            | Caps2::CUBEMAP_POSITIVEZ | Caps2::CUBEMAP_NEGATIVEZ;
        if !dds.header.caps2.contains(all_faces) {
            return Err(TextureError::InvalidLayout(
                "DDS file is not a cube map with all six faces".to_string(),
            )
            .into());
        }

        let format = dds_format(&dds)?;
        let (width, height) = (dds.get_width(), dds.get_height());
        if width == 0 || width != height {
            return Err(TextureError::InvalidLayout(format!(
                "DDS cube faces must be square, got {}x{}",
                width, height
            ))
            .into());
        }
        let (block, _) = block_info(format).ok_or_else(|| unsupported(format))?;
        if width % block != 0 {
            return Err(TextureError::InvalidLayout(format!(
                "compressed cube face size {} is not a multiple of {}",
                width, block
            ))
            .into());
        }

        let mip_levels = dds.get_num_mipmap_levels().clamp(1, full_mip_count(width));
        let layouts = (0..mip_levels)
            .map(|level| MipLayout::compute(format, width, level).ok_or_else(|| unsupported(format)))
            .collect::<std::result::Result<Vec<_>, _>>()?;
        let face_bytes = layouts.iter().map(MipLayout::byte_len).sum::<usize>();

        if dds.data.len() < face_bytes * 6 {
            return Err(TextureError::InvalidLayout(format!(
                "DDS data is truncated: {} bytes, expected at least {}",
                dds.data.len(),
                face_bytes * 6
            ))
            .into());
        }

        debug!(size = width, mip_levels, format = ?format, "Parsed DDS cube map");

        Ok(Self {
            face_size: width,
            mip_levels,
            format,
            layouts,
            face_bytes,
            data: dds.data,
        })
    }

    pub fn load(path: &Path) -> Result<Self> {
        if !path.exists() {
            return Err(TextureError::FileNotFound(path.to_path_buf()).into());
        }
        let file = std::fs::File::open(path)?;
        Self::parse(std::io::BufReader::new(file))
    }

    /// 是否为块压缩格式
    pub fn is_compressed(&self) -> bool {
        block_info(self.format).map_or(false, |(block, _)| block > 1)
    }

    pub fn layout(&self, level: u32) -> MipLayout {
        self.layouts[level as usize]
    }

    /// 指定面、指定层级的原始数据
    pub fn mip_data(&self, face: CubeFace, level: u32) -> &[u8] {
        let face_start = face as usize * self.face_bytes;
        let offset = self.layouts[..level as usize]
            .iter()
            .map(MipLayout::byte_len)
            .sum::<usize>();
        let start = face_start + offset;
        &self.data[start..start + self.layouts[level as usize].byte_len()]
    }
}

fn unsupported(format: wgpu::TextureFormat) -> TextureError {
    TextureError::UnsupportedFormat(format!("{:?}", format))
}

/// D3D / DXGI 格式到 wgpu 格式的映射
///
/// 只有带 DX10 扩展头的文件才按 DXGI 格式解释。传统头部的 DXT1/3/5
/// 按线性 BC 格式加载，与 `A8R8G8B8` 等非压缩传统格式保持一致。
fn dds_format(dds: &Dds) -> Result<wgpu::TextureFormat> {
    use wgpu::TextureFormat as F;

    if let Some(format) = dds.header10.as_ref().and_then(|_| dds.get_dxgi_format()) {
        let mapped = match format {
            DxgiFormat::R8G8B8A8_UNorm => F::Rgba8Unorm,
            DxgiFormat::R8G8B8A8_UNorm_sRGB => F::Rgba8UnormSrgb,
            DxgiFormat::B8G8R8A8_UNorm => F::Bgra8Unorm,
            DxgiFormat::B8G8R8A8_UNorm_sRGB => F::Bgra8UnormSrgb,
            DxgiFormat::BC1_UNorm => F::Bc1RgbaUnorm,
            DxgiFormat::BC1_UNorm_sRGB => F::Bc1RgbaUnormSrgb,
            DxgiFormat::BC2_UNorm => F::Bc2RgbaUnorm,
            DxgiFormat::BC2_UNorm_sRGB => F::Bc2RgbaUnormSrgb,
            DxgiFormat::BC3_UNorm => F::Bc3RgbaUnorm,
            DxgiFormat::BC3_UNorm_sRGB => F::Bc3RgbaUnormSrgb,
            DxgiFormat::BC7_UNorm => F::Bc7RgbaUnorm,
            DxgiFormat::BC7_UNorm_sRGB => F::Bc7RgbaUnormSrgb,
            DxgiFormat::R16G16B16A16_Float => F::Rgba16Float,
            DxgiFormat::R32G32B32A32_Float => F::Rgba32Float,
            other => {
                return Err(TextureError::UnsupportedFormat(format!("DXGI {:?}", other)).into())
            }
        };
        return Ok(mapped);
    }

    if let Some(format) = dds.get_d3d_format() {
        let mapped = match format {
            D3DFormat::A8B8G8R8 => F::Rgba8Unorm,
            D3DFormat::A8R8G8B8 | D3DFormat::X8R8G8B8 => F::Bgra8Unorm,
            D3DFormat::DXT1 => F::Bc1RgbaUnorm,
            D3DFormat::DXT3 => F::Bc2RgbaUnorm,
            D3DFormat::DXT5 => F::Bc3RgbaUnorm,
            D3DFormat::A16B16G16R16F => F::Rgba16Float,
            D3DFormat::A32B32G32R32F => F::Rgba32Float,
            other => {
                return Err(TextureError::UnsupportedFormat(format!("D3D {:?}", other)).into())
            }
        };
        return Ok(mapped);
    }

    Err(TextureError::UnsupportedFormat("DDS pixel format is neither D3D nor DXGI".to_string()).into())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::error::SkyRenderError;
    use image::Rgba;

    /// 每个面填充不同颜色的十字布局图
    fn cross_image(size: u32) -> RgbaImage {
        let mut image = RgbaImage::new(size * 4, size * 3);
        for face in CubeFace::ALL {
            let (column, row) = face.cross_cell();
            let color = Rgba([face as u8 * 40, 10, 20, 255]);
            for y in 0..size {
                for x in 0..size {
                    image.put_pixel(column * size + x, row * size + y, color);
                }
            }
        }
        image
    }

    #[test]
    fn test_mip_counts() {
        assert_eq!(full_mip_count(1), 1);
        assert_eq!(full_mip_count(256), 9);
        assert_eq!(full_mip_count(300), 9);
        assert_eq!(mip_size(256, 8), 1);
        assert_eq!(mip_size(256, 12), 1);
    }

    #[test]
    fn test_from_cross_extracts_faces() {
        let cube = CubeMapImage::from_cross(&cross_image(8), false).unwrap();
        assert_eq!(cube.face_size, 8);
        assert_eq!(cube.mip_levels, 1);

        for face in CubeFace::ALL {
            let data = cube.mip_data(face, 0);
            assert_eq!(data.len(), 8 * 8 * 4);
            assert_eq!(data[0], face as u8 * 40, "{:?}", face);
        }
    }

    #[test]
    fn test_from_cross_generates_full_chain() {
        let cube = CubeMapImage::from_cross(&cross_image(16), true).unwrap();
        assert_eq!(cube.mip_levels, 5);
        for face in CubeFace::ALL {
            assert_eq!(cube.faces[face as usize].len(), 5);
            assert_eq!(cube.mip_data(face, 4).len(), 4);
            // 纯色面缩小后颜色不变
            assert_eq!(cube.mip_data(face, 3)[0], face as u8 * 40);
        }
    }

    #[test]
    fn test_from_cross_rejects_bad_layout() {
        let result = CubeMapImage::from_cross(&RgbaImage::new(30, 20), false);
        assert!(matches!(result, Err(SkyRenderError::Texture(TextureError::InvalidLayout(_)))));

        // 宽高都满足整除但比例错误
        let result = CubeMapImage::from_cross(&RgbaImage::new(32, 30), false);
        assert!(result.is_err());
    }

    #[test]
    fn test_from_faces_validation() {
        let faces = vec![RgbaImage::new(4, 4); 5];
        assert!(matches!(
            CubeMapImage::from_faces(faces, false),
            Err(SkyRenderError::Texture(TextureError::FaceCount(5)))
        ));

        let mut faces = vec![RgbaImage::new(4, 4); 6];
        faces[3] = RgbaImage::new(8, 8);
        assert!(matches!(
            CubeMapImage::from_faces(faces, false),
            Err(SkyRenderError::Texture(TextureError::FaceMismatch(_)))
        ));

        let faces = vec![RgbaImage::new(4, 2); 6];
        assert!(matches!(
            CubeMapImage::from_faces(faces, false),
            Err(SkyRenderError::Texture(TextureError::FaceMismatch(_)))
        ));
    }

    #[test]
    fn test_from_faces_keeps_order() {
        let faces: Vec<RgbaImage> = (0..6u8)
            .map(|i| RgbaImage::from_pixel(2, 2, Rgba([i, 0, 0, 255])))
            .collect();
        let cube = CubeMapImage::from_faces(faces, true).unwrap();
        assert_eq!(cube.mip_levels, 2);
        assert_eq!(cube.mip_data(CubeFace::NegativeY, 0)[0], 3);
        assert_eq!(cube.mip_data(CubeFace::NegativeZ, 1), &[5, 0, 0, 255]);
    }

    #[test]
    fn test_face_directions_are_outward() {
        assert_eq!(CubeFace::PositiveX.direction(0.0, 0.0), [1.0, 0.0, 0.0]);
        assert_eq!(CubeFace::NegativeY.direction(0.0, 0.0), [0.0, -1.0, 0.0]);
        assert_eq!(CubeFace::NegativeZ.direction(0.0, 0.0), [0.0, 0.0, -1.0]);
        // 面的顶端（v = -1）朝向 +Y
        assert_eq!(CubeFace::PositiveZ.direction(0.0, -1.0)[1], 1.0);
    }

    #[test]
    fn test_gradient_sky() {
        let cube = CubeMapImage::gradient(8, [100, 100, 100, 255], [0, 0, 200, 255], [20, 20, 20, 255]);
        assert_eq!(cube.mip_levels, 1);
        let top = cube.mip_data(CubeFace::PositiveY, 0);
        let bottom = cube.mip_data(CubeFace::NegativeY, 0);
        assert!(top[2] > 150, "zenith is blue");
        assert!(bottom[0] < 50, "ground is dark");
    }

    #[test]
    fn test_compressed_mip_layout() {
        let layout = MipLayout::compute(wgpu::TextureFormat::Bc1RgbaUnorm, 16, 0).unwrap();
        assert_eq!(layout.bytes_per_row, 4 * 8);
        assert_eq!(layout.rows, 4);
        assert_eq!(layout.byte_len(), 128);

        // 小于一个块的层级仍占一个完整块
        let layout = MipLayout::compute(wgpu::TextureFormat::Bc3RgbaUnorm, 16, 3).unwrap();
        assert_eq!(layout.size, 2);
        assert_eq!(layout.physical_size, 4);
        assert_eq!(layout.byte_len(), 16);

        let layout = MipLayout::compute(wgpu::TextureFormat::Rgba16Float, 16, 1).unwrap();
        assert_eq!(layout.bytes_per_row, 8 * 8);
        assert_eq!(layout.rows, 8);

        assert!(MipLayout::compute(wgpu::TextureFormat::R8Unorm, 16, 0).is_none());
    }

    /// 构造 DDS 文件头；`pixel_format` 为像素格式块中 flags 之后的 6 个字段
    fn dds_header(pf_flags: u32, pixel_format: [u32; 6], size: u32, mips: u32, caps2: u32) -> Vec<u8> {
        let mut bytes = Vec::new();
        let mut put = |v: u32| bytes.extend_from_slice(&v.to_le_bytes());
        put(u32::from_le_bytes(*b"DDS "));
        put(124);
        put(0x1 | 0x2 | 0x4 | 0x1000 | 0x20000 | 0x80000);
        put(size);
        put(size);
        put(0);
        put(0);
        put(mips);
        for _ in 0..11 {
            put(0);
        }
        // pixel format
        put(32);
        put(pf_flags);
        for v in pixel_format {
            put(v);
        }
        put(0x1000 | 0x8 | 0x400000);
        put(caps2);
        put(0);
        put(0);
        put(0);
        bytes
    }

    /// 构造一个传统头部（无 DX10 扩展）的 FourCC DDS 文件
    fn legacy_dds(fourcc: &[u8; 4], size: u32, mips: u32, caps2: u32, data_len: usize) -> Vec<u8> {
        let mut bytes = dds_header(0x4, [u32::from_le_bytes(*fourcc), 0, 0, 0, 0, 0], size, mips, caps2);
        bytes.extend(std::iter::repeat(0xAB).take(data_len));
        bytes
    }

    /// 带 DX10 扩展头的立方体贴图
    fn dx10_dds(dxgi_format: u32, size: u32, mips: u32, data_len: usize) -> Vec<u8> {
        let mut bytes = dds_header(0x4, [u32::from_le_bytes(*b"DX10"), 0, 0, 0, 0, 0], size, mips, CUBE_CAPS2);
        // dxgi_format, resource_dimension = TEXTURE2D, misc_flag = TEXTURECUBE, array_size, misc_flags2
        for v in [dxgi_format, 3, 0x4, 1, 0] {
            bytes.extend_from_slice(&v.to_le_bytes());
        }
        bytes.extend(std::iter::repeat(0xAB).take(data_len));
        bytes
    }

    const CUBE_CAPS2: u32 = 0x200 | 0xFC00;

    #[test]
    fn test_parse_dxt1_cube() {
        // 8x8 DXT1，两层 mip：每面 32 + 8 字节
        let mut bytes = legacy_dds(b"DXT1", 8, 2, CUBE_CAPS2, 0);
        for face in 0..6u8 {
            bytes.extend(std::iter::repeat(face).take(40));
        }

        let cube = DdsCubeMap::parse(bytes.as_slice()).unwrap();
        assert_eq!(cube.face_size, 8);
        assert_eq!(cube.mip_levels, 2);
        assert_eq!(cube.format, wgpu::TextureFormat::Bc1RgbaUnorm);
        assert!(cube.is_compressed());

        assert_eq!(cube.mip_data(CubeFace::PositiveX, 0).len(), 32);
        assert_eq!(cube.mip_data(CubeFace::PositiveY, 1), &[2u8; 8][..]);
        assert_eq!(cube.mip_data(CubeFace::NegativeZ, 0)[0], 5);
    }

    #[test]
    fn test_legacy_block_formats_are_linear() {
        // 4x4 单层：DXT1 每面 8 字节，DXT3/DXT5 每面 16 字节
        let cases = [
            (b"DXT1", 8, wgpu::TextureFormat::Bc1RgbaUnorm),
            (b"DXT3", 16, wgpu::TextureFormat::Bc2RgbaUnorm),
            (b"DXT5", 16, wgpu::TextureFormat::Bc3RgbaUnorm),
        ];
        for (fourcc, face_bytes, expected) in cases {
            let bytes = legacy_dds(fourcc, 4, 1, CUBE_CAPS2, face_bytes * 6);
            let cube = DdsCubeMap::parse(bytes.as_slice()).unwrap();
            assert_eq!(cube.format, expected);
            assert_eq!(cube.mip_data(CubeFace::NegativeY, 0).len(), face_bytes);
        }
    }

    #[test]
    fn test_legacy_a8r8g8b8_cube() {
        let masks = [0, 32, 0x00FF_0000, 0x0000_FF00, 0x0000_00FF, 0xFF00_0000];
        let mut bytes = dds_header(0x40 | 0x1, masks, 2, 1, CUBE_CAPS2);
        bytes.extend(std::iter::repeat(0x7F).take(2 * 2 * 4 * 6));

        let cube = DdsCubeMap::parse(bytes.as_slice()).unwrap();
        assert_eq!(cube.format, wgpu::TextureFormat::Bgra8Unorm);
        assert!(!cube.is_compressed());
        assert_eq!(cube.mip_data(CubeFace::PositiveZ, 0).len(), 16);
    }

    #[test]
    fn test_dx10_header_keeps_declared_format() {
        // 98 = BC7_UNORM，99 = BC7_UNORM_SRGB，72 = BC1_UNORM_SRGB
        let cases = [
            (98, 16, wgpu::TextureFormat::Bc7RgbaUnorm),
            (99, 16, wgpu::TextureFormat::Bc7RgbaUnormSrgb),
            (72, 8, wgpu::TextureFormat::Bc1RgbaUnormSrgb),
        ];
        for (dxgi, face_bytes, expected) in cases {
            let bytes = dx10_dds(dxgi, 4, 1, face_bytes * 6);
            let cube = DdsCubeMap::parse(bytes.as_slice()).unwrap();
            assert_eq!(cube.format, expected);
        }
    }

    #[test]
    fn test_parse_rejects_non_cube() {
        let bytes = legacy_dds(b"DXT1", 8, 1, 0, 32);
        let result = DdsCubeMap::parse(bytes.as_slice());
        assert!(matches!(result, Err(SkyRenderError::Texture(TextureError::InvalidLayout(_)))));
    }

    #[test]
    fn test_parse_rejects_truncated_data() {
        let bytes = legacy_dds(b"DXT5", 8, 1, CUBE_CAPS2, 64);
        assert!(DdsCubeMap::parse(bytes.as_slice()).is_err());
    }

    #[test]
    fn test_parse_garbage() {
        assert!(DdsCubeMap::parse(&b"not a dds file"[..]).is_err());
    }
}
