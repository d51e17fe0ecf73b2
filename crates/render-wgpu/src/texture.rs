use mazeview_render::Surface;
use std::path::{Path, PathBuf};

/// Errors from loading surface textures.
#[derive(Debug, thiserror::Error)]
pub enum TextureError {
    #[error("failed to load texture {path}: {source}")]
    Decode {
        path: PathBuf,
        #[source]
        source: image::ImageError,
    },
    #[error("texture {label} is empty")]
    Empty { label: String },
}

/// A decoded RGBA image ready for upload.
#[derive(Debug, Clone)]
pub struct TextureImage {
    label: String,
    image: image::RgbaImage,
}

impl TextureImage {
    /// Decode an image file into RGBA8.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, TextureError> {
        let path = path.as_ref();
        let image = image::open(path)
            .map_err(|source| TextureError::Decode {
                path: path.to_path_buf(),
                source,
            })?
            .to_rgba8();
        tracing::debug!(
            path = %path.display(),
            width = image.width(),
            height = image.height(),
            "texture decoded"
        );
        Self::from_rgba(path.display().to_string(), image)
    }

    pub fn from_rgba(label: impl Into<String>, image: image::RgbaImage) -> Result<Self, TextureError> {
        let label = label.into();
        if image.width() == 0 || image.height() == 0 {
            return Err(TextureError::Empty { label });
        }
        Ok(Self { label, image })
    }

    pub fn label(&self) -> &str {
        &self.label
    }

    pub fn dimensions(&self) -> (u32, u32) {
        self.image.dimensions()
    }

    /// Create the GPU texture and write the pixels into it.
    pub(crate) fn upload(&self, device: &wgpu::Device, queue: &wgpu::Queue) -> wgpu::TextureView {
        let (width, height) = self.dimensions();
        let size = wgpu::Extent3d {
            width,
            height,
            depth_or_array_layers: 1,
        };
        let texture = device.create_texture(&wgpu::TextureDescriptor {
            label: Some(&self.label),
            size,
            mip_level_count: 1,
            sample_count: 1,
            dimension: wgpu::TextureDimension::D2,
            format: wgpu::TextureFormat::Rgba8UnormSrgb,
            usage: wgpu::TextureUsages::TEXTURE_BINDING | wgpu::TextureUsages::COPY_DST,
            view_formats: &[],
        });
        queue.write_texture(
            wgpu::TexelCopyTextureInfo {
                aspect: wgpu::TextureAspect::All,
                texture: &texture,
                mip_level: 0,
                origin: wgpu::Origin3d::ZERO,
            },
            &self.image,
            wgpu::TexelCopyBufferLayout {
                offset: 0,
                bytes_per_row: Some(4 * width),
                rows_per_image: Some(height),
            },
            size,
        );
        texture.create_view(&wgpu::TextureViewDescriptor::default())
    }
}

/// The three surface textures. All must load or startup fails.
#[derive(Debug, Clone)]
pub struct TextureSet {
    pub wall: TextureImage,
    pub floor: TextureImage,
    pub ceiling: TextureImage,
}

impl TextureSet {
    pub fn load(
        wall: impl AsRef<Path>,
        floor: impl AsRef<Path>,
        ceiling: impl AsRef<Path>,
    ) -> Result<Self, TextureError> {
        Ok(Self {
            wall: TextureImage::load(wall)?,
            floor: TextureImage::load(floor)?,
            ceiling: TextureImage::load(ceiling)?,
        })
    }

    pub fn get(&self, surface: Surface) -> &TextureImage {
        match surface {
            Surface::Wall => &self.wall,
            Surface::Floor => &self.floor,
            Surface::Ceiling => &self.ceiling,
        }
    }
}
