use std::path::Path;

use image::imageops::{self, FilterType};
use image::{ImageReader, RgbaImage};

use super::TextureError;

/// Decoded RGBA8 pixels, flipped for a bottom-left origin, with a full mip
/// chain. Level 0 is the full-size image.
#[derive(Debug, Clone)]
pub struct TextureImage {
    levels: Vec<RgbaImage>,
}

impl TextureImage {
    /// Decodes an image file (format sniffed from content), converts it to
    /// RGBA8, flips it vertically and builds its mip chain.
    pub fn decode(path: impl AsRef<Path>) -> Result<Self, TextureError> {
        let path = path.as_ref();
        let decode_err = |source| TextureError::Decode {
            path: path.to_path_buf(),
            source,
        };

        let decoded = ImageReader::open(path)
            .and_then(|reader| reader.with_guessed_format())
            .map_err(|e| decode_err(image::ImageError::IoError(e)))?
            .decode()
            .map_err(decode_err)?;

        Ok(Self::from_rgba(decoded.to_rgba8()))
    }

    /// Builds from top-left-origin RGBA pixels.
    pub fn from_rgba(mut base: RgbaImage) -> Self {
        // Rows are stored bottom-up on the GPU; image files are top-down.
        imageops::flip_vertical_in_place(&mut base);
        Self {
            levels: build_mip_chain(base),
        }
    }

    pub fn width(&self) -> u32 {
        self.levels[0].width()
    }

    pub fn height(&self) -> u32 {
        self.levels[0].height()
    }

    pub fn mip_levels(&self) -> &[RgbaImage] {
        &self.levels
    }
}

/// Number of levels in a full mip chain down to 1x1.
pub fn mip_level_count(width: u32, height: u32) -> u32 {
    32 - width.max(height).max(1).leading_zeros()
}

fn build_mip_chain(base: RgbaImage) -> Vec<RgbaImage> {
    let count = mip_level_count(base.width(), base.height()) as usize;
    let mut levels = Vec::with_capacity(count);
    levels.push(base);

    while levels.len() < count {
        let prev = &levels[levels.len() - 1];
        let w = (prev.width() / 2).max(1);
        let h = (prev.height() / 2).max(1);
        let next = imageops::resize(prev, w, h, FilterType::Triangle);
        levels.push(next);
    }

    levels
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::Rgba;

    const RED: Rgba<u8> = Rgba([255, 0, 0, 255]);
    const BLUE: Rgba<u8> = Rgba([0, 0, 255, 255]);

    /// 1 wide, 2 tall: red on top, blue below.
    fn red_over_blue() -> RgbaImage {
        let mut img = RgbaImage::new(1, 2);
        img.put_pixel(0, 0, RED);
        img.put_pixel(0, 1, BLUE);
        img
    }

    #[test]
    fn level_counts() {
        assert_eq!(mip_level_count(1, 1), 1);
        assert_eq!(mip_level_count(2, 1), 2);
        assert_eq!(mip_level_count(256, 256), 9);
        assert_eq!(mip_level_count(300, 20), 9);
        assert_eq!(mip_level_count(0, 0), 1);
    }

    #[test]
    fn from_rgba_flips_rows() {
        let tex = TextureImage::from_rgba(red_over_blue());
        let base = &tex.mip_levels()[0];
        assert_eq!(*base.get_pixel(0, 0), BLUE);
        assert_eq!(*base.get_pixel(0, 1), RED);
    }

    #[test]
    fn mip_chain_halves_down_to_one() {
        let tex = TextureImage::from_rgba(RgbaImage::new(8, 2));
        let sizes: Vec<_> = tex.mip_levels().iter().map(|l| l.dimensions()).collect();
        assert_eq!(sizes, vec![(8, 2), (4, 1), (2, 1), (1, 1)]);
    }

    #[test]
    fn decode_png_from_disk() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("stripe.png");
        red_over_blue().save(&path).unwrap();

        let tex = TextureImage::decode(&path).unwrap();
        assert_eq!((tex.width(), tex.height()), (1, 2));
        assert_eq!(*tex.mip_levels()[0].get_pixel(0, 0), BLUE);
        assert_eq!(tex.mip_levels().len(), 2);
    }

    #[test]
    fn decode_garbage_fails() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("not-an-image.png");
        std::fs::write(&path, b"definitely not a png").unwrap();

        let err = TextureImage::decode(&path).unwrap_err();
        assert!(matches!(err, TextureError::Decode { .. }));
    }

    #[test]
    fn decode_missing_file_fails() {
        let dir = tempfile::tempdir().unwrap();
        let err = TextureImage::decode(dir.path().join("missing.png")).unwrap_err();
        match err {
            TextureError::Decode { source, .. } => {
                assert!(matches!(source, image::ImageError::IoError(_)))
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }
}
