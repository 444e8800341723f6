use image::codecs::jpeg::JpegEncoder;
use image::{DynamicImage, ImageError, ImageFormat};
use lora_capture::ImageEncoding;
use std::io::Cursor;

/// Encodes a framebuffer readback. JPEG drops the alpha channel.
pub fn encode_capture(image: &DynamicImage, encoding: ImageEncoding) -> Result<Vec<u8>, ImageError> {
    let mut bytes = Vec::new();
    match encoding {
        ImageEncoding::Png => {
            image.write_to(&mut Cursor::new(&mut bytes), ImageFormat::Png)?;
        }
        ImageEncoding::Jpeg { quality } => {
            let encoder = JpegEncoder::new_with_quality(&mut bytes, quality.clamp(1, 100));
            DynamicImage::ImageRgb8(image.to_rgb8()).write_with_encoder(encoder)?;
        }
    }
    Ok(bytes)
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::{Rgba, RgbaImage};

    fn gradient() -> DynamicImage {
        DynamicImage::ImageRgba8(RgbaImage::from_fn(32, 32, |x, y| {
            Rgba([(x * 8) as u8, (y * 8) as u8, 128, 255])
        }))
    }

    #[test]
    fn png_signature() {
        let bytes = encode_capture(&gradient(), ImageEncoding::Png).unwrap();
        assert_eq!(&bytes[..8], b"\x89PNG\r\n\x1a\n");
    }

    #[test]
    fn jpeg_signature_and_decodes() {
        let bytes = encode_capture(&gradient(), ImageEncoding::jpeg()).unwrap();
        assert_eq!(&bytes[..2], &[0xFF, 0xD8]);

        let decoded = image::load_from_memory_with_format(&bytes, ImageFormat::Jpeg).unwrap();
        assert_eq!((decoded.width(), decoded.height()), (32, 32));
    }
}
