//! Image handling for PDF documents
//!
//! JPEG bodies are embedded as-is behind a DCTDecode filter. PNG bodies are
//! decoded, alpha-blended over white, and re-compressed with FlateDecode.

use crate::{PdfError, Result};
use image::{DynamicImage, ImageDecoder, ImageReader};
use lopdf::{Dictionary, Stream};
use std::io::Cursor;

impl From<image::ImageError> for PdfError {
    fn from(err: image::ImageError) -> Self {
        PdfError::ImageError(err.to_string())
    }
}

/// Detected image format
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ImageFormat {
    Jpeg,
    Png,
}

/// Pixel dimensions of an image
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ImageDimensions {
    pub width: u32,
    pub height: u32,
}

/// Detect image format from magic bytes
pub fn detect_format(data: &[u8]) -> Result<ImageFormat> {
    if data.len() < 8 {
        return Err(PdfError::ImageError("image data too short".to_string()));
    }

    // JPEG: FF D8 FF
    if data[0] == 0xFF && data[1] == 0xD8 && data[2] == 0xFF {
        return Ok(ImageFormat::Jpeg);
    }

    // PNG: 89 50 4E 47 0D 0A 1A 0A
    if data[0..8] == [0x89, 0x50, 0x4E, 0x47, 0x0D, 0x0A, 0x1A, 0x0A] {
        return Ok(ImageFormat::Png);
    }

    Err(PdfError::ImageError("unknown image format".to_string()))
}

/// Get image dimensions without fully decoding the body
pub fn get_dimensions(data: &[u8]) -> Result<ImageDimensions> {
    match detect_format(data)? {
        ImageFormat::Jpeg => {
            let info = parse_jpeg_frame(data)?;
            Ok(ImageDimensions {
                width: info.width,
                height: info.height,
            })
        }
        ImageFormat::Png => parse_png_header(data),
    }
}

#[derive(Debug, Clone, Copy)]
struct JpegFrame {
    width: u32,
    height: u32,
    num_components: u8,
}

/// Scan JPEG markers for a start-of-frame segment
///
/// SOF segments (FF C0..CF, excluding C4/C8/CC which are tables) carry
/// precision, height, width and the component count at fixed offsets.
fn parse_jpeg_frame(data: &[u8]) -> Result<JpegFrame> {
    let mut i = 2;
    while i + 10 < data.len() {
        if data[i] != 0xFF {
            i += 1;
            continue;
        }

        let marker = data[i + 1];
        if (0xC0..=0xCF).contains(&marker) && marker != 0xC4 && marker != 0xC8 && marker != 0xCC {
            let height = u16::from_be_bytes([data[i + 5], data[i + 6]]) as u32;
            let width = u16::from_be_bytes([data[i + 7], data[i + 8]]) as u32;
            return Ok(JpegFrame {
                width,
                height,
                num_components: data[i + 9],
            });
        }

        if i + 4 < data.len() {
            let length = u16::from_be_bytes([data[i + 2], data[i + 3]]) as usize;
            if length < 2 {
                break;
            }
            i += 2 + length;
        } else {
            break;
        }
    }

    Err(PdfError::ImageError(
        "could not locate JPEG frame header".to_string(),
    ))
}

/// Read width/height from the PNG IHDR chunk
fn parse_png_header(data: &[u8]) -> Result<ImageDimensions> {
    if data.len() < 24 {
        return Err(PdfError::ImageError("PNG data too short".to_string()));
    }

    if &data[12..16] != b"IHDR" {
        return Err(PdfError::ImageError("PNG missing IHDR chunk".to_string()));
    }

    Ok(ImageDimensions {
        width: u32::from_be_bytes([data[16], data[17], data[18], data[19]]),
        height: u32::from_be_bytes([data[20], data[21], data[22], data[23]]),
    })
}

/// An image prepared for embedding as a PDF XObject
#[derive(Debug, Clone)]
pub struct ImageXObject {
    pub width: u32,
    pub height: u32,
    /// "DeviceRGB" or "DeviceGray"
    pub color_space: String,
    pub bits_per_component: u8,
    /// "DCTDecode" for JPEG, "FlateDecode" for PNG
    pub filter: String,
    /// Compressed image data
    pub data: Vec<u8>,
}

impl ImageXObject {
    /// Build an XObject from raw image file bytes, dispatching on format
    pub fn from_bytes(data: &[u8]) -> Result<Self> {
        match detect_format(data)? {
            ImageFormat::Jpeg => Self::from_jpeg(data),
            ImageFormat::Png => Self::from_png(data),
        }
    }

    /// JPEG bodies pass through untouched behind DCTDecode
    pub fn from_jpeg(data: &[u8]) -> Result<Self> {
        let frame = parse_jpeg_frame(data)?;

        let color_space = if frame.num_components == 1 {
            "DeviceGray".to_string()
        } else {
            "DeviceRGB".to_string()
        };

        Ok(Self {
            width: frame.width,
            height: frame.height,
            color_space,
            bits_per_component: 8,
            filter: "DCTDecode".to_string(),
            data: data.to_vec(),
        })
    }

    /// PNG bodies are decoded to raw samples and Flate-compressed
    ///
    /// PDF image XObjects have no alpha channel, so transparency is blended
    /// against a white background.
    pub fn from_png(data: &[u8]) -> Result<Self> {
        let reader = ImageReader::new(Cursor::new(data)).with_guessed_format()?;
        let decoder = reader.into_decoder()?;

        let dims = decoder.dimensions();
        let color_type = decoder.color_type();
        let image = DynamicImage::from_decoder(decoder)?;

        let (raw_data, color_space) = match color_type {
            image::ColorType::L8 | image::ColorType::L16 => {
                let gray = image.to_luma8();
                (gray.into_raw(), "DeviceGray".to_string())
            }
            image::ColorType::La8 | image::ColorType::La16 => {
                let la = image.to_luma_alpha8();
                let mut gray = Vec::with_capacity((dims.0 * dims.1) as usize);
                for pixel in la.pixels() {
                    let alpha = pixel[1] as f32 / 255.0;
                    gray.push((pixel[0] as f32 * alpha + 255.0 * (1.0 - alpha)) as u8);
                }
                (gray, "DeviceGray".to_string())
            }
            image::ColorType::Rgba8 | image::ColorType::Rgba16 => {
                let rgba = image.to_rgba8();
                let mut rgb = Vec::with_capacity((dims.0 * dims.1 * 3) as usize);
                for pixel in rgba.pixels() {
                    let alpha = pixel[3] as f32 / 255.0;
                    for channel in 0..3 {
                        rgb.push(
                            (pixel[channel] as f32 * alpha + 255.0 * (1.0 - alpha)) as u8,
                        );
                    }
                }
                (rgb, "DeviceRGB".to_string())
            }
            _ => {
                let rgb = image.to_rgb8();
                (rgb.into_raw(), "DeviceRGB".to_string())
            }
        };

        let mut encoder =
            flate2::write::ZlibEncoder::new(Vec::new(), flate2::Compression::default());
        std::io::Write::write_all(&mut encoder, &raw_data)?;
        let compressed = encoder.finish()?;

        Ok(Self {
            width: dims.0,
            height: dims.1,
            color_space,
            bits_per_component: 8,
            filter: "FlateDecode".to_string(),
            data: compressed,
        })
    }

    /// Convert to a lopdf Stream object
    pub fn to_pdf_stream(&self) -> Stream {
        let mut dict = Dictionary::new();

        dict.set("Type", lopdf::Object::Name(b"XObject".to_vec()));
        dict.set("Subtype", lopdf::Object::Name(b"Image".to_vec()));
        dict.set("Width", self.width as i64);
        dict.set("Height", self.height as i64);
        dict.set(
            "ColorSpace",
            lopdf::Object::Name(self.color_space.as_bytes().to_vec()),
        );
        dict.set("BitsPerComponent", self.bits_per_component as i64);
        dict.set(
            "Filter",
            lopdf::Object::Name(self.filter.as_bytes().to_vec()),
        );
        dict.set("Length", self.data.len() as i64);

        Stream::new(dict, self.data.clone())
    }
}

/// Generate operators that draw an image XObject into a rectangle
///
/// `x`/`y` are in PDF coordinates (origin bottom-left). The cm matrix maps
/// the unit image square onto the target rectangle.
pub fn generate_image_operators(
    image_name: &str,
    x: f64,
    y: f64,
    width: f64,
    height: f64,
) -> Vec<u8> {
    format!("q\n{width} 0 0 {height} {x} {y} cm\n/{image_name} Do\nQ\n").into_bytes()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn minimal_jpeg(width: u16, height: u16, components: u8) -> Vec<u8> {
        let mut data = vec![0xFF, 0xD8]; // SOI
        data.extend_from_slice(&[0xFF, 0xC0, 0x00, 0x11, 0x08]); // SOF0, length, precision
        data.extend_from_slice(&height.to_be_bytes());
        data.extend_from_slice(&width.to_be_bytes());
        data.push(components);
        data.extend_from_slice(&[
            0x01, 0x22, 0x00, 0x02, 0x11, 0x01, 0x03, 0x11, 0x01, 0xFF, 0xD9,
        ]);
        data
    }

    fn minimal_png_header(width: u32, height: u32) -> Vec<u8> {
        let mut data = vec![0x89, 0x50, 0x4E, 0x47, 0x0D, 0x0A, 0x1A, 0x0A];
        data.extend_from_slice(&13u32.to_be_bytes());
        data.extend_from_slice(b"IHDR");
        data.extend_from_slice(&width.to_be_bytes());
        data.extend_from_slice(&height.to_be_bytes());
        data.extend_from_slice(&[8, 2, 0, 0, 0]);
        data
    }

    #[test]
    fn test_detect_jpeg_and_png() {
        assert_eq!(
            detect_format(&minimal_jpeg(10, 10, 3)).unwrap(),
            ImageFormat::Jpeg
        );
        assert_eq!(
            detect_format(&minimal_png_header(10, 10)).unwrap(),
            ImageFormat::Png
        );
    }

    #[test]
    fn test_detect_unknown_format() {
        assert!(detect_format(&[0x00; 16]).is_err());
        assert!(detect_format(b"GIF89a\x00\x00").is_err());
    }

    #[test]
    fn test_detect_too_short() {
        assert!(detect_format(&[0xFF, 0xD8]).is_err());
    }

    #[test]
    fn test_jpeg_dimensions() {
        let dims = get_dimensions(&minimal_jpeg(200, 100, 3)).unwrap();
        assert_eq!(dims.width, 200);
        assert_eq!(dims.height, 100);
    }

    #[test]
    fn test_png_dimensions() {
        let dims = get_dimensions(&minimal_png_header(150, 75)).unwrap();
        assert_eq!(dims.width, 150);
        assert_eq!(dims.height, 75);
    }

    #[test]
    fn test_png_missing_ihdr() {
        let mut data = vec![0x89, 0x50, 0x4E, 0x47, 0x0D, 0x0A, 0x1A, 0x0A];
        data.extend_from_slice(&13u32.to_be_bytes());
        data.extend_from_slice(b"NOPE");
        data.extend_from_slice(&[0u8; 8]);
        assert!(parse_png_header(&data).is_err());
    }

    #[test]
    fn test_from_jpeg_grayscale() {
        let xobject = ImageXObject::from_jpeg(&minimal_jpeg(10, 20, 1)).unwrap();
        assert_eq!(xobject.color_space, "DeviceGray");
        assert_eq!(xobject.filter, "DCTDecode");
        assert_eq!(xobject.width, 10);
        assert_eq!(xobject.height, 20);
    }

    #[test]
    fn test_from_jpeg_preserves_body() {
        let jpeg = minimal_jpeg(10, 20, 3);
        let xobject = ImageXObject::from_jpeg(&jpeg).unwrap();
        assert_eq!(xobject.data, jpeg);
        assert_eq!(xobject.color_space, "DeviceRGB");
    }

    #[test]
    fn test_from_png_rgba_blends_alpha() {
        // 1x1 fully transparent red pixel should blend to white
        let mut png = Vec::new();
        let img = image::RgbaImage::from_pixel(1, 1, image::Rgba([255, 0, 0, 0]));
        image::DynamicImage::ImageRgba8(img)
            .write_to(&mut Cursor::new(&mut png), image::ImageFormat::Png)
            .unwrap();

        let xobject = ImageXObject::from_png(&png).unwrap();
        assert_eq!(xobject.color_space, "DeviceRGB");
        assert_eq!(xobject.filter, "FlateDecode");

        let mut decoder = flate2::read::ZlibDecoder::new(&xobject.data[..]);
        let mut raw = Vec::new();
        std::io::Read::read_to_end(&mut decoder, &mut raw).unwrap();
        assert_eq!(raw, vec![255, 255, 255]);
    }

    #[test]
    fn test_to_pdf_stream_dictionary() {
        let xobject = ImageXObject {
            width: 100,
            height: 50,
            color_space: "DeviceRGB".to_string(),
            bits_per_component: 8,
            filter: "DCTDecode".to_string(),
            data: vec![1, 2, 3],
        };

        let stream = xobject.to_pdf_stream();
        let dict = &stream.dict;
        assert_eq!(dict.get(b"Subtype").unwrap().as_name().unwrap(), b"Image");
        assert_eq!(dict.get(b"Width").unwrap().as_i64().unwrap(), 100);
        assert_eq!(dict.get(b"Height").unwrap().as_i64().unwrap(), 50);
        assert_eq!(
            dict.get(b"Filter").unwrap().as_name().unwrap(),
            b"DCTDecode"
        );
        assert_eq!(stream.content, vec![1, 2, 3]);
    }

    #[test]
    fn test_image_operators() {
        let ops = generate_image_operators("Im1", 100.0, 200.0, 50.0, 75.0);
        let s = String::from_utf8(ops).unwrap();

        assert!(s.contains("50 0 0 75 100 200 cm"));
        assert!(s.contains("/Im1 Do"));
    }
}
