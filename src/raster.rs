//! Page images for OCR
//!
//! Scanned PDFs carry each page as one or more image XObjects. This module
//! walks every page's resources and decodes those images so an OCR engine
//! can recognize them.

use crate::error::OcrError;
use image::{DynamicImage, GrayImage, RgbImage};
use lopdf::{Dictionary, Document, Object, ObjectId, Stream};

/// Parent chains and nested forms deeper than this are treated as broken
const MAX_DEPTH: usize = 16;

/// Decoded images of one page, or why none could be decoded
pub type PageImages = Result<Vec<DynamicImage>, OcrError>;

/// Collect the images of every page, in page order
pub fn page_images(doc: &Document) -> Vec<(u32, PageImages)> {
    doc.get_pages()
        .into_iter()
        .map(|(number, page_id)| (number, images_on_page(doc, page_id)))
        .collect()
}

fn images_on_page(doc: &Document, page_id: ObjectId) -> PageImages {
    let Some(resources) = page_resources(doc, page_id) else {
        return Ok(Vec::new());
    };

    let mut images = Vec::new();
    let mut failures = Vec::new();
    collect_images(doc, resources, 0, &mut images, &mut failures);

    if images.is_empty() {
        if let Some(first) = failures.into_iter().next() {
            return Err(first);
        }
    } else {
        for failure in &failures {
            tracing::warn!("Skipping undecodable image on page: {}", failure);
        }
    }

    Ok(images)
}

/// Resources of a page, inherited from the page tree when the page has none
fn page_resources(doc: &Document, page_id: ObjectId) -> Option<&Dictionary> {
    let mut node = doc.get_dictionary(page_id).ok()?;

    for _ in 0..MAX_DEPTH {
        if let Ok(resources) = node.get(b"Resources") {
            return resolve(doc, resources)?.as_dict().ok();
        }
        let parent = node.get(b"Parent").ok()?.as_reference().ok()?;
        node = doc.get_dictionary(parent).ok()?;
    }

    None
}

fn collect_images(
    doc: &Document,
    resources: &Dictionary,
    depth: usize,
    images: &mut Vec<DynamicImage>,
    failures: &mut Vec<OcrError>,
) {
    if depth > MAX_DEPTH {
        return;
    }

    let Some(xobjects) = resources
        .get(b"XObject")
        .ok()
        .and_then(|obj| resolve(doc, obj))
        .and_then(|obj| obj.as_dict().ok())
    else {
        return;
    };

    for (name, object) in xobjects.iter() {
        let Some(stream) = resolve(doc, object).and_then(|obj| obj.as_stream().ok()) else {
            continue;
        };

        match name_of(stream.dict.get(b"Subtype").ok()).as_deref() {
            Some("Image") => match decode_image(doc, stream) {
                Ok(image) => images.push(image),
                Err(e) => {
                    tracing::debug!("Image /{} failed to decode: {}", String::from_utf8_lossy(name), e);
                    failures.push(e);
                }
            },
            // Forms can wrap the actual scan
            Some("Form") => {
                if let Some(nested) = stream
                    .dict
                    .get(b"Resources")
                    .ok()
                    .and_then(|obj| resolve(doc, obj))
                    .and_then(|obj| obj.as_dict().ok())
                {
                    collect_images(doc, nested, depth + 1, images, failures);
                }
            }
            _ => {}
        }
    }
}

/// Decode an image XObject into pixels
pub fn decode_image(doc: &Document, stream: &Stream) -> Result<DynamicImage, OcrError> {
    if is_dct(doc, stream) {
        return image::load_from_memory(&stream.content)
            .map_err(|e| OcrError::Processing(format!("Failed to decode JPEG image: {}", e)));
    }

    let width = dimension(stream, b"Width")?;
    let height = dimension(stream, b"Height")?;

    let data = if stream.dict.has(b"Filter") {
        stream
            .decompressed_content()
            .map_err(|e| OcrError::Processing(format!("Failed to decompress image: {}", e)))?
    } else {
        stream.content.clone()
    };

    let image_mask = matches!(stream.dict.get(b"ImageMask"), Ok(Object::Boolean(true)));
    let bits = if image_mask {
        1
    } else {
        let raw = stream
            .dict
            .get(b"BitsPerComponent")
            .ok()
            .and_then(|b| b.as_i64().ok())
            .unwrap_or(8);
        u8::try_from(raw).map_err(|_| {
            OcrError::Processing(format!(
                "Unsupported image format: {} bits per component",
                raw
            ))
        })?
    };
    let color_space = if image_mask {
        "DeviceGray".to_string()
    } else {
        color_space(doc, stream)
    };

    tracing::debug!(
        "PDF image: {}x{}, {} bits, color_space={}, data_len={}",
        width,
        height,
        bits,
        color_space,
        data.len()
    );

    match (color_space.as_str(), bits) {
        ("DeviceGray" | "CalGray", 1 | 2 | 4 | 8) => {
            let pixels = unpack_gray(&data, width, height, bits)?;
            GrayImage::from_raw(width, height, pixels)
                .map(DynamicImage::ImageLuma8)
                .ok_or_else(|| OcrError::Processing("Invalid grayscale image data".to_string()))
        }
        ("DeviceRGB" | "CalRGB" | "ICCBased", 8) => {
            let expected = pixel_count(width, height) * 3;
            let pixels = take_exact(data, expected, "RGB")?;
            RgbImage::from_raw(width, height, pixels)
                .map(DynamicImage::ImageRgb8)
                .ok_or_else(|| OcrError::Processing("Invalid RGB image data".to_string()))
        }
        ("DeviceCMYK", 8) => {
            let expected = pixel_count(width, height) * 4;
            let cmyk = take_exact(data, expected, "CMYK")?;
            RgbImage::from_raw(width, height, cmyk_to_rgb(&cmyk))
                .map(DynamicImage::ImageRgb8)
                .ok_or_else(|| OcrError::Processing("Invalid CMYK image data".to_string()))
        }
        (space, bits) => Err(OcrError::Processing(format!(
            "Unsupported image format: {} at {} bits per component",
            space, bits
        ))),
    }
}

fn dimension(stream: &Stream, key: &[u8]) -> Result<u32, OcrError> {
    stream
        .dict
        .get(key)
        .ok()
        .and_then(|v| v.as_i64().ok())
        .filter(|v| *v > 0)
        .map(|v| v as u32)
        .ok_or_else(|| {
            OcrError::Processing(format!(
                "Missing image {}",
                String::from_utf8_lossy(key).to_lowercase()
            ))
        })
}

fn pixel_count(width: u32, height: u32) -> usize {
    width as usize * height as usize
}

fn take_exact(mut data: Vec<u8>, expected: usize, kind: &str) -> Result<Vec<u8>, OcrError> {
    if data.len() < expected {
        return Err(OcrError::Processing(format!(
            "Truncated {} image data: {} bytes, expected {}",
            kind,
            data.len(),
            expected
        )));
    }
    data.truncate(expected);
    Ok(data)
}

/// Expand packed gray samples to one byte per pixel. Rows start on a byte
/// boundary.
fn unpack_gray(data: &[u8], width: u32, height: u32, bits: u8) -> Result<Vec<u8>, OcrError> {
    if bits == 8 {
        return take_exact(data.to_vec(), pixel_count(width, height), "grayscale");
    }

    let row_bytes = (width as usize * bits as usize).div_ceil(8);
    if data.len() < row_bytes * height as usize {
        return Err(OcrError::Processing(format!(
            "Truncated grayscale image data: {} bytes, expected {}",
            data.len(),
            row_bytes * height as usize
        )));
    }

    let max = (1u16 << bits) - 1;
    let mask = max as u8;
    let mut pixels = Vec::with_capacity(pixel_count(width, height));
    for row in data.chunks(row_bytes).take(height as usize) {
        for x in 0..width as usize {
            let bit_offset = x * bits as usize;
            let byte = row[bit_offset / 8];
            let shift = 8 - bits as usize - (bit_offset % 8);
            let sample = (byte >> shift) & mask;
            pixels.push((sample as u16 * 255 / max) as u8);
        }
    }
    Ok(pixels)
}

fn cmyk_to_rgb(cmyk: &[u8]) -> Vec<u8> {
    let mut rgb = Vec::with_capacity(cmyk.len() / 4 * 3);
    for px in cmyk.chunks_exact(4) {
        let k = 1.0 - px[3] as f32 / 255.0;
        for channel in &px[..3] {
            rgb.push(((1.0 - *channel as f32 / 255.0) * k * 255.0) as u8);
        }
    }
    rgb
}

fn is_dct(doc: &Document, stream: &Stream) -> bool {
    let Some(filter) = stream.dict.get(b"Filter").ok().and_then(|f| resolve(doc, f)) else {
        return false;
    };
    match filter {
        Object::Name(name) => name == b"DCTDecode",
        Object::Array(filters) => {
            filters.len() == 1 && name_of(filters.first()).as_deref() == Some("DCTDecode")
        }
        _ => false,
    }
}

/// Color space family name, resolving references and `[/ICCBased ...]` arrays
fn color_space(doc: &Document, stream: &Stream) -> String {
    let Some(cs) = stream.dict.get(b"ColorSpace").ok().and_then(|cs| resolve(doc, cs)) else {
        return "DeviceRGB".to_string();
    };

    let family = match cs {
        Object::Array(items) => items.first().and_then(|first| resolve(doc, first)),
        other => Some(other),
    };

    name_of(family).unwrap_or_else(|| "DeviceRGB".to_string())
}

fn name_of(object: Option<&Object>) -> Option<String> {
    object
        .and_then(|o| o.as_name().ok())
        .map(|name| String::from_utf8_lossy(name).into_owned())
}

fn resolve<'a>(doc: &'a Document, object: &'a Object) -> Option<&'a Object> {
    doc.dereference(object).ok().map(|(_, resolved)| resolved)
}
