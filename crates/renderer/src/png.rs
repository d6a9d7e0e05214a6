//! PNG encoding for rendered images.
//!
//! Two encodings:
//! - **Indexed (color type 3)** when the image has at most 256 distinct
//!   RGBA values, which is the common case for flat-colored maps.
//! - **Truecolor with alpha (color type 6)** otherwise.
//!
//! [`create_png_auto`] picks between them.

use map_common::{MapError, MapResult};
use rayon::prelude::*;
use std::collections::{HashMap, HashSet};
use std::io::Write;

const SIGNATURE: [u8; 8] = [137, 80, 78, 71, 13, 10, 26, 10];

const COLOR_TYPE_INDEXED: u8 = 3;
const COLOR_TYPE_RGBA: u8 = 6;

/// Palette size limit of an 8-bit indexed PNG
const MAX_PALETTE_SIZE: usize = 256;

/// Images at least this large collect their palette in parallel
const PARALLEL_THRESHOLD: usize = 4096;

pub type Palette = Vec<[u8; 4]>;

/// Encode RGBA pixels, indexed when the colors fit a palette.
pub fn create_png_auto(pixels: &[u8], width: u32, height: u32) -> MapResult<Vec<u8>> {
    check_len(pixels.len(), width, height, 4)?;

    let extracted = if pixels.len() / 4 >= PARALLEL_THRESHOLD {
        extract_palette_parallel(pixels)
    } else {
        extract_palette(pixels)
    };

    match extracted {
        Some((palette, indices)) => create_png_indexed(width, height, &palette, &indices),
        None => create_png(pixels, width, height),
    }
}

/// Encode RGBA pixels as truecolor with alpha.
pub fn create_png(pixels: &[u8], width: u32, height: u32) -> MapResult<Vec<u8>> {
    check_len(pixels.len(), width, height, 4)?;

    let mut png = start_png(width, height, COLOR_TYPE_RGBA);
    write_chunk(&mut png, b"IDAT", &deflate_scanlines(pixels, width as usize * 4)?);
    write_chunk(&mut png, b"IEND", &[]);
    Ok(png)
}

/// Encode palette indices. A `tRNS` chunk is written only when some palette
/// entry is not opaque.
pub fn create_png_indexed(
    width: u32,
    height: u32,
    palette: &[[u8; 4]],
    indices: &[u8],
) -> MapResult<Vec<u8>> {
    check_len(indices.len(), width, height, 1)?;
    if palette.is_empty() || palette.len() > MAX_PALETTE_SIZE {
        return Err(MapError::Encode(format!(
            "palette must hold 1..={} colors, got {}",
            MAX_PALETTE_SIZE,
            palette.len()
        )));
    }

    let mut png = start_png(width, height, COLOR_TYPE_INDEXED);

    let plte: Vec<u8> = palette.iter().flat_map(|c| [c[0], c[1], c[2]]).collect();
    write_chunk(&mut png, b"PLTE", &plte);

    if palette.iter().any(|c| c[3] < 255) {
        let trns: Vec<u8> = palette.iter().map(|c| c[3]).collect();
        write_chunk(&mut png, b"tRNS", &trns);
    }

    write_chunk(&mut png, b"IDAT", &deflate_scanlines(indices, width as usize)?);
    write_chunk(&mut png, b"IEND", &[]);
    Ok(png)
}

fn check_len(len: usize, width: u32, height: u32, bytes_per_pixel: usize) -> MapResult<()> {
    let expected = width as usize * height as usize * bytes_per_pixel;
    if width == 0 || height == 0 || len != expected {
        return Err(MapError::Encode(format!(
            "{}x{} image needs {} bytes, got {}",
            width, height, expected, len
        )));
    }
    Ok(())
}

/// Signature plus IHDR for 8-bit, non-interlaced images.
fn start_png(width: u32, height: u32, color_type: u8) -> Vec<u8> {
    let mut png = Vec::with_capacity(1024);
    png.extend_from_slice(&SIGNATURE);

    let mut ihdr = Vec::with_capacity(13);
    ihdr.extend_from_slice(&width.to_be_bytes());
    ihdr.extend_from_slice(&height.to_be_bytes());
    ihdr.extend_from_slice(&[8, color_type, 0, 0, 0]);
    write_chunk(&mut png, b"IHDR", &ihdr);
    png
}

/// Length, type, data, CRC over type + data.
fn write_chunk(png: &mut Vec<u8>, chunk_type: &[u8; 4], data: &[u8]) {
    png.extend_from_slice(&(data.len() as u32).to_be_bytes());
    png.extend_from_slice(chunk_type);
    png.extend_from_slice(data);

    let mut hasher = crc32fast::Hasher::new();
    hasher.update(chunk_type);
    hasher.update(data);
    png.extend_from_slice(&hasher.finalize().to_be_bytes());
}

/// Zlib-compress rows of `stride` bytes, each prefixed with filter type 0.
fn deflate_scanlines(data: &[u8], stride: usize) -> MapResult<Vec<u8>> {
    let mut raw = Vec::with_capacity(data.len() + data.len() / stride.max(1));
    for row in data.chunks_exact(stride) {
        raw.push(0);
        raw.extend_from_slice(row);
    }

    let mut encoder = flate2::write::ZlibEncoder::new(Vec::new(), flate2::Compression::fast());
    encoder
        .write_all(&raw)
        .and_then(|_| encoder.finish())
        .map_err(|e| MapError::Encode(format!("IDAT compression failed: {}", e)))
}

#[inline(always)]
fn pack(px: &[u8]) -> u32 {
    u32::from_le_bytes([px[0], px[1], px[2], px[3]])
}

/// Palette in first-seen order plus one index per pixel, or `None` when
/// there are more than 256 colors.
fn extract_palette(pixels: &[u8]) -> Option<(Palette, Vec<u8>)> {
    let mut lookup: HashMap<u32, u8> = HashMap::with_capacity(MAX_PALETTE_SIZE);
    let mut palette = Vec::with_capacity(MAX_PALETTE_SIZE);
    let mut indices = Vec::with_capacity(pixels.len() / 4);

    for px in pixels.chunks_exact(4) {
        let key = pack(px);
        let index = match lookup.get(&key) {
            Some(&index) => index,
            None => {
                if palette.len() == MAX_PALETTE_SIZE {
                    return None;
                }
                let index = palette.len() as u8;
                palette.push([px[0], px[1], px[2], px[3]]);
                lookup.insert(key, index);
                index
            }
        };
        indices.push(index);
    }

    Some((palette, indices))
}

/// Same result set as [`extract_palette`] for large images: distinct colors
/// are gathered per chunk in parallel, then pixels are mapped in parallel.
/// Palette order is sorted rather than first-seen.
fn extract_palette_parallel(pixels: &[u8]) -> Option<(Palette, Vec<u8>)> {
    let pixels_per_chunk = (pixels.len() / 4 / rayon::current_num_threads()).max(256);
    let chunk_bytes = pixels_per_chunk * 4;

    let colors = pixels
        .par_chunks(chunk_bytes)
        .map(|chunk| {
            let mut local = HashSet::with_capacity(MAX_PALETTE_SIZE);
            for px in chunk.chunks_exact(4) {
                local.insert(pack(px));
                if local.len() > MAX_PALETTE_SIZE {
                    return None;
                }
            }
            Some(local)
        })
        .try_reduce(HashSet::new, |mut a, b| {
            a.extend(b);
            (a.len() <= MAX_PALETTE_SIZE).then_some(a)
        })?;

    let mut sorted: Vec<u32> = colors.into_iter().collect();
    sorted.sort_unstable();
    let lookup: HashMap<u32, u8> = sorted
        .iter()
        .enumerate()
        .map(|(i, &key)| (key, i as u8))
        .collect();
    let palette = sorted.iter().map(|key| key.to_le_bytes()).collect();

    let mut indices = vec![0u8; pixels.len() / 4];
    indices
        .par_chunks_mut(pixels_per_chunk)
        .zip(pixels.par_chunks(chunk_bytes))
        .for_each(|(out, chunk)| {
            for (slot, px) in out.iter_mut().zip(chunk.chunks_exact(4)) {
                *slot = lookup.get(&pack(px)).copied().unwrap_or(0);
            }
        });

    Some((palette, indices))
}
