//! PNG encoding and atomic output
//!
//! Frames are written as 8-bit RGB with a `pHYs` chunk carrying the DPI and
//! no time or text chunks, so identical pixels always give identical bytes.

use crate::errors::{Result, SliceVisError};
use std::io::Write;
use std::path::Path;
use tempfile::NamedTempFile;

const SIGNATURE: [u8; 8] = [137, 80, 78, 71, 13, 10, 26, 10];

const INCHES_PER_METER: f64 = 1.0 / 0.0254;

/// Encodes tightly packed RGB pixels as a PNG.
///
/// # Errors
///
/// Returns [`SliceVisError::RenderBackend`] if `rgb` does not hold exactly
/// `width * height` pixels or the image is empty.
pub fn encode_png(rgb: &[u8], width: u32, height: u32, dpi: f64) -> Result<Vec<u8>> {
    let row_bytes = width as usize * 3;
    if width == 0 || height == 0 || rgb.len() != row_bytes * height as usize {
        return Err(SliceVisError::RenderBackend(format!(
            "cannot encode {} bytes as a {width}x{height} RGB image",
            rgb.len()
        )));
    }

    let mut png = Vec::new();
    png.extend_from_slice(&SIGNATURE);

    let mut ihdr = Vec::with_capacity(13);
    ihdr.extend_from_slice(&width.to_be_bytes());
    ihdr.extend_from_slice(&height.to_be_bytes());
    ihdr.push(8); // bit depth
    ihdr.push(2); // colour type: RGB
    ihdr.push(0); // compression
    ihdr.push(0); // filter
    ihdr.push(0); // interlace
    write_chunk(&mut png, b"IHDR", &ihdr);

    let pixels_per_meter = pixels_per_meter(dpi);
    let mut phys = Vec::with_capacity(9);
    phys.extend_from_slice(&pixels_per_meter.to_be_bytes());
    phys.extend_from_slice(&pixels_per_meter.to_be_bytes());
    phys.push(1); // unit: meter
    write_chunk(&mut png, b"pHYs", &phys);

    let idat = deflate_scanlines(rgb, row_bytes)
        .map_err(|e| SliceVisError::RenderBackend(format!("IDAT compression failed: {e}")))?;
    write_chunk(&mut png, b"IDAT", &idat);

    write_chunk(&mut png, b"IEND", &[]);
    Ok(png)
}

/// Physical resolution for the `pHYs` chunk
pub fn pixels_per_meter(dpi: f64) -> u32 {
    (dpi * INCHES_PER_METER).round() as u32
}

/// Writes `bytes` to `path` through a temporary file in the same directory,
/// so readers never observe a partially written frame.
pub fn write_atomic(path: &Path, bytes: &[u8]) -> Result<()> {
    let parent = match path.parent() {
        Some(dir) if !dir.as_os_str().is_empty() => dir,
        _ => Path::new("."),
    };

    let mut staged = NamedTempFile::new_in(parent)?;
    staged.write_all(bytes)?;
    staged.as_file().sync_all()?;
    staged.persist(path).map_err(|e| SliceVisError::Io(e.error))?;
    Ok(())
}

fn write_chunk(png: &mut Vec<u8>, chunk_type: &[u8; 4], data: &[u8]) {
    png.extend_from_slice(&(data.len() as u32).to_be_bytes());
    png.extend_from_slice(chunk_type);
    png.extend_from_slice(data);

    let mut hasher = crc32fast::Hasher::new();
    hasher.update(chunk_type);
    hasher.update(data);
    png.extend_from_slice(&hasher.finalize().to_be_bytes());
}

fn deflate_scanlines(rgb: &[u8], row_bytes: usize) -> std::io::Result<Vec<u8>> {
    let mut raw = Vec::with_capacity(rgb.len() + rgb.len() / row_bytes);
    for row in rgb.chunks_exact(row_bytes) {
        raw.push(0); // filter type: none
        raw.extend_from_slice(row);
    }

    let mut encoder = flate2::write::ZlibEncoder::new(Vec::new(), flate2::Compression::fast());
    encoder.write_all(&raw)?;
    encoder.finish()
}

#[cfg(test)]
mod tests {
    use super::*;
    use flate2::read::ZlibDecoder;
    use std::io::Read;

    // (type, data) pairs after the signature
    fn chunks(png: &[u8]) -> Vec<(String, Vec<u8>)> {
        let mut out = Vec::new();
        let mut pos = SIGNATURE.len();
        while pos < png.len() {
            let len = u32::from_be_bytes(png[pos..pos + 4].try_into().unwrap()) as usize;
            let kind = String::from_utf8(png[pos + 4..pos + 8].to_vec()).unwrap();
            let data = png[pos + 8..pos + 8 + len].to_vec();
            let crc = u32::from_be_bytes(png[pos + 8 + len..pos + 12 + len].try_into().unwrap());
            assert_eq!(crc, crc32fast::hash(&png[pos + 4..pos + 8 + len]));
            out.push((kind, data));
            pos += 12 + len;
        }
        out
    }

    #[test]
    fn test_chunk_layout() {
        let rgb = vec![10u8; 3 * 2 * 3];
        let png = encode_png(&rgb, 3, 2, 300.0).unwrap();
        assert_eq!(&png[..8], &SIGNATURE);

        let chunks = chunks(&png);
        let kinds: Vec<&str> = chunks.iter().map(|(k, _)| k.as_str()).collect();
        assert_eq!(kinds, vec!["IHDR", "pHYs", "IDAT", "IEND"]);

        let ihdr = &chunks[0].1;
        assert_eq!(&ihdr[..8], &[0, 0, 0, 3, 0, 0, 0, 2]);
        assert_eq!(ihdr[9], 2);

        let phys = &chunks[1].1;
        assert_eq!(u32::from_be_bytes(phys[..4].try_into().unwrap()), 11811);
        assert_eq!(phys[8], 1);
    }

    #[test]
    fn test_idat_round_trips_scanlines() {
        let rgb: Vec<u8> = (0..2 * 2 * 3).map(|v| v as u8).collect();
        let png = encode_png(&rgb, 2, 2, 72.0).unwrap();
        let idat = chunks(&png).into_iter().find(|(k, _)| k == "IDAT").unwrap().1;

        let mut raw = Vec::new();
        ZlibDecoder::new(&idat[..]).read_to_end(&mut raw).unwrap();
        assert_eq!(raw, vec![0, 0, 1, 2, 3, 4, 5, 0, 6, 7, 8, 9, 10, 11]);
    }

    #[test]
    fn test_size_mismatch_is_backend_error() {
        let err = encode_png(&[0; 5], 1, 2, 300.0).unwrap_err();
        assert!(matches!(err, SliceVisError::RenderBackend(_)));
    }

    #[test]
    fn test_write_atomic_replaces_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("frame.png");
        write_atomic(&path, b"first").unwrap();
        write_atomic(&path, b"second").unwrap();
        assert_eq!(std::fs::read(&path).unwrap(), b"second");
        assert_eq!(std::fs::read_dir(dir.path()).unwrap().count(), 1);
    }
}
