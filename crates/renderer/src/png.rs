//! Indexed PNG (color type 3) encoding.

use std::io::Write;

/// Create an indexed PNG from palette and per-pixel indices.
///
/// Indexed encoding is the natural fit for radar imagery: the palette is
/// known up front (gradient levels plus the two reserved classes), each
/// pixel is one byte, and transparency rides in a tRNS chunk.
pub fn create_png_indexed(
    width: usize,
    height: usize,
    palette: &[(u8, u8, u8, u8)],
    indices: &[u8],
) -> Result<Vec<u8>, String> {
    if indices.len() != width * height {
        return Err(format!(
            "index buffer is {} bytes for a {}x{} image",
            indices.len(),
            width,
            height
        ));
    }
    if palette.len() > 256 {
        return Err(format!("palette has {} entries, max 256", palette.len()));
    }

    let mut png = Vec::new();

    // PNG signature
    png.extend_from_slice(&[137, 80, 78, 71, 13, 10, 26, 10]);

    // IHDR chunk
    let mut ihdr_data = Vec::with_capacity(13);
    ihdr_data.extend_from_slice(&(width as u32).to_be_bytes());
    ihdr_data.extend_from_slice(&(height as u32).to_be_bytes());
    ihdr_data.push(8); // bit depth (8 bits per palette index)
    ihdr_data.push(3); // color type 3 = indexed
    ihdr_data.push(0); // compression method
    ihdr_data.push(0); // filter method
    ihdr_data.push(0); // interlace method
    write_chunk(&mut png, b"IHDR", &ihdr_data);

    // PLTE chunk (palette)
    let mut plte_data = Vec::with_capacity(palette.len() * 3);
    for (r, g, b, _) in palette {
        plte_data.push(*r);
        plte_data.push(*g);
        plte_data.push(*b);
    }
    write_chunk(&mut png, b"PLTE", &plte_data);

    // tRNS chunk (transparency) - only if any color has alpha < 255
    let has_transparency = palette.iter().any(|(_, _, _, a)| *a < 255);
    if has_transparency {
        let trns_data: Vec<u8> = palette.iter().map(|(_, _, _, a)| *a).collect();
        write_chunk(&mut png, b"tRNS", &trns_data);
    }

    // IDAT chunk (image data)
    let idat_data = deflate_idat_indexed(indices, width, height)
        .map_err(|e| format!("IDAT compression failed: {}", e))?;
    write_chunk(&mut png, b"IDAT", &idat_data);

    // IEND chunk
    write_chunk(&mut png, b"IEND", &[]);

    Ok(png)
}

/// Deflate indexed image data for the IDAT chunk.
fn deflate_idat_indexed(indices: &[u8], width: usize, height: usize) -> std::io::Result<Vec<u8>> {
    // Each scanline is a filter byte (0 = none) followed by width indices.
    let mut uncompressed = Vec::with_capacity(height * (1 + width));
    for y in 0..height {
        uncompressed.push(0); // filter type: none
        let row_start = y * width;
        uncompressed.extend_from_slice(&indices[row_start..row_start + width]);
    }

    let mut encoder = flate2::write::ZlibEncoder::new(Vec::new(), flate2::Compression::fast());
    encoder.write_all(&uncompressed)?;
    encoder.finish()
}

/// Write a PNG chunk: length, type, data, CRC.
fn write_chunk(png: &mut Vec<u8>, chunk_type: &[u8; 4], data: &[u8]) {
    png.extend_from_slice(&(data.len() as u32).to_be_bytes());
    png.extend_from_slice(chunk_type);
    png.extend_from_slice(data);

    let mut hasher = crc32fast::Hasher::new();
    hasher.update(chunk_type);
    hasher.update(data);
    png.extend_from_slice(&hasher.finalize().to_be_bytes());
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_png_structure() {
        let palette = [(0, 0, 0, 0), (255, 0, 0, 255)];
        let indices = [0u8, 1, 1, 0];
        let png = create_png_indexed(2, 2, &palette, &indices).unwrap();

        assert_eq!(&png[..8], &[137, 80, 78, 71, 13, 10, 26, 10]);
        // IHDR directly after the signature
        assert_eq!(&png[12..16], b"IHDR");
        // Transparent palette entry forces a tRNS chunk
        assert!(png.windows(4).any(|w| w == b"tRNS"));
        assert_eq!(&png[png.len() - 8..png.len() - 4], b"IEND");
    }

    #[test]
    fn test_opaque_palette_skips_trns() {
        let palette = [(255, 0, 0, 255), (0, 255, 0, 255)];
        let indices = [0u8, 1];
        let png = create_png_indexed(2, 1, &palette, &indices).unwrap();
        assert!(!png.windows(4).any(|w| w == b"tRNS"));
    }

    #[test]
    fn test_size_mismatch_rejected() {
        let palette = [(0, 0, 0, 255)];
        assert!(create_png_indexed(3, 3, &palette, &[0u8; 4]).is_err());
    }
}
