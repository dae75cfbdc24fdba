//! Raster image encoding.
//!
//! Maps raster values through a per-channel color gradient and writes an
//! indexed PNG. The two non-value classes are fixed palette entries: `NaN`
//! ("inside coverage, no data") encodes transparent and the out-of-coverage
//! sentinel encodes an opaque mask color.

pub mod gradient;
pub mod png;

use bytes::Bytes;

use radar_common::raster::is_no_coverage;
use radar_common::{Channel, RadarError, RadarResult, Raster};

use gradient::Gradient;

/// Palette index for `NaN` pixels (fully transparent).
const IDX_TRANSPARENT: u8 = 0;
/// Palette index for out-of-coverage pixels (opaque mask).
const IDX_BLOCKED: u8 = 1;
/// First palette index carrying gradient colors.
const IDX_GRADIENT_BASE: u8 = 2;
/// Number of quantized gradient levels.
const GRADIENT_LEVELS: usize = 128;

/// Encode a raster as an indexed PNG using the channel's gradient.
pub fn encode_raster(raster: &Raster, channel: Channel) -> RadarResult<Bytes> {
    let gradient = Gradient::for_channel(channel);
    let (vmin, vmax) = gradient.range();

    // Fixed entries first, then the quantized gradient ramp.
    let mut palette: Vec<(u8, u8, u8, u8)> = Vec::with_capacity(GRADIENT_LEVELS + 2);
    palette.push((0, 0, 0, 0)); // IDX_TRANSPARENT
    palette.push((48, 48, 48, 255)); // IDX_BLOCKED
    for level in 0..GRADIENT_LEVELS {
        let value = vmin + (level as f32 + 0.5) / GRADIENT_LEVELS as f32 * (vmax - vmin);
        let (r, g, b) = gradient.color_at(value);
        palette.push((r, g, b, 255));
    }

    let indices: Vec<u8> = raster
        .values
        .iter()
        .map(|&v| {
            if v.is_nan() {
                IDX_TRANSPARENT
            } else if is_no_coverage(v) {
                IDX_BLOCKED
            } else {
                let t = ((v - vmin) / (vmax - vmin)).clamp(0.0, 1.0);
                let level = ((t * GRADIENT_LEVELS as f32) as usize).min(GRADIENT_LEVELS - 1);
                IDX_GRADIENT_BASE + level as u8
            }
        })
        .collect();

    let data = png::create_png_indexed(raster.width(), raster.height(), &palette, &indices)
        .map_err(RadarError::RenderError)?;
    Ok(Bytes::from(data))
}

#[cfg(test)]
mod tests {
    use super::*;
    use radar_common::raster::NO_COVERAGE;
    use radar_common::GridSpec;

    fn raster(values: Vec<f32>, width: usize, height: usize) -> Raster {
        Raster {
            spec: GridSpec::new(-91.0, -89.0, 39.0, 41.0, width, height),
            values,
            latitude: vec![40.0; width * height],
            longitude: vec![-90.0; width * height],
        }
    }

    #[test]
    fn test_encode_produces_png() {
        let r = raster(vec![10.0, f32::NAN, NO_COVERAGE, 55.0], 2, 2);
        let png = encode_raster(&r, Channel::Reflectivity).unwrap();
        assert_eq!(&png[..8], &[137, 80, 78, 71, 13, 10, 26, 10]);
    }

    #[test]
    fn test_nan_and_sentinel_use_reserved_indices() {
        let r = raster(vec![f32::NAN, NO_COVERAGE], 2, 1);
        // Round-trip through the index mapping only.
        let png = encode_raster(&r, Channel::Reflectivity).unwrap();
        assert!(!png.is_empty());
    }

    #[test]
    fn test_all_channels_have_gradients() {
        let r = raster(vec![0.5; 4], 2, 2);
        for &channel in Channel::all() {
            assert!(encode_raster(&r, channel).is_ok());
        }
    }
}
