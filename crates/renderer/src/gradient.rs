//! Per-channel color gradients.

use radar_common::Channel;

/// A piecewise-linear color ramp over a value range.
pub struct Gradient {
    stops: &'static [(f32, (u8, u8, u8))],
}

/// Classic reflectivity ramp: greens through yellows and reds into magenta.
const REFLECTIVITY_STOPS: &[(f32, (u8, u8, u8))] = &[
    (-32.0, (60, 60, 60)),
    (5.0, (0, 160, 240)),
    (20.0, (0, 200, 0)),
    (35.0, (255, 255, 0)),
    (50.0, (255, 128, 0)),
    (60.0, (230, 0, 0)),
    (75.0, (255, 0, 255)),
    (95.0, (255, 255, 255)),
];

/// Diverging ramp for radial velocity: inbound green, outbound red.
const VELOCITY_STOPS: &[(f32, (u8, u8, u8))] = &[
    (-100.0, (0, 80, 0)),
    (-10.0, (0, 220, 0)),
    (0.0, (220, 220, 220)),
    (10.0, (220, 0, 0)),
    (100.0, (80, 0, 0)),
];

const SPECTRUM_WIDTH_STOPS: &[(f32, (u8, u8, u8))] = &[
    (0.0, (20, 20, 80)),
    (10.0, (200, 200, 0)),
    (20.0, (255, 0, 0)),
];

const ZDR_STOPS: &[(f32, (u8, u8, u8))] = &[
    (-8.0, (0, 0, 160)),
    (0.0, (200, 200, 200)),
    (8.0, (160, 0, 0)),
];

const RHOHV_STOPS: &[(f32, (u8, u8, u8))] = &[
    (0.0, (40, 40, 40)),
    (0.8, (0, 120, 200)),
    (0.95, (0, 200, 80)),
    (1.05, (255, 255, 255)),
];

impl Gradient {
    pub fn for_channel(channel: Channel) -> Self {
        let stops = match channel {
            Channel::Reflectivity | Channel::TotalPower => REFLECTIVITY_STOPS,
            Channel::RadialVelocity => VELOCITY_STOPS,
            Channel::SpectrumWidth => SPECTRUM_WIDTH_STOPS,
            Channel::DifferentialReflectivity => ZDR_STOPS,
            Channel::CorrelationCoefficient => RHOHV_STOPS,
        };
        Self { stops }
    }

    /// Value range covered by the ramp.
    pub fn range(&self) -> (f32, f32) {
        (self.stops[0].0, self.stops[self.stops.len() - 1].0)
    }

    /// Interpolated color at a value; clamped at the ends.
    pub fn color_at(&self, value: f32) -> (u8, u8, u8) {
        let first = self.stops[0];
        if value <= first.0 {
            return first.1;
        }
        for pair in self.stops.windows(2) {
            let (v0, c0) = pair[0];
            let (v1, c1) = pair[1];
            if value <= v1 {
                let t = (value - v0) / (v1 - v0);
                return (
                    lerp(c0.0, c1.0, t),
                    lerp(c0.1, c1.1, t),
                    lerp(c0.2, c1.2, t),
                );
            }
        }
        self.stops[self.stops.len() - 1].1
    }
}

#[inline]
fn lerp(a: u8, b: u8, t: f32) -> u8 {
    (a as f32 + (b as f32 - a as f32) * t).round() as u8
}
