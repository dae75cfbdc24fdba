//! Radar measurement channels.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// A radar measurement type, named after the ODIM quantity codes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Channel {
    /// Horizontal reflectivity factor (dBZ)
    Reflectivity,
    /// Uncorrected horizontal reflectivity factor (dBZ)
    TotalPower,
    /// Radial velocity (m/s)
    RadialVelocity,
    /// Spectrum width (m/s)
    SpectrumWidth,
    /// Differential reflectivity (dB)
    DifferentialReflectivity,
    /// Correlation coefficient (0-1)
    CorrelationCoefficient,
}

impl Channel {
    /// ODIM short name for this channel.
    pub fn as_str(&self) -> &'static str {
        match self {
            Channel::Reflectivity => "DBZH",
            Channel::TotalPower => "TH",
            Channel::RadialVelocity => "VRADH",
            Channel::SpectrumWidth => "WRADH",
            Channel::DifferentialReflectivity => "ZDR",
            Channel::CorrelationCoefficient => "RHOHV",
        }
    }

    /// All channels the pipeline knows how to render.
    pub fn all() -> &'static [Channel] {
        &[
            Channel::Reflectivity,
            Channel::TotalPower,
            Channel::RadialVelocity,
            Channel::SpectrumWidth,
            Channel::DifferentialReflectivity,
            Channel::CorrelationCoefficient,
        ]
    }

    /// Physically plausible value range for this channel, used by the
    /// threshold filter to turn garbage samples into missing data.
    pub fn valid_range(&self) -> (f32, f32) {
        match self {
            Channel::Reflectivity | Channel::TotalPower => (-32.0, 95.0),
            Channel::RadialVelocity => (-100.0, 100.0),
            Channel::SpectrumWidth => (0.0, 20.0),
            Channel::DifferentialReflectivity => (-8.0, 8.0),
            Channel::CorrelationCoefficient => (0.0, 1.05),
        }
    }
}

impl fmt::Display for Channel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Channel {
    type Err = UnknownChannel;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "DBZH" => Ok(Channel::Reflectivity),
            "TH" => Ok(Channel::TotalPower),
            "VRADH" => Ok(Channel::RadialVelocity),
            "WRADH" => Ok(Channel::SpectrumWidth),
            "ZDR" => Ok(Channel::DifferentialReflectivity),
            "RHOHV" => Ok(Channel::CorrelationCoefficient),
            other => Err(UnknownChannel(other.to_string())),
        }
    }
}

#[derive(Debug, thiserror::Error)]
#[error("Unknown channel: {0}")]
pub struct UnknownChannel(pub String);
