//! Sensitivity analysis value objects

use serde::{Deserialize, Serialize};
use std::fmt;

/// Highest rating a text can receive.
pub const MAX_SENSITIVITY_LEVEL: u8 = 100;

/// Named rating band on the 0-100 sensitivity scale
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SensitivityBand {
    /// 0-20
    Safe,
    /// 21-40
    Mild,
    /// 41-60
    Moderate,
    /// 61-80
    High,
    /// 81-100
    Extreme,
}

impl SensitivityBand {
    /// All bands in ascending order.
    pub const ALL: [SensitivityBand; 5] = [
        SensitivityBand::Safe,
        SensitivityBand::Mild,
        SensitivityBand::Moderate,
        SensitivityBand::High,
        SensitivityBand::Extreme,
    ];

    /// Band containing `level`. Levels above 100 fall in [`SensitivityBand::Extreme`].
    pub fn from_level(level: u8) -> Self {
        match level {
            0..=20 => SensitivityBand::Safe,
            21..=40 => SensitivityBand::Mild,
            41..=60 => SensitivityBand::Moderate,
            61..=80 => SensitivityBand::High,
            _ => SensitivityBand::Extreme,
        }
    }

    /// Inclusive bounds of the band.
    pub fn range(&self) -> (u8, u8) {
        match self {
            SensitivityBand::Safe => (0, 20),
            SensitivityBand::Mild => (21, 40),
            SensitivityBand::Moderate => (41, 60),
            SensitivityBand::High => (61, 80),
            SensitivityBand::Extreme => (81, MAX_SENSITIVITY_LEVEL),
        }
    }

    /// Wording used in the analysis prompt.
    pub fn description(&self) -> &'static str {
        match self {
            SensitivityBand::Safe => "Safe for all audiences",
            SensitivityBand::Mild => "Mild sensitivity",
            SensitivityBand::Moderate => "Moderate sensitivity",
            SensitivityBand::High => "High sensitivity",
            SensitivityBand::Extreme => "Extreme sensitivity",
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            SensitivityBand::Safe => "safe",
            SensitivityBand::Mild => "mild",
            SensitivityBand::Moderate => "moderate",
            SensitivityBand::High => "high",
            SensitivityBand::Extreme => "extreme",
        }
    }
}

impl fmt::Display for SensitivityBand {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Sensitivity rating of a piece of text (Value Object)
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SensitivityAnalysis {
    /// The text that was rated
    pub text: String,
    /// Rating in `0..=100`
    pub sensitivity_level: u8,
    /// Raw model response the rating was taken from
    pub explanation: Option<String>,
}

impl SensitivityAnalysis {
    /// Build an analysis, clamping `level` into `0..=100`.
    pub fn new(text: impl Into<String>, level: u8, explanation: Option<String>) -> Self {
        Self {
            text: text.into(),
            sensitivity_level: level.min(MAX_SENSITIVITY_LEVEL),
            explanation,
        }
    }

    pub fn band(&self) -> SensitivityBand {
        SensitivityBand::from_level(self.sensitivity_level)
    }
}
