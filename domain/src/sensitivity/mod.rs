//! Sensitivity classification domain.
//!
//! - [`analysis::SensitivityAnalysis`]: the rating of one piece of text
//! - [`analysis::SensitivityBand`]: the five named rating bands
//! - [`parsing::parse_sensitivity_level`]: lossy rating scrape from model output

pub mod analysis;
pub mod parsing;
