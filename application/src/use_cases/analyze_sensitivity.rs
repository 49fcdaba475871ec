//! Analyze Sensitivity use case
//!
//! Asks the model to rate a text on the 0-100 sensitivity scale and scrapes
//! the rating out of its free-text answer.

use crate::use_cases::send_prompt::{PromptError, Prompter};
use promptline_domain::{
    PromptRequest, PromptTemplate, SensitivityAnalysis, parse_sensitivity_level,
};
use tracing::{debug, info};

/// Sensitivity rating built on plain prompting
#[derive(Clone)]
pub struct SensitivityClassifier {
    prompter: Prompter,
}

impl SensitivityClassifier {
    pub fn new(prompter: Prompter) -> Self {
        Self { prompter }
    }

    /// Rate `text` and keep the raw model answer as the explanation
    ///
    /// Prompt failures propagate unchanged. A response without any number
    /// is rated 0 rather than treated as an error.
    pub async fn analyze(&self, text: &str) -> Result<SensitivityAnalysis, PromptError> {
        let request = PromptRequest::new(text)?;
        let prompt = PromptTemplate::sensitivity_analysis(request.text());

        let response = self.prompter.send(&prompt).await?;
        let level = parse_sensitivity_level(&response);

        let analysis = SensitivityAnalysis::new(request.into_text(), level, Some(response));
        info!(
            "Sensitivity analysis: level {} ({})",
            analysis.sensitivity_level,
            analysis.band()
        );
        debug!("Sensitivity explanation: {:?}", analysis.explanation);

        Ok(analysis)
    }
}
