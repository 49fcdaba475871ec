//! Prompt templates

use crate::sensitivity::analysis::SensitivityBand;

/// Templates for the prompts this crate sends on its own behalf
pub struct PromptTemplate;

impl PromptTemplate {
    /// System prompt for the primary session
    pub fn assistant_system() -> &'static str {
        r#"You are a friendly, helpful AI assistant. You engage in natural conversations and provide helpful responses.
- Provide detailed, relevant answers to questions
- Be concise but informative
- If asked about math, provide step-by-step explanations
- If you don't know something, be honest about it"#
    }

    /// User prompt asking for a 0-100 sensitivity rating of `text`
    pub fn sensitivity_analysis(text: &str) -> String {
        let mut prompt = String::from(
            "Analyze the following text for sensitivity level. Rate it on a scale of 0-100 where:\n",
        );

        for band in SensitivityBand::ALL {
            let (low, high) = band.range();
            prompt.push_str(&format!("{}-{}: {}\n", low, high, band.description()));
        }

        prompt.push_str(&format!(
            r#"
Provide the rating and a brief explanation.

Text to analyze: "{}""#,
            text
        ));

        prompt
    }
}
