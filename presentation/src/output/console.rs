//! Console output formatter for prompt results

use colored::{ColoredString, Colorize};
use promptline_domain::{
    ConfigIssue, SensitivityAnalysis, SensitivityBand, Severity, TokenUsage,
};
use serde::Serialize;

/// One prompt of a batch together with its response
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct BatchEntry<'a> {
    pub prompt: &'a str,
    pub response: &'a str,
}

impl<'a> BatchEntry<'a> {
    /// Pair prompts with responses in input order
    pub fn zip(prompts: &'a [String], responses: &'a [String]) -> Vec<Self> {
        prompts
            .iter()
            .zip(responses)
            .map(|(prompt, response)| BatchEntry { prompt, response })
            .collect()
    }
}

/// Formats results for console display
pub struct ConsoleFormatter;

impl ConsoleFormatter {
    /// Format a single answer
    pub fn format_answer(response: &str) -> String {
        format!("{}\n", response.trim_end())
    }

    /// Format a single answer as JSON
    pub fn format_answer_json(prompt: &str, response: &str) -> String {
        Self::to_json(&BatchEntry { prompt, response })
    }

    /// Format batch results, numbered in input order
    pub fn format_batch(entries: &[BatchEntry<'_>]) -> String {
        let mut output = String::new();
        for (i, entry) in entries.iter().enumerate() {
            if i > 0 {
                output.push('\n');
            }
            output.push_str(&format!(
                "{}\n{}\n",
                format!("── [{}] {} ──", i + 1, entry.prompt).yellow().bold(),
                entry.response.trim_end()
            ));
        }
        output
    }

    /// Format batch results as a JSON array
    pub fn format_batch_json(entries: &[BatchEntry<'_>]) -> String {
        Self::to_json(&entries)
    }

    /// Format a sensitivity rating
    pub fn format_analysis(analysis: &SensitivityAnalysis) -> String {
        let band = analysis.band();
        let mut output = String::new();

        output.push_str(&format!("{} {}\n", "Text:".cyan().bold(), analysis.text));
        output.push_str(&format!(
            "{} {} {}\n",
            "Level:".cyan().bold(),
            Self::band_color(band, &format!("{}/100", analysis.sensitivity_level)),
            format!("({}: {})", band, band.description()).dimmed()
        ));

        if let Some(explanation) = &analysis.explanation {
            output.push_str(&format!("\n{}\n", "Explanation:".cyan().bold()));
            output.push_str(&Self::indent(explanation.trim_end(), "  "));
            output.push('\n');
        }

        output
    }

    /// Format a sensitivity rating as JSON, band included
    pub fn format_analysis_json(analysis: &SensitivityAnalysis) -> String {
        let value = serde_json::json!({
            "text": analysis.text,
            "sensitivity_level": analysis.sensitivity_level,
            "band": analysis.band(),
            "explanation": analysis.explanation,
        });
        serde_json::to_string_pretty(&value).unwrap_or_else(|_| "{}".to_string())
    }

    /// One-line token usage summary
    pub fn format_usage(usage: &TokenUsage) -> String {
        format!("tokens: {}", usage).dimmed().to_string()
    }

    /// Format a configuration issue for stderr
    pub fn format_issue(issue: &ConfigIssue) -> String {
        let label = match issue.severity {
            Severity::Error => "error:".red().bold(),
            Severity::Warning => "warning:".yellow().bold(),
        };
        format!("{} {}", label, issue.message)
    }

    fn band_color(band: SensitivityBand, text: &str) -> ColoredString {
        match band {
            SensitivityBand::Safe => text.green().bold(),
            SensitivityBand::Mild => text.cyan().bold(),
            SensitivityBand::Moderate => text.yellow().bold(),
            SensitivityBand::High => text.red().bold(),
            SensitivityBand::Extreme => text.magenta().bold(),
        }
    }

    fn to_json<T: Serialize>(value: &T) -> String {
        serde_json::to_string_pretty(value).unwrap_or_else(|_| "{}".to_string())
    }

    /// Indent a multi-line string
    pub fn indent(text: &str, prefix: &str) -> String {
        text.lines()
            .map(|line| format!("{}{}", prefix, line))
            .collect::<Vec<_>>()
            .join("\n")
    }
}
