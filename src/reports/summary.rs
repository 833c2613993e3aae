//! Summary report generator for shell output.
//!
//! Provides a compact, human-readable summary for terminal usage.

use super::{ReportConfig, ReportFormat, ReportGenerator};
use crate::diff::DeltaForest;
use crate::error::Result;
use crate::problems::{Problem, Severity};

/// Apply ANSI color formatting if colored output is enabled.
fn ansi_color(text: &str, color: &str, colored: bool) -> String {
    if colored {
        match color {
            "red" => format!("\x1b[31m{text}\x1b[0m"),
            "green" => format!("\x1b[32m{text}\x1b[0m"),
            "yellow" => format!("\x1b[33m{text}\x1b[0m"),
            "cyan" => format!("\x1b[36m{text}\x1b[0m"),
            "bold" => format!("\x1b[1m{text}\x1b[0m"),
            "dim" => format!("\x1b[2m{text}\x1b[0m"),
            _ => text.to_string(),
        }
    } else {
        text.to_string()
    }
}

/// Summary reporter for shell output
pub struct SummaryReporter {
    colored: bool,
}

impl SummaryReporter {
    #[must_use]
    pub const fn new() -> Self {
        Self { colored: true }
    }

    /// Disable colored output
    #[must_use]
    pub const fn no_color(mut self) -> Self {
        self.colored = false;
        self
    }

    fn color(&self, text: &str, color: &str) -> String {
        ansi_color(text, color, self.colored)
    }

    fn severity_label(&self, severity: Severity) -> String {
        match severity {
            Severity::Error => self.color("error", "red"),
            Severity::Warning => self.color("warning", "yellow"),
            Severity::Ignore => self.color("ignore", "dim"),
        }
    }
}

impl Default for SummaryReporter {
    fn default() -> Self {
        Self::new()
    }
}

impl ReportGenerator for SummaryReporter {
    fn generate_comparison_report(
        &self,
        forest: &DeltaForest,
        problems: &[Problem],
        config: &ReportConfig,
    ) -> Result<String> {
        let mut lines = Vec::new();
        let title = config.title.as_deref().unwrap_or("API Comparison Summary");
        lines.push(self.color(title, "bold"));
        lines.push(self.color("─".repeat(40).as_str(), "dim"));
        lines.push(format!(
            "{}  {} → {}",
            self.color("Baselines:", "cyan"),
            forest.old_baseline,
            forest.new_baseline
        ));

        let summary = forest.summary();
        lines.push(format!(
            "{}  {} changed component(s), {} {} {}",
            self.color("Deltas:", "cyan"),
            summary.components_changed,
            self.color(&format!("+{}", summary.added), "green"),
            self.color(&format!("-{}", summary.removed), "red"),
            self.color(&format!("~{}", summary.changed), "yellow"),
        ));
        lines.push(String::new());

        let visible: Vec<&Problem> = problems
            .iter()
            .filter(|p| config.includes(p.severity))
            .collect();
        if visible.is_empty() {
            lines.push(self.color("No API problems found", "green"));
            return Ok(lines.join("\n") + "\n");
        }

        let errors = visible.iter().filter(|p| p.severity == Severity::Error).count();
        let warnings = visible.iter().filter(|p| p.severity == Severity::Warning).count();
        lines.push(format!(
            "{} {} error(s), {} warning(s)",
            self.color("Problems:", "bold"),
            errors,
            warnings
        ));

        let mut current_component: Option<&str> = None;
        let limit = config.max_items.unwrap_or(usize::MAX);
        for problem in visible.iter().take(limit) {
            let component = problem.component.as_deref().unwrap_or("-");
            if current_component != Some(component) {
                lines.push(format!("  {}", self.color(component, "cyan")));
                current_component = Some(component);
            }
            lines.push(format!(
                "    [{}] {} {}",
                self.severity_label(problem.severity),
                problem.message,
                self.color(&problem.id.to_string(), "dim")
            ));
        }
        if visible.len() > limit {
            lines.push(self.color(&format!("  ... {} more", visible.len() - limit), "dim"));
        }

        if visible.iter().any(|p| p.is_breaking()) {
            lines.push(String::new());
            lines.push(self.color("Breaking changes detected", "red"));
        }
        Ok(lines.join("\n") + "\n")
    }

    fn format(&self) -> ReportFormat {
        ReportFormat::Summary
    }
}
