//! Output formatting for the CLI.

use crate::error::Result;
use colored::{Color, Colorize};
use triage_catalog::{CatalogOrigin, RuleCatalog};
use triage_domain::{CriticalityTier, DuplicateMatch, SlaStatus, Verdict};
use triage_engine::{BatchOutcome, BatchReport};
use tabled::{
    builder::Builder,
    settings::{object::Rows, Alignment, Modify, Style},
};

/// Output format.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum OutputFormat {
    /// Table format
    #[default]
    Table,
    /// JSON format
    Json,
    /// Quiet (minimal) format
    Quiet,
}

/// Output formatter.
pub struct Formatter {
    format: OutputFormat,
    color_enabled: bool,
}

impl Formatter {
    /// Create a new formatter.
    pub fn new(format: OutputFormat, color_enabled: bool) -> Self {
        Self {
            format,
            color_enabled,
        }
    }

    /// Format one Verdict.
    pub fn format_verdict(&self, verdict: &Verdict) -> Result<String> {
        match self.format {
            OutputFormat::Json => Ok(serde_json::to_string_pretty(verdict)?),
            OutputFormat::Table => Ok(self.format_verdict_table(verdict)),
            OutputFormat::Quiet => Ok(quiet_line(verdict)),
        }
    }

    /// Format a batch report.
    pub fn format_batch(&self, report: &BatchReport) -> Result<String> {
        match self.format {
            OutputFormat::Json => Ok(serde_json::to_string_pretty(report)?),
            OutputFormat::Table => Ok(self.format_batch_table(report)),
            OutputFormat::Quiet => Ok(report
                .outcomes
                .iter()
                .map(|outcome| match outcome {
                    BatchOutcome::Completed(verdict) => quiet_line(verdict),
                    BatchOutcome::Failed { issue_id, .. } => format!("{}\tfailed", issue_id),
                    BatchOutcome::Cancelled { issue_id } => format!("{}\tcancelled", issue_id),
                })
                .collect::<Vec<_>>()
                .join("\n")),
        }
    }

    /// Format a loaded catalog.
    pub fn format_catalog(&self, catalog: &RuleCatalog) -> Result<String> {
        match self.format {
            OutputFormat::Json => {
                let areas: Vec<serde_json::Value> = catalog
                    .areas
                    .iter()
                    .map(|a| {
                        serde_json::json!({
                            "name": a.name,
                            "keywords": a.keywords,
                            "pathGlobs": a.path_globs.iter().map(|g| g.as_str()).collect::<Vec<_>>(),
                            "owners": a.owners,
                        })
                    })
                    .collect();
                Ok(serde_json::to_string_pretty(&serde_json::json!({
                    "origin": origin_name(catalog.origin),
                    "areas": areas,
                    "slaToleranceDays": catalog.sla.tolerance_days,
                    "warnings": catalog.warnings,
                }))?)
            }
            OutputFormat::Table => Ok(self.format_catalog_table(catalog)),
            OutputFormat::Quiet => Ok(catalog
                .areas
                .iter()
                .map(|a| a.name.clone())
                .collect::<Vec<_>>()
                .join("\n")),
        }
    }

    fn format_verdict_table(&self, verdict: &Verdict) -> String {
        let mut builder = Builder::default();
        builder.push_record(["Field", "Value"]);

        let criticality = match verdict.criticality_tier {
            Some(tier) => self.tier_text(tier),
            None => self.paint("unevaluated", Some(Color::Magenta)),
        };
        let sla = match (verdict.sla_status, verdict.sla_days_open) {
            (Some(status), Some(days)) => format!("{} ({} day(s) open)", self.sla_text(status), days),
            (Some(status), None) => self.sla_text(status),
            _ => self.paint("unevaluated", Some(Color::Magenta)),
        };
        let area = verdict
            .area_match
            .as_ref()
            .map(|a| format!("{} (score {})", a.name, a.score))
            .unwrap_or_else(|| "-".to_string());

        builder.push_record(["Issue".to_string(), verdict.issue_id.to_string()]);
        builder.push_record(["Criticality".to_string(), criticality]);
        builder.push_record(["SLA".to_string(), sla]);
        builder.push_record(["Area".to_string(), area]);
        builder.push_record(["Labels".to_string(), list_or_dash(&verdict.recommended_labels)]);
        builder.push_record(["Assignees".to_string(), list_or_dash(&verdict.recommended_assignees)]);

        let mut table = builder.build();
        table
            .with(Style::rounded())
            .with(Modify::new(Rows::first()).with(Alignment::center()));

        let mut sections = vec![table.to_string()];

        if !verdict.duplicate_matches.is_empty() {
            sections.push(self.matches_table("Duplicates", &verdict.duplicate_matches));
        }
        if !verdict.possibly_related.is_empty() {
            sections.push(self.matches_table("Possibly related", &verdict.possibly_related));
        }

        sections.push(format!(
            "Criticality: {}\nDuplicates: {}\nSLA: {}",
            verdict.criticality_rationale, verdict.duplicates_rationale, verdict.sla_rationale
        ));

        for component in &verdict.unevaluated_components {
            sections.push(self.warning(&format!("{} was not evaluated", component)));
        }
        for warning in &verdict.catalog_warnings {
            sections.push(self.warning(warning));
        }

        sections.join("\n")
    }

    fn matches_table(&self, title: &str, matches: &[DuplicateMatch]) -> String {
        let mut builder = Builder::default();
        builder.push_record(["Candidate", "Confidence", "Score", "Primary", "Supporting"]);
        for m in matches {
            builder.push_record([
                m.candidate_id.to_string(),
                m.confidence_tier.as_str().to_string(),
                m.confidence_score.to_string(),
                m.primary_match_reason.clone(),
                m.supporting_reasons.join(", "),
            ]);
        }

        let mut table = builder.build();
        table
            .with(Style::rounded())
            .with(Modify::new(Rows::first()).with(Alignment::center()));
        format!("{}\n{}", self.paint(title, Some(Color::Cyan)), table)
    }

    fn format_batch_table(&self, report: &BatchReport) -> String {
        if report.outcomes.is_empty() {
            return self.paint("No targets evaluated.", Some(Color::Yellow));
        }

        let mut builder = Builder::default();
        builder.push_record(["Issue", "Status", "Criticality", "SLA", "Duplicates", "Area"]);
        for outcome in &report.outcomes {
            match outcome {
                BatchOutcome::Completed(verdict) => builder.push_record([
                    verdict.issue_id.to_string(),
                    if verdict.is_complete() { "completed" } else { "partial" }.to_string(),
                    verdict
                        .criticality_tier
                        .map(|t| self.tier_text(t))
                        .unwrap_or_else(|| "-".to_string()),
                    verdict
                        .sla_status
                        .map(|s| self.sla_text(s))
                        .unwrap_or_else(|| "-".to_string()),
                    verdict
                        .duplicate_matches
                        .iter()
                        .map(|m| m.candidate_id.to_string())
                        .collect::<Vec<_>>()
                        .join(", "),
                    verdict
                        .area_match
                        .as_ref()
                        .map(|a| a.name.clone())
                        .unwrap_or_else(|| "-".to_string()),
                ]),
                BatchOutcome::Failed { issue_id, reason } => builder.push_record([
                    issue_id.to_string(),
                    self.paint("failed", Some(Color::Red)),
                    reason.clone(),
                    String::new(),
                    String::new(),
                    String::new(),
                ]),
                BatchOutcome::Cancelled { issue_id } => builder.push_record([
                    issue_id.to_string(),
                    self.paint("cancelled", Some(Color::Yellow)),
                    String::new(),
                    String::new(),
                    String::new(),
                    String::new(),
                ]),
            }
        }

        let mut table = builder.build();
        table
            .with(Style::rounded())
            .with(Modify::new(Rows::first()).with(Alignment::center()));

        format!(
            "{}\n{}\n{}",
            self.info(&format!("Run {}", report.run_id)),
            table,
            report.metrics.summary()
        )
    }

    fn format_catalog_table(&self, catalog: &RuleCatalog) -> String {
        let mut builder = Builder::default();
        builder.push_record(["Area", "Keywords", "Paths", "Owners"]);
        for area in &catalog.areas {
            builder.push_record([
                area.name.clone(),
                area.keywords.join(", "),
                area.path_globs
                    .iter()
                    .map(|g| g.as_str())
                    .collect::<Vec<_>>()
                    .join(", "),
                list_or_dash(&area.owners),
            ]);
        }

        let mut table = builder.build();
        table
            .with(Style::rounded())
            .with(Modify::new(Rows::first()).with(Alignment::center()));

        let mut lines = vec![
            self.info(&format!(
                "Catalog origin: {} ({} area(s), SLA tolerance {} day(s))",
                origin_name(catalog.origin),
                catalog.areas.len(),
                catalog.sla.tolerance_days
            )),
            table.to_string(),
        ];
        if catalog.warnings.is_empty() {
            lines.push(self.success("No catalog warnings"));
        }
        for warning in &catalog.warnings {
            lines.push(self.warning(warning));
        }
        lines.join("\n")
    }

    fn tier_text(&self, tier: CriticalityTier) -> String {
        let color = match tier {
            CriticalityTier::Blocking => Some(Color::Red),
            CriticalityTier::Hot => Some(Color::Magenta),
            CriticalityTier::Regression => Some(Color::Yellow),
            CriticalityTier::None => None,
        };
        self.paint(tier.as_str(), color)
    }

    fn sla_text(&self, status: SlaStatus) -> String {
        let color = match status {
            SlaStatus::Violation => Color::Red,
            SlaStatus::Warning => Color::Yellow,
            SlaStatus::Good => Color::Green,
            SlaStatus::Waiting => Color::Blue,
        };
        self.paint(status.as_str(), Some(color))
    }

    fn success(&self, message: &str) -> String {
        self.paint(&format!("✓ {}", message), Some(Color::Green))
    }

    fn info(&self, message: &str) -> String {
        self.paint(&format!("ℹ {}", message), Some(Color::Blue))
    }

    /// Format a warning line.
    pub fn warning(&self, message: &str) -> String {
        self.paint(&format!("⚠ {}", message), Some(Color::Yellow))
    }

    /// `None` leaves the text uncolored, as does a formatter built with color off.
    fn paint(&self, text: &str, color: Option<Color>) -> String {
        match color {
            Some(color) if self.color_enabled => text.color(color).to_string(),
            _ => text.to_string(),
        }
    }
}

/// Tab-separated id, criticality, SLA status and duplicate ids
fn quiet_line(verdict: &Verdict) -> String {
    let duplicates: Vec<String> = verdict
        .duplicate_matches
        .iter()
        .map(|m| m.candidate_id.to_string())
        .collect();
    format!(
        "{}\t{}\t{}\t{}",
        verdict.issue_id,
        verdict.criticality_tier.map(|t| t.as_str()).unwrap_or("-"),
        verdict.sla_status.map(|s| s.as_str()).unwrap_or("-"),
        duplicates.join(",")
    )
}

fn list_or_dash(items: &[String]) -> String {
    if items.is_empty() {
        "-".to_string()
    } else {
        items.join(", ")
    }
}

fn origin_name(origin: CatalogOrigin) -> &'static str {
    match origin {
        CatalogOrigin::BuiltIn => "built-in",
        CatalogOrigin::Configured => "configured",
        CatalogOrigin::Fallback => "fallback",
    }
}
