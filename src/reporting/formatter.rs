use std::fmt::Write as _;

use console::style;

use crate::models::{AggregatedSolution, Finding};
use crate::store::{Mode, Phase, StateSnapshot};

/// Display band for a 0-100 score.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SeverityBand {
    Critical,
    High,
    Medium,
    Low,
    Info,
}

impl SeverityBand {
    pub const ALL: [SeverityBand; 5] = [
        SeverityBand::Critical,
        SeverityBand::High,
        SeverityBand::Medium,
        SeverityBand::Low,
        SeverityBand::Info,
    ];

    pub fn of(score: u8) -> Self {
        match score {
            80..=u8::MAX => SeverityBand::Critical,
            60..=79 => SeverityBand::High,
            40..=59 => SeverityBand::Medium,
            20..=39 => SeverityBand::Low,
            _ => SeverityBand::Info,
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            SeverityBand::Critical => "Critical",
            SeverityBand::High => "High",
            SeverityBand::Medium => "Medium",
            SeverityBand::Low => "Low",
            SeverityBand::Info => "Info",
        }
    }

    fn styled(&self, text: String) -> String {
        match self {
            SeverityBand::Critical => style(text).red().bold().to_string(),
            SeverityBand::High => style(text).red().to_string(),
            SeverityBand::Medium => style(text).yellow().to_string(),
            SeverityBand::Low => style(text).cyan().to_string(),
            SeverityBand::Info => style(text).dim().to_string(),
        }
    }
}

/// Mean severity, the overall risk score shown next to the summary.
pub fn risk_score(findings: &[Finding]) -> Option<u8> {
    if findings.is_empty() {
        return None;
    }
    let total: u32 = findings.iter().map(|f| u32::from(f.severity)).sum();
    Some((total as f64 / findings.len() as f64).round() as u8)
}

pub fn format_summary(snapshot: &StateSnapshot) -> String {
    let state = &snapshot.state;
    let mut out = String::new();

    let source = state.source_name.as_deref().unwrap_or("-");
    let origin = match state.mode {
        Mode::Remote => state
            .job_id
            .as_ref()
            .map(|id| format!("job {}", id))
            .unwrap_or_else(|| "remote".to_string()),
        Mode::Example => "example".to_string(),
        Mode::Empty => "none".to_string(),
    };
    let _ = writeln!(out, "{} {} ({})", style("Results for").bold(), source, origin);

    if snapshot.phase == Phase::Failed || state.has_error {
        if let Some(message) = &state.last_error {
            let _ = writeln!(out, "{} {}", style("⚠").yellow(), message);
        }
    }

    let _ = writeln!(out, "\n| Severity | Count |\n|---|---|");
    for band in SeverityBand::ALL {
        let count = state.findings.iter().filter(|f| SeverityBand::of(f.severity) == band).count();
        let _ = writeln!(out, "| {} | {} |", band.label(), count);
    }
    let _ = writeln!(out, "| **Total** | **{}** |", state.findings.len());

    if let Some(page) = &state.pagination {
        if page.total > page.count {
            let _ = writeln!(
                out,
                "\nShowing {} of {} findings (offset {})",
                page.count, page.total, page.offset
            );
        }
    }
    if let Some(score) = risk_score(&state.findings) {
        let _ = writeln!(out, "\nRisk score: {}/100", SeverityBand::of(score).styled(score.to_string()));
    }
    out
}

pub fn format_finding(finding: &Finding) -> String {
    let band = SeverityBand::of(finding.severity);
    let mut out = String::new();
    let _ = writeln!(
        out,
        "{} {} (severity {}, priority {})",
        band.styled(format!("[{}]", band.label())),
        style(finding.headline()).bold(),
        finding.severity,
        finding.priority,
    );

    let mut ids: Vec<&str> = finding.cve_ids.iter().map(String::as_str).collect();
    ids.extend(finding.cwe_ids.iter().map(String::as_str));
    if !ids.is_empty() || !finding.source.is_empty() {
        let _ = writeln!(out, "    {} | {}", finding.source.join(", "), ids.join(", "));
    }
    if let Some(short) = &finding.solution.short_description {
        let _ = writeln!(out, "    {} {}", style("Fix:").green(), short);
    }
    out
}

pub fn format_aggregated(solutions: &[AggregatedSolution]) -> String {
    let mut out = String::new();
    for (i, agg) in solutions.iter().enumerate() {
        let _ = writeln!(
            out,
            "{}. {} ({} findings)",
            i + 1,
            agg.solution.trim(),
            agg.findings.len()
        );
        for finding in &agg.findings {
            let _ = writeln!(out, "     - {}", finding.headline());
        }
    }
    out
}

/// Full text report of a snapshot: summary, findings as received, then
/// aggregated solutions in store order.
pub fn format_report(snapshot: &StateSnapshot) -> String {
    let state = &snapshot.state;
    let mut out = format_summary(snapshot);

    if state.findings.is_empty() {
        let _ = writeln!(out, "\nNo findings match the current filter.");
        return out;
    }

    let _ = writeln!(out, "\n{}", style("Findings").bold().underlined());
    for finding in &state.findings {
        out.push_str(&format_finding(finding));
    }

    if !state.aggregated_solutions.is_empty() {
        let _ = writeln!(out, "\n{}", style("Aggregated solutions").bold().underlined());
        out.push_str(&format_aggregated(&state.aggregated_solutions));
    }
    out
}
