//! Terminal output: stage progress and the final summary.

use scholar_core::pipeline::{PipelineCallback, PipelinePhase, WorkflowState};
use std::fmt::Write as _;

/// Prints one line per stage to stderr.
pub struct ProgressPrinter {
    silent: bool,
}

impl ProgressPrinter {
    pub fn new(silent: bool) -> Self {
        Self { silent }
    }
}

impl PipelineCallback for ProgressPrinter {
    fn on_phase_change(&self, phase: PipelinePhase, progress: f32) {
        if self.silent || phase.is_terminal() {
            return;
        }
        eprintln!("[{:>3.0}%] {phase}", progress * 100.0);
    }

    fn on_stage_degraded(&self, phase: PipelinePhase, error: &str) {
        if !self.silent {
            eprintln!("       {phase} degraded: {error}");
        }
    }
}

/// Human-readable summary of a finished run.
pub fn human_summary(state: &WorkflowState) -> String {
    let mut out = String::new();
    let _ = writeln!(out, "\nResearch: {}", state.topic);
    let _ = writeln!(out, "Sources:  {}", state.documents().len());

    if let Some(v) = &state.validation {
        let _ = writeln!(out, "\nQuality assessment");
        let _ = writeln!(out, "  source quality:     {}", v.document_quality);
        let _ = writeln!(out, "  sources analyzed:   {}", v.source_count);
        let _ = writeln!(out, "  themes identified:  {}", v.theme_count);
        let _ = writeln!(
            out,
            "  sufficient sources: {}",
            if v.has_sufficient_sources { "yes" } else { "no" }
        );
        for rec in &v.recommendations {
            let _ = writeln!(out, "  * {rec}");
        }
    }

    if let Some(a) = &state.analysis {
        if !a.themes.is_empty() {
            let _ = writeln!(out, "\nThemes:   {}", a.themes.join(", "));
        }
        if !a.keywords.is_empty() {
            let _ = writeln!(out, "Keywords: {}", a.keywords.join(", "));
        }
    }

    match (&state.report_path, &state.report) {
        (Some(path), _) => {
            let _ = writeln!(out, "\nReport written to {}", path.display());
        }
        (None, Some(report)) => {
            let _ = writeln!(
                out,
                "\nNo report file: {}",
                report.error.as_deref().unwrap_or("unknown error")
            );
        }
        (None, None) => {}
    }

    if state.is_degraded() {
        let stages: Vec<String> = state.degraded_stages.iter().map(|p| p.to_string()).collect();
        let _ = writeln!(out, "Degraded stages: {}", stages.join(", "));
    }
    out
}
