//! Rendering of detection results for the terminal.

use std::collections::HashSet;
use std::fmt::Write;

use anyhow::{Context, Result};
use clap::ValueEnum;

use crate::domain::ContradictionVerdict;

/// How many verdicts the summary lists
const SUMMARY_TOP: usize = 5;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, ValueEnum)]
pub enum OutputFormat {
    /// Pretty-printed JSON array
    #[default]
    Json,
    /// One numbered block per contradiction
    Pretty,
    /// Totals and the strongest contradictions
    Summary,
}

/// Render verdicts in the requested format
pub fn render(verdicts: &[ContradictionVerdict], format: OutputFormat) -> Result<String> {
    match format {
        OutputFormat::Json => {
            serde_json::to_string_pretty(verdicts).context("Failed to serialize verdicts")
        }
        OutputFormat::Pretty => Ok(render_pretty(verdicts)),
        OutputFormat::Summary => Ok(render_summary(verdicts)),
    }
}

fn render_pretty(verdicts: &[ContradictionVerdict]) -> String {
    let mut out = String::new();

    if verdicts.is_empty() {
        let _ = writeln!(out, "\n✓ Consistent: No strong contradictions found");
        return out;
    }

    let _ = writeln!(out, "\n⚠ Found {} contradiction(s):\n", verdicts.len());
    for (i, v) in verdicts.iter().enumerate() {
        let _ = writeln!(out, "[{}] {} - {}", i + 1, v.entity, v.attribute);
        let _ = writeln!(out, "    Values: {} vs {}", v.values.0, v.values.1);
        let _ = writeln!(out, "    Locations: {} / {}", v.locations.0, v.locations.1);
        let _ = writeln!(out, "    Delta: {:.3}", v.delta);
        let _ = writeln!(out, "    Verdict: CONTRADICTION");
        let _ = writeln!(out, "    Sources:");
        let _ = writeln!(out, "      - {}", v.source_texts.0);
        let _ = writeln!(out, "      - {}", v.source_texts.1);
        let _ = writeln!(out);
    }

    out
}

fn render_summary(verdicts: &[ContradictionVerdict]) -> String {
    let rule = "=".repeat(60);
    let mut out = String::new();

    let _ = writeln!(out, "\n{}", rule);
    let _ = writeln!(out, "CONTRADICTION DETECTION SUMMARY");
    let _ = writeln!(out, "{}", rule);
    let _ = writeln!(out, "Total contradictions: {}", verdicts.len());

    if verdicts.is_empty() {
        let _ = writeln!(out, "\n✓ Consistent: No strong contradictions found");
    } else {
        let entities: HashSet<String> = verdicts.iter().map(|v| v.entity.to_lowercase()).collect();
        let average = verdicts.iter().map(|v| v.delta).sum::<f64>() / verdicts.len() as f64;
        let _ = writeln!(out, "Affected entities: {}", entities.len());
        let _ = writeln!(out, "Average delta: {:.3}", average);

        let mut ranked: Vec<&ContradictionVerdict> = verdicts.iter().collect();
        ranked.sort_by(|a, b| b.delta.total_cmp(&a.delta));

        let _ = writeln!(out, "\nTop contradictions:");
        for v in ranked.into_iter().take(SUMMARY_TOP) {
            let _ = writeln!(out, "  - {} ({}): delta={:.3}", v.entity, v.attribute, v.delta);
        }
    }

    let _ = writeln!(out, "{}", rule);
    out
}
