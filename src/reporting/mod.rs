// Copyright (c) 2026 Bountyy Oy. All rights reserved.
// This software is proprietary and confidential.

pub mod formats;

use std::path::Path;
use tracing::info;

use crate::config::OutputFormat;
use crate::engine::ScanSummary;
use crate::errors::{ScannerError, ScannerResult};
use crate::types::ScanResult;
use formats::csv::CsvReportGenerator;
use formats::json::JsonReportGenerator;

pub fn render(results: &[ScanResult], format: OutputFormat) -> ScannerResult<Vec<u8>> {
    let rendered = match format {
        OutputFormat::Json => JsonReportGenerator::new().generate(results),
        OutputFormat::Csv => CsvReportGenerator::new().generate(results),
    };
    rendered.map_err(|e| ScannerError::Report(format!("{:#}", e)))
}

pub fn write_report(results: &[ScanResult], format: OutputFormat, path: &Path) -> ScannerResult<()> {
    let data = render(results, format)?;
    std::fs::write(path, data)
        .map_err(|e| ScannerError::Report(format!("Failed to write {}: {}", path.display(), e)))?;
    info!("Report written to {} ({} results)", path.display(), results.len());
    Ok(())
}

/// Plain-text run summary for the terminal
pub fn format_summary(summary: &ScanSummary, fingerprint_only: bool) -> String {
    let mut out = String::new();

    out.push_str(&format!(
        "Targets: {}  Fingerprints: {}  Probes: {} ({} failed)  Matches: {}\n",
        summary.targets,
        summary.fingerprints,
        summary.probes_sent,
        summary.probe_failures,
        summary.matches.len()
    ));

    for m in &summary.matches {
        out.push_str(&format!("  [match] {} at {}\n", m.profile, m.url));
    }

    if fingerprint_only {
        out.push_str(&format!(
            "Planned attempts (not sent): {}\n",
            summary.planned_attempts.len()
        ));
        for attempt in &summary.planned_attempts {
            out.push_str(&format!("  {}\n", attempt));
        }
        return out;
    }

    out.push_str(&format!(
        "Attempts: {}  Successful: {}  Transport failures: {}  Duration: {:.1}s\n",
        summary.dispatch.attempted,
        summary.dispatch.succeeded,
        summary.dispatch.failed,
        summary.duration.as_secs_f64()
    ));

    for result in &summary.results {
        out.push_str(&format!(
            "  [found] {} {} {}:{} ({})\n",
            result.profile, result.url, result.username, result.password, result.evidence
        ));
    }

    out
}
