//! `frscope inspect <file>`: dry-run the pipeline and report what it found.

use crate::cli::output::{self, Styled};
use crate::cli::{document_url, read_document};
use crate::config::Config;
use anyhow::{Context, Result};
use frscope::export::format_amplitude;
use frscope::Extractor;
use std::path::Path;

pub fn run(config: &Config, input: &Path, url: Option<&str>) -> Result<()> {
    let s = Styled::new();
    let doc = read_document(input)?;
    let url = document_url(input, url);

    let report = Extractor::new(config.rules())
        .inspect(&doc, &url)
        .with_context(|| format!("inspection failed for {url}"))?;

    if output::is_json() {
        output::print_json(&serde_json::to_value(&report)?);
        return Ok(());
    }
    if output::is_quiet() {
        println!("{}", report.filename);
        return Ok(());
    }

    output::print_section(&s, "Metadata");
    output::print_field("Product", &report.product_name);
    output::print_field("Channel", &report.variant);
    output::print_field("Filename", &report.filename);
    eprintln!();

    output::print_section(&s, "Data");
    output::print_field("Source", report.source.name());
    output::print_field(
        "Points",
        &format!(
            "{} ({} raw, {} skipped)",
            report.data_points, report.raw_points, report.skipped
        ),
    );
    let rule = if report.reference_aligned {
        "500Hz aligned to +5dB"
    } else {
        "floor at 0dB"
    };
    output::print_field("Bias", &format!("{:.6} ({rule})", report.bias));
    output::print_field("CSV", &output::format_size(report.csv_length as u64));
    eprintln!();

    output::print_section(&s, "Preview");
    for p in &report.preview {
        output::print_field(
            &format!("{} Hz", p.frequency),
            &format!(
                "{} dB -> {} dB",
                format_amplitude(p.amplitude),
                format_amplitude(p.adjusted)
            ),
        );
    }
    Ok(())
}
