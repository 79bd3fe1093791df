//! `frscope extract <file>`: extract, store and open a curve.

use crate::cli::output::{self, Styled};
use crate::cli::{document_url, open_store, read_document};
use crate::config::Config;
use crate::presenter::TerminalPresenter;
use crate::sink::DirectorySink;
use anyhow::{Context, Result};
use frscope::session::{deliver, Delivery, SessionStore};
use frscope::Extractor;
use std::path::Path;
use std::sync::Arc;

pub async fn run(config: &Config, input: &Path, url: Option<&str>) -> Result<()> {
    let s = Styled::new();
    let url = document_url(input, url);
    let record = {
        let doc = read_document(input)?;
        Extractor::new(config.rules())
            .extract(&doc, &url)
            .with_context(|| format!("extraction failed for {url}"))?
    };

    let store = open_store(config)?;
    let presenter = TerminalPresenter::new(
        Arc::clone(&store) as Arc<dyn SessionStore>,
        &config.export_dir,
        config.canvas(),
    );
    let sink = DirectorySink::new(&config.export_dir);

    let outcome = deliver(&record, store.as_ref(), &presenter, &sink)
        .await
        .context("delivery failed")?;

    if output::is_json() {
        output::print_json(&match &outcome {
            Delivery::Presented { id, address } => serde_json::json!({
                "status": "presented",
                "id": id,
                "address": address,
                "filename": record.filename,
                "data_points": record.series.len(),
                "bias": record.bias.value,
            }),
            Delivery::Exported { location, reason } => serde_json::json!({
                "status": "exported",
                "location": location,
                "reason": reason,
                "filename": record.filename,
            }),
        });
        return Ok(());
    }

    if !output::is_quiet() {
        match &outcome {
            Delivery::Presented { id, address } => output::print_status(
                s.ok_sym(),
                &format!("Session {} ({})", s.cyan(id.as_str()), s.dim(address)),
            ),
            Delivery::Exported { location, reason } => {
                output::print_status(s.warn_sym(), &format!("View unavailable: {reason}"));
                output::print_status(s.ok_sym(), &format!("CSV saved to {location}"));
            }
        }
    }
    Ok(())
}
