//! `frscope export <id>`: save a stored session's CSV.

use crate::cli::open_store;
use crate::cli::output::{self, Styled};
use crate::config::Config;
use crate::sink::DirectorySink;
use anyhow::Result;
use frscope::session::{retrieve, ExportSink};
use frscope::SessionId;
use std::path::PathBuf;

pub async fn run(config: &Config, id: &str, out_dir: Option<PathBuf>) -> Result<()> {
    let s = Styled::new();
    let id = SessionId::from(id);
    let store = open_store(config)?;
    let record = retrieve(store.as_ref(), &id).await?;

    let sink = DirectorySink::new(out_dir.unwrap_or_else(|| config.export_dir.clone()));
    let location = sink.save(&record.filename, record.csv.as_bytes()).await?;

    if output::is_json() {
        output::print_json(&serde_json::json!({
            "id": id,
            "location": location,
            "bytes": record.csv.len(),
        }));
    } else if output::is_quiet() {
        println!("{location}");
    } else {
        output::print_status(
            s.ok_sym(),
            &format!(
                "Saved {} ({})",
                location,
                output::format_size(record.csv.len() as u64)
            ),
        );
    }
    Ok(())
}
