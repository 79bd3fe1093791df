//! `frscope list`: stored sessions, oldest first.

use crate::cli::open_store;
use crate::cli::output::{self, Styled};
use crate::config::Config;
use anyhow::Result;

pub fn run(config: &Config) -> Result<()> {
    let s = Styled::new();
    let sessions = open_store(config)?.summaries()?;

    if output::is_json() {
        output::print_json(&serde_json::to_value(&sessions)?);
        return Ok(());
    }
    if output::is_quiet() {
        for session in &sessions {
            println!("{}", session.id);
        }
        return Ok(());
    }

    if sessions.is_empty() {
        eprintln!("  No stored sessions in {}.", config.store_path.display());
        return Ok(());
    }
    output::print_section(&s, &format!("Sessions ({})", sessions.len()));
    for session in &sessions {
        eprintln!(
            "    {}  {}  {}",
            s.cyan(&session.id),
            session.filename,
            s.dim(&session.created_at)
        );
    }
    Ok(())
}
