//! `frscope view <id>`: open the presentation view of a stored session.

use crate::cli::open_store;
use crate::cli::output::{self, Styled};
use crate::config::Config;
use crate::presenter::TerminalPresenter;
use anyhow::Result;
use frscope::session::{Presenter, SessionStore};
use frscope::SessionId;
use std::path::PathBuf;
use std::sync::Arc;

pub async fn run(config: &Config, id: &str, chart_dir: Option<PathBuf>) -> Result<()> {
    let s = Styled::new();
    let id = SessionId::from(id);
    let store = open_store(config)?;
    let presenter = TerminalPresenter::new(
        store as Arc<dyn SessionStore>,
        chart_dir.unwrap_or_else(|| config.export_dir.clone()),
        config.canvas(),
    );

    if output::is_json() {
        let view = presenter.view(&id).await?;
        let files = presenter.write_charts(&view)?;
        output::print_json(&serde_json::json!({
            "id": id,
            "info": view.info,
            "table": view.table,
            "chart_svg": files.svg,
            "chart_png": files.png,
        }));
        return Ok(());
    }

    let address = presenter.open(&id).await?;
    if !output::is_quiet() {
        output::print_status(s.ok_sym(), &format!("Opened {}", s.dim(&address)));
    }
    Ok(())
}
