//! `frscope delete <id>`: drop a stored session.

use crate::cli::open_store;
use crate::cli::output::{self, Styled};
use crate::config::Config;
use crate::store::SqliteStore;
use anyhow::{bail, Result};
use frscope::SessionId;

pub fn run(config: &Config, id: &str) -> Result<()> {
    let s = Styled::new();
    let id = SessionId::from(id);
    remove(&*open_store(config)?, &id)?;

    if output::is_json() {
        output::print_json(&serde_json::json!({ "id": id, "deleted": true }));
    } else if !output::is_quiet() {
        output::print_status(s.ok_sym(), &format!("Deleted {}", s.cyan(id.as_str())));
    }
    Ok(())
}

fn remove(store: &SqliteStore, id: &SessionId) -> Result<()> {
    if !store.delete(id)? {
        bail!("no stored session with id {id}");
    }
    tracing::debug!(%id, "session deleted");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use frscope::document::StaticDocument;
    use frscope::session::SessionStore;
    use frscope::Extractor;

    #[tokio::test]
    async fn test_remove_existing_then_missing() {
        let store = SqliteStore::in_memory().unwrap();
        let id = SessionId::from("fr_4_drop");
        let doc = StaticDocument::with_rows([("20", "0.0"), ("500", "1.2")]);
        let record = Extractor::default().extract(&doc, "about:blank").unwrap();
        store.put(&id, &record).await.unwrap();

        remove(&store, &id).unwrap();
        assert!(store.get(&id).await.unwrap().is_none());

        let err = remove(&store, &id).unwrap_err();
        assert_eq!(err.to_string(), "no stored session with id fr_4_drop");
    }
}
