use anyhow::Result;
use catalog_sync::{ItemId, Orchestrator, PanelKind};

use crate::render;

/// Import `ids`, or every enabled product when `all_enabled` is set.
///
/// Individual failures do not stop the run, but any failure makes the
/// command exit non-zero once every item has been tried.
pub async fn run(orchestrator: &Orchestrator, ids: &[String], all_enabled: bool) -> Result<()> {
    let surface = &orchestrator.panel(PanelKind::Import).surface;
    let ids: Vec<ItemId> = ids.iter().map(ItemId::new).collect();

    let outcome = if all_enabled {
        let mut selection = super::list::fetch(orchestrator).await?;
        selection.select_all_enabled();
        for id in &ids {
            if !selection.select(id) && !selection.is_selected(id) {
                tracing::warn!(%id, "not in the product list; skipping");
            }
        }
        render::drive(surface, orchestrator.import_selected(&selection)).await
    } else {
        render::drive(surface, orchestrator.import_items(&ids, None)).await
    };

    let summary = super::finish(outcome)?;
    if summary.failed > 0 {
        anyhow::bail!(
            "{} of {} products failed to import",
            summary.failed,
            summary.total
        );
    }

    Ok(())
}
