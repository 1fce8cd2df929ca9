use anyhow::Result;
use catalog_sync::{CatalogItem, Orchestrator, PanelKind, SelectionState};

use crate::render;

const MAX_NAME_WIDTH: usize = 40;

/// Load the importable items through the selection panel.
pub async fn fetch(orchestrator: &Orchestrator) -> Result<SelectionState> {
    let surface = &orchestrator.panel(PanelKind::Selection).surface;
    let outcome = render::drive(surface, orchestrator.fetch_selection()).await;
    super::finish(outcome)
}

pub async fn run(orchestrator: &Orchestrator) -> Result<()> {
    let selection = fetch(orchestrator).await?;
    print_item_table(selection.available());
    Ok(())
}

fn print_item_table(items: &[CatalogItem]) {
    for line in item_table(items) {
        println!("{line}");
    }
}

fn item_table(items: &[CatalogItem]) -> Vec<String> {
    if items.is_empty() {
        return vec!["No products available".to_owned()];
    }

    let id_width = items
        .iter()
        .map(|item| item.id.as_str().chars().count())
        .max()
        .unwrap_or(0);
    let name_width = items
        .iter()
        .map(|item| item.name.chars().count())
        .max()
        .unwrap_or(0)
        .min(MAX_NAME_WIDTH);

    let mut lines: Vec<String> = items
        .iter()
        .map(|item| {
            let name = truncate(&item.name, name_width);
            let sku = item.sku.as_deref().unwrap_or("-");
            let mut line = format!(
                "  {:<id_width$}  {:<name_width$}  {sku}",
                item.id.as_str(),
                name
            );
            if !item.enabled {
                line.push_str("  (disabled)");
            }
            line.trim_end().to_owned()
        })
        .collect();

    let enabled = items.iter().filter(|item| item.enabled).count();
    lines.push(format!("\n{} products ({enabled} enabled)", items.len()));
    lines
}

fn truncate(s: &str, max: usize) -> String {
    if s.chars().count() <= max {
        return s.to_owned();
    }
    let kept: String = s.chars().take(max.saturating_sub(3)).collect();
    format!("{kept}...")
}
