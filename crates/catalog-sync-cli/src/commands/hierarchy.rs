use anyhow::Result;
use catalog_sync::{Orchestrator, PanelKind};

use crate::render;

pub async fn run(orchestrator: &Orchestrator) -> Result<()> {
    let surface = &orchestrator.panel(PanelKind::Hierarchy).surface;
    let outcome = render::drive(surface, orchestrator.fix_hierarchy()).await;
    super::finish(outcome)?;
    Ok(())
}
