use anyhow::Result;
use catalog_sync::{Orchestrator, PanelKind};

use crate::render;

/// Which batch flow to run.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SyncTarget {
    Full,
    Categories,
    Customers,
    Orders,
}

impl SyncTarget {
    fn panel(self) -> PanelKind {
        match self {
            Self::Full => PanelKind::FullSync,
            Self::Categories => PanelKind::Categories,
            Self::Customers => PanelKind::Customers,
            Self::Orders => PanelKind::Orders,
        }
    }
}

pub async fn run(orchestrator: &Orchestrator, target: SyncTarget) -> Result<()> {
    let surface = &orchestrator.panel(target.panel()).surface;

    let outcome = match target {
        SyncTarget::Full => render::drive(surface, orchestrator.full_sync()).await,
        SyncTarget::Categories => render::drive(surface, orchestrator.category_sync()).await,
        SyncTarget::Customers => render::drive(surface, orchestrator.customer_sync()).await,
        SyncTarget::Orders => render::drive(surface, orchestrator.order_sync()).await,
    };

    let report = super::finish(outcome)?;
    tracing::info!(
        requests = report.requests,
        phases = report.phases_completed,
        "sync finished"
    );

    Ok(())
}
