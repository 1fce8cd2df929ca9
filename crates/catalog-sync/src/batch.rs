use std::fmt;

use crate::phase::{ItemId, SyncPhase};

/// Remote operation requested by a batch call.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum RequestAction {
    PhaseSync,
    CustomerSync,
    OrderSync,
    FetchSelection,
    ImportOne,
    FixHierarchy,
}

impl RequestAction {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::PhaseSync => "phase-sync",
            Self::CustomerSync => "customer-sync",
            Self::OrderSync => "order-sync",
            Self::FetchSelection => "fetch-selection",
            Self::ImportOne => "import-one",
            Self::FixHierarchy => "fix-hierarchy",
        }
    }
}

impl fmt::Display for RequestAction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One remote call. Authentication is added by the transport.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BatchRequest {
    pub action: RequestAction,
    pub phase: Option<SyncPhase>,
    pub offset: Option<u64>,
    pub item_id: Option<ItemId>,
}

impl BatchRequest {
    fn bare(action: RequestAction) -> Self {
        Self {
            action,
            phase: None,
            offset: None,
            item_id: None,
        }
    }

    pub fn phase_sync(phase: &SyncPhase, offset: u64) -> Self {
        Self {
            phase: Some(phase.clone()),
            offset: Some(offset),
            ..Self::bare(RequestAction::PhaseSync)
        }
    }

    /// Request for one page of `phase`, using the dedicated action for
    /// customers and orders.
    pub fn for_phase(phase: &SyncPhase, offset: u64) -> Self {
        match phase {
            SyncPhase::Customers => Self::customer_sync(offset),
            SyncPhase::Orders => Self::order_sync(offset),
            _ => Self::phase_sync(phase, offset),
        }
    }

    pub fn customer_sync(offset: u64) -> Self {
        Self {
            offset: Some(offset),
            ..Self::bare(RequestAction::CustomerSync)
        }
    }

    pub fn order_sync(offset: u64) -> Self {
        Self {
            offset: Some(offset),
            ..Self::bare(RequestAction::OrderSync)
        }
    }

    pub fn fetch_selection() -> Self {
        Self::bare(RequestAction::FetchSelection)
    }

    pub fn import_one(item_id: &ItemId) -> Self {
        Self {
            item_id: Some(item_id.clone()),
            ..Self::bare(RequestAction::ImportOne)
        }
    }

    pub fn fix_hierarchy() -> Self {
        Self::bare(RequestAction::FixHierarchy)
    }
}

/// An item offered for selective import.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CatalogItem {
    pub id: ItemId,
    pub name: String,
    pub sku: Option<String>,
    pub enabled: bool,
}

/// Per-item result reported by an `import-one` call.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ImportedItem {
    pub name: Option<String>,
    pub external_id: Option<String>,
    pub sku: Option<String>,
    pub status: Option<String>,
}

/// Decoded response to one [`BatchRequest`]. Immutable once received.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct BatchResponse {
    pub success: bool,
    pub next_offset: Option<u64>,
    pub total_items: Option<u64>,
    /// Absent on the wire means no more work.
    pub has_more: bool,
    pub log_lines: Vec<String>,
    pub message: Option<String>,
    pub details: Option<serde_json::Value>,
    /// Selection list (`fetch-selection` only).
    pub items: Vec<CatalogItem>,
    /// Per-item outcome (`import-one` only).
    pub item: Option<ImportedItem>,
}

impl BatchResponse {
    /// A successful page of a paginated phase.
    pub fn page(next_offset: u64, total_items: u64, has_more: bool) -> Self {
        Self {
            success: true,
            next_offset: Some(next_offset),
            total_items: Some(total_items),
            has_more,
            ..Self::default()
        }
    }

    /// A `success = false` response carrying the backend's message.
    pub fn failure(message: impl Into<String>) -> Self {
        Self {
            success: false,
            message: Some(message.into()),
            ..Self::default()
        }
    }

    pub fn with_logs<I, S>(mut self, lines: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.log_lines = lines.into_iter().map(Into::into).collect();
        self
    }
}
