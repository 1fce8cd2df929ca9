use crate::batch::{BatchRequest, BatchResponse, CatalogItem};
use crate::error::SyncError;
use crate::feedback::LogEntry;
use crate::phase::ItemId;
use crate::progress::item_percent;
use crate::session::Session;
use crate::transport::BatchTransport;

/// Items offered for import and the operator's ordered choice among them.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SelectionState {
    available: Vec<CatalogItem>,
    selected: Vec<ItemId>,
}

impl SelectionState {
    pub fn new(available: Vec<CatalogItem>) -> Self {
        Self {
            available,
            selected: Vec::new(),
        }
    }

    pub fn available(&self) -> &[CatalogItem] {
        &self.available
    }

    /// Selected ids in the order they were chosen.
    pub fn selected_ids(&self) -> &[ItemId] {
        &self.selected
    }

    pub fn is_selected(&self, id: &ItemId) -> bool {
        self.selected.contains(id)
    }

    pub fn item(&self, id: &ItemId) -> Option<&CatalogItem> {
        self.available.iter().find(|item| &item.id == id)
    }

    pub fn display_name(&self, id: &ItemId) -> Option<&str> {
        self.item(id).map(|item| item.name.as_str())
    }

    /// Add `id` to the selection. Unknown and already-selected ids are ignored.
    pub fn select(&mut self, id: &ItemId) -> bool {
        if self.item(id).is_none() || self.is_selected(id) {
            return false;
        }
        self.selected.push(id.clone());
        true
    }

    pub fn deselect(&mut self, id: &ItemId) -> bool {
        let before = self.selected.len();
        self.selected.retain(|selected| selected != id);
        self.selected.len() != before
    }

    /// Select every enabled item, keeping list order after any existing picks.
    pub fn select_all_enabled(&mut self) {
        let enabled: Vec<ItemId> = self
            .available
            .iter()
            .filter(|item| item.enabled)
            .map(|item| item.id.clone())
            .collect();
        for id in &enabled {
            self.select(id);
        }
    }

    pub fn clear(&mut self) {
        self.selected.clear();
    }
}

/// Outcome counters of a selective import.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ImportSummary {
    pub total: usize,
    /// Cursor into the selected ids; equals `total` once the run completes.
    pub index: usize,
    pub succeeded: usize,
    pub failed: usize,
    /// One [`SyncError::PerItem`] per failed item, in import order.
    pub failures: Vec<SyncError>,
}

impl ImportSummary {
    fn record_failure(&mut self, error: SyncError) {
        self.failed += 1;
        self.failures.push(error);
    }

    pub fn message(&self) -> String {
        format!(
            "Import finished: {} imported, {} failed",
            self.succeeded, self.failed
        )
    }
}

/// Imports an explicit list of items one request at a time.
///
/// Best-effort: a failed item is logged and counted, and the loop moves on
/// to the next id. The run always reaches 100%.
pub struct SelectiveImportRunner<'a> {
    transport: &'a dyn BatchTransport,
}

impl<'a> SelectiveImportRunner<'a> {
    pub fn new(transport: &'a dyn BatchTransport) -> Self {
        Self { transport }
    }

    pub async fn run(
        &self,
        session: &mut Session,
        ids: &[ItemId],
        selection: Option<&SelectionState>,
    ) -> ImportSummary {
        let mut summary = ImportSummary {
            total: ids.len(),
            ..ImportSummary::default()
        };

        for id in ids {
            let label = selection
                .and_then(|s| s.display_name(id))
                .unwrap_or(id.as_str())
                .to_owned();

            session.animate(format!(
                "Importing {label} ({} of {})",
                summary.index + 1,
                summary.total
            ));
            let result = self.transport.submit(&BatchRequest::import_one(id)).await;
            session.stop_animation();
            session.record_request();

            match result {
                Ok(response) if response.success => {
                    session.log_lines(&response.log_lines);
                    session.log(LogEntry::success(imported_line(&label, &response)));
                    summary.succeeded += 1;
                }
                Ok(response) => {
                    session.log_lines(&response.log_lines);
                    let error = SyncError::from_response(&response);
                    summary.record_failure(item_failed(session, id, &label, error));
                }
                Err(error) => {
                    summary.record_failure(item_failed(session, id, &label, error.into()));
                }
            }

            summary.index += 1;
            session
                .progress_mut()
                .set_phase_percent(item_percent(summary.index, summary.total));
            session.publish_progress();
        }

        summary
    }
}

/// Log one failed item and return it as a per-item error. Details go to the
/// diagnostic channel.
fn item_failed(session: &Session, id: &ItemId, label: &str, error: SyncError) -> SyncError {
    if let Some(details) = error.details() {
        session.surface().push_diagnostic(format!("{id}: {details}"));
    }
    let message = error.to_string();
    tracing::warn!(item = %id, %message, "item import failed");
    session.log(LogEntry::error(format!("Failed to import {label}: {message}")));
    SyncError::PerItem {
        item: id.clone(),
        message,
    }
}

fn imported_line(label: &str, response: &BatchResponse) -> String {
    let item = response.item.clone().unwrap_or_default();
    let name = item.name.as_deref().unwrap_or(label);
    let mut line = format!("Imported {name}");
    if let Some(sku) = &item.sku {
        line.push_str(&format!(" (SKU {sku})"));
    }
    if let Some(status) = &item.status {
        line.push_str(&format!(": {status}"));
    }
    line
}
