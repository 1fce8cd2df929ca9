use std::fmt;

use serde::{Deserialize, Serialize};

use crate::error::SyncError;

/// One named unit of synchronization work.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum SyncPhase {
    Categories,
    Products,
    Customers,
    Orders,
    Other(String),
}

impl SyncPhase {
    pub fn parse(s: &str) -> Self {
        match s.trim().to_lowercase().as_str() {
            "category" | "categories" => Self::Categories,
            "product" | "products" => Self::Products,
            "customer" | "customers" => Self::Customers,
            "order" | "orders" => Self::Orders,
            other => Self::Other(other.to_owned()),
        }
    }

    /// Wire identifier sent in `phase-sync` requests.
    pub fn as_str(&self) -> &str {
        match self {
            Self::Categories => "categories",
            Self::Products => "products",
            Self::Customers => "customers",
            Self::Orders => "orders",
            Self::Other(s) => s.as_str(),
        }
    }

    /// Human-readable label for status text.
    pub fn display_label(&self) -> &str {
        match self {
            Self::Categories => "Categories",
            Self::Products => "Products",
            Self::Customers => "Customers",
            Self::Orders => "Orders",
            Self::Other(s) => s.as_str(),
        }
    }
}

impl fmt::Display for SyncPhase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl Serialize for SyncPhase {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.as_str())
    }
}

impl<'de> Deserialize<'de> for SyncPhase {
    fn deserialize<D: serde::Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        Ok(Self::parse(&s))
    }
}

/// Ordered, non-empty list of phases for a full sync. Fixed at session start.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SyncPlan(Vec<SyncPhase>);

impl SyncPlan {
    /// Returns `None` for an empty list.
    pub fn new(phases: Vec<SyncPhase>) -> Option<Self> {
        if phases.is_empty() {
            None
        } else {
            Some(Self(phases))
        }
    }

    pub fn phases(&self) -> &[SyncPhase] {
        &self.0
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Share of the overall bar owned by each phase.
    pub fn phase_weight(&self) -> f64 {
        100.0 / self.0.len() as f64
    }
}

impl Default for SyncPlan {
    fn default() -> Self {
        Self(vec![SyncPhase::Categories, SyncPhase::Products])
    }
}

/// Position of a runner within one phase.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BatchCursor {
    pub phase: SyncPhase,
    pub offset: u64,
    /// Zero when the backend has not reported a total.
    pub total_items: u64,
    pub has_more: bool,
}

impl BatchCursor {
    pub fn new(phase: SyncPhase) -> Self {
        Self {
            phase,
            offset: 0,
            total_items: 0,
            has_more: true,
        }
    }

    /// Move the cursor to the position reported by a batch response.
    ///
    /// Offsets never move backwards, and a response that claims more work
    /// must advance the offset.
    pub fn advance(
        &mut self,
        next_offset: Option<u64>,
        total_items: Option<u64>,
        has_more: bool,
    ) -> Result<(), SyncError> {
        let next = next_offset.unwrap_or(self.offset);

        if next < self.offset {
            return Err(SyncError::application(format!(
                "offset went backwards ({} -> {next})",
                self.offset
            )));
        }
        if has_more && next == self.offset {
            return Err(SyncError::application(format!(
                "backend reported more items but did not advance past offset {next}"
            )));
        }

        self.offset = next;
        self.total_items = total_items.unwrap_or(0);
        self.has_more = has_more;
        Ok(())
    }
}

/// External identifier of an importable item.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ItemId(String);

impl ItemId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ItemId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}
