//! JSON envelopes exchanged with the sync endpoint.

use catalog_sync::{BatchRequest, BatchResponse, CatalogItem, ImportedItem, ItemId};
use serde::{Deserialize, Serialize};

/// Request body posted for every batch call.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RequestEnvelope<'a> {
    pub action: &'static str,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub auth_token: Option<&'a str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub phase: Option<&'a str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub offset: Option<u64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub item_id: Option<&'a str>,
}

impl<'a> RequestEnvelope<'a> {
    pub fn new(request: &'a BatchRequest, auth_token: Option<&'a str>) -> Self {
        Self {
            action: request.action.as_str(),
            auth_token,
            phase: request.phase.as_ref().map(|p| p.as_str()),
            offset: request.offset,
            item_id: request.item_id.as_ref().map(ItemId::as_str),
        }
    }
}

/// Response body: a success flag plus an optional data payload.
#[derive(Debug, Deserialize)]
pub struct ResponseEnvelope {
    pub success: bool,
    #[serde(default)]
    pub data: ResponseData,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ResponseData {
    pub next_offset: Option<u64>,
    pub total_items: Option<u64>,
    pub has_more: bool,
    pub batch_logs: Vec<String>,
    pub message: Option<String>,
    pub details: Option<serde_json::Value>,
    pub products: Vec<WireProduct>,
    pub item_name: Option<String>,
    pub external_id: Option<String>,
    pub sku: Option<String>,
    pub status: Option<String>,
}

/// Product ids arrive as strings from some backends and numbers from others.
#[derive(Debug, Deserialize)]
#[serde(untagged)]
pub enum WireId {
    Text(String),
    Number(u64),
}

impl From<WireId> for ItemId {
    fn from(id: WireId) -> Self {
        match id {
            WireId::Text(s) => ItemId::new(s),
            WireId::Number(n) => ItemId::new(n.to_string()),
        }
    }
}

#[derive(Debug, Deserialize)]
pub struct WireProduct {
    pub id: WireId,
    pub name: String,
    #[serde(default)]
    pub sku: Option<String>,
    #[serde(default = "enabled_by_default")]
    pub enabled: bool,
}

fn enabled_by_default() -> bool {
    true
}

impl From<WireProduct> for CatalogItem {
    fn from(product: WireProduct) -> Self {
        Self {
            id: product.id.into(),
            name: product.name,
            sku: product.sku.filter(|sku| !sku.is_empty()),
            enabled: product.enabled,
        }
    }
}

impl From<ResponseEnvelope> for BatchResponse {
    fn from(envelope: ResponseEnvelope) -> Self {
        let data = envelope.data;
        let has_item = data.item_name.is_some()
            || data.external_id.is_some()
            || data.sku.is_some()
            || data.status.is_some();
        let item = has_item.then(|| ImportedItem {
            name: data.item_name,
            external_id: data.external_id,
            sku: data.sku,
            status: data.status,
        });

        Self {
            success: envelope.success,
            next_offset: data.next_offset,
            total_items: data.total_items,
            has_more: data.has_more,
            log_lines: data.batch_logs,
            message: data.message,
            details: data.details,
            items: data.products.into_iter().map(CatalogItem::from).collect(),
            item,
        }
    }
}

#[cfg(test)]
mod tests {
    use catalog_sync::SyncPhase;
    use serde_json::json;

    use super::*;

    #[test]
    fn request_uses_camel_case_and_skips_absent_fields() {
        let request = BatchRequest::phase_sync(&SyncPhase::Categories, 50);
        let body = serde_json::to_value(RequestEnvelope::new(&request, Some("secret"))).unwrap();
        assert_eq!(
            body,
            json!({
                "action": "phase-sync",
                "authToken": "secret",
                "phase": "categories",
                "offset": 50,
            })
        );

        let request = BatchRequest::import_one(&ItemId::new("42"));
        let body = serde_json::to_value(RequestEnvelope::new(&request, None)).unwrap();
        assert_eq!(body, json!({"action": "import-one", "itemId": "42"}));
    }

    #[test]
    fn page_response_converts() {
        let envelope: ResponseEnvelope = serde_json::from_value(json!({
            "success": true,
            "data": {
                "nextOffset": 50,
                "totalItems": 120,
                "hasMore": true,
                "batchLogs": ["Category Shoes created"],
            }
        }))
        .unwrap();

        let response = BatchResponse::from(envelope);
        assert_eq!(response.next_offset, Some(50));
        assert_eq!(response.total_items, Some(120));
        assert!(response.has_more);
        assert_eq!(response.log_lines, vec!["Category Shoes created"]);
        assert!(response.item.is_none());
    }

    #[test]
    fn missing_data_means_no_more_work() {
        let envelope: ResponseEnvelope = serde_json::from_str(r#"{"success":false}"#).unwrap();
        let response = BatchResponse::from(envelope);
        assert!(!response.success);
        assert!(!response.has_more);
        assert!(response.message.is_none());
    }

    #[test]
    fn products_accept_numeric_ids() {
        let envelope: ResponseEnvelope = serde_json::from_value(json!({
            "success": true,
            "data": {
                "products": [
                    {"id": 17, "name": "Red Mug", "sku": "MUG-R"},
                    {"id": "x-9", "name": "Old Mug", "sku": "", "enabled": false},
                ]
            }
        }))
        .unwrap();

        let items = BatchResponse::from(envelope).items;
        assert_eq!(items[0].id, ItemId::new("17"));
        assert!(items[0].enabled);
        assert_eq!(items[1].id, ItemId::new("x-9"));
        assert_eq!(items[1].sku, None);
        assert!(!items[1].enabled);
    }

    #[test]
    fn import_fields_become_an_item() {
        let envelope: ResponseEnvelope = serde_json::from_value(json!({
            "success": true,
            "data": {"itemName": "Blue Mug", "externalId": "ext-1", "status": "created"}
        }))
        .unwrap();

        let item = BatchResponse::from(envelope).item.unwrap();
        assert_eq!(item.name.as_deref(), Some("Blue Mug"));
        assert_eq!(item.external_id.as_deref(), Some("ext-1"));
        assert_eq!(item.sku, None);
    }
}
