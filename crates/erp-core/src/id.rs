//! Document number allocation
//!
//! Numbers are derived from the data on every call instead of a stored
//! counter. Format: PREFIX-YYYYMMDD-NNN, where NNN is the next sequence for
//! that prefix and day across requisitions, RFQs and purchase orders.
//!
//! There is no locking: two allocations with no save in between return the
//! same number. `DataManager` refuses to insert a duplicate key, so a raced
//! number fails at persist time instead of overwriting a document.

use crate::{Clock, Error, Result, Store};
use chrono::NaiveDate;
use serde::Deserialize;
use serde::de::IgnoredAny;
use std::collections::BTreeMap;
use tracing::debug;

/// Sequence numbers are zero-padded to at least this many digits
const SEQUENCE_WIDTH: usize = 3;

/// Document types that carry a dated number
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DocumentKind {
    PurchaseRequisition,
    Rfq,
    PurchaseOrder,
}

impl DocumentKind {
    /// Built-in prefix, overridable in config
    pub fn default_prefix(&self) -> &'static str {
        match self {
            DocumentKind::PurchaseRequisition => "PR",
            DocumentKind::Rfq => "RFQ",
            DocumentKind::PurchaseOrder => "PO",
        }
    }
}

impl std::str::FromStr for DocumentKind {
    type Err = crate::Error;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "pr" | "requisition" | "purchase-requisition" => Ok(DocumentKind::PurchaseRequisition),
            "rfq" | "quotation" => Ok(DocumentKind::Rfq),
            "po" | "purchase-order" => Ok(DocumentKind::PurchaseOrder),
            _ => Err(crate::Error::InvalidKind(s.to_string())),
        }
    }
}

impl std::fmt::Display for DocumentKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            DocumentKind::PurchaseRequisition => write!(f, "purchase requisition"),
            DocumentKind::Rfq => write!(f, "RFQ"),
            DocumentKind::PurchaseOrder => write!(f, "purchase order"),
        }
    }
}

/// Format a date as YYYYMMDD
pub fn date_stamp(date: NaiveDate) -> String {
    date.format("%Y%m%d").to_string()
}

/// Build an identifier. Padding never truncates: 1000 stays 1000.
pub fn format_id(prefix: &str, date: NaiveDate, sequence: u64) -> String {
    format!(
        "{}-{}-{:0width$}",
        prefix,
        date_stamp(date),
        sequence,
        width = SEQUENCE_WIDTH
    )
}

/// Extract the sequence number if `id` is exactly `stem` followed by one or
/// more ASCII digits
fn sequence_of(id: &str, stem: &str) -> Option<u64> {
    let digits = id.strip_prefix(stem)?;
    if digits.is_empty() || !digits.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    // Overflowing runs are skipped like any other malformed entry
    digits.parse::<u64>().ok()
}

/// Next identifier for `prefix` on `date`, given every existing identifier
/// that shares the numbering authority
pub fn next_id<'a>(ids: impl IntoIterator<Item = &'a str>, prefix: &str, date: NaiveDate) -> String {
    let stem = format!("{}-{}-", prefix, date_stamp(date));
    let max = ids
        .into_iter()
        .filter_map(|id| sequence_of(id, &stem))
        .max()
        .unwrap_or(0);
    format_id(prefix, date, max.saturating_add(1))
}

/// Keys of the numbered collections, with record bodies left unparsed so a
/// malformed document cannot block numbering
#[derive(Debug, Default, Deserialize)]
#[serde(default, rename_all = "camelCase")]
struct NumberedKeys {
    purchase_requisitions: BTreeMap<String, IgnoredAny>,
    rfqs: BTreeMap<String, IgnoredAny>,
    purchase_orders: BTreeMap<String, IgnoredAny>,
}

impl NumberedKeys {
    fn parse(blob: &str) -> Result<Self> {
        serde_json::from_str(blob).map_err(|e| Error::StorageUnavailable(e.to_string()))
    }

    fn ids(&self) -> impl Iterator<Item = &str> {
        self.purchase_requisitions
            .keys()
            .chain(self.rfqs.keys())
            .chain(self.purchase_orders.keys())
            .map(String::as_str)
    }
}

/// Allocates dated document numbers from the current store contents
pub struct IdAllocator<'a, S, C> {
    store: &'a S,
    clock: &'a C,
}

impl<'a, S: Store, C: Clock> IdAllocator<'a, S, C> {
    pub fn new(store: &'a S, clock: &'a C) -> Self {
        Self { store, clock }
    }

    /// Next unused identifier for `prefix` today
    ///
    /// Reads the store once and has no side effects; the caller persists the
    /// new document. The prefix is used verbatim. An empty store yields
    /// sequence 1.
    ///
    /// # Errors
    /// `Error::StorageUnavailable` when the store cannot be read or is not a
    /// JSON object with keyed collections. Record bodies are not validated.
    pub fn allocate(&self, prefix: &str) -> Result<String> {
        let date = self.clock.today();
        let id = match self.store.read()? {
            Some(blob) => next_id(NumberedKeys::parse(&blob)?.ids(), prefix, date),
            None => format_id(prefix, date, 1),
        };
        debug!(%id, prefix, "allocated document number");
        Ok(id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::document::{PurchaseOrder, PurchaseRequisition, Rfq};
    use crate::{DocumentGraph, FixedClock, MemoryStore};

    fn oct(day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 10, day).unwrap()
    }

    fn graph_with(prs: &[&str], rfqs: &[&str], pos: &[&str]) -> DocumentGraph {
        let mut graph = DocumentGraph::default();
        for id in prs {
            graph
                .purchase_requisitions
                .insert(id.to_string(), PurchaseRequisition::default());
        }
        for id in rfqs {
            graph.rfqs.insert(id.to_string(), Rfq::default());
        }
        for id in pos {
            graph
                .purchase_orders
                .insert(id.to_string(), PurchaseOrder::default());
        }
        graph
    }

    fn allocate(store: &MemoryStore, prefix: &str) -> Result<String> {
        let clock = FixedClock::on(oct(6));
        IdAllocator::new(store, &clock).allocate(prefix)
    }

    #[test]
    fn test_empty_graph_starts_at_one() {
        let store = MemoryStore::with_graph(&DocumentGraph::default()).unwrap();
        assert_eq!(allocate(&store, "PR").unwrap(), "PR-20241006-001");
    }

    #[test]
    fn test_absent_graph_starts_at_one() {
        let store = MemoryStore::new();
        assert_eq!(allocate(&store, "PR").unwrap(), "PR-20241006-001");
    }

    #[test]
    fn test_next_after_max_ignoring_other_prefixes() {
        let graph = graph_with(&["PR-20241006-001", "PR-20241006-007"], &["RFQ-20241006-099"], &[]);
        let store = MemoryStore::with_graph(&graph).unwrap();
        assert_eq!(allocate(&store, "PR").unwrap(), "PR-20241006-008");
        assert_eq!(allocate(&store, "RFQ").unwrap(), "RFQ-20241006-100");
    }

    #[test]
    fn test_sequence_shared_across_collections() {
        // A PR-prefixed key filed under purchase orders still counts
        let graph = graph_with(&["PR-20241006-002"], &[], &["PR-20241006-004"]);
        let store = MemoryStore::with_graph(&graph).unwrap();
        assert_eq!(allocate(&store, "PR").unwrap(), "PR-20241006-005");
    }

    #[test]
    fn test_previous_day_does_not_count() {
        let graph = graph_with(&["PR-20241005-050"], &[], &[]);
        let store = MemoryStore::with_graph(&graph).unwrap();
        assert_eq!(allocate(&store, "PR").unwrap(), "PR-20241006-001");
    }

    #[test]
    fn test_repeat_allocation_without_save_is_identical() {
        let graph = graph_with(&["PR-20241006-003"], &[], &[]);
        let store = MemoryStore::with_graph(&graph).unwrap();
        let first = allocate(&store, "PR").unwrap();
        let second = allocate(&store, "PR").unwrap();
        assert_eq!(first, "PR-20241006-004");
        assert_eq!(first, second);
    }

    #[test]
    fn test_sequence_past_999_is_not_truncated() {
        let graph = graph_with(&["PR-20241006-999"], &[], &[]);
        let store = MemoryStore::with_graph(&graph).unwrap();
        assert_eq!(allocate(&store, "PR").unwrap(), "PR-20241006-1000");
    }

    #[test]
    fn test_prefix_must_match_exactly() {
        let ids = ["PRX-20241006-010", "XPR-20241006-020", "PR-20241006-002"];
        assert_eq!(next_id(ids, "PR", oct(6)), "PR-20241006-003");
    }

    #[test]
    fn test_malformed_suffixes_are_skipped() {
        let ids = [
            "PR-20241006-",
            "PR-20241006-12a",
            "PR-20241006-+5",
            "PR-20241006-007-1",
            "PR-20241006-99999999999999999999999",
            "PR-20241006-002",
        ];
        assert_eq!(next_id(ids, "PR", oct(6)), "PR-20241006-003");
    }

    #[test]
    fn test_unpadded_existing_numbers_count() {
        let ids = ["PR-20241006-12"];
        assert_eq!(next_id(ids, "PR", oct(6)), "PR-20241006-013");
    }

    #[test]
    fn test_prefix_used_verbatim() {
        assert_eq!(next_id(std::iter::empty(), "po lot", oct(6)), "po lot-20241006-001");
    }

    #[test]
    fn test_unreadable_store_is_storage_unavailable() {
        let store = MemoryStore::from_raw("{not json");
        let err = allocate(&store, "PR").unwrap_err();
        assert!(matches!(err, Error::StorageUnavailable(_)));
    }

    #[test]
    fn test_malformed_records_do_not_block_numbering() {
        let store = MemoryStore::from_raw(
            r#"{
                "purchaseRequisitions": {
                    "PR-20241006-004": {"id": "PR-20241006-004", "requiredDate": "", "quantity": 2.5}
                },
                "purchaseOrders": {
                    "PO-20241006-002": {"id": "PO-20241006-002", "status": "shipped"},
                    "PO-20241006-003": "not even an object"
                },
                "materials": 42
            }"#,
        );
        assert_eq!(allocate(&store, "PR").unwrap(), "PR-20241006-005");
        assert_eq!(allocate(&store, "PO").unwrap(), "PO-20241006-004");
    }

    #[test]
    fn test_non_map_collection_is_storage_unavailable() {
        let store = MemoryStore::from_raw(r#"{"rfqs": [1, 2]}"#);
        assert!(matches!(allocate(&store, "RFQ"), Err(Error::StorageUnavailable(_))));
    }

    #[test]
    fn test_document_kind_parse() {
        assert_eq!("PR".parse::<DocumentKind>().unwrap(), DocumentKind::PurchaseRequisition);
        assert_eq!("rfq".parse::<DocumentKind>().unwrap().default_prefix(), "RFQ");
        assert!("invoice".parse::<DocumentKind>().is_err());
        assert!("so".parse::<DocumentKind>().is_err());
    }
}
