//! Document graph and record types
//!
//! The whole ERP state is one JSON blob. Field names are camelCase on the
//! wire; every collection and most fields are optional on read so that
//! partially filled records and older blobs still load. Keys a type does not
//! model land in its `extra` map and are written back unchanged.

use crate::id::DocumentKind;
use chrono::NaiveDate;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::collections::BTreeMap;

/// Ordered mapping from identifier to record
pub type Collection<T> = BTreeMap<String, T>;

/// A record stored in one of the graph's keyed collections
pub trait Record: Serialize + DeserializeOwned + Clone {
    /// Human-readable kind, used in error messages
    const KIND: &'static str;

    /// Primary key
    fn id(&self) -> &str;

    fn set_last_updated(&mut self, timestamp: String);

    /// Stamp creation time; records without a creation field ignore it
    fn set_created_at(&mut self, _timestamp: String) {}
}

/// A record whose primary key comes from the dated document numbering
pub trait Numbered: Record {
    const DOCUMENT: DocumentKind;

    fn set_id(&mut self, id: String);
}

macro_rules! status_enum {
    (
        $(#[$meta:meta])*
        $name:ident { $($variant:ident => $text:literal),+ $(,)? } default $default:ident
    ) => {
        $(#[$meta])*
        #[derive(Debug, Clone, PartialEq, Eq, Hash)]
        pub enum $name {
            $($variant,)+
            /// A value this build does not know, kept as written
            Other(String),
        }

        impl $name {
            pub fn as_str(&self) -> &str {
                match self {
                    $($name::$variant => $text,)+
                    $name::Other(text) => text.as_str(),
                }
            }
        }

        impl Default for $name {
            fn default() -> Self {
                $name::$default
            }
        }

        impl std::str::FromStr for $name {
            type Err = crate::Error;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                match s.to_lowercase().replace('_', "-").as_str() {
                    $($text => Ok($name::$variant),)+
                    _ => Err(crate::Error::InvalidStatus(s.to_string())),
                }
            }
        }

        impl std::fmt::Display for $name {
            fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
                f.write_str(self.as_str())
            }
        }

        impl Serialize for $name {
            fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
                serializer.serialize_str(self.as_str())
            }
        }

        impl<'de> Deserialize<'de> for $name {
            fn deserialize<D: serde::Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
                let text = String::deserialize(deserializer)?;
                let known = match text.as_str() {
                    $($text => Some($name::$variant),)+
                    _ => None,
                };
                Ok(known.unwrap_or($name::Other(text)))
            }
        }
    };
}

/// Read an optional date, treating `""` (a cleared date input) as unset
fn blank_date<'de, D>(deserializer: D) -> Result<Option<NaiveDate>, D::Error>
where
    D: serde::Deserializer<'de>,
{
    match Option::<String>::deserialize(deserializer)? {
        Some(text) if !text.trim().is_empty() => text
            .trim()
            .parse::<NaiveDate>()
            .map(Some)
            .map_err(serde::de::Error::custom),
        _ => Ok(None),
    }
}

status_enum! {
    /// Stock status of a material
    MaterialStatus {
        Active => "active",
        LowStock => "low-stock",
        OutOfStock => "out-of-stock",
        Inactive => "inactive",
    } default Active
}

status_enum! {
    /// Whether a supplier or product is in use
    ActiveStatus {
        Active => "active",
        Inactive => "inactive",
    } default Active
}

status_enum! {
    /// Urgency of a requisition or order
    Priority {
        Low => "low",
        Normal => "normal",
        Urgent => "urgent",
        Critical => "critical",
    } default Normal
}

status_enum! {
    /// Purchase requisition workflow state
    RequisitionStatus {
        Pending => "pending",
        Approved => "approved",
        Rejected => "rejected",
        Ordered => "ordered",
    } default Pending
}

status_enum! {
    /// Request-for-quotation workflow state
    RfqStatus {
        Waiting => "waiting",
        Completed => "completed",
        Cancelled => "cancelled",
    } default Waiting
}

status_enum! {
    /// Purchase and sales order workflow state
    OrderStatus {
        Pending => "pending",
        Confirmed => "confirmed",
        Delivered => "delivered",
        Cancelled => "cancelled",
    } default Pending
}

/// Company-wide settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct Settings {
    pub company_name: String,
    pub currency: String,
    pub language: String,
    pub date_format: String,
    /// VAT rate as a fraction (0.1 = 10%)
    pub tax_rate: f64,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            company_name: String::new(),
            currency: "VND".to_string(),
            language: "vi".to_string(),
            date_format: "DD/MM/YYYY".to_string(),
            tax_rate: 0.1,
            extra: Map::new(),
        }
    }
}

/// Raw material held in stock
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
#[serde(default, rename_all = "camelCase")]
pub struct Material {
    pub id: String,
    pub code: String,
    pub name: String,
    pub description: String,
    pub category: String,
    pub unit: String,
    pub current_stock: u64,
    pub min_stock: u64,
    pub max_stock: u64,
    pub unit_price: f64,
    /// Preferred supplier ID
    pub supplier: String,
    pub location: String,
    pub status: MaterialStatus,
    pub last_updated: String,
    #[serde(skip_serializing_if = "BTreeMap::is_empty")]
    pub properties: BTreeMap<String, Value>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl Material {
    /// Stock at or below the reorder point
    pub fn is_low_stock(&self) -> bool {
        self.current_stock <= self.min_stock
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
#[serde(default, rename_all = "camelCase")]
pub struct BankAccount {
    pub bank_name: String,
    pub account_number: String,
    pub account_name: String,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// Framework contract with a supplier
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
#[serde(default, rename_all = "camelCase")]
pub struct Contract {
    pub id: String,
    #[serde(deserialize_with = "blank_date")]
    pub start_date: Option<NaiveDate>,
    #[serde(deserialize_with = "blank_date")]
    pub end_date: Option<NaiveDate>,
    /// Discount as a fraction
    pub discount: f64,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
#[serde(default, rename_all = "camelCase")]
pub struct Supplier {
    pub id: String,
    pub code: String,
    pub name: String,
    pub short_name: String,
    pub category: String,
    pub contact_person: String,
    pub phone: String,
    pub email: String,
    pub address: String,
    pub tax_code: String,
    pub payment_terms: String,
    /// Lead time in days
    pub lead_time: u32,
    pub rating: f64,
    pub status: ActiveStatus,
    pub specialties: Vec<String>,
    pub certifications: Vec<String>,
    pub bank_account: BankAccount,
    pub contracts: Vec<Contract>,
    pub last_updated: String,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// Finished good
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
#[serde(default, rename_all = "camelCase")]
pub struct Product {
    pub id: String,
    pub code: String,
    pub name: String,
    pub description: String,
    pub category: String,
    pub unit: String,
    pub sell_price: f64,
    pub cost_price: f64,
    pub status: ActiveStatus,
    /// Weight in grams
    pub weight: f64,
    pub dimensions: String,
    pub color: String,
    pub barcode: String,
    pub warranty: String,
    pub last_updated: String,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
#[serde(default, rename_all = "camelCase")]
pub struct BomLine {
    pub material_id: String,
    pub quantity: u64,
    pub unit: String,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// Bill of materials, keyed by product ID
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
#[serde(default, rename_all = "camelCase")]
pub struct Bom {
    pub product_id: String,
    pub product_name: String,
    pub version: String,
    pub status: ActiveStatus,
    pub materials: Vec<BomLine>,
    pub last_updated: String,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
#[serde(default, rename_all = "camelCase")]
pub struct SalesOrderItem {
    pub product_id: String,
    pub quantity: u64,
    pub unit_price: f64,
    pub total: f64,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
#[serde(default, rename_all = "camelCase")]
pub struct SalesOrder {
    pub id: String,
    pub customer_name: String,
    pub customer_phone: String,
    pub customer_email: String,
    pub customer_address: String,
    #[serde(deserialize_with = "blank_date")]
    pub order_date: Option<NaiveDate>,
    #[serde(deserialize_with = "blank_date")]
    pub delivery_date: Option<NaiveDate>,
    pub status: OrderStatus,
    pub priority: Priority,
    pub items: Vec<SalesOrderItem>,
    pub subtotal: f64,
    pub tax: f64,
    pub total: f64,
    pub notes: String,
    pub created_by: String,
    pub last_updated: String,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// Internal request to buy a material (PR)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
#[serde(default, rename_all = "camelCase")]
pub struct PurchaseRequisition {
    pub id: String,
    pub material_id: String,
    pub material_name: String,
    pub quantity: u64,
    pub unit: String,
    /// Machine-readable reason code (e.g. "low-stock")
    pub reason: String,
    pub reason_text: String,
    pub priority: Priority,
    pub requested_by: String,
    #[serde(deserialize_with = "blank_date")]
    pub request_date: Option<NaiveDate>,
    #[serde(deserialize_with = "blank_date")]
    pub required_date: Option<NaiveDate>,
    pub status: RequisitionStatus,
    pub approved_by: Option<String>,
    #[serde(deserialize_with = "blank_date")]
    pub approved_date: Option<NaiveDate>,
    pub notes: String,
    pub created_at: String,
    pub last_updated: String,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// One supplier's answer to an RFQ
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
#[serde(default, rename_all = "camelCase")]
pub struct QuoteResponse {
    #[serde(deserialize_with = "blank_date")]
    pub response_date: Option<NaiveDate>,
    pub unit_price: f64,
    pub total_price: f64,
    pub lead_time: u32,
    pub notes: String,
    #[serde(deserialize_with = "blank_date")]
    pub valid_until: Option<NaiveDate>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// Request for quotation sent to one or more suppliers
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
#[serde(default, rename_all = "camelCase")]
pub struct Rfq {
    pub id: String,
    pub material_id: String,
    pub material_name: String,
    pub quantity: u64,
    pub unit: String,
    /// Supplier IDs the request was sent to
    pub suppliers: Vec<String>,
    #[serde(deserialize_with = "blank_date")]
    pub issue_date: Option<NaiveDate>,
    #[serde(deserialize_with = "blank_date")]
    pub deadline: Option<NaiveDate>,
    #[serde(deserialize_with = "blank_date")]
    pub required_date: Option<NaiveDate>,
    pub status: RfqStatus,
    /// Responses keyed by supplier ID
    pub responses: BTreeMap<String, QuoteResponse>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub selected_supplier: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub selection_reason: Option<String>,
    pub notes: String,
    pub created_by: String,
    pub created_at: String,
    pub last_updated: String,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl Rfq {
    /// Suppliers that have not answered yet
    pub fn pending_suppliers(&self) -> Vec<&str> {
        self.suppliers
            .iter()
            .filter(|s| !self.responses.contains_key(s.as_str()))
            .map(String::as_str)
            .collect()
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
#[serde(default, rename_all = "camelCase")]
pub struct PurchaseOrderItem {
    pub material_id: String,
    pub material_name: String,
    pub quantity: u64,
    pub unit: String,
    pub unit_price: f64,
    pub total: f64,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
#[serde(default, rename_all = "camelCase")]
pub struct PurchaseOrder {
    pub id: String,
    pub supplier_id: String,
    pub supplier_name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub rfq_id: Option<String>,
    #[serde(deserialize_with = "blank_date")]
    pub order_date: Option<NaiveDate>,
    #[serde(deserialize_with = "blank_date")]
    pub delivery_date: Option<NaiveDate>,
    pub status: OrderStatus,
    pub payment_terms: String,
    pub items: Vec<PurchaseOrderItem>,
    pub subtotal: f64,
    pub tax: f64,
    pub total: f64,
    pub shipping_address: String,
    pub notes: String,
    pub created_by: String,
    pub created_at: String,
    pub last_updated: String,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
#[serde(default, rename_all = "camelCase")]
pub struct Reports {
    pub last_generated: Option<String>,
    pub cached: Map<String, Value>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// The entire persisted ERP state
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
#[serde(default, rename_all = "camelCase")]
pub struct DocumentGraph {
    pub version: String,
    pub last_updated: String,
    pub settings: Settings,
    pub materials: Collection<Material>,
    pub suppliers: Collection<Supplier>,
    pub products: Collection<Product>,
    pub bom: Collection<Bom>,
    pub sales_orders: Collection<SalesOrder>,
    pub purchase_requisitions: Collection<PurchaseRequisition>,
    pub rfqs: Collection<Rfq>,
    pub purchase_orders: Collection<PurchaseOrder>,
    pub inventory_transactions: Vec<Value>,
    pub reports: Reports,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

macro_rules! impl_record {
    ($ty:ty, $kind:literal, $id:ident) => {
        impl Record for $ty {
            const KIND: &'static str = $kind;

            fn id(&self) -> &str {
                &self.$id
            }

            fn set_last_updated(&mut self, timestamp: String) {
                self.last_updated = timestamp;
            }
        }
    };
}

impl_record!(Material, "Material", id);
impl_record!(Supplier, "Supplier", id);
impl_record!(Product, "Product", id);
impl_record!(Bom, "BOM", product_id);
impl_record!(SalesOrder, "Sales order", id);

macro_rules! impl_dated_record {
    ($ty:ty, $kind:literal, $doc:ident) => {
        impl Record for $ty {
            const KIND: &'static str = $kind;

            fn id(&self) -> &str {
                &self.id
            }

            fn set_last_updated(&mut self, timestamp: String) {
                self.last_updated = timestamp;
            }

            fn set_created_at(&mut self, timestamp: String) {
                self.created_at = timestamp;
            }
        }

        impl Numbered for $ty {
            const DOCUMENT: DocumentKind = DocumentKind::$doc;

            fn set_id(&mut self, id: String) {
                self.id = id;
            }
        }
    };
}

impl_dated_record!(PurchaseRequisition, "Purchase requisition", PurchaseRequisition);
impl_dated_record!(Rfq, "RFQ", Rfq);
impl_dated_record!(PurchaseOrder, "Purchase order", PurchaseOrder);

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_parse_and_display() {
        assert_eq!("low-stock".parse::<MaterialStatus>().unwrap(), MaterialStatus::LowStock);
        assert_eq!("OUT_OF_STOCK".parse::<MaterialStatus>().unwrap(), MaterialStatus::OutOfStock);
        assert_eq!(RfqStatus::Waiting.to_string(), "waiting");
        assert!("shipped".parse::<OrderStatus>().is_err());
    }

    #[test]
    fn test_graph_missing_collections_default_empty() {
        let graph: DocumentGraph = serde_json::from_str(r#"{"version":"1.0.0"}"#).unwrap();
        assert!(graph.materials.is_empty());
        assert!(graph.purchase_requisitions.is_empty());
    }

    #[test]
    fn test_camel_case_wire_format() {
        let json = r#"{
            "purchaseRequisitions": {
                "PR-20241006-001": {
                    "id": "PR-20241006-001",
                    "materialId": "NVL-007",
                    "quantity": 500,
                    "priority": "urgent",
                    "requestDate": "2024-10-06",
                    "approvedBy": null
                }
            },
            "rfqs": { "RFQ-20241005-001": { "id": "RFQ-20241005-001" } }
        }"#;
        let graph: DocumentGraph = serde_json::from_str(json).unwrap();
        let pr = &graph.purchase_requisitions["PR-20241006-001"];
        assert_eq!(pr.material_id, "NVL-007");
        assert_eq!(pr.priority, Priority::Urgent);
        assert_eq!(pr.status, RequisitionStatus::Pending);
        assert_eq!(pr.request_date, NaiveDate::from_ymd_opt(2024, 10, 6));
        assert!(graph.rfqs.contains_key("RFQ-20241005-001"));
    }

    #[test]
    fn test_unknown_status_kept_verbatim() {
        let po: PurchaseOrder =
            serde_json::from_str(r#"{"id": "PO-20241006-002", "status": "shipped"}"#).unwrap();
        assert_eq!(po.status, OrderStatus::Other("shipped".to_string()));
        assert_eq!(po.status.to_string(), "shipped");

        let value = serde_json::to_value(&po).unwrap();
        assert_eq!(value["status"], "shipped");
    }

    #[test]
    fn test_blank_dates_read_as_unset() {
        let pr: PurchaseRequisition = serde_json::from_str(
            r#"{"id": "PR-20241006-004", "requiredDate": "", "requestDate": "2024-10-06", "approvedDate": null}"#,
        )
        .unwrap();
        assert_eq!(pr.required_date, None);
        assert_eq!(pr.approved_date, None);
        assert_eq!(pr.request_date, NaiveDate::from_ymd_opt(2024, 10, 6));
    }

    #[test]
    fn test_unmodeled_fields_survive_round_trip() {
        let json = r#"{
            "materials": {
                "NVL-001": { "id": "NVL-001", "currentStock": 10, "department": "Kho A" }
            },
            "auditLog": [1, 2]
        }"#;
        let graph: DocumentGraph = serde_json::from_str(json).unwrap();
        let material = &graph.materials["NVL-001"];
        assert_eq!(material.current_stock, 10);
        assert_eq!(material.extra["department"], "Kho A");

        let value = serde_json::to_value(&graph).unwrap();
        assert_eq!(value["materials"]["NVL-001"]["department"], "Kho A");
        assert_eq!(value["auditLog"], serde_json::json!([1, 2]));
    }

    #[test]
    fn test_rfq_pending_suppliers() {
        let mut rfq = Rfq {
            suppliers: vec!["NCC-001".into(), "NCC-004".into()],
            ..Default::default()
        };
        rfq.responses
            .insert("NCC-001".into(), QuoteResponse::default());
        assert_eq!(rfq.pending_suppliers(), vec!["NCC-004"]);
    }
}
