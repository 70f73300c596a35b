//! Default data for a fresh workspace

use crate::{DocumentGraph, Result};

const SEED: &str = include_str!("seed.json");

/// Demo company data: materials, suppliers, two products with their BOMs,
/// and a handful of procurement documents
pub fn default_graph() -> Result<DocumentGraph> {
    Ok(serde_json::from_str(SEED)?)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::document::{MaterialStatus, RequisitionStatus};

    #[test]
    fn test_seed_parses() {
        let graph = default_graph().unwrap();
        assert_eq!(graph.materials.len(), 12);
        assert_eq!(graph.suppliers.len(), 4);
        assert_eq!(graph.products.len(), 2);
        assert_eq!(graph.bom.len(), 2);
        assert_eq!(graph.sales_orders.len(), 1);
        assert_eq!(graph.purchase_requisitions.len(), 2);
        assert_eq!(graph.rfqs.len(), 2);
        assert_eq!(graph.purchase_orders.len(), 1);
        assert_eq!(graph.settings.company_name, "Công ty TNHH Thiên Kim");
    }

    #[test]
    fn test_seed_keys_match_ids() {
        let graph = default_graph().unwrap();
        assert!(graph.materials.iter().all(|(k, m)| *k == m.id));
        assert!(graph.bom.iter().all(|(k, b)| *k == b.product_id));
        assert!(graph.rfqs.iter().all(|(k, r)| *k == r.id));
    }

    #[test]
    fn test_seed_statuses() {
        let graph = default_graph().unwrap();
        assert_eq!(graph.materials["NVL-012"].status, MaterialStatus::OutOfStock);
        assert_eq!(
            graph.purchase_requisitions["PR-20241006-002"].status,
            RequisitionStatus::Approved
        );
        assert_eq!(graph.rfqs["RFQ-20241005-001"].pending_suppliers(), vec!["NCC-004"]);
    }
}
