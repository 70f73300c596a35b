//! Dashboard statistics

use crate::DocumentGraph;
use crate::document::{ActiveStatus, MaterialStatus, OrderStatus, RequisitionStatus, RfqStatus};
use serde::Serialize;

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MaterialStats {
    pub total: usize,
    /// Stock at or below minimum
    pub low_stock: usize,
    pub out_of_stock: usize,
    pub active: usize,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ProcurementStats {
    #[serde(rename = "pendingPRs")]
    pub pending_prs: usize,
    #[serde(rename = "waitingRFQs")]
    pub waiting_rfqs: usize,
    /// Purchase orders still open (pending or confirmed)
    #[serde(rename = "pendingPOs")]
    pub pending_pos: usize,
    /// Materials flagged low-stock or out-of-stock
    #[serde(rename = "criticalMaterials")]
    pub critical_materials: usize,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SupplierStats {
    pub total: usize,
    pub active: usize,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DashboardStats {
    pub materials: MaterialStats,
    pub procurement: ProcurementStats,
    pub suppliers: SupplierStats,
}

impl DashboardStats {
    pub fn from_graph(graph: &DocumentGraph) -> Self {
        let materials = graph.materials.values();

        Self {
            materials: MaterialStats {
                total: graph.materials.len(),
                low_stock: materials.clone().filter(|m| m.is_low_stock()).count(),
                out_of_stock: materials.clone().filter(|m| m.current_stock == 0).count(),
                active: materials
                    .clone()
                    .filter(|m| m.status == MaterialStatus::Active)
                    .count(),
            },
            procurement: ProcurementStats {
                pending_prs: graph
                    .purchase_requisitions
                    .values()
                    .filter(|pr| pr.status == RequisitionStatus::Pending)
                    .count(),
                waiting_rfqs: graph
                    .rfqs
                    .values()
                    .filter(|rfq| rfq.status == RfqStatus::Waiting)
                    .count(),
                pending_pos: graph
                    .purchase_orders
                    .values()
                    .filter(|po| matches!(po.status, OrderStatus::Pending | OrderStatus::Confirmed))
                    .count(),
                critical_materials: materials
                    .filter(|m| {
                        matches!(m.status, MaterialStatus::LowStock | MaterialStatus::OutOfStock)
                    })
                    .count(),
            },
            suppliers: SupplierStats {
                total: graph.suppliers.len(),
                active: graph
                    .suppliers
                    .values()
                    .filter(|s| s.status == ActiveStatus::Active)
                    .count(),
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::seed;

    #[test]
    fn test_stats_for_seed_data() {
        let stats = DashboardStats::from_graph(&seed::default_graph().unwrap());
        assert_eq!(stats.materials.total, 12);
        // NVL-007 (15 <= 100) and NVL-012 (0 <= 500)
        assert_eq!(stats.materials.low_stock, 2);
        assert_eq!(stats.materials.out_of_stock, 1);
        assert_eq!(stats.materials.active, 10);
        assert_eq!(stats.procurement.pending_prs, 1);
        assert_eq!(stats.procurement.waiting_rfqs, 1);
        assert_eq!(stats.procurement.pending_pos, 1);
        assert_eq!(stats.procurement.critical_materials, 2);
        assert_eq!(stats.suppliers.total, 4);
        assert_eq!(stats.suppliers.active, 4);
    }

    #[test]
    fn test_stats_wire_names() {
        let stats = DashboardStats::from_graph(&DocumentGraph::default());
        let value = serde_json::to_value(&stats).unwrap();
        assert_eq!(value["procurement"]["pendingPRs"], 0);
        assert_eq!(value["materials"]["outOfStock"], 0);
    }
}
