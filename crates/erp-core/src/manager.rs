//! Data manager: the repository over a [`Store`] and a [`Clock`]
//!
//! Every call loads the whole graph, changes it, and writes it back.
//! Reads on an empty store return empty collections; writes on an empty
//! store fail with `Error::NotInitialized`.

use crate::document::{
    Bom, Collection, Material, Numbered, Product, PurchaseOrder, PurchaseRequisition, Record,
    Rfq, SalesOrder, Settings, Supplier,
};
use crate::id::{DocumentKind, IdAllocator, format_id};
use crate::patch::{self, Patch};
use crate::stats::DashboardStats;
use crate::{Clock, Config, DocumentGraph, Error, Result, Store, SystemClock, seed};
use tracing::{debug, info, warn};

/// Data format version written into every saved graph
pub const DATA_VERSION: &str = "1.0.0";

pub struct DataManager<S, C = SystemClock> {
    store: S,
    clock: C,
    config: Config,
}

impl<S: Store> DataManager<S, SystemClock> {
    pub fn new(store: S) -> Self {
        Self::with_clock(store, SystemClock)
    }
}

impl<S: Store, C: Clock> DataManager<S, C> {
    pub fn with_clock(store: S, clock: C) -> Self {
        Self {
            store,
            clock,
            config: Config::default(),
        }
    }

    pub fn with_config(mut self, config: Config) -> Self {
        self.config = config;
        self
    }

    /// Seed default data on first use, and bring older data up to
    /// [`DATA_VERSION`]
    pub fn init(&self) -> Result<()> {
        match self.store.load()? {
            None => self.seed(),
            Some(graph) => self.migrate_if_needed(graph),
        }
    }

    pub fn has_data(&self) -> Result<bool> {
        Ok(self.store.load()?.is_some())
    }

    fn seed(&self) -> Result<()> {
        let mut graph = seed::default_graph()?;
        self.save_all(&mut graph)?;
        info!("initialized default data");
        Ok(())
    }

    fn migrate_if_needed(&self, mut graph: DocumentGraph) -> Result<()> {
        if graph.version == DATA_VERSION {
            return Ok(());
        }
        info!(from = %graph.version, to = DATA_VERSION, "migrating data");
        self.save_all(&mut graph)
    }

    /// The whole graph, if anything has been stored
    pub fn get_all(&self) -> Result<Option<DocumentGraph>> {
        self.store.load()
    }

    /// Stamp version and update time, then write the whole graph
    pub fn save_all(&self, graph: &mut DocumentGraph) -> Result<()> {
        graph.last_updated = self.clock.timestamp();
        graph.version = DATA_VERSION.to_string();
        self.store.save(graph)
    }

    fn load_required(&self) -> Result<DocumentGraph> {
        self.store.load()?.ok_or(Error::NotInitialized)
    }

    fn list<T: Clone>(&self, select: fn(&DocumentGraph) -> &Collection<T>) -> Result<Vec<T>> {
        Ok(self
            .store
            .load()?
            .map(|graph| select(&graph).values().cloned().collect::<Vec<_>>())
            .unwrap_or_default())
    }

    fn find<T: Clone>(
        &self,
        select: fn(&DocumentGraph) -> &Collection<T>,
        id: &str,
    ) -> Result<Option<T>> {
        Ok(self
            .store
            .load()?
            .and_then(|graph| select(&graph).get(id).cloned()))
    }

    fn insert<T: Record>(
        &self,
        select: fn(&mut DocumentGraph) -> &mut Collection<T>,
        mut record: T,
    ) -> Result<T> {
        if record.id().trim().is_empty() {
            return Err(Error::InvalidId(format!("{} without an id", T::KIND)));
        }

        let mut graph = self.load_required()?;
        let collection = select(&mut graph);
        if collection.contains_key(record.id()) {
            return Err(Error::already_exists(T::KIND, record.id()));
        }

        let now = self.clock.timestamp();
        record.set_created_at(now.clone());
        record.set_last_updated(now);
        collection.insert(record.id().to_string(), record.clone());

        self.save_all(&mut graph)?;
        debug!(kind = T::KIND, id = record.id(), "added record");
        Ok(record)
    }

    fn update<T: Record>(
        &self,
        select: fn(&mut DocumentGraph) -> &mut Collection<T>,
        id: &str,
        changes: &Patch,
    ) -> Result<T> {
        let mut graph = self.load_required()?;
        let collection = select(&mut graph);
        let current = collection
            .get(id)
            .ok_or_else(|| Error::not_found(T::KIND, id))?;

        let mut updated = patch::apply(current, changes)?;
        updated.set_last_updated(self.clock.timestamp());
        collection.insert(id.to_string(), updated.clone());

        self.save_all(&mut graph)?;
        debug!(kind = T::KIND, id, fields = changes.len(), "updated record");
        Ok(updated)
    }

    /// Assign a fresh number when the record has none, then insert it
    fn create<T: Numbered>(
        &self,
        select: fn(&mut DocumentGraph) -> &mut Collection<T>,
        mut record: T,
    ) -> Result<T> {
        if record.id().trim().is_empty() {
            record.set_id(self.next_id(T::DOCUMENT)?);
        }
        self.insert(select, record)
    }

    // === Document numbers ===

    /// Next document number for `kind` using the configured prefix
    ///
    /// When the store cannot be read this fails, unless
    /// `allocation.fallback_on_storage_error` is set, in which case sequence
    /// 1 is handed out and a warning logged.
    pub fn next_id(&self, kind: DocumentKind) -> Result<String> {
        let prefix = self.config.prefixes.prefix(kind);
        match IdAllocator::new(&self.store, &self.clock).allocate(prefix) {
            Err(Error::StorageUnavailable(reason))
                if self.config.allocation.fallback_on_storage_error =>
            {
                warn!(%reason, prefix, "storage unavailable, numbering from 1");
                Ok(format_id(prefix, self.clock.today(), 1))
            }
            other => other,
        }
    }

    // === Settings ===

    pub fn settings(&self) -> Result<Settings> {
        Ok(self
            .store
            .load()?
            .map(|graph| graph.settings)
            .unwrap_or_default())
    }

    // === Materials ===

    pub fn materials(&self) -> Result<Vec<Material>> {
        self.list(|g| &g.materials)
    }

    pub fn material(&self, id: &str) -> Result<Option<Material>> {
        self.find(|g| &g.materials, id)
    }

    pub fn add_material(&self, material: Material) -> Result<Material> {
        self.insert(|g| &mut g.materials, material)
    }

    pub fn update_material(&self, id: &str, changes: &Patch) -> Result<Material> {
        self.update(|g| &mut g.materials, id, changes)
    }

    pub fn delete_material(&self, id: &str) -> Result<Material> {
        let mut graph = self.load_required()?;
        let removed = graph
            .materials
            .remove(id)
            .ok_or_else(|| Error::not_found(Material::KIND, id))?;
        self.save_all(&mut graph)?;
        debug!(id, "deleted material");
        Ok(removed)
    }

    /// Materials at or below their minimum stock
    pub fn low_stock_materials(&self) -> Result<Vec<Material>> {
        Ok(self
            .materials()?
            .into_iter()
            .filter(Material::is_low_stock)
            .collect())
    }

    // === Suppliers ===

    pub fn suppliers(&self) -> Result<Vec<Supplier>> {
        self.list(|g| &g.suppliers)
    }

    pub fn supplier(&self, id: &str) -> Result<Option<Supplier>> {
        self.find(|g| &g.suppliers, id)
    }

    pub fn add_supplier(&self, supplier: Supplier) -> Result<Supplier> {
        self.insert(|g| &mut g.suppliers, supplier)
    }

    pub fn update_supplier(&self, id: &str, changes: &Patch) -> Result<Supplier> {
        self.update(|g| &mut g.suppliers, id, changes)
    }

    // === Products, BOMs, sales orders ===

    pub fn products(&self) -> Result<Vec<Product>> {
        self.list(|g| &g.products)
    }

    pub fn product(&self, id: &str) -> Result<Option<Product>> {
        self.find(|g| &g.products, id)
    }

    pub fn boms(&self) -> Result<Vec<Bom>> {
        self.list(|g| &g.bom)
    }

    /// Bill of materials for a product
    pub fn bom(&self, product_id: &str) -> Result<Option<Bom>> {
        self.find(|g| &g.bom, product_id)
    }

    pub fn sales_orders(&self) -> Result<Vec<SalesOrder>> {
        self.list(|g| &g.sales_orders)
    }

    // === Purchase requisitions ===

    pub fn purchase_requisitions(&self) -> Result<Vec<PurchaseRequisition>> {
        self.list(|g| &g.purchase_requisitions)
    }

    pub fn purchase_requisition(&self, id: &str) -> Result<Option<PurchaseRequisition>> {
        self.find(|g| &g.purchase_requisitions, id)
    }

    pub fn add_purchase_requisition(
        &self,
        pr: PurchaseRequisition,
    ) -> Result<PurchaseRequisition> {
        self.insert(|g| &mut g.purchase_requisitions, pr)
    }

    /// Add a requisition, numbering it first if it has no id
    pub fn create_purchase_requisition(
        &self,
        pr: PurchaseRequisition,
    ) -> Result<PurchaseRequisition> {
        self.create(|g| &mut g.purchase_requisitions, pr)
    }

    pub fn update_purchase_requisition(
        &self,
        id: &str,
        changes: &Patch,
    ) -> Result<PurchaseRequisition> {
        self.update(|g| &mut g.purchase_requisitions, id, changes)
    }

    // === RFQs ===

    pub fn rfqs(&self) -> Result<Vec<Rfq>> {
        self.list(|g| &g.rfqs)
    }

    pub fn rfq(&self, id: &str) -> Result<Option<Rfq>> {
        self.find(|g| &g.rfqs, id)
    }

    pub fn add_rfq(&self, rfq: Rfq) -> Result<Rfq> {
        self.insert(|g| &mut g.rfqs, rfq)
    }

    pub fn create_rfq(&self, rfq: Rfq) -> Result<Rfq> {
        self.create(|g| &mut g.rfqs, rfq)
    }

    pub fn update_rfq(&self, id: &str, changes: &Patch) -> Result<Rfq> {
        self.update(|g| &mut g.rfqs, id, changes)
    }

    // === Purchase orders ===

    pub fn purchase_orders(&self) -> Result<Vec<PurchaseOrder>> {
        self.list(|g| &g.purchase_orders)
    }

    pub fn purchase_order(&self, id: &str) -> Result<Option<PurchaseOrder>> {
        self.find(|g| &g.purchase_orders, id)
    }

    pub fn add_purchase_order(&self, po: PurchaseOrder) -> Result<PurchaseOrder> {
        self.insert(|g| &mut g.purchase_orders, po)
    }

    pub fn create_purchase_order(&self, po: PurchaseOrder) -> Result<PurchaseOrder> {
        self.create(|g| &mut g.purchase_orders, po)
    }

    pub fn update_purchase_order(&self, id: &str, changes: &Patch) -> Result<PurchaseOrder> {
        self.update(|g| &mut g.purchase_orders, id, changes)
    }

    // === Whole-graph operations ===

    /// The whole graph as pretty-printed JSON, ready to write to a file
    pub fn export(&self) -> Result<Option<String>> {
        self.get_all()?
            .map(|graph| serde_json::to_string_pretty(&graph).map_err(Error::from))
            .transpose()
    }

    /// Replace everything with `graph`
    pub fn import(&self, mut graph: DocumentGraph) -> Result<()> {
        self.save_all(&mut graph)?;
        info!("imported data");
        Ok(())
    }

    /// Drop all data and re-seed the defaults
    pub fn reset(&self) -> Result<()> {
        self.store.remove()?;
        info!("removed data");
        self.seed()
    }

    pub fn dashboard_stats(&self) -> Result<Option<DashboardStats>> {
        Ok(self
            .store
            .load()?
            .map(|graph| DashboardStats::from_graph(&graph)))
    }
}
