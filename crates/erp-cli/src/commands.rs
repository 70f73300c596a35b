//! CLI command implementations

use crate::DocumentCommands;
use anyhow::{Context, Result, bail};
use chrono::NaiveDate;
use colored::Colorize;
use erp_core::document::{
    Material, MaterialStatus, OrderStatus, PurchaseOrder, PurchaseRequisition,
    RequisitionStatus, Rfq, RfqStatus, Supplier,
};
use erp_core::{Config, DataManager, DocumentGraph, DocumentKind, JsonFileStore, patch};
use serde::Serialize;
use std::fmt::Write as _;
use tabled::settings::Style;
use tabled::{Table, Tabled};
use tracing::debug;

type Manager = DataManager<JsonFileStore>;

/// Open the workspace and apply its config
fn open() -> Result<(Manager, Config)> {
    let store = JsonFileStore::open()?;
    let config = store.config()?;
    debug!(path = %store.data_path().display(), "opened workspace");
    if !config.display.colors {
        colored::control::set_override(false);
    }
    Ok((DataManager::new(store).with_config(config.clone()), config))
}

fn print_json<T: Serialize + ?Sized>(value: &T) -> Result<()> {
    println!("{}", serde_json::to_string(value)?);
    Ok(())
}

fn print_table<T: Tabled>(rows: Vec<T>, empty: &str) {
    if rows.is_empty() {
        println!("{}", empty);
        return;
    }
    let mut table = Table::new(rows);
    table.with(Style::rounded());
    println!("{}", table);
}

fn truncate(text: &str, max: usize) -> String {
    if text.chars().count() <= max {
        text.to_string()
    } else {
        let cut: String = text.chars().take(max.saturating_sub(1)).collect();
        format!("{}…", cut)
    }
}

/// Format with the configured pattern, falling back to ISO if it is invalid
fn fmt_date(date: Option<NaiveDate>, config: &Config) -> String {
    let Some(date) = date else {
        return "-".to_string();
    };
    let mut out = String::new();
    match write!(out, "{}", date.format(&config.display.date_format)) {
        Ok(()) => out,
        Err(_) => date.to_string(),
    }
}

fn fmt_money(amount: f64) -> String {
    let whole = amount.round() as i64;
    let digits = whole.unsigned_abs().to_string();
    let mut grouped = String::new();
    for (i, ch) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            grouped.push('.');
        }
        grouped.push(ch);
    }
    if whole < 0 {
        format!("-{}", grouped)
    } else {
        grouped
    }
}

fn parse_record<T: serde::de::DeserializeOwned>(body: &str) -> Result<T> {
    serde_json::from_str(body).context("Invalid JSON record")
}

pub fn init(global: bool, no_seed: bool) -> Result<()> {
    let root = if global {
        JsonFileStore::global_root().context("Could not determine data directory")?
    } else {
        std::env::current_dir()?
    };
    std::fs::create_dir_all(&root)?;

    let store = JsonFileStore::init(&root)?;
    let erp_dir = store.erp_dir();
    let manager = DataManager::new(store);
    if no_seed {
        manager.import(DocumentGraph::default())?;
    } else {
        manager.init()?;
    }

    println!("{} Initialized ERP workspace in {}", "✓".green(), erp_dir.display());
    if !no_seed {
        println!("  Loaded demo data");
    }
    Ok(())
}

pub fn next_id(kind: &str, json: bool) -> Result<()> {
    let kind: DocumentKind = kind.parse()?;
    let (manager, _) = open()?;
    let id = manager.next_id(kind)?;

    if json {
        print_json(&serde_json::json!({ "kind": kind.to_string(), "id": id }))
    } else {
        println!("{}", id);
        Ok(())
    }
}

// === Materials ===

#[derive(Tabled)]
struct MaterialRow {
    #[tabled(rename = "ID")]
    id: String,
    #[tabled(rename = "Name")]
    name: String,
    #[tabled(rename = "Stock")]
    stock: String,
    #[tabled(rename = "Min")]
    min: u64,
    #[tabled(rename = "Unit price")]
    price: String,
    #[tabled(rename = "Status")]
    status: String,
}

fn material_status(status: &MaterialStatus) -> String {
    match status {
        MaterialStatus::Active => "active".green().to_string(),
        MaterialStatus::LowStock => "low-stock".yellow().to_string(),
        MaterialStatus::OutOfStock => "out-of-stock".red().to_string(),
        MaterialStatus::Inactive => "inactive".dimmed().to_string(),
        MaterialStatus::Other(text) => text.clone(),
    }
}

pub fn material_list(low_stock: bool, json: bool) -> Result<()> {
    let (manager, config) = open()?;
    let materials = if low_stock {
        manager.low_stock_materials()?
    } else {
        manager.materials()?
    };

    if json {
        return print_json(&materials);
    }

    let rows = materials
        .iter()
        .map(|m| MaterialRow {
            id: m.id.clone(),
            name: truncate(&m.name, config.display.max_name_length),
            stock: format!("{} {}", m.current_stock, m.unit),
            min: m.min_stock,
            price: fmt_money(m.unit_price),
            status: material_status(&m.status),
        })
        .collect();
    print_table(rows, "No materials found");
    Ok(())
}

pub fn material_show(id: &str, json: bool) -> Result<()> {
    let (manager, _) = open()?;
    let material = manager
        .material(id)?
        .ok_or_else(|| anyhow::anyhow!("Material not found: {}", id))?;

    if json {
        return print_json(&material);
    }

    println!("{} {}", material.id.cyan().bold(), material.name.bold());
    println!();
    println!("Category: {}", material.category);
    println!(
        "Stock:    {} {} (min {}, max {})",
        material.current_stock, material.unit, material.min_stock, material.max_stock
    );
    println!("Price:    {}", fmt_money(material.unit_price));
    println!("Supplier: {}", material.supplier);
    println!("Location: {}", material.location);
    println!("Status:   {}", material_status(&material.status));
    if !material.description.is_empty() {
        println!();
        println!("{}", material.description);
    }
    if !material.properties.is_empty() {
        println!();
        println!("{}", "Properties:".bold());
        for (key, value) in &material.properties {
            println!("  {}: {}", key, value);
        }
    }
    Ok(())
}

pub fn material_add(body: &str, json: bool) -> Result<()> {
    let (manager, _) = open()?;
    let material: Material = parse_record(body)?;
    let material = manager.add_material(material)?;

    if json {
        print_json(&material)
    } else {
        println!("{} Added material {}", "✓".green(), material.id);
        Ok(())
    }
}

pub fn material_update(id: &str, changes: &str, json: bool) -> Result<()> {
    let (manager, _) = open()?;
    let material = manager.update_material(id, &patch::parse(changes)?)?;

    if json {
        print_json(&material)
    } else {
        println!("{} Updated {}", "✓".green(), id);
        Ok(())
    }
}

pub fn material_delete(id: &str, json: bool) -> Result<()> {
    let (manager, _) = open()?;
    let material = manager.delete_material(id)?;

    if json {
        print_json(&material)
    } else {
        println!("{} Deleted {} - {}", "✓".green(), material.id, material.name);
        Ok(())
    }
}

// === Suppliers ===

#[derive(Tabled)]
struct SupplierRow {
    #[tabled(rename = "ID")]
    id: String,
    #[tabled(rename = "Name")]
    name: String,
    #[tabled(rename = "Contact")]
    contact: String,
    #[tabled(rename = "Lead time")]
    lead_time: String,
    #[tabled(rename = "Rating")]
    rating: String,
    #[tabled(rename = "Status")]
    status: String,
}

pub fn supplier_list(json: bool) -> Result<()> {
    let (manager, config) = open()?;
    let suppliers = manager.suppliers()?;

    if json {
        return print_json(&suppliers);
    }

    let rows = suppliers
        .iter()
        .map(|s| SupplierRow {
            id: s.id.clone(),
            name: truncate(&s.name, config.display.max_name_length),
            contact: s.contact_person.clone(),
            lead_time: format!("{}d", s.lead_time),
            rating: format!("{:.1}", s.rating),
            status: s.status.to_string(),
        })
        .collect();
    print_table(rows, "No suppliers found");
    Ok(())
}

pub fn supplier_show(id: &str, json: bool) -> Result<()> {
    let (manager, config) = open()?;
    let supplier = manager
        .supplier(id)?
        .ok_or_else(|| anyhow::anyhow!("Supplier not found: {}", id))?;

    if json {
        return print_json(&supplier);
    }

    println!("{} {}", supplier.id.cyan().bold(), supplier.name.bold());
    println!();
    println!("Contact:  {} ({}, {})", supplier.contact_person, supplier.phone, supplier.email);
    println!("Address:  {}", supplier.address);
    println!("Tax code: {}", supplier.tax_code);
    println!("Payment:  {}", supplier.payment_terms);
    println!("Lead:     {} days", supplier.lead_time);
    println!("Rating:   {:.1}", supplier.rating);
    if !supplier.specialties.is_empty() {
        println!("Supplies: {}", supplier.specialties.join(", "));
    }
    if !supplier.contracts.is_empty() {
        println!();
        println!("{}", "Contracts:".bold());
        for contract in &supplier.contracts {
            println!(
                "  {} {} → {} ({:.0}% discount)",
                contract.id,
                fmt_date(contract.start_date, &config),
                fmt_date(contract.end_date, &config),
                contract.discount * 100.0
            );
        }
    }
    Ok(())
}

pub fn supplier_add(body: &str, json: bool) -> Result<()> {
    let (manager, _) = open()?;
    let supplier: Supplier = parse_record(body)?;
    let supplier = manager.add_supplier(supplier)?;

    if json {
        print_json(&supplier)
    } else {
        println!("{} Added supplier {}", "✓".green(), supplier.id);
        Ok(())
    }
}

pub fn supplier_update(id: &str, changes: &str, json: bool) -> Result<()> {
    let (manager, _) = open()?;
    let supplier = manager.update_supplier(id, &patch::parse(changes)?)?;

    if json {
        print_json(&supplier)
    } else {
        println!("{} Updated {}", "✓".green(), id);
        Ok(())
    }
}

// === Products, BOMs, sales orders ===

#[derive(Tabled)]
struct ProductRow {
    #[tabled(rename = "ID")]
    id: String,
    #[tabled(rename = "Name")]
    name: String,
    #[tabled(rename = "Sell")]
    sell: String,
    #[tabled(rename = "Cost")]
    cost: String,
    #[tabled(rename = "Status")]
    status: String,
}

pub fn products(json: bool) -> Result<()> {
    let (manager, config) = open()?;
    let products = manager.products()?;

    if json {
        return print_json(&products);
    }

    let rows = products
        .iter()
        .map(|p| ProductRow {
            id: p.id.clone(),
            name: truncate(&p.name, config.display.max_name_length),
            sell: fmt_money(p.sell_price),
            cost: fmt_money(p.cost_price),
            status: p.status.to_string(),
        })
        .collect();
    print_table(rows, "No products found");
    Ok(())
}

#[derive(Tabled)]
struct BomRow {
    #[tabled(rename = "Material")]
    material_id: String,
    #[tabled(rename = "Name")]
    name: String,
    #[tabled(rename = "Qty")]
    quantity: u64,
    #[tabled(rename = "Unit")]
    unit: String,
    #[tabled(rename = "In stock")]
    in_stock: String,
}

pub fn bom(product_id: &str, json: bool) -> Result<()> {
    let (manager, config) = open()?;
    let bom = manager
        .bom(product_id)?
        .ok_or_else(|| anyhow::anyhow!("BOM not found for product: {}", product_id))?;

    if json {
        return print_json(&bom);
    }

    println!(
        "{} {} (v{})",
        bom.product_id.cyan().bold(),
        bom.product_name.bold(),
        bom.version
    );
    let mut rows = Vec::with_capacity(bom.materials.len());
    for line in &bom.materials {
        let material = manager.material(&line.material_id)?;
        rows.push(BomRow {
            material_id: line.material_id.clone(),
            name: material
                .as_ref()
                .map(|m| truncate(&m.name, config.display.max_name_length))
                .unwrap_or_else(|| "?".to_string()),
            quantity: line.quantity,
            unit: line.unit.clone(),
            in_stock: material
                .map(|m| m.current_stock.to_string())
                .unwrap_or_else(|| "-".to_string()),
        });
    }
    print_table(rows, "No materials in BOM");
    Ok(())
}

#[derive(Tabled)]
struct SalesOrderRow {
    #[tabled(rename = "ID")]
    id: String,
    #[tabled(rename = "Customer")]
    customer: String,
    #[tabled(rename = "Ordered")]
    ordered: String,
    #[tabled(rename = "Delivery")]
    delivery: String,
    #[tabled(rename = "Total")]
    total: String,
    #[tabled(rename = "Status")]
    status: String,
}

pub fn sales_orders(json: bool) -> Result<()> {
    let (manager, config) = open()?;
    let orders = manager.sales_orders()?;

    if json {
        return print_json(&orders);
    }

    let rows = orders
        .iter()
        .map(|o| SalesOrderRow {
            id: o.id.clone(),
            customer: truncate(&o.customer_name, config.display.max_name_length),
            ordered: fmt_date(o.order_date, &config),
            delivery: fmt_date(o.delivery_date, &config),
            total: fmt_money(o.total),
            status: order_status(&o.status),
        })
        .collect();
    print_table(rows, "No sales orders found");
    Ok(())
}

fn order_status(status: &OrderStatus) -> String {
    match status {
        OrderStatus::Pending => "pending".white().to_string(),
        OrderStatus::Confirmed => "confirmed".yellow().to_string(),
        OrderStatus::Delivered => "delivered".green().to_string(),
        OrderStatus::Cancelled => "cancelled".dimmed().to_string(),
        OrderStatus::Other(text) => text.clone(),
    }
}

// === Procurement documents ===

#[derive(Tabled)]
struct RequisitionRow {
    #[tabled(rename = "ID")]
    id: String,
    #[tabled(rename = "Material")]
    material: String,
    #[tabled(rename = "Qty")]
    quantity: u64,
    #[tabled(rename = "Priority")]
    priority: String,
    #[tabled(rename = "Required")]
    required: String,
    #[tabled(rename = "Status")]
    status: String,
}

pub fn requisitions(command: DocumentCommands, json: bool) -> Result<()> {
    let (manager, config) = open()?;
    match command {
        DocumentCommands::List => {
            let prs = manager.purchase_requisitions()?;
            if json {
                return print_json(&prs);
            }
            let rows = prs
                .iter()
                .map(|pr| RequisitionRow {
                    id: pr.id.clone(),
                    material: pr.material_id.clone(),
                    quantity: pr.quantity,
                    priority: pr.priority.to_string(),
                    required: fmt_date(pr.required_date, &config),
                    status: match &pr.status {
                        RequisitionStatus::Pending => "pending".yellow().to_string(),
                        RequisitionStatus::Approved => "approved".green().to_string(),
                        RequisitionStatus::Rejected => "rejected".red().to_string(),
                        RequisitionStatus::Ordered => "ordered".blue().to_string(),
                        RequisitionStatus::Other(text) => text.clone(),
                    },
                })
                .collect();
            print_table(rows, "No purchase requisitions found");
            Ok(())
        }
        DocumentCommands::Show { id } => {
            let pr = manager
                .purchase_requisition(&id)?
                .ok_or_else(|| anyhow::anyhow!("Purchase requisition not found: {}", id))?;
            if json {
                return print_json(&pr);
            }
            println!("{} {}", pr.id.cyan().bold(), pr.material_name.bold());
            println!();
            println!("Quantity:  {} {}", pr.quantity, pr.unit);
            println!("Reason:    {}", pr.reason_text);
            println!("Priority:  {}", pr.priority);
            println!("Requested: {} by {}", fmt_date(pr.request_date, &config), pr.requested_by);
            println!("Required:  {}", fmt_date(pr.required_date, &config));
            println!("Status:    {}", pr.status);
            if let Some(ref by) = pr.approved_by {
                println!("Approved:  {} by {}", fmt_date(pr.approved_date, &config), by);
            }
            if !pr.notes.is_empty() {
                println!();
                println!("{}", pr.notes);
            }
            Ok(())
        }
        DocumentCommands::Create { record: body } => {
            let pr: PurchaseRequisition = parse_record(&body)?;
            let pr = manager.create_purchase_requisition(pr)?;
            report_created(&pr.id, &pr, json)
        }
        DocumentCommands::Update { id, patch: changes } => {
            let pr = manager.update_purchase_requisition(&id, &patch::parse(&changes)?)?;
            report_updated(&id, &pr, json)
        }
    }
}

#[derive(Tabled)]
struct RfqRow {
    #[tabled(rename = "ID")]
    id: String,
    #[tabled(rename = "Material")]
    material: String,
    #[tabled(rename = "Qty")]
    quantity: u64,
    #[tabled(rename = "Deadline")]
    deadline: String,
    #[tabled(rename = "Responses")]
    responses: String,
    #[tabled(rename = "Status")]
    status: String,
}

pub fn rfqs(command: DocumentCommands, json: bool) -> Result<()> {
    let (manager, config) = open()?;
    match command {
        DocumentCommands::List => {
            let rfqs = manager.rfqs()?;
            if json {
                return print_json(&rfqs);
            }
            let rows = rfqs
                .iter()
                .map(|rfq| RfqRow {
                    id: rfq.id.clone(),
                    material: rfq.material_id.clone(),
                    quantity: rfq.quantity,
                    deadline: fmt_date(rfq.deadline, &config),
                    responses: format!("{}/{}", rfq.responses.len(), rfq.suppliers.len()),
                    status: match &rfq.status {
                        RfqStatus::Waiting => "waiting".yellow().to_string(),
                        RfqStatus::Completed => "completed".green().to_string(),
                        RfqStatus::Cancelled => "cancelled".dimmed().to_string(),
                        RfqStatus::Other(text) => text.clone(),
                    },
                })
                .collect();
            print_table(rows, "No RFQs found");
            Ok(())
        }
        DocumentCommands::Show { id } => {
            let rfq = manager
                .rfq(&id)?
                .ok_or_else(|| anyhow::anyhow!("RFQ not found: {}", id))?;
            if json {
                return print_json(&rfq);
            }
            println!("{} {}", rfq.id.cyan().bold(), rfq.material_name.bold());
            println!();
            println!("Quantity: {} {}", rfq.quantity, rfq.unit);
            println!("Issued:   {}", fmt_date(rfq.issue_date, &config));
            println!("Deadline: {}", fmt_date(rfq.deadline, &config));
            println!("Status:   {}", rfq.status);
            println!();
            println!("{}", "Responses:".bold());
            for (supplier, quote) in &rfq.responses {
                let marker = if rfq.selected_supplier.as_deref() == Some(supplier.as_str()) {
                    "★".yellow().to_string()
                } else {
                    " ".to_string()
                };
                println!(
                    "{} {} {} x {} = {} ({} days)",
                    marker,
                    supplier,
                    fmt_money(quote.unit_price),
                    rfq.quantity,
                    fmt_money(quote.total_price),
                    quote.lead_time
                );
            }
            for supplier in rfq.pending_suppliers() {
                println!("  {} {}", supplier, "(no response)".dimmed());
            }
            Ok(())
        }
        DocumentCommands::Create { record: body } => {
            let rfq: Rfq = parse_record(&body)?;
            let rfq = manager.create_rfq(rfq)?;
            report_created(&rfq.id, &rfq, json)
        }
        DocumentCommands::Update { id, patch: changes } => {
            let rfq = manager.update_rfq(&id, &patch::parse(&changes)?)?;
            report_updated(&id, &rfq, json)
        }
    }
}

#[derive(Tabled)]
struct PurchaseOrderRow {
    #[tabled(rename = "ID")]
    id: String,
    #[tabled(rename = "Supplier")]
    supplier: String,
    #[tabled(rename = "Ordered")]
    ordered: String,
    #[tabled(rename = "Delivery")]
    delivery: String,
    #[tabled(rename = "Total")]
    total: String,
    #[tabled(rename = "Status")]
    status: String,
}

pub fn purchase_orders(command: DocumentCommands, json: bool) -> Result<()> {
    let (manager, config) = open()?;
    match command {
        DocumentCommands::List => {
            let pos = manager.purchase_orders()?;
            if json {
                return print_json(&pos);
            }
            let rows = pos
                .iter()
                .map(|po| PurchaseOrderRow {
                    id: po.id.clone(),
                    supplier: truncate(&po.supplier_name, config.display.max_name_length),
                    ordered: fmt_date(po.order_date, &config),
                    delivery: fmt_date(po.delivery_date, &config),
                    total: fmt_money(po.total),
                    status: order_status(&po.status),
                })
                .collect();
            print_table(rows, "No purchase orders found");
            Ok(())
        }
        DocumentCommands::Show { id } => {
            let po = manager
                .purchase_order(&id)?
                .ok_or_else(|| anyhow::anyhow!("Purchase order not found: {}", id))?;
            if json {
                return print_json(&po);
            }
            println!("{} {}", po.id.cyan().bold(), po.supplier_name.bold());
            println!();
            if let Some(ref rfq) = po.rfq_id {
                println!("RFQ:      {}", rfq);
            }
            println!("Ordered:  {}", fmt_date(po.order_date, &config));
            println!("Delivery: {}", fmt_date(po.delivery_date, &config));
            println!("Status:   {}", order_status(&po.status));
            println!("Payment:  {}", po.payment_terms);
            println!();
            for item in &po.items {
                println!(
                    "  {} {} {} x {} = {}",
                    item.material_id,
                    item.quantity,
                    item.unit,
                    fmt_money(item.unit_price),
                    fmt_money(item.total)
                );
            }
            println!();
            println!("Subtotal: {}", fmt_money(po.subtotal));
            println!("Tax:      {}", fmt_money(po.tax));
            println!("{}", format!("Total:    {}", fmt_money(po.total)).bold());
            Ok(())
        }
        DocumentCommands::Create { record: body } => {
            let po: PurchaseOrder = parse_record(&body)?;
            let po = manager.create_purchase_order(po)?;
            report_created(&po.id, &po, json)
        }
        DocumentCommands::Update { id, patch: changes } => {
            let po = manager.update_purchase_order(&id, &patch::parse(&changes)?)?;
            report_updated(&id, &po, json)
        }
    }
}

fn report_created<T: Serialize>(id: &str, record: &T, json: bool) -> Result<()> {
    if json {
        print_json(record)
    } else {
        println!("{} Created {}", "✓".green(), id);
        Ok(())
    }
}

fn report_updated<T: Serialize>(id: &str, record: &T, json: bool) -> Result<()> {
    if json {
        print_json(record)
    } else {
        println!("{} Updated {}", "✓".green(), id);
        Ok(())
    }
}

// === Whole-graph commands ===

pub fn stats(json: bool) -> Result<()> {
    let (manager, _) = open()?;
    let Some(stats) = manager.dashboard_stats()? else {
        bail!("No data. Run 'erp init' or 'erp reset'.");
    };

    if json {
        return print_json(&stats);
    }

    println!("{}", "Materials".bold());
    println!("  Total:        {}", stats.materials.total);
    println!("  Active:       {}", stats.materials.active);
    println!("  Low stock:    {}", stats.materials.low_stock.to_string().yellow());
    println!("  Out of stock: {}", stats.materials.out_of_stock.to_string().red());
    println!();
    println!("{}", "Procurement".bold());
    println!("  Pending PRs:        {}", stats.procurement.pending_prs);
    println!("  Waiting RFQs:       {}", stats.procurement.waiting_rfqs);
    println!("  Open POs:           {}", stats.procurement.pending_pos);
    println!("  Critical materials: {}", stats.procurement.critical_materials);
    println!();
    println!("{}", "Suppliers".bold());
    println!("  Total:  {}", stats.suppliers.total);
    println!("  Active: {}", stats.suppliers.active);
    Ok(())
}

pub fn export(path: Option<String>) -> Result<()> {
    let (manager, _) = open()?;
    let Some(content) = manager.export()? else {
        bail!("No data to export");
    };

    match path {
        Some(path) => {
            std::fs::write(&path, content)?;
            eprintln!("{} Exported to {}", "✓".green(), path);
        }
        None => println!("{}", content),
    }
    Ok(())
}

pub fn import(path: &str) -> Result<()> {
    let (manager, _) = open()?;
    let content = std::fs::read_to_string(path).with_context(|| format!("Cannot read {}", path))?;
    let graph: DocumentGraph =
        serde_json::from_str(&content).with_context(|| format!("Invalid export file {}", path))?;

    let documents = graph.purchase_requisitions.len() + graph.rfqs.len() + graph.purchase_orders.len();
    manager.import(graph)?;
    println!(
        "{} Imported {} procurement documents from {}",
        "✓".green(),
        documents,
        path
    );
    Ok(())
}

pub fn reset(yes: bool) -> Result<()> {
    let (manager, _) = open()?;

    if !yes {
        println!("{}", "This will delete all ERP data and restore the demo data.".red());
        print!("Continue? [y/N] ");
        std::io::Write::flush(&mut std::io::stdout())?;
        let mut input = String::new();
        std::io::stdin().read_line(&mut input)?;
        if !input.trim().eq_ignore_ascii_case("y") {
            println!("Aborted");
            return Ok(());
        }
    }

    manager.reset()?;
    println!("{} Data reset to defaults", "✓".green());
    Ok(())
}

// === Config ===

pub fn config_show(json: bool) -> Result<()> {
    let store = JsonFileStore::open()?;
    let config = store.config()?;

    if json {
        println!("{}", serde_json::to_string_pretty(&config)?);
    } else {
        println!("{}", "Current configuration:".bold());
        println!();
        println!("data_file = \"{}\"", config.data_file);
        println!();
        println!("[prefixes]");
        println!("requisition = \"{}\"", config.prefixes.requisition);
        println!("rfq = \"{}\"", config.prefixes.rfq);
        println!("purchase_order = \"{}\"", config.prefixes.purchase_order);
        println!();
        println!("[allocation]");
        println!(
            "fallback_on_storage_error = {}",
            config.allocation.fallback_on_storage_error
        );
        println!();
        println!("[display]");
        println!("colors = {}", config.display.colors);
        println!("date_format = \"{}\"", config.display.date_format);
        println!("max_name_length = {}", config.display.max_name_length);
    }
    Ok(())
}

pub fn config_path() -> Result<()> {
    let store = JsonFileStore::open()?;
    println!("{}", store.config_path().display());
    Ok(())
}

pub fn config_reset() -> Result<()> {
    let store = JsonFileStore::open()?;
    std::fs::write(store.config_path(), Config::default_with_comments())?;
    println!("{} Configuration reset to defaults", "✓".green());
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fmt_money_groups_thousands() {
        assert_eq!(fmt_money(0.0), "0");
        assert_eq!(fmt_money(15000.0), "15.000");
        assert_eq!(fmt_money(29_150_000.0), "29.150.000");
        assert_eq!(fmt_money(-1234.4), "-1.234");
    }

    #[test]
    fn test_fmt_date_patterns() {
        let date = NaiveDate::from_ymd_opt(2024, 10, 6);
        let mut config = Config::default();
        assert_eq!(fmt_date(date, &config), "06/10/2024");
        assert_eq!(fmt_date(None, &config), "-");

        config.display.date_format = "%Q".to_string();
        assert_eq!(fmt_date(date, &config), "2024-10-06");
    }

    #[test]
    fn test_truncate() {
        assert_eq!(truncate("Thân bút bi", 40), "Thân bút bi");
        assert_eq!(truncate("Công ty TNHH Nhựa ABC", 10), "Công ty T…");
    }
}
