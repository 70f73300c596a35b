//! erp - Small-business ERP data layer
//!
//! One JSON document graph in .erp/, dated document numbers.

use anyhow::Result;
use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

mod commands;

#[derive(Parser)]
#[command(name = "erp")]
#[command(about = "Small-business ERP: materials, suppliers and procurement documents")]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Output as JSON
    #[arg(long, global = true)]
    json: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// Initialize a new ERP workspace
    Init {
        /// Create the per-user workspace instead of one in the current directory
        #[arg(long)]
        global: bool,

        /// Do not load the demo data
        #[arg(long)]
        no_seed: bool,
    },

    /// Print the next document number (pr, rfq, po)
    NextId {
        /// Document kind
        kind: String,
    },

    /// Manage materials
    Material {
        #[command(subcommand)]
        command: MaterialCommands,
    },

    /// Manage suppliers
    Supplier {
        #[command(subcommand)]
        command: SupplierCommands,
    },

    /// List products
    Products,

    /// Show the bill of materials for a product
    Bom {
        /// Product ID
        product_id: String,
    },

    /// List sales orders
    SalesOrders,

    /// Purchase requisitions
    Pr {
        #[command(subcommand)]
        command: DocumentCommands,
    },

    /// Requests for quotation
    Rfq {
        #[command(subcommand)]
        command: DocumentCommands,
    },

    /// Purchase orders
    Po {
        #[command(subcommand)]
        command: DocumentCommands,
    },

    /// Show dashboard statistics
    Stats,

    /// Write all data as JSON
    Export {
        /// Output file (stdout if omitted)
        path: Option<String>,
    },

    /// Replace all data with a JSON export
    Import {
        /// Path to an exported JSON file
        path: String,
    },

    /// Delete all data and restore the demo data
    Reset {
        /// Skip confirmation
        #[arg(long, short)]
        yes: bool,
    },

    /// Show or reset configuration
    Config {
        #[command(subcommand)]
        command: Option<ConfigCommands>,
    },
}

#[derive(Subcommand)]
enum MaterialCommands {
    /// List materials
    List {
        /// Only materials at or below minimum stock
        #[arg(long)]
        low_stock: bool,
    },
    /// Show one material
    Show {
        /// Material ID
        id: String,
    },
    /// Add a material from a JSON object
    Add {
        /// Material as JSON
        record: String,
    },
    /// Update fields of a material
    Update {
        /// Material ID
        id: String,
        /// JSON object of fields to change
        patch: String,
    },
    /// Delete a material
    Delete {
        /// Material ID
        id: String,
    },
}

#[derive(Subcommand)]
enum SupplierCommands {
    /// List suppliers
    List,
    /// Show one supplier
    Show {
        /// Supplier ID
        id: String,
    },
    /// Add a supplier from a JSON object
    Add {
        /// Supplier as JSON
        record: String,
    },
    /// Update fields of a supplier
    Update {
        /// Supplier ID
        id: String,
        /// JSON object of fields to change
        patch: String,
    },
}

#[derive(Subcommand)]
pub enum DocumentCommands {
    /// List documents
    List,
    /// Show one document
    Show {
        /// Document ID
        id: String,
    },
    /// Create a document from a JSON object; a number is assigned when it has no id
    Create {
        /// Document as JSON
        record: String,
    },
    /// Update fields of a document
    Update {
        /// Document ID
        id: String,
        /// JSON object of fields to change
        patch: String,
    },
}

#[derive(Subcommand)]
enum ConfigCommands {
    /// Show current configuration
    Show,
    /// Print the config file path
    Path,
    /// Reset to default configuration
    Reset,
}

fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();
}

fn main() -> Result<()> {
    init_tracing();
    let cli = Cli::parse();
    let json = cli.json;

    match cli.command {
        Commands::Init { global, no_seed } => commands::init(global, no_seed),
        Commands::NextId { kind } => commands::next_id(&kind, json),
        Commands::Material { command } => match command {
            MaterialCommands::List { low_stock } => commands::material_list(low_stock, json),
            MaterialCommands::Show { id } => commands::material_show(&id, json),
            MaterialCommands::Add { record: body } => commands::material_add(&body, json),
            MaterialCommands::Update { id, patch } => commands::material_update(&id, &patch, json),
            MaterialCommands::Delete { id } => commands::material_delete(&id, json),
        },
        Commands::Supplier { command } => match command {
            SupplierCommands::List => commands::supplier_list(json),
            SupplierCommands::Show { id } => commands::supplier_show(&id, json),
            SupplierCommands::Add { record: body } => commands::supplier_add(&body, json),
            SupplierCommands::Update { id, patch } => commands::supplier_update(&id, &patch, json),
        },
        Commands::Products => commands::products(json),
        Commands::Bom { product_id } => commands::bom(&product_id, json),
        Commands::SalesOrders => commands::sales_orders(json),
        Commands::Pr { command } => commands::requisitions(command, json),
        Commands::Rfq { command } => commands::rfqs(command, json),
        Commands::Po { command } => commands::purchase_orders(command, json),
        Commands::Stats => commands::stats(json),
        Commands::Export { path } => commands::export(path),
        Commands::Import { path } => commands::import(&path),
        Commands::Reset { yes } => commands::reset(yes),
        Commands::Config { command } => match command {
            Some(ConfigCommands::Show) | None => commands::config_show(json),
            Some(ConfigCommands::Path) => commands::config_path(),
            Some(ConfigCommands::Reset) => commands::config_reset(),
        },
    }
}
