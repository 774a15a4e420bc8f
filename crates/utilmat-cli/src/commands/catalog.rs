// crates/utilmat-cli/src/commands/catalog.rs
//
// `utilmat catalog` — show the column universe a catalog produces.

use std::collections::HashMap;

use clap::Args;
use tabled::Tabled;
use utilmat_build::Scaffold;
use utilmat_ingest::{load_catalog, TextEncoding};

use crate::config::BuildConfig;
use crate::output;

/// Catalog inspection command.
#[derive(Debug, Args)]
pub struct CatalogCmd {
    /// Item catalog (CSV with movieId, title columns).
    #[arg(long)]
    pub catalog: Option<String>,

    /// Input text encoding: latin1 or utf8.
    #[arg(long)]
    pub encoding: Option<String>,
}

/// A row in the column universe table.
#[derive(Tabled)]
struct ColumnRow {
    #[tabled(rename = "Column")]
    index: usize,
    #[tabled(rename = "Item name")]
    name: String,
    #[tabled(rename = "Item ids")]
    ids: usize,
}

/// Run the catalog command.
pub fn run(cmd: &CatalogCmd, config: BuildConfig) -> Result<(), Box<dyn std::error::Error>> {
    let path = cmd.catalog.clone().unwrap_or(config.catalog_path);
    let encoding: TextEncoding = cmd.encoding.as_deref().unwrap_or(&config.encoding).parse()?;

    let catalog = load_catalog(&path, encoding)?;
    let scaffold = Scaffold::from_catalog(&catalog);

    let mut ids_per_name: HashMap<&str, usize> = HashMap::new();
    for name in catalog.item_names() {
        *ids_per_name.entry(name).or_default() += 1;
    }

    let rows: Vec<ColumnRow> = scaffold
        .columns()
        .names()
        .iter()
        .enumerate()
        .map(|(index, name)| ColumnRow {
            index,
            name: name.clone(),
            ids: ids_per_name.get(name.as_str()).copied().unwrap_or(0),
        })
        .collect();

    println!("Catalog: {}", path);
    println!(
        "  Item ids: {}  |  Columns: {}  |  Repeated ids ignored: {}",
        catalog.len(),
        scaffold.columns().len(),
        catalog.ignored_duplicates()
    );
    println!();
    println!("{}", output::format_table(&rows));

    Ok(())
}
