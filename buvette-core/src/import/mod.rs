//! Inventory sheet import: one CSV export per buvette, file stem = buvette
//! name.

mod sheet;

pub use sheet::{
    ParsedSheet, SheetRow, collect_sheet_paths, parse_sheet, parse_sheet_file, parse_workbook,
};

use serde::Serialize;
use tracing::info;

use crate::database::UnitOfWork;
use crate::domain::naming::sheet_matches_buvette;
use crate::error::Result;
use crate::types::catalog::{NewBuvette, NewProduct};

pub const DEFAULT_LOCATION_TYPE: &str = "Stade";
pub const DEFAULT_SPORT: &str = "FOOT";

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ImportReport {
    pub buvette_id: i64,
    pub buvette_name: String,
    pub created_buvette: bool,
    pub products_linked: usize,
    pub products_created: usize,
}

/// Attaches every product of the sheet to its buvette, creating the buvette
/// and unknown products on the way. Re-importing only refreshes positions.
pub async fn import_sheet(uow: &UnitOfWork, sheet: &ParsedSheet) -> Result<ImportReport> {
    let existing = uow.catalog.list_all_buvettes().await?;
    let (buvette, created_buvette) = match existing
        .into_iter()
        .find(|b| sheet_matches_buvette(&sheet.buvette_name, &b.name))
    {
        Some(buvette) => (buvette, false),
        None => {
            let created = uow
                .catalog
                .create_buvette(&NewBuvette {
                    name: sheet.buvette_name.trim().to_string(),
                    location_type: Some(DEFAULT_LOCATION_TYPE.to_string()),
                    sport: DEFAULT_SPORT.to_string(),
                })
                .await?;
            (created, true)
        }
    };

    let mut products_created = 0;
    for row in &sheet.rows {
        let product = match uow.catalog.find_product_by_name(&row.name).await? {
            Some(product) => product,
            None => {
                products_created += 1;
                uow.catalog
                    .create_product(&NewProduct {
                        name: row.name.clone(),
                        category: row.category.clone(),
                        unit: row.unit.clone(),
                    })
                    .await?
            }
        };
        uow.catalog
            .upsert_buvette_product(buvette.id, product.id, Some(row.row_index as i32), None)
            .await?;
    }

    info!(
        buvette = %buvette.name,
        buvette_id = buvette.id,
        created_buvette,
        products = sheet.rows.len(),
        products_created,
        "inventory sheet imported"
    );
    Ok(ImportReport {
        buvette_id: buvette.id,
        buvette_name: buvette.name,
        created_buvette,
        products_linked: sheet.rows.len(),
        products_created,
    })
}
