use std::{
    fs::File,
    io::Read,
    path::{Path, PathBuf},
};

use calamine::{Data, Range, Reader, open_workbook_auto};
use tracing::{debug, info, warn};

use crate::error::{CoreError, Result};

/// Marker cell identifying the header row of an inventory sheet.
const HEADER_MARKER: &str = "Article d'inventaire";
const HEADER_SCAN_ROWS: usize = 50;
const FILL_IN_MARKER: &str = "A REMPLIR ↓";

/// Workbook tabs holding totals or scratch work rather than a buvette.
const SUMMARY_SHEETS: [&str; 4] = ["END", "Recalculs", "Total", "Resume"];
const WORKBOOK_EXTENSIONS: [&str; 3] = ["xlsx", "xlsm", "xls"];

const CATEGORY_COLUMN: usize = 1;
const NAME_COLUMN: usize = 2;
const UNIT_COLUMN: usize = 7;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SheetRow {
    /// 0-based position of the row in the sheet, reused as display order.
    pub row_index: usize,
    pub category: Option<String>,
    pub name: String,
    pub unit: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParsedSheet {
    pub buvette_name: String,
    pub rows: Vec<SheetRow>,
}

fn cell(row: &[String], index: usize) -> Option<String> {
    row.get(index)
        .map(|v| v.trim())
        .filter(|v| !v.is_empty())
        .map(str::to_string)
}

fn parse_rows(buvette_name: &str, records: &[Vec<String>]) -> Option<ParsedSheet> {
    let Some(header) = records
        .iter()
        .take(HEADER_SCAN_ROWS)
        .position(|r| r.iter().any(|c| c.contains(HEADER_MARKER)))
    else {
        warn!(buvette = buvette_name, "no header row found, sheet skipped");
        return None;
    };

    let rows = records
        .iter()
        .enumerate()
        .skip(header + 1)
        .filter(|(_, record)| record.len() >= 3)
        .filter_map(|(row_index, record)| {
            let name = cell(record, NAME_COLUMN)?;
            if name == FILL_IN_MARKER || name.contains("TOTAL") {
                return None;
            }
            Some(SheetRow {
                row_index,
                category: cell(record, CATEGORY_COLUMN),
                name,
                unit: cell(record, UNIT_COLUMN),
            })
        })
        .collect::<Vec<_>>();

    debug!(buvette = buvette_name, rows = rows.len(), "sheet parsed");
    Some(ParsedSheet {
        buvette_name: buvette_name.trim().to_string(),
        rows,
    })
}

/// Reads one CSV sheet. `None` when no header row shows up in the first rows.
pub fn parse_sheet<R: Read>(buvette_name: &str, reader: R) -> Result<Option<ParsedSheet>> {
    let mut csv = csv::ReaderBuilder::new()
        .has_headers(false)
        .flexible(true)
        .from_reader(reader);
    let records = csv
        .records()
        .map(|r| r.map(|record| record.iter().map(str::to_string).collect()))
        .collect::<std::result::Result<Vec<Vec<String>>, _>>()?;
    Ok(parse_rows(buvette_name, &records))
}

pub fn is_summary_sheet(name: &str) -> bool {
    SUMMARY_SHEETS.iter().any(|s| name.contains(s))
}

/// Cell text laid out at absolute sheet positions. Calamine trims leading
/// empty rows and columns from a range, which would shift the fixed columns.
fn range_rows(range: &Range<Data>) -> Vec<Vec<String>> {
    let Some((first_row, first_col)) = range.start() else {
        return Vec::new();
    };
    let mut rows = vec![Vec::new(); first_row as usize];
    rows.extend(range.rows().map(|row| {
        std::iter::repeat_n(String::new(), first_col as usize)
            .chain(row.iter().map(|c| c.to_string()))
            .collect()
    }));
    rows
}

/// Reads every buvette tab of a workbook. Tab names become buvette names.
pub fn parse_workbook(path: &Path) -> Result<Vec<ParsedSheet>> {
    let mut workbook = open_workbook_auto(path)?;
    let mut sheets = Vec::new();
    for name in workbook.sheet_names() {
        if is_summary_sheet(&name) {
            info!(sheet = %name, "summary sheet skipped");
            continue;
        }
        let range = workbook.worksheet_range(&name)?;
        sheets.extend(parse_rows(&name, &range_rows(&range)));
    }
    Ok(sheets)
}

fn has_extension(path: &Path, extensions: &[&str]) -> bool {
    path.extension()
        .and_then(|e| e.to_str())
        .is_some_and(|e| extensions.iter().any(|x| e.eq_ignore_ascii_case(x)))
}

/// Parses a CSV sheet named after its file, or every tab of a workbook.
pub fn parse_sheet_file(path: &Path) -> Result<Vec<ParsedSheet>> {
    if has_extension(path, &WORKBOOK_EXTENSIONS) {
        return parse_workbook(path);
    }
    let name = path
        .file_stem()
        .and_then(|s| s.to_str())
        .ok_or_else(|| CoreError::validation(format!("no usable file name in {}", path.display())))?;
    Ok(parse_sheet(name, File::open(path)?)?.into_iter().collect())
}

/// The file itself, or every CSV or workbook directly inside a directory, sorted.
pub fn collect_sheet_paths(path: &Path) -> Result<Vec<PathBuf>> {
    if path.is_file() {
        return Ok(vec![path.to_path_buf()]);
    }
    let mut paths = Vec::new();
    for entry in std::fs::read_dir(path)? {
        let entry_path = entry?.path();
        let is_sheet = has_extension(&entry_path, &["csv"])
            || has_extension(&entry_path, &WORKBOOK_EXTENSIONS);
        if entry_path.is_file() && is_sheet {
            paths.push(entry_path);
        }
    }
    paths.sort();
    Ok(paths)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    const SHEET: &str = "\
INVENTAIRE STADE,,,,,,,
Buvette :,Nord 1,,,,,,
,Catégorie,Article d'inventaire,Prix,Stock,,,Unité
,,A REMPLIR ↓,,,,,
,Boissons,Coca 33cl,4.5,24,,,PCE
,Boissons,Bière Pression,7,2,,,L
,,,,,,,
,Snacks,TOTAL BOISSONS,,,,,
,Snacks,Hot-dog,6
,x
";

    #[test]
    fn rows_below_header_are_kept() {
        let sheet = parse_sheet("Nord 1", SHEET.as_bytes()).unwrap().unwrap();
        let names: Vec<&str> = sheet.rows.iter().map(|r| r.name.as_str()).collect();
        assert_eq!(names, ["Coca 33cl", "Bière Pression", "Hot-dog"]);

        let coca = &sheet.rows[0];
        assert_eq!(coca.row_index, 4);
        assert_eq!(coca.category.as_deref(), Some("Boissons"));
        assert_eq!(coca.unit.as_deref(), Some("PCE"));

        let hot_dog = &sheet.rows[2];
        assert_eq!(hot_dog.unit, None);
        assert_eq!(hot_dog.row_index, 8);
    }

    #[test]
    fn sheet_without_header_is_skipped() {
        let parsed = parse_sheet("Nord 1", ",a,b,c\n,d,e,f\n".as_bytes()).unwrap();
        assert!(parsed.is_none());
    }

    #[test]
    fn directory_import_picks_csv_files() {
        let dir = tempfile::tempdir().unwrap();
        for name in ["Sud 2.csv", "Est 1.CSV", "Stade.xlsx", "notes.txt"] {
            let mut f = File::create(dir.path().join(name)).unwrap();
            f.write_all(SHEET.as_bytes()).unwrap();
        }
        let paths = collect_sheet_paths(dir.path()).unwrap();
        assert_eq!(paths.len(), 3);

        let sheets = parse_sheet_file(&dir.path().join("Sud 2.csv")).unwrap();
        assert_eq!(sheets.len(), 1);
        assert_eq!(sheets[0].buvette_name, "Sud 2");
        assert_eq!(sheets[0].rows.len(), 3);
    }

    #[test]
    fn totals_and_scratch_tabs_are_not_buvettes() {
        for name in ["END", "Recalculs", "Total général", "Resume 2024"] {
            assert!(is_summary_sheet(name), "{name}");
        }
        for name in ["Nord 1", "Buvette Sud", "Tribune Est"] {
            assert!(!is_summary_sheet(name), "{name}");
        }
    }

    #[test]
    fn workbook_cells_keep_their_sheet_columns() {
        // Used area starts at B2, so column A and row 1 are trimmed by the reader.
        let mut range = Range::new((1, 1), (4, 7));
        range.set_value((1, 2), Data::String(HEADER_MARKER.into()));
        range.set_value((2, 1), Data::String("Boissons".into()));
        range.set_value((2, 2), Data::String("Coca 33cl".into()));
        range.set_value((2, 3), Data::Float(4.5));
        range.set_value((2, 7), Data::String("PCE".into()));
        range.set_value((3, 2), Data::String("TOTAL BOISSONS".into()));
        range.set_value((4, 1), Data::String("Snacks".into()));
        range.set_value((4, 2), Data::String("Hot-dog".into()));

        let rows = range_rows(&range);
        assert_eq!(rows.len(), 5);
        assert_eq!(rows[2][2], "Coca 33cl");

        let sheet = parse_rows("Nord 1 ", &rows).unwrap();
        assert_eq!(sheet.buvette_name, "Nord 1");
        assert_eq!(
            sheet.rows,
            [
                SheetRow {
                    row_index: 2,
                    category: Some("Boissons".into()),
                    name: "Coca 33cl".into(),
                    unit: Some("PCE".into()),
                },
                SheetRow {
                    row_index: 4,
                    category: Some("Snacks".into()),
                    name: "Hot-dog".into(),
                    unit: None,
                },
            ]
        );
    }

    #[test]
    fn empty_tab_has_no_rows() {
        let range: Range<Data> = Range::empty();
        assert!(range_rows(&range).is_empty());
        assert!(parse_rows("Nord 1", &[]).is_none());
    }
}
