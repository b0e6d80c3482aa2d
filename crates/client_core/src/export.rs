//! CSV rendering of the visible table.
//!
//! Cells are never quoted: commas inside a cell become spaces, which is lossy
//! but keeps every row at a fixed column count.

use std::{
    fs, io,
    path::{Path, PathBuf},
};

use crate::types::ControlTable;

pub const EXPORT_FILE_NAME: &str = "Security_Control_Inventory.csv";

pub fn sanitize_cell(cell: &str) -> String {
    cell.replace(',', " ")
}

/// Header row first, then one line per body row, each newline-terminated.
pub fn render_csv(table: &ControlTable) -> String {
    let mut out = String::new();
    push_row(&mut out, &table.headers);
    for row in &table.rows {
        push_row(&mut out, &row.cells);
    }
    out
}

fn push_row(out: &mut String, cells: &[String]) {
    let line = cells
        .iter()
        .map(|cell| sanitize_cell(cell))
        .collect::<Vec<_>>()
        .join(",");
    out.push_str(&line);
    out.push('\n');
}

/// Writes `contents` as [`EXPORT_FILE_NAME`] inside `dir`, replacing any
/// earlier export.
pub fn write_csv(dir: &Path, contents: &str) -> io::Result<PathBuf> {
    fs::create_dir_all(dir)?;
    let path = dir.join(EXPORT_FILE_NAME);
    fs::write(&path, contents)?;
    Ok(path)
}
