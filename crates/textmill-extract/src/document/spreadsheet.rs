//! Spreadsheets (xls, xlsx, ods) rendered as a Markdown table

use crate::error::{ExtractError, Result};
use calamine::{open_workbook_auto_from_rs, Data, Reader};
use std::io::Cursor;

/// First worksheet as a pipe table.
///
/// Row one is the header. Columns without a header label are dropped, then
/// rows and columns with no data at all.
pub(super) fn extract(bytes: &[u8]) -> Result<String> {
    let mut workbook = open_workbook_auto_from_rs(Cursor::new(bytes))?;
    let range = workbook
        .worksheet_range_at(0)
        .ok_or_else(|| ExtractError::EmptyContent("workbook has no sheets".to_string()))??;

    let grid: Vec<Vec<String>> = range
        .rows()
        .map(|row| row.iter().map(cell_text).collect())
        .collect();
    let Some((header, data)) = grid.split_first() else {
        return Err(ExtractError::EmptyContent("sheet is empty".to_string()));
    };

    let labelled: Vec<usize> = (0..header.len())
        .filter(|&col| !header[col].is_empty())
        .collect();
    let rows: Vec<&Vec<String>> = data
        .iter()
        .filter(|row| labelled.iter().any(|&col| !cell(row, col).is_empty()))
        .collect();
    let columns: Vec<usize> = labelled
        .into_iter()
        .filter(|&col| rows.iter().any(|row| !cell(row, col).is_empty()))
        .collect();

    if columns.is_empty() || rows.is_empty() {
        return Err(ExtractError::EmptyContent(
            "no labelled data left in the first sheet".to_string(),
        ));
    }

    let mut table = Vec::with_capacity(rows.len() + 2);
    table.push(table_row(columns.iter().map(|&col| header[col].as_str())));
    table.push(format!("|{}", "---|".repeat(columns.len())));
    for row in rows {
        table.push(table_row(columns.iter().map(|&col| cell(row, col))));
    }
    Ok(table.join("\n"))
}

fn cell(row: &[String], col: usize) -> &str {
    row.get(col).map(String::as_str).unwrap_or("")
}

fn cell_text(value: &Data) -> String {
    match value {
        Data::Empty => String::new(),
        other => other.to_string().trim().to_string(),
    }
}

fn table_row<'a>(cells: impl Iterator<Item = &'a str>) -> String {
    let cells: Vec<String> = cells
        .map(|c| c.replace('|', "\\|").replace(['\r', '\n'], " "))
        .collect();
    format!("| {} |", cells.join(" | "))
}
