use std::collections::BTreeMap;

use comfy_table::modifiers::{UTF8_ROUND_CORNERS, UTF8_SOLID_INNER_BORDERS};
use comfy_table::presets::{UTF8_FULL, UTF8_FULL_CONDENSED};
use comfy_table::{Attribute, Cell, CellAlignment, Color, ContentArrangement, Table};

use timepp_transform::{CategoryCode, NanReport, NormalizerParams};

pub fn print_nan_report(report: &NanReport) {
    println!("Rows: {}", report.n_rows);
    println!("{}", nan_table(report));
}

pub fn nan_table(report: &NanReport) -> Table {
    let mut table = Table::new();
    table.set_header(vec![
        header_cell("Column"),
        header_cell("Type"),
        header_cell("Missing"),
        header_cell("Fraction"),
    ]);
    apply_summary_table_style(&mut table);
    align_column(&mut table, 2, CellAlignment::Right);
    align_column(&mut table, 3, CellAlignment::Right);
    for column in &report.columns {
        table.add_row(vec![
            Cell::new(&column.name)
                .fg(Color::Blue)
                .add_attribute(Attribute::Bold),
            dim_cell(&column.dtype),
            Cell::new(column.missing),
            fraction_cell(column.nan_fraction),
        ]);
    }
    table
}

pub fn print_normalizer_params(column: &str, params: &NormalizerParams) {
    let mut table = Table::new();
    table.set_header(vec![
        header_cell("Column"),
        header_cell("Mean"),
        header_cell("Std"),
    ]);
    apply_table_style(&mut table);
    align_column(&mut table, 1, CellAlignment::Right);
    align_column(&mut table, 2, CellAlignment::Right);
    table.add_row(vec![
        Cell::new(column),
        Cell::new(format!("{:.6}", params.mean)),
        Cell::new(format!("{:.6}", params.std)),
    ]);
    eprintln!("{table}");
}

pub fn mapping_table(mapping: &BTreeMap<String, CategoryCode>) -> Table {
    let mut table = Table::new();
    table.set_header(vec![header_cell("Category"), header_cell("Code")]);
    apply_table_style(&mut table);
    for (category, code) in mapping {
        let code = match code {
            CategoryCode::Label(label) => label.to_string(),
            CategoryCode::OneHot(indicator) => indicator
                .iter()
                .map(u8::to_string)
                .collect::<Vec<_>>()
                .join(" "),
        };
        table.add_row(vec![Cell::new(category), Cell::new(code)]);
    }
    table
}

pub fn apply_table_style(table: &mut Table) {
    table
        .load_preset(UTF8_FULL_CONDENSED)
        .apply_modifier(UTF8_ROUND_CORNERS)
        .set_content_arrangement(ContentArrangement::Dynamic)
        .set_width(120);
}

fn apply_summary_table_style(table: &mut Table) {
    table
        .load_preset(UTF8_FULL)
        .apply_modifier(UTF8_ROUND_CORNERS)
        .apply_modifier(UTF8_SOLID_INNER_BORDERS)
        .set_content_arrangement(ContentArrangement::DynamicFullWidth)
        .set_width(120);
}

fn align_column(table: &mut Table, index: usize, alignment: CellAlignment) {
    if let Some(column) = table.column_mut(index) {
        column.set_cell_alignment(alignment);
    }
}

fn header_cell(label: &str) -> Cell {
    Cell::new(label)
        .fg(Color::Cyan)
        .add_attribute(Attribute::Bold)
}

fn fraction_cell(fraction: f64) -> Cell {
    let text = format!("{:.1}%", fraction * 100.0);
    if fraction >= 1.0 {
        Cell::new(text).fg(Color::Red).add_attribute(Attribute::Bold)
    } else if fraction > 0.0 {
        Cell::new(text).fg(Color::Yellow)
    } else {
        dim_cell(text)
    }
}

fn dim_cell<T: ToString>(value: T) -> Cell {
    Cell::new(value).fg(Color::DarkGrey)
}

#[cfg(test)]
mod tests {
    use super::*;
    use timepp_transform::NanColumn;

    #[test]
    fn nan_table_lists_every_column() {
        let report = NanReport {
            n_rows: 4,
            columns: vec![
                NanColumn {
                    name: "sales".to_string(),
                    dtype: "float64".to_string(),
                    missing: 1,
                    nan_fraction: 0.25,
                },
                NanColumn {
                    name: "store".to_string(),
                    dtype: "string".to_string(),
                    missing: 0,
                    nan_fraction: 0.0,
                },
            ],
        };
        let mut table = nan_table(&report);
        table.force_no_tty();
        let rendered = table.to_string();
        assert!(rendered.contains("sales"));
        assert!(rendered.contains("25.0%"));
        assert!(rendered.contains("0.0%"));
    }

    #[test]
    fn mapping_table_shows_indicators() {
        let mapping = BTreeMap::from([
            ("blue".to_string(), CategoryCode::OneHot(vec![1, 0])),
            ("red".to_string(), CategoryCode::OneHot(vec![0, 1])),
        ]);
        let mut table = mapping_table(&mapping);
        table.force_no_tty();
        assert!(table.to_string().contains("0 1"));
    }
}
