//! Console summary tables for the list and process commands.

use comfy_table::modifiers::UTF8_ROUND_CORNERS;
use comfy_table::presets::UTF8_FULL_CONDENSED;
use comfy_table::{
    Attribute, Cell, CellAlignment, Color, ContentArrangement, Table,
};

use crate::clients::ClientEntry;
use crate::types::ProcessResult;

pub fn print_process_summary(result: &ProcessResult) {
    println!("Client: {}", result.client);
    if result.dry_run {
        println!("Dry run: no files written");
    } else {
        println!("Output: {}", result.output_dir.display());
    }

    let mut table = Table::new();
    table.set_header(vec![
        header_cell("Module"),
        header_cell("Input"),
        header_cell("Clean"),
        header_cell("Excluded"),
        header_cell("No match"),
        header_cell("Duplicates"),
        header_cell("Vitals"),
        header_cell("Output"),
    ]);
    apply_table_style(&mut table);
    for index in 1..=7 {
        align_column(&mut table, index, CellAlignment::Right);
    }

    let mut totals = [0usize; 7];
    for run in &result.modules {
        let counts = [
            run.input_rows,
            run.clean,
            run.excluded,
            run.no_match,
            run.duplicates,
            run.with_vitals,
            run.output_rows,
        ];
        for (total, count) in totals.iter_mut().zip(counts) {
            *total += count;
        }
        table.add_row(vec![
            Cell::new(run.module.slug()).fg(Color::Cyan),
            Cell::new(run.input_rows),
            Cell::new(run.clean),
            warn_cell(run.excluded),
            warn_cell(run.no_match),
            warn_cell(run.duplicates),
            Cell::new(run.with_vitals),
            Cell::new(run.output_rows).add_attribute(Attribute::Bold),
        ]);
    }
    let mut total_row = vec![
        Cell::new("TOTAL")
            .fg(Color::Cyan)
            .add_attribute(Attribute::Bold),
    ];
    total_row.extend(
        totals
            .iter()
            .map(|total| Cell::new(total).add_attribute(Attribute::Bold)),
    );
    table.add_row(total_row);
    println!("{table}");

    if !result.errors.is_empty() {
        eprintln!("Errors:");
        for error in &result.errors {
            eprintln!("- {error}");
        }
    }
}

pub fn print_client_table(entries: &[ClientEntry]) {
    let mut table = Table::new();
    table.set_header(vec![
        header_cell("Client"),
        header_cell("Name"),
        header_cell("System"),
        header_cell("Active"),
        header_cell("Source"),
    ]);
    apply_table_style(&mut table);
    for entry in entries {
        match (&entry.config, &entry.problem) {
            (Some(config), _) => {
                table.add_row(vec![
                    Cell::new(&entry.slug).fg(Color::Cyan),
                    Cell::new(&config.name),
                    Cell::new(config.system.slug()),
                    active_cell(config.active),
                    Cell::new(config.source_path.display()),
                ]);
            }
            (None, problem) => {
                table.add_row(vec![
                    Cell::new(&entry.slug).fg(Color::Cyan),
                    Cell::new(problem.as_deref().unwrap_or("invalid configuration"))
                        .fg(Color::Red),
                    Cell::new("-"),
                    Cell::new("-"),
                    Cell::new("-"),
                ]);
            }
        }
    }
    println!("{table}");
}

pub fn apply_table_style(table: &mut Table) {
    table
        .load_preset(UTF8_FULL_CONDENSED)
        .apply_modifier(UTF8_ROUND_CORNERS)
        .set_content_arrangement(ContentArrangement::Dynamic)
        .set_width(120);
}

fn header_cell(text: &str) -> Cell {
    Cell::new(text).add_attribute(Attribute::Bold)
}

fn warn_cell(count: usize) -> Cell {
    if count > 0 {
        Cell::new(count).fg(Color::Yellow)
    } else {
        Cell::new(count)
    }
}

fn active_cell(active: bool) -> Cell {
    if active {
        Cell::new("yes").fg(Color::Green)
    } else {
        Cell::new("no").fg(Color::Red)
    }
}

fn align_column(table: &mut Table, index: usize, alignment: CellAlignment) {
    if let Some(column) = table.column_mut(index) {
        column.set_cell_alignment(alignment);
    }
}
