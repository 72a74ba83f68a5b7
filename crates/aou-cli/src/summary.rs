use comfy_table::modifiers::{UTF8_ROUND_CORNERS, UTF8_SOLID_INNER_BORDERS};
use comfy_table::presets::{UTF8_FULL, UTF8_FULL_CONDENSED};
use comfy_table::{Attribute, Cell, CellAlignment, Color, ContentArrangement, Table};

use aou_load::Comparison;

use crate::types::RunReport;

/// Participants listed per section before the comparison output is cut short.
const MAX_LISTED: usize = 50;

pub fn print_summary(report: &RunReport) {
    println!("Target: {}", report.target);
    if let Some(source) = &report.source {
        println!("Input: {}", source.display());
    }
    println!("As of: {} ({} policy)", report.as_of, report.policy);
    if report.dry_run {
        println!("Dry run: no outputs written");
    }

    let mut table = Table::new();
    table.set_header(vec![header_cell("Stage"), header_cell("Records")]);
    apply_summary_table_style(&mut table);
    align_column(&mut table, 1, CellAlignment::Right);
    table.add_row(vec![Cell::new("Fetched"), Cell::new(report.fetched)]);
    table.add_row(vec![Cell::new("Transformed"), Cell::new(report.transformed)]);
    table.add_row(vec![
        Cell::new("With retention date"),
        count_cell(report.with_retention_date, Color::Green),
    ]);
    println!("{table}");

    if !report.outputs.is_empty() {
        let mut outputs = Table::new();
        outputs.set_header(vec![
            header_cell("Sink"),
            header_cell("Table"),
            header_cell("Rows"),
            header_cell("Path"),
        ]);
        apply_table_style(&mut outputs);
        align_column(&mut outputs, 2, CellAlignment::Right);
        for summary in &report.outputs {
            outputs.add_row(vec![
                Cell::new(summary.sink)
                    .fg(Color::Blue)
                    .add_attribute(Attribute::Bold),
                Cell::new(&summary.table),
                Cell::new(summary.rows),
                Cell::new(summary.path.display()),
            ]);
        }
        println!("{outputs}");
    }

    if let Some(job) = &report.job {
        println!(
            "Job '{}' completed in {:.1}s ({} polls)",
            job.name,
            job.elapsed.as_secs_f64(),
            job.polls
        );
    }
    println!("Elapsed: {:.1}s", report.elapsed.as_secs_f64());
}

pub fn print_comparison(comparison: &Comparison) {
    let mut table = Table::new();
    table.set_header(vec![header_cell("Result"), header_cell("Participants")]);
    apply_summary_table_style(&mut table);
    align_column(&mut table, 1, CellAlignment::Right);
    table.add_row(vec![Cell::new("Identical"), dim_cell(comparison.matched)]);
    table.add_row(vec![
        Cell::new("Differing"),
        count_cell(comparison.differing.len(), Color::Yellow),
    ]);
    table.add_row(vec![
        Cell::new("Only in left"),
        count_cell(comparison.only_left.len(), Color::Red),
    ]);
    table.add_row(vec![
        Cell::new("Only in right"),
        count_cell(comparison.only_right.len(), Color::Red),
    ]);
    println!("{table}");

    if !comparison.differing.is_empty() {
        let mut changes = Table::new();
        changes.set_header(vec![
            header_cell("PMI ID"),
            header_cell("Column"),
            header_cell("Left"),
            header_cell("Right"),
        ]);
        apply_table_style(&mut changes);
        for diff in comparison.differing.iter().take(MAX_LISTED) {
            for change in &diff.changes {
                changes.add_row(vec![
                    Cell::new(&diff.pmi_id).fg(Color::Blue),
                    Cell::new(&change.column),
                    value_cell(&change.left),
                    value_cell(&change.right),
                ]);
            }
        }
        println!();
        println!("Differences:");
        println!("{changes}");
        print_truncated(comparison.differing.len());
    }

    print_id_list("Only in left:", &comparison.only_left);
    print_id_list("Only in right:", &comparison.only_right);
}

fn print_id_list(label: &str, ids: &[String]) {
    if ids.is_empty() {
        return;
    }
    println!();
    println!("{label}");
    for id in ids.iter().take(MAX_LISTED) {
        println!("- {id}");
    }
    print_truncated(ids.len());
}

fn print_truncated(total: usize) {
    if total > MAX_LISTED {
        println!("... and {} more", total - MAX_LISTED);
    }
}

fn count_cell(count: usize, color: Color) -> Cell {
    if count > 0 {
        Cell::new(count).fg(color).add_attribute(Attribute::Bold)
    } else {
        dim_cell(count)
    }
}

fn value_cell(value: &str) -> Cell {
    if value.is_empty() {
        dim_cell("(blank)")
    } else {
        Cell::new(value)
    }
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
        .set_content_arrangement(ContentArrangement::Dynamic)
        .set_width(80);
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

fn dim_cell<T: ToString>(value: T) -> Cell {
    Cell::new(value.to_string()).fg(Color::DarkGrey)
}
