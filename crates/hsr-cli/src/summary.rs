use comfy_table::modifiers::UTF8_ROUND_CORNERS;
use comfy_table::presets::UTF8_FULL_CONDENSED;
use comfy_table::{Attribute, Cell, CellAlignment, Color, ContentArrangement, Table};

use hsr_cli::config::Rejected;
use hsr_cli::datasets::LoadedDataset;
use hsr_cli::runner::{ReportRun, RunStatus};

use crate::types::{DatasetsSummary, RunSummary};

pub fn print_run_summary(summary: &RunSummary) {
    println!("Datasets loaded: {}", summary.datasets);
    if summary.dry_run {
        println!("Dry run: no files written");
    }
    let mut table = Table::new();
    table.set_header(vec![
        header_cell("Report"),
        header_cell("Type"),
        header_cell("Status"),
        header_cell("Rows"),
        header_cell("Output"),
    ]);
    apply_table_style(&mut table);
    align_column(&mut table, 3, CellAlignment::Right);
    let mut total_rows = 0usize;
    for run in &summary.runs {
        if let RunStatus::Written { rows, .. } = run.status {
            total_rows += rows;
        }
        table.add_row(run_row(run));
    }
    let failed = summary.runs.iter().filter(|run| run.failed()).count();
    table.add_row(vec![
        Cell::new("TOTAL")
            .fg(Color::Cyan)
            .add_attribute(Attribute::Bold),
        Cell::new(format!("{} reports", summary.runs.len()))
            .fg(Color::Cyan)
            .add_attribute(Attribute::Bold),
        count_cell(failed, "failed"),
        Cell::new(total_rows).add_attribute(Attribute::Bold),
        dim_cell("-"),
    ]);
    println!("{table}");
    print_rejected("Skipped files", &summary.skipped_files);
    print_rejected("Skipped reports", &summary.skipped_reports);
}

pub fn print_datasets(summary: &DatasetsSummary) {
    let mut table = Table::new();
    table.set_header(vec![
        header_cell("Dataset"),
        header_cell("Type"),
        header_cell("Rows"),
        header_cell("Columns"),
    ]);
    apply_table_style(&mut table);
    align_column(&mut table, 2, CellAlignment::Right);
    for dataset in summary.store.iter() {
        table.add_row(dataset_row(dataset));
    }
    println!("{table}");
    print_rejected("Skipped files", &summary.skipped_files);
}

fn run_row(run: &ReportRun) -> Vec<Cell> {
    let (status, rows, output) = match &run.status {
        RunStatus::Written { rows, output } => (
            Cell::new("written").fg(Color::Green),
            Cell::new(rows),
            match output {
                Some(path) => Cell::new(path.display()),
                None => dim_cell("-"),
            },
        ),
        RunStatus::Empty => (
            Cell::new("empty").fg(Color::Yellow),
            Cell::new(0),
            dim_cell("-"),
        ),
        RunStatus::Failed { kind, message } => (
            Cell::new(format!("{kind} error")).fg(Color::Red),
            dim_cell("-"),
            Cell::new(message).fg(Color::Red),
        ),
    };
    vec![
        Cell::new(&run.label).add_attribute(Attribute::Bold),
        Cell::new(run.kind),
        status,
        rows,
        output,
    ]
}

fn dataset_row(dataset: &LoadedDataset) -> Vec<Cell> {
    let columns = dataset
        .columns()
        .iter()
        .map(|(column, header)| format!("{column} = {header}"))
        .collect::<Vec<_>>()
        .join("\n");
    vec![
        Cell::new(dataset.id())
            .fg(Color::Blue)
            .add_attribute(Attribute::Bold),
        Cell::new(dataset.kind()),
        Cell::new(dataset.height()),
        if columns.is_empty() {
            dim_cell("-")
        } else {
            Cell::new(columns)
        },
    ]
}

fn print_rejected(title: &str, rejected: &[Rejected]) {
    if rejected.is_empty() {
        return;
    }
    eprintln!("{title}:");
    for entry in rejected {
        eprintln!("- {}: {}", entry.label, entry.message);
    }
}

fn apply_table_style(table: &mut Table) {
    table
        .load_preset(UTF8_FULL_CONDENSED)
        .apply_modifier(UTF8_ROUND_CORNERS)
        .set_content_arrangement(ContentArrangement::Dynamic);
}

fn align_column(table: &mut Table, index: usize, alignment: CellAlignment) {
    if let Some(column) = table.column_mut(index) {
        column.set_cell_alignment(alignment);
    }
}

fn count_cell(count: usize, label: &str) -> Cell {
    let cell = Cell::new(format!("{count} {label}")).add_attribute(Attribute::Bold);
    if count > 0 {
        cell.fg(Color::Red)
    } else {
        cell
    }
}

fn header_cell(label: &str) -> Cell {
    Cell::new(label)
        .fg(Color::Cyan)
        .add_attribute(Attribute::Bold)
}

fn dim_cell<T: ToString>(value: T) -> Cell {
    Cell::new(value).fg(Color::DarkGrey)
}
