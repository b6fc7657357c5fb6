use comfy_table::Color;
use serde::Serialize;

use crate::consts::DATETIME_FORMAT;
use crate::core::{DiaryEntry, PassSummary, YearMonth};
use crate::output::format::{
    create_styled_table, file_name, header_cell, preview, right_cell, styled_cell,
};
use crate::utils::Timezone;

const PREVIEW_CHARS: usize = 40;

/// Entry as printed by `--json`, with the date already in the display zone.
#[derive(Serialize)]
struct EntryJson<'a> {
    id: i64,
    image_path: &'a str,
    created_at: String,
    content: &'a str,
}

impl<'a> EntryJson<'a> {
    fn new(entry: &'a DiaryEntry, timezone: Timezone) -> Self {
        Self {
            id: entry.id,
            image_path: &entry.image_path,
            created_at: timezone.to_fixed_offset(entry.created_at).to_rfc3339(),
            content: &entry.content,
        }
    }
}

fn local_time(entry: &DiaryEntry, timezone: Timezone) -> String {
    timezone
        .to_fixed_offset(entry.created_at)
        .format(DATETIME_FORMAT)
        .to_string()
}

pub(crate) fn print_entries_table(entries: &[DiaryEntry], timezone: Timezone, use_color: bool) {
    let mut table = create_styled_table();
    table.set_header(vec![
        header_cell("ID", use_color),
        header_cell("Date", use_color),
        header_cell("Photo", use_color),
        header_cell("Diary", use_color),
    ]);

    let date_color = use_color.then_some(Color::Green);
    for entry in entries {
        table.add_row(vec![
            right_cell(&entry.id.to_string(), None, false),
            styled_cell(&local_time(entry, timezone), date_color, false),
            styled_cell(file_name(&entry.image_path), None, false),
            styled_cell(&preview(&entry.content, PREVIEW_CHARS), None, false),
        ]);
    }

    println!("{table}");
    println!("{} entries", entries.len());
}

pub(crate) fn output_entries_json(
    entries: &[DiaryEntry],
    timezone: Timezone,
) -> Result<String, serde_json::Error> {
    let rows: Vec<_> = entries.iter().map(|e| EntryJson::new(e, timezone)).collect();
    serde_json::to_string_pretty(&rows)
}

pub(crate) fn print_entry(entry: &DiaryEntry, timezone: Timezone, use_color: bool) {
    let mut table = create_styled_table();
    table.set_header(vec![
        header_cell(&format!("#{}", entry.id), use_color),
        header_cell(&local_time(entry, timezone), use_color),
    ]);
    table.add_row(vec![
        styled_cell("Photo", None, true),
        styled_cell(&entry.image_path, None, false),
    ]);
    table.add_row(vec![
        styled_cell("Diary", None, true),
        styled_cell(&entry.content, None, false),
    ]);
    println!("{table}");
}

pub(crate) fn output_entry_json(
    entry: &DiaryEntry,
    timezone: Timezone,
) -> Result<String, serde_json::Error> {
    serde_json::to_string_pretty(&EntryJson::new(entry, timezone))
}

pub(crate) fn print_months(months: &[YearMonth]) {
    for m in months {
        println!("{:04}-{:02}", m.year, m.month);
    }
}

pub(crate) fn output_months_json(months: &[YearMonth]) -> Result<String, serde_json::Error> {
    serde_json::to_string_pretty(months)
}

pub(crate) fn print_summary(summary: &PassSummary, use_color: bool) {
    let mut table = create_styled_table();
    table.set_header(vec![
        header_cell("Photos", use_color),
        header_cell("New", use_color),
        header_cell("Created", use_color),
        header_cell("Failed", use_color),
    ]);
    let failed_color = (use_color && summary.failed > 0).then_some(Color::Red);
    table.add_row(vec![
        right_cell(&summary.candidates.to_string(), None, false),
        right_cell(&summary.queued.to_string(), None, false),
        right_cell(&summary.created.to_string(), None, true),
        right_cell(&summary.failed.to_string(), failed_color, false),
    ]);
    println!("{table}");
}
