mod entries;
mod format;

pub(crate) use entries::{
    output_entries_json, output_entry_json, output_months_json, print_entries_table, print_entry,
    print_months, print_summary,
};
