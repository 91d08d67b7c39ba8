use crate::config::{ColumnConfig, ModuleConfig};
use crate::dates::parse_timestamp;
use crate::error::{LoadIssue, SourceError};
use crate::models::{ModuleData, Record, Table};
use crate::score::parse_score;

/// Parse comma-separated text with a header row. Headers are trimmed and
/// lowercased; short rows are padded so every row matches the header width.
pub fn parse_table(text: &str) -> Result<Table, SourceError> {
    // Unshared sheets answer 200 with a sign-in page instead of CSV.
    if text.trim_start().starts_with('<') {
        return Err(SourceError::NotDelimited);
    }

    let mut reader = csv::ReaderBuilder::new()
        .has_headers(true)
        .flexible(true)
        .from_reader(text.as_bytes());

    let headers: Vec<String> = reader
        .headers()?
        .iter()
        .map(|h| h.trim().to_lowercase())
        .collect();

    let mut rows = Vec::new();
    for result in reader.records() {
        let record = result?;
        let mut row: Vec<String> = record.iter().map(str::to_string).collect();
        if row.iter().all(|cell| cell.trim().is_empty()) {
            continue;
        }
        if row.len() < headers.len() {
            row.resize(headers.len(), String::new());
        }
        rows.push(row);
    }

    Ok(Table { headers, rows })
}

fn first_present(table: &Table, candidates: &[String]) -> Option<usize> {
    candidates.iter().find_map(|name| table.column(name))
}

fn non_empty(value: &str) -> Option<String> {
    let trimmed = value.trim();
    (!trimmed.is_empty()).then(|| trimmed.to_string())
}

/// Turn a parsed table into module records using the configured column names.
///
/// Missing columns disable features instead of failing: without a worker id
/// column no records are produced (the raw rows stay for display), without a
/// score column records carry no score, without a timestamp column records
/// carry no timestamp.
pub fn build_module(
    module: &ModuleConfig,
    table: Table,
    columns: &ColumnConfig,
    day_first: bool,
    issues: &mut Vec<LoadIssue>,
) -> ModuleData {
    let missing = |column: &str, effect: &'static str| LoadIssue::SchemaMissing {
        module: module.name.clone(),
        column: column.to_string(),
        effect,
    };

    let worker_idx = table.column(&columns.worker_id);
    let score_idx = table.column(&columns.score);
    let timestamp_idx = first_present(&table, &columns.timestamp);
    let name_idx = table.column(&columns.full_name);
    let site_idx = table.column(&columns.site);

    let Some(worker_idx) = worker_idx else {
        issues.push(missing(&columns.worker_id, "module excluded from the summary"));
        return ModuleData {
            name: module.name.clone(),
            label: module.label.clone(),
            table,
            records: Vec::new(),
            has_timestamp: false,
            has_score: false,
        };
    };
    if score_idx.is_none() {
        issues.push(missing(&columns.score, "module excluded from score totals"));
    }
    if timestamp_idx.is_none() {
        let wanted = columns.timestamp.join("' or '");
        issues.push(missing(&wanted, "date filtering and pre/post disabled"));
    }

    let mut records = Vec::with_capacity(table.rows.len());
    let mut unparseable = 0usize;
    let mut sample = None;

    for (row, cells) in table.rows.iter().enumerate() {
        let cell = move |idx: usize| cells.get(idx).map(String::as_str).unwrap_or("");

        let Some(worker_id) = non_empty(cell(worker_idx)) else {
            continue;
        };

        let raw_score = score_idx.and_then(|idx| non_empty(cell(idx)));
        let score = raw_score.as_deref().and_then(parse_score);
        if let (Some(raw), None) = (&raw_score, score) {
            unparseable += 1;
            sample.get_or_insert_with(|| raw.clone());
        }

        records.push(Record {
            worker_id,
            full_name: name_idx.and_then(|idx| non_empty(cell(idx))),
            site: site_idx.and_then(|idx| non_empty(cell(idx))),
            raw_score,
            score,
            timestamp: timestamp_idx.and_then(|idx| parse_timestamp(cell(idx), day_first)),
            row,
        });
    }

    if let Some(sample) = sample {
        issues.push(LoadIssue::ScoreUnparseable {
            module: module.name.clone(),
            count: unparseable,
            sample,
        });
    }

    ModuleData {
        name: module.name.clone(),
        label: module.label.clone(),
        table,
        records,
        has_timestamp: timestamp_idx.is_some(),
        has_score: score_idx.is_some(),
    }
}
