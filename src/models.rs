use chrono::NaiveDateTime;
use serde::Serialize;

use crate::dates::DateRange;
use crate::error::LoadIssue;

/// Raw delimited table with trimmed, lowercased headers.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Table {
    pub headers: Vec<String>,
    pub rows: Vec<Vec<String>>,
}

impl Table {
    pub fn column(&self, name: &str) -> Option<usize> {
        let wanted = name.trim().to_lowercase();
        self.headers.iter().position(|h| *h == wanted)
    }

    pub fn cell(&self, row: usize, column: usize) -> &str {
        self.rows
            .get(row)
            .and_then(|r| r.get(column))
            .map(String::as_str)
            .unwrap_or("")
    }
}

/// One submission by a worker within a module.
#[derive(Debug, Clone, PartialEq)]
pub struct Record {
    pub worker_id: String,
    pub full_name: Option<String>,
    pub site: Option<String>,
    pub raw_score: Option<String>,
    pub score: Option<f64>,
    pub timestamp: Option<NaiveDateTime>,
    /// Index of the originating row in the module's table.
    pub row: usize,
}

#[derive(Debug, Clone)]
pub struct ModuleData {
    pub name: String,
    pub label: String,
    pub table: Table,
    pub records: Vec<Record>,
    pub has_timestamp: bool,
    pub has_score: bool,
}

impl ModuleData {
    /// Schema-only dataset for a module with no usable source.
    pub fn empty(name: &str, label: &str) -> Self {
        Self {
            name: name.to_string(),
            label: label.to_string(),
            table: Table::default(),
            records: Vec::new(),
            has_timestamp: false,
            has_score: false,
        }
    }
}

/// Every declared module, in declaration order, plus what went wrong loading them.
#[derive(Debug, Clone, Default)]
pub struct LoadedModules {
    pub modules: Vec<ModuleData>,
    pub issues: Vec<LoadIssue>,
}

impl LoadedModules {
    pub fn module(&self, name: &str) -> Option<&ModuleData> {
        self.modules.iter().find(|m| m.name == name)
    }
}

#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct ModuleColumn {
    pub name: String,
    pub label: String,
}

#[derive(Debug, Clone, Copy, Default, Serialize, PartialEq)]
pub struct ModuleScore {
    pub pre: f64,
    pub post: f64,
}

#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct WorkerSummary {
    pub worker_id: String,
    pub full_name: String,
    pub site: String,
    pub attempt_count: usize,
    /// One entry per declared module, in declaration order.
    pub scores: Vec<ModuleScore>,
    pub total_pre: f64,
    pub total_post: f64,
    pub percent_pre: f64,
    pub percent_post: f64,
}

impl WorkerSummary {
    pub fn attempts_label(&self) -> String {
        format!("{}x", self.attempt_count)
    }
}

#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct SummaryTable {
    pub modules: Vec<ModuleColumn>,
    pub range: Option<DateRange>,
    pub max_possible: f64,
    pub rows: Vec<WorkerSummary>,
}

impl SummaryTable {
    /// No worker has an in-range record anywhere.
    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }
}

/// Filtered raw rows of one module, or of every module combined, ready for display.
#[derive(Debug, Clone, PartialEq)]
pub struct ModuleDetail {
    pub module: String,
    pub headers: Vec<String>,
    pub rows: Vec<Vec<String>>,
    pub entries: usize,
    pub distinct_sites: usize,
    /// False when some shown rows come from a module without a timestamp column.
    pub date_filtered: bool,
}

#[derive(Debug, Clone, PartialEq)]
pub enum DetailView {
    Data(ModuleDetail),
    NoData,
}

#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct SiteSummary {
    pub site: String,
    pub workers: usize,
    pub attempts: usize,
    pub avg_percent_pre: f64,
    pub avg_percent_post: f64,
}

#[derive(Debug, Clone, Default, Serialize, PartialEq)]
pub struct Overview {
    pub workers: usize,
    pub attempts: usize,
    pub avg_percent_pre: f64,
    pub avg_percent_post: f64,
    pub improved: usize,
    pub unchanged: usize,
    pub declined: usize,
}
