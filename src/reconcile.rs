use std::collections::{BTreeMap, HashSet};

use chrono::NaiveDateTime;

use crate::config::{ColumnConfig, PostRule, ScoringConfig};
use crate::dates::DateRange;
use crate::models::{
    DetailView, ModuleColumn, ModuleData, ModuleDetail, ModuleScore, Record, SummaryTable,
    WorkerSummary,
};
use crate::score::round1;

/// Earliest and latest record dates across every module, or `None` when no
/// record carries a timestamp.
pub fn date_bounds(modules: &[ModuleData]) -> Option<DateRange> {
    let mut dates = modules
        .iter()
        .filter(|m| m.has_timestamp)
        .flat_map(|m| m.records.iter())
        .filter_map(|r| r.timestamp.map(|ts| ts.date()));

    let first = dates.next()?;
    let (start, end) = dates.fold((first, first), |(lo, hi), d| (lo.min(d), hi.max(d)));
    Some(DateRange::new(start, end))
}

/// Records of one module that take part in date-based work. Modules without
/// a timestamp column and records without a parseable timestamp never do.
/// With no range every timestamped record is kept.
pub fn records_in_range<'a>(module: &'a ModuleData, range: Option<&DateRange>) -> Vec<&'a Record> {
    if !module.has_timestamp {
        return Vec::new();
    }
    module
        .records
        .iter()
        .filter(|r| match (r.timestamp, range) {
            (Some(ts), Some(range)) => range.contains_timestamp(ts),
            (Some(_), None) => true,
            (None, _) => false,
        })
        .collect()
}

/// Baseline and follow-up score per worker for one module.
///
/// Attempts are ordered by timestamp with a stable sort, so equal timestamps
/// keep source row order. Records without a score are skipped.
pub fn pre_post<'a>(records: &[&'a Record], rule: PostRule) -> BTreeMap<&'a str, ModuleScore> {
    let mut attempts: BTreeMap<&'a str, Vec<(NaiveDateTime, f64)>> = BTreeMap::new();
    for record in records {
        if let (Some(ts), Some(score)) = (record.timestamp, record.score) {
            attempts
                .entry(record.worker_id.as_str())
                .or_default()
                .push((ts, score));
        }
    }

    attempts
        .into_iter()
        .filter_map(|(worker_id, mut list)| {
            list.sort_by_key(|(ts, _)| *ts);
            let (_, pre) = *list.first()?;
            let post = match rule {
                PostRule::Latest => list.last().map_or(pre, |(_, score)| *score),
                PostRule::BestOfRest => list[1..]
                    .iter()
                    .map(|(_, score)| *score)
                    .reduce(f64::max)
                    .unwrap_or(pre),
            };
            Some((worker_id, ModuleScore { pre, post }))
        })
        .collect()
}

/// Position of a record across all modules: time, then module name, then row.
/// Module names are unique, so the ordering does not depend on declaration order.
type Rank<'a> = (NaiveDateTime, &'a str, usize);

struct WorkerAccumulator<'a> {
    attempts: usize,
    full_name: Option<(Rank<'a>, String)>,
    site: Option<(Rank<'a>, String)>,
    scores: Vec<ModuleScore>,
}

impl WorkerAccumulator<'_> {
    fn new(module_count: usize) -> Self {
        Self {
            attempts: 0,
            full_name: None,
            site: None,
            scores: vec![ModuleScore::default(); module_count],
        }
    }
}

fn keep_earliest<'a>(
    slot: &mut Option<(Rank<'a>, String)>,
    rank: Rank<'a>,
    value: Option<&String>,
) {
    let Some(value) = value else {
        return;
    };
    if slot.as_ref().map_or(true, |(current, _)| rank < *current) {
        *slot = Some((rank, value.clone()));
    }
}

/// Build one summary row per worker seen in any module inside `range`.
///
/// Every worker gets a pre/post pair for every module; modules where the
/// worker has no scored attempt contribute zeros. Rows come out sorted by
/// worker id, so reordering modules only reorders the score columns.
pub fn reconcile(
    modules: &[ModuleData],
    range: Option<&DateRange>,
    scoring: &ScoringConfig,
) -> SummaryTable {
    let module_count = modules.len();
    let mut workers: BTreeMap<String, WorkerAccumulator> = BTreeMap::new();

    for (idx, module) in modules.iter().enumerate() {
        let in_range = records_in_range(module, range);

        for record in &in_range {
            let acc = workers
                .entry(record.worker_id.clone())
                .or_insert_with(|| WorkerAccumulator::new(module_count));
            acc.attempts += 1;
            if let Some(ts) = record.timestamp {
                let rank = (ts, module.name.as_str(), record.row);
                keep_earliest(&mut acc.full_name, rank, record.full_name.as_ref());
                keep_earliest(&mut acc.site, rank, record.site.as_ref());
            }
        }

        if !module.has_score {
            continue;
        }
        for (worker_id, score) in pre_post(&in_range, scoring.post_rule) {
            if let Some(acc) = workers.get_mut(worker_id) {
                acc.scores[idx] = score;
            }
        }
    }

    let max_possible = module_count as f64 * scoring.per_module_max;
    let percent = |total: f64| {
        if max_possible > 0.0 {
            round1(100.0 * total / max_possible)
        } else {
            0.0
        }
    };

    let rows = workers
        .into_iter()
        .map(|(worker_id, acc)| {
            let total_pre = round1(acc.scores.iter().map(|s| s.pre).sum());
            let total_post = round1(acc.scores.iter().map(|s| s.post).sum());
            WorkerSummary {
                worker_id,
                full_name: acc.full_name.map(|(_, v)| v).unwrap_or_default(),
                site: acc.site.map(|(_, v)| v).unwrap_or_default(),
                attempt_count: acc.attempts,
                scores: acc.scores,
                total_pre,
                total_post,
                percent_pre: percent(total_pre),
                percent_post: percent(total_post),
            }
        })
        .collect();

    SummaryTable {
        modules: modules
            .iter()
            .map(|m| ModuleColumn {
                name: m.name.clone(),
                label: m.label.clone(),
            })
            .collect(),
        range: range.copied(),
        max_possible,
        rows,
    }
}

/// Label of the combined view across every module.
pub const ALL_MODULES: &str = "All modules";

/// Leading column of the combined view naming each row's module.
pub const MODULE_COLUMN: &str = "module";

fn search_needle(search: Option<&str>) -> Option<String> {
    search
        .map(|s| s.trim().to_lowercase())
        .filter(|s| !s.is_empty())
}

/// Indices of the rows of `module` to show, in table order.
///
/// Timestamped modules are restricted to in-range rows; modules without a
/// timestamp column are shown whole. `needle` keeps rows whose worker id
/// contains it, or any cell when the module has no worker id column.
fn visible_rows(
    module: &ModuleData,
    range: Option<&DateRange>,
    needle: Option<&str>,
    columns: &ColumnConfig,
) -> Vec<usize> {
    let table = &module.table;
    let candidates: Vec<usize> = if module.has_timestamp {
        let mut rows: Vec<usize> = records_in_range(module, range).iter().map(|r| r.row).collect();
        rows.sort_unstable();
        rows
    } else {
        (0..table.rows.len()).collect()
    };

    let Some(needle) = needle else {
        return candidates;
    };
    let worker_idx = table.column(&columns.worker_id);
    candidates
        .into_iter()
        .filter(|&row| match worker_idx {
            Some(col) => table.cell(row, col).to_lowercase().contains(needle),
            None => table.rows[row]
                .iter()
                .any(|cell| cell.to_lowercase().contains(needle)),
        })
        .collect()
}

fn count_sites(rows: &[Vec<String>], site_col: Option<usize>) -> usize {
    let Some(col) = site_col else {
        return 0;
    };
    rows.iter()
        .filter_map(|row| row.get(col))
        .map(|site| site.trim())
        .filter(|site| !site.is_empty())
        .collect::<HashSet<_>>()
        .len()
}

/// Raw rows of one module for the detail view, filtered by date and by a
/// case-insensitive worker id search.
pub fn detail(
    module: &ModuleData,
    range: Option<&DateRange>,
    search: Option<&str>,
    columns: &ColumnConfig,
) -> DetailView {
    let table = &module.table;
    let needle = search_needle(search);
    let rows: Vec<Vec<String>> = visible_rows(module, range, needle.as_deref(), columns)
        .into_iter()
        .map(|row| table.rows[row].clone())
        .collect();

    if rows.is_empty() {
        return DetailView::NoData;
    }

    let distinct_sites = count_sites(&rows, table.column(&columns.site));
    DetailView::Data(ModuleDetail {
        module: module.name.clone(),
        headers: table.headers.clone(),
        entries: rows.len(),
        rows,
        distinct_sites,
        date_filtered: module.has_timestamp,
    })
}

/// Raw rows of every module stacked into one table.
///
/// Columns are the union of all module headers in first-seen order, after a
/// leading `module` column. Cells a module does not have are left blank.
/// Rows are filtered per module exactly as in [`detail`].
pub fn combined(
    modules: &[ModuleData],
    range: Option<&DateRange>,
    search: Option<&str>,
    columns: &ColumnConfig,
) -> DetailView {
    let needle = search_needle(search);
    let mut headers = vec![MODULE_COLUMN.to_string()];
    let mut parts = Vec::new();

    for module in modules {
        let rows = visible_rows(module, range, needle.as_deref(), columns);
        if rows.is_empty() {
            continue;
        }
        for header in &module.table.headers {
            if !headers.contains(header) {
                headers.push(header.clone());
            }
        }
        parts.push((module, rows));
    }

    if parts.is_empty() {
        return DetailView::NoData;
    }

    let date_filtered = parts.iter().all(|(module, _)| module.has_timestamp);
    let mut rows = Vec::new();
    for (module, indices) in parts {
        let positions: Vec<Option<usize>> = headers[1..]
            .iter()
            .map(|header| module.table.column(header))
            .collect();
        for row in indices {
            let mut cells = Vec::with_capacity(headers.len());
            cells.push(module.name.clone());
            cells.extend(positions.iter().map(|pos| {
                pos.map_or_else(String::new, |col| module.table.cell(row, col).to_string())
            }));
            rows.push(cells);
        }
    }

    let site = columns.site.trim().to_lowercase();
    let distinct_sites = count_sites(&rows, headers.iter().position(|h| *h == site));
    DetailView::Data(ModuleDetail {
        module: ALL_MODULES.to_string(),
        headers,
        entries: rows.len(),
        rows,
        distinct_sites,
        date_filtered,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::ModuleConfig;
    use crate::table::{build_module, parse_table};
    use chrono::NaiveDate;

    const HEADER: &str = "Timestamp,ID Pekerja,Nama,Depoh,Total Score";

    fn module(name: &str, rows: &[&str]) -> ModuleData {
        let mut text = String::from(HEADER);
        for row in rows {
            text.push('\n');
            text.push_str(row);
        }
        let config = ModuleConfig {
            name: name.into(),
            label: name.into(),
            source: None,
        };
        let table = parse_table(&text).unwrap();
        build_module(&config, table, &ColumnConfig::default(), false, &mut Vec::new())
    }

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn worker<'a>(summary: &'a SummaryTable, id: &str) -> &'a WorkerSummary {
        summary.rows.iter().find(|r| r.worker_id == id).unwrap()
    }

    fn scoring() -> ScoringConfig {
        ScoringConfig::default()
    }

    fn five_modules() -> Vec<ModuleData> {
        vec![
            module("A", &["2024-01-01,W1,Aminah,Kepong,4 / 5", "2024-01-05,W2,Badrul,Cheras,1 / 5"]),
            module("B", &["2024-01-02,W1,Aminah,Kepong,4 / 5"]),
            module("C", &["2024-01-03,W1,Aminah,Kepong,4 / 5", "2024-01-03,W2,Badrul,Cheras,2 / 5"]),
            module("D", &["2024-01-04,W1,Aminah,Kepong,4 / 5"]),
            ModuleData::empty("E", "E"),
        ]
    }

    #[test]
    fn two_attempts_give_pre_and_post() {
        let modules = vec![
            module(
                "A",
                &["2024-01-10,W1,Aminah,Kepong,5/5", "2024-01-01,W1,Aminah,Kepong,2/5"],
            ),
            module("B", &["2024-01-03,W9,Chong,Ampang,3/5"]),
        ];
        let range = date_bounds(&modules);
        let summary = reconcile(&modules, range.as_ref(), &scoring());

        let w1 = worker(&summary, "W1");
        assert_eq!(w1.scores[0], ModuleScore { pre: 2.0, post: 5.0 });
        assert_eq!(w1.scores[1], ModuleScore { pre: 0.0, post: 0.0 });
        assert_eq!(w1.total_pre, 2.0);
        assert_eq!(w1.total_post, 5.0);
        assert_eq!(w1.attempt_count, 2);
        assert_eq!(w1.attempts_label(), "2x");
    }

    #[test]
    fn single_attempt_is_both_pre_and_post() {
        let modules = vec![module("A", &["2024-01-01,W1,Aminah,Kepong,3.5 / 5"])];
        let summary = reconcile(&modules, None, &scoring());
        assert_eq!(summary.rows[0].scores[0], ModuleScore { pre: 3.5, post: 3.5 });
    }

    #[test]
    fn absent_modules_fill_with_zero() {
        let summary = reconcile(&five_modules(), None, &scoring());
        let w2 = worker(&summary, "W2");
        assert_eq!(w2.scores.len(), 5);
        assert_eq!(w2.scores[1], ModuleScore::default());
        assert_eq!(w2.scores[3], ModuleScore::default());
        assert_eq!(w2.scores[4], ModuleScore::default());
        assert_eq!(w2.total_post, 3.0);
    }

    #[test]
    fn percentages_use_module_count_times_max() {
        let summary = reconcile(&five_modules(), None, &scoring());
        assert_eq!(summary.max_possible, 25.0);
        let w1 = worker(&summary, "W1");
        assert_eq!(w1.total_post, 16.0);
        assert_eq!(w1.percent_post, 64.0);

        let mut modules = five_modules();
        modules[4] = module("E", &["2024-01-06,W1,Aminah,Kepong,4 / 5"]);
        let summary = reconcile(&modules, None, &scoring());
        let w1 = worker(&summary, "W1");
        assert_eq!(w1.total_post, 20.0);
        assert_eq!(w1.percent_post, 80.0);
    }

    #[test]
    fn percentages_are_not_clamped() {
        let modules = vec![module("A", &["2024-01-01,W1,Aminah,Kepong,7 / 5"])];
        let summary = reconcile(&modules, None, &scoring());
        assert_eq!(summary.rows[0].percent_post, 140.0);
    }

    #[test]
    fn totals_are_rounded_sums() {
        let modules = vec![
            module("A", &["2024-01-01,W1,Aminah,Kepong,1.1 / 5"]),
            module("B", &["2024-01-01,W1,Aminah,Kepong,2.2 / 5"]),
        ];
        let summary = reconcile(&modules, None, &scoring());
        assert_eq!(summary.rows[0].total_pre, 3.3);
        assert_eq!(summary.rows[0].percent_pre, 33.0);
    }

    #[test]
    fn recomputing_is_idempotent() {
        let modules = five_modules();
        let range = date_bounds(&modules);
        let first = reconcile(&modules, range.as_ref(), &scoring());
        let second = reconcile(&modules, range.as_ref(), &scoring());
        assert_eq!(first, second);
    }

    #[test]
    fn module_order_only_moves_columns() {
        let modules = five_modules();
        let mut reversed = five_modules();
        reversed.reverse();

        let forward = reconcile(&modules, None, &scoring());
        let backward = reconcile(&reversed, None, &scoring());

        assert_eq!(forward.rows.len(), backward.rows.len());
        for (a, b) in forward.rows.iter().zip(&backward.rows) {
            assert_eq!(a.worker_id, b.worker_id);
            assert_eq!(a.full_name, b.full_name);
            assert_eq!(a.site, b.site);
            assert_eq!(a.attempt_count, b.attempt_count);
            assert_eq!(a.total_pre, b.total_pre);
            assert_eq!(a.total_post, b.total_post);
            assert_eq!(a.percent_post, b.percent_post);
            let mut flipped = b.scores.clone();
            flipped.reverse();
            assert_eq!(a.scores, flipped);
        }
    }

    #[test]
    fn end_date_is_inclusive() {
        let modules = vec![module(
            "A",
            &["2024-01-10 23:59:00,W1,Aminah,Kepong,3/5", "2024-01-11 00:00:00,W2,Badrul,Cheras,4/5"],
        )];
        let range = DateRange::new(date(2024, 1, 1), date(2024, 1, 10));
        let summary = reconcile(&modules, Some(&range), &scoring());

        assert!(summary.rows.iter().any(|r| r.worker_id == "W1"));
        assert!(summary.rows.iter().all(|r| r.worker_id != "W2"));
    }

    #[test]
    fn filter_narrows_pre_and_post() {
        let modules = vec![module(
            "A",
            &[
                "2024-01-01,W1,Aminah,Kepong,1/5",
                "2024-02-01,W1,Aminah,Kepong,3/5",
                "2024-03-01,W1,Aminah,Kepong,5/5",
            ],
        )];
        let range = DateRange::new(date(2024, 1, 15), date(2024, 3, 31));
        let summary = reconcile(&modules, Some(&range), &scoring());
        assert_eq!(summary.rows[0].scores[0], ModuleScore { pre: 3.0, post: 5.0 });
        assert_eq!(summary.rows[0].attempt_count, 2);
    }

    #[test]
    fn inverted_range_is_empty_not_an_error() {
        let range = DateRange::new(date(2024, 2, 1), date(2024, 1, 1));
        let summary = reconcile(&five_modules(), Some(&range), &scoring());
        assert!(summary.is_empty());
        assert_eq!(summary.modules.len(), 5);
    }

    #[test]
    fn best_of_rest_takes_highest_later_attempt() {
        let modules = vec![module(
            "A",
            &[
                "2024-01-01,W1,Aminah,Kepong,1/5",
                "2024-01-02,W1,Aminah,Kepong,4.5/5",
                "2024-01-03,W1,Aminah,Kepong,3/5",
                "2024-01-04,W2,Badrul,Cheras,2/5",
            ],
        )];
        let rule = ScoringConfig {
            post_rule: PostRule::BestOfRest,
            ..scoring()
        };
        let summary = reconcile(&modules, None, &rule);
        assert_eq!(worker(&summary, "W1").scores[0], ModuleScore { pre: 1.0, post: 4.5 });
        assert_eq!(worker(&summary, "W2").scores[0], ModuleScore { pre: 2.0, post: 2.0 });

        let latest = reconcile(&modules, None, &scoring());
        assert_eq!(worker(&latest, "W1").scores[0].post, 3.0);
    }

    #[test]
    fn equal_timestamps_keep_row_order() {
        let modules = vec![module(
            "A",
            &["2024-01-01 09:00:00,W1,Aminah,Kepong,1/5", "2024-01-01 09:00:00,W1,Aminah,Kepong,4/5"],
        )];
        let summary = reconcile(&modules, None, &scoring());
        assert_eq!(summary.rows[0].scores[0], ModuleScore { pre: 1.0, post: 4.0 });
    }

    #[test]
    fn unparseable_score_counts_as_attempt_only() {
        let modules = vec![module(
            "A",
            &["2024-01-01,W1,Aminah,Kepong,abc", "2024-01-02,W1,Aminah,Kepong,3/5"],
        )];
        let summary = reconcile(&modules, None, &scoring());
        let w1 = &summary.rows[0];
        assert_eq!(w1.attempt_count, 2);
        assert_eq!(w1.scores[0], ModuleScore { pre: 3.0, post: 3.0 });
    }

    #[test]
    fn identity_comes_from_earliest_record() {
        let modules = vec![
            module("A", &["2024-01-05,W1,Aminah Binti Ali,Cheras,3/5"]),
            module("B", &["2024-01-01,W1,,Kepong,3/5", "2024-01-02,W1,Aminah,Kepong,3/5"]),
        ];
        let summary = reconcile(&modules, None, &scoring());
        let w1 = &summary.rows[0];
        assert_eq!(w1.full_name, "Aminah");
        assert_eq!(w1.site, "Kepong");
    }

    #[test]
    fn identity_on_shared_timestamp_ignores_module_order() {
        let forward = vec![
            module("A", &["2024-01-01,W1,Aminah,Kepong,3/5"]),
            module("B", &["2024-01-01,W1,Aminah Binti Ali,Cheras,4/5"]),
        ];
        let mut reversed = forward.clone();
        reversed.reverse();

        let a = reconcile(&forward, None, &scoring());
        let b = reconcile(&reversed, None, &scoring());

        assert_eq!(a.rows[0].full_name, "Aminah");
        assert_eq!(a.rows[0].site, "Kepong");
        assert_eq!(b.rows[0].full_name, a.rows[0].full_name);
        assert_eq!(b.rows[0].site, a.rows[0].site);
    }

    #[test]
    fn modules_without_timestamps_contribute_nothing() {
        let table = parse_table("id pekerja,total score\nW1,5/5\n").unwrap();
        let config = ModuleConfig {
            name: "Raw".into(),
            label: "RW".into(),
            source: None,
        };
        let raw = build_module(&config, table, &ColumnConfig::default(), false, &mut Vec::new());
        let modules = vec![raw, module("A", &["2024-01-01,W1,Aminah,Kepong,2/5"])];

        let summary = reconcile(&modules, date_bounds(&modules).as_ref(), &scoring());
        let w1 = &summary.rows[0];
        assert_eq!(w1.scores[0], ModuleScore::default());
        assert_eq!(w1.attempt_count, 1);
        assert_eq!(summary.max_possible, 10.0);
    }

    #[test]
    fn no_dates_anywhere_means_no_bounds_and_no_rows() {
        let modules = vec![ModuleData::empty("A", "A"), ModuleData::empty("B", "B")];
        assert_eq!(date_bounds(&modules), None);
        let summary = reconcile(&modules, None, &scoring());
        assert!(summary.is_empty());
        assert_eq!(summary.max_possible, 10.0);
    }

    #[test]
    fn bounds_span_all_modules() {
        let bounds = date_bounds(&five_modules()).unwrap();
        assert_eq!(bounds, DateRange::new(date(2024, 1, 1), date(2024, 1, 5)));
    }

    #[test]
    fn detail_filters_rows_by_date_and_search() {
        let data = module(
            "A",
            &[
                "2024-01-01,W1,Aminah,Kepong,1/5",
                "2024-01-02,W22,Badrul,Cheras,2/5",
                "2024-02-01,W2,Chong,Ampang,3/5",
            ],
        );
        let range = DateRange::new(date(2024, 1, 1), date(2024, 1, 31));
        let columns = ColumnConfig::default();

        let DetailView::Data(view) = detail(&data, Some(&range), None, &columns) else {
            panic!("expected rows");
        };
        assert_eq!(view.rows.len(), 2);
        assert_eq!(view.entries, 2);
        assert_eq!(view.distinct_sites, 2);
        assert!(view.date_filtered);

        let DetailView::Data(view) = detail(&data, Some(&range), Some("w2"), &columns) else {
            panic!("expected rows");
        };
        assert_eq!(view.rows.len(), 1);
        assert_eq!(view.rows[0][1], "W22");

        assert_eq!(detail(&data, Some(&range), Some("zzz"), &columns), DetailView::NoData);
    }

    #[test]
    fn detail_shows_untimed_modules_whole() {
        let table = parse_table("id pekerja,depoh\nW1,Kepong\nW2,Kepong\n").unwrap();
        let config = ModuleConfig {
            name: "Raw".into(),
            label: "RW".into(),
            source: None,
        };
        let raw = build_module(&config, table, &ColumnConfig::default(), false, &mut Vec::new());
        let range = DateRange::new(date(2030, 1, 1), date(2030, 1, 2));

        let DetailView::Data(view) = detail(&raw, Some(&range), None, &ColumnConfig::default()) else {
            panic!("expected rows");
        };
        assert_eq!(view.rows.len(), 2);
        assert_eq!(view.distinct_sites, 1);
        assert!(!view.date_filtered);
    }

    #[test]
    fn combined_view_stacks_every_module() {
        let safety = module(
            "Safety",
            &["2024-01-01,W1,Aminah,Kepong,3/5", "2024-03-01,W2,Badrul,Cheras,4/5"],
        );
        let table = parse_table("id pekerja,depoh,catatan\nW3,Ampang,late\n").unwrap();
        let config = ModuleConfig {
            name: "Raw".into(),
            label: "RW".into(),
            source: None,
        };
        let raw = build_module(&config, table, &ColumnConfig::default(), false, &mut Vec::new());
        let modules = vec![safety, ModuleData::empty("Fuel", "FL"), raw];
        let range = DateRange::new(date(2024, 1, 1), date(2024, 1, 31));
        let columns = ColumnConfig::default();

        let DetailView::Data(view) = combined(&modules, Some(&range), None, &columns) else {
            panic!("expected rows");
        };
        assert_eq!(view.module, ALL_MODULES);
        assert_eq!(
            view.headers,
            vec!["module", "timestamp", "id pekerja", "nama", "depoh", "total score", "catatan"]
        );
        assert_eq!(view.entries, 2);
        assert_eq!(view.rows[0][0], "Safety");
        assert_eq!(view.rows[0][2], "W1");
        assert_eq!(
            view.rows[1],
            vec!["Raw", "", "W3", "", "Ampang", "", "late"]
        );
        assert_eq!(view.distinct_sites, 2);
        assert!(!view.date_filtered);

        let DetailView::Data(view) = combined(&modules, Some(&range), Some("w3"), &columns) else {
            panic!("expected rows");
        };
        assert_eq!(view.entries, 1);
        assert_eq!(view.rows[0][0], "Raw");

        assert_eq!(
            combined(&modules[..2], Some(&range), Some("zzz"), &columns),
            DetailView::NoData
        );
    }

    #[test]
    fn detail_of_empty_module_reports_no_data() {
        let empty = ModuleData::empty("E", "E");
        assert_eq!(detail(&empty, None, None, &ColumnConfig::default()), DetailView::NoData);
    }
}
