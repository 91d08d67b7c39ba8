use std::collections::HashMap;
use std::fmt::Write;

use crate::error::LoadIssue;
use crate::models::{Overview, SiteSummary, SummaryTable};
use crate::score::round1;

const UNKNOWN_SITE: &str = "unknown";

pub fn summarize_by_site(summary: &SummaryTable) -> Vec<SiteSummary> {
    let mut map: HashMap<&str, (usize, usize, f64, f64)> = HashMap::new();

    for row in &summary.rows {
        let site = if row.site.is_empty() {
            UNKNOWN_SITE
        } else {
            row.site.as_str()
        };
        let entry = map.entry(site).or_insert((0, 0, 0.0, 0.0));
        entry.0 += 1;
        entry.1 += row.attempt_count;
        entry.2 += row.percent_pre;
        entry.3 += row.percent_post;
    }

    let mut sites: Vec<SiteSummary> = map
        .into_iter()
        .map(|(site, (workers, attempts, pre, post))| SiteSummary {
            site: site.to_string(),
            workers,
            attempts,
            avg_percent_pre: round1(pre / workers as f64),
            avg_percent_post: round1(post / workers as f64),
        })
        .collect();

    sites.sort_by(|a, b| b.workers.cmp(&a.workers).then_with(|| a.site.cmp(&b.site)));
    sites
}

pub fn overview(summary: &SummaryTable) -> Overview {
    let workers = summary.rows.len();
    if workers == 0 {
        return Overview::default();
    }

    let mut result = Overview {
        workers,
        ..Overview::default()
    };
    let mut pre = 0.0;
    let mut post = 0.0;
    for row in &summary.rows {
        result.attempts += row.attempt_count;
        pre += row.percent_pre;
        post += row.percent_post;
        if row.total_post > row.total_pre {
            result.improved += 1;
        } else if row.total_post < row.total_pre {
            result.declined += 1;
        } else {
            result.unchanged += 1;
        }
    }
    result.avg_percent_pre = round1(pre / workers as f64);
    result.avg_percent_post = round1(post / workers as f64);
    result
}

pub fn build_report(summary: &SummaryTable, issues: &[LoadIssue]) -> String {
    let overview = overview(summary);
    let sites = summarize_by_site(summary);

    let mut output = String::new();
    let window = summary
        .range
        .map(|range| range.to_string())
        .unwrap_or_else(|| "all dates".to_string());

    let _ = writeln!(output, "# Assessment Progress Report");
    let _ = writeln!(
        output,
        "Window: {} ({} modules, {} points possible per worker)",
        window,
        summary.modules.len(),
        summary.max_possible
    );
    let _ = writeln!(output);

    if summary.is_empty() {
        let _ = writeln!(output, "No data for this selection.");
    } else {
        let _ = writeln!(output, "## Overview");
        let _ = writeln!(output, "- Workers: {}", overview.workers);
        let _ = writeln!(output, "- Attempts: {}", overview.attempts);
        let _ = writeln!(
            output,
            "- Average score: {:.1}% before, {:.1}% latest",
            overview.avg_percent_pre, overview.avg_percent_post
        );
        let _ = writeln!(
            output,
            "- Improved {}, unchanged {}, declined {}",
            overview.improved, overview.unchanged, overview.declined
        );

        let _ = writeln!(output);
        let _ = writeln!(output, "## By Site");
        for site in &sites {
            let _ = writeln!(
                output,
                "- {}: {} workers, {} attempts, {:.1}% -> {:.1}%",
                site.site, site.workers, site.attempts, site.avg_percent_pre, site.avg_percent_post
            );
        }

        let _ = writeln!(output);
        let _ = writeln!(output, "## Workers");
        let mut header = String::from("| ID | Name | Site | Attempts |");
        let mut divider = String::from("|---|---|---|---|");
        for module in &summary.modules {
            let _ = write!(header, " {0} pre | {0} post |", module.label);
            divider.push_str("---|---|");
        }
        header.push_str(" Total pre | Total post | % pre | % post |");
        divider.push_str("---|---|---|---|");
        let _ = writeln!(output, "{header}");
        let _ = writeln!(output, "{divider}");

        for row in &summary.rows {
            let mut line = format!(
                "| {} | {} | {} | {} |",
                row.worker_id,
                row.full_name,
                row.site,
                row.attempts_label()
            );
            for score in &row.scores {
                let _ = write!(line, " {:.1} | {:.1} |", score.pre, score.post);
            }
            let _ = write!(
                line,
                " {:.1} | {:.1} | {:.1} | {:.1} |",
                row.total_pre, row.total_post, row.percent_pre, row.percent_post
            );
            let _ = writeln!(output, "{line}");
        }
    }

    if !issues.is_empty() {
        let _ = writeln!(output);
        let _ = writeln!(output, "## Data Issues");
        for issue in issues {
            let _ = writeln!(output, "- {issue}");
        }
    }

    output
}
