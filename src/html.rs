//! HTML page rendering
//!
//! Builds a self-contained page (inline CSS, no scripts) for the summary,
//! single-module detail and all-modules views. Charts are drawn with plain CSS so the page works offline.

use std::fmt::Write;

use crate::dates::DateRange;
use crate::error::LoadIssue;
use crate::models::{DetailView, Overview, SiteSummary, SummaryTable};
use crate::reconcile::ALL_MODULES;
use crate::report::{overview, summarize_by_site};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum View {
    Summary,
    Detail,
    All,
}

impl View {
    pub fn parse(value: Option<&str>) -> Self {
        match value {
            Some(v) if v.eq_ignore_ascii_case("detail") => Self::Detail,
            Some(v) if v.eq_ignore_ascii_case("all") => Self::All,
            _ => Self::Summary,
        }
    }
}

pub enum PageBody<'a> {
    Summary(&'a SummaryTable),
    Detail {
        module: &'a str,
        view: &'a DetailView,
    },
    /// Raw rows of every module stacked together.
    All(&'a DetailView),
}

impl PageBody<'_> {
    fn view(&self) -> View {
        match self {
            Self::Summary(_) => View::Summary,
            Self::Detail { .. } => View::Detail,
            Self::All(_) => View::All,
        }
    }
}

pub struct Page<'a> {
    pub body: PageBody<'a>,
    /// Declared module names, for the module selector.
    pub modules: &'a [String],
    pub range: Option<DateRange>,
    pub search: Option<&'a str>,
    pub issues: &'a [LoadIssue],
    /// Set when the page is served, enabling the filter form.
    pub interactive: bool,
}

pub fn render_page(page: &Page) -> String {
    let (title, content) = match &page.body {
        PageBody::Summary(summary) => ("Summary".to_string(), render_summary(summary)),
        PageBody::Detail { module, view } => (
            format!("Detail: {}", escape(module)),
            render_detail(module, view),
        ),
        PageBody::All(view) => (ALL_MODULES.to_string(), render_detail(ALL_MODULES, view)),
    };

    format!(
        r#"<!DOCTYPE html>
<html lang="en">
<head>
    <meta charset="UTF-8">
    <meta name="viewport" content="width=device-width, initial-scale=1.0">
    <title>Assessment Tracker - {title}</title>
    <style>{css}</style>
</head>
<body>
    <aside>
        <h2>Navigation</h2>
        {sidebar}
    </aside>
    <main>
        <h1>Assessment Tracker</h1>
        <p class="meta">{window}</p>
        {content}
        {issues}
    </main>
</body>
</html>"#,
        title = title,
        css = inline_css(),
        sidebar = render_sidebar(page),
        window = escape(&describe_window(page.range)),
        content = content,
        issues = render_issues(page.issues),
    )
}

fn describe_window(range: Option<DateRange>) -> String {
    match range {
        Some(range) => format!("Showing records {}", describe_range(&range)),
        None => "No dated records available".to_string(),
    }
}

fn describe_range(range: &DateRange) -> String {
    match (range.start_bound(), range.end_bound()) {
        (Some(_), Some(_)) => format!("from {range}"),
        _ => range.to_string(),
    }
}

fn render_sidebar(page: &Page) -> String {
    if !page.interactive {
        return "<p>Static export of the summary view.</p>".to_string();
    }

    let view = page.body.view();
    let selected_module = match &page.body {
        PageBody::Detail { module, .. } => Some(*module),
        PageBody::Summary(_) | PageBody::All(_) => None,
    };
    let checked = |v: View| if v == view { " checked" } else { "" };

    let mut options = String::new();
    for name in page.modules {
        let selected = if Some(name.as_str()) == selected_module {
            " selected"
        } else {
            ""
        };
        let _ = write!(
            options,
            r#"<option value="{0}"{1}>{0}</option>"#,
            escape(name),
            selected
        );
    }

    let start = page.range.and_then(|r| r.start_bound());
    let end = page.range.and_then(|r| r.end_bound());
    let params: Vec<String> = [("start", start), ("end", end)]
        .into_iter()
        .filter_map(|(name, date)| date.map(|d| format!("{name}={d}")))
        .collect();
    let csv_link = if params.is_empty() {
        "/summary.csv".to_string()
    } else {
        format!("/summary.csv?{}", params.join("&"))
    };
    let (start, end) = (
        start.map(|d| d.to_string()).unwrap_or_default(),
        end.map(|d| d.to_string()).unwrap_or_default(),
    );

    format!(
        r#"<form method="get" action="/">
            <fieldset>
                <legend>View</legend>
                <label><input type="radio" name="view" value="summary"{summary_checked}> Summary</label>
                <label><input type="radio" name="view" value="detail"{detail_checked}> Detail</label>
                <label><input type="radio" name="view" value="all"{all_checked}> All modules</label>
            </fieldset>
            <label>Module
                <select name="module">{options}</select>
            </label>
            <label>From <input type="date" name="start" value="{start}"></label>
            <label>To <input type="date" name="end" value="{end}"></label>
            <label>Search worker ID <input type="text" name="q" value="{search}"></label>
            <button type="submit">Apply</button>
        </form>
        <p><a href="{csv_link}">Download summary CSV</a> | <a href="/refresh">Reload sources</a></p>"#,
        summary_checked = checked(View::Summary),
        detail_checked = checked(View::Detail),
        all_checked = checked(View::All),
        options = options,
        start = start,
        end = end,
        search = escape(page.search.unwrap_or("")),
        csv_link = csv_link,
    )
}

fn render_summary(summary: &SummaryTable) -> String {
    if summary.is_empty() {
        return r#"<p class="empty">No data for this selection.</p>"#.to_string();
    }

    let overview = overview(summary);
    let sites = summarize_by_site(summary);

    format!(
        r#"{metrics}
        <section class="charts">
            {progress}
            {pie}
            {bars}
        </section>
        {table}"#,
        metrics = render_metrics(&overview),
        progress = render_overall_progress(&overview),
        pie = render_change_pie(&overview),
        bars = render_site_bars(&sites),
        table = render_summary_table(summary),
    )
}

fn render_metrics(overview: &Overview) -> String {
    let cards = [
        ("Workers", overview.workers.to_string()),
        ("Attempts", overview.attempts.to_string()),
        ("Average before", format!("{:.1}%", overview.avg_percent_pre)),
        ("Average latest", format!("{:.1}%", overview.avg_percent_post)),
    ];

    let mut html = String::from(r#"<section class="metrics">"#);
    for (label, value) in cards {
        let _ = write!(
            html,
            r#"<div class="metric"><span class="label">{label}</span><span class="value">{value}</span></div>"#
        );
    }
    html.push_str("</section>");
    html
}

fn progress_bar(percent: f64) -> String {
    let width = percent.clamp(0.0, 100.0);
    format!(
        r#"<div class="progress"><div class="fill" style="width: {width:.1}%"></div><span>{percent:.1}%</span></div>"#
    )
}

fn render_overall_progress(overview: &Overview) -> String {
    format!(
        r#"<div class="chart"><h3>Average latest score</h3>{}</div>"#,
        progress_bar(overview.avg_percent_post)
    )
}

fn render_change_pie(overview: &Overview) -> String {
    let total = (overview.improved + overview.unchanged + overview.declined).max(1) as f64;
    let improved = 100.0 * overview.improved as f64 / total;
    let unchanged = improved + 100.0 * overview.unchanged as f64 / total;

    format!(
        r#"<div class="chart">
            <h3>Change since first attempt</h3>
            <div class="pie" style="background: conic-gradient(#16a34a 0 {improved:.1}%, #9ca3af {improved:.1}% {unchanged:.1}%, #dc2626 {unchanged:.1}% 100%)"></div>
            <ul class="legend">
                <li><span class="swatch improved"></span>Improved {i}</li>
                <li><span class="swatch unchanged"></span>Unchanged {u}</li>
                <li><span class="swatch declined"></span>Declined {d}</li>
            </ul>
        </div>"#,
        i = overview.improved,
        u = overview.unchanged,
        d = overview.declined,
    )
}

fn render_site_bars(sites: &[SiteSummary]) -> String {
    let mut html = String::from(r#"<div class="chart"><h3>Latest score by site</h3><div class="bars">"#);
    for site in sites {
        let _ = write!(
            html,
            r#"<div class="bar-row"><span class="bar-label">{name} ({workers})</span>{bar}</div>"#,
            name = escape(&site.site),
            workers = site.workers,
            bar = progress_bar(site.avg_percent_post),
        );
    }
    html.push_str("</div></div>");
    html
}

fn render_summary_table(summary: &SummaryTable) -> String {
    let mut head = String::from("<th>ID</th><th>Name</th><th>Site</th><th>Attempts</th>");
    for module in &summary.modules {
        let _ = write!(
            head,
            r#"<th title="{name}">{label} pre</th><th title="{name}">{label} post</th>"#,
            name = escape(&module.name),
            label = escape(&module.label),
        );
    }
    head.push_str("<th>Total pre</th><th>Total post</th><th>% pre</th><th>% post</th>");

    let mut body = String::new();
    for row in &summary.rows {
        let _ = write!(
            body,
            "<tr><td>{}</td><td>{}</td><td>{}</td><td>{}</td>",
            escape(&row.worker_id),
            escape(&row.full_name),
            escape(&row.site),
            row.attempts_label()
        );
        for score in &row.scores {
            let _ = write!(body, "<td>{:.1}</td><td>{:.1}</td>", score.pre, score.post);
        }
        let _ = write!(
            body,
            "<td>{:.1}</td><td>{:.1}</td><td>{:.1}%</td><td>{}</td></tr>",
            row.total_pre,
            row.total_post,
            row.percent_pre,
            progress_bar(row.percent_post)
        );
    }

    format!(
        r#"<section><h2>Workers</h2><table><thead><tr>{head}</tr></thead><tbody>{body}</tbody></table></section>"#
    )
}

fn render_detail(module: &str, view: &DetailView) -> String {
    let detail = match view {
        DetailView::Data(detail) => detail,
        DetailView::NoData => {
            return format!(
                r#"<h2>Showing data for: {}</h2><p class="empty">No data for this selection.</p>"#,
                escape(module)
            );
        }
    };

    let mut head = String::new();
    for header in &detail.headers {
        let _ = write!(head, "<th>{}</th>", escape(header));
    }
    let mut body = String::new();
    for row in &detail.rows {
        body.push_str("<tr>");
        for cell in row {
            let _ = write!(body, "<td>{}</td>", escape(cell));
        }
        body.push_str("</tr>");
    }
    let note = match (detail.date_filtered, module == ALL_MODULES) {
        (true, _) => "",
        (false, false) => {
            r#"<p class="meta">This module has no timestamp column; all rows are shown.</p>"#
        }
        (false, true) => {
            r#"<p class="meta">Modules without a timestamp column are shown unfiltered.</p>"#
        }
    };

    format!(
        r#"<h2>Showing data for: {module}</h2>
        <section class="metrics">
            <div class="metric"><span class="label">Total entries</span><span class="value">{entries}</span></div>
            <div class="metric"><span class="label">Total sites</span><span class="value">{sites}</span></div>
        </section>
        {note}
        <table><thead><tr>{head}</tr></thead><tbody>{body}</tbody></table>"#,
        module = escape(&detail.module),
        entries = detail.entries,
        sites = detail.distinct_sites,
    )
}

fn render_issues(issues: &[LoadIssue]) -> String {
    if issues.is_empty() {
        return String::new();
    }
    let mut html = String::from(r#"<section class="issues"><h2>Data issues</h2><ul>"#);
    for issue in issues {
        let _ = write!(html, "<li>{}</li>", escape(&issue.to_string()));
    }
    html.push_str("</ul></section>");
    html
}

pub fn escape(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for ch in text.chars() {
        match ch {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            _ => out.push(ch),
        }
    }
    out
}

fn inline_css() -> &'static str {
    r#"
* { box-sizing: border-box; margin: 0; padding: 0; }
body { display: flex; font-family: system-ui, -apple-system, 'Segoe UI', sans-serif; color: #111827; background: #f9fafb; }
aside { width: 260px; min-height: 100vh; padding: 1.5rem; background: #1f2937; color: #f9fafb; }
aside label, aside fieldset { display: block; margin-bottom: 0.75rem; border: none; }
aside input, aside select, aside button { width: 100%; padding: 0.35rem; margin-top: 0.25rem; }
aside a { color: #93c5fd; }
main { flex: 1; padding: 2rem; overflow-x: auto; }
h1 { font-size: 1.75rem; margin-bottom: 0.25rem; }
h2 { font-size: 1.25rem; margin: 1.5rem 0 0.75rem; }
h3 { font-size: 1rem; margin-bottom: 0.5rem; }
.meta { color: #6b7280; font-size: 0.875rem; }
.empty { padding: 1rem; background: #fef3c7; border-radius: 6px; margin-top: 1rem; }
.metrics { display: flex; gap: 1rem; margin-top: 1rem; }
.metric { flex: 1; padding: 1rem; background: #fff; border: 1px solid #e5e7eb; border-radius: 8px; }
.metric .label { display: block; color: #6b7280; font-size: 0.8rem; }
.metric .value { font-size: 1.5rem; font-weight: 700; }
.charts { display: grid; grid-template-columns: repeat(3, 1fr); gap: 1rem; margin-top: 1rem; }
.chart { padding: 1rem; background: #fff; border: 1px solid #e5e7eb; border-radius: 8px; }
.progress { position: relative; height: 1.25rem; min-width: 120px; background: #e5e7eb; border-radius: 4px; overflow: hidden; }
.progress .fill { height: 100%; background: #2563eb; }
.progress span { position: absolute; top: 0; left: 0.4rem; font-size: 0.75rem; line-height: 1.25rem; }
.pie { width: 140px; height: 140px; border-radius: 50%; margin: 0 auto 0.5rem; }
.legend { list-style: none; font-size: 0.85rem; }
.swatch { display: inline-block; width: 0.75rem; height: 0.75rem; margin-right: 0.4rem; border-radius: 2px; }
.swatch.improved { background: #16a34a; }
.swatch.unchanged { background: #9ca3af; }
.swatch.declined { background: #dc2626; }
.bar-row { display: flex; align-items: center; gap: 0.5rem; margin-bottom: 0.4rem; }
.bar-label { width: 40%; font-size: 0.85rem; }
.bar-row .progress { flex: 1; }
table { width: 100%; border-collapse: collapse; margin-top: 0.5rem; background: #fff; font-size: 0.85rem; }
th, td { padding: 0.4rem 0.6rem; border-bottom: 1px solid #e5e7eb; text-align: left; white-space: nowrap; }
th { background: #f3f4f6; }
.issues li { color: #b45309; margin-left: 1.25rem; }
"#
}
