use crate::models::SummaryTable;

/// Flatten the summary into CSV with one pre/post column pair per module.
pub fn summary_csv(summary: &SummaryTable) -> anyhow::Result<String> {
    let mut writer = csv::Writer::from_writer(Vec::new());

    let mut header = vec![
        "worker_id".to_string(),
        "full_name".to_string(),
        "site".to_string(),
        "attempts".to_string(),
    ];
    for module in &summary.modules {
        header.push(format!("{} pre", module.label));
        header.push(format!("{} post", module.label));
    }
    header.extend(
        ["total_pre", "total_post", "percent_pre", "percent_post"]
            .iter()
            .map(|s| s.to_string()),
    );
    writer.write_record(&header)?;

    for row in &summary.rows {
        let mut record = vec![
            row.worker_id.clone(),
            row.full_name.clone(),
            row.site.clone(),
            row.attempts_label(),
        ];
        for score in &row.scores {
            record.push(format!("{:.1}", score.pre));
            record.push(format!("{:.1}", score.post));
        }
        for value in [row.total_pre, row.total_post, row.percent_pre, row.percent_post] {
            record.push(format!("{value:.1}"));
        }
        writer.write_record(&record)?;
    }

    let bytes = writer
        .into_inner()
        .map_err(|err| anyhow::anyhow!("failed to flush CSV: {}", err.error()))?;
    Ok(String::from_utf8(bytes)?)
}
