//! Read-only feedback query handlers.

use super::{excerpt, print_items, PgPipeline};

/// Show the newest feedback.
///
/// # Errors
///
/// Returns an error if the database query fails.
pub(crate) async fn run_list(pipeline: &PgPipeline, limit: u32) -> anyhow::Result<()> {
    let items = pipeline.list(limit).await?;
    if items.is_empty() {
        println!("no feedback stored yet; run `ingest` or `import` first");
        return Ok(());
    }
    print_items(&items);
    Ok(())
}

/// Show scored feedback in queue order.
///
/// # Errors
///
/// Returns an error if the database query fails.
pub(crate) async fn run_prioritized(pipeline: &PgPipeline, limit: u32) -> anyhow::Result<()> {
    let items = pipeline.prioritized(limit).await?;
    if items.is_empty() {
        println!("no scored feedback; run `rescore --all` if items predate scoring");
        return Ok(());
    }
    print_items(&items);
    Ok(())
}

/// Show trailing-window KPIs, as a table or as JSON.
///
/// # Errors
///
/// Returns an error if `days` is out of range or the query fails.
pub(crate) async fn run_kpis(pipeline: &PgPipeline, days: u32, json: bool) -> anyhow::Result<()> {
    let report = pipeline.kpis(days).await?;
    if json {
        println!("{}", serde_json::to_string_pretty(&report)?);
        return Ok(());
    }

    println!("last {} day(s)", report.window_days);
    println!("  total:        {}", report.total);
    println!("  urgent:       {}", report.urgent);
    println!("  positive:     {}", report.positive);
    println!("  negative:     {}", report.negative);
    println!("  avg priority: {:.3}", report.avg_priority);
    if !report.sentiment_over_time.is_empty() {
        println!();
        println!("{:<12}{:<10}ITEMS", "DAY", "SENTIMENT");
        for day in &report.sentiment_over_time {
            let date = day.date.format("%Y-%m-%d").to_string();
            let sentiment = format!("{:+.3}", day.avg_sentiment);
            println!("{date:<12}{sentiment:<10}{}", day.count);
        }
    }
    Ok(())
}

/// Show stored item counts per source.
///
/// # Errors
///
/// Returns an error if the database query fails.
pub(crate) async fn run_status(pipeline: &PgPipeline) -> anyhow::Result<()> {
    let status = pipeline.import_status().await?;
    println!("{} item(s) stored", status.total);
    if status.sources.is_empty() {
        return Ok(());
    }
    println!(
        "{:<24}{:<10}SINCE {}",
        "SOURCE",
        "TOTAL",
        status.recent_since.format("%Y-%m-%d %H:%M")
    );
    for source in &status.sources {
        println!(
            "{:<24}{:<10}{}",
            excerpt(&source.source, 22),
            source.total,
            source.recent
        );
    }
    Ok(())
}
