use anyhow::Result;
use awql_report::{Client, DateRange};
use tracing_subscriber::EnvFilter;

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .init();

    // Configure credentials via ADWORDS_* env vars or an `.adwordsrc` file.
    let mut client = Client::from_env()?;

    let report = client
        .awql()
        .select(["Date", "Clicks", "Impressions", "Cost"])
        .from("ACCOUNT_PERFORMANCE_REPORT")
        .where_("Impressions>0")
        .during(DateRange::Last30Days)
        .send()?;

    println!("{} ({}), total {}", report.report_name, report.timeframe, report.total);
    for row in &report.records {
        println!(
            "{}\t{}\t{}\t{}",
            row["date"], row["clicks"], row["impressions"], row["cost"]
        );
    }

    // Persist these to skip the refresh next run.
    println!("{}", serde_json::to_string_pretty(&report.auth)?);
    Ok(())
}
