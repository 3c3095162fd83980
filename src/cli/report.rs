use chrono::Local;
use clap::Parser;

use crate::{
    cli::sources::SourceArgs,
    fmt::day_and_month,
    prelude::*,
    tables::{build_monthly_savings_table, build_overview_table, build_prices_table, build_savings_table},
};

#[derive(Parser)]
pub struct ReportArgs {
    /// Tibber home ID, the first home when not set.
    #[clap(long = "home-id", env = "TIBBER_HOME_ID")]
    pub home_id: Option<String>,

    #[clap(flatten)]
    pub sources: SourceArgs,
}

#[instrument(skip_all)]
pub async fn report(args: &ReportArgs) -> Result {
    let dashboard = args.sources.service()?.build(args.home_id.as_deref(), Local::now()).await?;
    let aggregation = &dashboard.aggregation;
    println!("{}", build_prices_table(&dashboard.price_chart));
    println!("{}", build_overview_table(&aggregation.cost, &aggregation.consumption_overview));
    println!("{}", build_savings_table(&aggregation.savings, &day_and_month(dashboard.anchor)));
    println!("{}", build_monthly_savings_table(&aggregation.monthly_savings));
    for report in &dashboard.weather {
        info!(
            location = %report.location,
            temperature = report.current.temperature,
            symbol = %report.current.symbol_code,
            "weather",
        );
    }
    Ok(())
}
