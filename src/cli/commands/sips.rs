use chrono::NaiveDate;
use clap::Args;
use rust_decimal::Decimal;
use serde_json::json;

use crate::cli::client::ApiClient;
use crate::cli::utils::{output_empty_collection, output_success, print_summary_table};
use crate::cli::OutputFormat;
use crate::database::models::NewSipPlan;

#[derive(Args)]
pub struct CreateArgs {
    #[arg(long, help = "Scheme name")]
    pub scheme: String,

    #[arg(long, help = "Monthly amount, e.g. 5000 or 2500.50")]
    pub amount: Decimal,

    #[arg(long, help = "Start date (YYYY-MM-DD)")]
    pub start: NaiveDate,
}

#[derive(Args)]
pub struct SummaryArgs {
    #[arg(long, help = "Reference date (YYYY-MM-DD), defaults to today on the server")]
    pub as_of: Option<NaiveDate>,
}

pub async fn create(client: &ApiClient, args: CreateArgs, output_format: OutputFormat) -> anyhow::Result<()> {
    let plan = NewSipPlan {
        scheme_name: args.scheme,
        monthly_amount: args.amount,
        start_date: args.start,
    };

    let created = client.create_sip(&plan).await?;

    output_success(
        output_format,
        &format!(
            "Created SIP {} for '{}' ({} / month from {})",
            created.id, created.scheme_name, created.monthly_amount, created.start_date
        ),
        Some(json!({ "sip": created })),
    )
}

pub async fn summary(client: &ApiClient, args: SummaryArgs, output_format: OutputFormat) -> anyhow::Result<()> {
    let summaries = client.summary(args.as_of).await?;

    if summaries.is_empty() {
        return output_empty_collection(output_format, "summary", "No SIP plans found");
    }

    match output_format {
        OutputFormat::Json => {
            println!("{}", serde_json::to_string_pretty(&json!({ "summary": summaries }))?);
        }
        OutputFormat::Text => print_summary_table(&summaries),
    }
    Ok(())
}

pub async fn health(client: &ApiClient, output_format: OutputFormat) -> anyhow::Result<()> {
    let body = client.health().await?;
    let status = body.get("status").and_then(|s| s.as_str()).unwrap_or("unknown").to_string();

    output_success(
        output_format,
        &format!("{} is {}", client.base_url(), status),
        Some(json!({ "health": body })),
    )
}
