use serde_json::{json, Value};

use crate::cli::OutputFormat;
use crate::summary::SchemeSummary;

/// Output a success message in the appropriate format
pub fn output_success(output_format: OutputFormat, message: &str, data: Option<Value>) -> anyhow::Result<()> {
    match output_format {
        OutputFormat::Json => {
            let mut response = json!({
                "success": true,
                "message": message
            });

            if let (Some(Value::Object(extra)), Some(target)) = (data, response.as_object_mut()) {
                target.extend(extra);
            }

            println!("{}", serde_json::to_string_pretty(&response)?);
        }
        OutputFormat::Text => {
            println!("✓ {}", message);
        }
    }
    Ok(())
}

/// Output an empty collection in the appropriate format
pub fn output_empty_collection(
    output_format: OutputFormat,
    collection_name: &str,
    message: &str,
) -> anyhow::Result<()> {
    match output_format {
        OutputFormat::Json => {
            println!(
                "{}",
                serde_json::to_string_pretty(&json!({
                    collection_name: []
                }))?
            );
        }
        OutputFormat::Text => {
            println!("{}", message);
        }
    }
    Ok(())
}

pub fn print_summary_table(summaries: &[SchemeSummary]) {
    print!("{}", render_summary_table(summaries));
}

fn render_summary_table(summaries: &[SchemeSummary]) -> String {
    let name_width = summaries
        .iter()
        .map(|s| s.scheme_name.chars().count())
        .max()
        .unwrap_or(0)
        .max("SCHEME".len());

    let mut out = format!("{:<name_width$}  {:>16}  {:>6}\n", "SCHEME", "TOTAL INVESTED", "MONTHS");
    for s in summaries {
        out.push_str(&format!(
            "{:<name_width$}  {:>16}  {:>6}\n",
            s.scheme_name,
            s.total_invested.round_dp(2).to_string(),
            s.months_invested
        ));
    }
    out
}
