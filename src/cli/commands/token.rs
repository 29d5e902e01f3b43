use chrono::Duration;
use clap::Args;
use serde_json::json;

use crate::auth::issue_token;
use crate::cli::utils::output_success;
use crate::cli::OutputFormat;
use crate::config::DEVELOPMENT_JWT_SECRET;

#[derive(Args)]
pub struct TokenArgs {
    #[arg(long, help = "Subject (user id) to put in the token")]
    pub user: String,

    #[arg(long, default_value_t = 1, help = "Lifetime in hours")]
    pub hours: i64,

    #[arg(
        long,
        env = "SUPABASE_SECRET_KEY",
        hide_env_values = true,
        default_value = DEVELOPMENT_JWT_SECRET,
        help = "Signing secret"
    )]
    pub secret: String,
}

pub fn handle(args: TokenArgs, output_format: OutputFormat) -> anyhow::Result<()> {
    if args.hours <= 0 {
        anyhow::bail!("--hours must be positive");
    }

    let token = issue_token(&args.user, &args.secret, Duration::hours(args.hours))?;

    match output_format {
        OutputFormat::Json => output_success(
            output_format,
            "Token issued",
            Some(json!({ "token": token, "user_id": args.user, "expires_in": args.hours * 3600 })),
        ),
        OutputFormat::Text => {
            println!("{}", token);
            Ok(())
        }
    }
}
