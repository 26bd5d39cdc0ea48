//! Operator tool: create a superuser in the configured repository.

use anyhow::Context;
use clap::Parser;

use userdesk_api::app::services::build_services;
use userdesk_auth::UserFields;
use userdesk_infra::AppConfig;

#[derive(Debug, Parser)]
#[command(name = "createsuperuser", about = "Create a staff superuser account")]
struct Cli {
    /// Login email of the new superuser.
    #[arg(long)]
    email: String,

    /// Password; falls back to the SUPERUSER_PASSWORD environment variable.
    #[arg(long, env = "SUPERUSER_PASSWORD", hide_env_values = true)]
    password: String,

    #[arg(long)]
    full_name: Option<String>,

    #[arg(long)]
    phone_number: Option<String>,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    userdesk_observability::tracing::init_compact();
    let cli = Cli::parse();

    let config = AppConfig::from_env()?;
    if config.database_url.is_none() {
        anyhow::bail!("DATABASE_URL must be set; an in-memory superuser would be lost on exit");
    }

    let services = build_services(config).await?;
    let extra = UserFields {
        full_name: cli.full_name,
        phone_number: cli.phone_number,
        ..Default::default()
    };

    let user = services
        .create_superuser(&cli.email, &cli.password, extra)
        .await
        .with_context(|| format!("could not create superuser {}", cli.email))?;

    println!("Superuser created: {user}");
    Ok(())
}
