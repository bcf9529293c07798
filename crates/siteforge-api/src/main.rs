//! Siteforge CLI and webhook server entry point.
//!
//! Binary name: `sforge`
//!
//! Parses CLI arguments, initializes tracing, then either starts the
//! webhook server or reports local configuration status.

mod http;
mod state;

use clap::{Parser, Subcommand};

use state::AppState;

#[derive(Parser)]
#[command(name = "sforge", version, about = "Conversational website builder")]
struct Cli {
    /// Increase log verbosity (-v, -vv)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    /// Only log errors
    #[arg(short, long, global = true)]
    quiet: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Start the webhook server
    Serve {
        #[arg(long, default_value = "0.0.0.0")]
        host: String,

        #[arg(long, default_value_t = 8000)]
        port: u16,
    },

    /// Show configuration and database status
    Status,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    // Set up tracing based on verbosity; RUST_LOG still wins when set.
    let filter = match cli.verbose {
        0 if cli.quiet => "error",
        0 => "info",
        1 => "info,siteforge=debug",
        _ => "trace",
    };
    let enable_otel = std::env::var("SITEFORGE_OTEL").is_ok_and(|v| v == "1");
    siteforge_observe::tracing_setup::init_tracing(filter, enable_otel)
        .map_err(|e| anyhow::anyhow!("failed to initialize tracing: {e}"))?;

    match cli.command {
        Commands::Serve { host, port } => {
            let state = AppState::init().await?;
            let router = http::router::build_router(state);

            let addr = format!("{host}:{port}");
            let listener = tokio::net::TcpListener::bind(&addr).await?;
            tracing::info!(%addr, "siteforge listening");
            axum::serve(listener, router).await?;
        }

        Commands::Status => {
            let data_dir = siteforge_infra::config::resolve_data_dir();
            let db_exists = tokio::fs::try_exists(data_dir.join("siteforge.db"))
                .await
                .unwrap_or(false);
            let config = siteforge_infra::config::load_config(&data_dir).await;

            let check_mark = |ok: bool| {
                if ok {
                    format!("{}", console::style("✓").green())
                } else {
                    format!("{}", console::style("✗").red())
                }
            };

            println!();
            println!(
                "  {} Siteforge status",
                console::style("🌐").bold()
            );
            println!();
            println!(
                "  data dir: {}",
                console::style(data_dir.display()).cyan()
            );
            println!("  {} database exists", check_mark(db_exists));
            println!(
                "  {} supabase_url configured",
                check_mark(config.supabase_url.is_some())
            );
            println!(
                "  {} twilio_account_sid configured",
                check_mark(config.twilio_account_sid.is_some())
            );
            println!(
                "  {} twilio_from_address configured",
                check_mark(config.twilio_from_address.is_some())
            );
            println!(
                "  {} deploy_hook_url configured",
                check_mark(config.deploy_hook_url.is_some())
            );
            println!("  model: {}", config.generation_model);
            println!();
        }
    }

    siteforge_observe::tracing_setup::shutdown_tracing();
    Ok(())
}
