use clap::Parser;
use shared::error::{AppError, ErrorCode};
use spool_client::{PresetStore, SpoolmanClient};
use spool_console::args::{Cli, Commands};
use spool_console::commands::{
    ExportRequest, export_job, prepare_job, preview_json, run_presets, timestamped_dir,
};
use spool_console::{Config, setup_environment};
use tokio_util::sync::CancellationToken;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // .env before clap so env fallbacks see it
    dotenvy::dotenv().ok();
    let cli = Cli::parse();

    let mut config = Config::from_env();
    if let Some(url) = &cli.url {
        config.spoolman_url = url.clone();
    }
    setup_environment(&config, cli.verbose)?;
    tracing::debug!(url = %config.spoolman_url, "Configuration loaded");

    let client_config = config.client_config();
    let client = SpoolmanClient::new(&client_config)?;
    let store = PresetStore::new(client.clone());

    let cancel = CancellationToken::new();
    let on_signal = cancel.clone();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            tracing::warn!("Interrupted, stopping after the current label");
            on_signal.cancel();
        }
    });

    match cli.command {
        Commands::Presets(command) => {
            for line in run_presets(&store, command).await? {
                println!("{}", line);
            }
        }
        Commands::Preview(job) => {
            let job = prepare_job(&client, &store, &job, client_config.link_base(), &cancel).await?;
            println!("{}", preview_json(&job)?);
        }
        Commands::Export {
            job,
            format,
            dpi,
            out,
            per_page,
        } => {
            let out_dir = out.unwrap_or_else(|| timestamped_dir(&config.export_dir, job.kind));
            let request = ExportRequest {
                format: format.into(),
                dpi: dpi.unwrap_or(config.export_dpi),
                per_page,
                out_dir,
            };
            let job = prepare_job(&client, &store, &job, client_config.link_base(), &cancel).await?;
            let summary = export_job(job, &request, &cancel).await?;

            for path in &summary.written {
                println!("{}", path.display());
            }
            for failure in &summary.failures {
                eprintln!("failed: {}", failure);
            }
            if summary.cancelled {
                let err = AppError::new(ErrorCode::ExportCancelled)
                    .with_detail("written", summary.written.len());
                return Err(err.into());
            }
            if !summary.failures.is_empty() {
                anyhow::bail!("{} labels failed", summary.failures.len());
            }
        }
    }

    Ok(())
}
