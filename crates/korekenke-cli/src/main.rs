//! Korekenke CLI: upload and delete files with their thumbnails, list reservations.
//!
//! Configuration comes from the environment (or a `.env` file); see `Config`.

use chrono::NaiveDate;
use clap::{Parser, Subcommand};
use korekenke_cli::{exit_code, init_tracing, report_error, reservations_table, OutputFormat};
use korekenke_core::{AppError, Config, ReservationFilter, UploadSource, UploadTask};
use korekenke_db::ReservationRepository;
use korekenke_services::{DeletionPipeline, UploadError, UploadPipeline};
use korekenke_storage::create_storage;
use serde::Serialize;
use std::io::Write;
use std::path::PathBuf;
use std::process::ExitCode;

#[derive(Parser)]
#[command(name = "korekenke", about = "File pipelines and reservation queries")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Upload a file and, for images, wait for its thumbnail
    Upload {
        /// Path to the file to upload
        file: PathBuf,
        /// Storage directory to upload into
        #[arg(long)]
        path: String,
        /// Stored base name (defaults to the file's name without extension)
        #[arg(long)]
        name: Option<String>,
        /// Thumbnail variant to wait for (defaults to the first configured variant)
        #[arg(long)]
        variant: Option<String>,
        /// Treat the file as an image and resolve its thumbnail
        #[arg(long)]
        image: bool,
    },
    /// Delete a stored file and all of its thumbnails
    Delete {
        /// Storage directory of the file
        #[arg(long)]
        path: String,
        /// Stored file name, extension included
        #[arg(long)]
        name: String,
    },
    /// List reservations, newest first
    Reservations {
        /// Free-text search; matches any word
        #[arg(long)]
        search: Option<String>,
        /// Creation day (YYYY-MM-DD) in the configured timezone
        #[arg(long, value_name = "YYYY-MM-DD")]
        date: Option<NaiveDate>,
        #[arg(long, value_enum, default_value_t = OutputFormat::Table)]
        format: OutputFormat,
    },
}

fn print_json(value: &impl Serialize) -> Result<(), AppError> {
    let out = serde_json::to_string_pretty(value)
        .map_err(|e| AppError::Internal(format!("Failed to serialize output: {}", e)))?;
    println!("{}", out);
    Ok(())
}

#[tokio::main]
async fn main() -> ExitCode {
    init_tracing();

    let cli = Cli::parse();
    let config = match Config::from_env() {
        Ok(config) => config,
        Err(e) => {
            let err = AppError::from(e.context("Failed to load configuration"));
            eprintln!("{}", report_error(&err, false));
            return ExitCode::from(exit_code(&err));
        }
    };
    tracing::debug!(environment = config.environment(), "Configuration loaded");

    match run(cli.command, &config).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            eprintln!("{}", report_error(&err, config.is_production()));
            ExitCode::from(exit_code(&err))
        }
    }
}

async fn run(command: Commands, config: &Config) -> Result<(), AppError> {
    match command {
        Commands::Upload {
            file,
            path,
            name,
            variant,
            image,
        } => {
            let storage = create_storage(config).await?;
            let pipeline = UploadPipeline::from_config(storage, config);
            let task = UploadTask {
                file_path: path,
                file_name: name,
                resize_variant: variant
                    .unwrap_or_else(|| config.thumbnail_variants().primary().to_string()),
                is_image: image,
                source: UploadSource::LocalFile {
                    uid: uuid::Uuid::new_v4().to_string(),
                    path: file,
                },
            };

            let result = pipeline
                .upload(task, &|percent| {
                    eprint!("\rUploading... {:>5.1}%", percent);
                    let _ = std::io::stderr().flush();
                })
                .await;
            eprintln!();

            match result {
                Ok(file) => print_json(&file)?,
                Err(err) => {
                    if let UploadError::Finalize { file, .. } = &err {
                        print_json(&**file)?;
                    }
                    return Err(err.into());
                }
            }
        }
        Commands::Delete { path, name } => {
            let storage = create_storage(config).await?;
            let pipeline = DeletionPipeline::from_config(storage, config);
            let report = pipeline.delete(&path, &name).await;
            print_json(&report)?;
        }
        Commands::Reservations {
            search,
            date,
            format,
        } => {
            let timezone = config.reservations_timezone();
            let pool = korekenke_db::connect(config).await?;
            let repository = ReservationRepository::new(pool, timezone);
            let rows = repository
                .list(&ReservationFilter::new(search, date))
                .await?;

            match format {
                OutputFormat::Json => print_json(&rows)?,
                OutputFormat::Table => print!("{}", reservations_table(&rows, timezone)),
            }
        }
    }

    Ok(())
}
