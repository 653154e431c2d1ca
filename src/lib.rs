pub mod artifact;
pub mod clean;
pub mod cli;
pub mod error;
pub mod ingest;
pub mod metrics;
pub mod period;
pub mod record;
pub mod table;
pub mod temporal;

use std::{env, sync::OnceLock};

use anyhow::{Context, Result};
use chrono::Utc;
use clap::Parser;
use log::{LevelFilter, info};

pub use crate::error::{IngestionError, SchemaError};
pub use crate::record::{CleanRecordSet, InstantColumns, TransactionRecord};

use crate::cli::{Cli, Commands};

static LOGGER: OnceLock<()> = OnceLock::new();

fn init_logging() {
    LOGGER.get_or_init(|| {
        let mut builder = env_logger::Builder::from_env(env_logger::Env::default());
        if env::var("RUST_LOG").is_err() {
            builder.filter_module("blast_report", LevelFilter::Info);
        }
        let _ = builder.format_timestamp_millis().try_init();
    });
}

pub fn run() -> Result<()> {
    init_logging();
    let cli = Cli::parse();
    match cli.command {
        Commands::Report(args) => handle_report(&args),
        Commands::Pack(args) => handle_pack(&args),
        Commands::Inspect(args) => handle_inspect(&args),
    }
}

fn handle_report(args: &cli::ReportArgs) -> Result<()> {
    info!("Reading report from '{}'", args.input.display());
    let raw = ingest::from_path(&args.input)
        .with_context(|| format!("Ingesting {:?}", args.input))?;
    let set = clean::normalize(&raw).with_context(|| format!("Normalizing {:?}", args.input))?;
    let set = period::annotate_periods(&set);

    let filtered = period::filter_by_period(&set, args.year, args.month, args.week);
    let filtered = period::filter_by_template(&filtered, args.template.as_deref());
    info!(
        "{} of {} record(s) remain after filters",
        filtered.len(),
        set.len()
    );

    let kpis = metrics::compute_kpis(&filtered);
    println!("KPIs");
    table::print_table(
        &[String::from("metric"), String::from("value")],
        &[
            vec![String::from("total"), kpis.total.to_string()],
            vec![String::from("delivered"), kpis.delivered.to_string()],
            vec![String::from("failed"), kpis.failed.to_string()],
            vec![String::from("read"), kpis.read.to_string()],
            vec![String::from("unread"), kpis.unread.to_string()],
            vec![String::from("delivery_rate"), format!("{:.4}", kpis.delivery_rate)],
            vec![String::from("read_rate"), format!("{:.4}", kpis.read_rate)],
            vec![String::from("avg_rate"), format!("{:.4}", kpis.avg_rate)],
            vec![String::from("total_cost"), format!("{:.2}", kpis.total_cost)],
        ],
    );

    println!("\nStatus breakdown");
    let status_rows: Vec<Vec<String>> = metrics::status_breakdown(&filtered)
        .into_iter()
        .map(|entry| vec![entry.status, entry.count.to_string()])
        .collect();
    table::print_table(&[String::from("status"), String::from("count")], &status_rows);

    println!("\nCategory breakdown");
    let category_rows: Vec<Vec<String>> = metrics::category_breakdown(&filtered)
        .into_iter()
        .map(|agg| {
            vec![
                agg.category,
                agg.total.to_string(),
                agg.delivered.to_string(),
                format!("{:.2}", agg.rate_sum),
            ]
        })
        .collect();
    table::print_table(
        &[
            String::from("category"),
            String::from("total"),
            String::from("delivered"),
            String::from("rate_sum"),
        ],
        &category_rows,
    );

    println!("\nRead activity by hour block");
    let hourly_rows: Vec<Vec<String>> = metrics::hourly_activity(&filtered)
        .into_iter()
        .map(|bucket| vec![bucket.label, bucket.read.to_string()])
        .collect();
    table::print_table(&[String::from("block"), String::from("read")], &hourly_rows);

    if args.recent > 0 {
        println!("\nMost recent messages");
        let recent_rows: Vec<Vec<String>> = period::recent_messages(&filtered, args.recent)
            .into_iter()
            .map(|record| {
                vec![
                    record
                        .sent_at
                        .map(|at| at.format("%Y-%m-%d %H:%M:%S").to_string())
                        .unwrap_or_default(),
                    record.msisdn,
                    record.template_name,
                    record.delivery_status,
                ]
            })
            .collect();
        table::print_table(
            &[
                String::from("sent_at (utc)"),
                String::from("msisdn"),
                String::from("template"),
                String::from("delivery_status"),
            ],
            &recent_rows,
        );
    }
    Ok(())
}

fn handle_pack(args: &cli::PackArgs) -> Result<()> {
    let raw = ingest::from_path(&args.input)
        .with_context(|| format!("Ingesting {:?}", args.input))?;
    let set = clean::normalize(&raw).with_context(|| format!("Normalizing {:?}", args.input))?;
    let set = period::annotate_periods(&set);
    let kpis = metrics::compute_kpis(&set);

    let label = args
        .label
        .clone()
        .unwrap_or_else(|| Utc::now().format("%Y-%m-%d %H:%M").to_string());
    let source_filename = args
        .input
        .file_name()
        .and_then(|name| name.to_str())
        .unwrap_or("upload")
        .to_string();
    let mut metadata = artifact::ReportMetadata::new(label, source_filename);
    metadata.clean_storage_path = args
        .artifact
        .file_name()
        .and_then(|name| name.to_str())
        .map(String::from);
    metadata.metrics = Some(kpis);

    artifact::write_columnar(&args.artifact, &set)
        .with_context(|| format!("Writing artifact to {:?}", args.artifact))?;
    metadata
        .save(&args.meta)
        .with_context(|| format!("Writing metadata to {:?}", args.meta))?;
    info!(
        "Packed {} record(s) into {:?} (metadata {:?})",
        set.len(),
        args.artifact,
        args.meta
    );
    Ok(())
}

fn handle_inspect(args: &cli::InspectArgs) -> Result<()> {
    let set = artifact::read_columnar(&args.artifact)
        .with_context(|| format!("Reading artifact {:?}", args.artifact))?;
    info!("Loaded {} record(s) from {:?}", set.len(), args.artifact);

    if let Some(meta_path) = &args.meta {
        let metadata = artifact::ReportMetadata::load(meta_path)
            .with_context(|| format!("Loading metadata from {meta_path:?}"))?;
        println!("Report {} ({})", metadata.id, metadata.period_label);
        println!(
            "Source '{}' uploaded by {} at {}",
            metadata.source_filename,
            metadata.uploaded_by,
            metadata.uploaded_at.format("%Y-%m-%d %H:%M:%S")
        );
    }

    let kpis = metrics::compute_kpis(&set);
    table::print_table(
        &[String::from("metric"), String::from("value")],
        &[
            vec![String::from("records"), set.len().to_string()],
            vec![String::from("delivered"), kpis.delivered.to_string()],
            vec![String::from("failed"), kpis.failed.to_string()],
            vec![String::from("read"), kpis.read.to_string()],
            vec![String::from("unread"), kpis.unread.to_string()],
            vec![String::from("total_cost"), format!("{:.2}", kpis.total_cost)],
        ],
    );
    Ok(())
}
