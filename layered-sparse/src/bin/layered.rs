//! Layered CLI - inspect Matrix Market count matrices in layered sparse form

use std::path::{Path, PathBuf};
use std::time::Instant;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use layered_sparse::{
    checked_column, checked_row, convert_to_layered_sparse,
    read_compressed_sparse_from_matrix_market_file, read_layered_sparse_from_matrix_market_file,
    Compression, LayerSummary, LayeredConfig, LayeredMatrix, ReadOptions, SparseVector,
};
use tracing::info;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(author, version, long_about = None)]
#[command(about = "Layered CLI - load Matrix Market count matrices into layered sparse storage")]
struct Cli {
    /// Columns per chunk (overrides layered.toml / LAYERED_CHUNK_SIZE)
    #[arg(long, global = true)]
    chunk_size: Option<usize>,

    /// Input compression
    #[arg(long, value_enum, global = true)]
    compression: Option<Compression>,

    /// Read buffer size in bytes
    #[arg(long, global = true)]
    buffer_size: Option<usize>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Show layer statistics of a matrix
    Info {
        /// Matrix Market file, optionally gzipped
        path: PathBuf,

        /// Print the summary as JSON
        #[arg(long)]
        json: bool,
    },
    /// Load a matrix in compressed form, then convert it with worker threads
    Convert {
        path: PathBuf,

        /// Worker threads (overrides layered.toml / LAYERED_NUM_THREADS)
        #[arg(long)]
        threads: Option<usize>,

        /// Read the file into a column-major matrix first
        #[arg(long)]
        by_column: bool,

        /// Print the summary as JSON
        #[arg(long)]
        json: bool,
    },
    /// Print the non-zero entries of a row
    Row {
        path: PathBuf,

        /// 0-based row index
        #[arg(long)]
        index: usize,
    },
    /// Print the non-zero entries of a column
    Column {
        path: PathBuf,

        /// 0-based column index
        #[arg(long)]
        index: usize,
    },
}

impl Cli {
    fn read_options(&self, config: &LayeredConfig) -> ReadOptions {
        let mut options = config.read_options();
        if let Some(chunk_size) = self.chunk_size {
            options = options.with_chunk_size(chunk_size);
        }
        if let Some(compression) = self.compression {
            options = options.with_compression(compression);
        }
        if let Some(buffer_size) = self.buffer_size {
            options = options.with_buffer_size(buffer_size);
        }
        options
    }
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_target(false)
        .with_writer(std::io::stderr)
        .compact()
        .init();

    let cli = Cli::parse();
    let config = LayeredConfig::load().context("failed to load configuration")?;
    let options = cli.read_options(&config);
    let start_time = Instant::now();

    match &cli.command {
        Commands::Info { path, json } => print_summary(&load(path, &options)?.summary(), *json)?,
        Commands::Convert {
            path,
            threads,
            by_column,
            json,
        } => {
            let num_threads = threads.unwrap_or(config.num_threads);
            let summary = handle_convert(path, &options, !*by_column, num_threads)?;
            print_summary(&summary, *json)?;
        }
        Commands::Row { path, index } => {
            let matrix = load(path, &options)?;
            let entries = checked_row(&matrix, *index)
                .with_context(|| format!("row {index} is out of range"))?;
            print_entries("row", *index, &entries);
        }
        Commands::Column { path, index } => {
            let matrix = load(path, &options)?;
            let entries = checked_column(&matrix, *index)
                .with_context(|| format!("column {index} is out of range"))?;
            print_entries("column", *index, &entries);
        }
    }

    info!(elapsed = ?start_time.elapsed(), "done");
    Ok(())
}

fn load(path: &Path, options: &ReadOptions) -> Result<LayeredMatrix<u32, u16>> {
    read_layered_sparse_from_matrix_market_file(path, options)
        .with_context(|| format!("failed to read {}", path.display()))
}

fn handle_convert(
    path: &Path,
    options: &ReadOptions,
    row_major: bool,
    num_threads: usize,
) -> Result<LayerSummary> {
    let compressed =
        read_compressed_sparse_from_matrix_market_file::<u32, _>(path, options, row_major)
            .with_context(|| format!("failed to read {}", path.display()))?;
    let convert_start = Instant::now();
    let layered = convert_to_layered_sparse::<u32, _>(&compressed, num_threads)
        .context("conversion failed")?;
    info!(num_threads, row_major, elapsed = ?convert_start.elapsed(), "converted to layered sparse");
    Ok(layered.summary())
}

fn print_summary(summary: &LayerSummary, json: bool) -> Result<()> {
    if json {
        println!("{}", serde_json::to_string_pretty(&summary)?);
        return Ok(());
    }

    println!("Matrix: {} x {}", summary.nrow, summary.ncol);
    println!("Non-zeros: {}", summary.nnz);
    println!(
        "Chunks: {} of up to {} columns",
        summary.num_chunks, summary.chunk_size
    );
    for (name, (rows, nnz)) in ["u8", "u16", "u32"]
        .iter()
        .zip(summary.rows_per_layer.iter().zip(&summary.nnz_per_layer))
    {
        println!("  {name:>3} layer: {rows} row slots, {nnz} values");
    }
    println!("Stored bytes: {}", summary.stored_bytes);
    Ok(())
}

fn print_entries(what: &str, index: usize, entries: &SparseVector<u32>) {
    println!("{} non-zero entries in {what} {index}:", entries.len());
    for (i, value) in entries.iter() {
        println!("  [{i}] = {value}");
    }
}
