//! Promoview CLI - Summarize promotion CSV exports
//!
//! # Main Commands
//!
//! ```bash
//! promoview serve                          # Start HTTP server (port 3000)
//! promoview summarize input.csv            # Summary + year rollups as JSON
//! promoview summarize input.csv --format csv -o resumo.csv
//! ```
//!
//! # Debug Commands (for development)
//!
//! ```bash
//! promoview parse input.csv                # Just parse CSV to JSON
//! promoview charts input.csv               # Chart series as JSON
//! ```

use clap::{Parser, Subcommand, ValueEnum};
use promoview::{
    build_charts, parse_csv_file_auto, summarize_csv, PipelineOptions, ServerConfig, Summary,
    Variant, SUMMARY_COLUMNS,
};
use std::fs;
use std::path::{Path, PathBuf};

#[derive(Parser)]
#[command(name = "promoview")]
#[command(about = "Summarize promotion CSV exports by channel, category and cycle", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Clone, Copy, ValueEnum)]
enum OutputFormat {
    Json,
    Csv,
}

#[derive(Subcommand)]
enum Commands {
    /// Run the full pipeline: CSV → summary table (+ year rollups)
    Summarize {
        /// Input CSV file
        input: PathBuf,

        /// Basic variant: no cycle normalization, no year rollups
        #[arg(long)]
        basic: bool,

        /// Output format
        #[arg(short, long, value_enum, default_value = "json")]
        format: OutputFormat,

        /// Output file (default: stdout)
        #[arg(short, long)]
        output: Option<PathBuf>,

        /// Also write chart series to this file
        #[arg(long)]
        charts: Option<PathBuf>,

        /// Skip output validation
        #[arg(long)]
        no_validate: bool,
    },

    /// Parse a CSV file and output JSON
    Parse {
        /// Input CSV file
        input: PathBuf,

        /// Output file (default: stdout)
        #[arg(short, long)]
        output: Option<PathBuf>,
    },

    /// Output the chart series for a CSV file
    Charts {
        /// Input CSV file
        input: PathBuf,

        /// Basic variant: no cycle normalization, no year rollups
        #[arg(long)]
        basic: bool,

        /// Output file (default: stdout)
        #[arg(short, long)]
        output: Option<PathBuf>,
    },

    /// Start HTTP server
    Serve {
        /// Port to listen on (default: $PROMOVIEW_PORT or 3000)
        #[arg(short, long)]
        port: Option<u16>,
    },
}

#[tokio::main]
async fn main() {
    // Load .env file (if present)
    dotenvy::dotenv().ok();

    let cli = Cli::parse();

    let result = match cli.command {
        Commands::Summarize {
            input,
            basic,
            format,
            output,
            charts,
            no_validate,
        } => cmd_summarize(
            &input,
            variant(basic),
            format,
            output.as_deref(),
            charts.as_deref(),
            no_validate,
        ),

        Commands::Parse { input, output } => cmd_parse(&input, output.as_deref()),

        Commands::Charts {
            input,
            basic,
            output,
        } => cmd_charts(&input, variant(basic), output.as_deref()),

        Commands::Serve { port } => cmd_serve(port).await,
    };

    if let Err(e) = result {
        eprintln!("❌ Error: {}", e);
        std::process::exit(1);
    }
}

fn variant(basic: bool) -> Variant {
    if basic {
        Variant::Basic
    } else {
        Variant::Extended
    }
}

fn cmd_summarize(
    input: &Path,
    variant: Variant,
    format: OutputFormat,
    output: Option<&Path>,
    charts_output: Option<&Path>,
    no_validate: bool,
) -> Result<(), Box<dyn std::error::Error>> {
    eprintln!("📄 Processing: {}", input.display());

    let options = PipelineOptions {
        variant,
        skip_validation: no_validate,
    };

    let result = summarize_csv(input, options)?;
    let summary = &result.summary;

    eprintln!("\n📊 {} groups", summary.rows.len());
    for total in &summary.year_totals {
        eprintln!("   {}: {:.2}", total.year, total.net_revenue);
    }

    let content = match format {
        OutputFormat::Json => serde_json::to_string_pretty(summary)?,
        OutputFormat::Csv => summary_to_csv(summary)?,
    };
    write_output(&content, output)?;

    if let Some(charts_path) = charts_output {
        let charts = build_charts(summary);
        fs::write(charts_path, serde_json::to_string_pretty(&charts)?)?;
        eprintln!("📈 {} charts saved to: {}", charts.len(), charts_path.display());
    }

    eprintln!("\n✨ Done!");
    Ok(())
}

fn cmd_parse(input: &Path, output: Option<&Path>) -> Result<(), Box<dyn std::error::Error>> {
    eprintln!("📄 Parsing CSV: {}", input.display());

    let result = parse_csv_file_auto(input)?;

    eprintln!("   Encoding: {}", result.encoding);
    eprintln!("   Delimiter: '{}'", promoview::transform::format_delimiter(result.delimiter));
    eprintln!("   Columns: {}", result.table.headers.join(", "));
    eprintln!("✅ Parsed {} rows", result.table.len());

    let json = serde_json::to_string_pretty(&result.table)?;
    write_output(&json, output)?;

    Ok(())
}

fn cmd_charts(input: &Path, variant: Variant, output: Option<&Path>) -> Result<(), Box<dyn std::error::Error>> {
    let options = PipelineOptions {
        variant,
        ..Default::default()
    };

    let result = summarize_csv(input, options)?;
    let charts = build_charts(&result.summary);

    let json = serde_json::to_string_pretty(&charts)?;
    write_output(&json, output)?;

    Ok(())
}

async fn cmd_serve(port: Option<u16>) -> Result<(), Box<dyn std::error::Error>> {
    let config = ServerConfig::from_env().with_port(port);
    promoview::server::start_server(config).await
}

/// Render the summary table as CSV with the dashboard column names.
fn summary_to_csv(summary: &Summary) -> Result<String, Box<dyn std::error::Error>> {
    let mut writer = csv::Writer::from_writer(Vec::new());
    writer.write_record(SUMMARY_COLUMNS)?;
    for row in &summary.rows {
        writer.write_record(row.to_record())?;
    }
    let bytes = writer.into_inner().map_err(|e| e.to_string())?;
    Ok(String::from_utf8(bytes)?)
}

fn write_output(content: &str, path: Option<&Path>) -> Result<(), Box<dyn std::error::Error>> {
    match path {
        Some(p) => {
            fs::write(p, content)?;
            eprintln!("💾 Output written to: {}", p.display());
        }
        None => {
            println!("{}", content);
        }
    }
    Ok(())
}
