//! Collabgraph CLI: predict collaborations and inspect prediction tables

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use collabgraph::{table, Method, Pipeline, PipelineConfig, Report, Selection};
use comfy_table::{ContentArrangement, Table};
use std::path::{Path, PathBuf};
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "collabgraph", version, about = "Music collaboration link prediction")]
struct Cli {
    /// Log at debug level
    #[arg(long, short, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Clone, clap::ValueEnum)]
enum OutputFormat {
    Table,
    Json,
    Csv,
}

#[derive(Clone, Copy, clap::ValueEnum)]
enum MethodArg {
    Sage,
    Node2vec,
    Rules,
}

impl From<MethodArg> for Method {
    fn from(arg: MethodArg) -> Self {
        match arg {
            MethodArg::Sage => Method::Sage,
            MethodArg::Node2vec => Method::Node2Vec,
            MethodArg::Rules => Method::Rules,
        }
    }
}

#[derive(Subcommand)]
enum Commands {
    /// Train or score, rank and write predicted collaborations
    Predict {
        /// Representation method (overrides the config file)
        #[arg(long, value_enum)]
        method: Option<MethodArg>,

        /// Artist table
        #[arg(long)]
        artists: Option<PathBuf>,

        /// Collaboration table
        #[arg(long)]
        collaborations: Option<PathBuf>,

        /// Prediction table to write
        #[arg(long, short)]
        output: Option<PathBuf>,

        /// YAML configuration file
        #[arg(long, short)]
        config: Option<PathBuf>,

        /// Per-node candidate count
        #[arg(long, conflicts_with = "global_limit")]
        top_k: Option<usize>,

        /// Rank the best pairs overall instead of per node
        #[arg(long)]
        global_limit: Option<usize>,

        /// Drop mirrored per-node pairs
        #[arg(long)]
        dedupe: bool,

        /// Also write learned embeddings as JSON
        #[arg(long)]
        embeddings_out: Option<PathBuf>,

        /// Random seed for the learners
        #[arg(long)]
        seed: Option<u64>,
    },
    /// Print a prediction table
    Show {
        /// Prediction CSV
        path: PathBuf,

        /// Output format
        #[arg(long, value_enum, default_value = "table")]
        format: OutputFormat,

        /// Maximum rows to print
        #[arg(long)]
        limit: Option<usize>,
    },
    /// Print the effective default configuration as YAML
    Config {
        #[arg(long, value_enum, default_value = "sage")]
        method: MethodArg,
    },
}

fn main() {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    let result = match cli.command {
        Commands::Predict {
            method,
            artists,
            collaborations,
            output,
            config,
            top_k,
            global_limit,
            dedupe,
            embeddings_out,
            seed,
        } => {
            let overrides = Overrides {
                method: method.map(Method::from),
                artists,
                collaborations,
                output,
                top_k,
                global_limit,
                dedupe,
                embeddings_out,
                seed,
            };
            run_predict(config, overrides)
        }
        Commands::Show { path, format, limit } => run_show(&path, &format, limit),
        Commands::Config { method } => run_config(method.into()),
    };

    if let Err(e) = result {
        eprintln!("Error: {:#}", e);
        std::process::exit(1);
    }
}

fn init_tracing(verbose: bool) {
    let default_level = if verbose { "debug" } else { "info" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

/// Command-line values that take precedence over the config file
struct Overrides {
    method: Option<Method>,
    artists: Option<PathBuf>,
    collaborations: Option<PathBuf>,
    output: Option<PathBuf>,
    top_k: Option<usize>,
    global_limit: Option<usize>,
    dedupe: bool,
    embeddings_out: Option<PathBuf>,
    seed: Option<u64>,
}

impl Overrides {
    fn apply(self, mut config: PipelineConfig) -> PipelineConfig {
        if let Some(method) = self.method {
            config.method = method;
        }
        if let Some(path) = self.artists {
            config.artists = path;
        }
        if let Some(path) = self.collaborations {
            config.collaborations = path;
        }
        if self.output.is_some() {
            config.output = self.output;
        }
        if let Some(k) = self.top_k {
            config.selection = Some(Selection::PerNode { k });
        }
        if let Some(limit) = self.global_limit {
            config.selection = Some(Selection::Global { limit });
        }
        if self.dedupe {
            config.dedupe_mirrored = true;
        }
        if self.embeddings_out.is_some() {
            config.embeddings_out = self.embeddings_out;
        }
        if let Some(seed) = self.seed {
            config = config.with_seed(seed);
        }
        config
    }
}

fn run_predict(config_path: Option<PathBuf>, overrides: Overrides) -> Result<()> {
    let config = match &config_path {
        Some(path) => PipelineConfig::from_file(path)
            .with_context(|| format!("loading config {}", path.display()))?,
        None => PipelineConfig::default(),
    };
    let config = overrides.apply(config);

    let pipeline = Pipeline::new(config).context("invalid configuration")?;
    let summary = pipeline.run().context("prediction run failed")?;

    println!("Method:         {}", summary.method);
    println!("Artists:        {} ({} in graph)", summary.artists, summary.nodes);
    println!(
        "Collaborations: {} ({} dropped)",
        summary.collaborations, summary.dropped_collaborations
    );
    if let Some(loss) = summary.final_loss {
        println!("Final loss:     {:.4}", loss);
    }
    println!("Predictions:    {}", summary.predictions);
    println!("Output:         {}", summary.output.display());
    println!("Elapsed:        {} ms", summary.elapsed_ms);
    Ok(())
}

fn run_show(path: &Path, format: &OutputFormat, limit: Option<usize>) -> Result<()> {
    let mut report = table::read_report(path).with_context(|| format!("reading {}", path.display()))?;
    if let Some(limit) = limit {
        report.rows.truncate(limit);
    }

    match format {
        OutputFormat::Json => {
            println!("{}", serde_json::to_string_pretty(&report.to_json())?);
        }
        OutputFormat::Csv => {
            println!("{}", report.headers.join(","));
            for row in &report.rows {
                let cells: Vec<String> = row.iter().map(|v| format_csv_value(v)).collect();
                println!("{}", cells.join(","));
            }
        }
        OutputFormat::Table => print_table(&report),
    }
    Ok(())
}

fn print_table(report: &Report) {
    if report.is_empty() {
        println!("(no predictions)");
        return;
    }

    let mut table = Table::new();
    table.set_content_arrangement(ContentArrangement::Dynamic);
    table.set_header(&report.headers);
    for row in &report.rows {
        table.add_row(row);
    }

    println!("{}", table);
    println!("{} row(s)", report.len());
}

fn run_config(method: Method) -> Result<()> {
    let yaml = PipelineConfig::for_method(method)
        .resolved()
        .to_yaml()
        .context("serializing configuration")?;
    print!("{}", yaml);
    Ok(())
}

fn format_csv_value(v: &str) -> String {
    if v.contains(',') || v.contains('"') || v.contains('\n') {
        format!("\"{}\"", v.replace('"', "\"\""))
    } else {
        v.to_string()
    }
}
