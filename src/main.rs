use clap::{Parser, Subcommand, ValueEnum};
use std::path::PathBuf;
use std::time::Instant;

use expansion_score::data::{self, DataSource};
use expansion_score::scoring::{self, MarketType};
use expansion_score::{log_debug, output, tui};

// Exit codes
const EXIT_SUCCESS: i32 = 0;
const EXIT_FAILURE: i32 = 1;
const EXIT_REJECTED: i32 = 2;
const EXIT_CONFIG: i32 = 4;
const EXIT_SCORING: i32 = 5;

/// Export target used by the dashboard's `e` key
const DEFAULT_EXPORT: &str = "expansion-scores.json";

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, ValueEnum)]
enum ListFormat {
    /// Aligned breakdown table
    #[default]
    Table,
    /// Tab-separated, for scripting
    Tsv,
    /// JSON document with weights, rows and chart
    Json,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Interactive dashboard (default if no subcommand)
    Dashboard {
        /// File the `e` key writes to (.csv for CSV, anything else JSON)
        #[arg(long, default_value = DEFAULT_EXPORT)]
        export: PathBuf,
    },
    /// Print the score breakdown for every country
    List {
        #[arg(long, value_enum, default_value_t = ListFormat::Table)]
        format: ListFormat,

        /// Also draw a stacked bar chart
        #[arg(long)]
        chart: bool,

        /// Write the result to a file (.csv for CSV, anything else JSON)
        #[arg(long)]
        export: Option<PathBuf>,
    },
    /// Check a metrics CSV without scoring it
    Validate {
        /// CSV file to check
        file: PathBuf,
    },
    /// Interactive wizard that writes a config file
    Init,
}

#[derive(Parser, Debug)]
#[command(name = "expansion-score")]
#[command(about = "Weighted country expansion scoring", long_about = None)]
#[command(version)]
struct Cli {
    /// Enable verbose logging
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Path to config file (defaults to ~/.config/expansion-score/config.yaml)
    #[arg(short, long, global = true)]
    config: Option<String>,

    /// Market type (overrides config)
    #[arg(short, long, global = true, value_enum)]
    market: Option<MarketType>,

    /// Metrics CSV to use instead of the built-in table (overrides config)
    #[arg(short, long, global = true)]
    data: Option<PathBuf>,

    /// Raw weight override as factor=value, e.g. market-size=40 (repeatable)
    #[arg(short, long = "weight", global = true)]
    weights: Vec<String>,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[tokio::main(flavor = "current_thread")]
async fn main() {
    let cli = Cli::parse();
    expansion_score::log::set_verbose(cli.verbose);
    let start_time = Instant::now();

    let command = cli.command.unwrap_or(Commands::Dashboard {
        export: PathBuf::from(DEFAULT_EXPORT),
    });
    let config_path = cli.config.map(PathBuf::from);

    // Commands that don't need a loaded config
    match &command {
        Commands::Validate { file } => {
            std::process::exit(run_validate(file));
        }
        Commands::Init => {
            if let Err(e) = expansion_score::config::run_init_wizard(config_path.clone()) {
                eprintln!("Init failed: {:#}", e);
                std::process::exit(EXIT_CONFIG);
            }
            std::process::exit(EXIT_SUCCESS);
        }
        _ => {}
    }

    // Load config
    let config = match expansion_score::config::load_config(config_path) {
        Ok(c) => c,
        Err(e) => {
            eprintln!("Config error: {:#}", e);
            std::process::exit(EXIT_CONFIG);
        }
    };

    // Validate scoring config at startup
    let effective_scoring = config.effective_scoring();
    if let Err(errors) = scoring::validate_scoring(&effective_scoring) {
        eprintln!("Scoring config errors:");
        for error in errors {
            eprintln!("  - {}", error);
        }
        std::process::exit(EXIT_CONFIG);
    }

    // CLI flags > config file > built-in defaults
    let mut raw_weights = effective_scoring.raw_weights();
    for arg in &cli.weights {
        match scoring::parse_weight_override(arg) {
            Ok((factor, value)) => {
                log_debug!("Weight override: {} = {}", factor, value);
                raw_weights.set(factor, value);
            }
            Err(e) => {
                eprintln!("Config error: {:#}", e);
                std::process::exit(EXIT_CONFIG);
            }
        }
    }
    let precision = effective_scoring.precision();
    let market = cli.market.or(config.market_type).unwrap_or_default();
    let source = match cli.data.or_else(|| config.data_file.clone()) {
        Some(path) => DataSource::Upload(path),
        None => DataSource::BuiltIn,
    };

    let loaded = data::load(&source);
    log_debug!(
        "Using {} data ({} countries), {} market",
        loaded.source,
        loaded.table.len(),
        market
    );

    // Every (factor, market) pair must resolve to a column in the table
    if let Err(e) = scoring::validate_lookup(&loaded.table) {
        eprintln!("Scoring error: {}", e);
        std::process::exit(EXIT_SCORING);
    }

    match command {
        Commands::Dashboard { export } => {
            let theme = tui::resolve_theme(config.theme.unwrap_or_default());
            let app = tui::App::new(raw_weights, market, loaded, precision, export, theme);
            if let Err(e) = tui::run_tui(app).await {
                eprintln!("Dashboard error: {:#}", e);
                std::process::exit(EXIT_FAILURE);
            }
        }
        Commands::List {
            format,
            chart,
            export,
        } => {
            let result = match scoring::compute(&raw_weights, market, &loaded.table, precision) {
                Ok(r) => r,
                Err(e) => {
                    eprintln!("Scoring error: {}", e);
                    std::process::exit(EXIT_SCORING);
                }
            };
            let source_label = loaded.source.to_string();
            let use_colors = output::should_use_colors();

            match format {
                ListFormat::Table => {
                    println!(
                        "{} market · {}",
                        market,
                        output::format_weights(&result.weights, use_colors)
                    );
                    println!();
                    println!("{}", output::format_breakdown_table(&result, use_colors));
                }
                ListFormat::Tsv => println!("{}", output::format_tsv(&result)),
                ListFormat::Json => match output::export::to_json(&result, &source_label) {
                    Ok(json) => println!("{}", json),
                    Err(e) => {
                        eprintln!("Output error: {:#}", e);
                        std::process::exit(EXIT_SCORING);
                    }
                },
            }

            if chart {
                let model = output::StackedBarChart::from_result(&result);
                println!();
                println!(
                    "{}",
                    output::render_text(&model, output::output_width(), use_colors)
                );
            }

            if let Some(path) = export {
                match output::export_result(&path, &result, &source_label) {
                    Ok(_) => eprintln!("Exported to {}", path.display()),
                    Err(e) => {
                        eprintln!("Export error: {:#}", e);
                        std::process::exit(EXIT_SCORING);
                    }
                }
            }

            log_debug!(
                "Scored {} countries in {:?}",
                result.rows.len(),
                start_time.elapsed()
            );
        }
        Commands::Validate { .. } | Commands::Init => {}
    }

    std::process::exit(EXIT_SUCCESS);
}

/// Run only the upload validator and report the outcome
fn run_validate(file: &std::path::Path) -> i32 {
    match data::load_upload(file) {
        Ok(table) => {
            println!(
                "{}: accepted ({} countries)",
                file.display(),
                table.len()
            );
            EXIT_SUCCESS
        }
        Err(e) => {
            println!("{}: rejected ({})", file.display(), e.reason());
            eprintln!("  {}", e);
            EXIT_REJECTED
        }
    }
}
