use clap::{Args, Parser, Subcommand};
use news_score::catalog::{
    load_catalog, save_catalog, standard_ranges, CatalogError, NewRange, RangeCatalog, RangeId,
};
use news_score::scoring::{
    check_request, parse_measurement, CancelFlag, Measurement, ScoreEngine, ScoreError,
};
use std::path::{Path, PathBuf};

const EXIT_SUCCESS: i32 = 0;
const EXIT_INVALID: i32 = 1;
const EXIT_UNAVAILABLE: i32 = 2;
const EXIT_CONFLICT: i32 = 3;
const EXIT_CONFIG: i32 = 4;
const EXIT_CANCELLED: i32 = 130;

#[derive(Subcommand, Debug)]
enum Commands {
    /// Calculate the NEWS score for a set of measurements
    Score {
        /// Measurements as TYPE=VALUE, e.g. TEMP=37.2 HR=72 RR=14
        #[arg(required = true)]
        measurements: Vec<String>,

        /// Print the result as JSON
        #[arg(long)]
        json: bool,

        /// Skip the check that every required measurement type is present
        #[arg(long)]
        no_required_check: bool,
    },
    /// Inspect and edit the score range catalog
    Ranges {
        #[command(subcommand)]
        action: RangeAction,
    },
    /// Write the reference NEWS range table to the catalog file
    Init {
        /// Overwrite an existing catalog
        #[arg(long)]
        force: bool,
    },
}

#[derive(Subcommand, Debug)]
enum RangeAction {
    /// List ranges, ordered by type and lower bound
    List {
        /// Only show ranges of this measurement type
        #[arg(long = "type")]
        measurement_type: Option<String>,

        /// Print ranges as JSON
        #[arg(long)]
        json: bool,
    },
    /// Add a single range
    Add(RangeArgs),
    /// Add every range listed in a YAML or JSON file, all or nothing
    Import {
        /// File containing a list of {measurementType, minValue, maxValue, score}
        file: PathBuf,
    },
    /// Replace an existing range
    Update {
        id: RangeId,

        #[command(flatten)]
        range: RangeArgs,
    },
    /// Remove ranges by id, all or nothing
    Remove {
        #[arg(required = true)]
        ids: Vec<RangeId>,
    },
}

#[derive(Args, Debug)]
struct RangeArgs {
    /// Measurement type, e.g. TEMP
    #[arg(long = "type")]
    measurement_type: String,

    /// Exclusive lower bound
    #[arg(long, allow_hyphen_values = true)]
    min: f64,

    /// Inclusive upper bound
    #[arg(long, allow_hyphen_values = true)]
    max: f64,

    /// Score awarded when a value falls in (min, max]
    #[arg(long, allow_hyphen_values = true)]
    score: i32,
}

impl From<RangeArgs> for NewRange {
    fn from(args: RangeArgs) -> Self {
        NewRange::new(&args.measurement_type, args.min, args.max, args.score)
    }
}

#[derive(Parser, Debug)]
#[command(name = "news-score")]
#[command(about = "NEWS early-warning score calculator", long_about = None)]
#[command(version)]
struct Cli {
    /// Enable verbose logging
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Path to config file (defaults to ~/.config/news-score/config.yaml)
    #[arg(short, long, global = true)]
    config: Option<String>,

    /// Path to the range catalog (overrides catalog_path from config)
    #[arg(long, global = true)]
    catalog: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[tokio::main]
async fn main() {
    let cli = Cli::parse();
    news_score::logging::init(cli.verbose);

    let config = match news_score::config::load_config(cli.config.map(PathBuf::from)) {
        Ok(c) => c,
        Err(e) => {
            eprintln!("Config error: {:#}", e);
            std::process::exit(EXIT_CONFIG);
        }
    };

    if let Err(errors) = news_score::config::validate_config(&config) {
        eprintln!("Config errors:");
        for error in errors {
            eprintln!("  - {}", error);
        }
        std::process::exit(EXIT_CONFIG);
    }

    let catalog_path = match cli.catalog {
        Some(path) => path,
        None => match config.catalog_path() {
            Ok(path) => path,
            Err(e) => {
                eprintln!("Config error: {:#}", e);
                std::process::exit(EXIT_CONFIG);
            }
        },
    };

    let use_colors = news_score::output::should_use_colors();

    let code = match cli.command {
        Commands::Score {
            measurements,
            json,
            no_required_check,
        } => {
            let engine = match config.lookup_timeout() {
                Ok(Some(limit)) => ScoreEngine::new(config.type_rules()).with_lookup_timeout(limit),
                Ok(None) => ScoreEngine::new(config.type_rules()),
                Err(e) => {
                    eprintln!("Config error: {:#}", e);
                    std::process::exit(EXIT_CONFIG);
                }
            };
            let required = if no_required_check {
                Vec::new()
            } else {
                config.required_types()
            };
            run_score(&engine, &catalog_path, &measurements, &required, json, use_colors).await
        }
        Commands::Ranges { action } => run_ranges(action, &catalog_path, use_colors),
        Commands::Init { force } => run_init(&catalog_path, force),
    };

    std::process::exit(code);
}

async fn run_score(
    engine: &ScoreEngine,
    catalog_path: &Path,
    inputs: &[String],
    required: &[String],
    json: bool,
    use_colors: bool,
) -> i32 {
    let mut measurements: Vec<Measurement> = Vec::with_capacity(inputs.len());
    for input in inputs {
        match parse_measurement(input) {
            Ok(m) => measurements.push(m),
            Err(e) => {
                eprintln!("{:#}", e);
                return EXIT_INVALID;
            }
        }
    }

    if let Err(e) = check_request(&measurements, required) {
        eprintln!("{}", e);
        return EXIT_INVALID;
    }

    let catalog = match load_catalog(catalog_path) {
        Ok(c) => c,
        Err(e) => {
            eprintln!("Catalog error: {:#}", e);
            return EXIT_UNAVAILABLE;
        }
    };

    match catalog.is_empty() {
        Ok(true) => eprintln!(
            "Catalog at {} is empty. Run `news-score init` to load the reference ranges.",
            catalog_path.display()
        ),
        Ok(false) => {}
        Err(e) => {
            eprintln!("Catalog error: {}", e);
            return EXIT_UNAVAILABLE;
        }
    }

    let cancel = CancelFlag::new();
    cancel.install_ctrlc_handler();

    let result = match engine.calculate(&measurements, &catalog, Some(&cancel)).await {
        Ok(r) => r,
        Err(ScoreError::Cancelled { .. }) => {
            eprintln!("Cancelled.");
            return EXIT_CANCELLED;
        }
        Err(e @ ScoreError::ScoreOverflow { .. }) => {
            eprintln!("Error calculating NEWS score: {}", e);
            return EXIT_INVALID;
        }
        Err(e) => {
            eprintln!("Error calculating NEWS score: {}", e);
            return EXIT_UNAVAILABLE;
        }
    };

    if json {
        match serde_json::to_string_pretty(&result) {
            Ok(s) => println!("{}", s),
            Err(e) => {
                eprintln!("Failed to serialize result: {}", e);
                return EXIT_UNAVAILABLE;
            }
        }
    } else {
        println!("{}", news_score::output::format_score_result(&result, use_colors));
    }

    if result.is_valid() {
        EXIT_SUCCESS
    } else {
        EXIT_INVALID
    }
}

fn exit_code_for(error: &CatalogError) -> i32 {
    match error {
        CatalogError::Unavailable(_) => EXIT_UNAVAILABLE,
        _ => EXIT_CONFLICT,
    }
}

fn load_ranges_file(path: &Path) -> anyhow::Result<Vec<NewRange>> {
    use anyhow::Context;

    let content = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read {}", path.display()))?;
    let is_json = path
        .extension()
        .is_some_and(|ext| ext.eq_ignore_ascii_case("json"));

    let ranges = if is_json {
        serde_json::from_str(&content)
            .with_context(|| format!("Failed to parse ranges: invalid JSON in {}", path.display()))?
    } else {
        serde_saphyr::from_str(&content)
            .with_context(|| format!("Failed to parse ranges: invalid YAML in {}", path.display()))?
    };
    Ok(ranges)
}

fn run_ranges(action: RangeAction, catalog_path: &Path, use_colors: bool) -> i32 {
    let catalog = match load_catalog(catalog_path) {
        Ok(c) => c,
        Err(e) => {
            eprintln!("Catalog error: {:#}", e);
            return EXIT_UNAVAILABLE;
        }
    };

    let outcome: Result<(), Vec<CatalogError>> = match action {
        RangeAction::List {
            measurement_type,
            json,
        } => {
            let ranges = match measurement_type {
                Some(t) => catalog.ranges_of(&t),
                None => catalog.list_all(),
            };
            let ranges = match ranges {
                Ok(r) => r,
                Err(e) => {
                    eprintln!("Catalog error: {}", e);
                    return exit_code_for(&e);
                }
            };
            if json {
                match serde_json::to_string_pretty(&ranges) {
                    Ok(s) => println!("{}", s),
                    Err(e) => {
                        eprintln!("Failed to serialize ranges: {}", e);
                        return EXIT_UNAVAILABLE;
                    }
                }
            } else {
                println!("{}", news_score::output::format_range_table(&ranges, use_colors));
            }
            return EXIT_SUCCESS;
        }
        RangeAction::Add(args) => catalog
            .add(args.into())
            .map(|range| println!("Added range {}", range.id))
            .map_err(|e| vec![e]),
        RangeAction::Import { file } => {
            let ranges = match load_ranges_file(&file) {
                Ok(r) => r,
                Err(e) => {
                    eprintln!("{:#}", e);
                    return EXIT_INVALID;
                }
            };
            catalog
                .add_many(ranges)
                .map(|created| println!("Created {} ranges", created.len()))
        }
        RangeAction::Update { id, range } => catalog
            .update(id, range.into())
            .map(|range| println!("Updated range {}", range.id))
            .map_err(|e| vec![e]),
        RangeAction::Remove { ids } => catalog
            .remove_many(&ids)
            .map(|removed| println!("Removed {} ranges", removed.len()))
            .map_err(|e| vec![e]),
    };

    if let Err(errors) = outcome {
        eprintln!("{}", news_score::output::format_catalog_errors(&errors, use_colors));
        return errors.first().map(exit_code_for).unwrap_or(EXIT_CONFLICT);
    }

    if let Err(e) = save_catalog(catalog_path, &catalog) {
        eprintln!("Catalog error: {:#}", e);
        return EXIT_UNAVAILABLE;
    }

    EXIT_SUCCESS
}

fn run_init(catalog_path: &Path, force: bool) -> i32 {
    if catalog_path.exists() && !force {
        eprintln!(
            "Catalog already exists at {}. Use --force to overwrite.",
            catalog_path.display()
        );
        return EXIT_CONFLICT;
    }

    let catalog = match RangeCatalog::with_ranges(standard_ranges()) {
        Ok(c) => c,
        Err(errors) => {
            eprintln!("{}", news_score::output::format_catalog_errors(&errors, false));
            return EXIT_CONFLICT;
        }
    };

    let count = match catalog.len() {
        Ok(n) => n,
        Err(e) => {
            eprintln!("Catalog error: {}", e);
            return exit_code_for(&e);
        }
    };

    if let Err(e) = save_catalog(catalog_path, &catalog) {
        eprintln!("Catalog error: {:#}", e);
        return EXIT_UNAVAILABLE;
    }

    println!("Wrote {} reference ranges to {}", count, catalog_path.display());
    EXIT_SUCCESS
}
