//! Jewelry price estimation from the command line
//!
//! Loads the trained artifacts once and prices a single item, a JSON batch
//! of items, or shows how an item is encoded.

use anyhow::{Context, Result};
use clap::{Args, Parser, Subcommand};
use jewel_pricing_core::record::{self, BRAND_ID_RANGE, MONTH_RANGE, YEAR_RANGE};
use jewel_pricing_core::{
    load_predictor, JewelryRecord, PriceEstimate, PricingConfig, PricingError,
};
use serde::Serialize;
use serde_json::Value;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

#[derive(Parser)]
#[command(name = "jewel-price")]
#[command(about = "Estimate jewelry prices from trained artifacts", long_about = None)]
#[command(version)]
struct Cli {
    /// Configuration file (TOML)
    #[arg(long, global = true, value_name = "PATH")]
    config: Option<PathBuf>,

    /// Artifact directory, takes precedence over the configuration
    #[arg(long, global = true, value_name = "DIR")]
    artifacts: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Estimate the price of one item
    Predict {
        #[command(flatten)]
        item: ItemArgs,
        /// Print the estimate as JSON
        #[arg(long)]
        json: bool,
    },
    /// Estimate prices for a JSON array of items
    Batch {
        /// Input file holding a JSON array of records
        #[arg(long, value_name = "PATH")]
        input: PathBuf,
        /// Write results here instead of stdout
        #[arg(long, value_name = "PATH")]
        output: Option<PathBuf>,
    },
    /// Show the model-ready feature vector for one item
    Encode {
        #[command(flatten)]
        item: ItemArgs,
    },
    /// Show artifact digests and the feature layout
    Inspect,
    /// List the offered categorical options
    Choices,
}

#[derive(Args, Debug, Clone)]
struct ItemArgs {
    /// Product category, e.g. jewelry.ring
    #[arg(long)]
    category: String,
    #[arg(long)]
    main_metal: String,
    #[arg(long)]
    target_gender: String,
    #[arg(long)]
    main_color: String,
    #[arg(long)]
    main_gem: String,
    /// Brand identifier (1-1000)
    #[arg(long, default_value_t = *BRAND_ID_RANGE.start())]
    brand_id: i64,
    /// Year of sale (1900-2100)
    #[arg(long, default_value_t = *YEAR_RANGE.start())]
    year: i64,
    /// Month of sale (1-12)
    #[arg(long, default_value_t = *MONTH_RANGE.start())]
    month: i64,
}

impl From<ItemArgs> for JewelryRecord {
    fn from(args: ItemArgs) -> Self {
        JewelryRecord {
            category: args.category,
            main_metal: args.main_metal,
            target_gender: args.target_gender,
            main_color: args.main_color,
            main_gem: args.main_gem,
            brand_id: args.brand_id,
            year: args.year,
            month: args.month,
        }
    }
}

/// One line of batch output
#[derive(Debug, Serialize)]
#[serde(untagged)]
enum BatchOutcome {
    Priced {
        index: usize,
        #[serde(flatten)]
        estimate: PriceEstimate,
    },
    Failed {
        index: usize,
        error: String,
    },
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    let config = resolve_config(cli.config.as_deref(), cli.artifacts.as_deref())?;
    init_tracing(&config)?;

    // Warnings are logged by validate itself.
    config.validate()?;

    match cli.command {
        Commands::Predict { item, json } => handle_predict(&config, item, json),
        Commands::Batch { input, output } => handle_batch(&config, &input, output.as_deref()),
        Commands::Encode { item } => handle_encode(&config, item),
        Commands::Inspect => handle_inspect(&config),
        Commands::Choices => handle_choices(),
    }
}

/// Defaults, then the config file, then environment, then flags
fn resolve_config(path: Option<&Path>, artifacts: Option<&Path>) -> Result<PricingConfig> {
    resolve_config_with(path, artifacts, |key| std::env::var(key).ok())
}

fn resolve_config_with<F>(
    path: Option<&Path>,
    artifacts: Option<&Path>,
    lookup: F,
) -> Result<PricingConfig>
where
    F: Fn(&str) -> Option<String>,
{
    let mut config = match path {
        Some(path) => PricingConfig::load(path)
            .with_context(|| format!("failed to load config {}", path.display()))?,
        None => PricingConfig::default(),
    };
    config
        .apply_overrides(lookup)
        .context("invalid environment override")?;
    if let Some(dir) = artifacts {
        config.artifacts.dir = dir.to_path_buf();
    }
    Ok(config)
}

fn init_tracing(config: &PricingConfig) -> Result<()> {
    let filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(&config.logging.level))
        .with_context(|| format!("invalid log level {:?}", config.logging.level))?;

    let registry = tracing_subscriber::registry().with(filter);
    if config.logging.pretty {
        registry
            .with(tracing_subscriber::fmt::layer().pretty().with_writer(std::io::stderr))
            .init();
    } else {
        registry
            .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
            .init();
    }
    Ok(())
}

fn handle_predict(config: &PricingConfig, item: ItemArgs, json: bool) -> Result<()> {
    let predictor = load_predictor(config).context("failed to load artifacts")?;
    let estimate = predictor.predict(&item.into()).map_err(prediction_error)?;

    if json {
        println!("{}", serde_json::to_string_pretty(&estimate)?);
        return Ok(());
    }

    println!("Estimated Price: {}", estimate.formatted);
    for u in &estimate.unseen {
        println!("  note: {} {:?} was not seen in training", u.column, u.value);
    }
    Ok(())
}

/// Scaling failures are the preprocessing guard; other errors pass through
fn prediction_error(err: PricingError) -> anyhow::Error {
    match err {
        PricingError::Scaling(_) => {
            anyhow::Error::new(err).context("Prediction failed due to preprocessing errors.")
        }
        other => anyhow::Error::new(other),
    }
}

fn handle_batch(config: &PricingConfig, input: &Path, output: Option<&Path>) -> Result<()> {
    let content = fs::read_to_string(input)
        .with_context(|| format!("failed to read {}", input.display()))?;
    let records: Vec<JewelryRecord> = serde_json::from_str(&content)
        .with_context(|| format!("{} is not a JSON array of records", input.display()))?;

    let predictor = load_predictor(config).context("failed to load artifacts")?;
    let outcomes: Vec<BatchOutcome> = predictor
        .predict_batch(&records)
        .into_iter()
        .enumerate()
        .map(|(index, result)| match result {
            Ok(estimate) => BatchOutcome::Priced { index, estimate },
            Err(e) => BatchOutcome::Failed {
                index,
                error: e.to_string(),
            },
        })
        .collect();

    let failed = outcomes
        .iter()
        .filter(|o| matches!(o, BatchOutcome::Failed { .. }))
        .count();
    info!(records = records.len(), failed = failed, "batch priced");

    let rendered = serde_json::to_string_pretty(&outcomes)?;
    match output {
        Some(path) => {
            fs::write(path, rendered)
                .with_context(|| format!("failed to write {}", path.display()))?;
            println!(
                "Priced {} of {} records, results in {}",
                records.len() - failed,
                records.len(),
                path.display()
            );
        }
        None => println!("{rendered}"),
    }
    Ok(())
}

fn handle_encode(config: &PricingConfig, item: ItemArgs) -> Result<()> {
    let predictor = load_predictor(config).context("failed to load artifacts")?;
    let encoded = predictor.encode(&item.into())?;

    let mut features = serde_json::Map::new();
    for (name, value) in encoded.named(&predictor.bundle().schema) {
        features.insert(name.to_string(), Value::from(value));
    }
    let body = serde_json::json!({
        "features": Value::Object(features),
        "unseen": encoded.unseen,
    });
    println!("{}", serde_json::to_string_pretty(&body)?);
    Ok(())
}

fn handle_inspect(config: &PricingConfig) -> Result<()> {
    let predictor = load_predictor(config).context("failed to load artifacts")?;
    let bundle = predictor.bundle();
    let manifest = bundle.manifest()?;

    println!("Artifacts: {}", config.artifacts.dir.display());
    for digest in &manifest.artifacts {
        println!("  {:<20} {}  {}", digest.name, digest.blake3, digest.path.display());
    }
    println!(
        "Model: {} trees, bias {}",
        bundle.model.num_trees(),
        bundle.model.bias
    );
    println!(
        "Scaled columns: {}",
        predictor.preprocessor().scaled_columns().join(", ")
    );
    println!("Feature layout ({} columns):", bundle.schema.len());
    for (i, column) in bundle.schema.columns().iter().enumerate() {
        println!("  {i:>3} {column}");
    }
    Ok(())
}

fn handle_choices() -> Result<()> {
    for (column, options) in record::choices() {
        println!("{column}: {}", options.join(", "));
    }
    println!(
        "Brand_ID: {}..={}",
        BRAND_ID_RANGE.start(),
        BRAND_ID_RANGE.end()
    );
    println!("Year: {}..={}", YEAR_RANGE.start(), YEAR_RANGE.end());
    println!("Month: {}..={}", MONTH_RANGE.start(), MONTH_RANGE.end());
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn test_cli_definition_is_consistent() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_predict_args_parse_into_record() {
        let cli = Cli::try_parse_from([
            "jewel-price",
            "--artifacts",
            "artifacts/demo",
            "predict",
            "--category",
            "jewelry.ring",
            "--main-metal",
            "gold",
            "--target-gender",
            "f",
            "--main-color",
            "red",
            "--main-gem",
            "diamond",
            "--brand-id",
            "10",
            "--year",
            "2020",
            "--month",
            "6",
            "--json",
        ])
        .unwrap();

        assert_eq!(cli.artifacts, Some(PathBuf::from("artifacts/demo")));
        match cli.command {
            Commands::Predict { item, json } => {
                assert!(json);
                let record = JewelryRecord::from(item);
                assert_eq!(record.category, "jewelry.ring");
                assert_eq!(record.brand_id, 10);
                assert_eq!(record.month, 6);
            }
            _ => panic!("expected predict"),
        }
    }

    #[test]
    fn test_numeric_fields_default_to_range_minimum() {
        let cli = Cli::try_parse_from([
            "jewel-price",
            "encode",
            "--category",
            "jewelry.stud",
            "--main-metal",
            "silver",
            "--target-gender",
            "m",
            "--main-color",
            "blue",
            "--main-gem",
            "none",
        ])
        .unwrap();

        let Commands::Encode { item } = cli.command else {
            panic!("expected encode");
        };
        assert_eq!((item.brand_id, item.year, item.month), (1, 1900, 1));
    }

    #[test]
    fn test_missing_required_field_is_rejected() {
        assert!(Cli::try_parse_from(["jewel-price", "predict", "--category", "x"]).is_err());
    }

    #[test]
    fn test_artifacts_flag_overrides_config_file() {
        let tmp = tempfile::tempdir().unwrap();
        let path = tmp.path().join("pricing.toml");
        let mut config = PricingConfig::default();
        config.artifacts.dir = PathBuf::from("from-file");
        config.save(&path).unwrap();

        let loaded = resolve_config_with(Some(&path), None, |_| None).unwrap();
        assert_eq!(loaded.artifacts.dir, PathBuf::from("from-file"));

        let from_env = |key: &str| {
            (key == "JEWEL_PRICING_ARTIFACTS_DIR").then(|| "from-env".to_string())
        };
        let env = resolve_config_with(Some(&path), None, from_env).unwrap();
        assert_eq!(env.artifacts.dir, PathBuf::from("from-env"));

        let overridden =
            resolve_config_with(Some(&path), Some(Path::new("from-flag")), from_env).unwrap();
        assert_eq!(overridden.artifacts.dir, PathBuf::from("from-flag"));
    }

    #[test]
    fn test_guard_message_only_for_scaling_errors() {
        let scaling = prediction_error(PricingError::Scaling("Year is missing".into()));
        assert_eq!(
            scaling.to_string(),
            "Prediction failed due to preprocessing errors."
        );
        assert!(matches!(
            scaling.downcast_ref::<PricingError>(),
            Some(PricingError::Scaling(_))
        ));

        let invalid = prediction_error(PricingError::InvalidInput("Month must be 1-12".into()));
        assert_eq!(invalid.to_string(), "Invalid input: Month must be 1-12");
    }

    #[test]
    fn test_batch_outcome_serialization() {
        let failed = BatchOutcome::Failed {
            index: 2,
            error: "bad month".into(),
        };
        let value = serde_json::to_value(&failed).unwrap();
        assert_eq!(value["index"], 2);
        assert_eq!(value["error"], "bad month");

        let priced = BatchOutcome::Priced {
            index: 0,
            estimate: PriceEstimate {
                price: 642.5,
                formatted: "$642.50".into(),
                unseen: vec![],
            },
        };
        let value = serde_json::to_value(&priced).unwrap();
        assert_eq!(value["formatted"], "$642.50");
        assert_eq!(value["index"], 0);
    }
}
