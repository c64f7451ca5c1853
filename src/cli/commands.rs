// ============================================================
// Layer 1 — CLI Commands and Arguments
// ============================================================
// Defines the two subcommands: `pipeline` and `serve`
// and all their configurable flags.
//
// clap's derive macros automatically generate:
//   - help text (--help)
//   - error messages for bad values
//   - type conversion (string → usize, f64, PathBuf, ...)
//
// `serve` flags also read from environment variables, so the
// service can be configured in a container without arguments.
//
// Reference: Rust Book §12 (Building a CLI Program)

use clap::{Args, Subcommand};
use std::path::PathBuf;

use crate::application::pipeline_use_case::PipelineConfig;
use crate::application::prediction_service::ServiceConfig;

/// The two top-level subcommands available to the user
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Clean, synthesize, train and save model artifacts
    Pipeline(PipelineArgs),

    /// Load artifacts and serve the prediction API
    Serve(ServeArgs),
}

/// All arguments for the `pipeline` command.
#[derive(Args, Debug)]
pub struct PipelineArgs {
    /// Raw listings CSV (State, City, BHK, Size_in_SqFt, Price_in_Lakhs)
    #[arg(long, default_value = "india_housing_prices.csv")]
    pub raw_csv: PathBuf,

    /// JSON list of states and their districts
    #[arg(long, default_value = "indian_districts.json")]
    pub districts: PathBuf,

    /// Where the combined dataset CSV is written
    #[arg(long, default_value = "ml/data")]
    pub data_dir: PathBuf,

    /// Where model artifacts and metrics.csv are written
    #[arg(long, default_value = "ml/models")]
    pub models_dir: PathBuf,

    /// Output path of the state → cities lookup JSON
    #[arg(long, default_value = "data/location_mapping.json")]
    pub location_mapping: PathBuf,

    /// Seed for cleaning, synthesis, the split and the forest
    #[arg(long, default_value_t = 42)]
    pub seed: u64,

    /// Number of trees in the forest
    #[arg(long, default_value_t = 100)]
    pub n_trees: usize,

    /// Maximum depth of each tree
    #[arg(long, default_value_t = 20)]
    pub max_depth: usize,

    /// Fraction of rows held out for R² / RMSE
    #[arg(long, default_value_t = 0.2)]
    pub test_fraction: f64,

    /// Regions with fewer rows than this get synthetic rows
    #[arg(long, default_value_t = 50)]
    pub min_existing_records: usize,

    /// Synthetic rows generated per under-covered city
    #[arg(long, default_value_t = 100)]
    pub synthetic_per_city: usize,
}

/// Convert CLI PipelineArgs into the application-layer PipelineConfig.
/// The application layer never sees clap types.
impl From<PipelineArgs> for PipelineConfig {
    fn from(a: PipelineArgs) -> Self {
        PipelineConfig {
            raw_csv:              a.raw_csv,
            districts:            a.districts,
            data_dir:             a.data_dir,
            models_dir:           a.models_dir,
            location_mapping:     a.location_mapping,
            seed:                 a.seed,
            n_trees:              a.n_trees,
            max_depth:            a.max_depth,
            test_fraction:        a.test_fraction,
            min_existing_records: a.min_existing_records,
            synthetic_per_city:   a.synthetic_per_city,
        }
    }
}

/// All arguments for the `serve` command
#[derive(Args, Debug)]
pub struct ServeArgs {
    /// Directory holding the pipeline's artifacts
    #[arg(long, env = "HPP_MODELS_DIR", default_value = "ml/models")]
    pub models_dir: PathBuf,

    /// State → cities lookup JSON served by /options
    #[arg(long, env = "HPP_LOCATION_MAPPING", default_value = "data/location_mapping.json")]
    pub location_mapping: PathBuf,

    #[arg(long, env = "HPP_HOST", default_value = "0.0.0.0")]
    pub host: String,

    #[arg(long, env = "PORT", default_value_t = 8000)]
    pub port: u16,

    /// Include internal error text in 5xx responses
    #[arg(long, env = "HPP_DEBUG")]
    pub debug: bool,

    /// Comma-separated browser origins allowed by CORS
    #[arg(
        long,
        env = "HPP_CORS_ORIGINS",
        value_delimiter = ',',
        default_values = ["http://localhost:3000", "http://localhost:5173"]
    )]
    pub cors_origins: Vec<String>,
}

impl From<ServeArgs> for ServiceConfig {
    fn from(a: ServeArgs) -> Self {
        ServiceConfig {
            models_dir:       a.models_dir,
            location_mapping: a.location_mapping,
            host:             a.host,
            port:             a.port,
            debug:            a.debug,
            cors_origins:     a.cors_origins,
        }
    }
}
