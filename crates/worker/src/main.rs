use anyhow::Context;
use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use vriksh_core::domain::prediction::{PreHarvestRequest, PreHarvestResponse};
use vriksh_core::model::ModelGateway;
use vriksh_core::storage::ArtifactStore;

mod check;

#[derive(Debug, Parser)]
#[command(name = "vriksh_worker")]
#[command(about = "Operator tools for the Vriksh decision-support backend")]
struct Args {
    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Load every pipeline artifact and report what the API would serve.
    Check,

    /// Run one pre-harvest yield prediction against the configured model.
    Predict {
        #[arg(long)]
        crop: String,

        /// Cultivated area in hectares.
        #[arg(long)]
        area: f64,

        /// Soil quality score, 1-10.
        #[arg(long)]
        soil_quality: i64,

        /// Seasonal rainfall in millimeters.
        #[arg(long)]
        rainfall: f64,

        #[arg(long = "price", default_value_t = 1.0)]
        expected_price_per_unit: f64,
    },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    let settings = vriksh_core::config::Settings::from_env()?;
    let _sentry_guard = init_sentry(&settings);

    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with(tracing_subscriber::fmt::layer())
        .with(sentry_tracing::layer())
        .init();

    let args = Args::parse();

    match args.command {
        Command::Check => {
            let store = ArtifactStore::new(&settings.data_dir);
            let report = check::run(&store);
            if report.has_failures() {
                let err = anyhow::anyhow!(
                    "one or more artifacts in {} failed to load",
                    settings.data_dir.display()
                );
                sentry_anyhow::capture_anyhow(&err);
                return Err(err);
            }
            tracing::info!(data_dir = %settings.data_dir.display(), "artifact check passed");
        }
        Command::Predict {
            crop,
            area,
            soil_quality,
            rainfall,
            expected_price_per_unit,
        } => {
            let request = PreHarvestRequest {
                crop,
                area,
                soil_quality,
                rainfall,
                expected_price_per_unit,
            }
            .validate()?;

            let gateway = ModelGateway::new(&settings.model_path);
            let model = gateway.get_model().await.with_context(|| {
                format!(
                    "pre-harvest model unavailable at {}",
                    settings.model_path.display()
                )
            })?;

            let predicted_yield = model
                .predict(&request.features())
                .context("yield prediction failed")?;
            let response =
                PreHarvestResponse::from_yield(predicted_yield, request.expected_price_per_unit);
            println!("{}", serde_json::to_string_pretty(&response)?);
        }
    }

    Ok(())
}

fn init_sentry(settings: &vriksh_core::config::Settings) -> Option<sentry::ClientInitGuard> {
    let dsn = settings.sentry_dsn.as_deref()?;
    Some(sentry::init((
        dsn,
        sentry::ClientOptions {
            release: sentry::release_name!(),
            ..Default::default()
        },
    )))
}
