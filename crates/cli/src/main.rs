use anyhow::Context;
use clap::{Args, Parser, Subcommand};
use intake_core::constants::DEFAULT_REPORT_DIR;
use intake_core::{resolve_dataset_path, run_intake, ConditionPredictor, Console, IntakeConfig};
use intake_predictor::DatasetPredictor;
use std::path::PathBuf;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[derive(Parser)]
#[command(name = "intake")]
#[command(about = "Symptom intake questionnaire")]
struct Cli {
    #[command(flatten)]
    options: GlobalOptions,
    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Args)]
struct GlobalOptions {
    /// Catalog YAML file replacing the built-in questions
    #[arg(long, global = true, env = "INTAKE_CATALOG")]
    catalog: Option<PathBuf>,
    /// Patient-profile CSV used to train the condition predictor
    #[arg(long, global = true, env = "INTAKE_DATASET")]
    dataset: Option<PathBuf>,
    /// Directory for saved session reports
    #[arg(long, global = true, env = "INTAKE_REPORT_DIR", default_value = DEFAULT_REPORT_DIR)]
    report_dir: PathBuf,
    /// Do not save a report when the session ends
    #[arg(long, global = true)]
    no_save: bool,
}

#[derive(Subcommand, Debug, PartialEq, Eq)]
enum Commands {
    /// Run the questionnaire (default)
    Run,
    /// Train the condition predictor and print model accuracies
    Train,
    /// Print the active catalog as YAML
    Catalog,
}

/// Entry point for the `intake` binary.
///
/// Logs go to stderr so they never interleave with the questionnaire on stdout.
///
/// # Environment Variables
/// - `INTAKE_CATALOG`: catalog YAML file (default: built-in catalog)
/// - `INTAKE_DATASET`: dataset CSV (default: `data/Disease_symptom_and_patient_profile_dataset.csv` if present)
/// - `INTAKE_REPORT_DIR`: report directory (default: `chats`)
/// - `RUST_LOG`: log filter, on top of `intake=info`
fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::from_default_env().add_directive("intake=info".parse()?),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    let cli = Cli::parse();
    let options = cli.options;
    let config = IntakeConfig::new(
        options.report_dir,
        resolve_dataset_path(options.dataset),
        options.catalog,
        !options.no_save,
    )?;

    match cli.command.unwrap_or(Commands::Run) {
        Commands::Run => run(&config),
        Commands::Train => train(&config),
        Commands::Catalog => {
            let catalog = config.load_catalog().context("failed to load catalog")?;
            print!("{}", catalog.to_yaml()?);
            Ok(())
        }
    }
}

fn run(config: &IntakeConfig) -> anyhow::Result<()> {
    let catalog = config.load_catalog().context("failed to load catalog")?;
    let predictor = load_predictor(config);
    let reports = config.save_reports().then(|| config.report_store());

    let stdin = std::io::stdin();
    let mut console = Console::new(stdin.lock(), std::io::stdout());
    run_intake(
        &mut console,
        &catalog,
        predictor.as_ref().map(|p| p as &dyn ConditionPredictor),
        reports.as_ref(),
    )?;
    Ok(())
}

/// Trains the predictor if a dataset is configured. Failure only disables prediction.
fn load_predictor(config: &IntakeConfig) -> Option<DatasetPredictor> {
    let Some(path) = config.dataset_path() else {
        tracing::warn!("no dataset configured; condition prediction disabled");
        return None;
    };

    match DatasetPredictor::from_path(path) {
        Ok(predictor) => Some(predictor),
        Err(e) => {
            tracing::warn!("condition prediction disabled: {}", e);
            None
        }
    }
}

fn train(config: &IntakeConfig) -> anyhow::Result<()> {
    let path = config
        .dataset_path()
        .context("no dataset found; pass --dataset or set INTAKE_DATASET")?;
    let predictor = DatasetPredictor::from_path(path)
        .with_context(|| format!("failed to train on {}", path.display()))?;

    println!("Model accuracies:");
    for score in predictor.ranking() {
        println!("  {}: {:.3}", score.name, score.accuracy);
    }
    if let Some(best) = predictor.ranking().first() {
        println!("Best model: {}", best.name);
    }
    Ok(())
}
