use clap::{Parser, Subcommand};
use dotenv::dotenv;
use eligibility_rs::config::Settings;
use eligibility_rs::policy::catalogue::FieldCatalogue;
use eligibility_rs::policy::loader::PolicyLoader;
use eligibility_rs::policy::rule::Evaluator;
use eligibility_rs::policy::validate::PolicyValidator;
use eligibility_rs::server::{self, AppState};
use eligibility_rs::EligibilityError;

use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Evaluate an applicant record against a policy
    Evaluate {
        /// Path to the policy file (JSON or YAML)
        #[arg(short, long)]
        policy: PathBuf,

        /// Path to the applicant record (JSON or YAML)
        #[arg(short, long)]
        record: PathBuf,
    },
    /// Check a policy for unknown fields, operators and malformed values
    Validate {
        /// Path to the policy file
        #[arg(short, long)]
        policy: PathBuf,

        /// Field catalogue to check against
        #[arg(short, long)]
        catalogue: Option<PathBuf>,
    },
    /// Print the field catalogue
    Fields {
        #[arg(short, long)]
        catalogue: Option<PathBuf>,
    },
    /// Run the HTTP API
    Serve {
        #[arg(short, long)]
        port: Option<u16>,

        #[arg(short, long)]
        catalogue: Option<PathBuf>,
    },
}

fn load_catalogue(
    loader: &PolicyLoader,
    path: Option<PathBuf>,
) -> Result<FieldCatalogue, EligibilityError> {
    match path {
        Some(path) => {
            log::info!("Loading field catalogue from {}", path.display());
            loader.load_catalogue(path)
        }
        None => Ok(FieldCatalogue::default()),
    }
}

#[tokio::main]
async fn main() {
    dotenv().ok();
    env_logger::init();

    let args = Args::parse();
    if let Err(e) = run(args).await {
        log::error!("{}", e);
        std::process::exit(1);
    }
}

async fn run(args: Args) -> Result<(), EligibilityError> {
    let settings = Settings::from_env()?;
    let loader = PolicyLoader::new();
    let evaluator = Evaluator::with_max_depth(settings.max_depth);

    match args.command {
        Commands::Evaluate { policy, record } => {
            let policy = loader.load_policy(&policy)?;
            let record = loader.load_record(&record)?;

            let verdict = evaluator.evaluate_policy(&policy, &record);
            for diagnostic in &verdict.diagnostics {
                log::warn!("Policy diagnostic: {}", diagnostic);
            }
            println!("{}", serde_json::to_string_pretty(&verdict)?);
        }
        Commands::Validate { policy, catalogue } => {
            let catalogue = load_catalogue(&loader, catalogue.or(settings.catalogue))?;
            let policy = loader.load_policy(&policy)?;

            let issues = PolicyValidator::new(&catalogue)
                .with_max_depth(settings.max_depth)
                .validate(&policy);
            if issues.is_empty() {
                println!("Policy is valid");
            } else {
                for issue in &issues {
                    println!("{}", issue);
                }
                return Err(EligibilityError::InvalidPolicy(issues));
            }
        }
        Commands::Fields { catalogue } => {
            let catalogue = load_catalogue(&loader, catalogue.or(settings.catalogue))?;
            println!("{}", serde_json::to_string_pretty(&catalogue)?);
        }
        Commands::Serve { port, catalogue } => {
            let catalogue = load_catalogue(&loader, catalogue.or(settings.catalogue))?;
            log::info!("Serving {} catalogue field(s)", catalogue.len());

            let state = AppState {
                catalogue,
                evaluator,
            };
            server::serve(port.unwrap_or(settings.port), state).await?;
        }
    }

    Ok(())
}
