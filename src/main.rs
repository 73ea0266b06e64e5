use std::path::PathBuf;

use anyhow::Context;
use clap::{Parser, Subcommand};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use pcgs_scalar::api::{self, SessionRegistry};
use pcgs_scalar::config::ServerConfig;
use pcgs_scalar::models::ScalarCollection;
use pcgs_scalar::render::render_outline;
use pcgs_scalar::scalar_file::{read_scalar_file, write_scalar_file};
use pcgs_scalar::{bloom, service::ScalarService};

#[derive(Parser)]
#[command(name = "pcgs")]
#[command(about = "Course scalar editing: CLOs, topics, lessons and performance criteria")]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Start the scalar API server
    Serve {
        /// Port for HTTP API (overrides PCGS_PORT)
        #[arg(short, long)]
        port: Option<u16>,
    },
    /// Import a scalar template workbook
    Import {
        /// Path to the .xlsx workbook
        workbook: PathBuf,

        /// Write the imported scalar to this JSON file
        #[arg(short, long)]
        out: Option<PathBuf>,
    },
    /// Check every CLO of a scalar file for a Bloom's verb
    Validate {
        /// Scalar JSON file
        file: PathBuf,

        /// Write the file back with verbs capitalized
        #[arg(long)]
        fix: bool,
    },
    /// Check whether a single objective opens with a Bloom's verb
    Check { text: String },
    /// Print a scalar file as an outline
    Show {
        /// Scalar JSON file
        file: PathBuf,

        /// Include levels without entries
        #[arg(long)]
        all: bool,
    },
}

/// Initialize tracing with output to stderr (one-shot commands) or stdout
fn init_tracing(use_stderr: bool) {
    let filter = tracing_subscriber::EnvFilter::new(
        std::env::var("RUST_LOG").unwrap_or_else(|_| "pcgs_scalar=debug,tower_http=debug".into()),
    );

    if use_stderr {
        // Command output goes to stdout; keep logs out of it
        tracing_subscriber::registry()
            .with(filter)
            .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
            .init();
    } else {
        tracing_subscriber::registry()
            .with(filter)
            .with(tracing_subscriber::fmt::layer())
            .init();
    }
}

async fn serve(port: Option<u16>) -> anyhow::Result<()> {
    let mut config = ServerConfig::from_env();
    if let Some(port) = port {
        config = config.with_port(port);
    }

    let app = api::create_router(SessionRegistry::new(), &config);
    let listener = tokio::net::TcpListener::bind(config.bind_addr()).await?;
    tracing::info!("Scalar server listening on http://{}", config.bind_addr());

    axum::serve(listener, app).await?;
    Ok(())
}

fn print_warnings(warnings: &[String]) {
    for warning in warnings {
        println!("{}", warning);
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let use_stderr = !matches!(cli.command, None | Some(Commands::Serve { .. }));
    init_tracing(use_stderr);

    match cli.command {
        Some(Commands::Serve { port }) => serve(port).await?,
        None => serve(None).await?,
        Some(Commands::Import { workbook, out }) => {
            let bytes = std::fs::read(&workbook)
                .with_context(|| format!("Failed to read workbook {}", workbook.display()))?;

            let mut service = ScalarService::new();
            let report = service.import_from_spreadsheet(&bytes)?;
            println!("{}", report.message);
            print_warnings(service.warnings());

            if let Some(out) = out {
                service.set_collection(report.collection);
                write_scalar_file(&out, &service.save())?;
                println!("Wrote {}", out.display());
            }
        }
        Some(Commands::Validate { file, fix }) => {
            let data = read_scalar_file(&file)?;
            let mut service = ScalarService::new();
            service.load(&data);

            if service.warnings().is_empty() {
                println!("All CLOs start with a Bloom's performance verb.");
            } else {
                print_warnings(service.warnings());
            }

            if fix {
                write_scalar_file(&file, &service.save())?;
                println!("Wrote {}", file.display());
            }
        }
        Some(Commands::Check { text }) => {
            let check = bloom::check_verb(&text);
            match check.verb {
                Some(verb) => {
                    let categories: Vec<String> = bloom::categories_of(&verb)
                        .iter()
                        .map(|c| format!("{:?}", c))
                        .collect();
                    println!("{} [{}]", check.corrected_text, categories.join(", "));
                }
                None => {
                    println!("No Bloom's performance verb at the start of: {}", text);
                    println!("Try one of: {}", bloom::suggestions(10).join(", "));
                }
            }
        }
        Some(Commands::Show { file, all }) => {
            let data = read_scalar_file(&file)?;
            print!(
                "{}",
                render_outline(&ScalarCollection::from_list(&data), all)
            );
        }
    }

    Ok(())
}
