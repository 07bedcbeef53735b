use std::fs;
use std::io;
use std::io::Read;
use std::path::PathBuf;
use std::sync::Arc;

use anyhow::Context;
use app_version::config::{ConfigLoader, DEFAULT_APP_CONFIG_PATH, DEFAULT_ENV_PREFIX};
use app_version::publish::{self, Overwrite, PublishOutcome};
use app_version::{directives, version, VersionProvider, APP_NAME};
use clap::Parser;
use clap::Subcommand;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[derive(Parser)]
#[command(
    name = APP_NAME,
    about = "Reports the application version",
    version = &**version::VERSION,
    long_version = &**version::LONG_VERSION
)]
struct Cli {
    /// Application config file, layered over the bundled defaults
    /// [default: $APP_VERSION_CONFIG_PATH, then config/version.yaml if present]
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,
    /// Prefix of the VERSION, BUILD and FORMAT environment overrides
    #[arg(long, global = true, default_value = DEFAULT_ENV_PREFIX)]
    env_prefix: String,
    #[command(subcommand)]
    commands: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Prints the formatted application version
    Version,
    /// Prints the build identifier
    Build,
    /// Expands @app_version and @app_build in a template
    Render {
        /// Template file, stdin when omitted
        file: Option<PathBuf>,
    },
    /// Copies the default config file into the application
    Publish {
        /// Where to write the config file
        #[arg(short, long, default_value = DEFAULT_APP_CONFIG_PATH)]
        path: PathBuf,
        /// Overwrite an existing file without asking
        #[arg(short, long, default_value_t = false)]
        force: bool,
    },
}

fn main() -> anyhow::Result<()> {
    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::from_default_env())
        .with(
            tracing_subscriber::fmt::Layer::default()
                .compact()
                .with_writer(io::stderr),
        )
        .init();
    let cli = Cli::parse();
    if let Err(e) = main_int(cli) {
        tracing::error!("{:#}", e);
        return Err(e);
    }
    Ok(())
}

fn main_int(cli: Cli) -> anyhow::Result<()> {
    tracing::debug!(name = APP_NAME, version = &**version::VERSION, built = version::build_timestamp());

    let Cli {
        config,
        env_prefix,
        commands,
    } = cli;
    let load = || load_provider(config, &env_prefix);

    match commands.unwrap_or(Commands::Version) {
        Commands::Version => println!("{}", load()?.formatted()),
        Commands::Build => println!("{}", load()?.build()),
        Commands::Render { file } => {
            let provider = load()?;
            let template = read_template(file)?;
            print!("{}", directives::render(&template, &provider));
        }
        Commands::Publish { path, force } => {
            let overwrite = if force { Overwrite::Always } else { Overwrite::Ask };
            match publish::publish(&path, overwrite)? {
                PublishOutcome::Written(path) => println!("Published {}", path.display()),
                PublishOutcome::Skipped(path) => println!("Kept existing {}", path.display()),
            }
        }
    }
    Ok(())
}

/// Config errors are fatal here; once built the provider cannot fail.
fn load_provider(config: Option<PathBuf>, env_prefix: &str) -> anyhow::Result<Arc<VersionProvider>> {
    let map = ConfigLoader::standard(config, env_prefix).load()?;
    let provider = Arc::new(VersionProvider::new(&map));
    tracing::debug!(
        version = provider.version(),
        build = provider.build(),
        "version provider ready"
    );
    Ok(provider)
}

fn read_template(file: Option<PathBuf>) -> anyhow::Result<String> {
    match file {
        Some(path) => fs::read_to_string(&path)
            .with_context(|| format!("failed to read template '{}'", path.display())),
        None => {
            let mut template = String::new();
            io::stdin().read_to_string(&mut template)?;
            Ok(template)
        }
    }
}
