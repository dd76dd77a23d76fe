use alertbook_cli::config::AppConfig;
use alertbook_cli::pipeline::{self, CatalogueRun, Delivery, RunOutcome};
use alertbook_common::types::ConfluenceCredentials;
use alertbook_notify::confluence::ConfluenceClient;
use alertbook_notify::publisher::{PageTitle, PublishOutcome, ReportPublisher};
use alertbook_notify::report_template::format_updated_at;
use alertbook_notify::utils::redact_sensitive_json;
use alertbook_source::local::LocalDirSource;
use alertbook_source::s3::S3Source;
use alertbook_source::secrets::SecretsManagerStore;
use alertbook_source::{fetch_json_secret, AlertSource};
use anyhow::{Context, Result};
use aws_config::{BehaviorVersion, Region, SdkConfig};
use clap::error::ErrorKind;
use clap::{Args, CommandFactory, Parser, Subcommand};
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "alertbook", version, about = "Publishes the Prometheus alert catalogue to Confluence")]
struct Cli {
    /// TOML configuration file; defaults apply when it does not exist.
    #[arg(long, global = true, default_value = "config/alertbook.toml")]
    config: PathBuf,
    #[arg(long, short, global = true)]
    verbose: bool,
    /// Render and print the page body without contacting the wiki.
    #[arg(long, global = true)]
    dry_run: bool,
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Catalogue of rule files stored in S3, credentials from Secrets Manager.
    S3 {
        #[arg(long)]
        bucket: Option<String>,
        #[arg(long)]
        prefix: Option<String>,
        /// Also treat `.txt` objects as rule files.
        #[arg(long)]
        include_txt: bool,
    },
    /// Catalogue of rule files in a local directory, credentials from the
    /// environment (or `.env`).
    Local {
        #[arg(long, default_value = ".")]
        dir: PathBuf,
        #[command(flatten)]
        confluence: ConfluenceArgs,
    },
    /// Disabled-alerts report from per-environment override files in S3.
    Overrides {
        #[arg(long)]
        bucket: Option<String>,
        /// Override file key; repeat once per environment.
        #[arg(long = "key")]
        keys: Vec<String>,
    },
    /// Alert variables table from a single YAML sheet in S3.
    Variables {
        #[arg(long)]
        bucket: Option<String>,
        #[arg(long)]
        key: Option<String>,
    },
}

/// Optional at parse time so `--dry-run` works without them; required
/// before anything is published.
#[derive(Args)]
struct ConfluenceArgs {
    #[arg(long, env = "CONFLUENCE_URL")]
    confluence_url: Option<String>,
    #[arg(long, env = "CONFLUENCE_USER")]
    confluence_user: Option<String>,
    #[arg(long, env = "CONFLUENCE_API_TOKEN", hide_env_values = true)]
    confluence_api_token: Option<String>,
    #[arg(long, env = "CONFLUENCE_PAGE_ID")]
    confluence_page_id: Option<String>,
}

impl ConfluenceArgs {
    /// Names of the settings that were not given.
    fn missing(&self) -> Vec<&'static str> {
        [
            ("CONFLUENCE_URL", &self.confluence_url),
            ("CONFLUENCE_USER", &self.confluence_user),
            ("CONFLUENCE_API_TOKEN", &self.confluence_api_token),
            ("CONFLUENCE_PAGE_ID", &self.confluence_page_id),
        ]
        .into_iter()
        .filter(|(_, value)| value.is_none())
        .map(|(name, _)| name)
        .collect()
    }

    /// Credentials, or a usage error (exit code 2) naming what is missing.
    fn into_credentials(self) -> ConfluenceCredentials {
        let missing = self.missing();
        match (
            self.confluence_url,
            self.confluence_user,
            self.confluence_api_token,
            self.confluence_page_id,
        ) {
            (Some(url), Some(user), Some(api_token), Some(page_id)) => ConfluenceCredentials {
                url,
                user,
                api_token,
                page_id,
            },
            _ => Cli::command()
                .error(
                    ErrorKind::MissingRequiredArgument,
                    format!(
                        "missing Confluence settings: {} (set them in the environment or .env, or pass --dry-run)",
                        missing.join(", ")
                    ),
                )
                .exit(),
        }
    }
}

async fn load_aws_config(region: Option<&str>) -> SdkConfig {
    let mut loader = aws_config::defaults(BehaviorVersion::latest());
    if let Some(region) = region {
        loader = loader.region(Region::new(region.to_string()));
    }
    loader.load().await
}

async fn credentials_from_secret(aws: &SdkConfig, name: &str) -> Result<ConfluenceCredentials> {
    let store = SecretsManagerStore::new(aws_sdk_secretsmanager::Client::new(aws));
    let credentials = fetch_json_secret(&store, name)
        .await
        .with_context(|| format!("Failed to retrieve secret {name}"))?;
    tracing::info!(secret = name, "Retrieved Confluence credentials");
    Ok(credentials)
}

fn build_publisher(
    credentials: &ConfluenceCredentials,
    config: &AppConfig,
    title: PageTitle,
) -> Result<ReportPublisher> {
    let client = ConfluenceClient::new(credentials, config.http_timeout_secs)
        .context("Invalid Confluence settings")?;
    Ok(ReportPublisher::new(Box::new(client), title))
}

#[allow(clippy::print_stdout)]
fn report(outcome: &RunOutcome) {
    match outcome {
        RunOutcome::NoData => tracing::warn!("Nothing to publish"),
        RunOutcome::DryRun(html) => println!("{html}"),
        RunOutcome::Published(PublishOutcome::Updated { version, status }) => {
            tracing::info!(version, status, "Run finished, page updated");
        }
        RunOutcome::Published(outcome) => tracing::info!(outcome = ?outcome, "Run finished"),
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    dotenvy::dotenv().ok();
    let cli = Cli::parse();

    let directive = if cli.verbose {
        "alertbook=debug"
    } else {
        "alertbook=info"
    };
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env().add_directive(directive.parse()?))
        .init();

    let mut config = AppConfig::load(&cli.config)
        .with_context(|| format!("Failed to load config {}", cli.config.display()))?;
    let updated_at = format_updated_at(&chrono::Local::now());

    let outcome = match cli.command {
        Command::S3 {
            bucket,
            prefix,
            include_txt,
        } => {
            if bucket.is_some() {
                config.bucket = bucket;
            }
            if prefix.is_some() {
                config.prefix = prefix;
            }
            log_config(&config);

            let mut filter = config.extension_filter();
            if include_txt {
                filter = filter.with_extension("txt");
            }
            let aws = load_aws_config(config.region.as_deref()).await;
            let bucket = config
                .bucket
                .clone()
                .context("No bucket configured; pass --bucket or set `bucket` in the config")?;
            let source = S3Source::new(
                aws_sdk_s3::Client::new(&aws),
                bucket,
                config.prefix.clone(),
            )?;

            let publisher = if cli.dry_run {
                None
            } else {
                let credentials = credentials_from_secret(&aws, &config.secret_name).await?;
                Some(build_publisher(&credentials, &config, config.page_title())?)
            };
            run_catalogue(&source, &config, &filter, &updated_at, publisher.as_ref()).await?
        }
        Command::Local { dir, confluence } => {
            log_config(&config);
            let source = LocalDirSource::new(dir);
            let filter = config.extension_filter();
            let publisher = if cli.dry_run {
                None
            } else {
                let credentials = confluence.into_credentials();
                Some(build_publisher(&credentials, &config, config.page_title())?)
            };
            run_catalogue(&source, &config, &filter, &updated_at, publisher.as_ref()).await?
        }
        Command::Overrides { bucket, keys } => {
            if bucket.is_some() {
                config.overrides.bucket = bucket;
            }
            if !keys.is_empty() {
                config.overrides.keys = keys;
            }
            log_config(&config);

            let aws = load_aws_config(config.region.as_deref()).await;
            let bucket = config
                .overrides_bucket()
                .context("No override bucket configured; pass --bucket or set `overrides.bucket`")?
                .to_string();
            let source = S3Source::new(aws_sdk_s3::Client::new(&aws), bucket, None)?;

            let publisher = if cli.dry_run {
                None
            } else {
                let credentials =
                    credentials_from_secret(&aws, config.overrides_secret_name()).await?;
                Some(build_publisher(&credentials, &config, PageTitle::KeepExisting)?)
            };
            let delivery = match publisher.as_ref() {
                Some(publisher) => Delivery::Publish(publisher),
                None => Delivery::DryRun,
            };
            pipeline::run_overrides(&source, &config.overrides.keys, delivery).await?
        }
        Command::Variables { bucket, key } => {
            if bucket.is_some() {
                config.variables.bucket = bucket;
            }
            if let Some(key) = key {
                config.variables.key = key;
            }
            log_config(&config);

            let aws = load_aws_config(config.region.as_deref()).await;
            let bucket = config
                .variables_bucket()
                .context("No variables bucket configured; pass --bucket or set `variables.bucket`")?
                .to_string();
            let source = S3Source::new(aws_sdk_s3::Client::new(&aws), bucket, None)?;

            let publisher = if cli.dry_run {
                None
            } else {
                let credentials =
                    credentials_from_secret(&aws, config.variables_secret_name()).await?;
                Some(build_publisher(&credentials, &config, PageTitle::KeepExisting)?)
            };
            let delivery = match publisher.as_ref() {
                Some(publisher) => Delivery::Publish(publisher),
                None => Delivery::DryRun,
            };
            pipeline::run_variables(&source, &config.variables.key, delivery).await?
        }
    };

    report(&outcome);
    Ok(())
}

async fn run_catalogue(
    source: &dyn AlertSource,
    config: &AppConfig,
    filter: &alertbook_source::ExtensionFilter,
    updated_at: &str,
    publisher: Option<&ReportPublisher>,
) -> Result<RunOutcome> {
    tracing::info!(source = %source.describe(), "alertbook starting");
    let delivery = match publisher {
        Some(publisher) => Delivery::Publish(publisher),
        None => Delivery::DryRun,
    };
    pipeline::handle_event(
        serde_json::json!({}),
        source,
        CatalogueRun {
            filter,
            team_info: &config.team_info,
            updated_at,
            delivery,
        },
    )
    .await
}

fn log_config(config: &AppConfig) {
    match serde_json::to_value(config) {
        Ok(value) => {
            tracing::debug!(config = %redact_sensitive_json(&value), "Effective configuration");
        }
        Err(e) => tracing::warn!(error = %e, "Could not serialize configuration"),
    }
}
