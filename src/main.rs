use anyhow::{Context, Result};
use clap::{Parser, Subcommand, ValueEnum};
use costctl::carbon::coefficients::grid_regions;
use costctl::config::{self, Config, OutputFormat};
use costctl::engine::{Engine, EstimateOptions, SupportQuery};
use costctl::exit_codes::exit_code_for_anyhow_error;
use costctl::pricing::embedded;
use costctl::report::{self, ReportRow};
use costctl::request::ResourceRequest;
use std::path::{Path, PathBuf};
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "costctl")]
#[command(
    about = "Offline cost and carbon estimates for AWS resources",
    long_about = "costctl projects monthly cost and operational carbon for AWS resources\nusing price and power data compiled into the binary. No network calls.\n\nSupports EC2, EBS, S3, RDS, EKS, Lambda, ELB, NAT Gateway, DynamoDB and CloudWatch."
)]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Configuration file path
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    /// Enable verbose output
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Log format on stderr
    #[arg(long, global = true, value_enum, default_value_t = LogFormat::Text)]
    log_format: LogFormat,

    /// Region this instance serves (overrides the config file)
    #[arg(long, global = true, env = "COSTCTL_REGION")]
    region: Option<String>,

    /// Include calculation steps in every result
    #[arg(long, global = true, env = "COSTCTL_ENHANCED_DIAGNOSTICS")]
    enhanced_diagnostics: bool,

    /// Output format (overrides the config file)
    #[arg(id = "format", long = "format", global = true, value_enum)]
    output: Option<OutputArg>,
}

#[derive(Clone, Copy, ValueEnum)]
enum LogFormat {
    Text,
    Json,
}

#[derive(Clone, Copy, ValueEnum)]
enum OutputArg {
    Table,
    Json,
}

impl From<OutputArg> for OutputFormat {
    fn from(arg: OutputArg) -> Self {
        match arg {
            OutputArg::Table => OutputFormat::Table,
            OutputArg::Json => OutputFormat::Json,
        }
    }
}

#[derive(Subcommand)]
enum Commands {
    /// Estimate monthly cost (and optionally carbon) for resources
    Estimate {
        /// Service family (ec2, rds, aws:s3/bucket:Bucket, ...)
        #[arg(required_unless_present = "input")]
        service: Option<String>,
        /// SKU: instance type, volume type, storage class, ...
        sku: Option<String>,
        /// Usage tag, repeatable (e.g. --tag size=100)
        #[arg(short, long = "tag", value_parser = parse_tag)]
        tags: Vec<(String, String)>,
        /// JSON file with one request or a list of requests
        #[arg(short, long, conflicts_with = "service")]
        input: Option<PathBuf>,
        /// Attach the carbon metric
        #[arg(long)]
        carbon: bool,
        /// Utilization for carbon when a resource has no utilization tag
        #[arg(long)]
        utilization: Option<f64>,
        /// Cloud provider
        #[arg(long, default_value = "aws")]
        provider: String,
    },
    /// Check whether a service family can be estimated
    Supports {
        /// Service family
        service: String,
        /// Cloud provider
        #[arg(long, default_value = "aws")]
        provider: String,
        /// Region to ask about (defaults to the configured region)
        #[arg(long = "for-region")]
        for_region: Option<String>,
    },
    /// Initialize configuration
    Init {
        /// Output path for config file
        #[arg(short, long, default_value = ".costctl.toml")]
        output: PathBuf,
    },
    /// List regions with embedded price data
    Regions,
}

fn parse_tag(raw: &str) -> std::result::Result<(String, String), String> {
    let (key, value) = raw
        .split_once('=')
        .ok_or_else(|| format!("expected key=value, got {:?}", raw))?;
    let key = key.trim();
    if key.is_empty() {
        return Err(format!("empty tag key in {:?}", raw));
    }
    Ok((key.to_string(), value.trim().to_string()))
}

fn init_logging(verbose: bool, format: LogFormat) {
    // Suppress INFO by default, only show warnings and errors
    let filter = if verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"))
    };

    let builder = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr);
    match format {
        LogFormat::Text => builder.init(),
        LogFormat::Json => builder.json().init(),
    }
}

fn main() {
    let cli = Cli::parse();
    init_logging(cli.verbose, cli.log_format);

    if let Err(e) = run(cli) {
        eprintln!("ERROR: {:#}", e);
        std::process::exit(exit_code_for_anyhow_error(&e));
    }
}

fn run(cli: Cli) -> Result<()> {
    // Load config, then apply command line and environment overrides
    let mut config = Config::load(cli.config.as_deref())?;
    if let Some(region) = &cli.region {
        config.engine.region = region.clone();
    }
    if cli.enhanced_diagnostics {
        config.engine.enhanced_diagnostics = true;
    }
    if let Some(output) = cli.output {
        config.output.format = output.into();
    }

    match cli.command {
        Commands::Estimate {
            service,
            sku,
            tags,
            input,
            carbon,
            utilization,
            provider,
        } => {
            let requests = match input {
                Some(path) => load_requests(&path, &config.engine.region)?,
                None => {
                    let service = service.context("service family is required")?;
                    let mut request = ResourceRequest::new(
                        provider,
                        service,
                        sku.unwrap_or_default(),
                        config.engine.region.clone(),
                    );
                    request.usage_tags.extend(tags);
                    vec![request]
                }
            };
            let options = EstimateOptions {
                include_carbon: carbon,
                utilization_override: utilization,
            };
            estimate(&config, requests, &options)?;
        }
        Commands::Supports {
            service,
            provider,
            for_region,
        } => {
            let engine = Engine::new(config.engine_config()?);
            let region = for_region.unwrap_or_else(|| config.engine.region.clone());
            let result = engine.supports(&SupportQuery::new(provider, service, region));
            match config.output.format {
                OutputFormat::Json => println!("{}", serde_json::to_string_pretty(&result)?),
                OutputFormat::Table => {
                    if result.supported {
                        let service = result.service.map(|s| s.as_str()).unwrap_or("-");
                        println!("supported ({} in {})", service, engine.region());
                    } else {
                        println!(
                            "not supported: {}",
                            result.reason.as_deref().unwrap_or("unknown reason")
                        );
                    }
                }
            }
        }
        Commands::Regions => {
            let carbon_regions: Vec<&str> = grid_regions().collect();
            for region in embedded::embedded_regions() {
                let carbon = if carbon_regions.contains(&region) {
                    "carbon"
                } else {
                    "no carbon data"
                };
                let marker = if region == config.engine.region { "*" } else { " " };
                println!("{} {} ({})", marker, region, carbon);
            }
        }
        Commands::Init { output } => {
            config::init_config(&output)?;
        }
    }

    Ok(())
}

fn load_requests(path: &Path, default_region: &str) -> Result<Vec<ResourceRequest>> {
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read requests: {}", path.display()))?;
    let value: serde_json::Value = serde_json::from_str(&content)
        .with_context(|| format!("Failed to parse requests: {}", path.display()))?;
    let mut requests: Vec<ResourceRequest> = if value.is_array() {
        serde_json::from_value(value)
    } else {
        serde_json::from_value(value).map(|r| vec![r])
    }
    .with_context(|| format!("Invalid request in {}", path.display()))?;

    for request in &mut requests {
        if request.region.trim().is_empty() {
            request.region = default_region.to_string();
        }
    }
    Ok(requests)
}

fn estimate(config: &Config, requests: Vec<ResourceRequest>, options: &EstimateOptions) -> Result<()> {
    let engine = Engine::new(config.engine_config()?);

    let mut rows = Vec::with_capacity(requests.len());
    for request in requests {
        let estimate = engine.estimate(&request, options)?;
        rows.push(ReportRow { request, estimate });
    }

    match config.output.format {
        OutputFormat::Json => println!("{}", report::render_json(&rows)?),
        OutputFormat::Table => println!(
            "{}",
            report::render_table(&rows, engine.enhanced_diagnostics())
        ),
    }
    Ok(())
}
