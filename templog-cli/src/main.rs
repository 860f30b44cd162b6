use std::io::{self, Write};
use std::path::PathBuf;
use std::time::Duration;

use anyhow::{bail, Context};
use clap::{builder::TypedValueParser, Args, Parser};
use templog_connectors::{
    CloudLogger, Connector, CsvLogger, HttpConfig, HttpConnector, PendingStore, SheetsLogger, StdoutLogger,
};
use templog_core::{
    sampling::{DEFAULT_NUM_SAMPLES, DEFAULT_SAMPLE_DELAY_SECS},
    sensor::DEFAULT_HWMON_INPUT,
    HwmonSensor, Logger, Sampler, SamplingConfig, Sensor, SystemTime, TimeSource,
};

#[derive(Debug, Parser)]
#[command(
    name = "log-temp",
    version,
    about = "Log temperature in degrees Celsius from a hwmon temperature sensor",
    long_about = "Takes one or more readings from the sensor and logs them.\n\n\
        Readings can go to a CSV file, a spreadsheet and a cloud ingestion endpoint.\n\
        If none of those is given, the readings are printed to stdout.\n\n\
        EXAMPLES:\n\
        \n  log-temp                                   Print one reading\n\
        \n  log-temp -n 5 -d 1 -f temps.csv            Append five readings to a CSV file\n\
        \n  log-temp -s SHEET_ID -k token.txt          Append a row to a spreadsheet\n\
        \n  log-temp --ingest-url https://... --project-id p --device-id attic-1"
)]
struct Cli {
    /// Increase verbosity level (-v, -vv, -vvv)
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,

    #[command(flatten)]
    logging: LoggingArgs,

    #[command(flatten)]
    cloud: CloudArgs,

    #[command(flatten)]
    sampling: SamplingArgs,
}

#[derive(Debug, Args)]
#[command(next_help_heading = "Logging")]
struct LoggingArgs {
    /// Spreadsheet ID; requires -k/--keyfile
    #[arg(short = 's', long, value_name = "ID", requires = "keyfile")]
    sheet_id: Option<String>,

    /// File holding the spreadsheet API access token; requires -s/--sheet-id
    #[arg(short = 'k', long, value_name = "FILE", requires = "sheet_id")]
    keyfile: Option<PathBuf>,

    /// CSV file to which to log data
    #[arg(short = 'f', long, value_name = "FILE")]
    log_file: Option<PathBuf>,
}

#[derive(Debug, Args)]
#[command(next_help_heading = "Cloud")]
struct CloudArgs {
    /// Ingestion endpoint base URL; requires --project-id and --device-id
    #[arg(
        long,
        value_name = "URL",
        env = "TEMPLOG_INGEST_URL",
        requires_all = ["project_id", "device_id"]
    )]
    ingest_url: Option<String>,

    /// Bearer token for the ingestion endpoint
    #[arg(long, value_name = "TOKEN", env = "TEMPLOG_INGEST_TOKEN", hide_env_values = true)]
    ingest_token: Option<String>,

    /// Cloud project the device belongs to
    #[arg(long, value_name = "ID", env = "TEMPLOG_PROJECT_ID")]
    project_id: Option<String>,

    /// Device ID stamped on every measurement
    #[arg(long, value_name = "ID", env = "TEMPLOG_DEVICE_ID")]
    device_id: Option<String>,

    /// Directory for measurements that could not be sent
    #[arg(long, value_name = "DIR", env = "TEMPLOG_PENDING_DIR")]
    pending_dir: Option<PathBuf>,
}

#[derive(Debug, Args)]
#[command(next_help_heading = "Data sampling")]
struct SamplingArgs {
    /// Number of samples to take
    #[arg(
        short = 'n',
        long,
        default_value_t = DEFAULT_NUM_SAMPLES,
        value_parser = clap::value_parser!(u32).range(1..).map(|n| n as usize)
    )]
    num_samples: usize,

    /// Number of seconds to sleep between samples
    #[arg(short = 'd', long, value_name = "SECS", default_value_t = DEFAULT_SAMPLE_DELAY_SECS)]
    sample_delay: u64,

    /// hwmon temperature input to read (millidegrees Celsius)
    #[arg(long, value_name = "PATH", env = "TEMPLOG_SENSOR", default_value = DEFAULT_HWMON_INPUT)]
    sensor: PathBuf,
}

fn init_logging(verbose: u8) {
    let level = match verbose {
        0 => "warn",
        1 => "info",
        2 => "debug",
        _ => "trace",
    };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(level)).init();
}

/// Backends selected on the command line, excluding the cloud one
fn file_loggers<'a>(
    cli: &Cli,
    stdout: &'a mut dyn Write,
) -> anyhow::Result<Vec<(&'static str, Box<dyn Logger + 'a>)>> {
    let mut loggers: Vec<(&'static str, Box<dyn Logger + 'a>)> = Vec::new();

    if let Some(path) = &cli.logging.log_file {
        loggers.push(("csv", Box::new(CsvLogger::new(path))));
    }

    if let (Some(sheet_id), Some(keyfile)) = (&cli.logging.sheet_id, &cli.logging.keyfile) {
        let sheets = SheetsLogger::from_keyfile(keyfile, sheet_id.as_str())
            .with_context(|| format!("loading key file {}", keyfile.display()))?;
        loggers.push(("sheets", Box::new(sheets)));
    }

    // Log to stdout if not logging anywhere else
    if loggers.is_empty() && cli.cloud.ingest_url.is_none() {
        loggers.push(("stdout", Box::new(StdoutLogger::with_writer(stdout))));
    }

    Ok(loggers)
}

fn cloud_logger(args: &CloudArgs) -> anyhow::Result<Option<CloudLogger<HttpConnector>>> {
    let (Some(url), Some(project_id), Some(device_id)) =
        (&args.ingest_url, &args.project_id, &args.device_id)
    else {
        return Ok(None);
    };

    let mut config = HttpConfig::new(url.as_str());
    if let Some(token) = &args.ingest_token {
        config = config.bearer_token(token.as_str());
    }
    let connector = HttpConnector::new(config).context("configuring ingestion endpoint")?;

    let mut cloud = CloudLogger::new(project_id.as_str(), device_id.as_str(), connector);
    if let Some(dir) = &args.pending_dir {
        let store = PendingStore::create(dir)
            .with_context(|| format!("creating pending directory {}", dir.display()))?;
        cloud = cloud.with_pending(store);
    }
    Ok(Some(cloud))
}

fn run(
    cli: &Cli,
    sensor: &mut dyn Sensor,
    clock: &dyn TimeSource,
    stdout: &mut dyn Write,
) -> anyhow::Result<()> {
    let config = SamplingConfig::default()
        .num_samples(cli.sampling.num_samples)
        .sample_delay(Duration::from_secs(cli.sampling.sample_delay));

    let mut cloud = cloud_logger(&cli.cloud)?;
    let mut loggers = file_loggers(cli, stdout)?;

    let sample = Sampler::new(config)
        .sample(sensor, clock)
        .context("reading temperature sensor")?;

    let mut failures = 0;
    for (name, logger) in &mut loggers {
        if let Err(e) = logger.log(sample.timestamp, &sample.values) {
            log::error!("{name} logger failed: {e}");
            failures += 1;
        }
    }

    if let Some(cloud) = &mut cloud {
        if let Err(e) = cloud.publish_pending(clock.now()) {
            log::warn!("could not publish pending measurements: {e}");
        }
        if let Err(e) = cloud.log(sample.timestamp, &sample.values) {
            log::error!("cloud logger failed: {e}");
            failures += 1;
        }
        log::debug!("cloud transport: {:?}", cloud.connector().stats());
    }

    if failures > 0 {
        bail!("{failures} logger(s) failed");
    }
    Ok(())
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    let mut sensor = HwmonSensor::new(&cli.sampling.sensor);
    let mut stdout = io::stdout();
    run(&cli, &mut sensor, &SystemTime, &mut stdout)
}
