mod dump;
mod filter;
mod info;

use std::fs::File;
use std::io::{stderr, stdout, BufReader, BufWriter};
use std::path::{Path, PathBuf};

use anyhow::{anyhow, bail, Context, Result};
use clap::{Args, Parser, Subcommand};
use gpstlm::catalogue::{Apid, MAX_PAYLOAD_LEN};
use gpstlm::stream::{FrameDecoder, FrameReaderIter};
use tracing::{debug, info};
use tracing_subscriber::EnvFilter;

use filter::ApidFilter;

#[derive(Parser)]
#[command(version, about)]
struct Cli {
    #[command(flatten)]
    decoder: DecoderArgs,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Args)]
struct DecoderArgs {
    /// Maximum number of bytes discarded while resynchronizing before giving up.
    #[arg(long, global = true, default_value_t = FrameDecoder::DEFAULT_RESYNC_LIMIT)]
    resync_limit: usize,

    /// Largest payload length accepted in a header. Defaults to the largest catalogue
    /// payload.
    #[arg(long, global = true, default_value_t = MAX_PAYLOAD_LEN)]
    max_payload: usize,

    /// Accept known packet ids whose header length differs from the catalogue length
    /// instead of treating them as a loss of sync.
    #[arg(long, global = true, action)]
    no_length_check: bool,
}

#[derive(Args)]
struct IdArgs {
    /// Include these packet ids or id ranges.
    ///
    /// This accepts a CSV of ids as well as ranges of the format <start>-<end>
    /// where start and end are inclusive. For example, you can specify
    /// --include 0,1,2,9,11 or --include 0-2,9,11
    ///
    /// If used with --exclude, values are first included, then excluded.
    #[arg(short, long, value_name = "csv", value_delimiter = ',')]
    include: Vec<String>,

    /// Exclude these packet ids or id ranges.
    #[arg(short, long, value_name = "csv", value_delimiter = ',')]
    exclude: Vec<String>,
}

#[derive(Subcommand)]
enum Commands {
    /// Show information about a telemetry log
    Info {
        /// Input log file
        input: PathBuf,

        /// Output format
        #[arg(short, long, default_value = "text")]
        format: info::Format,
    },
    /// Decode a telemetry log, writing one JSON object per message to stdout.
    Dump {
        #[command(flatten)]
        ids: IdArgs,

        /// Input log file
        input: PathBuf,
    },
    /// Write selected frames of a telemetry log to a new log.
    Filter {
        #[command(flatten)]
        ids: IdArgs,

        /// Delete output file if it already exists
        #[arg(long, action)]
        clobber: bool,

        /// Output file path.
        #[arg(short, long, default_value = "filtered.dat", value_name = "path")]
        output: PathBuf,

        /// Input log file
        input: PathBuf,
    },
}

/// Parse a CSV of packet ids and inclusive `<start>-<end>` ranges.
fn parse_apids(list: &[String]) -> Result<Vec<Apid>> {
    let rx = regex::Regex::new(r"^(?:(\d+)|(\d+)-(\d+))$").expect("regex to compile");
    let parse = |i: usize, s: &str| {
        s.parse::<Apid>()
            .map_err(|_| anyhow!("invalid packet id at {i}: {s:?} (max {})", Apid::MAX))
    };
    let mut values = Vec::default();
    for (i, s) in list.iter().enumerate() {
        let Some(cap) = rx.captures(s.trim()) else {
            bail!("invalid number or range at {i}: {s:?}");
        };

        if let Some(x) = cap.get(1) {
            values.push(parse(i, x.as_str())?);
        } else {
            let start = parse(i, &cap[2])?;
            let end = parse(i, &cap[3])?;
            if start > end {
                bail!("invalid range at {i}: {s:?}");
            }
            values.extend(start..=end);
        }
    }

    Ok(values)
}

impl IdArgs {
    fn apid_filter(&self) -> Result<ApidFilter> {
        let include = parse_apids(&self.include)?;
        let exclude = parse_apids(&self.exclude)?;
        debug!("including ids {:?}", include);
        debug!("excluding ids {:?}", exclude);
        Ok(ApidFilter::new(&include, &exclude))
    }
}

impl DecoderArgs {
    fn open(&self, input: &Path) -> Result<FrameReaderIter<BufReader<File>>> {
        let file = File::open(input).with_context(|| format!("opening input {input:?}"))?;
        let decoder = FrameDecoder::new()
            .with_max_payload(self.max_payload)
            .with_resync_limit(self.resync_limit)
            .with_length_check(!self.no_length_check);
        Ok(FrameReaderIter::new(BufReader::new(file), decoder))
    }
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    tracing_subscriber::fmt()
        .with_target(false)
        .with_writer(stderr)
        .with_ansi(false)
        .without_time()
        .with_env_filter(
            EnvFilter::try_from_env("GPSTLM_LOG").unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    debug!("{} {}", env!("CARGO_PKG_NAME"), env!("CARGO_PKG_VERSION"));

    match &cli.command {
        Commands::Info { input, format } => info::info(
            input,
            cli.decoder.open(input)?,
            *format,
            BufWriter::new(stdout().lock()),
        ),
        Commands::Dump { ids, input } => {
            let apids = ids.apid_filter()?;
            let out = BufWriter::new(stdout().lock());
            dump::dump(cli.decoder.open(input)?, out, &apids)
        }
        Commands::Filter {
            ids,
            clobber,
            output,
            input,
        } => {
            if !clobber && output.exists() {
                bail!("{output:?} exists; use --clobber");
            }
            let apids = ids.apid_filter()?;
            let frames = cli.decoder.open(input)?;
            let dest = File::create(output)
                .with_context(|| format!("failed to create output {output:?}"))?;
            info!("filtering {input:?} to {output:?}");
            filter::filter(frames, BufWriter::new(dest), &apids)
        }
    }
}
