use std::io::Write;

use clap::Parser;
use gix_upload_request::{encode, Capabilities, Depth, PacketLineSink, UploadRequest};

/// Write the pkt-line encoded upload-request for the given wants to stdout.
#[derive(Debug, Parser)]
#[command(name = "gix-upload-request", version)]
struct Args {
    /// Hexadecimal ids of the objects to want.
    #[arg(value_name = "WANT")]
    wants: Vec<String>,

    /// Hexadecimal id of a commit at which local history ends. May be repeated.
    #[arg(long = "shallow", value_name = "ID")]
    shallows: Vec<String>,

    /// Limit history to this many commits.
    #[arg(long, value_name = "COMMITS", conflicts_with_all = ["deepen_since", "deepen_not"])]
    deepen: Option<u32>,

    /// Limit history to commits younger than this unix timestamp.
    #[arg(long, value_name = "SECONDS", conflicts_with = "deepen_not", allow_negative_numbers = true)]
    deepen_since: Option<i64>,

    /// Exclude history reachable from this reference.
    #[arg(long, value_name = "REF")]
    deepen_not: Option<String>,

    /// Space separated capabilities to request, like "ofs-delta agent=git/2.43.0".
    #[arg(long, short = 'c', default_value = "")]
    capabilities: String,

    /// Refuse requests whose capabilities don't allow their shallows or depth.
    #[arg(long)]
    strict: bool,

    /// Log encoding progress to stderr.
    #[arg(long, short = 'v')]
    verbose: bool,
}

fn main() {
    let args = Args::parse();
    init_logging(args.verbose);
    if let Err(err) = run(args) {
        let mut message = format!("error: {err}");
        let mut source = err.source();
        while let Some(cause) = source {
            message.push_str(&format!(": {cause}"));
            source = cause.source();
        }
        eprintln!("{message}");
        std::process::exit(1);
    }
}

fn run(args: Args) -> Result<(), Box<dyn std::error::Error>> {
    let mut request = UploadRequest::new().with_capabilities(Capabilities::from_bytes(args.capabilities.as_bytes())?);
    for hex in &args.wants {
        request.wants.push(gix_hash::ObjectId::from_hex(hex.as_bytes())?);
    }
    for hex in &args.shallows {
        request.shallows.push(gix_hash::ObjectId::from_hex(hex.as_bytes())?);
    }
    request.depth = match (args.deepen, args.deepen_since, args.deepen_not) {
        (Some(commits), _, _) => Depth::Commits(commits),
        (_, Some(seconds), _) => Depth::Since(gix_date::Time::new(seconds, 0)),
        (_, _, Some(name)) => Depth::Reference(name.into()),
        (None, None, None) => Depth::None,
    };

    let stdout = std::io::stdout();
    let mut encoder = encode::Encoder::with_options(
        PacketLineSink::new(stdout.lock()),
        encode::Options::new().with_strict(args.strict),
    );
    encoder.encode(&request)?;
    encoder.into_inner().into_inner().flush()?;
    Ok(())
}

#[cfg(feature = "tracing")]
fn init_logging(verbose: bool) {
    if verbose {
        tracing_subscriber::fmt()
            .with_max_level(tracing_subscriber::filter::LevelFilter::DEBUG)
            .with_writer(std::io::stderr)
            .init();
    }
}

#[cfg(not(feature = "tracing"))]
fn init_logging(_verbose: bool) {}
