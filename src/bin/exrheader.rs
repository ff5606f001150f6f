//! Print the header attributes of exr files.

use clap::Parser;
use rayon::prelude::*;
use std::path::PathBuf;
use std::process::ExitCode;
use tracing::{debug, error};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use exr_header::prelude::*;


/// Print the header attributes of exr files, without decoding any pixels.
#[derive(Parser, Debug)]
#[command(name = "exrheader")]
#[command(author, version, about, long_about = None)]
struct Cli {

    /// The exr files to inspect.
    #[arg(required = true)]
    paths: Vec<PathBuf>,

    /// Abort on anything that does not conform to the file format.
    #[arg(long, default_value_t = false)]
    pedantic: bool,

    /// Abort when an attribute name appears twice in a header.
    #[arg(long, default_value_t = false)]
    reject_duplicates: bool,

    /// Stop reading a header after this many attributes.
    #[arg(long)]
    max_attributes: Option<usize>,

    /// Log debug information.
    #[arg(short, long, default_value_t = false)]
    verbose: bool,
}

impl Cli {
    fn read_options(&self) -> ReadOptions {
        let mut options = if self.pedantic { ReadOptions::pedantic() } else { ReadOptions::lenient() };

        if self.reject_duplicates {
            options = options.with_duplicate_attributes(DuplicateAttributes::Reject);
        }

        if let Some(max_attributes) = self.max_attributes {
            options = options.with_max_attribute_count(max_attributes);
        }

        options
    }
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    let options = cli.read_options();
    debug!(?options, "reading {} files", cli.paths.len());

    // headers are read in parallel, but printed in the order of the arguments
    let results: Vec<Result<HeaderMetadata>> = cli.paths.par_iter()
        .map(|path| {
            let _span = tracing::info_span!("header", path = %path.display()).entered();
            HeaderMetadata::read_from_file(path, options, &mut TracingDiagnostics)
        })
        .collect();

    let mut failed = false;

    for (path, result) in cli.paths.iter().zip(results) {
        match result {
            Ok(header) => print_header(&path.display().to_string(), &header),

            Err(Error::NotFound(_)) => {
                error!("{}: not found", path.display());
                failed = true;
            },

            Err(error) => {
                error!("{}: {}", path.display(), error);
                failed = true;
            },
        }
    }

    if failed { ExitCode::FAILURE } else { ExitCode::SUCCESS }
}

fn print_header(title: &str, header: &HeaderMetadata) {
    println!("{}:", title);
    println!("  version {}, {} bytes, {} attributes", header.requirements.file_format_version, header.byte_size, header.len());

    for (name, value) in header.iter() {
        println!("  {} ({}): {}", name, value.kind(), value);
    }

    println!();
}

fn init_logging(verbose: bool) {
    let env_filter = if verbose { "exr_header=debug,exrheader=debug" } else { "exr_header=info,exrheader=info" };

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| env_filter.into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();
}
