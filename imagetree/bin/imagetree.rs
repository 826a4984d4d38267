use std::io::{self, Write};

use clap::Parser;
use imagetree::{
    archive,
    cli::{AnsiStyles, ImageTreeArgs},
    config::{DEFAULT_LOG_FILTER, IMAGETREE_LOG_ENV_VAR, VERBOSE_LOG_FILTER},
    ImageTreeResult,
};
use tracing_subscriber::{fmt, EnvFilter};

//--------------------------------------------------------------------------------------------------
// Functions: main
//--------------------------------------------------------------------------------------------------

fn main() -> ImageTreeResult<()> {
    // Parse command line arguments
    let args = ImageTreeArgs::parse();

    // Initialize tracing subscriber, `IMAGETREE_LOG` wins over the verbose flag
    let fallback = if args.verbose {
        VERBOSE_LOG_FILTER
    } else {
        DEFAULT_LOG_FILTER
    };
    let filter = EnvFilter::try_from_env(IMAGETREE_LOG_ENV_VAR)
        .unwrap_or_else(|_| EnvFilter::new(fallback));

    fmt()
        .with_writer(io::stderr)
        .with_target(false)
        .with_file(false)
        .with_line_number(false)
        .with_thread_ids(false)
        .with_thread_names(false)
        .with_level(true)
        .with_env_filter(filter)
        .init();

    if !args.quiet {
        let source = if args.reads_stdin() {
            "standard input".to_string()
        } else {
            args.archive.display().to_string()
        };
        eprintln!("{} {}", "processing image:".header(), source.literal());
    }

    let options = args.tree_options();
    tracing::trace!("rendering tree: options={options:?}");

    let rendered = if args.reads_stdin() {
        archive::image_tree_from_reader(io::stdin().lock(), &options)
    } else {
        archive::image_tree(&args.archive, &options)
    };

    io::stdout().lock().write_all(rendered?.as_bytes())?;
    Ok(())
}
