use clap::{CommandFactory, Parser};
use eyeplan_core::cli::{Cli, OutputFormat};
use eyeplan_core::{ConversionSummary, DoseConverter, TextReport};
use std::process;

fn main() {
    // With no arguments at all, show the help instead of a usage error
    if std::env::args_os().len() == 1 {
        let _ = Cli::command().print_help();
        process::exit(0);
    }

    let cli = Cli::parse();

    setup_logging(cli.debug);

    let converter = DoseConverter::new(cli.convert_options());
    let summary = match converter.run(&cli.filename, &cli.sourcedicom, &cli.outputdicom) {
        Ok(summary) => summary,
        Err(e) => {
            eprintln!("Error: {}", e);
            process::exit(1);
        }
    };

    output_summary(&summary, cli.format);
}

fn setup_logging(debug: bool) {
    let level = if debug {
        log::LevelFilter::Debug
    } else {
        log::LevelFilter::Info
    };
    // RUST_LOG, when set, overrides the level chosen by --debug
    env_logger::Builder::new()
        .filter_level(level)
        .parse_default_env()
        .format_timestamp(None)
        .init();
}

fn output_summary(summary: &ConversionSummary, format: OutputFormat) {
    match format {
        OutputFormat::Text => {
            println!("{}", TextReport::new(summary));
        }
        OutputFormat::Json => {
            #[cfg(feature = "json")]
            {
                match serde_json::to_string_pretty(summary) {
                    Ok(json) => println!("{}", json),
                    Err(e) => {
                        eprintln!("Error: Failed to serialize to JSON: {}", e);
                        process::exit(1);
                    }
                }
            }
            #[cfg(not(feature = "json"))]
            {
                let _ = summary;
                eprintln!("Error: JSON output requires the 'json' feature");
                eprintln!("Rebuild with: cargo build --features json");
                process::exit(1);
            }
        }
    }
}
