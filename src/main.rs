//! mantweak - Strips manual page margins and realigns tables

#![warn(clippy::all)]
#![warn(clippy::pedantic)]

use std::fs::File;
use std::io::{self, BufReader, BufWriter, Cursor, Write};
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicUsize, Ordering};

use mantweak::format::GlyphMetrics;
use mantweak::process::format_stream_with;
use mantweak::{parse_args, CliArgs, Config, Result};
use rayon::prelude::*;

/// Default maximum file size in bytes (100 MB) for in-place rewriting
/// Files larger than this are skipped to prevent memory exhaustion
const DEFAULT_MAX_FILE_SIZE: u64 = 100 * 1024 * 1024;

fn main() -> Result<()> {
    let args = parse_args();
    init_logging(&args);

    let config = build_config(&args)?;
    // an unusable width table is fatal before any input is read
    let metrics = config.glyph_metrics()?;

    let use_stdin =
        args.inputs.is_empty() || (args.inputs.len() == 1 && is_stdin(&args.inputs[0]));
    if use_stdin {
        return process_stdin(&config, metrics.as_ref());
    }

    if args.write {
        if let Some(jobs) = args.jobs {
            if jobs > 0 {
                if let Err(e) = rayon::ThreadPoolBuilder::new()
                    .num_threads(jobs)
                    .build_global()
                {
                    log::warn!("failed to configure thread pool: {e}");
                }
            }
        }
        process_files_in_place(&args.inputs, &config, &args)
    } else {
        process_files_to_stdout(&args.inputs, &config, metrics.as_ref())
    }
}

/// Route `log` output to stderr
///
/// `--debug` forces debug level; otherwise `RUST_LOG` decides, defaulting to warnings.
fn init_logging(args: &CliArgs) {
    let mut builder =
        env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("warn"));
    if args.debug {
        builder.filter_level(log::LevelFilter::Debug);
    }
    builder.format_timestamp(None).init();
}

fn is_stdin(path: &Path) -> bool {
    path.as_os_str() == "-"
}

/// Build configuration from config files, environment and CLI args
///
/// Environment variables reach us through clap, so CLI values and their
/// environment fallbacks are applied together, after the config files.
fn build_config(args: &CliArgs) -> Result<Config> {
    let mut config = if let Some(config_path) = &args.config {
        log::debug!("using explicit config file: {}", config_path.display());
        Config::from_toml_file(config_path)?
    } else {
        let cwd = std::env::current_dir().unwrap_or_default();
        if args.debug {
            let discovered = Config::discover_config_files(&cwd);
            if discovered.is_empty() {
                log::debug!("no config files discovered");
            }
            for f in &discovered {
                log::debug!("discovered config file: {}", f.display());
            }
        }
        Config::from_discovered_files(&cwd)?
    };

    // Override with CLI arguments
    if let Some(tabstop) = args.tabstop {
        config.tabstop = tabstop;
    }
    if let Some(levels) = args.levels {
        config.levels = levels;
    }
    if args.newlines {
        config.blank_lines = true;
    }
    if let Some(font) = &args.font {
        config.set_font(font);
    }
    if args.cells {
        config.cells = true;
    }
    if args.no_tables {
        config.tables = false;
    }

    if args.debug {
        match toml::to_string(&config) {
            Ok(dump) => log::debug!("configuration:\n{dump}"),
            Err(e) => log::debug!("configuration: {config:?} ({e})"),
        }
    }

    config.validate()?;
    Ok(config)
}

/// Stream stdin to stdout
fn process_stdin(config: &Config, metrics: &dyn GlyphMetrics) -> Result<()> {
    let stdin = io::stdin();
    let stdout = io::stdout();
    let mut output = BufWriter::new(stdout.lock());
    format_stream_with(stdin.lock(), &mut output, config, metrics)
}

/// Format files one after another to stdout, each with a fresh engine
fn process_files_to_stdout(
    files: &[PathBuf],
    config: &Config,
    metrics: &dyn GlyphMetrics,
) -> Result<()> {
    let stdout = io::stdout();
    let mut output = BufWriter::new(stdout.lock());
    let mut errors = 0;

    for path in files {
        let result = if is_stdin(path) {
            format_stream_with(io::stdin().lock(), &mut output, config, metrics)
        } else {
            File::open(path).map_err(Into::into).and_then(|file| {
                format_stream_with(BufReader::new(file), &mut output, config, metrics)
            })
        };
        if let Err(e) = result {
            errors += 1;
            log::error!("{}: {e}", path.display());
        }
    }

    output.flush()?;
    if errors > 0 {
        anyhow::bail!("{errors} of {} files failed", files.len());
    }
    Ok(())
}

/// Rewrite files in place using Rayon
///
/// Every file gets its own engine and its own glyph width provider.
fn process_files_in_place(files: &[PathBuf], config: &Config, args: &CliArgs) -> Result<()> {
    let success_count = AtomicUsize::new(0);
    let error_count = AtomicUsize::new(0);

    files.par_iter().for_each(|path| {
        match rewrite_file(path, config, args) {
            Ok(()) => {
                success_count.fetch_add(1, Ordering::Relaxed);
            }
            Err(e) => {
                error_count.fetch_add(1, Ordering::Relaxed);
                log::error!("failed to reformat {}: {e}", path.display());
            }
        }
    });

    let success = success_count.load(Ordering::Relaxed);
    let errors = error_count.load(Ordering::Relaxed);

    if !args.silent {
        if errors == 0 {
            eprintln!("Reformatted {success} files successfully.");
        } else {
            eprintln!("Reformatted {success} files, {errors} errors.");
        }
    }
    if errors > 0 {
        anyhow::bail!("{errors} of {} files failed", files.len());
    }
    Ok(())
}

/// Reformat a single file and write it back if anything changed
fn rewrite_file(path: &Path, config: &Config, args: &CliArgs) -> Result<()> {
    if is_stdin(path) {
        anyhow::bail!("cannot rewrite stdin in place");
    }

    let file_size = std::fs::metadata(path)?.len();
    if file_size > DEFAULT_MAX_FILE_SIZE {
        if !args.silent {
            eprintln!(
                "Skipping {} ({} MB exceeds limit of {} MB)",
                path.display(),
                file_size / (1024 * 1024),
                DEFAULT_MAX_FILE_SIZE / (1024 * 1024)
            );
        }
        return Ok(());
    }

    let contents = std::fs::read(path)?;
    let metrics = config.glyph_metrics()?;
    let mut output = Vec::with_capacity(contents.len());
    format_stream_with(Cursor::new(&contents), &mut output, config, metrics.as_ref())?;

    if output == contents {
        log::debug!("{} unchanged", path.display());
        return Ok(());
    }
    if !args.silent {
        eprintln!("Reformatting: {}", path.display());
    }
    std::fs::write(path, &output)?;
    Ok(())
}
