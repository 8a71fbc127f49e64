//! Command-line interface for mantweak.
//!
//! Defines CLI arguments using clap builder API

use std::path::PathBuf;

use clap::{Arg, ArgAction, Command};

/// CLI arguments parsed from command line
#[derive(Debug, Clone)]
pub struct CliArgs {
    /// Files to reformat; empty or `-` means stdin
    pub inputs: Vec<PathBuf>,

    /// Tab expansion width
    pub tabstop: Option<usize>,

    /// Maximum nesting depth of margins
    pub levels: Option<usize>,

    /// Insert blank lines where dropped indentation separated text
    pub newlines: bool,

    /// Width table file; an empty value disables proportional widths
    pub font: Option<String>,

    /// Measure glyphs in terminal cells
    pub cells: bool,

    /// Strip margins only, never align tables
    pub no_tables: bool,

    /// Config file path
    pub config: Option<PathBuf>,

    /// Rewrite files in place instead of printing them
    pub write: bool,

    /// Number of parallel jobs (0 = auto, 1 = sequential)
    pub jobs: Option<usize>,

    /// Enable debug output
    pub debug: bool,

    /// Silent mode (no status output)
    pub silent: bool,
}

/// Build the clap Command for parsing CLI arguments
#[must_use]
pub fn build_cli() -> Command {
    Command::new("mantweak")
        .version(env!("CARGO_PKG_VERSION"))
        .about("Strips manual page margins and realigns tables")
        .arg(
            Arg::new("inputs")
                .help("Files to reformat (reads stdin when omitted or '-')")
                .value_name("FILE")
                .num_args(1..)
                .required(false)
                .value_parser(clap::value_parser!(PathBuf)),
        )
        .arg(
            Arg::new("tabstop")
                .short('t')
                .long("tabstop")
                .help("Tab stop width [default: 8]")
                .value_name("NUM")
                .env("tabstop")
                .value_parser(clap::value_parser!(usize)),
        )
        .arg(
            Arg::new("levels")
                .short('l')
                .long("levels")
                .help("Maximum number of nested margins [default: 1]")
                .value_name("NUM")
                .value_parser(clap::value_parser!(usize)),
        )
        .arg(
            Arg::new("newlines")
                .short('n')
                .long("newlines")
                .help("Insert a blank line where dropped indentation separated two kinds of text")
                .action(ArgAction::SetTrue),
        )
        .arg(
            Arg::new("font")
                .short('f')
                .long("font")
                .help("Glyph width table (TOML) used to align tables; empty disables")
                .value_name("FILE")
                .env("font")
                .value_parser(clap::value_parser!(String)),
        )
        .arg(
            Arg::new("cells")
                .long("cells")
                .help("Measure glyphs in terminal cells (wide characters count twice)")
                .action(ArgAction::SetTrue),
        )
        .arg(
            Arg::new("no-tables")
                .long("no-tables")
                .help("Only strip margins, leave tables as they are")
                .action(ArgAction::SetTrue),
        )
        .arg(
            Arg::new("config")
                .short('c')
                .long("config")
                .help("Path to configuration file (overrides auto-discovery)")
                .value_name("FILE")
                .value_parser(clap::value_parser!(PathBuf)),
        )
        .arg(
            Arg::new("write")
                .short('w')
                .long("write")
                .help("Rewrite files in place instead of printing to stdout")
                .action(ArgAction::SetTrue),
        )
        .arg(
            Arg::new("jobs")
                .short('j')
                .long("jobs")
                .help("Number of parallel jobs with --write (0=auto, 1=sequential)")
                .value_name("NUM")
                .value_parser(clap::value_parser!(usize)),
        )
        .arg(
            Arg::new("debug")
                .short('D')
                .long("debug")
                .help("Enable debug output (config, per-line classification, tables)")
                .action(ArgAction::SetTrue),
        )
        .arg(
            Arg::new("silent")
                .short('S')
                .long("silent")
                .help("Silent mode (no status output)")
                .action(ArgAction::SetTrue),
        )
}

/// Parse CLI arguments from command line
#[must_use]
pub fn parse_args() -> CliArgs {
    args_from_matches(&build_cli().get_matches())
}

/// Parse CLI arguments from an iterator (for testing)
#[must_use]
pub fn parse_args_from<I, T>(args: I) -> CliArgs
where
    I: IntoIterator<Item = T>,
    T: Into<std::ffi::OsString> + Clone,
{
    args_from_matches(&build_cli().get_matches_from(args))
}

/// Convert clap `ArgMatches` to `CliArgs`
fn args_from_matches(matches: &clap::ArgMatches) -> CliArgs {
    CliArgs {
        inputs: matches
            .get_many::<PathBuf>("inputs")
            .map(|vals| vals.cloned().collect())
            .unwrap_or_default(),
        tabstop: matches.get_one::<usize>("tabstop").copied(),
        levels: matches.get_one::<usize>("levels").copied(),
        newlines: matches.get_flag("newlines"),
        font: matches.get_one::<String>("font").cloned(),
        cells: matches.get_flag("cells"),
        no_tables: matches.get_flag("no-tables"),
        config: matches.get_one::<PathBuf>("config").cloned(),
        write: matches.get_flag("write"),
        jobs: matches.get_one::<usize>("jobs").copied(),
        debug: matches.get_flag("debug"),
        silent: matches.get_flag("silent"),
    }
}

#[cfg(test)]
mod tests {
    use std::ffi::OsStr;

    use super::*;

    #[test]
    fn test_cli_builds() {
        let cmd = build_cli();
        assert_eq!(cmd.get_name(), "mantweak");
        cmd.debug_assert();
    }

    #[test]
    fn test_cli_defaults() {
        let args = parse_args_from(vec!["mantweak", "page.txt"]);
        assert_eq!(args.inputs, vec![PathBuf::from("page.txt")]);
        assert_eq!(args.levels, None);
        assert!(!args.newlines);
        assert!(!args.cells);
        assert!(!args.no_tables);
        assert!(!args.write);
        assert!(!args.debug);
        assert!(!args.silent);
        assert_eq!(args.config, None);
        assert_eq!(args.jobs, None);
    }

    #[test]
    fn test_no_inputs_means_stdin() {
        let args = parse_args_from(vec!["mantweak"]);
        assert!(args.inputs.is_empty());

        let args = parse_args_from(vec!["mantweak", "-"]);
        assert_eq!(args.inputs, vec![PathBuf::from("-")]);
    }

    #[test]
    fn test_short_flags() {
        let args = parse_args_from(vec!["mantweak", "-t", "4", "-l", "3", "-n", "-D", "-S"]);
        assert_eq!(args.tabstop, Some(4));
        assert_eq!(args.levels, Some(3));
        assert!(args.newlines);
        assert!(args.debug);
        assert!(args.silent);
    }

    #[test]
    fn test_long_flags() {
        let args = parse_args_from(vec![
            "mantweak",
            "--tabstop",
            "4",
            "--levels",
            "2",
            "--newlines",
            "--cells",
            "--no-tables",
            "--write",
            "--jobs",
            "2",
            "a.txt",
            "b.txt",
        ]);
        assert_eq!(args.tabstop, Some(4));
        assert_eq!(args.levels, Some(2));
        assert!(args.newlines);
        assert!(args.cells);
        assert!(args.no_tables);
        assert!(args.write);
        assert_eq!(args.jobs, Some(2));
        assert_eq!(args.inputs.len(), 2);
    }

    #[test]
    fn test_font_flag() {
        let args = parse_args_from(vec!["mantweak", "-f", "widths.toml"]);
        assert_eq!(args.font.as_deref(), Some("widths.toml"));
    }

    #[test]
    fn test_empty_font_is_kept() {
        let args = parse_args_from(vec!["mantweak", "-f", ""]);
        assert_eq!(args.font.as_deref(), Some(""));
    }

    #[test]
    fn test_config_flag() {
        let args = parse_args_from(vec!["mantweak", "-c", "custom.toml", "page.txt"]);
        assert_eq!(args.config, Some(PathBuf::from("custom.toml")));
    }

    #[test]
    fn test_environment_fallbacks() {
        let cmd = build_cli();
        let env_of = |id: &str| {
            cmd.get_arguments()
                .find(|arg| arg.get_id() == id)
                .and_then(|arg| arg.get_env().map(OsStr::to_os_string))
        };
        assert_eq!(env_of("tabstop").as_deref(), Some(OsStr::new("tabstop")));
        assert_eq!(env_of("font").as_deref(), Some(OsStr::new("font")));
        assert_eq!(env_of("levels"), None);
    }

    #[test]
    fn test_bad_number_is_rejected() {
        let result = build_cli().try_get_matches_from(vec!["mantweak", "-t", "wide"]);
        assert!(result.is_err());
    }
}
