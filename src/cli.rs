use clap::{Args, Parser, Subcommand, ValueEnum};
use std::path::PathBuf;

#[derive(Debug, Clone, Copy, ValueEnum, Default, PartialEq, Eq)]
pub enum OutputFormat {
    #[default]
    Terminal,
    Json,
}

#[derive(Parser, Debug)]
#[command(
    name = "acf-sync",
    version,
    about = "Convert ACF field groups between PHP registration calls and local JSON",
    long_about = "acf-sync finds acf_add_local_field_group() calls in a theme or plugin, converts their array literals to ACF local JSON, and turns JSON field groups back into PHP."
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,

    /// Config file (default: .acf-sync.{yaml,yml,json,toml} in the project root)
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,

    /// Verbose output
    #[arg(short, long, global = true)]
    pub verbose: bool,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Scan a directory for field group registrations
    Scan(ScanArgs),
    /// Convert field group JSON files to PHP
    ToPhp(ToPhpArgs),
    /// Convert the field groups registered in one PHP file to JSON
    ToJson(ToJsonArgs),
}

#[derive(Args, Debug, Clone, Default)]
pub struct ScanArgs {
    /// Theme or plugin directory
    pub root: PathBuf,

    /// Files to scan, gitignore syntax (replaces the default `*.php`)
    #[arg(long = "include", value_name = "GLOB")]
    pub include: Vec<String>,

    /// Additional paths to skip, gitignore syntax
    #[arg(long = "exclude", value_name = "GLOB")]
    pub exclude: Vec<String>,

    /// Ignore cached results
    #[arg(long)]
    pub force_refresh: bool,

    /// Worker threads
    #[arg(short, long)]
    pub jobs: Option<usize>,

    /// Persist scan results in this file
    #[arg(long, value_name = "FILE")]
    pub cache: Option<PathBuf>,

    /// Write one `<key>.json` per field group into this directory
    #[arg(short, long, value_name = "DIR")]
    pub out_dir: Option<PathBuf>,

    /// Registration function name
    #[arg(long)]
    pub function_name: Option<String>,

    /// Output format
    #[arg(short, long, value_enum, default_value_t = OutputFormat::Terminal)]
    pub format: OutputFormat,

    /// CI mode: non-interactive output
    #[arg(long)]
    pub ci: bool,

    /// Strict mode: exit with 1 when the scan produced warnings
    #[arg(short, long)]
    pub strict: bool,
}

#[derive(Args, Debug, Clone, Default)]
pub struct ToPhpArgs {
    /// Field group JSON files (single group or an array of groups)
    #[arg(required = true)]
    pub files: Vec<PathBuf>,

    /// Wrap each group in a registration call
    #[arg(short, long)]
    pub wrap: bool,

    /// Use `[...]` instead of `array(...)`
    #[arg(long)]
    pub short_arrays: bool,

    /// Registration function name used with --wrap
    #[arg(long)]
    pub function_name: Option<String>,
}

#[derive(Args, Debug, Clone, Default)]
pub struct ToJsonArgs {
    /// PHP file containing registration calls
    pub file: PathBuf,

    /// Write one `<key>.json` per field group into this directory instead of stdout
    #[arg(short, long, value_name = "DIR")]
    pub out_dir: Option<PathBuf>,

    /// Registration function name
    #[arg(long)]
    pub function_name: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    fn scan_args(args: &[&str]) -> ScanArgs {
        let cli = Cli::try_parse_from(args).unwrap();
        match cli.command {
            Command::Scan(args) => args,
            other => panic!("expected scan, got {:?}", other),
        }
    }

    #[test]
    fn test_cli_valid() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_parse_scan_defaults() {
        let args = scan_args(&["acf-sync", "scan", "./theme"]);
        assert_eq!(args.root, PathBuf::from("./theme"));
        assert!(args.include.is_empty());
        assert!(!args.force_refresh);
        assert!(!args.strict);
        assert!(!args.ci);
        assert_eq!(args.format, OutputFormat::Terminal);
        assert!(args.out_dir.is_none());
    }

    #[test]
    fn test_parse_scan_all_options() {
        let args = scan_args(&[
            "acf-sync",
            "scan",
            "--include",
            "inc/",
            "--include",
            "*.inc",
            "--exclude",
            "legacy/",
            "--force-refresh",
            "--jobs",
            "4",
            "--cache",
            "cache.json",
            "--out-dir",
            "acf-json",
            "--function-name",
            "register_group",
            "--format",
            "json",
            "--ci",
            "--strict",
            "./theme",
        ]);
        assert_eq!(args.include, vec!["inc/", "*.inc"]);
        assert_eq!(args.exclude, vec!["legacy/"]);
        assert!(args.force_refresh);
        assert_eq!(args.jobs, Some(4));
        assert_eq!(args.cache, Some(PathBuf::from("cache.json")));
        assert_eq!(args.out_dir, Some(PathBuf::from("acf-json")));
        assert_eq!(args.function_name.as_deref(), Some("register_group"));
        assert_eq!(args.format, OutputFormat::Json);
        assert!(args.ci);
        assert!(args.strict);
    }

    #[test]
    fn test_parse_to_php() {
        let cli = Cli::try_parse_from(["acf-sync", "to-php", "--wrap", "--short-arrays", "a.json", "b.json"])
            .unwrap();
        let Command::ToPhp(args) = cli.command else {
            panic!("expected to-php");
        };
        assert_eq!(args.files.len(), 2);
        assert!(args.wrap);
        assert!(args.short_arrays);
    }

    #[test]
    fn test_to_php_requires_files() {
        assert!(Cli::try_parse_from(["acf-sync", "to-php"]).is_err());
    }

    #[test]
    fn test_parse_to_json_with_global_flags() {
        let cli = Cli::try_parse_from(["acf-sync", "to-json", "groups.php", "-v", "--config", "c.yaml"])
            .unwrap();
        assert!(cli.verbose);
        assert_eq!(cli.config, Some(PathBuf::from("c.yaml")));
        let Command::ToJson(args) = cli.command else {
            panic!("expected to-json");
        };
        assert_eq!(args.file, PathBuf::from("groups.php"));
    }
}
