//! CLI argument definitions using clap derive macros.

use std::path::PathBuf;

use clap::Parser;

use harvester_core::PipelineConfig;
use harvester_core::config::{
    DEFAULT_CATALOG_ENDPOINT, DEFAULT_CATALOG_FILE, DEFAULT_OUTPUT_DIR, DEFAULT_PAGE_SIZE,
};
use harvester_core::download::{DEFAULT_CONCURRENCY, DOWNLOAD_TIMEOUT_SECS};

/// Default for `-c`; must agree with the library default.
const DEFAULT_CONCURRENCY_ARG: u8 = 100;
const _: () = assert!(DEFAULT_CONCURRENCY_ARG as usize == DEFAULT_CONCURRENCY);

/// Harvest documents listed by a remote catalog.
///
/// Fetches one catalog page, downloads every linked document concurrently,
/// then deletes files that are not valid PDFs and lowercases the rest.
#[derive(Parser, Debug)]
#[command(name = "harvester")]
#[command(author, version, about)]
pub struct Args {
    /// Increase output verbosity (-v for debug, -vv for trace)
    #[arg(short, long, action = clap::ArgAction::Count)]
    pub verbose: u8,

    /// Suppress non-error output
    #[arg(short, long)]
    pub quiet: bool,

    /// Catalog search endpoint
    #[arg(long, default_value = DEFAULT_CATALOG_ENDPOINT)]
    pub endpoint: String,

    /// Catalog page to request (1-based)
    #[arg(long, default_value_t = 1, value_parser = clap::value_parser!(u32).range(1..))]
    pub page: u32,

    /// Catalog entries requested per page
    #[arg(long, default_value_t = DEFAULT_PAGE_SIZE, value_parser = clap::value_parser!(u32).range(1..))]
    pub page_size: u32,

    /// Maximum concurrent downloads (1-100)
    #[arg(short = 'c', long, default_value_t = DEFAULT_CONCURRENCY_ARG, value_parser = clap::value_parser!(u8).range(1..=100))]
    pub concurrency: u8,

    /// Per-download connect/read timeout in seconds (1-3600)
    #[arg(short = 't', long, default_value_t = DOWNLOAD_TIMEOUT_SECS, value_parser = clap::value_parser!(u64).range(1..=3600))]
    pub timeout: u64,

    /// Directory documents are saved to
    #[arg(short = 'o', long, default_value = DEFAULT_OUTPUT_DIR)]
    pub output_dir: PathBuf,

    /// File the raw catalog response is written to (replaced every run)
    #[arg(long, default_value = DEFAULT_CATALOG_FILE)]
    pub catalog_file: PathBuf,

    /// Disable the progress bar
    #[arg(long)]
    pub no_progress: bool,
}

impl Args {
    /// Builds the pipeline configuration from parsed arguments.
    pub fn to_config(&self) -> PipelineConfig {
        let mut config = PipelineConfig::default();
        config.catalog.endpoint.clone_from(&self.endpoint);
        config.catalog.page_size = self.page_size;
        config.download.concurrency = usize::from(self.concurrency);
        config.download.timeout_secs = self.timeout;
        config.page = self.page;
        config.output_dir.clone_from(&self.output_dir);
        config.catalog_file.clone_from(&self.catalog_file);
        config
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cli_default_args_parses_successfully() {
        let args = Args::try_parse_from(["harvester"]).unwrap();
        assert_eq!(args.verbose, 0);
        assert!(!args.quiet);
        assert_eq!(args.concurrency, 100);
        assert_eq!(args.timeout, 60);
        assert_eq!(args.page, 1);
        assert_eq!(args.page_size, 5000);
        assert_eq!(args.output_dir, PathBuf::from("./PDFs"));
        assert_eq!(args.catalog_file, PathBuf::from("main.json"));
    }

    #[test]
    fn test_cli_defaults_map_to_default_config() {
        let args = Args::try_parse_from(["harvester"]).unwrap();
        assert_eq!(args.to_config(), PipelineConfig::default());
    }

    #[test]
    fn test_cli_verbose_flag_increments_count() {
        let args = Args::try_parse_from(["harvester", "-v"]).unwrap();
        assert_eq!(args.verbose, 1);

        let args = Args::try_parse_from(["harvester", "-vv"]).unwrap();
        assert_eq!(args.verbose, 2);
    }

    #[test]
    fn test_cli_quiet_flag_sets_quiet() {
        let args = Args::try_parse_from(["harvester", "--quiet"]).unwrap();
        assert!(args.quiet);
    }

    #[test]
    fn test_cli_help_flag_shows_usage() {
        let err = Args::try_parse_from(["harvester", "--help"]).unwrap_err();
        assert_eq!(err.kind(), clap::error::ErrorKind::DisplayHelp);
    }

    #[test]
    fn test_cli_invalid_flag_returns_error() {
        let err = Args::try_parse_from(["harvester", "--invalid-flag"]).unwrap_err();
        assert_eq!(err.kind(), clap::error::ErrorKind::UnknownArgument);
    }

    #[test]
    fn test_cli_concurrency_bounds() {
        let args = Args::try_parse_from(["harvester", "-c", "1"]).unwrap();
        assert_eq!(args.concurrency, 1);

        let err = Args::try_parse_from(["harvester", "-c", "0"]).unwrap_err();
        assert_eq!(err.kind(), clap::error::ErrorKind::ValueValidation);

        let err = Args::try_parse_from(["harvester", "-c", "101"]).unwrap_err();
        assert_eq!(err.kind(), clap::error::ErrorKind::ValueValidation);
    }

    #[test]
    fn test_cli_default_concurrency_matches_library_default() {
        let args = Args::try_parse_from(["harvester"]).unwrap();
        assert_eq!(usize::from(args.concurrency), DEFAULT_CONCURRENCY);
    }

    #[test]
    fn test_cli_page_zero_rejected() {
        let err = Args::try_parse_from(["harvester", "--page", "0"]).unwrap_err();
        assert_eq!(err.kind(), clap::error::ErrorKind::ValueValidation);
    }

    #[test]
    fn test_cli_timeout_over_max_rejected() {
        let err = Args::try_parse_from(["harvester", "-t", "3601"]).unwrap_err();
        assert_eq!(err.kind(), clap::error::ErrorKind::ValueValidation);
    }

    #[test]
    fn test_cli_overrides_flow_into_config() {
        let args = Args::try_parse_from([
            "harvester",
            "--endpoint",
            "http://127.0.0.1:8080/search",
            "--page",
            "3",
            "--page-size",
            "50",
            "-c",
            "8",
            "-t",
            "15",
            "-o",
            "out",
            "--catalog-file",
            "cache/catalog.json",
        ])
        .unwrap();

        let config = args.to_config();
        assert_eq!(config.catalog.endpoint, "http://127.0.0.1:8080/search");
        assert_eq!(config.catalog.page_size, 50);
        assert_eq!(config.page, 3);
        assert_eq!(config.download.concurrency, 8);
        assert_eq!(config.download.timeout_secs, 15);
        assert_eq!(config.output_dir, PathBuf::from("out"));
        assert_eq!(config.catalog_file, PathBuf::from("cache/catalog.json"));
    }
}
