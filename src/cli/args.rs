use crate::core::EngineConfig;
use crate::pipeline::PipelineConfig;
use clap::{ArgGroup, Parser};
use rust_decimal::Decimal;
use std::path::PathBuf;
use std::time::Duration;

/// Process coin ledger operations with transfer and change handling
#[derive(Parser, Debug)]
#[command(name = "coin-ledger")]
#[command(about = "Process coin ledger operations with transfer and change handling", long_about = None)]
#[command(group(
    ArgGroup::new("rate_source")
        .required(true)
        .args(["rate", "rate_url"]),
))]
pub struct CliArgs {
    /// Input CSV file path containing ledger operations
    #[arg(value_name = "INPUT", help = "Path to the operations CSV file (op,amount rows)")]
    pub input_file: PathBuf,

    /// Optional coin snapshot seeding the ledger before the run
    #[arg(
        long = "snapshot",
        value_name = "FILE",
        help = "Coin snapshot CSV (id,amount,spent,created_at rows)"
    )]
    pub snapshot: Option<PathBuf>,

    /// Fixed exchange rate (fiat units per native unit)
    #[arg(
        long = "rate",
        value_name = "RATE",
        help = "Fixed exchange rate for offline runs"
    )]
    pub rate: Option<Decimal>,

    /// Ticker endpoint to fetch the exchange rate from
    #[arg(
        long = "rate-url",
        value_name = "URL",
        help = "HTTP ticker endpoint supplying the exchange rate"
    )]
    pub rate_url: Option<String>,

    /// Currency pair requested from the rate provider
    #[arg(
        long = "pair",
        value_name = "PAIR",
        default_value = "BTC/EUR",
        help = "Currency pair, e.g. BTC/EUR"
    )]
    pub pair: String,

    /// Minimum native-unit transfer amount
    #[arg(
        long = "min-transfer",
        value_name = "AMOUNT",
        default_value = "0.00001",
        help = "Reject transfers converting below this native amount"
    )]
    pub min_transfer: Decimal,

    /// Upper bound on a single rate-provider call, in seconds
    #[arg(
        long = "rate-timeout-secs",
        value_name = "SECS",
        default_value_t = 5,
        help = "Timeout for the exchange-rate fetch"
    )]
    pub rate_timeout_secs: u64,

    /// Maximum number of transfers processing concurrently
    #[arg(
        long = "max-concurrent",
        value_name = "COUNT",
        help = "Maximum transfers running concurrently (default: CPU cores)"
    )]
    pub max_concurrent: Option<usize>,
}

impl CliArgs {
    /// Create an EngineConfig from CLI arguments
    pub fn to_engine_config(&self) -> EngineConfig {
        EngineConfig {
            pair: self.pair.clone(),
            min_transfer: self.min_transfer,
            rate_timeout: Duration::from_secs(self.rate_timeout_secs),
            ..EngineConfig::default()
        }
    }

    /// Create a PipelineConfig from CLI arguments
    ///
    /// Falls back to defaults (with a stderr warning) for invalid values.
    pub fn to_pipeline_config(&self) -> PipelineConfig {
        match self.max_concurrent {
            Some(count) => PipelineConfig::new(count),
            None => PipelineConfig::default(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[test]
    fn test_fixed_rate_parsing() {
        let parsed =
            CliArgs::try_parse_from(["program", "--rate", "50000", "ops.csv"]).unwrap();
        assert_eq!(parsed.rate, Some(Decimal::new(50000, 0)));
        assert!(parsed.rate_url.is_none());
        assert_eq!(parsed.pair, "BTC/EUR");
    }

    #[test]
    fn test_rate_url_parsing() {
        let parsed = CliArgs::try_parse_from([
            "program",
            "--rate-url",
            "http://example.test/ticker",
            "--pair",
            "ETH/USD",
            "ops.csv",
        ])
        .unwrap();
        assert_eq!(
            parsed.rate_url.as_deref(),
            Some("http://example.test/ticker")
        );
        assert_eq!(parsed.pair, "ETH/USD");
    }

    #[rstest]
    #[case::defaults(&["program", "--rate", "1", "ops.csv"], "0.00001", 5)]
    #[case::custom(
        &["program", "--rate", "1", "--min-transfer", "0.001", "--rate-timeout-secs", "2", "ops.csv"],
        "0.001",
        2
    )]
    fn test_engine_config_conversion(
        #[case] args: &[&str],
        #[case] expected_min: &str,
        #[case] expected_timeout: u64,
    ) {
        use std::str::FromStr;

        let parsed = CliArgs::try_parse_from(args).unwrap();
        let config = parsed.to_engine_config();

        assert_eq!(config.min_transfer, Decimal::from_str(expected_min).unwrap());
        assert_eq!(config.rate_timeout, Duration::from_secs(expected_timeout));
    }

    #[rstest]
    #[case::custom(&["program", "--rate", "1", "--max-concurrent", "8", "ops.csv"], 8)]
    fn test_pipeline_config_conversion(#[case] args: &[&str], #[case] expected: usize) {
        let parsed = CliArgs::try_parse_from(args).unwrap();
        assert_eq!(parsed.to_pipeline_config().max_concurrent, expected);
    }

    #[test]
    fn test_default_pipeline_config_uses_cpu_count() {
        let parsed = CliArgs::try_parse_from(["program", "--rate", "1", "ops.csv"]).unwrap();
        assert_eq!(parsed.to_pipeline_config().max_concurrent, num_cpus::get());
    }

    // Error handling tests
    #[rstest]
    #[case::missing_input(&["program", "--rate", "1"])]
    #[case::missing_rate_source(&["program", "ops.csv"])]
    #[case::both_rate_sources(
        &["program", "--rate", "1", "--rate-url", "http://example.test", "ops.csv"]
    )]
    #[case::garbage_rate(&["program", "--rate", "abc", "ops.csv"])]
    fn test_parsing_errors(#[case] args: &[&str]) {
        let result = CliArgs::try_parse_from(args);
        assert!(result.is_err());
    }
}
