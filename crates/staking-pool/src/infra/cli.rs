use {clap::Parser, std::path::PathBuf};

/// Replays a scenario of pool operations against in-memory token ledgers.
#[derive(Parser, Debug)]
#[command(name = "pool-sim", version)]
pub struct Args {
    /// Path to the pool configuration file (TOML).
    #[clap(long, env)]
    pub config: PathBuf,

    /// Path to the scenario file (TOML) listing the steps to replay.
    #[clap(long, env)]
    pub scenario: PathBuf,

    /// Log filter, e.g. `warn,staking_pool=debug`.
    #[clap(long, env = "LOG", default_value = "warn,staking_pool=debug")]
    pub log: String,

    /// Emit logs as JSON lines.
    #[clap(long, env)]
    pub log_json: bool,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_flags() {
        let args = Args::try_parse_from([
            "pool-sim",
            "--config",
            "pool.toml",
            "--scenario",
            "steps.toml",
            "--log-json",
        ])
        .unwrap();
        assert_eq!(args.config, PathBuf::from("pool.toml"));
        assert_eq!(args.scenario, PathBuf::from("steps.toml"));
        assert!(args.log_json);
    }

    #[test]
    fn requires_config() {
        assert!(Args::try_parse_from(["pool-sim", "--scenario", "steps.toml"]).is_err());
    }
}
