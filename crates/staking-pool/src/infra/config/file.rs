use {
    crate::{
        domain::{
            Parameters,
            ShareMetadata,
            TargetUtilization,
            auction::{Bid, Payload},
        },
        infra::oracle::StaticOracle,
        pool::{self, FeeSource},
    },
    anyhow::{Context, Result},
    number::serialization::HexOrDecimalU256,
    primitive_types::{H160, U256},
    serde::Deserialize,
    serde_with::{DisplayFromStr, serde_as},
    std::{path::Path, sync::Arc},
};

/// Loads and validates the pool configuration file at `path`.
pub async fn load(path: &Path) -> Result<super::Config> {
    let data = tokio::fs::read_to_string(path)
        .await
        .with_context(|| format!("I/O error while reading {path:?}"))?;
    let config: Config = toml::from_str(&data)
        .with_context(|| format!("TOML syntax error while reading {path:?}"))?;
    config
        .validate()
        .with_context(|| format!("invalid pool configuration in {path:?}"))
}

#[serde_as]
#[derive(Debug, Deserialize)]
#[serde(rename_all = "kebab-case", deny_unknown_fields)]
struct Config {
    target_utilization_bp: u32,
    #[serde_as(as = "HexOrDecimalU256")]
    base_fee: U256,
    #[serde_as(as = "HexOrDecimalU256")]
    #[serde(default = "default_initial_dynamic_fee_bp")]
    initial_dynamic_fee_bp: U256,
    pool_account: H160,
    bonding_account: H160,
    native_token: H160,
    staked_token: H160,
    #[serde(default)]
    share: ShareConfig,
    #[serde(default)]
    fee_source: FeeSourceConfig,
}

fn default_initial_dynamic_fee_bp() -> U256 {
    100.into()
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "kebab-case", deny_unknown_fields)]
struct ShareConfig {
    #[serde(default = "default_share_name")]
    name: String,
    #[serde(default = "default_share_symbol")]
    symbol: String,
    #[serde(default = "default_share_decimals")]
    decimals: u8,
}

impl Default for ShareConfig {
    fn default() -> Self {
        Self {
            name: default_share_name(),
            symbol: default_share_symbol(),
            decimals: default_share_decimals(),
        }
    }
}

fn default_share_name() -> String {
    ShareMetadata::default().name
}

fn default_share_symbol() -> String {
    ShareMetadata::default().symbol
}

fn default_share_decimals() -> u8 {
    ShareMetadata::default().decimals
}

#[serde_as]
#[derive(Debug, Default, Deserialize)]
#[serde(tag = "kind", rename_all = "kebab-case", deny_unknown_fields)]
enum FeeSourceConfig {
    #[default]
    Formula,
    /// Uses a fixed auction bid. Without a payload there is no winning bid
    /// and buys are credited no manager fee.
    Auction {
        #[serde_as(as = "Option<DisplayFromStr>")]
        #[serde(default)]
        payload: Option<Payload>,
        #[serde(default)]
        bidder: H160,
        #[serde_as(as = "HexOrDecimalU256")]
        #[serde(default)]
        rent: U256,
    },
}

impl Config {
    fn validate(self) -> Result<super::Config> {
        let target_utilization = TargetUtilization::new(self.target_utilization_bp)?;
        let fee_source = match self.fee_source {
            FeeSourceConfig::Formula => FeeSource::Formula,
            FeeSourceConfig::Auction {
                payload,
                bidder,
                rent,
            } => {
                let bid = payload.map(|payload| Bid {
                    bidder,
                    rent,
                    payload,
                });
                FeeSource::Auction(Arc::new(StaticOracle(bid)))
            }
        };
        Ok(super::Config {
            pool: pool::Config {
                parameters: Parameters {
                    target_utilization,
                    base_fee: self.base_fee,
                },
                initial_dynamic_fee_bp: self.initial_dynamic_fee_bp,
                pool_account: self.pool_account,
                bonding_account: self.bonding_account,
                native_token: self.native_token,
                staked_token: self.staked_token,
                share: ShareMetadata {
                    name: self.share.name,
                    symbol: self.share.symbol,
                    decimals: self.share.decimals,
                },
            },
            fee_source,
        })
    }
}

#[cfg(test)]
mod tests {
    use {super::*, crate::domain::Error, std::io::Write};

    const MINIMAL: &str = r#"
        target-utilization-bp = 5000
        base-fee = "100"
        pool-account = "0x9090909090909090909090909090909090909090"
        bonding-account = "0xb0b0b0b0b0b0b0b0b0b0b0b0b0b0b0b0b0b0b0b0"
        native-token = "0xe0e0e0e0e0e0e0e0e0e0e0e0e0e0e0e0e0e0e0e0"
        staked-token = "0xe1e1e1e1e1e1e1e1e1e1e1e1e1e1e1e1e1e1e1e1"
    "#;

    fn parse(data: &str) -> Result<super::super::Config> {
        toml::from_str::<Config>(data)?.validate()
    }

    #[test]
    fn minimal_config_uses_defaults() {
        let config = parse(MINIMAL).unwrap();
        assert_eq!(
            config.pool.parameters,
            Parameters {
                target_utilization: TargetUtilization::new(5000).unwrap(),
                base_fee: 100.into(),
            }
        );
        assert_eq!(config.pool.initial_dynamic_fee_bp, 100.into());
        assert_eq!(config.pool.pool_account, H160([0x90; 20]));
        assert_eq!(config.pool.share, ShareMetadata::default());
        assert!(matches!(config.fee_source, FeeSource::Formula));
    }

    #[tokio::test]
    async fn auction_source_reports_configured_bid() {
        let data = format!(
            r#"{MINIMAL}
            initial-dynamic-fee-bp = 250

            [share]
            name = "Pool Share"
            symbol = "PS"

            [fee-source]
            kind = "auction"
            payload = "0x0000fa00000000"
            rent = 12
            "#
        );
        let config = parse(&data).unwrap();
        assert_eq!(config.pool.initial_dynamic_fee_bp, 250.into());
        assert_eq!(config.pool.share.symbol, "PS");
        assert_eq!(config.pool.share.decimals, 18);

        let fee = config
            .fee_source
            .manager_fee(1000.into(), U256::zero())
            .await
            .unwrap();
        assert_eq!(fee, 25.into());
    }

    #[test]
    fn rejects_out_of_range_target() {
        let data = MINIMAL.replace("= 5000", "= 10000");
        let err = parse(&data).unwrap_err();
        assert!(matches!(
            err.downcast_ref::<Error>(),
            Some(Error::InvalidConfig(_))
        ));
    }

    #[test]
    fn rejects_unknown_fields() {
        let data = format!("{MINIMAL}\nprotocol-fee = 1\n");
        assert!(parse(&data).is_err());
    }

    #[tokio::test]
    async fn loads_from_disk() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        file.write_all(MINIMAL.as_bytes()).unwrap();

        let config = load(file.path()).await.unwrap();
        assert_eq!(config.pool.bonding_account, H160([0xb0; 20]));

        let missing = file.path().with_extension("missing");
        assert!(load(&missing).await.is_err());
    }
}
