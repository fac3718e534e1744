//! Pool configuration read from a TOML file.

use crate::pool::{self, FeeSource};

mod file;

pub use file::load;

/// A validated pool configuration.
#[derive(Clone, Debug)]
pub struct Config {
    pub pool: pool::Config,
    pub fee_source: FeeSource,
}
