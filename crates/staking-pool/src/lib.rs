pub mod domain;
pub mod infra;
pub mod pool;
pub mod run;
pub mod sim;

pub use {
    domain::Error,
    pool::{Config, FeeSource, Ledgers, Pool},
    run::start,
};
