#[tokio::main]
async fn main() {
    staking_pool::run::start(std::env::args()).await;
}
