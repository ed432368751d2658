use clap::Parser;
use drill_cli::{cmd::GlobalArgs, logger};

#[tokio::main]
async fn main() {
    logger::init();

    let app = GlobalArgs::parse();
    app.exec_subcmd().await.unwrap_or_else(|e| {
        eprintln!("Error: {:?}", e);
        std::process::exit(1);
    });

    // A pending stdin read would otherwise keep the runtime from shutting down.
    std::process::exit(0);
}
