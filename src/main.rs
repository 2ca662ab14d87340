use std::env;

use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    let raw_args: Vec<String> = env::args().collect();
    match raw_args.get(1).map(|s| s.as_str()) {
        Some("serve") => {
            let port = raw_args
                .get(2)
                .and_then(|s| s.parse::<u16>().ok())
                .unwrap_or(8080);
            if let Err(e) = loanplan::api::run_http_server(port).await {
                eprintln!("Server error: {e}");
                std::process::exit(1);
            }
        }
        Some("analyze") => {
            if let Err(e) = loanplan::api::run_analyze(&raw_args[1..]) {
                eprintln!("{e}");
                std::process::exit(2);
            }
        }
        _ => {
            eprintln!("Usage: loanplan serve [port]");
            eprintln!("       loanplan analyze [--loan-amount N --annual-income N --monthly-payment N --interest-rate N]");
            std::process::exit(1);
        }
    }
}
