//! Submits a scan from the terminal and prints where the results live.

use std::process::ExitCode;

use clap::Parser;
use web_scanner::submit::{Page, ScanClient, SubmissionHandler, SubmitEvent, SubmitOutcome};

#[derive(Parser)]
#[command(version, about, long_about = None)]
struct Cli {
    /// Address of the scan service
    #[arg(short, long, env = "SCAN_SERVER", default_value = "http://127.0.0.1:8000")]
    server: String,

    /// Target URL to scan
    #[arg(value_name = "URL")]
    url: String,
}

/// Terminal stand-in for the browser page.
struct TerminalPage {
    server: String,
    target_url: String,
}

impl Page for TerminalPage {
    fn target_url(&self) -> String {
        self.target_url.clone()
    }

    fn navigate(&self, path: &str) {
        println!("{}{}", self.server.trim_end_matches('/'), path);
    }

    fn alert(&self, message: &str) {
        eprintln!("{}", message);
    }
}

#[tokio::main]
async fn main() -> ExitCode {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "warn".into()),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    let handler = SubmissionHandler::new(ScanClient::new(&cli.server));
    let page = TerminalPage {
        server: cli.server,
        target_url: cli.url,
    };

    match handler.on_submit(&SubmitEvent::new(), &page).await {
        SubmitOutcome::Navigated(_) => ExitCode::SUCCESS,
        SubmitOutcome::Alerted => ExitCode::FAILURE,
    }
}
