use clap::Parser;
use cta_probe::browser::chrome::LaunchOptions;
use cta_probe::probe::{self, ProbeConfig};
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Page to probe
    #[arg(long, default_value = "http://localhost:3000")]
    url: String,

    /// Directory for the pre/post-scroll screenshots
    #[arg(long)]
    screenshot_dir: Option<PathBuf>,

    /// Navigation timeout in milliseconds
    #[arg(long, default_value_t = 30_000)]
    nav_timeout_ms: u64,

    /// Run with a visible browser window (debugging)
    #[arg(long)]
    headed: bool,

    /// Pass --no-sandbox to Chrome (required in most CI containers)
    #[arg(long)]
    no_sandbox: bool,

    /// Explicit Chrome executable path
    #[arg(long)]
    chrome_path: Option<String>,
}

#[tokio::main]
async fn main() {
    env_logger::init();
    let args = Args::parse();

    let mut config = ProbeConfig {
        url: args.url,
        nav_timeout_ms: args.nav_timeout_ms,
        launch: LaunchOptions {
            headless: !args.headed,
            no_sandbox: args.no_sandbox,
            chrome_path: args.chrome_path,
        },
        ..ProbeConfig::default()
    };
    if let Some(dir) = args.screenshot_dir {
        config.screenshot_dir = dir;
    }

    let verdict = probe::run(&config).await;
    for line in &verdict.lines {
        println!("{}", line);
    }
    std::process::exit(verdict.exit_code());
}
