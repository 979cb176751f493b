use clap::{Parser, Subcommand, ValueEnum};
use reqwest::header::{HeaderMap, HeaderValue, AUTHORIZATION};
use reqwest::Method;
use serde_json::{json, Value};

#[derive(Parser)]
#[command(name = "failover-cli")]
#[command(about = "Management CLI for the provider failover daemon", long_about = None)]
struct Cli {
    #[arg(short, long, default_value = "http://localhost:8081")]
    url: String,

    #[arg(short, long, env = "FAILOVER_ADMIN_KEY", default_value = "CHANGE_ME_IN_PRODUCTION")]
    key: String,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Full status report: providers, recent failovers, flags
    Status,
    /// Provider health in priority order
    Providers,
    /// Force a provider's status (healthy, degraded, failed, unknown)
    Force { provider: String, status: String },
    /// Start, stop or run the background health probes
    Monitoring {
        #[arg(value_enum)]
        action: MonitoringAction,
    },
    /// Toggle degraded mode
    DegradedMode {
        #[arg(value_enum)]
        state: Toggle,
    },
}

#[derive(Clone, Copy, ValueEnum)]
enum MonitoringAction {
    Start,
    Stop,
    Probe,
}

#[derive(Clone, Copy, ValueEnum)]
enum Toggle {
    On,
    Off,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();
    let client = reqwest::Client::new();

    let mut headers = HeaderMap::new();
    headers.insert(AUTHORIZATION, HeaderValue::from_str(&format!("Bearer {}", cli.key))?);

    let (method, path, body) = match &cli.command {
        Commands::Status => (Method::GET, "/admin/status".to_string(), None),
        Commands::Providers => (Method::GET, "/admin/providers".to_string(), None),
        Commands::Force { provider, status } => (
            Method::POST,
            format!("/admin/providers/{}/status", provider),
            Some(json!({ "status": status })),
        ),
        Commands::Monitoring { action } => {
            let action = match action {
                MonitoringAction::Start => "start",
                MonitoringAction::Stop => "stop",
                MonitoringAction::Probe => "probe",
            };
            (Method::POST, format!("/admin/monitoring/{}", action), None)
        }
        Commands::DegradedMode { state } => (
            Method::PUT,
            "/admin/degraded-mode".to_string(),
            Some(json!({ "enabled": matches!(state, Toggle::On) })),
        ),
    };

    let mut request = client
        .request(method, format!("{}{}", cli.url.trim_end_matches('/'), path))
        .headers(headers);
    if let Some(body) = body {
        request = request.json(&body);
    }

    let res = request.send().await?;
    print_response(res).await
}

async fn print_response(res: reqwest::Response) -> Result<(), Box<dyn std::error::Error>> {
    let status = res.status();
    if !status.is_success() {
        eprintln!("Error: Admin API returned status {}", status);
        if let Ok(text) = res.text().await {
            eprintln!("Response: {}", text);
        }
        std::process::exit(1);
    }

    let json: Value = res.json().await?;
    println!("{}", serde_json::to_string_pretty(&json)?);
    Ok(())
}
