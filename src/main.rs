use clap::Parser;
use open311_client::config::{CliConfig, Command};
use open311_client::utils::logger;
use open311_client::{ErrorKind, HttpTransport, Open311Error, Open311Wrapper};
use std::collections::BTreeMap;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = CliConfig::parse();

    // 初始化日誌
    if cli.json_logs {
        logger::init_json_logger();
    } else {
        logger::init_cli_logger(cli.verbose);
    }

    tracing::info!("Starting open311 CLI");
    if cli.verbose {
        tracing::debug!("CLI config: {:?}", cli);
    }

    // 驗證配置
    let config = match cli.resolve() {
        Ok(config) => config,
        Err(e) => {
            tracing::error!("❌ Configuration validation failed: {}", e);
            tracing::error!("💡 Suggestion: {}", e.recovery_suggestion());
            eprintln!("❌ {}", e);
            std::process::exit(1);
        }
    };

    let wrapper = Open311Wrapper::from_config(config)?;
    tracing::info!("🔗 {} ({})", wrapper.wrapper_info(), wrapper.format());

    match run(&wrapper, &cli.command).await {
        Ok(output) => {
            println!("{}", output);
        }
        Err(e) => {
            tracing::error!("❌ Request failed: {} (Kind: {:?})", e, e.kind());
            tracing::error!("💡 Recovery suggestion: {}", e.recovery_suggestion());

            eprintln!("❌ {}", e);
            eprintln!("💡 {}", e.recovery_suggestion());

            // 依錯誤種類決定退出碼
            let exit_code = match e.kind() {
                ErrorKind::GeoReportV2 => 2,
                ErrorKind::Transport => 3,
                _ => 1,
            };
            std::process::exit(exit_code);
        }
    }

    Ok(())
}

async fn run(
    wrapper: &Open311Wrapper<HttpTransport>,
    command: &Command,
) -> Result<String, Open311Error> {
    let output = match command {
        Command::Services => to_json(&wrapper.get_service_list().await?),
        Command::Definition { service_code } => {
            to_json(&wrapper.get_service_definition(service_code).await?)
        }
        Command::Token { token } => {
            to_json(&wrapper.get_service_request_id_from_token(token).await?)
        }
        Command::Requests { filters } => {
            let filters: BTreeMap<String, String> = filters.iter().cloned().collect();
            to_json(&wrapper.get_service_requests(&filters).await?)
        }
        Command::Request { service_request_id } => {
            to_json(&wrapper.get_service_request(service_request_id).await?)
        }
    };
    Ok(output)
}

fn to_json<T: serde::Serialize>(records: &T) -> String {
    serde_json::to_string_pretty(records).unwrap_or_else(|e| format!("<unprintable: {}>", e))
}
