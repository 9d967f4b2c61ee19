use aftership_node::domain::model::Parameters;
use aftership_node::domain::ports::Storage;
use aftership_node::utils::error::{AfterShipError, ErrorSeverity};
use aftership_node::utils::{logger, validation::Validate};
use aftership_node::{AfterShipClient, CliConfig, LocalStorage, NodeEngine, Resource};
use clap::Parser;
use serde_json::Value;
use std::time::Duration;

#[tokio::main]
async fn main() {
    let config = CliConfig::parse();

    // 初始化日誌
    if config.json_logs {
        logger::init_json_logger();
    } else {
        logger::init_cli_logger(config.verbose);
    }

    tracing::info!("Starting aftership CLI");
    if config.verbose {
        tracing::debug!("CLI config: {:?}", config);
    }

    if let Err(e) = run(config).await {
        tracing::error!(
            "❌ Run failed: {} (Category: {:?}, Severity: {:?})",
            e,
            e.category(),
            e.severity()
        );
        tracing::error!("💡 Recovery suggestion: {}", e.recovery_suggestion());

        eprintln!("❌ {}", e.user_friendly_message());
        eprintln!("💡 {}", e.recovery_suggestion());

        // 根據錯誤嚴重程度決定退出碼
        let exit_code = match e.severity() {
            ErrorSeverity::Low => 0,
            ErrorSeverity::Medium => 2,
            ErrorSeverity::High => 1,
            ErrorSeverity::Critical => 3,
        };

        if exit_code > 0 {
            std::process::exit(exit_code);
        }
    }
}

async fn run(config: CliConfig) -> aftership_node::Result<()> {
    // 驗證配置
    config.validate()?;

    let file_config = config.load_file_config()?;
    let credentials = config.resolve_credentials(&file_config)?;

    let mut http = reqwest::Client::builder();
    if let Some(seconds) = file_config.execution.timeout_seconds {
        http = http.timeout(Duration::from_secs(seconds));
    }
    let client = AfterShipClient::with_client(credentials, http.build()?);

    if config.test_credentials {
        client.test_credentials().await?;
        println!("✅ AfterShip credentials are valid");
        return Ok(());
    }

    let resource: Resource = config.resource.as_deref().unwrap_or_default().parse()?;
    let operation = config.operation.clone().unwrap_or_default();
    let items = load_items(&config).await?;

    let continue_on_fail = config.continue_on_fail || file_config.execution.continue_on_fail;
    let engine = NodeEngine::new(client).with_continue_on_fail(continue_on_fail);
    let records = engine.execute(resource, &operation, &items).await?;

    let output = serde_json::to_vec_pretty(&records)?;
    match &config.output_path {
        Some(dir) => {
            let file_name = format!(
                "{}_{}_{}.json",
                resource,
                operation,
                chrono::Utc::now().format("%Y%m%d_%H%M%S")
            );
            let storage = LocalStorage::new(dir.clone());
            storage.write_file(&file_name, &output).await?;

            let path = storage.full_path(&file_name);
            tracing::info!("📁 Output saved to: {}", path.display());
            println!("📁 Output saved to: {}", path.display());
        }
        None => println!("{}", String::from_utf8_lossy(&output)),
    }

    Ok(())
}

/// One parameter object per item: `--params` or `--items-file` holding an
/// object or an array of objects. Neither means a single empty item.
async fn load_items(config: &CliConfig) -> aftership_node::Result<Vec<Parameters>> {
    let raw = match (&config.params, &config.items_file) {
        (Some(inline), _) => serde_json::from_str::<Value>(inline)?,
        (None, Some(path)) => {
            let storage = LocalStorage::new(".".to_string());
            serde_json::from_slice(&storage.read_file(path).await?)?
        }
        (None, None) => Value::Null,
    };

    match raw {
        Value::Array(items) => {
            if items.is_empty() {
                return Err(AfterShipError::InvalidParameter {
                    name: "params".to_string(),
                    reason: "the item list is empty".to_string(),
                });
            }
            items.into_iter().map(Parameters::from_value).collect()
        }
        other => Ok(vec![Parameters::from_value(other)?]),
    }
}
