use clap::Parser;
use doc_verify::core::ConfigProvider;
use doc_verify::domain::ports::OcrEngine;
use doc_verify::utils::error::ErrorSeverity;
use doc_verify::utils::{logger, validation::Validate};
use doc_verify::web::{self, AppState};
use doc_verify::{
    CliConfig, DocumentPipeline, LocalStorage, TesseractOcr, TextExtractor, TomlConfig,
    VerificationEngine, VerifyError,
};
use std::sync::Arc;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = CliConfig::parse();

    // 初始化日誌
    if cli.json_logs {
        logger::init_json_logger(cli.verbose);
    } else {
        logger::init_cli_logger(cli.verbose);
    }

    tracing::info!("🚀 Starting doc-verify");

    // 指定 --config 時改用 TOML 設定
    let outcome = match cli.config.clone() {
        Some(path) => {
            tracing::info!("📁 Loading configuration from: {}", path);
            match TomlConfig::from_file(&path) {
                Ok(mut config) => {
                    if cli.monitor {
                        config.monitoring = Some(doc_verify::config::toml_config::MonitoringConfig {
                            enabled: true,
                        });
                    }
                    start(config).await
                }
                Err(e) => Err(e),
            }
        }
        None => start(cli).await,
    };

    if let Err(e) = outcome {
        tracing::error!(
            "❌ doc-verify stopped: {} (Category: {:?}, Severity: {:?})",
            e,
            e.category(),
            e.severity()
        );
        tracing::error!("💡 Suggestion: {}", e.recovery_suggestion());
        eprintln!("❌ {}", e.user_friendly_message());

        let exit_code = match e.severity() {
            ErrorSeverity::Low | ErrorSeverity::Medium => 2,
            ErrorSeverity::High => 1,
            ErrorSeverity::Critical => 3,
        };
        std::process::exit(exit_code);
    }

    Ok(())
}

async fn start<C>(config: C) -> Result<(), VerifyError>
where
    C: ConfigProvider + Validate + std::fmt::Debug,
{
    // 驗證配置
    config.validate()?;
    tracing::debug!("Configuration: {:?}", config);

    let storage = LocalStorage::new(config.upload_dir());
    storage.prepare().await?;
    tracing::info!("📂 Upload directory: {}", storage.base_path().display());

    // OCR 引擎在啟動時初始化一次，之後所有請求共用
    let ocr = Arc::new(TesseractOcr::new(config.ocr_binary(), config.ocr_language()));
    if let Err(e) = ocr.warm_up().await {
        tracing::warn!("⚠️ {} - image uploads will fail until this is fixed", e);
        tracing::warn!("💡 {}", e.recovery_suggestion());
    }

    let extractor = TextExtractor::new(ocr, config.extraction_timeout());
    let pipeline = DocumentPipeline::new(extractor);

    let monitor_enabled = config.monitoring_enabled();
    if monitor_enabled {
        tracing::info!("🔍 System monitoring enabled");
    }
    let engine = Arc::new(VerificationEngine::new_with_monitoring(
        storage,
        pipeline,
        monitor_enabled,
    ));

    let app = web::router(AppState::new(engine.clone()), config.max_upload_bytes());
    let listener = tokio::net::TcpListener::bind(config.bind_addr()).await?;
    tracing::info!("🌐 Listening on http://{}", listener.local_addr()?);

    web::serve(listener, app).await?;

    engine.monitor().log_shutdown_stats();
    tracing::info!("👋 doc-verify stopped");
    Ok(())
}
