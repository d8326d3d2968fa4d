use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

/// 日志写到 stderr，stdout 只留给分析结果
pub fn init_logger() {
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| "mygov_translator=info".into()))
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();
}
