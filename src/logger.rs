use tracing_subscriber::{EnvFilter, fmt};

/// 默认日志级别，保持控制台输出干净
const DEFAULT_LEVEL: &str = "warn";

/// 初始化日志系统
///
/// 通过 RUST_LOG 环境变量控制日志级别，例如 `RUST_LOG=reqchain=debug`
pub fn init_logger() {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(DEFAULT_LEVEL));

    fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(true)
        .with_thread_ids(false)
        .with_file(false)
        .with_line_number(false)
        .init();
}
