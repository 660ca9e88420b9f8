use std::path::PathBuf;

use clap::Parser;
use colored::Colorize;

use reqchain::auth::ConfiguredTokenProvider;
use reqchain::config::ConfigLoader;
use reqchain::http::Client;
use reqchain::parser;
use reqchain::runner::{Reporter, ScriptExecutor, validate};
use reqchain::utils::OutputOptions;

pub type Result<T> = std::result::Result<T, anyhow::Error>;

/// 按顺序执行脚本中的 HTTP 请求
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// 脚本文件路径
    pub script: PathBuf,

    /// 原样输出响应 body，不做 JSON 美化
    #[arg(long)]
    pub raw: bool,

    /// 输出响应头
    #[arg(short = 'H', long)]
    pub header: bool,

    /// 不输出状态行和 trace id
    #[arg(short, long)]
    pub quiet: bool,

    /// 配置文件路径
    #[arg(short, long, value_name = "PATH")]
    pub config: Option<PathBuf>,

    /// 只解析和检查脚本，不发送请求
    #[arg(long)]
    pub check: bool,
}

impl Cli {
    fn output_options(&self) -> OutputOptions {
        OutputOptions {
            raw: self.raw,
            show_headers: self.header,
            quiet: self.quiet,
        }
    }
}

pub async fn run(cli: Cli) -> Result<()> {
    let script = parser::parse_file(&cli.script)?;
    validate(&script)?;
    tracing::debug!(steps = script.len(), "script validated");

    if cli.check {
        println!(
            "{} {} request(s) in {}",
            "ok:".green().bold(),
            script.len(),
            cli.script.display()
        );
        return Ok(());
    }

    let config = ConfigLoader::load(cli.config.as_deref())?;
    let client = Client::with_timeout(config.timeout())?;
    let provider = ConfiguredTokenProvider::from_config(&config.auth, client.clone());

    let executor = ScriptExecutor::new(client, provider, Reporter::new(cli.output_options()));
    let report = executor.run(&script).await?;
    executor.reporter().print_summary(&report);

    Ok(())
}
