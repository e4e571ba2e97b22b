use anyhow::{Context, Result};
use clap::Parser;

use mathpro_client::cli::Cli;
use mathpro_client::utils::logging;
use mathpro_client::{App, Config};

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // 加载配置
    let config = Config::load(cli.config.as_deref()).context("加载配置失败")?;

    // 初始化日志
    logging::init(config.verbose_logging || cli.verbose);
    logging::log_startup(config.origin());

    // 初始化并运行应用
    App::initialize(config)?.run(cli.command).await
}
