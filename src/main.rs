use anyhow::Result;

use review_analysis::config::Config;
use review_analysis::orchestrator::App;
use review_analysis::utils::logging;

#[tokio::main]
async fn main() -> Result<()> {
    // 初始化日志
    logging::init();

    // 加载配置
    let config = Config::from_env();

    // 初始化并运行流水线
    App::initialize(config)?.run().await?;

    Ok(())
}
