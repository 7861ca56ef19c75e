use std::path::PathBuf;

use anyhow::{Context, Result};
use primer_submit::{App, Config};

#[tokio::main]
async fn main() -> Result<()> {
    // 加载配置：PRIMER_CONFIG 指向可选的 TOML 配置文件，环境变量优先
    let config_path = std::env::var("PRIMER_CONFIG").ok().map(PathBuf::from);
    let config = Config::load(config_path.as_deref()).context("加载配置失败")?;

    // 第一个参数为单个任务文件，缺省时处理任务目录
    let job_path = std::env::args().nth(1).map(PathBuf::from);

    // 初始化并运行应用
    let stats = App::initialize(config)?.run(job_path.as_deref()).await?;

    if stats.failed > 0 {
        std::process::exit(1);
    }
    Ok(())
}
