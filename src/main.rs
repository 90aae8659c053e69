use anyhow::Result;
use clap::Parser;

use covidmap::cli::Cli;
use covidmap::config;
use covidmap::runtime::modes::{self, Mode};
use covidmap::system::init_logging;

#[actix_web::main]
async fn main() -> Result<()> {
    dotenvy::dotenv().ok();
    let cli = Cli::parse();

    let mode = modes::detect_mode(cli.command);
    if let Mode::ConfigGenerate { path, force } = &mode {
        return modes::run_config_generate(path.as_deref(), *force);
    }

    config::init_config(cli.config.as_deref());
    let config = config::get_config();

    // 必须持有到进程结束，否则非阻塞日志可能丢失
    let _guard = init_logging(&config.logging)?;

    match mode {
        Mode::Server => modes::run_server(&config).await,
        Mode::Import => modes::run_import(&config).await.map(|_| ()),
        Mode::ConfigGenerate { .. } => Ok(()),
    }
}
