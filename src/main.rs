use clap::Parser;

use urlx::cli::{Cli, Commands};
use urlx::config::StaticConfig;
use urlx::errors::UrlxError;
use urlx::logging::{Logger, init_logging};

#[actix_web::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    let cli = Cli::parse();

    if let Commands::GenerateConfig { output } = cli.command() {
        return generate_config(output.as_deref());
    }

    let config = StaticConfig::load(cli.config.as_deref()).unwrap_or_else(|e| exit_with(&e));

    // guard 必须存活到进程退出
    let _guard = init_logging(&config.logging).unwrap_or_else(|e| exit_with(&e));

    let logger = Logger::from_config(&config.shipping).unwrap_or_else(|e| exit_with(&e));

    urlx::runtime::run_server(&config, logger).await
}

fn generate_config(output: Option<&str>) -> anyhow::Result<()> {
    match output {
        Some(path) => {
            StaticConfig::default().save_to_file(path)?;
            println!("Sample configuration written to {}", path);
        }
        None => print!("{}", StaticConfig::generate_sample_config()?),
    }
    Ok(())
}

/// 启动阶段的错误：tracing 可能尚未初始化，直接输出到 stderr
fn exit_with(err: &UrlxError) -> ! {
    eprintln!("{}", err.format_colored());
    std::process::exit(1);
}
