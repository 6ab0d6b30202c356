use std::path::PathBuf;

use fplan_config::{AppConfig, ConfigError};
use fplan_frontend::DemoOptions;
use tracing::{error, info, warn};
use tracing_subscriber::{EnvFilter, fmt};

fn main() {
    let mut args = std::env::args().skip(1);
    let mut config_override: Option<PathBuf> = None;
    let mut layout: Option<PathBuf> = None;
    let mut options = DemoOptions::default();

    while let Some(arg) = args.next() {
        match arg.as_str() {
            "--config" => config_override = Some(path_argument(&mut args, "--config", "配置文件")),
            "--layout" => layout = Some(path_argument(&mut args, "--layout", "布局文件")),
            "--svg" => options.svg_out = Some(path_argument(&mut args, "--svg", "SVG 输出")),
            other => {
                eprintln!("未知参数：{other}");
                std::process::exit(1);
            }
        }
    }

    let config = load_configuration(config_override);
    init_logging(&config);
    info!("启动平面图放置演示");

    if let Err(err) = fplan_frontend::run_cli_demo(&config, layout, &options) {
        error!(error = %err, "执行 CLI 演示失败");
        std::process::exit(1);
    }
}

fn path_argument(args: &mut impl Iterator<Item = String>, flag: &str, what: &str) -> PathBuf {
    let Some(path) = args.next() else {
        eprintln!("`{flag}` 需要提供{what}路径");
        std::process::exit(1);
    };
    PathBuf::from(path)
}

fn load_configuration(override_path: Option<PathBuf>) -> AppConfig {
    match override_path {
        Some(path) => AppConfig::from_file(&path).unwrap_or_else(|err| {
            warn!(path = %path.display(), error = %err, "加载指定配置失败，使用默认配置");
            AppConfig::default()
        }),
        None => match AppConfig::discover() {
            Ok(cfg) => cfg,
            Err(err) => {
                match &err {
                    ConfigError::Io { path, .. } | ConfigError::Parse { path, .. } => {
                        warn!(path = %path.display(), error = %err, "加载默认配置失败，使用内建默认值");
                    }
                    ConfigError::Context { .. } => {
                        warn!(error = %err, "加载默认配置失败，使用内建默认值");
                    }
                }
                AppConfig::default()
            }
        },
    }
}

fn init_logging(config: &AppConfig) {
    let filter =
        EnvFilter::try_new(config.logging.level.clone()).unwrap_or_else(|_| EnvFilter::new("info"));
    if fmt().with_env_filter(filter).try_init().is_err() {
        // 已初始化
    }
}
