pub mod cli;
pub mod errors;
pub mod loader;
pub mod render;

use std::path::PathBuf;

use errors::FrontendError;
use fplan_config::AppConfig;
use tracing::info;

pub use cli::DemoOptions;

/// 加载布局并运行 CLI 演示。
pub fn run_cli_demo(
    config: &AppConfig,
    layout: Option<PathBuf>,
    options: &DemoOptions,
) -> Result<(), FrontendError> {
    info!("启动 CLI 演示前端");
    let loaded = loader::load_scene(config, layout);
    cli::run_demo(loaded, options)
}
