use std::path::PathBuf;

use fplan_engine::errors::EngineError;
use fplan_io::IoError;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum FrontendError {
    #[error("引擎操作失败: {0}")]
    Engine(#[from] EngineError),
    #[error("布局文件读写失败: {0}")]
    Io(#[from] IoError),
    #[error("视口无法映射到 {width}x{height} 的绘制表面")]
    SurfaceTooSmall { width: f64, height: f64 },
    #[error("写入 SVG 文件 {path:?} 失败: {source}")]
    SvgWrite {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}
