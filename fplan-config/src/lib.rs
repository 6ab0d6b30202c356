use std::env;
use std::fs;
use std::path::{Path, PathBuf};

use serde::Deserialize;
use thiserror::Error;

/// 应用配置的根结构。
#[derive(Debug, Clone, Default, Deserialize)]
pub struct AppConfig {
    #[serde(default)]
    pub logging: LoggingConfig,
    #[serde(default)]
    pub interaction: InteractionConfig,
    #[serde(default)]
    pub floorplan: FloorplanConfig,
}

impl AppConfig {
    /// 从显式路径加载配置。
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let content = fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        toml::from_str(&content).map_err(|source| ConfigError::Parse {
            path: path.to_path_buf(),
            source,
        })
    }

    /// 自动发现配置文件：优先读取环境变量 `FPLAN_CONFIG`，否则寻找 `./config/default.toml`。
    /// 若文件缺失，则返回默认配置。
    pub fn discover() -> Result<Self, ConfigError> {
        if let Some(path) = env::var_os("FPLAN_CONFIG") {
            return Self::from_file(PathBuf::from(path));
        }

        let default_path = env::current_dir()
            .map(|dir| dir.join("config").join("default.toml"))
            .map_err(|source| ConfigError::Context {
                message: "获取当前工作目录失败".to_string(),
                source,
            })?;

        if default_path.exists() {
            Self::from_file(default_path)
        } else {
            Ok(Self::default())
        }
    }
}

/// 日志配置，支持设置默认等级。
#[derive(Debug, Clone, Deserialize)]
pub struct LoggingConfig {
    #[serde(default = "LoggingConfig::default_level")]
    pub level: String,
}

impl LoggingConfig {
    fn default_level() -> String {
        "info".to_string()
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: Self::default_level(),
        }
    }
}

/// 拖拽、吸附与键盘微调的可调参数。
#[derive(Debug, Clone, Copy, Deserialize)]
pub struct InteractionConfig {
    #[serde(default = "InteractionConfig::default_drag_threshold")]
    pub drag_threshold_px: f64,
    #[serde(default = "InteractionConfig::default_snap_ratio")]
    pub snap_ratio: f64,
    #[serde(default = "InteractionConfig::default_nudge_step")]
    pub nudge_step: f64,
}

impl InteractionConfig {
    fn default_drag_threshold() -> f64 {
        5.0
    }

    fn default_snap_ratio() -> f64 {
        0.05
    }

    fn default_nudge_step() -> f64 {
        0.005
    }
}

impl Default for InteractionConfig {
    fn default() -> Self {
        Self {
            drag_threshold_px: Self::default_drag_threshold(),
            snap_ratio: Self::default_snap_ratio(),
            nudge_step: Self::default_nudge_step(),
        }
    }
}

/// 新建平面图与墙数量编辑时使用的默认值。
#[derive(Debug, Clone, Deserialize)]
pub struct FloorplanConfig {
    #[serde(default = "FloorplanConfig::default_units")]
    pub units: String,
    #[serde(default = "FloorplanConfig::default_wall_length")]
    pub default_wall_length: f64,
    #[serde(default = "FloorplanConfig::default_wall_angle")]
    pub default_wall_angle: f64,
    #[serde(default = "FloorplanConfig::default_min_walls")]
    pub min_walls: usize,
    #[serde(default = "FloorplanConfig::default_max_walls")]
    pub max_walls: usize,
    #[serde(default = "FloorplanConfig::default_door_width")]
    pub door_width: f64,
    #[serde(default = "FloorplanConfig::default_window_width")]
    pub window_width: f64,
}

impl FloorplanConfig {
    fn default_units() -> String {
        "ft".to_string()
    }

    fn default_wall_length() -> f64 {
        10.0
    }

    fn default_wall_angle() -> f64 {
        90.0
    }

    fn default_min_walls() -> usize {
        3
    }

    fn default_max_walls() -> usize {
        10
    }

    fn default_door_width() -> f64 {
        3.0
    }

    fn default_window_width() -> f64 {
        4.0
    }
}

impl Default for FloorplanConfig {
    fn default() -> Self {
        Self {
            units: Self::default_units(),
            default_wall_length: Self::default_wall_length(),
            default_wall_angle: Self::default_wall_angle(),
            min_walls: Self::default_min_walls(),
            max_walls: Self::default_max_walls(),
            door_width: Self::default_door_width(),
            window_width: Self::default_window_width(),
        }
    }
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("读取配置文件 {path:?} 失败: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("解析配置文件 {path:?} 失败: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },
    #[error("{message}")]
    Context {
        message: String,
        #[source]
        source: std::io::Error,
    },
}
