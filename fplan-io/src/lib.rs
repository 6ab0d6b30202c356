use std::collections::HashSet;
use std::fs;
use std::path::{Path, PathBuf};

use fplan_core::chain::WallChain;
use fplan_core::floorplan::Floorplan;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum IoError {
    #[error("failed to read file {path:?}: {source}")]
    ReadError {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("failed to write file {path:?}: {source}")]
    WriteError {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("failed to parse layout {path:?}: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
    #[error("invalid floorplan: {0}")]
    InvalidDocument(String),
}

pub trait FloorplanLoader {
    fn load(&self, path: &Path) -> Result<Floorplan, IoError>;
}

pub trait FloorplanSaver {
    fn save(&self, floorplan: &Floorplan, path: &Path) -> Result<(), IoError>;
}

/// 以 JSON 读写平面图布局（字段名为 camelCase，未放置构件的 `wallIndex` 为 `-1`）。
#[derive(Debug, Clone, Copy, Default)]
pub struct JsonFacade {
    pretty: bool,
}

impl JsonFacade {
    pub fn new() -> Self {
        Self { pretty: true }
    }

    pub fn compact() -> Self {
        Self { pretty: false }
    }

    pub fn parse_str(&self, data: &str) -> Result<Floorplan, IoError> {
        let floorplan: Floorplan = serde_json::from_str(data)
            .map_err(|err| IoError::InvalidDocument(err.to_string()))?;
        validate(&floorplan)?;
        Ok(floorplan)
    }

    pub fn to_json(&self, floorplan: &Floorplan) -> Result<String, IoError> {
        let result = if self.pretty {
            serde_json::to_string_pretty(floorplan)
        } else {
            serde_json::to_string(floorplan)
        };
        result.map_err(|err| IoError::InvalidDocument(err.to_string()))
    }
}

impl FloorplanLoader for JsonFacade {
    fn load(&self, path: &Path) -> Result<Floorplan, IoError> {
        let data = fs::read_to_string(path).map_err(|source| IoError::ReadError {
            path: path.to_path_buf(),
            source,
        })?;
        let floorplan: Floorplan = serde_json::from_str(&data).map_err(|source| IoError::Parse {
            path: path.to_path_buf(),
            source,
        })?;
        validate(&floorplan)?;
        Ok(floorplan)
    }
}

impl FloorplanSaver for JsonFacade {
    fn save(&self, floorplan: &Floorplan, path: &Path) -> Result<(), IoError> {
        validate(floorplan)?;
        let data = self.to_json(floorplan)?;
        fs::write(path, data).map_err(|source| IoError::WriteError {
            path: path.to_path_buf(),
            source,
        })
    }
}

/// 墙体必须能构成墙链，构件 id 必须唯一。越界的墙索引与比例在读取时钳制，不视为错误。
fn validate(floorplan: &Floorplan) -> Result<(), IoError> {
    WallChain::build(&floorplan.walls).map_err(|err| IoError::InvalidDocument(err.to_string()))?;

    let mut seen = HashSet::new();
    for item in &floorplan.items {
        if !seen.insert(item.id.as_str()) {
            return Err(IoError::InvalidDocument(format!(
                "duplicate item id `{}`",
                item.id
            )));
        }
        if !item.width.is_finite() || item.width <= 0.0 {
            return Err(IoError::InvalidDocument(format!(
                "item `{}` has non-positive width {}",
                item.id, item.width
            )));
        }
    }
    Ok(())
}
