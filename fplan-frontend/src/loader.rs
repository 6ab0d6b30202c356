use std::env;
use std::path::{Path, PathBuf};

use fplan_config::AppConfig;
use fplan_core::floorplan::{Floorplan, Units, Wall, WallDefaults};
use fplan_engine::command::EditDefaults;
use fplan_engine::placement::InteractionSettings;
use fplan_engine::scene::Scene;
use fplan_io::{FloorplanLoader, JsonFacade};
use tracing::{info, warn};

use crate::errors::FrontendError;

/// 平面图来源，便于前端呈现加载信息。
#[derive(Debug, Clone)]
pub enum LayoutSource {
    File(PathBuf),
    Demo,
}

/// 统一封装加载后的场景与元信息。
#[derive(Debug)]
pub struct LoadedScene {
    pub scene: Scene,
    pub source: LayoutSource,
    pub defaults: EditDefaults,
}

/// 按显式路径或环境变量 `FPLAN_CLI_SAMPLE_LAYOUT` 加载布局，
/// 若失败则回退到内置示例。
pub fn load_scene(config: &AppConfig, layout: Option<PathBuf>) -> LoadedScene {
    let mut scene = Scene::with_settings(interaction_settings(config));
    let defaults = edit_defaults(config);

    let path = layout.or_else(|| env::var_os("FPLAN_CLI_SAMPLE_LAYOUT").map(PathBuf::from));
    if let Some(path) = path {
        match load_layout(&mut scene, &path) {
            Ok(()) => {
                info!(path = %path.display(), "从布局文件加载平面图成功");
                return LoadedScene {
                    scene,
                    source: LayoutSource::File(path),
                    defaults,
                };
            }
            Err(err) => {
                warn!(path = %path.display(), error = %err, "加载布局失败，回退到内置示例");
            }
        }
    }

    if let Err(err) = scene.load_floorplan(demo_floorplan(config)) {
        warn!(error = %err, "内置示例无法构建墙链");
    }
    LoadedScene {
        scene,
        source: LayoutSource::Demo,
        defaults,
    }
}

fn load_layout(scene: &mut Scene, path: &Path) -> Result<(), FrontendError> {
    let floorplan = JsonFacade::new().load(path)?;
    scene.load_floorplan(floorplan)?;
    Ok(())
}

/// 内置示例：详细模式的四面墙，加上配置宽度的一扇门和两扇窗。
pub fn demo_floorplan(config: &AppConfig) -> Floorplan {
    Floorplan::detailed_default()
        .with_units(units(config))
        .with_openings(1, 2, config.floorplan.door_width, config.floorplan.window_width)
}

pub fn interaction_settings(config: &AppConfig) -> InteractionSettings {
    InteractionSettings {
        drag_threshold_px: config.interaction.drag_threshold_px,
        snap_ratio: config.interaction.snap_ratio,
        nudge_step: config.interaction.nudge_step,
    }
}

/// 命令编辑墙体与门窗时使用的默认值。
pub fn edit_defaults(config: &AppConfig) -> EditDefaults {
    EditDefaults {
        walls: wall_defaults(config),
        door_width: config.floorplan.door_width,
        window_width: config.floorplan.window_width,
    }
}

pub fn wall_defaults(config: &AppConfig) -> WallDefaults {
    let floorplan = &config.floorplan;
    WallDefaults {
        fill: Wall::new(floorplan.default_wall_length, floorplan.default_wall_angle),
        min_walls: floorplan.min_walls,
        max_walls: floorplan.max_walls.max(floorplan.min_walls),
    }
}

fn units(config: &AppConfig) -> Units {
    config.floorplan.units.parse().unwrap_or_else(|err| {
        warn!(error = %err, "单位配置无效，使用英尺");
        Units::Feet
    })
}
