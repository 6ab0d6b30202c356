use std::fs;
use std::path::PathBuf;

use fplan_core::floorplan::ItemId;
use fplan_core::geometry::{Point2, ScreenTransform};
use fplan_engine::command::{CommandBus, CommandContext, CommandRequest};
use fplan_engine::input::{InputEvent, Key, ScriptedInput};
use fplan_engine::scene::Scene;
use tracing::{info, warn};

use crate::errors::FrontendError;
use crate::loader::{LayoutSource, LoadedScene};
use crate::render::{RenderData, render_svg};

/// 演示用绘制表面尺寸（像素）。
pub const SURFACE_WIDTH: f64 = 800.0;
pub const SURFACE_HEIGHT: f64 = 600.0;

#[derive(Debug, Clone, Default)]
pub struct DemoOptions {
    pub svg_out: Option<PathBuf>,
}

/// 简易 CLI 演示：回放一段放置手势脚本，执行若干命令并打印平面图概览。
pub fn run_demo(loaded: LoadedScene, options: &DemoOptions) -> Result<(), FrontendError> {
    let mut scene = loaded.scene;
    println!("Rust 版平面图放置演示");
    match &loaded.source {
        LayoutSource::File(path) => println!("已从布局文件加载：{}", path.display()),
        LayoutSource::Demo => println!("使用内置示例平面图"),
    }

    let viewport = scene.viewport();
    let transform = ScreenTransform::fit_viewport(&viewport, SURFACE_WIDTH, SURFACE_HEIGHT).ok_or(
        FrontendError::SurfaceTooSmall {
            width: SURFACE_WIDTH,
            height: SURFACE_HEIGHT,
        },
    )?;

    let mut port = gesture_script(&scene, &transform);
    let scripted = port.len();
    let changes = scene.drive(&mut port, &transform)?;
    info!(events = scripted, changes, "手势脚本回放完成");

    let command_bus = CommandBus::new();
    let mut commands: Vec<&str> = command_bus.available_commands().copied().collect();
    commands.sort_unstable();
    println!("支持的命令: {}", commands.join(", "));

    let mut context = CommandContext {
        scene: &mut scene,
        defaults: loaded.defaults,
    };
    for request in demo_commands() {
        let response = command_bus.dispatch(&request, &mut context);
        let message = response.message.unwrap_or_default();
        if response.success {
            println!("  > {} {}: {message}", request.name, request.args.join(" "));
        } else {
            warn!(command = %request.name, "CLI 命令执行失败: {message}");
        }
    }

    print_summary(&scene);

    if let Some(path) = &options.svg_out {
        let svg = render_svg(&RenderData::from_scene(&scene));
        fs::write(path, svg).map_err(|source| FrontendError::SvgWrite {
            path: path.clone(),
            source,
        })?;
        println!("SVG 已写入 {}", path.display());
    }
    Ok(())
}

/// 手势之后执行的演示命令：改宽度并撤销重做，再调整门窗与墙体数量。
/// 最后一次撤销只回退墙体数量。
pub fn demo_commands() -> Vec<CommandRequest> {
    vec![
        CommandRequest::new("set_width", ["2.5"]),
        CommandRequest::new("undo", Vec::<String>::new()),
        CommandRequest::new("redo", Vec::<String>::new()),
        CommandRequest::new("set_openings", ["2", "2"]),
        CommandRequest::new("set_wall_count", ["6"]),
        CommandRequest::new("undo", Vec::<String>::new()),
    ]
}

/// 按当前平面图生成演示脚本：第一个未放置构件拖放到第一面墙中点，
/// 第二个从面板拖到第二面墙，随后单击第一个构件并向右微调一次。
pub fn gesture_script(scene: &Scene, transform: &ScreenTransform) -> ScriptedInput {
    let mut port = ScriptedInput::default();
    let segments = scene.chain().segments();
    let palette: Vec<ItemId> = scene
        .floorplan()
        .unplaced_items()
        .map(|item| item.id.clone())
        .collect();

    let (Some(first), Some(first_wall)) = (palette.first(), segments.first()) else {
        return port;
    };
    let drop_at = transform.to_screen(first_wall.point_at(0.5));
    port.push(InputEvent::Drop {
        item_id: first.clone(),
        wall_index: 0,
        screen: drop_at,
    });

    if let (Some(second), Some(second_wall)) = (palette.get(1), segments.get(1)) {
        let target = transform.to_screen(second_wall.point_at(0.25));
        port.push(InputEvent::PointerDown {
            item_id: second.clone(),
            screen: Point2::new(0.0, 0.0),
        });
        port.push(InputEvent::PointerMove { screen: target });
        port.push(InputEvent::PointerMove { screen: target });
        port.push(InputEvent::PointerUp { screen: target });
    }

    port.push(InputEvent::PointerDown {
        item_id: first.clone(),
        screen: drop_at,
    });
    port.push(InputEvent::PointerUp { screen: drop_at });
    port.push(InputEvent::KeyDown(Key::ArrowRight));
    port
}

fn print_summary(scene: &Scene) {
    let floorplan = scene.floorplan();
    println!("视口 viewBox = \"{}\"", scene.viewport());
    println!("墙体：{}", floorplan.describe());

    let data = RenderData::from_scene(scene);
    for (index, (segment, lines)) in scene.chain().segments().iter().zip(&data.walls).enumerate() {
        println!(
            "  - 墙 {} ({:.2}, {:.2}) -> ({:.2}, {:.2})，共 {} 段",
            index + 1,
            segment.p1.x(),
            segment.p1.y(),
            segment.p2.x(),
            segment.p2.y(),
            lines.len()
        );
        for line in lines {
            match &line.opening {
                Some((id, kind)) => println!(
                    "      {} {}: ({:.2}, {:.2}) -> ({:.2}, {:.2})",
                    kind.as_str(),
                    id.as_str(),
                    line.from.x(),
                    line.from.y(),
                    line.to.x(),
                    line.to.y()
                ),
                None => println!(
                    "      墙体: ({:.2}, {:.2}) -> ({:.2}, {:.2})",
                    line.from.x(),
                    line.from.y(),
                    line.to.x(),
                    line.to.y()
                ),
            }
        }
    }

    println!("构件：");
    for item in &floorplan.items {
        match item.wall_in(floorplan.walls.len()) {
            Some(wall) => println!(
                "  - {} ({}) 位于墙 {}，位置 {:.3}，宽度 {}",
                item.id.as_str(),
                item.kind.as_str(),
                wall + 1,
                item.clamped_position(),
                item.width
            ),
            None => println!(
                "  - {} ({}) 尚在面板中，宽度 {}",
                item.id.as_str(),
                item.kind.as_str(),
                item.width
            ),
        }
    }

    match scene.selection() {
        Some(selection) => println!(
            "当前选中 {}，宽度编辑器锚点 ({:.1}, {:.1})",
            selection.item_id.as_str(),
            selection.anchor.x(),
            selection.anchor.y()
        ),
        None => println!("当前尚未选中任何构件。"),
    }
}
