use std::collections::HashMap;

use fplan_core::floorplan::{ItemId, Wall, WallDefaults};

use crate::input::Key;
use crate::scene::Scene;

#[derive(Debug, Clone)]
pub struct CommandRequest {
    pub name: String,
    pub args: Vec<String>,
}

impl CommandRequest {
    pub fn new(name: impl Into<String>, args: impl IntoIterator<Item = impl Into<String>>) -> Self {
        Self {
            name: name.into(),
            args: args.into_iter().map(Into::into).collect(),
        }
    }
}

#[derive(Debug, Clone)]
pub struct CommandResponse {
    pub success: bool,
    pub message: Option<String>,
}

impl CommandResponse {
    pub fn ok(message: impl Into<String>) -> Self {
        Self {
            success: true,
            message: Some(message.into()),
        }
    }

    pub fn err(message: impl Into<String>) -> Self {
        Self {
            success: false,
            message: Some(message.into()),
        }
    }
}

pub trait CommandHandler: Send + Sync {
    fn name(&self) -> &'static str;
    fn execute(
        &self,
        request: &CommandRequest,
        context: &mut CommandContext<'_>,
    ) -> CommandResponse;
}

/// 编辑墙体与门窗数量时使用的默认值，通常来自配置。
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct EditDefaults {
    pub walls: WallDefaults,
    pub door_width: f64,
    pub window_width: f64,
}

impl Default for EditDefaults {
    fn default() -> Self {
        Self {
            walls: WallDefaults::default(),
            door_width: 3.0,
            window_width: 4.0,
        }
    }
}

pub struct CommandContext<'a> {
    pub scene: &'a mut Scene,
    pub defaults: EditDefaults,
}

pub struct CommandBus {
    handlers: HashMap<&'static str, Box<dyn CommandHandler>>,
}

impl CommandBus {
    pub fn new() -> Self {
        let mut bus = Self {
            handlers: HashMap::new(),
        };
        bus.register(ClearSelectionCommand);
        bus.register(NudgeCommand);
        bus.register(SetWidthCommand);
        bus.register(UnplaceCommand);
        bus.register(UndoCommand);
        bus.register(RedoCommand);
        bus.register(SetWallCountCommand);
        bus.register(SetWallCommand);
        bus.register(SetOpeningsCommand);
        bus
    }

    pub fn register<H: CommandHandler + 'static>(&mut self, handler: H) {
        self.handlers.insert(handler.name(), Box::new(handler));
    }

    pub fn dispatch(
        &self,
        request: &CommandRequest,
        context: &mut CommandContext<'_>,
    ) -> CommandResponse {
        if let Some(handler) = self.handlers.get(request.name.as_str()) {
            handler.execute(request, context)
        } else {
            CommandResponse::err(format!("未知命令: {}", request.name))
        }
    }

    pub fn available_commands(&self) -> impl Iterator<Item = &&'static str> {
        self.handlers.keys()
    }
}

impl Default for CommandBus {
    fn default() -> Self {
        Self::new()
    }
}

struct ClearSelectionCommand;

impl CommandHandler for ClearSelectionCommand {
    fn name(&self) -> &'static str {
        "clear_selection"
    }

    fn execute(
        &self,
        _request: &CommandRequest,
        context: &mut CommandContext<'_>,
    ) -> CommandResponse {
        context.scene.clear_selection();
        CommandResponse::ok("选中已清空")
    }
}

struct NudgeCommand;

impl CommandHandler for NudgeCommand {
    fn name(&self) -> &'static str {
        "nudge"
    }

    fn execute(
        &self,
        request: &CommandRequest,
        context: &mut CommandContext<'_>,
    ) -> CommandResponse {
        let key = match request.args.first().map(String::as_str) {
            Some("left") => Key::ArrowLeft,
            Some("right") => Key::ArrowRight,
            other => return CommandResponse::err(format!("nudge 需要 left 或 right，收到 {other:?}")),
        };
        match context.scene.nudge_selected(&key) {
            Ok(true) => CommandResponse::ok("已微调选中构件"),
            Ok(false) => CommandResponse::ok("没有可微调的构件"),
            Err(err) => CommandResponse::err(err.to_string()),
        }
    }
}

struct SetWidthCommand;

impl CommandHandler for SetWidthCommand {
    fn name(&self) -> &'static str {
        "set_width"
    }

    fn execute(
        &self,
        request: &CommandRequest,
        context: &mut CommandContext<'_>,
    ) -> CommandResponse {
        let Some(width) = request.args.first().and_then(|arg| arg.parse::<f64>().ok()) else {
            return CommandResponse::err("set_width 需要一个数值参数");
        };
        match context.scene.set_selected_width(width) {
            Ok(()) => CommandResponse::ok(format!("宽度已设置为 {width}")),
            Err(err) => CommandResponse::err(err.to_string()),
        }
    }
}

struct UnplaceCommand;

impl CommandHandler for UnplaceCommand {
    fn name(&self) -> &'static str {
        "unplace"
    }

    fn execute(
        &self,
        request: &CommandRequest,
        context: &mut CommandContext<'_>,
    ) -> CommandResponse {
        let Some(id) = request.args.first() else {
            return CommandResponse::err("unplace 需要构件 id");
        };
        match context.scene.unplace(&ItemId::new(id.as_str())) {
            Ok(()) => CommandResponse::ok(format!("构件 {id} 已放回面板")),
            Err(err) => CommandResponse::err(err.to_string()),
        }
    }
}

struct UndoCommand;

impl CommandHandler for UndoCommand {
    fn name(&self) -> &'static str {
        "undo"
    }

    fn execute(
        &self,
        _request: &CommandRequest,
        context: &mut CommandContext<'_>,
    ) -> CommandResponse {
        match context.scene.undo() {
            Ok(true) => CommandResponse::ok("已撤销"),
            Ok(false) => CommandResponse::err("没有可撤销的操作"),
            Err(err) => CommandResponse::err(err.to_string()),
        }
    }
}

struct RedoCommand;

impl CommandHandler for RedoCommand {
    fn name(&self) -> &'static str {
        "redo"
    }

    fn execute(
        &self,
        _request: &CommandRequest,
        context: &mut CommandContext<'_>,
    ) -> CommandResponse {
        match context.scene.redo() {
            Ok(true) => CommandResponse::ok("已重做"),
            Ok(false) => CommandResponse::err("没有可重做的操作"),
            Err(err) => CommandResponse::err(err.to_string()),
        }
    }
}

fn parse_arg<T: std::str::FromStr>(request: &CommandRequest, index: usize) -> Option<T> {
    request.args.get(index).and_then(|arg| arg.parse().ok())
}

struct SetWallCountCommand;

impl CommandHandler for SetWallCountCommand {
    fn name(&self) -> &'static str {
        "set_wall_count"
    }

    fn execute(
        &self,
        request: &CommandRequest,
        context: &mut CommandContext<'_>,
    ) -> CommandResponse {
        let Some(count) = parse_arg::<usize>(request, 0) else {
            return CommandResponse::err("set_wall_count 需要墙体数量");
        };
        let defaults = context.defaults.walls;
        match context.scene.set_wall_count(count, &defaults) {
            Ok(()) => CommandResponse::ok(format!(
                "墙体数量已设置为 {}",
                context.scene.floorplan().walls.len()
            )),
            Err(err) => CommandResponse::err(err.to_string()),
        }
    }
}

struct SetWallCommand;

impl CommandHandler for SetWallCommand {
    fn name(&self) -> &'static str {
        "set_wall"
    }

    fn execute(
        &self,
        request: &CommandRequest,
        context: &mut CommandContext<'_>,
    ) -> CommandResponse {
        let (Some(index), Some(length), Some(angle)) = (
            parse_arg::<usize>(request, 0),
            parse_arg::<f64>(request, 1),
            parse_arg::<f64>(request, 2),
        ) else {
            return CommandResponse::err("set_wall 需要 <墙索引> <长度> <角度>");
        };
        match context.scene.set_wall(index, Wall::new(length, angle)) {
            Ok(()) => CommandResponse::ok(format!("墙 {index} 已更新")),
            Err(err) => CommandResponse::err(err.to_string()),
        }
    }
}

struct SetOpeningsCommand;

impl CommandHandler for SetOpeningsCommand {
    fn name(&self) -> &'static str {
        "set_openings"
    }

    fn execute(
        &self,
        request: &CommandRequest,
        context: &mut CommandContext<'_>,
    ) -> CommandResponse {
        let (Some(doors), Some(windows)) = (parse_arg::<usize>(request, 0), parse_arg::<usize>(request, 1)) else {
            return CommandResponse::err("set_openings 需要 <门数量> <窗数量>");
        };
        let EditDefaults {
            door_width,
            window_width,
            ..
        } = context.defaults;
        match context
            .scene
            .set_openings(doors, windows, door_width, window_width)
        {
            Ok(()) => CommandResponse::ok(format!("已设置 {doors} 扇门、{windows} 扇窗")),
            Err(err) => CommandResponse::err(err.to_string()),
        }
    }
}
