use std::collections::VecDeque;

use fplan_core::floorplan::ItemId;
use fplan_core::geometry::Point2;
use fplan_core::nudge::NudgeDirection;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Key {
    ArrowLeft,
    ArrowRight,
    Other(String),
}

impl Key {
    /// 左右方向键映射为微调方向，其余按键忽略。
    pub fn nudge_direction(&self) -> Option<NudgeDirection> {
        match self {
            Key::ArrowLeft => Some(NudgeDirection::Backward),
            Key::ArrowRight => Some(NudgeDirection::Forward),
            Key::Other(_) => None,
        }
    }
}

/// 渲染表面投递给引擎的输入事件。指针坐标均为屏幕坐标。
#[derive(Debug, Clone, PartialEq)]
pub enum InputEvent {
    PointerDown { item_id: ItemId, screen: Point2 },
    PointerMove { screen: Point2 },
    PointerUp { screen: Point2 },
    /// 指针离开或丢失捕获，与抬起等价。
    PointerLeave,
    KeyDown(Key),
    /// 从面板拖入并释放在指定墙体上。
    Drop {
        item_id: ItemId,
        wall_index: usize,
        screen: Point2,
    },
}

/// 输入事件端口，引擎从中拉取事件，测试时可用脚本化实现替代真实表面。
pub trait InputPort {
    fn next_event(&mut self) -> Option<InputEvent>;
}

#[derive(Debug, Clone, Default)]
pub struct ScriptedInput {
    events: VecDeque<InputEvent>,
}

impl ScriptedInput {
    pub fn new(events: impl IntoIterator<Item = InputEvent>) -> Self {
        Self {
            events: events.into_iter().collect(),
        }
    }

    pub fn push(&mut self, event: InputEvent) {
        self.events.push_back(event);
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.events.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.events.is_empty()
    }
}

impl InputPort for ScriptedInput {
    fn next_event(&mut self) -> Option<InputEvent> {
        self.events.pop_front()
    }
}
