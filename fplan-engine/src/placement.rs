use tracing::{debug, trace};

use fplan_core::chain::WallChain;
use fplan_core::floorplan::{Floorplan, ItemId};
use fplan_core::geometry::{Point2, ScreenTransform};
use fplan_core::nudge::{NUDGE_STEP, nudge_by};
use fplan_core::projection::{project, project_onto_segment};

use crate::errors::EngineError;
use crate::input::Key;

/// 待定拖拽转为真正拖拽所需的屏幕位移（像素）。
pub const DRAG_THRESHOLD_PX: f64 = 5.0;
/// 吸附阈值相对视口宽度的比例。
pub const SNAP_RATIO: f64 = 0.05;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct InteractionSettings {
    pub drag_threshold_px: f64,
    pub snap_ratio: f64,
    pub nudge_step: f64,
}

impl Default for InteractionSettings {
    fn default() -> Self {
        Self {
            drag_threshold_px: DRAG_THRESHOLD_PX,
            snap_ratio: SNAP_RATIO,
            nudge_step: NUDGE_STEP,
        }
    }
}

/// 单次手势期间的拖拽状态，手势结束即回到 `Idle`。
#[derive(Debug, Clone, PartialEq, Default)]
pub enum DragState {
    #[default]
    Idle,
    PendingDrag { item_id: ItemId, origin: Point2 },
    Dragging { item_id: ItemId },
}

impl DragState {
    pub fn item_id(&self) -> Option<&ItemId> {
        match self {
            DragState::Idle => None,
            DragState::PendingDrag { item_id, .. } | DragState::Dragging { item_id } => Some(item_id),
        }
    }

    #[inline]
    pub fn is_idle(&self) -> bool {
        matches!(self, DragState::Idle)
    }
}

/// 单击产生的选中项，`anchor` 为浮动宽度编辑器的屏幕锚点。
#[derive(Debug, Clone, PartialEq)]
pub struct Selection {
    pub item_id: ItemId,
    pub anchor: Point2,
}

/// 放置引擎：持有拖拽状态机与选中项，所有平面图变更都以新值返回。
#[derive(Debug, Clone, Default)]
pub struct PlacementEngine {
    drag: DragState,
    selection: Option<Selection>,
    settings: InteractionSettings,
}

impl PlacementEngine {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_settings(settings: InteractionSettings) -> Self {
        Self {
            settings,
            ..Self::default()
        }
    }

    #[inline]
    pub fn settings(&self) -> InteractionSettings {
        self.settings
    }

    #[inline]
    pub fn drag_state(&self) -> &DragState {
        &self.drag
    }

    #[inline]
    pub fn selection(&self) -> Option<&Selection> {
        self.selection.as_ref()
    }

    #[inline]
    pub fn clear_selection(&mut self) {
        self.selection = None;
    }

    /// 丢弃手势与选中状态，用于整体替换平面图。
    pub fn reset(&mut self) {
        self.drag = DragState::Idle;
        self.selection = None;
    }

    /// 指针在构件上按下：清除选中并进入待定拖拽。构件不存在时保持空闲。
    pub fn pointer_down(&mut self, floorplan: &Floorplan, item_id: ItemId, screen: Point2) -> bool {
        self.selection = None;
        if floorplan.item(&item_id).is_none() {
            debug!(item = %item_id, "按下的构件不存在，忽略");
            self.drag = DragState::Idle;
            return false;
        }
        debug!(item = %item_id, x = screen.x(), y = screen.y(), "进入待定拖拽");
        self.drag = DragState::PendingDrag {
            item_id,
            origin: screen,
        };
        true
    }

    /// 指针移动。待定拖拽超过阈值后转为拖拽（本次不更新放置），
    /// 拖拽中则投影到墙链并按吸附阈值放置或取消放置。
    pub fn pointer_move(
        &mut self,
        floorplan: &Floorplan,
        chain: &WallChain,
        screen: Point2,
        transform: &ScreenTransform,
    ) -> Option<Floorplan> {
        match &self.drag {
            DragState::Idle => None,
            DragState::PendingDrag { item_id, origin } => {
                let moved = origin.distance_squared(screen).sqrt();
                if moved < self.settings.drag_threshold_px {
                    return None;
                }
                let item_id = item_id.clone();
                debug!(item = %item_id, moved, "开始拖拽");
                self.drag = DragState::Dragging { item_id };
                None
            }
            DragState::Dragging { item_id } => {
                let local = transform.to_local(screen);
                self.snap_to_chain(floorplan, chain, item_id, local)
            }
        }
    }

    fn snap_to_chain(
        &self,
        floorplan: &Floorplan,
        chain: &WallChain,
        item_id: &ItemId,
        local: Point2,
    ) -> Option<Floorplan> {
        let Some(item) = floorplan.item(item_id) else {
            trace!(item = %item_id, "拖拽中的构件已被移除");
            return None;
        };
        let threshold = self.settings.snap_ratio * chain.viewport().width;
        let updated = match project(local, chain.segments()) {
            Some(hit) if hit.distance_squared <= threshold * threshold => {
                item.placed_on(hit.segment_index, hit.t)
            }
            _ => item.detached(),
        };
        if &updated == item {
            return None;
        }
        trace!(
            item = %item_id,
            wall = ?updated.wall_index,
            position = updated.position,
            "拖拽更新放置"
        );
        floorplan.with_item(updated)
    }

    /// 指针抬起。若手势未越过拖拽阈值则视为单击并记录选中项。
    pub fn pointer_up(&mut self, screen: Point2) -> Option<Selection> {
        self.release(Some(screen))
    }

    /// 指针离开或丢失捕获，与抬起等价，锚点退化为按下位置。
    pub fn pointer_leave(&mut self) -> Option<Selection> {
        self.release(None)
    }

    fn release(&mut self, screen: Option<Point2>) -> Option<Selection> {
        match std::mem::take(&mut self.drag) {
            DragState::PendingDrag { item_id, origin } => {
                let selection = Selection {
                    item_id,
                    anchor: screen.unwrap_or(origin),
                };
                debug!(item = %selection.item_id, "单击选中构件");
                self.selection = Some(selection.clone());
                Some(selection)
            }
            DragState::Dragging { item_id } => {
                debug!(item = %item_id, "拖拽结束");
                None
            }
            DragState::Idle => None,
        }
    }

    /// 从面板拖放到指定墙体：只对目标墙投影，不做吸附判断。
    ///
    /// 墙索引越界时钳制到最后一面墙；墙链为空或构件不存在时不做任何事。
    pub fn drop_on_wall(
        &self,
        floorplan: &Floorplan,
        chain: &WallChain,
        item_id: &ItemId,
        wall_index: usize,
        local: Point2,
    ) -> Option<Floorplan> {
        let last = chain.len().checked_sub(1)?;
        let wall_index = wall_index.min(last);
        let segment = chain.segment(wall_index)?;
        let Some(item) = floorplan.item(item_id) else {
            debug!(item = %item_id, "拖放的构件不存在，忽略");
            return None;
        };
        let (t, _) = project_onto_segment(local, segment);
        debug!(item = %item_id, wall = wall_index, t, "构件拖放到墙体");
        floorplan.with_item(item.placed_on(wall_index, t.clamp(0.0, 1.0)))
    }

    /// 方向键微调当前选中构件。无选中、构件未放置或按键无关时返回 `None`。
    pub fn nudge_selected(&self, floorplan: &Floorplan, key: &Key) -> Option<Floorplan> {
        let direction = key.nudge_direction()?;
        let selection = self.selection.as_ref()?;
        let item = floorplan.item(&selection.item_id)?;
        if item.wall_in(floorplan.walls.len()).is_none() {
            return None;
        }
        let position = nudge_by(item, direction, self.settings.nudge_step);
        if position == item.position {
            return None;
        }
        floorplan.with_item(item.with_position(position))
    }

    /// 浮动宽度编辑器：修改选中构件的宽度。
    pub fn set_selected_width(&self, floorplan: &Floorplan, width: f64) -> Result<Floorplan, EngineError> {
        if !width.is_finite() || width <= 0.0 {
            return Err(EngineError::InvalidWidth(width));
        }
        let selection = self.selection.as_ref().ok_or(EngineError::NothingSelected)?;
        let item = floorplan
            .item(&selection.item_id)
            .ok_or_else(|| EngineError::ItemNotFound(selection.item_id.to_string()))?;
        floorplan
            .with_item(item.with_width(width))
            .ok_or_else(|| EngineError::ItemNotFound(selection.item_id.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use fplan_core::floorplan::{ItemKind, PlacedItem, Units, Wall};

    use super::*;

    fn square() -> (Floorplan, WallChain) {
        let plan = Floorplan::new(Units::Feet, vec![Wall::new(10.0, 90.0); 4]).with_openings(1, 1, 2.0, 3.0);
        let chain = WallChain::build(&plan.walls).unwrap();
        (plan, chain)
    }

    fn door() -> ItemId {
        ItemId::new("door-0")
    }

    #[test]
    fn small_moves_stay_pending() {
        let (plan, chain) = square();
        let mut engine = PlacementEngine::new();
        assert!(engine.pointer_down(&plan, door(), Point2::new(0.0, 0.0)));
        let moved = engine.pointer_move(&plan, &chain, Point2::new(3.0, 4.0 - 1e-9), &ScreenTransform::identity());
        assert!(moved.is_none());
        assert!(matches!(engine.drag_state(), DragState::PendingDrag { .. }));
    }

    #[test]
    fn threshold_move_starts_drag_without_placing() {
        let (plan, chain) = square();
        let mut engine = PlacementEngine::new();
        engine.pointer_down(&plan, door(), Point2::new(0.0, 0.0));
        let moved = engine.pointer_move(&plan, &chain, Point2::new(3.0, 4.0), &ScreenTransform::identity());
        assert!(moved.is_none());
        assert_eq!(engine.drag_state(), &DragState::Dragging { item_id: door() });

        let next = engine
            .pointer_move(&plan, &chain, Point2::new(5.0, 0.5), &ScreenTransform::identity())
            .expect("second move places the item");
        let item = next.item(&door()).unwrap();
        assert_eq!(item.wall_index, Some(0));
        assert!((item.position - 0.5).abs() < 1e-9);
        // 原值不变。
        assert!(!plan.item(&door()).unwrap().is_placed());
    }

    #[test]
    fn dragging_far_from_walls_unplaces() {
        let (plan, chain) = square();
        let placed = plan.with_item(plan.item(&door()).unwrap().placed_on(1, 0.3)).unwrap();
        let mut engine = PlacementEngine::new();
        engine.pointer_down(&placed, door(), Point2::new(0.0, 0.0));
        engine.pointer_move(&placed, &chain, Point2::new(10.0, 0.0), &ScreenTransform::identity());

        // 阈值 = 0.05 * 22 = 1.1，中心点距每面墙 5。
        let next = engine
            .pointer_move(&placed, &chain, Point2::new(5.0, 5.0), &ScreenTransform::identity())
            .unwrap();
        let item = next.item(&door()).unwrap();
        assert_eq!(item.wall_index, None);
        assert_eq!(item.position, 0.0);
    }

    #[test]
    fn drag_uses_the_screen_transform() {
        let (plan, chain) = square();
        let transform = ScreenTransform::fit_viewport(&chain.viewport(), 220.0, 220.0).unwrap();
        let mut engine = PlacementEngine::new();
        engine.pointer_down(&plan, door(), Point2::new(0.0, 0.0));
        engine.pointer_move(&plan, &chain, Point2::new(50.0, 50.0), &transform);
        // 局部 (2.5, 10) -> 屏幕 (85, 160)，位于第三面墙 t = 0.75 处。
        let next = engine
            .pointer_move(&plan, &chain, Point2::new(85.0, 160.0), &transform)
            .unwrap();
        let item = next.item(&door()).unwrap();
        assert_eq!(item.wall_index, Some(2));
        assert!((item.position - 0.75).abs() < 1e-9);
    }

    #[test]
    fn click_selects_and_drag_does_not() {
        let (plan, chain) = square();
        let mut engine = PlacementEngine::new();
        engine.pointer_down(&plan, door(), Point2::new(10.0, 10.0));
        let selection = engine.pointer_up(Point2::new(11.0, 10.0)).expect("click selects");
        assert_eq!(selection.item_id, door());
        assert_eq!(selection.anchor, Point2::new(11.0, 10.0));
        assert!(engine.drag_state().is_idle());

        // 新的按下清除选中。
        engine.pointer_down(&plan, door(), Point2::new(0.0, 0.0));
        assert!(engine.selection().is_none());
        engine.pointer_move(&plan, &chain, Point2::new(20.0, 0.0), &ScreenTransform::identity());
        assert!(engine.pointer_up(Point2::new(20.0, 0.0)).is_none());
        assert!(engine.selection().is_none());
    }

    #[test]
    fn pointer_leave_behaves_like_pointer_up() {
        let (plan, chain) = square();
        let mut engine = PlacementEngine::new();
        engine.pointer_down(&plan, door(), Point2::new(4.0, 4.0));
        let selection = engine.pointer_leave().unwrap();
        assert_eq!(selection.anchor, Point2::new(4.0, 4.0));

        engine.pointer_down(&plan, door(), Point2::new(0.0, 0.0));
        engine.pointer_move(&plan, &chain, Point2::new(9.0, 0.0), &ScreenTransform::identity());
        engine.pointer_leave();
        assert!(engine.drag_state().is_idle());
    }

    #[test]
    fn removed_item_makes_moves_noops() {
        let (plan, chain) = square();
        let mut engine = PlacementEngine::new();
        engine.pointer_down(&plan, door(), Point2::new(0.0, 0.0));
        engine.pointer_move(&plan, &chain, Point2::new(10.0, 0.0), &ScreenTransform::identity());

        let without_door = plan.with_openings(0, 1, 2.0, 3.0);
        let moved = engine.pointer_move(&without_door, &chain, Point2::new(5.0, 0.0), &ScreenTransform::identity());
        assert!(moved.is_none());
        assert!(engine.pointer_up(Point2::new(5.0, 0.0)).is_none());
        assert!(engine.drag_state().is_idle());

        assert!(!engine.pointer_down(&without_door, door(), Point2::new(0.0, 0.0)));
        assert!(engine.drag_state().is_idle());
    }

    #[test]
    fn drop_projects_onto_the_target_wall_only() {
        let (plan, chain) = square();
        let engine = PlacementEngine::new();
        let window = ItemId::new("window-0");
        // 该点离第一面墙最近，但目标是第二面墙。
        let next = engine
            .drop_on_wall(&plan, &chain, &window, 1, Point2::new(3.0, 4.0))
            .unwrap();
        let item = next.item(&window).unwrap();
        assert_eq!(item.wall_index, Some(1));
        assert!((item.position - 0.4).abs() < 1e-9);

        let clamped = engine
            .drop_on_wall(&plan, &chain, &window, 99, Point2::new(0.0, 5.0))
            .unwrap();
        assert_eq!(clamped.item(&window).unwrap().wall_index, Some(3));

        assert!(engine
            .drop_on_wall(&plan, &WallChain::empty(), &window, 0, Point2::new(0.0, 0.0))
            .is_none());
        assert!(engine
            .drop_on_wall(&plan, &chain, &ItemId::new("missing"), 0, Point2::new(0.0, 0.0))
            .is_none());
    }

    #[test]
    fn nudge_requires_a_selected_placed_item() {
        let (plan, _) = square();
        let placed = plan.with_item(plan.item(&door()).unwrap().placed_on(0, 0.5)).unwrap();
        let mut engine = PlacementEngine::new();
        assert!(engine.nudge_selected(&placed, &Key::ArrowRight).is_none());

        engine.pointer_down(&placed, door(), Point2::new(0.0, 0.0));
        engine.pointer_up(Point2::new(0.0, 0.0));
        let next = engine.nudge_selected(&placed, &Key::ArrowRight).unwrap();
        assert!((next.item(&door()).unwrap().position - 0.505).abs() < 1e-12);
        let back = engine.nudge_selected(&placed, &Key::ArrowLeft).unwrap();
        assert!((back.item(&door()).unwrap().position - 0.495).abs() < 1e-12);
        assert!(engine.nudge_selected(&placed, &Key::Other("a".into())).is_none());

        engine.pointer_down(&plan, door(), Point2::new(0.0, 0.0));
        engine.pointer_up(Point2::new(0.0, 0.0));
        assert!(engine.nudge_selected(&plan, &Key::ArrowRight).is_none());
    }

    #[test]
    fn width_editor_validates_input() {
        let (plan, _) = square();
        let mut engine = PlacementEngine::new();
        assert!(matches!(
            engine.set_selected_width(&plan, 2.5),
            Err(EngineError::NothingSelected)
        ));
        engine.pointer_down(&plan, door(), Point2::new(0.0, 0.0));
        engine.pointer_up(Point2::new(0.0, 0.0));
        assert!(matches!(
            engine.set_selected_width(&plan, -1.0),
            Err(EngineError::InvalidWidth(_))
        ));
        let next = engine.set_selected_width(&plan, 2.5).unwrap();
        assert_eq!(next.item(&door()).unwrap().width, 2.5);

        let orphan = Floorplan {
            items: vec![PlacedItem::unplaced("window-0", ItemKind::Window, 3.0)],
            ..plan.clone()
        };
        assert!(matches!(
            engine.set_selected_width(&orphan, 2.5),
            Err(EngineError::ItemNotFound(_))
        ));
    }
}
