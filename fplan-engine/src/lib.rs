pub mod command;
pub mod input;
pub mod placement;

pub mod errors {
    use fplan_core::errors::GeometryError;
    use thiserror::Error;

    #[derive(Debug, Error)]
    pub enum EngineError {
        #[error("item with id {0} not found")]
        ItemNotFound(String),
        #[error("wall {0} does not exist")]
        WallNotFound(usize),
        #[error("no item is selected")]
        NothingSelected,
        #[error("item width must be a positive number, got {0}")]
        InvalidWidth(f64),
        #[error(transparent)]
        Geometry(#[from] GeometryError),
    }
}

pub mod scene {
    use std::collections::VecDeque;

    use fplan_core::chain::WallChain;
    use fplan_core::floorplan::{Floorplan, ItemId, Wall, WallDefaults};
    use fplan_core::geometry::{ScreenTransform, Viewport};
    use tracing::{debug, info};

    use crate::errors::EngineError;
    use crate::input::{InputEvent, InputPort, Key};
    use crate::placement::{DragState, InteractionSettings, PlacementEngine, Selection};

    const HISTORY_LIMIT: usize = 100;

    /// 引擎层负责维护平面图值、缓存的墙链以及交互状态（拖拽、选中、撤销历史）。
    ///
    /// 墙链只在墙体规格变化时重建，指针移动只做投影。
    #[derive(Debug)]
    pub struct Scene {
        floorplan: Floorplan,
        chain: WallChain,
        chain_walls: Vec<Wall>,
        engine: PlacementEngine,
        undo: VecDeque<Floorplan>,
        redo: Vec<Floorplan>,
        gesture_origin: Option<Floorplan>,
    }

    impl Scene {
        pub fn new() -> Self {
            Self::with_settings(InteractionSettings::default())
        }

        pub fn with_settings(settings: InteractionSettings) -> Self {
            Self {
                floorplan: Floorplan::default(),
                chain: WallChain::empty(),
                chain_walls: Vec::new(),
                engine: PlacementEngine::with_settings(settings),
                undo: VecDeque::new(),
                redo: Vec::new(),
                gesture_origin: None,
            }
        }

        /// 使用现有平面图初始化场景。
        pub fn with_floorplan(floorplan: Floorplan) -> Result<Self, EngineError> {
            let mut scene = Self::new();
            scene.load_floorplan(floorplan)?;
            Ok(scene)
        }

        /// 替换当前平面图并重置交互状态与历史。墙体非法时保持原状态。
        pub fn load_floorplan(&mut self, floorplan: Floorplan) -> Result<(), EngineError> {
            self.refresh_chain(&floorplan.walls)?;
            info!(
                walls = floorplan.walls.len(),
                items = floorplan.items.len(),
                "载入平面图"
            );
            self.floorplan = floorplan;
            self.engine.reset();
            self.undo.clear();
            self.redo.clear();
            self.gesture_origin = None;
            Ok(())
        }

        #[inline]
        pub fn floorplan(&self) -> &Floorplan {
            &self.floorplan
        }

        #[inline]
        pub fn chain(&self) -> &WallChain {
            &self.chain
        }

        #[inline]
        pub fn viewport(&self) -> Viewport {
            self.chain.viewport()
        }

        #[inline]
        pub fn engine(&self) -> &PlacementEngine {
            &self.engine
        }

        #[inline]
        pub fn drag_state(&self) -> &DragState {
            self.engine.drag_state()
        }

        #[inline]
        pub fn selection(&self) -> Option<&Selection> {
            self.engine.selection()
        }

        #[inline]
        pub fn clear_selection(&mut self) {
            self.engine.clear_selection();
        }

        #[inline]
        pub fn can_undo(&self) -> bool {
            !self.undo.is_empty()
        }

        #[inline]
        pub fn can_redo(&self) -> bool {
            !self.redo.is_empty()
        }

        pub fn set_walls(&mut self, walls: Vec<Wall>) -> Result<(), EngineError> {
            let next = self.floorplan.with_walls(walls);
            self.commit(next)
        }

        pub fn set_wall(&mut self, index: usize, wall: Wall) -> Result<(), EngineError> {
            let next = self
                .floorplan
                .with_wall(index, wall)
                .ok_or(EngineError::WallNotFound(index))?;
            self.commit(next)
        }

        pub fn set_wall_count(&mut self, count: usize, defaults: &WallDefaults) -> Result<(), EngineError> {
            let next = self.floorplan.with_wall_count(count, defaults);
            self.commit(next)
        }

        pub fn set_openings(
            &mut self,
            doors: usize,
            windows: usize,
            door_width: f64,
            window_width: f64,
        ) -> Result<(), EngineError> {
            let next = self
                .floorplan
                .with_openings(doors, windows, door_width, window_width);
            self.commit(next)
        }

        /// 把构件放回面板。
        pub fn unplace(&mut self, id: &ItemId) -> Result<(), EngineError> {
            let item = self
                .floorplan
                .item(id)
                .ok_or_else(|| EngineError::ItemNotFound(id.to_string()))?;
            if !item.is_placed() {
                return Ok(());
            }
            let next = self
                .floorplan
                .with_item(item.detached())
                .ok_or_else(|| EngineError::ItemNotFound(id.to_string()))?;
            self.commit(next)
        }

        pub fn set_selected_width(&mut self, width: f64) -> Result<(), EngineError> {
            let next = self.engine.set_selected_width(&self.floorplan, width)?;
            self.commit(next)
        }

        /// 方向键微调选中构件，返回平面图是否变化。
        pub fn nudge_selected(&mut self, key: &Key) -> Result<bool, EngineError> {
            match self.engine.nudge_selected(&self.floorplan, key) {
                Some(next) => {
                    self.commit(next)?;
                    Ok(true)
                }
                None => Ok(false),
            }
        }

        /// 处理单个输入事件，返回平面图是否变化。
        pub fn handle_event(
            &mut self,
            event: InputEvent,
            transform: &ScreenTransform,
        ) -> Result<bool, EngineError> {
            match event {
                InputEvent::PointerDown { item_id, screen } => {
                    if self.engine.pointer_down(&self.floorplan, item_id, screen) {
                        self.gesture_origin = Some(self.floorplan.clone());
                    }
                    Ok(false)
                }
                InputEvent::PointerMove { screen } => {
                    let next = self
                        .engine
                        .pointer_move(&self.floorplan, &self.chain, screen, transform);
                    Ok(match next {
                        Some(next) => {
                            self.floorplan = next;
                            true
                        }
                        None => false,
                    })
                }
                InputEvent::PointerUp { screen } => {
                    self.engine.pointer_up(screen);
                    self.finish_gesture();
                    Ok(false)
                }
                InputEvent::PointerLeave => {
                    self.engine.pointer_leave();
                    self.finish_gesture();
                    Ok(false)
                }
                InputEvent::KeyDown(key) => self.nudge_selected(&key),
                InputEvent::Drop {
                    item_id,
                    wall_index,
                    screen,
                } => {
                    let local = transform.to_local(screen);
                    match self.engine.drop_on_wall(
                        &self.floorplan,
                        &self.chain,
                        &item_id,
                        wall_index,
                        local,
                    ) {
                        Some(next) => {
                            self.commit(next)?;
                            Ok(true)
                        }
                        None => Ok(false),
                    }
                }
            }
        }

        /// 从输入端口拉取全部事件并依次处理，返回引起变化的事件数。
        pub fn drive<P: InputPort>(
            &mut self,
            port: &mut P,
            transform: &ScreenTransform,
        ) -> Result<usize, EngineError> {
            let mut changes = 0;
            while let Some(event) = port.next_event() {
                if self.handle_event(event, transform)? {
                    changes += 1;
                }
            }
            Ok(changes)
        }

        /// 撤销。手势进行中时先把手势已产生的变化记为一步，再回退。
        pub fn undo(&mut self) -> Result<bool, EngineError> {
            self.checkpoint_gesture();
            let Some(previous) = self.undo.pop_back() else {
                return Ok(false);
            };
            if let Err(err) = self.refresh_chain(&previous.walls) {
                self.undo.push_back(previous);
                return Err(err);
            }
            let current = std::mem::replace(&mut self.floorplan, previous);
            self.redo.push(current);
            self.rebase_gesture();
            debug!(remaining = self.undo.len(), "撤销");
            Ok(true)
        }

        pub fn redo(&mut self) -> Result<bool, EngineError> {
            self.checkpoint_gesture();
            let Some(next) = self.redo.pop() else {
                return Ok(false);
            };
            if let Err(err) = self.refresh_chain(&next.walls) {
                self.redo.push(next);
                return Err(err);
            }
            let current = std::mem::replace(&mut self.floorplan, next);
            self.push_undo(current);
            self.rebase_gesture();
            debug!(remaining = self.redo.len(), "重做");
            Ok(true)
        }

        /// 手势中途的变化先落入历史，手势基准随之前移。
        fn checkpoint_gesture(&mut self) {
            let Some(origin) = self.gesture_origin.as_mut() else {
                return;
            };
            if *origin == self.floorplan {
                return;
            }
            let previous = std::mem::replace(origin, self.floorplan.clone());
            self.push_undo(previous);
            self.redo.clear();
        }

        fn rebase_gesture(&mut self) {
            if self.gesture_origin.is_some() {
                self.gesture_origin = Some(self.floorplan.clone());
            }
        }

        fn finish_gesture(&mut self) {
            if let Some(origin) = self.gesture_origin.take() {
                if origin != self.floorplan {
                    self.push_undo(origin);
                    self.redo.clear();
                }
            }
        }

        fn commit(&mut self, next: Floorplan) -> Result<(), EngineError> {
            self.refresh_chain(&next.walls)?;
            let previous = std::mem::replace(&mut self.floorplan, next);
            self.push_undo(previous);
            self.redo.clear();
            // 手势进行中发生外部编辑时，以编辑后的值作为手势基准。
            self.rebase_gesture();
            Ok(())
        }

        fn push_undo(&mut self, floorplan: Floorplan) {
            if self.undo.len() == HISTORY_LIMIT {
                self.undo.pop_front();
            }
            self.undo.push_back(floorplan);
        }

        fn refresh_chain(&mut self, walls: &[Wall]) -> Result<(), EngineError> {
            if self.chain_walls.as_slice() == walls {
                return Ok(());
            }
            self.chain = WallChain::build(walls)?;
            self.chain_walls = walls.to_vec();
            debug!(segments = self.chain.len(), viewport = %self.chain.viewport(), "重建墙链");
            Ok(())
        }
    }

    impl Default for Scene {
        fn default() -> Self {
            Self::new()
        }
    }

}
