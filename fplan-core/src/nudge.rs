use crate::floorplan::PlacedItem;

/// 每次按键移动的比例步长。
pub const NUDGE_STEP: f64 = 0.005;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NudgeDirection {
    Backward,
    Forward,
}

impl NudgeDirection {
    #[inline]
    pub fn sign(self) -> f64 {
        match self {
            NudgeDirection::Backward => -1.0,
            NudgeDirection::Forward => 1.0,
        }
    }
}

/// 以默认步长微调构件位置，结果钳制到 `[0, 1]`。
#[inline]
pub fn nudge(item: &PlacedItem, direction: NudgeDirection) -> f64 {
    nudge_by(item, direction, NUDGE_STEP)
}

pub fn nudge_by(item: &PlacedItem, direction: NudgeDirection, step: f64) -> f64 {
    (item.clamped_position() + direction.sign() * step).clamp(0.0, 1.0)
}
