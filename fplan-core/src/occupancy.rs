//! 把一面墙按构件位置切分为实墙段与洞口段，供渲染使用。
//!
//! 重叠的洞口不做合并或避让：按位置排序后逐个输出，后出现者绘制在上层。

use crate::floorplan::{Floorplan, ItemId, ItemKind, PlacedItem};
use crate::geometry::{Point2, Segment};

#[derive(Debug, Clone, PartialEq)]
pub enum SpanKind {
    Solid,
    Opening { item_id: ItemId, kind: ItemKind },
}

/// 墙上的一段，`start`/`end` 为沿墙的比例位置。
#[derive(Debug, Clone, PartialEq)]
pub struct WallSpan {
    pub kind: SpanKind,
    pub start: f64,
    pub end: f64,
}

impl WallSpan {
    #[inline]
    pub fn is_opening(&self) -> bool {
        matches!(self.kind, SpanKind::Opening { .. })
    }

    /// 以墙体长度单位表示的段长。
    #[inline]
    pub fn length_on(&self, wall_length: f64) -> f64 {
        (self.end - self.start) * wall_length
    }

    #[inline]
    pub fn endpoints(&self, segment: &Segment) -> (Point2, Point2) {
        (segment.point_at(self.start), segment.point_at(self.end))
    }
}

/// 构件在墙上占据的比例区间，两端钳制到 `[0, 1]`。
pub fn opening_window(item: &PlacedItem, wall_length: f64) -> (f64, f64) {
    let half_width = if wall_length > 0.0 {
        (item.width / 2.0) / wall_length
    } else {
        0.0
    };
    let position = item.clamped_position();
    (
        (position - half_width).clamp(0.0, 1.0),
        (position + half_width).clamp(0.0, 1.0),
    )
}

/// 按位置升序切分墙体，实墙段与洞口段交替出现。
pub fn segment_wall<'a, I>(items: I, wall_length: f64) -> Vec<WallSpan>
where
    I: IntoIterator<Item = &'a PlacedItem>,
{
    let mut sorted: Vec<&PlacedItem> = items.into_iter().collect();
    sorted.sort_by(|a, b| a.clamped_position().total_cmp(&b.clamped_position()));

    let mut spans = Vec::with_capacity(sorted.len() * 2 + 1);
    let mut cursor = 0.0_f64;
    for item in sorted {
        let (start, end) = opening_window(item, wall_length);
        if start > cursor {
            spans.push(WallSpan {
                kind: SpanKind::Solid,
                start: cursor,
                end: start,
            });
        }
        spans.push(WallSpan {
            kind: SpanKind::Opening {
                item_id: item.id.clone(),
                kind: item.kind,
            },
            start,
            end,
        });
        cursor = cursor.max(end);
    }
    if cursor < 1.0 {
        spans.push(WallSpan {
            kind: SpanKind::Solid,
            start: cursor,
            end: 1.0,
        });
    }
    spans
}

/// 对平面图中指定墙体切分；索引越界返回空列表。
pub fn segment_floorplan_wall(floorplan: &Floorplan, wall_index: usize) -> Vec<WallSpan> {
    match floorplan.walls.get(wall_index) {
        Some(wall) => segment_wall(floorplan.items_on_wall(wall_index), wall.length),
        None => Vec::new(),
    }
}
