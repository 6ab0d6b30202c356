//! 点到墙链的最近点投影。

use crate::geometry::{Point2, Segment};

/// 投影结果：最近线段索引、参数位置 `t ∈ [0, 1]` 以及距离平方。
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Projection {
    pub segment_index: usize,
    pub t: f64,
    pub distance_squared: f64,
}

/// 把点投影到单条线段上，返回 `(t, distance_squared)`。
///
/// 退化线段（两端点重合）返回 `t = 0` 与到 `p1` 的距离平方。
pub fn project_onto_segment(point: Point2, segment: &Segment) -> (f64, f64) {
    let length_squared = segment.length_squared();
    if length_squared == 0.0 {
        return (0.0, point.distance_squared(segment.p1));
    }
    let t = (segment.p1.vector_to(point).dot(segment.direction()) / length_squared).clamp(0.0, 1.0);
    let closest = segment.point_at(t);
    (t, point.distance_squared(closest))
}

/// 在线段序列中寻找离 `point` 最近的线段。
///
/// 按索引顺序比较，仅在严格更近时替换，因此距离相同时索引较小者胜出。
/// 退化线段不参与竞争；只有全部线段都退化时才退回到比较 `p1` 距离。
pub fn project(point: Point2, segments: &[Segment]) -> Option<Projection> {
    let mut best: Option<Projection> = None;
    for (segment_index, segment) in segments.iter().enumerate() {
        if segment.is_degenerate() {
            continue;
        }
        let (t, distance_squared) = project_onto_segment(point, segment);
        if best.is_none_or(|current| distance_squared < current.distance_squared) {
            best = Some(Projection {
                segment_index,
                t,
                distance_squared,
            });
        }
    }

    if best.is_some() {
        return best;
    }

    for (segment_index, segment) in segments.iter().enumerate() {
        let distance_squared = point.distance_squared(segment.p1);
        if best.is_none_or(|current| distance_squared < current.distance_squared) {
            best = Some(Projection {
                segment_index,
                t: 0.0,
                distance_squared,
            });
        }
    }
    best
}
