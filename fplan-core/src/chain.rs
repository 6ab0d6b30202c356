//! 由墙体规格推导墙链折线与适配视口。

use serde::Serialize;

use crate::errors::GeometryError;
use crate::floorplan::Wall;
use crate::geometry::{Bounds2D, Point2, Segment, Viewport};

const PADDING_RATIO: f64 = 0.1;
const PADDING_MIN: f64 = 5.0;

/// 墙链：每面墙对应一条线段（同索引），以及包含全部顶点的视口。
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct WallChain {
    segments: Vec<Segment>,
    viewport: Viewport,
}

impl WallChain {
    #[inline]
    pub fn empty() -> Self {
        Self {
            segments: Vec::new(),
            viewport: Viewport::DEFAULT,
        }
    }

    /// 从原点、朝向 0 出发依次行走每面墙，墙末端按外角 `180° - angle` 转向。
    ///
    /// 负长度或非有限值属于调用方违约，立即返回错误；零长度墙产生退化线段。
    pub fn build(walls: &[Wall]) -> Result<Self, GeometryError> {
        for (index, wall) in walls.iter().enumerate() {
            if !wall.length.is_finite() || wall.length < 0.0 {
                return Err(GeometryError::InvalidWallLength {
                    index,
                    length: wall.length,
                });
            }
            if !wall.angle.is_finite() {
                return Err(GeometryError::InvalidWallAngle {
                    index,
                    angle: wall.angle,
                });
            }
        }

        if walls.is_empty() {
            return Ok(Self::empty());
        }

        let mut segments = Vec::with_capacity(walls.len());
        let mut bounds = Bounds2D::empty();
        let mut current = Point2::new(0.0, 0.0);
        let mut heading = 0.0_f64;
        bounds.include_point(current);

        for wall in walls {
            let next = Point2::new(
                current.x() + wall.length * heading.cos(),
                current.y() + wall.length * heading.sin(),
            );
            segments.push(Segment::new(current, next, wall.length));
            bounds.include_point(next);
            current = next;
            heading += (180.0 - wall.angle).to_radians();
        }

        let padding = bounds.width().max(bounds.height()) * PADDING_RATIO + PADDING_MIN;
        let viewport = Viewport::new(
            bounds.min().x() - padding,
            bounds.min().y() - padding,
            bounds.width() + 2.0 * padding,
            bounds.height() + 2.0 * padding,
        );

        Ok(Self { segments, viewport })
    }

    #[inline]
    pub fn segments(&self) -> &[Segment] {
        &self.segments
    }

    #[inline]
    pub fn segment(&self, index: usize) -> Option<&Segment> {
        self.segments.get(index)
    }

    #[inline]
    pub fn viewport(&self) -> Viewport {
        self.viewport
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.segments.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.segments.is_empty()
    }

    /// 折线顶点序列，长度为 `len() + 1`（空墙链为空）。
    pub fn vertices(&self) -> Vec<Point2> {
        let mut vertices: Vec<Point2> = self.segments.iter().map(|segment| segment.p1).collect();
        if let Some(last) = self.segments.last() {
            vertices.push(last.p2);
        }
        vertices
    }

    /// 末端顶点回到起点（容差内）时视为闭合。
    pub fn is_closed(&self, tolerance: f64) -> bool {
        match (self.segments.first(), self.segments.last()) {
            (Some(first), Some(last)) => {
                first.p1.distance_squared(last.p2) <= tolerance * tolerance
            }
            _ => false,
        }
    }
}

impl Default for WallChain {
    fn default() -> Self {
        Self::empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn square(side: f64) -> Vec<Wall> {
        vec![Wall::new(side, 90.0); 4]
    }

    #[test]
    fn four_right_angle_walls_close_a_square() {
        let chain = WallChain::build(&square(10.0)).expect("valid walls");
        assert_eq!(chain.len(), 4);
        assert!(chain.is_closed(1e-9));

        let corner = chain.segments()[1].p2;
        assert!((corner.x() - 10.0).abs() < 1e-9);
        assert!((corner.y() - 10.0).abs() < 1e-9);

        let viewport = chain.viewport();
        assert!((viewport.x + 6.0).abs() < 1e-9);
        assert!((viewport.y + 6.0).abs() < 1e-9);
        assert!((viewport.width - 22.0).abs() < 1e-9);
        assert!((viewport.height - 22.0).abs() < 1e-9);
    }

    #[test]
    fn segment_lengths_match_wall_lengths() {
        let walls = vec![
            Wall::new(7.0, 120.0),
            Wall::new(3.5, 60.0),
            Wall::new(12.25, 200.0),
            Wall::new(4.0, 90.0),
            Wall::new(9.0, 45.0),
        ];
        let chain = WallChain::build(&walls).unwrap();
        assert_eq!(chain.len(), walls.len());
        for (segment, wall) in chain.segments().iter().zip(&walls) {
            assert!((segment.length_squared().sqrt() - wall.length).abs() < 1e-9);
            assert_eq!(segment.length, wall.length);
        }
        assert_eq!(chain.vertices().len(), walls.len() + 1);
    }

    #[test]
    fn empty_walls_yield_default_viewport() {
        let chain = WallChain::build(&[]).unwrap();
        assert!(chain.is_empty());
        assert_eq!(chain.viewport(), Viewport::DEFAULT);
        assert!(chain.vertices().is_empty());
        assert!(!chain.is_closed(1.0));
    }

    #[test]
    fn zero_length_wall_is_degenerate_not_an_error() {
        let walls = vec![Wall::new(10.0, 90.0), Wall::new(0.0, 90.0), Wall::new(10.0, 90.0)];
        let chain = WallChain::build(&walls).unwrap();
        assert!(chain.segments()[1].is_degenerate());
        assert_eq!(chain.segments()[1].p1, chain.segments()[1].p2);
    }

    #[test]
    fn negative_length_fails_fast() {
        let walls = vec![Wall::new(10.0, 90.0), Wall::new(-1.0, 90.0)];
        let err = WallChain::build(&walls).unwrap_err();
        assert_eq!(err, GeometryError::InvalidWallLength { index: 1, length: -1.0 });

        let walls = vec![Wall::new(10.0, f64::NAN)];
        assert!(matches!(
            WallChain::build(&walls),
            Err(GeometryError::InvalidWallAngle { index: 0, .. })
        ));
    }

    #[test]
    fn build_is_deterministic() {
        let walls = vec![Wall::new(8.0, 110.0), Wall::new(5.0, 70.0), Wall::new(6.0, 95.0)];
        let first = WallChain::build(&walls).unwrap();
        let second = WallChain::build(&walls).unwrap();
        assert_eq!(first, second);
    }

    #[test]
    fn single_wall_pads_its_bounding_box() {
        let chain = WallChain::build(&[Wall::new(20.0, 90.0)]).unwrap();
        // 宽 20、高 0：padding = 20 * 0.1 + 5 = 7。
        let viewport = chain.viewport();
        assert!((viewport.x + 7.0).abs() < 1e-9);
        assert!((viewport.width - 34.0).abs() < 1e-9);
        assert!((viewport.height - 14.0).abs() < 1e-9);
    }
}
