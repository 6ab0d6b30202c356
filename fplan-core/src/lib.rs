pub mod chain;
pub mod nudge;
pub mod occupancy;
pub mod projection;

pub mod errors {
    use thiserror::Error;

    #[derive(Debug, Clone, PartialEq, Error)]
    pub enum GeometryError {
        #[error("wall {index} has invalid length {length}")]
        InvalidWallLength { index: usize, length: f64 },
        #[error("wall {index} has invalid angle {angle}")]
        InvalidWallAngle { index: usize, angle: f64 },
    }

    #[derive(Debug, Clone, PartialEq, Eq, Error)]
    #[error("unknown units `{0}`, expected `ft` or `m`")]
    pub struct ParseUnitsError(pub String);
}

pub mod geometry {
    use std::fmt;

    use glam::{DAffine2, DVec2};
    use serde::{Deserialize, Serialize};

    /// 二维点，内部以 `glam::DVec2` 表示。
    #[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
    pub struct Point2(pub DVec2);

    impl Point2 {
        #[inline]
        pub fn new(x: f64, y: f64) -> Self {
            Self(DVec2::new(x, y))
        }

        #[inline]
        pub fn from_vec(vec: DVec2) -> Self {
            Self(vec)
        }

        #[inline]
        pub fn x(self) -> f64 {
            self.0.x
        }

        #[inline]
        pub fn y(self) -> f64 {
            self.0.y
        }

        #[inline]
        pub fn translate(self, offset: Vector2) -> Self {
            Self(self.0 + offset.0)
        }

        #[inline]
        pub fn vector_to(self, other: Point2) -> Vector2 {
            Vector2(other.0 - self.0)
        }

        #[inline]
        pub fn distance_squared(self, other: Point2) -> f64 {
            self.0.distance_squared(other.0)
        }

        /// 线性插值，`t = 0` 返回自身，`t = 1` 返回 `other`。
        #[inline]
        pub fn lerp(self, other: Point2, t: f64) -> Self {
            Self(self.0.lerp(other.0, t))
        }

        #[inline]
        pub fn as_vec2(self) -> DVec2 {
            self.0
        }
    }

    impl From<DVec2> for Point2 {
        fn from(value: DVec2) -> Self {
            Self::from_vec(value)
        }
    }

    /// 二维向量。
    #[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
    pub struct Vector2(pub DVec2);

    impl Vector2 {
        #[inline]
        pub fn new(x: f64, y: f64) -> Self {
            Self(DVec2::new(x, y))
        }

        #[inline]
        pub fn from_points(start: Point2, end: Point2) -> Self {
            Self(end.0 - start.0)
        }

        #[inline]
        pub fn length_squared(self) -> f64 {
            self.0.length_squared()
        }

        #[inline]
        pub fn length(self) -> f64 {
            self.0.length()
        }

        #[inline]
        pub fn dot(self, other: Vector2) -> f64 {
            self.0.dot(other.0)
        }

        #[inline]
        pub fn as_vec2(self) -> DVec2 {
            self.0
        }

        #[inline]
        pub fn x(self) -> f64 {
            self.0.x
        }

        #[inline]
        pub fn y(self) -> f64 {
            self.0.y
        }
    }

    impl From<DVec2> for Vector2 {
        fn from(value: DVec2) -> Self {
            Self(value)
        }
    }

    /// 轴对齐边界框，用于计算墙链视口。
    #[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
    pub struct Bounds2D {
        min: Point2,
        max: Point2,
    }

    impl Bounds2D {
        #[inline]
        pub fn new(min: Point2, max: Point2) -> Self {
            Self { min, max }
        }

        #[inline]
        pub fn empty() -> Self {
            Self {
                min: Point2::new(f64::INFINITY, f64::INFINITY),
                max: Point2::new(f64::NEG_INFINITY, f64::NEG_INFINITY),
            }
        }

        #[inline]
        pub fn is_empty(&self) -> bool {
            self.min.x() > self.max.x() || self.min.y() > self.max.y()
        }

        #[inline]
        pub fn min(&self) -> Point2 {
            self.min
        }

        #[inline]
        pub fn max(&self) -> Point2 {
            self.max
        }

        #[inline]
        pub fn width(&self) -> f64 {
            self.max.x() - self.min.x()
        }

        #[inline]
        pub fn height(&self) -> f64 {
            self.max.y() - self.min.y()
        }

        pub fn include_point(&mut self, point: Point2) {
            if self.is_empty() {
                self.min = point;
                self.max = point;
                return;
            }
            let min_vec = self.min.as_vec2().min(point.as_vec2());
            let max_vec = self.max.as_vec2().max(point.as_vec2());
            self.min = Point2::from_vec(min_vec);
            self.max = Point2::from_vec(max_vec);
        }

        #[inline]
        pub fn center(&self) -> Point2 {
            debug_assert!(!self.is_empty());
            let center = (self.min.as_vec2() + self.max.as_vec2()) * 0.5;
            Point2::from_vec(center)
        }
    }

    /// 墙链的一条边，与源墙体一一对应。`length` 取自墙体规格而非几何长度。
    #[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
    pub struct Segment {
        pub p1: Point2,
        pub p2: Point2,
        pub length: f64,
    }

    impl Segment {
        #[inline]
        pub fn new(p1: Point2, p2: Point2, length: f64) -> Self {
            Self { p1, p2, length }
        }

        #[inline]
        pub fn direction(&self) -> Vector2 {
            Vector2::from_points(self.p1, self.p2)
        }

        /// 几何长度的平方，退化线段为 0。
        #[inline]
        pub fn length_squared(&self) -> f64 {
            self.direction().length_squared()
        }

        #[inline]
        pub fn is_degenerate(&self) -> bool {
            self.length_squared() == 0.0
        }

        #[inline]
        pub fn point_at(&self, t: f64) -> Point2 {
            self.p1.lerp(self.p2, t)
        }
    }

    /// 局部坐标系中的可视矩形，对应 SVG `viewBox`。
    #[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
    pub struct Viewport {
        pub x: f64,
        pub y: f64,
        pub width: f64,
        pub height: f64,
    }

    impl Viewport {
        /// 空墙链使用的默认视口。
        pub const DEFAULT: Viewport = Viewport {
            x: 0.0,
            y: 0.0,
            width: 100.0,
            height: 100.0,
        };

        #[inline]
        pub fn new(x: f64, y: f64, width: f64, height: f64) -> Self {
            Self {
                x,
                y,
                width,
                height,
            }
        }

        /// 以 `"x y width height"` 形式输出，供渲染表面直接使用。
        pub fn to_view_box(&self) -> String {
            self.to_string()
        }
    }

    impl Default for Viewport {
        fn default() -> Self {
            Self::DEFAULT
        }
    }

    impl fmt::Display for Viewport {
        fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
            write!(f, "{} {} {} {}", self.x, self.y, self.width, self.height)
        }
    }

    /// 屏幕坐标与局部坐标之间的仿射变换。
    ///
    /// 变换由渲染表面提供，所有基于指针的调用都显式接收它。
    #[derive(Debug, Clone, Copy, PartialEq)]
    pub struct ScreenTransform {
        local_to_screen: DAffine2,
        screen_to_local: DAffine2,
    }

    impl ScreenTransform {
        #[inline]
        pub fn identity() -> Self {
            Self {
                local_to_screen: DAffine2::IDENTITY,
                screen_to_local: DAffine2::IDENTITY,
            }
        }

        /// 由局部到屏幕的矩阵构造，矩阵不可逆时返回 `None`。
        pub fn from_local_to_screen(matrix: DAffine2) -> Option<Self> {
            let det = matrix.matrix2.determinant();
            if det == 0.0 || !det.is_finite() || !matrix.is_finite() {
                return None;
            }
            Some(Self {
                local_to_screen: matrix,
                screen_to_local: matrix.inverse(),
            })
        }

        /// 按 SVG `xMidYMid meet` 规则把视口放入给定像素尺寸的表面。
        pub fn fit_viewport(viewport: &Viewport, surface_width: f64, surface_height: f64) -> Option<Self> {
            let scale = (surface_width / viewport.width).min(surface_height / viewport.height);
            if !scale.is_finite() || scale <= 0.0 {
                return None;
            }
            let offset = DVec2::new(
                (surface_width - viewport.width * scale) * 0.5 - viewport.x * scale,
                (surface_height - viewport.height * scale) * 0.5 - viewport.y * scale,
            );
            Self::from_local_to_screen(DAffine2::from_scale_angle_translation(
                DVec2::splat(scale),
                0.0,
                offset,
            ))
        }

        #[inline]
        pub fn to_local(&self, screen: Point2) -> Point2 {
            Point2(self.screen_to_local.transform_point2(screen.0))
        }

        #[inline]
        pub fn to_screen(&self, local: Point2) -> Point2 {
            Point2(self.local_to_screen.transform_point2(local.0))
        }
    }

    impl Default for ScreenTransform {
        fn default() -> Self {
            Self::identity()
        }
    }

    #[cfg(test)]
    mod tests {
        use super::*;

        #[test]
        fn viewport_formats_as_view_box() {
            let viewport = Viewport::new(-6.0, -6.0, 22.0, 22.0);
            assert_eq!(viewport.to_view_box(), "-6 -6 22 22");
            assert_eq!(Viewport::default().to_view_box(), "0 0 100 100");
        }

        #[test]
        fn fit_viewport_centers_and_round_trips() {
            let viewport = Viewport::new(-6.0, -6.0, 22.0, 22.0);
            let transform = ScreenTransform::fit_viewport(&viewport, 440.0, 220.0)
                .expect("transform should be invertible");

            // 高度受限，缩放为 10，水平方向居中留白 110 像素。
            let corner = transform.to_screen(Point2::new(-6.0, -6.0));
            assert!((corner.x() - 110.0).abs() < 1e-9);
            assert!(corner.y().abs() < 1e-9);

            let local = transform.to_local(Point2::new(220.0, 110.0));
            assert!((local.x() - 5.0).abs() < 1e-9);
            assert!((local.y() - 5.0).abs() < 1e-9);
        }

        #[test]
        fn singular_transforms_are_rejected() {
            assert!(ScreenTransform::from_local_to_screen(DAffine2::ZERO).is_none());
            assert!(ScreenTransform::fit_viewport(&Viewport::new(0.0, 0.0, 0.0, 0.0), 100.0, 100.0).is_none());
        }

        #[test]
        fn bounds_track_extent() {
            let mut bounds = Bounds2D::empty();
            assert!(bounds.is_empty());
            bounds.include_point(Point2::new(1.0, 2.0));
            bounds.include_point(Point2::new(-3.0, 5.0));
            assert!((bounds.width() - 4.0).abs() < f64::EPSILON);
            assert!((bounds.height() - 3.0).abs() < f64::EPSILON);
            assert!((bounds.center().x() + 1.0).abs() < f64::EPSILON);
        }
    }
}

pub mod floorplan {
    use std::fmt;
    use std::str::FromStr;

    use serde::{Deserialize, Serialize};

    use crate::errors::ParseUnitsError;

    pub const DEFAULT_WALL_LENGTH: f64 = 10.0;
    pub const DEFAULT_WALL_ANGLE: f64 = 90.0;
    pub const MIN_WALLS: usize = 3;
    pub const MAX_WALLS: usize = 10;

    /// 墙体规格：长度与墙体末端的室内夹角（度）。
    #[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
    pub struct Wall {
        pub length: f64,
        pub angle: f64,
    }

    impl Wall {
        #[inline]
        pub fn new(length: f64, angle: f64) -> Self {
            Self { length, angle }
        }
    }

    impl Default for Wall {
        fn default() -> Self {
            Self::new(DEFAULT_WALL_LENGTH, DEFAULT_WALL_ANGLE)
        }
    }

    #[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
    pub enum Units {
        #[default]
        #[serde(rename = "ft")]
        Feet,
        #[serde(rename = "m")]
        Meters,
    }

    impl Units {
        pub fn as_str(self) -> &'static str {
            match self {
                Units::Feet => "ft",
                Units::Meters => "m",
            }
        }
    }

    impl fmt::Display for Units {
        fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
            f.write_str(self.as_str())
        }
    }

    impl FromStr for Units {
        type Err = ParseUnitsError;

        fn from_str(s: &str) -> Result<Self, Self::Err> {
            match s.trim() {
                "ft" => Ok(Units::Feet),
                "m" => Ok(Units::Meters),
                other => Err(ParseUnitsError(other.to_string())),
            }
        }
    }

    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
    #[serde(rename_all = "lowercase")]
    pub enum ItemKind {
        Door,
        Window,
    }

    impl ItemKind {
        pub fn as_str(self) -> &'static str {
            match self {
                ItemKind::Door => "door",
                ItemKind::Window => "window",
            }
        }
    }

    impl fmt::Display for ItemKind {
        fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
            f.write_str(self.as_str())
        }
    }

    #[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
    #[serde(transparent)]
    pub struct ItemId(String);

    impl ItemId {
        #[inline]
        pub fn new(raw: impl Into<String>) -> Self {
            Self(raw.into())
        }

        #[inline]
        pub fn as_str(&self) -> &str {
            &self.0
        }
    }

    impl fmt::Display for ItemId {
        fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
            f.write_str(&self.0)
        }
    }

    impl From<&str> for ItemId {
        fn from(value: &str) -> Self {
            Self::new(value)
        }
    }

    /// 门窗等可放置构件。`wall_index = None` 表示未放置（位于面板中），
    /// 序列化时写作 `-1`。
    #[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
    #[serde(rename_all = "camelCase")]
    pub struct PlacedItem {
        pub id: ItemId,
        #[serde(rename = "type")]
        pub kind: ItemKind,
        #[serde(with = "wall_index")]
        pub wall_index: Option<usize>,
        pub position: f64,
        pub width: f64,
    }

    impl PlacedItem {
        pub fn unplaced(id: impl Into<ItemId>, kind: ItemKind, width: f64) -> Self {
            Self {
                id: id.into(),
                kind,
                wall_index: None,
                position: 0.0,
                width,
            }
        }

        #[inline]
        pub fn is_placed(&self) -> bool {
            self.wall_index.is_some()
        }

        /// 读取时把外部传入的越界比例钳制到 `[0, 1]`。
        #[inline]
        pub fn clamped_position(&self) -> f64 {
            if self.position.is_nan() {
                0.0
            } else {
                self.position.clamp(0.0, 1.0)
            }
        }

        /// 返回在 `wall_count` 面墙的墙链上有效的墙索引，越界视作未放置。
        #[inline]
        pub fn wall_in(&self, wall_count: usize) -> Option<usize> {
            self.wall_index.filter(|&index| index < wall_count)
        }

        pub fn placed_on(&self, wall_index: usize, position: f64) -> Self {
            Self {
                wall_index: Some(wall_index),
                position: position.clamp(0.0, 1.0),
                ..self.clone()
            }
        }

        pub fn detached(&self) -> Self {
            Self {
                wall_index: None,
                position: 0.0,
                ..self.clone()
            }
        }

        pub fn with_position(&self, position: f64) -> Self {
            Self {
                position: position.clamp(0.0, 1.0),
                ..self.clone()
            }
        }

        pub fn with_width(&self, width: f64) -> Self {
            Self {
                width,
                ..self.clone()
            }
        }
    }

    mod wall_index {
        use serde::{Deserialize, Deserializer, Serializer};

        pub fn serialize<S: Serializer>(value: &Option<usize>, serializer: S) -> Result<S::Ok, S::Error> {
            match value {
                Some(index) => serializer.serialize_i64(*index as i64),
                None => serializer.serialize_i64(-1),
            }
        }

        pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Option<usize>, D::Error> {
            let raw = i64::deserialize(deserializer)?;
            Ok(usize::try_from(raw).ok())
        }
    }

    /// 墙数量编辑时使用的默认值与上下限。
    #[derive(Debug, Clone, Copy, PartialEq)]
    pub struct WallDefaults {
        pub fill: Wall,
        pub min_walls: usize,
        pub max_walls: usize,
    }

    impl Default for WallDefaults {
        fn default() -> Self {
            Self {
                fill: Wall::default(),
                min_walls: MIN_WALLS,
                max_walls: MAX_WALLS,
            }
        }
    }

    /// 平面图值：墙体序列与构件列表。所有修改都返回新值，原值保持不变。
    #[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
    #[serde(rename_all = "camelCase")]
    pub struct Floorplan {
        #[serde(default)]
        pub units: Units,
        #[serde(default)]
        pub walls: Vec<Wall>,
        #[serde(default)]
        pub items: Vec<PlacedItem>,
    }

    impl Floorplan {
        pub fn new(units: Units, walls: Vec<Wall>) -> Self {
            Self {
                units,
                walls,
                items: Vec::new(),
            }
        }

        /// 详细模式的初始布局：四面 12 单位、90° 的墙。
        pub fn detailed_default() -> Self {
            Self::new(Units::Feet, vec![Wall::new(12.0, 90.0); 4])
        }

        /// 简单矩形模式：`[length, width, length, width]`，全部 90°。
        pub fn rectangle(length: f64, width: f64, units: Units) -> Self {
            let walls = [length, width, length, width]
                .into_iter()
                .map(|len| Wall::new(len, 90.0))
                .collect();
            Self::new(units, walls)
        }

        pub fn item(&self, id: &ItemId) -> Option<&PlacedItem> {
            self.items.iter().find(|item| &item.id == id)
        }

        /// 按 id 替换单个构件，其余构件保持不变；id 不存在时返回 `None`。
        pub fn with_item(&self, replacement: PlacedItem) -> Option<Self> {
            let index = self.items.iter().position(|item| item.id == replacement.id)?;
            let mut next = self.clone();
            next.items[index] = replacement;
            Some(next)
        }

        /// 整体替换墙体，指向已不存在墙体的构件变为未放置。
        pub fn with_walls(&self, walls: Vec<Wall>) -> Self {
            let wall_count = walls.len();
            let items = self
                .items
                .iter()
                .map(|item| match item.wall_index {
                    Some(index) if index >= wall_count => item.detached(),
                    _ => item.clone(),
                })
                .collect();
            Self {
                units: self.units,
                walls,
                items,
            }
        }

        /// 调整墙数量，保留已有墙体并以默认墙补齐。
        pub fn with_wall_count(&self, count: usize, defaults: &WallDefaults) -> Self {
            let count = count.clamp(defaults.min_walls, defaults.max_walls.max(defaults.min_walls));
            let walls = (0..count)
                .map(|index| self.walls.get(index).copied().unwrap_or(defaults.fill))
                .collect();
            self.with_walls(walls)
        }

        pub fn with_wall(&self, index: usize, wall: Wall) -> Option<Self> {
            if index >= self.walls.len() {
                return None;
            }
            let mut walls = self.walls.clone();
            walls[index] = wall;
            Some(self.with_walls(walls))
        }

        pub fn with_units(&self, units: Units) -> Self {
            Self {
                units,
                ..self.clone()
            }
        }

        /// 根据门窗数量批量生成构件。同 id 的已有构件保留其放置信息。
        pub fn with_openings(&self, doors: usize, windows: usize, door_width: f64, window_width: f64) -> Self {
            let requested = (0..doors)
                .map(|n| (format!("door-{n}"), ItemKind::Door, door_width))
                .chain((0..windows).map(|n| (format!("window-{n}"), ItemKind::Window, window_width)));
            let items = requested
                .map(|(id, kind, width)| {
                    let id = ItemId::new(id);
                    match self.item(&id) {
                        Some(existing) if existing.kind == kind => existing.clone(),
                        _ => PlacedItem::unplaced(id, kind, width),
                    }
                })
                .collect();
            Self {
                units: self.units,
                walls: self.walls.clone(),
                items,
            }
        }

        pub fn items_on_wall(&self, wall_index: usize) -> impl Iterator<Item = &PlacedItem> {
            let wall_count = self.walls.len();
            self.items
                .iter()
                .filter(move |item| item.wall_in(wall_count) == Some(wall_index))
        }

        pub fn unplaced_items(&self) -> impl Iterator<Item = &PlacedItem> {
            let wall_count = self.walls.len();
            self.items
                .iter()
                .filter(move |item| item.wall_in(wall_count).is_none())
        }

        pub fn count_of(&self, kind: ItemKind) -> usize {
            self.items.iter().filter(|item| item.kind == kind).count()
        }

        /// 人类可读的墙体描述，例如 `Wall 1 is 12ft long, followed by a 90-degree interior corner`。
        pub fn describe(&self) -> String {
            self.walls
                .iter()
                .enumerate()
                .map(|(index, wall)| {
                    format!(
                        "Wall {} is {}{} long, followed by a {}-degree interior corner",
                        index + 1,
                        wall.length,
                        self.units,
                        wall.angle
                    )
                })
                .collect::<Vec<_>>()
                .join("; ")
        }
    }

}
