//! 渲染数据：墙链切分结果与 SVG 输出。

use std::fmt::Write;

use fplan_core::floorplan::{ItemId, ItemKind};
use fplan_core::geometry::Point2;
use fplan_core::occupancy::{SpanKind, segment_floorplan_wall};
use fplan_engine::scene::Scene;

/// 单面墙上可直接绘制的一段。
#[derive(Debug, Clone, PartialEq)]
pub struct SpanLine {
    pub from: Point2,
    pub to: Point2,
    pub opening: Option<(ItemId, ItemKind)>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct RenderData {
    pub view_box: String,
    pub walls: Vec<Vec<SpanLine>>,
    pub palette: Vec<ItemId>,
    pub selected: Option<ItemId>,
}

impl RenderData {
    pub fn from_scene(scene: &Scene) -> Self {
        let floorplan = scene.floorplan();
        let walls = scene
            .chain()
            .segments()
            .iter()
            .enumerate()
            .map(|(index, segment)| {
                segment_floorplan_wall(floorplan, index)
                    .into_iter()
                    .map(|span| {
                        let (from, to) = span.endpoints(segment);
                        let opening = match span.kind {
                            SpanKind::Solid => None,
                            SpanKind::Opening { item_id, kind } => Some((item_id, kind)),
                        };
                        SpanLine { from, to, opening }
                    })
                    .collect()
            })
            .collect();

        Self {
            view_box: scene.viewport().to_view_box(),
            walls,
            palette: floorplan.unplaced_items().map(|item| item.id.clone()).collect(),
            selected: scene.selection().map(|selection| selection.item_id.clone()),
        }
    }

    pub fn opening_count(&self) -> usize {
        self.walls
            .iter()
            .flatten()
            .filter(|line| line.opening.is_some())
            .count()
    }
}

/// 生成独立 SVG 文档。洞口按位置顺序绘制，重叠时后者覆盖前者。
pub fn render_svg(data: &RenderData) -> String {
    let mut svg = String::new();
    let _ = writeln!(
        svg,
        r#"<svg xmlns="http://www.w3.org/2000/svg" viewBox="{}">"#,
        data.view_box
    );
    for (index, lines) in data.walls.iter().enumerate() {
        let _ = writeln!(svg, r#"  <g class="wall" data-wall="{index}">"#);
        for line in lines {
            let (class, id_attr) = match &line.opening {
                None => ("solid".to_string(), String::new()),
                Some((id, kind)) => {
                    let mut class = kind.as_str().to_string();
                    if data.selected.as_ref() == Some(id) {
                        class.push_str(" selected");
                    }
                    (class, format!(r#" data-item="{}""#, escape_xml(id.as_str())))
                }
            };
            let _ = writeln!(
                svg,
                r#"    <line class="{class}"{id_attr} x1="{:.3}" y1="{:.3}" x2="{:.3}" y2="{:.3}"/>"#,
                line.from.x(),
                line.from.y(),
                line.to.x(),
                line.to.y()
            );
        }
        svg.push_str("  </g>\n");
    }
    svg.push_str("</svg>\n");
    svg
}

fn escape_xml(s: &str) -> String {
    s.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
        .replace('\'', "&apos;")
}
