use fplan_core::floorplan::{Floorplan, ItemId, Units, Wall};
use fplan_core::geometry::{Point2, ScreenTransform};
use fplan_core::occupancy::{SpanKind, segment_floorplan_wall};
use fplan_engine::input::{InputEvent, Key, ScriptedInput};
use fplan_engine::placement::DragState;
use fplan_engine::scene::Scene;

fn square_scene() -> Scene {
    let plan = Floorplan::new(Units::Feet, vec![Wall::new(10.0, 90.0); 4]).with_openings(1, 1, 2.0, 3.0);
    Scene::with_floorplan(plan).expect("square is valid")
}

fn down(id: &str, x: f64, y: f64) -> InputEvent {
    InputEvent::PointerDown {
        item_id: ItemId::new(id),
        screen: Point2::new(x, y),
    }
}

fn motion(x: f64, y: f64) -> InputEvent {
    InputEvent::PointerMove {
        screen: Point2::new(x, y),
    }
}

fn up(x: f64, y: f64) -> InputEvent {
    InputEvent::PointerUp {
        screen: Point2::new(x, y),
    }
}

#[test]
fn square_walls_fit_a_padded_viewport() {
    let scene = square_scene();
    let viewport = scene.viewport();
    assert!((viewport.width - 22.0).abs() < 1e-9);
    assert!((viewport.height - 22.0).abs() < 1e-9);
    assert!(scene.chain().is_closed(1e-9));
}

#[test]
fn tiny_movement_is_a_selection_click() {
    let mut scene = square_scene();
    let placed = scene.floorplan().items[0].placed_on(2, 0.3);
    let plan = scene.floorplan().with_item(placed).unwrap();
    scene.load_floorplan(plan).unwrap();
    let before = scene.floorplan().clone();

    let mut port = ScriptedInput::new([down("door-0", 100.0, 100.0), motion(103.0, 100.0), up(103.0, 100.0)]);
    let changes = scene.drive(&mut port, &ScreenTransform::identity()).unwrap();

    assert_eq!(changes, 0);
    assert_eq!(scene.floorplan(), &before);
    let selection = scene.selection().expect("click selects the item");
    assert_eq!(selection.item_id, ItemId::new("door-0"));
    assert_eq!(selection.anchor, Point2::new(103.0, 100.0));
    assert_eq!(scene.drag_state(), &DragState::Idle);
}

#[test]
fn dragging_away_from_every_wall_unplaces_the_item() {
    let mut scene = square_scene();
    let placed = scene.floorplan().items[0].placed_on(0, 0.5);
    let plan = scene.floorplan().with_item(placed).unwrap();
    scene.load_floorplan(plan).unwrap();

    let transform = ScreenTransform::fit_viewport(&scene.viewport(), 440.0, 440.0).unwrap();
    let center = transform.to_screen(Point2::new(5.0, 5.0));
    let mut port = ScriptedInput::new([
        down("door-0", 0.0, 0.0),
        motion(center.x(), center.y()),
        motion(center.x(), center.y()),
        up(center.x(), center.y()),
    ]);
    scene.drive(&mut port, &transform).unwrap();

    let door = scene.floorplan().item(&ItemId::new("door-0")).unwrap();
    assert_eq!(door.wall_index, None);
    assert_eq!(door.position, 0.0);
    assert!(scene.selection().is_none());
    assert!(scene.can_undo());
}

#[test]
fn drag_follows_the_pointer_along_walls() {
    let mut scene = square_scene();
    let transform = ScreenTransform::fit_viewport(&scene.viewport(), 220.0, 220.0).unwrap();
    let on_wall = |x: f64, y: f64| transform.to_screen(Point2::new(x, y));

    let start = on_wall(-5.0, -5.0);
    let a = on_wall(3.0, 0.4);
    let b = on_wall(10.3, 8.0);
    let mut port = ScriptedInput::new([
        down("window-0", start.x(), start.y()),
        motion(a.x(), a.y()),
        motion(a.x(), a.y()),
    ]);
    scene.drive(&mut port, &transform).unwrap();
    let window = scene.floorplan().item(&ItemId::new("window-0")).unwrap();
    assert_eq!(window.wall_index, Some(0));
    assert!((window.position - 0.3).abs() < 1e-9);

    let mut port = ScriptedInput::new([motion(b.x(), b.y()), InputEvent::PointerLeave]);
    scene.drive(&mut port, &transform).unwrap();
    let window = scene.floorplan().item(&ItemId::new("window-0")).unwrap();
    assert_eq!(window.wall_index, Some(1));
    assert!((window.position - 0.8).abs() < 1e-9);
    assert!(scene.drag_state().is_idle());
}

#[test]
fn palette_drop_then_keyboard_nudge() {
    let mut scene = square_scene();
    let identity = ScreenTransform::identity();
    let mut port = ScriptedInput::new([
        InputEvent::Drop {
            item_id: ItemId::new("door-0"),
            wall_index: 3,
            screen: Point2::new(-40.0, 2.0),
        },
        down("door-0", 0.0, 8.0),
        up(0.0, 8.0),
        InputEvent::KeyDown(Key::ArrowLeft),
        InputEvent::KeyDown(Key::Other("Escape".into())),
    ]);
    let changes = scene.drive(&mut port, &identity).unwrap();
    assert_eq!(changes, 2);

    let door = scene.floorplan().item(&ItemId::new("door-0")).unwrap();
    assert_eq!(door.wall_index, Some(3));
    assert!((door.position - 0.795).abs() < 1e-9);

    let spans = segment_floorplan_wall(scene.floorplan(), 3);
    assert_eq!(spans.len(), 3);
    assert!(matches!(spans[1].kind, SpanKind::Opening { .. }));
    assert!((spans[1].length_on(10.0) - 2.0).abs() < 1e-9);
}

#[test]
fn deleting_the_dragged_item_mid_gesture_is_harmless() {
    let mut scene = square_scene();
    let identity = ScreenTransform::identity();
    let mut port = ScriptedInput::new([down("door-0", -20.0, -20.0), motion(5.0, 0.0)]);
    scene.drive(&mut port, &identity).unwrap();

    scene.set_openings(0, 1, 2.0, 3.0).unwrap();
    let mut port = ScriptedInput::new([motion(5.0, 0.1), up(5.0, 0.1)]);
    let changes = scene.drive(&mut port, &identity).unwrap();
    assert_eq!(changes, 0);
    assert!(scene.drag_state().is_idle());
    assert!(scene.floorplan().item(&ItemId::new("door-0")).is_none());
}
