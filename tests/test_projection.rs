use fake_news::projection::*;

use glam::{DVec2, DVec3};

const EPS: f64 = 1e-6;

fn viewport() -> Viewport {
    Viewport::new(320, 180)
}

fn flat(x: f64, y: f64, angle: f64) -> Projection {
    Projection::build(x, y, angle, viewport(), CameraRig::flat(), DVec2::ZERO)
}

fn chase(x: f64, y: f64, angle: f64) -> Projection {
    Projection::build(
        x,
        y,
        angle,
        viewport(),
        CameraRig::chase(viewport()),
        DVec2::ZERO,
    )
}

fn close(a: DVec2, b: DVec2) -> bool {
    (a - b).length() < EPS
}

// ── ndc_to_pixels ─────────────────────────────────────────────────────────────

#[test]
fn ndc_corners_map_to_viewport_corners() {
    let v = viewport();
    assert!(close(ndc_to_pixels(v, 0.0, 0.0), DVec2::new(160.0, 90.0)));
    assert!(close(ndc_to_pixels(v, 1.0, 1.0), DVec2::new(320.0, 0.0)));
    assert!(close(ndc_to_pixels(v, -1.0, -1.0), DVec2::new(0.0, 180.0)));
}

#[test]
fn viewport_contains_is_half_open() {
    let v = viewport();
    assert!(v.contains(DVec2::new(0.0, 0.0)));
    assert!(v.contains(DVec2::new(319.9, 179.9)));
    assert!(!v.contains(DVec2::new(320.0, 10.0)));
    assert!(!v.contains(DVec2::new(10.0, -0.1)));
    assert_eq!(v.center(), DVec2::new(160.0, 90.0));
}

// ── world_to_screen ───────────────────────────────────────────────────────────

#[test]
fn player_projects_to_centre_with_flat_camera() {
    for &(x, y, angle) in &[(4096.0, 4096.0, 0.0), (10.0, 7000.0, 1.3), (0.0, 0.0, -2.0)] {
        let p = flat(x, y, angle).world_to_screen(x, y);
        assert!(close(p.pos, viewport().center()), "{:?}", p.pos);
        assert!(p.in_front());
    }
}

#[test]
fn player_sits_below_centre_with_chase_camera() {
    let p = chase(4096.0, 4096.0, 0.4).world_to_screen(4096.0, 4096.0);
    assert!((p.pos.x - 160.0).abs() < EPS);
    assert!(p.pos.y > 130.0 && p.pos.y < 150.0, "y = {}", p.pos.y);
    assert!(p.in_front());
}

#[test]
fn heading_points_up_the_screen() {
    // Heading 0: forward is +y in the world
    let p = flat(0.0, 0.0, 0.0).world_to_screen(0.0, 10.0);
    assert!(close(p.pos, DVec2::new(160.0, 80.0)));

    // Heading π/2: forward is +x in the world
    let p = flat(0.0, 0.0, std::f64::consts::FRAC_PI_2).world_to_screen(10.0, 0.0);
    assert!(close(p.pos, DVec2::new(160.0, 80.0)));
}

#[test]
fn flat_camera_is_one_pixel_per_unit() {
    let p = flat(0.0, 0.0, 0.0).world_to_screen(25.0, -30.0);
    assert!(close(p.pos, DVec2::new(185.0, 120.0)));
}

#[test]
fn chase_camera_shrinks_the_road_ahead() {
    let proj = chase(0.0, 0.0, 0.0);
    let car = proj.world_to_screen(0.0, 0.0).pos;
    let near = proj.world_to_screen(0.0, 50.0).pos;
    let far = proj.world_to_screen(0.0, 100.0).pos;
    // Equal world steps cover fewer pixels further ahead
    assert!(car.y - near.y > near.y - far.y);
}

#[test]
fn jitter_shifts_the_frame() {
    let proj = Projection::build(
        0.0,
        0.0,
        0.0,
        viewport(),
        CameraRig::flat(),
        DVec2::new(1.0, 0.0),
    );
    let p = proj.world_to_screen(0.0, 0.0);
    assert!(close(p.pos, DVec2::new(161.0, 90.0)));
}

#[test]
fn to_ndc_divides_by_w() {
    let ndc = flat(0.0, 0.0, 0.0).to_ndc(DVec3::ZERO);
    assert!(ndc.x.abs() < EPS && ndc.y.abs() < EPS);
    assert!((ndc.z - 0.5).abs() < EPS);
    assert!((ndc.w - 2.0).abs() < EPS);
}

// ── screen_to_world ───────────────────────────────────────────────────────────

#[test]
fn screen_centre_unprojects_to_player_with_flat_camera() {
    let w = flat(1234.0, 567.0, 0.8).screen_to_world(160.0, 90.0).unwrap();
    assert!(close(w, DVec2::new(1234.0, 567.0)), "{:?}", w);
}

#[test]
fn screen_to_world_round_trips_through_chase_camera() {
    let proj = chase(4096.0, 4096.0, 2.1);
    for &(px, py) in &[(0.5, 0.5), (160.0, 90.0), (300.0, 20.0), (40.0, 170.0)] {
        let world = proj.screen_to_world(px, py).expect("ground visible");
        let back = proj.world_to_screen(world.x, world.y);
        assert!((back.pos - DVec2::new(px, py)).length() < 1e-4, "{:?}", back.pos);
        assert!(back.in_front());
    }
}

// ── threat markers ────────────────────────────────────────────────────────────

#[test]
fn no_marker_for_on_screen_targets() {
    let proj = chase(4096.0, 4096.0, 0.0);
    assert_eq!(proj.threat_marker(4096.0, 4116.0), None);
}

#[test]
fn marker_clamps_to_top_edge_for_target_far_ahead() {
    let proj = chase(4096.0, 4096.0, 0.0);
    let m = proj.threat_marker(4096.0, 4396.0).expect("marker");
    assert!((m.x - 160.0).abs() < EPS);
    assert_eq!(m.y, 0.0);
}

#[test]
fn marker_clamps_to_side_edge() {
    let proj = flat(0.0, 0.0, 0.0);
    let m = proj.threat_marker(300.0, 0.0).expect("marker");
    assert_eq!(m.x, 320.0 - MARKER_SIZE);
    assert!((m.y - 90.0).abs() < EPS);
}

#[test]
fn no_marker_for_targets_behind_the_camera() {
    let proj = chase(4096.0, 4096.0, 0.0);
    let behind = proj.world_to_screen(4096.0, 3496.0);
    assert!(!behind.in_front());
    assert_eq!(proj.threat_marker(4096.0, 3496.0), None);
}
