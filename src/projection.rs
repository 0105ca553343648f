//! Camera and perspective transforms, rebuilt every frame around the car.
//!
//! World space is the flat 8192×8192 plane at z = 0. The world transform
//! carries it into camera space:
//!
//! ```text
//! translate(-player) → rotate(player.angle) → translate(0, -lead)
//!     → pitch about x → [jitter] → look-at from (0, 0, -2)
//! ```
//!
//! and the perspective transform maps camera space to clip space with a
//! frustum whose half-extents are a quarter of the viewport. Clip space is
//! divided by `w` and scaled onto viewport pixels.

use glam::{DMat4, DVec2, DVec3, DVec4};

/// Camera position on the view axis.
const CAMERA_DISTANCE: f64 = 2.0;
/// Side of the square drawn for an off-screen threat.
pub const MARKER_SIZE: f64 = 4.0;

/// Size of the logical low-resolution target, in pixels.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Viewport {
    pub width: f64,
    pub height: f64,
}

impl Viewport {
    pub fn new(width: u32, height: u32) -> Self {
        Self {
            width: width as f64,
            height: height as f64,
        }
    }

    pub fn center(&self) -> DVec2 {
        DVec2::new(self.width / 2.0, self.height / 2.0)
    }

    pub fn contains(&self, p: DVec2) -> bool {
        p.x >= 0.0 && p.x < self.width && p.y >= 0.0 && p.y < self.height
    }
}

/// How the camera trails the car.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct CameraRig {
    /// Upward shift of the car on screen, in world units.
    pub lead: f64,
    /// Forward tilt in radians; makes the road ahead recede.
    pub pitch: f64,
}

impl CameraRig {
    /// Straight top-down view centred on the car.
    pub fn flat() -> Self {
        Self {
            lead: 0.0,
            pitch: 0.0,
        }
    }

    /// The in-game chase camera: car a quarter-height below centre, slight
    /// tilt towards the horizon.
    pub fn chase(viewport: Viewport) -> Self {
        Self {
            lead: viewport.height / 4.0,
            pitch: 0.005,
        }
    }
}

/// A world point carried through to the screen.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct ScreenPoint {
    /// Viewport pixel position.
    pub pos: DVec2,
    /// `z / w` after the homogeneous divide; positive in front of the camera.
    pub depth: f64,
}

impl ScreenPoint {
    pub fn in_front(&self) -> bool {
        self.depth > 0.0
    }
}

/// One frame's worth of transforms.
#[derive(Clone, Debug)]
pub struct Projection {
    pub world: DMat4,
    pub perspective: DMat4,
    view_proj: DMat4,
    inverse: DMat4,
    viewport: Viewport,
}

impl Projection {
    /// Build the pipeline for a car at `(x, y)` facing `angle`. `jitter` is
    /// the camera-shake offset, zero when steady.
    pub fn build(
        x: f64,
        y: f64,
        angle: f64,
        viewport: Viewport,
        rig: CameraRig,
        jitter: DVec2,
    ) -> Self {
        let camera = DMat4::look_at_rh(
            DVec3::new(0.0, 0.0, -CAMERA_DISTANCE),
            DVec3::ZERO,
            DVec3::Y,
        );
        let world = camera
            * DMat4::from_translation(jitter.extend(0.0))
            * DMat4::from_rotation_x(rig.pitch)
            * DMat4::from_translation(DVec3::new(0.0, -rig.lead, 0.0))
            * DMat4::from_rotation_z(angle)
            * DMat4::from_translation(DVec3::new(-x, -y, 0.0));

        let half_w = viewport.width / 4.0;
        let half_h = viewport.height / 4.0;
        let perspective = frustum(-half_w, -half_h, -1.0, half_w, half_h, 1.0);

        let view_proj = perspective * world;
        Self {
            world,
            perspective,
            view_proj,
            inverse: view_proj.inverse(),
            viewport,
        }
    }

    pub fn viewport(&self) -> Viewport {
        self.viewport
    }

    /// World point to normalised device coordinates `(x/w, y/w, z/w, w)`.
    pub fn to_ndc(&self, point: DVec3) -> DVec4 {
        let clip = self.view_proj * point.extend(1.0);
        DVec4::new(clip.x / clip.w, clip.y / clip.w, clip.z / clip.w, clip.w)
    }

    /// Ground-plane point to viewport pixels.
    pub fn world_to_screen(&self, x: f64, y: f64) -> ScreenPoint {
        let ndc = self.to_ndc(DVec3::new(x, y, 0.0));
        ScreenPoint {
            pos: ndc_to_pixels(self.viewport, ndc.x, ndc.y),
            depth: ndc.z,
        }
    }

    /// Viewport pixel back onto the ground plane, or `None` when the view
    /// ray through that pixel never meets it in front of the camera.
    pub fn screen_to_world(&self, px: f64, py: f64) -> Option<DVec2> {
        let half_w = self.viewport.width / 2.0;
        let half_h = self.viewport.height / 2.0;
        let nx = (px - half_w) / half_w;
        let ny = (py - half_h) / -half_h;

        // Two points on the view ray at different depths.
        let near = self.unproject(DVec3::new(nx, ny, 0.5));
        let far = self.unproject(DVec3::new(nx, ny, 0.25));
        let dz = far.z - near.z;
        if dz.abs() < f64::EPSILON {
            return None;
        }
        let t = -near.z / dz;
        if !t.is_finite() {
            return None;
        }
        let hit = near + (far - near) * t;
        // The ray line also crosses the plane behind the camera.
        if self.to_ndc(DVec3::new(hit.x, hit.y, 0.0)).w <= 0.0 {
            return None;
        }
        Some(DVec2::new(hit.x, hit.y))
    }

    fn unproject(&self, ndc: DVec3) -> DVec3 {
        let p = self.inverse * ndc.extend(1.0);
        p.truncate() / p.w
    }

    /// Edge-clamped marker for a hostile that projects off screen while in
    /// front of the camera. Returns the marker's top-left corner.
    pub fn threat_marker(&self, x: f64, y: f64) -> Option<DVec2> {
        let p = self.world_to_screen(x, y);
        if !p.in_front() || self.viewport.contains(p.pos) {
            return None;
        }
        Some(DVec2::new(
            p.pos.x.clamp(0.0, self.viewport.width - MARKER_SIZE),
            p.pos.y.clamp(0.0, self.viewport.height - MARKER_SIZE),
        ))
    }
}

/// Normalised device coordinates to viewport pixels, y pointing down.
pub fn ndc_to_pixels(viewport: Viewport, nx: f64, ny: f64) -> DVec2 {
    DVec2::new(
        nx * viewport.width / 2.0 + viewport.width / 2.0,
        ny * -viewport.height / 2.0 + viewport.height / 2.0,
    )
}

/// Off-centre perspective frustum; `top`/`bottom` follow screen orientation.
fn frustum(left: f64, top: f64, near: f64, right: f64, bottom: f64, far: f64) -> DMat4 {
    let dx = right - left;
    let dy = top - bottom;
    let dz = far - near;
    DMat4::from_cols(
        DVec4::new(2.0 * near / dx, 0.0, 0.0, 0.0),
        DVec4::new(0.0, 2.0 * near / dy, 0.0, 0.0),
        DVec4::new((right + left) / dx, (top + bottom) / dy, -(far + near) / dz, -1.0),
        DVec4::new(0.0, 0.0, -2.0 * far * near / dz, 0.0),
    )
}
