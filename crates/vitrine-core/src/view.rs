//! Camera preset, framing and turntable math

use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::bounds::Aabb;

/// Turntable timer period
pub const TURNTABLE_INTERVAL: Duration = Duration::from_millis(20);

/// Rotation applied per turntable tick, in radians
pub const TURNTABLE_STEP: f32 = 0.02;

/// Camera position used by "reset view" before re-framing
pub const RESET_POSITION: [f32; 3] = [10.0, 10.0, 10.0];

/// Framing distance used when the model has no extent
const MIN_FRAMING_DISTANCE: f32 = 1.0;

/// Fixed camera orientations
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum CameraView {
    Front,
    Back,
    Top,
    Bottom,
    Left,
    Right,
}

impl CameraView {
    pub const ALL: [CameraView; 6] = [
        CameraView::Front,
        CameraView::Back,
        CameraView::Top,
        CameraView::Bottom,
        CameraView::Left,
        CameraView::Right,
    ];

    /// Direction the camera looks along
    pub fn look_direction(&self) -> [f32; 3] {
        match self {
            CameraView::Front => [0.0, 0.0, -1.0],
            CameraView::Back => [0.0, 0.0, 1.0],
            CameraView::Top => [0.0, -1.0, 0.0],
            CameraView::Bottom => [0.0, 1.0, 0.0],
            CameraView::Left => [1.0, 0.0, 0.0],
            CameraView::Right => [-1.0, 0.0, 0.0],
        }
    }

    pub fn up_direction(&self) -> [f32; 3] {
        match self {
            CameraView::Top => [0.0, 0.0, 1.0],
            CameraView::Bottom => [0.0, 0.0, -1.0],
            _ => [0.0, 1.0, 0.0],
        }
    }

    /// Localization key of the menu label
    pub fn label_key(&self) -> &'static str {
        match self {
            CameraView::Front => "View_Front",
            CameraView::Back => "View_Back",
            CameraView::Top => "View_Top",
            CameraView::Bottom => "View_Bottom",
            CameraView::Left => "View_Left",
            CameraView::Right => "View_Right",
        }
    }
}

/// Position of the camera after one turntable tick, plus its new look direction.
///
/// `offset` is the camera position relative to the orbit target. The rotation
/// is about the vertical axis.
pub fn turntable_step(offset: [f32; 3], angle: f32) -> ([f32; 3], [f32; 3]) {
    let (sin, cos) = angle.sin_cos();
    let [x, y, z] = offset;
    let rotated = [x * cos - z * sin, y, x * sin + z * cos];
    (rotated, [-rotated[0], -rotated[1], -rotated[2]])
}

/// Distance at which a sphere around `bounds` fits a perspective frustum.
///
/// `fov_y` is the vertical field of view in radians.
pub fn framing_distance(bounds: &Aabb, fov_y: f32) -> f32 {
    let radius = bounds.diagonal() * 0.5;
    if radius <= f32::EPSILON {
        return MIN_FRAMING_DISTANCE;
    }
    let half = (fov_y * 0.5).clamp(0.05, 1.5);
    (radius / half.sin()).max(MIN_FRAMING_DISTANCE)
}

/// Viewport height that fits `bounds` in an orthographic projection
pub fn orthographic_height(bounds: &Aabb) -> f32 {
    (bounds.diagonal() * 1.1).max(MIN_FRAMING_DISTANCE)
}

/// Camera position framing `bounds` while looking along `look`
pub fn frame_position(bounds: &Aabb, look: [f32; 3], fov_y: f32) -> [f32; 3] {
    let center = bounds.center();
    let d = framing_distance(bounds, fov_y);
    let look = normalized(look);
    [
        center[0] - look[0] * d,
        center[1] - look[1] * d,
        center[2] - look[2] * d,
    ]
}

fn normalized(v: [f32; 3]) -> [f32; 3] {
    let len = (v[0] * v[0] + v[1] * v[1] + v[2] * v[2]).sqrt();
    if len > f32::EPSILON {
        [v[0] / len, v[1] / len, v[2] / len]
    } else {
        [0.0, 0.0, -1.0]
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::f32::consts::FRAC_PI_2;

    #[test]
    fn test_presets_are_orthonormal() {
        for view in CameraView::ALL {
            let l = view.look_direction();
            let u = view.up_direction();
            let dot = l[0] * u[0] + l[1] * u[1] + l[2] * u[2];
            assert_eq!(dot, 0.0, "{:?}", view);
        }
        assert_eq!(CameraView::Top.look_direction(), [0.0, -1.0, 0.0]);
        assert_eq!(CameraView::Top.up_direction(), [0.0, 0.0, 1.0]);
    }

    #[test]
    fn test_turntable_quarter_turn() {
        let (pos, look) = turntable_step([1.0, 2.0, 0.0], FRAC_PI_2);
        assert!((pos[0]).abs() < 1e-6);
        assert_eq!(pos[1], 2.0);
        assert!((pos[2] - 1.0).abs() < 1e-6);
        assert_eq!(look, [-pos[0], -pos[1], -pos[2]]);
    }

    #[test]
    fn test_turntable_preserves_radius() {
        let mut pos = [3.0, 1.0, 4.0];
        for _ in 0..100 {
            pos = turntable_step(pos, TURNTABLE_STEP).0;
        }
        let r = (pos[0] * pos[0] + pos[2] * pos[2]).sqrt();
        assert!((r - 5.0).abs() < 1e-3);
    }

    #[test]
    fn test_framing() {
        let bounds = Aabb::new([-1.0; 3], [1.0; 3]);
        let d = framing_distance(&bounds, FRAC_PI_2);
        assert!(d > bounds.diagonal() * 0.5);

        let pos = frame_position(&bounds, CameraView::Front.look_direction(), FRAC_PI_2);
        assert_eq!(pos[0], 0.0);
        assert!((pos[2] - d).abs() < 1e-6);

        assert_eq!(framing_distance(&Aabb::EMPTY, FRAC_PI_2), 1.0);
    }
}
