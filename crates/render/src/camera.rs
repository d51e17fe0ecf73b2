use glam::{Mat4, Vec3};
use mazeview_common::Pose;

/// Height of a wall box, in cells.
pub const WALL_HEIGHT: f32 = 0.5;

/// Camera height above the floor.
pub const EYE_HEIGHT: f32 = WALL_HEIGHT / 2.0;

/// Convert a map-space point to the Z-up, right-handed world.
///
/// Map rows grow downward, so the Y axis is mirrored.
pub fn to_world(x: f64, y: f64, z: f32) -> Vec3 {
    Vec3::new(x as f32, -(y as f32), z)
}

/// First-person camera derived from a player pose.
///
/// The up vector is tilted together with the view direction, so the view
/// stays well defined at any pitch, including past vertical.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Camera {
    pub eye: Vec3,
    pub forward: Vec3,
    pub up: Vec3,
    /// Vertical field of view in radians.
    pub fov_y: f32,
    pub aspect: f32,
    pub near: f32,
    pub far: f32,
}

impl Camera {
    pub fn from_pose(pose: &Pose, aspect: f32) -> Self {
        let (sin_dir, cos_dir) = pose.dir.sin_cos();
        let (sin_tilt, cos_tilt) = pose.tilt.sin_cos();

        let forward = to_world(cos_dir * cos_tilt, sin_dir * cos_tilt, -sin_tilt as f32);
        let up = to_world(cos_dir * sin_tilt, sin_dir * sin_tilt, cos_tilt as f32);

        Self {
            eye: to_world(pose.position.x, pose.position.y, EYE_HEIGHT),
            forward,
            up,
            fov_y: 45.0_f32.to_radians(),
            aspect,
            near: 0.01,
            far: 30.0,
        }
    }

    pub fn view_matrix(&self) -> Mat4 {
        Mat4::look_to_rh(self.eye, self.forward, self.up)
    }

    pub fn projection_matrix(&self) -> Mat4 {
        Mat4::perspective_rh(self.fov_y, self.aspect, self.near, self.far)
    }

    pub fn view_projection(&self) -> Mat4 {
        self.projection_matrix() * self.view_matrix()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use glam::DVec2;
    use std::f64::consts::{FRAC_PI_2, PI};

    fn pose(x: f64, y: f64, dir: f64, tilt: f64) -> Pose {
        Pose {
            position: DVec2::new(x, y),
            dir,
            tilt,
        }
    }

    #[test]
    fn level_camera_sits_at_eye_height() {
        let cam = Camera::from_pose(&pose(2.5, 3.5, 0.0, 0.0), 4.0 / 3.0);
        assert_eq!(cam.eye, Vec3::new(2.5, -3.5, EYE_HEIGHT));
        assert!((cam.forward - Vec3::X).length() < 1e-6);
        assert!((cam.up - Vec3::Z).length() < 1e-6);
        assert!((cam.eye + cam.forward - Vec3::new(3.5, -3.5, EYE_HEIGHT)).length() < 1e-6);
    }

    #[test]
    fn facing_down_the_rows_looks_toward_negative_world_y() {
        let cam = Camera::from_pose(&pose(1.0, 1.0, FRAC_PI_2, 0.0), 1.0);
        assert!((cam.forward - Vec3::NEG_Y).length() < 1e-6);
    }

    #[test]
    fn positive_tilt_looks_down() {
        let cam = Camera::from_pose(&pose(1.0, 1.0, 0.0, 0.3), 1.0);
        assert!(cam.forward.z < 0.0);
        assert!(cam.forward.dot(cam.up).abs() < 1e-6);
    }

    #[test]
    fn view_projection_is_finite_at_any_tilt() {
        for i in -8..=8 {
            let tilt = i as f64 * PI / 4.0;
            let cam = Camera::from_pose(&pose(1.5, 1.5, 0.4, tilt), 16.0 / 9.0);
            let vp = cam.view_projection();
            assert!(vp.is_finite(), "tilt {tilt} produced {vp:?}");
        }
    }

    #[test]
    fn point_ahead_projects_to_screen_center() {
        let cam = Camera::from_pose(&pose(1.5, 1.5, 0.0, 0.0), 1.0);
        let clip = cam.view_projection() * (cam.eye + Vec3::X * 5.0).extend(1.0);
        let ndc = clip.truncate() / clip.w;
        assert!(ndc.x.abs() < 1e-5 && ndc.y.abs() < 1e-5);
        assert!(ndc.z > 0.0 && ndc.z < 1.0);
    }

    #[test]
    fn player_right_appears_on_screen_right() {
        // Facing +x on the map, the cell below on the minimap is to the right.
        let cam = Camera::from_pose(&pose(1.5, 1.5, 0.0, 0.0), 1.0);
        let right_of_player = to_world(3.0, 2.5, EYE_HEIGHT);
        let clip = cam.view_projection() * right_of_player.extend(1.0);
        assert!(clip.x / clip.w > 0.0);
    }
}
