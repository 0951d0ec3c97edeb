use glam::{Mat4, Vec3};

/// Camera uniform shared by both sprite layers.
/// Must match `CameraUniform` in `point_sprites.wgsl`.
#[repr(C)]
#[derive(Clone, Copy, Debug, bytemuck::Pod, bytemuck::Zeroable)]
pub struct CameraUniform {
    pub view_proj: [[f32; 4]; 4],
    /// Camera right axis in world space (w unused).
    pub right: [f32; 4],
    /// Camera up axis in world space (w unused).
    pub up: [f32; 4],
    /// Eye position (xyz) and unused w.
    pub eye: [f32; 4],
    /// View direction (xyz) and unused w.
    pub forward: [f32; 4],
    /// Linear fog start/end along the view direction, then padding.
    pub fog: [f32; 4],
}

// Compile‑time check: 64 + 5 * 16 bytes.
const _: [(); 144] = [(); core::mem::size_of::<CameraUniform>()];

/// Fixed perspective camera looking at the field.
#[derive(Debug, Clone)]
pub struct Camera {
    pub eye: Vec3,
    pub target: Vec3,
    /// Vertical field of view (radians).
    pub fov_y_rad: f32,
    pub aspect: f32,
    pub near: f32,
    pub far: f32,
    /// Distances over which points fade into the black background.
    pub fog_near: f32,
    pub fog_far: f32,
}

impl Camera {
    /// The hero framing: slightly above the field, looking at the origin.
    pub fn hero(aspect: f32) -> Self {
        Self {
            eye: Vec3::new(0.0, 6.0, 14.0),
            target: Vec3::ZERO,
            fov_y_rad: 50f32.to_radians(),
            aspect,
            near: 0.1,
            far: 1000.0,
            fog_near: 10.0,
            fog_far: 50.0,
        }
    }

    /// Updates the aspect ratio after a resize; zero-sized windows are ignored.
    pub fn set_viewport(&mut self, width: u32, height: u32) {
        if width > 0 && height > 0 {
            self.aspect = width as f32 / height as f32;
        }
    }

    pub fn view(&self) -> Mat4 {
        Mat4::look_at_rh(self.eye, self.target, Vec3::Y)
    }

    /// Right-handed projection with wgpu's `[0, 1]` depth range.
    pub fn proj(&self) -> Mat4 {
        Mat4::perspective_rh(self.fov_y_rad, self.aspect, self.near, self.far)
    }

    pub fn view_proj(&self) -> Mat4 {
        self.proj() * self.view()
    }

    pub fn uniform(&self) -> CameraUniform {
        // Rows of the rotation part of the view matrix are the camera axes.
        let view = self.view();
        let right = view.row(0).truncate();
        let up = view.row(1).truncate();
        let forward = (self.target - self.eye).normalize();

        CameraUniform {
            view_proj: self.view_proj().to_cols_array_2d(),
            right: right.extend(0.0).to_array(),
            up: up.extend(0.0).to_array(),
            eye: self.eye.extend(1.0).to_array(),
            forward: forward.extend(0.0).to_array(),
            fog: [self.fog_near, self.fog_far, 0.0, 0.0],
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn target_projects_to_screen_center() {
        let cam = Camera::hero(16.0 / 9.0);
        let clip = cam.view_proj() * cam.target.extend(1.0);
        let ndc = clip.truncate() / clip.w;
        assert!(ndc.x.abs() < 1e-5 && ndc.y.abs() < 1e-5);
        assert!((0.0..=1.0).contains(&ndc.z));
    }

    #[test]
    fn lattice_center_is_in_view() {
        // The lattice sits at y = -2, shifted 15 units away from the camera.
        let cam = Camera::hero(1.0);
        let clip = cam.view_proj() * Vec3::new(0.0, -2.0, -15.0).extend(1.0);
        assert!(clip.w > 0.0);
        assert!((clip.y / clip.w).abs() < 1.0);
        assert!((clip.x / clip.w).abs() < 1e-5);
    }

    #[test]
    fn billboard_axes_are_orthonormal() {
        let u = Camera::hero(1.5).uniform();
        let r = Vec3::from_slice(&u.right[..3]);
        let up = Vec3::from_slice(&u.up[..3]);
        let f = Vec3::from_slice(&u.forward[..3]);
        assert!((r.length() - 1.0).abs() < 1e-5);
        assert!((up.length() - 1.0).abs() < 1e-5);
        assert!(r.dot(up).abs() < 1e-5);
        assert!(r.dot(f).abs() < 1e-5);
        // Horizontal right axis, up axis tilted towards the scene.
        assert!(r.y.abs() < 1e-6);
        assert!(up.y > 0.0);
    }

    #[test]
    fn viewport_resize_updates_aspect() {
        let mut cam = Camera::hero(1.0);
        cam.set_viewport(1920, 1080);
        assert!((cam.aspect - 16.0 / 9.0).abs() < 1e-6);
        cam.set_viewport(0, 1080);
        assert!((cam.aspect - 16.0 / 9.0).abs() < 1e-6);
    }
}
