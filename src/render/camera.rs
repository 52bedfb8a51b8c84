use glam::Mat4;

/// Half-extents of the visible world, matching the window's 4:3 aspect.
/// Sprites are unit quads, so roughly a tenth of the view width each.
pub const VIEW_HALF_WIDTH: f32 = 5.0;
pub const VIEW_HALF_HEIGHT: f32 = 3.75;

/// Fixed orthographic view-projection. The camera never moves, so this is
/// computed once at pipeline setup.
pub fn view_proj() -> Mat4 {
    Mat4::orthographic_rh(
        -VIEW_HALF_WIDTH,
        VIEW_HALF_WIDTH,
        -VIEW_HALF_HEIGHT,
        VIEW_HALF_HEIGHT,
        -1.0,
        1.0,
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use glam::Vec3;

    #[test]
    fn corners_map_to_clip_space() {
        let vp = view_proj();

        let top_right = vp.project_point3(Vec3::new(VIEW_HALF_WIDTH, VIEW_HALF_HEIGHT, 0.0));
        assert!((top_right.x - 1.0).abs() < 1e-6);
        assert!((top_right.y - 1.0).abs() < 1e-6);

        let center = vp.project_point3(Vec3::ZERO);
        assert!(center.x.abs() < 1e-6);
        assert!(center.y.abs() < 1e-6);
    }
}
