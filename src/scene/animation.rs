use glam::{Mat4, Vec2, Vec3};

/// Seconds per full animation cycle (one patrol lap + one flap/pulse wave).
pub const MAX_FRAME: f32 = 8.0;
/// Patrol speed in world units per second, applied per axis.
pub const MOVEMENT_SPEED: f32 = 0.75;
/// Wing rotation rate in degrees per second.
pub const FLAP_RATE: f32 = 15.0;
/// Glow scale change per second.
pub const GLOW_GROWTH_RATE: f32 = 0.1;

/// Tuning knobs for the driver. Defaults come from the module consts;
/// tests substitute smaller periods to keep scenarios readable.
#[derive(Debug, Clone, Copy)]
pub struct AnimationParams {
    pub max_frame: f32,
    pub movement_speed: f32,
    pub flap_rate: f32,
    pub glow_growth_rate: f32,
}

impl Default for AnimationParams {
    fn default() -> Self {
        Self {
            max_frame: MAX_FRAME,
            movement_speed: MOVEMENT_SPEED,
            flap_rate: FLAP_RATE,
            glow_growth_rate: GLOW_GROWTH_RATE,
        }
    }
}

/// Model matrices for the five sprites, rebuilt from scratch every tick.
/// Read-only to the renderer.
#[derive(Debug, Clone, Copy)]
pub struct SceneTransforms {
    pub body: Mat4,
    pub left_wing: Mat4,
    pub right_wing: Mat4,
    pub left_glow: Mat4,
    pub right_glow: Mat4,
}

/// Which quarter of the cycle the patrol path is in.
/// "Out" legs move +x, "back" legs move -x; together they trace an
/// upside-down V away from the start point and the same V home.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum PathLeg {
    OutUp,
    OutDown,
    BackUp,
    BackDown,
}

impl PathLeg {
    /// Per-axis velocity signs for this leg.
    fn direction(self) -> Vec2 {
        match self {
            Self::OutUp => Vec2::new(1.0, 1.0),
            Self::OutDown => Vec2::new(1.0, -1.0),
            Self::BackUp => Vec2::new(-1.0, 1.0),
            Self::BackDown => Vec2::new(-1.0, -1.0),
        }
    }
}

/// All persistent animation scalars, owned by the app and advanced once per
/// frame. Single writer; the renderer only ever sees the returned
/// [`SceneTransforms`].
#[derive(Debug, Clone, Copy)]
pub struct AnimationState {
    params: AnimationParams,
    /// Sawtooth timer in `[0, max_frame)` at the start of every frame.
    pub frame_counter: f32,
    /// Accumulated body translation. Never reset.
    pub position: Vec2,
    /// Accumulated wing angles in degrees, mirrored in sign.
    pub left_flap_deg: f32,
    pub right_flap_deg: f32,
    /// Accumulated uniform scale for the glow sprites.
    pub glow_scale: f32,
}

impl Default for AnimationState {
    fn default() -> Self {
        Self::with_params(AnimationParams::default())
    }
}

impl AnimationState {
    pub fn with_params(params: AnimationParams) -> Self {
        Self {
            params,
            frame_counter: 0.0,
            position: Vec2::ZERO,
            left_flap_deg: 0.0,
            right_flap_deg: 0.0,
            glow_scale: 1.0,
        }
    }

    /// Advance the animation by `dt` seconds and return fresh matrices.
    ///
    /// Accumulation reads the frame-start counter, so a tick landing
    /// exactly on a quarter boundary still applies the full velocity of
    /// the leg it just finished traversing. The counter advances last.
    pub fn tick(&mut self, dt: f32) -> SceneTransforms {
        self.accumulate(dt);
        let transforms = self.transforms();
        self.advance(dt);
        transforms
    }

    /// Apply dt-scaled deltas to position, flap angles, and glow scale.
    fn accumulate(&mut self, dt: f32) {
        self.position += self.leg().direction() * self.params.movement_speed * dt;

        // First half-period: left wing swings positive, right negative,
        // glow grows. Second half: everything reverses. Triangular waves.
        let swing = self.params.flap_rate * dt;
        let growth = self.params.glow_growth_rate * dt;
        if self.frame_counter < self.params.max_frame * 0.5 {
            self.left_flap_deg += swing;
            self.right_flap_deg -= swing;
            self.glow_scale += growth;
        } else {
            self.left_flap_deg -= swing;
            self.right_flap_deg += swing;
            self.glow_scale -= growth;
        }
    }

    /// Increment the sawtooth counter, wrapping to exactly zero once it
    /// reaches the period. A single overshoot is absorbed, not carried.
    fn advance(&mut self, dt: f32) {
        self.frame_counter += dt;
        if self.frame_counter >= self.params.max_frame {
            self.frame_counter = 0.0;
        }
    }

    /// Which patrol leg the frame-start counter falls in. The four legs
    /// are half-open quarters of the period, so every counter value maps
    /// to exactly one leg.
    fn leg(&self) -> PathLeg {
        let quarter = self.params.max_frame * 0.25;
        if self.frame_counter < quarter {
            PathLeg::OutUp
        } else if self.frame_counter < 2.0 * quarter {
            PathLeg::OutDown
        } else if self.frame_counter < 3.0 * quarter {
            PathLeg::BackUp
        } else {
            PathLeg::BackDown
        }
    }

    /// Rebuild all five model matrices from the current scalars.
    ///
    /// Body is translate only. Wings rotate about +z after the shared
    /// translation. Glows scale in the plane, then rotate with the
    /// matching wing.
    fn transforms(&self) -> SceneTransforms {
        let body = Mat4::from_translation(self.position.extend(0.0));
        let left_spin = Mat4::from_rotation_z(self.left_flap_deg.to_radians());
        let right_spin = Mat4::from_rotation_z(self.right_flap_deg.to_radians());
        let pulse = Mat4::from_scale(Vec3::new(self.glow_scale, self.glow_scale, 1.0));

        SceneTransforms {
            body,
            left_wing: body * left_spin,
            right_wing: body * right_spin,
            left_glow: body * pulse * left_spin,
            right_glow: body * pulse * right_spin,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const EPS: f32 = 1e-4;

    fn approx(a: f32, b: f32) -> bool {
        (a - b).abs() < EPS
    }

    /// Small period and unit speed keep the scenarios readable.
    fn test_state() -> AnimationState {
        AnimationState::with_params(AnimationParams {
            max_frame: 4.0,
            movement_speed: 1.0,
            flap_rate: 10.0,
            glow_growth_rate: 0.1,
        })
    }

    #[test]
    fn counter_stays_in_range() {
        let mut anim = test_state();
        for dt in [0.3, 0.0, 1.7, 2.5, 0.9, 4.1, 0.01, 3.99] {
            anim.tick(dt);
            assert!(
                anim.frame_counter >= 0.0 && anim.frame_counter < 4.0,
                "counter {} out of range after dt {}",
                anim.frame_counter,
                dt
            );
        }
    }

    #[test]
    fn wrap_absorbs_overshoot() {
        let mut anim = test_state();
        anim.tick(3.0);
        assert!(approx(anim.frame_counter, 3.0));
        // 3.0 + 1.5 overshoots the period; wrap resets to zero, it does
        // not carry the remainder.
        anim.tick(1.5);
        assert!(approx(anim.frame_counter, 0.0));
    }

    #[test]
    fn quarter_period_covers_first_leg() {
        let mut anim = test_state();
        // Deltas summing to exactly max_frame/4; every frame starts
        // inside the first leg.
        for _ in 0..4 {
            anim.tick(0.25);
        }
        assert!(approx(anim.position.x, 1.0));
        assert!(approx(anim.position.y, 1.0));
    }

    #[test]
    fn v_path_end_to_end() {
        let mut anim = test_state();
        let expected = [
            (1.0, (1.0, 1.0)),
            (2.0, (2.0, 0.0)),
            (3.0, (1.0, 1.0)),
            (0.0, (0.0, 0.0)),
        ];
        for (counter, (x, y)) in expected {
            anim.tick(1.0);
            assert!(approx(anim.frame_counter, counter));
            assert!(approx(anim.position.x, x), "x = {}", anim.position.x);
            assert!(approx(anim.position.y, y), "y = {}", anim.position.y);
        }
    }

    #[test]
    fn glow_closes_over_full_period() {
        let mut anim = test_state();
        for _ in 0..16 {
            anim.tick(0.25);
        }
        assert!(approx(anim.glow_scale, 1.0), "glow = {}", anim.glow_scale);
        assert!(approx(anim.left_flap_deg, 0.0));
        assert!(approx(anim.right_flap_deg, 0.0));
    }

    #[test]
    fn wings_mirror() {
        let mut anim = test_state();
        for dt in [0.2, 0.5, 1.3, 0.7, 0.9] {
            anim.tick(dt);
            assert!(
                approx(anim.left_flap_deg, -anim.right_flap_deg),
                "left {} right {}",
                anim.left_flap_deg,
                anim.right_flap_deg
            );
        }
        // Past the half period the trends swap but stay opposed.
        assert!(anim.left_flap_deg.abs() > 0.0);
    }

    #[test]
    fn zero_dt_is_noop() {
        let mut anim = test_state();
        anim.tick(0.6);
        let before = anim;
        let frozen = anim.tick(0.0);

        assert!(approx(anim.frame_counter, before.frame_counter));
        assert!(approx(anim.position.x, before.position.x));
        assert!(approx(anim.position.y, before.position.y));
        assert!(approx(anim.glow_scale, before.glow_scale));
        assert_eq!(frozen.body, Mat4::from_translation(before.position.extend(0.0)));
    }

    #[test]
    fn body_matrix_is_translation() {
        let mut anim = test_state();
        anim.tick(0.5);
        anim.tick(0.5);
        let t = anim.tick(0.5);
        let origin = t.body.transform_point3(Vec3::ZERO);
        assert!(approx(origin.x, anim.position.x));
        assert!(approx(origin.y, anim.position.y));
        assert!(approx(origin.z, 0.0));
    }

    #[test]
    fn wing_matrices_rotate_about_z() {
        let mut anim = test_state();
        let t = anim.tick(1.0);
        let angle = anim.left_flap_deg.to_radians();
        // A point one unit along +x, rotated then translated.
        let p = t.left_wing.transform_point3(Vec3::X);
        assert!(approx(p.x, anim.position.x + angle.cos()));
        assert!(approx(p.y, anim.position.y + angle.sin()));
    }

    #[test]
    fn glow_matrices_scale_in_plane() {
        let mut anim = test_state();
        let t = anim.tick(1.0);
        let scale = anim.glow_scale;
        assert!(scale > 1.0);
        // z is untouched by the pulse.
        let p = t.left_glow.transform_point3(Vec3::Z);
        assert!(approx(p.z, 1.0));
        // The plane axes stretch by glow_scale regardless of rotation.
        let x_axis = t.left_glow.transform_vector3(Vec3::X);
        assert!(approx(x_axis.length(), scale));
    }
}
