pub mod animation;

use crate::render::instance::SpriteInstance;
use self::animation::SceneTransforms;

/// Number of sprites in the scene: body, two wings, two glows.
pub const SPRITE_COUNT: usize = 5;

/// Sprite image files, in draw order: glows behind, body, wings on top.
/// The texture at index i is drawn with the instance at index i.
pub const SPRITE_PATHS: [&str; SPRITE_COUNT] = [
    "assets/glow_left.png",
    "assets/glow_right.png",
    "assets/gabriel_base.png",
    "assets/wing_left.png",
    "assets/wing_right.png",
];

/// Flatten the per-sprite transforms into GPU instances, in draw order.
/// The buffer is reused across frames; `out` keeps its allocation.
pub fn build_instances(transforms: &SceneTransforms, out: &mut Vec<SpriteInstance>) {
    out.clear();
    for matrix in [
        transforms.left_glow,
        transforms.right_glow,
        transforms.body,
        transforms.left_wing,
        transforms.right_wing,
    ] {
        out.push(SpriteInstance::from_matrix(matrix));
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::scene::animation::AnimationState;

    #[test]
    fn instances_follow_draw_order() {
        let mut anim = AnimationState::default();
        let transforms = anim.tick(0.5);

        let mut instances = Vec::new();
        build_instances(&transforms, &mut instances);

        assert_eq!(instances.len(), SPRITE_COUNT);
        assert_eq!(instances[0].model, transforms.left_glow.to_cols_array_2d());
        assert_eq!(instances[2].model, transforms.body.to_cols_array_2d());
        assert_eq!(instances[4].model, transforms.right_wing.to_cols_array_2d());
    }

    #[test]
    fn rebuild_reuses_buffer() {
        let mut anim = AnimationState::default();
        let mut instances = Vec::new();

        build_instances(&anim.tick(0.1), &mut instances);
        build_instances(&anim.tick(0.1), &mut instances);

        assert_eq!(instances.len(), SPRITE_COUNT);
    }
}
