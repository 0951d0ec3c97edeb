pub mod point_sprites;
pub mod post_stack;
