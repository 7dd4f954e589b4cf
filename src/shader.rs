use bytemuck::{Pod, Zeroable};
use glam::{Vec2, Vec3};

pub const VERTEX_SOURCE: &str = include_str!("sprite_vertex.wgsl");
pub const FRAGMENT_SOURCE: &str = include_str!("sprite_fragment.wgsl");

/// Per-instance attributes for one point sprite.
///
/// Field order matches the byte offsets used to build the vertex buffer
/// layout; see [`PointInstance::POSITION_OFFSET`] and friends.
#[repr(C)]
#[derive(Copy, Clone, Debug, PartialEq, Pod, Zeroable)]
pub struct PointInstance {
    pub position: [f32; 2],
    pub velocity: [f32; 2],
    pub life: f32,
    pub color: [f32; 3],
}

impl PointInstance {
    pub const POSITION_OFFSET: u64 = 0;
    pub const VELOCITY_OFFSET: u64 = 8;
    pub const LIFE_OFFSET: u64 = 16;
    pub const COLOR_OFFSET: u64 = 20;
    pub const STRIDE: u64 = std::mem::size_of::<PointInstance>() as u64;

    pub fn new(position: Vec2, velocity: Vec2, life: f32, color: Vec3) -> Self {
        Self {
            position: position.to_array(),
            velocity: velocity.to_array(),
            life,
            color: color.to_array(),
        }
    }
}
