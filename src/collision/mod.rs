//! Axis-aligned collision: geometry, per-object colliders and the pairwise pass

pub mod collider;
pub mod rect;
pub mod system;

pub use collider::Collider;
pub use rect::{Rect, Reposition, SideHit, reposition_from_collision};
pub use system::{Collision, ContactPhase, resolve};
