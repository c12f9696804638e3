//! Ray picking and bound-level collision queries

pub mod collision;
pub mod pick;
pub mod ray;

pub use collision::{CollisionData, CollisionResults};
pub use pick::{PickData, PickResults};
pub use ray::Ray;
