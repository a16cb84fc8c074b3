pub mod collision_tick;
pub mod fog_tick;

pub use self::{collision_tick::*, fog_tick::*};
