pub mod clock;
pub mod collide;
pub mod drawable;
pub mod ecs;
pub mod fog;
pub mod outcome;
pub mod phys;
pub mod resources;
pub mod state;
pub mod tile;

pub use self::{
    clock::*,
    collide::*,
    drawable::*,
    ecs::*,
    fog::*,
    outcome::*,
    phys::*,
    resources::*,
    state::*,
    tile::*,
};
