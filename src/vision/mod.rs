/// 視野計算模組
///
/// 包含遞迴陰影投射掃描，純幾何、不碰 ECS
pub mod shadowcast;

pub use self::shadowcast::{cast_light, OCTANTS};
