use std::time::Instant;

use serde::{Deserialize, Serialize};
use specs::Entity;

/// A resource that stores the tick (i.e: physics) time.
#[derive(Copy, Clone, Debug, Default, Serialize, Deserialize, PartialEq)]
pub struct Time(pub f64);

/// A resource that stores the time since the previous tick.
#[derive(Copy, Clone, Debug, Default)]
pub struct DeltaTime(pub f32);

// Start of Tick, used for metrics
#[derive(Copy, Clone)]
pub struct TickStart(pub Instant);

impl Default for TickStart {
    fn default() -> Self { TickStart(Instant::now()) }
}

#[derive(Copy, Clone, Default)]
pub struct Tick(pub u64);

/// 觀察者實體（迷霧視野的視點）
///
/// None 表示目前沒有觀察者，此時視野系統整個 pass 直接跳過
#[derive(Copy, Clone, Default)]
pub struct ObserverEntity(pub Option<Entity>);

/// 視野半徑（格）
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct ViewDistance(pub i32);

impl ViewDistance {
    pub const MAX: i32 = 25;

    /// 夾在 0..=MAX 之間
    pub fn clamped(v: i32) -> Self {
        ViewDistance(v.clamp(0, Self::MAX))
    }
}

impl Default for ViewDistance {
    fn default() -> Self { ViewDistance(7) }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_view_distance_clamped() {
        assert_eq!(ViewDistance::clamped(-3), ViewDistance(0));
        assert_eq!(ViewDistance::clamped(7), ViewDistance(7));
        assert_eq!(ViewDistance::clamped(99), ViewDistance(ViewDistance::MAX));
    }
}
