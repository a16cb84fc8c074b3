/// 碰撞組件與方向分類
///
/// 碰撞箱為軸對齊矩形 (AABB)，方向分類只取四方位近似，
/// 對接近正方形的碰撞箱才準確，但這是既有行為，刻意保留
use std::fmt;
use std::sync::Arc;

use hashbrown::HashSet;
use serde::{Deserialize, Serialize};
use specs::storage::VecStorage;
use specs::{Component, Entity};
use vek::Vec2;

/// 碰撞事件的四方位方向（Y 軸朝上）
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Cardinal {
    North,
    South,
    East,
    West,
}

impl Cardinal {
    pub fn opposite(self) -> Self {
        match self {
            Cardinal::North => Cardinal::South,
            Cardinal::South => Cardinal::North,
            Cardinal::East => Cardinal::West,
            Cardinal::West => Cardinal::East,
        }
    }

    /// atan2 角度分桶，邊界在 ±π/4 與 ±3π/4
    pub fn from_angle(angle: f32) -> Self {
        use std::f32::consts::FRAC_PI_4;
        if angle >= -FRAC_PI_4 && angle < FRAC_PI_4 {
            Cardinal::East
        } else if angle >= FRAC_PI_4 && angle < 3.0 * FRAC_PI_4 {
            Cardinal::North
        } else if angle >= -3.0 * FRAC_PI_4 && angle < -FRAC_PI_4 {
            Cardinal::South
        } else {
            Cardinal::West
        }
    }

    /// 由 `from` 指向 `to` 的方向
    pub fn between(from: Vec2<f32>, to: Vec2<f32>) -> Self {
        let d = to - from;
        Self::from_angle(d.y.atan2(d.x))
    }
}

/// 碰撞回調：(自己, 對方, 方向)
pub type CollideHandler = Arc<dyn Fn(Entity, Entity, Cardinal) + Send + Sync>;

fn noop_handler() -> CollideHandler {
    Arc::new(|_, _, _| {})
}

/// 碰撞組件
///
/// `offset` 是碰撞箱左下角相對實體位置的偏移，`size` 是寬高
#[derive(Clone)]
pub struct Collider {
    pub offset: Vec2<f32>,
    pub size: Vec2<f32>,
    pub on_enter: CollideHandler,
    pub on_leave: CollideHandler,
}

impl Collider {
    pub fn new(offset: Vec2<f32>, size: Vec2<f32>) -> Self {
        Self {
            offset,
            size,
            on_enter: noop_handler(),
            on_leave: noop_handler(),
        }
    }

    pub fn with_on_enter(mut self, handler: CollideHandler) -> Self {
        self.on_enter = handler;
        self
    }

    pub fn with_on_leave(mut self, handler: CollideHandler) -> Self {
        self.on_leave = handler;
        self
    }

    pub fn bottom_left(&self, pos: Vec2<f32>) -> Vec2<f32> {
        pos + self.offset
    }

    pub fn top_right(&self, pos: Vec2<f32>) -> Vec2<f32> {
        pos + self.offset + self.size
    }

    pub fn center(&self, pos: Vec2<f32>) -> Vec2<f32> {
        pos + self.offset + self.size * 0.5
    }

    /// 嚴格不等式的 AABB 相交測試，邊緣剛好相貼不算碰撞
    pub fn overlaps(a: &Collider, pa: Vec2<f32>, b: &Collider, pb: Vec2<f32>) -> bool {
        let a_bl = a.bottom_left(pa);
        let a_tr = a.top_right(pa);
        let b_bl = b.bottom_left(pb);
        let b_tr = b.top_right(pb);
        a_bl.x < b_tr.x && a_tr.x > b_bl.x && a_bl.y < b_tr.y && a_tr.y > b_bl.y
    }
}

impl fmt::Debug for Collider {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Collider")
            .field("offset", &self.offset)
            .field("size", &self.size)
            .finish()
    }
}

impl Component for Collider {
    type Storage = VecStorage<Self>;
}

/// 目前重疊中的碰撞對
///
/// 元素是依實體 id 排序後的無序對，一對最多出現一次；
/// 以完整 Entity（id 加世代）當鍵，id 被回收給新實體時
/// 不會被誤認成還在重疊的舊配對；
/// 只有 enter / leave 轉換會改動這個集合
#[derive(Default)]
pub struct ActiveCollisions(pub HashSet<(Entity, Entity)>);

impl ActiveCollisions {
    pub fn key(a: Entity, b: Entity) -> (Entity, Entity) {
        if a.id() < b.id() {
            (a, b)
        } else {
            (b, a)
        }
    }

    pub fn contains(&self, a: Entity, b: Entity) -> bool {
        self.0.contains(&Self::key(a, b))
    }

    pub fn len(&self) -> usize { self.0.len() }

    pub fn is_empty(&self) -> bool { self.0.is_empty() }

    pub fn clear(&mut self) { self.0.clear(); }
}
