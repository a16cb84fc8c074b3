use specs::Entity as EcsEntity;

use super::collide::Cardinal;

/// 每個 tick 由系統寫入、tick 結尾統一消化的事件
///
/// 碰撞回調已在系統內直接觸發，這裡是給外部廣播層的事件流
#[derive(Clone, Debug)]
pub enum Outcome {
    CollisionEnter {
        a: EcsEntity,
        b: EcsEntity,
        dir: Cardinal,
    },
    CollisionLeave {
        a: EcsEntity,
        b: EcsEntity,
        dir: Cardinal,
    },
}
