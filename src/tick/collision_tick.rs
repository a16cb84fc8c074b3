/// 碰撞系統
///
/// 每個 tick 對帶 Collider 的實體做逐對 AABB 測試，
/// 重疊開始 / 結束時各觸發一次 enter / leave 回調；
/// 刻意不做空間分割，實體數量小的前提下 O(n²) 就夠了
use hashbrown::HashSet;
use specs::{
    shred::{ResourceId, World},
    Entities, Entity, Join, ReadStorage, SystemData, Write,
};
use vek::Vec2;

use crate::comp::*;

#[derive(SystemData)]
pub struct CollisionRead<'a> {
    entities: Entities<'a>,
    pos: ReadStorage<'a, Pos>,
    colliders: ReadStorage<'a, Collider>,
}

#[derive(SystemData)]
pub struct CollisionWrite<'a> {
    active: Write<'a, ActiveCollisions>,
    outcomes: Write<'a, Vec<Outcome>>,
}

#[derive(Default)]
pub struct Sys;

impl<'a> System<'a> for Sys {
    type SystemData = (CollisionRead<'a>, CollisionWrite<'a>);

    const NAME: &'static str = "collision";

    fn run(_job: &mut Job<Self>, (tr, mut tw): Self::SystemData) {
        // 收集所有碰撞實體；帶 Collider 卻沒有 Pos 是上游接線錯誤，直接中止
        let mut bodies: Vec<(Entity, Vec2<f32>, &Collider)> = Vec::new();
        for (e, collider) in (&tr.entities, &tr.colliders).join() {
            let pos = match tr.pos.get(e) {
                Some(p) => p.0,
                None => missing_comp(e, "Pos"),
            };
            bodies.push((e, pos, collider));
        }
        // 依 id 排序，每個無序對只測一次 (id(a) < id(b))
        bodies.sort_by_key(|(e, _, _)| e.id());

        let mut overlapping: HashSet<(Entity, Entity)> = HashSet::new();
        for i in 0..bodies.len() {
            let (ea, pa, ca) = bodies[i];
            for &(eb, pb, cb) in bodies[i + 1..].iter() {
                if Collider::overlaps(ca, pa, cb, pb) {
                    overlapping.insert(ActiveCollisions::key(ea, eb));
                }
            }
        }

        // absent -> active：雙方各收到一次 on_enter，方向互為相反
        for &(ea, eb) in overlapping.iter() {
            if tw.active.0.contains(&(ea, eb)) {
                continue;
            }
            let (ca, pa) = (collider_of(&tr, ea), pos_of(&tr, ea));
            let (cb, pb) = (collider_of(&tr, eb), pos_of(&tr, eb));
            let dir = Cardinal::between(ca.center(pa), cb.center(pb));
            (ca.on_enter)(ea, eb, dir);
            (cb.on_enter)(eb, ea, dir.opposite());
            tw.outcomes.push(Outcome::CollisionEnter { a: ea, b: eb, dir });
            tw.active.0.insert((ea, eb));
        }

        // active -> absent：雙方各收到一次 on_leave
        let ended: Vec<(Entity, Entity)> = tw
            .active
            .0
            .iter()
            .filter(|pair| !overlapping.contains(*pair))
            .copied()
            .collect();
        for (ea, eb) in ended {
            tw.active.0.remove(&(ea, eb));
            if !tr.entities.is_alive(ea) || !tr.entities.is_alive(eb) {
                // 實體已被刪除：只移除記錄，不再發事件
                continue;
            }
            let (ca, pa) = (collider_of(&tr, ea), pos_of(&tr, ea));
            let (cb, pb) = (collider_of(&tr, eb), pos_of(&tr, eb));
            let dir = Cardinal::between(ca.center(pa), cb.center(pb));
            (ca.on_leave)(ea, eb, dir);
            (cb.on_leave)(eb, ea, dir.opposite());
            tw.outcomes.push(Outcome::CollisionLeave { a: ea, b: eb, dir });
        }
    }
}

fn collider_of<'a>(tr: &'a CollisionRead<'_>, e: Entity) -> &'a Collider {
    match tr.colliders.get(e) {
        Some(c) => c,
        None => missing_comp(e, "Collider"),
    }
}

fn pos_of(tr: &CollisionRead<'_>, e: Entity) -> Vec2<f32> {
    match tr.pos.get(e) {
        Some(p) => p.0,
        None => missing_comp(e, "Pos"),
    }
}
