/// 戰爭迷霧系統
///
/// 觀察者視線外的瓦片改用霧化染色，霧中的可繪製實體隱藏；
/// 觀察者移動後重新掃描並把重新進入視線的瓦片與實體還原
use hashbrown::HashSet;
use specs::{
    shred::{ResourceId, World},
    Entities, Join, Read, ReadStorage, SystemData, Write, WriteStorage,
};
use vek::Vec2;

use crate::comp::*;
use crate::vision::shadowcast::{cast_light, OCTANTS};

/// 觀察者移動超過此距離才重新計算（純粹的效能優化）
const RECALC_THRESHOLD: f32 = 0.5;
/// 距離霧化的濃度係數
const DARKEN_SCALE: f32 = 0.5;

#[derive(SystemData)]
pub struct FogRead<'a> {
    entities: Entities<'a>,
    observer: Read<'a, ObserverEntity>,
    view_distance: Read<'a, ViewDistance>,
    pos: ReadStorage<'a, Pos>,
}

#[derive(SystemData)]
pub struct FogWrite<'a> {
    map: Write<'a, TileMap>,
    fog: Write<'a, FogOfWar>,
    drawables: WriteStorage<'a, Drawable>,
}

/// 依距離計算霧化染色的 alpha，超出半徑完全不透光
fn dark_tint(distance: f32, max_distance: f32, scale: f32) -> u32 {
    if distance > max_distance {
        return 0xFFFF_FF00;
    }
    let factor = (distance * scale / max_distance).min(1.0);
    let alpha = (255.0 * (1.0 - factor)) as u32;
    0xFFFF_FF00 | alpha
}

#[derive(Default)]
pub struct Sys;

impl<'a> System<'a> for Sys {
    type SystemData = (FogRead<'a>, FogWrite<'a>);

    const NAME: &'static str = "fog";

    fn run(_job: &mut Job<Self>, (tr, mut tw): Self::SystemData) {
        // 沒有觀察者就沒有迷霧，整個 pass 跳過
        let observer = match tr.observer.0 {
            Some(e) => e,
            None => {
                log::debug!("no observer, fog pass skipped");
                return;
            }
        };
        let observer_pos = match tr.pos.get(observer) {
            Some(p) => p.0,
            None => missing_comp(observer, "Pos"),
        };

        if let Some(last) = tw.fog.last_observer_pos {
            if observer_pos.distance(last) <= RECALC_THRESHOLD {
                return;
            }
        }

        let radius = tr.view_distance.0;
        let center = TileMap::coord_of(observer_pos);

        // 八個象限全部掃完才開始改動瓦片，避免用到未完成的光束狀態
        let mut visible: HashSet<Vec2<i32>> = HashSet::new();
        visible.insert(center);
        for octant in OCTANTS.iter() {
            cast_light(center, radius, *octant, |c| tw.map.can_see_through(c), &mut visible);
        }

        // 離開包圍盒的霧化瓦片先還原
        let out_of_box: Vec<Vec2<i32>> = tw
            .fog
            .darkened
            .keys()
            .copied()
            .filter(|c| (c.x - center.x).abs() > radius || (c.y - center.y).abs() > radius)
            .collect();
        for c in out_of_box {
            if let Some(orig) = tw.fog.darkened.remove(&c) {
                if let Some(tile) = tw.map.at_mut(c) {
                    tile.tint = orig;
                }
            }
        }

        // 包圍盒內：可見 -> 還原、不可見 -> 霧化
        for y in (center.y - radius)..=(center.y + radius) {
            for x in (center.x - radius)..=(center.x + radius) {
                let c = Vec2::new(x, y);
                if visible.contains(&c) {
                    if let Some(orig) = tw.fog.darkened.remove(&c) {
                        if let Some(tile) = tw.map.at_mut(c) {
                            tile.tint = orig;
                        }
                    }
                } else if let Some(tile) = tw.map.at_mut(c) {
                    let dist = (Vec2::new(x as f32, y as f32)
                        - Vec2::new(center.x as f32, center.y as f32))
                    .magnitude();
                    let dark = dark_tint(dist, radius as f32, DARKEN_SCALE);
                    // 原始染色只在首次霧化時擷取
                    let orig = *tw.fog.darkened.entry(c).or_insert(tile.tint);
                    tile.tint = (orig & 0xFFFF_FF00) | (dark & 0xFF);
                }
            }
        }

        // 霧中的可繪製實體要隱藏
        for (e, pos, drawable) in (&tr.entities, &tr.pos, &mut tw.drawables).join() {
            let c = TileMap::coord_of(pos.0);
            if tw.fog.darkened.contains_key(&c) && drawable.visible {
                drawable.visible = false;
                tw.fog.hidden.push(e);
            }
        }

        // 瓦片已明亮的實體重新顯示
        let mut still_hidden = Vec::new();
        for e in std::mem::take(&mut tw.fog.hidden) {
            if !tr.entities.is_alive(e) {
                continue;
            }
            let pos = match tr.pos.get(e) {
                Some(p) => p.0,
                None => missing_comp(e, "Pos"),
            };
            if tw.fog.darkened.contains_key(&TileMap::coord_of(pos)) {
                still_hidden.push(e);
            } else {
                match tw.drawables.get_mut(e) {
                    Some(d) => d.visible = true,
                    None => missing_comp(e, "Drawable"),
                }
            }
        }
        tw.fog.hidden = still_hidden;

        tw.fog.last_observer_pos = Some(observer_pos);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use specs::{Builder, WorldExt};

    fn setup_world(map: TileMap) -> specs::World {
        let mut ecs = specs::World::new();
        ecs.register::<Pos>();
        ecs.register::<Drawable>();
        ecs.register::<Collider>();
        ecs.insert(map);
        ecs.insert(FogOfWar::default());
        ecs.insert(ObserverEntity(None));
        ecs.insert(ViewDistance::default());
        ecs
    }

    fn spawn_observer(ecs: &mut specs::World, pos: Vec2<f32>) -> specs::Entity {
        let e = ecs.create_entity().with(Pos(pos)).build();
        ecs.write_resource::<ObserverEntity>().0 = Some(e);
        e
    }

    fn run_fog(ecs: &specs::World) {
        run_now::<Sys>(ecs);
    }

    /// 沒有觀察者時 pass 跳過，什麼都不改
    #[test]
    fn test_no_observer_skips_pass() {
        let ecs = setup_world(TileMap::filled(10, 10, Tile::floor()));
        run_fog(&ecs);
        assert!(ecs.read_resource::<FogOfWar>().darkened.is_empty());
    }

    /// 視線外的瓦片霧化、視線內維持原樣
    #[test]
    fn test_darkens_outside_visible_circle() {
        let mut ecs = setup_world(TileMap::filled(30, 30, Tile::floor()));
        spawn_observer(&mut ecs, Vec2::new(15.5, 15.5));
        run_fog(&ecs);

        let fog = ecs.read_resource::<FogOfWar>();
        let map = ecs.read_resource::<TileMap>();
        // 觀察者腳下可見
        assert!(!fog.is_darkened(Vec2::new(15, 15)));
        assert_eq!(map.at(Vec2::new(15, 15)).unwrap().tint, TINT_NONE);
        // 包圍盒角落在半徑外，被霧化
        assert!(fog.is_darkened(Vec2::new(21, 21)));
        assert_ne!(map.at(Vec2::new(21, 21)).unwrap().tint, TINT_NONE);
        // 包圍盒外完全沒碰
        assert!(!fog.is_darkened(Vec2::new(26, 15)));
    }

    /// 連續兩個 pass、觀察者沒動：第二次不產生任何變化
    #[test]
    fn test_idempotent_when_observer_static() {
        let mut ecs = setup_world(TileMap::filled(30, 30, Tile::floor()));
        spawn_observer(&mut ecs, Vec2::new(15.5, 15.5));
        run_fog(&ecs);

        let snapshot: Vec<u32> = {
            let map = ecs.read_resource::<TileMap>();
            (0..30 * 30)
                .map(|i| map.at(Vec2::new(i % 30, i / 30)).unwrap().tint)
                .collect()
        };
        let darkened_before = ecs.read_resource::<FogOfWar>().darkened.len();

        run_fog(&ecs);

        let map = ecs.read_resource::<TileMap>();
        for i in 0..30 * 30 {
            assert_eq!(map.at(Vec2::new(i % 30, i / 30)).unwrap().tint, snapshot[i as usize]);
        }
        assert_eq!(ecs.read_resource::<FogOfWar>().darkened.len(), darkened_before);
    }

    /// 霧化再還原後染色逐位元相同，反覆多次也一樣
    #[test]
    fn test_restore_fidelity() {
        let mut map = TileMap::filled(40, 40, Tile::floor());
        let target = Vec2::new(20, 28);
        map.at_mut(target).unwrap().tint = 0xABCD_EF12;
        let mut ecs = setup_world(map);
        let observer = spawn_observer(&mut ecs, Vec2::new(20.5, 21.5));

        for _ in 0..3 {
            // 目標在包圍盒內但半徑外：被霧化
            ecs.write_storage::<Pos>().get_mut(observer).unwrap().0 = Vec2::new(20.5, 21.5);
            run_fog(&ecs);
            {
                let fog = ecs.read_resource::<FogOfWar>();
                let map = ecs.read_resource::<TileMap>();
                assert!(fog.is_darkened(target));
                assert_ne!(map.at(target).unwrap().tint, 0xABCD_EF12);
            }
            // 走近：目標重新進入視線，染色要完整還原
            ecs.write_storage::<Pos>().get_mut(observer).unwrap().0 = Vec2::new(20.5, 27.5);
            run_fog(&ecs);
            {
                let fog = ecs.read_resource::<FogOfWar>();
                let map = ecs.read_resource::<TileMap>();
                assert!(!fog.is_darkened(target));
                assert_eq!(map.at(target).unwrap().tint, 0xABCD_EF12);
            }
        }
    }

    /// 霧中的實體隱藏，瓦片重新明亮後還原
    #[test]
    fn test_entity_hide_and_reveal() {
        let mut ecs = setup_world(TileMap::filled(40, 40, Tile::floor()));
        let observer = spawn_observer(&mut ecs, Vec2::new(20.5, 8.5));
        // 怪物在包圍盒內但半徑外，應該被霧化隱藏
        let monster = ecs
            .create_entity()
            .with(Pos(Vec2::new(20.5, 15.5)))
            .with(Drawable::default())
            .build();

        run_fog(&ecs);
        {
            let drawables = ecs.read_storage::<Drawable>();
            assert!(!drawables.get(monster).unwrap().visible, "monster in fog is hidden");
            assert_eq!(ecs.read_resource::<FogOfWar>().hidden, vec![monster]);
        }

        // 觀察者走近，怪物的瓦片重新可見
        ecs.write_storage::<Pos>().get_mut(observer).unwrap().0 = Vec2::new(20.5, 10.5);
        run_fog(&ecs);
        {
            let drawables = ecs.read_storage::<Drawable>();
            assert!(drawables.get(monster).unwrap().visible, "monster revealed");
            assert!(ecs.read_resource::<FogOfWar>().hidden.is_empty());
        }
    }

    /// 移動量低於門檻時整個 pass 跳過
    #[test]
    fn test_movement_threshold_skips_recalc() {
        let mut ecs = setup_world(TileMap::filled(30, 30, Tile::floor()));
        let observer = spawn_observer(&mut ecs, Vec2::new(15.5, 15.5));
        run_fog(&ecs);
        let last = ecs.read_resource::<FogOfWar>().last_observer_pos;

        ecs.write_storage::<Pos>().get_mut(observer).unwrap().0 = Vec2::new(15.8, 15.5);
        run_fog(&ecs);
        // last_observer_pos 沒更新，代表 pass 被跳過
        assert_eq!(ecs.read_resource::<FogOfWar>().last_observer_pos, last);
    }

    /// 牆後的瓦片被霧化，牆本身維持原樣
    #[test]
    fn test_wall_shadow_darkens_behind() {
        let mut map = TileMap::filled(30, 30, Tile::floor());
        *map.at_mut(Vec2::new(15, 18)).unwrap() = Tile::wall();
        let mut ecs = setup_world(map);
        spawn_observer(&mut ecs, Vec2::new(15.5, 15.5));
        run_fog(&ecs);

        let fog = ecs.read_resource::<FogOfWar>();
        assert!(!fog.is_darkened(Vec2::new(15, 18)), "wall is visible");
        assert!(fog.is_darkened(Vec2::new(15, 19)), "tile behind wall is fogged");
        assert!(fog.is_darkened(Vec2::new(15, 20)));
    }
}
