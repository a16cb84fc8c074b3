use rayon::{ThreadPool, ThreadPoolBuilder};
use specs::{prelude::Resource, Builder, DispatcherBuilder, WorldExt};
use std::sync::Arc;
use std::time::{Duration, Instant};
use vek::*;

use crate::comp::*;
use crate::map::MapData;
use crate::tick::*;

use failure::Error;
use rand::Rng;

/// 遊戲狀態
///
/// 持有 ECS 世界與執行緒池，每個關卡實例一份
pub struct State {
    ecs: specs::World,
    // Avoid lifetime annotation by storing a thread pool instead of the whole dispatcher
    thread_pool: Arc<ThreadPool>,
}

const MAX_DELTA_TIME: f32 = 1.0;

impl State {
    pub fn new(map: &MapData) -> Result<Self, Error> {
        let thread_pool = Arc::new(
            ThreadPoolBuilder::new()
                .num_threads(num_cpus::get())
                .thread_name(move |i| format!("rayon-{}", i))
                .build()?,
        );
        let mut res = Self {
            ecs: Self::setup_ecs_world(),
            thread_pool,
        };
        res.ecs.insert(map.to_tilemap()?);
        Ok(res)
    }

    fn setup_ecs_world() -> specs::World {
        let mut ecs = specs::World::new();
        // Register all components.
        ecs.register::<Pos>();
        ecs.register::<Drawable>();
        ecs.register::<Collider>();
        // Register unsynced resources used by the ECS.
        ecs.insert(Time(0.0));
        ecs.insert(DeltaTime(0.0));
        ecs.insert(Tick(0));
        ecs.insert(TickStart(Instant::now()));
        ecs.insert(ObserverEntity(None));
        ecs.insert(ViewDistance::default());
        ecs.insert(FogOfWar::default());
        ecs.insert(ActiveCollisions::default());
        ecs.insert(Vec::<Outcome>::new());
        ecs
    }

    /// 建立展示場景：一個觀察者英雄加上隨機散佈的可見單位
    pub fn create_test_scene(&mut self) {
        let (w, h) = {
            let map = self.ecs.read_resource::<TileMap>();
            (map.width(), map.height())
        };
        let hero_pos = Vec2::new(w as f32 * 0.5, h as f32 * 0.5);
        let hero = self
            .ecs
            .create_entity()
            .with(Pos(hero_pos))
            .with(
                Collider::new(Vec2::new(-0.4, -0.4), Vec2::new(0.8, 0.8))
                    .with_on_enter(Arc::new(|me, other, dir| {
                        log::info!("hero {:?} bumped into {:?} on its {:?} side", me, other, dir);
                    }))
                    .with_on_leave(Arc::new(|me, other, dir| {
                        log::info!("hero {:?} parted from {:?} on its {:?} side", me, other, dir);
                    })),
            )
            .build();
        self.ecs.write_resource::<ObserverEntity>().0 = Some(hero);

        let mut rng = rand::rng();
        let mut count = 0;
        for _ in 0..20 {
            let pos = Vec2::new(
                rng.random_range(0.5..w as f32 - 0.5),
                rng.random_range(0.5..h as f32 - 0.5),
            );
            let walkable = {
                let map = self.ecs.read_resource::<TileMap>();
                map.tile_at(pos).map_or(false, |t| t.see_through)
            };
            if walkable {
                self.ecs
                    .create_entity()
                    .with(Pos(pos))
                    .with(Drawable::default())
                    .with(Collider::new(Vec2::new(-0.3, -0.3), Vec2::new(0.6, 0.6)))
                    .build();
                count += 1;
            }
        }
        log::info!("test scene ready, observer {:?}, {} wanderers", hero, count);
    }

    /// Get a reference to the internal ECS world.
    pub fn ecs(&self) -> &specs::World { &self.ecs }

    /// Get a mutable reference to the internal ECS world.
    pub fn ecs_mut(&mut self) -> &mut specs::World { &mut self.ecs }

    pub fn thread_pool(&self) -> &Arc<ThreadPool> { &self.thread_pool }

    /// Get the current in-game time.
    pub fn get_time(&self) -> f64 { self.ecs.read_resource::<Time>().0 }

    /// Get the current delta time.
    pub fn get_delta_time(&self) -> f32 { self.ecs.read_resource::<DeltaTime>().0 }

    /// Given mutable access to the resource R, assuming the resource
    /// component exists (this is already the behavior of functions like `fetch`
    /// and `write_component_ignore_entity_dead`).  Since all of our resources
    /// are generated up front, any failure here is definitely a code bug.
    pub fn mut_resource<R: Resource>(&mut self) -> &mut R {
        self.ecs.get_mut::<R>().expect(
            "Tried to fetch an invalid resource even though all our resources should be known at \
             compile time.",
        )
    }

    pub fn set_observer(&mut self, ent: Option<specs::Entity>) {
        self.ecs.write_resource::<ObserverEntity>().0 = ent;
    }

    pub fn set_view_distance(&mut self, v: i32) {
        *self.ecs.write_resource::<ViewDistance>() = ViewDistance::clamped(v);
    }

    /// 切換關卡：還原舊地圖的霧化、清空追蹤狀態、換上新地圖
    pub fn change_level(&mut self, map: &MapData) -> Result<(), Error> {
        let tilemap = map.to_tilemap()?;
        {
            let mut fog = self.ecs.write_resource::<FogOfWar>();
            let mut old = self.ecs.write_resource::<TileMap>();
            let revealed = fog.revert(&mut old);
            let entities = self.ecs.entities();
            let mut drawables = self.ecs.write_storage::<Drawable>();
            for e in revealed {
                if entities.is_alive(e) {
                    if let Some(d) = drawables.get_mut(e) {
                        d.visible = true;
                    }
                }
            }
            fog.reset();
            *old = tilemap;
        }
        self.ecs.write_resource::<ActiveCollisions>().clear();
        self.ecs.write_resource::<Vec<Outcome>>().clear();
        log::info!("level changed to '{}'", map.Name);
        Ok(())
    }

    /// 處理文字指令（stdin 來的操作介面）
    pub fn handle_command(&mut self, cmd: &str) -> Result<(), Error> {
        let parts: Vec<&str> = cmd.split_whitespace().collect();
        match parts.as_slice() {
            ["move", x, y] => {
                let (x, y) = (x.parse::<f32>()?, y.parse::<f32>()?);
                let observer = self.ecs.read_resource::<ObserverEntity>().0;
                if let Some(e) = observer {
                    if let Some(pos) = self.ecs.write_storage::<Pos>().get_mut(e) {
                        pos.0 = Vec2::new(x, y);
                    }
                } else {
                    log::warn!("no observer to move");
                }
            }
            ["vd", v] => {
                self.set_view_distance(v.parse::<i32>()?);
            }
            ["level", path] => {
                let map = MapData::from_file(path)?;
                self.change_level(&map)?;
            }
            [] => {}
            _ => {
                log::warn!("unknown command: {}", cmd);
            }
        }
        Ok(())
    }

    pub fn tick(&mut self, dt: Duration) -> Result<(), Error> {
        self.ecs.write_resource::<Tick>().0 += 1;
        self.ecs.write_resource::<TickStart>().0 = Instant::now();
        self.ecs.write_resource::<Time>().0 += dt.as_secs_f64();
        self.ecs.write_resource::<DeltaTime>().0 = dt.as_secs_f32().min(MAX_DELTA_TIME);

        let mut dispatch_builder =
            DispatcherBuilder::new().with_pool(Arc::clone(&self.thread_pool));

        dispatch::<fog_tick::Sys>(&mut dispatch_builder, &[]);
        dispatch::<collision_tick::Sys>(&mut dispatch_builder, &[&fog_tick::Sys::sys_name()]);

        let mut dispatcher = dispatch_builder.build();
        dispatcher.dispatch(&self.ecs);

        self.process_outcomes()?;
        self.ecs.maintain();
        Ok(())
    }

    pub fn process_outcomes(&mut self) -> Result<(), Error> {
        let outcomes = {
            let mut ocs = self.ecs.write_resource::<Vec<Outcome>>();
            std::mem::take(&mut *ocs)
        };
        for out in outcomes {
            match out {
                Outcome::CollisionEnter { a, b, dir } => {
                    log::info!("collision enter {:?} -> {:?} ({:?})", a, b, dir);
                }
                Outcome::CollisionLeave { a, b, dir } => {
                    log::info!("collision leave {:?} -> {:?} ({:?})", a, b, dir);
                }
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn open_map(name: &str, w: usize, h: usize) -> MapData {
        MapData {
            Name: name.into(),
            Rows: vec![".".repeat(w); h],
        }
    }

    #[test]
    fn test_tick_advances_time() {
        let mut state = State::new(&open_map("arena", 16, 16)).unwrap();
        state.tick(Duration::from_millis(100)).unwrap();
        assert_eq!(state.ecs().read_resource::<Tick>().0, 1);
        assert!((state.get_time() - 0.1).abs() < 1e-9);
        assert!((state.get_delta_time() - 0.1).abs() < 1e-6);
    }

    #[test]
    fn test_delta_time_is_capped() {
        let mut state = State::new(&open_map("arena", 8, 8)).unwrap();
        state.tick(Duration::from_secs(30)).unwrap();
        assert_eq!(state.get_delta_time(), MAX_DELTA_TIME);
        assert!((state.get_time() - 30.0).abs() < 1e-9);
    }

    #[test]
    fn test_change_level_resets_tracking() {
        let mut state = State::new(&open_map("first", 32, 32)).unwrap();
        state.create_test_scene();
        state.tick(Duration::from_millis(100)).unwrap();
        // 觀察者在場，霧化一定發生在視野圈外
        assert!(!state.ecs().read_resource::<FogOfWar>().darkened.is_empty());

        state.change_level(&open_map("second", 16, 16)).unwrap();
        assert!(state.ecs().read_resource::<FogOfWar>().darkened.is_empty());
        assert!(state.ecs().read_resource::<ActiveCollisions>().is_empty());
        assert_eq!(state.ecs().read_resource::<TileMap>().width(), 16);
        // 新地圖完全沒有染色殘留
        let map = state.ecs().read_resource::<TileMap>();
        for x in 0..16 {
            for y in 0..16 {
                assert_eq!(map.at(Vec2::new(x, y)).unwrap().tint, TINT_NONE);
            }
        }
    }

    #[test]
    fn test_command_move_and_view_distance() {
        let mut state = State::new(&open_map("arena", 16, 16)).unwrap();
        state.create_test_scene();
        state.handle_command("move 3.5 4.5").unwrap();
        let observer = state.ecs().read_resource::<ObserverEntity>().0.unwrap();
        assert_eq!(
            state.ecs().read_storage::<Pos>().get(observer).unwrap().0,
            Vec2::new(3.5, 4.5)
        );
        state.handle_command("vd 99").unwrap();
        assert_eq!(
            *state.ecs().read_resource::<ViewDistance>(),
            ViewDistance(ViewDistance::MAX)
        );
        assert!(state.handle_command("vd nonsense").is_err());
        state.handle_command("dance").unwrap();
    }
}
