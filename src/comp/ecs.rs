use std::{marker::PhantomData, time::Instant};

use specs::{DispatcherBuilder, Entity, RunNow, SystemData};

/// Tick 系統介面
///
/// 每個 tick 系統實作此 trait 而非直接實作 `specs::System`，
/// 讓調度名稱與計時統一由 `Job` 包裝處理
pub trait System<'a> {
    const NAME: &'static str;
    type SystemData: SystemData<'a>;

    fn run(job: &mut Job<Self>, system_data: Self::SystemData);

    fn sys_name() -> String { format!("{}_sys", Self::NAME) }
}

/// 包裝一個 tick 系統，執行時記錄耗時
pub struct Job<T: ?Sized> {
    own: PhantomData<T>,
}

impl<T: ?Sized> Default for Job<T> {
    fn default() -> Self { Self { own: PhantomData } }
}

impl<'a, T> specs::System<'a> for Job<T>
where
    T: System<'a>,
{
    type SystemData = T::SystemData;

    fn run(&mut self, data: Self::SystemData) {
        let time1 = Instant::now();
        T::run(self, data);
        log::debug!("{} update time {:?}", T::NAME, time1.elapsed());
    }
}

/// 把系統加入調度器，依賴用 `Sys::sys_name()` 指定
pub fn dispatch<'a, 'b, T>(builder: &mut DispatcherBuilder<'a, 'b>, dep: &[&str])
where
    T: for<'c> System<'c> + Send + 'a,
{
    builder.add(Job::<T>::default(), &T::sys_name(), dep);
}

/// 在測試或單次呼叫時直接執行一個系統
pub fn run_now<T>(world: &specs::World)
where
    T: for<'c> System<'c> + Send,
{
    Job::<T>::default().run_now(world);
}

/// 實體缺少必要組件：內容配置錯誤，直接中止而不是悄悄跳過
pub fn missing_comp(entity: Entity, comp: &'static str) -> ! {
    panic!("entity {:?} is missing required component {}", entity, comp)
}
