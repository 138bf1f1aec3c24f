// src/ecs/entities.rs

// === Rust 標準ライブラリからのインポート ===
// HashMap: 生きているエンティティの ID → 中身 (スロットテーブル) の対応表。
// VecDeque: 引退したエンティティの入れ物を取っておくキュー。先に引退したものから再利用する。
use std::collections::{HashMap, VecDeque};
use std::fmt;

// itertools の sorted() でメンバー一覧を ID 順に並べるよ。
use itertools::Itertools;
use log::{debug, trace, warn};

// === このクレート内のモジュールからのインポート ===
use crate::config::PoolConfig;
use crate::ecs::abilities::Pooled;
use crate::ecs::ability::{Ability, AbilityId, AsAny};
use crate::ecs::entity::{Entity, EntityMut, EntityRecord, EntityRef};
use crate::ecs::error::{EcsError, EcsResult};
use crate::ecs::runner::{Membership, Runner, RunnerId, Signature};

/// 登録されたランナー1つ分。
struct RunnerSlot {
    name: &'static str,
    membership: Membership,
    /// `run` で `handle` を呼んでいる間だけ `None` になる (取り出して使うから)。
    runner: Option<Box<dyn Runner>>,
}

/// Entities（エンティティプール兼レジストリ）だよ！この ECS の中心！💖
///
/// - エンティティ ID の発行 (連番、使い回しなし)
/// - 引退したエンティティの入れ物の再利用 ♻️
/// - アビリティを付けたり外したりしたときに、全ランナーへ通知してメンバーを更新
/// - `run` で全ランナーを1回ずつ動かす (1 tick)
///
/// シングルスレッド前提！全部の通知は呼び出しが返る前に同期的に終わるよ。
/// エンティティは「生きている (ID 表にいる)」か「引退済み (キャッシュにいる)」のどっちか。両方はありえない。
pub struct Entities {
    runners: Vec<RunnerSlot>,
    /// 生きているエンティティの ID → 中身。
    live: HashMap<Entity, EntityRecord>,
    /// 引退済みの入れ物。中身は空っぽ。
    cache: VecDeque<EntityRecord>,
    next_id: usize,
    config: PoolConfig,
}

impl Default for Entities {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for Entities {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Entities")
            .field("live", &self.live.len())
            .field("cached", &self.cache.len())
            .field("next_id", &self.next_id)
            .field(
                "runners",
                &self.runners.iter().map(|slot| slot.name).collect::<Vec<_>>(),
            )
            .finish()
    }
}

impl Entities {
    pub fn new() -> Self {
        Self::with_config(PoolConfig::default())
    }

    pub fn with_config(config: PoolConfig) -> Self {
        Entities {
            runners: Vec::new(),
            live: HashMap::new(),
            cache: VecDeque::new(),
            next_id: 0,
            config,
        }
    }

    pub fn config(&self) -> &PoolConfig {
        &self.config
    }

    // --- エンティティの作成と引退 ---

    /// 新しいエンティティを作るよ！
    ///
    /// 引退済みの入れ物があればそれを使い回す。ID はいつでも新しい番号！
    pub fn create(&mut self) -> Entity {
        let record = match self.cache.pop_front() {
            Some(record) => record,
            None => EntityRecord::with_capacity(self.config.initial_slot_capacity),
        };
        let entity = Entity(self.next_id);
        self.next_id += 1;
        self.live.insert(entity, record);
        debug!("Entities: Created entity with ID {}", entity.0);

        // 何も要求しないランナーは、空っぽのエンティティもメンバーにする
        self.manage_entity(entity);
        entity
    }

    /// エンティティを引退させるよ。
    ///
    /// アビリティを全部外して (通知は1回)、全ランナーから外して、入れ物をキャッシュへ。
    /// 外したアビリティは返すので、`Abilities::recycle_all` に渡せば再利用できる。
    /// 引退済みや存在しないエンティティなら `EcsError::DeadEntity`。
    pub fn remove(&mut self, entity: Entity) -> EcsResult<Vec<Box<dyn Ability>>> {
        let detached = self.remove_all(entity)?;

        if let Some(record) = self.live.remove(&entity) {
            for slot in &mut self.runners {
                slot.membership.evict(entity);
            }
            if PoolConfig::has_room(self.config.entity_cache_limit, self.cache.len()) {
                self.cache.push_back(record);
            }
        }
        debug!("Entities: Retired entity with ID {}", entity.0);
        Ok(detached)
    }

    pub fn is_alive(&self, entity: Entity) -> bool {
        self.live.contains_key(&entity)
    }

    /// 生きているエンティティの数。
    pub fn len(&self) -> usize {
        self.live.len()
    }

    pub fn is_empty(&self) -> bool {
        self.live.is_empty()
    }

    /// 生きているエンティティ (順不同)。
    pub fn iter(&self) -> impl Iterator<Item = Entity> + '_ {
        self.live.keys().copied()
    }

    /// 再利用待ちの入れ物の数。
    pub fn cached_shells(&self) -> usize {
        self.cache.len()
    }

    pub fn entity(&self, entity: Entity) -> Option<EntityRef<'_>> {
        self.live
            .get(&entity)
            .map(|record| EntityRef::new(entity, record))
    }

    pub fn entity_mut(&mut self, entity: Entity) -> Option<EntityMut<'_>> {
        if self.is_alive(entity) {
            Some(EntityMut::new(entity, self))
        } else {
            None
        }
    }

    // --- アビリティの付け外し (全部ランナーに通知が飛ぶ) ---

    /// スロット `id` にアビリティを付ける (上書き)。前に付いていたものを返すよ。
    pub fn add_ability(
        &mut self,
        entity: Entity,
        id: AbilityId,
        ability: Box<dyn Ability>,
    ) -> EcsResult<Option<Box<dyn Ability>>> {
        let previous = self.record_mut(entity)?.insert(id, ability);
        self.manage_entity(entity);
        Ok(previous)
    }

    /// プールのタグの番号を使って付ける。
    pub fn attach<T: Ability>(
        &mut self,
        entity: Entity,
        ability: Pooled<T>,
    ) -> EcsResult<Option<Box<dyn Ability>>> {
        let (id, ability) = ability.into_parts();
        self.add_ability(entity, id, ability)
    }

    /// 付いていれば外して通知。付いてなければ `Ok(None)` で通知もしない。
    pub fn remove_ability(
        &mut self,
        entity: Entity,
        id: AbilityId,
    ) -> EcsResult<Option<Box<dyn Ability>>> {
        let removed = self.record_mut(entity)?.take(id);
        if removed.is_some() {
            self.manage_entity(entity);
        }
        Ok(removed)
    }

    /// 全部外す。空っぽでも通知はちょうど1回。
    pub fn remove_all(&mut self, entity: Entity) -> EcsResult<Vec<Box<dyn Ability>>> {
        let detached = self.record_mut(entity)?.drain();
        self.manage_entity(entity);
        Ok(detached)
    }

    pub fn has(&self, entity: Entity, id: AbilityId) -> bool {
        self.live.get(&entity).map_or(false, |record| record.has(id))
    }

    pub fn get<T: Ability>(&self, entity: Entity, id: AbilityId) -> Option<&T> {
        self.live.get(&entity)?.get(id)?.downcast_ref::<T>()
    }

    pub fn get_mut<T: Ability>(&mut self, entity: Entity, id: AbilityId) -> Option<&mut T> {
        self.live.get_mut(&entity)?.get_mut(id)?.downcast_mut::<T>()
    }

    fn record_mut(&mut self, entity: Entity) -> EcsResult<&mut EntityRecord> {
        match self.live.get_mut(&entity) {
            Some(record) => Ok(record),
            None => {
                warn!("Entities: Attempted to modify non-existent entity with ID {}", entity.0);
                Err(EcsError::DeadEntity(entity))
            }
        }
    }

    /// 書き換えられたエンティティを全ランナーに見せて、メンバーを更新してもらう。
    fn manage_entity(&mut self, entity: Entity) {
        let Some(record) = self.live.get(&entity) else {
            return;
        };
        for slot in &mut self.runners {
            if slot.membership.manage_entity(entity, record) {
                trace!(
                    "Entities: {:?} is now {} of {}",
                    entity,
                    if slot.membership.contains(entity) { "a member" } else { "not a member" },
                    slot.name
                );
            }
        }
    }

    // --- ランナー ---

    /// ランナーを登録するよ！
    ///
    /// `setup` で必要なアビリティを聞いて、今生きているエンティティを全部チェックしてから仲間入り。
    /// だから後から登録しても、メンバーはちゃんと揃ってる！
    pub fn add_runner<R: Runner>(&mut self, mut runner: R) -> RunnerId {
        let mut signature = Signature::new();
        runner.setup(&mut signature);

        let mut membership = Membership::new(signature);
        for (&entity, record) in &self.live {
            membership.manage_entity(entity, record);
        }

        let id = RunnerId(self.runners.len());
        let name = runner.name();
        debug!(
            "Entities: Registered runner {} as {:?} (requires {} abilities, {} initial members)",
            name,
            id,
            membership.signature().len(),
            membership.len()
        );
        self.runners.push(RunnerSlot {
            name,
            membership,
            runner: Some(Box::new(runner)),
        });
        id
    }

    pub fn runner_count(&self) -> usize {
        self.runners.len()
    }

    pub fn membership(&self, id: RunnerId) -> Option<&Membership> {
        self.runners.get(id.0).map(|slot| &slot.membership)
    }

    /// ランナーの今のメンバーを ID 順で。
    pub fn members(&self, id: RunnerId) -> Vec<Entity> {
        self.membership(id)
            .map(|membership| membership.iter().sorted().collect())
            .unwrap_or_default()
    }

    pub fn is_member(&self, id: RunnerId, entity: Entity) -> bool {
        self.membership(id)
            .map_or(false, |membership| membership.contains(entity))
    }

    /// 登録したランナーを具体的な型で取り出す。`run` の最中 (自分自身) は `None`。
    pub fn runner<R: Runner>(&self, id: RunnerId) -> Option<&R> {
        self.runners
            .get(id.0)?
            .runner
            .as_deref()?
            .as_any()
            .downcast_ref::<R>()
    }

    pub fn runner_mut<R: Runner>(&mut self, id: RunnerId) -> Option<&mut R> {
        self.runners
            .get_mut(id.0)?
            .runner
            .as_deref_mut()?
            .as_any_mut()
            .downcast_mut::<R>()
    }

    /// 1 tick 分、全ランナーを登録順に1回ずつ動かすよ！🚀
    ///
    /// 各ランナーは、動き始めた時点のメンバーを順に `handle` する。
    /// 途中でメンバーから外れたエンティティは飛ばして、途中で入ったエンティティは次の tick から。
    pub fn run(&mut self) {
        for index in 0..self.runners.len() {
            let Some(mut runner) = self.runners[index].runner.take() else {
                // handle の中から run を呼ぶと、実行中の自分はここに来る
                warn!("Entities: Runner {} is already running; skipping", self.runners[index].name);
                continue;
            };

            let members = self.runners[index].membership.snapshot();
            trace!(
                "Entities: Running {} over {} entities",
                self.runners[index].name,
                members.len()
            );
            for entity in members {
                if self.runners[index].membership.contains(entity) {
                    runner.handle(entity, self);
                }
            }

            self.runners[index].runner = Some(runner);
        }
    }
}

#[cfg(test)]
#[path = "entities_tests.rs"]
mod entities_tests;
