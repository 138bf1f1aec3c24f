// src/ecs/entity.rs

// Entity の ID はログに出したり外に渡したりするかもしれないので serde 対応にしておく！
use serde::{Deserialize, Serialize};

use crate::ecs::abilities::Pooled;
use crate::ecs::ability::{Ability, AbilityId};
use crate::ecs::entities::Entities;
use crate::ecs::error::EcsResult;

/// Entity（エンティティ）は、ただの識別子（ID）だよ！
///
/// `Entities::create` が 0, 1, 2... と連番で発行する。
/// 中身の入れ物 (スロットテーブル) は使い回されるけど、ID は絶対に使い回さない！
/// だから古い `Entity` を持ち続けていても、別のエンティティを触っちゃう心配はないよ。
#[derive(
    PartialEq, Eq, PartialOrd, Ord, Hash, Clone, Copy, Debug, Serialize, Deserialize,
)]
pub struct Entity(pub usize);

/// エンティティの中身。アビリティ番号をインデックスにしたスロットテーブルだよ。
///
/// 足りなくなったら伸びる `Vec` なので、範囲外の番号は「何も付いてない」扱い。
/// 引退したときは `drain` で空にして、容量はそのまま次のエンティティに使い回す。
#[derive(Debug, Default)]
pub(crate) struct EntityRecord {
    slots: Vec<Option<Box<dyn Ability>>>,
    occupied: usize,
}

impl EntityRecord {
    pub(crate) fn with_capacity(capacity: usize) -> Self {
        EntityRecord {
            slots: Vec::with_capacity(capacity),
            occupied: 0,
        }
    }

    /// スロットに入れる。前に入っていたものがあれば返す (上書き)。
    pub(crate) fn insert(
        &mut self,
        id: AbilityId,
        ability: Box<dyn Ability>,
    ) -> Option<Box<dyn Ability>> {
        let index = id.index();
        if index >= self.slots.len() {
            self.slots.resize_with(index + 1, || None);
        }
        let previous = self.slots[index].replace(ability);
        if previous.is_none() {
            self.occupied += 1;
        }
        previous
    }

    pub(crate) fn has(&self, id: AbilityId) -> bool {
        matches!(self.slots.get(id.index()), Some(Some(_)))
    }

    pub(crate) fn get(&self, id: AbilityId) -> Option<&(dyn Ability + 'static)> {
        self.slots.get(id.index()).and_then(|slot| slot.as_deref())
    }

    pub(crate) fn get_mut(&mut self, id: AbilityId) -> Option<&mut (dyn Ability + 'static)> {
        match self.slots.get_mut(id.index()) {
            Some(Some(ability)) => Some(ability.as_mut()),
            _ => None,
        }
    }

    /// スロットを空にして中身を返す。他のスロットはずらさない！
    pub(crate) fn take(&mut self, id: AbilityId) -> Option<Box<dyn Ability>> {
        let taken = self.slots.get_mut(id.index()).and_then(Option::take);
        if taken.is_some() {
            self.occupied -= 1;
        }
        taken
    }

    /// 全スロットを空にする。`Vec` の容量は残るよ。
    pub(crate) fn drain(&mut self) -> Vec<Box<dyn Ability>> {
        self.occupied = 0;
        self.slots.drain(..).flatten().collect()
    }

    pub(crate) fn ability_ids(&self) -> impl Iterator<Item = AbilityId> + '_ {
        self.slots
            .iter()
            .enumerate()
            .filter(|(_, slot)| slot.is_some())
            .map(|(index, _)| AbilityId(index))
    }

    pub(crate) fn len(&self) -> usize {
        self.occupied
    }

    #[cfg(test)]
    pub(crate) fn capacity(&self) -> usize {
        self.slots.capacity()
    }
}

/// 生きているエンティティを読み取り専用で眺めるためのビュー 👀
#[derive(Debug, Clone, Copy)]
pub struct EntityRef<'a> {
    entity: Entity,
    record: &'a EntityRecord,
}

impl<'a> EntityRef<'a> {
    pub(crate) fn new(entity: Entity, record: &'a EntityRecord) -> Self {
        EntityRef { entity, record }
    }

    pub fn id(&self) -> Entity {
        self.entity
    }

    pub fn has(&self, id: AbilityId) -> bool {
        self.record.has(id)
    }

    /// スロット `id` の中身を `T` として取り出す。空っぽか、型が違えば `None`。
    pub fn get<T: Ability>(&self, id: AbilityId) -> Option<&'a T> {
        self.record.get(id).and_then(|ability| ability.downcast_ref::<T>())
    }

    pub fn get_dyn(&self, id: AbilityId) -> Option<&'a (dyn Ability + 'static)> {
        self.record.get(id)
    }

    /// 付いているアビリティの番号 (小さい順)。
    pub fn ability_ids(&self) -> impl Iterator<Item = AbilityId> + 'a {
        self.record.ability_ids()
    }

    pub fn len(&self) -> usize {
        self.record.len()
    }

    pub fn is_empty(&self) -> bool {
        self.record.len() == 0
    }
}

/// 生きているエンティティを書き換えるためのビュー ✏️
///
/// `Entities` への可変参照を握ってるから、`add` や `remove` をすると
/// その場で全ランナーに通知が飛ぶよ。通知は必ず「書き換えた後」！
pub struct EntityMut<'a> {
    entity: Entity,
    entities: &'a mut Entities,
}

impl<'a> EntityMut<'a> {
    pub(crate) fn new(entity: Entity, entities: &'a mut Entities) -> Self {
        EntityMut { entity, entities }
    }

    pub fn id(&self) -> Entity {
        self.entity
    }

    pub fn has(&self, id: AbilityId) -> bool {
        self.entities.has(self.entity, id)
    }

    pub fn get<T: Ability>(&self, id: AbilityId) -> Option<&T> {
        self.entities.get::<T>(self.entity, id)
    }

    pub fn get_mut<T: Ability>(&mut self, id: AbilityId) -> Option<&mut T> {
        self.entities.get_mut::<T>(self.entity, id)
    }

    /// スロット `id` にアビリティを付ける。前に付いてたものが返ってくるよ。
    pub fn add(
        &mut self,
        id: AbilityId,
        ability: Box<dyn Ability>,
    ) -> EcsResult<Option<Box<dyn Ability>>> {
        self.entities.add_ability(self.entity, id, ability)
    }

    /// プールから出てきたアビリティを、そのタグの番号のスロットに付ける。
    pub fn attach<T: Ability>(&mut self, ability: Pooled<T>) -> EcsResult<Option<Box<dyn Ability>>> {
        self.entities.attach(self.entity, ability)
    }

    /// 付いていれば外して返す。付いてなければ何もしない (通知もなし)。
    pub fn remove(&mut self, id: AbilityId) -> EcsResult<Option<Box<dyn Ability>>> {
        self.entities.remove_ability(self.entity, id)
    }

    pub fn remove_all(&mut self) -> EcsResult<Vec<Box<dyn Ability>>> {
        self.entities.remove_all(self.entity)
    }

    pub fn view(&self) -> Option<EntityRef<'_>> {
        self.entities.entity(self.entity)
    }
}
