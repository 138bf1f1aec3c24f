// src/ecs/ability.rs

// serde は AbilityId を Entity と同じようにシリアライズできるようにするため！
use serde::{Deserialize, Serialize};
// Any と TypeId は「具体的な型」を実行時に区別するために使うよ。
use std::any::{Any, TypeId};
use std::fmt;

/// アビリティの種類 (kind) ごとに振られる番号だよ！🔢
///
/// `Abilities` プールが、ある種類を初めて見たときに 0, 1, 2... と連番で割り当てる。
/// 一度割り当てた番号は変わらないし、他の種類に使い回されることもないよ。
/// エンティティのスロット番号と、ランナーの必要アビリティ集合の両方で使う共通の鍵！🔑
#[derive(
    PartialEq, Eq, PartialOrd, Ord, Hash, Clone, Copy, Debug, Serialize, Deserialize,
)]
pub struct AbilityId(pub usize);

impl AbilityId {
    /// スロットテーブルのインデックスとして使うときの値。
    pub fn index(self) -> usize {
        self.0
    }
}

impl fmt::Display for AbilityId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "ability#{}", self.0)
    }
}

/// 型消去された値を `Any` として扱うためのヘルパートレイト。
/// 全部の `'static` な型に自動で実装されるから、自分で実装する必要はないよ。
pub trait AsAny: Any {
    fn as_any(&self) -> &dyn Any;
    fn as_any_mut(&mut self) -> &mut dyn Any;
    fn into_any(self: Box<Self>) -> Box<dyn Any>;
    /// 具体的な型の名前 (ログ用)。
    fn kind_name(&self) -> &'static str;
}

impl<T: Any> AsAny for T {
    fn as_any(&self) -> &dyn Any {
        self
    }

    fn as_any_mut(&mut self) -> &mut dyn Any {
        self
    }

    fn into_any(self: Box<Self>) -> Box<dyn Any> {
        self
    }

    fn kind_name(&self) -> &'static str {
        std::any::type_name::<T>()
    }
}

/// Ability（アビリティ）トレイトだよ！エンティティにくっつけるデータの塊のこと。
///
/// 中身は空のマーカートレイト。`impl Ability for Health {}` って書くだけで、
/// その型をエンティティに付けられるようになるよ！✨
///
/// 注意: `Abilities` プールから再利用されたインスタンスは、前に使われていたときの
/// フィールド値がそのまま残ってる！リセットは使う側の責任だよ。⚠️
pub trait Ability: AsAny + fmt::Debug {}

impl dyn Ability {
    /// 中身の具体的な型の `TypeId`。プールのキューを選ぶのに使う。
    pub fn kind(&self) -> TypeId {
        self.as_any().type_id()
    }

    pub fn is<T: Ability>(&self) -> bool {
        self.as_any().is::<T>()
    }

    /// 具体的な型に絞り込む。型が違えば `None`。
    pub fn downcast_ref<T: Ability>(&self) -> Option<&T> {
        self.as_any().downcast_ref::<T>()
    }

    pub fn downcast_mut<T: Ability>(&mut self) -> Option<&mut T> {
        self.as_any_mut().downcast_mut::<T>()
    }

    /// `Box<dyn Ability>` を `Box<T>` に戻す。型が違うときは元の箱をそのまま返すよ。
    pub fn downcast<T: Ability>(self: Box<Self>) -> Result<Box<T>, Box<dyn Ability>> {
        if self.is::<T>() {
            match self.into_any().downcast::<T>() {
                Ok(ability) => Ok(ability),
                // is::<T>() で確認済みなのでここには来ない
                Err(_) => unreachable!("type checked by is::<T>() above"),
            }
        } else {
            Err(self)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Debug, Default, PartialEq)]
    struct Health(u32);
    impl Ability for Health {}

    #[derive(Debug, Default, PartialEq)]
    struct Speed(f32);
    impl Ability for Speed {}

    #[test]
    fn narrowing_to_the_right_kind_succeeds() {
        let mut boxed: Box<dyn Ability> = Box::new(Health(10));

        assert!(boxed.is::<Health>());
        assert_eq!(boxed.downcast_ref::<Health>(), Some(&Health(10)));
        boxed.downcast_mut::<Health>().expect("should be Health").0 += 5;
        assert_eq!(boxed.downcast_ref::<Health>(), Some(&Health(15)));
        assert_eq!(boxed.kind(), TypeId::of::<Health>());
        assert!((*boxed).kind_name().ends_with("Health"));
    }

    #[test]
    fn narrowing_to_the_wrong_kind_is_absent() {
        let boxed: Box<dyn Ability> = Box::new(Speed(1.5));

        assert!(!boxed.is::<Health>());
        assert_eq!(boxed.downcast_ref::<Health>(), None);

        // 失敗しても箱は返ってくる
        let back = boxed.downcast::<Health>().expect_err("Speed is not Health");
        let speed = back.downcast::<Speed>().expect("but it is still Speed");
        assert_eq!(*speed, Speed(1.5));
    }

    #[test]
    fn ability_id_displays_its_index() {
        assert_eq!(AbilityId(3).to_string(), "ability#3");
        assert_eq!(AbilityId(3).index(), 3);
    }
}
