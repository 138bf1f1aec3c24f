// src/lib.rs
//! 小さな ECS ランタイムだよ！
//!
//! - [`Entities`]: エンティティの作成・引退・再利用と、ランナーへの通知をまとめて面倒見る。
//! - [`Abilities`]: アビリティ (コンポーネント) の種類ごとの番号付けと、インスタンスの使い回し。
//! - [`Runner`]: 必要なアビリティを宣言して、条件を満たすエンティティを毎 tick 処理するシステム。
//!
//! ```
//! use ecs_ability_runner::{Abilities, Ability, Entities, Entity, Runner, Signature};
//!
//! #[derive(Debug, Default)]
//! struct Health(u32);
//! impl Ability for Health {}
//!
//! struct Regen;
//! impl Runner for Regen {
//!     fn setup(&mut self, signature: &mut Signature) {
//!         signature.add_id(ecs_ability_runner::AbilityId(0));
//!     }
//!     fn handle(&mut self, entity: Entity, entities: &mut Entities) {
//!         if let Some(health) = entities.get_mut::<Health>(entity, ecs_ability_runner::AbilityId(0)) {
//!             health.0 += 1;
//!         }
//!     }
//! }
//!
//! let mut abilities = Abilities::new();
//! let mut entities = Entities::new();
//! let regen = entities.add_runner(Regen);
//!
//! let hero = entities.create();
//! let health = abilities.create::<Health>();
//! let health_id = health.id();
//! entities.attach(hero, health).unwrap();
//!
//! entities.run();
//! assert_eq!(entities.get::<Health>(hero, health_id).map(|h| h.0), Some(1));
//! assert_eq!(entities.members(regen), vec![hero]);
//! ```
//!
//! シングルスレッド専用。通知もランナーの実行も全部その場で同期的に終わるよ。

pub mod config;
pub mod ecs;

pub use config::PoolConfig;
pub use ecs::{
    Abilities, Ability, AbilityId, EcsError, EcsResult, Entities, Entity, EntityMut, EntityRef,
    Membership, Pooled, Runner, RunnerId, Signature,
};
