// src/config/mod.rs

pub mod pool;

pub use pool::PoolConfig;
