//! Ошибки interaction core
//!
//! Две категории:
//! - `ConfigurationFault` — ловится при старте (валидация конфига/префабов), никогда посреди кадра
//! - `TransientPhysicsMismatch` — collaborator сослался на уже невалидный handle;
//!   controller логирует warning, дропает событие и продолжает кадр

use thiserror::Error;

use crate::interaction::{ObjectHandle, PrefabKind};

#[derive(Debug, Error, Clone, PartialEq)]
pub enum ConfigurationFault {
    #[error("prefab for {0} is not set")]
    MissingPrefab(PrefabKind),
    #[error("parameter `{name}` out of range ({value})")]
    InvalidParameter { name: &'static str, value: f32 },
    #[error("controller config parse error: {0}")]
    Parse(String),
}

#[derive(Debug, Error, Clone, Copy, PartialEq, Eq)]
pub enum TransientPhysicsMismatch {
    #[error("object {0} no longer exists")]
    StaleHandle(ObjectHandle),
    #[error("object {0} is not a carryable")]
    NotCarryable(ObjectHandle),
    #[error("object {0} is not a surface")]
    NotSurface(ObjectHandle),
}

impl TransientPhysicsMismatch {
    pub fn handle(&self) -> ObjectHandle {
        match *self {
            TransientPhysicsMismatch::StaleHandle(handle)
            | TransientPhysicsMismatch::NotCarryable(handle)
            | TransientPhysicsMismatch::NotSurface(handle) => handle,
        }
    }
}
