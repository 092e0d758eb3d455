use std::collections::HashMap;
use std::str::FromStr;

use kinded::Kinded;
use serde::{Deserialize, Serialize};
use strum_macros::EnumString;
use variantly::Variantly;

use crate::types::{EntityHandle, EntityIndex, Tick, WardType};

/// A single decoded entity property value.
///
/// Vectors, nulls and any other shape the extractor has no typed reading for
/// land in `Other` and read as absent through the typed accessors.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Variantly, Kinded)]
#[serde(untagged)]
#[kinded(derive(Serialize))]
pub enum FieldValue {
    Bool(bool),
    Uint(u64),
    Int(i64),
    Float(f32),
    Str(String),
    Other(serde_json::Value),
}

impl FieldValue {
    /// Integer view regardless of the signedness the decoder picked.
    pub fn as_i64(&self) -> Option<i64> {
        self.int_ref()
            .copied()
            .or_else(|| self.uint_ref().and_then(|v| i64::try_from(*v).ok()))
    }

    pub fn as_u64(&self) -> Option<u64> {
        self.uint_ref()
            .copied()
            .or_else(|| self.int_ref().and_then(|v| u64::try_from(*v).ok()))
    }

    pub fn as_f32(&self) -> Option<f32> {
        match self {
            FieldValue::Float(v) => Some(*v),
            FieldValue::Int(v) => Some(*v as f32),
            FieldValue::Uint(v) => Some(*v as f32),
            _ => None,
        }
    }
}

impl From<i64> for FieldValue {
    fn from(v: i64) -> Self {
        FieldValue::Int(v)
    }
}

impl From<i32> for FieldValue {
    fn from(v: i32) -> Self {
        FieldValue::Int(v as i64)
    }
}

impl From<u64> for FieldValue {
    fn from(v: u64) -> Self {
        FieldValue::Uint(v)
    }
}

impl From<u32> for FieldValue {
    fn from(v: u32) -> Self {
        FieldValue::Uint(v as u64)
    }
}

impl From<f32> for FieldValue {
    fn from(v: f32) -> Self {
        FieldValue::Float(v)
    }
}

impl From<f64> for FieldValue {
    fn from(v: f64) -> Self {
        FieldValue::Float(v as f32)
    }
}

impl From<bool> for FieldValue {
    fn from(v: bool) -> Self {
        FieldValue::Bool(v)
    }
}

impl From<&str> for FieldValue {
    fn from(v: &str) -> Self {
        FieldValue::Str(v.to_string())
    }
}

/// Field values keyed by dotted property path, e.g. `CBodyComponent.m_cellX`.
pub type FieldMap = HashMap<String, FieldValue>;

/// Read-only typed access to an entity's properties.
pub trait FieldSnapshot {
    fn field(&self, path: &str) -> Option<&FieldValue>;

    fn get_i64(&self, path: &str) -> Option<i64> {
        self.field(path).and_then(FieldValue::as_i64)
    }

    fn get_u64(&self, path: &str) -> Option<u64> {
        self.field(path).and_then(FieldValue::as_u64)
    }

    fn get_f32(&self, path: &str) -> Option<f32> {
        self.field(path).and_then(FieldValue::as_f32)
    }
}

impl FieldSnapshot for FieldMap {
    fn field(&self, path: &str) -> Option<&FieldValue> {
        self.get(path)
    }
}

/// Entity classes the extractor cares about. Anything else is ignored at
/// ingestion and never reaches the ward logic as a string.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, EnumString)]
pub enum EntityClass {
    #[strum(serialize = "CDOTA_NPC_Observer_Ward")]
    ObserverWard,
    #[strum(serialize = "CDOTA_NPC_Sentry_Ward")]
    SentryWard,
    #[strum(serialize = "CDOTA_PlayerResource")]
    PlayerResource,
}

impl EntityClass {
    pub fn recognize(class_name: &str) -> Option<EntityClass> {
        EntityClass::from_str(class_name).ok()
    }

    pub fn ward_type(self) -> Option<WardType> {
        match self {
            EntityClass::ObserverWard => Some(WardType::Observer),
            EntityClass::SentryWard => Some(WardType::Sentry),
            EntityClass::PlayerResource => None,
        }
    }
}

#[allow(dead_code)]
mod ops {
    use modular_bitfield::prelude::*;

    /// Lifecycle flags attached to an entity notification. Several may be
    /// set at once, e.g. created and entered.
    #[bitfield]
    #[derive(Debug, Clone, Copy, PartialEq, Eq)]
    pub struct EntityOps {
        pub created: bool,
        pub updated: bool,
        pub deleted: bool,
        pub entered: bool,
        pub left: bool,
        #[skip]
        __: B3,
    }
}
pub use ops::EntityOps;

impl Default for EntityOps {
    fn default() -> Self {
        EntityOps::new()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EntityOp {
    Created,
    Updated,
    Deleted,
    Entered,
    Left,
}

/// The lifecycle phase an event is dispatched on.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Lifecycle {
    Created,
    Updated,
    Deleted,
}

impl EntityOps {
    pub fn with_op(self, op: EntityOp) -> Self {
        match op {
            EntityOp::Created => self.with_created(true),
            EntityOp::Updated => self.with_updated(true),
            EntityOp::Deleted => self.with_deleted(true),
            EntityOp::Entered => self.with_entered(true),
            EntityOp::Left => self.with_left(true),
        }
    }

    /// Creation wins over deletion, deletion over update. Pure enter/leave
    /// notifications carry no lifecycle phase.
    pub fn phase(&self) -> Option<Lifecycle> {
        if self.created() {
            Some(Lifecycle::Created)
        } else if self.deleted() {
            Some(Lifecycle::Deleted)
        } else if self.updated() {
            Some(Lifecycle::Updated)
        } else {
            None
        }
    }
}

impl FromIterator<EntityOp> for EntityOps {
    fn from_iter<T: IntoIterator<Item = EntityOp>>(iter: T) -> Self {
        iter.into_iter()
            .fold(EntityOps::new(), |ops, op| ops.with_op(op))
    }
}

/// Current state of one entity in the universe table.
#[derive(Debug, Clone)]
pub struct Entity {
    index: EntityIndex,
    serial: u32,
    class_name: String,
    class: Option<EntityClass>,
    fields: FieldMap,
}

impl Entity {
    pub fn new(index: EntityIndex, serial: u32, class_name: impl Into<String>) -> Self {
        let class_name = class_name.into();
        Self {
            index,
            serial,
            class: EntityClass::recognize(&class_name),
            class_name,
            fields: FieldMap::new(),
        }
    }

    pub fn with_field(mut self, path: &str, value: impl Into<FieldValue>) -> Self {
        self.fields.insert(path.to_string(), value.into());
        self
    }

    pub fn index(&self) -> EntityIndex {
        self.index
    }

    pub fn serial(&self) -> u32 {
        self.serial
    }

    pub fn class_name(&self) -> &str {
        &self.class_name
    }

    pub fn class(&self) -> Option<EntityClass> {
        self.class
    }

    pub fn fields(&self) -> &FieldMap {
        &self.fields
    }

    /// Composite serial/index handle of this entity.
    pub fn handle(&self) -> EntityHandle {
        EntityHandle::composite(self.index, self.serial)
    }

    pub(crate) fn merge_fields(&mut self, fields: &FieldMap) {
        self.fields
            .extend(fields.iter().map(|(k, v)| (k.clone(), v.clone())));
    }
}

impl FieldSnapshot for Entity {
    fn field(&self, path: &str) -> Option<&FieldValue> {
        self.fields.get(path)
    }
}

/// One lifecycle notification from the replay decoder.
///
/// `class_name` and `serial` are only meaningful on creation; updates and
/// deletions carry the changed fields only.
#[derive(Debug, Clone, Deserialize)]
#[serde(from = "RawEntityEvent")]
pub struct EntityEvent {
    pub tick: Tick,
    pub ops: EntityOps,
    pub index: EntityIndex,
    pub serial: u32,
    pub class_name: Option<String>,
    pub fields: FieldMap,
}

#[derive(Deserialize)]
struct RawEntityEvent {
    tick: u32,
    op: Vec<EntityOp>,
    index: u32,
    #[serde(default)]
    serial: u32,
    #[serde(default)]
    class: Option<String>,
    #[serde(default)]
    fields: FieldMap,
}

impl From<RawEntityEvent> for EntityEvent {
    fn from(raw: RawEntityEvent) -> Self {
        Self {
            tick: Tick(raw.tick),
            ops: raw.op.into_iter().collect(),
            index: EntityIndex(raw.index),
            serial: raw.serial,
            class_name: raw.class,
            fields: raw.fields,
        }
    }
}

impl EntityEvent {
    pub fn new(tick: u32, ops: EntityOps, index: u32) -> Self {
        Self {
            tick: Tick(tick),
            ops,
            index: EntityIndex(index),
            serial: 0,
            class_name: None,
            fields: FieldMap::new(),
        }
    }

    pub fn created(tick: u32, index: u32, class_name: &str) -> Self {
        let mut event = Self::new(tick, EntityOps::new().with_created(true), index);
        event.class_name = Some(class_name.to_string());
        event
    }

    pub fn updated(tick: u32, index: u32) -> Self {
        Self::new(tick, EntityOps::new().with_updated(true), index)
    }

    pub fn deleted(tick: u32, index: u32) -> Self {
        Self::new(tick, EntityOps::new().with_deleted(true), index)
    }

    pub fn with_serial(mut self, serial: u32) -> Self {
        self.serial = serial;
        self
    }

    pub fn with_field(mut self, path: &str, value: impl Into<FieldValue>) -> Self {
        self.fields.insert(path.to_string(), value.into());
        self
    }

    pub fn phase(&self) -> Option<Lifecycle> {
        self.ops.phase()
    }
}
