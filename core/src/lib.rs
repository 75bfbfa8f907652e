//! Karst core: the module IR and the passes that run over it.
//!
//! The IR is deliberately small: a [`module::Module`] owns its type store and
//! its declarations, expression trees live in a caller-owned `bumpalo` arena,
//! and everything a pass needs is reachable through shared references. Passes
//! never mutate the module.
//!
//! The one pass implemented here is [`type_collection`]: discovering every
//! heap type a module uses and assigning each one its final type-section
//! index.

pub mod builder;
pub mod expr;
pub mod module;
pub mod parallel;
pub mod type_collection;
pub mod visitor;
