//! Karst - a WebAssembly-module IR and type-section layout toolkit
//!
//! # Overview
//!
//! Karst models the part of a WebAssembly compilation pipeline that sits
//! between a validated module and a binary encoder: a small read-only IR
//! (module declarations plus arena-allocated expression trees) and the pass
//! that decides the module's type-section layout. The pass discovers every
//! composite ("heap") type the module uses anywhere, saturates that set over
//! structural children, supertypes, and recursion groups, and assigns each
//! type its final serialization index.
//!
//! # Quick Start
//!
//! ```
//! use bumpalo::Bump;
//! use karst::{
//!     Builder, Field, Function, Module, TypeStore, TypeSystem, ValType,
//!     collect_heap_types, optimized_heap_type_indices,
//! };
//!
//! // Define the module's types.
//! let store = TypeStore::new(TypeSystem::Isorecursive);
//! let sig = store.signature(&[], &[]);
//! let point = store.struct_type(vec![
//!     Field::immutable(ValType::I32),
//!     Field::immutable(ValType::I32),
//! ]);
//!
//! // Build a function that allocates a point.
//! let arena = Bump::new();
//! let b = Builder::new(&arena);
//! let mut module = Module::new(store);
//! module.functions.push(Function {
//!     sig,
//!     vars: vec![],
//!     body: Some(b.drop(b.struct_new(point, &[b.i32_const(1), b.i32_const(2)], None))),
//! });
//!
//! // Collect the type universe and the final type-section layout.
//! let universe = collect_heap_types(&module);
//! assert_eq!(universe, vec![sig, point]);
//!
//! let indexed = optimized_heap_type_indices(&module);
//! assert_eq!(indexed.types.len(), 2);
//! assert_eq!(indexed.indices[&indexed.types[0]], 0);
//! ```
//!
//! # Determinism
//!
//! Function bodies are scanned in parallel, but results merge in declaration
//! order: the same module always produces the same layout, regardless of
//! worker count. Downstream encoders can rely on the returned indices being
//! final and contiguous.

// Re-export the public API from karst_core.
pub use karst_core::builder::Builder;
pub use karst_core::expr::{BrOnOp, Expr, ExprKind, ExprRef, Literal};
pub use karst_core::module::{ElementSegment, Function, Global, Module, Table, Tag};
pub use karst_core::type_collection::{
    IndexedHeapTypes, collect_heap_types, optimized_heap_type_indices,
};
pub use karst_core::{parallel, visitor};

// Re-export commonly used types.
pub use karst_types::{
    Composite, Field, HeapType, Mutability, RecGroup, RefType, Rtt, Storage, Type, TypeError,
    TypeStore, TypeSystem, ValType,
};
