//! The module: the unit a pass operates on.
//!
//! A module owns its [`TypeStore`] and its declarations; expression trees
//! live in a caller-owned arena and are referenced from functions, globals,
//! and element segments. Passes receive `&Module` and never mutate it.

use karst_types::{HeapType, Mutability, RefType, TypeStore, ValType};

use crate::expr::ExprRef;

pub struct Module<'a> {
    pub store: TypeStore,
    pub functions: Vec<Function<'a>>,
    pub tags: Vec<Tag>,
    pub tables: Vec<Table>,
    pub element_segments: Vec<ElementSegment<'a>>,
    pub globals: Vec<Global<'a>>,
}

impl<'a> Module<'a> {
    pub fn new(store: TypeStore) -> Self {
        Self {
            store,
            functions: Vec::new(),
            tags: Vec::new(),
            tables: Vec::new(),
            element_segments: Vec::new(),
            globals: Vec::new(),
        }
    }
}

pub struct Function<'a> {
    /// The declared signature type.
    pub sig: HeapType,
    /// Declared non-parameter locals.
    pub vars: Vec<ValType>,
    /// `None` for imported functions.
    pub body: Option<ExprRef<'a>>,
}

impl Function<'_> {
    pub fn imported(&self) -> bool {
        self.body.is_none()
    }
}

pub struct Tag {
    pub sig: HeapType,
}

pub struct Table {
    pub elem: RefType,
}

pub struct ElementSegment<'a> {
    pub elem: RefType,
    /// `None` for passive segments.
    pub offset: Option<ExprRef<'a>>,
    pub items: Vec<ExprRef<'a>>,
}

pub struct Global<'a> {
    pub ty: ValType,
    pub mutability: Mutability,
    /// `None` for imported globals.
    pub init: Option<ExprRef<'a>>,
}
