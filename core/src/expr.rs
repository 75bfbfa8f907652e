//! Arena-allocated expression trees.
//!
//! Every node carries its result [`Type`] alongside a closed [`ExprKind`].
//! Nodes are immutable once built and reference their operands as plain
//! shared references into the arena, so whole trees can be walked from
//! multiple threads without synchronization.

use karst_types::{HeapType, Type};

pub type ExprRef<'a> = &'a Expr<'a>;

#[derive(Debug)]
pub struct Expr<'a> {
    pub ty: Type,
    pub kind: ExprKind<'a>,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Literal {
    I32(i32),
    I64(i64),
    F32(f32),
    F64(f64),
}

/// The branch-on-condition operations. The cast variants carry the intended
/// heap type they test against; it is encoded in the binary format only when
/// the check is static (no RTT operand).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BrOnOp {
    Null,
    NonNull,
    Cast(HeapType),
    CastFail(HeapType),
}

#[derive(Debug, Clone, Copy)]
pub enum ExprKind<'a> {
    Nop,
    Unreachable,
    Block {
        children: &'a [ExprRef<'a>],
    },
    Loop {
        body: ExprRef<'a>,
    },
    If {
        condition: ExprRef<'a>,
        if_true: ExprRef<'a>,
        if_false: Option<ExprRef<'a>>,
    },
    Const(Literal),
    Drop {
        value: ExprRef<'a>,
    },
    Return {
        value: Option<ExprRef<'a>>,
    },
    Call {
        func: u32,
        operands: &'a [ExprRef<'a>],
    },
    CallIndirect {
        sig: HeapType,
        table: u32,
        operands: &'a [ExprRef<'a>],
        target: ExprRef<'a>,
    },
    LocalGet {
        index: u32,
    },
    /// Covers both plain sets (result type `None`) and tees (result type of
    /// the written local).
    LocalSet {
        index: u32,
        value: ExprRef<'a>,
    },
    GlobalGet {
        index: u32,
    },
    GlobalSet {
        index: u32,
        value: ExprRef<'a>,
    },
    RefNull,
    RefFunc {
        func: u32,
    },
    RttCanon,
    RttSub {
        parent: ExprRef<'a>,
    },
    StructNew {
        operands: &'a [ExprRef<'a>],
        rtt: Option<ExprRef<'a>>,
    },
    StructGet {
        field: u32,
        object: ExprRef<'a>,
    },
    StructSet {
        field: u32,
        object: ExprRef<'a>,
        value: ExprRef<'a>,
    },
    ArrayNew {
        init: Option<ExprRef<'a>>,
        size: ExprRef<'a>,
        rtt: Option<ExprRef<'a>>,
    },
    ArrayInit {
        values: &'a [ExprRef<'a>],
        rtt: Option<ExprRef<'a>>,
    },
    ArrayGet {
        object: ExprRef<'a>,
        index: ExprRef<'a>,
    },
    ArraySet {
        object: ExprRef<'a>,
        index: ExprRef<'a>,
        value: ExprRef<'a>,
    },
    RefTest {
        intended: HeapType,
        object: ExprRef<'a>,
        rtt: Option<ExprRef<'a>>,
    },
    RefCast {
        intended: HeapType,
        object: ExprRef<'a>,
        rtt: Option<ExprRef<'a>>,
    },
    BrOn {
        op: BrOnOp,
        object: ExprRef<'a>,
        rtt: Option<ExprRef<'a>>,
    },
}

impl<'a> Expr<'a> {
    /// Whether this node is a control-flow structure (its result type can be
    /// a tuple and is encoded as a block type in the binary format).
    pub fn is_control_flow(&self) -> bool {
        matches!(
            self.kind,
            ExprKind::Block { .. } | ExprKind::Loop { .. } | ExprKind::If { .. }
        )
    }

    /// Calls `f` on each direct operand, in operand order.
    pub fn for_each_child(&self, mut f: impl FnMut(ExprRef<'a>)) {
        match self.kind {
            ExprKind::Nop
            | ExprKind::Unreachable
            | ExprKind::Const(_)
            | ExprKind::LocalGet { .. }
            | ExprKind::GlobalGet { .. }
            | ExprKind::RefNull
            | ExprKind::RefFunc { .. }
            | ExprKind::RttCanon => {}
            ExprKind::Block { children } => {
                for &child in children {
                    f(child);
                }
            }
            ExprKind::Loop { body } => f(body),
            ExprKind::If {
                condition,
                if_true,
                if_false,
            } => {
                f(condition);
                f(if_true);
                if let Some(if_false) = if_false {
                    f(if_false);
                }
            }
            ExprKind::Drop { value } => f(value),
            ExprKind::Return { value } => {
                if let Some(value) = value {
                    f(value);
                }
            }
            ExprKind::Call { operands, .. } => {
                for &operand in operands {
                    f(operand);
                }
            }
            ExprKind::CallIndirect {
                operands, target, ..
            } => {
                for &operand in operands {
                    f(operand);
                }
                f(target);
            }
            ExprKind::LocalSet { value, .. } => f(value),
            ExprKind::GlobalSet { value, .. } => f(value),
            ExprKind::RttSub { parent } => f(parent),
            ExprKind::StructNew { operands, rtt } => {
                for &operand in operands {
                    f(operand);
                }
                if let Some(rtt) = rtt {
                    f(rtt);
                }
            }
            ExprKind::StructGet { object, .. } => f(object),
            ExprKind::StructSet { object, value, .. } => {
                f(object);
                f(value);
            }
            ExprKind::ArrayNew { init, size, rtt } => {
                if let Some(init) = init {
                    f(init);
                }
                f(size);
                if let Some(rtt) = rtt {
                    f(rtt);
                }
            }
            ExprKind::ArrayInit { values, rtt } => {
                for &value in values {
                    f(value);
                }
                if let Some(rtt) = rtt {
                    f(rtt);
                }
            }
            ExprKind::ArrayGet { object, index } => {
                f(object);
                f(index);
            }
            ExprKind::ArraySet {
                object,
                index,
                value,
            } => {
                f(object);
                f(index);
                f(value);
            }
            ExprKind::RefTest { object, rtt, .. } | ExprKind::RefCast { object, rtt, .. } => {
                f(object);
                if let Some(rtt) = rtt {
                    f(rtt);
                }
            }
            ExprKind::BrOn { object, rtt, .. } => {
                f(object);
                if let Some(rtt) = rtt {
                    f(rtt);
                }
            }
        }
    }
}
