//! Convenience constructors for arena-allocated expressions.
//!
//! The builder keeps call sites compact where trees are assembled by hand
//! (pipeline glue, tests); it adds no semantics of its own. Result types
//! follow the instruction: constructors that produce references derive the
//! type from the heap type they are given, the rest take the type
//! explicitly.

use bumpalo::Bump;
use karst_types::{HeapType, RefType, Rtt, Type, ValType};

use crate::expr::{BrOnOp, Expr, ExprKind, ExprRef, Literal};

#[derive(Clone, Copy)]
pub struct Builder<'a> {
    arena: &'a Bump,
}

impl<'a> Builder<'a> {
    pub fn new(arena: &'a Bump) -> Self {
        Self { arena }
    }

    pub fn expr(&self, ty: Type, kind: ExprKind<'a>) -> ExprRef<'a> {
        self.arena.alloc(Expr { ty, kind })
    }

    fn exprs(&self, exprs: &[ExprRef<'a>]) -> &'a [ExprRef<'a>] {
        self.arena.alloc_slice_copy(exprs)
    }

    pub fn nop(&self) -> ExprRef<'a> {
        self.expr(Type::None, ExprKind::Nop)
    }

    pub fn unreachable(&self) -> ExprRef<'a> {
        self.expr(Type::Unreachable, ExprKind::Unreachable)
    }

    pub fn block(&self, ty: Type, children: &[ExprRef<'a>]) -> ExprRef<'a> {
        self.expr(
            ty,
            ExprKind::Block {
                children: self.exprs(children),
            },
        )
    }

    pub fn loop_(&self, ty: Type, body: ExprRef<'a>) -> ExprRef<'a> {
        self.expr(ty, ExprKind::Loop { body })
    }

    pub fn if_(
        &self,
        ty: Type,
        condition: ExprRef<'a>,
        if_true: ExprRef<'a>,
        if_false: Option<ExprRef<'a>>,
    ) -> ExprRef<'a> {
        self.expr(
            ty,
            ExprKind::If {
                condition,
                if_true,
                if_false,
            },
        )
    }

    pub fn i32_const(&self, value: i32) -> ExprRef<'a> {
        self.expr(Type::Val(ValType::I32), ExprKind::Const(Literal::I32(value)))
    }

    pub fn drop(&self, value: ExprRef<'a>) -> ExprRef<'a> {
        self.expr(Type::None, ExprKind::Drop { value })
    }

    pub fn call_indirect(
        &self,
        sig: HeapType,
        table: u32,
        operands: &[ExprRef<'a>],
        target: ExprRef<'a>,
        ty: Type,
    ) -> ExprRef<'a> {
        self.expr(
            ty,
            ExprKind::CallIndirect {
                sig,
                table,
                operands: self.exprs(operands),
                target,
            },
        )
    }

    pub fn local_get(&self, index: u32, ty: Type) -> ExprRef<'a> {
        self.expr(ty, ExprKind::LocalGet { index })
    }

    pub fn local_set(&self, index: u32, value: ExprRef<'a>) -> ExprRef<'a> {
        self.expr(Type::None, ExprKind::LocalSet { index, value })
    }

    /// A tee: writes the local and yields the written value.
    pub fn local_tee(&self, index: u32, value: ExprRef<'a>, ty: Type) -> ExprRef<'a> {
        self.expr(ty, ExprKind::LocalSet { index, value })
    }

    pub fn ref_null(&self, heap: HeapType) -> ExprRef<'a> {
        self.expr(
            Type::Val(ValType::Ref(RefType::nullable(heap))),
            ExprKind::RefNull,
        )
    }

    pub fn ref_func(&self, func: u32, sig: HeapType) -> ExprRef<'a> {
        self.expr(
            Type::Val(ValType::Ref(RefType::non_nullable(sig))),
            ExprKind::RefFunc { func },
        )
    }

    pub fn rtt_canon(&self, heap: HeapType) -> ExprRef<'a> {
        self.expr(
            Type::Val(ValType::Rtt(Rtt {
                depth: Some(0),
                heap,
            })),
            ExprKind::RttCanon,
        )
    }

    pub fn rtt_sub(&self, heap: HeapType, depth: u32, parent: ExprRef<'a>) -> ExprRef<'a> {
        self.expr(
            Type::Val(ValType::Rtt(Rtt {
                depth: Some(depth),
                heap,
            })),
            ExprKind::RttSub { parent },
        )
    }

    pub fn struct_new(
        &self,
        heap: HeapType,
        operands: &[ExprRef<'a>],
        rtt: Option<ExprRef<'a>>,
    ) -> ExprRef<'a> {
        self.expr(
            Type::Val(ValType::Ref(RefType::non_nullable(heap))),
            ExprKind::StructNew {
                operands: self.exprs(operands),
                rtt,
            },
        )
    }

    pub fn struct_get(&self, field: u32, object: ExprRef<'a>, ty: Type) -> ExprRef<'a> {
        self.expr(ty, ExprKind::StructGet { field, object })
    }

    pub fn struct_set(&self, field: u32, object: ExprRef<'a>, value: ExprRef<'a>) -> ExprRef<'a> {
        self.expr(
            Type::None,
            ExprKind::StructSet {
                field,
                object,
                value,
            },
        )
    }

    pub fn array_new(
        &self,
        heap: HeapType,
        init: Option<ExprRef<'a>>,
        size: ExprRef<'a>,
        rtt: Option<ExprRef<'a>>,
    ) -> ExprRef<'a> {
        self.expr(
            Type::Val(ValType::Ref(RefType::non_nullable(heap))),
            ExprKind::ArrayNew { init, size, rtt },
        )
    }

    pub fn ref_test(
        &self,
        intended: HeapType,
        object: ExprRef<'a>,
        rtt: Option<ExprRef<'a>>,
    ) -> ExprRef<'a> {
        self.expr(
            Type::Val(ValType::I32),
            ExprKind::RefTest {
                intended,
                object,
                rtt,
            },
        )
    }

    pub fn ref_cast(
        &self,
        intended: HeapType,
        object: ExprRef<'a>,
        rtt: Option<ExprRef<'a>>,
    ) -> ExprRef<'a> {
        self.expr(
            Type::Val(ValType::Ref(RefType::non_nullable(intended))),
            ExprKind::RefCast {
                intended,
                object,
                rtt,
            },
        )
    }

    pub fn br_on(
        &self,
        op: BrOnOp,
        object: ExprRef<'a>,
        rtt: Option<ExprRef<'a>>,
        ty: Type,
    ) -> ExprRef<'a> {
        self.expr(ty, ExprKind::BrOn { op, object, rtt })
    }
}
