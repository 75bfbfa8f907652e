//! Expression-tree traversal.
//!
//! [`walk_expr`] performs an iterative post-order walk: every operand is
//! visited before its parent, operands in operand order. Passes that only
//! care about "each node once" get a deterministic visit order for free,
//! which matters whenever visit order feeds into output ordering.

use smallvec::SmallVec;

use crate::expr::ExprRef;
use crate::module::Module;

pub trait Visitor<'a> {
    fn visit_expr(&mut self, expr: ExprRef<'a>);
}

/// Walks the tree rooted at `root` in post order.
pub fn walk_expr<'a, V: Visitor<'a>>(visitor: &mut V, root: ExprRef<'a>) {
    // Frames are (node, children_done); a node is emitted on its second pop.
    let mut stack: Vec<(ExprRef<'a>, bool)> = vec![(root, false)];
    while let Some((expr, children_done)) = stack.pop() {
        if children_done {
            visitor.visit_expr(expr);
            continue;
        }
        stack.push((expr, true));
        let mut children: SmallVec<[ExprRef<'a>; 8]> = SmallVec::new();
        expr.for_each_child(|child| children.push(child));
        // Reversed so the first operand is popped (and thus visited) first.
        for &child in children.iter().rev() {
            stack.push((child, false));
        }
    }
}

/// Walks all module-level code: global initializers and element-segment
/// offsets and items, in declaration order.
pub fn walk_module_code<'a, V: Visitor<'a>>(visitor: &mut V, module: &Module<'a>) {
    for global in &module.globals {
        if let Some(init) = global.init {
            walk_expr(visitor, init);
        }
    }
    for segment in &module.element_segments {
        if let Some(offset) = segment.offset {
            walk_expr(visitor, offset);
        }
        for &item in &segment.items {
            walk_expr(visitor, item);
        }
    }
}
