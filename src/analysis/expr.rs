//! Expression tree definitions.

use crate::types::{PrimitiveType, Value};

use super::arithmetic::ArithmeticOp;
use super::predicate::{ComparisonOp, LogicalOp};

/// Variant-specific part of an expression node.
#[derive(Debug, Clone)]
pub enum ExprKind {
    /// Typed constant. Built only by [`super::literal::create`].
    Literal(Value),

    /// Reference to a column of the input row.
    SlotRef { name: String },

    /// Type conversion of the single child.
    ///
    /// Implicit casts are inserted by the analyzer and render as their child.
    Cast {
        target: PrimitiveType,
        implicit: bool,
    },

    /// Arithmetic or bitwise operation (one or two children).
    Arithmetic(ArithmeticOp),

    /// Binary comparison (two children).
    BinaryPredicate(ComparisonOp),

    /// AND/OR (two children) or NOT (one child).
    CompoundPredicate(LogicalOp),

    /// IS NULL / IS NOT NULL.
    IsNullPredicate { negated: bool },

    /// CASE expression.
    ///
    /// Children are laid out as `[case_expr] (when then)+ [else]`.
    Case { has_case_expr: bool, has_else: bool },
}

impl PartialEq for ExprKind {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (ExprKind::Literal(a), ExprKind::Literal(b)) => a == b,
            (ExprKind::SlotRef { name: a }, ExprKind::SlotRef { name: b }) => {
                a.eq_ignore_ascii_case(b)
            }
            // an implicit and an explicit cast to the same type are the same conversion
            (ExprKind::Cast { target: a, .. }, ExprKind::Cast { target: b, .. }) => a == b,
            (ExprKind::Arithmetic(a), ExprKind::Arithmetic(b)) => a == b,
            (ExprKind::BinaryPredicate(a), ExprKind::BinaryPredicate(b)) => a == b,
            (ExprKind::CompoundPredicate(a), ExprKind::CompoundPredicate(b)) => a == b,
            (
                ExprKind::IsNullPredicate { negated: a },
                ExprKind::IsNullPredicate { negated: b },
            ) => a == b,
            (
                ExprKind::Case {
                    has_case_expr: a_case,
                    has_else: a_else,
                },
                ExprKind::Case {
                    has_case_expr: b_case,
                    has_else: b_else,
                },
            ) => a_case == b_case && a_else == b_else,
            _ => false,
        }
    }
}

/// Expression node.
///
/// A node exclusively owns its children. It starts out with an `INVALID`
/// type, receives its resolved type exactly once during analysis and is
/// treated as immutable afterwards.
#[derive(Debug, Clone)]
pub struct Expr {
    pub(super) kind: ExprKind,
    pub(super) children: Vec<Expr>,
    pub(super) ty: PrimitiveType,
    pub(super) parenthesized: bool,
}

/// Structural equality: same variant, same variant payload, equal children.
///
/// Resolved types and source parentheses are ignored.
impl PartialEq for Expr {
    fn eq(&self, other: &Self) -> bool {
        self.kind == other.kind && self.children == other.children
    }
}

impl Expr {
    pub(crate) fn new(kind: ExprKind, children: Vec<Expr>) -> Self {
        Expr {
            kind,
            children,
            ty: PrimitiveType::Invalid,
            parenthesized: false,
        }
    }

    /// Creates an unresolved column reference.
    #[must_use]
    pub fn slot_ref(name: impl Into<String>) -> Self {
        Expr::new(ExprKind::SlotRef { name: name.into() }, Vec::new())
    }

    /// Creates a column reference already resolved by the statement analyzer.
    ///
    /// # Panics
    ///
    /// Panics if `ty` is the invalid sentinel.
    #[must_use]
    pub fn typed_slot_ref(name: impl Into<String>, ty: PrimitiveType) -> Self {
        assert!(ty.is_valid(), "resolved slot must have a valid type");
        let mut expr = Expr::slot_ref(name);
        expr.ty = ty;
        expr
    }

    /// Creates an arithmetic expression.
    ///
    /// # Panics
    ///
    /// Panics unless `rhs` is present exactly when `op` is a binary operator.
    #[must_use]
    pub fn arithmetic(op: ArithmeticOp, lhs: Expr, rhs: Option<Expr>) -> Self {
        assert!(
            op.is_unary() == rhs.is_none(),
            "operator {} takes {} operand(s)",
            op.as_str(),
            if op.is_unary() { 1 } else { 2 }
        );
        let mut children = vec![lhs];
        children.extend(rhs);
        Expr::new(ExprKind::Arithmetic(op), children)
    }

    /// Shorthand for a unary [`Expr::arithmetic`].
    #[must_use]
    pub fn unary(op: ArithmeticOp, operand: Expr) -> Self {
        Expr::arithmetic(op, operand, None)
    }

    /// Shorthand for a binary [`Expr::arithmetic`].
    #[must_use]
    pub fn binary(op: ArithmeticOp, lhs: Expr, rhs: Expr) -> Self {
        Expr::arithmetic(op, lhs, Some(rhs))
    }

    /// Creates a binary comparison.
    #[must_use]
    pub fn comparison(op: ComparisonOp, lhs: Expr, rhs: Expr) -> Self {
        Expr::new(ExprKind::BinaryPredicate(op), vec![lhs, rhs])
    }

    /// Creates a logical AND.
    #[must_use]
    pub fn and(lhs: Expr, rhs: Expr) -> Self {
        Expr::new(ExprKind::CompoundPredicate(LogicalOp::And), vec![lhs, rhs])
    }

    /// Creates a logical OR.
    #[must_use]
    pub fn or(lhs: Expr, rhs: Expr) -> Self {
        Expr::new(ExprKind::CompoundPredicate(LogicalOp::Or), vec![lhs, rhs])
    }

    /// Creates a logical NOT.
    #[must_use]
    pub fn not(operand: Expr) -> Self {
        Expr::new(ExprKind::CompoundPredicate(LogicalOp::Not), vec![operand])
    }

    /// Creates an IS NULL (or IS NOT NULL when `negated`) predicate.
    #[must_use]
    pub fn is_null(operand: Expr, negated: bool) -> Self {
        Expr::new(ExprKind::IsNullPredicate { negated }, vec![operand])
    }

    /// Marks the expression as written inside parentheses in the source.
    #[must_use]
    pub fn parenthesized(mut self) -> Self {
        self.parenthesized = true;
        self
    }

    #[must_use]
    pub fn kind(&self) -> &ExprKind {
        &self.kind
    }

    #[must_use]
    pub fn children(&self) -> &[Expr] {
        &self.children
    }

    /// Returns the child at `index`.
    ///
    /// # Panics
    ///
    /// Panics if `index` is out of bounds.
    #[must_use]
    pub fn child(&self, index: usize) -> &Expr {
        &self.children[index]
    }

    /// Returns the resolved type, `INVALID` before analysis.
    #[must_use]
    pub fn ty(&self) -> PrimitiveType {
        self.ty
    }

    #[must_use]
    pub fn is_analyzed(&self) -> bool {
        self.ty.is_valid()
    }

    #[must_use]
    pub fn is_parenthesized(&self) -> bool {
        self.parenthesized
    }

    /// Returns the literal value if this is a literal node.
    #[must_use]
    pub fn literal_value(&self) -> Option<&Value> {
        match &self.kind {
            ExprKind::Literal(value) => Some(value),
            _ => None,
        }
    }

    /// Returns true for casts inserted by the analyzer.
    #[must_use]
    pub fn is_implicit_cast(&self) -> bool {
        matches!(self.kind, ExprKind::Cast { implicit: true, .. })
    }

    /// Returns the number of nodes in the tree rooted here.
    #[must_use]
    pub fn node_count(&self) -> usize {
        1 + self.children.iter().map(Expr::node_count).sum::<usize>()
    }

    pub(crate) fn children_mut(&mut self) -> &mut [Expr] {
        &mut self.children
    }

    pub(crate) fn set_type(&mut self, ty: PrimitiveType) {
        self.ty = ty;
    }

    /// Wraps the child at `index` in an implicit cast to `target`.
    ///
    /// Does nothing when the child already has type `target`, so running it
    /// over an analyzed tree leaves the tree unchanged.
    ///
    /// # Panics
    ///
    /// Panics if the child is unanalyzed, `target` is invalid, or `index` is
    /// out of bounds.
    pub fn cast_child(&mut self, index: usize, target: PrimitiveType) {
        assert!(target.is_valid(), "implicit cast to INVALID in: {}", self.to_sql());
        let from = self.children[index].ty;
        if from == target {
            return;
        }
        tracing::debug!(
            child = %self.children[index].to_sql(),
            %from,
            to = %target,
            "inserting implicit cast"
        );
        let child = self.children.remove(index);
        self.children.insert(index, Expr::implicit_cast(child, target));
    }

    /// Casts every child whose type differs from `target`.
    pub fn cast_children_to(&mut self, target: PrimitiveType) {
        for index in 0..self.children.len() {
            self.cast_child(index, target);
        }
    }

    /// Renders the expression as canonical SQL text.
    #[must_use]
    pub fn to_sql(&self) -> String {
        let sql = match &self.kind {
            ExprKind::Literal(value) => value.to_sql(),
            ExprKind::SlotRef { name } => name.clone(),
            ExprKind::Cast { implicit: true, .. } => self.child(0).to_sql(),
            ExprKind::Cast { target, .. } => {
                format!("CAST({} AS {})", self.child(0).to_sql(), target.name())
            }
            ExprKind::Arithmetic(op) => {
                if self.children.len() == 1 {
                    format!("{} {}", op.as_str(), self.child(0).to_sql())
                } else {
                    assert_eq!(self.children.len(), 2, "binary operator {}", op.as_str());
                    format!(
                        "{} {} {}",
                        self.child(0).to_sql(),
                        op.as_str(),
                        self.child(1).to_sql()
                    )
                }
            }
            ExprKind::BinaryPredicate(op) => format!(
                "{} {} {}",
                self.child(0).to_sql(),
                op.as_str(),
                self.child(1).to_sql()
            ),
            ExprKind::CompoundPredicate(LogicalOp::Not) => {
                format!("NOT {}", self.child(0).to_sql())
            }
            ExprKind::CompoundPredicate(op) => format!(
                "{} {} {}",
                self.child(0).to_sql(),
                op.as_str(),
                self.child(1).to_sql()
            ),
            ExprKind::IsNullPredicate { negated } => format!(
                "{} IS {}NULL",
                self.child(0).to_sql(),
                if *negated { "NOT " } else { "" }
            ),
            ExprKind::Case {
                has_case_expr,
                has_else,
            } => self.case_to_sql(*has_case_expr, *has_else),
        };
        if self.parenthesized {
            format!("({sql})")
        } else {
            sql
        }
    }
}

impl std::fmt::Display for Expr {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.to_sql())
    }
}
