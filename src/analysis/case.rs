//! CASE expressions.

use crate::error::AnalysisError;
use crate::types::{assignment_compatible_type, PrimitiveType};

use super::analyzer::Resolution;
use super::expr::{Expr, ExprKind};

/// One `WHEN condition THEN result` branch.
#[derive(Debug, Clone, PartialEq)]
pub struct CaseWhenClause {
    when: Expr,
    then: Expr,
}

impl CaseWhenClause {
    #[must_use]
    pub fn new(when: Expr, then: Expr) -> Self {
        CaseWhenClause { when, then }
    }

    #[must_use]
    pub fn when_expr(&self) -> &Expr {
        &self.when
    }

    #[must_use]
    pub fn then_expr(&self) -> &Expr {
        &self.then
    }
}

impl Expr {
    /// Creates `CASE [case_expr] WHEN .. THEN .. [ELSE else_expr] END`.
    ///
    /// # Panics
    ///
    /// Panics if `clauses` is empty.
    #[must_use]
    pub fn case(
        case_expr: Option<Expr>,
        clauses: Vec<CaseWhenClause>,
        else_expr: Option<Expr>,
    ) -> Self {
        assert!(!clauses.is_empty(), "CASE requires at least one WHEN clause");
        let kind = ExprKind::Case {
            has_case_expr: case_expr.is_some(),
            has_else: else_expr.is_some(),
        };
        let mut children = Vec::with_capacity(clauses.len() * 2 + 2);
        children.extend(case_expr);
        for clause in clauses {
            children.push(clause.when);
            children.push(clause.then);
        }
        children.extend(else_expr);
        Expr::new(kind, children)
    }

    pub(super) fn case_to_sql(&self, has_case_expr: bool, has_else: bool) -> String {
        let layout = CaseLayout::new(has_case_expr, has_else, self.children.len());
        let mut sql = String::from("CASE");
        if has_case_expr {
            sql.push(' ');
            sql.push_str(&self.child(0).to_sql());
        }
        for pair in self.children[layout.clauses()].chunks(2) {
            sql.push_str(&format!(
                " WHEN {} THEN {}",
                pair[0].to_sql(),
                pair[1].to_sql()
            ));
        }
        if has_else {
            sql.push_str(" ELSE ");
            sql.push_str(&self.child(layout.len - 1).to_sql());
        }
        sql.push_str(" END");
        sql
    }
}

/// Child positions of a CASE node.
struct CaseLayout {
    has_case_expr: bool,
    has_else: bool,
    len: usize,
}

impl CaseLayout {
    fn new(has_case_expr: bool, has_else: bool, len: usize) -> Self {
        let layout = CaseLayout {
            has_case_expr,
            has_else,
            len,
        };
        assert!(
            layout.clauses().len() >= 2 && layout.clauses().len() % 2 == 0,
            "malformed CASE with {len} children"
        );
        layout
    }

    fn clauses(&self) -> std::ops::Range<usize> {
        usize::from(self.has_case_expr)..self.len - usize::from(self.has_else)
    }

    fn is_when(&self, index: usize) -> bool {
        self.clauses().contains(&index) && (index - self.clauses().start) % 2 == 0
    }
}

/// Unifies the WHEN side and the result side of a CASE.
///
/// With a case operand every WHEN value is compared against it, so operand
/// and WHEN values share one type. Without one each WHEN is a condition and
/// must be BOOLEAN. THEN and ELSE values always share the result type.
pub(super) fn resolve(
    has_case_expr: bool,
    has_else: bool,
    expr: &Expr,
) -> Result<Resolution, AnalysisError> {
    let children = expr.children();
    let layout = CaseLayout::new(has_case_expr, has_else, children.len());

    let incompatible = |lhs: PrimitiveType, rhs: PrimitiveType| {
        AnalysisError::IncompatibleOperands {
            lhs,
            rhs,
            sql: expr.to_sql(),
        }
    };

    let mut when_ty = if has_case_expr {
        children[0].ty()
    } else {
        PrimitiveType::Boolean
    };
    let mut result_ty = children[layout.clauses().start + 1].ty();

    for pair in children[layout.clauses()].chunks(2) {
        let (when, then) = (&pair[0], &pair[1]);
        if has_case_expr {
            let unified = assignment_compatible_type(when_ty, when.ty());
            if !unified.is_valid() {
                return Err(incompatible(when_ty, when.ty()));
            }
            when_ty = unified;
        } else if !when.ty().is_boolean() {
            return Err(AnalysisError::NonBooleanOperand {
                operand: when.to_sql(),
                actual: when.ty(),
                sql: expr.to_sql(),
            });
        }

        let unified = assignment_compatible_type(result_ty, then.ty());
        if !unified.is_valid() {
            return Err(incompatible(result_ty, then.ty()));
        }
        result_ty = unified;
    }

    if has_else {
        let else_ty = children[layout.len - 1].ty();
        let unified = assignment_compatible_type(result_ty, else_ty);
        if !unified.is_valid() {
            return Err(incompatible(result_ty, else_ty));
        }
        result_ty = unified;
    }

    let operand_types = (0..children.len())
        .map(|index| {
            if (has_case_expr && index == 0) || layout.is_when(index) {
                when_ty
            } else {
                result_ty
            }
        })
        .collect();
    Ok(Resolution::new(result_ty, operand_types))
}
