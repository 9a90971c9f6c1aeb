//! The semantic analysis pass.
//!
//! Analysis runs post-order. Once every child of a node carries its resolved
//! type, the variant's rule computes a [`Resolution`]: the node's own type and
//! the type each child must present. The analyzer then splices implicit casts
//! around the children that differ and records the node's type.

use rayon::prelude::*;

use crate::error::{AnalysisError, Result};
use crate::types::PrimitiveType;

use super::expr::{Expr, ExprKind};
use super::scope::Scope;
use super::{arithmetic, case, cast, predicate};

/// Default maximum nesting depth of an expression tree.
pub const DEFAULT_MAX_EXPR_DEPTH: usize = 1000;

/// Outcome of type-checking one node against its analyzed children.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct Resolution {
    /// The node's result type.
    pub ty: PrimitiveType,
    /// Required type of each child, in child order.
    pub operand_types: Vec<PrimitiveType>,
}

impl Resolution {
    pub(crate) fn new(ty: PrimitiveType, operand_types: Vec<PrimitiveType>) -> Self {
        Resolution { ty, operand_types }
    }

    /// Every child is cast to the result type.
    pub(crate) fn uniform(ty: PrimitiveType, arity: usize) -> Self {
        Resolution::new(ty, vec![ty; arity])
    }

    /// Children keep their current types.
    pub(crate) fn keep_operands(ty: PrimitiveType, expr: &Expr) -> Self {
        Resolution::new(ty, expr.children().iter().map(Expr::ty).collect())
    }
}

/// Configuration for the analyzer.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AnalyzerConfig {
    /// Trees nested deeper than this are rejected.
    pub max_expr_depth: usize,
}

impl Default for AnalyzerConfig {
    fn default() -> Self {
        Self {
            max_expr_depth: DEFAULT_MAX_EXPR_DEPTH,
        }
    }
}

impl AnalyzerConfig {
    /// Creates a new analyzer configuration.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the maximum expression depth.
    #[must_use]
    pub fn with_max_expr_depth(mut self, max_expr_depth: usize) -> Self {
        self.max_expr_depth = max_expr_depth;
        self
    }
}

/// Resolves types and inserts implicit casts.
///
/// The analyzer only borrows its scope, so one instance can analyze many
/// independent trees, concurrently through [`Analyzer::analyze_all`].
#[derive(Debug, Clone, Copy)]
pub struct Analyzer<'a> {
    scope: &'a Scope,
    config: AnalyzerConfig,
}

impl<'a> Analyzer<'a> {
    /// Creates an analyzer with the default configuration.
    #[must_use]
    pub fn new(scope: &'a Scope) -> Self {
        Self::with_config(scope, AnalyzerConfig::default())
    }

    #[must_use]
    pub fn with_config(scope: &'a Scope, config: AnalyzerConfig) -> Self {
        Analyzer { scope, config }
    }

    #[must_use]
    pub fn config(&self) -> &AnalyzerConfig {
        &self.config
    }

    /// Analyzes `expr` in place.
    ///
    /// Already-analyzed subtrees are left untouched, so analyzing a tree twice
    /// changes nothing.
    ///
    /// # Errors
    ///
    /// Returns the first analysis error found. The tree may then be partially
    /// analyzed and should be discarded.
    ///
    /// # Panics
    ///
    /// Panics when an internal typing invariant is violated.
    #[tracing::instrument(level = "debug", skip_all, fields(nodes = expr.node_count()))]
    pub fn analyze(&self, expr: &mut Expr) -> Result<()> {
        self.analyze_node(expr, 1).map_err(|err| {
            tracing::debug!(error = %err, "analysis failed");
            err.into()
        })
    }

    /// Analyzes independent trees in parallel, returning each one with its
    /// outcome in input order.
    #[tracing::instrument(level = "debug", skip_all, fields(count = exprs.len()))]
    pub fn analyze_all(&self, exprs: Vec<Expr>) -> Vec<Result<Expr>> {
        exprs
            .into_par_iter()
            .map(|mut expr| self.analyze(&mut expr).map(|()| expr))
            .collect()
    }

    fn analyze_node(&self, expr: &mut Expr, depth: usize) -> std::result::Result<(), AnalysisError> {
        if expr.is_analyzed() {
            return Ok(());
        }
        if depth > self.config.max_expr_depth {
            return Err(AnalysisError::ExprDepthExceeded {
                max: self.config.max_expr_depth,
            });
        }

        for child in expr.children_mut() {
            self.analyze_node(child, depth + 1)?;
        }

        let resolution = self.resolve(expr)?;
        assert_eq!(
            resolution.operand_types.len(),
            expr.children().len(),
            "operand type count mismatch in: {}",
            expr.to_sql()
        );
        for (index, ty) in resolution.operand_types.into_iter().enumerate() {
            expr.cast_child(index, ty);
        }

        assert!(
            resolution.ty.is_valid(),
            "analysis produced INVALID type for: {}",
            expr.to_sql()
        );
        expr.set_type(resolution.ty);
        tracing::trace!(sql = %expr.to_sql(), ty = %expr.ty(), "resolved");
        Ok(())
    }

    fn resolve(&self, expr: &Expr) -> std::result::Result<Resolution, AnalysisError> {
        match expr.kind() {
            ExprKind::Literal(value) => {
                unreachable!("literal {value} was created without a type")
            }
            ExprKind::SlotRef { name } => {
                let slot = self
                    .scope
                    .lookup(name)
                    .ok_or_else(|| AnalysisError::UnknownColumn(name.clone()))?;
                Ok(Resolution::new(slot.ty, Vec::new()))
            }
            ExprKind::Cast { target, .. } => cast::resolve(*target, expr),
            ExprKind::Arithmetic(op) => arithmetic::resolve(*op, expr),
            ExprKind::BinaryPredicate(_) => predicate::resolve_comparison(expr),
            ExprKind::CompoundPredicate(_) => predicate::resolve_compound(expr),
            ExprKind::IsNullPredicate { .. } => {
                Ok(Resolution::keep_operands(PrimitiveType::Boolean, expr))
            }
            ExprKind::Case {
                has_case_expr,
                has_else,
            } => case::resolve(*has_case_expr, *has_else, expr),
        }
    }
}
