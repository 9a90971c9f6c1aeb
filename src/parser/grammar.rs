//! Pest parser integration for the expression grammar.

use pest::iterators::{Pair, Pairs};
use pest::Parser;
use pest_derive::Parser;

use crate::analysis::{
    literal, ArithmeticOp, CaseWhenClause, ComparisonOp, Expr, DEFAULT_MAX_EXPR_DEPTH,
};
use crate::error::{AnalysisError, Result, SemaError};
use crate::types::{PrimitiveType, Value};

/// Deepest nesting of parentheses, CASE blocks and prefix operators (`~`,
/// unary `-`/`+`, `NOT`) accepted in expression text.
pub const MAX_NESTING_DEPTH: usize = 64;

/// Nested builder calls allowed on one path. Each source nesting level costs
/// one call, plus one per binary operator chain it contains.
const MAX_BUILD_STEPS: usize = 2 * MAX_NESTING_DEPTH;

#[derive(Parser)]
#[grammar = "parser/grammar.pest"]
struct ExprParser;

/// Parses a SQL scalar expression into an unanalyzed tree.
///
/// Integer literals get the narrowest fixed-point type holding their value and
/// decimal literals get `DOUBLE`. A unary minus on a numeric literal is folded
/// into the literal; on anything else it becomes `-1 * operand`.
///
/// # Errors
///
/// Returns a `ParseError` if the text is syntactically invalid or nested
/// deeper than [`MAX_NESTING_DEPTH`], `ExprDepthExceeded` if the tree would be
/// deeper than [`DEFAULT_MAX_EXPR_DEPTH`], or an analysis error if a literal is
/// malformed or out of range.
pub fn parse_expr(sql: &str) -> Result<Expr> {
    check_nesting(sql)?;

    let mut pairs = ExprParser::parse(Rule::expr_input, sql).map_err(|e| {
        let (line, col) = match e.line_col {
            pest::error::LineColLocation::Pos((l, c))
            | pest::error::LineColLocation::Span((l, c), _) => (l, c),
        };
        SemaError::ParseError {
            line,
            col,
            message: e.variant.message().to_string(),
        }
    })?;

    let input = pairs.next().ok_or_else(|| SemaError::ParseError {
        line: 0,
        col: 0,
        message: "No expression found".into(),
    })?;
    for inner in input.into_inner() {
        if inner.as_rule() == Rule::expr {
            return build_expr(inner, Depth::ROOT);
        }
    }
    Err(SemaError::ParseError {
        line: 0,
        col: 0,
        message: "No expression found".into(),
    })
}

/// Scans the raw text for nesting the grammar would recurse into, so deep
/// input fails before it reaches the parser.
fn check_nesting(sql: &str) -> Result<()> {
    // open parentheses and CASE blocks
    let mut depth = 0usize;
    // prefix operators since the last operand
    let mut prefix = 0usize;

    let mut chars = sql.char_indices().peekable();
    while let Some((offset, c)) = chars.next() {
        match c {
            '\'' => {
                // an escaped quote reopens the literal on the next turn
                for (_, s) in chars.by_ref() {
                    if s == '\'' {
                        break;
                    }
                }
                prefix = 0;
            }
            '(' => depth += 1,
            ')' => {
                depth = depth.saturating_sub(1);
                prefix = 0;
            }
            '~' | '-' | '+' => prefix += 1,
            c if c.is_ascii_alphanumeric() || c == '_' => {
                let mut end = offset + 1;
                while let Some(&(next, n)) = chars.peek() {
                    if !(n.is_ascii_alphanumeric() || n == '_' || n == '.') {
                        break;
                    }
                    end = next + 1;
                    chars.next();
                }
                let word = &sql[offset..end];
                if word.eq_ignore_ascii_case("NOT") {
                    prefix += 1;
                } else if word.eq_ignore_ascii_case("CASE") {
                    depth += 1;
                } else if word.eq_ignore_ascii_case("END") {
                    depth = depth.saturating_sub(1);
                    prefix = 0;
                } else if !is_infix_keyword(word) {
                    prefix = 0;
                }
            }
            _ => {}
        }
        if depth + prefix > MAX_NESTING_DEPTH {
            let (line, col) = line_col(sql, offset);
            return Err(nesting_error(line, col));
        }
    }
    Ok(())
}

/// Keywords that sit between operands and so do not end a prefix run.
fn is_infix_keyword(word: &str) -> bool {
    ["AND", "OR", "IS", "DIV", "WHEN", "THEN", "ELSE", "AS", "CAST"]
        .iter()
        .any(|kw| word.eq_ignore_ascii_case(kw))
}

fn line_col(sql: &str, offset: usize) -> (usize, usize) {
    let before = &sql[..offset];
    let line = before.matches('\n').count() + 1;
    let col = before.rsplit('\n').next().map_or(0, |l| l.chars().count()) + 1;
    (line, col)
}

fn nesting_error(line: usize, col: usize) -> SemaError {
    SemaError::ParseError {
        line,
        col,
        message: format!("Expression nesting exceeds maximum depth ({MAX_NESTING_DEPTH})"),
    }
}

fn parse_error(pair: &Pair<Rule>, message: impl Into<String>) -> SemaError {
    let (line, col) = pair.line_col();
    SemaError::ParseError {
        line,
        col,
        message: message.into(),
    }
}

/// Takes the next pair the grammar guarantees to be present.
fn expect_next<'i>(parent: &Pair<'i, Rule>, pairs: &mut Pairs<'i, Rule>) -> Result<Pair<'i, Rule>> {
    pairs
        .next()
        .ok_or_else(|| parse_error(parent, format!("Incomplete {:?}", parent.as_rule())))
}

/// Where the node being built sits: its depth in the finished tree and the
/// number of builder calls above it.
#[derive(Debug, Clone, Copy)]
struct Depth {
    tree: usize,
    steps: usize,
}

impl Depth {
    const ROOT: Depth = Depth { tree: 1, steps: 0 };

    /// Depth of an operand `levels` nodes below the current one.
    fn descend(self, pair: &Pair<Rule>, levels: usize) -> Result<Depth> {
        let next = Depth {
            tree: self.tree + levels,
            steps: self.steps + 1,
        };
        if next.steps > MAX_BUILD_STEPS {
            let (line, col) = pair.line_col();
            return Err(nesting_error(line, col));
        }
        if next.tree > DEFAULT_MAX_EXPR_DEPTH {
            return Err(AnalysisError::ExprDepthExceeded {
                max: DEFAULT_MAX_EXPR_DEPTH,
            }
            .into());
        }
        Ok(next)
    }
}

/// Walks down precedence levels that wrap a single operand, so a level of
/// nesting in the source costs one builder call instead of one per level.
fn skip_pass_through(mut pair: Pair<Rule>) -> Pair<Rule> {
    while matches!(
        pair.as_rule(),
        Rule::expr
            | Rule::case_operand
            | Rule::or_expr
            | Rule::and_expr
            | Rule::not_expr
            | Rule::is_null_expr
            | Rule::comparison_expr
            | Rule::bitor_expr
            | Rule::bitxor_expr
            | Rule::bitand_expr
            | Rule::additive_expr
            | Rule::multiplicative_expr
            | Rule::unary_expr
    ) {
        let mut inner = pair.clone().into_inner();
        match (inner.next(), inner.next()) {
            (Some(only), None) => pair = only,
            _ => break,
        }
    }
    pair
}

fn build_expr(pair: Pair<Rule>, depth: Depth) -> Result<Expr> {
    let pair = skip_pass_through(pair);
    match pair.as_rule() {
        Rule::or_expr
        | Rule::and_expr
        | Rule::comparison_expr
        | Rule::bitor_expr
        | Rule::bitxor_expr
        | Rule::bitand_expr
        | Rule::additive_expr
        | Rule::multiplicative_expr => build_binary_chain(pair, depth),
        Rule::not_expr => build_not(pair, depth),
        Rule::is_null_expr => build_is_null(pair, depth),
        Rule::unary_expr => build_unary(pair, depth),
        Rule::paren_expr => {
            let mut inner = pair.clone().into_inner();
            let operand = expect_next(&pair, &mut inner)?;
            // parentheses do not add a node
            Ok(build_expr(operand, depth.descend(&pair, 0)?)?.parenthesized())
        }
        Rule::cast_expr => build_cast(pair, depth),
        Rule::case_expr => build_case(pair, depth),
        Rule::bool_literal => literal::create(pair.as_str(), PrimitiveType::Boolean),
        Rule::integer_literal => build_integer_literal(pair.as_str()),
        Rule::decimal_literal => literal::create(pair.as_str(), PrimitiveType::Double),
        Rule::string_literal => build_string_literal(pair),
        Rule::identifier => Ok(Expr::slot_ref(pair.as_str())),
        rule => Err(parse_error(&pair, format!("Unexpected {rule:?}"))),
    }
}

/// Left-associative `operand (op operand)*`.
fn build_binary_chain(pair: Pair<Rule>, depth: Depth) -> Result<Expr> {
    // n operators put the first operand n levels below the chain's root
    let mut remaining = pair.clone().into_inner().count() / 2;
    let mut inner = pair.clone().into_inner();
    let first = expect_next(&pair, &mut inner)?;
    let mut lhs = build_expr(first, depth.descend(&pair, remaining)?)?;
    while let Some(op) = inner.next() {
        let operand = expect_next(&pair, &mut inner)?;
        let rhs = build_expr(operand, depth.descend(&pair, remaining)?)?;
        lhs = combine(&op, lhs, rhs)?;
        remaining = remaining.saturating_sub(1);
    }
    Ok(lhs)
}

fn combine(op: &Pair<Rule>, lhs: Expr, rhs: Expr) -> Result<Expr> {
    let arithmetic = match op.as_rule() {
        Rule::or_op => return Ok(Expr::or(lhs, rhs)),
        Rule::and_op => return Ok(Expr::and(lhs, rhs)),
        Rule::comparison_op => {
            let cmp = ComparisonOp::parse(op.as_str())
                .ok_or_else(|| parse_error(op, format!("Unknown operator: {}", op.as_str())))?;
            return Ok(Expr::comparison(cmp, lhs, rhs));
        }
        Rule::bitor_op => ArithmeticOp::BitOr,
        Rule::bitxor_op => ArithmeticOp::BitXor,
        Rule::bitand_op => ArithmeticOp::BitAnd,
        Rule::additive_op => match op.as_str() {
            "+" => ArithmeticOp::Plus,
            _ => ArithmeticOp::Minus,
        },
        Rule::multiplicative_op => match op.as_str() {
            "*" => ArithmeticOp::Multiply,
            "/" => ArithmeticOp::Divide,
            "%" => ArithmeticOp::Mod,
            _ => ArithmeticOp::IntDivide,
        },
        rule => return Err(parse_error(op, format!("Unknown operator rule {rule:?}"))),
    };
    Ok(Expr::binary(arithmetic, lhs, rhs))
}

fn build_not(pair: Pair<Rule>, depth: Depth) -> Result<Expr> {
    let mut inner = pair.clone().into_inner();
    let first = expect_next(&pair, &mut inner)?;
    if first.as_rule() == Rule::not_op {
        let operand = expect_next(&pair, &mut inner)?;
        let operand = build_expr(operand, depth.descend(&pair, 1)?)?;
        return Ok(Expr::not(operand));
    }
    build_expr(first, depth)
}

fn build_is_null(pair: Pair<Rule>, depth: Depth) -> Result<Expr> {
    let mut inner = pair.clone().into_inner();
    let operand = expect_next(&pair, &mut inner)?;
    let operand = build_expr(operand, depth.descend(&pair, 1)?)?;
    match inner.next() {
        Some(suffix) => {
            let negated = suffix.into_inner().any(|p| p.as_rule() == Rule::not_op);
            Ok(Expr::is_null(operand, negated))
        }
        None => Ok(operand),
    }
}

fn build_unary(pair: Pair<Rule>, depth: Depth) -> Result<Expr> {
    let mut inner = pair.clone().into_inner();
    let first = expect_next(&pair, &mut inner)?;
    if first.as_rule() != Rule::unary_op {
        return build_expr(first, depth);
    }

    let operand = expect_next(&pair, &mut inner)?;
    let mut operand = build_expr(operand, depth.descend(&pair, 1)?)?;
    match first.as_str() {
        "~" => Ok(Expr::unary(ArithmeticOp::BitNot, operand)),
        "+" => Ok(operand),
        _ => {
            if operand.literal_value().is_some_and(Value::is_numeric) {
                operand.swap_sign()?;
                Ok(operand)
            } else {
                let minus_one = literal::create("-1", PrimitiveType::TinyInt)?;
                Ok(Expr::binary(ArithmeticOp::Multiply, minus_one, operand))
            }
        }
    }
}

fn build_cast(pair: Pair<Rule>, depth: Depth) -> Result<Expr> {
    let operand_depth = depth.descend(&pair, 1)?;
    let mut operand = None;
    let mut target = None;
    for inner in pair.clone().into_inner() {
        match inner.as_rule() {
            Rule::expr => operand = Some(build_expr(inner, operand_depth)?),
            Rule::type_name => {
                target = Some(PrimitiveType::from_name(inner.as_str()).ok_or_else(|| {
                    parse_error(&inner, format!("Unknown type: {}", inner.as_str()))
                })?);
            }
            _ => {}
        }
    }
    match (operand, target) {
        (Some(operand), Some(target)) => Ok(Expr::cast(operand, target)),
        _ => Err(parse_error(&pair, "Incomplete CAST")),
    }
}

fn build_case(pair: Pair<Rule>, depth: Depth) -> Result<Expr> {
    let child_depth = depth.descend(&pair, 1)?;
    let mut case_expr = None;
    let mut clauses = Vec::new();
    let mut else_expr = None;

    for inner in pair.clone().into_inner() {
        match inner.as_rule() {
            Rule::case_operand => case_expr = Some(build_expr(inner, child_depth)?),
            Rule::when_clause => {
                let mut values = inner
                    .clone()
                    .into_inner()
                    .filter(|p| p.as_rule() == Rule::expr);
                let when = build_expr(expect_next_filtered(&inner, values.next())?, child_depth)?;
                let then = build_expr(expect_next_filtered(&inner, values.next())?, child_depth)?;
                clauses.push(CaseWhenClause::new(when, then));
            }
            Rule::else_clause => {
                let value = inner
                    .clone()
                    .into_inner()
                    .find(|p| p.as_rule() == Rule::expr);
                else_expr = Some(build_expr(expect_next_filtered(&inner, value)?, child_depth)?);
            }
            _ => {}
        }
    }

    if clauses.is_empty() {
        return Err(parse_error(&pair, "CASE requires at least one WHEN clause"));
    }
    Ok(Expr::case(case_expr, clauses, else_expr))
}

fn expect_next_filtered<'i>(
    parent: &Pair<'i, Rule>,
    next: Option<Pair<'i, Rule>>,
) -> Result<Pair<'i, Rule>> {
    next.ok_or_else(|| parse_error(parent, format!("Incomplete {:?}", parent.as_rule())))
}

fn build_integer_literal(text: &str) -> Result<Expr> {
    // too large for BIGINT: let create() report the range error
    let ty = text
        .parse::<i64>()
        .map_or(PrimitiveType::BigInt, PrimitiveType::smallest_fixed_point_for);
    literal::create(text, ty)
}

fn build_string_literal(pair: Pair<Rule>) -> Result<Expr> {
    let raw = pair
        .into_inner()
        .next()
        .map_or("", |inner| inner.as_str());
    literal::create(&raw.replace("''", "'"), PrimitiveType::String)
}
