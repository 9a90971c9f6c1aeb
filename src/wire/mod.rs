//! Wire format for analyzed expressions.
//!
//! An analyzed tree is flattened into a pre-order list of nodes, each
//! recording how many children follow it. The message is framed with a
//! format version and a CRC32 checksum computed over its bincode encoding.

use serde::{Deserialize, Serialize};

use crate::analysis::{Expr, ExprKind};
use crate::error::{Result, SemaError};
use crate::types::{PrimitiveType, Value};

/// Current wire format version.
pub const WIRE_VERSION: u32 = 1;

/// Node tag of a wire node.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum WireNodeType {
    BoolLiteral,
    IntLiteral,
    FloatLiteral,
    StringLiteral,
    SlotRef,
    CastExpr,
    ArithmeticExpr,
    BinaryPred,
    CompoundPred,
    IsNullPred,
    CaseExpr,
}

/// Operator tag carried by operator nodes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum WireOperator {
    Multiply,
    Divide,
    Mod,
    IntDivide,
    Plus,
    Minus,
    BitAnd,
    BitOr,
    BitXor,
    BitNot,
    Eq,
    Ne,
    Lt,
    Le,
    Gt,
    Ge,
    And,
    Or,
    Not,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct WireCaseInfo {
    pub has_case_expr: bool,
    pub has_else_expr: bool,
}

/// One flattened node.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WireExprNode {
    pub node_type: WireNodeType,
    /// Resolved type of the node.
    pub ty: PrimitiveType,
    /// Number of child nodes that follow in pre-order.
    pub num_children: u32,
    /// Operator, for operator nodes.
    pub op: Option<WireOperator>,
    /// Value, for literal nodes.
    pub literal: Option<Value>,
    /// Column name, for slot references.
    pub slot: Option<String>,
    pub case_info: Option<WireCaseInfo>,
    /// IS NOT NULL vs IS NULL, for null predicates.
    pub is_not_null: Option<bool>,
}

impl WireExprNode {
    fn new(node_type: WireNodeType, ty: PrimitiveType, num_children: usize) -> Self {
        WireExprNode {
            node_type,
            ty,
            num_children: num_children as u32,
            op: None,
            literal: None,
            slot: None,
            case_info: None,
            is_not_null: None,
        }
    }
}

/// A serialized expression tree.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WireExpr {
    /// Wire format version.
    pub version: u32,
    /// Nodes in pre-order.
    pub nodes: Vec<WireExprNode>,
    /// CRC32 checksum of the message (excluding this field).
    pub checksum: u32,
}

impl WireExpr {
    /// Creates a message from pre-order nodes and stamps its checksum.
    #[must_use]
    pub fn new(nodes: Vec<WireExprNode>) -> Self {
        let mut wire = WireExpr {
            version: WIRE_VERSION,
            nodes,
            checksum: 0,
        };
        wire.update_checksum();
        wire
    }

    /// Returns the root node.
    #[must_use]
    pub fn root(&self) -> Option<&WireExprNode> {
        self.nodes.first()
    }

    /// Computes the checksum for this message.
    #[must_use]
    pub fn compute_checksum(&self) -> u32 {
        let mut copy = self.clone();
        copy.checksum = 0;

        if let Ok(bytes) = bincode::serialize(&copy) {
            crc32fast::hash(&bytes)
        } else {
            0
        }
    }

    /// Updates the checksum field.
    pub fn update_checksum(&mut self) {
        self.checksum = self.compute_checksum();
    }

    /// Verifies the message checksum.
    #[must_use]
    pub fn verify_checksum(&self) -> bool {
        self.checksum == self.compute_checksum()
    }

    /// Checks that the version is supported and the child counts describe
    /// exactly one tree.
    ///
    /// # Errors
    ///
    /// Returns a `SerializationError` describing the first problem found.
    pub fn validate(&self) -> Result<()> {
        if self.version > WIRE_VERSION {
            return Err(SemaError::SerializationError(format!(
                "Unsupported wire version: {} (max supported: {WIRE_VERSION})",
                self.version
            )));
        }

        // nodes still owed to open subtrees
        let mut pending: usize = 1;
        for (index, node) in self.nodes.iter().enumerate() {
            if pending == 0 {
                return Err(SemaError::SerializationError(format!(
                    "Trailing node at position {index}"
                )));
            }
            pending = pending - 1 + node.num_children as usize;
        }
        if pending != 0 {
            return Err(SemaError::SerializationError(format!(
                "Truncated expression: {pending} node(s) missing"
            )));
        }
        Ok(())
    }

    /// Serializes the message to bytes.
    ///
    /// # Errors
    ///
    /// Returns an error if serialization fails.
    pub fn serialize(&self) -> Result<Vec<u8>> {
        bincode::serialize(self).map_err(|e| {
            SemaError::SerializationError(format!("Failed to serialize expression: {e}"))
        })
    }

    /// Deserializes and validates a message.
    ///
    /// # Errors
    ///
    /// Returns a `SerializationError` if the bytes do not decode or describe
    /// a malformed tree, and a `ChecksumError` if the checksum does not match.
    pub fn deserialize(data: &[u8]) -> Result<Self> {
        let wire: WireExpr = bincode::deserialize(data).map_err(|e| {
            SemaError::SerializationError(format!("Failed to deserialize expression: {e}"))
        })?;
        if !wire.verify_checksum() {
            return Err(SemaError::ChecksumError(format!(
                "expected {:#010x}, computed {:#010x}",
                wire.checksum,
                wire.compute_checksum()
            )));
        }
        wire.validate()?;
        Ok(wire)
    }
}

impl Expr {
    /// Flattens the analyzed tree into a wire message.
    ///
    /// # Panics
    ///
    /// Panics if any node has not been analyzed.
    #[must_use]
    pub fn to_wire(&self) -> WireExpr {
        let mut nodes = Vec::with_capacity(self.node_count());
        self.flatten_into(&mut nodes);
        WireExpr::new(nodes)
    }

    fn flatten_into(&self, nodes: &mut Vec<WireExprNode>) {
        assert!(
            self.is_analyzed(),
            "cannot serialize unanalyzed expression: {}",
            self.to_sql()
        );
        let arity = self.children().len();
        let node = match self.kind() {
            ExprKind::Literal(value) => {
                let node_type = match value {
                    Value::Bool(_) => WireNodeType::BoolLiteral,
                    Value::Int(_) => WireNodeType::IntLiteral,
                    Value::Float(_) => WireNodeType::FloatLiteral,
                    Value::String(_) => WireNodeType::StringLiteral,
                };
                WireExprNode {
                    literal: Some(value.clone()),
                    ..WireExprNode::new(node_type, self.ty(), arity)
                }
            }
            ExprKind::SlotRef { name } => WireExprNode {
                slot: Some(name.clone()),
                ..WireExprNode::new(WireNodeType::SlotRef, self.ty(), arity)
            },
            ExprKind::Cast { .. } => WireExprNode::new(WireNodeType::CastExpr, self.ty(), arity),
            ExprKind::Arithmetic(op) => WireExprNode {
                op: Some(op.to_wire()),
                ..WireExprNode::new(WireNodeType::ArithmeticExpr, self.ty(), arity)
            },
            ExprKind::BinaryPredicate(op) => WireExprNode {
                op: Some(op.to_wire()),
                ..WireExprNode::new(WireNodeType::BinaryPred, self.ty(), arity)
            },
            ExprKind::CompoundPredicate(op) => WireExprNode {
                op: Some(op.to_wire()),
                ..WireExprNode::new(WireNodeType::CompoundPred, self.ty(), arity)
            },
            ExprKind::IsNullPredicate { negated } => WireExprNode {
                is_not_null: Some(*negated),
                ..WireExprNode::new(WireNodeType::IsNullPred, self.ty(), arity)
            },
            ExprKind::Case {
                has_case_expr,
                has_else,
            } => WireExprNode {
                case_info: Some(WireCaseInfo {
                    has_case_expr: *has_case_expr,
                    has_else_expr: *has_else,
                }),
                ..WireExprNode::new(WireNodeType::CaseExpr, self.ty(), arity)
            },
        };
        nodes.push(node);
        for child in self.children() {
            child.flatten_into(nodes);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::analysis::{literal, Analyzer, ArithmeticOp, Scope};

    fn analyzed_plus() -> Expr {
        let scope = Scope::new().with_column("a", PrimitiveType::Int);
        let mut expr = Expr::arithmetic(
            ArithmeticOp::Plus,
            Expr::slot_ref("a"),
            Some(literal::create("1", PrimitiveType::TinyInt).unwrap()),
        );
        Analyzer::new(&scope).analyze(&mut expr).unwrap();
        expr
    }

    #[test]
    fn test_to_wire_preorder() {
        let wire = analyzed_plus().to_wire();
        let tags: Vec<_> = wire.nodes.iter().map(|n| n.node_type).collect();
        assert_eq!(
            tags,
            vec![
                WireNodeType::ArithmeticExpr,
                WireNodeType::CastExpr,
                WireNodeType::SlotRef,
                WireNodeType::CastExpr,
                WireNodeType::IntLiteral,
            ]
        );
        let root = wire.root().unwrap();
        assert_eq!(root.op, Some(WireOperator::Plus));
        assert_eq!(root.ty, PrimitiveType::BigInt);
        assert_eq!(root.num_children, 2);
        assert_eq!(wire.nodes[2].slot.as_deref(), Some("a"));
        assert_eq!(wire.nodes[4].literal, Some(Value::Int(1)));
        assert!(wire.verify_checksum());
        assert!(wire.validate().is_ok());
    }

    #[test]
    fn test_serialization_roundtrip() {
        let wire = analyzed_plus().to_wire();
        let bytes = wire.serialize().unwrap();
        let decoded = WireExpr::deserialize(&bytes).unwrap();
        assert_eq!(decoded, wire);
    }

    #[test]
    fn test_checksum_mismatch_detected() {
        let mut wire = analyzed_plus().to_wire();
        wire.nodes[0].ty = PrimitiveType::Double;
        let bytes = wire.serialize().unwrap();
        assert!(matches!(
            WireExpr::deserialize(&bytes),
            Err(SemaError::ChecksumError(_))
        ));
    }

    #[test]
    fn test_garbage_rejected() {
        assert!(matches!(
            WireExpr::deserialize(&[1, 2, 3]),
            Err(SemaError::SerializationError(_))
        ));
    }

    #[test]
    fn test_validate_rejects_malformed_trees() {
        let mut wire = analyzed_plus().to_wire();
        wire.nodes.pop();
        assert!(wire.validate().is_err());

        let mut wire = analyzed_plus().to_wire();
        let extra = wire.nodes[2].clone();
        wire.nodes.push(extra);
        assert!(wire.validate().is_err());

        let mut wire = analyzed_plus().to_wire();
        wire.version = WIRE_VERSION + 1;
        assert!(wire.validate().is_err());
    }

    #[test]
    #[should_panic(expected = "unanalyzed")]
    fn test_unanalyzed_tree_panics() {
        let _ = Expr::slot_ref("a").to_wire();
    }
}
