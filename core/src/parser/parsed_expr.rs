use serde::Serialize;

use crate::parser::{BinaryOp, BoolOp, ComparisonOp, ComprehensionKind, Span, UnaryOp};

/// A node of the expression tree together with the source range it covers.
///
/// Equality ignores spans so that trees parsed from differently parenthesized
/// sources can be compared structurally.
#[derive(Serialize, Debug, Clone)]
pub struct Expr {
    pub kind: ExprKind,
    pub span: Span,
    /// Height of the subtree rooted here (a leaf is 1).
    #[serde(skip)]
    pub depth: usize,
}

impl Expr {
    pub fn new(kind: ExprKind, span: Span) -> Self {
        // Each `for` clause of a comprehension nests one level deeper when run.
        let clauses = match &kind {
            ExprKind::Comprehension { generators, .. } => generators.len(),
            _ => 0,
        };
        let depth = 1 + clauses + kind.children().iter().map(|c| c.depth).max().unwrap_or(0);
        Self { kind, span, depth }
    }
}

impl PartialEq for Expr {
    fn eq(&self, other: &Self) -> bool {
        self.kind == other.kind
    }
}

#[derive(Serialize, Debug, Clone, PartialEq)]
pub enum ExprKind {
    Literal(Literal),
    Name(String),
    Tuple(Vec<Expr>),
    List(Vec<Expr>),
    Set(Vec<Expr>),
    Dict(Vec<(Expr, Expr)>),
    Attribute {
        value: Box<Expr>,
        attr: String,
    },
    Subscript {
        value: Box<Expr>,
        index: Box<Expr>,
    },
    /// `lower:upper:step` inside a subscript.
    Slice {
        lower: Option<Box<Expr>>,
        upper: Option<Box<Expr>>,
        step: Option<Box<Expr>>,
    },
    Call {
        func: Box<Expr>,
        args: Vec<Expr>,
        keywords: Vec<Keyword>,
    },
    Unary {
        op: UnaryOp,
        operand: Box<Expr>,
    },
    Binary {
        op: BinaryOp,
        left: Box<Expr>,
        right: Box<Expr>,
    },
    /// `a and b and c`: all operands of one operator, evaluated left to right.
    Boolean {
        op: BoolOp,
        values: Vec<Expr>,
    },
    /// Chained comparison `a < b <= c`.
    Compare {
        left: Box<Expr>,
        ops: Vec<(ComparisonOp, Expr)>,
    },
    If {
        cond: Box<Expr>,
        then_branch: Box<Expr>,
        else_branch: Box<Expr>,
    },
    Comprehension {
        kind: ComprehensionKind,
        element: Box<Element>,
        generators: Vec<Generator>,
    },
}

impl ExprKind {
    /// Direct sub-expressions, in evaluation order.
    pub fn children(&self) -> Vec<&Expr> {
        match self {
            ExprKind::Literal(_) | ExprKind::Name(_) => Vec::new(),
            ExprKind::Tuple(items) | ExprKind::List(items) | ExprKind::Set(items) => {
                items.iter().collect()
            }
            ExprKind::Dict(entries) => entries.iter().flat_map(|(k, v)| [k, v]).collect(),
            ExprKind::Attribute { value, .. } => vec![&**value],
            ExprKind::Subscript { value, index } => vec![&**value, &**index],
            ExprKind::Slice { lower, upper, step } => [lower, upper, step]
                .into_iter()
                .flatten()
                .map(|b| b.as_ref())
                .collect(),
            ExprKind::Call {
                func,
                args,
                keywords,
            } => core::iter::once(func.as_ref())
                .chain(args)
                .chain(keywords.iter().map(|k| &k.value))
                .collect(),
            ExprKind::Unary { operand, .. } => vec![&**operand],
            ExprKind::Binary { left, right, .. } => vec![&**left, &**right],
            ExprKind::Boolean { values, .. } => values.iter().collect(),
            ExprKind::Compare { left, ops } => core::iter::once(left.as_ref())
                .chain(ops.iter().map(|(_, e)| e))
                .collect(),
            ExprKind::If {
                cond,
                then_branch,
                else_branch,
            } => vec![&**cond, &**then_branch, &**else_branch],
            ExprKind::Comprehension {
                element,
                generators,
                ..
            } => {
                let mut out = Vec::new();
                for generator in generators {
                    out.push(&generator.iter);
                    out.extend(&generator.conditions);
                }
                match element.as_ref() {
                    Element::Single(e) => out.push(e),
                    Element::Pair(k, v) => out.extend([k, v]),
                }
                out
            }
        }
    }
}

/// What a comprehension yields per iteration.
#[derive(Serialize, Debug, Clone, PartialEq)]
pub enum Element {
    Single(Expr),
    Pair(Expr, Expr),
}

/// One `for target in iter if cond...` clause.
#[derive(Serialize, Debug, Clone)]
pub struct Generator {
    pub target: Target,
    pub iter: Expr,
    pub conditions: Vec<Expr>,
    pub span: Span,
}

impl PartialEq for Generator {
    fn eq(&self, other: &Self) -> bool {
        self.target == other.target
            && self.iter == other.iter
            && self.conditions == other.conditions
    }
}

#[derive(Serialize, Debug, Clone, PartialEq)]
pub enum Target {
    Name(String),
    Tuple(Vec<Target>),
}

impl Target {
    /// Every name bound by this target, in order of appearance.
    pub fn names(&self) -> Vec<&str> {
        let mut out = Vec::new();
        self.collect_names(&mut out);
        out
    }

    fn collect_names<'a>(&'a self, out: &mut Vec<&'a str>) {
        match self {
            Target::Name(name) => out.push(name),
            Target::Tuple(items) => items.iter().for_each(|t| t.collect_names(out)),
        }
    }
}

#[derive(Serialize, Debug, Clone, PartialEq)]
pub struct Keyword {
    pub name: String,
    pub value: Expr,
}

#[derive(Clone, PartialEq, Serialize)]
pub enum Literal {
    None,
    Bool(bool),
    Int(i64),
    Float(f64),
    Imaginary(f64),
    Str(String),
    Bytes(Vec<u8>),
}

impl core::fmt::Debug for Literal {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match self {
            Literal::None => write!(f, "None"),
            Literal::Bool(b) => write!(f, "Bool({b})"),
            Literal::Int(value) => write!(f, "Int({value})"),
            Literal::Float(value) => write!(f, "Float({value})"),
            Literal::Imaginary(value) => write!(f, "Imaginary({value})"),
            Literal::Str(s) => write!(f, "Str({s:?})"),
            Literal::Bytes(bytes) => write!(f, "Bytes({bytes:?})"),
        }
    }
}
