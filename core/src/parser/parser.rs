use lazy_static::lazy_static;
use pest::Parser;
use pest::iterators::{Pair, Pairs};
use pest::pratt_parser::{Assoc, Op, PrattParser};
use pest_derive::Parser;
use tracing::trace;

use crate::parser::error::{ParseError, ParseErrorKind, check_nesting, convert_pest_error};
use crate::parser::parsed_expr::{Element, Expr, ExprKind, Generator, Keyword, Literal, Target};
use crate::parser::syntax::{BinaryOp, BoolOp, ComparisonOp, ComprehensionKind, Span, UnaryOp};
use crate::syntax::{UnescapeError, unescape_bytes, unescape_string};

lazy_static! {
    // Note: precedence is defined lowest to highest. The boolean, comparison
    // and conditional layers are handled by the grammar itself.
    static ref PRATT_PARSER: PrattParser<Rule> = PrattParser::new()
        // (lowest precedence)
        .op(Op::infix(Rule::bit_or, Assoc::Left))        // `|`
        .op(Op::infix(Rule::bit_xor, Assoc::Left))       // `^`
        .op(Op::infix(Rule::bit_and, Assoc::Left))       // `&`
        .op(
            Op::infix(Rule::lshift, Assoc::Left) |
            Op::infix(Rule::rshift, Assoc::Left)
        )                                                // `<<`, `>>`
        .op(
            Op::infix(Rule::add, Assoc::Left) |
            Op::infix(Rule::sub, Assoc::Left)
        )                                                // `+`, `-`
        .op(
            Op::infix(Rule::mul, Assoc::Left) |
            Op::infix(Rule::div, Assoc::Left) |
            Op::infix(Rule::floor_div, Assoc::Left) |
            Op::infix(Rule::modulo, Assoc::Left)
        )                                                // `*`, `/`, `//`, `%`
        .op(
            Op::prefix(Rule::neg) |
            Op::prefix(Rule::pos) |
            Op::prefix(Rule::invert)
        )                                                // `-`, `+`, `~`
        .op(Op::infix(Rule::pow, Assoc::Right))          // `**` (right-assoc)

        // Postfix operators.
        .op(
            Op::postfix(Rule::call_op) |
            Op::postfix(Rule::index_op) |
            Op::postfix(Rule::attr_op)
        )                                                // `()`, `[]`, `.`
        // (highest precedence)
        ;
}

#[derive(Parser)]
#[grammar = "parser/expression.pest"]
pub struct ExpressionParser;

/// Default limit on bracket nesting.
pub const DEFAULT_MAX_DEPTH: usize = 100;

/// Default limit on the height of the resulting tree.
pub const DEFAULT_MAX_TREE_DEPTH: usize = 1000;

pub fn parse(source: &str) -> Result<Expr, ParseError> {
    parse_with_max_depth(source, DEFAULT_MAX_DEPTH)
}

pub fn parse_with_max_depth(source: &str, max_depth: usize) -> Result<Expr, ParseError> {
    parse_with_limits(source, max_depth, DEFAULT_MAX_TREE_DEPTH)
}

/// Parse `source` as a single expression.
///
/// Bracket nesting is checked against `max_depth` before pest runs, and every
/// node built is checked against `max_tree_depth`, so neither the parser nor
/// later tree walks can recurse without bound.
pub fn parse_with_limits(
    source: &str,
    max_depth: usize,
    max_tree_depth: usize,
) -> Result<Expr, ParseError> {
    check_nesting(source, max_depth)?;

    let mut pairs = ExpressionParser::parse(Rule::main, source)
        .map_err(|err| convert_pest_error(err, source))?;
    let builder = Builder {
        source,
        max_tree_depth,
    };
    let main = builder.next_pair(&mut pairs, Span::new(0, source.len()))?;
    let expr = builder.main(main)?;
    trace!(depth = expr.depth, "parsed expression");
    Ok(expr)
}

fn is_keyword(rule: Rule) -> bool {
    matches!(
        rule,
        Rule::kw_and
            | Rule::kw_or
            | Rule::kw_not
            | Rule::kw_in
            | Rule::kw_is
            | Rule::kw_if
            | Rule::kw_else
            | Rule::kw_for
    )
}

/// The children of `pair` with keyword tokens dropped.
fn operands(pair: Pair<'_, Rule>) -> impl Iterator<Item = Pair<'_, Rule>> {
    pair.into_inner().filter(|p| !is_keyword(p.as_rule()))
}

/// Turns pest pairs into an owned `Expr` tree.
struct Builder<'s> {
    source: &'s str,
    max_tree_depth: usize,
}

impl<'s> Builder<'s> {
    fn error(&self, span: Span, kind: ParseErrorKind) -> ParseError {
        ParseError::new(kind, self.source, span)
    }

    fn unsupported(&self, span: Span, message: impl Into<String>) -> ParseError {
        self.error(
            span,
            ParseErrorKind::Unsupported {
                message: message.into(),
            },
        )
    }

    fn unexpected(&self, pair: &Pair<'_, Rule>) -> ParseError {
        self.unsupported(
            pair.as_span().into(),
            format!("unexpected {:?} in expression", pair.as_rule()),
        )
    }

    fn next_pair<'i>(
        &self,
        pairs: &mut Pairs<'i, Rule>,
        parent: Span,
    ) -> Result<Pair<'i, Rule>, ParseError> {
        pairs
            .next()
            .ok_or_else(|| self.unsupported(parent, "missing expected pair in rule"))
    }

    fn node(&self, kind: ExprKind, span: Span) -> Result<Expr, ParseError> {
        let expr = Expr::new(kind, span);
        if expr.depth > self.max_tree_depth {
            return Err(self.error(
                expr.span.clone(),
                ParseErrorKind::MaxDepthExceeded {
                    max_depth: self.max_tree_depth,
                },
            ));
        }
        Ok(expr)
    }

    fn main(&self, pair: Pair<'_, Rule>) -> Result<Expr, ParseError> {
        let span: Span = pair.as_span().into();
        let list = self.next_pair(&mut pair.into_inner(), span)?;
        self.expression_list(list)
    }

    /// `a` stays `a`; `a,` and `a, b` become tuples.
    fn expression_list(&self, pair: Pair<'_, Rule>) -> Result<Expr, ParseError> {
        let span: Span = pair.as_span().into();
        let mut items = Vec::new();
        let mut trailing = false;
        for p in pair.into_inner() {
            match p.as_rule() {
                Rule::trailing_comma => trailing = true,
                _ => items.push(self.expr(p)?),
            }
        }
        if items.len() == 1 && !trailing {
            if let Some(only) = items.pop() {
                return Ok(only);
            }
        }
        self.node(ExprKind::Tuple(items), span)
    }

    fn expr(&self, pair: Pair<'_, Rule>) -> Result<Expr, ParseError> {
        match pair.as_rule() {
            Rule::expression => self.conditional(pair),
            Rule::disjunction => self.boolean(pair, BoolOp::Or),
            Rule::conjunction => self.boolean(pair, BoolOp::And),
            Rule::inversion => self.inversion(pair),
            Rule::comparison => self.comparison(pair),
            Rule::arith => self.arith(pair),
            _ => self.primary(pair),
        }
    }

    /// `a if c else b if d else e` groups to the right.
    fn conditional(&self, pair: Pair<'_, Rule>) -> Result<Expr, ParseError> {
        let mut values = operands(pair)
            .map(|p| self.expr(p))
            .collect::<Result<Vec<_>, _>>()?;

        let Some(mut acc) = values.pop() else {
            return Err(self.unsupported(Span::new(0, 0), "empty expression"));
        };
        while let (Some(cond), Some(then_branch)) = (values.pop(), values.pop()) {
            let span = Span::combine(&then_branch.span, &acc.span);
            acc = self.node(
                ExprKind::If {
                    cond: Box::new(cond),
                    then_branch: Box::new(then_branch),
                    else_branch: Box::new(acc),
                },
                span,
            )?;
        }
        Ok(acc)
    }

    fn boolean(&self, pair: Pair<'_, Rule>, op: BoolOp) -> Result<Expr, ParseError> {
        let span: Span = pair.as_span().into();
        let mut values = operands(pair)
            .map(|p| self.expr(p))
            .collect::<Result<Vec<_>, _>>()?;
        if values.len() == 1 {
            if let Some(only) = values.pop() {
                return Ok(only);
            }
        }
        self.node(ExprKind::Boolean { op, values }, span)
    }

    fn inversion(&self, pair: Pair<'_, Rule>) -> Result<Expr, ParseError> {
        let mut nots = Vec::new();
        let mut operand = None;
        for p in pair.into_inner() {
            match p.as_rule() {
                Rule::not_op => nots.push(p.as_span().start()),
                _ => operand = Some(self.expr(p)?),
            }
        }
        let Some(mut acc) = operand else {
            return Err(self.unsupported(Span::new(0, 0), "missing operand of 'not'"));
        };
        for start in nots.into_iter().rev() {
            let span = Span::new(start, acc.span.0.end);
            acc = self.node(
                ExprKind::Unary {
                    op: UnaryOp::Not,
                    operand: Box::new(acc),
                },
                span,
            )?;
        }
        Ok(acc)
    }

    fn comparison(&self, pair: Pair<'_, Rule>) -> Result<Expr, ParseError> {
        let span: Span = pair.as_span().into();
        let mut inner = pair.into_inner();
        let left = self.expr(self.next_pair(&mut inner, span.clone())?)?;

        let mut ops = Vec::new();
        while let Some(op) = inner.next() {
            let op = match op.as_rule() {
                Rule::eq => ComparisonOp::Eq,
                Rule::ne => ComparisonOp::Neq,
                Rule::lt => ComparisonOp::Lt,
                Rule::gt => ComparisonOp::Gt,
                Rule::le => ComparisonOp::Le,
                Rule::ge => ComparisonOp::Ge,
                Rule::in_op => ComparisonOp::In,
                Rule::not_in => ComparisonOp::NotIn,
                Rule::is_op => ComparisonOp::Is,
                Rule::is_not => ComparisonOp::IsNot,
                _ => return Err(self.unexpected(&op)),
            };
            let right = self.expr(self.next_pair(&mut inner, span.clone())?)?;
            ops.push((op, right));
        }

        if ops.is_empty() {
            return Ok(left);
        }
        self.node(
            ExprKind::Compare {
                left: Box::new(left),
                ops,
            },
            span,
        )
    }

    fn arith(&self, pair: Pair<'_, Rule>) -> Result<Expr, ParseError> {
        let span: Span = pair.as_span().into();

        // The Pratt parser recurses once per operator in the worst case
        // (`- - - x`, `a ** b ** c`), so the chain length is bounded first.
        let operators = pair
            .clone()
            .into_inner()
            .filter(|p| {
                !matches!(
                    p.as_rule(),
                    Rule::none_lit
                        | Rule::true_lit
                        | Rule::false_lit
                        | Rule::integer
                        | Rule::float
                        | Rule::imaginary
                        | Rule::strings
                        | Rule::ident
                        | Rule::paren
                        | Rule::bracket
                        | Rule::brace
                )
            })
            .count();
        if operators >= self.max_tree_depth {
            return Err(self.error(
                span,
                ParseErrorKind::MaxDepthExceeded {
                    max_depth: self.max_tree_depth,
                },
            ));
        }

        PRATT_PARSER
            .map_primary(|primary| self.primary(primary))
            .map_prefix(|op, rhs| {
                let rhs = rhs?;
                let op_kind = match op.as_rule() {
                    Rule::neg => UnaryOp::Neg,
                    Rule::pos => UnaryOp::Pos,
                    Rule::invert => UnaryOp::Invert,
                    _ => return Err(self.unexpected(&op)),
                };
                let span = Span::new(op.as_span().start(), rhs.span.0.end);
                self.node(
                    ExprKind::Unary {
                        op: op_kind,
                        operand: Box::new(rhs),
                    },
                    span,
                )
            })
            .map_infix(|lhs, op, rhs| {
                let (lhs, rhs) = (lhs?, rhs?);
                let op = match op.as_rule() {
                    Rule::add => BinaryOp::Add,
                    Rule::sub => BinaryOp::Sub,
                    Rule::mul => BinaryOp::Mul,
                    Rule::div => BinaryOp::Div,
                    Rule::floor_div => BinaryOp::FloorDiv,
                    Rule::modulo => BinaryOp::Mod,
                    Rule::pow => BinaryOp::Pow,
                    Rule::lshift => BinaryOp::LShift,
                    Rule::rshift => BinaryOp::RShift,
                    Rule::bit_or => BinaryOp::BitOr,
                    Rule::bit_xor => BinaryOp::BitXor,
                    Rule::bit_and => BinaryOp::BitAnd,
                    _ => return Err(self.unexpected(&op)),
                };
                let span = Span::combine(&lhs.span, &rhs.span);
                self.node(
                    ExprKind::Binary {
                        op,
                        left: Box::new(lhs),
                        right: Box::new(rhs),
                    },
                    span,
                )
            })
            .map_postfix(|lhs, op| self.postfix(lhs?, op))
            .parse(pair.into_inner())
    }

    fn postfix(&self, lhs: Expr, op: Pair<'_, Rule>) -> Result<Expr, ParseError> {
        let span = Span::new(lhs.span.0.start, op.as_span().end());
        match op.as_rule() {
            Rule::call_op => self.call(lhs, op, span),
            Rule::index_op => {
                let list = self.next_pair(&mut op.into_inner(), span.clone())?;
                let index = self.subscript_list(list)?;
                self.node(
                    ExprKind::Subscript {
                        value: Box::new(lhs),
                        index: Box::new(index),
                    },
                    span,
                )
            }
            Rule::attr_op => {
                let attr = self
                    .next_pair(&mut op.into_inner(), span.clone())?
                    .as_str()
                    .to_string();
                self.node(
                    ExprKind::Attribute {
                        value: Box::new(lhs),
                        attr,
                    },
                    span,
                )
            }
            _ => Err(self.unexpected(&op)),
        }
    }

    fn call(&self, func: Expr, op: Pair<'_, Rule>, span: Span) -> Result<Expr, ParseError> {
        let mut args = Vec::new();
        let mut keywords: Vec<Keyword> = Vec::new();
        let mut generator = None;

        for p in op.into_inner() {
            match p.as_rule() {
                Rule::keyword_arg => {
                    let arg_span: Span = p.as_span().into();
                    let mut inner = p.into_inner();
                    let name = self.next_pair(&mut inner, arg_span.clone())?.as_str();
                    if keywords.iter().any(|k| k.name == name) {
                        return Err(self.unsupported(
                            arg_span,
                            format!("keyword argument repeated: {}", name),
                        ));
                    }
                    let value = self.expr(self.next_pair(&mut inner, arg_span)?)?;
                    keywords.push(Keyword {
                        name: name.to_string(),
                        value,
                    });
                }
                Rule::comp_for => generator = Some(p),
                _ => {
                    if !keywords.is_empty() {
                        return Err(self.unsupported(
                            p.as_span().into(),
                            "positional argument follows keyword argument",
                        ));
                    }
                    args.push(self.expr(p)?);
                }
            }
        }

        if let Some(comp) = generator {
            let element = match (args.pop(), args.is_empty() && keywords.is_empty()) {
                (Some(element), true) => element,
                _ => {
                    return Err(self.unsupported(
                        comp.as_span().into(),
                        "Generator expression must be parenthesized",
                    ));
                }
            };
            let gen_span = Span::new(element.span.0.start, comp.as_span().end());
            args.push(self.comprehension(
                ComprehensionKind::Generator,
                Element::Single(element),
                comp,
                gen_span,
            )?);
        }

        self.node(
            ExprKind::Call {
                func: Box::new(func),
                args,
                keywords,
            },
            span,
        )
    }

    /// `x[i]`, `x[a:b]`, `x[i, j:k]`.
    fn subscript_list(&self, pair: Pair<'_, Rule>) -> Result<Expr, ParseError> {
        let span: Span = pair.as_span().into();
        let mut items = Vec::new();
        let mut trailing = false;
        for p in pair.into_inner() {
            match p.as_rule() {
                Rule::trailing_comma => trailing = true,
                _ => items.push(self.subscript(p)?),
            }
        }
        if items.len() == 1 && !trailing {
            if let Some(only) = items.pop() {
                return Ok(only);
            }
        }
        self.node(ExprKind::Tuple(items), span)
    }

    fn subscript(&self, pair: Pair<'_, Rule>) -> Result<Expr, ParseError> {
        let span: Span = pair.as_span().into();
        let mut lower = None;
        let mut tail = None;
        for p in pair.into_inner() {
            match p.as_rule() {
                Rule::slice_tail => tail = Some(p),
                _ => lower = Some(Box::new(self.expr(p)?)),
            }
        }

        let Some(tail) = tail else {
            return match lower {
                Some(index) => Ok(*index),
                None => Err(self.unsupported(span, "empty subscript")),
            };
        };

        let mut upper = None;
        let mut step = None;
        for part in tail.into_inner() {
            let rule = part.as_rule();
            let part_span: Span = part.as_span().into();
            let value = Box::new(self.expr(self.next_pair(&mut part.into_inner(), part_span)?)?);
            match rule {
                Rule::slice_upper => upper = Some(value),
                _ => step = Some(value),
            }
        }
        self.node(ExprKind::Slice { lower, upper, step }, span)
    }

    fn primary(&self, pair: Pair<'_, Rule>) -> Result<Expr, ParseError> {
        let span: Span = pair.as_span().into();
        match pair.as_rule() {
            Rule::none_lit => self.node(ExprKind::Literal(Literal::None), span),
            Rule::true_lit => self.node(ExprKind::Literal(Literal::Bool(true)), span),
            Rule::false_lit => self.node(ExprKind::Literal(Literal::Bool(false)), span),
            Rule::integer => {
                let value = self.integer(&pair)?;
                self.node(ExprKind::Literal(Literal::Int(value)), span)
            }
            Rule::float => {
                let value = self.float(pair.as_str(), span.clone())?;
                self.node(ExprKind::Literal(Literal::Float(value)), span)
            }
            Rule::imaginary => {
                let text = pair.as_str();
                let value = self.float(&text[..text.len() - 1], span.clone())?;
                self.node(ExprKind::Literal(Literal::Imaginary(value)), span)
            }
            Rule::strings => {
                let literal = self.strings(pair)?;
                self.node(ExprKind::Literal(literal), span)
            }
            Rule::ident => self.node(ExprKind::Name(pair.as_str().to_string()), span),
            Rule::paren => self.paren(pair),
            Rule::bracket => self.bracket(pair),
            Rule::brace => self.brace(pair),
            Rule::expression
            | Rule::disjunction
            | Rule::conjunction
            | Rule::inversion
            | Rule::comparison
            | Rule::arith => self.expr(pair),
            _ => Err(self.unexpected(&pair)),
        }
    }

    fn integer(&self, pair: &Pair<'_, Rule>) -> Result<i64, ParseError> {
        let text = pair.as_str();
        let span: Span = pair.as_span().into();
        let digits: String = text.chars().filter(|c| *c != '_').collect();
        let lower = digits.to_ascii_lowercase();

        let parsed = if let Some(hex) = lower.strip_prefix("0x") {
            i64::from_str_radix(hex, 16)
        } else if let Some(oct) = lower.strip_prefix("0o") {
            i64::from_str_radix(oct, 8)
        } else if let Some(bin) = lower.strip_prefix("0b") {
            i64::from_str_radix(bin, 2)
        } else {
            if digits.len() > 1 && digits.starts_with('0') && digits.bytes().any(|b| b != b'0') {
                return Err(self.unsupported(
                    span,
                    "leading zeros in decimal integer literals are not permitted; \
                     use an 0o prefix for octal integers",
                ));
            }
            digits.parse::<i64>()
        };

        parsed.map_err(|_| {
            self.error(
                span,
                ParseErrorKind::InvalidNumber {
                    text: text.to_string(),
                },
            )
        })
    }

    fn float(&self, text: &str, span: Span) -> Result<f64, ParseError> {
        let digits: String = text.chars().filter(|c| *c != '_').collect();
        digits.parse::<f64>().map_err(|_| {
            self.error(
                span,
                ParseErrorKind::InvalidNumber {
                    text: text.to_string(),
                },
            )
        })
    }

    /// Adjacent literals concatenate; mixing `str` and `bytes` is an error.
    fn strings(&self, pair: Pair<'_, Rule>) -> Result<Literal, ParseError> {
        let mut text = String::new();
        let mut bytes = Vec::new();
        let mut is_bytes_literal = None;

        for literal in pair.into_inner() {
            let span: Span = literal.as_span().into();
            let mut prefix = String::new();
            let mut body = "";
            for part in literal.into_inner() {
                match part.as_rule() {
                    Rule::string_prefix => prefix = part.as_str().to_ascii_lowercase(),
                    _ => body = part.into_inner().next().map(|b| b.as_str()).unwrap_or(""),
                }
            }
            let raw = prefix.contains('r');
            let is_bytes = prefix.contains('b');

            match is_bytes_literal {
                Some(previous) if previous != is_bytes => {
                    return Err(self.unsupported(span, "cannot mix bytes and nonbytes literals"));
                }
                _ => is_bytes_literal = Some(is_bytes),
            }

            let literal_error = |err: UnescapeError| {
                self.error(
                    span.clone(),
                    ParseErrorKind::InvalidLiteral {
                        message: err.to_string(),
                    },
                )
            };
            if is_bytes {
                bytes.extend(unescape_bytes(body, raw).map_err(literal_error)?);
            } else {
                text.push_str(&unescape_string(body, raw).map_err(literal_error)?);
            }
        }

        Ok(match is_bytes_literal {
            Some(true) => Literal::Bytes(bytes),
            _ => Literal::Str(text),
        })
    }

    /// `()`, `(x)`, `(x,)`, `(x, y)` and `(x for x in y)`.
    fn paren(&self, pair: Pair<'_, Rule>) -> Result<Expr, ParseError> {
        let span: Span = pair.as_span().into();
        let mut inner = pair.into_inner();
        let Some(first) = inner.next() else {
            return self.node(ExprKind::Tuple(Vec::new()), span);
        };
        let first = self.expr(first)?;
        match inner.next() {
            None => Ok(first),
            Some(tail) if tail.as_rule() == Rule::comp_for => self.comprehension(
                ComprehensionKind::Generator,
                Element::Single(first),
                tail,
                span,
            ),
            Some(tail) => {
                let mut items = vec![first];
                for p in tail.into_inner() {
                    items.push(self.expr(p)?);
                }
                self.node(ExprKind::Tuple(items), span)
            }
        }
    }

    /// `[...]` lists and list comprehensions.
    fn bracket(&self, pair: Pair<'_, Rule>) -> Result<Expr, ParseError> {
        let span: Span = pair.as_span().into();
        let mut items = Vec::new();
        for p in pair.into_inner() {
            if p.as_rule() == Rule::comp_for {
                let element = items.pop().ok_or_else(|| self.unexpected(&p))?;
                return self.comprehension(
                    ComprehensionKind::List,
                    Element::Single(element),
                    p,
                    span,
                );
            }
            items.push(self.expr(p)?);
        }
        self.node(ExprKind::List(items), span)
    }

    /// `{}` dicts, `{...}` sets and their comprehensions.
    fn brace(&self, pair: Pair<'_, Rule>) -> Result<Expr, ParseError> {
        let span: Span = pair.as_span().into();
        let mut inner = pair.into_inner();
        let Some(first) = inner.next() else {
            return self.node(ExprKind::Dict(Vec::new()), span);
        };
        let first = self.expr(first)?;
        let tail = self.next_pair(&mut inner, span.clone())?;

        match tail.as_rule() {
            Rule::dict_tail => {
                let tail_span: Span = tail.as_span().into();
                let mut parts = tail.into_inner();
                let value = self.expr(self.next_pair(&mut parts, tail_span)?)?;
                let mut entries = vec![(first, value)];
                for p in parts {
                    match p.as_rule() {
                        Rule::comp_for => {
                            let (key, value) = entries.pop().ok_or_else(|| self.unexpected(&p))?;
                            return self.comprehension(
                                ComprehensionKind::Dict,
                                Element::Pair(key, value),
                                p,
                                span,
                            );
                        }
                        _ => {
                            let entry_span: Span = p.as_span().into();
                            let mut kv = p.into_inner();
                            let key = self.expr(self.next_pair(&mut kv, entry_span.clone())?)?;
                            let value = self.expr(self.next_pair(&mut kv, entry_span)?)?;
                            entries.push((key, value));
                        }
                    }
                }
                self.node(ExprKind::Dict(entries), span)
            }
            _ => {
                let mut items = vec![first];
                for p in tail.into_inner() {
                    if p.as_rule() == Rule::comp_for {
                        let element = items.pop().ok_or_else(|| self.unexpected(&p))?;
                        return self.comprehension(
                            ComprehensionKind::Set,
                            Element::Single(element),
                            p,
                            span,
                        );
                    }
                    items.push(self.expr(p)?);
                }
                self.node(ExprKind::Set(items), span)
            }
        }
    }

    fn comprehension(
        &self,
        kind: ComprehensionKind,
        element: Element,
        comp_for: Pair<'_, Rule>,
        span: Span,
    ) -> Result<Expr, ParseError> {
        let generators = comp_for
            .into_inner()
            .map(|clause| self.comp_clause(clause))
            .collect::<Result<Vec<_>, _>>()?;
        self.node(
            ExprKind::Comprehension {
                kind,
                element: Box::new(element),
                generators,
            },
            span,
        )
    }

    fn comp_clause(&self, pair: Pair<'_, Rule>) -> Result<Generator, ParseError> {
        let span: Span = pair.as_span().into();
        let mut parts = operands(pair);
        let target = match parts.next() {
            Some(p) => self.target_list(p)?,
            None => return Err(self.unsupported(span, "missing comprehension target")),
        };
        let iter = match parts.next() {
            Some(p) => self.expr(p)?,
            None => return Err(self.unsupported(span, "missing comprehension iterable")),
        };
        let mut conditions = Vec::new();
        for cond in parts {
            for p in operands(cond) {
                conditions.push(self.expr(p)?);
            }
        }
        Ok(Generator {
            target,
            iter,
            conditions,
            span,
        })
    }

    fn target_list(&self, pair: Pair<'_, Rule>) -> Result<Target, ParseError> {
        let (mut targets, trailing) = self.targets(pair)?;
        if targets.len() == 1 && !trailing {
            if let Some(only) = targets.pop() {
                return Ok(only);
            }
        }
        Ok(Target::Tuple(targets))
    }

    fn targets(&self, pair: Pair<'_, Rule>) -> Result<(Vec<Target>, bool), ParseError> {
        let mut targets = Vec::new();
        let mut trailing = false;
        for p in pair.into_inner() {
            match p.as_rule() {
                Rule::trailing_comma => trailing = true,
                Rule::name => targets.push(Target::Name(p.as_str().to_string())),
                Rule::target_group => {
                    // `[a]` always unpacks; `(a)` is just `a`.
                    let is_list = p.as_str().starts_with('[');
                    let group_span: Span = p.as_span().into();
                    let list = self.next_pair(&mut p.into_inner(), group_span)?;
                    if is_list {
                        targets.push(Target::Tuple(self.targets(list)?.0));
                    } else {
                        targets.push(self.target_list(list)?);
                    }
                }
                _ => return Err(self.unexpected(&p)),
            }
        }
        Ok((targets, trailing))
    }
}
