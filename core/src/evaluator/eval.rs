//! Core evaluation logic.

use std::rc::Rc;

use hashbrown::HashMap;
use tracing::trace;

use crate::{
    evaluator::{ExecutionError, RuntimeError, operators},
    guards::AccessGuard,
    parser::{
        BoolOp, ComparisonOp, ComprehensionKind, Element, Expr, ExprKind, Generator, Keyword,
        Literal, Target, UnaryOp,
    },
    policy::Policy,
    scope_stack::{CompleteScope, IncompleteScope, Lookup, ScopeStack},
    stdlib,
    values::{
        Args, MAX_COLLECTION_LEN, OneShot, SliceValue, Value, check_len, is_identical, py_eq,
        rich_compare,
    },
};

/// Evaluator for validated expressions.
///
/// One evaluator serves one evaluation: the caller's context sits at the
/// bottom of the scope stack and comprehensions push their own scopes above
/// it.
pub struct Evaluator<'a> {
    guard: &'a dyn AccessGuard,
    policy: &'a Policy,
    scopes: ScopeStack<'a, Value>,
    max_depth: usize,
    depth: usize,
}

/// What a comprehension accumulates.
enum Collected {
    Items(Vec<Value>),
    Pairs(Vec<(Value, Value)>),
}

impl Collected {
    fn len(&self) -> usize {
        match self {
            Collected::Items(items) => items.len(),
            Collected::Pairs(pairs) => pairs.len(),
        }
    }
}

impl<'a> Evaluator<'a> {
    pub fn new(
        guard: &'a dyn AccessGuard,
        policy: &'a Policy,
        context: &'a HashMap<String, Value>,
        max_depth: usize,
    ) -> Self {
        let mut scopes = ScopeStack::new();
        scopes.push(CompleteScope::new(context));
        Self {
            guard,
            policy,
            scopes,
            max_depth,
            depth: 0,
        }
    }

    /// Evaluate an expression tree.
    pub fn eval(&mut self, expr: &Expr) -> Result<Value, ExecutionError> {
        self.eval_expr(expr)
    }

    fn at(expr: &Expr, error: RuntimeError) -> ExecutionError {
        ExecutionError {
            error,
            span: expr.span.clone(),
        }
    }

    fn eval_expr(&mut self, expr: &Expr) -> Result<Value, ExecutionError> {
        // Check depth before recursing
        if self.depth >= self.max_depth {
            return Err(Self::at(
                expr,
                RuntimeError::DepthExceeded {
                    max_depth: self.max_depth,
                },
            ));
        }

        self.depth += 1;
        let result = self.eval_expr_inner(expr);
        self.depth -= 1;

        result
    }

    fn eval_expr_inner(&mut self, expr: &Expr) -> Result<Value, ExecutionError> {
        let fail = |error| Self::at(expr, error);
        match &expr.kind {
            ExprKind::Literal(literal) => Ok(literal_value(literal)),

            ExprKind::Name(name) => self.resolve(name).map_err(fail),

            ExprKind::Tuple(items) => Ok(Value::tuple(self.eval_all(items)?)),
            ExprKind::List(items) => Ok(Value::list(self.eval_all(items)?)),
            ExprKind::Set(items) => {
                let items = self.eval_all(items)?;
                Value::set(items).map_err(fail)
            }
            ExprKind::Dict(entries) => {
                check_len(entries.len()).map_err(fail)?;
                let mut pairs = Vec::with_capacity(entries.len());
                for (key, value) in entries {
                    let key = self.eval_expr(key)?;
                    let value = self.eval_expr(value)?;
                    pairs.push((key, value));
                }
                Value::dict(pairs).map_err(fail)
            }

            ExprKind::Attribute { value, attr } => {
                let object = self.eval_expr(value)?;
                self.guard.getattr(&object, attr).map_err(fail)
            }
            ExprKind::Subscript { value, index } => {
                let object = self.eval_expr(value)?;
                let key = self.eval_expr(index)?;
                self.guard.getitem(&object, &key).map_err(fail)
            }
            ExprKind::Slice { lower, upper, step } => {
                let mut bound = |part: &Option<Box<Expr>>| -> Result<Option<i64>, ExecutionError> {
                    let Some(part) = part else {
                        return Ok(None);
                    };
                    match self.eval_expr(part)? {
                        Value::None => Ok(None),
                        v => v.as_int().map(Some).ok_or_else(|| {
                            Self::at(
                                part,
                                RuntimeError::type_error(
                                    "slice indices must be integers or None or have an __index__ method",
                                ),
                            )
                        }),
                    }
                };
                Ok(Value::Slice(SliceValue {
                    start: bound(lower)?,
                    stop: bound(upper)?,
                    step: bound(step)?,
                }))
            }

            ExprKind::Call {
                func,
                args,
                keywords,
            } => {
                let callee = self.eval_expr(func)?;
                let args = self.eval_args(args, keywords)?;
                trace!(callee = %callee.type_name(), "call");
                stdlib::call(&callee, args).map_err(fail)
            }

            ExprKind::Unary { op, operand } => {
                let value = self.eval_expr(operand)?;
                match op {
                    UnaryOp::Not => Ok(Value::Bool(!value.is_truthy())),
                    _ => operators::unary(*op, &value).map_err(fail),
                }
            }
            ExprKind::Binary { .. } => self.eval_binary(expr),

            ExprKind::Boolean { op, values } => {
                let mut last = Value::None;
                for value in values {
                    last = self.eval_expr(value)?;
                    let decided = match op {
                        BoolOp::And => !last.is_truthy(),
                        BoolOp::Or => last.is_truthy(),
                    };
                    if decided {
                        break;
                    }
                }
                Ok(last)
            }

            ExprKind::Compare { left, ops } => {
                let mut lhs = self.eval_expr(left)?;
                for (op, right) in ops {
                    let rhs = self.eval_expr(right)?;
                    if !compare(*op, &lhs, &rhs).map_err(fail)? {
                        return Ok(Value::Bool(false));
                    }
                    lhs = rhs;
                }
                Ok(Value::Bool(true))
            }

            ExprKind::If {
                cond,
                then_branch,
                else_branch,
            } => {
                if self.eval_expr(cond)?.is_truthy() {
                    self.eval_expr(then_branch)
                } else {
                    self.eval_expr(else_branch)
                }
            }

            ExprKind::Comprehension {
                kind,
                element,
                generators,
            } => self.eval_comprehension(expr, *kind, element, generators),
        }
    }

    /// Name resolution: comprehension scopes, then the context, then the
    /// policy's builtins and libraries.
    fn resolve(&self, name: &str) -> Result<Value, RuntimeError> {
        match self.scopes.lookup(name) {
            Lookup::Bound(value) => return Ok(value.clone()),
            Lookup::Unbound => {
                return Err(RuntimeError::UnboundLocal {
                    name: name.to_string(),
                });
            }
            Lookup::NotFound => {}
        }
        if self.policy.is_builtin_allowed(name) {
            if let Some(value) = stdlib::builtin(name) {
                return Ok(value);
            }
        }
        if let Some(library) = self.policy.libraries().find(|lib| *lib == name) {
            return Ok(Value::Module(library));
        }
        Err(RuntimeError::NameNotDefined {
            name: name.to_string(),
        })
    }

    fn eval_all(&mut self, items: &[Expr]) -> Result<Vec<Value>, ExecutionError> {
        items.iter().map(|item| self.eval_expr(item)).collect()
    }

    fn eval_args(&mut self, args: &[Expr], keywords: &[Keyword]) -> Result<Args, ExecutionError> {
        let positional = self.eval_all(args)?;
        let mut named = Vec::with_capacity(keywords.len());
        for keyword in keywords {
            named.push((keyword.name.clone(), self.eval_expr(&keyword.value)?));
        }
        Ok(Args::with_keywords(positional, named))
    }

    /// Binary operators nest to the left (`1 + 2 + 3` is `(1 + 2) + 3`), so
    /// long chains are folded along the left spine instead of recursing.
    fn eval_binary(&mut self, expr: &Expr) -> Result<Value, ExecutionError> {
        let mut spine = Vec::new();
        let mut node = expr;
        while let ExprKind::Binary { op, left, right } = &node.kind {
            spine.push((node, *op, right));
            node = left;
        }
        let mut acc = self.eval_expr(node)?;
        for (parent, op, right) in spine.into_iter().rev() {
            let rhs = self.eval_expr(right)?;
            acc = operators::binary(op, &acc, &rhs).map_err(|e| Self::at(parent, e))?;
        }
        Ok(acc)
    }

    // ========================================================================
    // Comprehensions
    // ========================================================================

    fn eval_comprehension(
        &mut self,
        expr: &Expr,
        kind: ComprehensionKind,
        element: &Element,
        generators: &[Generator],
    ) -> Result<Value, ExecutionError> {
        let Some(first) = generators.first() else {
            return Err(Self::at(
                expr,
                RuntimeError::type_error("comprehension without a for clause"),
            ));
        };
        // The outermost iterable is evaluated in the enclosing scope.
        let outer = self.eval_expr(&first.iter)?;

        let names = generators.iter().flat_map(|g| g.target.names());
        self.scopes.push(IncompleteScope::new(names));
        let mut out = match element {
            Element::Single(_) => Collected::Items(Vec::new()),
            Element::Pair(..) => Collected::Pairs(Vec::new()),
        };
        let result = self.run_generators(expr, generators, 0, outer, element, &mut out);
        // The comprehension scope is ours; it is always on top here.
        let _ = self.scopes.pop();
        result?;

        let fail = |error| Self::at(expr, error);
        match (kind, out) {
            (_, Collected::Pairs(pairs)) => Value::dict(pairs).map_err(fail),
            (ComprehensionKind::Set, Collected::Items(items)) => Value::set(items).map_err(fail),
            (ComprehensionKind::Generator, Collected::Items(items)) => {
                Ok(Value::Iterator(Rc::new(OneShot::new("generator", items))))
            }
            (_, Collected::Items(items)) => Ok(Value::list(items)),
        }
    }

    /// Runs clause `index` over `iterable`, recursing into the next clause
    /// for every item that passes the conditions. Each clause counts as one
    /// level of nesting.
    fn run_generators(
        &mut self,
        expr: &Expr,
        generators: &[Generator],
        index: usize,
        iterable: Value,
        element: &Element,
        out: &mut Collected,
    ) -> Result<(), ExecutionError> {
        if self.depth >= self.max_depth {
            return Err(Self::at(
                expr,
                RuntimeError::DepthExceeded {
                    max_depth: self.max_depth,
                },
            ));
        }

        self.depth += 1;
        let result = self.run_clause(expr, generators, index, iterable, element, out);
        self.depth -= 1;

        result
    }

    fn run_clause(
        &mut self,
        expr: &Expr,
        generators: &[Generator],
        index: usize,
        iterable: Value,
        element: &Element,
        out: &mut Collected,
    ) -> Result<(), ExecutionError> {
        let generator = &generators[index];
        let iter = self
            .guard
            .getiter(&iterable)
            .map_err(|e| Self::at(&generator.iter, e))?;
        'items: for item in iter {
            self.bind_target(&generator.target, item)
                .map_err(|e| ExecutionError {
                    error: e,
                    span: generator.span.clone(),
                })?;
            for condition in &generator.conditions {
                if !self.eval_expr(condition)?.is_truthy() {
                    continue 'items;
                }
            }
            match generators.get(index + 1) {
                Some(next) => {
                    let inner = self.eval_expr(&next.iter)?;
                    self.run_generators(expr, generators, index + 1, inner, element, out)?;
                }
                None => {
                    match (element, &mut *out) {
                        (Element::Single(e), Collected::Items(items)) => {
                            items.push(self.eval_expr(e)?);
                        }
                        (Element::Pair(k, v), Collected::Pairs(pairs)) => {
                            let key = self.eval_expr(k)?;
                            let value = self.eval_expr(v)?;
                            pairs.push((key, value));
                        }
                        _ => {}
                    }
                    if out.len() > MAX_COLLECTION_LEN {
                        check_len(out.len()).map_err(|e| Self::at(expr, e))?;
                    }
                }
            }
        }
        Ok(())
    }

    fn bind_target(&mut self, target: &Target, value: Value) -> Result<(), RuntimeError> {
        match target {
            Target::Name(name) => self.scopes.bind_in_current(name, value).map_err(|_| {
                RuntimeError::NameNotDefined {
                    name: name.to_string(),
                }
            }),
            Target::Tuple(targets) => {
                let items = unpack(self.guard, &value, targets.len())?;
                for (target, item) in targets.iter().zip(items) {
                    self.bind_target(target, item)?;
                }
                Ok(())
            }
        }
    }
}

fn literal_value(literal: &Literal) -> Value {
    match literal {
        Literal::None => Value::None,
        Literal::Bool(b) => Value::Bool(*b),
        Literal::Int(i) => Value::Int(*i),
        Literal::Float(f) => Value::Float(*f),
        Literal::Imaginary(im) => Value::complex(0.0, *im),
        Literal::Str(s) => Value::from(s.as_str()),
        Literal::Bytes(b) => Value::bytes(b.as_slice()),
    }
}

/// One link of a comparison chain.
fn compare(op: ComparisonOp, left: &Value, right: &Value) -> Result<bool, RuntimeError> {
    match op {
        ComparisonOp::Eq => Ok(py_eq(left, right)),
        ComparisonOp::Neq => Ok(!py_eq(left, right)),
        ComparisonOp::Lt | ComparisonOp::Le | ComparisonOp::Gt | ComparisonOp::Ge => {
            rich_compare(op, left, right)
        }
        ComparisonOp::In => operators::contains(right, left),
        ComparisonOp::NotIn => Ok(!operators::contains(right, left)?),
        ComparisonOp::Is => Ok(is_identical(left, right)),
        ComparisonOp::IsNot => Ok(!is_identical(left, right)),
    }
}

/// Unpacks exactly `expected` items from `value` for a tuple target.
fn unpack(
    guard: &dyn AccessGuard,
    value: &Value,
    expected: usize,
) -> Result<Vec<Value>, RuntimeError> {
    let iter = guard.getiter(value).map_err(|_| {
        RuntimeError::type_error(format!(
            "cannot unpack non-iterable {} object",
            value.type_name()
        ))
    })?;
    // One extra item is enough to tell "too many" apart.
    let items: Vec<Value> = iter.take(expected + 1).collect();
    match items.len() {
        n if n < expected => Err(RuntimeError::value_error(format!(
            "not enough values to unpack (expected {}, got {})",
            expected, n
        ))),
        n if n > expected => Err(RuntimeError::value_error(format!(
            "too many values to unpack (expected {})",
            expected
        ))),
        _ => Ok(items),
    }
}
