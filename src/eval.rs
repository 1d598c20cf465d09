// eval.rs

use std::io::Write;
use std::mem::size_of;

use crate::builtins::{self, MAX_BYTES};
use crate::error::EvalError;
use crate::parser::{parse, BinOp, Expr, UnaryOp};
use crate::value::{list_weight, Value};

/// Walks a parsed expression. `out` is where builtins such as `help()`
/// print; comprehension variables live in `scope`.
pub struct Evaluator<'a> {
    out: &'a mut dyn Write,
    scope: Vec<(String, Value)>,
}

/// Parse and evaluate `src` in one go.
pub fn evaluate(src: &str, out: &mut dyn Write) -> Result<Value, EvalError> {
    let expr = parse(src)?;
    Evaluator::new(out).eval(&expr)
}

fn unsupported(op: &str, l: &Value, r: &Value) -> EvalError {
    EvalError::Type(format!(
        "unsupported operand type(s) for {}: '{}' and '{}'",
        op,
        l.type_name(),
        r.type_name()
    ))
}

fn check_size(bytes: usize) -> Result<(), EvalError> {
    if bytes > MAX_BYTES {
        return Err(EvalError::Value("result too large".into()));
    }
    Ok(())
}

fn repeat_str(s: &str, n: i64) -> Result<Value, EvalError> {
    let n = usize::try_from(n).unwrap_or(0);
    check_size(s.len().saturating_mul(n))?;
    Ok(Value::Str(s.repeat(n)))
}

fn repeat_list(items: &[Value], n: i64) -> Result<Value, EvalError> {
    let n = usize::try_from(n).unwrap_or(0);
    check_size(list_weight(items).saturating_mul(n))?;
    let mut out = Vec::with_capacity(items.len() * n);
    for _ in 0..n {
        out.extend_from_slice(items);
    }
    Ok(Value::List(out))
}

fn as_float(v: &Value) -> Option<f64> {
    match v {
        Value::Int(i) => Some(*i as f64),
        Value::Float(f) => Some(*f),
        _ => None,
    }
}

fn floor_div(a: i64, b: i64) -> Result<i64, EvalError> {
    if b == 0 {
        return Err(EvalError::ZeroDivision);
    }
    let q = a.checked_div(b).ok_or(EvalError::Overflow)?;
    if a % b != 0 && ((a < 0) != (b < 0)) {
        Ok(q - 1)
    } else {
        Ok(q)
    }
}

fn modulo(a: i64, b: i64) -> Result<i64, EvalError> {
    if b == 0 {
        return Err(EvalError::ZeroDivision);
    }
    // i64::MIN % -1 overflows in Rust but is 0 mathematically
    let r = a.checked_rem(b).unwrap_or(0);
    if r != 0 && ((r < 0) != (b < 0)) {
        Ok(r + b)
    } else {
        Ok(r)
    }
}

fn int_pow(base: i64, exp: i64) -> Result<Value, EvalError> {
    if exp < 0 {
        return Ok(Value::Float((base as f64).powf(exp as f64)));
    }
    let exp = u32::try_from(exp).map_err(|_| EvalError::Overflow)?;
    base.checked_pow(exp).map(Value::Int).ok_or(EvalError::Overflow)
}

fn binary(op: BinOp, l: Value, r: Value) -> Result<Value, EvalError> {
    use Value::*;
    match (op, l, r) {
        (BinOp::Add, Int(a), Int(b)) => a.checked_add(b).map(Int).ok_or(EvalError::Overflow),
        (BinOp::Sub, Int(a), Int(b)) => a.checked_sub(b).map(Int).ok_or(EvalError::Overflow),
        (BinOp::Mul, Int(a), Int(b)) => a.checked_mul(b).map(Int).ok_or(EvalError::Overflow),
        (BinOp::FloorDiv, Int(a), Int(b)) => floor_div(a, b).map(Int),
        (BinOp::Mod, Int(a), Int(b)) => modulo(a, b).map(Int),
        (BinOp::Pow, Int(a), Int(b)) => int_pow(a, b),

        (BinOp::Add, Str(mut a), Str(b)) => {
            check_size(a.len().saturating_add(b.len()))?;
            a.push_str(&b);
            Ok(Str(a))
        }
        (BinOp::Add, List(mut a), List(b)) => {
            check_size(list_weight(&a).saturating_add(list_weight(&b)))?;
            a.extend(b);
            Ok(List(a))
        }
        (BinOp::Mul, Str(s), Int(n)) | (BinOp::Mul, Int(n), Str(s)) => repeat_str(&s, n),
        (BinOp::Mul, List(items), Int(n)) | (BinOp::Mul, Int(n), List(items)) => {
            repeat_list(&items, n)
        }

        (op, l, r) => {
            let (Some(a), Some(b)) = (as_float(&l), as_float(&r)) else {
                let symbol = match op {
                    BinOp::Add => "+",
                    BinOp::Sub => "-",
                    BinOp::Mul => "*",
                    BinOp::Div => "/",
                    BinOp::FloorDiv => "//",
                    BinOp::Mod => "%",
                    BinOp::Pow => "** or pow()",
                };
                return Err(unsupported(symbol, &l, &r));
            };
            let value = match op {
                BinOp::Add => a + b,
                BinOp::Sub => a - b,
                BinOp::Mul => a * b,
                BinOp::Pow => a.powf(b),
                BinOp::Div | BinOp::FloorDiv | BinOp::Mod if b == 0.0 => {
                    return Err(EvalError::ZeroDivision)
                }
                BinOp::Div => a / b,
                BinOp::FloorDiv => (a / b).floor(),
                BinOp::Mod => a - b * (a / b).floor(),
            };
            Ok(Float(value))
        }
    }
}

fn index_of(len: usize, index: i64, what: &str) -> Result<usize, EvalError> {
    let len = len as i64;
    let normalized = if index < 0 { len + index } else { index };
    if (0..len).contains(&normalized) {
        Ok(normalized as usize)
    } else {
        Err(EvalError::Index(format!("{} index out of range", what)))
    }
}

fn iterate(value: Value) -> Result<Vec<Value>, EvalError> {
    match value {
        Value::List(items) => Ok(items),
        Value::Str(s) => {
            // one small string per character
            let count = s.chars().count();
            check_size(count.saturating_mul(size_of::<Value>() + 4))?;
            Ok(s.chars().map(|c| Value::Str(c.to_string())).collect())
        }
        other => Err(EvalError::Type(format!(
            "'{}' object is not iterable",
            other.type_name()
        ))),
    }
}

fn string_method(s: &str, name: &str, args: Vec<Value>) -> Result<Value, EvalError> {
    let given = args.len();
    let want = move |n: usize| {
        if given == n {
            Ok(())
        } else {
            Err(EvalError::Type(format!(
                "str.{}() takes {} argument(s) ({} given)",
                name, n, given
            )))
        }
    };
    match name {
        "upper" => want(0).map(|_| Value::Str(s.to_uppercase())),
        "lower" => want(0).map(|_| Value::Str(s.to_lowercase())),
        "strip" => want(0).map(|_| Value::Str(s.trim().to_string())),
        "replace" => {
            want(2)?;
            match (&args[0], &args[1]) {
                (Value::Str(from), Value::Str(to)) => {
                    // an empty pattern matches around every character
                    let hits = if from.is_empty() {
                        s.chars().count() + 1
                    } else {
                        s.matches(from.as_str()).count()
                    };
                    check_size(s.len().saturating_add(hits.saturating_mul(to.len())))?;
                    Ok(Value::Str(s.replace(from.as_str(), to)))
                }
                _ => Err(EvalError::Type("str.replace() arguments must be str".into())),
            }
        }
        "join" => {
            want(1)?;
            let items = iterate(args.into_iter().next().unwrap_or(Value::List(Vec::new())))?;
            let mut parts = Vec::with_capacity(items.len());
            for (i, item) in items.into_iter().enumerate() {
                match item {
                    Value::Str(part) => parts.push(part),
                    other => {
                        return Err(EvalError::Type(format!(
                            "sequence item {}: expected str instance, {} found",
                            i,
                            other.type_name()
                        )))
                    }
                }
            }
            let total = parts
                .iter()
                .fold(s.len().saturating_mul(parts.len().saturating_sub(1)), |acc, p| {
                    acc.saturating_add(p.len())
                });
            check_size(total)?;
            Ok(Value::Str(parts.join(s)))
        }
        _ => Err(EvalError::Type(format!("'str' object has no attribute '{}'", name))),
    }
}

impl<'a> Evaluator<'a> {
    pub fn new(out: &'a mut dyn Write) -> Self {
        Self { out, scope: Vec::new() }
    }

    fn lookup(&self, name: &str) -> Result<Value, EvalError> {
        if let Some((_, v)) = self.scope.iter().rev().find(|(n, _)| n == name) {
            return Ok(v.clone());
        }
        if let Some(v) = builtins::constant(name) {
            return Ok(v);
        }
        builtins::lookup(name)
            .map(Value::Function)
            .ok_or_else(|| EvalError::Name(name.to_string()))
    }

    fn eval_args(&mut self, args: &[Expr]) -> Result<Vec<Value>, EvalError> {
        args.iter().map(|a| self.eval(a)).collect()
    }

    fn eval_list(&mut self, items: &[Expr]) -> Result<Vec<Value>, EvalError> {
        let mut out = Vec::with_capacity(items.len());
        let mut weight = 0usize;
        for item in items {
            let value = self.eval(item)?;
            weight = weight.saturating_add(value.weight());
            check_size(weight)?;
            out.push(value);
        }
        Ok(out)
    }

    pub fn eval(&mut self, expr: &Expr) -> Result<Value, EvalError> {
        match expr {
            Expr::Int(i) => Ok(Value::Int(*i)),
            Expr::Float(f) => Ok(Value::Float(*f)),
            Expr::Str(s) => Ok(Value::Str(s.clone())),
            Expr::Name(name) => self.lookup(name),
            Expr::List(items) => Ok(Value::List(self.eval_list(items)?)),
            Expr::Comprehension { elem, var, iter } => {
                let items = iterate(self.eval(iter)?)?;
                let mut out = Vec::with_capacity(items.len());
                let mut weight = 0usize;
                for item in items {
                    self.scope.push((var.clone(), item));
                    let result = self.eval(elem);
                    self.scope.pop();
                    let value = result?;
                    weight = weight.saturating_add(value.weight());
                    check_size(weight)?;
                    out.push(value);
                }
                Ok(Value::List(out))
            }
            Expr::Unary(op, inner) => match (op, self.eval(inner)?) {
                (UnaryOp::Neg, Value::Int(i)) => i.checked_neg().map(Value::Int).ok_or(EvalError::Overflow),
                (UnaryOp::Neg, Value::Float(f)) => Ok(Value::Float(-f)),
                (UnaryOp::Pos, v @ (Value::Int(_) | Value::Float(_))) => Ok(v),
                (op, v) => Err(EvalError::Type(format!(
                    "bad operand type for unary {}: '{}'",
                    if *op == UnaryOp::Neg { "-" } else { "+" },
                    v.type_name()
                ))),
            },
            Expr::Binary(op, l, r) => {
                let l = self.eval(l)?;
                let r = self.eval(r)?;
                binary(*op, l, r)
            }
            Expr::Call { func, args } => {
                let func = self.eval(func)?;
                let args = self.eval_args(args)?;
                match func {
                    Value::Function(name) => builtins::call_builtin(name, args, &mut *self.out),
                    other => Err(EvalError::Type(format!(
                        "'{}' object is not callable",
                        other.type_name()
                    ))),
                }
            }
            Expr::Method { recv, name, args } => {
                let recv = self.eval(recv)?;
                let args = self.eval_args(args)?;
                match recv {
                    Value::Str(s) => string_method(&s, name, args),
                    other => Err(EvalError::Type(format!(
                        "'{}' object has no attribute '{}'",
                        other.type_name(),
                        name
                    ))),
                }
            }
            Expr::Index { target, index } => {
                let target = self.eval(target)?;
                let Value::Int(index) = self.eval(index)? else {
                    return Err(EvalError::Type("indices must be integers".into()));
                };
                match target {
                    Value::Str(s) => {
                        let len = s.chars().count();
                        let at = index_of(len, index, "string")?;
                        Ok(Value::Str(s.chars().nth(at).map(String::from).unwrap_or_default()))
                    }
                    Value::List(mut items) => {
                        let at = index_of(items.len(), index, "list")?;
                        Ok(items.swap_remove(at))
                    }
                    other => Err(EvalError::Type(format!(
                        "'{}' object is not subscriptable",
                        other.type_name()
                    ))),
                }
            }
        }
    }
}
