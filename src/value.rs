// value.rs

use std::fmt;
use std::mem::size_of;

use itertools::Itertools;

#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    Int(i64),
    Float(f64),
    Str(String),
    List(Vec<Value>),
    /// A builtin function referenced without calling it, e.g. `cs`.
    Function(&'static str),
}

impl Value {
    pub fn type_name(&self) -> &'static str {
        match self {
            Value::Int(_) => "int",
            Value::Float(_) => "float",
            Value::Str(_) => "str",
            Value::List(_) => "list",
            Value::Function(_) => "function",
        }
    }

    /// Approximate memory held by the value, in bytes.
    pub fn weight(&self) -> usize {
        match self {
            Value::Str(s) => size_of::<Value>().saturating_add(s.len()),
            Value::List(items) => size_of::<Value>().saturating_add(list_weight(items)),
            _ => size_of::<Value>(),
        }
    }

    /// Quoted form used inside lists: `'a'` rather than `a`.
    pub fn repr(&self) -> String {
        match self {
            Value::Str(s) => repr_str(s),
            other => other.to_string(),
        }
    }
}

/// Combined weight of list items, without the list itself.
pub fn list_weight(items: &[Value]) -> usize {
    items.iter().fold(0, |acc, v| acc.saturating_add(v.weight()))
}

fn repr_str(s: &str) -> String {
    let quote = if s.contains('\'') && !s.contains('"') { '"' } else { '\'' };
    let mut out = String::with_capacity(s.len() + 2);
    out.push(quote);
    for c in s.chars() {
        match c {
            '\\' => out.push_str("\\\\"),
            '\n' => out.push_str("\\n"),
            '\r' => out.push_str("\\r"),
            '\t' => out.push_str("\\t"),
            c if c == quote => {
                out.push('\\');
                out.push(c);
            }
            c if (c as u32) < 0x20 || c as u32 == 0x7f => {
                out.push_str(&format!("\\x{:02x}", c as u32));
            }
            c => out.push(c),
        }
    }
    out.push(quote);
    out
}

fn fmt_float(f: f64, out: &mut fmt::Formatter<'_>) -> fmt::Result {
    if f.is_nan() {
        write!(out, "nan")
    } else if f.is_infinite() {
        write!(out, "{}", if f > 0.0 { "inf" } else { "-inf" })
    } else if f != 0.0 && (f.abs() >= 1e16 || f.abs() < 1e-4) {
        // 1e+16, 1.5e-07: signed exponent of at least two digits
        let sci = format!("{:e}", f);
        let (mantissa, exp) = sci.split_once('e').unwrap_or((sci.as_str(), "0"));
        let exp: i32 = exp.parse().unwrap_or(0);
        let sign = if exp < 0 { '-' } else { '+' };
        write!(out, "{}e{}{:02}", mantissa, sign, exp.unsigned_abs())
    } else if f.fract() == 0.0 {
        write!(out, "{:.1}", f)
    } else {
        write!(out, "{}", f)
    }
}

/// The text that ends up on the clipboard.
impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Int(i) => write!(f, "{}", i),
            Value::Float(x) => fmt_float(*x, f),
            Value::Str(s) => f.write_str(s),
            Value::List(items) => write!(f, "[{}]", items.iter().map(Value::repr).join(", ")),
            Value::Function(name) => write!(f, "<function {}>", name),
        }
    }
}

impl From<String> for Value {
    fn from(s: String) -> Self {
        Value::Str(s)
    }
}

impl From<&str> for Value {
    fn from(s: &str) -> Self {
        Value::Str(s.to_string())
    }
}

impl From<i64> for Value {
    fn from(i: i64) -> Self {
        Value::Int(i)
    }
}
