// builtins.rs

use std::io::Write;
use std::mem::size_of;
use std::time::{SystemTime, UNIX_EPOCH};

use crate::checkdigit;
use crate::counterstring::{self, DEFAULT_MARKER};
use crate::error::EvalError;
use crate::util::writeln_ignore_broken_pipe;
use crate::value::Value;

/// Most memory, in bytes (see [`Value::weight`]), that any one string or
/// list built by an expression may take up.
pub const MAX_BYTES: usize = 1 << 26;

pub const BUILTINS: [&str; 15] = [
    "counterstring",
    "cs",
    "textfile",
    "now",
    "nowf",
    "asn",
    "asn_maker",
    "help",
    "str",
    "int",
    "float",
    "chr",
    "ord",
    "len",
    "range",
];

pub const CONSTANTS: [&str; 1] = ["CHR256"];

pub const HELP: &str = r#"
This program puts text into the clipboard based on a pattern you specify.

Enter an expression and the result will be copied to the clipboard.
For example

    "Hello!" * 3       # Hello!Hello!Hello!
    "a" * (2 ** 16)    # string of "a" that is 65536 characters long
    chr(13) * 10       # ten carriage returns

    "\r\n".join([str(i) for i in range(10)]) # Counting digits, each on a
                         separate line.

Also some convenience functions can be included:

    asn - Arrest Summons Number in valid format. Partly based on Unix time.
    asn_maker(seed) - add the check letter to a 19 character ASN seed

    counterstring(num[, char]) - counterstring of num characters, marker
                                 char defaults to *
    cs(num[, char]) - does the same as above

    now() - Integer Unix time in seconds
    now - as above but usual terminal brackets are not required

    nowf() - floating point Unix time in seconds
    nowf - as above but usual terminal brackets are not required

    textfile(filename) - read file

    CHR256 - all characters with codes 1 to 255

Other functions: str, int, float, chr, ord, len, range.
String methods: join, upper, lower, replace, strip.

A history of the last 10 expressions is kept and accessed as follows:
    ! - display contents of history
    !! - repeat the last item
    !-1 - another way of repeating the last item
    !-2 - repeat next to last item
    !0 - repeat the first item in history
    !9 - repeat the 10th item in history

Some functions can be called without the usual terminal brackets:
asn, help, now, nowf.
"#;

pub fn chr256() -> String {
    (1u8..=255).map(char::from).collect()
}

pub fn constant(name: &str) -> Option<Value> {
    match name {
        "CHR256" => Some(Value::Str(chr256())),
        _ => None,
    }
}

/// Builtin name with a `'static` lifetime, if `name` is one.
pub fn lookup(name: &str) -> Option<&'static str> {
    BUILTINS.iter().copied().find(|b| *b == name)
}

fn arity(name: &str, args: &[Value], min: usize, max: usize) -> Result<(), EvalError> {
    if args.len() < min || args.len() > max {
        let expected = if min == max {
            format!("{}", min)
        } else {
            format!("{} to {}", min, max)
        };
        return Err(EvalError::Type(format!(
            "{}() takes {} argument(s) ({} given)",
            name,
            expected,
            args.len()
        )));
    }
    Ok(())
}

fn int_arg(name: &str, value: &Value) -> Result<i64, EvalError> {
    match value {
        Value::Int(i) => Ok(*i),
        other => Err(EvalError::Type(format!(
            "{}() expected int, got '{}'",
            name,
            other.type_name()
        ))),
    }
}

fn str_arg<'a>(name: &str, value: &'a Value) -> Result<&'a str, EvalError> {
    match value {
        Value::Str(s) => Ok(s),
        other => Err(EvalError::Type(format!(
            "{}() expected str, got '{}'",
            name,
            other.type_name()
        ))),
    }
}

fn since_epoch() -> std::time::Duration {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .unwrap_or_default()
}

fn range(args: &[Value]) -> Result<Value, EvalError> {
    let ints = args
        .iter()
        .map(|a| int_arg("range", a))
        .collect::<Result<Vec<_>, _>>()?;
    let (start, stop, step) = match *ints.as_slice() {
        [stop] => (0, stop, 1),
        [start, stop] => (start, stop, 1),
        [start, stop, step] => (start, stop, step),
        _ => return arity("range", args, 1, 3).map(|_| Value::List(Vec::new())),
    };
    if step == 0 {
        return Err(EvalError::Value("range() arg 3 must not be zero".into()));
    }
    let span = if step > 0 {
        (stop as i128 - start as i128).max(0)
    } else {
        (start as i128 - stop as i128).max(0)
    };
    let count = (span + step.unsigned_abs() as i128 - 1) / step.unsigned_abs() as i128;
    if count.saturating_mul(size_of::<Value>() as i128) > MAX_BYTES as i128 {
        return Err(EvalError::Value("range() too large".into()));
    }
    // every element lies between start and stop, so the cast back is lossless
    let items = (0..count)
        .map(|i| Value::Int((start as i128 + i * step as i128) as i64))
        .collect();
    Ok(Value::List(items))
}

fn to_int(value: &Value) -> Result<Value, EvalError> {
    match value {
        Value::Int(i) => Ok(Value::Int(*i)),
        Value::Float(f) if f.is_finite() => {
            let t = f.trunc();
            if t < i64::MIN as f64 || t >= i64::MAX as f64 {
                return Err(EvalError::Overflow);
            }
            Ok(Value::Int(t as i64))
        }
        Value::Float(f) => Err(EvalError::Value(format!("cannot convert float {} to integer", f))),
        Value::Str(s) => {
            let cleaned: String = s.trim().chars().filter(|&c| c != '_').collect();
            cleaned.parse::<i64>().map(Value::Int).map_err(|_| {
                EvalError::Value(format!("invalid literal for int(): {}", Value::from(s.as_str()).repr()))
            })
        }
        other => Err(EvalError::Type(format!(
            "int() argument must be a string or a number, not '{}'",
            other.type_name()
        ))),
    }
}

fn to_float(value: &Value) -> Result<Value, EvalError> {
    match value {
        Value::Int(i) => Ok(Value::Float(*i as f64)),
        Value::Float(f) => Ok(Value::Float(*f)),
        Value::Str(s) => s.trim().parse::<f64>().map(Value::Float).map_err(|_| {
            EvalError::Value(format!("could not convert string to float: {}", Value::from(s.as_str()).repr()))
        }),
        other => Err(EvalError::Type(format!(
            "float() argument must be a string or a number, not '{}'",
            other.type_name()
        ))),
    }
}

/// Call builtin `name`. `out` receives anything the builtin prints.
pub fn call_builtin(name: &str, args: Vec<Value>, out: &mut dyn Write) -> Result<Value, EvalError> {
    match name {
        "counterstring" | "cs" => {
            arity(name, &args, 0, 2)?;
            let target = match args.first() {
                Some(v) => int_arg(name, v)?,
                None => 64,
            };
            let marker = match args.get(1) {
                Some(v) => str_arg(name, v)?,
                None => DEFAULT_MARKER,
            };
            let target = usize::try_from(target)
                .map_err(|_| EvalError::Value(format!("{}() length must not be negative", name)))?;
            if target > MAX_BYTES {
                return Err(EvalError::Value(format!("{}() length too large", name)));
            }
            Ok(Value::Str(counterstring::generate(target, marker)?))
        }
        "textfile" => {
            arity(name, &args, 1, 1)?;
            let path = str_arg(name, &args[0])?;
            std::fs::read_to_string(path)
                .map(Value::Str)
                .map_err(|source| EvalError::Io { path: path.to_string(), source })
        }
        "now" => {
            arity(name, &args, 0, 0)?;
            Ok(Value::Str(since_epoch().as_secs().to_string()))
        }
        "nowf" => {
            arity(name, &args, 0, 0)?;
            Ok(Value::Float(since_epoch().as_secs_f64()))
        }
        "asn" => {
            arity(name, &args, 0, 0)?;
            Ok(Value::Str(checkdigit::generate_asn(since_epoch())?))
        }
        "asn_maker" => {
            arity(name, &args, 1, 1)?;
            Ok(Value::Str(checkdigit::compute(str_arg(name, &args[0])?)?))
        }
        "help" => {
            arity(name, &args, 0, 0)?;
            let _ = writeln_ignore_broken_pipe(&mut *out, HELP);
            Ok(Value::from(HELP))
        }
        "str" => {
            arity(name, &args, 0, 1)?;
            Ok(Value::Str(args.first().map(Value::to_string).unwrap_or_default()))
        }
        "int" => {
            arity(name, &args, 1, 1)?;
            to_int(&args[0])
        }
        "float" => {
            arity(name, &args, 1, 1)?;
            to_float(&args[0])
        }
        "chr" => {
            arity(name, &args, 1, 1)?;
            let code = int_arg(name, &args[0])?;
            u32::try_from(code)
                .ok()
                .and_then(char::from_u32)
                .map(|c| Value::Str(c.to_string()))
                .ok_or_else(|| EvalError::Value(format!("chr() arg not in range: {}", code)))
        }
        "ord" => {
            arity(name, &args, 1, 1)?;
            let s = str_arg(name, &args[0])?;
            let mut chars = s.chars();
            match (chars.next(), chars.next()) {
                (Some(c), None) => Ok(Value::Int(c as i64)),
                _ => Err(EvalError::Type(format!(
                    "ord() expected a character, but string of length {} found",
                    s.chars().count()
                ))),
            }
        }
        "len" => {
            arity(name, &args, 1, 1)?;
            match &args[0] {
                Value::Str(s) => Ok(Value::Int(s.chars().count() as i64)),
                Value::List(items) => Ok(Value::Int(items.len() as i64)),
                other => Err(EvalError::Type(format!(
                    "object of type '{}' has no len()",
                    other.type_name()
                ))),
            }
        }
        "range" => range(&args),
        other => Err(EvalError::Name(other.to_string())),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io;

    fn call(name: &str, args: Vec<Value>) -> Result<Value, EvalError> {
        call_builtin(name, args, &mut io::sink())
    }

    #[test]
    fn counterstring_defaults() {
        let Value::Str(s) = call("cs", vec![]).unwrap() else {
            panic!("expected str");
        };
        assert_eq!(s.len(), 64);
        assert_eq!(
            call("counterstring", vec![Value::Int(5), Value::from("#")]).unwrap(),
            Value::from("2#4#6")
        );
        assert!(matches!(
            call("cs", vec![Value::Int(-1)]),
            Err(EvalError::Value(_))
        ));
        assert!(matches!(
            call("cs", vec![Value::Int(4), Value::from("")]),
            Err(EvalError::CounterString(_))
        ));
    }

    #[test]
    fn chr256_covers_one_to_255() {
        let s = chr256();
        assert_eq!(s.chars().count(), 255);
        assert_eq!(s.chars().next(), Some('\u{1}'));
        assert_eq!(s.chars().last(), Some('\u{ff}'));
    }

    #[test]
    fn time_functions() {
        let Value::Str(now) = call("now", vec![]).unwrap() else {
            panic!("expected str");
        };
        assert!(now.parse::<u64>().unwrap() > 1_600_000_000);
        assert!(matches!(call("nowf", vec![]).unwrap(), Value::Float(f) if f > 1.6e9));
        let Value::Str(asn) = call("asn", vec![]).unwrap() else {
            panic!("expected str");
        };
        assert_eq!(asn.len(), 20);
        assert!(asn.starts_with("1234AA"));
    }

    #[test]
    fn asn_maker_errors_surface() {
        assert!(matches!(
            call("asn_maker", vec![Value::from("123")]),
            Err(EvalError::CheckDigit(_))
        ));
        assert_eq!(
            call("asn_maker", vec![Value::from("1223AA8900000000000")]).unwrap(),
            Value::from("1223AA8900000000000M")
        );
    }

    #[test]
    fn help_prints_and_returns() {
        let mut out = Vec::new();
        let v = call_builtin("help", vec![], &mut out).unwrap();
        assert_eq!(v, Value::from(HELP));
        assert!(String::from_utf8(out).unwrap().contains("counterstring"));
    }

    #[test]
    fn conversions() {
        assert_eq!(call("int", vec![Value::from(" 42 ")]).unwrap(), Value::Int(42));
        assert_eq!(call("int", vec![Value::Float(-2.7)]).unwrap(), Value::Int(-2));
        assert!(matches!(call("int", vec![Value::from("x")]), Err(EvalError::Value(_))));
        assert_eq!(call("float", vec![Value::Int(3)]).unwrap(), Value::Float(3.0));
        assert_eq!(call("chr", vec![Value::Int(65)]).unwrap(), Value::from("A"));
        assert!(matches!(call("chr", vec![Value::Int(-1)]), Err(EvalError::Value(_))));
        assert_eq!(call("ord", vec![Value::from("é")]).unwrap(), Value::Int(233));
        assert_eq!(call("len", vec![Value::from("héllo")]).unwrap(), Value::Int(5));
        assert_eq!(call("str", vec![Value::Float(1.0)]).unwrap(), Value::from("1.0"));
    }

    #[test]
    fn ranges() {
        assert_eq!(
            call("range", vec![Value::Int(3)]).unwrap(),
            Value::List(vec![Value::Int(0), Value::Int(1), Value::Int(2)])
        );
        assert_eq!(
            call("range", vec![Value::Int(5), Value::Int(0), Value::Int(-2)]).unwrap(),
            Value::List(vec![Value::Int(5), Value::Int(3), Value::Int(1)])
        );
        assert_eq!(call("range", vec![Value::Int(-3)]).unwrap(), Value::List(vec![]));
        assert!(matches!(
            call("range", vec![Value::Int(0), Value::Int(1), Value::Int(0)]),
            Err(EvalError::Value(_))
        ));
    }

    #[test]
    fn huge_ranges_are_refused_before_allocating() {
        assert!(matches!(
            call("range", vec![Value::Int(100_000_000)]),
            Err(EvalError::Value(_))
        ));
        assert!(matches!(
            call("range", vec![Value::Int(i64::MIN), Value::Int(i64::MAX)]),
            Err(EvalError::Value(_))
        ));
        let Value::List(items) = call("range", vec![Value::Int(1_000_000)]).unwrap() else {
            panic!("expected list");
        };
        assert_eq!(items.len(), 1_000_000);
    }

    #[test]
    fn wrong_arity() {
        assert!(matches!(call("now", vec![Value::Int(1)]), Err(EvalError::Type(_))));
        assert!(matches!(call("textfile", vec![]), Err(EvalError::Type(_))));
    }
}
