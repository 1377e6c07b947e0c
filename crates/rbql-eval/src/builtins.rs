//! The small standard library exposed to host expressions: `len`, `int`,
//! `float`, `str`, `flike`, `math.sqrt`, `re.match`, `re.sub` and `random`.

use fancy_regex::Regex;

use crate::error::EvalError;
use crate::value::Value;

pub fn call(name: &str, args: Vec<Value>) -> Result<Value, EvalError> {
    match name {
        "len" => len(args),
        "int" => to_int(args),
        "float" => to_float(args),
        "str" => to_str(args),
        "flike" => flike(args),
        "math.sqrt" => math_sqrt(args),
        "re.match" => re_match(args),
        "re.sub" => re_sub(args),
        "random" => random(args),
        other => Err(EvalError::UnknownFunction(other.to_string())),
    }
}

fn one(mut args: Vec<Value>, name: &'static str) -> Result<Value, EvalError> {
    if args.len() != 1 {
        return Err(EvalError::Arity(name, 1));
    }
    Ok(args.remove(0))
}

fn len(args: Vec<Value>) -> Result<Value, EvalError> {
    match one(args, "len")? {
        Value::Str(s) => Ok(Value::Int(s.chars().count() as i64)),
        other => Err(EvalError::Type(format!("len() expects a string, got {other:?}"))),
    }
}

fn to_int(args: Vec<Value>) -> Result<Value, EvalError> {
    match one(args, "int")? {
        Value::Int(i) => Ok(Value::Int(i)),
        Value::Float(f) => Ok(Value::Int(f as i64)),
        Value::Str(s) => s
            .trim()
            .parse::<i64>()
            .map(Value::Int)
            .map_err(|_| EvalError::Type(format!("cannot convert \"{s}\" to int"))),
        Value::Bool(b) => Ok(Value::Int(b as i64)),
        Value::Null => Err(EvalError::Type("cannot convert None to int".to_string())),
        other @ Value::Tuple(_) => Err(EvalError::Type(format!("cannot convert {other:?} to int"))),
    }
}

fn to_float(args: Vec<Value>) -> Result<Value, EvalError> {
    match one(args, "float")? {
        Value::Int(i) => Ok(Value::Float(i as f64)),
        Value::Float(f) => Ok(Value::Float(f)),
        Value::Str(s) => s
            .trim()
            .parse::<f64>()
            .map(Value::Float)
            .map_err(|_| EvalError::Type(format!("cannot convert \"{s}\" to float"))),
        Value::Bool(b) => Ok(Value::Float(b as i64 as f64)),
        Value::Null => Err(EvalError::Type("cannot convert None to float".to_string())),
        other @ Value::Tuple(_) => Err(EvalError::Type(format!("cannot convert {other:?} to float"))),
    }
}

fn to_str(args: Vec<Value>) -> Result<Value, EvalError> {
    Ok(Value::Str(one(args, "str")?.to_string()))
}

/// Translates a SQL-`LIKE`-style pattern (`%` any run, `_` single char) to an
/// anchored regex and reports whether `flike(text, pattern)`'s subject matches it.
fn flike(mut args: Vec<Value>) -> Result<Value, EvalError> {
    if args.len() != 2 {
        return Err(EvalError::Arity("flike", 2));
    }
    let subject = args.remove(0).to_string();
    let pattern = args.remove(0).to_string();
    let mut regex_src = String::from("^");
    for c in pattern.chars() {
        match c {
            '%' => regex_src.push_str(".*"),
            '_' => regex_src.push('.'),
            _ => regex_src.push_str(&fancy_regex::escape(&c.to_string())),
        }
    }
    regex_src.push('$');
    let re = Regex::new(&regex_src).map_err(|e| EvalError::Regex(e.to_string()))?;
    let is_match = re.is_match(&subject).map_err(|e| EvalError::Regex(e.to_string()))?;
    Ok(Value::Bool(is_match))
}

fn math_sqrt(args: Vec<Value>) -> Result<Value, EvalError> {
    let value = one(args, "math.sqrt")?;
    let x = value.as_f64()?;
    if x < 0.0 {
        return Err(EvalError::Type("math.sqrt() of a negative number".to_string()));
    }
    Ok(Value::Float(x.sqrt()))
}

fn re_match(mut args: Vec<Value>) -> Result<Value, EvalError> {
    if args.len() != 2 {
        return Err(EvalError::Arity("re.match", 2));
    }
    let pattern = args.remove(0).to_string();
    let subject = args.remove(0).to_string();
    let re = Regex::new(&pattern).map_err(|e| EvalError::Regex(e.to_string()))?;
    let is_match = re.is_match(&subject).map_err(|e| EvalError::Regex(e.to_string()))?;
    Ok(Value::Bool(is_match))
}

fn re_sub(mut args: Vec<Value>) -> Result<Value, EvalError> {
    if args.len() != 3 {
        return Err(EvalError::Arity("re.sub", 3));
    }
    let pattern = args.remove(0).to_string();
    let replacement = args.remove(0).to_string();
    let subject = args.remove(0).to_string();
    let re = Regex::new(&pattern).map_err(|e| EvalError::Regex(e.to_string()))?;
    Ok(Value::Str(re.replace_all(&subject, replacement.as_str()).into_owned()))
}

fn random(args: Vec<Value>) -> Result<Value, EvalError> {
    if !args.is_empty() {
        return Err(EvalError::Arity("random", 0));
    }
    Ok(Value::Float(rand::random::<f64>()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn len_counts_chars() {
        assert_eq!(len(vec![Value::Str("hello".into())]).unwrap(), Value::Int(5));
    }

    #[test]
    fn int_parses_trimmed_string() {
        assert_eq!(to_int(vec![Value::Str(" 42 ".into())]).unwrap(), Value::Int(42));
    }

    #[test]
    fn flike_translates_wildcards() {
        let result = flike(vec![Value::Str("abc".into()), Value::Str("a%c".into())]).unwrap();
        assert_eq!(result, Value::Bool(true));
    }

    #[test]
    fn flike_rejects_non_matching() {
        let result = flike(vec![Value::Str("abx".into()), Value::Str("a%c".into())]).unwrap();
        assert_eq!(result, Value::Bool(false));
    }

    #[test]
    fn math_sqrt_rejects_negative() {
        assert!(math_sqrt(vec![Value::Int(-1)]).is_err());
    }

    #[test]
    fn re_sub_replaces_matches() {
        let result = re_sub(vec![
            Value::Str("[0-9]+".into()),
            Value::Str("#".into()),
            Value::Str("a12b34".into()),
        ])
        .unwrap();
        assert_eq!(result, Value::Str("a#b#".into()));
    }
}
