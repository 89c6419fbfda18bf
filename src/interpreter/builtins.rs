//=====================================================
// File: builtins.rs
//=====================================================
// Author: ZobieLabs
// License: Duality Public License (DPL v1.0)
// Goal: Built-in HyperTalk functions
// Objective: Register the functions every script can call when no user
//            function handler of the same name answers, with arity checks
//=====================================================

use std::collections::HashMap;

use chrono::{Local, Utc};
use once_cell::sync::Lazy;
use rand::Rng;

use crate::interpreter::errors::{HtError, HtResult};
use crate::runtime::ExecutionContext;
use crate::value::{Numeric, Value, split_list};

//=====================================================
// Section 1.0 - Arity
//=====================================================

/// Accepted argument counts for a built-in function.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Arity {
    Exact(usize),
    /// Inclusive minimum; `None` means no upper bound.
    Range { min: usize, max: Option<usize> },
}

impl Arity {
    fn accepts(&self, count: usize) -> bool {
        match self {
            Arity::Exact(n) => *n == count,
            Arity::Range { min, max } => count >= *min && max.is_none_or(|max| count <= max),
        }
    }

    fn describe(&self) -> String {
        match self {
            Arity::Exact(1) => "1 argument".to_string(),
            Arity::Exact(n) => format!("{n} arguments"),
            Arity::Range { min, max: Some(max) } => format!("{min} to {max} arguments"),
            Arity::Range { min, max: None } => format!("at least {min} argument(s)"),
        }
    }
}

type BuiltinFn = fn(&ExecutionContext, &[Value]) -> HtResult<Value>;

struct Builtin {
    arity: Arity,
    func: BuiltinFn,
}

static BUILTINS: Lazy<HashMap<&'static str, Builtin>> = Lazy::new(|| {
    let mut table = HashMap::new();
    let mut register = |name: &'static str, arity: Arity, func: BuiltinFn| {
        table.insert(name, Builtin { arity, func });
    };
    let one = Arity::Exact(1);
    let none = Arity::Exact(0);
    let list = Arity::Range { min: 1, max: None };

    register("length", one, builtin_length);
    register("abs", one, builtin_abs);
    register("round", one, builtin_round);
    register("trunc", one, builtin_trunc);
    register("sqrt", one, builtin_sqrt);
    register("min", list, builtin_min);
    register("max", list, builtin_max);
    register("sum", list, builtin_sum);
    register("average", list, builtin_average);
    register("random", one, builtin_random);
    register("offset", Arity::Exact(2), builtin_offset);
    register("chartonum", one, builtin_char_to_num);
    register("numtochar", one, builtin_num_to_char);
    register("param", one, builtin_param);
    register("paramcount", none, builtin_param_count);
    register("params", none, builtin_params);
    register("date", none, builtin_date);
    register("time", none, builtin_time);
    register("seconds", none, builtin_seconds);
    register("ticks", none, builtin_ticks);
    register("result", none, builtin_result);
    register("target", none, builtin_target);
    table
});

/// Calls the built-in `name`, or returns `None` when there is no such
/// function.
pub fn call(ctx: &ExecutionContext, name: &str, args: &[Value]) -> Option<HtResult<Value>> {
    let builtin = BUILTINS.get(name.to_lowercase().as_str())?;
    if !builtin.arity.accepts(args.len()) {
        return Some(Err(HtError::semantic(format!(
            "{name} expects {} but received {}.",
            builtin.arity.describe(),
            args.len()
        ))));
    }
    Some((builtin.func)(ctx, args))
}

//=====================================================
// Section 2.0 - Math
//=====================================================

fn number(value: &Value, function: &str) -> HtResult<f64> {
    value.real_value().map_err(|_| {
        HtError::semantic(format!(
            "{function} expects a number but found \"{}\".",
            value.as_str()
        ))
    })
}

fn builtin_abs(_: &ExecutionContext, args: &[Value]) -> HtResult<Value> {
    match args[0].numeric() {
        Some(Numeric::Integer(n)) => Ok(n
            .checked_abs()
            .map(Value::integer)
            .unwrap_or_else(|| Value::real((n as f64).abs()))),
        _ => number(&args[0], "abs").map(|r| Value::real(r.abs())),
    }
}

/// Halves round away from zero.
fn builtin_round(_: &ExecutionContext, args: &[Value]) -> HtResult<Value> {
    number(&args[0], "round").map(|r| Value::real(r.round()))
}

fn builtin_trunc(_: &ExecutionContext, args: &[Value]) -> HtResult<Value> {
    number(&args[0], "trunc").map(|r| Value::real(r.trunc()))
}

fn builtin_sqrt(_: &ExecutionContext, args: &[Value]) -> HtResult<Value> {
    let value = number(&args[0], "sqrt")?;
    if value < 0.0 {
        return Err(HtError::semantic(
            "Can't take the square root of a negative number.",
        ));
    }
    Ok(Value::real(value.sqrt()))
}

fn builtin_random(_: &ExecutionContext, args: &[Value]) -> HtResult<Value> {
    let upper = args[0].integer_value()?;
    if upper < 1 {
        return Err(HtError::semantic(format!(
            "random expects a positive upper bound but found {upper}."
        )));
    }
    Ok(Value::integer(rand::thread_rng().gen_range(1..=upper)))
}

/// Either several arguments or one comma-separated list.
fn list_arguments(args: &[Value], function: &str) -> HtResult<Vec<Value>> {
    let values: Vec<Value> = match args {
        [single] => split_list(single.as_str(), ",")
            .into_iter()
            .map(|item| Value::text(item.trim()))
            .collect(),
        _ => args.to_vec(),
    };
    for value in &values {
        number(value, function)?;
    }
    Ok(values)
}

fn extreme(args: &[Value], function: &str, keep: fn(f64, f64) -> bool) -> HtResult<Value> {
    let values = list_arguments(args, function)?;
    let mut best: Option<(f64, Value)> = None;
    for value in values {
        let n = number(&value, function)?;
        match &best {
            Some((current, _)) if !keep(n, *current) => {}
            _ => best = Some((n, value)),
        }
    }
    best.map(|(_, value)| value)
        .ok_or_else(|| HtError::semantic(format!("{function} expects a list of numbers.")))
}

fn builtin_min(_: &ExecutionContext, args: &[Value]) -> HtResult<Value> {
    extreme(args, "min", |candidate, current| candidate < current)
}

fn builtin_max(_: &ExecutionContext, args: &[Value]) -> HtResult<Value> {
    extreme(args, "max", |candidate, current| candidate > current)
}

fn builtin_sum(_: &ExecutionContext, args: &[Value]) -> HtResult<Value> {
    list_arguments(args, "sum")?
        .iter()
        .try_fold(Value::integer(0), |total, value| total.add(value))
}

fn builtin_average(ctx: &ExecutionContext, args: &[Value]) -> HtResult<Value> {
    let count = list_arguments(args, "average")?.len();
    if count == 0 {
        return Err(HtError::semantic("average expects a list of numbers."));
    }
    builtin_sum(ctx, args)?.divide(&Value::integer(count as i64))
}

//=====================================================
// Section 3.0 - Text
//=====================================================

fn builtin_length(_: &ExecutionContext, args: &[Value]) -> HtResult<Value> {
    Ok(Value::integer(args[0].as_str().chars().count() as i64))
}

/// 1-based character position of the first case-insensitive match, or 0.
fn builtin_offset(_: &ExecutionContext, args: &[Value]) -> HtResult<Value> {
    let needle = args[0].as_str().to_lowercase();
    if needle.is_empty() {
        return Ok(Value::integer(0));
    }
    let haystack = args[1].as_str();
    let position = haystack
        .char_indices()
        .position(|(offset, _)| haystack[offset..].to_lowercase().starts_with(&needle));
    Ok(Value::integer(position.map_or(0, |index| index as i64 + 1)))
}

fn builtin_char_to_num(_: &ExecutionContext, args: &[Value]) -> HtResult<Value> {
    Ok(args[0]
        .as_str()
        .chars()
        .next()
        .map(|ch| Value::integer(ch as i64))
        .unwrap_or_default())
}

fn builtin_num_to_char(_: &ExecutionContext, args: &[Value]) -> HtResult<Value> {
    let code = args[0].integer_value()?;
    u32::try_from(code)
        .ok()
        .and_then(char::from_u32)
        .map(|ch| Value::text(ch.to_string()))
        .ok_or_else(|| HtError::semantic(format!("{code} is not a character code.")))
}

//=====================================================
// Section 4.0 - Handler & Session State
//=====================================================

/// `param(0)` is the message name.
fn builtin_param(ctx: &ExecutionContext, args: &[Value]) -> HtResult<Value> {
    let index = args[0].integer_value()?;
    if index == 0 {
        return Ok(ctx
            .frame()
            .map(|frame| Value::text(frame.message()))
            .unwrap_or_default());
    }
    Ok(index
        .checked_sub(1)
        .and_then(|index| usize::try_from(index).ok())
        .and_then(|index| ctx.args().get(index).cloned())
        .unwrap_or_default())
}

fn builtin_param_count(ctx: &ExecutionContext, _: &[Value]) -> HtResult<Value> {
    Ok(Value::integer(ctx.args().len() as i64))
}

fn builtin_params(ctx: &ExecutionContext, _: &[Value]) -> HtResult<Value> {
    Ok(Value::of_items(ctx.args().iter().cloned()))
}

fn builtin_date(_: &ExecutionContext, _: &[Value]) -> HtResult<Value> {
    Ok(Value::text(Local::now().format("%-m/%-d/%y").to_string()))
}

fn builtin_time(_: &ExecutionContext, _: &[Value]) -> HtResult<Value> {
    Ok(Value::text(Local::now().format("%-I:%M %p").to_string()))
}

fn builtin_seconds(_: &ExecutionContext, _: &[Value]) -> HtResult<Value> {
    Ok(Value::integer(Utc::now().timestamp()))
}

/// Sixtieths of a second since the epoch.
fn builtin_ticks(_: &ExecutionContext, _: &[Value]) -> HtResult<Value> {
    Ok(Value::integer(Utc::now().timestamp_millis() * 60 / 1000))
}

fn builtin_result(ctx: &ExecutionContext, _: &[Value]) -> HtResult<Value> {
    Ok(ctx.result())
}

fn builtin_target(ctx: &ExecutionContext, _: &[Value]) -> HtResult<Value> {
    Ok(ctx
        .target()
        .map(|target| Value::text(target.describe()))
        .unwrap_or_default())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;

    use crate::config::RuntimeConfig;
    use crate::desktop::Desktop;
    use crate::runtime::Runtime;

    fn context() -> ExecutionContext {
        ExecutionContext::new(Runtime::new(RuntimeConfig::default(), Arc::new(Desktop::new())))
    }

    fn run(name: &str, args: &[&str]) -> HtResult<Value> {
        let args: Vec<Value> = args.iter().map(|arg| Value::text(*arg)).collect();
        call(&context(), name, &args).expect("builtin exists")
    }

    #[test]
    fn aggregates_accept_lists_or_arguments() {
        assert_eq!(run("sum", &["1,2,3"]).unwrap().as_str(), "6");
        assert_eq!(run("max", &["4", "9", "2"]).unwrap().as_str(), "9");
        assert_eq!(run("min", &["4, -1.5, 2"]).unwrap().as_str(), "-1.5");
        assert_eq!(run("average", &["1,2"]).unwrap().as_str(), "1.5");
        assert!(run("sum", &["1,x"]).is_err());
    }

    #[test]
    fn offset_is_one_based_and_case_insensitive() {
        assert_eq!(run("offset", &["LO", "hello"]).unwrap().as_str(), "4");
        assert_eq!(run("offset", &["z", "hello"]).unwrap().as_str(), "0");
    }

    #[test]
    fn param_outside_the_argument_list_is_empty() {
        let mut ctx = context();
        ctx.push_frame("greet", None, vec![Value::text("hi")]).unwrap();
        let param = |index: i64| call(&ctx, "param", &[Value::integer(index)]).unwrap().unwrap();
        assert_eq!(param(0).as_str(), "greet");
        assert_eq!(param(1).as_str(), "hi");
        assert_eq!(param(2).as_str(), "");
        assert_eq!(param(-1).as_str(), "");
        assert_eq!(param(i64::MIN).as_str(), "");
    }

    #[test]
    fn names_ignore_case_and_arity_is_checked() {
        assert_eq!(run("charToNum", &["A"]).unwrap().as_str(), "65");
        assert_eq!(run("NUMTOCHAR", &["97"]).unwrap().as_str(), "a");
        assert!(run("length", &[]).is_err());
        assert!(call(&context(), "frobnicate", &[]).is_none());
    }

    #[test]
    fn rounding_and_roots() {
        assert_eq!(run("round", &["2.5"]).unwrap().as_str(), "3");
        assert_eq!(run("trunc", &["-2.7"]).unwrap().as_str(), "-2");
        assert_eq!(run("sqrt", &["16"]).unwrap().as_str(), "4");
        assert!(run("sqrt", &["-1"]).is_err());
        assert_eq!(run("abs", &["-7"]).unwrap().as_str(), "7");
    }
}

//=====================================================
// End of file
//=====================================================
