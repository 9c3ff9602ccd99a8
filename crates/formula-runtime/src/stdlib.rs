//! Standard library implementations.
//!
//! Every entry pairs a native function (or constant) with the scheme and
//! documentation declared in `formula_types::builtins`.

use std::collections::HashMap;
use std::f64::consts::PI;

use formula_ast::names::canonical;
use formula_rational::{CompareOp, Rational};
use formula_types::{library_doc, library_scheme, Scheme, LIBRARY_NAMES};

use crate::cell::{elements, Cell, Sheet};
use crate::error::EvalError;
use crate::eval::apply;
use crate::value::{Func, NativeFn, Value};

pub struct LibraryEntry {
    pub cell: Cell,
    pub scheme: Scheme,
    pub doc: Option<&'static str>,
}

/// The standard library, instantiated on one sheet.
pub struct Library {
    entries: HashMap<&'static str, LibraryEntry>,
}

impl Library {
    pub fn new(sheet: &Sheet) -> Self {
        let mut entries = HashMap::new();
        for &name in LIBRARY_NAMES {
            let value = match native(name) {
                Some(f) => Value::Func(Func::Native { name, f }),
                // the only constant
                None => Rational::from_float(PI).map_or(Value::Null, Value::Number),
            };
            let Some(scheme) = library_scheme(name) else { continue };
            let cell = sheet.new_cell(value, name);
            entries.insert(name, LibraryEntry { cell, scheme, doc: library_doc(name) });
        }
        Self { entries }
    }

    pub fn get(&self, name: &str) -> Option<&LibraryEntry> {
        self.entries.get(canonical(name).as_str())
    }

    pub fn names(&self) -> impl Iterator<Item = &'static str> + '_ {
        self.entries.keys().copied()
    }
}

fn native(name: &str) -> Option<NativeFn> {
    let f: NativeFn = match name {
        "+" => add,
        "-" => minus,
        "*" => mul,
        "/" => div,
        "^" => pow,
        "<" => lt,
        "<=" => le,
        ">" => gt,
        ">=" => ge,
        "==" => eq,
        "!=" => ne,
        "&&" => and,
        "||" => or,
        "!" => not,
        "if" => if_,
        "$min" => min,
        "$max" => max,
        "$first" => first,
        "$last" => last,
        "$concat" => concat,
        "$filter" => filter,
        "$map" => map,
        "$find" => find,
        "$findi" => findi,
        "$length" => length,
        "$floor" => floor,
        "$json" => json,
        "$hex" => hex,
        _ => return None,
    };
    Some(f)
}

fn unexpected(op: &str, v: &Value) -> EvalError {
    EvalError::Unexpected { op: op.to_string(), found: v.kind().to_string() }
}

fn exactly(op: &str, args: &[Cell], n: usize) -> Result<(), EvalError> {
    if args.len() == n {
        return Ok(());
    }
    let plural = if n == 1 { "" } else { "s" };
    Err(EvalError::Arity {
        name: op.to_string(),
        expected: format!("{n} argument{plural}"),
        provided: args.len(),
    })
}

fn at_least_one(op: &str, args: &[Cell]) -> Result<(), EvalError> {
    if args.is_empty() {
        return Err(EvalError::Arity {
            name: op.to_string(),
            expected: "at least 1 argument".into(),
            provided: 0,
        });
    }
    Ok(())
}

fn number<'a>(op: &str, v: &'a Value) -> Result<&'a Rational, EvalError> {
    match v {
        Value::Number(r) => Ok(r),
        other => Err(unexpected(op, other)),
    }
}

fn boolean(op: &str, v: &Value) -> Result<bool, EvalError> {
    match v {
        Value::Bool(b) => Ok(*b),
        other => Err(unexpected(op, other)),
    }
}

type Binary = fn(&Rational, &Rational) -> Result<Rational, EvalError>;

fn arith(sheet: &Sheet, args: &[Cell], op: &'static str, f: Binary) -> Result<Cell, EvalError> {
    exactly(op, args, 2)?;
    Ok(sheet.map(args.to_vec(), op, move |v| {
        Ok(Value::Number(f(number(op, &v[0])?, number(op, &v[1])?)?))
    }))
}

fn add(sheet: &Sheet, args: &[Cell]) -> Result<Cell, EvalError> {
    arith(sheet, args, "+", |a, b| Ok(a.add(b)))
}

fn minus(sheet: &Sheet, args: &[Cell]) -> Result<Cell, EvalError> {
    if args.len() == 1 {
        return Ok(sheet.map(args.to_vec(), "-", |v| Ok(Value::Number(number("-", &v[0])?.negate()))));
    }
    arith(sheet, args, "-", |a, b| Ok(a.subtract(b)))
}

fn mul(sheet: &Sheet, args: &[Cell]) -> Result<Cell, EvalError> {
    arith(sheet, args, "*", |a, b| Ok(a.multiply(b)))
}

fn div(sheet: &Sheet, args: &[Cell]) -> Result<Cell, EvalError> {
    arith(sheet, args, "/", |a, b| Ok(a.divide(b)?))
}

fn pow(sheet: &Sheet, args: &[Cell]) -> Result<Cell, EvalError> {
    arith(sheet, args, "^", |a, b| Ok(a.power(b)?))
}

/// Exact on numbers, native ordering on strings and booleans.
fn comparison(sheet: &Sheet, args: &[Cell], op: CompareOp) -> Result<Cell, EvalError> {
    let name = op.as_str();
    exactly(name, args, 2)?;
    Ok(sheet.map(args.to_vec(), name, move |v| {
        let holds = match (&v[0], &v[1]) {
            (Value::Number(a), Value::Number(b)) => a.compare(op, b),
            (Value::Str(a), Value::Str(b)) => op.holds(a.cmp(b)),
            (Value::Bool(a), Value::Bool(b)) => op.holds(a.cmp(b)),
            (a, _) => return Err(unexpected(name, a)),
        };
        Ok(Value::Bool(holds))
    }))
}

fn lt(sheet: &Sheet, args: &[Cell]) -> Result<Cell, EvalError> {
    comparison(sheet, args, CompareOp::Lt)
}

fn le(sheet: &Sheet, args: &[Cell]) -> Result<Cell, EvalError> {
    comparison(sheet, args, CompareOp::Le)
}

fn gt(sheet: &Sheet, args: &[Cell]) -> Result<Cell, EvalError> {
    comparison(sheet, args, CompareOp::Gt)
}

fn ge(sheet: &Sheet, args: &[Cell]) -> Result<Cell, EvalError> {
    comparison(sheet, args, CompareOp::Ge)
}

/// Deep structural equality over the plain snapshots.
fn equality(sheet: &Sheet, args: &[Cell], negate: bool) -> Result<Cell, EvalError> {
    let name = if negate { "!=" } else { "==" };
    exactly(name, args, 2)?;
    Ok(sheet.map(args.to_vec(), name, move |v| {
        let same = v[0].uncellify()? == v[1].uncellify()?;
        Ok(Value::Bool(same != negate))
    }))
}

fn eq(sheet: &Sheet, args: &[Cell]) -> Result<Cell, EvalError> {
    equality(sheet, args, false)
}

fn ne(sheet: &Sheet, args: &[Cell]) -> Result<Cell, EvalError> {
    equality(sheet, args, true)
}

fn and(sheet: &Sheet, args: &[Cell]) -> Result<Cell, EvalError> {
    exactly("&&", args, 2)?;
    let rhs = args[1].clone();
    Ok(sheet.map(vec![args[0].clone()], "&&", move |v| {
        Ok(Value::Bool(boolean("&&", &v[0])? && boolean("&&", &rhs.get()?)?))
    }))
}

fn or(sheet: &Sheet, args: &[Cell]) -> Result<Cell, EvalError> {
    exactly("||", args, 2)?;
    let rhs = args[1].clone();
    Ok(sheet.map(vec![args[0].clone()], "||", move |v| {
        Ok(Value::Bool(boolean("||", &v[0])? || boolean("||", &rhs.get()?)?))
    }))
}

fn not(sheet: &Sheet, args: &[Cell]) -> Result<Cell, EvalError> {
    exactly("!", args, 1)?;
    Ok(sheet.map(args.to_vec(), "!", |v| Ok(Value::Bool(!boolean("!", &v[0])?))))
}

/// Only the selected branch is read.
fn if_(sheet: &Sheet, args: &[Cell]) -> Result<Cell, EvalError> {
    exactly("if", args, 3)?;
    let (then, otherwise) = (args[1].clone(), args[2].clone());
    Ok(sheet.map(vec![args[0].clone()], "if", move |v| {
        if boolean("if", &v[0])? {
            then.get()
        } else {
            otherwise.get()
        }
    }))
}

fn extremum(sheet: &Sheet, args: &[Cell], op: &'static str, largest: bool) -> Result<Cell, EvalError> {
    at_least_one(op, args)?;
    Ok(sheet.map(args.to_vec(), op, move |v| {
        let nums = v.iter().map(|x| number(op, x).cloned()).collect::<Result<Vec<_>, _>>()?;
        let (head, rest) = nums.split_first().ok_or_else(|| unexpected(op, &Value::Null))?;
        Ok(Value::Number(if largest { Rational::max(head, rest) } else { Rational::min(head, rest) }))
    }))
}

fn min(sheet: &Sheet, args: &[Cell]) -> Result<Cell, EvalError> {
    extremum(sheet, args, "$min", false)
}

fn max(sheet: &Sheet, args: &[Cell]) -> Result<Cell, EvalError> {
    extremum(sheet, args, "$max", true)
}

/// Descend into nested lists through their first or last element.
fn edge(v: Value, from_end: bool) -> Result<Value, EvalError> {
    match v {
        Value::List(cells) => {
            let pick = if from_end { cells.last() } else { cells.first() };
            match pick {
                Some(c) => edge(c.get()?, from_end),
                None => Ok(Value::Null),
            }
        }
        other => Ok(other),
    }
}

fn first(sheet: &Sheet, args: &[Cell]) -> Result<Cell, EvalError> {
    exactly("$first", args, 1)?;
    Ok(sheet.map(args.to_vec(), "$first", |v| edge(v[0].clone(), false)))
}

fn last(sheet: &Sheet, args: &[Cell]) -> Result<Cell, EvalError> {
    exactly("$last", args, 1)?;
    Ok(sheet.map(args.to_vec(), "$last", |v| edge(v[0].clone(), true)))
}

fn concat(sheet: &Sheet, args: &[Cell]) -> Result<Cell, EvalError> {
    Ok(sheet.map(args.to_vec(), "$concat", |v| {
        let mut out = String::new();
        for x in v {
            out.push_str(&x.uncellify()?.to_string());
        }
        Ok(Value::Str(out))
    }))
}

/// Apply the predicate held by `pred` to one element.
fn accepts(sheet: &Sheet, op: &str, pred: &Cell, elem: &Cell) -> Result<bool, EvalError> {
    let f = pred.get()?;
    boolean(op, &apply(sheet, &f, std::slice::from_ref(elem))?.get()?)
}

fn filter(sheet: &Sheet, args: &[Cell]) -> Result<Cell, EvalError> {
    exactly("$filter", args, 2)?;
    let (s, pred) = (sheet.clone(), args[0].clone());
    Ok(sheet.filter(args[1].clone(), "$filter", move |c| accepts(&s, "$filter", &pred, c)))
}

fn map(sheet: &Sheet, args: &[Cell]) -> Result<Cell, EvalError> {
    exactly("$map", args, 2)?;
    let s = sheet.clone();
    Ok(sheet.map(args.to_vec(), "$map", move |v| {
        let mapped = elements(&v[1])?
            .iter()
            .map(|c| apply(&s, &v[0], std::slice::from_ref(c)))
            .collect::<Result<Vec<_>, _>>()?;
        Ok(Value::List(mapped))
    }))
}

fn find(sheet: &Sheet, args: &[Cell]) -> Result<Cell, EvalError> {
    exactly("$find", args, 2)?;
    let (s, pred) = (sheet.clone(), args[0].clone());
    Ok(sheet.find(
        args[1].clone(),
        "$find",
        move |c| accepts(&s, "$find", &pred, c),
        |hit| hit.map_or(Ok(Value::Null), |(_, c)| c.get()),
    ))
}

fn findi(sheet: &Sheet, args: &[Cell]) -> Result<Cell, EvalError> {
    exactly("$findi", args, 2)?;
    let (s, pred) = (sheet.clone(), args[0].clone());
    Ok(sheet.find(
        args[1].clone(),
        "$findi",
        move |c| accepts(&s, "$findi", &pred, c),
        |hit| Ok(Value::from(hit.map_or(-1, |(i, _)| i as i64))),
    ))
}

fn length(sheet: &Sheet, args: &[Cell]) -> Result<Cell, EvalError> {
    exactly("$length", args, 1)?;
    Ok(sheet.map(args.to_vec(), "$length", |v| {
        let n = match &v[0] {
            Value::List(cells) | Value::Tuple(cells) => cells.len(),
            Value::Object(fields) => fields.len(),
            Value::Null => 0,
            _ => 1,
        };
        Ok(Value::Number(Rational::from(n)))
    }))
}

fn floor(sheet: &Sheet, args: &[Cell]) -> Result<Cell, EvalError> {
    exactly("$floor", args, 1)?;
    Ok(sheet.map(args.to_vec(), "$floor", |v| Ok(Value::Number(number("$floor", &v[0])?.floor()))))
}

fn json(sheet: &Sheet, args: &[Cell]) -> Result<Cell, EvalError> {
    exactly("$json", args, 1)?;
    Ok(sheet.map(args.to_vec(), "$json", |v| {
        Ok(Value::Str(serde_json::to_string(&v[0].uncellify()?)?))
    }))
}

fn hex(sheet: &Sheet, args: &[Cell]) -> Result<Cell, EvalError> {
    exactly("$hex", args, 1)?;
    Ok(sheet.map(args.to_vec(), "$hex", |v| match &v[0] {
        Value::Str(s) => {
            let digits: String = s.chars().map(|c| format!("{:02x}", c as u32)).collect();
            Ok(Value::Str(format!("0x{digits}")))
        }
        other => Err(unexpected("$hex", other)),
    }))
}
