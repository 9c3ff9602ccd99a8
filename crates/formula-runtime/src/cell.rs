//! Pull-based reactive cells.
//!
//! A [`Cell`] is a source value, a computation over input cells, or an alias
//! of another cell. Reading a derived cell recomputes it unless nothing was
//! set since its cached value was produced. Every cell of a [`Sheet`] shares
//! one epoch counter that `set` and `redirect` advance.

use std::cell::{Cell as Flag, RefCell};
use std::fmt;
use std::rc::Rc;

use crate::error::EvalError;
use crate::value::Value;

type Compute = Rc<dyn Fn(&[Value]) -> Result<Value, EvalError>>;

enum State {
    Source(Value),
    Derived { inputs: Vec<Cell>, f: Compute },
    Alias(Cell),
}

struct Node {
    id: usize,
    name: String,
    state: RefCell<State>,
    cache: RefCell<Option<(u64, Value)>>,
    evaluating: Flag<bool>,
    epoch: Rc<Flag<u64>>,
}

/// Shared handle to a reactive value.
#[derive(Clone)]
pub struct Cell(Rc<Node>);

impl fmt::Debug for Cell {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Cell#{}({})", self.0.id, self.0.name)
    }
}

impl Cell {
    pub fn id(&self) -> usize {
        self.0.id
    }

    pub fn name(&self) -> &str {
        &self.0.name
    }

    pub fn ptr_eq(&self, other: &Cell) -> bool {
        Rc::ptr_eq(&self.0, &other.0)
    }

    /// Current value, recomputing derived cells as needed.
    pub fn get(&self) -> Result<Value, EvalError> {
        let node = &self.0;
        if node.evaluating.get() {
            return Err(EvalError::CyclicCell(node.id));
        }
        let (inputs, f) = match &*node.state.borrow() {
            State::Source(v) => return Ok(v.clone()),
            State::Alias(target) => (vec![target.clone()], None),
            State::Derived { inputs, f } => (inputs.clone(), Some(f.clone())),
        };
        let epoch = node.epoch.get();
        if let Some((at, v)) = &*node.cache.borrow() {
            if *at == epoch {
                return Ok(v.clone());
            }
        }
        node.evaluating.set(true);
        let result = inputs
            .iter()
            .map(Cell::get)
            .collect::<Result<Vec<_>, _>>()
            .and_then(|values| match &f {
                Some(f) => f(&values),
                None => Ok(values.into_iter().next().unwrap_or(Value::Null)),
            });
        node.evaluating.set(false);
        let value = result?;
        // computations may create cells but never set them; the epoch is still valid
        *node.cache.borrow_mut() = Some((epoch, value.clone()));
        Ok(value)
    }
}

/// Creates cells and advances their shared epoch.
#[derive(Clone, Default)]
pub struct Sheet {
    epoch: Rc<Flag<u64>>,
    next_id: Rc<Flag<usize>>,
}

impl fmt::Debug for Sheet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Sheet")
            .field("epoch", &self.epoch.get())
            .field("cells", &self.next_id.get())
            .finish()
    }
}

impl Sheet {
    pub fn new() -> Self {
        Self::default()
    }

    fn cell(&self, name: &str, state: State) -> Cell {
        let id = self.next_id.get();
        self.next_id.set(id + 1);
        Cell(Rc::new(Node {
            id,
            name: name.to_string(),
            state: RefCell::new(state),
            cache: RefCell::new(None),
            evaluating: Flag::new(false),
            epoch: self.epoch.clone(),
        }))
    }

    fn bump(&self) {
        self.epoch.set(self.epoch.get() + 1);
    }

    /// A source cell holding `value`.
    pub fn new_cell(&self, value: Value, name: &str) -> Cell {
        self.cell(name, State::Source(value))
    }

    /// A cell computed from the current values of `inputs`.
    pub fn map<F>(&self, inputs: Vec<Cell>, name: &str, f: F) -> Cell
    where
        F: Fn(&[Value]) -> Result<Value, EvalError> + 'static,
    {
        self.cell(name, State::Derived { inputs, f: Rc::new(f) })
    }

    /// A list cell with the elements of `list` accepted by `pred`.
    pub fn filter<P>(&self, list: Cell, name: &str, pred: P) -> Cell
    where
        P: Fn(&Cell) -> Result<bool, EvalError> + 'static,
    {
        self.map(vec![list], name, move |v| {
            let mut kept = Vec::new();
            for c in elements(&v[0])? {
                if pred(c)? {
                    kept.push(c.clone());
                }
            }
            Ok(Value::List(kept))
        })
    }

    /// A cell holding the position of the first element of `list` accepted
    /// by `pred`, combined with that element through `pick`.
    pub fn find<P, K>(&self, list: Cell, name: &str, pred: P, pick: K) -> Cell
    where
        P: Fn(&Cell) -> Result<bool, EvalError> + 'static,
        K: Fn(Option<(usize, &Cell)>) -> Result<Value, EvalError> + 'static,
    {
        self.map(vec![list], name, move |v| {
            for (i, c) in elements(&v[0])?.iter().enumerate() {
                if pred(c)? {
                    return pick(Some((i, c)));
                }
            }
            pick(None)
        })
    }

    /// Replace the value of a cell; dependents see it on their next read.
    pub fn set(&self, cell: &Cell, value: Value) {
        *cell.0.state.borrow_mut() = State::Source(value);
        self.bump();
    }

    /// Make `cell` follow `target` from now on.
    pub fn redirect(&self, cell: &Cell, target: Cell) {
        if cell.ptr_eq(&target) {
            return;
        }
        log::debug!("redirect {cell:?} -> {target:?}");
        *cell.0.state.borrow_mut() = State::Alias(target);
        self.bump();
    }
}

pub(crate) fn elements(v: &Value) -> Result<&[Cell], EvalError> {
    match v {
        Value::List(cells) | Value::Tuple(cells) => Ok(cells),
        Value::Null => Ok(&[]),
        other => Err(EvalError::Unexpected { op: "list".into(), found: other.kind().into() }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use formula_rational::Rational;
    use pretty_assertions::assert_eq;

    fn num(i: i64) -> Value {
        Value::Number(Rational::from(i))
    }

    fn as_i64(v: Value) -> i64 {
        match v {
            Value::Number(r) => r.to_bigint().to_string().parse().unwrap(),
            other => panic!("not a number: {other:?}"),
        }
    }

    fn double(sheet: &Sheet, c: &Cell) -> Cell {
        sheet.map(vec![c.clone()], "double", |v| match &v[0] {
            Value::Number(r) => Ok(Value::Number(r + r)),
            _ => Ok(Value::Null),
        })
    }

    #[test]
    fn derived_cells_follow_sources() {
        let sheet = Sheet::new();
        let a = sheet.new_cell(num(2), "a");
        let d = double(&sheet, &a);
        assert_eq!(as_i64(d.get().unwrap()), 4);
        sheet.set(&a, num(5));
        assert_eq!(as_i64(d.get().unwrap()), 10);
    }

    #[test]
    fn redirect_updates_dependents() {
        let sheet = Sheet::new();
        let a = sheet.new_cell(num(1), "a");
        let b = sheet.new_cell(num(7), "b");
        let d = double(&sheet, &a);
        sheet.redirect(&a, b.clone());
        assert_eq!(as_i64(d.get().unwrap()), 14);
        sheet.set(&b, num(8));
        assert_eq!(as_i64(d.get().unwrap()), 16);
    }

    #[test]
    fn self_reference_is_a_cycle() {
        let sheet = Sheet::new();
        let a = sheet.new_cell(num(1), "a");
        let d = double(&sheet, &a);
        sheet.redirect(&a, d.clone());
        assert!(matches!(d.get(), Err(EvalError::CyclicCell(_))));
    }

    #[test]
    fn filter_and_find() {
        let sheet = Sheet::new();
        let items: Vec<Cell> = (1..=5).map(|i| sheet.new_cell(num(i), "item")).collect();
        let list = sheet.new_cell(Value::List(items), "list");
        let even = |c: &Cell| -> Result<bool, EvalError> { Ok(as_i64(c.get()?) % 2 == 0) };
        let evens = sheet.filter(list.clone(), "evens", even);
        let Value::List(kept) = evens.get().unwrap() else { panic!("not a list") };
        assert_eq!(kept.into_iter().map(|c| as_i64(c.get().unwrap())).collect::<Vec<_>>(), vec![2, 4]);

        let index = sheet.find(list, "findi", even, |hit| {
            Ok(num(hit.map(|(i, _)| i as i64).unwrap_or(-1)))
        });
        assert_eq!(as_i64(index.get().unwrap()), 1);
    }
}
