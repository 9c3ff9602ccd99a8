//! Evaluation environment.
//!
//! Holds the standard library, user value cells and their type schemes.
//! Lookups are case-insensitive and the library always wins. Derived
//! environments (`with_value`, `with_type`, ...) share the sheet and the
//! library with their parent.

use std::fmt;
use std::rc::Rc;

use formula_ast::ast::Expr;
use formula_ast::ext::ExtensionRef;
use formula_ast::names::CaseMap;
use formula_parser::{parse_or_error, ParseOptions};
use formula_types::{infer, Scheme, TypeContext};

use crate::cell::{Cell, Sheet};
use crate::error::EvalError;
use crate::eval::evaluate;
use crate::stdlib::Library;
use crate::value::{Plain, Value};

#[derive(Clone)]
pub struct Environment {
    library: Rc<Library>,
    values: CaseMap<Cell>,
    types: CaseMap<Scheme>,
    sheet: Sheet,
    options: ParseOptions,
}

impl fmt::Debug for Environment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Environment")
            .field("values", &self.values.iter().map(|(k, _)| k).collect::<Vec<_>>())
            .field("sheet", &self.sheet)
            .finish()
    }
}

impl Default for Environment {
    fn default() -> Self {
        Self::new()
    }
}

impl Environment {
    /// Empty environment on a fresh sheet.
    pub fn new() -> Self {
        Self::with_options(Sheet::new(), ParseOptions::default())
    }

    pub fn with_options(sheet: Sheet, options: ParseOptions) -> Self {
        Self {
            library: Rc::new(Library::new(&sheet)),
            values: CaseMap::new(),
            types: CaseMap::new(),
            sheet,
            options,
        }
    }

    pub fn sheet(&self) -> &Sheet {
        &self.sheet
    }

    pub fn options(&self) -> &ParseOptions {
        &self.options
    }

    /// Whether `name` is a library entry or a bound value.
    pub fn has(&self, name: &str) -> bool {
        self.library.get(name).is_some() || self.values.contains(name)
    }

    pub fn type_of(&self, name: &str) -> Option<Scheme> {
        match self.library.get(name) {
            Some(entry) => Some(entry.scheme.clone()),
            None => self.types.get(name).cloned(),
        }
    }

    /// Cell bound to `name`, library first.
    pub fn read(&self, name: &str) -> Option<Cell> {
        match self.library.get(name) {
            Some(entry) => Some(entry.cell.clone()),
            None => self.values.get(name).cloned(),
        }
    }

    pub fn doc(&self, name: &str) -> Option<&'static str> {
        self.library.get(name).and_then(|entry| entry.doc)
    }

    /// Original spelling of a bound name.
    pub fn case(&self, name: &str) -> Option<&str> {
        self.values.case(name)
    }

    /// Bound names in their original spelling, optionally followed by library names.
    pub fn keys(&self, include_library: bool) -> Vec<String> {
        let mut out: Vec<String> = self.values.iter().map(|(k, _)| k.to_string()).collect();
        if include_library {
            let mut lib: Vec<&str> = self.library.names().collect();
            lib.sort_unstable();
            out.extend(lib.into_iter().map(String::from));
        }
        out
    }

    pub fn with_value(&self, name: &str, cell: Cell) -> Environment {
        let mut env = self.clone();
        env.values.insert(name, cell);
        env
    }

    pub fn with_type(&self, name: &str, scheme: Scheme) -> Environment {
        let mut env = self.clone();
        env.types.insert(name, scheme);
        env
    }

    /// Bind host values; their types are derived from the values.
    pub fn with_values<'a, I>(&self, defs: I) -> Result<Environment, EvalError>
    where
        I: IntoIterator<Item = (&'a str, Value)>,
    {
        let mut env = self.clone();
        for (name, value) in defs {
            let scheme = Scheme::mono(value.type_of()?);
            env.types.insert(name, scheme);
            env.values.insert(name, self.sheet.new_cell(value, name));
        }
        Ok(env)
    }

    #[allow(clippy::result_large_err)]
    pub fn infer(&self, expr: &Expr) -> Result<Scheme, EvalError> {
        Ok(infer(self, expr)?)
    }

    pub fn evaluate(&self, expr: &Expr) -> Result<Cell, EvalError> {
        evaluate(self, expr)
    }

    /// Type check, evaluate and bind `expr` in place.
    ///
    /// An existing binding keeps its cell, which is redirected to the new
    /// value so everything computed from it follows. Returns whether a
    /// binding was replaced.
    pub fn add_expression(&mut self, name: &str, expr: &Expr) -> Result<bool, EvalError> {
        if name.trim().is_empty() {
            return Err(EvalError::Unnamed(expr.to_string()));
        }
        let scheme = infer(self, expr)?;
        let cell = evaluate(self, expr)?;
        log::debug!("{name}: {scheme}");
        self.types.insert(name, scheme);
        if let Some(existing) = self.values.get(name) {
            self.sheet.redirect(existing, cell);
            return Ok(true);
        }
        self.values.insert(name, cell);
        Ok(false)
    }

    /// Parse and evaluate; parse failures surface when the error node is evaluated.
    pub fn evaluate_str(&self, src: &str) -> Result<Cell, EvalError> {
        evaluate(self, &parse_or_error(src, &self.options))
    }

    /// Like [`Environment::evaluate_str`], after type checking the expression.
    pub fn evaluate_str_checked(&self, src: &str) -> Result<Cell, EvalError> {
        let expr = parse_or_error(src, &self.options);
        infer(self, &expr)?;
        evaluate(self, &expr)
    }

    /// Current plain value of an expression.
    pub fn evaluate_str_value(&self, src: &str) -> Result<Plain, EvalError> {
        self.evaluate_str(src)?.get()?.uncellify()
    }
}

impl TypeContext for Environment {
    fn library_scheme(&self, name: &str) -> Option<Scheme> {
        self.library.get(name).map(|entry| entry.scheme.clone())
    }

    fn scheme_of(&self, name: &str) -> Option<&Scheme> {
        self.types.get(name)
    }

    fn extensions(&self) -> &[ExtensionRef] {
        &self.options.extensions
    }
}
