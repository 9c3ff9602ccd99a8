//! Inference context and the environments inference reads from.
//!
//! This module provides:
//! - `TypeContext`: read access to library, environment and extension types
//! - `TypeEnv`: a case-insensitive table of schemes
//! - `InferCtx`: state owned by one inference run

use formula_ast::ext::ExtensionRef;
use formula_ast::names::{canonical, CaseMap};

use crate::builtins::library_scheme;
use crate::scheme::{Scheme, Subst, TvGen};
use crate::types::Type;

/// Where inference looks up names and extension types.
pub trait TypeContext {
    /// Scheme of a standard library name; consulted before anything else.
    fn library_scheme(&self, name: &str) -> Option<Scheme> {
        library_scheme(&canonical(name))
    }

    /// Scheme bound to `name`, compared case-insensitively.
    fn scheme_of(&self, name: &str) -> Option<&Scheme>;

    /// Extensions used to type extension constants.
    fn extensions(&self) -> &[ExtensionRef] {
        &[]
    }
}

/// Type environment: case-insensitive name to scheme table.
#[derive(Debug, Clone, Default)]
pub struct TypeEnv {
    schemes: CaseMap<Scheme>,
    extensions: Vec<ExtensionRef>,
}

impl TypeEnv {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_extensions(extensions: Vec<ExtensionRef>) -> Self {
        Self { schemes: CaseMap::new(), extensions }
    }

    pub fn insert(&mut self, name: &str, scheme: Scheme) -> Option<Scheme> {
        self.schemes.insert(name, scheme)
    }

    pub fn get(&self, name: &str) -> Option<&Scheme> {
        self.schemes.get(name)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &Scheme)> {
        self.schemes.iter()
    }
}

impl TypeContext for TypeEnv {
    fn scheme_of(&self, name: &str) -> Option<&Scheme> {
        self.get(name)
    }

    fn extensions(&self) -> &[ExtensionRef] {
        &self.extensions
    }
}

/// State of one inference run: variable supply, substitution and lambda scopes.
pub(crate) struct InferCtx<'c> {
    pub(crate) tv: TvGen,
    pub(crate) subst: Subst,
    /// Lambda parameters, innermost last, keyed by canonical name.
    pub(crate) locals: Vec<(String, Type)>,
    pub(crate) ctx: &'c dyn TypeContext,
}

impl<'c> InferCtx<'c> {
    pub(crate) fn new(ctx: &'c dyn TypeContext) -> Self {
        Self { tv: TvGen::new(), subst: Subst::new(), locals: Vec::new(), ctx }
    }

    pub(crate) fn local(&self, name: &str) -> Option<&Type> {
        let key = canonical(name);
        self.locals.iter().rev().find(|(k, _)| *k == key).map(|(_, t)| t)
    }

    pub(crate) fn push_local(&mut self, name: &str, ty: Type) {
        self.locals.push((canonical(name), ty));
    }

    pub(crate) fn pop_local(&mut self) {
        self.locals.pop();
    }
}
