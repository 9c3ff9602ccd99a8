//! Programs: named definitions evaluated in dependency order.
//!
//! The dependency graph has one node per definition and one per free
//! variable of any definition, keyed case-insensitively. Edges point from a
//! definition to the names it reads, so a post-order walk yields
//! dependencies before their dependents.

use std::collections::{HashMap, HashSet};

use formula_ast::ast::Expr;
use formula_ast::names::{canonical, CaseMap};
use formula_parser::{parse_or_error, ParseOptions};

use crate::env::Environment;
use crate::error::EvalError;

#[derive(Debug, Clone, Default)]
struct Graph {
    /// Display spelling of each node, first occurrence wins.
    nodes: Vec<String>,
    index: HashMap<String, usize>,
    edges: Vec<Vec<usize>>,
}

impl Graph {
    fn add_node(&mut self, name: &str) -> usize {
        let key = canonical(name);
        if let Some(&i) = self.index.get(&key) {
            return i;
        }
        let i = self.nodes.len();
        self.nodes.push(name.to_string());
        self.edges.push(Vec::new());
        self.index.insert(key, i);
        i
    }

    fn add_edge(&mut self, from: usize, to: usize) {
        if !self.edges[from].contains(&to) {
            self.edges[from].push(to);
        }
    }

    /// Every node, dependencies first; `None` on a cycle.
    fn topological_sort(&self) -> Option<Vec<usize>> {
        #[derive(Clone, Copy, PartialEq)]
        enum Mark {
            New,
            Active,
            Done,
        }
        fn visit(g: &Graph, n: usize, marks: &mut [Mark], out: &mut Vec<usize>) -> bool {
            match marks[n] {
                Mark::Done => return true,
                Mark::Active => return false,
                Mark::New => {}
            }
            marks[n] = Mark::Active;
            for &m in &g.edges[n] {
                if !visit(g, m, marks, out) {
                    return false;
                }
            }
            marks[n] = Mark::Done;
            out.push(n);
            true
        }
        let mut marks = vec![Mark::New; self.nodes.len()];
        let mut out = Vec::with_capacity(self.nodes.len());
        for n in 0..self.nodes.len() {
            if !visit(self, n, &mut marks, &mut out) {
                return None;
            }
        }
        Some(out)
    }
}

/// Outcome of [`Program::partial_reduce`].
#[derive(Debug)]
pub struct PartialReduction {
    pub env: Environment,
    /// Definitions left unevaluated, in evaluation order.
    pub remaining: Vec<String>,
    /// Names those definitions are still waiting for.
    pub unresolved: Vec<String>,
}

#[derive(Debug, Clone, Default)]
pub struct Program {
    defs: CaseMap<Expr>,
    graph: Graph,
}

impl Program {
    pub fn new<'a, I>(defs: I) -> Self
    where
        I: IntoIterator<Item = (&'a str, Expr)>,
    {
        let mut p = Program::default();
        for (name, expr) in defs {
            p.add_def(name, expr);
        }
        p
    }

    /// Parse `"name:expression"` definitions; the name ends at the first `:`.
    pub fn parse(defs: &[&str]) -> Result<Self, EvalError> {
        Self::parse_with(defs, &ParseOptions::default())
    }

    pub fn parse_with(defs: &[&str], opts: &ParseOptions) -> Result<Self, EvalError> {
        let mut p = Program::default();
        for def in defs {
            let (name, src) = def.split_once(':').ok_or_else(|| EvalError::Unnamed(def.to_string()))?;
            let name = name.trim();
            if name.is_empty() {
                return Err(EvalError::Unnamed(def.to_string()));
            }
            p.add_def(name, parse_or_error(src, opts));
        }
        Ok(p)
    }

    fn add_def(&mut self, name: &str, expr: Expr) {
        let from = self.graph.add_node(name);
        for dep in expr.free_variables() {
            let to = self.graph.add_node(&dep);
            self.graph.add_edge(from, to);
        }
        self.defs.insert(name, expr);
    }

    pub fn get(&self, name: &str) -> Option<&Expr> {
        self.defs.get(name)
    }

    /// Definition names in their original spelling.
    pub fn names(&self) -> Vec<&str> {
        self.defs.iter().map(|(k, _)| k).collect()
    }

    /// Evaluation order of the definitions, and the names they need from the
    /// environment.
    pub fn order(&self) -> Result<(Vec<String>, Vec<String>), EvalError> {
        let sorted = self.graph.topological_sort().ok_or(EvalError::CyclicDependency)?;
        let (mut defs, mut leaves) = (Vec::new(), Vec::new());
        for n in sorted {
            let name = &self.graph.nodes[n];
            match self.defs.case(name) {
                Some(def) => defs.push(def.to_string()),
                None => leaves.push(name.clone()),
            }
        }
        Ok((defs, leaves))
    }

    /// Names outside the program needed to evaluate `keys`, skipping those
    /// `env` already provides.
    pub fn dependencies(&self, keys: &[&str], env: Option<&Environment>) -> Vec<String> {
        fn visit(
            p: &Program,
            key: &str,
            env: Option<&Environment>,
            visited: &mut HashSet<String>,
            terminal: &mut Vec<String>,
        ) {
            if !visited.insert(canonical(key)) {
                return;
            }
            match p.defs.get(key) {
                Some(expr) => {
                    for dep in expr.free_variables() {
                        if env.map_or(true, |e| !e.has(&dep)) {
                            visit(p, &dep, env, visited, terminal);
                        }
                    }
                }
                None => terminal.push(key.to_string()),
            }
        }
        let mut visited = HashSet::new();
        let mut terminal = Vec::new();
        for key in keys {
            visit(self, key, env, &mut visited, &mut terminal);
        }
        terminal
    }

    /// Evaluate every definition into a copy of `env`, stopping at the first failure.
    pub fn reduce(&self, env: &Environment) -> Result<Environment, EvalError> {
        let (order, needed) = self.order()?;
        let unknown: Vec<String> = needed.into_iter().filter(|n| !env.has(n)).collect();
        if !unknown.is_empty() {
            return Err(EvalError::UnknownIdentifiers(unknown));
        }
        let mut copy = env.clone();
        for name in &order {
            let Some(expr) = self.defs.get(name) else { continue };
            copy.add_expression(name, expr).map_err(|e| {
                log::error!("evaluating {name}: {e}");
                e
            })?;
        }
        Ok(copy)
    }

    /// Evaluate what can be evaluated. A definition is attempted when all of
    /// its free variables are bound so far; failures are deferred, not returned.
    pub fn partial_reduce(&self, env: &Environment) -> Result<PartialReduction, EvalError> {
        let (order, _) = self.order()?;
        let mut copy = env.clone();
        let mut remaining = Vec::new();
        let mut unresolved: Vec<String> = Vec::new();
        for name in order {
            let Some(expr) = self.defs.get(&name) else { continue };
            let missing: Vec<String> =
                expr.free_variables().into_iter().filter(|d| !copy.has(d)).collect();
            if missing.is_empty() {
                match copy.add_expression(&name, expr) {
                    Ok(_) => continue,
                    Err(e) => log::warn!("deferring {name}: {e}"),
                }
            }
            for dep in missing {
                if !unresolved.iter().any(|u| canonical(u) == canonical(&dep)) {
                    unresolved.push(dep);
                }
            }
            remaining.push(name);
        }
        Ok(PartialReduction { env: copy, remaining, unresolved })
    }

    /// `name: expression` lines in evaluation order.
    pub fn expressions(&self) -> Result<Vec<String>, EvalError> {
        let (order, _) = self.order()?;
        Ok(order
            .iter()
            .filter_map(|name| self.defs.get(name).map(|e| format!("{name}: {e}")))
            .collect())
    }
}
