//! Reference model for trajectory tracing.
//!
//! A deliberately naive re-implementation used as the oracle in model-based
//! tests. It shares only the rule parser with the real network: names are
//! resolved through a map on every evaluation, visited states are kept in a
//! list and searched linearly, and nothing is precompiled. Any difference
//! between the model and [`boolnet_core::Tracer`] is a bug in one of them.

use std::collections::{BTreeMap, BTreeSet, HashMap};

use boolnet_core::{
    ClampSet, CompileError, Expr, StateVector, Trajectory, TrajectoryStatus, TransitionEdge,
    parse_rules,
};

/// Name-keyed network: rule expressions stay over names.
#[derive(Debug, Clone)]
pub struct ModelNetwork {
    names: Vec<String>,
    rules: BTreeMap<String, Expr<String>>,
    clamps: ClampSet,
}

impl ModelNetwork {
    /// Build the model from rule text and clamps.
    pub fn new(text: &str, clamps: &ClampSet) -> Result<Self, CompileError> {
        let mut names = BTreeSet::new();
        let mut rules = BTreeMap::new();

        for line in parse_rules(text)? {
            line.expr.for_each_var(&mut |name: &String| {
                names.insert(name.clone());
            });
            names.insert(line.target.clone());
            // Later definitions replace earlier ones
            rules.insert(line.target, line.expr);
        }
        names.extend(clamps.iter().map(|(name, _)| name.to_string()));

        Ok(Self { names: names.into_iter().collect(), rules, clamps: clamps.clone() })
    }

    /// Node names in state-vector order.
    pub fn names(&self) -> &[String] {
        &self.names
    }

    /// One synchronous update.
    ///
    /// `state` must have one bit per name.
    pub fn step(&self, state: &StateVector) -> StateVector {
        let env: HashMap<&str, bool> =
            self.names.iter().map(String::as_str).zip(state.bits().iter().copied()).collect();

        let bits = self
            .names
            .iter()
            .map(|name| {
                if let Some(value) = self.clamps.get(name) {
                    value
                } else if let Some(expr) = self.rules.get(name) {
                    eval(expr, &env)
                } else {
                    env.get(name.as_str()).copied().unwrap_or(false)
                }
            })
            .collect();
        StateVector::from_bits(bits)
    }
}

fn eval(expr: &Expr<String>, env: &HashMap<&str, bool>) -> bool {
    match expr {
        Expr::Const(value) => *value,
        Expr::Var(name) => env.get(name.as_str()).copied().unwrap_or(false),
        Expr::Not(inner) => !eval(inner, env),
        Expr::And(lhs, rhs) => eval(lhs, env) && eval(rhs, env),
        Expr::Or(lhs, rhs) => eval(lhs, env) || eval(rhs, env),
    }
}

/// Linear-scan tracer over a [`ModelNetwork`].
#[derive(Debug, Clone, Copy)]
pub struct ReferenceTracer<'a> {
    network: &'a ModelNetwork,
    max_steps: usize,
}

impl<'a> ReferenceTracer<'a> {
    /// Create a reference tracer with a step bound.
    pub fn new(network: &'a ModelNetwork, max_steps: usize) -> Self {
        Self { network, max_steps }
    }

    /// Trace from `initial`.
    pub fn trace(&self, initial: StateVector) -> Trajectory {
        let mut visited: Vec<StateVector> = Vec::new();
        let mut edges = Vec::new();
        let mut current = initial;

        for _ in 0..self.max_steps {
            if let Some(index) = visited.iter().position(|state| *state == current) {
                let cycle_length = visited.len() - index;
                let status = if cycle_length == 1 {
                    TrajectoryStatus::SteadyState
                } else {
                    TrajectoryStatus::LimitCycle
                };
                return Trajectory { edges, status, cycle_length };
            }

            let next = self.network.step(&current);
            visited.push(current.clone());
            edges.push(TransitionEdge::new(current, next.clone()));
            current = next;
        }

        Trajectory { edges, status: TrajectoryStatus::MaxStepsReached, cycle_length: 0 }
    }
}
