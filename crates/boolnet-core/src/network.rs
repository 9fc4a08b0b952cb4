//! Compiled Boolean network: registry, rule table and clamp set.
//!
//! A [`Network`] is built once from rule text and a caller-supplied
//! [`ClampSet`], then shared read-only (typically behind an `Arc`) by every
//! worker. Nothing in it is mutated after [`Network::compile`] returns.

use std::{
    collections::{BTreeMap, BTreeSet},
    fmt,
};

use crate::{
    error::{CompileError, EvalError},
    expr::Expr,
    parser::{RuleLine, parse_rules},
    registry::{NodeId, NodeRegistry},
    state::StateVector,
    transition,
};

/// Externally forced node values, keyed by node name.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ClampSet {
    values: BTreeMap<String, bool>,
}

impl ClampSet {
    /// Create an empty clamp set.
    pub fn new() -> Self {
        Self::default()
    }

    /// Clamp `name` to `value`, replacing any earlier clamp.
    pub fn insert(&mut self, name: impl Into<String>, value: bool) {
        self.values.insert(name.into(), value);
    }

    /// Builder-style [`ClampSet::insert`].
    #[must_use]
    pub fn with(mut self, name: impl Into<String>, value: bool) -> Self {
        self.insert(name, value);
        self
    }

    /// Clamped value of `name`, if clamped.
    pub fn get(&self, name: &str) -> Option<bool> {
        self.values.get(name).copied()
    }

    /// Clamped names and values in name order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, bool)> {
        self.values.iter().map(|(name, value)| (name.as_str(), *value))
    }

    /// Number of clamped nodes.
    pub fn len(&self) -> usize {
        self.values.len()
    }

    /// Check if nothing is clamped.
    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }
}

impl<S: Into<String>> FromIterator<(S, bool)> for ClampSet {
    fn from_iter<I: IntoIterator<Item = (S, bool)>>(iter: I) -> Self {
        Self { values: iter.into_iter().map(|(name, value)| (name.into(), value)).collect() }
    }
}

/// How a node's next value is computed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NodeKind<'a> {
    /// Forced to a fixed bit; any rule is ignored
    Clamped(bool),
    /// Computed from the rule against the pre-update state
    Rule(&'a Expr<NodeId>),
    /// No rule and not clamped: carries its current bit forward unchanged
    FreeRunning,
}

/// Immutable simulation configuration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Network {
    registry: NodeRegistry,
    /// Rule per node in registry order, `None` where the text has no rule
    rules: Vec<Option<Expr<NodeId>>>,
    /// Clamp per node in registry order
    clamps: Vec<Option<bool>>,
}

impl Network {
    /// Compile rule text under `clamps`.
    ///
    /// The registry is the union of every rule target, every name referenced
    /// on a right-hand side, and every clamped name. Self-reference is legal.
    /// When a target is defined twice the last definition wins.
    pub fn compile(text: &str, clamps: &ClampSet) -> Result<Self, CompileError> {
        let rules = parse_rules(text)?;
        Ok(Self::from_rule_lines(rules, clamps))
    }

    /// Build a network from already-parsed rule lines.
    pub fn from_rule_lines(lines: Vec<RuleLine>, clamps: &ClampSet) -> Self {
        let mut names: BTreeSet<&str> = clamps.iter().map(|(name, _)| name).collect();
        for rule in &lines {
            names.insert(&rule.target);
            rule.expr.for_each_var(&mut |name| {
                names.insert(name);
            });
        }
        let registry = NodeRegistry::from_names(names);

        let mut rules: Vec<Option<Expr<NodeId>>> = vec![None; registry.len()];
        let mut defined_on: Vec<Option<usize>> = vec![None; registry.len()];
        for rule in lines {
            // Every name was inserted above, so resolution cannot miss.
            let Some(target) = registry.id(&rule.target) else { continue };
            let Ok(expr) = rule.expr.try_map_vars(&mut |name: String| registry.id(&name).ok_or(()))
            else {
                continue;
            };

            if let Some(previous) = defined_on[target.index()] {
                tracing::warn!(
                    target_node = %rule.target,
                    previous_line = previous,
                    line = rule.line,
                    "rule redefined, last definition wins"
                );
            }
            defined_on[target.index()] = Some(rule.line);
            rules[target.index()] = Some(expr);
        }

        let clamps = registry.names().iter().map(|name| clamps.get(name)).collect();
        let network = Self { registry, rules, clamps };

        tracing::debug!(
            nodes = network.len(),
            rules = network.rules.iter().flatten().count(),
            clamped = network.clamps.iter().flatten().count(),
            free_running = network.free_running().count(),
            "compiled network"
        );

        network
    }

    /// Node registry (bit order).
    pub fn registry(&self) -> &NodeRegistry {
        &self.registry
    }

    /// Number of nodes, i.e. bits per state vector.
    pub fn len(&self) -> usize {
        self.registry.len()
    }

    /// Check if the network has no nodes.
    pub fn is_empty(&self) -> bool {
        self.registry.is_empty()
    }

    /// Update behaviour of node `id`. Out-of-range ids report free-running.
    pub fn node_kind(&self, id: NodeId) -> NodeKind<'_> {
        if let Some(Some(value)) = self.clamps.get(id.index()) {
            return NodeKind::Clamped(*value);
        }
        match self.rules.get(id.index()) {
            Some(Some(expr)) => NodeKind::Rule(expr),
            _ => NodeKind::FreeRunning,
        }
    }

    /// Clamped bit of node `id`, if clamped.
    pub fn clamp(&self, id: NodeId) -> Option<bool> {
        self.clamps.get(id.index()).copied().flatten()
    }

    /// Check whether node `id` is clamped.
    pub fn is_clamped(&self, id: NodeId) -> bool {
        self.clamp(id).is_some()
    }

    /// Rule text's expression for node `id`, whether or not it is clamped.
    pub fn rule(&self, id: NodeId) -> Option<&Expr<NodeId>> {
        self.rules.get(id.index()).and_then(Option::as_ref)
    }

    /// Clamped nodes and their bits, in registry order.
    pub fn clamped(&self) -> impl Iterator<Item = (NodeId, bool)> + '_ {
        self.clamps.iter().enumerate().filter_map(|(i, clamp)| clamp.map(|value| (NodeId(i), value)))
    }

    /// Nodes with no rule that are not clamped.
    pub fn free_running(&self) -> impl Iterator<Item = NodeId> + '_ {
        self.registry.ids().filter(|id| matches!(self.node_kind(*id), NodeKind::FreeRunning))
    }

    /// Force every clamped position of `state` to its fixed bit.
    pub fn apply_clamps(&self, state: &mut StateVector) {
        for (id, value) in self.clamped() {
            state.set(id, value);
        }
    }

    /// Synchronous update of every node. See [`transition::next_state`].
    pub fn next_state(&self, current: &StateVector) -> Result<StateVector, EvalError> {
        transition::next_state(self, current)
    }

    /// Directed regulator → target edges of the rule text.
    ///
    /// `(u, v)` is present iff `u` appears, negated or not, in `v`'s rule.
    /// Self-loops are kept.
    pub fn dependency_edges(&self) -> BTreeSet<(NodeId, NodeId)> {
        let mut edges = BTreeSet::new();
        for (index, rule) in self.rules.iter().enumerate() {
            if let Some(expr) = rule {
                expr.for_each_var(&mut |source| {
                    edges.insert((*source, NodeId(index)));
                });
            }
        }
        edges
    }

    /// Dependency edges by node name.
    pub fn named_dependency_edges(&self) -> BTreeSet<(&str, &str)> {
        self.dependency_edges()
            .into_iter()
            .filter_map(|(from, to)| Some((self.registry.name(from)?, self.registry.name(to)?)))
            .collect()
    }
}

/// Canonical rule text: one `name = expression` line per rule, registry order.
impl fmt::Display for Network {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (index, rule) in self.rules.iter().enumerate() {
            let Some(expr) = rule else { continue };
            let Some(target) = self.registry.name(NodeId(index)) else { continue };
            let named = expr
                .clone()
                .try_map_vars(&mut |id: NodeId| self.registry.name(id).ok_or(fmt::Error))?;
            writeln!(f, "{target} = {named}")?;
        }
        Ok(())
    }
}
