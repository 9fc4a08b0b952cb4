//! Fuzz target for trajectory tracing
//!
//! Builds small networks from structured rules and traces arbitrary initial
//! states under arbitrary step bounds.
//!
//! # Invariants
//!
//! - Tracing a well-sized state never errors and never panics
//! - Edge count never exceeds the bound; edges chain from the initial state
//! - Clamped bits hold in every visited state
//! - Cycle length is 1 for steady states, >= 2 for limit cycles, 0 otherwise

#![no_main]

use arbitrary::Arbitrary;
use boolnet_core::{ClampSet, Expr, Network, StateVector, Tracer, TracerConfig, TrajectoryStatus};
use libfuzzer_sys::fuzz_target;

const NODES: u8 = 6;

#[derive(Debug, Clone, Arbitrary)]
enum Rule {
    Var(u8),
    Const(bool),
    Not(Box<Rule>),
    And(Box<Rule>, Box<Rule>),
    Or(Box<Rule>, Box<Rule>),
}

impl Rule {
    fn to_expr(&self, depth: usize) -> Expr<String> {
        if depth == 0 {
            return Expr::Const(false);
        }
        match self {
            Self::Var(n) => Expr::Var(format!("n{}", n % NODES)),
            Self::Const(value) => Expr::Const(*value),
            Self::Not(inner) => Expr::not(inner.to_expr(depth - 1)),
            Self::And(lhs, rhs) => Expr::and(lhs.to_expr(depth - 1), rhs.to_expr(depth - 1)),
            Self::Or(lhs, rhs) => Expr::or(lhs.to_expr(depth - 1), rhs.to_expr(depth - 1)),
        }
    }
}

#[derive(Debug, Clone, Arbitrary)]
struct Input {
    rules: Vec<(u8, Rule)>,
    clamps: Vec<(u8, bool)>,
    initial: Vec<bool>,
    max_steps: u8,
}

fuzz_target!(|input: Input| {
    let mut text = String::new();
    for (target, rule) in input.rules.iter().take(16) {
        text.push_str(&format!("n{} = {}\n", target % NODES, rule.to_expr(8)));
    }
    let clamps: ClampSet =
        input.clamps.iter().map(|(node, value)| (format!("n{}", node % NODES), *value)).collect();

    let network = Network::compile(&text, &clamps).expect("generated rules compile");
    let mut initial = StateVector::from_bits(
        (0..network.len()).map(|i| input.initial.get(i).copied().unwrap_or(false)).collect(),
    );
    network.apply_clamps(&mut initial);

    let max_steps = usize::from(input.max_steps);
    let trajectory = Tracer::with_config(&network, TracerConfig { max_steps })
        .trace(initial.clone())
        .expect("sized state traces");

    assert!(trajectory.steps() <= max_steps);
    let mut expected_from = &initial;
    for edge in &trajectory.edges {
        assert_eq!(&edge.from, expected_from, "edges must chain");
        for (id, value) in network.clamped() {
            assert_eq!(edge.to.get(id), Some(value), "clamp drifted");
        }
        expected_from = &edge.to;
    }

    match trajectory.status {
        TrajectoryStatus::SteadyState => assert_eq!(trajectory.cycle_length, 1),
        TrajectoryStatus::LimitCycle => assert!(trajectory.cycle_length >= 2),
        TrajectoryStatus::MaxStepsReached => {
            assert_eq!(trajectory.cycle_length, 0);
            assert_eq!(trajectory.steps(), max_steps);
        },
    }
});
