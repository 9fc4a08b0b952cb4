//! Network generators for tests.
//!
//! Every generator returns rule text plus clamps rather than a compiled
//! network, so tests exercise the compiler as well and can hand the same
//! input to the reference model.

use boolnet_core::{ClampSet, Expr};
use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;

/// Rule text and clamps for one generated network.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NetworkSource {
    /// Rule text, one rule per line
    pub rules: String,
    /// Clamp set to compile with
    pub clamps: ClampSet,
}

/// Two nodes that invert each other: every trajectory ends in a two-cycle
/// or a fixed point.
pub fn toggle_pair() -> NetworkSource {
    NetworkSource { rules: "A = NOT B\nB = NOT A\n".to_string(), clamps: ClampSet::new() }
}

/// Name of counter bit `i`; zero-padded so registry order is bit order.
pub fn counter_bit(i: usize) -> String {
    format!("c{i:02}")
}

/// Synchronous `bits`-bit binary counter over `c00..`, least significant
/// bit first.
///
/// From all-zeros it visits all 2^bits states before repeating, so it is
/// the standard way to force a long limit cycle or hit the step bound.
pub fn counter(bits: usize) -> NetworkSource {
    let mut rules = String::new();
    for i in 0..bits {
        let bit = counter_bit(i);
        if i == 0 {
            rules.push_str(&format!("{bit} = NOT {bit}\n"));
            continue;
        }
        let carry = (0..i).map(counter_bit).collect::<Vec<_>>().join(" AND ");
        rules.push_str(&format!("{bit} = ({bit} AND NOT ({carry})) OR (NOT {bit} AND ({carry}))\n"));
    }
    NetworkSource { rules, clamps: ClampSet::new() }
}

/// Shape of generated random networks.
#[derive(Debug, Clone, Copy)]
pub struct RandomNetworkConfig {
    /// Node count
    pub nodes: usize,
    /// Probability that a node gets a rule
    pub rule_probability: f64,
    /// Probability that a node is clamped
    pub clamp_probability: f64,
    /// Maximum expression depth
    pub max_depth: usize,
}

impl Default for RandomNetworkConfig {
    fn default() -> Self {
        Self { nodes: 6, rule_probability: 0.8, clamp_probability: 0.15, max_depth: 3 }
    }
}

/// Seeded random network over `n0..`.
///
/// Same seed and config give the same source.
pub fn random_network(seed: u64, config: &RandomNetworkConfig) -> NetworkSource {
    let mut rng = ChaCha8Rng::seed_from_u64(seed);
    let name = |i: usize| format!("n{i}");

    let mut rules = String::new();
    let mut clamps = ClampSet::new();
    for i in 0..config.nodes {
        if rng.gen_bool(config.rule_probability) {
            let expr = random_expr(&mut rng, config.nodes, config.max_depth);
            rules.push_str(&format!("{} = {expr}\n", name(i)));
        }
        if rng.gen_bool(config.clamp_probability) {
            clamps.insert(name(i), rng.gen_bool(0.5));
        }
    }

    tracing::trace!(seed, nodes = config.nodes, clamped = clamps.len(), "generated network");
    NetworkSource { rules, clamps }
}

fn random_expr<R: Rng>(rng: &mut R, nodes: usize, depth: usize) -> Expr<String> {
    if depth == 0 || rng.gen_bool(0.3) {
        return if rng.gen_bool(0.05) {
            Expr::Const(rng.gen_bool(0.5))
        } else {
            Expr::Var(format!("n{}", rng.gen_range(0..nodes.max(1))))
        };
    }
    match rng.gen_range(0..3) {
        0 => Expr::not(random_expr(rng, nodes, depth - 1)),
        1 => Expr::and(random_expr(rng, nodes, depth - 1), random_expr(rng, nodes, depth - 1)),
        _ => Expr::or(random_expr(rng, nodes, depth - 1), random_expr(rng, nodes, depth - 1)),
    }
}
