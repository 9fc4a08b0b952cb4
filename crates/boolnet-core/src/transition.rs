//! Synchronous transition function.

use crate::{
    error::EvalError,
    network::{Network, NodeKind},
    state::StateVector,
};

/// Compute the successor of `current`.
///
/// Every node reads the same pre-update snapshot:
///
/// - clamped nodes take their fixed bit
/// - nodes with a rule take the rule evaluated against `current`
/// - free-running nodes keep their current bit
///
/// Deterministic and pure; O(nodes × average expression size).
pub fn next_state(network: &Network, current: &StateVector) -> Result<StateVector, EvalError> {
    if current.len() != network.len() {
        return Err(EvalError::StateLength { expected: network.len(), actual: current.len() });
    }

    let bits = network
        .registry()
        .ids()
        .map(|id| match network.node_kind(id) {
            NodeKind::Clamped(value) => Ok(value),
            NodeKind::Rule(expr) => expr.eval(current),
            NodeKind::FreeRunning => {
                current.get(id).ok_or(EvalError::NodeOutOfRange { node: id, len: current.len() })
            },
        })
        .collect::<Result<Vec<_>, _>>()?;

    Ok(StateVector::from_bits(bits))
}
