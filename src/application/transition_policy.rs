// State transition policy - Escalates freely, de-escalates only out of Warning
use crate::domain::system_state::SystemState;

/// Next pack state given the state in effect and a fresh proposal.
///
/// Critical holds against Normal and Warning proposals and Fault holds
/// against everything. Clearing either needs an explicit recovery action
/// performed outside this policy.
pub fn next_state(current: SystemState, proposal: SystemState) -> SystemState {
    use SystemState as S;

    match (current, proposal) {
        (S::Fault, _) => S::Fault,
        (S::Critical, S::Fault) => S::Fault,
        (S::Critical, _) => S::Critical,
        (S::Normal | S::Warning, proposal) => proposal,
    }
}
