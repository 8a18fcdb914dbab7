use crate::state::SearchState;

/// Hand-authored mutation policy consulted before random mutation.
///
/// Returning `None` defers to the weighted random mutation step.
pub trait ManualMutation: Send + Sync {
    /// Produces the mutated state, or `None` to fall through.
    fn mutate(&self, state: &SearchState) -> Option<SearchState>;
}

/// Policy that never intervenes.
#[derive(Debug, Clone, Copy, Default)]
pub struct IdentityMutation;

impl ManualMutation for IdentityMutation {
    fn mutate(&self, _state: &SearchState) -> Option<SearchState> {
        None
    }
}
