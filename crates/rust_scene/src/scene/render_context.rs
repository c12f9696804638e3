//! Default and enforced render states for one render pass
//!
//! Precedence when a leaf is drawn: an enforced state for the category wins,
//! then the state resolved from the tree, then the context default.

use super::render_state::{RenderState, RenderStateType};
use std::sync::Arc;

/// One state per category, in slot order
#[derive(Debug, Clone, PartialEq)]
pub struct ResolvedStates {
    states: [Arc<RenderState>; RenderStateType::COUNT],
}

impl ResolvedStates {
    pub(crate) fn from_fn(mut f: impl FnMut(RenderStateType) -> Arc<RenderState>) -> Self {
        Self {
            states: std::array::from_fn(|index| f(RenderStateType::ALL[index])),
        }
    }

    /// State for a category
    pub fn get(&self, ty: RenderStateType) -> &Arc<RenderState> {
        &self.states[ty.index()]
    }

    pub(crate) fn set(&mut self, state: Arc<RenderState>) {
        let index = state.state_type().index();
        self.states[index] = state;
    }

    /// All states in slot order
    pub fn iter(&self) -> impl Iterator<Item = &Arc<RenderState>> {
        self.states.iter()
    }
}

/// Explicit replacement for process-wide default and enforced state tables.
///
/// Several contexts can coexist, for example when a texture render pass runs
/// inside a frame.
#[derive(Debug, Clone)]
pub struct RenderContext {
    defaults: ResolvedStates,
    enforced: [Option<Arc<RenderState>>; RenderStateType::COUNT],
}

impl Default for RenderContext {
    fn default() -> Self {
        Self::new()
    }
}

impl RenderContext {
    /// Context with [`RenderState::default_for`] defaults and nothing enforced
    pub fn new() -> Self {
        Self {
            defaults: ResolvedStates::from_fn(|ty| Arc::new(RenderState::default_for(ty))),
            enforced: std::array::from_fn(|_| None),
        }
    }

    /// Default for a category
    pub fn default_state(&self, ty: RenderStateType) -> &Arc<RenderState> {
        self.defaults.get(ty)
    }

    /// Replace the default for the state's category
    pub fn set_default_state(&mut self, state: RenderState) {
        self.defaults.set(Arc::new(state));
    }

    /// Override the state's category for everything drawn with this context
    pub fn enforce_state(&mut self, state: RenderState) {
        let index = state.state_type().index();
        log::debug!("Enforcing {:?} state", state.state_type());
        self.enforced[index] = Some(Arc::new(state));
    }

    /// Stop overriding a category
    pub fn clear_enforced_state(&mut self, ty: RenderStateType) {
        self.enforced[ty.index()] = None;
    }

    /// Stop overriding every category
    pub fn clear_enforced(&mut self) {
        self.enforced = std::array::from_fn(|_| None);
    }

    /// Enforced state for a category
    pub fn enforced_state(&self, ty: RenderStateType) -> Option<&Arc<RenderState>> {
        self.enforced[ty.index()].as_ref()
    }

    /// Run `f` with `states` enforced, restoring the previous overrides
    /// afterwards. This is how a multi-pass effect applies its states.
    pub fn with_enforced<R>(
        &mut self,
        states: impl IntoIterator<Item = RenderState>,
        f: impl FnOnce(&mut Self) -> R,
    ) -> R {
        let saved = self.enforced.clone();
        for state in states {
            self.enforce_state(state);
        }
        let result = f(self);
        self.enforced = saved;
        result
    }

    /// The state a backend should bind for `ty`
    pub fn effective_state(&self, resolved: Option<&ResolvedStates>, ty: RenderStateType) -> Arc<RenderState> {
        self.enforced_state(ty)
            .or_else(|| resolved.map(|states| states.get(ty)))
            .unwrap_or_else(|| self.default_state(ty))
            .clone()
    }

    /// [`RenderContext::effective_state`] for every category
    pub fn effective_states(&self, resolved: Option<&ResolvedStates>) -> ResolvedStates {
        ResolvedStates::from_fn(|ty| self.effective_state(resolved, ty))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::scene::render_state::{AlphaState, StateData};

    fn blended() -> RenderState {
        RenderState::new(StateData::Alpha(AlphaState {
            blend: true,
            test_threshold: None,
        }))
    }

    #[test]
    fn test_precedence_enforced_resolved_default() {
        let mut ctx = RenderContext::new();
        let resolved = ResolvedStates::from_fn(|ty| Arc::new(RenderState::default_for(ty)));
        let mut resolved_wire = resolved.clone();
        resolved_wire.set(Arc::new(RenderState::new(StateData::Wireframe { line_width: 2.0 })));

        // nothing resolved: default
        assert!(!ctx.effective_state(None, RenderStateType::Wireframe).enabled);
        // resolved beats default
        assert!(ctx.effective_state(Some(&resolved_wire), RenderStateType::Wireframe).enabled);

        // enforced beats resolved
        ctx.enforce_state(RenderState::disabled(StateData::Wireframe { line_width: 5.0 }));
        let effective = ctx.effective_state(Some(&resolved_wire), RenderStateType::Wireframe);
        assert_eq!(effective.data, StateData::Wireframe { line_width: 5.0 });
    }

    #[test]
    fn test_with_enforced_restores_previous() {
        let mut ctx = RenderContext::new();

        let inside = ctx.with_enforced([blended()], |ctx| ctx.enforced_state(RenderStateType::Alpha).is_some());
        assert!(inside);
        assert!(ctx.enforced_state(RenderStateType::Alpha).is_none());
    }
}
