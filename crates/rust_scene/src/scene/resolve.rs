//! Render-state resolution
//!
//! States set along the path from the root to a leaf are pushed onto one
//! stack per category. At each leaf the top of every stack is taken, except
//! for lights and textures which are combined according to the inherited
//! combine modes. Empty stacks fall back to the context defaults.

use super::graph::SceneGraph;
use super::modes::CombineMode;
use super::render_context::{RenderContext, ResolvedStates};
use super::render_state::{LightState, RenderState, RenderStateType, StateData, TextureState};
use super::spatial::Spatial;
use crate::error::SceneResult;
use crate::foundation::collections::SpatialKey;
use crate::foundation::math::Vec3;
use std::sync::Arc;

type Stack = Vec<Arc<RenderState>>;

#[derive(Debug, Default)]
struct StateStacks {
    stacks: [Stack; RenderStateType::COUNT],
}

impl StateStacks {
    /// Push every state set on `spatial`, returning which slots were pushed
    fn push(&mut self, spatial: &Spatial) -> [bool; RenderStateType::COUNT] {
        let mut pushed = [false; RenderStateType::COUNT];
        for (index, state) in spatial.render_states.iter().enumerate() {
            if let Some(state) = state {
                self.stacks[index].push(Arc::clone(state));
                pushed[index] = true;
            }
        }
        pushed
    }

    fn pop(&mut self, pushed: [bool; RenderStateType::COUNT]) {
        for (stack, _) in self.stacks.iter_mut().zip(pushed).filter(|(_, p)| *p) {
            stack.pop();
        }
    }

    fn get(&self, ty: RenderStateType) -> &[Arc<RenderState>] {
        &self.stacks[ty.index()]
    }
}

/// Per-leaf inputs to the light and texture combiners
struct CombineParams {
    light_mode: CombineMode,
    texture_mode: CombineMode,
    center: Vec3,
    max_lights: usize,
    max_texture_units: usize,
}

impl SceneGraph {
    /// Resolve render states for every leaf under `key`, taking into account
    /// the states set on `key` and on its ancestors.
    ///
    /// # Errors
    ///
    /// [`crate::SceneError::SpatialNotFound`] for a stale key.
    pub fn update_render_state(&mut self, key: SpatialKey, ctx: &RenderContext) -> SceneResult<()> {
        self.spatial(key)?;

        let mut stacks = StateStacks::default();
        let mut path: Vec<_> = self.ancestors(key).collect();
        path.reverse();
        for spatial in path.into_iter().filter_map(|k| self.spatials.get(k)) {
            stacks.push(spatial);
        }

        self.update_render_state_with(key, &mut stacks, ctx);
        log::trace!("Resolved render states under {key:?}");
        Ok(())
    }

    fn update_render_state_with(&mut self, key: SpatialKey, stacks: &mut StateStacks, ctx: &RenderContext) {
        let Some(spatial) = self.spatials.get(key) else {
            return;
        };
        let pushed = stacks.push(spatial);
        self.apply_render_state(key, stacks, ctx);
        stacks.pop(pushed);
    }

    fn apply_render_state(&mut self, key: SpatialKey, stacks: &mut StateStacks, ctx: &RenderContext) {
        let Some(spatial) = self.spatials.get(key) else {
            return;
        };

        if spatial.is_node() {
            for child in spatial.children().to_vec() {
                self.update_render_state_with(child, stacks, ctx);
            }
            return;
        }

        let params = CombineParams {
            light_mode: self.resolved_light_combine_mode(key),
            texture_mode: self.resolved_texture_combine_mode(key),
            center: spatial.world_bound().map_or(spatial.world.translation, |b| b.center()),
            max_lights: self.config.max_lights,
            max_texture_units: self.config.max_texture_units,
        };

        let states = ResolvedStates::from_fn(|ty| {
            let stack = stacks.get(ty);
            match (ty, stack.last()) {
                (_, None) => Arc::clone(ctx.default_state(ty)),
                (RenderStateType::Light, Some(_)) => combine_lights(stack, &params),
                (RenderStateType::Texture, Some(_)) => combine_textures(stack, &params),
                (_, Some(top)) => Arc::clone(top),
            }
        });

        if let Some(geometry) = self.spatials.get_mut(key).and_then(|s| s.as_geometry_mut()) {
            geometry.set_resolved_states(states);
        }
    }
}

/// Walk `stack` in the order `mode` prescribes, handing every enabled
/// state to `absorb`
fn walk_enabled(stack: &[Arc<RenderState>], mode: CombineMode, mut absorb: impl FnMut(&RenderState)) {
    match mode {
        CombineMode::CombineFirst => stack.iter().filter(|s| s.enabled).for_each(|s| absorb(s.as_ref())),
        CombineMode::CombineClosest => stack.iter().rev().filter(|s| s.enabled).for_each(|s| absorb(s.as_ref())),
        CombineMode::CombineRecentEnabled => stack.iter().rev().take_while(|s| s.enabled).for_each(|s| absorb(s.as_ref())),
        CombineMode::Off | CombineMode::Replace | CombineMode::Inherit => {}
    }
}

fn combine_lights(stack: &[Arc<RenderState>], params: &CombineParams) -> Arc<RenderState> {
    match params.light_mode {
        CombineMode::Off => return Arc::new(RenderState::disabled(StateData::Light(LightState::default()))),
        CombineMode::Replace | CombineMode::Inherit => {
            if let Some(top) = stack.last() {
                return Arc::clone(top);
            }
        }
        _ => {}
    }

    let closest = params.light_mode == CombineMode::CombineClosest;
    let limit = if closest { usize::MAX } else { params.max_lights };

    let mut combined = LightState::default();
    let mut found_enabled = false;
    walk_enabled(stack, params.light_mode, |state| {
        found_enabled = true;
        if let Some(lights) = state.as_light() {
            combined.two_sided |= lights.two_sided;
            for light in &lights.lights {
                combined.attach(light.clone(), limit);
            }
        }
    });

    if closest {
        combined
            .lights
            .sort_by(|a, b| a.distance_to(&params.center).total_cmp(&b.distance_to(&params.center)));
        combined.lights.truncate(params.max_lights);
    }

    Arc::new(RenderState {
        enabled: found_enabled,
        data: StateData::Light(combined),
    })
}

fn combine_textures(stack: &[Arc<RenderState>], params: &CombineParams) -> Arc<RenderState> {
    match params.texture_mode {
        CombineMode::Off => return Arc::new(RenderState::disabled(StateData::Texture(TextureState::default()))),
        CombineMode::Replace | CombineMode::Inherit => {
            if let Some(top) = stack.last() {
                return Arc::clone(top);
            }
        }
        _ => {}
    }

    let mut combined = TextureState::default();
    let mut found_enabled = false;
    walk_enabled(stack, params.texture_mode, |state| {
        found_enabled = true;
        let Some(textures) = state.as_texture() else {
            return;
        };
        for (unit, texture) in textures.units.iter().enumerate().take(params.max_texture_units) {
            if let Some(texture) = texture {
                if combined.texture(unit).is_none() {
                    combined.set_texture(unit, texture.clone());
                }
            }
        }
    });

    Arc::new(RenderState {
        enabled: found_enabled,
        data: StateData::Texture(combined),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::scene::render_state::{Light, Texture};

    fn light_state(names: &[&str], enabled: bool) -> Arc<RenderState> {
        let lights = names
            .iter()
            .enumerate()
            .map(|(i, name)| Light::point(*name, Vec3::new(i as f32 * 10.0, 0.0, 0.0), Vec3::repeat(1.0)))
            .collect();
        Arc::new(RenderState {
            enabled,
            data: StateData::Light(LightState { lights, two_sided: false }),
        })
    }

    fn params(light_mode: CombineMode) -> CombineParams {
        CombineParams {
            light_mode,
            texture_mode: CombineMode::CombineClosest,
            center: Vec3::zeros(),
            max_lights: 8,
            max_texture_units: 8,
        }
    }

    fn light_names(state: &RenderState) -> Vec<String> {
        state.as_light().unwrap().lights.iter().map(|l| l.name.clone()).collect()
    }

    #[test]
    fn test_combine_first_walks_from_root() {
        let stack = vec![light_state(&["sun"], true), light_state(&["lamp", "sun"], true)];
        let combined = combine_lights(&stack, &params(CombineMode::CombineFirst));
        assert!(combined.enabled);
        assert_eq!(light_names(&combined), ["sun", "lamp"]);
    }

    #[test]
    fn test_recent_enabled_stops_at_disabled() {
        let stack = vec![light_state(&["sun"], true), light_state(&["moon"], false), light_state(&["lamp"], true)];
        let combined = combine_lights(&stack, &params(CombineMode::CombineRecentEnabled));
        assert_eq!(light_names(&combined), ["lamp"]);
    }

    #[test]
    fn test_closest_sorts_and_caps() {
        let stack = vec![light_state(&["a", "b", "c"], true)];
        let mut params = params(CombineMode::CombineClosest);
        params.center = Vec3::new(20.0, 0.0, 0.0);
        params.max_lights = 2;

        let combined = combine_lights(&stack, &params);
        assert_eq!(light_names(&combined), ["c", "b"]);
    }

    #[test]
    fn test_off_and_replace() {
        let stack = vec![light_state(&["sun"], true), light_state(&["lamp"], true)];

        let off = combine_lights(&stack, &params(CombineMode::Off));
        assert!(!off.enabled);
        assert!(light_names(&off).is_empty());

        let replaced = combine_lights(&stack, &params(CombineMode::Replace));
        assert!(Arc::ptr_eq(&replaced, &stack[1]));
    }

    #[test]
    fn test_all_disabled_yields_disabled_state() {
        let stack = vec![light_state(&["sun"], false)];
        let combined = combine_lights(&stack, &params(CombineMode::CombineFirst));
        assert!(!combined.enabled);
    }

    #[test]
    fn test_textures_fill_free_units_nearest_first() {
        let texture = |id: u32| Texture {
            id,
            name: format!("tex{id}"),
        };
        let mut root = TextureState::default();
        root.set_texture(0, texture(1));
        root.set_texture(1, texture(2));
        let mut leaf = TextureState::default();
        leaf.set_texture(0, texture(3));

        let stack = vec![
            Arc::new(RenderState::new(StateData::Texture(root))),
            Arc::new(RenderState::new(StateData::Texture(leaf))),
        ];
        let mut params = params(CombineMode::CombineFirst);
        params.texture_mode = CombineMode::CombineClosest;
        let combined = combine_textures(&stack, &params);
        let textures = combined.as_texture().unwrap();
        assert_eq!(textures.texture(0).unwrap().id, 3);
        assert_eq!(textures.texture(1).unwrap().id, 2);
    }
}
