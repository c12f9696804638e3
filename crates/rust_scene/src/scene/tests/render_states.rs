use super::*;
use approx::assert_relative_eq;
use crate::scene::modes::CombineMode;
use crate::scene::render_state::{AlphaState, Light, LightState, RenderState, RenderStateType, StateData};
use std::sync::Arc;

fn wireframe(line_width: f32) -> RenderState {
    RenderState::new(StateData::Wireframe { line_width })
}

fn line_width(graph: &SceneGraph, ctx: &RenderContext, leaf: SpatialKey) -> f32 {
    let resolved = graph.get(leaf).unwrap().as_geometry().unwrap().resolved_states();
    match ctx.effective_state(resolved, RenderStateType::Wireframe).data {
        StateData::Wireframe { line_width } => line_width,
        _ => unreachable!("wireframe slot holds another category"),
    }
}

fn lights(names: &[&str]) -> RenderState {
    RenderState::new(StateData::Light(LightState {
        lights: names
            .iter()
            .map(|name| Light::point(*name, Vec3::zeros(), Vec3::repeat(1.0)))
            .collect(),
        two_sided: false,
    }))
}

#[test]
fn test_nearest_ancestor_wins() {
    let mut graph = SceneGraph::new();
    let ctx = RenderContext::new();
    let root = graph.create_node("root");
    let mid = graph.create_node("mid");
    graph.attach_child(root, mid).unwrap();
    let deep = sphere_leaf(&mut graph, "deep", 1.0);
    graph.attach_child(mid, deep).unwrap();
    let shallow = sphere_leaf(&mut graph, "shallow", 1.0);
    graph.attach_child(root, shallow).unwrap();

    graph.get_mut(root).unwrap().set_render_state(wireframe(1.5));
    graph.get_mut(mid).unwrap().set_render_state(wireframe(3.0));

    graph.update_render_state(root, &ctx).unwrap();

    assert_relative_eq!(line_width(&graph, &ctx, deep), 3.0);
    assert_relative_eq!(line_width(&graph, &ctx, shallow), 1.5);
}

#[test]
fn test_enforced_beats_resolved() {
    let mut graph = SceneGraph::new();
    let mut ctx = RenderContext::new();
    let root = graph.create_node("root");
    let leaf = sphere_leaf(&mut graph, "leaf", 1.0);
    graph.attach_child(root, leaf).unwrap();
    graph.get_mut(leaf).unwrap().set_render_state(wireframe(2.0));
    graph.update_render_state(root, &ctx).unwrap();

    ctx.enforce_state(wireframe(9.0));
    assert_relative_eq!(line_width(&graph, &ctx, leaf), 9.0);

    ctx.clear_enforced();
    assert_relative_eq!(line_width(&graph, &ctx, leaf), 2.0);
}

#[test]
fn test_stacks_restored_between_siblings() {
    let mut graph = SceneGraph::new();
    let ctx = RenderContext::new();
    let root = graph.create_node("root");
    let blended = graph.create_node("blended");
    graph.attach_child(root, blended).unwrap();
    let glass = sphere_leaf(&mut graph, "glass", 1.0);
    graph.attach_child(blended, glass).unwrap();
    let stone = sphere_leaf(&mut graph, "stone", 1.0);
    graph.attach_child(root, stone).unwrap();

    graph.get_mut(blended).unwrap().set_render_state(RenderState::new(StateData::Alpha(AlphaState {
        blend: true,
        test_threshold: None,
    })));

    graph.update_render_state(root, &ctx).unwrap();

    let alpha = |leaf: SpatialKey| {
        let resolved = graph.get(leaf).unwrap().as_geometry().unwrap().resolved_states().unwrap();
        Arc::clone(resolved.get(RenderStateType::Alpha))
    };
    assert!(alpha(glass).enabled);
    assert!(!alpha(stone).enabled);
    assert!(Arc::ptr_eq(&alpha(stone), ctx.default_state(RenderStateType::Alpha)));
}

#[test]
fn test_subtree_update_sees_ancestor_states() {
    let mut graph = SceneGraph::new();
    let ctx = RenderContext::new();
    let root = graph.create_node("root");
    let mid = graph.create_node("mid");
    graph.attach_child(root, mid).unwrap();
    let leaf = sphere_leaf(&mut graph, "leaf", 1.0);
    graph.attach_child(mid, leaf).unwrap();
    graph.get_mut(root).unwrap().set_render_state(wireframe(4.0));

    graph.update_render_state(mid, &ctx).unwrap();

    assert_relative_eq!(line_width(&graph, &ctx, leaf), 4.0);
}

#[test]
fn test_lights_combine_along_path() {
    let mut graph = SceneGraph::new();
    let ctx = RenderContext::new();
    let root = graph.create_node("root");
    let leaf = sphere_leaf(&mut graph, "leaf", 1.0);
    graph.attach_child(root, leaf).unwrap();
    graph.get_mut(root).unwrap().set_render_state(lights(&["sun", "fill"]));
    graph.get_mut(leaf).unwrap().set_render_state(lights(&["lamp", "sun"]));
    graph.update_geometric_state(root, 0.0, true).unwrap();

    graph.update_render_state(root, &ctx).unwrap();
    let combined = |graph: &SceneGraph| {
        let resolved = graph.get(leaf).unwrap().as_geometry().unwrap().resolved_states().unwrap();
        resolved
            .get(RenderStateType::Light)
            .as_light()
            .unwrap()
            .lights
            .iter()
            .map(|l| l.name.clone())
            .collect::<Vec<_>>()
    };
    assert_eq!(combined(&graph), ["sun", "fill", "lamp"]);

    graph.get_mut(leaf).unwrap().light_combine_mode = CombineMode::Replace;
    graph.update_render_state(root, &ctx).unwrap();
    assert_eq!(combined(&graph), ["lamp", "sun"]);
}

#[test]
fn test_light_cap_comes_from_config() {
    let mut graph = SceneGraph::new();
    graph.config_mut().max_lights = 1;
    let ctx = RenderContext::new();
    let leaf = sphere_leaf(&mut graph, "leaf", 1.0);
    graph.get_mut(leaf).unwrap().set_render_state(lights(&["a", "b", "c"]));

    graph.update_render_state(leaf, &ctx).unwrap();

    let resolved = graph.get(leaf).unwrap().as_geometry().unwrap().resolved_states().unwrap();
    assert_eq!(resolved.get(RenderStateType::Light).as_light().unwrap().lights.len(), 1);
}

#[test]
fn test_starting_spatial_contributes_its_own_states() {
    let mut graph = SceneGraph::new();
    let ctx = RenderContext::new();
    let root = graph.create_node("root");
    let child = sphere_leaf(&mut graph, "child", 1.0);
    graph.attach_child(root, child).unwrap();
    graph.get_mut(root).unwrap().set_render_state(wireframe(7.0));
    let loner = sphere_leaf(&mut graph, "loner", 1.0);
    graph.get_mut(loner).unwrap().set_render_state(wireframe(5.0));

    graph.update_render_state(root, &ctx).unwrap();
    graph.update_render_state(loner, &ctx).unwrap();

    assert_relative_eq!(line_width(&graph, &ctx, child), 7.0);
    assert_relative_eq!(line_width(&graph, &ctx, loner), 5.0);
}
