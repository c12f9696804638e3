use super::*;
use crate::foundation::math::constants::PI;
use crate::foundation::math::Quat;
use crate::scene::controller::{Controller, ControllerContext, SpinController};
use approx::assert_relative_eq;

/// Detaches its own spatial on the first update and then retires
#[derive(Debug)]
struct Runaway;

impl Controller for Runaway {
    fn update(&mut self, _time: f32, ctx: &mut ControllerContext<'_>) {
        ctx.detach_spatial();
        ctx.finish();
    }
}

/// Removes another spatial from the graph
#[derive(Debug)]
struct Reaper {
    target: SpatialKey,
}

impl Controller for Reaper {
    fn update(&mut self, _time: f32, ctx: &mut ControllerContext<'_>) {
        ctx.remove(self.target);
    }
}

#[derive(Debug)]
struct Drift {
    velocity: Vec3,
}

impl Controller for Drift {
    fn update(&mut self, time: f32, ctx: &mut ControllerContext<'_>) {
        let translation = ctx.local_transform().translation + self.velocity * time;
        ctx.set_local_translation(translation);
    }
}

fn z_angle(rotation: &Quat) -> f32 {
    rotation.scaled_axis().z
}

#[test]
fn test_spin_controller_rotates_before_world_update() {
    let mut graph = SceneGraph::new();
    let root = graph.create_node("root");
    graph.get_mut(root).unwrap().add_controller(SpinController::new(Vec3::z(), PI / 4.0));

    graph.update_geometric_state(root, 1.0, true).unwrap();

    let root = graph.get(root).unwrap();
    assert_relative_eq!(z_angle(&root.local.rotation), PI / 4.0, epsilon = EPSILON);
    assert_relative_eq!(z_angle(&root.world_rotation()), PI / 4.0, epsilon = EPSILON);
}

#[test]
fn test_slot_speed_and_active_flag() {
    let mut graph = SceneGraph::new();
    let root = graph.create_node("root");
    let index = graph.get_mut(root).unwrap().add_controller(SpinController::new(Vec3::z(), PI / 4.0));
    graph.get_mut(root).unwrap().controller_mut(index).unwrap().speed = 2.0;

    graph.update_geometric_state(root, 1.0, true).unwrap();
    assert_relative_eq!(z_angle(&graph.get(root).unwrap().local.rotation), PI / 2.0, epsilon = EPSILON);

    graph.get_mut(root).unwrap().controller_mut(index).unwrap().active = false;
    graph.update_geometric_state(root, 1.0, true).unwrap();
    assert_relative_eq!(z_angle(&graph.get(root).unwrap().local.rotation), PI / 2.0, epsilon = EPSILON);
}

#[test]
fn test_controllers_run_in_order() {
    let mut graph = SceneGraph::new();
    let root = graph.create_node("root");
    let child = graph.create_node("child");
    graph.attach_child(root, child).unwrap();
    graph.get_mut(root).unwrap().add_controller(Drift {
        velocity: Vec3::new(1.0, 0.0, 0.0),
    });
    graph.get_mut(child).unwrap().add_controller(Drift {
        velocity: Vec3::new(0.0, 2.0, 0.0),
    });

    graph.update_geometric_state(root, 0.5, true).unwrap();

    assert_relative_eq!(
        graph.get(child).unwrap().world_translation(),
        Vec3::new(0.5, 1.0, 0.0),
        epsilon = EPSILON
    );
}

#[test]
fn test_self_detach_is_deferred() {
    let mut graph = SceneGraph::new();
    let root = graph.create_node("root");
    let ball = place_sphere(&mut graph, root, "ball", Vec3::new(2.0, 0.0, 0.0));
    let rock = place_sphere(&mut graph, root, "rock", Vec3::new(-2.0, 0.0, 0.0));
    graph.get_mut(ball).unwrap().add_controller(Runaway);

    graph.update_geometric_state(root, 0.1, true).unwrap();

    assert_eq!(graph.parent(ball), None);
    assert_eq!(graph.children(root), [rock]);
    assert!(graph.get(ball).unwrap().controllers().is_empty());
    assert_relative_eq!(
        graph.get(ball).unwrap().world_translation(),
        Vec3::new(2.0, 0.0, 0.0),
        epsilon = EPSILON
    );

    let bound = *graph.get(root).unwrap().world_bound().unwrap().as_sphere().unwrap();
    assert_relative_eq!(bound.center, Vec3::new(-2.0, 0.0, 0.0), epsilon = EPSILON);
    assert_relative_eq!(bound.radius, 1.0, epsilon = EPSILON);
}

#[test]
fn test_queued_removal_drops_subtree() {
    let mut graph = SceneGraph::new();
    let root = graph.create_node("root");
    let doomed = graph.create_node("doomed");
    graph.attach_child(root, doomed).unwrap();
    place_sphere(&mut graph, doomed, "passenger", Vec3::zeros());
    graph.get_mut(root).unwrap().add_controller(Reaper { target: doomed });

    graph.update_geometric_state(root, 0.1, true).unwrap();

    assert!(!graph.contains(doomed));
    assert_eq!(graph.len(), 1);

    // A second pass finds nothing left to remove.
    graph.update_geometric_state(root, 0.1, true).unwrap();
    assert_eq!(graph.len(), 1);
}

#[test]
fn test_non_initiator_update_leaves_edits_pending() {
    let mut graph = SceneGraph::new();
    let root = graph.create_node("root");
    let ball = place_sphere(&mut graph, root, "ball", Vec3::zeros());
    graph.get_mut(ball).unwrap().add_controller(Runaway);

    graph.update_geometric_state(ball, 0.1, false).unwrap();
    assert_eq!(graph.parent(ball), Some(root));

    assert_eq!(graph.apply_pending_edits(), 1);
    assert_eq!(graph.parent(ball), None);
}
