use std::cell::RefCell;
use std::rc::Rc;
use std::sync::Arc;

use o2_animation_core::{parse_clips_json, Curve};
use o2_state_graph_core::{
    Animator, GraphState, StateGraph, StateGraphEvent, TransitionDef, TransitionId,
};
use o2_test_fixtures::{clips, state_graphs};

const DT: f32 = 0.125;

fn approx(a: f32, b: f32) {
    assert!((a - b).abs() <= 1e-6, "left={a} right={b}");
}

fn animator_with(graph: StateGraph) -> Animator {
    let json = clips::json("locomotion").expect("clip fixture");
    let mut animator = Animator::default();
    for cfg in parse_clips_json(&json).expect("valid clips") {
        animator.animation.add_clip(cfg);
    }
    animator.set_graph(Some(Arc::new(graph)));
    animator
}

fn animator(graph: &str) -> Animator {
    let json = state_graphs::json(graph).expect("state graph fixture");
    animator_with(StateGraph::from_json(&json).expect("valid graph"))
}

fn record(animator: &Animator) -> Rc<RefCell<Vec<StateGraphEvent>>> {
    let seen = Rc::new(RefCell::new(Vec::new()));
    let sink = Rc::clone(&seen);
    animator
        .state_graph
        .events()
        .subscribe(move |e| sink.borrow_mut().push(e.clone()));
    seen
}

fn clip_weight(animator: &Animator, clip: &str) -> f32 {
    let id = animator.animation.find(clip).expect("clip");
    animator.animation.weight(id)
}

fn cancellations(events: &[StateGraphEvent]) -> Vec<TransitionId> {
    events
        .iter()
        .filter_map(|e| match e {
            StateGraphEvent::TransitionCancelled { transition, .. } => Some(*transition),
            _ => None,
        })
        .collect()
}

#[test]
fn reset_starts_in_initial_state() {
    let animator = animator("locomotion");
    assert_eq!(animator.state(), Some("Idle"));
    assert!(animator.state_graph.current_transition().is_none());
    assert!(animator.state_graph.next_state().is_none());
    assert_eq!(clip_weight(&animator, "idle_body"), 1.0);
    assert_eq!(clip_weight(&animator, "idle_face"), 1.0);
}

#[test]
fn direct_transition_completes_after_its_duration() {
    let mut animator = animator("locomotion");
    let seen = record(&animator);
    animator.go_to_state("Run");
    assert_eq!(animator.state_graph.next_transitions().len(), 1);

    animator.update(DT);
    let t = animator.state_graph.current_transition().expect("started on first tick");
    assert_eq!(t.destination_state(), "Run");
    assert_eq!(animator.state_graph.next_state_name(), Some("Run"));

    animator.update(DT);
    approx(clip_weight(&animator, "idle_body"), 0.5);
    approx(clip_weight(&animator, "run_body"), 0.5);

    animator.update(DT);
    assert_eq!(animator.state(), Some("Idle"));
    animator.update(DT);

    assert_eq!(animator.state(), Some("Run"));
    assert!(animator.state_graph.current_transition().is_none());
    assert!(animator.state_graph.next_state().is_none());
    assert_eq!(clip_weight(&animator, "run_body"), 1.0);
    let idle = animator.animation.find("idle_body").unwrap();
    assert!(!animator.animation.is_playing(idle));

    let seen = seen.borrow();
    assert!(seen.contains(&StateGraphEvent::TransitionStarted {
        transition: TransitionId(0),
        from: "Idle".into(),
        to: "Run".into(),
    }));
    assert!(seen.contains(&StateGraphEvent::TransitionFinished {
        transition: TransitionId(0),
        from: "Idle".into(),
        to: "Run".into(),
    }));
    assert!(cancellations(&seen).is_empty());
}

#[test]
fn transition_waits_for_its_window() {
    let mut animator = animator("windowed");
    animator.go_to_state("Run");

    // Idle ratio goes 0.125, 0.25, 0.375: still outside [0.4, 0.6]
    for _ in 0..3 {
        animator.update(DT);
        assert!(animator.state_graph.current_transition().is_none());
        assert_eq!(animator.state_graph.next_transitions().len(), 1);
        assert_eq!(animator.state(), Some("Idle"));
    }

    // Ratio 0.5
    animator.update(DT);
    assert!(animator.state_graph.current_transition().is_some());
    assert!(animator.state_graph.next_transitions().is_empty());
}

#[test]
fn stop_transition_mid_blend_cancels_once() {
    let mut animator = animator("locomotion");
    animator.go_to_state("Run");
    animator.update(DT);
    animator.update(DT);
    approx(animator.state_graph.transition_time(), 0.25);

    let seen = record(&animator);
    animator.stop_transition();

    assert_eq!(cancellations(&seen.borrow()), vec![TransitionId(0)]);
    assert_eq!(animator.state(), Some("Idle"));
    assert!(animator.state_graph.next_state().is_none());
    assert!(animator.state_graph.current_transition().is_none());
    assert_eq!(clip_weight(&animator, "idle_body"), 1.0);
    let run = animator.animation.find("run_body").unwrap();
    assert!(!animator.animation.is_playing(run));

    // Nothing left to cancel
    animator.stop_transition();
    assert_eq!(cancellations(&seen.borrow()).len(), 1);
}

#[test]
fn force_play_bypasses_blend() {
    let mut animator = animator("locomotion");
    animator.go_to_state("Run");
    animator.update(DT);
    animator.update(DT);

    let seen = record(&animator);
    animator.force_play_state("Run");

    assert_eq!(animator.state(), Some("Run"));
    assert_eq!(animator.state_graph.current_weight(), Some(1.0));
    assert_eq!(clip_weight(&animator, "run_body"), 1.0);
    assert!(animator.state_graph.current_transition().is_none());
    assert!(animator.state_graph.next_state().is_none());
    let idle = animator.animation.find("idle_body").unwrap();
    assert!(!animator.animation.is_playing(idle));
    assert_eq!(cancellations(&seen.borrow()), vec![TransitionId(0)]);

    // No cross-fade follows
    animator.update(DT);
    assert_eq!(clip_weight(&animator, "run_body"), 1.0);
    assert!(animator.state_graph.current_transition().is_none());
}

#[test]
fn curve_shapes_blend_weights() {
    let mut g = StateGraph::new();
    g.add_state(GraphState::new("Idle").with_animation("idle_body")).unwrap();
    g.add_state(GraphState::new("Run").with_animation("run_body")).unwrap();
    g.add_transition(
        TransitionDef::new("Idle", "Run", 0.5)
            .with_curve(Curve::keys([(0.0, 0.0), (0.5, 0.8), (1.0, 1.0)])),
    )
    .unwrap();
    let mut animator = animator_with(g);
    animator.go_to_state("Run");

    animator.update(DT);
    animator.update(DT);

    approx(animator.state_graph.current_weight().unwrap(), 0.2);
    approx(animator.state_graph.next_weight().unwrap(), 0.8);
    approx(clip_weight(&animator, "idle_body"), 0.2);
    approx(clip_weight(&animator, "run_body"), 0.8);
}

#[test]
fn weights_sum_to_one_throughout_a_route() {
    let mut animator = animator("combat");
    animator.go_to_state("Run");

    for _ in 0..16 {
        animator.update(DT);
        let sg = &animator.state_graph;
        if let Some(id) = sg.current_transition_id() {
            assert!(sg.next_player().is_some());
            assert!(!sg.next_transitions().contains(&id));
            let sum = sg.current_weight().unwrap() + sg.next_weight().unwrap();
            approx(sum, 1.0);
        } else {
            assert!(sg.next_player().is_none());
            assert_eq!(sg.current_weight(), Some(1.0));
        }
    }
    assert_eq!(animator.state(), Some("Run"));
}

#[test]
fn multi_hop_route_plays_each_transition_in_order() {
    let mut animator = animator("combat");
    let seen = record(&animator);
    animator.go_to_state("Run");
    assert_eq!(
        animator.state_graph.next_transitions().iter().copied().collect::<Vec<_>>(),
        vec![TransitionId(0), TransitionId(1)]
    );

    animator.update(DT);
    animator.update(DT);
    assert_eq!(animator.state(), Some("Walk"));
    animator.update(DT);
    animator.update(DT);
    assert_eq!(animator.state(), Some("Run"));

    let finished: Vec<_> = seen
        .borrow()
        .iter()
        .filter_map(|e| match e {
            StateGraphEvent::TransitionFinished { transition, .. } => Some(*transition),
            _ => None,
        })
        .collect();
    assert_eq!(finished, vec![TransitionId(0), TransitionId(1)]);
}

#[test]
fn stopping_a_route_cancels_in_flight_then_queued() {
    let mut animator = animator("combat");
    animator.go_to_state("Run");
    animator.update(DT);

    let seen = record(&animator);
    animator.stop_transition();
    assert_eq!(
        cancellations(&seen.borrow()),
        vec![TransitionId(0), TransitionId(1)]
    );
    assert!(animator.state_graph.next_transitions().is_empty());
    assert_eq!(animator.state(), Some("Idle"));
}

#[test]
fn go_to_state_mid_blend_replans_from_current_state() {
    let mut animator = animator("locomotion");
    animator.go_to_state("Run");
    animator.update(DT);

    let seen = record(&animator);
    animator.go_to_state("Run");
    let seen = seen.borrow();
    assert_eq!(cancellations(&seen), vec![TransitionId(0)]);
    assert_eq!(
        seen.last(),
        Some(&StateGraphEvent::TransitionsPlanned {
            target: "Run".into(),
            path: vec![TransitionId(0)],
        })
    );
    assert_eq!(animator.state(), Some("Idle"));
    assert!(animator.state_graph.current_transition().is_none());
}

#[test]
fn once_clip_opens_late_window_at_its_end() {
    let mut animator = animator("combat");
    animator.force_play_state("Jump");
    animator.go_to_state("Walk");
    assert_eq!(
        animator.state_graph.next_transitions().iter().copied().collect::<Vec<_>>(),
        vec![TransitionId(5), TransitionId(0)]
    );

    // jump is 0.75s long; ratio reaches the [0.9, 1.0] window on the sixth tick
    for _ in 0..5 {
        animator.update(DT);
        assert!(animator.state_graph.current_transition().is_none());
    }
    animator.update(DT);
    assert_eq!(
        animator.state_graph.current_transition_id(),
        Some(TransitionId(5))
    );
}

#[test]
fn zero_duration_transition_switches_in_one_tick() {
    let mut animator = animator("combat");
    animator.go_to_state("Ragdoll");
    animator.update(DT);
    assert_eq!(animator.state(), Some("Ragdoll"));
    assert!(animator.state_graph.current_transition().is_none());
    assert!(animator.state_graph.current_player().unwrap().is_empty());
}

#[test]
fn unreachable_target_plans_empty_route() {
    let mut animator = animator("combat");
    animator.force_play_state("Ragdoll");
    let seen = record(&animator);
    animator.go_to_state("Idle");

    assert_eq!(
        *seen.borrow(),
        vec![StateGraphEvent::TransitionsPlanned {
            target: "Idle".into(),
            path: Vec::new(),
        }]
    );
    assert!(animator.state_graph.next_transitions().is_empty());
    animator.update(DT);
    assert_eq!(animator.state(), Some("Ragdoll"));
}

#[test]
fn unknown_target_is_ignored() {
    let mut animator = animator("locomotion");
    let seen = record(&animator);
    animator.go_to_state("Swim");
    assert!(seen.borrow().is_empty());
    assert!(animator.state_graph.next_transitions().is_empty());
}

#[test]
fn empty_state_sits_at_ratio_zero() {
    let mut g = StateGraph::new();
    g.add_state(GraphState::new("Empty")).unwrap();
    g.add_state(GraphState::new("Late").with_animation("idle_body")).unwrap();
    g.add_state(GraphState::new("Early").with_animation("run_body")).unwrap();
    g.add_transition(TransitionDef::new("Empty", "Late", 0.25).with_window(0.5, 1.0))
        .unwrap();
    g.add_transition(TransitionDef::new("Empty", "Early", 0.25)).unwrap();

    let mut animator = animator_with(g);
    animator.go_to_state("Late");
    for _ in 0..8 {
        animator.update(DT);
    }
    assert!(animator.state_graph.current_transition().is_none());
    assert_eq!(animator.state_graph.next_transitions().len(), 1);

    animator.go_to_state("Early");
    animator.update(DT);
    assert_eq!(
        animator.state_graph.current_transition_id(),
        Some(TransitionId(1))
    );
}

#[test]
fn missing_sub_animations_do_not_block_a_state() {
    let mut animator = animator("combat");
    animator.force_play_state("Run");
    let player = animator.state_graph.current_player().unwrap();
    assert_eq!(player.entries().len(), 1);
    assert_eq!(player.entries()[0].0.name, "run_body");
}

#[test]
fn swapping_the_graph_cancels_and_restarts() {
    let mut animator = animator("combat");
    animator.go_to_state("Run");
    animator.update(DT);

    let seen = record(&animator);
    let locomotion = state_graphs::json("locomotion").unwrap();
    animator.set_graph(Some(Arc::new(StateGraph::from_json(&locomotion).unwrap())));

    assert_eq!(
        cancellations(&seen.borrow()),
        vec![TransitionId(0), TransitionId(1)]
    );
    assert_eq!(animator.state(), Some("Idle"));
    assert!(animator.state_graph.next_transitions().is_empty());
    assert_eq!(clip_weight(&animator, "idle_face"), 1.0);
}

#[test]
fn buffered_events_can_be_drained() {
    let mut animator = animator("locomotion");
    animator.state_graph.events().clear();
    animator.go_to_state("Run");
    animator.update(DT);
    let events = animator.state_graph.events().drain();
    assert_eq!(
        events,
        vec![
            StateGraphEvent::TransitionsPlanned {
                target: "Run".into(),
                path: vec![TransitionId(0)],
            },
            StateGraphEvent::StateStarted { state: "Run".into() },
            StateGraphEvent::TransitionStarted {
                transition: TransitionId(0),
                from: "Idle".into(),
                to: "Run".into(),
            },
        ]
    );
    assert!(animator.state_graph.events().is_empty());
}

#[test]
fn go_to_current_state_plans_nothing() {
    let mut animator = animator("locomotion");
    let seen = record(&animator);
    animator.go_to_state("Idle");
    assert_eq!(
        *seen.borrow(),
        vec![StateGraphEvent::TransitionsPlanned {
            target: "Idle".into(),
            path: Vec::new(),
        }]
    );
    animator.update(DT);
    assert!(animator.state_graph.current_transition().is_none());
    assert_eq!(animator.state(), Some("Idle"));
}

// Idle{idle_body, idle_face} and Talk{idle_face, run_body} share the face clip;
// Talk reads its timeline from it.
fn shared_face_graph() -> StateGraph {
    let mut g = StateGraph::new();
    g.add_state(
        GraphState::new("Idle")
            .with_animation("idle_body")
            .with_animation("idle_face"),
    )
    .unwrap();
    g.add_state(
        GraphState::new("Talk")
            .with_animation("idle_face")
            .with_animation("run_body"),
    )
    .unwrap();
    g.add_transition(TransitionDef::new("Idle", "Talk", 0.25)).unwrap();
    g.add_transition(TransitionDef::new("Talk", "Idle", 0.25).with_window(0.5, 1.0))
        .unwrap();
    g
}

#[test]
fn finishing_a_transition_keeps_shared_clips_running() {
    let mut animator = animator_with(shared_face_graph());
    let face = animator.animation.find("idle_face").unwrap();
    let body = animator.animation.find("idle_body").unwrap();
    animator.go_to_state("Talk");

    animator.update(DT);
    assert_eq!(clip_weight(&animator, "idle_face"), 1.0);
    animator.update(DT);

    assert_eq!(animator.state(), Some("Talk"));
    assert!(animator.animation.is_playing(face));
    assert_eq!(clip_weight(&animator, "idle_face"), 1.0);
    assert!(!animator.animation.is_playing(body));

    // The face clip keeps advancing, so the [0.5, 1] window back to Idle opens.
    animator.go_to_state("Idle");
    animator.update(DT);
    animator.update(DT);
    assert!(animator.state_graph.current_transition().is_none());
    animator.update(DT);
    assert_eq!(
        animator.state_graph.current_transition_id(),
        Some(TransitionId(1))
    );
}

#[test]
fn cancelling_keeps_shared_clips_running() {
    let mut animator = animator_with(shared_face_graph());
    let face = animator.animation.find("idle_face").unwrap();
    let run = animator.animation.find("run_body").unwrap();
    animator.go_to_state("Talk");
    animator.update(DT);

    animator.stop_transition();
    assert_eq!(animator.state(), Some("Idle"));
    assert!(animator.animation.is_playing(face));
    assert_eq!(clip_weight(&animator, "idle_face"), 1.0);
    assert!(!animator.animation.is_playing(run));
}
