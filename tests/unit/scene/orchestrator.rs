use std::{cell::Cell, rc::Rc};

use super::*;
use crate::timeline::stage::{MaterialId, ParamTarget};

fn config() -> SceneConfig {
    SceneConfig {
        seed: Some(1),
        population_scale: 0.01,
        ..SceneConfig::default()
    }
}

fn scene(config: SceneConfig) -> Scene {
    Scene::new(config, Catalog::builtin()).unwrap()
}

fn run(scene: &mut Scene, ticks: usize) {
    for _ in 0..ticks {
        scene.tick(0.1).unwrap();
    }
}

fn started(events: &[SceneEvent]) -> Vec<EpochId> {
    events
        .iter()
        .filter_map(|e| match e {
            SceneEvent::TransitionStarted { epoch, .. } => Some(*epoch),
            _ => None,
        })
        .collect()
}

#[test]
fn rejects_invalid_config() {
    let bad = SceneConfig {
        population_scale: 0.0,
        ..SceneConfig::default()
    };
    assert!(Scene::new(bad, Catalog::builtin()).is_err());
}

#[test]
fn missing_foreign_materials_abort_without_side_effects() {
    let mut scene = scene(SceneConfig {
        start_epoch: EpochId::Inflation,
        ..config()
    });
    let outcome = scene.begin_transition(EpochId::Inflation).unwrap();
    let TransitionOutcome::Aborted { missing } = outcome else {
        panic!("expected abort, got {outcome:?}");
    };
    assert!(missing.iter().any(|m| m.contains("Foam")));
    assert_eq!(scene.mounted().count(), 0);
    assert_eq!(scene.stage(), &Stage::default());
    assert!(!scene.is_transitioning());
    assert!(matches!(
        scene.drain_events().as_slice(),
        [SceneEvent::TransitionAborted { epoch: EpochId::Inflation, .. }]
    ));
}

#[test]
fn transition_starts_after_settle_delay() {
    let mut scene = scene(config());
    assert_eq!(
        scene.begin_transition(EpochId::Planck).unwrap(),
        TransitionOutcome::Accepted
    );
    assert!(scene.epoch(EpochId::Planck).is_mounted());
    assert!(scene.is_transitioning());
    assert_eq!(scene.current_epoch(), None);

    scene.tick(0.05).unwrap();
    assert_eq!(scene.current_epoch(), None);
    scene.tick(0.05).unwrap();
    assert_eq!(scene.current_epoch(), Some(EpochId::Planck));
    assert!(scene.stage().materials.is_live(MaterialId::Foam));
    assert_eq!(started(&scene.drain_events()), vec![EpochId::Planck]);

    let view = scene.presentation();
    assert_eq!(view.epoch_label, "Planck Epoch");
    assert!(view.transitioning);
}

#[test]
fn overlapping_requests_follow_policy() {
    let mut scene = scene(config());
    scene.begin_transition(EpochId::Planck).unwrap();
    assert_eq!(
        scene.begin_transition(EpochId::Planck).unwrap(),
        TransitionOutcome::AlreadyActive
    );
    assert_eq!(
        scene.begin_transition(EpochId::Plasma).unwrap(),
        TransitionOutcome::Rejected {
            reason: RejectReason::OutOfOrder
        }
    );
    assert_eq!(
        scene.begin_transition(EpochId::Inflation).unwrap(),
        TransitionOutcome::Rejected {
            reason: RejectReason::Busy
        }
    );
    assert!(!scene.epoch(EpochId::Inflation).is_mounted());
}

#[test]
fn queued_transition_runs_when_idle_and_retires_older_epochs() {
    let mut scene = scene(SceneConfig {
        overlap_policy: OverlapPolicy::Queue,
        ..config()
    });
    scene.begin_transition(EpochId::Planck).unwrap();
    assert_eq!(
        scene.begin_transition(EpochId::Inflation).unwrap(),
        TransitionOutcome::Queued
    );
    assert_eq!(
        scene.begin_transition(EpochId::Plasma).unwrap(),
        TransitionOutcome::Rejected {
            reason: RejectReason::Busy
        }
    );

    run(&mut scene, 80);
    let events = scene.drain_events();
    assert_eq!(started(&events), vec![EpochId::Planck, EpochId::Inflation]);
    assert!(events.contains(&SceneEvent::EpochUnmounted {
        epoch: EpochId::Planck
    }));
    let mounted: Vec<EpochId> = scene.mounted().map(EpochController::id).collect();
    assert_eq!(mounted, vec![EpochId::Inflation]);
    assert!(!scene.stage().materials.is_live(MaterialId::Foam));
    assert!(!scene.is_transitioning());
}

#[test]
fn camera_belongs_to_the_timeline_until_released() {
    let mut scene = scene(config());
    scene.begin_transition(EpochId::Planck).unwrap();
    run(&mut scene, 5);
    assert!(!scene.controls().is_enabled());

    let before = scene.stage().camera;
    let zoom = OrbitInput {
        zoom: 2.0,
        ..OrbitInput::default()
    };
    assert_eq!(
        scene.dispatch(Command::UserInput(zoom)).unwrap(),
        CommandOutcome::Input(false)
    );
    assert_eq!(scene.stage().camera, before);

    run(&mut scene, 30);
    assert!(scene.controls().is_enabled());
    assert_eq!(scene.controls().limits().max_distance, 20.0);
    assert!(scene.user_input(&zoom));
    let z = scene.stage().camera.position.z;
    assert!((z - 10.0).abs() < 1e-9);

    run(&mut scene, 10);
    assert_eq!(scene.stage().camera.position.z, z);
}

#[test]
fn completion_callback_fires_once() {
    let mut scene = scene(config());
    let fired = Rc::new(Cell::new(0u32));
    let counter = Rc::clone(&fired);
    scene
        .begin_transition_with(EpochId::Planck, move || counter.set(counter.get() + 1))
        .unwrap();
    run(&mut scene, 60);
    assert_eq!(fired.get(), 1);
    assert!(scene.drain_events().iter().any(|e| matches!(
        e,
        SceneEvent::TransitionCompleted {
            epoch: EpochId::Planck,
            ..
        }
    )));
}

#[test]
fn stage_cues_update_the_marker() {
    let mut scene = scene(SceneConfig {
        start_epoch: EpochId::Planck,
        overlap_policy: OverlapPolicy::Queue,
        auto_chain: true,
        ..config()
    });
    scene.begin_transition(EpochId::Planck).unwrap();
    run(&mut scene, 1000);
    let events = scene.drain_events();
    let stages: Vec<u8> = events
        .iter()
        .filter_map(|e| match e {
            SceneEvent::StageCue {
                epoch: EpochId::Recombination,
                stage,
            } => Some(*stage),
            _ => None,
        })
        .collect();
    assert_eq!(stages, vec![1, 2, 3]);
}

#[test]
fn auto_chain_walks_every_epoch_in_order() {
    let mut scene = scene(SceneConfig {
        auto_chain: true,
        ..config()
    });
    scene
        .dispatch(Command::BeginTransition(EpochId::Planck))
        .unwrap();
    run(&mut scene, 1000);

    let events = scene.drain_events();
    assert_eq!(started(&events), EpochId::ALL.to_vec());
    assert!(
        !events
            .iter()
            .any(|e| matches!(e, SceneEvent::TransitionAborted { .. }))
    );
    assert_eq!(scene.current_epoch(), Some(EpochId::CosmicDawn));
    let mounted: Vec<EpochId> = scene.mounted().map(EpochController::id).collect();
    assert_eq!(mounted, vec![EpochId::CosmicDawn]);
    assert!((scene.presentation().bloom_intensity - 2.0).abs() < 1e-9);
    assert!(scene.controls().is_enabled());
}

#[test]
fn nothing_happens_without_a_request() {
    let mut scene = scene(SceneConfig {
        auto_chain: true,
        ..config()
    });
    run(&mut scene, 20);
    assert!(scene.drain_events().is_empty());
    assert_eq!(scene.mounted().count(), 0);
    assert!((scene.now() - 2.0).abs() < 1e-9);
}

#[test]
fn queued_transition_keeps_its_completion_callback() {
    let mut scene = scene(SceneConfig {
        overlap_policy: OverlapPolicy::Queue,
        ..config()
    });
    scene.begin_transition(EpochId::Planck).unwrap();
    let fired = Rc::new(Cell::new(0u32));
    let counter = Rc::clone(&fired);
    assert_eq!(
        scene
            .begin_transition_with(EpochId::Inflation, move || counter.set(counter.get() + 1))
            .unwrap(),
        TransitionOutcome::Queued
    );

    run(&mut scene, 80);
    assert!(scene.drain_events().iter().any(|e| matches!(
        e,
        SceneEvent::TransitionCompleted {
            epoch: EpochId::Inflation,
            ..
        }
    )));
    assert_eq!(fired.get(), 1);
    run(&mut scene, 20);
    assert_eq!(fired.get(), 1);
}

#[test]
fn stalled_auto_chain_reports_the_abort_once() {
    let mut scene = scene(config());
    scene.begin_transition(EpochId::Planck).unwrap();
    run(&mut scene, 60);
    assert_eq!(scene.epoch(EpochId::Planck).state(), EpochState::Complete);
    assert!(!scene.is_transitioning());
    scene.drain_events();

    scene.stage.materials.remove(MaterialId::Foam);
    scene.config.auto_chain = true;
    run(&mut scene, 50);
    let aborted = |events: &[SceneEvent]| {
        events
            .iter()
            .filter(|e| matches!(e, SceneEvent::TransitionAborted { .. }))
            .count()
    };
    assert_eq!(aborted(&scene.drain_events()), 1);
    assert!(!scene.epoch(EpochId::Inflation).is_mounted());

    assert!(matches!(
        scene.begin_transition(EpochId::Inflation).unwrap(),
        TransitionOutcome::Aborted { .. }
    ));
    run(&mut scene, 5);
    assert_eq!(aborted(&scene.drain_events()), 1);
}

#[test]
fn missing_targets_are_listed_once() {
    let mut catalog = Catalog::builtin();
    let inflation = &mut catalog.epochs[EpochId::Inflation.index()];
    let foam = inflation
        .transition
        .effects
        .iter()
        .find(|e| {
            matches!(
                e.target,
                ParamTarget::Material {
                    id: MaterialId::Foam,
                    ..
                }
            )
        })
        .cloned()
        .unwrap();
    inflation.transition.effects.push(foam);

    let mut scene = Scene::new(
        SceneConfig {
            start_epoch: EpochId::Inflation,
            ..config()
        },
        catalog,
    )
    .unwrap();
    let TransitionOutcome::Aborted { missing } =
        scene.begin_transition(EpochId::Inflation).unwrap()
    else {
        panic!("expected abort");
    };
    let mut distinct = missing.clone();
    distinct.sort();
    distinct.dedup();
    assert_eq!(missing, distinct);
}
