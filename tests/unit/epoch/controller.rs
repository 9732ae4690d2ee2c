use std::{cell::Cell, rc::Rc};

use rand::{SeedableRng, rngs::StdRng};

use super::*;
use crate::{epoch::catalog::Catalog, timeline::stage::MaterialId};

fn dawn() -> EpochController {
    let catalog = Catalog::builtin();
    EpochController::new(catalog.get(EpochId::CosmicDawn).unwrap().clone())
}

#[test]
fn lifecycle_runs_forward_once() {
    let mut rng = StdRng::seed_from_u64(7);
    let mut stage = Stage::default();
    let mut epoch = dawn();
    assert_eq!(epoch.state(), EpochState::Dormant);
    assert!(!epoch.tick(0.1, &mut stage));

    assert!(epoch.mount(&mut rng, 0.02, &mut stage).unwrap());
    assert_eq!(epoch.state(), EpochState::Mounted);
    assert!(!stage.materials.is_live(MaterialId::Stars));
    assert!(!epoch.mount(&mut rng, 0.02, &mut stage).unwrap());

    epoch.tick(5.0, &mut stage);
    assert_eq!(epoch.state(), EpochState::Animating);
    assert_eq!(epoch.clock(), 0.0);
    assert!(stage.materials.is_live(MaterialId::Stars));

    epoch.unmount(&mut stage);
    assert_eq!(epoch.state(), EpochState::Unmounted);
    assert_eq!(epoch.particle_count(), 0);
    assert!(!stage.materials.is_live(MaterialId::Stars));
    assert!(epoch.mount(&mut rng, 0.02, &mut stage).is_err());
}

#[test]
fn completion_latches_exactly_once() {
    let mut rng = StdRng::seed_from_u64(11);
    let mut stage = Stage::default();
    let mut epoch = dawn();
    epoch.mount(&mut rng, 0.02, &mut stage).unwrap();
    let fired = Rc::new(Cell::new(0u32));
    let counter = Rc::clone(&fired);
    epoch.on_complete(move || counter.set(counter.get() + 1));

    let mut completions = 0;
    for _ in 0..400 {
        if epoch.tick(0.1, &mut stage) {
            completions += 1;
            assert!(epoch.clock() >= 18.0 - 1e-9);
        }
    }
    assert_eq!(completions, 1);
    assert_eq!(fired.get(), 1);
    assert_eq!(epoch.state(), EpochState::Complete);

    let late = Rc::new(Cell::new(false));
    let flag = Rc::clone(&late);
    epoch.on_complete(move || flag.set(true));
    assert!(late.get());
}

#[test]
fn population_sizes_never_change_while_animating() {
    let mut rng = StdRng::seed_from_u64(3);
    let mut stage = Stage::default();
    let mut epoch = dawn();
    epoch.mount(&mut rng, 0.05, &mut stage).unwrap();
    let sizes: Vec<usize> = epoch.frames().map(|(p, _)| p.len()).collect();
    assert_eq!(sizes[0], 9);
    assert_eq!(sizes[1], 750);

    for _ in 0..120 {
        epoch.tick(0.25, &mut stage);
        for ((population, states), &size) in epoch.frames().zip(&sizes) {
            assert_eq!(population.len(), size);
            assert_eq!(states.len(), size);
            for s in states {
                assert!(s.size >= 0.0);
                assert!((0.0..=1.0).contains(&s.opacity));
            }
        }
    }
}

#[test]
fn stars_ignite_as_the_clock_runs() {
    let mut rng = StdRng::seed_from_u64(5);
    let mut stage = Stage::default();
    let mut epoch = dawn();
    epoch.mount(&mut rng, 0.05, &mut stage).unwrap();
    let lit = |epoch: &EpochController| {
        let (_, stars) = epoch.frames().next().unwrap();
        stars.iter().filter(|s| s.is_visible()).count()
    };
    epoch.tick(0.0, &mut stage);
    assert!(lit(&epoch) <= 1);
    for _ in 0..100 {
        epoch.tick(0.2, &mut stage);
    }
    assert_eq!(lit(&epoch), 9);
}

#[test]
fn time_uniform_follows_local_clock() {
    let mut rng = StdRng::seed_from_u64(1);
    let mut stage = Stage::default();
    let mut epoch = dawn();
    epoch.mount(&mut rng, 0.01, &mut stage).unwrap();
    epoch.tick(0.0, &mut stage);
    epoch.tick(0.5, &mut stage);
    epoch.tick(0.25, &mut stage);
    let time = stage.materials.get(MaterialId::Stars).unwrap().time;
    assert!((time - 0.75).abs() < 1e-12);
    assert_eq!(epoch.clock(), time);
}

#[test]
fn failed_mount_leaves_epoch_dormant() {
    let mut rng = StdRng::seed_from_u64(1);
    let mut stage = Stage::default();
    let mut def = Catalog::builtin().get(EpochId::CosmicDawn).unwrap().clone();
    def.populations[1].anchor = Some("nowhere".to_string());
    let mut epoch = EpochController::new(def);
    assert!(epoch.mount(&mut rng, 1.0, &mut stage).is_err());
    assert_eq!(epoch.state(), EpochState::Dormant);
    assert!(stage.materials.ids().next().is_none());
    assert!(epoch.mount(&mut rng, 0.0, &mut stage).is_err());
}

#[test]
fn scaling_keeps_empty_populations_empty() {
    use crate::population::{
        distribution::Distribution,
        generator::PopulationSpec,
        kind::{ParticleKind, Span, Variant},
    };

    let mut rng = StdRng::seed_from_u64(9);
    let mut stage = Stage::default();
    let mut def = Catalog::builtin().get(EpochId::CosmicDawn).unwrap().clone();
    def.populations.push(PopulationSpec::new(
        "empty",
        0,
        Distribution::Point,
        vec![Variant::solid(
            ParticleKind::Dust,
            1.0,
            crate::Vec3::ONE,
            Span::new(1.0, 1.0),
        )],
    ));
    let mut epoch = EpochController::new(def);
    epoch.mount(&mut rng, 1.0, &mut stage).unwrap();
    let empty = epoch.frames().find(|(p, _)| p.name() == "empty").unwrap();
    assert!(empty.0.is_empty());

    assert_eq!(scaled_count(0, 3.0), 0);
    assert_eq!(scaled_count(4, 0.01), 1);
    assert_eq!(scaled_count(100, 0.25), 25);
}
