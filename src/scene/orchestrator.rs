use std::{collections::BTreeSet, fmt};

use rand::{SeedableRng, rngs::StdRng};

use crate::{
    controls::orbit::{OrbitControls, OrbitInput},
    epoch::{
        catalog::Catalog,
        controller::{EpochController, EpochState},
        definition::EpochId,
    },
    foundation::{
        core::SimClock,
        error::CosmosResult,
        math::derive_seed,
    },
    scene::{
        config::{OverlapPolicy, SceneConfig},
        presentation::PresentationState,
    },
    timeline::{
        driver::{CueAction, ScheduledEffect, TimelineDriver},
        stage::{ParamTarget, Stage},
    },
};

/// Commands a host dispatches into the scene.
#[derive(Clone, Copy, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(tag = "command", content = "value", rename_all = "snake_case")]
pub enum Command {
    /// Request a transition into an epoch.
    BeginTransition(EpochId),
    /// One frame of interactive camera input.
    UserInput(OrbitInput),
}

/// Why a transition request was refused.
#[derive(Clone, Copy, Debug, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RejectReason {
    /// Another transition is mounting or playing (and the queue, if any, is full).
    Busy,
    /// The target is not the next epoch in timeline order.
    OutOfOrder,
}

/// Immediate result of a transition request.
#[derive(Clone, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(tag = "outcome", rename_all = "snake_case")]
pub enum TransitionOutcome {
    /// Target mounted; its timeline starts after the settle delay.
    Accepted,
    /// The target already owns the scene or is being transitioned into. No-op.
    AlreadyActive,
    /// Held until the scene is idle.
    Queued,
    /// Refused.
    Rejected {
        /// Reason.
        reason: RejectReason,
    },
    /// A target the transition needs is not live; nothing was mounted or written.
    Aborted {
        /// Parameters that were not live.
        missing: Vec<String>,
    },
}

/// Result of [`Scene::dispatch`].
#[derive(Clone, Debug, PartialEq)]
pub enum CommandOutcome {
    /// Result of a transition request.
    Transition(TransitionOutcome),
    /// Whether the input moved the camera.
    Input(bool),
}

/// Lifecycle notifications drained by the host.
#[derive(Clone, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(tag = "event", rename_all = "snake_case")]
pub enum SceneEvent {
    /// Populations generated, materials registered.
    EpochMounted {
        /// Epoch.
        epoch: EpochId,
    },
    /// Buffers and materials released.
    EpochUnmounted {
        /// Epoch.
        epoch: EpochId,
    },
    /// The epoch's timeline started and it now owns the scene.
    TransitionStarted {
        /// Epoch.
        epoch: EpochId,
        /// Scene time (seconds).
        at: f64,
    },
    /// The epoch's timeline finished.
    TransitionCompleted {
        /// Epoch.
        epoch: EpochId,
        /// Scene time (seconds).
        at: f64,
    },
    /// The transition was dropped before its timeline started.
    TransitionAborted {
        /// Epoch.
        epoch: EpochId,
        /// Parameters that were not live.
        missing: Vec<String>,
    },
    /// The request was queued.
    TransitionQueued {
        /// Epoch.
        epoch: EpochId,
    },
    /// A stage cue fired.
    StageCue {
        /// Epoch.
        epoch: EpochId,
        /// New stage marker.
        stage: u8,
    },
    /// Interactive controls took over the camera.
    CameraReleased {
        /// Epoch whose limits apply.
        epoch: EpochId,
    },
    /// The epoch's local clock reached its completion time.
    EpochCompleted {
        /// Epoch.
        epoch: EpochId,
    },
}

struct Pending {
    epoch: EpochId,
    ready_at: f64,
    on_complete: Option<Box<dyn FnOnce()>>,
}

struct Active {
    epoch: EpochId,
    driver: TimelineDriver,
}

struct Queued {
    epoch: EpochId,
    on_complete: Option<Box<dyn FnOnce()>>,
}

/// Owns every epoch, the shared stage and the interactive camera, and sequences transitions.
///
/// Transitions run strictly forward. A request mounts the target, waits `settle_delay` so the
/// target's materials initialize, re-checks that every timeline target is live and only then
/// starts the driver. At most one driver writes the stage at a time; overlapping requests are
/// rejected or queued per [`OverlapPolicy`]. Older epochs are unmounted when the newer
/// transition finishes.
pub struct Scene {
    config: SceneConfig,
    stage: Stage,
    controls: OrbitControls,
    clock: SimClock,
    epochs: Vec<EpochController>,
    current: Option<EpochId>,
    pending: Option<Pending>,
    active: Option<Active>,
    queued: Option<Queued>,
    stalled: Option<EpochId>,
    events: Vec<SceneEvent>,
}

impl fmt::Debug for Scene {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Scene")
            .field("now", &self.clock.elapsed())
            .field("current", &self.current)
            .field("pending", &self.pending.as_ref().map(|p| p.epoch))
            .field("active", &self.active.as_ref().map(|a| a.epoch))
            .field("queued", &self.queued_epoch())
            .field("stalled", &self.stalled)
            .finish_non_exhaustive()
    }
}

impl Scene {
    /// Build a scene over `catalog`. Nothing is mounted until the first transition request.
    pub fn new(config: SceneConfig, catalog: Catalog) -> CosmosResult<Self> {
        config.validate()?;
        catalog.validate()?;
        let epochs = catalog
            .epochs
            .into_iter()
            .map(EpochController::new)
            .collect();
        Ok(Self {
            clock: SimClock::new(config.max_frame_delta),
            config,
            stage: Stage::default(),
            controls: OrbitControls::default(),
            epochs,
            current: None,
            pending: None,
            active: None,
            queued: None,
            stalled: None,
            events: Vec::new(),
        })
    }

    /// Settings.
    pub fn config(&self) -> &SceneConfig {
        &self.config
    }

    /// Shared visual state.
    pub fn stage(&self) -> &Stage {
        &self.stage
    }

    /// Interactive camera controller.
    pub fn controls(&self) -> &OrbitControls {
        &self.controls
    }

    /// Scene time in seconds.
    pub fn now(&self) -> f64 {
        self.clock.elapsed()
    }

    /// Epoch that owns the scene.
    pub fn current_epoch(&self) -> Option<EpochId> {
        self.current
    }

    /// Controller of `id`.
    pub fn epoch(&self, id: EpochId) -> &EpochController {
        &self.epochs[id.index()]
    }

    /// Mounted epochs in timeline order.
    pub fn mounted(&self) -> impl Iterator<Item = &EpochController> + '_ {
        self.epochs.iter().filter(|e| e.is_mounted())
    }

    /// Whether a transition is mounting or playing.
    pub fn is_transitioning(&self) -> bool {
        self.pending.is_some() || self.active.as_ref().is_some_and(|a| a.driver.is_running())
    }

    /// Snapshot for the presentation layer.
    pub fn presentation(&self) -> PresentationState {
        let marker = self
            .current
            .map(|id| self.epoch(id).stage_marker())
            .unwrap_or_default();
        PresentationState::capture(self.current, marker, &self.stage, self.is_transitioning())
    }

    /// Take every event raised since the last call.
    pub fn drain_events(&mut self) -> Vec<SceneEvent> {
        std::mem::take(&mut self.events)
    }

    /// Dispatch one host command.
    pub fn dispatch(&mut self, command: Command) -> CosmosResult<CommandOutcome> {
        match command {
            Command::BeginTransition(id) => {
                self.begin_transition(id).map(CommandOutcome::Transition)
            }
            Command::UserInput(input) => Ok(CommandOutcome::Input(self.user_input(&input))),
        }
    }

    /// Request a transition into `target`.
    pub fn begin_transition(&mut self, target: EpochId) -> CosmosResult<TransitionOutcome> {
        self.stalled = None;
        self.request(target, None)
    }

    /// Request a transition into `target`; `on_complete` runs once when its timeline
    /// finishes, including after waiting in the queue, and never if the transition is
    /// aborted or superseded.
    pub fn begin_transition_with(
        &mut self,
        target: EpochId,
        on_complete: impl FnOnce() + 'static,
    ) -> CosmosResult<TransitionOutcome> {
        self.stalled = None;
        self.request(target, Some(Box::new(on_complete)))
    }

    /// Apply one frame of user input to the camera. Ignored while a timeline owns the camera.
    pub fn user_input(&mut self, input: &OrbitInput) -> bool {
        if self.active.as_ref().is_some_and(|a| a.driver.holds_camera()) {
            return false;
        }
        self.controls.apply(&mut self.stage.camera, input)
    }

    fn queued_epoch(&self) -> Option<EpochId> {
        self.queued.as_ref().map(|q| q.epoch)
    }

    fn latest_requested(&self) -> Option<EpochId> {
        self.pending
            .as_ref()
            .map(|p| p.epoch)
            .or(self.active.as_ref().map(|a| a.epoch))
            .or(self.current)
    }

    #[tracing::instrument(skip(self, on_complete), fields(now = self.clock.elapsed()))]
    fn request(
        &mut self,
        target: EpochId,
        on_complete: Option<Box<dyn FnOnce()>>,
    ) -> CosmosResult<TransitionOutcome> {
        if self.latest_requested() == Some(target) || self.queued_epoch() == Some(target) {
            return Ok(TransitionOutcome::AlreadyActive);
        }
        let expected = match self.queued_epoch().or(self.latest_requested()) {
            Some(last) => last.next(),
            None => Some(self.config.start_epoch),
        };
        if expected != Some(target) {
            tracing::warn!(%target, "transition out of order");
            return Ok(TransitionOutcome::Rejected {
                reason: RejectReason::OutOfOrder,
            });
        }
        if self.is_transitioning() {
            return Ok(match (self.config.overlap_policy, self.queued.is_none()) {
                (OverlapPolicy::Queue, true) => {
                    self.queued = Some(Queued {
                        epoch: target,
                        on_complete,
                    });
                    self.events.push(SceneEvent::TransitionQueued { epoch: target });
                    tracing::debug!(%target, "transition queued");
                    TransitionOutcome::Queued
                }
                _ => {
                    tracing::warn!(%target, "transition rejected while busy");
                    TransitionOutcome::Rejected {
                        reason: RejectReason::Busy,
                    }
                }
            });
        }

        let missing = self.missing_foreign_targets(target);
        if !missing.is_empty() {
            tracing::warn!(%target, ?missing, "transition aborted before mount");
            self.stalled = Some(target);
            self.events.push(SceneEvent::TransitionAborted {
                epoch: target,
                missing: missing.clone(),
            });
            return Ok(TransitionOutcome::Aborted { missing });
        }

        let mut rng = match self.config.seed {
            Some(seed) => StdRng::seed_from_u64(derive_seed(seed, target.name())),
            None => StdRng::from_entropy(),
        };
        let scale = self.config.population_scale;
        let epoch = &mut self.epochs[target.index()];
        if epoch.mount(&mut rng, scale, &mut self.stage)? {
            self.events.push(SceneEvent::EpochMounted { epoch: target });
        }
        self.pending = Some(Pending {
            epoch: target,
            ready_at: self.clock.elapsed() + self.config.settle_delay,
            on_complete,
        });
        tracing::info!(%target, "transition accepted");
        Ok(TransitionOutcome::Accepted)
    }

    /// Live-check the parameters of `target`'s script that belong to other epochs.
    fn missing_foreign_targets(&self, target: EpochId) -> Vec<String> {
        let def = self.epochs[target.index()].definition();
        let own: BTreeSet<_> = def.materials.iter().map(|m| m.id).collect();
        let foreign = def.transition.effects.iter().filter(|e| match e.target {
            ParamTarget::Material { id, .. } => !own.contains(&id),
            _ => true,
        });
        self.missing_targets(foreign)
    }

    /// Distinct, sorted names of effect targets that are not live.
    fn missing_targets<'a>(
        &self,
        effects: impl IntoIterator<Item = &'a ScheduledEffect>,
    ) -> Vec<String> {
        effects
            .into_iter()
            .filter(|e| !self.stage.is_live(&e.target))
            .map(|e| format!("{:?}", e.target))
            .collect::<BTreeSet<_>>()
            .into_iter()
            .collect()
    }

    /// Advance the scene by a host frame delta (seconds).
    pub fn tick(&mut self, dt: f64) -> CosmosResult<()> {
        let applied = self.clock.advance(dt);
        let now = self.clock.elapsed();

        for epoch in &mut self.epochs {
            if epoch.tick(applied, &mut self.stage) {
                self.events.push(SceneEvent::EpochCompleted { epoch: epoch.id() });
            }
        }

        if self.pending.as_ref().is_some_and(|p| now >= p.ready_at) {
            self.start_pending(now);
        }

        self.drive(now);
        self.advance_sequence()
    }

    fn start_pending(&mut self, now: f64) {
        let Some(pending) = self.pending.take() else {
            return;
        };
        let target = pending.epoch;
        let def = self.epochs[target.index()].definition();

        let missing = self.missing_targets(&def.transition.effects);
        if !missing.is_empty() {
            self.abort_pending(target, missing);
            return;
        }

        let post = def.post;
        let script = def.transition.clone();
        let mut staged = self.stage.clone();
        post.apply(&mut staged.post);
        let mut driver = match TimelineDriver::schedule(&script, now, &staged) {
            Ok(driver) => driver,
            Err(err) => {
                self.abort_pending(target, vec![err.to_string()]);
                return;
            }
        };
        self.stage = staged;

        if let Some(previous) = self.active.as_mut()
            && previous.driver.is_running()
        {
            previous.driver.abort();
        }
        if driver.writes_camera() {
            self.controls.disable();
        }
        if let Some(callback) = pending.on_complete {
            driver.on_complete(callback);
        }
        self.current = Some(target);
        self.active = Some(Active {
            epoch: target,
            driver,
        });
        self.events.push(SceneEvent::TransitionStarted {
            epoch: target,
            at: now,
        });
        tracing::info!(%target, now, "transition started");
    }

    fn abort_pending(&mut self, target: EpochId, missing: Vec<String>) {
        tracing::warn!(%target, ?missing, "transition aborted");
        self.stalled = Some(target);
        let epoch = &mut self.epochs[target.index()];
        if epoch.is_mounted() && self.current != Some(target) {
            epoch.unmount(&mut self.stage);
            self.events.push(SceneEvent::EpochUnmounted { epoch: target });
        }
        self.events.push(SceneEvent::TransitionAborted {
            epoch: target,
            missing,
        });
    }

    fn drive(&mut self, now: f64) {
        let Some(active) = self.active.as_mut() else {
            return;
        };
        if !active.driver.is_running() {
            return;
        }
        let target = active.epoch;
        let tick = active.driver.evaluate(now, &mut self.stage);
        for action in tick.fired {
            match action {
                CueAction::SetStage(stage) => {
                    self.epochs[target.index()].set_stage_marker(stage);
                    self.events.push(SceneEvent::StageCue {
                        epoch: target,
                        stage,
                    });
                }
                CueAction::ReleaseCamera(limits) => {
                    self.controls.enable(limits);
                    self.events
                        .push(SceneEvent::CameraReleased { epoch: target });
                }
            }
        }
        if tick.completed {
            if !self.controls.is_enabled() {
                let limits = self.epochs[target.index()].definition().limits;
                self.controls.enable(limits);
                self.events
                    .push(SceneEvent::CameraReleased { epoch: target });
            }
            self.events.push(SceneEvent::TransitionCompleted {
                epoch: target,
                at: now,
            });
            for epoch in &mut self.epochs[..target.index()] {
                if epoch.is_mounted() {
                    epoch.unmount(&mut self.stage);
                    self.events.push(SceneEvent::EpochUnmounted { epoch: epoch.id() });
                }
            }
            tracing::info!(%target, now, "transition completed");
        }
    }

    /// Start a queued or auto-chained transition once the scene is idle.
    ///
    /// Auto-chaining skips a target whose last request aborted until the host requests it
    /// again.
    fn advance_sequence(&mut self) -> CosmosResult<()> {
        if self.is_transitioning() {
            return Ok(());
        }
        if let Some(next) = self.queued.take() {
            self.request(next.epoch, next.on_complete)?;
            return Ok(());
        }
        if !self.config.auto_chain {
            return Ok(());
        }
        let Some(current) = self.current else {
            return Ok(());
        };
        if self.epoch(current).state() == EpochState::Complete
            && let Some(next) = current.next()
            && self.stalled != Some(next)
        {
            self.request(next, None)?;
        }
        Ok(())
    }
}

#[cfg(test)]
#[path = "../../tests/unit/scene/orchestrator.rs"]
mod tests;
