use std::fmt;

use crate::{
    animation::{
        anim::{Lerp, Tween, window_progress},
        ease::Ease,
    },
    controls::orbit::ControlLimits,
    foundation::{
        core::{DVec3, Vec2},
        error::{CosmosError, CosmosResult},
    },
    timeline::stage::{ParamTarget, ParamValue, Stage},
};

impl Lerp for ParamValue {
    fn lerp(a: &Self, b: &Self, t: f64) -> Self {
        match (a, b) {
            (Self::Scalar(a), Self::Scalar(b)) => Self::Scalar(<f64 as Lerp>::lerp(a, b, t)),
            (Self::Vec2(a), Self::Vec2(b)) => Self::Vec2(<Vec2 as Lerp>::lerp(a, b, t)),
            (Self::Vec3(a), Self::Vec3(b)) => Self::Vec3(<DVec3 as Lerp>::lerp(a, b, t)),
            _ => *b,
        }
    }
}

/// One eased interpolation of a stage parameter.
#[derive(Clone, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct ScheduledEffect {
    /// Offset from the transition start (seconds).
    pub start: f64,
    /// Length (seconds); zero snaps at `start`.
    pub duration: f64,
    /// Curve applied to raw progress.
    pub ease: Ease,
    /// Parameter written.
    pub target: ParamTarget,
    /// Start value; captured when the driver is scheduled if omitted.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub from: Option<ParamValue>,
    /// End value.
    pub to: ParamValue,
}

impl ScheduledEffect {
    /// Tween `target` to `to` from whatever it holds when the window opens.
    pub fn to(target: ParamTarget, to: ParamValue, start: f64, duration: f64, ease: Ease) -> Self {
        Self {
            start,
            duration,
            ease,
            target,
            from: None,
            to,
        }
    }

    /// Set an explicit start value.
    pub fn from(mut self, from: ParamValue) -> Self {
        self.from = Some(from);
        self
    }

    /// Offset at which this effect finishes.
    pub fn end(&self) -> f64 {
        self.start + self.duration
    }

    fn validate(&self) -> CosmosResult<()> {
        if !(self.start.is_finite() && self.start >= 0.0) {
            return Err(CosmosError::timeline(format!(
                "{:?} start must be finite and >= 0",
                self.target
            )));
        }
        if !(self.duration.is_finite() && self.duration >= 0.0) {
            return Err(CosmosError::timeline(format!(
                "{:?} duration must be finite and >= 0",
                self.target
            )));
        }
        let kind = self.target.value_kind();
        let values = std::iter::once(&self.to).chain(self.from.as_ref());
        for v in values {
            if v.kind() != kind {
                return Err(CosmosError::timeline(format!(
                    "{:?} expects {kind:?} values, got {:?}",
                    self.target,
                    v.kind()
                )));
            }
            if !v.is_finite() {
                return Err(CosmosError::timeline(format!(
                    "{:?} values must be finite",
                    self.target
                )));
            }
        }
        Ok(())
    }
}

/// One-shot side effect fired when elapsed time crosses a cue.
#[derive(Clone, Copy, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(tag = "action", content = "value", rename_all = "snake_case")]
pub enum CueAction {
    /// Advance the epoch-internal stage marker.
    SetStage(u8),
    /// Hand the camera back to interactive controls with these limits.
    ReleaseCamera(ControlLimits),
}

/// A cue at an offset from the transition start.
#[derive(Clone, Copy, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct Cue {
    /// Offset (seconds).
    pub at: f64,
    /// What happens.
    pub action: CueAction,
}

/// Effects and cues making up one transition.
#[derive(Clone, Debug, Default, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct TimelineScript {
    /// Continuous effects; may overlap freely.
    pub effects: Vec<ScheduledEffect>,
    /// One-shot cues.
    #[serde(default)]
    pub cues: Vec<Cue>,
}

impl TimelineScript {
    /// Total scheduled duration: the latest effect end or cue offset.
    pub fn duration(&self) -> f64 {
        let effects = self.effects.iter().map(ScheduledEffect::end);
        let cues = self.cues.iter().map(|c| c.at);
        effects.chain(cues).fold(0.0, f64::max)
    }

    /// Check every effect and cue.
    pub fn validate(&self) -> CosmosResult<()> {
        for e in &self.effects {
            e.validate()?;
        }
        for c in &self.cues {
            if !(c.at.is_finite() && c.at >= 0.0) {
                return Err(CosmosError::timeline("cue offsets must be finite and >= 0"));
            }
            if let CueAction::ReleaseCamera(limits) = c.action {
                limits.validate()?;
                let last_camera = self
                    .effects
                    .iter()
                    .filter(|e| e.target.is_camera())
                    .map(ScheduledEffect::end)
                    .fold(0.0, f64::max);
                if c.at < last_camera {
                    return Err(CosmosError::timeline(format!(
                        "camera released at {} while camera effects run until {last_camera}",
                        c.at
                    )));
                }
            }
        }
        Ok(())
    }

    /// Whether any effect writes the camera.
    pub fn writes_camera(&self) -> bool {
        self.effects.iter().any(|e| e.target.is_camera())
    }
}

/// Lifecycle of a driver.
#[derive(Clone, Copy, Debug, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DriverStatus {
    /// Writing targets.
    Running,
    /// Finished; completion fired.
    Completed,
    /// Stopped early; completion never fires.
    Aborted,
}

/// Result of one [`TimelineDriver::evaluate`] call.
#[derive(Clone, Debug, PartialEq)]
pub struct DriverTick {
    /// Status after the call.
    pub status: DriverStatus,
    /// Cues that fired during this call, in offset order.
    pub fired: Vec<CueAction>,
    /// Whether this call completed the driver.
    pub completed: bool,
}

#[derive(Clone, Debug, PartialEq)]
struct ArmedEffect {
    start: f64,
    duration: f64,
    target: ParamTarget,
    tween: Tween<ParamValue>,
}

impl ArmedEffect {
    fn sample(&self, elapsed: f64) -> ParamValue {
        self.tween.sample(window_progress(elapsed, self.start, self.duration))
    }
}

/// Applies a [`TimelineScript`] to a [`Stage`] as a pure function of elapsed time.
///
/// Each effect's value depends only on `now - started_at`, so evaluation is safe at any frame
/// rate and re-evaluating the same time writes the same values. Effects write only once their
/// window has opened; later-starting effects on the same target win. Completion happens once,
/// on the first evaluation at or past the total duration, after which the driver never writes
/// again. Camera targets stop being written once a [`CueAction::ReleaseCamera`] cue fires.
pub struct TimelineDriver {
    effects: Vec<ArmedEffect>,
    cues: Vec<Cue>,
    next_cue: usize,
    started_at: f64,
    duration: f64,
    status: DriverStatus,
    camera_released: bool,
    on_complete: Option<Box<dyn FnOnce()>>,
}

impl fmt::Debug for TimelineDriver {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TimelineDriver")
            .field("effects", &self.effects.len())
            .field("cues", &self.cues.len())
            .field("started_at", &self.started_at)
            .field("duration", &self.duration)
            .field("status", &self.status)
            .field("camera_released", &self.camera_released)
            .finish_non_exhaustive()
    }
}

impl TimelineDriver {
    /// Arm `script` against `stage`, starting at `started_at`.
    ///
    /// All-or-nothing: if any target is not live the call fails with a precondition error and
    /// nothing is captured or written. Omitted `from` values are resolved here, from the value
    /// an earlier effect on the same target holds at this effect's start, or from the stage.
    #[tracing::instrument(skip(script, stage), fields(effects = script.effects.len()))]
    pub fn schedule(script: &TimelineScript, started_at: f64, stage: &Stage) -> CosmosResult<Self> {
        script.validate()?;
        if !started_at.is_finite() {
            return Err(CosmosError::timeline("driver start time must be finite"));
        }
        let missing: Vec<_> = script
            .effects
            .iter()
            .filter(|e| !stage.is_live(&e.target))
            .map(|e| format!("{:?}", e.target))
            .collect();
        if !missing.is_empty() {
            return Err(CosmosError::precondition(format!(
                "targets not live: {}",
                missing.join(", ")
            )));
        }

        let mut order: Vec<&ScheduledEffect> = script.effects.iter().collect();
        order.sort_by(|a, b| a.start.total_cmp(&b.start));

        let mut effects: Vec<ArmedEffect> = Vec::with_capacity(order.len());
        for e in order {
            let from = match e.from {
                Some(v) => v,
                None => match effects.iter().rev().find(|a| a.target == e.target) {
                    Some(prev) => prev.sample(e.start),
                    None => stage.read(&e.target)?,
                },
            };
            effects.push(ArmedEffect {
                start: e.start,
                duration: e.duration,
                target: e.target,
                tween: Tween::new(from, e.to, e.ease),
            });
        }

        let mut cues = script.cues.clone();
        cues.sort_by(|a, b| a.at.total_cmp(&b.at));

        let duration = script.duration();
        tracing::debug!(duration, started_at, "timeline scheduled");
        Ok(Self {
            effects,
            cues,
            next_cue: 0,
            started_at,
            duration,
            status: DriverStatus::Running,
            camera_released: false,
            on_complete: None,
        })
    }

    /// Register a completion callback. Fires at most once; fires immediately if the driver has
    /// already completed, never if it was aborted.
    pub fn on_complete(&mut self, callback: impl FnOnce() + 'static) {
        match self.status {
            DriverStatus::Running => self.on_complete = Some(Box::new(callback)),
            DriverStatus::Completed => callback(),
            DriverStatus::Aborted => {}
        }
    }

    /// Current status.
    pub fn status(&self) -> DriverStatus {
        self.status
    }

    /// Whether the driver still writes targets.
    pub fn is_running(&self) -> bool {
        self.status == DriverStatus::Running
    }

    /// Absolute start time.
    pub fn started_at(&self) -> f64 {
        self.started_at
    }

    /// Total scheduled duration.
    pub fn duration(&self) -> f64 {
        self.duration
    }

    /// Whether any armed effect writes the camera.
    pub fn writes_camera(&self) -> bool {
        self.effects.iter().any(|e| e.target.is_camera())
    }

    /// Whether the driver currently owns the camera: running, writing camera targets and not
    /// yet past a release cue.
    pub fn holds_camera(&self) -> bool {
        self.is_running() && !self.camera_released && self.writes_camera()
    }

    /// Stop without completing. The completion callback is dropped.
    pub fn abort(&mut self) {
        if self.status == DriverStatus::Running {
            self.status = DriverStatus::Aborted;
            self.on_complete = None;
            tracing::debug!(started_at = self.started_at, "timeline aborted");
        }
    }

    /// Write every open effect for absolute time `now`, fire due cues and complete if done.
    pub fn evaluate(&mut self, now: f64, stage: &mut Stage) -> DriverTick {
        let mut tick = DriverTick {
            status: self.status,
            fired: Vec::new(),
            completed: false,
        };
        if self.status != DriverStatus::Running {
            return tick;
        }

        let elapsed = if now.is_finite() {
            (now - self.started_at).max(0.0)
        } else {
            0.0
        };
        for e in &self.effects {
            if elapsed < e.start || (self.camera_released && e.target.is_camera()) {
                continue;
            }
            if let Err(err) = stage.write(&e.target, e.sample(elapsed)) {
                tracing::warn!(param = ?e.target, %err, "timeline write skipped");
            }
        }

        while let Some(cue) = self.cues.get(self.next_cue) {
            if cue.at > elapsed {
                break;
            }
            if let CueAction::ReleaseCamera(_) = cue.action {
                self.camera_released = true;
            }
            tick.fired.push(cue.action);
            self.next_cue += 1;
        }

        if elapsed >= self.duration {
            self.status = DriverStatus::Completed;
            tick.completed = true;
            tracing::debug!(elapsed, "timeline completed");
            if let Some(callback) = self.on_complete.take() {
                callback();
            }
        }
        tick.status = self.status;
        tick
    }
}

#[cfg(test)]
#[path = "../../tests/unit/timeline/driver.rs"]
mod tests;
