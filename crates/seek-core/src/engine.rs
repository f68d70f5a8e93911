//! Engine facade: one object owning the backends, configuration, RNG and
//! cancellation flag, exposing the acquisition operations.

use crate::{
    codec, ActionExecutor, Acquisition, CancelToken, CursorProbe, CursorShapeSource,
    CursorSignature, EngineConfig, EngineResult, FinderChain, InputBackend, MouseButton,
    PollConfig, PollLoop, Point, SearchRegion, SweepOutcome, Target, Trajectory,
};
use rand::rngs::StdRng;
use rand::SeedableRng;
use std::sync::Arc;
use std::time::Duration;
use tracing::info;

/// Target-acquisition engine.
///
/// Calls are blocking and run on the caller's thread. A `Seeker` keeps no
/// per-search state between calls; two searches in parallel need two seekers.
pub struct Seeker {
    input: Arc<dyn InputBackend>,
    cursor: Arc<dyn CursorShapeSource>,
    finders: FinderChain,
    config: EngineConfig,
    rng: StdRng,
    cancel: CancelToken,
}

impl Seeker {
    /// Create an engine. Fails if `config` does not validate.
    pub fn new(
        input: Arc<dyn InputBackend>,
        cursor: Arc<dyn CursorShapeSource>,
        finders: FinderChain,
        config: EngineConfig,
    ) -> EngineResult<Self> {
        config.validate()?;
        let rng = match config.seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_entropy(),
        };
        info!(finders = finders.len(), seeded = config.seed.is_some(), "Seeker created");
        Ok(Self {
            input,
            cursor,
            finders,
            config,
            rng,
            cancel: CancelToken::new(),
        })
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    /// Flag observed by every running and future search of this engine.
    pub fn cancel_token(&self) -> CancelToken {
        self.cancel.clone()
    }

    pub fn image_target(&self, name: &str) -> Target {
        Target::image(name, self.config.similarity)
    }

    pub fn text_target(&self, text: &str, color: &str) -> Target {
        Target::text(text, color, self.config.similarity)
    }

    pub fn color_target(&self, hex: &str) -> Target {
        Target::color(hex, self.config.similarity)
    }

    /// General form: poll the finder chain for `target` under `poll`.
    pub fn find(
        &mut self,
        region: SearchRegion,
        target: &Target,
        poll: &PollConfig,
    ) -> EngineResult<Acquisition> {
        info!(
            kind = ?target.kind,
            pattern = %target.pattern,
            ?region,
            timeout_ms = poll.timeout.as_millis() as u64,
            click = poll.click,
            until_gone = poll.wait_for_disappear,
            "find"
        );
        let Self {
            input,
            finders,
            config,
            rng,
            cancel,
            ..
        } = self;
        PollLoop::new(input.as_ref(), config.reset_offset, rng, cancel).acquire(poll, || {
            let raw = finders.find(region, target)?;
            Ok(codec::parse(&raw))
        })
    }

    /// Find and return the coordinates without clicking.
    pub fn locate(
        &mut self,
        region: SearchRegion,
        target: &Target,
        timeout: Duration,
    ) -> EngineResult<Acquisition> {
        let poll = PollConfig::locate(timeout).with_pacing(self.config.pacing);
        self.find(region, target, &poll)
    }

    /// Find, click once, return.
    pub fn find_and_click(
        &mut self,
        region: SearchRegion,
        target: &Target,
        timeout: Duration,
        reset_position: bool,
    ) -> EngineResult<Acquisition> {
        let poll = PollConfig::click(timeout, reset_position).with_pacing(self.config.pacing);
        self.find(region, target, &poll)
    }

    /// Click the target on every appearance until it is gone.
    pub fn click_until_gone(
        &mut self,
        region: SearchRegion,
        target: &Target,
        timeout: Duration,
        reset_position: bool,
    ) -> EngineResult<Acquisition> {
        let poll =
            PollConfig::click_until_gone(timeout, reset_position).with_pacing(self.config.pacing);
        self.find(region, target, &poll)
    }

    /// Retry the text reader until it returns non-empty text. A zero timeout
    /// reads once.
    pub fn read_text(
        &mut self,
        region: SearchRegion,
        color: &str,
        timeout: Duration,
    ) -> EngineResult<Option<String>> {
        let Self {
            input,
            finders,
            config,
            rng,
            cancel,
            ..
        } = self;
        let similarity = config.similarity;
        PollLoop::new(input.as_ref(), config.reset_offset, rng, cancel).until_some(
            timeout,
            config.pacing,
            || {
                let text = finders.read_text(region, color, similarity)?;
                Ok(text.filter(|t| !t.is_empty()))
            },
        )
    }

    /// Sweep the pointer along `trajectory` around `origin` and click where
    /// the cursor shape equals `signature`.
    pub fn sweep(
        &mut self,
        origin: Point,
        signature: CursorSignature,
        trajectory: &Trajectory,
    ) -> EngineResult<SweepOutcome> {
        info!(
            trajectory = trajectory.name(),
            x = origin.x,
            y = origin.y,
            signature = signature.0,
            "sweep"
        );
        CursorProbe::new(
            self.input.as_ref(),
            self.cursor.as_ref(),
            self.config.sample_pause(),
            &self.cancel,
        )
        .sweep(trajectory.points(origin), signature)
    }

    /// Click with a jittered pause, optionally returning near the previous
    /// pointer position.
    pub fn safe_click(&mut self, x: i32, y: i32, reset_position: bool) -> EngineResult<()> {
        ActionExecutor::new(self.input.as_ref(), self.config.reset_offset).safe_click(
            &mut self.rng,
            x,
            y,
            reset_position,
            self.config.pacing,
        )
    }

    /// Press `button` at (x, y) for `hold`.
    pub fn hold_click(
        &self,
        x: i32,
        y: i32,
        button: MouseButton,
        hold: Duration,
    ) -> EngineResult<()> {
        ActionExecutor::new(self.input.as_ref(), self.config.reset_offset)
            .hold_click(x, y, button, hold)
    }

    /// Current cursor shape and position, for capturing a signature.
    pub fn cursor_snapshot(&self) -> EngineResult<(CursorSignature, Point)> {
        Ok((self.cursor.cursor_shape()?, self.input.cursor_position()?))
    }
}
