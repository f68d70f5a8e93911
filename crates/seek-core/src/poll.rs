//! Poll-act-retry loop.
//!
//! Repeats a probe until the target appears (or, in disappear mode, until it
//! stops appearing), the time budget runs out, or the loop is cancelled.
//! Probes are sequential; between two probes the loop sleeps a random
//! duration from the pacing range.

use crate::{
    ActionExecutor, Budget, CancelToken, EngineResult, InputBackend, OffsetRange, PacingRange,
    ProbeResult,
};
use rand::Rng;
use serde::{Deserialize, Serialize};
use std::thread;
use std::time::Duration;
use tracing::{debug, info};

/// Per-call loop configuration.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PollConfig {
    /// Overall budget. Zero means no deadline: a single probe in normal mode,
    /// wait forever in disappear mode.
    pub timeout: Duration,
    /// Click each hit.
    pub click: bool,
    /// After each click, park the pointer at a random offset.
    pub reset_position: bool,
    /// Succeed when the target is no longer found instead of when it is found.
    pub wait_for_disappear: bool,
    pub pacing: PacingRange,
}

impl PollConfig {
    /// Look for the target without touching the mouse.
    pub fn locate(timeout: Duration) -> Self {
        Self {
            timeout,
            click: false,
            reset_position: false,
            wait_for_disappear: false,
            pacing: PacingRange::default(),
        }
    }

    /// Click the target once when found.
    pub fn click(timeout: Duration, reset_position: bool) -> Self {
        Self {
            click: true,
            reset_position,
            ..Self::locate(timeout)
        }
    }

    /// Keep clicking the target until it disappears.
    pub fn click_until_gone(timeout: Duration, reset_position: bool) -> Self {
        Self {
            wait_for_disappear: true,
            ..Self::click(timeout, reset_position)
        }
    }

    pub fn with_pacing(mut self, pacing: PacingRange) -> Self {
        self.pacing = pacing;
        self
    }

    fn single_shot(&self) -> bool {
        self.timeout.is_zero() && !self.wait_for_disappear
    }
}

/// How a poll loop ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Outcome {
    /// The target was found.
    Found,
    /// Disappear mode: the target is no longer found.
    Vanished,
    /// Budget spent (or the single attempt missed).
    Exhausted,
    /// Stopped through the cancel token.
    Cancelled,
}

/// Final state of one acquisition call.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Acquisition {
    pub outcome: Outcome,
    /// Result of the last probe. `found` is cleared when the budget runs out,
    /// even if that probe still saw the target in disappear mode.
    pub last: ProbeResult,
    pub probes: u32,
    pub elapsed: Duration,
}

impl Acquisition {
    pub fn is_success(&self) -> bool {
        matches!(self.outcome, Outcome::Found | Outcome::Vanished)
    }

    /// The found coordinate, if the loop ended on a hit.
    pub fn position(&self) -> Option<(i32, i32)> {
        (self.outcome == Outcome::Found).then_some((self.last.x, self.last.y))
    }
}

/// Drives probes against a [`Budget`].
pub struct PollLoop<'a, R: Rng + ?Sized> {
    executor: ActionExecutor<'a>,
    rng: &'a mut R,
    cancel: &'a CancelToken,
}

impl<'a, R: Rng + ?Sized> PollLoop<'a, R> {
    pub fn new(
        input: &'a dyn InputBackend,
        reset_offset: OffsetRange,
        rng: &'a mut R,
        cancel: &'a CancelToken,
    ) -> Self {
        Self {
            executor: ActionExecutor::new(input, reset_offset),
            rng,
            cancel,
        }
    }

    /// Run `probe` until the termination policy of `config` is met.
    ///
    /// A hit is a result with `x > 0 && y > 0`. Probe and click errors end
    /// the loop immediately and are returned unchanged.
    pub fn acquire<P>(&mut self, config: &PollConfig, mut probe: P) -> EngineResult<Acquisition>
    where
        P: FnMut() -> EngineResult<ProbeResult>,
    {
        let budget = Budget::start(config.timeout);
        let mut last = ProbeResult::NONE;
        let mut probes = 0u32;

        let finish = |outcome: Outcome, last: ProbeResult, probes: u32| {
            let acquisition = Acquisition {
                outcome,
                last,
                probes,
                elapsed: budget.elapsed(),
            };
            info!(
                ?outcome,
                probes,
                elapsed_ms = acquisition.elapsed.as_millis() as u64,
                "acquisition finished"
            );
            acquisition
        };

        loop {
            if self.cancel.is_cancelled() {
                return Ok(finish(Outcome::Cancelled, last, probes));
            }
            if !budget.during() {
                break;
            }

            last = probe()?;
            probes += 1;
            debug!(probe = probes, x = last.x, y = last.y, "probe result");

            if last.is_hit() {
                if config.click {
                    self.executor
                        .act(self.rng, last.x, last.y, config.reset_position)?;
                }
                if !config.wait_for_disappear {
                    return Ok(finish(Outcome::Found, last, probes));
                }
            } else if config.wait_for_disappear {
                return Ok(finish(Outcome::Vanished, last, probes));
            }

            if config.single_shot() {
                break;
            }
            self.rest(&budget, config.pacing);
        }

        let last = ProbeResult {
            found: false,
            ..last
        };
        Ok(finish(Outcome::Exhausted, last, probes))
    }

    /// Retry a value-producing probe until it yields `Some`, under the same
    /// budget, pacing and cancellation rules (zero timeout = single attempt).
    pub fn until_some<T, P>(
        &mut self,
        timeout: Duration,
        pacing: PacingRange,
        mut probe: P,
    ) -> EngineResult<Option<T>>
    where
        P: FnMut() -> EngineResult<Option<T>>,
    {
        let budget = Budget::start(timeout);
        while !self.cancel.is_cancelled() && budget.during() {
            if let Some(value) = probe()? {
                return Ok(Some(value));
            }
            if budget.is_unbounded() {
                break;
            }
            self.rest(&budget, pacing);
        }
        Ok(None)
    }

    /// Sleep a pacing delay, cut short at the deadline.
    fn rest(&mut self, budget: &Budget, pacing: PacingRange) {
        let mut delay = pacing.sample(self.rng);
        if let Some(left) = budget.remaining() {
            delay = delay.min(left);
        }
        if !delay.is_zero() {
            thread::sleep(delay);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::RecordingInput;
    use crate::{codec, EngineError};
    use rand::rngs::StdRng;
    use rand::SeedableRng;
    use std::time::Instant;

    const FAST: PacingRange = PacingRange::new(1, 2);

    fn run<P>(input: &RecordingInput, config: &PollConfig, probe: P) -> EngineResult<Acquisition>
    where
        P: FnMut() -> EngineResult<ProbeResult>,
    {
        let mut rng = StdRng::seed_from_u64(11);
        let cancel = CancelToken::new();
        PollLoop::new(input, OffsetRange::default(), &mut rng, &cancel).acquire(config, probe)
    }

    fn scripted(results: Vec<ProbeResult>) -> impl FnMut() -> EngineResult<ProbeResult> {
        let mut iter = results.into_iter();
        move || Ok(iter.next().unwrap_or(ProbeResult::NONE))
    }

    #[test]
    fn test_zero_timeout_probes_once() {
        let input = RecordingInput::default();
        let mut calls = 0;
        let acq = run(&input, &PollConfig::locate(Duration::ZERO), || {
            calls += 1;
            Ok(ProbeResult::NONE)
        })
        .unwrap();

        assert_eq!(calls, 1);
        assert_eq!(acq.outcome, Outcome::Exhausted);
        assert!(!acq.is_success());
    }

    #[test]
    fn test_zero_timeout_hit_probes_once() {
        let input = RecordingInput::default();
        let mut calls = 0;
        let acq = run(&input, &PollConfig::locate(Duration::ZERO), || {
            calls += 1;
            Ok(codec::parse("0|5|6"))
        })
        .unwrap();

        assert_eq!(calls, 1);
        assert_eq!(acq.position(), Some((5, 6)));
        assert_eq!(input.clicks(), 0);
    }

    #[test]
    fn test_found_after_retries_and_clicks_once() {
        let input = RecordingInput::default();
        let config = PollConfig::click(Duration::from_secs(5), false).with_pacing(FAST);
        let acq = run(
            &input,
            &config,
            scripted(vec![
                ProbeResult::NONE,
                ProbeResult::partial(40),
                ProbeResult::found(40, 50),
            ]),
        )
        .unwrap();

        assert_eq!(acq.outcome, Outcome::Found);
        assert_eq!(acq.probes, 3);
        assert_eq!(acq.position(), Some((40, 50)));
        assert_eq!(input.clicks(), 1);
    }

    #[test]
    fn test_disappear_mode_stops_after_target_vanishes() {
        let input = RecordingInput::default();
        let config = PollConfig::click_until_gone(Duration::ZERO, false).with_pacing(FAST);
        let acq = run(
            &input,
            &config,
            scripted(vec![
                ProbeResult::found(10, 10),
                ProbeResult::found(12, 11),
                ProbeResult::NONE,
            ]),
        )
        .unwrap();

        assert_eq!(acq.outcome, Outcome::Vanished);
        assert!(acq.is_success());
        assert_eq!(acq.probes, 3);
        assert_eq!(input.clicks(), 2);
        assert_eq!(acq.position(), None);
    }

    #[test]
    fn test_disappear_mode_times_out_while_present() {
        let input = RecordingInput::default();
        let config = PollConfig {
            click: false,
            ..PollConfig::click_until_gone(Duration::from_millis(30), false)
        }
        .with_pacing(FAST);
        let acq = run(&input, &config, || Ok(ProbeResult::found(1, 1))).unwrap();

        assert_eq!(acq.outcome, Outcome::Exhausted);
        assert!(!acq.last.found);
        assert_eq!((acq.last.x, acq.last.y), (1, 1));
        assert_eq!(acq.position(), None);
        assert_eq!(input.clicks(), 0);
    }

    #[test]
    fn test_timeout_bounds_elapsed_time() {
        let input = RecordingInput::default();
        let timeout = Duration::from_millis(100);
        let pacing = PacingRange::new(10, 20);
        let started = Instant::now();
        let acq = run(&input, &PollConfig::locate(timeout).with_pacing(pacing), || {
            Ok(ProbeResult::NONE)
        })
        .unwrap();
        let elapsed = started.elapsed();

        assert_eq!(acq.outcome, Outcome::Exhausted);
        assert_eq!(acq.last, ProbeResult::NONE);
        assert!(elapsed >= timeout);
        // one pacing interval plus scheduler slack
        assert!(elapsed < timeout + Duration::from_millis(20) + Duration::from_millis(50));
    }

    #[test]
    fn test_pacing_delay_cut_at_deadline() {
        let input = RecordingInput::default();
        let timeout = Duration::from_millis(50);
        let config = PollConfig::locate(timeout).with_pacing(PacingRange::new(1000, 1000));
        let started = Instant::now();
        let acq = run(&input, &config, || Ok(ProbeResult::NONE)).unwrap();
        let elapsed = started.elapsed();

        assert_eq!(acq.probes, 1);
        assert!(elapsed >= timeout);
        assert!(elapsed < Duration::from_millis(500), "elapsed = {elapsed:?}");
    }

    #[test]
    fn test_empty_finder_reply_probe_count() {
        let input = RecordingInput::default();
        let config = PollConfig::locate(Duration::from_millis(200))
            .with_pacing(PacingRange::new(50, 100));
        let acq = run(&input, &config, || Ok(codec::parse(""))).unwrap();

        assert!(!acq.is_success());
        assert!((2..=4).contains(&acq.probes), "probes = {}", acq.probes);
    }

    #[test]
    fn test_probe_error_propagates() {
        let input = RecordingInput::default();
        let config = PollConfig::locate(Duration::from_secs(1)).with_pacing(FAST);
        let mut calls = 0;
        let err = run(&input, &config, || {
            calls += 1;
            if calls == 2 {
                Err(EngineError::backend("finder crashed"))
            } else {
                Ok(ProbeResult::NONE)
            }
        })
        .unwrap_err();

        assert_eq!(calls, 2);
        assert!(matches!(err, EngineError::Backend(_)));
    }

    #[test]
    fn test_cancelled_before_first_probe() {
        let input = RecordingInput::default();
        let mut rng = StdRng::seed_from_u64(0);
        let cancel = CancelToken::new();
        cancel.cancel();
        let mut calls = 0;
        let acq = PollLoop::new(&input, OffsetRange::default(), &mut rng, &cancel)
            .acquire(&PollConfig::click_until_gone(Duration::ZERO, false), || {
                calls += 1;
                Ok(ProbeResult::found(1, 1))
            })
            .unwrap();

        assert_eq!(calls, 0);
        assert_eq!(acq.outcome, Outcome::Cancelled);
    }

    #[test]
    fn test_cancel_from_probe_stops_loop() {
        let input = RecordingInput::default();
        let mut rng = StdRng::seed_from_u64(0);
        let cancel = CancelToken::new();
        let handle = cancel.clone();
        let mut calls = 0;
        let config = PollConfig::locate(Duration::from_secs(10)).with_pacing(FAST);
        let acq = PollLoop::new(&input, OffsetRange::default(), &mut rng, &cancel)
            .acquire(&config, || {
                calls += 1;
                if calls == 3 {
                    handle.cancel();
                }
                Ok(ProbeResult::NONE)
            })
            .unwrap();

        assert_eq!(calls, 3);
        assert_eq!(acq.outcome, Outcome::Cancelled);
    }

    #[test]
    fn test_until_some_retries() {
        let input = RecordingInput::default();
        let mut rng = StdRng::seed_from_u64(0);
        let cancel = CancelToken::new();
        let mut calls = 0;
        let text = PollLoop::new(&input, OffsetRange::default(), &mut rng, &cancel)
            .until_some(Duration::from_secs(1), FAST, || {
                calls += 1;
                Ok((calls == 3).then(|| "ready".to_string()))
            })
            .unwrap();

        assert_eq!(text.as_deref(), Some("ready"));
        assert_eq!(calls, 3);
    }

    #[test]
    fn test_until_some_zero_timeout_single_attempt() {
        let input = RecordingInput::default();
        let mut rng = StdRng::seed_from_u64(0);
        let cancel = CancelToken::new();
        let mut calls = 0;
        let text: Option<String> = PollLoop::new(&input, OffsetRange::default(), &mut rng, &cancel)
            .until_some(Duration::ZERO, FAST, || {
                calls += 1;
                Ok(None)
            })
            .unwrap();

        assert!(text.is_none());
        assert_eq!(calls, 1);
    }
}
