//! The execution slot: one worker thread, one controller, one budget.
//!
//! The slot protocol is split in two so the scheduler can overlap controller
//! work across robots: [`ExecutionSlot::submit`] hands the tick context to
//! the worker (never blocking), and [`ExecutionSlot::collect`] waits for the
//! result up to the budget deadline. Every request carries a sequence number;
//! a response whose sequence does not match the one being collected is a
//! leftover from a timed-out tick or a torn-down round and is dropped on the
//! floor.
//!
//! Violations (timeouts, faults, a still-busy worker) accumulate per round;
//! crossing [`SlotConfig::max_violations`] forcibly disables the robot --
//! alive, but unable to act -- instead of letting a broken controller drag
//! the whole simulation.

use std::panic::{self, AssertUnwindSafe};
use std::sync::atomic::{AtomicU32, Ordering};
use std::sync::Arc;
use std::thread;
use std::time::{Duration, Instant};

use crossbeam_channel::{Receiver, RecvTimeoutError, Sender, TrySendError};

use clank_core::{Intent, RobotId};

use crate::{RobotController, SlotError, TickContext};

// ---------------------------------------------------------------------------
// SlotConfig
// ---------------------------------------------------------------------------

/// Budget and escalation settings for one slot.
#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct SlotConfig {
    /// Wall-clock budget per tick. Overruns cost the robot its turn.
    pub tick_budget: Duration,
    /// Violations in a round beyond which the robot is forcibly disabled.
    /// `0` disables on the first violation.
    pub max_violations: u32,
}

impl Default for SlotConfig {
    fn default() -> Self {
        Self {
            tick_budget: Duration::from_millis(10),
            max_violations: 30,
        }
    }
}

// ---------------------------------------------------------------------------
// Worker protocol
// ---------------------------------------------------------------------------

struct TickRequest {
    seq: u64,
    ctx: TickContext,
}

struct TickResponse {
    seq: u64,
    /// The controller's intent, or the panic payload message on a fault.
    result: Result<Intent, String>,
}

/// What `collect` is currently waiting on.
enum Pending {
    /// Request delivered; wait for a matching response until `deadline`.
    InFlight { seq: u64, deadline: Instant },
    /// The worker was still chewing on an earlier tick when we submitted;
    /// the robot loses this turn immediately.
    Busy,
    /// The worker thread is gone.
    Gone,
}

// ---------------------------------------------------------------------------
// ExecutionSlot
// ---------------------------------------------------------------------------

/// Wraps one competitor controller for the duration of a battle.
///
/// Dropping the slot disconnects the request channel; the worker exits as
/// soon as its current call (if any) returns. A hung worker thread is
/// deliberately not joined -- it can hold nothing but its own controller.
pub struct ExecutionSlot {
    robot: RobotId,
    name: String,
    config: SlotConfig,
    req_tx: Sender<TickRequest>,
    resp_rx: Receiver<TickResponse>,
    /// Current round number, shared with the worker. The worker compares it
    /// against the last round it announced before every tick, so a reset is
    /// never lost to a busy controller.
    round: Arc<AtomicU32>,
    seq: u64,
    pending: Option<Pending>,
    violations: u32,
    disabled: bool,
}

impl ExecutionSlot {
    /// Spawn the worker thread and wrap `controller` in a slot.
    ///
    /// # Errors
    ///
    /// [`SlotError::Spawn`] if the OS refuses the thread.
    pub fn spawn(
        robot: RobotId,
        controller: Box<dyn RobotController>,
        config: SlotConfig,
    ) -> Result<Self, SlotError> {
        let name = controller.name().to_owned();
        // Requests: capacity 1 so a busy worker is detected via try_send.
        // Responses: unbounded so the worker never blocks publishing a
        // result nobody is waiting for anymore.
        let (req_tx, req_rx) = crossbeam_channel::bounded::<TickRequest>(1);
        let (resp_tx, resp_rx) = crossbeam_channel::unbounded::<TickResponse>();
        let round = Arc::new(AtomicU32::new(0));

        thread::Builder::new()
            .name(format!("clank-slot-{}", robot.index()))
            .spawn({
                let round = round.clone();
                move || worker_loop(controller, round, req_rx, resp_tx)
            })
            .map_err(|e| SlotError::Spawn(e.to_string()))?;

        tracing::debug!(%robot, name = %name, "execution slot spawned");

        Ok(Self {
            robot,
            name,
            config,
            req_tx,
            resp_rx,
            round,
            seq: 0,
            pending: None,
            violations: 0,
            disabled: false,
        })
    }

    /// Reset per-round accounting and flag the new round for the controller.
    ///
    /// Discards any response still in flight from the previous round (its
    /// sequence number can no longer match) and drains the response channel.
    /// The worker calls `on_round_start` before the next tick it serves, even
    /// if it was still chewing on an old tick when the round rolled over.
    pub fn reset_for_round(&mut self, round: u32) {
        self.violations = 0;
        self.disabled = false;
        self.pending = None;
        while self.resp_rx.try_recv().is_ok() {}
        self.round.store(round, Ordering::SeqCst);
    }

    /// Hand this tick's context to the worker. Never blocks.
    ///
    /// Must be paired with exactly one [`collect`](Self::collect) call.
    pub fn submit(&mut self, ctx: TickContext) {
        self.seq += 1;
        let seq = self.seq;
        let deadline = Instant::now() + self.config.tick_budget;
        self.pending = Some(match self.req_tx.try_send(TickRequest { seq, ctx }) {
            Ok(()) => Pending::InFlight { seq, deadline },
            Err(TrySendError::Full(_)) => Pending::Busy,
            Err(TrySendError::Disconnected(_)) => Pending::Gone,
        });
    }

    /// Wait (up to the budget deadline set at submit time) for this tick's
    /// intent.
    ///
    /// On [`SlotError::Timeout`], [`SlotError::Fault`] or a busy/dead worker
    /// the violation counter advances and the caller substitutes a no-op
    /// intent; crossing the threshold disables the robot.
    ///
    /// # Panics
    ///
    /// Panics if called without a matching [`submit`](Self::submit); that is
    /// a scheduler bug, not a controller failure.
    pub fn collect(&mut self) -> Result<Intent, SlotError> {
        let pending = self
            .pending
            .take()
            .expect("collect() called without a matching submit()");

        let (seq, deadline) = match pending {
            Pending::InFlight { seq, deadline } => (seq, deadline),
            Pending::Busy => {
                self.record_violation("worker still busy with an earlier tick");
                return Err(SlotError::Timeout {
                    budget: self.config.tick_budget,
                });
            }
            Pending::Gone => {
                self.record_violation("worker terminated");
                return Err(SlotError::Disconnected);
            }
        };

        loop {
            match self.resp_rx.recv_deadline(deadline) {
                Ok(resp) if resp.seq == seq => {
                    return match resp.result {
                        Ok(intent) => Ok(intent),
                        Err(msg) => {
                            self.record_violation("controller fault");
                            Err(SlotError::Fault(msg))
                        }
                    };
                }
                Ok(stale) => {
                    // Late result from a tick we already gave up on.
                    tracing::trace!(
                        robot = %self.robot,
                        stale_seq = stale.seq,
                        want_seq = seq,
                        "discarding stale controller result"
                    );
                }
                Err(RecvTimeoutError::Timeout) => {
                    self.record_violation("budget overrun");
                    return Err(SlotError::Timeout {
                        budget: self.config.tick_budget,
                    });
                }
                Err(RecvTimeoutError::Disconnected) => {
                    self.record_violation("worker terminated");
                    return Err(SlotError::Disconnected);
                }
            }
        }
    }

    fn record_violation(&mut self, what: &str) {
        self.violations += 1;
        tracing::debug!(
            robot = %self.robot,
            name = %self.name,
            violations = self.violations,
            what,
            "skipped-turn violation"
        );
        if self.violations > self.config.max_violations
            || (self.config.max_violations == 0 && self.violations > 0)
        {
            if !self.disabled {
                tracing::debug!(robot = %self.robot, name = %self.name, "robot forcibly disabled");
            }
            self.disabled = true;
        }
    }

    // -- accessors ----------------------------------------------------------

    pub fn robot(&self) -> RobotId {
        self.robot
    }

    /// The controller's display name.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Violations recorded this round.
    pub fn violations(&self) -> u32 {
        self.violations
    }

    /// Whether the robot is barred from acting for the rest of the round.
    pub fn is_disabled(&self) -> bool {
        self.disabled
    }

    pub fn config(&self) -> &SlotConfig {
        &self.config
    }
}

impl std::fmt::Debug for ExecutionSlot {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ExecutionSlot")
            .field("robot", &self.robot)
            .field("name", &self.name)
            .field("violations", &self.violations)
            .field("disabled", &self.disabled)
            .finish_non_exhaustive()
    }
}

// ---------------------------------------------------------------------------
// Worker
// ---------------------------------------------------------------------------

fn worker_loop(
    mut controller: Box<dyn RobotController>,
    round: Arc<AtomicU32>,
    req_rx: Receiver<TickRequest>,
    resp_tx: Sender<TickResponse>,
) {
    let mut announced = 0u32;
    while let Ok(TickRequest { seq, ctx }) = req_rx.recv() {
        let current = round.load(Ordering::SeqCst);
        if current != announced {
            // A panic in round setup is contained like any other fault;
            // the controller just starts the round uninitialized.
            let _ = panic::catch_unwind(AssertUnwindSafe(|| {
                controller.on_round_start(current);
            }));
            announced = current;
        }
        let result = panic::catch_unwind(AssertUnwindSafe(|| controller.tick(&ctx)))
            .map_err(|payload| panic_message(payload.as_ref()));
        if resp_tx.send(TickResponse { seq, result }).is_err() {
            // Slot dropped; nobody will ever read another response.
            break;
        }
    }
}

fn panic_message(payload: &(dyn std::any::Any + Send)) -> String {
    if let Some(s) = payload.downcast_ref::<&str>() {
        (*s).to_owned()
    } else if let Some(s) = payload.downcast_ref::<String>() {
        s.clone()
    } else {
        "controller panicked".to_owned()
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
