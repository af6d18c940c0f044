//! Event hook state machine
//!
//! The system-management service delivers power-button and state-change
//! notifications through a single-shot asynchronous subscription: one
//! request is armed, the service completes it when an event occurs, and
//! the subscription must be re-armed after every delivery. This module
//! owns that subscription slot and keeps exactly one request outstanding
//! for as long as a handler is registered.
//!
//! # States
//!
//! - `Idle`: no request outstanding; the event handle may or may not be
//!   open.
//! - `Armed`: exactly one asynchronous request outstanding, handle open.
//! - `Releasing`: a release sequence has been requested; the in-flight
//!   request's final completion closes the handle instead of re-arming.
//!
//! # Completion context
//!
//! [`EventHook::on_completion`] is invoked by the transport binding from
//! a context that can preempt application code at any instruction
//! boundary. The whole slot is therefore guarded by an [`IrqMutex`];
//! handle closing, handler dispatch, and re-arming all happen outside
//! the lock so a handler may safely call back into the driver.

use stm_proto::{EVENT_PAYLOAD_LEN, EVENTHOOK_PATH, IMMEDIATE_PATH, Ioctl, StmError, StmResult};
use stm_proto::event;

use crate::ipc::{Handle, IpcService, OpenMode};
use crate::sync::{InterruptLine, IrqMutex};

/// Notification handler invoked with the delivered event code.
///
/// Runs from completion context: it must not block.
pub type EventCallback = fn(u32);

/// Subscription slot state.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Default)]
pub enum HookState {
    /// No subscription outstanding.
    #[default]
    Idle,
    /// One asynchronous request outstanding.
    Armed,
    /// Release requested; the final completion closes the handle.
    Releasing,
}

/// The singleton subscription slot.
struct Slot {
    handle: Option<Handle>,
    pending_code: u32,
    callback: Option<EventCallback>,
    state: HookState,
}

/// What the completion handler decided while holding the slot lock.
///
/// The side effects (close, dispatch, re-arm) run after the lock is
/// dropped.
enum Completion {
    Close(Option<Handle>),
    Suppress,
    Dispatch(Option<EventCallback>, u32),
}

/// Driver context for the event hook subscription.
///
/// One instance per driver; the embedding system decides whether that
/// instance is process-wide.
pub struct EventHook<I, L> {
    ipc: I,
    slot: IrqMutex<L, Slot>,
}

impl<I: IpcService, L: InterruptLine> EventHook<I, L> {
    /// Create an unarmed hook. No device is opened until the first
    /// [`arm`](EventHook::arm).
    #[must_use]
    pub const fn new(ipc: I, line: L) -> Self {
        Self {
            ipc,
            slot: IrqMutex::new(
                line,
                Slot {
                    handle: None,
                    pending_code: 0,
                    callback: None,
                    state: HookState::Idle,
                },
            ),
        }
    }

    /// Current slot state. Primarily for diagnostics.
    #[must_use]
    pub fn state(&self) -> HookState {
        self.slot.lock().state
    }

    /// The most recently delivered event code.
    #[must_use]
    pub fn last_event_code(&self) -> u32 {
        self.slot.lock().pending_code
    }

    /// Ensure a subscription is outstanding.
    ///
    /// Idempotent: a no-op returning success while a request is already
    /// in flight (`Armed`, or `Releasing` with its final completion
    /// still pending). Lazily opens the event device. A submission
    /// failure leaves the slot `Idle` with the handle open for a later
    /// retry and returns the submission error.
    pub fn arm(&self) -> StmResult<()> {
        if self.slot.lock().state != HookState::Idle {
            return Ok(());
        }

        // Open lazily, outside the masked section: open blocks for a
        // full request/response round trip.
        if self.slot.lock().handle.is_none() {
            let handle = self.ipc.open(EVENTHOOK_PATH, OpenMode::None)?;
            self.slot.lock().handle = Some(handle);
        }

        let mut slot = self.slot.lock();
        if slot.state != HookState::Idle {
            return Ok(());
        }
        let Some(handle) = slot.handle else {
            // A release completion swept the handle between the open
            // phase and here; the next arm attempt reopens.
            return Err(StmError::NotFound);
        };

        slot.pending_code = 0;
        self.ipc
            .ioctl_async(handle, Ioctl::EventHook, &[], EVENT_PAYLOAD_LEN)?;
        slot.state = HookState::Armed;
        Ok(())
    }

    /// Replace the notification handler, returning the previous one.
    ///
    /// Always triggers [`arm`](EventHook::arm): registration is also the
    /// mechanism that (re)starts the subscription loop, so as long as a
    /// handler is registered a subscription is (or will be) outstanding.
    /// Registration itself cannot fail; an arming failure is observable
    /// only in the log.
    pub fn register_handler(&self, handler: Option<EventCallback>) -> Option<EventCallback> {
        let previous = {
            let mut slot = self.slot.lock();
            core::mem::replace(&mut slot.callback, handler)
        };

        if let Err(err) = self.arm() {
            log::warn!("stm: arming event hook after registration failed: {err}");
        }

        previous
    }

    /// Tear down the subscription.
    ///
    /// Issues the release control call over an independent immediate
    /// connection and returns that call's result. If a request is
    /// outstanding, the service delivers one final completion which
    /// closes the event handle (see [`on_completion`]). With no request
    /// outstanding that completion never arrives, so the handle is
    /// closed here instead of leaking.
    ///
    /// [`on_completion`]: EventHook::on_completion
    pub fn release(&self) -> StmResult<i32> {
        let immediate = self.ipc.open(IMMEDIATE_PATH, OpenMode::None)?;

        // Mark before issuing the call: the final completion may arrive
        // while the release round trip is still in flight.
        let idle_handle = {
            let mut slot = self.slot.lock();
            if slot.state == HookState::Armed {
                slot.state = HookState::Releasing;
                None
            } else {
                slot.handle.take()
            }
        };
        if let Some(handle) = idle_handle {
            if let Err(err) = self.ipc.close(handle) {
                log::warn!("stm: closing idle event handle failed: {err}");
            }
        }

        let result = self
            .ipc
            .ioctl(immediate, Ioctl::ReleaseEventHook, &[], &mut []);
        if let Err(err) = self.ipc.close(immediate) {
            log::debug!("stm: closing immediate connection failed: {err}");
        }
        result
    }

    /// Force a release at driver shutdown, regardless of current state.
    pub fn shutdown(&self) {
        if let Err(err) = self.release() {
            log::debug!("stm: release at shutdown failed: {err}");
        }
    }

    /// Completion entry point, invoked by the transport binding when the
    /// outstanding request finishes - on notification arrival or on the
    /// release-induced final completion.
    ///
    /// Must not block beyond the short slot critical section. The
    /// pre-completion state decides the outcome: a `Releasing` slot is
    /// closed out, a negative result is logged and suppressed, and a
    /// normal notification is dispatched to the registered handler
    /// before a fresh subscription is armed.
    pub fn on_completion(&self, result: i32, payload: [u8; EVENT_PAYLOAD_LEN]) {
        let code = event::decode_code(payload);

        let outcome = {
            let mut slot = self.slot.lock();
            // Capture the state BEFORE resetting it: the request that
            // made it non-Idle has completed either way.
            let previous = slot.state;
            slot.state = HookState::Idle;

            match previous {
                HookState::Releasing => Completion::Close(slot.handle.take()),
                _ if result < 0 => Completion::Suppress,
                _ => {
                    slot.pending_code = code;
                    Completion::Dispatch(slot.callback, code)
                }
            }
        };

        match outcome {
            Completion::Close(handle) => {
                if let Some(handle) = handle {
                    if let Err(err) = self.ipc.close(handle) {
                        log::warn!("stm: closing event handle failed: {err}");
                    }
                }
            }
            Completion::Suppress => {
                log::warn!("stm: event hook completion failed ({result}); already registered elsewhere?");
            }
            Completion::Dispatch(callback, code) => {
                log::trace!("stm: event {:#010x} ({})", code, event::name(code));
                if let Some(callback) = callback {
                    callback(code);
                }
                // Single-shot subscription: renew it so the next event
                // is not lost.
                if let Err(err) = self.arm() {
                    log::warn!("stm: re-arming event hook failed: {err}");
                }
            }
        }
    }
}
