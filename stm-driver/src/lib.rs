//! STM power/state-management driver
//!
//! Driver for the console's system-management microkernel service
//! ("STM"). It exposes two surfaces:
//!
//! - [`EventHook`] - the event-hook subscription: one persistent
//!   asynchronous request through which the service delivers
//!   power-button and state-change notifications. The subscription is
//!   single-shot per service semantics, so the driver re-arms it after
//!   every delivery and keeps at most one request outstanding.
//! - [`ImmediateCommands`] - one-shot synchronous control calls:
//!   shutdown to standby or idle, reboot, LED steady mode and flash
//!   loops, plus state/version/memory-controller queries.
//!
//! The transport, the completion interrupt line, and the platform
//! register pokes are consumed through traits ([`IpcService`],
//! [`InterruptLine`], [`Platform`]); the embedding system supplies the
//! real implementations and the test suite supplies mocks.
//!
//! Diagnostics go through the `log` facade; install whatever logger the
//! embedding system uses. Nothing in this crate is fatal: failures
//! surface as [`StmResult`](stm_proto::StmResult) values and log lines,
//! leaving retry policy to the caller.

#![no_std]
#![deny(unsafe_op_in_unsafe_fn)]

pub mod hook;
pub mod immediate;
pub mod ipc;
pub mod platform;
pub mod sync;

#[cfg(test)]
mod mock;

pub use hook::{EventCallback, EventHook, HookState};
pub use immediate::{DdrRegister, ImmediateCommands, LED_OFF};
pub use ipc::{Handle, IpcService, OpenMode};
pub use platform::Platform;
pub use sync::{InterruptLine, IrqMutex};

// The protocol ABI is re-exported so embedders depend on one crate.
pub use stm_proto as proto;
