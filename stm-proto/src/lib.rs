//! STM control protocol ABI
//!
//! Shared definitions for talking to the console's system-management
//! service ("STM"). The service owns power-state transitions (standby,
//! idle, reboot), the front-panel LED, and the asynchronous event hook
//! through which power-button and state-change notifications are
//! delivered.
//!
//! This crate is `no_std` and carries no driver logic, allowing it to be
//! used by the driver, by transport bindings, and by test tooling alike.
//!
//! # Modules
//!
//! - [`ioctl`] - Control operation codes
//! - [`error`] - Result codes returned by the service
//! - [`event`] - Event hook notification codes and payload layout
//! - [`led`] - LED flash configuration wire format
//!
//! # Wire conventions
//!
//! The service runs on a big-endian platform: every 32-bit control word
//! and every 16-bit LED pattern entry travels in big-endian byte order.

#![no_std]
#![deny(unsafe_op_in_unsafe_fn)]

pub mod error;
pub mod event;
pub mod ioctl;
pub mod led;

pub use error::{StmError, StmResult, check};
pub use event::{EVENT_PAYLOAD_LEN, EVENT_POWER, EVENT_RESET};
pub use ioctl::Ioctl;
pub use led::{LedFlags, LedFlashRequest, MAX_LED_PATTERNS};

/// Device path for the event hook connection.
///
/// At most one asynchronous subscription may be outstanding on this
/// device at any time.
pub const EVENTHOOK_PATH: &str = "/dev/stm/eventhook";

/// Device path for immediate (synchronous, short-lived) control calls.
pub const IMMEDIATE_PATH: &str = "/dev/stm/immediate";
