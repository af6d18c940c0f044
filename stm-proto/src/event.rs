//! Event hook notifications
//!
//! The event device delivers one 32-bit notification code per completed
//! subscription. The service writes the code into the caller-supplied
//! 4-byte output buffer in big-endian order.

/// Size of the notification payload buffer, in bytes.
pub const EVENT_PAYLOAD_LEN: usize = 4;

/// The power button was pressed.
pub const EVENT_POWER: u32 = 0x0000_0800;

/// The reset button was pressed.
pub const EVENT_RESET: u32 = 0x0002_0000;

/// Decode a notification payload buffer into an event code.
#[inline]
#[must_use]
pub const fn decode_code(payload: [u8; EVENT_PAYLOAD_LEN]) -> u32 {
    u32::from_be_bytes(payload)
}

/// Human-readable event name for logging.
#[must_use]
pub const fn name(code: u32) -> &'static str {
    match code {
        EVENT_POWER => "power",
        EVENT_RESET => "reset",
        _ => "unknown",
    }
}
