//! Control operation codes
//!
//! Each STM control call is selected by a 32-bit opcode. The event hook
//! opcode is only valid on the event device; everything else goes over
//! an immediate connection.

/// STM control operation codes.
#[repr(u32)]
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Ioctl {
    // === Event hook ===
    /// Subscribe for the next state-change notification (asynchronous,
    /// single-shot: must be re-issued after every delivery).
    EventHook = 0x1000,

    // === Power transitions ===
    /// Reboot the system.
    HotReset = 0x2001,
    /// Reboot as part of a power-down sequence.
    HotResetForPd = 0x2002,
    /// Shut down to standby.
    Shutdown = 0x2003,
    /// Shut down to idle (standby with background services powered).
    IdleMode = 0x2004,
    /// Wake from idle. Defined for completeness; a powered-down caller
    /// cannot issue it.
    Wakeup = 0x2005,

    // === State queries ===
    /// Read the current STM state word.
    GetState = 0x3001,
    /// Release the event hook subscription.
    ReleaseEventHook = 0x3002,

    // === Memory controller ===
    /// Read a memory-controller register (first bank).
    ReadDdrReg = 0x4001,
    /// Read a memory-controller register (second bank).
    ReadDdrReg2 = 0x4002,

    // === Video ===
    /// Configure video output dimming.
    ViDimming = 0x5001,

    // === Front-panel LED ===
    /// Upload and start an LED flash pattern loop.
    LedFlash = 0x6001,
    /// Set the steady LED mode.
    LedMode = 0x6002,

    // === Misc ===
    /// Read the STM firmware version word.
    ReadVersion = 0x7001,
}

impl Ioctl {
    /// Raw opcode value as transmitted to the service.
    #[inline]
    #[must_use]
    pub const fn as_u32(self) -> u32 {
        self as u32
    }
}
