//! Immediate command facade
//!
//! Every operation here is a short-lived synchronous exchange: open the
//! immediate device, issue exactly one control call, close the
//! connection again. Failures surface as `Result` and a log line;
//! nothing retries and nothing is fatal.
//!
//! The power transitions (standby, idle, reboot) blank video output
//! first via [`Platform::prepare_power_transition`]. That side effect is
//! fire-and-forget and is not rolled back when the request fails.

use stm_proto::{IMMEDIATE_PATH, Ioctl, LedFlags, LedFlashRequest, StmResult};

use crate::ipc::{IpcService, OpenMode};
use crate::platform::Platform;

/// Configuration word for idle mode on early chipset revisions.
const IDLE_BASE_CONFIG: u32 = 0xFCA0_8280;

/// Extra configuration bits required from chipset revision 3 onwards.
const IDLE_LATER_REV_BITS: u32 = 0x0040_0040;

/// Steady LED mode selecting "off".
pub const LED_OFF: u32 = 0;

/// Memory-controller register banks readable through the service.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum DdrRegister {
    /// First register bank.
    Primary,
    /// Second register bank.
    Secondary,
}

/// Issues immediate (synchronous, one-shot) control calls.
pub struct ImmediateCommands<I, P> {
    ipc: I,
    platform: P,
}

impl<I: IpcService, P: Platform> ImmediateCommands<I, P> {
    /// Create the facade. No connection is held between calls.
    #[must_use]
    pub const fn new(ipc: I, platform: P) -> Self {
        Self { ipc, platform }
    }

    /// One open/call/close exchange. The connection is closed on every
    /// exit path, including error returns.
    fn call(&self, op: Ioctl, input: &[u8], output: &mut [u8]) -> StmResult<i32> {
        let handle = self.ipc.open(IMMEDIATE_PATH, OpenMode::None)?;
        let result = self.ipc.ioctl(handle, op, input, output);
        if let Err(err) = self.ipc.close(handle) {
            log::debug!("stm: closing immediate connection failed: {err}");
        }
        result
    }

    /// A call that reads back a single big-endian word.
    fn read_word(&self, op: Ioctl) -> StmResult<u32> {
        let mut output = [0u8; 4];
        self.call(op, &[], &mut output)?;
        Ok(u32::from_be_bytes(output))
    }

    /// Shut the system down to standby.
    ///
    /// On success the service powers the system off underneath the
    /// caller; control does not meaningfully return.
    pub fn shutdown_to_standby(&self) -> StmResult<i32> {
        self.platform.prepare_power_transition();
        let config = 0u32;
        self.call(Ioctl::Shutdown, &config.to_be_bytes(), &mut [])
            .inspect_err(|err| log::warn!("stm: shutdown to standby failed: {err}"))
    }

    /// Shut the system down to idle (standby with background services
    /// powered).
    pub fn shutdown_to_idle(&self) -> StmResult<i32> {
        let mut config = IDLE_BASE_CONFIG;
        if self.platform.chipset_revision() > 2 {
            config |= IDLE_LATER_REV_BITS;
        }

        self.platform.prepare_power_transition();
        self.call(Ioctl::IdleMode, &config.to_be_bytes(), &mut [])
            .inspect_err(|err| log::warn!("stm: shutdown to idle failed: {err}"))
    }

    /// Reboot the system.
    pub fn reboot(&self) -> StmResult<i32> {
        self.platform.prepare_power_transition();
        self.call(Ioctl::HotReset, &[], &mut [])
            .inspect_err(|err| log::warn!("stm: reboot failed: {err}"))
    }

    /// Reboot as part of a power-down sequence.
    pub fn reboot_for_power_down(&self) -> StmResult<i32> {
        self.platform.prepare_power_transition();
        self.call(Ioctl::HotResetForPd, &[], &mut [])
            .inspect_err(|err| log::warn!("stm: reboot for power-down failed: {err}"))
    }

    /// Set the steady LED mode.
    pub fn set_led_mode(&self, mode: u32) -> StmResult<i32> {
        match self.call(Ioctl::LedMode, &mode.to_be_bytes(), &mut []) {
            Ok(result) => {
                if mode == LED_OFF {
                    log::debug!("stm: led forced off");
                }
                Ok(result)
            }
            Err(err) => {
                log::warn!("stm: setting led mode {mode} failed: {err}");
                Err(err)
            }
        }
    }

    /// Upload and start an LED flash pattern loop.
    ///
    /// `patterns` is only consulted when `flags` contains
    /// [`LedFlags::USER`]; otherwise the entry count is normalised to
    /// zero and the service's built-in loop for `id` runs. The
    /// transmitted payload is the 4-byte header plus exactly the staged
    /// entries.
    pub fn start_led_flash_loop(
        &self,
        id: u8,
        priority: u8,
        flags: LedFlags,
        patterns: Option<&[u16]>,
    ) -> StmResult<i32> {
        let request = LedFlashRequest::new(id, priority, flags, patterns)?;
        self.call(Ioctl::LedFlash, request.as_bytes(), &mut [])
            .inspect_err(|err| log::warn!("stm: led flash loop failed: {err}"))
    }

    /// Read the current STM state word.
    pub fn get_state(&self) -> StmResult<u32> {
        self.read_word(Ioctl::GetState)
    }

    /// Configure video output dimming.
    pub fn set_vi_dimming(&self, config: u32) -> StmResult<i32> {
        self.call(Ioctl::ViDimming, &config.to_be_bytes(), &mut [])
            .inspect_err(|err| log::warn!("stm: vi dimming failed: {err}"))
    }

    /// Read the STM firmware version word.
    pub fn read_version(&self) -> StmResult<u32> {
        self.read_word(Ioctl::ReadVersion)
    }

    /// Read a memory-controller register word.
    pub fn read_ddr_register(&self, register: DdrRegister) -> StmResult<u32> {
        let op = match register {
            DdrRegister::Primary => Ioctl::ReadDdrReg,
            DdrRegister::Secondary => Ioctl::ReadDdrReg2,
        };
        self.read_word(op)
    }
}
