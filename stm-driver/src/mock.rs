//! Mock collaborators for driver tests
//!
//! [`MockIpc`] stands in for the microkernel transport: it tracks opens,
//! closes, synchronous calls, and the number of asynchronous requests in
//! flight, so tests can assert the at-most-one-outstanding invariant and
//! handle-pairing directly. Completion delivery is driven by the test:
//! call [`MockIpc::finish_async`] and then the driver's completion entry
//! point, mirroring what a real transport binding does from completion
//! context.

use core::cell::Cell;

use spin::Mutex;
use stm_proto::{EVENTHOOK_PATH, IMMEDIATE_PATH, Ioctl, StmError, StmResult, check};

use crate::ipc::{Handle, IpcService, OpenMode};
use crate::platform::Platform;
use crate::sync::InterruptLine;

const MAX_ENTRIES: usize = 16;
const MAX_INPUT: usize = 96;

/// Which device path a handle belongs to.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub(crate) enum Device {
    Event,
    Immediate,
}

#[derive(Clone, Copy)]
struct OpenEntry {
    fd: i32,
    device: Device,
    closes: u32,
}

/// One recorded synchronous control call.
#[derive(Clone, Copy)]
pub(crate) struct IoctlRecord {
    pub device: Device,
    pub op: Ioctl,
    pub input: [u8; MAX_INPUT],
    pub input_len: usize,
    /// Logical time of the call, for ordering assertions.
    pub at: usize,
}

impl IoctlRecord {
    pub fn input_bytes(&self) -> &[u8] {
        &self.input[..self.input_len]
    }
}

struct State {
    next_fd: i32,
    entries: [Option<OpenEntry>; MAX_ENTRIES],
    ioctls: [Option<IoctlRecord>; MAX_ENTRIES],
    ioctl_count: usize,
    opens: usize,
    submits: usize,
    in_flight: usize,
    peak_in_flight: usize,
    clock: usize,
    fail_next_open: Option<StmError>,
    sync_result: i32,
    sync_output: Option<u32>,
    submit_error: Option<StmError>,
}

pub(crate) struct MockIpc {
    state: Mutex<State>,
}

impl MockIpc {
    pub fn new() -> Self {
        Self {
            state: Mutex::new(State {
                next_fd: 100,
                entries: [None; MAX_ENTRIES],
                ioctls: [None; MAX_ENTRIES],
                ioctl_count: 0,
                opens: 0,
                submits: 0,
                in_flight: 0,
                peak_in_flight: 0,
                clock: 0,
                fail_next_open: None,
                sync_result: 0,
                sync_output: None,
                submit_error: None,
            }),
        }
    }

    /// Make the next `open` fail with `err`.
    pub fn fail_next_open(&self, err: StmError) {
        self.state.lock().fail_next_open = Some(err);
    }

    /// Raw result every synchronous call returns from now on.
    pub fn set_sync_result(&self, raw: i32) {
        self.state.lock().sync_result = raw;
    }

    /// Word written (big-endian) into sufficiently large output buffers.
    pub fn set_sync_output(&self, word: u32) {
        self.state.lock().sync_output = Some(word);
    }

    /// Error every asynchronous submission returns, or `None` to accept.
    pub fn set_submit_error(&self, err: Option<StmError>) {
        self.state.lock().submit_error = err;
    }

    /// Retire the outstanding asynchronous request, if any. The test
    /// then delivers the completion to the driver itself.
    pub fn finish_async(&self) -> bool {
        let mut st = self.state.lock();
        if st.in_flight == 0 {
            return false;
        }
        st.in_flight -= 1;
        true
    }

    /// Advance and return the logical clock. Shared with
    /// [`MockPlatform`] for ordering assertions.
    pub fn tick(&self) -> usize {
        let mut st = self.state.lock();
        st.clock += 1;
        st.clock
    }

    pub fn opens(&self) -> usize {
        self.state.lock().opens
    }

    pub fn submits(&self) -> usize {
        self.state.lock().submits
    }

    pub fn in_flight(&self) -> usize {
        self.state.lock().in_flight
    }

    pub fn peak_in_flight(&self) -> usize {
        self.state.lock().peak_in_flight
    }

    /// Handles to `device` that are currently open.
    pub fn open_handles(&self, device: Device) -> usize {
        self.state
            .lock()
            .entries
            .iter()
            .flatten()
            .filter(|e| e.device == device && e.closes == 0)
            .count()
    }

    /// Total close calls against handles to `device`.
    pub fn total_closes(&self, device: Device) -> u32 {
        self.state
            .lock()
            .entries
            .iter()
            .flatten()
            .filter(|e| e.device == device)
            .map(|e| e.closes)
            .sum()
    }

    /// Whether any handle was closed more than once.
    pub fn double_closed(&self) -> bool {
        self.state
            .lock()
            .entries
            .iter()
            .flatten()
            .any(|e| e.closes > 1)
    }

    pub fn ioctl_count(&self) -> usize {
        self.state.lock().ioctl_count
    }

    pub fn last_ioctl(&self) -> Option<IoctlRecord> {
        let st = self.state.lock();
        st.ioctl_count
            .checked_sub(1)
            .and_then(|i| st.ioctls[i])
    }

    fn device_of(&self, st: &State, handle: Handle) -> Device {
        st.entries
            .iter()
            .flatten()
            .find(|e| e.fd == handle.raw())
            .map(|e| e.device)
            .expect("ioctl on unknown handle")
    }
}

impl IpcService for MockIpc {
    fn open(&self, path: &str, _mode: OpenMode) -> StmResult<Handle> {
        let mut st = self.state.lock();
        st.clock += 1;
        if let Some(err) = st.fail_next_open.take() {
            return Err(err);
        }

        let device = match path {
            EVENTHOOK_PATH => Device::Event,
            IMMEDIATE_PATH => Device::Immediate,
            other => panic!("open of unexpected path {other}"),
        };
        let fd = st.next_fd;
        st.next_fd += 1;
        st.opens += 1;

        let slot = st
            .entries
            .iter_mut()
            .find(|e| e.is_none())
            .expect("mock open table full");
        *slot = Some(OpenEntry {
            fd,
            device,
            closes: 0,
        });
        Ok(Handle::from_raw(fd))
    }

    fn close(&self, handle: Handle) -> StmResult<()> {
        let mut st = self.state.lock();
        st.clock += 1;
        let entry = st
            .entries
            .iter_mut()
            .flatten()
            .find(|e| e.fd == handle.raw())
            .expect("close of unknown handle");
        entry.closes += 1;
        Ok(())
    }

    fn ioctl(&self, handle: Handle, op: Ioctl, input: &[u8], output: &mut [u8]) -> StmResult<i32> {
        let mut st = self.state.lock();
        st.clock += 1;
        let at = st.clock;
        let device = self.device_of(&st, handle);

        assert!(input.len() <= MAX_INPUT, "mock input capture too small");
        let mut captured = [0u8; MAX_INPUT];
        captured[..input.len()].copy_from_slice(input);
        let idx = st.ioctl_count;
        st.ioctls[idx] = Some(IoctlRecord {
            device,
            op,
            input: captured,
            input_len: input.len(),
            at,
        });
        st.ioctl_count += 1;

        if st.sync_result >= 0
            && output.len() >= 4
            && let Some(word) = st.sync_output
        {
            output[..4].copy_from_slice(&word.to_be_bytes());
        }
        check(st.sync_result)
    }

    fn ioctl_async(
        &self,
        handle: Handle,
        op: Ioctl,
        input: &[u8],
        out_len: usize,
    ) -> StmResult<()> {
        let mut st = self.state.lock();
        st.clock += 1;
        assert_eq!(self.device_of(&st, handle), Device::Event);
        assert_eq!(op, Ioctl::EventHook);
        assert!(input.is_empty());
        assert_eq!(out_len, stm_proto::EVENT_PAYLOAD_LEN);

        if let Some(err) = st.submit_error {
            return Err(err);
        }
        st.submits += 1;
        st.in_flight += 1;
        st.peak_in_flight = st.peak_in_flight.max(st.in_flight);
        Ok(())
    }
}

/// Interrupt line that does nothing, for tests that only exercise the
/// state machine.
pub(crate) struct NullLine;

impl InterruptLine for NullLine {
    fn save_and_mask(&self) -> u32 {
        0
    }

    fn restore(&self, _token: u32) {}
}

/// Platform hooks recording when the video blank happened on the shared
/// mock clock.
pub(crate) struct MockPlatform<'a> {
    ipc: &'a MockIpc,
    revision: u32,
    blank_at: Cell<Option<usize>>,
}

impl<'a> MockPlatform<'a> {
    pub fn new(ipc: &'a MockIpc, revision: u32) -> Self {
        Self {
            ipc,
            revision,
            blank_at: Cell::new(None),
        }
    }

    /// Clock value at the moment of the last video blank, if any.
    pub fn blanked_at(&self) -> Option<usize> {
        self.blank_at.get()
    }
}

impl Platform for MockPlatform<'_> {
    fn prepare_power_transition(&self) {
        self.blank_at.set(Some(self.ipc.tick()));
    }

    fn chipset_revision(&self) -> u32 {
        self.revision
    }
}
