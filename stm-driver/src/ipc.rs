//! Transport abstraction
//!
//! The driver consumes the microkernel's IPC transport as a black box:
//! open a named device, issue synchronous or asynchronous control calls,
//! close the handle. Implementations wrap whatever the embedding system
//! provides; tests substitute a mock.

use stm_proto::{Ioctl, StmResult};

/// An open connection to a device served by the microkernel.
///
/// Handles are plain non-negative descriptors. Ownership is tracked by
/// the driver, not by this type: closing is explicit and best-effort,
/// so every code path that opens a handle must close it on every exit.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Handle(i32);

impl Handle {
    /// Wrap a raw descriptor returned by the transport.
    #[inline]
    #[must_use]
    pub const fn from_raw(raw: i32) -> Self {
        Self(raw)
    }

    /// The raw descriptor value.
    #[inline]
    #[must_use]
    pub const fn raw(self) -> i32 {
        self.0
    }
}

/// Access mode requested when opening a device.
#[repr(u32)]
#[derive(Clone, Copy, Debug, PartialEq, Eq, Default)]
pub enum OpenMode {
    /// Control-only access (no data stream).
    #[default]
    None = 0,
    /// Read access.
    Read = 1,
    /// Write access.
    Write = 2,
    /// Read and write access.
    ReadWrite = 3,
}

/// The IPC transport consumed by the driver.
///
/// # Asynchronous completions
///
/// [`ioctl_async`](IpcService::ioctl_async) only *submits* a request and
/// returns immediately. When the request later completes, the transport
/// binding must invoke the driver's completion entry point
/// ([`EventHook::on_completion`](crate::hook::EventHook::on_completion))
/// with the result code and the 4-byte payload buffer the service wrote.
/// That invocation happens on a completion context the driver does not
/// control and must be treated as capable of preempting application code
/// at any instruction boundary.
pub trait IpcService {
    /// Open a device path. A negative transport result surfaces as `Err`.
    fn open(&self, path: &str, mode: OpenMode) -> StmResult<Handle>;

    /// Close a handle. Best-effort; failures are worth logging but never
    /// escalate.
    fn close(&self, handle: Handle) -> StmResult<()>;

    /// Perform one synchronous control call, blocking for a single
    /// request/response round trip.
    fn ioctl(&self, handle: Handle, op: Ioctl, input: &[u8], output: &mut [u8]) -> StmResult<i32>;

    /// Submit an asynchronous control call with an `out_len`-byte output
    /// buffer, returning the submission result only (not the eventual
    /// completion outcome).
    fn ioctl_async(
        &self,
        handle: Handle,
        op: Ioctl,
        input: &[u8],
        out_len: usize,
    ) -> StmResult<()>;
}

impl<T: IpcService + ?Sized> IpcService for &T {
    fn open(&self, path: &str, mode: OpenMode) -> StmResult<Handle> {
        (**self).open(path, mode)
    }

    fn close(&self, handle: Handle) -> StmResult<()> {
        (**self).close(handle)
    }

    fn ioctl(&self, handle: Handle, op: Ioctl, input: &[u8], output: &mut [u8]) -> StmResult<i32> {
        (**self).ioctl(handle, op, input, output)
    }

    fn ioctl_async(
        &self,
        handle: Handle,
        op: Ioctl,
        input: &[u8],
        out_len: usize,
    ) -> StmResult<()> {
        (**self).ioctl_async(handle, op, input, out_len)
    }
}
