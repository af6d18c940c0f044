//! Platform hooks
//!
//! Hardware side effects the driver triggers but does not own. Keeping
//! them behind a trait keeps the register pokes out of the unit-testable
//! driver logic.

/// Platform-specific hooks consumed by the immediate command facade.
pub trait Platform {
    /// Prepare the display for an imminent power transition.
    ///
    /// On the real platform this blanks video output with a single
    /// register write. Fire-and-forget: it is not rolled back if the
    /// subsequent power request fails.
    fn prepare_power_transition(&self);

    /// Revision of the I/O chipset, as reported by the system layer.
    ///
    /// The idle-mode configuration word differs between early and later
    /// revisions.
    fn chipset_revision(&self) -> u32;
}

impl<T: Platform + ?Sized> Platform for &T {
    fn prepare_power_transition(&self) {
        (**self).prepare_power_transition();
    }

    fn chipset_revision(&self) -> u32 {
        (**self).chipset_revision()
    }
}
