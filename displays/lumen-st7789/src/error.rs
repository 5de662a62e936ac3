//! Transport errors

use crate::config::ConfigError;

/// Display transport errors
///
/// `E` is the bus error type. Errors are never retried by the transport.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum TransportError<E> {
    /// The slice buffer pair could not be allocated
    AllocationFailure,
    /// The bus or device could not be brought up
    BusInitFailure(E),
    /// A queued transfer failed
    Bus(E),
    /// Driving the D/C or reset line failed
    Pin,
    /// Command parameters exceed the inline transfer capacity
    PayloadTooLarge,
    /// Window is inverted or outside the panel
    InvalidWindow,
    /// Configuration rejected before bring-up
    InvalidConfig(ConfigError),
    /// The bus handed back a transfer the transport was not waiting for
    QueueDesync,
}

impl<E> From<ConfigError> for TransportError<E> {
    fn from(e: ConfigError) -> Self {
        TransportError::InvalidConfig(e)
    }
}
