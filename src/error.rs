//! # Error Types
//!
//! This module defines the error taxonomy of the connectivity core: terminal
//! association failures, fatal session errors generic over the transport's
//! own error type, and the non-fatal protocol violations that are logged and
//! dropped.

/// Terminal outcome of the WiFi association supervisor.
///
/// The supervisor never retries past its bound; whether to reboot or restart
/// the connection sequence is the caller's decision.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum AssociationError {
    /// Bringing the station interface up failed before any attempt was made.
    Startup,
    /// The retry budget was exhausted without an address assignment.
    RetriesExhausted { attempts: u32 },
}

/// Fatal session errors.
///
/// Generic over the link error type `E`, allowing it to wrap whatever the
/// platform's MQTT client primitive reports. Publish and subscribe failures
/// are not represented here: they are local, logged and abandoned without
/// tearing the session down.
#[derive(Debug)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum SessionError<E> {
    /// The initial broker connection failed. Recovery means restarting the
    /// whole connection sequence, not retrying inside the session.
    Connect(E),
    /// The transport's event stream died; the session is gone.
    EventStream(E),
}

/// An unexpected payload on a known topic. Logged, never fatal.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum ProtocolViolation {
    /// The command topic carried something other than `ON`/`OFF`.
    UnknownCommandToken,
    /// The state-response topic carried something other than `ON`/`OFF`.
    UnknownStateToken,
}
