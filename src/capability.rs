use std::io;

/// Named boolean properties an error may expose.
///
/// Calling code branches on these instead of on concrete error types.
#[derive(Clone, Copy, Debug, Eq, PartialEq, Hash)]
pub enum Capability {
    Conflict,
    Exists,
    NotFound,
    Retry,
    Temporary,
}

impl Capability {
    /// Every capability, in declaration order.
    pub const ALL: [Capability; 5] = [
        Capability::Conflict,
        Capability::Exists,
        Capability::NotFound,
        Capability::Retry,
        Capability::Temporary,
    ];
}

/// Optional capabilities of an error value.
///
/// Every method defaults to `false`, so an error type opts in by overriding
/// only the capabilities it actually has:
///
/// ```
/// use httpc::Capabilities;
///
/// #[derive(Debug, thiserror::Error)]
/// #[error("row locked")]
/// struct Locked;
///
/// impl Capabilities for Locked {
///     fn retry(&self) -> bool {
///         true
///     }
/// }
///
/// assert!(httpc::is_retry(&Locked));
/// assert!(!httpc::is_conflict(&Locked));
/// ```
pub trait Capabilities {
    fn conflict(&self) -> bool {
        false
    }

    fn exists(&self) -> bool {
        false
    }

    fn not_found(&self) -> bool {
        false
    }

    fn retry(&self) -> bool {
        false
    }

    fn temporary(&self) -> bool {
        false
    }

    /// Queries a capability by name.
    fn has(&self, capability: Capability) -> bool {
        match capability {
            Capability::Conflict => self.conflict(),
            Capability::Exists => self.exists(),
            Capability::NotFound => self.not_found(),
            Capability::Retry => self.retry(),
            Capability::Temporary => self.temporary(),
        }
    }
}

/// An error that can be carried by [`crate::Error::Custom`].
///
/// Implemented for every thread-safe error that implements [`Capabilities`].
pub trait CapabilityError: std::error::Error + Capabilities + Send + Sync + 'static {}

impl<T> CapabilityError for T where T: std::error::Error + Capabilities + Send + Sync + 'static {}

impl<T: Capabilities + ?Sized> Capabilities for Box<T> {
    fn conflict(&self) -> bool {
        (**self).conflict()
    }

    fn exists(&self) -> bool {
        (**self).exists()
    }

    fn not_found(&self) -> bool {
        (**self).not_found()
    }

    fn retry(&self) -> bool {
        (**self).retry()
    }

    fn temporary(&self) -> bool {
        (**self).temporary()
    }
}

impl<T: Capabilities + ?Sized> Capabilities for &T {
    fn conflict(&self) -> bool {
        (**self).conflict()
    }

    fn exists(&self) -> bool {
        (**self).exists()
    }

    fn not_found(&self) -> bool {
        (**self).not_found()
    }

    fn retry(&self) -> bool {
        (**self).retry()
    }

    fn temporary(&self) -> bool {
        (**self).temporary()
    }
}

impl Capabilities for reqwest::Error {
    fn temporary(&self) -> bool {
        self.is_timeout()
            || self.is_request()
            || self.is_body()
            || self.is_connect()
    }
}

impl Capabilities for io::Error {
    fn exists(&self) -> bool {
        self.kind() == io::ErrorKind::AlreadyExists
    }

    fn not_found(&self) -> bool {
        self.kind() == io::ErrorKind::NotFound
    }

    fn temporary(&self) -> bool {
        matches!(
            self.kind(),
            io::ErrorKind::TimedOut
                | io::ErrorKind::Interrupted
                | io::ErrorKind::WouldBlock
                | io::ErrorKind::ConnectionReset
                | io::ErrorKind::ConnectionAborted
                | io::ErrorKind::ConnectionRefused
        )
    }
}

pub fn is_conflict<E: Capabilities + ?Sized>(err: &E) -> bool {
    err.conflict()
}

pub fn is_exists<E: Capabilities + ?Sized>(err: &E) -> bool {
    err.exists()
}

pub fn is_not_found<E: Capabilities + ?Sized>(err: &E) -> bool {
    err.not_found()
}

pub fn is_retry<E: Capabilities + ?Sized>(err: &E) -> bool {
    err.retry()
}

pub fn is_temporary<E: Capabilities + ?Sized>(err: &E) -> bool {
    err.temporary()
}

/// Reports whether the retry engine treats `err` as retry-eligible on its own,
/// i.e. without `retry_response_errors`.
pub fn is_retryable<E: Capabilities + ?Sized>(err: &E) -> bool {
    err.retry() || err.temporary()
}

/// Queries `capability` on `err` by name.
pub fn has<E: Capabilities + ?Sized>(err: &E, capability: Capability) -> bool {
    err.has(capability)
}
