//! `httpc` issues one logical HTTP call as a bounded sequence of attempts.
//!
//! - [`Client`] / [`RequestBuilder`] configure a call and send it through the
//!   retry engine ([`retry::execute`]).
//! - Errors expose [`Capabilities`] (conflict, exists, not found, retry,
//!   temporary) so callers branch on meaning, not on concrete types.
//! - [`append`] combines two errors into one without losing either side's
//!   capabilities.

mod backoff;
mod body;
mod cancel;
mod capability;
mod client;
mod doer;
mod error;
mod multi;
mod options;
pub mod retry;
mod types;

pub use backoff::{Backoff, ConstantBackoff, ExponentialBackoff};
pub use body::{Body, BodyReader, BodySeeker, SeekParams, Seekable, Streamed, Whence};
pub use cancel::Cancellation;
pub use capability::{
    has, is_conflict, is_exists, is_not_found, is_retry, is_retryable, is_temporary, Capabilities,
    Capability, CapabilityError,
};
pub use client::{Client, RequestBuilder};
pub use doer::{Doer, ReqwestDoer};
pub use error::Error;
pub use multi::{append, Multi};
pub use options::ClientOptions;
pub use retry::RetryOptions;
pub use types::{Request, Response};

pub use async_trait::async_trait;
pub use reqwest::{Method, StatusCode, Url};
pub use tokio_util::sync::CancellationToken;

pub type Result<T> = std::result::Result<T, Error>;
