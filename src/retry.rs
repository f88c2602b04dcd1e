//! Attempt loop shared by every request.
//!
//! One call to [`execute`] owns its attempt counter and the request body for
//! its whole lifetime; nothing here is shared between calls.

use crate::{
    is_retryable, Backoff, Cancellation, Doer, Error, Request, Response, Result, SeekParams,
};

/// Retry behaviour for one logical call.
#[derive(Clone, Copy, Debug, Default, Eq, PartialEq)]
pub struct RetryOptions {
    /// Retry every failed attempt, not only retry/temporary ones.
    pub retry_response_errors: bool,
    /// Rewind seekable bodies to their start when no seek params are set.
    pub reset_seeker_to_zero: bool,
    /// Explicit rewind target; wins over `reset_seeker_to_zero`.
    pub seek_params: Option<SeekParams>,
}

impl RetryOptions {
    /// Where a seekable body is rewound to after a failed attempt, if anywhere.
    pub fn rewind_target(&self) -> Option<SeekParams> {
        self.seek_params
            .or_else(|| self.reset_seeker_to_zero.then(SeekParams::start))
    }

    fn is_eligible(&self, err: &Error) -> bool {
        self.retry_response_errors || is_retryable(err)
    }
}

/// Issues `request` through `doer` until it succeeds, fails terminally, or the
/// caller aborts.
///
/// Returns the last attempt's error on failure. After every retry-eligible
/// failure a seekable body is rewound per [`RetryOptions::rewind_target`]; a
/// rewind failure ends the loop with [`Error::Rewind`], appended to the
/// attempt's error when the backoff allows no further call.
pub async fn execute<D, B>(
    doer: &D,
    backoff: &B,
    options: &RetryOptions,
    cancel: &Cancellation,
    request: &mut Request,
) -> Result<Response>
where
    D: Doer + ?Sized,
    B: Backoff + ?Sized,
{
    let rewind_target = options.rewind_target();
    let mut calls_made = 0u32;

    loop {
        cancel.check()?;

        calls_made += 1;
        let err = match doer.send(request).await {
            Ok(response) => return Ok(response),
            Err(err) => err,
        };

        if !options.is_eligible(&err) {
            return Err(err);
        }

        let permitted = backoff.permits(calls_made);

        if let Some(target) = rewind_target {
            if let Err(rewind_err) = rewind(request, target) {
                // With no retry to follow, the attempt error stays the one reported.
                return Err(if permitted {
                    rewind_err
                } else {
                    err.append(rewind_err)
                });
            }
        }

        if !permitted {
            return Err(err);
        }

        if let Err(abort) = cancel.check() {
            #[cfg(feature = "tracing")]
            tracing::warn!(calls_made, error = %err, "retry abandoned by caller");
            return Err(abort);
        }

        let delay = backoff.delay(calls_made);

        #[cfg(feature = "tracing")]
        tracing::debug!(
            calls_made,
            delay_ms = delay.as_millis() as u64,
            error = %err,
            "retrying {} {}",
            request.method,
            request.url
        );

        cancel.sleep(delay).await?;
    }
}

fn rewind(request: &mut Request, target: SeekParams) -> Result<()> {
    let Some(seeker) = request.body.seeker() else {
        return Ok(());
    };

    match seeker.seek(target.offset, target.whence) {
        Ok(_position) => {
            #[cfg(feature = "tracing")]
            tracing::debug!(
                offset = target.offset,
                whence = target.whence.0,
                position = _position,
                "rewound request body"
            );
            Ok(())
        }
        Err(err) => {
            #[cfg(feature = "tracing")]
            tracing::warn!(
                offset = target.offset,
                whence = target.whence.0,
                "request body rewind failed: {err}"
            );
            Err(Error::Rewind(err))
        }
    }
}

#[cfg(test)]
mod tests {
    use crate::{RetryOptions, SeekParams, Whence};

    #[test]
    fn explicit_seek_params_win_over_reset() {
        let options = RetryOptions {
            reset_seeker_to_zero: true,
            seek_params: Some(SeekParams::new(13, Whence(37))),
            ..RetryOptions::default()
        };
        assert_eq!(options.rewind_target(), Some(SeekParams::new(13, Whence(37))));
    }

    #[test]
    fn reset_rewinds_to_start() {
        let options = RetryOptions {
            reset_seeker_to_zero: true,
            ..RetryOptions::default()
        };
        assert_eq!(options.rewind_target(), Some(SeekParams::start()));
    }

    #[test]
    fn no_rewind_by_default() {
        assert_eq!(RetryOptions::default().rewind_target(), None);
    }
}
