//! Bounded geometric growth around a device-control call.
//!
//! Protocol:
//!  - allocate `initial_size`, issue the call
//!  - ERROR_INSUFFICIENT_BUFFER or ERROR_MORE_DATA: double and retry
//!  - stop after `max_attempts` calls (or if doubling overflows) with
//!    `BufferExhausted`
//!  - any other failure is translated at once, never retried
//!  - on success the buffer's valid length is what the OS reported writing

use tracing::{debug, trace};
use windows_sys::Win32::Foundation::{ERROR_INSUFFICIENT_BUFFER, ERROR_MORE_DATA};

use super::IoControlCode;
use crate::errors::{InteropError, Result};
use crate::native::{FixedLayout, SafeBuffer, SafeHandle};
use crate::translate::translate;

pub const DEFAULT_MAX_ATTEMPTS: u32 = 8;
const DEFAULT_INITIAL_SIZE: usize = 512;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct GrowthPolicy {
    pub initial_size: usize,
    pub max_attempts: u32,
}

impl Default for GrowthPolicy {
    fn default() -> Self {
        Self {
            initial_size: DEFAULT_INITIAL_SIZE,
            max_attempts: DEFAULT_MAX_ATTEMPTS,
        }
    }
}

impl GrowthPolicy {
    pub fn new(initial_size: usize, max_attempts: u32) -> Self {
        Self {
            initial_size,
            max_attempts,
        }
    }

    /// Start at four times the structure's fixed header.
    pub fn for_layout<T: FixedLayout>() -> Self {
        Self::for_header(T::SIZE)
    }

    pub fn for_header(header_size: usize) -> Self {
        Self {
            initial_size: header_size.saturating_mul(4).max(1),
            ..Self::default()
        }
    }

    pub fn with_initial_size(mut self, initial_size: usize) -> Self {
        self.initial_size = initial_size;
        self
    }

    pub fn with_max_attempts(mut self, max_attempts: u32) -> Self {
        self.max_attempts = max_attempts;
        self
    }
}

fn is_insufficient_buffer(code: u32) -> bool {
    code == ERROR_INSUFFICIENT_BUFFER || code == ERROR_MORE_DATA
}

/// Issue `code` against `handle`, growing the output buffer as needed.
/// Errors name the handle's path.
pub fn invoke(
    handle: &SafeHandle<'_>,
    code: IoControlCode,
    input: Option<&[u8]>,
    policy: GrowthPolicy,
) -> Result<SafeBuffer> {
    let path = handle.label();
    let max_attempts = policy.max_attempts.max(1);
    let mut size = policy.initial_size.max(1);
    let mut attempt: u32 = 0;

    loop {
        attempt += 1;
        let mut buffer = SafeBuffer::zeroed(size);
        trace!(path, code = %code, size, attempt, "device control");

        match handle
            .api()
            .device_control(handle.raw(), code.value(), input, buffer.as_mut_slice())
        {
            Ok(returned) => {
                buffer.truncate(returned);
                debug!(path, code = %code, size, returned, attempt, "device control completed");
                return Ok(buffer);
            }
            Err(native) if is_insufficient_buffer(native) => {
                buffer.release();
                match size.checked_mul(2) {
                    Some(next) if attempt < max_attempts => {
                        trace!(path, native, next_size = next, "insufficient buffer; growing");
                        size = next;
                    }
                    _ => {
                        debug!(path, code = %code, size, attempt, "buffer growth exhausted");
                        return Err(InteropError::BufferExhausted {
                            path: path.to_string(),
                            attempts: attempt,
                            last_size: size,
                        });
                    }
                }
            }
            Err(native) => return Err(translate(native, path, None)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn policy_for_layout_is_four_headers() {
        struct Header;
        impl FixedLayout for Header {
            const SIZE: usize = 48;
            fn decode(_: &[u8]) -> Self {
                Header
            }
            fn encode(&self, _: &mut [u8]) {}
        }
        let p = GrowthPolicy::for_layout::<Header>();
        assert_eq!(p.initial_size, 192);
        assert_eq!(p.max_attempts, DEFAULT_MAX_ATTEMPTS);
    }

    #[test]
    fn both_growth_signals_recognised() {
        assert!(is_insufficient_buffer(122));
        assert!(is_insufficient_buffer(234));
        assert!(!is_insufficient_buffer(5));
    }
}
