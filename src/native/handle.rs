//! RAII ownership of an OS handle.
//!
//! The guard holds the handle exclusively; it is not `Clone`, and moving it
//! transfers ownership. `close()` runs at most once, explicitly or on drop.

use std::fmt;

use tracing::{debug, warn};

use super::{NativeApi, RawHandle};

pub struct SafeHandle<'a> {
    api: &'a dyn NativeApi,
    raw: RawHandle,
    label: String,
    closed: bool,
}

impl<'a> SafeHandle<'a> {
    /// Take ownership of `raw`, which `api` produced. `label` is the resolved
    /// path used in logs and errors.
    pub fn new(api: &'a dyn NativeApi, raw: RawHandle, label: impl Into<String>) -> Self {
        Self {
            api,
            raw,
            label: label.into(),
            closed: false,
        }
    }

    pub fn raw(&self) -> RawHandle {
        self.raw
    }

    pub fn label(&self) -> &str {
        &self.label
    }

    pub(crate) fn api(&self) -> &'a dyn NativeApi {
        self.api
    }

    /// True when the wrapped value is a "no resource" sentinel.
    pub fn is_invalid(&self) -> bool {
        self.raw.is_sentinel()
    }

    pub fn is_closed(&self) -> bool {
        self.closed
    }

    /// Release the handle. Idempotent; a failing close is logged, not returned,
    /// so cleanup never masks the error that caused it.
    pub fn close(&mut self) {
        if self.closed {
            return;
        }
        self.closed = true;
        if self.raw.is_sentinel() {
            return;
        }
        match self.api.close_handle(self.raw) {
            Ok(()) => debug!(path = %self.label, handle = self.raw.0, "handle closed"),
            Err(code) => warn!(
                path = %self.label,
                handle = self.raw.0,
                code,
                "close handle failed; ignored"
            ),
        }
    }

    /// Give up ownership; the caller becomes responsible for closing.
    pub fn into_raw(mut self) -> RawHandle {
        self.closed = true;
        self.raw
    }
}

impl Drop for SafeHandle<'_> {
    fn drop(&mut self) {
        self.close();
    }
}

impl fmt::Debug for SafeHandle<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SafeHandle")
            .field("raw", &self.raw)
            .field("label", &self.label)
            .field("closed", &self.closed)
            .finish()
    }
}
