//! Scripted `NativeApi` used by the integration tests.
//! Records every call and answers from per-code responses so the dispatcher,
//! the growable invoker and the handle guards can be driven without Windows.

#![allow(dead_code)]

use std::collections::HashMap;
use std::sync::atomic::{AtomicIsize, Ordering};
use std::sync::Mutex;

use ntinterop::{ExtendedPath, NativeApi, OpenRequest, RawHandle, SafeBuffer, SecurityTarget};

pub const ERROR_INVALID_FUNCTION: u32 = 1;
pub const ERROR_FILE_NOT_FOUND: u32 = 2;
pub const ERROR_PATH_NOT_FOUND: u32 = 3;
pub const ERROR_ACCESS_DENIED: u32 = 5;
pub const ERROR_INVALID_HANDLE: u32 = 6;
pub const ERROR_SHARING_VIOLATION: u32 = 32;
pub const ERROR_NOT_SUPPORTED: u32 = 50;
pub const ERROR_INSUFFICIENT_BUFFER: u32 = 122;
pub const ERROR_MORE_DATA: u32 = 234;
pub const ERROR_UNABLE_TO_REMOVE_REPLACED: u32 = 1175;
pub const ERROR_TRANSACTION_NOT_ACTIVE: u32 = 6701;

/// How the simulated device answers one control code.
#[derive(Debug, Clone)]
pub enum Response {
    /// Copy the payload if the buffer is large enough, else report it is too small.
    Data(Vec<u8>),
    /// Too small no matter how large the buffer.
    AlwaysInsufficient(u32),
    Fail(u32),
}

#[derive(Debug, Clone)]
pub struct OpenCall {
    pub path: String,
    pub request: OpenRequest,
    pub transaction: RawHandle,
}

#[derive(Debug, Clone, Copy)]
pub struct ControlCall {
    pub handle: RawHandle,
    pub code: u32,
    pub output_len: usize,
}

#[derive(Debug, Clone)]
pub struct ReplaceCall {
    pub replaced: String,
    pub replacement: String,
    pub backup: Option<String>,
    pub flags: u32,
}

#[derive(Debug, Clone)]
pub enum SecurityCall {
    Named(String, u32),
    Handle(RawHandle, u32),
}

#[derive(Default)]
pub struct SimDevice {
    next_handle: AtomicIsize,
    pub opens: Mutex<Vec<OpenCall>>,
    pub closes: Mutex<Vec<RawHandle>>,
    pub controls: Mutex<Vec<ControlCall>>,
    pub replaces: Mutex<Vec<ReplaceCall>>,
    pub security_calls: Mutex<Vec<SecurityCall>>,
    responses: Mutex<HashMap<u32, Response>>,
    open_failure: Mutex<Option<u32>>,
    open_sentinel: Mutex<Option<RawHandle>>,
    close_failure: Mutex<Option<u32>>,
    replace_failure: Mutex<Option<u32>>,
    descriptor: Mutex<Option<Result<Vec<u8>, u32>>>,
}

impl SimDevice {
    pub fn new() -> Self {
        Self {
            next_handle: AtomicIsize::new(0x100),
            ..Self::default()
        }
    }

    pub fn respond(&self, code: u32, response: Response) -> &Self {
        self.responses.lock().unwrap().insert(code, response);
        self
    }

    pub fn fail_opens(&self, code: u32) -> &Self {
        *self.open_failure.lock().unwrap() = Some(code);
        self
    }

    /// Report success but hand back a sentinel value.
    pub fn open_returns(&self, raw: RawHandle) -> &Self {
        *self.open_sentinel.lock().unwrap() = Some(raw);
        self
    }

    pub fn fail_closes(&self, code: u32) -> &Self {
        *self.close_failure.lock().unwrap() = Some(code);
        self
    }

    pub fn fail_replace(&self, code: u32) -> &Self {
        *self.replace_failure.lock().unwrap() = Some(code);
        self
    }

    pub fn with_descriptor(&self, bytes: Vec<u8>) -> &Self {
        *self.descriptor.lock().unwrap() = Some(Ok(bytes));
        self
    }

    pub fn fail_descriptor(&self, code: u32) -> &Self {
        *self.descriptor.lock().unwrap() = Some(Err(code));
        self
    }

    pub fn open_count(&self) -> usize {
        self.opens.lock().unwrap().len()
    }

    pub fn close_count(&self) -> usize {
        self.closes.lock().unwrap().len()
    }

    pub fn control_count(&self) -> usize {
        self.controls.lock().unwrap().len()
    }

    pub fn output_sizes(&self) -> Vec<usize> {
        self.controls
            .lock()
            .unwrap()
            .iter()
            .map(|c| c.output_len)
            .collect()
    }

    /// Every handle that was opened has been closed exactly once.
    pub fn all_closed(&self) -> bool {
        let opened = self.open_count();
        let mut closed = self.closes.lock().unwrap().clone();
        closed.sort_by_key(|h| h.0);
        closed.dedup();
        closed.len() == opened && self.close_count() == opened
    }
}

impl NativeApi for SimDevice {
    fn open_handle(
        &self,
        path: &ExtendedPath,
        request: &OpenRequest,
        transaction: RawHandle,
    ) -> Result<RawHandle, u32> {
        if let Some(code) = *self.open_failure.lock().unwrap() {
            return Err(code);
        }
        if let Some(raw) = *self.open_sentinel.lock().unwrap() {
            return Ok(raw);
        }
        self.opens.lock().unwrap().push(OpenCall {
            path: path.as_str().to_string(),
            request: *request,
            transaction,
        });
        Ok(RawHandle(self.next_handle.fetch_add(4, Ordering::SeqCst)))
    }

    fn device_control(
        &self,
        handle: RawHandle,
        code: u32,
        _input: Option<&[u8]>,
        output: &mut [u8],
    ) -> Result<usize, u32> {
        self.controls.lock().unwrap().push(ControlCall {
            handle,
            code,
            output_len: output.len(),
        });
        let response = self.responses.lock().unwrap().get(&code).cloned();
        match response {
            None => Err(ERROR_INVALID_FUNCTION),
            Some(Response::Fail(e)) => Err(e),
            Some(Response::AlwaysInsufficient(e)) => Err(e),
            Some(Response::Data(bytes)) => {
                if output.len() < bytes.len() {
                    return Err(ERROR_INSUFFICIENT_BUFFER);
                }
                output[..bytes.len()].copy_from_slice(&bytes);
                Ok(bytes.len())
            }
        }
    }

    fn replace_file(
        &self,
        replaced: &ExtendedPath,
        replacement: &ExtendedPath,
        backup: Option<&ExtendedPath>,
        flags: u32,
    ) -> Result<(), u32> {
        self.replaces.lock().unwrap().push(ReplaceCall {
            replaced: replaced.as_str().to_string(),
            replacement: replacement.as_str().to_string(),
            backup: backup.map(|b| b.as_str().to_string()),
            flags,
        });
        match *self.replace_failure.lock().unwrap() {
            Some(code) => Err(code),
            None => Ok(()),
        }
    }

    fn get_security_descriptor(
        &self,
        target: SecurityTarget<'_>,
        information: u32,
    ) -> Result<SafeBuffer, u32> {
        let call = match target {
            SecurityTarget::Named(p) => SecurityCall::Named(p.as_str().to_string(), information),
            SecurityTarget::Handle(h) => SecurityCall::Handle(h, information),
        };
        self.security_calls.lock().unwrap().push(call);
        match self.descriptor.lock().unwrap().clone() {
            Some(Ok(bytes)) => Ok(SafeBuffer::from_bytes(&bytes)),
            Some(Err(code)) => Err(code),
            None => Err(ERROR_FILE_NOT_FOUND),
        }
    }

    fn close_handle(&self, handle: RawHandle) -> Result<(), u32> {
        self.closes.lock().unwrap().push(handle);
        match *self.close_failure.lock().unwrap() {
            Some(code) => Err(code),
            None => Ok(()),
        }
    }
}
