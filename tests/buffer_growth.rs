//! Growable device-control queries against the simulated device.

mod common;

use byteorder::{ByteOrder, LittleEndian};
use common::{Response, SimDevice, ERROR_ACCESS_DENIED, ERROR_INSUFFICIENT_BUFFER, ERROR_MORE_DATA};
use ntinterop::ioctl::{invoke, GrowthPolicy, IoControlCode};
use ntinterop::{ErrorKind, FixedLayout, InteropError, RawHandle, SafeHandle};

const LABEL: &str = r"\\.\PhysicalDrive0";
const CODE: IoControlCode = IoControlCode::Raw(0x0022_2000);

/// Count-prefixed header used by the variable-size replies below.
struct Header {
    count: u32,
    flags: u32,
}

impl FixedLayout for Header {
    const SIZE: usize = 8;

    fn decode(b: &[u8]) -> Self {
        Self {
            count: LittleEndian::read_u32(&b[0..4]),
            flags: LittleEndian::read_u32(&b[4..8]),
        }
    }

    fn encode(&self, out: &mut [u8]) {
        LittleEndian::write_u32(&mut out[0..4], self.count);
        LittleEndian::write_u32(&mut out[4..8], self.flags);
    }
}

fn reply(len: usize) -> Vec<u8> {
    let mut bytes = vec![0xAB; len];
    Header {
        count: 63,
        flags: 0x11,
    }
    .encode(&mut bytes[..Header::SIZE]);
    bytes
}

#[test]
fn doubles_until_the_reply_fits() {
    let sim = SimDevice::new();
    sim.respond(CODE.value(), Response::Data(reply(513)));
    let handle = SafeHandle::new(&sim, RawHandle(0x40), LABEL);

    let buffer = invoke(&handle, CODE, None, GrowthPolicy::new(64, 8)).expect("invoke");

    assert_eq!(sim.output_sizes(), vec![64, 128, 256, 512, 1024]);
    assert_eq!(buffer.len(), 513, "valid length is what the device wrote");
    assert_eq!(buffer.capacity(), 1024);
    let header: Header = buffer.read_struct(0).unwrap();
    assert_eq!(header.count, 63);
    assert_eq!(header.flags, 0x11);
    assert_eq!(buffer.read_u8(512).unwrap(), 0xAB);
}

#[test]
fn reads_past_the_returned_length_are_refused() {
    let sim = SimDevice::new();
    sim.respond(CODE.value(), Response::Data(reply(513)));
    let handle = SafeHandle::new(&sim, RawHandle(0x40), LABEL);
    let buffer = invoke(&handle, CODE, None, GrowthPolicy::new(64, 8)).unwrap();

    match buffer.read_u32(510).unwrap_err() {
        InteropError::InvalidBufferAccess { offset, size, len } => {
            assert_eq!((offset, size, len), (510, 4, 513));
        }
        other => panic!("unexpected {other:?}"),
    }
}

#[test]
fn first_attempt_large_enough_is_a_single_call() {
    let sim = SimDevice::new();
    sim.respond(CODE.value(), Response::Data(reply(24)));
    let handle = SafeHandle::new(&sim, RawHandle(0x40), LABEL);

    let buffer = invoke(&handle, CODE, None, GrowthPolicy::new(512, 8)).unwrap();
    assert_eq!(sim.control_count(), 1);
    assert_eq!(buffer.len(), 24);
}

#[test]
fn gives_up_after_max_attempts() {
    let sim = SimDevice::new();
    sim.respond(CODE.value(), Response::AlwaysInsufficient(ERROR_MORE_DATA));
    let handle = SafeHandle::new(&sim, RawHandle(0x40), LABEL);

    let err = invoke(&handle, CODE, None, GrowthPolicy::new(64, 4)).unwrap_err();
    assert_eq!(sim.control_count(), 4);
    match err {
        InteropError::BufferExhausted {
            path,
            attempts,
            last_size,
        } => {
            assert_eq!(path, LABEL);
            assert_eq!(attempts, 4);
            assert_eq!(last_size, 512);
        }
        other => panic!("unexpected {other:?}"),
    }
}

#[test]
fn single_attempt_policy_never_retries() {
    let sim = SimDevice::new();
    sim.respond(CODE.value(), Response::AlwaysInsufficient(ERROR_INSUFFICIENT_BUFFER));
    let handle = SafeHandle::new(&sim, RawHandle(0x40), LABEL);

    let err = invoke(&handle, CODE, None, GrowthPolicy::new(64, 1)).unwrap_err();
    assert_eq!(err.kind(), ErrorKind::BufferExhausted);
    assert_eq!(sim.control_count(), 1);
}

#[test]
fn other_failures_are_not_retried() {
    let sim = SimDevice::new();
    sim.respond(CODE.value(), Response::Fail(ERROR_ACCESS_DENIED));
    let handle = SafeHandle::new(&sim, RawHandle(0x40), LABEL);

    let err = invoke(&handle, CODE, None, GrowthPolicy::default()).unwrap_err();
    assert_eq!(sim.control_count(), 1);
    assert_eq!(err.kind(), ErrorKind::AccessDenied);
    assert_eq!(err.path(), Some(LABEL));
    assert_eq!(err.native_code(), Some(ERROR_ACCESS_DENIED));
}

#[test]
fn header_policy_starts_at_four_headers() {
    let policy = GrowthPolicy::for_layout::<Header>();
    assert_eq!(policy.initial_size, 4 * Header::SIZE);
}
