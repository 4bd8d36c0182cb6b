//! Inputs the resolver must refuse before anything reaches the OS.

use ntinterop::path::MAX_EXTENDED_PATH;
use ntinterop::{device_path, resolve, resolve_with_base, ErrorKind, InteropError, PathFormat};

fn kind_of(raw: &str) -> ErrorKind {
    resolve(raw, PathFormat::FullPath, false)
        .expect_err(raw)
        .kind()
}

#[test]
fn empty_and_blank_input() {
    assert_eq!(kind_of(""), ErrorKind::InvalidPath);
    assert_eq!(kind_of("   "), ErrorKind::InvalidPath);
}

#[test]
fn embedded_nul() {
    let err = resolve("C:\\a\0b", PathFormat::FullPath, false).unwrap_err();
    assert_eq!(err.kind(), ErrorKind::InvalidPath);
    assert!(format!("{err}").contains("NUL"));
}

#[test]
fn embedded_nul_rejected_even_verbatim() {
    let err = resolve("\\\\?\\C:\\a\0", PathFormat::LongFullPath, false).unwrap_err();
    assert_eq!(err.kind(), ErrorKind::InvalidPath);
}

#[test]
fn wildcard_and_redirection_characters() {
    for raw in [r"C:\a<b", r"C:\a>b", r"C:\a|b", r"C:\a*", r"C:\a?", r#"C:\"quoted""#] {
        assert_eq!(kind_of(raw), ErrorKind::InvalidPath, "{raw}");
    }
}

#[test]
fn control_characters() {
    assert_eq!(kind_of("C:\\tab\there"), ErrorKind::InvalidPath);
    assert_eq!(kind_of("C:\\x\u{1}"), ErrorKind::InvalidPath);
}

#[test]
fn colon_outside_the_drive_designator() {
    assert_eq!(kind_of(r"C:\dir\file:stream"), ErrorKind::InvalidPath);
}

#[test]
fn full_path_format_requires_an_absolute_path() {
    let err = resolve(r"dir\file", PathFormat::FullPath, false).unwrap_err();
    assert!(format!("{err}").contains("not absolute"), "{err}");
}

#[test]
fn relative_base_must_be_a_windows_path() {
    let err = resolve_with_base("a", PathFormat::RelativePath, false, "/home/user").unwrap_err();
    assert_eq!(err.kind(), ErrorKind::InvalidPath);
}

#[test]
fn prefixed_drive_without_separator() {
    assert_eq!(kind_of(r"\\?\C:x"), ErrorKind::InvalidPath);
    assert_eq!(kind_of(r"\\?\"), ErrorKind::InvalidPath);
}

#[test]
fn over_the_extended_ceiling() {
    let raw = format!(r"C:\{}", "a\\".repeat(MAX_EXTENDED_PATH / 2));
    match resolve(&raw, PathFormat::FullPath, false).unwrap_err() {
        InteropError::PathTooLong {
            path,
            length,
            ceiling,
        } => {
            assert_eq!(path, raw);
            assert!(length > ceiling);
            assert_eq!(ceiling, MAX_EXTENDED_PATH);
        }
        other => panic!("expected PathTooLong, got {other:?}"),
    }
}

#[test]
fn errors_name_the_caller_input() {
    let raw = "C:/bad|name";
    let err = resolve(raw, PathFormat::FullPath, false).unwrap_err();
    assert_eq!(err.path(), Some(raw));
}

#[test]
fn device_designators_outside_the_accepted_shapes() {
    for raw in ["", r"C:\Windows", r"\\?\C:\x", "PhysicalDrive", r"\\.\", "disk0"] {
        let err = device_path(raw).expect_err(raw);
        assert_eq!(err.kind(), ErrorKind::InvalidPath, "{raw}");
    }
}
