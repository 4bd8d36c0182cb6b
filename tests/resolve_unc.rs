//! Network (`\\server\share`) paths.

use ntinterop::path::LEGACY_THRESHOLD;
use ntinterop::{resolve, ErrorKind, PathFormat, PathKind};

fn full(raw: &str) -> ntinterop::Result<ntinterop::ExtendedPath> {
    resolve(raw, PathFormat::FullPath, false)
}

#[test]
fn short_unc_path_keeps_legacy_form() {
    let p = full(r"\\fileserver\public\reports\q3.xlsx").unwrap();
    assert_eq!(p.as_str(), r"\\fileserver\public\reports\q3.xlsx");
    assert_eq!(p.kind(), PathKind::Unc);
}

#[test]
fn share_root_has_no_trailing_separator() {
    assert_eq!(full(r"\\srv\share\").unwrap().as_str(), r"\\srv\share");
    assert_eq!(full(r"\\srv\share").unwrap().as_str(), r"\\srv\share");
}

#[test]
fn forward_slashes_and_dots() {
    let p = full("//srv/share/a/./b/../c").unwrap();
    assert_eq!(p.as_str(), r"\\srv\share\a\c");
}

#[test]
fn parent_segments_never_climb_above_the_share() {
    assert_eq!(full(r"\\srv\share\..\..\x").unwrap().as_str(), r"\\srv\share\x");
}

#[test]
fn long_unc_path_uses_the_unc_prefix() {
    let tail = "d".repeat(LEGACY_THRESHOLD);
    let p = full(&format!(r"\\srv\share\{tail}")).unwrap();
    assert_eq!(p.as_str(), format!(r"\\?\UNC\srv\share\{tail}"));
    assert_eq!(p.kind(), PathKind::Unc);
    assert_eq!(p.to_regular_path(), format!(r"\\srv\share\{tail}"));
}

#[test]
fn reserved_name_on_share_is_prefixed() {
    assert_eq!(
        full(r"\\srv\share\AUX").unwrap().as_str(),
        r"\\?\UNC\srv\share\AUX"
    );
}

#[test]
fn prefixed_unc_input_is_kept() {
    let p = full(r"\\?\UNC\srv\share\dir\").unwrap();
    assert_eq!(p.as_str(), r"\\?\UNC\srv\share\dir");
    assert_eq!(p.kind(), PathKind::Unc);
}

#[test]
fn missing_share_is_rejected() {
    for raw in [r"\\srv", r"\\srv\", r"\\?\UNC\srv"] {
        let err = full(raw).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::InvalidPath, "{raw}");
        assert_eq!(err.path(), Some(raw));
    }
}

#[test]
fn illegal_characters_in_server_or_share() {
    assert!(full(r"\\srv*\share").is_err());
    assert!(full(r"\\srv\sh|are\x").is_err());
}

#[test]
fn network_paths_refused_under_a_transaction() {
    for raw in [r"\\srv\share\x", r"\\?\UNC\srv\share\x"] {
        let err = resolve(raw, PathFormat::FullPath, true).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::InvalidPath);
        assert!(format!("{err}").contains("transaction"), "{err}");
    }
    // Local paths are fine.
    assert!(resolve(r"C:\x", PathFormat::FullPath, true).is_ok());
}
