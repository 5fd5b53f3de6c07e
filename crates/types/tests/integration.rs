//! Integration tests for shared types

use vintner_types::{Arch, BuildRequest, Variant, WineVersion};

#[test]
fn default_request_is_dual_arch_native() {
    let req = BuildRequest::new(Variant::Mainline, None);
    assert_eq!(req.architectures, vec![Arch::X86, Arch::X86_64]);
    assert!(req.cross_compile_prefix.is_none());
    assert!(!req.enable_tests);
    assert!(!req.enable_mscoree);
}

#[test]
fn version_serde_roundtrip() {
    let v: WineVersion = "1.7.20".parse().unwrap();
    let json = serde_json::to_string(&v).unwrap();
    assert_eq!(json, "\"1.7.20\"");
    let back: WineVersion = serde_json::from_str(&json).unwrap();
    assert_eq!(back, v);
}

#[test]
fn version_eq_and_ord_agree_on_missing_patch() {
    let short: WineVersion = "1.7".parse().unwrap();
    let long: WineVersion = "1.7.0".parse().unwrap();
    assert_eq!(short, long);
    assert_eq!(short.cmp(&long), std::cmp::Ordering::Equal);
    // display still preserves the component count
    assert_eq!(short.to_string(), "1.7");
    assert_eq!(long.to_string(), "1.7.0");
}

#[test]
fn fixup_range_style_comparisons() {
    // the shape of the version-gated fixup windows: start <= v < end
    let v: WineVersion = "1.5.10".parse().unwrap();
    let lo: WineVersion = "1.4".parse().unwrap();
    let hi: WineVersion = "1.7.0".parse().unwrap();
    assert!(lo <= v && v < hi);
}
