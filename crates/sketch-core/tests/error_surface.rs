use sketch_core::errors::{ErrorInfo, SketchError};

fn sample_info(code: &str, message: &str) -> ErrorInfo {
    ErrorInfo::new(code, message)
        .with_context("block", "C")
        .with_context("reason", "example")
}

#[test]
fn config_error_surface() {
    let err = SketchError::Config(sample_info("unknown-strategy", "no such strategy"));
    assert_eq!(err.info().code, "unknown-strategy");
    assert!(err.info().context.contains_key("block"));
    assert!(err.is_config());
    assert!(!err.is_contract());
}

#[test]
fn contract_error_surface() {
    let err = SketchError::Contract(sample_info("index-out-of-range", "bad index"));
    assert_eq!(err.info().code, "index-out-of-range");
    assert!(err.is_contract());
}

#[test]
fn schedule_error_surface() {
    let err = SketchError::Schedule(sample_info("unknown-block", "missing block"));
    assert_eq!(err.info().code, "unknown-block");
}

#[test]
fn rng_error_surface() {
    let err = SketchError::Rng(sample_info("negative-seed", "invalid seed"));
    assert_eq!(err.info().code, "negative-seed");
}

#[test]
fn display_renders_context_and_hint() {
    let err = SketchError::Serde(sample_info("S001", "schema mismatch").with_hint("re-export"));
    let rendered = err.to_string();
    assert!(rendered.starts_with("serde error: schema mismatch (code: S001)"));
    assert!(rendered.contains("block=C, reason=example"));
    assert!(rendered.ends_with("hint: re-export"));
}
