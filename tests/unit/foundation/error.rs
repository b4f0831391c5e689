use super::*;

#[test]
fn display_prefixes_are_stable() {
    assert!(
        CoverError::validation("x")
            .to_string()
            .contains("validation error:")
    );
    assert!(CoverError::asset("x").to_string().contains("asset error:"));
    assert!(CoverError::render("x").to_string().contains("render error:"));
    assert!(
        CoverError::serde("x")
            .to_string()
            .contains("serialization error:")
    );
    assert!(
        CoverError::delivery("x")
            .to_string()
            .contains("delivery failed:")
    );
}

#[test]
fn other_preserves_source() {
    let base = std::io::Error::other("boom");
    let err = CoverError::Other(anyhow::Error::new(base));
    assert!(err.to_string().contains("boom"));
}
