use super::*;

#[test]
fn display_prefixes_are_stable() {
    assert!(
        PipevizError::config("x")
            .to_string()
            .contains("configuration error:")
    );
    assert!(PipevizError::asset("x").to_string().contains("asset error:"));
    assert!(
        PipevizError::render("x")
            .to_string()
            .contains("render error:")
    );
    assert!(
        PipevizError::serde("x")
            .to_string()
            .contains("serialization error:")
    );
}

#[test]
fn other_preserves_source() {
    let base = std::io::Error::other("boom");
    let err = PipevizError::Other(anyhow::Error::new(base));
    assert!(err.to_string().contains("boom"));
}
