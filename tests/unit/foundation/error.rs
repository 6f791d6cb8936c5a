use super::*;

#[test]
fn display_prefixes_are_stable() {
    assert!(
        MathplotError::validation("x")
            .to_string()
            .contains("validation error:")
    );
    assert!(
        MathplotError::backend("x")
            .to_string()
            .contains("backend error:")
    );
    assert!(MathplotError::style("x").to_string().contains("style error:"));
    assert!(
        MathplotError::serde("x")
            .to_string()
            .contains("serialization error:")
    );
}

#[test]
fn other_preserves_source() {
    let base = std::io::Error::other("boom");
    let err = MathplotError::Other(anyhow::Error::new(base));
    assert!(err.to_string().contains("boom"));
}
