//! Framework version metadata.

/// Major version.
pub const MAJOR: u32 = 0;
/// Minor version.
pub const MINOR: u32 = 1;
/// Patch version.
pub const PATCH: u32 = 0;
/// Whether this is an unreleased edge build.
pub const EDGE: bool = false;

/// The version label, e.g. `0.1.0` or `0.1.0.edge`.
pub fn label() -> String {
    let mut label = format!("{MAJOR}.{MINOR}.{PATCH}");
    if EDGE {
        label.push_str(".edge");
    }
    label
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_label_matches_package_version() {
        if !EDGE {
            assert_eq!(label(), env!("CARGO_PKG_VERSION"));
        }
    }
}
