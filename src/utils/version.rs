//! Lenient component version parsing.

use semver::Version;

/// Parse a component version.
///
/// Accepts strict semver as well as OSGi-style versions: missing minor or
/// micro segments default to 0 and a fourth `qualifier` segment is dropped.
pub fn parse_version(raw: &str) -> Option<Version> {
    let raw = raw.trim();
    if let Ok(version) = Version::parse(raw) {
        return Some(version);
    }
    let mut numbers = [0u64; 3];
    let mut segments = raw.split('.');
    for (idx, slot) in numbers.iter_mut().enumerate() {
        match segments.next() {
            Some(segment) => *slot = segment.parse().ok()?,
            None if idx > 0 => break,
            None => return None,
        }
    }
    Some(Version::new(numbers[0], numbers[1], numbers[2]))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_osgi_versions() {
        assert_eq!(parse_version("3.18.100.v20240101"), Some(Version::new(3, 18, 100)));
        assert_eq!(parse_version("2.1"), Some(Version::new(2, 1, 0)));
        assert_eq!(parse_version("4"), Some(Version::new(4, 0, 0)));
        assert_eq!(parse_version("x.y"), None);
        assert_eq!(parse_version(""), None);
    }
}
