//! Dotted definition names and their storage-relative paths.

use url::Url;

/// Namespace prefix of a dotted name, `None` for the unnamed package.
pub fn package_of(name: &str) -> Option<&str> {
    name.rfind('.').map(|idx| &name[..idx]).filter(|p| !p.is_empty())
}

/// Directory-style path of a package, with a trailing slash (`a.b` -> `a/b/`).
///
/// This is also the key of the package's per-entry manifest section.
pub fn package_path(package: &str) -> String {
    let mut path = package.replace('.', "/");
    path.push('/');
    path
}

/// Storage-relative path for a name when the format has no opinion (`a.b.C` -> `a/b/C`).
pub fn default_resource_path(name: &str) -> String {
    name.replace('.', "/")
}

/// Whether a resource path stays inside the root it is resolved against.
///
/// Rejects empty paths, absolute paths, backslashes and `.`/`..` segments.
pub fn is_safe_resource_path(path: &str) -> bool {
    if path.is_empty() || path.starts_with('/') || path.contains('\\') {
        return false;
    }
    path.split('/')
        .all(|segment| !segment.is_empty() && segment != "." && segment != "..")
}

/// Origins served from the local file system skip the `ReachOrigin` check.
pub fn is_local_origin(url: &Url) -> bool {
    url.scheme() == "file"
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_package_of() {
        assert_eq!(package_of("ivonet.ClassInClass"), Some("ivonet"));
        assert_eq!(package_of("nl.ivonet.classloader.Main"), Some("nl.ivonet.classloader"));
        assert_eq!(package_of("Standalone"), None);
        assert_eq!(package_of(".Weird"), None);
    }

    #[test]
    fn test_paths() {
        assert_eq!(package_path("nl.ivonet"), "nl/ivonet/");
        assert_eq!(default_resource_path("nl.ivonet.Main"), "nl/ivonet/Main");
    }

    #[test]
    fn test_safe_paths() {
        assert!(is_safe_resource_path("ivonet/IvoNet.class"));
        assert!(is_safe_resource_path("META-INF/MANIFEST.MF"));
        assert!(!is_safe_resource_path(""));
        assert!(!is_safe_resource_path("/etc/passwd"));
        assert!(!is_safe_resource_path("ivonet/../../secret"));
        assert!(!is_safe_resource_path("ivonet//IvoNet.class"));
        assert!(!is_safe_resource_path("ivonet\\IvoNet.class"));
    }

    #[test]
    fn test_local_origin() {
        assert!(is_local_origin(&Url::parse("file:///tmp/a.jar").unwrap()));
        assert!(!is_local_origin(&Url::parse("https://example.org/a.jar").unwrap()));
    }
}
