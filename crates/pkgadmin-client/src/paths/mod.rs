//! Path resolution for the packages admin REST surface.
//!
//! Paths are relative to `admin/v3/packages` and are turned into full URLs
//! with [`endpoint`].

use url::Url;

use pkgadmin_core::{AdminResult, NamespaceName, PackageName, PackageType};

use crate::errors;

/// Base path of the packages admin API
pub const PACKAGES_BASE_PATH: &str = "admin/v3/packages";

/// Suffix addressing the metadata document of a package version
pub const METADATA_SUFFIX: &str = "metadata";

/// Parse a package name; malformed names never reach the network
pub fn resolve(package_name: &str) -> AdminResult<PackageName> {
    package_name.parse::<PackageName>().map_err(errors::malformed)
}

/// `{type}/{tenant}/{namespace}/{name}/{version}[/{suffix}]`
pub fn to_path(name: &PackageName, suffix: Option<&str>) -> String {
    let mut segments = name.segments().to_vec();
    segments.extend(suffix);
    segments.join("/")
}

/// `{type}/{tenant}/{namespace}/{name}`, the version collection of a package
pub fn versions_path(name: &PackageName) -> String {
    name.segments()[..4].join("/")
}

/// `{type}/{tenant}/{namespace}`, the packages of one type in a namespace
pub fn packages_path(package_type: &str, namespace: &str) -> AdminResult<String> {
    let package_type: PackageType = package_type.parse().map_err(errors::malformed)?;
    let namespace: NamespaceName = namespace.parse().map_err(errors::malformed)?;
    Ok(format!("{}/{}", package_type, namespace))
}

/// Full URL of `path` under the packages API of `base`.
///
/// Each `/`-separated component becomes one percent-encoded segment. Empty,
/// `.` and `..` components are rejected rather than normalized away, so a
/// path always addresses the resource it names.
pub fn endpoint(base: &Url, path: &str) -> AdminResult<Url> {
    let components: Vec<&str> = path.split('/').collect();
    if components.iter().any(|c| c.is_empty() || *c == "." || *c == "..") {
        return Err(errors::invalid_request(format!(
            "Path '{}' contains an empty or relative segment",
            path
        )));
    }

    let mut url = base.clone();
    {
        let mut segments = url.path_segments_mut().map_err(|_| {
            errors::invalid_request(format!("Service URL '{}' cannot be used as a base", base))
        })?;
        segments
            .pop_if_empty()
            .extend(PACKAGES_BASE_PATH.split('/'))
            .extend(components);
    }
    url.set_query(None);
    url.set_fragment(None);
    Ok(url)
}
