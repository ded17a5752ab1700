//! Package names of the form `type://tenant/namespace/name[@version]`.
//!
//! A `PackageName` is immutable once parsed and determines exactly one REST
//! path on the admin service.

use std::fmt;
use std::str::FromStr;
use thiserror::Error;

/// Version used in REST paths when the package name carries none
pub const LATEST_VERSION: &str = "latest";

/// Kind of package stored by the service
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum PackageType {
    Function,
    Sink,
    Source,
    /// Any other well-formed type token, passed through to the server as-is
    Other(String),
}

/// Namespace a package lives in (`tenant/namespace`)
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct NamespaceName {
    tenant: String,
    namespace: String,
}

/// Fully parsed package name
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct PackageName {
    package_type: PackageType,
    namespace: NamespaceName,
    name: String,
    version: Option<String>,
}

/// Package name parsing errors
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum PackageNameError {
    #[error("missing '://' after the package type")]
    MissingScheme { input: String },

    #[error("invalid package type '{package_type}'")]
    InvalidType { input: String, package_type: String },

    #[error("expected tenant/namespace/name after the package type")]
    InvalidStructure { input: String },

    #[error("more than one '@' version separator")]
    InvalidVersion { input: String },

    #[error("invalid character in {component} '{value}'")]
    InvalidNamespace {
        input: String,
        component: &'static str,
        value: String,
    },

    #[error("{component} '{value}' is not a valid path segment")]
    InvalidSegment {
        input: String,
        component: &'static str,
        value: String,
    },
}

impl PackageNameError {
    /// The string that failed to parse
    pub fn input(&self) -> &str {
        match self {
            PackageNameError::MissingScheme { input }
            | PackageNameError::InvalidType { input, .. }
            | PackageNameError::InvalidStructure { input }
            | PackageNameError::InvalidVersion { input }
            | PackageNameError::InvalidNamespace { input, .. }
            | PackageNameError::InvalidSegment { input, .. } => input,
        }
    }
}

impl PackageType {
    /// Wire representation used in REST paths
    pub fn as_str(&self) -> &str {
        match self {
            PackageType::Function => "function",
            PackageType::Sink => "sink",
            PackageType::Source => "source",
            PackageType::Other(value) => value,
        }
    }

    fn is_valid_token(token: &str) -> bool {
        !token.is_empty()
            && token
                .chars()
                .all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_')
    }
}

impl FromStr for PackageType {
    type Err = PackageNameError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        if !Self::is_valid_token(s) {
            return Err(PackageNameError::InvalidType {
                input: s.to_string(),
                package_type: s.to_string(),
            });
        }

        let package_type = match s.to_ascii_lowercase().as_str() {
            "function" => PackageType::Function,
            "sink" => PackageType::Sink,
            "source" => PackageType::Source,
            _ => PackageType::Other(s.to_string()),
        };
        Ok(package_type)
    }
}

impl fmt::Display for PackageType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl NamespaceName {
    /// Create a namespace name, validating both components
    pub fn new(tenant: &str, namespace: &str) -> Result<Self, PackageNameError> {
        let input = format!("{}/{}", tenant, namespace);
        check_component(&input, "tenant", tenant)?;
        check_component(&input, "namespace", namespace)?;
        Ok(Self {
            tenant: tenant.to_string(),
            namespace: namespace.to_string(),
        })
    }

    pub fn tenant(&self) -> &str {
        &self.tenant
    }

    /// Namespace without the tenant prefix
    pub fn local_name(&self) -> &str {
        &self.namespace
    }
}

impl FromStr for NamespaceName {
    type Err = PackageNameError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let input = s.trim();
        match input.split('/').collect::<Vec<_>>().as_slice() {
            [tenant, namespace] if !tenant.is_empty() && !namespace.is_empty() => {
                Self::new(tenant, namespace)
            },
            _ => Err(PackageNameError::InvalidStructure {
                input: input.to_string(),
            }),
        }
    }
}

impl fmt::Display for NamespaceName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.tenant, self.namespace)
    }
}

impl PackageName {
    pub fn package_type(&self) -> &PackageType {
        &self.package_type
    }

    pub fn tenant(&self) -> &str {
        self.namespace.tenant()
    }

    pub fn namespace(&self) -> &str {
        self.namespace.local_name()
    }

    pub fn namespace_name(&self) -> &NamespaceName {
        &self.namespace
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// Version used for REST paths (`latest` when none was given)
    pub fn version(&self) -> &str {
        self.version.as_deref().unwrap_or(LATEST_VERSION)
    }

    /// Version exactly as written in the package name
    pub fn explicit_version(&self) -> Option<&str> {
        self.version.as_deref()
    }

    /// Name without the version, e.g. `function://public/default/echo`
    pub fn complete_name(&self) -> String {
        format!("{}://{}/{}", self.package_type, self.namespace, self.name)
    }

    /// Path components in REST order: type, tenant, namespace, name, version.
    ///
    /// None of them is empty, `.`, `..` or contains `/`.
    pub fn segments(&self) -> [&str; 5] {
        [
            self.package_type.as_str(),
            self.tenant(),
            self.namespace(),
            &self.name,
            self.version(),
        ]
    }

    /// REST path of this exact package version:
    /// `{type}/{tenant}/{namespace}/{name}/{version}`
    pub fn rest_path(&self) -> String {
        self.segments().join("/")
    }
}

impl FromStr for PackageName {
    type Err = PackageNameError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let input = s.trim();

        let (type_part, rest) = input
            .split_once("://")
            .ok_or_else(|| PackageNameError::MissingScheme {
                input: input.to_string(),
            })?;

        let package_type = type_part.parse::<PackageType>().map_err(|_| {
            PackageNameError::InvalidType {
                input: input.to_string(),
                package_type: type_part.to_string(),
            }
        })?;

        // Split off the version; "name@" means the same as no version
        let (path_part, version) = match rest.split_once('@') {
            Some((_, v)) if v.contains('@') => {
                return Err(PackageNameError::InvalidVersion {
                    input: input.to_string(),
                });
            },
            Some((p, v)) if !v.is_empty() => (p, Some(v.to_string())),
            Some((p, _)) => (p, None),
            None => (rest, None),
        };

        let parts: Vec<&str> = path_part.split('/').collect();
        let (tenant, namespace, name) = match parts.as_slice() {
            [tenant, namespace, name]
                if !tenant.is_empty() && !namespace.is_empty() && !name.is_empty() =>
            {
                (*tenant, *namespace, *name)
            },
            _ => {
                return Err(PackageNameError::InvalidStructure {
                    input: input.to_string(),
                });
            },
        };

        check_component(input, "tenant", tenant)?;
        check_component(input, "namespace", namespace)?;
        check_segment(input, "name", name)?;
        if let Some(version) = &version {
            check_segment(input, "version", version)?;
        }

        Ok(Self {
            package_type,
            namespace: NamespaceName {
                tenant: tenant.to_string(),
                namespace: namespace.to_string(),
            },
            name: name.to_string(),
            version,
        })
    }
}

impl fmt::Display for PackageName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}@{}", self.complete_name(), self.version())
    }
}

/// Tenants and namespaces may only contain `[-=:.\w]`
fn check_component(input: &str, component: &'static str, value: &str) -> Result<(), PackageNameError> {
    check_segment(input, component, value)?;
    let valid = !value.is_empty()
        && value
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || matches!(c, '_' | '-' | '=' | ':' | '.'));
    if valid {
        Ok(())
    } else {
        Err(PackageNameError::InvalidNamespace {
            input: input.to_string(),
            component,
            value: value.to_string(),
        })
    }
}

/// A component must stay exactly one REST path segment
fn check_segment(input: &str, component: &'static str, value: &str) -> Result<(), PackageNameError> {
    if value.is_empty() || value == "." || value == ".." || value.contains('/') {
        return Err(PackageNameError::InvalidSegment {
            input: input.to_string(),
            component,
            value: value.to_string(),
        });
    }
    Ok(())
}
