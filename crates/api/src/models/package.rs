use super::manifest::{self, Manifest};
use super::naming;
use url::Url;

/// Version attributes of a package, all optional.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PackageVersion {
    pub spec_title: Option<String>,
    pub spec_version: Option<String>,
    pub spec_vendor: Option<String>,
    pub impl_title: Option<String>,
    pub impl_version: Option<String>,
    pub impl_vendor: Option<String>,
}

impl PackageVersion {
    /// Per-entry section values win over main-section values.
    pub fn from_manifest(manifest: &Manifest, package_path: &str) -> Self {
        let get = |key: &str| manifest.effective(package_path, key).map(str::to_string);
        Self {
            spec_title: get(manifest::SPECIFICATION_TITLE),
            spec_version: get(manifest::SPECIFICATION_VERSION),
            spec_vendor: get(manifest::SPECIFICATION_VENDOR),
            impl_title: get(manifest::IMPLEMENTATION_TITLE),
            impl_version: get(manifest::IMPLEMENTATION_VERSION),
            impl_vendor: get(manifest::IMPLEMENTATION_VENDOR),
        }
    }
}

/// Namespace metadata recorded by one loader.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Package {
    name: String,
    version: PackageVersion,
    origin: Url,
    seal_base: Option<Url>,
}

impl Package {
    /// Define a package from the first resource seen for it.
    ///
    /// A resource without a manifest yields an unsealed package with no
    /// version attributes.
    pub fn define(name: &str, manifest: Option<&Manifest>, origin: &Url) -> Self {
        let path = naming::package_path(name);
        let (version, sealed) = match manifest {
            Some(man) => (PackageVersion::from_manifest(man, &path), man.is_sealed(&path)),
            None => (PackageVersion::default(), false),
        };
        Self {
            name: name.to_string(),
            version,
            origin: origin.clone(),
            seal_base: sealed.then(|| origin.clone()),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn version(&self) -> &PackageVersion {
        &self.version
    }

    /// Location the package was first defined from.
    pub fn origin(&self) -> &Url {
        &self.origin
    }

    pub fn seal_base(&self) -> Option<&Url> {
        self.seal_base.as_ref()
    }

    pub fn is_sealed(&self) -> bool {
        self.seal_base.is_some()
    }

    /// Sealed with respect to `url`: members may only come from there.
    pub fn is_sealed_at(&self, url: &Url) -> bool {
        self.seal_base.as_ref() == Some(url)
    }
}
