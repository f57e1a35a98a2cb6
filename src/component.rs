use std::str::FromStr;

use packageurl::PackageUrl;

use crate::cpe::{normalize_cpe, Cpe, CpeComponent};
use crate::error::{Error, Result};
use crate::references::References;
use crate::srcinfo::Srcinfo;
use crate::version::extract_upstream_version;

const MINGW_PREFIX: &str = "mingw-w64-";

/// Identity of one SBOM component derived from a package.
///
/// A package can map to several components, one per CPE or PURL it is
/// known under. All of them carry the `pkgbase` they were derived from.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Component {
    /// Component name.
    pub name: String,
    /// Upstream version.
    pub version: String,
    /// Canonical CPE 2.2 URI.
    pub cpe: Option<String>,
    /// Package URL, always with a version.
    pub purl: Option<String>,
    /// The `pkgbase` of the source package.
    pub pkgbase: String,
}

/// Key used to match the same component across SBOM documents.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct ComponentKey {
    /// Component name.
    pub name: String,
    /// Component version.
    pub version: String,
    /// Package URL as written in the SBOM.
    pub purl: Option<String>,
    /// Normalized CPE, see [`normalize_cpe`].
    pub cpe: Option<String>,
}

impl ComponentKey {
    /// Build a key, normalizing `cpe` so that 2.2 and 2.3 spellings match.
    pub fn new(name: &str, version: &str, purl: Option<&str>, cpe: Option<&str>) -> Result<Self> {
        Ok(ComponentKey {
            name: name.to_string(),
            version: version.to_string(),
            purl: purl.map(str::to_string),
            cpe: cpe.map(normalize_cpe).transpose()?,
        })
    }
}

impl Component {
    /// Derive the components of a package from its SRCINFO and references.
    ///
    /// Every `cpe` and every `purl` reference becomes one component, CPEs
    /// first. A CPE or PURL without a version gets the upstream part of
    /// `pkgver`. Without any `cpe` or `purl` value a single component named
    /// after `pkgbase` is returned; bare keys without a value are ignored.
    ///
    /// # Examples
    ///
    /// ```
    /// use msys2_metadata::{Component, References, Srcinfo};
    ///
    /// let srcinfo = Srcinfo::parse("pkgbase = mingw-w64-django\npkgver = 42\n").unwrap();
    /// let refs = References::parse(["cpe: cpe:/a:djangoproject:django"]);
    /// let components = Component::from_srcinfo(&srcinfo, &refs).unwrap();
    /// assert_eq!(components[0].name, "django");
    /// assert_eq!(components[0].cpe.as_deref(), Some("cpe:/a:djangoproject:django:42"));
    /// ```
    pub fn from_srcinfo(srcinfo: &Srcinfo, references: &References) -> Result<Vec<Component>> {
        let pkgbase = srcinfo
            .pkgbase()
            .ok_or_else(|| Error::MissingField("pkgbase".to_string()))?;
        let pkgver = srcinfo
            .pkgver()
            .map(extract_upstream_version)
            .ok_or_else(|| Error::MissingField("pkgver".to_string()))?;

        let mut components = Vec::new();
        for value in references.values("cpe") {
            components.push(Self::from_cpe(value, pkgver, pkgbase)?);
        }
        for value in references.values("purl") {
            components.push(Self::from_purl(value, pkgver, pkgbase)?);
        }

        if components.is_empty() {
            let name = pkgbase.strip_prefix(MINGW_PREFIX).unwrap_or(pkgbase);
            tracing::debug!(pkgbase, name, "no references, using pkgbase as component");
            components.push(Component {
                name: name.to_string(),
                version: pkgver.to_string(),
                cpe: None,
                purl: None,
                pkgbase: pkgbase.to_string(),
            });
        }

        Ok(components)
    }

    fn from_cpe(value: &str, pkgver: &str, pkgbase: &str) -> Result<Component> {
        let mut cpe = Cpe::parse(value)?;
        if cpe.version.as_literal().is_none() {
            cpe.version = CpeComponent::literal(pkgver);
        }

        let (Some(_), Some(_), Some(name), Some(version)) = (
            cpe.part.as_literal(),
            cpe.vendor.as_literal(),
            cpe.product.as_literal(),
            cpe.version.as_literal(),
        ) else {
            return Err(Error::InvalidFormat(format!(
                "CPE must have a part, vendor, product and version: {value}"
            )));
        };

        Ok(Component {
            name: name.to_string(),
            version: version.to_string(),
            cpe: Some(cpe.to_cpe22()?),
            purl: None,
            pkgbase: pkgbase.to_string(),
        })
    }

    fn from_purl(value: &str, pkgver: &str, pkgbase: &str) -> Result<Component> {
        let mut purl =
            PackageUrl::from_str(value).map_err(|e| Error::InvalidPurl(format!("{value}: {e}")))?;
        if purl.version().is_none() {
            let _ = purl.with_version(pkgver.to_string());
        }

        Ok(Component {
            name: purl.name().to_string(),
            version: purl.version().unwrap_or(pkgver).to_string(),
            cpe: None,
            purl: Some(purl.to_string()),
            pkgbase: pkgbase.to_string(),
        })
    }

    /// The key identifying this component across SBOMs.
    pub fn key(&self) -> Result<ComponentKey> {
        ComponentKey::new(
            &self.name,
            &self.version,
            self.purl.as_deref(),
            self.cpe.as_deref(),
        )
    }
}
