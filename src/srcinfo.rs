use indexmap::{IndexMap, IndexSet};
use winnow::combinator::separated_pair;
use winnow::prelude::*;
use winnow::token::{rest, take_until};

use crate::error::{Error, Result};

/// Key/value mapping of one SRCINFO block.
///
/// Every key maps to all values given for it, in input order.
pub type Record = IndexMap<String, Vec<String>>;

/// A parsed `.SRCINFO` document.
///
/// The `pkgbase` block holds values shared by every split package, each
/// `pkgname` block holds the overrides of one package. After parsing, every
/// package record also contains the base values it does not override.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Srcinfo {
    /// Values from the `pkgbase` block.
    pub base: Record,

    /// Package records keyed by `pkgname`, in declaration order.
    pub packages: IndexMap<String, Record>,
}

/// Which record key/value lines are currently appended to.
enum Target {
    None,
    Base,
    Package(String),
}

impl Srcinfo {
    /// Parse the contents of a `.SRCINFO` file.
    ///
    /// Lines have the form `key = value`; surrounding whitespace is ignored
    /// and so are blank lines. An empty value contributes no entry, so
    /// `depends = ` yields an empty list.
    ///
    /// # Examples
    ///
    /// ```
    /// use msys2_metadata::Srcinfo;
    ///
    /// let input = "\
    /// pkgbase = libarchive
    /// \tpkgver = 3.5.1
    /// \tdepends = gcc-libs
    /// pkgname = libarchive
    /// pkgname = libarchive-devel
    /// \tdepends = libxml2-devel
    /// ";
    /// let srcinfo = Srcinfo::parse(input).unwrap();
    /// let devel = srcinfo.package("libarchive-devel").unwrap();
    /// assert_eq!(devel["pkgver"], ["3.5.1"]);
    /// assert_eq!(devel["depends"], ["libxml2-devel"]);
    /// ```
    pub fn parse(input: &str) -> Result<Srcinfo> {
        let mut srcinfo = Srcinfo::default();
        let mut target = Target::None;

        for line in input.lines() {
            let line = line.trim();
            if line.is_empty() {
                continue;
            }

            let (key, value) = parse_line
                .parse(line)
                .map_err(|_| Error::MalformedLine(line.to_string()))?;
            let value = value.trim();

            match key {
                "pkgbase" if matches!(target, Target::None) => target = Target::Base,
                "pkgname" => {
                    srcinfo.packages.insert(value.to_string(), Record::new());
                    target = Target::Package(value.to_string());
                }
                _ => {}
            }

            let record = match &target {
                Target::None => {
                    tracing::trace!(key, "skipping line outside of any block");
                    continue;
                }
                Target::Base => &mut srcinfo.base,
                Target::Package(name) => match srcinfo.packages.get_mut(name) {
                    Some(record) => record,
                    None => continue,
                },
            };

            let values = record.entry(key.to_string()).or_default();
            if !value.is_empty() {
                values.push(value.to_string());
            }
        }

        for record in srcinfo.packages.values_mut() {
            for (key, values) in &srcinfo.base {
                if !record.contains_key(key) {
                    record.insert(key.clone(), values.clone());
                }
            }
        }

        tracing::debug!(
            pkgbase = srcinfo.pkgbase(),
            packages = srcinfo.packages.len(),
            "parsed srcinfo"
        );

        Ok(srcinfo)
    }

    /// The first `pkgbase` value of the base record.
    pub fn pkgbase(&self) -> Option<&str> {
        first_value(&self.base, "pkgbase")
    }

    /// The first `pkgver` value of the base record.
    pub fn pkgver(&self) -> Option<&str> {
        first_value(&self.base, "pkgver")
    }

    /// The record of the package named `name`, base values included.
    pub fn package(&self, name: &str) -> Option<&Record> {
        self.packages.get(name)
    }

    /// The `pkgbase` shared by a set of SRCINFOs of the same package.
    ///
    /// A PKGBUILD yields one SRCINFO per build environment, and all of them
    /// have to agree on `pkgbase`. Documents without a `pkgbase` are
    /// ignored; `Ok(None)` means none of them had one.
    ///
    /// ```
    /// use msys2_metadata::Srcinfo;
    ///
    /// let a = Srcinfo::parse("pkgbase = foo\n").unwrap();
    /// let b = Srcinfo::parse("pkgbase = bar\n").unwrap();
    /// assert_eq!(Srcinfo::shared_pkgbase([&a, &a]).unwrap(), Some("foo"));
    /// assert!(Srcinfo::shared_pkgbase([&a, &b]).is_err());
    /// ```
    pub fn shared_pkgbase<'a, I>(docs: I) -> Result<Option<&'a str>>
    where
        I: IntoIterator<Item = &'a Srcinfo>,
    {
        let pkgbases: IndexSet<&str> = docs.into_iter().filter_map(Srcinfo::pkgbase).collect();
        match pkgbases.len() {
            0 => Ok(None),
            1 => Ok(pkgbases.first().copied()),
            _ => Err(Error::PkgbaseMismatch(
                pkgbases.iter().map(|s| s.to_string()).collect(),
            )),
        }
    }
}

fn first_value<'r>(record: &'r Record, key: &str) -> Option<&'r str> {
    record.get(key)?.first().map(String::as_str)
}

/// Split a trimmed line into key and raw value on the first ` =`.
fn parse_line<'s>(input: &mut &'s str) -> ModalResult<(&'s str, &'s str)> {
    separated_pair(take_until(1.., " ="), " =", rest).parse_next(input)
}

#[cfg(test)]
mod tests {
    use super::*;

    const LIBARCHIVE: &str = "
pkgbase = libarchive
\tpkgver = 3.5.1
\tdepends = gcc-libs
pkgname = libarchive
pkgname = libarchive-devel
\tdepends = libxml2-devel
\treplaces = libarchive-devel-git
pkgname = something
\tdepends = \n";

    #[test]
    fn parse_base() {
        let srcinfo = Srcinfo::parse(LIBARCHIVE).unwrap();
        assert_eq!(srcinfo.base["pkgbase"], ["libarchive"]);
        assert_eq!(srcinfo.base["pkgver"], ["3.5.1"]);
        assert_eq!(srcinfo.base["depends"], ["gcc-libs"]);
        assert_eq!(srcinfo.pkgbase(), Some("libarchive"));
        assert_eq!(srcinfo.pkgver(), Some("3.5.1"));
    }

    #[test]
    fn packages_inherit_from_base() {
        let srcinfo = Srcinfo::parse(LIBARCHIVE).unwrap();
        let names: Vec<&str> = srcinfo.packages.keys().map(String::as_str).collect();
        assert_eq!(names, ["libarchive", "libarchive-devel", "something"]);

        let pkg = srcinfo.package("libarchive").unwrap();
        assert_eq!(pkg["pkgname"], ["libarchive"]);
        assert_eq!(pkg["depends"], ["gcc-libs"]);
        assert_eq!(pkg["pkgver"], ["3.5.1"]);
    }

    #[test]
    fn package_overrides_base() {
        let srcinfo = Srcinfo::parse(LIBARCHIVE).unwrap();
        let pkg = srcinfo.package("libarchive-devel").unwrap();
        assert_eq!(pkg["depends"], ["libxml2-devel"]);
        assert_eq!(pkg["replaces"], ["libarchive-devel-git"]);
        assert_eq!(pkg["pkgver"], ["3.5.1"]);
        assert!(!srcinfo.base.contains_key("replaces"));
    }

    #[test]
    fn empty_value_overrides_base() {
        let srcinfo = Srcinfo::parse(LIBARCHIVE).unwrap();
        let pkg = srcinfo.package("something").unwrap();
        assert_eq!(pkg["pkgname"], ["something"]);
        assert!(pkg["depends"].is_empty());
    }

    #[test]
    fn pkgdesc_override() {
        let input = "
pkgbase = libarchive
\tpkgdesc = base-desc
pkgname = libarchive-devel
\tpkgdesc = sub-desc
\n";
        let srcinfo = Srcinfo::parse(input).unwrap();
        assert_eq!(srcinfo.base["pkgdesc"], ["base-desc"]);
        let pkg = srcinfo.package("libarchive-devel").unwrap();
        assert_eq!(pkg["pkgname"], ["libarchive-devel"]);
        assert_eq!(pkg["pkgdesc"], ["sub-desc"]);
        assert_eq!(pkg["pkgbase"], ["libarchive"]);
    }

    #[test]
    fn repeated_keys_accumulate() {
        let input = "pkgbase = foo\n\tdepends = a\n\n\tdepends = b\n\tdepends = c\n";
        let srcinfo = Srcinfo::parse(input).unwrap();
        assert_eq!(srcinfo.base["depends"], ["a", "b", "c"]);
    }

    #[test]
    fn insertion_order_kept() {
        let input = "pkgbase = foo\n\tpkgver = 1\n\tarch = any\n\tpkgrel = 2\n";
        let srcinfo = Srcinfo::parse(input).unwrap();
        let keys: Vec<&str> = srcinfo.base.keys().map(String::as_str).collect();
        assert_eq!(keys, ["pkgbase", "pkgver", "arch", "pkgrel"]);
    }

    #[test]
    fn value_containing_separator() {
        let input = "pkgbase = foo\n\toptdepends = python: for the bindings = yes\n";
        let srcinfo = Srcinfo::parse(input).unwrap();
        assert_eq!(
            srcinfo.base["optdepends"],
            ["python: for the bindings = yes"]
        );
    }

    #[test]
    fn pkgbase_inside_package_is_a_plain_key() {
        let input = "pkgbase = foo\npkgname = foo-a\npkgbase = bar\n\tpkgver = 2\n";
        let srcinfo = Srcinfo::parse(input).unwrap();
        assert_eq!(srcinfo.pkgbase(), Some("foo"));
        let pkg = srcinfo.package("foo-a").unwrap();
        assert_eq!(pkg["pkgbase"], ["bar"]);
        assert_eq!(pkg["pkgver"], ["2"]);
        assert!(!srcinfo.base.contains_key("pkgver"));
    }

    #[test]
    fn lines_before_any_block_are_dropped() {
        let input = "pkgver = 1\npkgbase = foo\n";
        let srcinfo = Srcinfo::parse(input).unwrap();
        assert!(!srcinfo.base.contains_key("pkgver"));
        assert_eq!(srcinfo.pkgbase(), Some("foo"));
    }

    #[test]
    fn no_pkgbase_is_lenient() {
        let srcinfo = Srcinfo::parse("pkgname = foo\n\tpkgver = 1\n").unwrap();
        assert!(srcinfo.base.is_empty());
        assert_eq!(srcinfo.package("foo").unwrap()["pkgver"], ["1"]);

        let srcinfo = Srcinfo::parse("").unwrap();
        assert!(srcinfo.base.is_empty());
        assert!(srcinfo.packages.is_empty());
    }

    #[test]
    fn malformed_line() {
        let err = Srcinfo::parse("pkgbase = foo\nbroken line\n").unwrap_err();
        assert_eq!(err, Error::MalformedLine("broken line".to_string()));

        let err = Srcinfo::parse("pkgbase=foo\n").unwrap_err();
        assert!(matches!(err, Error::MalformedLine(_)));
    }

    #[test]
    fn shared_pkgbase() {
        let a = Srcinfo::parse("pkgbase = foo\n").unwrap();
        let b = Srcinfo::parse("pkgbase = bar\n").unwrap();
        let empty = Srcinfo::default();

        assert_eq!(Srcinfo::shared_pkgbase([&a, &empty]).unwrap(), Some("foo"));
        assert_eq!(Srcinfo::shared_pkgbase([&empty]).unwrap(), None);
        assert_eq!(
            Srcinfo::shared_pkgbase([&a, &b]).unwrap_err(),
            Error::PkgbaseMismatch(vec!["foo".to_string(), "bar".to_string()])
        );
    }
}
