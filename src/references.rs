use indexmap::IndexMap;
use winnow::combinator::{alt, separated_pair};
use winnow::prelude::*;
use winnow::token::{rest, take_until};

/// Third-party references of a package, e.g. `cpe`, `purl` or `pypi`.
///
/// PKGBUILDs list them as `key: value` strings. A bare `key` without a
/// value is allowed and recorded as `None`.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct References {
    /// Values by reference kind, in input order.
    pub entries: IndexMap<String, Vec<Option<String>>>,
}

impl References {
    /// Collect a list of `key: value` reference strings.
    ///
    /// ```
    /// use msys2_metadata::References;
    ///
    /// let refs = References::parse(["cpe: cpe:/a:gnu:bash", "archlinux"]);
    /// assert_eq!(refs.values("cpe").collect::<Vec<_>>(), ["cpe:/a:gnu:bash"]);
    /// assert_eq!(refs.entries["archlinux"], [None::<String>]);
    /// ```
    pub fn parse<'a, I>(items: I) -> References
    where
        I: IntoIterator<Item = &'a str>,
    {
        let mut entries: IndexMap<String, Vec<Option<String>>> = IndexMap::new();
        for item in items {
            // `rest` always matches, so this cannot fail.
            let Ok((key, value)) = parse_reference.parse(item) else {
                continue;
            };
            entries
                .entry(key.to_string())
                .or_default()
                .push(value.map(|v| v.trim().to_string()));
        }
        References { entries }
    }

    /// Whether any reference of the given kind exists.
    pub fn contains(&self, key: &str) -> bool {
        self.entries.contains_key(key)
    }

    /// The non-empty values of one reference kind.
    pub fn values<'s>(&'s self, key: &str) -> impl Iterator<Item = &'s str> + 's {
        self.entries
            .get(key)
            .into_iter()
            .flatten()
            .filter_map(|v| v.as_deref())
    }
}

fn parse_reference<'s>(input: &mut &'s str) -> ModalResult<(&'s str, Option<&'s str>)> {
    alt((
        separated_pair(take_until(0.., ":"), ":", rest).map(|(k, v)| (k, Some(v))),
        rest.map(|k| (k, None)),
    ))
    .parse_next(input)
}
