use indexmap::IndexMap;

/// A parsed pacman repository `desc` entry.
///
/// The format is a sequence of `%KEY%` header lines, each followed by its
/// values one per line and closed by a blank line. The `desc`, `depends`
/// and `files` members of a package in a repository database all use it,
/// so their concatenation parses as one entry.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Desc {
    /// Values by header, headers keep their surrounding `%`.
    pub fields: IndexMap<String, Vec<String>>,
}

impl Desc {
    /// Parse a `desc` file.
    ///
    /// Never fails; a last section without a closing blank line is kept.
    ///
    /// # Examples
    ///
    /// ```
    /// use msys2_metadata::Desc;
    ///
    /// let desc = Desc::parse("%NAME%\nlibarchive\n\n%VERSION%\n3.7.4-1\n");
    /// assert_eq!(desc.first("%NAME%"), Some("libarchive"));
    /// assert_eq!(desc.first("%VERSION%"), Some("3.7.4-1"));
    /// ```
    pub fn parse(input: &str) -> Desc {
        let mut fields = IndexMap::new();
        let mut header: Option<&str> = None;
        let mut values = Vec::new();

        for line in input.lines() {
            let line = line.trim();
            match header {
                None if line.is_empty() => {}
                None => header = Some(line),
                Some(key) if line.is_empty() => {
                    fields.insert(key.to_string(), std::mem::take(&mut values));
                    header = None;
                }
                Some(_) => values.push(line.to_string()),
            }
        }
        if let Some(key) = header {
            fields.insert(key.to_string(), values);
        }

        Desc { fields }
    }

    /// All values of `key`.
    pub fn get(&self, key: &str) -> Option<&[String]> {
        self.fields.get(key).map(Vec::as_slice)
    }

    /// The first value of `key`.
    pub fn first(&self, key: &str) -> Option<&str> {
        self.get(key)?.first().map(String::as_str)
    }
}
