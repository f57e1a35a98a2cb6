use std::cmp::Ordering;
use std::fmt;

/// A package version of the form `[epoch~]version[-release]`.
///
/// Versions compare with the rpm/pacman segment algorithm via
/// [`Version::compare`]. The release only takes part when both sides have
/// one, so `1.0` is equal to both `1.0-1` and `1.0-2` while those two are
/// not equal to each other. That is why `Version` does not implement
/// [`Ord`].
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Version {
    /// Epoch, `"0"` when not given.
    pub epoch: String,
    /// Upstream version.
    pub version: String,
    /// Package release, if any.
    pub release: Option<String>,
}

impl Version {
    /// Split a version string into epoch, version and release.
    ///
    /// The epoch ends at the first `~`, the release starts after the last
    /// `-`. Any string is accepted.
    ///
    /// ```
    /// use msys2_metadata::Version;
    ///
    /// let v = Version::parse("2~1.2-3-4");
    /// assert_eq!(v.epoch, "2");
    /// assert_eq!(v.version, "1.2-3");
    /// assert_eq!(v.release.as_deref(), Some("4"));
    /// ```
    pub fn parse(input: &str) -> Version {
        let (epoch, rest) = input.split_once('~').unwrap_or(("0", input));
        let (version, release) = match rest.rsplit_once('-') {
            Some((version, release)) => (version, Some(release.to_string())),
            None => (rest, None),
        };

        Version {
            epoch: epoch.to_string(),
            version: version.to_string(),
            release,
        }
    }

    /// Compare two versions.
    pub fn compare(&self, other: &Version) -> Ordering {
        compare_segment(&self.epoch, &other.epoch)
            .then_with(|| compare_segment(&self.version, &other.version))
            .then_with(|| match (&self.release, &other.release) {
                (Some(a), Some(b)) => compare_segment(a, b),
                _ => Ordering::Equal,
            })
    }
}

impl From<&str> for Version {
    fn from(s: &str) -> Self {
        Version::parse(s)
    }
}

impl fmt::Display for Version {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        if self.epoch != "0" {
            write!(f, "{}~", self.epoch)?;
        }
        write!(f, "{}", self.version)?;
        if let Some(ref release) = self.release {
            write!(f, "-{release}")?;
        }
        Ok(())
    }
}

/// Compare two version strings.
///
/// The order matches what pacman considers newer, so it can be used to
/// decide whether a package needs an update.
///
/// # Examples
///
/// ```
/// use std::cmp::Ordering;
/// use msys2_metadata::vercmp;
///
/// assert_eq!(vercmp("1.0.0", "1.0.0.r101"), Ordering::Less);
/// assert_eq!(vercmp("1.1.0", "1.1.0a"), Ordering::Greater);
/// assert_eq!(vercmp("0", "00"), Ordering::Equal);
/// assert_eq!(vercmp("1~1.0", "2.0"), Ordering::Greater);
/// ```
pub fn vercmp(a: &str, b: &str) -> Ordering {
    Version::parse(a).compare(&Version::parse(b))
}

/// Best-effort extraction of the upstream part of a package version.
///
/// Drops the release (everything from the first `-`), any `+` build
/// suffix, and a `~` or `:` epoch.
///
/// ```
/// use msys2_metadata::extract_upstream_version;
///
/// assert_eq!(extract_upstream_version("2~1.2.3+123-1"), "1.2.3");
/// assert_eq!(extract_upstream_version("2:1.2.3"), "1.2.3");
/// ```
pub fn extract_upstream_version(version: &str) -> &str {
    let v = version.split('-').next().unwrap_or(version);
    let v = v.split('+').next().unwrap_or(v);
    let v = v.split_once('~').map_or(v, |(_, v)| v);
    v.split_once(':').map_or(v, |(_, v)| v)
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Class {
    Digit,
    Alpha,
    Other,
}

impl Class {
    /// Only ASCII `0-9` count as digits, as in pacman's C `isdigit`.
    /// Other Unicode decimal digits (e.g. `٣`) fall into `Other`, so
    /// `1.٣` sorts below `1.2`.
    fn of(c: char) -> Class {
        if c.is_ascii_digit() {
            Class::Digit
        } else if c.is_alphabetic() {
            Class::Alpha
        } else {
            Class::Other
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct Token<'a> {
    class: Class,
    text: &'a str,
}

/// Split into maximal runs of characters of the same class.
fn tokenize(s: &str) -> Vec<Token<'_>> {
    let mut tokens = Vec::new();
    let mut chars = s.char_indices().peekable();

    while let Some((start, c)) = chars.next() {
        let class = Class::of(c);
        let mut end = start + c.len_utf8();
        while let Some(&(i, next)) = chars.peek() {
            if Class::of(next) != class {
                break;
            }
            end = i + next.len_utf8();
            chars.next();
        }
        tokens.push(Token {
            class,
            text: &s[start..end],
        });
    }

    tokens
}

fn compare_segment(a: &str, b: &str) -> Ordering {
    let mut left = tokenize(a).into_iter();
    let mut right = tokenize(b).into_iter();

    loop {
        let ord = match (left.next(), right.next()) {
            (None, None) => return Ordering::Equal,
            // A trailing letter run marks a pre-release, so the shorter side wins.
            (None, Some(t)) if t.class == Class::Alpha => Ordering::Greater,
            (None, Some(_)) => Ordering::Less,
            (Some(t), None) if t.class == Class::Alpha => Ordering::Less,
            (Some(_), None) => Ordering::Greater,
            (Some(x), Some(y)) => compare_tokens(x, y),
        };
        if ord != Ordering::Equal {
            return ord;
        }
    }
}

fn compare_tokens(x: Token<'_>, y: Token<'_>) -> Ordering {
    match (x.class, y.class) {
        (Class::Digit, Class::Digit) => compare_numeric(x.text, y.text),
        (Class::Alpha, Class::Alpha) => x.text.cmp(y.text),
        (Class::Other, Class::Other) => x.text.chars().count().cmp(&y.text.chars().count()),
        (Class::Digit, _) => Ordering::Greater,
        (_, Class::Digit) => Ordering::Less,
        (Class::Other, Class::Alpha) => Ordering::Greater,
        (Class::Alpha, Class::Other) => Ordering::Less,
    }
}

/// Compare two ASCII digit runs by value, without overflow.
fn compare_numeric(a: &str, b: &str) -> Ordering {
    let a = a.trim_start_matches('0');
    let b = b.trim_start_matches('0');
    a.len().cmp(&b.len()).then_with(|| a.cmp(b))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cmp::Ordering::{Equal, Greater, Less};

    fn check(a: &str, b: &str, expected: Ordering) {
        assert_eq!(vercmp(a, b), expected, "vercmp({a:?}, {b:?})");
        assert_eq!(vercmp(b, a), expected.reverse(), "vercmp({b:?}, {a:?})");
    }

    #[test]
    fn basic() {
        check("1.0.0", "2.0.0", Less);
        check("1.0.0", "1.0.0", Equal);
        check("2019.10.06", "2020.12.07", Less);
        check("1.3_20200327", "1.3_20210319", Less);
        check("2.5.9.27149.9f6840e90c", "3.0.7.33374", Less);
    }

    #[test]
    fn trailing_segments() {
        check("1.0.0", "1.0.0.r101", Less);
        check("6.8", "6.8.3", Less);
        check("6.8", "6.8.", Less);
        check("1.1.0", "1.1.0a", Greater);
        check("1.1.0.", "1.1.0a", Greater);
        check("1r", "1", Less);
        check("r1", "r", Greater);
    }

    #[test]
    fn empty_and_separators() {
        check(".", "", Greater);
        check("0", "", Greater);
        check("", "", Equal);
        check(".", "..0", Less);
        check(".0", "..0", Less);
    }

    #[test]
    fn mixed_classes() {
        check("r2991.1771b556", "0.161.r3039.544c61f", Less);
        check("a", "1", Less);
        check(".", "1", Less);
        check(".", "a", Greater);
        check("a1", "1", Less);
        check("1.0a", "1.0b", Less);
    }

    #[test]
    fn leading_zeros() {
        check("0", "00", Equal);
        check("1.010", "1.10", Equal);
        check("1.0010", "1.9", Greater);
    }

    #[test]
    fn long_numbers_do_not_overflow() {
        check("20240101000000000000000000001", "20240101000000000000000000002", Less);
    }

    #[test]
    fn epoch() {
        check("1~1.0", "2.0", Greater);
        check("0~1.0", "1.0", Equal);
        check("1~1.0", "2~0.1", Less);
    }

    #[test]
    fn release() {
        check("1.0-1", "1.0-2", Less);
        check("1.0-10", "1.0-9", Greater);
        check("1.0-2", "1.1-1", Less);
    }

    #[test]
    fn release_ignored_unless_both_present() {
        check("1.0", "1.0-1", Equal);
        check("1.0", "1.0-2", Equal);
        check("1.0", "1.1-1", Less);
    }

    #[test]
    fn release_splits_on_last_dash() {
        let v = Version::parse("1.2-rc1-3");
        assert_eq!(v.version, "1.2-rc1");
        assert_eq!(v.release.as_deref(), Some("3"));
        check("1.2-rc1-3", "1.2-rc1-4", Less);
    }

    #[test]
    fn parse_defaults() {
        let v = Version::parse("3.7.4");
        assert_eq!(v.epoch, "0");
        assert_eq!(v.version, "3.7.4");
        assert_eq!(v.release, None);
    }

    #[test]
    fn display() {
        for s in ["3.7.4-1", "2~1.0-3", "1.0"] {
            assert_eq!(Version::parse(s).to_string(), s);
        }
    }

    #[test]
    fn tokenize_runs() {
        let texts: Vec<&str> = tokenize("1.0..rc12_ä").iter().map(|t| t.text).collect();
        assert_eq!(texts, ["1", ".", "0", "..", "rc", "12", "_", "ä"]);
    }

    #[test]
    fn non_ascii_digits_are_not_numeric() {
        check("1.٣", "1.2", Less);
        check("1.٣", "1.a", Greater);
    }

    #[test]
    fn other_runs_compare_by_length() {
        check("1_0", "1.0", Equal);
        check("1__0", "1.0", Greater);
    }

    #[test]
    fn upstream_version() {
        assert_eq!(extract_upstream_version("1.2.3+123"), "1.2.3");
        assert_eq!(extract_upstream_version("2~1.2.3"), "1.2.3");
        assert_eq!(extract_upstream_version("2:1.2.3"), "1.2.3");
        assert_eq!(extract_upstream_version("3.7.4-1"), "3.7.4");
        assert_eq!(extract_upstream_version(""), "");
    }
}
