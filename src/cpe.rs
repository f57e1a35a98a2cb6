use std::str::FromStr;

use crate::error::{Error, Result};

const CPE22_PREFIX: &str = "cpe:/";
const CPE23_PREFIX: &str = "cpe:2.3:";

/// A single CPE component value.
///
/// CPE distinguishes between an unset component (`ANY`), an explicitly
/// absent one (`NA`, written `-`) and a literal value. A literal is never
/// empty.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum CpeComponent {
    /// A concrete value, already unescaped.
    Literal(String),
    /// Wildcard (`*` in 2.3, empty field in 2.2).
    Any,
    /// Not applicable (`-`).
    NotApplicable,
}

impl CpeComponent {
    /// Shorthand for [`CpeComponent::Literal`].
    pub fn literal(value: impl Into<String>) -> Self {
        CpeComponent::Literal(value.into())
    }

    /// The literal value, if this is a [`CpeComponent::Literal`].
    pub fn as_literal(&self) -> Option<&str> {
        match self {
            CpeComponent::Literal(s) => Some(s),
            _ => None,
        }
    }
}

impl From<&str> for CpeComponent {
    fn from(s: &str) -> Self {
        CpeComponent::Literal(s.to_string())
    }
}

/// The first four components of a CPE name.
///
/// Both CPE 2.2 URIs (`cpe:/a:vendor:product:version`) and CPE 2.3
/// formatted strings (`cpe:2.3:a:vendor:product:version:...`) are accepted.
/// Missing trailing components are [`CpeComponent::Any`], anything past
/// the version is dropped.
///
/// # Examples
///
/// ```
/// use msys2_metadata::{Cpe, CpeComponent};
///
/// let cpe = Cpe::parse("cpe:/a:cryptopp:crypto%2b%2b:8.9.0").unwrap();
/// assert_eq!(cpe.product, CpeComponent::literal("crypto++"));
/// assert_eq!(cpe.to_cpe22().unwrap(), "cpe:/a:cryptopp:crypto%2B%2B:8.9.0");
///
/// let cpe = Cpe::parse("cpe:2.3:a:ncurses_project:ncurses").unwrap();
/// assert_eq!(cpe.version, CpeComponent::Any);
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Cpe {
    /// Part (`a`, `o` or `h`).
    pub part: CpeComponent,
    /// Vendor name.
    pub vendor: CpeComponent,
    /// Product name.
    pub product: CpeComponent,
    /// Product version.
    pub version: CpeComponent,
}

impl Cpe {
    /// Build a CPE from its four components.
    pub fn new(
        part: CpeComponent,
        vendor: CpeComponent,
        product: CpeComponent,
        version: CpeComponent,
    ) -> Self {
        Cpe {
            part,
            vendor,
            product,
            version,
        }
    }

    /// Parse a CPE 2.2 URI or a CPE 2.3 formatted string.
    pub fn parse(input: &str) -> Result<Self> {
        if input.starts_with(CPE23_PREFIX) {
            Self::parse_cpe23(input)
        } else if input.starts_with(CPE22_PREFIX) {
            Self::parse_cpe22(input)
        } else {
            Err(Error::InvalidFormat(format!("unknown CPE format: {input}")))
        }
    }

    /// Parse a CPE 2.2 URI.
    ///
    /// Empty fields are `ANY`, `-` is `NA`, everything else is
    /// percent-decoded.
    pub fn parse_cpe22(input: &str) -> Result<Self> {
        let rest = input
            .strip_prefix(CPE22_PREFIX)
            .ok_or_else(|| Error::InvalidFormat(format!("not a CPE 2.2 URI: {input}")))?;

        let components = rest
            .split(':')
            .map(|field| match field {
                "" => CpeComponent::Any,
                "-" => CpeComponent::NotApplicable,
                _ => CpeComponent::Literal(percent_decode(field)),
            })
            .collect();

        Ok(Self::from_components(components))
    }

    /// Parse a CPE 2.3 formatted string.
    ///
    /// Fields are separated by unescaped `:`, and `\` escapes the next
    /// character. Only an unescaped `*` is `ANY` and only an unescaped `-`
    /// is `NA`. Empty fields are rejected since CPE 2.2 has no way to
    /// express an empty literal.
    pub fn parse_cpe23(input: &str) -> Result<Self> {
        let rest = input
            .strip_prefix(CPE23_PREFIX)
            .ok_or_else(|| Error::InvalidFormat(format!("not a CPE 2.3 string: {input}")))?;

        Ok(Self::from_components(split_cpe23(rest)?))
    }

    /// Serialize as a canonical CPE 2.2 URI.
    ///
    /// Trailing `ANY` components are omitted. A literal `-` is written as
    /// `%2D` to keep it apart from `NA`.
    pub fn to_cpe22(&self) -> Result<String> {
        let fields = [&self.part, &self.vendor, &self.product, &self.version]
            .into_iter()
            .map(encode_cpe22_component)
            .collect::<Result<Vec<_>>>()?;

        let uri = format!("{CPE22_PREFIX}{}", fields.join(":"));
        Ok(uri.trim_end_matches(':').to_string())
    }

    fn from_components(components: Vec<CpeComponent>) -> Self {
        let mut iter = components.into_iter();
        let mut next = || iter.next().unwrap_or(CpeComponent::Any);
        Cpe {
            part: next(),
            vendor: next(),
            product: next(),
            version: next(),
        }
    }
}

impl FromStr for Cpe {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        Cpe::parse(s)
    }
}

/// Build a canonical CPE 2.2 URI from four components.
///
/// # Examples
///
/// ```
/// use msys2_metadata::{build_cpe22, CpeComponent};
///
/// let uri = build_cpe22("a".into(), CpeComponent::Any, CpeComponent::Any, "-".into()).unwrap();
/// assert_eq!(uri, "cpe:/a:::%2D");
/// ```
pub fn build_cpe22(
    part: CpeComponent,
    vendor: CpeComponent,
    product: CpeComponent,
    version: CpeComponent,
) -> Result<String> {
    Cpe::new(part, vendor, product, version).to_cpe22()
}

/// Parse any supported CPE string and re-serialize it as canonical CPE 2.2.
///
/// Two CPEs naming the same thing map to the same string, which makes the
/// result usable as a deduplication key.
///
/// ```
/// use msys2_metadata::normalize_cpe;
///
/// assert_eq!(normalize_cpe("cpe:2.3:a:*:bar").unwrap(), "cpe:/a::bar");
/// ```
pub fn normalize_cpe(input: &str) -> Result<String> {
    Cpe::parse(input)?.to_cpe22()
}

fn encode_cpe22_component(component: &CpeComponent) -> Result<String> {
    match component {
        CpeComponent::Any => Ok(String::new()),
        CpeComponent::NotApplicable => Ok("-".to_string()),
        CpeComponent::Literal(s) if s == "-" => Ok("%2D".to_string()),
        CpeComponent::Literal(s) if s.is_empty() => Err(Error::InvalidFormat(
            "empty CPE component not allowed".to_string(),
        )),
        CpeComponent::Literal(s) => Ok(percent_encode(s)),
    }
}

// `/` stays unescaped in 2.2 URIs.
fn percent_encode(s: &str) -> String {
    urlencoding::encode(s).replace("%2F", "/")
}

fn percent_decode(s: &str) -> String {
    let bytes = urlencoding::decode_binary(s.as_bytes());
    String::from_utf8_lossy(&bytes).into_owned()
}

/// Split the body of a CPE 2.3 string into components.
fn split_cpe23(s: &str) -> Result<Vec<CpeComponent>> {
    let mut components = Vec::new();
    let mut current = String::new();
    let mut escaping = false;
    let mut last_escaped = false;

    for c in s.chars() {
        if escaping {
            current.push(c);
            escaping = false;
            last_escaped = true;
        } else if c == '\\' {
            escaping = true;
            last_escaped = false;
        } else if c == ':' {
            components.push(finish_cpe23_field(&mut current, last_escaped)?);
            last_escaped = false;
        } else {
            current.push(c);
            last_escaped = false;
        }
    }
    components.push(finish_cpe23_field(&mut current, last_escaped)?);

    Ok(components)
}

fn finish_cpe23_field(current: &mut String, last_escaped: bool) -> Result<CpeComponent> {
    let field = std::mem::take(current);
    match field.as_str() {
        "*" if !last_escaped => Ok(CpeComponent::Any),
        "-" if !last_escaped => Ok(CpeComponent::NotApplicable),
        "" => Err(Error::InvalidFormat(
            "empty CPE component not allowed".to_string(),
        )),
        _ => Ok(CpeComponent::Literal(field)),
    }
}
