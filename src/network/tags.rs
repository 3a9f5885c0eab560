use serde_json::Value;

/// A loosely-typed OSM tag value normalized to a fixed shape.
///
/// Raw tags may arrive as a string, a number, a list (after way merging) or not at all.
/// Lists keep every element so exact comparisons can tell them apart from a single value.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum TagValue {
    #[default]
    Absent,
    Single(String),
    List(Vec<String>),
}

impl TagValue {
    /// Normalize an optional JSON value.
    pub fn from_json(value: Option<&Value>) -> Self {
        match value {
            None | Some(Value::Null) => Self::Absent,
            Some(Value::String(s)) => Self::Single(s.clone()),
            Some(Value::Array(items)) if items.is_empty() => Self::Absent,
            Some(Value::Array(items)) => Self::List(items.iter().map(scalar).collect()),
            Some(other) => Self::Single(scalar(other)),
        }
    }

    /// The single value or the first list element, or `default` when absent.
    #[inline]
    pub fn first_or<'a>(&'a self, default: &'a str) -> &'a str {
        match self {
            Self::Absent => default,
            Self::Single(s) => s,
            Self::List(items) => items.first().map_or(default, String::as_str),
        }
    }

    /// True only for a single value equal to `value`; lists never match.
    #[inline]
    pub fn is(&self, value: &str) -> bool {
        matches!(self, Self::Single(s) if s == value)
    }
}

fn scalar(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}

impl From<&str> for TagValue {
    fn from(s: &str) -> Self { Self::Single(s.to_string()) }
}

impl From<Option<&str>> for TagValue {
    fn from(s: Option<&str>) -> Self { s.map_or(Self::Absent, Self::from) }
}

/// Sidewalk tag values that mean "no sidewalk" after lowercasing.
/// Includes literal spellings of missing data carried through by upstream tooling.
const NO_SIDEWALK: [&str; 6] = ["no", "0", "false", "nan", "none", "null"];

/// Classify a way as sidewalk-bearing from its `sidewalk` and `highway` tags.
/// Footways count as sidewalks whatever their sidewalk tag says. A list-valued sidewalk tag
/// is judged by its first element, while a list-valued highway tag is never a footway.
pub fn has_sidewalk(sidewalk: &TagValue, highway: &TagValue) -> bool {
    let sidewalk = sidewalk.first_or("no").to_lowercase();
    !NO_SIDEWALK.contains(&sidewalk.as_str()) || highway.is("footway")
}
