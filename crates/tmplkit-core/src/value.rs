//! Runtime value type passed through the callable table.

use std::cmp::Ordering;
use std::collections::BTreeMap;
use std::fmt;

use ordered_float::OrderedFloat;

/// Dictionary payload of [`Dynamic::Map`].
///
/// Keys are kept ordered so iteration and rendering are deterministic.
pub type Map = BTreeMap<String, Dynamic>;

/// A dynamically-typed value.
///
/// This enum represents every value a template engine can hand to a
/// registered callable, and every value a callable can return.
///
/// `Null` doubles as the zero value: it is what a legacy-mode callable
/// returns when its invocation fails.
#[derive(Debug, Clone, PartialEq, Default)]
pub enum Dynamic {
    /// Absent value / zero value
    #[default]
    Null,
    /// Boolean value
    Bool(bool),
    /// Integer value (all integer widths are stored as i64)
    Int(i64),
    /// Floating point value
    Float(f64),
    /// String value (owned)
    String(String),
    /// Ordered sequence
    List(Vec<Dynamic>),
    /// String-keyed dictionary
    Map(Map),
}

impl Dynamic {
    /// Get a human-readable name for this value's type.
    pub fn type_name(&self) -> &'static str {
        match self {
            Dynamic::Null => "null",
            Dynamic::Bool(_) => "bool",
            Dynamic::Int(_) => "int",
            Dynamic::Float(_) => "float",
            Dynamic::String(_) => "string",
            Dynamic::List(_) => "list",
            Dynamic::Map(_) => "map",
        }
    }

    /// Check if this value is null.
    pub fn is_null(&self) -> bool {
        matches!(self, Dynamic::Null)
    }

    /// Check if this value is a dictionary.
    pub fn is_map(&self) -> bool {
        matches!(self, Dynamic::Map(_))
    }

    /// Check if this value is a sequence.
    pub fn is_list(&self) -> bool {
        matches!(self, Dynamic::List(_))
    }

    /// Template truthiness: false, 0, 0.0, "", empty collections and null are falsy.
    pub fn is_truthy(&self) -> bool {
        match self {
            Dynamic::Null => false,
            Dynamic::Bool(b) => *b,
            Dynamic::Int(v) => *v != 0,
            Dynamic::Float(v) => *v != 0.0,
            Dynamic::String(s) => !s.is_empty(),
            Dynamic::List(l) => !l.is_empty(),
            Dynamic::Map(m) => !m.is_empty(),
        }
    }

    /// Borrow the string payload, if any.
    pub fn as_str(&self) -> Option<&str> {
        match self {
            Dynamic::String(s) => Some(s),
            _ => None,
        }
    }

    /// Borrow the list payload, if any.
    pub fn as_list(&self) -> Option<&[Dynamic]> {
        match self {
            Dynamic::List(l) => Some(l),
            _ => None,
        }
    }

    /// Borrow the map payload, if any.
    pub fn as_map(&self) -> Option<&Map> {
        match self {
            Dynamic::Map(m) => Some(m),
            _ => None,
        }
    }

    /// Numeric view used by arithmetic helpers.
    pub fn as_f64(&self) -> Option<f64> {
        match self {
            Dynamic::Int(v) => Some(*v as f64),
            Dynamic::Float(v) => Some(*v),
            _ => None,
        }
    }

    /// Total ordering across values.
    ///
    /// Values of different types order by type rank (null < bool < number <
    /// string < list < map). Ints and floats compare numerically, with NaN
    /// ordered through `OrderedFloat`.
    pub fn total_cmp(&self, other: &Self) -> Ordering {
        match (self, other) {
            (Dynamic::Null, Dynamic::Null) => Ordering::Equal,
            (Dynamic::Bool(a), Dynamic::Bool(b)) => a.cmp(b),
            (Dynamic::Int(a), Dynamic::Int(b)) => a.cmp(b),
            (Dynamic::String(a), Dynamic::String(b)) => a.cmp(b),
            (Dynamic::List(a), Dynamic::List(b)) => {
                for (x, y) in a.iter().zip(b.iter()) {
                    match x.total_cmp(y) {
                        Ordering::Equal => continue,
                        ord => return ord,
                    }
                }
                a.len().cmp(&b.len())
            }
            (Dynamic::Map(a), Dynamic::Map(b)) => a.len().cmp(&b.len()),
            (a, b) => match (a.as_f64(), b.as_f64()) {
                (Some(x), Some(y)) => OrderedFloat(x).cmp(&OrderedFloat(y)),
                _ => a.rank().cmp(&b.rank()),
            },
        }
    }

    fn rank(&self) -> u8 {
        match self {
            Dynamic::Null => 0,
            Dynamic::Bool(_) => 1,
            Dynamic::Int(_) | Dynamic::Float(_) => 2,
            Dynamic::String(_) => 3,
            Dynamic::List(_) => 4,
            Dynamic::Map(_) => 5,
        }
    }
}

/// Go-template flavoured rendering: `[a b]`, `map[k:v]`, null renders empty.
impl fmt::Display for Dynamic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Dynamic::Null => Ok(()),
            Dynamic::Bool(b) => write!(f, "{}", b),
            Dynamic::Int(v) => write!(f, "{}", v),
            Dynamic::Float(v) => write!(f, "{}", v),
            Dynamic::String(s) => f.write_str(s),
            Dynamic::List(items) => {
                f.write_str("[")?;
                for (i, item) in items.iter().enumerate() {
                    if i > 0 {
                        f.write_str(" ")?;
                    }
                    write!(f, "{}", item)?;
                }
                f.write_str("]")
            }
            Dynamic::Map(map) => {
                f.write_str("map[")?;
                for (i, (key, value)) in map.iter().enumerate() {
                    if i > 0 {
                        f.write_str(" ")?;
                    }
                    write!(f, "{}:{}", key, value)?;
                }
                f.write_str("]")
            }
        }
    }
}

impl From<bool> for Dynamic {
    fn from(v: bool) -> Self {
        Dynamic::Bool(v)
    }
}

impl From<i64> for Dynamic {
    fn from(v: i64) -> Self {
        Dynamic::Int(v)
    }
}

impl From<i32> for Dynamic {
    fn from(v: i32) -> Self {
        Dynamic::Int(v as i64)
    }
}

impl From<f64> for Dynamic {
    fn from(v: f64) -> Self {
        Dynamic::Float(v)
    }
}

impl From<&str> for Dynamic {
    fn from(v: &str) -> Self {
        Dynamic::String(v.to_string())
    }
}

impl From<String> for Dynamic {
    fn from(v: String) -> Self {
        Dynamic::String(v)
    }
}

impl From<Vec<Dynamic>> for Dynamic {
    fn from(v: Vec<Dynamic>) -> Self {
        Dynamic::List(v)
    }
}

impl From<Map> for Dynamic {
    fn from(v: Map) -> Self {
        Dynamic::Map(v)
    }
}

impl<K: Into<String>, V: Into<Dynamic>> FromIterator<(K, V)> for Dynamic {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        Dynamic::Map(
            iter.into_iter()
                .map(|(k, v)| (k.into(), v.into()))
                .collect(),
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn type_names() {
        assert_eq!(Dynamic::Null.type_name(), "null");
        assert_eq!(Dynamic::from(1).type_name(), "int");
        assert_eq!(Dynamic::from("x").type_name(), "string");
        assert_eq!(Dynamic::List(vec![]).type_name(), "list");
        assert_eq!(Dynamic::Map(Map::new()).type_name(), "map");
    }

    #[test]
    fn truthiness() {
        assert!(!Dynamic::Null.is_truthy());
        assert!(!Dynamic::from("").is_truthy());
        assert!(!Dynamic::from(0).is_truthy());
        assert!(Dynamic::from("a").is_truthy());
        assert!(Dynamic::List(vec![Dynamic::Null]).is_truthy());
    }

    #[test]
    fn display_matches_template_rendering() {
        let list = Dynamic::List(vec![1.into(), "b".into(), Dynamic::Null]);
        assert_eq!(list.to_string(), "[1 b ]");

        let map: Dynamic = [("b", 2), ("a", 1)].into_iter().collect();
        assert_eq!(map.to_string(), "map[a:1 b:2]");
    }

    #[test]
    fn mixed_numeric_ordering() {
        assert_eq!(Dynamic::Int(2).total_cmp(&Dynamic::Float(1.5)), Ordering::Greater);
        assert_eq!(
            Dynamic::Float(f64::NAN).total_cmp(&Dynamic::Float(f64::NAN)),
            Ordering::Equal
        );
        assert_eq!(Dynamic::Null.total_cmp(&Dynamic::from("a")), Ordering::Less);
    }
}
