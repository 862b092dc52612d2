use indexmap::{IndexMap, IndexSet};
use std::collections::hash_map::DefaultHasher;
use std::fmt;
use std::hash::{Hash, Hasher};
use std::rc::Rc;

use crate::edn::instant::format_instant;
use crate::primitives::{format_character, format_float};

/// EDN value tree. Collections are reference counted so clones share structure.
#[derive(Debug, Clone, PartialEq)]
pub enum EdnValue {
    Nil,
    Bool(bool),
    String(String),
    Keyword(String),
    Symbol(String),
    Character(char),
    Integer(i64),
    Float(f64),
    Vector(Rc<Vec<EdnValue>>),
    List(Rc<Vec<EdnValue>>),
    Map(Rc<IndexMap<EdnValue, EdnValue>>),
    Set(Rc<IndexSet<EdnValue>>),
    Tagged {
        tag: String,
        value: Box<EdnValue>,
    },
    Instant(i64), // milliseconds since the Unix epoch
}

impl EdnValue {
    pub fn list(items: Vec<EdnValue>) -> Self {
        EdnValue::List(Rc::new(items))
    }

    pub fn vector(items: Vec<EdnValue>) -> Self {
        EdnValue::Vector(Rc::new(items))
    }

    pub fn map(entries: IndexMap<EdnValue, EdnValue>) -> Self {
        EdnValue::Map(Rc::new(entries))
    }

    pub fn set(items: IndexSet<EdnValue>) -> Self {
        EdnValue::Set(Rc::new(items))
    }

    pub fn tagged(tag: impl Into<String>, value: EdnValue) -> Self {
        EdnValue::Tagged {
            tag: tag.into(),
            value: Box::new(value),
        }
    }

    /// Returns the type name of this value
    pub fn type_name(&self) -> &'static str {
        match self {
            EdnValue::Nil => "nil",
            EdnValue::Bool(_) => "boolean",
            EdnValue::String(_) => "string",
            EdnValue::Keyword(_) => "keyword",
            EdnValue::Symbol(_) => "symbol",
            EdnValue::Character(_) => "character",
            EdnValue::Integer(_) => "integer",
            EdnValue::Float(_) => "float",
            EdnValue::Vector(_) => "vector",
            EdnValue::List(_) => "list",
            EdnValue::Map(_) => "map",
            EdnValue::Set(_) => "set",
            EdnValue::Tagged { .. } => "tagged",
            EdnValue::Instant(_) => "instant",
        }
    }

    pub fn is_number(&self) -> bool {
        matches!(self, EdnValue::Integer(_) | EdnValue::Float(_))
    }

    /// Get the count of elements in a collection
    pub fn count(&self) -> Option<usize> {
        match self {
            EdnValue::Vector(v) => Some(v.len()),
            EdnValue::List(l) => Some(l.len()),
            EdnValue::Map(m) => Some(m.len()),
            EdnValue::Set(s) => Some(s.len()),
            EdnValue::String(s) => Some(s.chars().count()),
            _ => None,
        }
    }

    /// Get value by key (for maps) or index (for sequences)
    pub fn get(&self, key: &EdnValue) -> Option<&EdnValue> {
        match (self, key) {
            (EdnValue::Map(m), k) => m.get(k),
            (EdnValue::Vector(items), EdnValue::Integer(i))
            | (EdnValue::List(items), EdnValue::Integer(i)) => {
                // Negative indexing from end
                let index = if *i >= 0 { *i } else { items.len() as i64 + i };
                usize::try_from(index).ok().and_then(|index| items.get(index))
            }
            _ => None,
        }
    }

    /// Get nested value using a path of keys
    pub fn get_in<I>(&self, path: I) -> Option<&EdnValue>
    where
        I: IntoIterator<Item = EdnValue>,
    {
        let mut current = Some(self);
        for key in path {
            current = current.and_then(|v| v.get(&key));
        }
        current
    }
}

// Required for map keys and set members. NaN is still never equal to itself.
impl Eq for EdnValue {}

fn hash_one<T: Hash>(value: &T) -> u64 {
    let mut hasher = DefaultHasher::new();
    value.hash(&mut hasher);
    hasher.finish()
}

impl Hash for EdnValue {
    fn hash<H: Hasher>(&self, state: &mut H) {
        std::mem::discriminant(self).hash(state);
        match self {
            EdnValue::Nil => {}
            EdnValue::Bool(b) => b.hash(state),
            EdnValue::String(s) | EdnValue::Keyword(s) | EdnValue::Symbol(s) => s.hash(state),
            EdnValue::Character(c) => c.hash(state),
            EdnValue::Integer(i) | EdnValue::Instant(i) => i.hash(state),
            EdnValue::Float(f) => {
                if f.is_nan() {
                    "NaN".hash(state);
                } else if *f == 0.0 {
                    // 0.0 and -0.0 are equal, so they must hash alike
                    0u64.hash(state);
                } else {
                    f.to_bits().hash(state);
                }
            }
            EdnValue::Vector(v) | EdnValue::List(v) => v.hash(state),
            EdnValue::Map(m) => {
                // Equality ignores entry order, so the hash must too
                let combined = m
                    .iter()
                    .fold(0u64, |acc, entry| acc.wrapping_add(hash_one(&entry)));
                m.len().hash(state);
                combined.hash(state);
            }
            EdnValue::Set(s) => {
                let combined = s.iter().fold(0u64, |acc, item| acc.wrapping_add(hash_one(item)));
                s.len().hash(state);
                combined.hash(state);
            }
            EdnValue::Tagged { tag, value } => {
                tag.hash(state);
                value.hash(state);
            }
        }
    }
}

fn write_items<'a>(
    f: &mut fmt::Formatter<'_>,
    open: &str,
    close: &str,
    items: impl Iterator<Item = &'a EdnValue>,
) -> fmt::Result {
    write!(f, "{}", open)?;
    for (i, item) in items.enumerate() {
        if i > 0 {
            write!(f, " ")?;
        }
        write!(f, "{}", item)?;
    }
    write!(f, "{}", close)
}

/// Native EDN text. Unlike `stringify`, this keeps list parens, keyword colons and tags.
///
/// Non-finite floats (`##NaN`, `##Inf`, `##-Inf`) and characters outside the
/// Basic Multilingual Plane are written in forms the reader does not accept,
/// so those values do not read back.
impl fmt::Display for EdnValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            EdnValue::Nil => write!(f, "nil"),
            EdnValue::Bool(b) => write!(f, "{}", b),
            EdnValue::String(s) => write!(f, "\"{}\"", s),
            EdnValue::Keyword(k) => write!(f, ":{}", k),
            EdnValue::Symbol(s) => write!(f, "{}", s),
            EdnValue::Character(c) => write!(f, "{}", format_character(*c)),
            EdnValue::Integer(i) => write!(f, "{}", i),
            EdnValue::Float(fl) if fl.is_nan() => write!(f, "##NaN"),
            EdnValue::Float(fl) if fl.is_infinite() => {
                write!(f, "{}", if *fl > 0.0 { "##Inf" } else { "##-Inf" })
            }
            EdnValue::Float(fl) => write!(f, "{}", format_float(*fl)),
            EdnValue::Vector(v) => write_items(f, "[", "]", v.iter()),
            EdnValue::List(l) => write_items(f, "(", ")", l.iter()),
            EdnValue::Map(m) => {
                write!(f, "{{")?;
                for (i, (k, v)) in m.iter().enumerate() {
                    if i > 0 {
                        write!(f, " ")?;
                    }
                    write!(f, "{} {}", k, v)?;
                }
                write!(f, "}}")
            }
            EdnValue::Set(s) => write_items(f, "#{", "}", s.iter()),
            EdnValue::Tagged { tag, value } => write!(f, "#{} {}", tag, value),
            EdnValue::Instant(ms) => write!(f, "#inst \"{}\"", format_instant(*ms)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn kw(name: &str) -> EdnValue {
        EdnValue::Keyword(name.to_string())
    }

    #[test]
    fn test_display_forms_without_a_reading() {
        assert_eq!(EdnValue::Float(f64::NAN).to_string(), "##NaN");
        assert_eq!(EdnValue::Float(f64::NEG_INFINITY).to_string(), "##-Inf");
        assert_eq!(EdnValue::Character('\u{1F600}').to_string(), "\\\u{1F600}");
        assert!(crate::parse(&EdnValue::Float(f64::INFINITY).to_string()).is_err());
        assert!(crate::parse(&EdnValue::Character('\u{1F600}').to_string()).is_err());
    }

    #[test]
    fn test_type_names() {
        assert_eq!(EdnValue::Nil.type_name(), "nil");
        assert_eq!(EdnValue::Bool(true).type_name(), "boolean");
        assert_eq!(EdnValue::String("test".to_string()).type_name(), "string");
        assert_eq!(kw("key").type_name(), "keyword");
        assert_eq!(EdnValue::Integer(42).type_name(), "integer");
        assert_eq!(EdnValue::Instant(0).type_name(), "instant");
        assert_eq!(EdnValue::list(vec![]).type_name(), "list");
    }

    #[test]
    fn test_count() {
        let vec = EdnValue::vector(vec![
            EdnValue::Integer(1),
            EdnValue::Integer(2),
            EdnValue::Integer(3),
        ]);
        assert_eq!(vec.count(), Some(3));

        let mut map = IndexMap::new();
        map.insert(kw("a"), EdnValue::Integer(1));
        assert_eq!(EdnValue::map(map).count(), Some(1));

        assert_eq!(EdnValue::String("héllo".to_string()).count(), Some(5));
        assert_eq!(EdnValue::Integer(42).count(), None);
    }

    #[test]
    fn test_get() {
        let vec = EdnValue::vector(vec![
            EdnValue::Integer(10),
            EdnValue::Integer(20),
            EdnValue::Integer(30),
        ]);
        assert_eq!(vec.get(&EdnValue::Integer(0)), Some(&EdnValue::Integer(10)));
        assert_eq!(vec.get(&EdnValue::Integer(-1)), Some(&EdnValue::Integer(30)));
        assert_eq!(vec.get(&EdnValue::Integer(5)), None);
        assert_eq!(vec.get(&EdnValue::Integer(-4)), None);

        let mut map = IndexMap::new();
        map.insert(kw("name"), EdnValue::String("Alice".to_string()));
        let map_val = EdnValue::map(map);
        assert_eq!(
            map_val.get(&kw("name")),
            Some(&EdnValue::String("Alice".to_string()))
        );
        assert_eq!(map_val.get(&kw("age")), None);
    }

    #[test]
    fn test_get_in() {
        let mut inner = IndexMap::new();
        inner.insert(kw("name"), EdnValue::String("Bob".to_string()));
        let mut outer = IndexMap::new();
        outer.insert(kw("users"), EdnValue::vector(vec![EdnValue::map(inner)]));
        let root = EdnValue::map(outer);

        let path = vec![kw("users"), EdnValue::Integer(0), kw("name")];
        assert_eq!(root.get_in(path), Some(&EdnValue::String("Bob".to_string())));
    }

    #[test]
    fn test_collection_kind_is_identity() {
        let items = vec![EdnValue::Integer(1)];
        assert_ne!(EdnValue::list(items.clone()), EdnValue::vector(items));
        assert_ne!(kw("a"), EdnValue::Symbol("a".to_string()));
    }

    #[test]
    fn test_map_equality_ignores_order() {
        use std::collections::HashSet;

        let mut ab = IndexMap::new();
        ab.insert(kw("a"), EdnValue::Integer(1));
        ab.insert(kw("b"), EdnValue::Integer(2));
        let mut ba = IndexMap::new();
        ba.insert(kw("b"), EdnValue::Integer(2));
        ba.insert(kw("a"), EdnValue::Integer(1));

        let (ab, ba) = (EdnValue::map(ab), EdnValue::map(ba));
        assert_eq!(ab, ba);

        let mut seen = HashSet::new();
        seen.insert(ab);
        assert!(seen.contains(&ba));
    }

    #[test]
    fn test_display() {
        assert_eq!(format!("{}", EdnValue::Nil), "nil");
        assert_eq!(format!("{}", EdnValue::Bool(true)), "true");
        assert_eq!(format!("{}", EdnValue::String("hello".to_string())), "\"hello\"");
        assert_eq!(format!("{}", kw("key")), ":key");
        assert_eq!(format!("{}", EdnValue::Float(2.0)), "2.0");
        assert_eq!(format!("{}", EdnValue::Float(f64::NEG_INFINITY)), "##-Inf");
        assert_eq!(format!("{}", EdnValue::Character(' ')), "\\space");

        let list = EdnValue::list(vec![EdnValue::Symbol("+".to_string()), EdnValue::Integer(1)]);
        assert_eq!(format!("{}", list), "(+ 1)");

        let tagged = EdnValue::tagged("my/tag", EdnValue::vector(vec![EdnValue::Integer(2)]));
        assert_eq!(format!("{}", tagged), "#my/tag [2]");

        assert_eq!(
            format!("{}", EdnValue::Instant(482196050520)),
            "#inst \"1985-04-12T23:20:50.520Z\""
        );
    }

    #[test]
    fn test_hash_consistency() {
        use std::collections::HashMap;

        let mut map = HashMap::new();
        let key = EdnValue::String("test".to_string());
        map.insert(key.clone(), "value");
        assert_eq!(map.get(&key), Some(&"value"));

        // NaN keys must not panic even though they never compare equal
        map.insert(EdnValue::Float(f64::NAN), "nan_value");
        let _ = map.get(&EdnValue::Float(f64::NAN));

        map.insert(EdnValue::Float(0.0), "zero");
        assert_eq!(map.get(&EdnValue::Float(-0.0)), Some(&"zero"));
    }
}
