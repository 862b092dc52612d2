use std::collections::HashSet;
use std::rc::Rc;

use crate::edn::EdnValue;
use crate::error::{EdnError, EdnResult};
use crate::primitives::format_float;

/// Render a value tree as EDN text.
///
/// The output is the compact, lossy form: lists and vectors both become
/// `[a,b]`, textual atoms are quoted without escaping, map keys are written
/// as quoted text and tags are dropped. Use `Display` for native EDN.
pub fn stringify(value: &EdnValue) -> EdnResult<String> {
    let mut writer = Writer::default();
    writer.write(value)?;
    Ok(writer.out)
}

#[derive(Debug, Default)]
struct Writer {
    out: String,
    seen: HashSet<*const ()>,
}

impl Writer {
    fn write(&mut self, value: &EdnValue) -> EdnResult<()> {
        match value {
            EdnValue::Integer(i) => self.out.push_str(&i.to_string()),
            EdnValue::Float(f) if f.is_finite() => self.out.push_str(&format_float(*f)),
            EdnValue::String(s) | EdnValue::Symbol(s) | EdnValue::Keyword(s) => self.quoted(s),
            EdnValue::Character(c) => self.quoted(c.encode_utf8(&mut [0; 4])),
            EdnValue::List(items) | EdnValue::Vector(items) => {
                self.visit(Rc::as_ptr(items).cast())?;
                self.sequence("[", items.iter(), "]")?;
            }
            EdnValue::Set(items) => {
                self.visit(Rc::as_ptr(items).cast())?;
                self.sequence("#{", items.iter(), "}")?;
            }
            EdnValue::Map(entries) => {
                self.visit(Rc::as_ptr(entries).cast())?;
                self.out.push('{');
                for (i, (key, value)) in entries.iter().enumerate() {
                    if i > 0 {
                        self.out.push(',');
                    }
                    let key = key_text(key)?;
                    self.quoted(&key);
                    self.out.push(' ');
                    self.write(value)?;
                }
                self.out.push('}');
            }
            EdnValue::Tagged { value, .. } => self.write(value)?,
            other => return Err(EdnError::unsupported(other.type_name())),
        }
        Ok(())
    }

    fn sequence<'v>(
        &mut self,
        open: &str,
        items: impl Iterator<Item = &'v EdnValue>,
        close: &str,
    ) -> EdnResult<()> {
        self.out.push_str(open);
        for (i, item) in items.enumerate() {
            if i > 0 {
                self.out.push(',');
            }
            self.write(item)?;
        }
        self.out.push_str(close);
        Ok(())
    }

    fn quoted(&mut self, text: &str) {
        self.out.push('"');
        self.out.push_str(text);
        self.out.push('"');
    }

    /// Fails when the same shared collection is reached a second time.
    fn visit(&mut self, identity: *const ()) -> EdnResult<()> {
        if self.seen.insert(identity) {
            Ok(())
        } else {
            Err(EdnError::AliasedValue)
        }
    }
}

/// Text of a map key, before quoting.
fn key_text(key: &EdnValue) -> EdnResult<String> {
    match key {
        EdnValue::String(s) | EdnValue::Symbol(s) | EdnValue::Keyword(s) => Ok(s.clone()),
        EdnValue::Character(c) => Ok(c.to_string()),
        EdnValue::Integer(i) => Ok(i.to_string()),
        EdnValue::Float(f) if f.is_finite() => Ok(format_float(*f)),
        EdnValue::Nil => Ok("nil".to_string()),
        EdnValue::Bool(b) => Ok(b.to_string()),
        EdnValue::Tagged { value, .. } => key_text(value),
        other => Err(EdnError::unsupported(other.type_name())),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use indexmap::{IndexMap, IndexSet};
    use pretty_assertions::assert_eq;

    fn string(s: &str) -> EdnValue {
        EdnValue::String(s.to_string())
    }

    fn ints(items: &[i64]) -> EdnValue {
        EdnValue::vector(items.iter().copied().map(EdnValue::Integer).collect())
    }

    #[test]
    fn test_stringify_mixed_document() {
        let inner: IndexMap<_, _> = [(EdnValue::Integer(1), EdnValue::Integer(2))].into();
        let outer: IndexMap<_, _> = [
            (string("zee"), string("zow")),
            (string("seesaw"), EdnValue::map(inner)),
        ]
        .into();
        let set: IndexSet<_> = [string("hi"), EdnValue::Integer(1)].into();

        let value = EdnValue::vector(vec![
            string("hi"),
            ints(&[1, 2, 3]),
            EdnValue::map(outer),
            EdnValue::set(set),
            EdnValue::Float(1.2),
        ]);
        assert_eq!(
            stringify(&value).unwrap(),
            r#"["hi",[1,2,3],{"zee" "zow","seesaw" {"1" 2}},#{"hi",1},1.2]"#
        );
    }

    #[test]
    fn test_stringify_atoms() {
        assert_eq!(stringify(&EdnValue::Integer(-42)).unwrap(), "-42");
        assert_eq!(stringify(&EdnValue::Float(1.0)).unwrap(), "1.0");
        assert_eq!(stringify(&EdnValue::Float(1.3542e21)).unwrap(), "1.3542e21");
        assert_eq!(stringify(&string("a\\nb")).unwrap(), r#""a\nb""#);
        assert_eq!(stringify(&EdnValue::Keyword("ns/k".to_string())).unwrap(), r#""ns/k""#);
        assert_eq!(stringify(&EdnValue::Symbol("sym".to_string())).unwrap(), r#""sym""#);
        assert_eq!(stringify(&EdnValue::Character('x')).unwrap(), r#""x""#);
    }

    #[test]
    fn test_list_and_vector_look_alike() {
        let list = EdnValue::list(vec![EdnValue::Integer(1), EdnValue::Integer(2)]);
        assert_eq!(stringify(&list).unwrap(), stringify(&ints(&[1, 2])).unwrap());
    }

    #[test]
    fn test_empty_collections() {
        assert_eq!(stringify(&EdnValue::vector(vec![])).unwrap(), "[]");
        assert_eq!(stringify(&EdnValue::list(vec![])).unwrap(), "[]");
        assert_eq!(stringify(&EdnValue::set(IndexSet::new())).unwrap(), "#{}");
        assert_eq!(stringify(&EdnValue::map(IndexMap::new())).unwrap(), "{}");
    }

    #[test]
    fn test_tag_is_dropped() {
        let value = EdnValue::tagged("my/point", ints(&[1, 2]));
        assert_eq!(stringify(&value).unwrap(), "[1,2]");
    }

    #[test]
    fn test_map_key_text() {
        let entries: IndexMap<_, _> = [
            (EdnValue::Keyword("a".to_string()), EdnValue::Integer(1)),
            (EdnValue::Nil, EdnValue::Integer(2)),
            (EdnValue::Bool(true), EdnValue::Integer(3)),
            (EdnValue::Float(0.5), EdnValue::Integer(4)),
        ]
        .into();
        assert_eq!(
            stringify(&EdnValue::map(entries)).unwrap(),
            r#"{"a" 1,"nil" 2,"true" 3,"0.5" 4}"#
        );
    }

    #[test]
    fn test_unsupported_values() {
        for value in [
            EdnValue::Nil,
            EdnValue::Bool(false),
            EdnValue::Instant(0),
            EdnValue::Float(f64::NAN),
            EdnValue::Float(f64::NEG_INFINITY),
        ] {
            let err = stringify(&value).unwrap_err();
            assert!(
                matches!(err, EdnError::Unsupported { .. }),
                "{} should not stringify",
                value
            );
        }

        let err = stringify(&EdnValue::vector(vec![EdnValue::Nil])).unwrap_err();
        assert_eq!(err.to_string(), "Cannot stringify value of type nil");
    }

    #[test]
    fn test_unsupported_map_keys() {
        let entries: IndexMap<_, _> = [(ints(&[1]), EdnValue::Integer(1))].into();
        let err = stringify(&EdnValue::map(entries)).unwrap_err();
        assert_eq!(err.to_string(), "Cannot stringify value of type vector");

        let entries: IndexMap<_, _> = [(EdnValue::Instant(0), EdnValue::Integer(1))].into();
        assert!(stringify(&EdnValue::map(entries)).is_err());
    }

    #[test]
    fn test_shared_collection_is_rejected() {
        let shared = ints(&[1, 2]);
        let value = EdnValue::vector(vec![shared.clone(), shared]);
        let err = stringify(&value).unwrap_err();
        assert!(matches!(err, EdnError::AliasedValue));
    }

    #[test]
    fn test_equal_but_distinct_collections_are_fine() {
        let value = EdnValue::vector(vec![ints(&[1, 2]), ints(&[1, 2])]);
        assert_eq!(stringify(&value).unwrap(), "[[1,2],[1,2]]");
    }
}
