use indexmap::{IndexMap, IndexSet};
use smallvec::SmallVec;

use crate::edn::lexer::{CollectionKind, Lexer, Token};
use crate::edn::tags::TagTransformers;
use crate::edn::EdnValue;
use crate::error::{EdnError, EdnResult};

/// Deepest collection nesting accepted. Dropping, hashing and writing a value
/// all recurse once per level, so the bound keeps them within a thread stack.
pub const MAX_DEPTH: usize = 512;

/// A collection that has been opened but not yet closed.
#[derive(Debug)]
enum Context {
    List(Vec<EdnValue>),
    Vector(Vec<EdnValue>),
    Map {
        entries: IndexMap<EdnValue, EdnValue>,
        pending_key: Option<EdnValue>,
    },
    Set(IndexSet<EdnValue>),
}

impl Context {
    fn open(kind: CollectionKind) -> Self {
        match kind {
            CollectionKind::List => Context::List(Vec::new()),
            CollectionKind::Vector => Context::Vector(Vec::new()),
            CollectionKind::Map => Context::Map {
                entries: IndexMap::new(),
                pending_key: None,
            },
            CollectionKind::Set => Context::Set(IndexSet::new()),
        }
    }

    fn kind(&self) -> CollectionKind {
        match self {
            Context::List(_) => CollectionKind::List,
            Context::Vector(_) => CollectionKind::Vector,
            Context::Map { .. } => CollectionKind::Map,
            Context::Set(_) => CollectionKind::Set,
        }
    }

    fn push(&mut self, value: EdnValue) {
        match self {
            Context::List(items) | Context::Vector(items) => items.push(value),
            // Duplicates are dropped; the first occurrence keeps its place
            Context::Set(items) => {
                items.insert(value);
            }
            Context::Map {
                entries,
                pending_key,
            } => match pending_key.take() {
                Some(key) => {
                    entries.insert(key, value);
                }
                None => *pending_key = Some(value),
            },
        }
    }

    fn finish(self) -> EdnResult<EdnValue> {
        match self {
            Context::List(items) => Ok(EdnValue::list(items)),
            Context::Vector(items) => Ok(EdnValue::vector(items)),
            Context::Map {
                pending_key: Some(_),
                ..
            } => Err(EdnError::OddMapForms),
            Context::Map { entries, .. } => Ok(EdnValue::map(entries)),
            Context::Set(items) => Ok(EdnValue::set(items)),
        }
    }
}

#[derive(Debug)]
struct Frame {
    context: Context,
    tag: Option<String>,
}

/// Stack-based EDN reader.
///
/// Tokens from the [`Lexer`] either open a new context, close the current
/// one, set the pending tag, or emit a finished value into the innermost open
/// context. With nothing open, values land in the implicit top-level list,
/// so a document of several forms reads as one list.
#[derive(Debug)]
pub struct Parser<'a> {
    lexer: Lexer<'a>,
    transformers: &'a TagTransformers,
    forms: Vec<EdnValue>,
    stack: SmallVec<[Frame; 8]>,
    pending_tag: Option<String>,
}

impl<'a> Parser<'a> {
    pub fn new(input: &'a str, transformers: &'a TagTransformers) -> Self {
        Self {
            lexer: Lexer::new(input),
            transformers,
            forms: Vec::new(),
            stack: SmallVec::new(),
            pending_tag: None,
        }
    }

    /// Read the whole input into a list of its top-level forms.
    pub fn parse(mut self) -> EdnResult<EdnValue> {
        while let Some(token) = self.lexer.next_token()? {
            match token {
                Token::Open(kind) => self.open(kind)?,
                Token::Close(closer) => self.close(closer)?,
                Token::Literal(value) => self.emit_literal(value)?,
                Token::Tag(tag) => self.set_tag(tag)?,
                Token::Comment => {}
            }
        }
        self.finish()
    }

    fn open(&mut self, kind: CollectionKind) -> EdnResult<()> {
        if self.stack.len() >= MAX_DEPTH {
            return Err(EdnError::TooDeep { limit: MAX_DEPTH });
        }
        let tag = self.pending_tag.take();
        self.stack.push(Frame {
            context: Context::open(kind),
            tag,
        });
        Ok(())
    }

    fn close(&mut self, closer: char) -> EdnResult<()> {
        if let Some(tag) = self.pending_tag.take() {
            return Err(EdnError::DanglingTag { tag });
        }
        let Some(frame) = self.stack.pop() else {
            return Err(EdnError::UnmatchedDelimiter {
                found: closer,
                open: "none",
            });
        };
        let open = frame.context.kind();
        if !open.closed_by(closer) {
            return Err(EdnError::UnmatchedDelimiter {
                found: closer,
                open: open.name(),
            });
        }

        let value = frame.context.finish()?;
        let value = match frame.tag {
            Some(tag) => self.apply_tag(tag, value)?,
            None => value,
        };
        self.route(value);
        Ok(())
    }

    fn emit_literal(&mut self, value: EdnValue) -> EdnResult<()> {
        let value = match self.pending_tag.take() {
            Some(tag) => {
                // Only namespaced or registered tags may decorate a number
                if value.is_number() && !tag.contains('/') && !self.transformers.contains(&tag) {
                    return Err(EdnError::TaggedNumber {
                        tag,
                        literal: value.to_string(),
                    });
                }
                self.apply_tag(tag, value)?
            }
            None => value,
        };
        self.route(value);
        Ok(())
    }

    fn set_tag(&mut self, tag: String) -> EdnResult<()> {
        match self.pending_tag.take() {
            Some(first) => Err(EdnError::ConsecutiveTags { first, second: tag }),
            None => {
                self.pending_tag = Some(tag);
                Ok(())
            }
        }
    }

    fn apply_tag(&self, tag: String, value: EdnValue) -> EdnResult<EdnValue> {
        match self.transformers.get(&tag) {
            Some(transform) => transform(value).map_err(|e| EdnError::transform(tag, e)),
            None => Ok(EdnValue::tagged(tag, value)),
        }
    }

    /// Hand a finished value to the innermost open context.
    fn route(&mut self, value: EdnValue) {
        match self.stack.last_mut() {
            Some(frame) => frame.context.push(value),
            None => self.forms.push(value),
        }
    }

    fn finish(self) -> EdnResult<EdnValue> {
        if let Some(tag) = self.pending_tag {
            return Err(EdnError::DanglingTag { tag });
        }
        if let Some(frame) = self.stack.last() {
            return Err(EdnError::UnterminatedCollection {
                kind: frame.context.kind().name(),
            });
        }
        Ok(EdnValue::list(self.forms))
    }
}
