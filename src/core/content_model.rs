//! Element Content-Model Grammar
//!
//! Recursive descent over the characters of a content model such as
//! `(font-face,missing-glyph?,(glyph|hkern)*)`. Groups hold ordered
//! children, a repetition modifier and the separator used inside them.
//! Names are case-sensitive; `#PCDATA` is an ordinary leaf name.

use crate::error::{ErrorKind, ParseError};

/// Deepest group nesting accepted in a content model
pub const MAX_GROUP_DEPTH: usize = 256;

/// Repetition modifier on a name or group
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Modifier {
    #[default]
    None,
    /// `?`
    Optional,
    /// `*`
    ZeroOrMore,
    /// `+`
    OneOrMore,
}

impl Modifier {
    pub fn from_char(ch: char) -> Option<Self> {
        match ch {
            '?' => Some(Modifier::Optional),
            '*' => Some(Modifier::ZeroOrMore),
            '+' => Some(Modifier::OneOrMore),
            _ => None,
        }
    }

    pub fn as_char(self) -> Option<char> {
        match self {
            Modifier::None => None,
            Modifier::Optional => Some('?'),
            Modifier::ZeroOrMore => Some('*'),
            Modifier::OneOrMore => Some('+'),
        }
    }

    /// `*` and `+` allow more than one occurrence
    #[inline]
    pub fn is_repeating(self) -> bool {
        matches!(self, Modifier::ZeroOrMore | Modifier::OneOrMore)
    }
}

/// Separator used within a group
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SequenceType {
    /// Single-child group, no separator seen
    #[default]
    Unspecified,
    /// `,`
    Sequence,
    /// `|`
    Choice,
}

/// Node of a parsed content model
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ContentModelNode {
    Leaf {
        name: String,
        modifier: Modifier,
    },
    Group {
        children: Vec<ContentModelNode>,
        modifier: Modifier,
        sequence: SequenceType,
    },
}

impl ContentModelNode {
    /// An empty group, the model of EMPTY and ANY declarations
    pub fn empty() -> Self {
        ContentModelNode::Group {
            children: Vec::new(),
            modifier: Modifier::None,
            sequence: SequenceType::Unspecified,
        }
    }

    /// Parse a parenthesized content model
    pub fn parse(content: &str) -> Result<Self, ParseError> {
        let chars: Vec<char> = content.chars().filter(|c| !c.is_whitespace()).collect();
        if chars.len() < 3 || chars[0] != '(' {
            return Err(ParseError::grammar(
                format!("content model must be a parenthesized group: {content:?}"),
                0,
            ));
        }

        let mut parser = ModelParser { chars: &chars, pos: 1 };
        let (children, sequence) = parser.group_body(1)?;
        let modifier = parser.modifier();
        if parser.pos != chars.len() {
            return Err(ParseError::grammar(
                format!("unbalanced parentheses in content model {content:?}"),
                parser.pos,
            ));
        }

        Ok(ContentModelNode::Group {
            children,
            modifier,
            sequence,
        })
    }

    #[inline]
    pub fn is_leaf(&self) -> bool {
        matches!(self, ContentModelNode::Leaf { .. })
    }

    /// Element name of a leaf
    pub fn name(&self) -> Option<&str> {
        match self {
            ContentModelNode::Leaf { name, .. } => Some(name),
            ContentModelNode::Group { .. } => None,
        }
    }

    pub fn modifier(&self) -> Modifier {
        match self {
            ContentModelNode::Leaf { modifier, .. } | ContentModelNode::Group { modifier, .. } => {
                *modifier
            }
        }
    }

    pub fn sequence_type(&self) -> SequenceType {
        match self {
            ContentModelNode::Leaf { .. } => SequenceType::Unspecified,
            ContentModelNode::Group { sequence, .. } => *sequence,
        }
    }

    pub fn children(&self) -> &[ContentModelNode] {
        match self {
            ContentModelNode::Leaf { .. } => &[],
            ContentModelNode::Group { children, .. } => children,
        }
    }

    /// Modifier of the first leaf named `name` anywhere in this subtree
    pub fn modifier_of(&self, name: &str) -> Option<Modifier> {
        match self {
            ContentModelNode::Leaf { name: leaf, modifier } => (leaf == name).then_some(*modifier),
            ContentModelNode::Group { children, .. } => {
                children.iter().find_map(|child| child.modifier_of(name))
            }
        }
    }

    /// True if `name` can occur more than once under this node
    ///
    /// Either the leaf itself repeats, or it sits anywhere inside a
    /// repeating group.
    pub fn is_array(&self, name: &str) -> bool {
        match self {
            ContentModelNode::Leaf { name: leaf, modifier } => {
                leaf == name && modifier.is_repeating()
            }
            ContentModelNode::Group {
                children, modifier, ..
            } => {
                if modifier.is_repeating() {
                    children.iter().any(|child| child.modifier_of(name).is_some())
                } else {
                    children.iter().any(|child| child.is_array(name))
                }
            }
        }
    }
}

struct ModelParser<'c> {
    chars: &'c [char],
    pos: usize,
}

impl<'c> ModelParser<'c> {
    #[inline]
    fn peek(&self) -> Option<char> {
        self.chars.get(self.pos).copied()
    }

    fn modifier(&mut self) -> Modifier {
        match self.peek().and_then(Modifier::from_char) {
            Some(modifier) => {
                self.pos += 1;
                modifier
            }
            None => Modifier::None,
        }
    }

    fn unbalanced(&self, open: usize) -> ParseError {
        ParseError::grammar(
            format!("unbalanced parentheses: group opened at {open} is never closed"),
            open,
        )
    }

    /// Parse the children of a group whose `(` was just consumed,
    /// through its closing `)`
    fn group_body(
        &mut self,
        depth: usize,
    ) -> Result<(Vec<ContentModelNode>, SequenceType), ParseError> {
        let open = self.pos.saturating_sub(1);
        let mut children = Vec::new();
        let mut sequence = SequenceType::Unspecified;

        loop {
            match self.peek() {
                None => return Err(self.unbalanced(open)),
                Some('(') => {
                    if depth >= MAX_GROUP_DEPTH {
                        return Err(ParseError::new(
                            ErrorKind::Limit,
                            format!("content model nests deeper than {MAX_GROUP_DEPTH} groups"),
                            self.pos,
                        ));
                    }
                    self.pos += 1;
                    let (nested, nested_sequence) = self.group_body(depth + 1)?;
                    let modifier = self.modifier();
                    children.push(ContentModelNode::Group {
                        children: nested,
                        modifier,
                        sequence: nested_sequence,
                    });
                }
                Some(_) => {
                    let mut name = String::new();
                    let mut pending: Option<char> = None;

                    loop {
                        let ch = self.peek().ok_or_else(|| self.unbalanced(open))?;
                        self.pos += 1;
                        match ch {
                            '+' | '*' | '?' => pending = Some(ch),
                            ',' | '|' | ')' => {
                                if !name.is_empty() {
                                    let modifier =
                                        pending.and_then(Modifier::from_char).unwrap_or_default();
                                    children.push(ContentModelNode::Leaf { name, modifier });
                                }
                                match ch {
                                    ',' => sequence = SequenceType::Sequence,
                                    '|' => sequence = SequenceType::Choice,
                                    _ => return Ok((children, sequence)),
                                }
                                break;
                            }
                            '(' => {
                                return Err(ParseError::grammar(
                                    format!("unexpected '(' after name {name:?}"),
                                    self.pos - 1,
                                ));
                            }
                            _ => {
                                // A modifier followed by more name characters is part of the name
                                if let Some(modifier) = pending.take() {
                                    name.push(modifier);
                                }
                                name.push(ch);
                            }
                        }
                    }
                }
            }
        }
    }
}
