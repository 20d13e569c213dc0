//! Selectors accepted by `Dom` queries: tag, `#id`, `[attr]`, `[attr=value]`
//! and `:checked`, with whitespace meaning "descendant of". Identifiers take
//! backslash escapes, so `#pet\.owner-yes` names the id `pet.owner-yes`.

use crate::{Error, Result};

#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) enum AttrTest {
    Present(String),
    Equals(String, String),
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub(crate) struct Compound {
    pub(crate) tag: Option<String>,
    pub(crate) id: Option<String>,
    pub(crate) attrs: Vec<AttrTest>,
    pub(crate) checked: bool,
}

/// Compounds ordered outermost first; the last one matches the element itself.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct Selector {
    pub(crate) compounds: Vec<Compound>,
}

impl Selector {
    pub(crate) fn parse(src: &str) -> Result<Self> {
        let unsupported = || Error::UnsupportedSelector(src.to_string());
        let chars = src.trim().chars().collect::<Vec<_>>();
        let mut compounds = Vec::new();
        let mut pos = 0;

        while pos < chars.len() {
            let (compound, next) = parse_compound(&chars, pos).ok_or_else(unsupported)?;
            compounds.push(compound);
            pos = skip_whitespace(&chars, next);
            // Anything other than whitespace between compounds is a
            // combinator or syntax we do not handle.
            if pos == next && pos < chars.len() {
                return Err(unsupported());
            }
        }

        if compounds.is_empty() {
            return Err(unsupported());
        }
        Ok(Self { compounds })
    }

    /// The id when the selector is a bare `#id`.
    pub(crate) fn id_only(&self) -> Option<&str> {
        match self.compounds.as_slice() {
            [Compound {
                tag: None,
                id: Some(id),
                attrs,
                checked: false,
            }] if attrs.is_empty() => Some(id.as_str()),
            _ => None,
        }
    }
}

fn parse_compound(chars: &[char], start: usize) -> Option<(Compound, usize)> {
    let mut compound = Compound::default();
    let mut pos = start;

    if let Some((tag, next)) = read_ident(chars, pos) {
        compound.tag = Some(tag.to_ascii_lowercase());
        pos = next;
    }

    loop {
        match chars.get(pos) {
            Some('#') => {
                let (id, next) = read_ident(chars, pos + 1)?;
                if compound.id.replace(id).is_some() {
                    return None;
                }
                pos = next;
            }
            Some('[') => {
                let (test, next) = read_attr_test(chars, pos + 1)?;
                compound.attrs.push(test);
                pos = next;
            }
            Some(':') => {
                let (name, next) = read_ident(chars, pos + 1)?;
                if !name.eq_ignore_ascii_case("checked") {
                    return None;
                }
                compound.checked = true;
                pos = next;
            }
            _ => break,
        }
    }

    (pos > start).then_some((compound, pos))
}

fn read_ident(chars: &[char], start: usize) -> Option<(String, usize)> {
    let mut out = String::new();
    let mut pos = start;
    while let Some(&ch) = chars.get(pos) {
        if ch == '\\' {
            out.push(*chars.get(pos + 1)?);
            pos += 2;
        } else if ch.is_ascii_alphanumeric() || ch == '_' || ch == '-' || !ch.is_ascii() {
            out.push(ch);
            pos += 1;
        } else {
            break;
        }
    }
    (!out.is_empty()).then_some((out, pos))
}

fn read_quoted(chars: &[char], start: usize, quote: char) -> Option<(String, usize)> {
    let mut out = String::new();
    let mut pos = start;
    loop {
        match *chars.get(pos)? {
            '\\' => {
                out.push(*chars.get(pos + 1)?);
                pos += 2;
            }
            ch if ch == quote => return Some((out, pos + 1)),
            ch => {
                out.push(ch);
                pos += 1;
            }
        }
    }
}

/// Parses the body of `[...]`, starting just after the bracket.
fn read_attr_test(chars: &[char], start: usize) -> Option<(AttrTest, usize)> {
    let (key, next) = read_ident(chars, skip_whitespace(chars, start))?;
    let key = key.to_ascii_lowercase();
    let pos = skip_whitespace(chars, next);

    match *chars.get(pos)? {
        ']' => Some((AttrTest::Present(key), pos + 1)),
        '=' => {
            let pos = skip_whitespace(chars, pos + 1);
            let (value, next) = match *chars.get(pos)? {
                quote @ ('"' | '\'') => read_quoted(chars, pos + 1, quote)?,
                _ => read_ident(chars, pos)?,
            };
            let pos = skip_whitespace(chars, next);
            (chars.get(pos) == Some(&']')).then_some((AttrTest::Equals(key, value), pos + 1))
        }
        _ => None,
    }
}

fn skip_whitespace(chars: &[char], mut pos: usize) -> usize {
    while chars.get(pos).is_some_and(|ch| ch.is_ascii_whitespace()) {
        pos += 1;
    }
    pos
}
