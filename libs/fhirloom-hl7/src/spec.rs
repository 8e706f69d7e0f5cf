//! Tokenizes and parses spec paths: `SEGMENT[.FIELD[(REP)][.COMPONENT[.SUBCOMPONENT]]]`,
//! `$field[.n[.n]]`, and top-level `A | B` alternation.
//!
//! Hand-written, character-stepping, in the same style as a recursive-descent
//! expression lexer rather than built on the external HL7 parser's own
//! (narrower) location-query grammar, because this grammar adds repetition
//! indices, `$field` re-rooting, and alternation that grammar doesn't cover.

use crate::error::{Error, Result};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Root {
    Segment(String),
    Field,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SpecPath {
    pub root: Root,
    /// For `Root::Segment`, the 1-based field index. For `Root::Field`, the
    /// 1-based component index into the bound sub-tree.
    pub field: Option<usize>,
    /// 1-based repetition index; only meaningful for `Root::Segment`.
    pub rep: Option<usize>,
    pub component: Option<usize>,
    pub subcomponent: Option<usize>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Spec {
    pub alternatives: Vec<SpecPath>,
}

impl Spec {
    pub fn parse(source: &str) -> Result<Spec> {
        let alternatives = source
            .split('|')
            .map(parse_single)
            .collect::<Result<Vec<_>>>()?;
        Ok(Spec { alternatives })
    }
}

struct Lexer<'a> {
    chars: Vec<char>,
    position: usize,
    source: &'a str,
}

impl<'a> Lexer<'a> {
    fn new(source: &'a str) -> Self {
        Self {
            chars: source.chars().collect(),
            position: 0,
            source,
        }
    }

    fn peek(&self) -> Option<char> {
        self.chars.get(self.position).copied()
    }

    fn advance(&mut self) -> Option<char> {
        let c = self.peek();
        if c.is_some() {
            self.position += 1;
        }
        c
    }

    fn take_while(&mut self, pred: impl Fn(char) -> bool) -> String {
        let start = self.position;
        while matches!(self.peek(), Some(c) if pred(c)) {
            self.position += 1;
        }
        self.chars[start..self.position].iter().collect()
    }

    fn expect(&mut self, expected: char) -> Result<()> {
        match self.advance() {
            Some(c) if c == expected => Ok(()),
            other => Err(Error::InvalidSpec(format!(
                "expected '{expected}' in '{}', found {:?}",
                self.source, other
            ))),
        }
    }

    fn expect_end(&self) -> Result<()> {
        if self.peek().is_some() {
            Err(Error::InvalidSpec(format!(
                "unexpected trailing input in '{}'",
                self.source
            )))
        } else {
            Ok(())
        }
    }
}

fn parse_segment_name(lexer: &mut Lexer) -> Result<String> {
    let name = lexer.take_while(|c| c.is_ascii_alphanumeric());
    if name.is_empty() {
        return Err(Error::InvalidSpec(format!(
            "expected segment name in '{}'",
            lexer.source
        )));
    }
    Ok(name)
}

fn parse_number(lexer: &mut Lexer) -> Result<usize> {
    let digits = lexer.take_while(|c| c.is_ascii_digit());
    digits
        .parse()
        .map_err(|_| Error::InvalidSpec(format!("expected number in '{}'", lexer.source)))
}

fn parse_single(source: &str) -> Result<SpecPath> {
    let trimmed = source.trim();
    let mut lexer = Lexer::new(trimmed);

    let root = if lexer.peek() == Some('$') {
        lexer.advance();
        let word = lexer.take_while(|c| c.is_ascii_alphanumeric());
        if word != "field" {
            return Err(Error::InvalidSpec(format!(
                "unknown root variable '${word}' in '{trimmed}'"
            )));
        }
        Root::Field
    } else {
        Root::Segment(parse_segment_name(&mut lexer)?)
    };

    let mut path = SpecPath {
        root,
        field: None,
        rep: None,
        component: None,
        subcomponent: None,
    };

    if lexer.peek() == Some('.') {
        lexer.advance();
        path.field = Some(parse_number(&mut lexer)?);

        if lexer.peek() == Some('(') {
            lexer.advance();
            path.rep = Some(parse_number(&mut lexer)?);
            lexer.expect(')')?;
        }

        if lexer.peek() == Some('.') {
            lexer.advance();
            path.component = Some(parse_number(&mut lexer)?);

            if lexer.peek() == Some('.') {
                lexer.advance();
                path.subcomponent = Some(parse_number(&mut lexer)?);
            }
        }
    }

    lexer.expect_end()?;
    Ok(path)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_bare_segment() {
        let spec = Spec::parse("MSH").unwrap();
        assert_eq!(spec.alternatives[0].root, Root::Segment("MSH".to_string()));
        assert_eq!(spec.alternatives[0].field, None);
    }

    #[test]
    fn parses_segment_field() {
        let spec = Spec::parse("PID.7").unwrap();
        assert_eq!(spec.alternatives.len(), 1);
        assert_eq!(spec.alternatives[0].field, Some(7));
    }

    #[test]
    fn parses_repetition_and_component() {
        let spec = Spec::parse("PID.3(1).1").unwrap();
        let path = &spec.alternatives[0];
        assert_eq!(path.field, Some(3));
        assert_eq!(path.rep, Some(1));
        assert_eq!(path.component, Some(1));
    }

    #[test]
    fn parses_field_reroot() {
        let spec = Spec::parse("$field.2").unwrap();
        assert_eq!(spec.alternatives[0].root, Root::Field);
        assert_eq!(spec.alternatives[0].field, Some(2));
    }

    #[test]
    fn parses_alternation() {
        let spec = Spec::parse("PID.7 | PID.29").unwrap();
        assert_eq!(spec.alternatives.len(), 2);
    }

    #[test]
    fn rejects_trailing_garbage() {
        assert!(Spec::parse("PID.7x").is_err());
    }

    #[test]
    fn rejects_unclosed_repetition() {
        assert!(Spec::parse("AL1.3(1").is_err());
    }
}
