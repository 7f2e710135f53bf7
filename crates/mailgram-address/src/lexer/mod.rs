//! Lexical scanner for structured mail-header values.
//!
//! Implements the shared token layer of RFC 5322: atoms, quoted strings,
//! domain literals, and CFWS (nested comments plus folding whitespace). The
//! scanner is a plain cursor over the input bytes; each grammar above it
//! drives the cursor through the targeted reading methods below.

mod token;

pub(crate) use token::Token;

use crate::error::{Error, Result};

/// Cursor-based scanner over a fully materialized header value.
pub(crate) struct Lexer<'a> {
    input: &'a [u8],
    pos: usize,
}

impl<'a> Lexer<'a> {
    /// Creates a new lexer for the given input.
    pub(crate) const fn new(input: &'a [u8]) -> Self {
        Self { input, pos: 0 }
    }

    /// Returns the current byte position in the input.
    pub(crate) const fn position(&self) -> usize {
        self.pos
    }

    /// Rewinds the cursor to an earlier position.
    pub(crate) fn seek(&mut self, pos: usize) {
        self.pos = pos.min(self.input.len());
    }

    /// Returns true if at end of input.
    pub(crate) const fn is_eof(&self) -> bool {
        self.pos >= self.input.len()
    }

    /// Peeks at the current byte without consuming it.
    pub(crate) fn peek(&self) -> Option<u8> {
        self.input.get(self.pos).copied()
    }

    /// Advances by one byte and returns it.
    pub(crate) fn advance(&mut self) -> Option<u8> {
        let byte = self.peek()?;
        self.pos += 1;
        Some(byte)
    }

    /// Skips folding whitespace (runs of space, tab, CR, LF).
    ///
    /// Returns true if anything was consumed.
    pub(crate) fn skip_fws(&mut self) -> bool {
        let start = self.pos;
        while let Some(b' ' | b'\t' | b'\r' | b'\n') = self.peek() {
            self.pos += 1;
        }
        self.pos > start
    }

    /// Skips comments and folding whitespace.
    ///
    /// Returns the content of the last comment consumed during this call, if
    /// any. Comments nest to arbitrary depth; folding whitespace between
    /// tokens is insignificant.
    pub(crate) fn skip_cfws(&mut self) -> Result<Option<String>> {
        let mut comment = None;
        loop {
            self.skip_fws();
            if self.peek() == Some(b'(') {
                comment = Some(self.read_comment()?);
            } else {
                return Ok(comment);
            }
        }
    }

    /// Reads a parenthesized comment, tracking nesting depth.
    ///
    /// A backslash escapes the following byte; escaped parentheses do not
    /// affect the depth counter. The returned content excludes the outermost
    /// parentheses but keeps inner ones.
    pub(crate) fn read_comment(&mut self) -> Result<String> {
        let start = self.pos;
        self.advance(); // opening '('
        let mut depth = 1usize;
        let mut content: Vec<u8> = Vec::new();
        while let Some(byte) = self.advance() {
            match byte {
                b'\\' => match self.advance() {
                    Some(escaped) => content.push(escaped),
                    None => break,
                },
                b'(' => {
                    depth += 1;
                    content.push(byte);
                }
                b')' => {
                    depth -= 1;
                    if depth == 0 {
                        return Ok(String::from_utf8_lossy(&content).into_owned());
                    }
                    content.push(byte);
                }
                _ => content.push(byte),
            }
        }
        Err(Error::UnterminatedComment { position: start })
    }

    /// Reads a quoted string, resolving backslash escapes.
    ///
    /// Folding whitespace inside the string collapses to a single space.
    pub(crate) fn read_quoted_string(&mut self) -> Result<String> {
        let start = self.pos;
        self.advance(); // opening '"'
        let mut text: Vec<u8> = Vec::new();
        loop {
            match self.advance() {
                Some(b'"') => break,
                Some(b'\\') => match self.advance() {
                    Some(escaped) => text.push(escaped),
                    None => return Err(Error::UnterminatedQuotedString { position: start }),
                },
                Some(b'\r' | b'\n') => {
                    self.skip_fws();
                    if text.last() != Some(&b' ') {
                        text.push(b' ');
                    }
                }
                Some(byte) => text.push(byte),
                None => return Err(Error::UnterminatedQuotedString { position: start }),
            }
        }
        Ok(String::from_utf8_lossy(&text).into_owned())
    }

    /// Reads a run of atom characters.
    pub(crate) fn read_atom(&mut self) -> Result<&'a str> {
        let start = self.pos;
        while let Some(byte) = self.peek() {
            if is_atext(byte) {
                self.pos += 1;
            } else {
                break;
            }
        }
        std::str::from_utf8(&self.input[start..self.pos])
            .map_err(|_| self.syntax_error("invalid UTF-8 in atom"))
    }

    /// Reads a bracketed domain literal, e.g. `[192.0.2.1]`.
    ///
    /// Folding whitespace inside the literal is dropped; the brackets are kept
    /// in the returned text.
    pub(crate) fn read_domain_literal(&mut self) -> Result<String> {
        let start = self.pos;
        self.advance(); // opening '['
        let mut literal: Vec<u8> = vec![b'['];
        loop {
            match self.advance() {
                Some(b']') => {
                    literal.push(b']');
                    return Ok(String::from_utf8_lossy(&literal).into_owned());
                }
                Some(b' ' | b'\t' | b'\r' | b'\n') => {}
                Some(b'\\') => match self.advance() {
                    Some(escaped) => literal.push(escaped),
                    None => return Err(Error::UnterminatedDomainLiteral { position: start }),
                },
                Some(byte) => literal.push(byte),
                None => return Err(Error::UnterminatedDomainLiteral { position: start }),
            }
        }
    }

    /// Reads the next token, skipping insignificant folding whitespace.
    pub(crate) fn next_token(&mut self) -> Result<Token<'a>> {
        loop {
            let Some(byte) = self.peek() else {
                return Ok(Token::Eof);
            };
            return match byte {
                b' ' | b'\t' | b'\r' | b'\n' => {
                    self.skip_fws();
                    continue;
                }
                b'(' => Ok(Token::Comment(self.read_comment()?)),
                b'"' => Ok(Token::QuotedString(self.read_quoted_string()?)),
                b'[' => Ok(Token::DomainLiteral(self.read_domain_literal()?)),
                b'<' => {
                    self.advance();
                    Ok(Token::LAngle)
                }
                b'>' => {
                    self.advance();
                    Ok(Token::RAngle)
                }
                b'@' => {
                    self.advance();
                    Ok(Token::At)
                }
                b',' => {
                    self.advance();
                    Ok(Token::Comma)
                }
                b':' => {
                    self.advance();
                    Ok(Token::Colon)
                }
                b';' => {
                    self.advance();
                    Ok(Token::Semicolon)
                }
                b'.' => {
                    self.advance();
                    Ok(Token::Dot)
                }
                _ if is_atext(byte) => Ok(Token::Atom(self.read_atom()?)),
                _ => Err(self.syntax_error(&format!("unexpected character: {byte:#04x}"))),
            };
        }
    }

    /// Creates a syntax error at the current position.
    pub(crate) fn syntax_error(&self, message: &str) -> Error {
        Error::Syntax {
            position: self.pos,
            message: message.to_string(),
        }
    }
}

/// Returns true if the byte is a valid atom character.
///
/// This is RFC 5322 atext extended with non-ASCII bytes, so UTF-8 text in
/// display names lexes as ordinary atoms (RFC 6532).
pub(crate) const fn is_atext(byte: u8) -> bool {
    byte.is_ascii_alphanumeric()
        || byte >= 0x80
        || matches!(
            byte,
            b'!' | b'#'
                | b'$'
                | b'%'
                | b'&'
                | b'\''
                | b'*'
                | b'+'
                | b'-'
                | b'/'
                | b'='
                | b'?'
                | b'^'
                | b'_'
                | b'`'
                | b'{'
                | b'|'
                | b'}'
                | b'~'
        )
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::redundant_clone, clippy::manual_string_new)]
mod tests {
    use super::*;

    #[test]
    fn test_simple_tokens() {
        let mut lexer = Lexer::new(b"fejj <@> , : ; .");

        assert_eq!(lexer.next_token().unwrap(), Token::Atom("fejj"));
        assert_eq!(lexer.next_token().unwrap(), Token::LAngle);
        assert_eq!(lexer.next_token().unwrap(), Token::At);
        assert_eq!(lexer.next_token().unwrap(), Token::RAngle);
        assert_eq!(lexer.next_token().unwrap(), Token::Comma);
        assert_eq!(lexer.next_token().unwrap(), Token::Colon);
        assert_eq!(lexer.next_token().unwrap(), Token::Semicolon);
        assert_eq!(lexer.next_token().unwrap(), Token::Dot);
        assert_eq!(lexer.next_token().unwrap(), Token::Eof);
    }

    #[test]
    fn test_quoted_string_escapes() {
        let mut lexer = Lexer::new(b"\"Jeffrey \\\"fejj\\\" Stedfast\"");

        assert_eq!(
            lexer.read_quoted_string().unwrap(),
            "Jeffrey \"fejj\" Stedfast"
        );
        assert!(lexer.is_eof());
    }

    #[test]
    fn test_quoted_string_folding_collapses() {
        let mut lexer = Lexer::new(b"\"folded\r\n\t name\"");

        assert_eq!(lexer.read_quoted_string().unwrap(), "folded name");
    }

    #[test]
    fn test_unterminated_quoted_string() {
        let mut lexer = Lexer::new(b"\"no closing quote");

        assert_eq!(
            lexer.read_quoted_string(),
            Err(Error::UnterminatedQuotedString { position: 0 })
        );
    }

    #[test]
    fn test_nested_comments() {
        let mut lexer = Lexer::new(b"(outer (inner (deep)) tail) rest");

        assert_eq!(
            lexer.skip_cfws().unwrap(),
            Some("outer (inner (deep)) tail".to_string())
        );
        assert_eq!(lexer.next_token().unwrap(), Token::Atom("rest"));
    }

    #[test]
    fn test_comment_escapes_do_not_nest() {
        let mut lexer = Lexer::new(b"(escaped \\( paren) x");

        assert_eq!(
            lexer.skip_cfws().unwrap(),
            Some("escaped ( paren".to_string())
        );
        assert_eq!(lexer.next_token().unwrap(), Token::Atom("x"));
    }

    #[test]
    fn test_unterminated_comment() {
        let mut lexer = Lexer::new(b"  (never closed");

        assert_eq!(
            lexer.skip_cfws(),
            Err(Error::UnterminatedComment { position: 2 })
        );
    }

    #[test]
    fn test_skip_cfws_returns_last_comment() {
        let mut lexer = Lexer::new(b" (first) (second) atom");

        assert_eq!(lexer.skip_cfws().unwrap(), Some("second".to_string()));
        assert_eq!(lexer.next_token().unwrap(), Token::Atom("atom"));
    }

    #[test]
    fn test_domain_literal() {
        let mut lexer = Lexer::new(b"[192.0.2.1]");

        assert_eq!(lexer.read_domain_literal().unwrap(), "[192.0.2.1]");
    }

    #[test]
    fn test_domain_literal_drops_folding() {
        let mut lexer = Lexer::new(b"[ 192.0.2.1\r\n ]");

        assert_eq!(lexer.read_domain_literal().unwrap(), "[192.0.2.1]");
    }

    #[test]
    fn test_unterminated_domain_literal() {
        let mut lexer = Lexer::new(b"[invalid.domain");

        assert_eq!(
            lexer.read_domain_literal(),
            Err(Error::UnterminatedDomainLiteral { position: 0 })
        );
    }

    #[test]
    fn test_folding_whitespace_between_atoms() {
        let mut lexer = Lexer::new(b"this is\n\ta folded name");

        let mut atoms = Vec::new();
        loop {
            match lexer.next_token().unwrap() {
                Token::Atom(atom) => atoms.push(atom),
                Token::Eof => break,
                other => panic!("unexpected token: {other:?}"),
            }
        }
        assert_eq!(atoms, ["this", "is", "a", "folded", "name"]);
    }

    #[test]
    fn test_seek_rewinds() {
        let mut lexer = Lexer::new(b"one two");

        assert_eq!(lexer.next_token().unwrap(), Token::Atom("one"));
        let mark = lexer.position();
        assert_eq!(lexer.next_token().unwrap(), Token::Atom("two"));
        lexer.seek(mark);
        assert_eq!(lexer.next_token().unwrap(), Token::Atom("two"));
    }

    #[test]
    fn test_is_atext() {
        assert!(is_atext(b'a'));
        assert!(is_atext(b'Z'));
        assert!(is_atext(b'0'));
        assert!(is_atext(b'='));
        assert!(is_atext(b'?'));
        assert!(is_atext(0x80));
        assert!(!is_atext(b' '));
        assert!(!is_atext(b'@'));
        assert!(!is_atext(b'<'));
        assert!(!is_atext(b'('));
        assert!(!is_atext(b'['));
        assert!(!is_atext(b'.'));
        assert!(!is_atext(b'"'));
    }
}
