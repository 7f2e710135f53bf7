//! The address grammar: mailboxes, groups, routes, and the lenient fallback.
//!
//! Parsing is a recursive descent over the lexer. Each address is tried
//! against the strict RFC 5322 grammar first (display-name phrase, then an
//! angle address, group, or bare addr-spec); when that fails the parser
//! rewinds and accepts a bare identifier token with no domain, matching how
//! real-world software copes with ancient and broken mail. Only when both
//! attempts fail does the caller see an error.

use crate::address::{Address, AddressList, Group, Mailbox};
use crate::domain_list::{self, DomainList};
use crate::error::{Error, Result};
use crate::lexer::{self, Lexer};
use crate::options::ParserOptions;
use crate::rfc2047;

/// Nesting limit for groups inside groups; deeper input is rejected rather
/// than risking unbounded recursion on adversarial input.
const MAX_GROUP_DEPTH: usize = 10;

/// Parses a comma-separated address list.
pub(crate) fn parse_address_list(text: &str, options: &ParserOptions) -> Result<AddressList> {
    let mut lexer = Lexer::new(text.as_bytes());
    lexer.skip_cfws()?;
    if lexer.is_eof() {
        return Err(Error::EmptyInput);
    }
    let mut list = AddressList::new();
    loop {
        lexer.skip_cfws()?;
        match lexer.peek() {
            None => break,
            // Stray separators between addresses are dropped, not an error.
            Some(b',' | b';') => {
                lexer.advance();
            }
            Some(_) => {
                list.push(parse_address(&mut lexer, options, 0)?);
                lexer.skip_cfws()?;
                match lexer.peek() {
                    None => break,
                    Some(b',' | b';') => {
                        lexer.advance();
                    }
                    Some(_) => {
                        return Err(lexer.syntax_error("expected ',' between addresses"));
                    }
                }
            }
        }
    }
    Ok(list)
}

/// Parses one address, strict grammar first, lenient bare-token second.
///
/// When both fail, the strict error is surfaced since it carries the more
/// useful offset.
fn parse_address(lexer: &mut Lexer<'_>, options: &ParserOptions, depth: usize) -> Result<Address> {
    let start = lexer.position();
    match parse_address_strict(lexer, options, depth) {
        Ok(address) => Ok(address),
        Err(error) => {
            lexer.seek(start);
            parse_bare_token(lexer).map_err(|_| error)
        }
    }
}

/// A word inside a display-name phrase or local part.
#[derive(Debug)]
enum Word<'a> {
    Atom(&'a str),
    Quoted(String),
    Dot,
}

/// Collects the phrase/local-part words at the cursor: atoms, quoted
/// strings, and dots, with CFWS between them discarded.
fn collect_words<'a>(lexer: &mut Lexer<'a>) -> Result<Vec<Word<'a>>> {
    let mut words = Vec::new();
    loop {
        lexer.skip_cfws()?;
        match lexer.peek() {
            Some(b'"') => words.push(Word::Quoted(lexer.read_quoted_string()?)),
            Some(b'.') => {
                lexer.advance();
                words.push(Word::Dot);
            }
            Some(byte) if lexer::is_atext(byte) => words.push(Word::Atom(lexer.read_atom()?)),
            _ => return Ok(words),
        }
    }
}

fn parse_address_strict(
    lexer: &mut Lexer<'_>,
    options: &ParserOptions,
    depth: usize,
) -> Result<Address> {
    let words = collect_words(lexer)?;
    lexer.skip_cfws()?;
    match lexer.peek() {
        Some(b'<') => {
            let (name, charset) = assemble_phrase(&words, options);
            let (route, address) = parse_angle_addr(lexer)?;
            let mut mailbox = Mailbox {
                name,
                route,
                address,
                charset,
            };
            if mailbox.name.is_empty() {
                if let Some(comment) = lexer.skip_cfws()? {
                    mailbox.name = collapse_whitespace(&comment);
                }
            }
            Ok(Address::Mailbox(mailbox))
        }
        Some(b':') => {
            if depth >= MAX_GROUP_DEPTH {
                return Err(lexer.syntax_error("group nesting too deep"));
            }
            lexer.advance();
            let (name, _) = assemble_phrase(&words, options);
            let members = parse_group_members(lexer, options, depth + 1)?;
            Ok(Address::Group(Group { name, members }))
        }
        Some(b'@') => {
            let Some(local) = assemble_local_part(&words) else {
                return Err(lexer.syntax_error("expected local part before '@'"));
            };
            lexer.advance();
            lexer.skip_cfws()?;
            let domain = domain_list::read_domain(lexer)?;
            let mut mailbox = Mailbox::new("", format!("{local}@{domain}"));
            // An address followed by nothing but a comment uses that comment
            // as its display name: "fejj@helixcode.com (Jeffrey Stedfast)".
            if let Some(comment) = lexer.skip_cfws()? {
                mailbox.name = collapse_whitespace(&comment);
            }
            Ok(Address::Mailbox(mailbox))
        }
        _ => Err(lexer.syntax_error("expected '<', ':' or '@' after phrase")),
    }
}

/// Parses `<[route:]local@domain>` after the phrase; the cursor sits on `<`.
fn parse_angle_addr(lexer: &mut Lexer<'_>) -> Result<(Option<DomainList>, String)> {
    lexer.advance(); // '<'
    lexer.skip_cfws()?;
    let route = if lexer.peek() == Some(b'@') {
        let route = domain_list::parse_route(lexer)?;
        lexer.skip_cfws()?;
        if lexer.peek() == Some(b':') {
            lexer.advance();
        } else {
            return Err(lexer.syntax_error("expected ':' after source route"));
        }
        if route.is_empty() { None } else { Some(route) }
    } else {
        None
    };
    let address = parse_addr_spec(lexer)?;
    lexer.skip_cfws()?;
    if lexer.peek() == Some(b'>') {
        lexer.advance();
    } else {
        return Err(lexer.syntax_error("expected '>' after address"));
    }
    Ok((route, address))
}

/// Parses `local-part[@domain]`; the domain is optional to tolerate ancient
/// addresses that never had one.
fn parse_addr_spec(lexer: &mut Lexer<'_>) -> Result<String> {
    let words = collect_words(lexer)?;
    let Some(local) = assemble_local_part(&words) else {
        return Err(lexer.syntax_error("expected address"));
    };
    lexer.skip_cfws()?;
    if lexer.peek() == Some(b'@') {
        lexer.advance();
        lexer.skip_cfws()?;
        let domain = domain_list::read_domain(lexer)?;
        Ok(format!("{local}@{domain}"))
    } else {
        Ok(local)
    }
}

/// Parses group members up to the terminating `;`. A missing terminator at
/// end of input is tolerated for a top-level group only; a nested group must
/// close before its parent can.
fn parse_group_members(
    lexer: &mut Lexer<'_>,
    options: &ParserOptions,
    depth: usize,
) -> Result<AddressList> {
    let mut members = AddressList::new();
    loop {
        lexer.skip_cfws()?;
        match lexer.peek() {
            None => {
                if depth > 1 {
                    return Err(lexer.syntax_error("expected ';' to terminate group"));
                }
                break;
            }
            Some(b';') => {
                lexer.advance();
                break;
            }
            Some(b',') => {
                lexer.advance();
            }
            Some(_) => {
                members.push(parse_address(lexer, options, depth)?);
                lexer.skip_cfws()?;
                match lexer.peek() {
                    None => {
                        if depth > 1 {
                            return Err(lexer.syntax_error("expected ';' to terminate group"));
                        }
                        break;
                    }
                    Some(b',') => {
                        lexer.advance();
                    }
                    Some(b';') => {
                        lexer.advance();
                        break;
                    }
                    Some(_) => {
                        return Err(lexer.syntax_error("expected ',' or ';' in group"));
                    }
                }
            }
        }
    }
    Ok(members)
}

/// Lenient fallback: a bare dotted identifier with no `@`, no angle
/// brackets, and nothing after it but a separator becomes a mailbox whose
/// address is the token verbatim.
fn parse_bare_token(lexer: &mut Lexer<'_>) -> Result<Address> {
    lexer.skip_cfws()?;
    let position = lexer.position();
    let mut address = String::new();
    loop {
        match lexer.peek() {
            Some(b'.') => {
                lexer.advance();
                address.push('.');
            }
            Some(byte) if lexer::is_atext(byte) => address.push_str(lexer.read_atom()?),
            _ => break,
        }
    }
    if address.is_empty() {
        return Err(Error::Syntax {
            position,
            message: "expected an address".to_string(),
        });
    }
    lexer.skip_cfws()?;
    match lexer.peek() {
        None | Some(b',' | b';') => Ok(Address::Mailbox(Mailbox::new("", address))),
        Some(_) => Err(lexer.syntax_error("malformed address")),
    }
}

/// Joins phrase words into a display name: single spaces between words,
/// encoded words decoded, and adjacent encoded words concatenated with the
/// intervening whitespace elided. Returns the name and the charset label of
/// the first decoded word.
fn assemble_phrase(words: &[Word<'_>], options: &ParserOptions) -> (String, Option<String>) {
    let mut name = String::new();
    let mut charset = None;
    let mut prev_encoded = false;
    for word in words {
        match word {
            Word::Dot => {
                name.push('.');
                prev_encoded = false;
            }
            Word::Quoted(text) => {
                if !name.is_empty() {
                    name.push(' ');
                }
                name.push_str(text);
                prev_encoded = false;
            }
            Word::Atom(text) => {
                if let Some(decoded) = rfc2047::decode_word(text, options) {
                    if !name.is_empty() && !prev_encoded {
                        name.push(' ');
                    }
                    name.push_str(&decoded.text);
                    if charset.is_none() {
                        charset = Some(decoded.charset);
                    }
                    prev_encoded = true;
                } else {
                    if !name.is_empty() {
                        name.push(' ');
                    }
                    name.push_str(text);
                    prev_encoded = false;
                }
            }
        }
    }
    (name, charset)
}

/// Joins words into a local part. Dots are preserved; quoted words are
/// re-quoted unless their content is a plain dot-atom. Obsolete syntax
/// allows CFWS between the words, so they concatenate directly.
fn assemble_local_part(words: &[Word<'_>]) -> Option<String> {
    if words.is_empty() {
        return None;
    }
    let mut local = String::new();
    for word in words {
        match word {
            Word::Atom(text) => local.push_str(text),
            Word::Dot => local.push('.'),
            Word::Quoted(text) => {
                if is_dot_atom(text) {
                    local.push_str(text);
                } else {
                    local.push_str(&crate::encoder::quote(text));
                }
            }
        }
    }
    Some(local)
}

fn is_dot_atom(text: &str) -> bool {
    !text.is_empty() && text.bytes().all(|byte| byte == b'.' || lexer::is_atext(byte))
}

fn collapse_whitespace(text: &str) -> String {
    text.split_whitespace().collect::<Vec<_>>().join(" ")
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::redundant_clone, clippy::manual_string_new)]
mod tests {
    use super::*;
    use crate::error::Error;

    fn parse(text: &str) -> AddressList {
        AddressList::parse(text).unwrap()
    }

    fn single_mailbox(text: &str) -> Mailbox {
        let list = parse(text);
        assert_eq!(list.len(), 1, "expected one address in {text:?}");
        match list.get(0) {
            Some(Address::Mailbox(mailbox)) => mailbox.clone(),
            other => panic!("expected mailbox, got {other:?}"),
        }
    }

    #[test]
    fn test_bare_addr_spec() {
        let mailbox = single_mailbox("fejj@helixcode.com");
        assert_eq!(mailbox.name, "");
        assert_eq!(mailbox.address, "fejj@helixcode.com");
    }

    #[test]
    fn test_bare_local_part_without_domain() {
        let mailbox = single_mailbox("fejj");
        assert_eq!(mailbox.name, "");
        assert_eq!(mailbox.address, "fejj");
    }

    #[test]
    fn test_dotted_bare_token() {
        let mailbox = single_mailbox("postmaster.daemon");
        assert_eq!(mailbox.address, "postmaster.daemon");
    }

    #[test]
    fn test_folded_display_name() {
        let mailbox = single_mailbox("this is\n\ta folded name <folded@name.com>");
        assert_eq!(mailbox.name, "this is a folded name");
        assert_eq!(mailbox.address, "folded@name.com");
    }

    #[test]
    fn test_quoted_display_name_with_escapes() {
        let mailbox = single_mailbox("\"Jeffrey \\\"fejj\\\" Stedfast\" <fejj@helixcode.com>");
        assert_eq!(mailbox.name, "Jeffrey \"fejj\" Stedfast");
        assert_eq!(mailbox.address, "fejj@helixcode.com");
    }

    #[test]
    fn test_comments_are_discarded_everywhere() {
        let mailbox = single_mailbox(
            "Jeffrey Stedfast <fejj(recursive (comment) block)@helixcode.(and a comment here)com>",
        );
        assert_eq!(mailbox.name, "Jeffrey Stedfast");
        assert_eq!(mailbox.address, "fejj@helixcode.com");
    }

    #[test]
    fn test_encoded_word_display_name() {
        let mailbox = single_mailbox("=?iso-8859-1?q?Kristoffer_Br=E5nemyr?= <ztion@swipenet.se>");
        assert_eq!(mailbox.name, "Kristoffer Brånemyr");
        assert_eq!(mailbox.address, "ztion@swipenet.se");
        assert_eq!(mailbox.charset.as_deref(), Some("iso-8859-1"));
    }

    #[test]
    fn test_adjacent_encoded_words_concatenate() {
        let mailbox = single_mailbox(
            "=?utf-8?B?S3Jpc3RvZmZlciA=?=\r\n =?utf-8?B?QnLDpW5lbXly?= <ztion@swipenet.se>",
        );
        assert_eq!(mailbox.name, "Kristoffer Brånemyr");
    }

    #[test]
    fn test_undecodable_word_passes_through_raw() {
        let mailbox = single_mailbox("=?garbage?X?text?= <x@example.com>");
        assert_eq!(mailbox.name, "=?garbage?X?text?=");
    }

    #[test]
    fn test_comment_becomes_name_for_bare_address() {
        let mailbox = single_mailbox("fejj@helixcode.com (Jeffrey Stedfast)");
        assert_eq!(mailbox.name, "Jeffrey Stedfast");
        assert_eq!(mailbox.address, "fejj@helixcode.com");
    }

    #[test]
    fn test_explicit_name_beats_trailing_comment() {
        let mailbox = single_mailbox("Jeff <fejj@helixcode.com> (ignored)");
        assert_eq!(mailbox.name, "Jeff");
    }

    #[test]
    fn test_quoted_local_part() {
        let mailbox = single_mailbox("\"Abc@def\"@example.com");
        assert_eq!(mailbox.address, "\"Abc@def\"@example.com");
    }

    #[test]
    fn test_domain_literal_address() {
        let mailbox = single_mailbox("jsmith@[192.0.2.1]");
        assert_eq!(mailbox.address, "jsmith@[192.0.2.1]");
    }

    #[test]
    fn test_source_route() {
        let mailbox = single_mailbox("<@route1,@route2:local@domain.com>");
        assert_eq!(mailbox.name, "");
        assert_eq!(mailbox.address, "local@domain.com");
        let route = mailbox.route.unwrap();
        assert_eq!(route.get(0), Some("route1"));
        assert_eq!(route.get(1), Some("route2"));
    }

    #[test]
    fn test_empty_route_entries_are_dropped() {
        let mailbox = single_mailbox("<@a,,@b:user@example.com>");
        let route = mailbox.route.unwrap();
        assert_eq!(route.len(), 2);
    }

    #[test]
    fn test_address_list_with_mixed_members() {
        let list = parse("fejj@helixcode.com, Jeffrey Stedfast <fejj@helixcode.com>, bare");
        assert_eq!(list.len(), 3);
        assert_eq!(list.get(1).map(|a| a.name().to_string()).unwrap(), "Jeffrey Stedfast");
    }

    #[test]
    fn test_stray_separators_are_skipped() {
        let list = parse(",, a@b.com ,,, c@d.com ,");
        assert_eq!(list.len(), 2);
    }

    #[test]
    fn test_group_with_members() {
        let list = parse("My Group: fejj@helixcode.com, Alice <alice@example.com>;");
        assert_eq!(list.len(), 1);
        match list.get(0) {
            Some(Address::Group(group)) => {
                assert_eq!(group.name, "My Group");
                assert_eq!(group.members.len(), 2);
            }
            other => panic!("expected group, got {other:?}"),
        }
    }

    #[test]
    fn test_empty_group() {
        let list = parse("Undisclosed recipients:;");
        match list.get(0) {
            Some(Address::Group(group)) => {
                assert_eq!(group.name, "Undisclosed recipients");
                assert!(group.members.is_empty());
            }
            other => panic!("expected group, got {other:?}"),
        }
    }

    #[test]
    fn test_nested_group() {
        let list = parse("Outer: Inner: deep@example.com;, shallow@example.com;");
        match list.get(0) {
            Some(Address::Group(outer)) => {
                assert_eq!(outer.members.len(), 2);
                assert!(matches!(outer.members.get(0), Some(Address::Group(_))));
            }
            other => panic!("expected group, got {other:?}"),
        }
    }

    #[test]
    fn test_group_missing_terminator_at_eof() {
        let list = parse("My Group: a@b.com, c@d.com");
        match list.get(0) {
            Some(Address::Group(group)) => assert_eq!(group.members.len(), 2),
            other => panic!("expected group, got {other:?}"),
        }
    }

    #[test]
    fn test_nested_group_requires_terminator() {
        // Only the outermost group may leave its ';' off at end of input.
        assert!(AddressList::parse("Outer: Inner: deep@example.com").is_err());
        assert!(
            AddressList::parse("Outer: Inner: deep@example.com;, shallow@example.com").is_ok()
        );
    }

    #[test]
    fn test_excessive_group_nesting_fails() {
        let text = format!("{}x@y.z", "g: ".repeat(64));
        assert!(AddressList::parse(&text).is_err());
    }

    #[test]
    fn test_empty_and_whitespace_inputs() {
        assert_eq!(AddressList::parse(""), Err(Error::EmptyInput));
        assert_eq!(AddressList::parse(" \t\r\n "), Err(Error::EmptyInput));
        assert_eq!(AddressList::try_parse(""), None);
    }

    #[test]
    fn test_unterminated_tokens_fail_with_offsets() {
        let error = AddressList::parse("\"no closing quote").unwrap_err();
        assert_eq!(error.position(), Some(0));

        let error = AddressList::parse("x <fejj@(unterminated").unwrap_err();
        assert!(matches!(error, Error::UnterminatedComment { .. }));

        assert!(AddressList::parse("x <fejj@[bad.literal>").is_err());
    }

    #[test]
    fn test_try_parse_never_panics_on_garbage() {
        for text in ["<", ">", "@", "a b", "<>", "a@", "(((", "\\", "a@b@c@", "<@>"] {
            let _ = AddressList::try_parse(text);
        }
    }

    #[test]
    fn test_remembered_charset_survives_round_trip() {
        let first = single_mailbox("=?iso-8859-1?q?Kristoffer_Br=E5nemyr?= <ztion@swipenet.se>");
        assert_eq!(first.charset.as_deref(), Some("iso-8859-1"));

        let text = Address::from(first.clone()).to_string();
        assert!(text.starts_with("=?iso-8859-1?B?"), "got: {text}");

        let second = single_mailbox(&text);
        assert_eq!(second.charset.as_deref(), Some("iso-8859-1"));
        assert_eq!(first, second);
    }

    #[test]
    fn test_parse_serialize_parse_fixpoint() {
        let inputs = [
            "fejj@helixcode.com",
            "fejj",
            "this is\n\ta folded name <folded@name.com>",
            "\"Jeffrey \\\"fejj\\\" Stedfast\" <fejj@helixcode.com>",
            "Jeffrey Stedfast <fejj(comment)@helixcode.(comment)com>",
            "=?iso-8859-1?q?Kristoffer_Br=E5nemyr?= <ztion@swipenet.se>",
            "<@route1,@route2:local@domain.com>",
            "My Group: fejj@helixcode.com, Alice <alice@example.com>;",
            "fejj@helixcode.com (Jeffrey Stedfast)",
            "one@example.com, two@example.com, three@example.com",
        ];
        for input in inputs {
            let first = AddressList::parse(input).unwrap();
            let text = first.to_string();
            let second = AddressList::parse(&text)
                .unwrap_or_else(|e| panic!("reparse of {text:?} failed: {e}"));
            assert_eq!(first, second, "fixpoint failed for {input:?} -> {text:?}");
        }
    }
}
