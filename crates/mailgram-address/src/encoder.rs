//! Rendering parsed structures back to RFC 5322 header text.
//!
//! Every structure renders to a sequence of fold-safe tokens: a quoted name,
//! an encoded word, or an angle-bracketed address spec is always a single
//! token, so the folding writer can only break at boundaries where folding
//! whitespace is legal. Joining the tokens with single spaces produces the
//! unfolded `Display` form.

use crate::address::{Address, AddressList, Group, Mailbox};
use crate::lexer;
use crate::options::FormatOptions;
use crate::rfc2047;

/// Renders one address as a sequence of fold-safe tokens.
pub(crate) fn render_address(address: &Address) -> Vec<String> {
    let mut tokens = Vec::new();
    push_address(address, &mut tokens);
    tokens
}

/// Renders a whole list; the separating comma glues onto the token before it.
pub(crate) fn render_list(list: &AddressList) -> Vec<String> {
    let mut tokens = Vec::new();
    for (index, address) in list.iter().enumerate() {
        if index > 0 {
            append_glue(&mut tokens, ",");
        }
        push_address(address, &mut tokens);
    }
    tokens
}

fn push_address(address: &Address, tokens: &mut Vec<String>) {
    match address {
        Address::Mailbox(mailbox) => push_mailbox(mailbox, tokens),
        Address::Group(group) => push_group(group, tokens),
    }
}

pub(crate) fn push_mailbox(mailbox: &Mailbox, tokens: &mut Vec<String>) {
    let has_name = !mailbox.name.is_empty();
    if has_name {
        push_name(&mailbox.name, mailbox.charset.as_deref(), tokens);
    }
    let spec = match &mailbox.route {
        Some(route) if !route.is_empty() => format!("<{route}:{}>", mailbox.address),
        _ if has_name => format!("<{}>", mailbox.address),
        _ => mailbox.address.clone(),
    };
    tokens.push(spec);
}

pub(crate) fn push_group(group: &Group, tokens: &mut Vec<String>) {
    let start = tokens.len();
    push_name(&group.name, None, tokens);
    if tokens.len() == start {
        tokens.push(String::new());
    }
    append_glue(tokens, ":");
    for (index, member) in group.members.iter().enumerate() {
        if index > 0 {
            append_glue(tokens, ",");
        }
        push_address(member, tokens);
    }
    append_glue(tokens, ";");
}

/// Appends a separator to the previous token so that folding can never leave
/// a `,`, `:`, or `;` at the start of a continuation line.
fn append_glue(tokens: &mut Vec<String>, glue: &str) {
    match tokens.last_mut() {
        Some(last) => last.push_str(glue),
        None => tokens.push(glue.to_string()),
    }
}

/// Pushes a display name: a single encoded word when it contains non-ASCII
/// text, a single quoted string when it contains grammar specials, otherwise
/// one token per word.
fn push_name(name: &str, charset: Option<&str>, tokens: &mut Vec<String>) {
    if name.is_empty() {
        return;
    }
    if !name.is_ascii() {
        tokens.push(rfc2047::encode_word(name, charset.unwrap_or("utf-8")));
    } else if needs_quoting(name) {
        tokens.push(quote(name));
    } else {
        tokens.extend(name.split_whitespace().map(String::from));
    }
}

/// True when a phrase cannot be written as bare atoms. Text that merely looks
/// like an encoded word must be quoted too, or it would decode on re-parse.
fn needs_quoting(name: &str) -> bool {
    name.bytes().any(|byte| byte != b' ' && !lexer::is_atext(byte)) || name.contains("=?")
}

/// Wraps text in double quotes, escaping quotes and backslashes.
pub(crate) fn quote(text: &str) -> String {
    let mut quoted = String::with_capacity(text.len() + 2);
    quoted.push('"');
    for ch in text.chars() {
        if ch == '"' || ch == '\\' {
            quoted.push('\\');
        }
        quoted.push(ch);
    }
    quoted.push('"');
    quoted
}

/// Writes tokens into `buf`, separated by single spaces, inserting a CRLF
/// plus tab before any token that would push the current line past the
/// configured maximum length.
pub(crate) fn fold(tokens: &[String], options: &FormatOptions, buf: &mut Vec<u8>) {
    let mut line_len = 0usize;
    for (index, token) in tokens.iter().enumerate() {
        if index == 0 {
            buf.extend_from_slice(token.as_bytes());
            line_len = token.len();
        } else if line_len + 1 + token.len() > options.max_line_length {
            buf.extend_from_slice(b"\r\n\t");
            buf.extend_from_slice(token.as_bytes());
            line_len = token.len() + 1;
        } else {
            buf.push(b' ');
            buf.extend_from_slice(token.as_bytes());
            line_len += token.len() + 1;
        }
    }
}
