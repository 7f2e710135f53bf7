//! # mailgram-address
//!
//! Email address header parsing and serialization.
//!
//! ## Features
//!
//! - **Address lists**: Parse To/Cc/Bcc-style headers into mailboxes and
//!   recursive groups, with a lenient fallback for real-world breakage
//! - **Encoded words**: Decode and re-encode RFC 2047 display names,
//!   remembering the original charset
//! - **Source routes**: Obsolete `@route1,@route2` domain lists, standalone
//!   or inside angle addresses
//! - **Message identifiers**: Message-Id/References lists plus a free-text
//!   scanner for obsolete In-Reply-To bodies
//! - **Serialization**: Unfolded `Display` output and a folding encoder that
//!   never splits a quoted string or encoded word
//!
//! ## Quick Start
//!
//! ### Parsing Address Headers
//!
//! ```ignore
//! use mailgram_address::{Address, AddressList};
//!
//! let list = AddressList::parse("Jeffrey Stedfast <fejj@helixcode.com>, bob@example.com")?;
//! for address in &list {
//!     match address {
//!         Address::Mailbox(mailbox) => println!("{} <{}>", mailbox.name, mailbox.address),
//!         Address::Group(group) => println!("group {} ({} members)", group.name, group.members.len()),
//!     }
//! }
//! ```
//!
//! ### Building and Folding Headers
//!
//! ```ignore
//! use mailgram_address::{AddressList, FormatOptions, Mailbox};
//!
//! let mut list = AddressList::new();
//! list.push(Mailbox::new("Kristoffer Brånemyr", "ztion@swipenet.se"));
//!
//! let mut buf = Vec::new();
//! list.encode(FormatOptions::shared(), &mut buf);
//! // Non-ASCII names come out as RFC 2047 encoded words, folded at 78 columns.
//! ```
//!
//! ### Message Identifier Lists
//!
//! ```ignore
//! use mailgram_address::{enumerate_references, MessageIdList};
//!
//! let refs = MessageIdList::parse("<one@example.com> <two@example.com>")?;
//!
//! // Obsolete In-Reply-To bodies mix prose with the identifiers.
//! for id in enumerate_references("your message of 12 Dec <some.id@example.com>") {
//!     println!("{id}");
//! }
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![forbid(unsafe_code)]

mod address;
mod domain_list;
mod encoder;
mod error;
mod lexer;
mod message_id;
mod options;
mod parser;

pub mod rfc2047;

pub use address::{Address, AddressList, Group, Mailbox};
pub use domain_list::DomainList;
pub use error::{Error, Result};
pub use message_id::{MessageIdList, References, enumerate_references};
pub use options::{DEFAULT_MAX_LINE_LENGTH, FormatOptions, ParserOptions};
