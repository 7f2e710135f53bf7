//! Address model: mailboxes, groups, and ordered address lists.

use std::fmt;

use crate::domain_list::DomainList;
use crate::encoder;
use crate::error::Result;
use crate::options::{FormatOptions, ParserOptions};
use crate::parser;

/// A parsed address: either a single mailbox or a named group of addresses.
///
/// The two variants share only their display name and serialization, so the
/// type is a plain tagged union rather than a trait hierarchy.
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Address {
    /// A single mailbox, e.g. `Jeffrey Stedfast <fejj@helixcode.com>`.
    Mailbox(Mailbox),
    /// A named group, e.g. `Friends: alice@example.com, bob@example.com;`.
    Group(Group),
}

impl Address {
    /// Returns the display name, which may be empty.
    #[must_use]
    pub fn name(&self) -> &str {
        match self {
            Self::Mailbox(mailbox) => &mailbox.name,
            Self::Group(group) => &group.name,
        }
    }

    /// Replaces the display name.
    pub fn set_name(&mut self, name: impl Into<String>) {
        match self {
            Self::Mailbox(mailbox) => mailbox.name = name.into(),
            Self::Group(group) => group.name = name.into(),
        }
    }
}

impl fmt::Display for Address {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&encoder::render_address(self).join(" "))
    }
}

impl From<Mailbox> for Address {
    fn from(mailbox: Mailbox) -> Self {
        Self::Mailbox(mailbox)
    }
}

impl From<Group> for Address {
    fn from(group: Group) -> Self {
        Self::Group(group)
    }
}

/// A single mailbox address.
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Mailbox {
    /// Display name; empty when the address had none.
    pub name: String,
    /// Obsolete source route from `<@route1,@route2:local@domain>` syntax.
    pub route: Option<DomainList>,
    /// The address itself: `local-part@domain`, or a bare token when the
    /// input had no `@`.
    pub address: String,
    /// Charset label remembered from an RFC 2047 encoded word in the name;
    /// consulted when the name is re-encoded during serialization.
    pub charset: Option<String>,
}

impl Mailbox {
    /// Creates a mailbox with no route and no remembered charset.
    #[must_use]
    pub fn new(name: impl Into<String>, address: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            route: None,
            address: address.into(),
            charset: None,
        }
    }
}

impl fmt::Display for Mailbox {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut tokens = Vec::new();
        encoder::push_mailbox(self, &mut tokens);
        f.write_str(&tokens.join(" "))
    }
}

/// A named group of addresses.
///
/// Groups own their members by value, so a group can never contain itself,
/// directly or transitively; the tree shape is guaranteed by ownership.
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Group {
    /// Display name of the group.
    pub name: String,
    /// Ordered members; may contain nested groups.
    pub members: AddressList,
}

impl Group {
    /// Creates an empty group.
    #[must_use]
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            members: AddressList::new(),
        }
    }
}

impl fmt::Display for Group {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut tokens = Vec::new();
        encoder::push_group(self, &mut tokens);
        f.write_str(&tokens.join(" "))
    }
}

/// Ordered list of addresses.
///
/// Insertion order is significant and preserved through mutation; duplicates
/// are permitted and never implicitly removed.
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AddressList {
    addresses: Vec<Address>,
}

impl AddressList {
    /// Creates an empty address list.
    #[must_use]
    pub const fn new() -> Self {
        Self {
            addresses: Vec::new(),
        }
    }

    /// Returns the number of addresses.
    #[must_use]
    pub fn len(&self) -> usize {
        self.addresses.len()
    }

    /// Returns true if the list has no addresses.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.addresses.is_empty()
    }

    /// Returns the address at `index`.
    #[must_use]
    pub fn get(&self, index: usize) -> Option<&Address> {
        self.addresses.get(index)
    }

    /// Returns a mutable reference to the address at `index`.
    pub fn get_mut(&mut self, index: usize) -> Option<&mut Address> {
        self.addresses.get_mut(index)
    }

    /// Appends an address.
    pub fn push(&mut self, address: impl Into<Address>) {
        self.addresses.push(address.into());
    }

    /// Inserts an address at `index`, shifting later entries.
    ///
    /// # Panics
    ///
    /// Panics if `index > len`, like [`Vec::insert`].
    pub fn insert(&mut self, index: usize, address: impl Into<Address>) {
        self.addresses.insert(index, address.into());
    }

    /// Removes and returns the address at `index`.
    ///
    /// # Panics
    ///
    /// Panics if `index >= len`, like [`Vec::remove`].
    pub fn remove(&mut self, index: usize) -> Address {
        self.addresses.remove(index)
    }

    /// Returns an iterator over the addresses in insertion order.
    pub fn iter(&self) -> std::slice::Iter<'_, Address> {
        self.addresses.iter()
    }

    /// Returns a mutable iterator over the addresses.
    pub fn iter_mut(&mut self) -> std::slice::IterMut<'_, Address> {
        self.addresses.iter_mut()
    }

    /// Returns the position of the first address equal to `address`.
    #[must_use]
    pub fn index_of(&self, address: &Address) -> Option<usize> {
        self.addresses.iter().position(|entry| entry == address)
    }

    /// Returns true if the list contains an address equal to `address`.
    #[must_use]
    pub fn contains(&self, address: &Address) -> bool {
        self.index_of(address).is_some()
    }

    /// Parses an address list with the shared default options, returning
    /// `None` on failure.
    #[must_use]
    pub fn try_parse(text: &str) -> Option<Self> {
        Self::try_parse_with(text, ParserOptions::shared())
    }

    /// Parses an address list with explicit options, returning `None` on
    /// failure.
    #[must_use]
    pub fn try_parse_with(text: &str, options: &ParserOptions) -> Option<Self> {
        parser::parse_address_list(text, options).ok()
    }

    /// Parses an address list with the shared default options.
    ///
    /// # Errors
    ///
    /// Returns [`crate::Error::EmptyInput`] for empty or whitespace-only
    /// input and a positional error when both the strict and the lenient
    /// grammar fail.
    pub fn parse(text: &str) -> Result<Self> {
        Self::parse_with(text, ParserOptions::shared())
    }

    /// Parses an address list with explicit options.
    ///
    /// # Errors
    ///
    /// See [`AddressList::parse`].
    pub fn parse_with(text: &str, options: &ParserOptions) -> Result<Self> {
        parser::parse_address_list(text, options)
    }

    /// Writes the serialized form into `buf`, producing exactly the same
    /// text as [`fmt::Display`].
    pub fn write_to(&self, buf: &mut Vec<u8>) {
        buf.extend_from_slice(self.to_string().as_bytes());
    }

    /// Writes the serialized form into `buf`, folding long lines at token
    /// boundaries to respect `options.max_line_length`. Folding never splits
    /// a quoted string or an encoded word.
    pub fn encode(&self, options: &FormatOptions, buf: &mut Vec<u8>) {
        encoder::fold(&encoder::render_list(self), options, buf);
    }
}

impl fmt::Display for AddressList {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&encoder::render_list(self).join(" "))
    }
}

impl<'a> IntoIterator for &'a AddressList {
    type Item = &'a Address;
    type IntoIter = std::slice::Iter<'a, Address>;

    fn into_iter(self) -> Self::IntoIter {
        self.addresses.iter()
    }
}

impl IntoIterator for AddressList {
    type Item = Address;
    type IntoIter = std::vec::IntoIter<Address>;

    fn into_iter(self) -> Self::IntoIter {
        self.addresses.into_iter()
    }
}

impl FromIterator<Address> for AddressList {
    fn from_iter<I: IntoIterator<Item = Address>>(iter: I) -> Self {
        Self {
            addresses: iter.into_iter().collect(),
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::redundant_clone, clippy::manual_string_new)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn test_list_preserves_insertion_order_and_duplicates() {
        let mut list = AddressList::new();
        list.push(Mailbox::new("", "a@example.com"));
        list.push(Mailbox::new("", "b@example.com"));
        list.push(Mailbox::new("", "a@example.com"));
        assert_eq!(list.len(), 3);
        let first = Address::Mailbox(Mailbox::new("", "a@example.com"));
        assert_eq!(list.index_of(&first), Some(0));
        assert!(list.contains(&first));
    }

    #[test]
    fn test_insert_and_remove() {
        let mut list = AddressList::new();
        list.push(Mailbox::new("", "a@example.com"));
        list.push(Mailbox::new("", "c@example.com"));
        list.insert(1, Mailbox::new("", "b@example.com"));
        assert_eq!(list.get(1).map(Address::to_string).unwrap(), "b@example.com");
        let removed = list.remove(0);
        assert_eq!(removed.to_string(), "a@example.com");
        assert_eq!(list.len(), 2);
    }

    #[test]
    fn test_fields_stay_mutable_after_parse() {
        let mut list = AddressList::parse("fejj@helixcode.com").unwrap();
        if let Some(Address::Mailbox(mailbox)) = list.get_mut(0) {
            mailbox.name = String::from("Jeffrey");
            mailbox.address = String::from("fejj@gnome.org");
        }
        assert_eq!(list.to_string(), "Jeffrey <fejj@gnome.org>");
    }

    #[test]
    fn test_set_name_on_group_and_mailbox() {
        let mut mailbox = Address::Mailbox(Mailbox::new("", "a@b.c"));
        mailbox.set_name("Alice");
        assert_eq!(mailbox.name(), "Alice");

        let mut group = Address::Group(Group::new("old"));
        group.set_name("new");
        assert_eq!(group.name(), "new");
    }

    #[test]
    fn test_write_to_matches_display() {
        let list = AddressList::parse("Jeffrey Stedfast <fejj@helixcode.com>, bob@example.com")
            .unwrap();
        let mut buf = Vec::new();
        list.write_to(&mut buf);
        assert_eq!(String::from_utf8(buf).unwrap(), list.to_string());
    }

    #[test]
    fn test_encode_folds_long_lists() {
        let text = (0..8)
            .map(|i| format!("person.number.{i}@some.fairly.long.example.com"))
            .collect::<Vec<_>>()
            .join(", ");
        let list = AddressList::parse(&text).unwrap();

        let mut buf = Vec::new();
        list.encode(FormatOptions::shared(), &mut buf);
        let folded = String::from_utf8(buf).unwrap();
        for line in folded.split("\r\n") {
            assert!(line.trim_start_matches('\t').len() <= 78);
        }
        // Unfolding restores the Display form.
        let unfolded = folded.replace("\r\n\t", " ");
        assert_eq!(unfolded, list.to_string());
    }

    #[test]
    fn test_encode_does_not_fold_short_lists() {
        let list = AddressList::parse("a@b.com, c@d.com").unwrap();
        let mut buf = Vec::new();
        list.encode(FormatOptions::shared(), &mut buf);
        assert_eq!(String::from_utf8(buf).unwrap(), "a@b.com, c@d.com");
    }

    proptest! {
        #[test]
        fn prop_mailbox_display_round_trips(
            name in "[A-Za-z]{1,8}( [A-Za-z]{1,8}){0,3}",
            local in "[a-z][a-z0-9]{0,7}",
            domain in "[a-z][a-z0-9]{0,7}\\.(com|org|net)",
        ) {
            let address = format!("{local}@{domain}");
            let mailbox = Mailbox::new(name.clone(), address.clone());
            let text = Address::from(mailbox).to_string();

            let parsed = AddressList::parse(&text).unwrap();
            prop_assert_eq!(parsed.len(), 1);
            match parsed.get(0) {
                Some(Address::Mailbox(parsed)) => {
                    prop_assert_eq!(&parsed.name, &name);
                    prop_assert_eq!(&parsed.address, &address);
                    prop_assert_eq!(&parsed.route, &None);
                }
                other => prop_assert!(false, "expected mailbox, got {other:?}"),
            }
        }

        #[test]
        fn prop_list_count_tracks_mutations(locals in proptest::collection::vec("[a-z]{1,8}", 1..8)) {
            let mut list = AddressList::new();
            for local in &locals {
                list.push(Mailbox::new("", format!("{local}@example.com")));
            }
            prop_assert_eq!(list.len(), locals.len());
            list.remove(list.len() - 1);
            prop_assert_eq!(list.len(), locals.len() - 1);
        }
    }
}
