//! Contacts produced by intersection queries.

pub use self::contact::{Contact, ContactArea, ContactBorder, PrimitiveRef};
pub use self::contact_buffer::{with_local_contacts, ContactBuffer};

mod contact;
mod contact_buffer;
