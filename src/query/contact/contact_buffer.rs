use core::cell::RefCell;

use super::Contact;

/// A reusable buffer of contacts filled by intersection queries.
#[derive(Clone, Debug, Default)]
pub struct ContactBuffer {
    contacts: Vec<Contact>,
}

impl ContactBuffer {
    /// An empty buffer.
    pub fn new() -> Self {
        Self::default()
    }

    /// An empty buffer able to hold `capacity` contacts without reallocating.
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            contacts: Vec::with_capacity(capacity),
        }
    }

    /// Removes every contact, keeping the allocated memory.
    pub fn clear(&mut self) {
        self.contacts.clear();
    }

    /// The contacts of the last query.
    pub fn contacts(&self) -> &[Contact] {
        &self.contacts
    }

    /// The number of contacts.
    pub fn len(&self) -> usize {
        self.contacts.len()
    }

    /// Is this buffer empty?
    pub fn is_empty(&self) -> bool {
        self.contacts.is_empty()
    }

    /// Iterates through the contacts.
    pub fn iter(&self) -> core::slice::Iter<'_, Contact> {
        self.contacts.iter()
    }

    pub(crate) fn contacts_mut(&mut self) -> &mut Vec<Contact> {
        &mut self.contacts
    }
}

impl<'a> IntoIterator for &'a ContactBuffer {
    type Item = &'a Contact;
    type IntoIter = core::slice::Iter<'a, Contact>;

    fn into_iter(self) -> Self::IntoIter {
        self.contacts.iter()
    }
}

std::thread_local! {
    static LOCAL_CONTACTS: RefCell<ContactBuffer> = RefCell::new(ContactBuffer::new());
}

/// Lends the contact buffer owned by the current thread to `f`.
///
/// Nested calls get a fresh temporary buffer instead of the thread's one.
pub fn with_local_contacts<R>(f: impl FnOnce(&mut ContactBuffer) -> R) -> R {
    LOCAL_CONTACTS.with(|buffer| match buffer.try_borrow_mut() {
        Ok(mut buffer) => f(&mut buffer),
        Err(_) => f(&mut ContactBuffer::new()),
    })
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn nested_loans_do_not_alias() {
        with_local_contacts(|outer| {
            assert!(outer.is_empty());
            with_local_contacts(|inner| {
                assert!(inner.is_empty());
                assert!(!core::ptr::eq(outer, inner));
            });
        });
    }
}
