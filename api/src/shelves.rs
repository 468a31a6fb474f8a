//! The three shelves and the partitioner that builds them from a flat list.

use crate::book::{Book, ShelfTag};
use serde::{Deserialize, Serialize};

/// Books grouped by shelf, each in backend order
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Shelves {
    /// Finished books
    pub read: Vec<Book>,
    /// Books queued to read
    pub want_to_read: Vec<Book>,
    /// Books being read now
    pub currently_reading: Vec<Book>,
}

impl Shelves {
    /// Books on `tag`
    #[must_use]
    pub fn get(&self, tag: ShelfTag) -> &[Book] {
        match tag {
            ShelfTag::Read => &self.read,
            ShelfTag::WantToRead => &self.want_to_read,
            ShelfTag::CurrentlyReading => &self.currently_reading,
        }
    }

    fn get_mut(&mut self, tag: ShelfTag) -> &mut Vec<Book> {
        match tag {
            ShelfTag::Read => &mut self.read,
            ShelfTag::WantToRead => &mut self.want_to_read,
            ShelfTag::CurrentlyReading => &mut self.currently_reading,
        }
    }

    /// Number of books on `tag`
    #[must_use]
    pub fn len(&self, tag: ShelfTag) -> usize {
        self.get(tag).len()
    }

    /// Total number of shelved books
    #[must_use]
    pub fn total(&self) -> usize {
        ShelfTag::ALL.into_iter().map(|tag| self.len(tag)).sum()
    }

    /// Whether all three shelves are empty
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.total() == 0
    }

    /// Shelves in display order
    pub fn iter(&self) -> impl Iterator<Item = (ShelfTag, &[Book])> {
        ShelfTag::ALL.into_iter().map(move |tag| (tag, self.get(tag)))
    }

    /// Shelf holding the book identified by `id`
    #[must_use]
    pub fn shelf_of(&self, id: &str) -> Option<ShelfTag> {
        self.iter()
            .find(|(_, books)| books.iter().any(|book| book.has_id(id)))
            .map(|(tag, _)| tag)
    }

    /// Remove the book identified by `id` from whichever shelf holds it
    pub fn remove(&mut self, id: &str) -> Option<Book> {
        let tag = self.shelf_of(id)?;
        let books = self.get_mut(tag);
        let position = books.iter().position(|book| book.has_id(id))?;
        Some(books.remove(position))
    }

    /// Place `book` at the end of the shelf named by its tag
    ///
    /// Any copy already on a shelf is removed first, so a book is never on two
    /// shelves. A book without a tag is only removed.
    pub fn upsert(&mut self, book: Book) {
        self.remove(book.id());
        if let Some(tag) = book.shelf {
            self.get_mut(tag).push(book);
        }
    }
}

impl FromIterator<Book> for Shelves {
    fn from_iter<I: IntoIterator<Item = Book>>(iter: I) -> Self {
        partition(iter)
    }
}

/// Split a flat list of books into shelves by their shelf tag
///
/// Relative order is preserved and books without a tag are dropped.
///
/// ```
/// use bookshelf_api::{Book, ShelfTag, partition};
///
/// let books = vec![
///     Book::new("Dune", "9780441013593").with_shelf(Some(ShelfTag::Read)),
///     Book::new("Emma", "9780141439587"),
/// ];
/// let shelves = partition(books);
/// assert_eq!(shelves.len(ShelfTag::Read), 1);
/// assert_eq!(shelves.total(), 1);
/// ```
pub fn partition<I>(books: I) -> Shelves
where
    I: IntoIterator<Item = Book>,
{
    let mut shelves = Shelves::default();
    for book in books {
        if let Some(tag) = book.shelf {
            shelves.get_mut(tag).push(book);
        }
    }
    shelves
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;
    use std::collections::HashSet;

    fn book(id: usize, shelf: Option<ShelfTag>) -> Book {
        Book::new(format!("Book {id}"), format!("id-{id}")).with_shelf(shelf)
    }

    #[test]
    fn preserves_backend_order_within_shelf() {
        let shelves = partition(vec![
            book(1, Some(ShelfTag::Read)),
            book(2, Some(ShelfTag::WantToRead)),
            book(3, Some(ShelfTag::Read)),
            book(4, None),
        ]);

        let read: Vec<&str> = shelves.read.iter().map(Book::id).collect();
        assert_eq!(read, vec!["id-1", "id-3"]);
        assert_eq!(shelves.len(ShelfTag::WantToRead), 1);
        assert_eq!(shelves.len(ShelfTag::CurrentlyReading), 0);
        assert_eq!(shelves.shelf_of("id-4"), None);
    }

    #[test]
    fn upsert_moves_between_shelves() {
        let mut shelves = partition(vec![book(1, Some(ShelfTag::WantToRead))]);

        shelves.upsert(book(1, Some(ShelfTag::Read)));
        assert_eq!(shelves.shelf_of("id-1"), Some(ShelfTag::Read));
        assert_eq!(shelves.total(), 1);

        shelves.upsert(book(1, None));
        assert!(shelves.is_empty());
    }

    fn arb_shelf() -> impl Strategy<Value = Option<ShelfTag>> {
        prop_oneof![
            Just(None),
            Just(Some(ShelfTag::Read)),
            Just(Some(ShelfTag::WantToRead)),
            Just(Some(ShelfTag::CurrentlyReading)),
        ]
    }

    proptest! {
        #[test]
        fn partition_is_disjoint_and_complete(tags in proptest::collection::vec(arb_shelf(), 0..40)) {
            let books: Vec<Book> = tags.iter().enumerate().map(|(i, tag)| book(i, *tag)).collect();
            let shelves = partition(books.clone());

            let mut seen = HashSet::new();
            for (tag, shelf) in shelves.iter() {
                for book in shelf {
                    prop_assert_eq!(book.shelf, Some(tag));
                    prop_assert!(seen.insert(book.id().to_string()), "book on two shelves");
                }
            }

            let tagged: Vec<&Book> = books.iter().filter(|b| b.shelf.is_some()).collect();
            prop_assert_eq!(seen.len(), tagged.len());
            for book in tagged {
                prop_assert!(seen.contains(book.id()));
            }
        }
    }
}
