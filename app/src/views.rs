//! Plain-text renderings of slice state, as printed by the CLI.

use crate::resource::Status;
use crate::slices::{BestsellersState, DarkModeState, DetailsState, SearchState, ShelvesState};
use bookshelf_api::{Book, Category};
use std::fmt::Write;

/// Shown when a book could not be loaded
pub const NOT_FOUND: &str = "We couldn't find the book you're looking for...";

/// Link back home from the not-found view
pub const HOME_LINK: &str = "Go back to the home page: /";

/// Shown for a failed or empty search
pub const NO_RESULTS: &str = "No results";

fn summary(book: &Book) -> String {
    let mut line = book.title.clone();
    if !book.authors.is_empty() {
        let _ = write!(line, " by {}", book.authors.join(", "));
    }
    if !book.id().is_empty() {
        let _ = write!(line, " [{}]", book.id());
    }
    if let Some(shelf) = book.shelf {
        let _ = write!(line, " ({})", shelf.label());
    }
    line
}

fn list(out: &mut String, books: &[Book]) {
    for book in books {
        let _ = writeln!(out, "  - {}", summary(book));
    }
}

/// The book-detail page
#[must_use]
pub fn book_details(state: &DetailsState) -> String {
    let Some(book) = state.current() else {
        return match state.book.status {
            Status::Loading => "Loading...".to_string(),
            Status::Failed => format!("{NOT_FOUND}\n{HOME_LINK}"),
            Status::Idle => "No book selected".to_string(),
        };
    };

    let mut out = book.title.clone();
    if !book.subtitle.is_empty() {
        let _ = write!(out, ": {}", book.subtitle);
    }
    out.push('\n');
    if !book.authors.is_empty() {
        let _ = writeln!(out, "By {}", book.authors.join(", "));
    }
    if let Some(published) = &book.date_published {
        let _ = writeln!(out, "Published: {published}");
    }
    if let Some(publisher) = &book.publisher {
        let _ = writeln!(out, "Publisher: {publisher}");
    }
    if book.pages > 0 {
        let _ = writeln!(out, "Pages: {}", book.pages);
    }
    if book.rating > 0.0 {
        let _ = writeln!(out, "Rating: {:.1}", book.rating);
    }
    if !book.isbn13.is_empty() {
        let _ = writeln!(out, "ISBN-13: {}", book.isbn13);
    }
    if !book.isbn.is_empty() {
        let _ = writeln!(out, "ISBN-10: {}", book.isbn);
    }
    let _ = writeln!(
        out,
        "Shelf: {}",
        book.shelf.map_or("Not on a shelf", |shelf| shelf.label())
    );
    if !book.synopsis.is_empty() {
        let _ = writeln!(out, "\n{}", book.synopsis);
    }

    match state.book.status {
        Status::Loading => out.push_str("Updating...\n"),
        Status::Failed => {
            let _ = writeln!(out, "Error: {}", state.book.error.as_deref().unwrap_or_default());
        },
        Status::Idle => {},
    }
    out
}

/// Search results
#[must_use]
pub fn search_results(state: &SearchState) -> String {
    match state.results.status {
        Status::Loading => return "Searching...".to_string(),
        Status::Failed => return NO_RESULTS.to_string(),
        Status::Idle => {},
    }
    if state.results.data.is_empty() {
        return NO_RESULTS.to_string();
    }

    let mut out = format!("Results for {:?}:\n", state.query);
    list(&mut out, &state.results.data);
    out
}

/// The three shelves
///
/// A failed fetch adds a status line; last-known shelves stay listed.
#[must_use]
pub fn shelves(state: &ShelvesState) -> String {
    let resource = &state.shelves;
    let mut out = String::new();

    match resource.status {
        Status::Loading if !resource.has_loaded() => return "Loading shelves...".to_string(),
        Status::Failed => {
            let _ = writeln!(
                out,
                "Shelves: {} ({})",
                resource.status,
                resource.error.as_deref().unwrap_or_default()
            );
            if !resource.has_loaded() {
                return out;
            }
        },
        _ => {},
    }

    if resource.data.is_empty() {
        out.push_str("Your shelves are empty\n");
        return out;
    }
    for (tag, books) in resource.data.iter() {
        let _ = writeln!(out, "{} ({})", tag.label(), books.len());
        list(&mut out, books);
    }
    out
}

/// Both bestseller lists
#[must_use]
pub fn bestsellers(state: &BestsellersState) -> String {
    let resource = &state.lists;
    let mut out = String::new();

    match resource.status {
        Status::Loading if !resource.has_loaded() => return "Loading bestsellers...".to_string(),
        Status::Failed => {
            let _ = writeln!(
                out,
                "Bestsellers: {} ({})",
                resource.status,
                resource.error.as_deref().unwrap_or_default()
            );
        },
        _ => {},
    }

    for (title, category) in [("Fiction", Category::Fiction), ("Non-fiction", Category::NonFiction)] {
        let books = resource.data.get(category);
        let _ = writeln!(out, "{title} ({})", books.len());
        list(&mut out, books);
    }
    out
}

/// The theme preference and the applied theme
#[must_use]
pub fn theme(state: &DarkModeState) -> String {
    let mut out = match state.applied {
        Some(theme) => format!("Theme: {theme} (preference: {})", state.mode),
        None => format!("Theme: not applied (preference: {})", state.mode),
    };
    if let Some(error) = &state.error {
        let _ = write!(out, "\nWarning: {error}");
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use bookshelf_api::ShelfTag;
    use bookshelf_core::environment::Clock;
    use bookshelf_testing::test_clock;

    #[test]
    fn failed_detail_fetch_renders_not_found() {
        let mut state = DetailsState::default();
        let request = state.book.begin();
        state.book.reject(request, "Not found: no such book");

        let view = book_details(&state);
        assert!(view.contains("couldn't find the book"));
        assert!(view.contains("Go back to the home page: /"));
    }

    #[test]
    fn book_without_shelf_renders() {
        let mut state = DetailsState::default();
        let request = state.book.begin();
        let mut book = Book::new("Dune", "9780441013593");
        book.authors = vec!["Frank Herbert".into()];
        state.book.fulfill(request, Some(book), test_clock().now());

        let view = book_details(&state);
        assert!(view.starts_with("Dune\n"));
        assert!(view.contains("By Frank Herbert"));
        assert!(view.contains("Shelf: Not on a shelf"));
    }

    #[test]
    fn failed_search_renders_no_results() {
        let mut state = SearchState::default();
        let request = state.results.begin();
        state.results.reject_and_clear(request, "");
        assert_eq!(search_results(&state), NO_RESULTS);
    }

    #[test]
    fn shelves_list_in_display_order() {
        let mut state = ShelvesState::default();
        let request = state.shelves.begin();
        state.shelves.fulfill(
            request,
            bookshelf_api::partition(vec![
                Book::new("Dune", "9780441013593").with_shelf(Some(ShelfTag::Read)),
                Book::new("Emma", "9780141439587").with_shelf(Some(ShelfTag::CurrentlyReading)),
            ]),
            test_clock().now(),
        );

        let view = shelves(&state);
        let reading = view.find("Currently Reading (1)");
        let read = view.find("Read (1)\n");
        assert!(reading.is_some() && read.is_some());
        assert!(reading < read);
    }

    #[test]
    fn failed_shelves_render_status_line() {
        let mut state = ShelvesState::default();
        let request = state.shelves.begin();
        state.shelves.reject(request, "Request failed with status 503: unavailable");
        assert_eq!(
            shelves(&state),
            "Shelves: failed (Request failed with status 503: unavailable)\n"
        );
    }
}
