//! Command-line arguments for `bookshelf`.

use bookshelf_api::{BookId, ShelfTag};
use bookshelf_app::ThemePreference;
use clap::{Parser, Subcommand, ValueEnum};

#[derive(Debug, Parser)]
#[command(
    name = "bookshelf",
    version,
    about = "Search the catalog and manage your bookshelves",
    long_about = "Search the book catalog, view books, and organize them into \
                  read / want-to-read / currently-reading shelves.\n\n\
                  Configuration is read from BOOKS_API_URL, BOOKSHELF_TOKEN and \
                  the other BOOKSHELF_* variables."
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,

    /// Backend base URL (overrides BOOKS_API_URL).
    #[arg(long = "api-url", value_name = "URL", global = true)]
    pub api_url: Option<String>,

    /// Log output format (pretty for humans, json for machine parsing).
    #[arg(long = "log-format", value_enum, default_value = "pretty", global = true)]
    pub log_format: LogFormatArg,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Search the catalog (or your shelves with --shelves).
    Search {
        /// Search text.
        query: String,

        /// Maximum number of results.
        #[arg(long)]
        limit: Option<usize>,

        /// Search only books on your shelves.
        #[arg(long)]
        shelves: bool,
    },

    /// Show one book by ISBN-13 or ISBN-10.
    Book {
        /// Book identifier.
        id: BookId,
    },

    /// List your shelves.
    Shelves,

    /// Show the fiction and non-fiction bestseller lists.
    Bestsellers,

    /// Put a book on a shelf.
    Add {
        /// Book identifier.
        id: BookId,

        /// Target shelf (read, want-to-read, currently-reading).
        shelf: ShelfTag,
    },

    /// Take a book off its shelf.
    Remove {
        /// Book identifier.
        id: BookId,
    },

    /// Show the theme, or set the preference (auto, light, dark).
    Theme {
        /// New preference.
        mode: Option<ThemePreference>,
    },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum LogFormatArg {
    Pretty,
    Json,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_add() {
        let cli = Cli::try_parse_from(["bookshelf", "add", "978-0-441-01359-3", "want-to-read"]);
        let Ok(Cli {
            command: Command::Add { id, shelf },
            ..
        }) = cli
        else {
            unreachable!("add should parse");
        };
        assert_eq!(id.as_str(), "9780441013593");
        assert_eq!(shelf, ShelfTag::WantToRead);
    }

    #[test]
    fn rejects_bad_isbn_and_shelf() {
        assert!(Cli::try_parse_from(["bookshelf", "book", "9780441013594"]).is_err());
        assert!(Cli::try_parse_from(["bookshelf", "add", "9780441013593", "favorites"]).is_err());
    }

    #[test]
    fn global_flags_after_subcommand() {
        let cli = Cli::try_parse_from(["bookshelf", "shelves", "--log-format", "json", "--api-url", "http://books"]);
        assert!(cli.is_ok_and(|cli| cli.log_format == LogFormatArg::Json && cli.api_url.is_some()));
    }
}
