//! State slices: each owns one fragment of [`crate::AppState`] and the reducer for it.

pub mod bestsellers;
pub mod dark_mode;
pub mod details;
pub mod search;
pub mod shelves;

pub use bestsellers::{Bestsellers, BestsellersAction, BestsellersReducer, BestsellersState};
pub use dark_mode::{DarkModeAction, DarkModeReducer, DarkModeState};
pub use details::{DetailsAction, DetailsReducer, DetailsState};
pub use search::{SearchAction, SearchReducer, SearchState};
pub use shelves::{ShelfSelectors, ShelvesAction, ShelvesReducer, ShelvesState};
