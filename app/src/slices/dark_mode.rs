//! Dark-mode slice: the theme preference, its persistence, and the applied theme.

use crate::environment::AppEnvironment;
use crate::theme::{Appearance, Theme, ThemePreference};
use bookshelf_core::{Effect, Reducer, SmallVec, async_effect, smallvec};
use serde::{Deserialize, Serialize};
use std::sync::Arc;

/// Dark-mode slice state
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DarkModeState {
    /// What the user chose
    pub mode: ThemePreference,
    /// Theme applied last
    pub applied: Option<Theme>,
    /// Last persistence failure
    pub error: Option<String>,
}

/// Dark-mode actions
#[derive(Debug, Clone)]
pub enum DarkModeAction {
    /// Choose a preference; it is applied and persisted
    SetMode(ThemePreference),
    /// Load the stored preference (or the system one) and apply it
    Restore,
    /// Stored preference restored and applied
    Restored {
        /// Restored preference
        mode: ThemePreference,
        /// Theme applied for it
        theme: Theme,
        /// Storage failure, if the stored value could not be used
        error: Option<String>,
    },
    /// A chosen preference was applied and persisted
    Applied {
        /// Theme applied
        theme: Theme,
    },
    /// A chosen preference was applied but could not be persisted
    PersistFailed {
        /// Theme applied
        theme: Theme,
        /// Storage failure
        error: String,
    },
}

/// Dark-mode reducer
#[derive(Debug, Clone, Copy, Default)]
pub struct DarkModeReducer;

impl Reducer for DarkModeReducer {
    type State = DarkModeState;
    type Action = DarkModeAction;
    type Environment = AppEnvironment;

    fn reduce(
        &self,
        state: &mut Self::State,
        action: Self::Action,
        env: &Self::Environment,
    ) -> SmallVec<[Effect<Self::Action>; 4]> {
        match action {
            DarkModeAction::SetMode(mode) => {
                state.mode = mode;
                let preferences = Arc::clone(&env.preferences);
                let appearance = Arc::clone(&env.appearance);

                smallvec![async_effect! {
                    let theme = mode.resolve(appearance.prefers_dark());
                    appearance.apply_theme(theme);
                    match preferences.save(mode) {
                        Ok(()) => Some(DarkModeAction::Applied { theme }),
                        Err(error) => Some(DarkModeAction::PersistFailed {
                            theme,
                            error: error.to_string(),
                        }),
                    }
                }]
            },
            DarkModeAction::Restore => {
                let preferences = Arc::clone(&env.preferences);
                let appearance = Arc::clone(&env.appearance);

                smallvec![async_effect! {
                    let (stored, mut error) = match preferences.load() {
                        Ok(stored) => (stored, None),
                        Err(e) => (None, Some(e.to_string())),
                    };
                    let prefers_dark = appearance.prefers_dark();
                    let mode = match stored {
                        Some(mode) => mode,
                        None => {
                            let system = ThemePreference::from(ThemePreference::Auto.resolve(prefers_dark));
                            if let Err(e) = preferences.save(system) {
                                error = Some(e.to_string());
                            }
                            system
                        },
                    };
                    let theme = mode.resolve(prefers_dark);
                    appearance.apply_theme(theme);
                    Some(DarkModeAction::Restored { mode, theme, error })
                }]
            },
            DarkModeAction::Restored { mode, theme, error } => {
                if let Some(error) = &error {
                    tracing::warn!(%error, "Theme preference storage failed");
                }
                state.mode = mode;
                state.applied = Some(theme);
                state.error = error;
                smallvec![Effect::None]
            },
            DarkModeAction::Applied { theme } => {
                state.applied = Some(theme);
                state.error = None;
                smallvec![Effect::None]
            },
            DarkModeAction::PersistFailed { theme, error } => {
                tracing::warn!(%error, "Failed to persist theme preference");
                state.applied = Some(theme);
                state.error = Some(error);
                smallvec![Effect::None]
            },
        }
    }
}

/// The chosen preference
#[must_use]
pub const fn mode(state: &DarkModeState) -> ThemePreference {
    state.mode
}

/// Whether the chosen preference means dark right now
///
/// `auto` is resolved against the system preference at call time.
#[must_use]
pub fn is_dark(state: &DarkModeState, appearance: &dyn Appearance) -> bool {
    state.mode.resolve(appearance.prefers_dark()) == Theme::Dark
}
