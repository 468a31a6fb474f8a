//! Declarative macros for ergonomic effect construction

/// Create an `Effect::Future` from an async block
///
/// # Example
///
/// ```rust,ignore
/// use bookshelf_core::async_effect;
///
/// async_effect! {
///     match gateway.fetch_book(&id).await {
///         Ok(book) => Some(DetailsAction::Loaded { request, book }),
///         Err(error) => Some(DetailsAction::Failed { request, error: error.to_string() }),
///     }
/// }
/// ```
#[macro_export]
macro_rules! async_effect {
    ($($body:tt)*) => {
        $crate::effect::Effect::Future(
            ::std::boxed::Box::pin(async move { $($body)* })
        )
    };
}

/// Create an `Effect::Delay` for scheduling delayed actions
///
/// # Example
///
/// ```rust,ignore
/// use bookshelf_core::delay;
/// use std::time::Duration;
///
/// delay! {
///     duration: Duration::from_millis(600),
///     action: SearchAction::Search { query, limit: 10 }
/// }
/// ```
#[macro_export]
macro_rules! delay {
    (
        duration: $duration:expr,
        action: $action:expr
    ) => {
        $crate::effect::Effect::Delay {
            duration: $duration,
            action: ::std::boxed::Box::new($action),
        }
    };
}

/// Create a debounced action: a delay that replaces any pending one under `id`
///
/// # Example
///
/// ```rust,ignore
/// use bookshelf_core::{debounce, EffectId};
///
/// debounce! {
///     id: EffectId::new("catalog-search"),
///     duration: Duration::from_millis(600),
///     action: SearchAction::Search { query, limit: 10 }
/// }
/// ```
#[macro_export]
macro_rules! debounce {
    (
        id: $id:expr,
        duration: $duration:expr,
        action: $action:expr
    ) => {
        $crate::effect::Effect::Cancellable {
            id: $id,
            effect: ::std::boxed::Box::new($crate::delay! {
                duration: $duration,
                action: $action
            }),
        }
    };
}

#[cfg(test)]
mod tests {
    use crate::effect::{Effect, EffectId};
    use std::time::Duration;

    #[derive(Clone, Debug)]
    enum TestAction {
        AsyncResult { value: i32 },
        Search,
    }

    #[test]
    fn test_async_effect_macro() {
        let effect = async_effect! {
            Some(TestAction::AsyncResult { value: 42 })
        };

        assert!(matches!(effect, Effect::Future(_)));
    }

    #[test]
    fn test_delay_macro() {
        let effect = delay! {
            duration: Duration::from_secs(30),
            action: TestAction::Search
        };

        assert!(matches!(effect, Effect::Delay { .. }));
    }

    #[test]
    fn test_debounce_macro() {
        let effect = debounce! {
            id: EffectId::new("search"),
            duration: Duration::from_millis(600),
            action: TestAction::Search
        };

        let Effect::Cancellable { id, effect } = effect else {
            unreachable!("debounce wraps a cancellable effect");
        };
        assert_eq!(id, EffectId::new("search"));
        assert!(matches!(*effect, Effect::Delay { duration, .. } if duration == Duration::from_millis(600)));
    }
}
