//! Memoized selectors.
//!
//! A [`Selector`] derives a value from a small set of input values extracted
//! from state. The derivation only re-runs when the inputs change, so a view
//! that reads the same derived value many times between state updates pays for
//! it once.

use std::sync::Mutex;
use std::sync::atomic::{AtomicUsize, Ordering};

/// A memoized derivation `state → inputs → output`.
///
/// `inputs` must be cheap (usually copying a few lengths or flags out of state);
/// `combine` is the potentially expensive part and is cached on the last inputs.
///
/// # Example
///
/// ```
/// use bookshelf_core::selector::Selector;
///
/// struct Lists { a: Vec<u8>, b: Vec<u8> }
///
/// let both_empty = Selector::new(
///     |s: &Lists| (s.a.len(), s.b.len()),
///     |(a, b)| a == 0 && b == 0,
/// );
///
/// let lists = Lists { a: vec![], b: vec![1] };
/// assert!(!both_empty.select(&lists));
/// assert!(!both_empty.select(&lists));
/// assert_eq!(both_empty.recomputations(), 1);
/// ```
pub struct Selector<S, I, O> {
    inputs: fn(&S) -> I,
    combine: fn(I) -> O,
    last: Mutex<Option<(I, O)>>,
    recomputations: AtomicUsize,
}

impl<S, I, O> Selector<S, I, O>
where
    I: PartialEq + Clone,
    O: Clone,
{
    /// Create a selector from an input extractor and a combiner
    #[must_use]
    pub const fn new(inputs: fn(&S) -> I, combine: fn(I) -> O) -> Self {
        Self {
            inputs,
            combine,
            last: Mutex::new(None),
            recomputations: AtomicUsize::new(0),
        }
    }

    /// Select the derived value, recomputing only when the inputs changed
    pub fn select(&self, state: &S) -> O {
        let inputs = (self.inputs)(state);

        let mut last = match self.last.lock() {
            Ok(guard) => guard,
            Err(poisoned) => poisoned.into_inner(),
        };

        if let Some((cached_inputs, cached_output)) = last.as_ref() {
            if *cached_inputs == inputs {
                return cached_output.clone();
            }
        }

        let output = (self.combine)(inputs.clone());
        self.recomputations.fetch_add(1, Ordering::Relaxed);
        *last = Some((inputs, output.clone()));
        output
    }

    /// How many times the combiner has run
    pub fn recomputations(&self) -> usize {
        self.recomputations.load(Ordering::Relaxed)
    }
}

impl<S, I, O> std::fmt::Debug for Selector<S, I, O> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Selector")
            .field("recomputations", &self.recomputations.load(Ordering::Relaxed))
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    struct Counts {
        read: usize,
        want: usize,
        reading: usize,
        unrelated: String,
    }

    fn all_zero() -> Selector<Counts, (usize, usize, usize), bool> {
        Selector::new(
            |c: &Counts| (c.read, c.want, c.reading),
            |(a, b, c)| a == 0 && b == 0 && c == 0,
        )
    }

    #[test]
    fn recomputes_only_when_inputs_change() {
        let selector = all_zero();
        let mut counts = Counts {
            read: 0,
            want: 0,
            reading: 0,
            unrelated: String::new(),
        };

        assert!(selector.select(&counts));
        counts.unrelated.push_str("noise");
        assert!(selector.select(&counts));
        assert_eq!(selector.recomputations(), 1);

        counts.want = 2;
        assert!(!selector.select(&counts));
        assert_eq!(selector.recomputations(), 2);
    }

    proptest! {
        #[test]
        fn matches_direct_computation(read in 0usize..3, want in 0usize..3, reading in 0usize..3) {
            let selector = all_zero();
            let counts = Counts { read, want, reading, unrelated: String::new() };
            prop_assert_eq!(selector.select(&counts), read == 0 && want == 0 && reading == 0);
        }
    }
}
