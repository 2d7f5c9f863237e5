//! Injectable randomness.
//!
//! Question generation never touches a global RNG. Everything random goes
//! through a [`RandomSource`], so tests can seed a `Pcg32` or script the
//! exact draws.

use rand::Rng;

/// A source of uniform floats in `[0, 1)`.
pub trait RandomSource {
    fn next_float(&mut self) -> f64;

    /// Uniform index in `0..len`. `len` must be non-zero.
    fn index(&mut self, len: usize) -> usize {
        let i = (self.next_float() * len as f64).floor() as usize;
        i.min(len.saturating_sub(1))
    }

    /// Fair coin flip.
    fn chance(&mut self) -> bool {
        self.next_float() < 0.5
    }
}

impl<R: Rng> RandomSource for R {
    fn next_float(&mut self) -> f64 {
        self.r#gen::<f64>()
    }
}

/// Picks one element uniformly, `None` for an empty slice.
pub fn choose<'a, T>(rng: &mut dyn RandomSource, items: &'a [T]) -> Option<&'a T> {
    if items.is_empty() {
        None
    } else {
        Some(&items[rng.index(items.len())])
    }
}

/// Fisher-Yates shuffle in place.
pub fn shuffle<T>(rng: &mut dyn RandomSource, items: &mut [T]) {
    shuffle_tracking(rng, items, 0);
}

/// Fisher-Yates shuffle that reports where the element at `tracked` ended up.
pub fn shuffle_tracking<T>(rng: &mut dyn RandomSource, items: &mut [T], tracked: usize) -> usize {
    let mut position = tracked;
    for i in (1..items.len()).rev() {
        let j = rng.index(i + 1);
        items.swap(i, j);
        if position == i {
            position = j;
        } else if position == j {
            position = i;
        }
    }
    position
}

#[cfg(test)]
pub(crate) mod testing {
    use super::RandomSource;

    /// Replays a fixed list of floats, cycling when exhausted.
    pub struct Scripted {
        values: Vec<f64>,
        next: usize,
    }

    impl Scripted {
        pub fn new(values: &[f64]) -> Self {
            Scripted {
                values: values.to_vec(),
                next: 0,
            }
        }
    }

    impl RandomSource for Scripted {
        fn next_float(&mut self) -> f64 {
            let value = self.values[self.next % self.values.len()];
            self.next += 1;
            value
        }
    }
}
