//! Code Allocator
//!
//! Draws random assignment codes and retries a bounded number of times until
//! the caller reports one as free.

use std::future::Future;
use std::sync::{Mutex, PoisonError};

use rand::rngs::StdRng;
use rand::{Rng, RngCore, SeedableRng};

use crate::domain::value_objects::{AssignmentCode, CODE_ALPHABET, CODE_LENGTH};
use crate::error::{CourseworkError, CourseworkResult};

pub struct CodeAllocator<G = StdRng> {
    rng: Mutex<G>,
    max_attempts: u32,
}

impl CodeAllocator<StdRng> {
    /// ChaCha-based CSPRNG seeded from the operating system
    pub fn from_os_rng(max_attempts: u32) -> Self {
        Self::new(StdRng::from_os_rng(), max_attempts)
    }

    /// Reproducible sequence for tests
    pub fn seeded(seed: u64, max_attempts: u32) -> Self {
        Self::new(StdRng::seed_from_u64(seed), max_attempts)
    }
}

impl<G: RngCore> CodeAllocator<G> {
    pub fn new(rng: G, max_attempts: u32) -> Self {
        Self {
            rng: Mutex::new(rng),
            max_attempts: max_attempts.max(1),
        }
    }

    pub fn max_attempts(&self) -> u32 {
        self.max_attempts
    }

    /// Uniform over the 36 symbols at each of the 5 positions
    pub fn generate(&self) -> AssignmentCode {
        let mut rng = self.rng.lock().unwrap_or_else(PoisonError::into_inner);
        let code = (0..CODE_LENGTH)
            .map(|_| char::from(CODE_ALPHABET[rng.random_range(0..CODE_ALPHABET.len())]))
            .collect();
        AssignmentCode::from_generated(code)
    }

    /// Bounded retry over fresh codes
    ///
    /// `attempt` returns `Ok(Some(_))` once the code is claimed and `Ok(None)`
    /// when it is taken. Errors abort immediately. Fails with
    /// [`CourseworkError::AllocationExhausted`] after `max_attempts` misses.
    pub async fn allocate<T, F, Fut>(&self, mut attempt: F) -> CourseworkResult<T>
    where
        F: FnMut(AssignmentCode) -> Fut,
        Fut: Future<Output = CourseworkResult<Option<T>>>,
    {
        for n in 1..=self.max_attempts {
            let code = self.generate();
            let shown = code.to_string();
            if let Some(claimed) = attempt(code).await? {
                return Ok(claimed);
            }
            tracing::debug!(attempt = n, code = %shown, "Assignment code taken, retrying");
        }

        Err(CourseworkError::AllocationExhausted {
            attempts: self.max_attempts,
        })
    }
}

impl<G> std::fmt::Debug for CodeAllocator<G> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CodeAllocator")
            .field("max_attempts", &self.max_attempts)
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;
    use std::future::ready;

    #[test]
    fn test_generated_codes_are_valid() {
        let allocator = CodeAllocator::from_os_rng(10);
        for _ in 0..10_000 {
            let code = allocator.generate();
            assert!(AssignmentCode::is_valid(code.as_str()), "{code}");
        }
    }

    #[test]
    fn test_generator_covers_alphabet() {
        let allocator = CodeAllocator::seeded(1, 10);
        let seen: HashSet<char> = (0..2_000)
            .flat_map(|_| allocator.generate().as_str().chars().collect::<Vec<_>>())
            .collect();
        assert_eq!(seen.len(), CODE_ALPHABET.len());
    }

    #[test]
    fn test_same_seed_same_sequence() {
        let a = CodeAllocator::seeded(42, 10);
        let b = CodeAllocator::seeded(42, 10);
        for _ in 0..50 {
            assert_eq!(a.generate(), b.generate());
        }
    }

    #[tokio::test]
    async fn test_returns_fourth_distinct_code_when_first_three_taken() {
        let allocator = CodeAllocator::seeded(7, 10);
        let mut asked: Vec<AssignmentCode> = Vec::new();

        let claimed = allocator
            .allocate(|code| {
                if !asked.contains(&code) {
                    asked.push(code.clone());
                }
                let taken = asked.iter().position(|c| c == &code).is_some_and(|i| i < 3);
                ready(Ok(if taken { None } else { Some(code) }))
            })
            .await
            .unwrap();

        assert_eq!(asked.len(), 4);
        assert_eq!(claimed, asked[3]);
    }

    #[tokio::test]
    async fn test_exhaustion_is_an_error() {
        let allocator = CodeAllocator::seeded(3, 4);
        let mut calls = 0;

        let result = allocator
            .allocate(|_| {
                calls += 1;
                ready(Ok::<Option<()>, _>(None))
            })
            .await;

        assert!(matches!(
            result,
            Err(CourseworkError::AllocationExhausted { attempts: 4 })
        ));
        assert_eq!(calls, 4);
    }

    #[tokio::test]
    async fn test_attempt_error_aborts() {
        let allocator = CodeAllocator::seeded(3, 10);
        let mut calls = 0;

        let result: CourseworkResult<()> = allocator
            .allocate(|_| {
                calls += 1;
                ready(Err(CourseworkError::Internal("db down".into())))
            })
            .await;

        assert!(matches!(result, Err(CourseworkError::Internal(_))));
        assert_eq!(calls, 1);
    }
}
