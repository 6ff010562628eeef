use rand::rngs::StdRng;
use rand::SeedableRng;
use rayon::prelude::*;
use tracing::debug;

use crate::cancel::CancellationToken;
use crate::error::RiskError;
use crate::RiskResult;

/// Trials handed to one worker at a time. Each chunk owns its RNG stream.
pub(crate) const CHUNK_SIZE: usize = 1_000;

/// Run `trials` independent Monte-Carlo trials across the rayon pool.
///
/// Chunk `c` draws from `StdRng::seed_from_u64(seed + c)`, so the output is
/// identical for a given seed no matter how many threads execute it. Results
/// come back in trial order.
pub(crate) fn run_trials<T, F>(
    trials: usize,
    seed: Option<u64>,
    cancel: Option<&CancellationToken>,
    trial: F,
) -> RiskResult<Vec<T>>
where
    T: Send,
    F: Fn(&mut StdRng, usize) -> T + Sync,
{
    let base_seed = seed.unwrap_or_else(rand::random::<u64>);
    let chunks = trials.div_ceil(CHUNK_SIZE);
    debug!(trials, chunks, base_seed, "running monte carlo trials");

    let per_chunk: Vec<Option<Vec<T>>> = (0..chunks)
        .into_par_iter()
        .map(|c| {
            if cancel.is_some_and(|t| t.is_cancelled()) {
                return None;
            }
            let mut rng = StdRng::seed_from_u64(base_seed.wrapping_add(c as u64));
            let start = c * CHUNK_SIZE;
            let end = (start + CHUNK_SIZE).min(trials);
            Some((start..end).map(|i| trial(&mut rng, i)).collect())
        })
        .collect();

    let mut out = Vec::with_capacity(trials);
    for chunk in per_chunk {
        match chunk {
            Some(values) => out.extend(values),
            None => return Err(RiskError::Cancelled),
        }
    }
    Ok(out)
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::Rng;

    #[test]
    fn test_same_seed_same_draws() {
        let a = run_trials(2_500, Some(7), None, |rng, _| rng.gen::<f64>()).unwrap();
        let b = run_trials(2_500, Some(7), None, |rng, _| rng.gen::<f64>()).unwrap();
        assert_eq!(a.len(), 2_500);
        assert_eq!(a, b);
    }

    #[test]
    fn test_results_in_trial_order() {
        let idx = run_trials(2_100, Some(1), None, |_, i| i).unwrap();
        assert!(idx.iter().enumerate().all(|(k, i)| k == *i));
    }

    #[test]
    fn test_cancelled_run_errors() {
        let token = CancellationToken::new();
        token.cancel();
        let res = run_trials(5_000, Some(1), Some(&token), |_, i| i);
        assert!(matches!(res, Err(RiskError::Cancelled)));
    }

    #[test]
    fn test_zero_trials_is_empty() {
        let res = run_trials(0, Some(1), None, |_, i| i).unwrap();
        assert!(res.is_empty());
    }
}
