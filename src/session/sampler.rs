// src/session/sampler.rs

use rand::{Rng, seq::SliceRandom};

use crate::{models::question::Question, session::SessionError};

/// Draws `min(count, bank.len())` distinct questions uniformly at random.
///
/// Shuffles only the first `count` slots of an index array (partial
/// Fisher-Yates), so the cost is bounded by the sample size rather than
/// by retries.
pub fn sample_questions<R: Rng + ?Sized>(
    bank: &[Question],
    count: usize,
    rng: &mut R,
) -> Result<Vec<Question>, SessionError> {
    if bank.is_empty() {
        return Err(SessionError::EmptyBank);
    }

    let take = count.min(bank.len());
    let mut indices: Vec<usize> = (0..bank.len()).collect();
    let (picked, _) = indices.partial_shuffle(rng, take);

    Ok(picked.iter().map(|&i| bank[i].clone()).collect())
}

#[cfg(test)]
mod tests {
    use std::collections::HashSet;

    use rand::{SeedableRng, rngs::StdRng};

    use super::*;
    use crate::models::question::QuestionType;

    fn bank(size: u64) -> Vec<Question> {
        (1..=size)
            .map(|id| Question {
                id,
                subject: "General".to_string(),
                text: format!("Question {}", id),
                question_type: QuestionType::ShortAnswer,
                correct_answer: format!("answer {}", id),
                options: None,
                round: 1,
            })
            .collect()
    }

    #[test]
    fn returns_distinct_questions_from_the_bank() {
        let bank = bank(50);
        let mut rng = StdRng::seed_from_u64(7);

        for k in [0, 1, 20, 49, 50, 80] {
            let sample = sample_questions(&bank, k, &mut rng).unwrap();
            assert_eq!(sample.len(), k.min(bank.len()));

            let ids: HashSet<u64> = sample.iter().map(|q| q.id).collect();
            assert_eq!(ids.len(), sample.len(), "duplicate question drawn");
            assert!(sample.iter().all(|q| bank.contains(q)));
        }
    }

    #[test]
    fn empty_bank_is_an_error() {
        let mut rng = StdRng::seed_from_u64(1);
        let err = sample_questions(&[], 20, &mut rng).unwrap_err();
        assert!(matches!(err, SessionError::EmptyBank));
    }

    #[test]
    fn small_bank_returns_everything() {
        let bank = bank(5);
        let mut rng = StdRng::seed_from_u64(3);

        let sample = sample_questions(&bank, 20, &mut rng).unwrap();
        let mut ids: Vec<u64> = sample.iter().map(|q| q.id).collect();
        ids.sort_unstable();
        assert_eq!(ids, vec![1, 2, 3, 4, 5]);
    }

    #[test]
    fn different_seeds_give_different_orders() {
        let bank = bank(30);
        let orders: HashSet<Vec<u64>> = (0..8)
            .map(|seed| {
                let mut rng = StdRng::seed_from_u64(seed);
                sample_questions(&bank, 10, &mut rng)
                    .unwrap()
                    .iter()
                    .map(|q| q.id)
                    .collect()
            })
            .collect();
        assert!(orders.len() > 1);
    }

    #[test]
    fn every_question_can_be_drawn() {
        let bank = bank(6);
        let mut rng = StdRng::seed_from_u64(11);
        let mut seen = HashSet::new();

        for _ in 0..200 {
            let sample = sample_questions(&bank, 2, &mut rng).unwrap();
            seen.extend(sample.iter().map(|q| q.id));
        }
        assert_eq!(seen.len(), 6);
    }
}
