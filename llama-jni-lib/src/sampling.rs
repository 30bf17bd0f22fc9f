//! Greedy token selection with a repetition penalty over a sliding window.

use std::collections::VecDeque;

/// Floor used by greedy selection; logits at or below it never win.
pub const MIN_LOGIT: f32 = -1e9;

/// Fixed-size FIFO of the most recently seen token ids.
#[derive(Debug, Clone)]
pub struct RecentTokens {
    tokens: VecDeque<i32>,
    capacity: usize,
}

impl RecentTokens {
    pub fn new(capacity: usize) -> Self {
        Self {
            tokens: VecDeque::with_capacity(capacity),
            capacity,
        }
    }

    pub fn push(&mut self, token: i32) {
        if self.capacity == 0 {
            return;
        }
        if self.tokens.len() == self.capacity {
            self.tokens.pop_front();
        }
        self.tokens.push_back(token);
    }

    pub fn extend<I: IntoIterator<Item = i32>>(&mut self, tokens: I) {
        for token in tokens {
            self.push(token);
        }
    }

    pub fn iter(&self) -> impl Iterator<Item = i32> + '_ {
        self.tokens.iter().copied()
    }

    pub fn len(&self) -> usize {
        self.tokens.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tokens.is_empty()
    }
}

/// Penalize every token in `recent`, once per occurrence: positive logits are
/// divided by `penalty`, the rest multiplied.
pub fn apply_repetition_penalty(logits: &mut [f32], recent: &RecentTokens, penalty: f32) {
    for token in recent.iter() {
        let Some(logit) = usize::try_from(token).ok().and_then(|i| logits.get_mut(i)) else {
            continue;
        };
        if *logit > 0.0 {
            *logit /= penalty;
        } else {
            *logit *= penalty;
        }
    }
}

/// Index of the highest logit; the first one wins ties.
pub fn greedy(logits: &[f32]) -> i32 {
    let mut best = 0usize;
    let mut max_val = MIN_LOGIT;
    for (i, &logit) in logits.iter().enumerate() {
        if logit > max_val {
            max_val = logit;
            best = i;
        }
    }
    best as i32
}

/// Penalize then pick greedily.
pub fn select_token(logits: &mut [f32], recent: &RecentTokens, penalty: f32) -> i32 {
    apply_repetition_penalty(logits, recent, penalty);
    greedy(logits)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_recent_tokens_evicts_oldest() {
        let mut recent = RecentTokens::new(3);
        recent.extend([1, 2, 3, 4]);
        assert_eq!(recent.iter().collect::<Vec<_>>(), vec![2, 3, 4]);
        assert_eq!(recent.len(), 3);
    }

    #[test]
    fn test_recent_tokens_zero_capacity() {
        let mut recent = RecentTokens::new(0);
        recent.push(7);
        assert!(recent.is_empty());
    }

    #[test]
    fn test_penalty_signs() {
        let mut logits = vec![2.4, -1.0, 5.0];
        let mut recent = RecentTokens::new(8);
        recent.extend([0, 1]);
        apply_repetition_penalty(&mut logits, &recent, 1.2);
        assert!((logits[0] - 2.0).abs() < 1e-6);
        assert!((logits[1] + 1.2).abs() < 1e-6);
        assert_eq!(logits[2], 5.0);
    }

    #[test]
    fn test_penalty_compounds_per_occurrence() {
        let mut logits = vec![4.0];
        let mut recent = RecentTokens::new(8);
        recent.extend([0, 0]);
        apply_repetition_penalty(&mut logits, &recent, 2.0);
        assert!((logits[0] - 1.0).abs() < 1e-6);
    }

    #[test]
    fn test_penalty_ignores_out_of_range_tokens() {
        let mut logits = vec![1.0, 1.0];
        let mut recent = RecentTokens::new(4);
        recent.extend([-1, 9]);
        apply_repetition_penalty(&mut logits, &recent, 2.0);
        assert_eq!(logits, vec![1.0, 1.0]);
    }

    #[test]
    fn test_greedy_first_max_wins() {
        assert_eq!(greedy(&[0.1, 3.0, 3.0, -2.0]), 1);
        assert_eq!(greedy(&[f32::NEG_INFINITY, f32::NEG_INFINITY]), 0);
        assert_eq!(greedy(&[]), 0);
    }

    #[test]
    fn test_select_token_penalty_changes_choice() {
        let mut logits = vec![3.0, 2.8];
        let mut recent = RecentTokens::new(4);
        recent.push(0);
        assert_eq!(select_token(&mut logits, &recent, 1.2), 1);
    }
}
