/// When to refresh a character's storyline summary.
///
/// Summaries are sampled, not produced on every turn: a chat is summarized
/// on the turn whose messages carry its count past a multiple of
/// `every_messages`. A turn appends several messages at once, so the count
/// rarely lands on the multiple exactly.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StorylinePolicy {
    every_messages: usize,
}

impl StorylinePolicy {
    /// `0` disables summaries.
    pub fn every(every_messages: usize) -> Self {
        Self { every_messages }
    }

    pub fn every_messages(&self) -> usize {
        self.every_messages
    }

    /// Whether a turn that took the history from `before` to `after`
    /// messages crossed a sampling boundary.
    pub fn should_summarize(&self, before: usize, after: usize) -> bool {
        self.every_messages > 0 && before / self.every_messages < after / self.every_messages
    }
}

impl Default for StorylinePolicy {
    fn default() -> Self {
        Self::every(20)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn samples_every_twentieth_message() {
        let policy = StorylinePolicy::default();
        let hits: Vec<usize> = (1..=60).filter(|n| policy.should_summarize(n - 1, *n)).collect();
        assert_eq!(hits, vec![20, 40, 60]);
    }

    #[test]
    fn multi_message_turns_still_hit_the_boundary() {
        let policy = StorylinePolicy::default();
        // Three messages per turn: 0, 3, ..., 18, 21, ...
        let hits: Vec<usize> = (1..=20)
            .map(|turn| turn * 3)
            .filter(|after| policy.should_summarize(after - 3, *after))
            .collect();
        assert_eq!(hits, vec![21, 42, 60]);
        assert!(!policy.should_summarize(20, 20));
    }

    #[test]
    fn zero_disables() {
        let policy = StorylinePolicy::every(0);
        assert!((1..100).all(|n| !policy.should_summarize(n - 1, n)));
    }
}
