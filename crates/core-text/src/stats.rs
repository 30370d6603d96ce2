//! Character and word counts over a body, placeholders excluded.

use crate::PLACEHOLDER;
use crate::body::Body;
use crate::run::Run;

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct Stats {
    /// Unicode scalar values of run text. Breaks and block boundaries do not count.
    pub chars: usize,
    /// Whitespace-delimited tokens; breaks and block boundaries separate words.
    pub words: usize,
}

impl Stats {
    pub fn of(body: &Body) -> Self {
        let text = body.plain_text().replace(PLACEHOLDER, "");
        let chars = body.runs().map(count_text).sum();
        Self {
            chars,
            words: text.split_whitespace().count(),
        }
    }
}

fn count_text(run: &Run) -> usize {
    run.text.chars().filter(|&c| c != PLACEHOLDER).count()
        + run.nested.iter().map(count_text).sum::<usize>()
}
