// SPDX-FileCopyrightText: 2026 Taskwright Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Fuzzy ranking of a free-text phrase against a user's task titles.
//!
//! Scoring, highest wins:
//! - phrase equals title: 100
//! - phrase is a substring of the title: 80
//! - title is a substring of the phrase: 70
//! - otherwise 20 per distinct shared word, and tasks sharing no word are dropped
//!
//! All comparisons are case-insensitive on trimmed text. Ties keep input order.

use std::collections::HashSet;

use taskwright_core::Task;

pub const EXACT_SCORE: u32 = 100;
pub const PHRASE_IN_TITLE_SCORE: u32 = 80;
pub const TITLE_IN_PHRASE_SCORE: u32 = 70;
pub const SHARED_WORD_SCORE: u32 = 20;

/// A task paired with its relevance score.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ScoredTask<'a> {
    pub task: &'a Task,
    pub score: u32,
}

/// Scores one title against a phrase. Zero means "not a candidate".
pub fn score(phrase: &str, title: &str) -> u32 {
    let phrase = phrase.trim().to_lowercase();
    let title = title.trim().to_lowercase();
    if phrase.is_empty() || title.is_empty() {
        return 0;
    }

    if phrase == title {
        return EXACT_SCORE;
    }
    if title.contains(&phrase) {
        return PHRASE_IN_TITLE_SCORE;
    }
    if phrase.contains(&title) {
        return TITLE_IN_PHRASE_SCORE;
    }

    let phrase_words: HashSet<&str> = phrase.split_whitespace().collect();
    let title_words: HashSet<&str> = title.split_whitespace().collect();
    let shared = phrase_words.intersection(&title_words).count() as u32;
    SHARED_WORD_SCORE * shared
}

/// Ranks `tasks` against `phrase`, best first.
///
/// Tasks scoring zero are excluded. An empty task list or a blank phrase
/// yields an empty ranking.
pub fn rank<'a>(phrase: &str, tasks: &'a [Task]) -> Vec<ScoredTask<'a>> {
    let mut ranked: Vec<ScoredTask<'a>> = tasks
        .iter()
        .map(|task| ScoredTask {
            task,
            score: score(phrase, &task.title),
        })
        .filter(|scored| scored.score > 0)
        .collect();
    // sort_by is stable, so equal scores keep their input order.
    ranked.sort_by(|a, b| b.score.cmp(&a.score));
    ranked
}
