//! Poll normalization

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Deserialize)]
pub struct Poll {
    pub question: PollMedia,
    #[serde(default)]
    pub answers: Vec<PollAnswer>,
    #[serde(default)]
    pub results: Option<PollResults>,
    #[serde(default)]
    pub allow_multiselect: bool,
    #[serde(default)]
    pub expiry: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct PollMedia {
    #[serde(default)]
    pub text: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct PollAnswer {
    pub answer_id: u32,
    #[serde(default)]
    pub poll_media: PollMedia,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct PollResults {
    #[serde(default)]
    pub is_finalized: bool,
    #[serde(default)]
    pub answer_counts: Vec<AnswerCount>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct AnswerCount {
    pub id: u32,
    #[serde(default)]
    pub count: u64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NormalizedPoll {
    pub question: String,
    pub answers: Vec<NormalizedAnswer>,
    pub total_votes: u64,
    pub finalized: bool,
    /// The "join to vote" prompt disappears once results are final.
    pub show_join_prompt: bool,
    pub allow_multiselect: bool,
    pub expiry: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NormalizedAnswer {
    pub text: String,
    pub votes: u64,
    /// Share of the total, 0.0 when nobody has voted.
    pub ratio: f64,
}

pub fn normalize(poll: &Poll) -> NormalizedPoll {
    let finalized = poll.results.as_ref().is_some_and(|r| r.is_finalized);
    let counts = poll
        .results
        .as_ref()
        .map(|r| r.answer_counts.as_slice())
        .unwrap_or_default();
    let votes_for = |id: u32| {
        counts
            .iter()
            .find(|c| c.id == id)
            .map(|c| c.count)
            .unwrap_or(0)
    };
    let total_votes: u64 = poll.answers.iter().map(|a| votes_for(a.answer_id)).sum();
    let answers = poll
        .answers
        .iter()
        .map(|answer| {
            let votes = votes_for(answer.answer_id);
            NormalizedAnswer {
                text: answer.poll_media.text.clone().unwrap_or_default(),
                votes,
                ratio: if total_votes == 0 {
                    0.0
                } else {
                    votes as f64 / total_votes as f64
                },
            }
        })
        .collect();
    NormalizedPoll {
        question: poll.question.text.clone().unwrap_or_default(),
        answers,
        total_votes,
        finalized,
        show_join_prompt: !finalized,
        allow_multiselect: poll.allow_multiselect,
        expiry: poll.expiry.clone(),
    }
}
