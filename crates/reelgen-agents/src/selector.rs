//! Agent selection by keyword scoring
//!
//! Each agent scores the count of its keywords appearing as substrings of
//! the lower-cased prompt. Case-insensitive, no tokenization, no stemming.
//! The strictly highest score wins; ties break toward catalog order.

use crate::catalog::{Agent, Catalog};

/// Outcome of a selection
///
/// The zero-match fallback is its own variant: callers can tell "this agent
/// won on merit" apart from "nothing matched, routing to the default".
#[derive(Debug, Clone)]
pub enum Selection<'a> {
    /// At least one keyword matched; `score` is the match count
    Matched { agent: &'a Agent, score: usize },
    /// No agent scored above zero; the catalog default represents the request
    Default { agent: &'a Agent },
}

impl<'a> Selection<'a> {
    /// The selected agent, regardless of how it was chosen
    pub fn agent(&self) -> &'a Agent {
        match self {
            Self::Matched { agent, .. } | Self::Default { agent } => agent,
        }
    }

    /// Match score (zero for the default fallback)
    pub fn score(&self) -> usize {
        match self {
            Self::Matched { score, .. } => *score,
            Self::Default { .. } => 0,
        }
    }
}

/// Select the best agent for a prompt. Pure, deterministic, infallible:
/// always returns exactly one agent.
pub fn select_agent<'a>(catalog: &'a Catalog, prompt: &str) -> Selection<'a> {
    let lower = prompt.to_lowercase();

    let mut best: Option<(&Agent, usize)> = None;
    for agent in catalog.agents() {
        let score = agent
            .keywords
            .iter()
            .filter(|kw| lower.contains(&***kw))
            .count();
        // strictly-greater keeps the first-declared agent on ties
        match best {
            Some((_, best_score)) if score <= best_score => {}
            _ if score > 0 => best = Some((agent, score)),
            _ => {}
        }
    }

    match best {
        Some((agent, score)) => Selection::Matched { agent, score },
        None => Selection::Default {
            agent: catalog.default_agent(),
        },
    }
}
