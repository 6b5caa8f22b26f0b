//! Offline keyword scorer over the seven-label emotion taxonomy
//! (anger, disgust, fear, joy, neutral, sadness, surprise).

use super::traits::{EmotionClassifier, EmotionLabel};
use crate::error::ClassifierError;
use async_trait::async_trait;

const LEXICON: [(&str, &[&str]); 6] = [
    (
        "anger",
        &[
            "angry", "anger", "furious", "mad", "rage", "annoyed", "irritated", "hate",
            "frustrated", "frustrating", "pissed", "resent",
        ],
    ),
    (
        "disgust",
        &[
            "disgust", "disgusted", "disgusting", "gross", "revolting", "sickening", "repulsed",
            "nasty",
        ],
    ),
    (
        "fear",
        &[
            "afraid", "scared", "fear", "anxious", "anxiety", "worried", "worry", "panic",
            "nervous", "terrified", "frightened", "dread",
        ],
    ),
    (
        "joy",
        &[
            "happy", "glad", "joy", "excited", "great", "wonderful", "love", "grateful",
            "relieved", "proud", "calm", "good",
        ],
    ),
    (
        "sadness",
        &[
            "sad", "sadness", "depressed", "down", "lonely", "alone", "miserable", "cry",
            "crying", "hopeless", "empty", "grief", "lost", "low",
        ],
    ),
    (
        "surprise",
        &[
            "surprised", "surprise", "shocked", "unexpected", "suddenly", "wow", "astonished",
        ],
    ),
];

/// Highest keyword count wins; no hits or a tie yields `neutral`.
#[derive(Debug, Default, Clone, Copy)]
pub struct LexiconClassifier;

impl LexiconClassifier {
    pub fn new() -> Self {
        Self
    }

    pub fn score(text: &str) -> EmotionLabel {
        let lowered = text.to_lowercase();
        let tokens: Vec<&str> = lowered
            .split(|c: char| !c.is_alphanumeric() && c != '\'')
            .filter(|t| !t.is_empty())
            .collect();

        let mut best: Option<(&str, usize)> = None;
        let mut tied = false;
        for (label, cues) in LEXICON {
            let hits = tokens.iter().filter(|t| cues.contains(*t)).count();
            if hits == 0 {
                continue;
            }
            match best {
                Some((_, top)) if hits < top => {}
                Some((_, top)) if hits == top => tied = true,
                _ => {
                    best = Some((label, hits));
                    tied = false;
                }
            }
        }

        match best {
            Some((label, _)) if !tied => EmotionLabel::new(label),
            _ => EmotionLabel::neutral(),
        }
    }
}

#[async_trait]
impl EmotionClassifier for LexiconClassifier {
    async fn classify(&self, text: &str) -> Result<EmotionLabel, ClassifierError> {
        Ok(Self::score(text))
    }

    fn name(&self) -> &str {
        "lexicon"
    }
}
