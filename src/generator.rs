use crate::embedder::terms;
use crate::error::Result;
use std::collections::HashSet;

pub const FALLBACK_ANSWER: &str = "I don't know.";

const STOP_WORDS: &[&str] = &[
    "a", "an", "and", "are", "be", "can", "did", "do", "does", "for", "how", "i", "in", "is",
    "it", "of", "on", "or", "the", "to", "was", "were", "what", "when", "where", "which", "who",
    "why", "with", "you",
];

/// Produces an answer to `question` grounded in the retrieved `context`
/// chunks, most relevant first.
pub trait AnswerGenerator: Send + Sync {
    fn generate(&self, question: &str, context: &[&str]) -> Result<String>;
}

/// Answers by quoting the context sentences that share the most terms with
/// the question. Falls back to [`FALLBACK_ANSWER`] when nothing overlaps.
#[derive(Debug, Clone)]
pub struct ExtractiveGenerator {
    max_sentences: usize,
}

impl Default for ExtractiveGenerator {
    fn default() -> Self {
        Self { max_sentences: 2 }
    }
}

impl ExtractiveGenerator {
    pub fn new(max_sentences: usize) -> Self {
        Self {
            max_sentences: max_sentences.max(1),
        }
    }
}

fn sentences<'c>(context: &'c [&'c str]) -> impl Iterator<Item = &'c str> + 'c {
    context.iter().flat_map(|chunk| {
        chunk
            .split_inclusive(['.', '?', '!', '\n'])
            .map(str::trim)
            .filter(|s| !s.is_empty())
    })
}

impl AnswerGenerator for ExtractiveGenerator {
    fn generate(&self, question: &str, context: &[&str]) -> Result<String> {
        let wanted: HashSet<String> = terms(question)
            .filter(|t| !STOP_WORDS.contains(&t.as_str()))
            .collect();
        if wanted.is_empty() {
            return Ok(FALLBACK_ANSWER.to_string());
        }

        // Overlapping chunks repeat sentences; score each one once.
        let mut seen = HashSet::new();
        let mut scored: Vec<(usize, &str)> = sentences(context)
            .filter(|sentence| seen.insert(*sentence))
            .map(|sentence| {
                let hits: HashSet<String> = terms(sentence).filter(|t| wanted.contains(t)).collect();
                (hits.len(), sentence)
            })
            .filter(|(score, _)| *score > 0)
            .collect();

        if scored.is_empty() {
            return Ok(FALLBACK_ANSWER.to_string());
        }

        scored.sort_by(|a, b| b.0.cmp(&a.0));
        Ok(scored
            .into_iter()
            .take(self.max_sentences)
            .map(|(_, sentence)| sentence)
            .collect::<Vec<_>>()
            .join(" "))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn quotes_most_relevant_sentence() {
        let generator = ExtractiveGenerator::new(1);
        let context = [
            "Cars need oil. Expense reports are approved by the finance manager.",
            "The office opens at nine.",
        ];
        let answer = generator
            .generate("Who approves expense reports?", &context)
            .unwrap();
        assert_eq!(answer, "Expense reports are approved by the finance manager.");
    }

    #[test]
    fn keeps_context_order_on_ties_and_skips_duplicates() {
        let generator = ExtractiveGenerator::default();
        let context = [
            "Bread needs flour.\nBread needs water.",
            "Bread needs flour. Cars need fuel.",
        ];
        let answer = generator.generate("What does bread need?", &context).unwrap();
        assert_eq!(answer, "Bread needs flour. Bread needs water.");
    }

    #[test]
    fn falls_back_without_overlap() {
        let generator = ExtractiveGenerator::default();
        assert_eq!(
            generator.generate("quantum chromodynamics", &["Bread needs flour."]).unwrap(),
            FALLBACK_ANSWER
        );
        assert_eq!(generator.generate("what is it?", &["It is."]).unwrap(), FALLBACK_ANSWER);
        assert_eq!(generator.generate("bread", &[]).unwrap(), FALLBACK_ANSWER);
    }
}
