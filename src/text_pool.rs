// src/text_pool.rs
//
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Shared corpus of grammar-generated text
//!
//! Comment columns never generate text of their own: they pick a random
//! window of this buffer. The pool is built once, then only read.

use std::borrow::Cow;
use std::time::Instant;

use crate::constants::{MAX_SENTENCE_LENGTH, TEXT_POOL_SEED};
use crate::distribution::{Distribution, Distributions};
use crate::error::{GenError, Result};
use crate::random::RowRandomInt;

/// Immutable buffer of synthetic sentences
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TextPool {
    text: Vec<u8>,
}

impl TextPool {
    /// Build a pool of exactly `size` bytes with the fixed text seed
    pub fn generate(distributions: &Distributions, size: usize) -> Result<Self> {
        let mut random = RowRandomInt::new(TEXT_POOL_SEED, u64::MAX);
        Self::build(distributions, &mut random, size)
    }

    /// Build a pool of exactly `size` bytes from `random`
    ///
    /// Sentences are appended until the buffer reaches `size`, then the
    /// overshoot of the last sentence is cut off.
    pub fn build(
        distributions: &Distributions,
        random: &mut RowRandomInt,
        size: usize,
    ) -> Result<Self> {
        let started = Instant::now();
        let grammar = Grammar::resolve(distributions)?;
        let mut buffer = SentenceBuffer::with_capacity(size + MAX_SENTENCE_LENGTH);

        while buffer.len() < size {
            grammar.sentence(random, &mut buffer)?;
        }
        buffer.truncate(size);

        tracing::info!(
            "Built text pool: {} bytes in {:.3} s",
            size,
            started.elapsed().as_secs_f64()
        );
        Ok(Self { text: buffer.bytes })
    }

    pub fn len(&self) -> usize {
        self.text.len()
    }

    pub fn is_empty(&self) -> bool {
        self.text.is_empty()
    }

    /// Text in `[offset, offset + length)`, clamped to the end of the pool
    pub fn slice(&self, offset: usize, length: usize) -> Cow<'_, str> {
        let end = offset.saturating_add(length).min(self.text.len());
        let begin = offset.min(end);
        String::from_utf8_lossy(&self.text[begin..end])
    }

    pub fn as_bytes(&self) -> &[u8] {
        &self.text
    }
}

/// Byte buffer with the separator handling the grammar relies on
struct SentenceBuffer {
    bytes: Vec<u8>,
}

impl SentenceBuffer {
    fn with_capacity(capacity: usize) -> Self {
        Self {
            bytes: Vec::with_capacity(capacity),
        }
    }

    fn len(&self) -> usize {
        self.bytes.len()
    }

    fn append(&mut self, word: &str) {
        self.bytes.extend_from_slice(word.as_bytes());
    }

    fn erase(&mut self, count: usize) {
        let keep = self.bytes.len().saturating_sub(count);
        self.bytes.truncate(keep);
    }

    /// Make sure the buffer ends with exactly one separator
    fn ensure_space(&mut self) {
        if self.bytes.last() != Some(&b' ') {
            self.bytes.push(b' ');
        }
    }

    fn truncate(&mut self, size: usize) {
        self.bytes.truncate(size);
    }
}

/// The distributions a sentence is made of, resolved once per build
struct Grammar<'a> {
    sentences: &'a Distribution,
    noun_phrases: &'a Distribution,
    verb_phrases: &'a Distribution,
    prepositions: &'a Distribution,
    terminators: &'a Distribution,
    articles: &'a Distribution,
    adjectives: &'a Distribution,
    adverbs: &'a Distribution,
    nouns: &'a Distribution,
    verbs: &'a Distribution,
    auxiliaries: &'a Distribution,
}

impl<'a> Grammar<'a> {
    fn resolve(distributions: &'a Distributions) -> Result<Self> {
        Ok(Self {
            sentences: distributions.get("grammar")?,
            noun_phrases: distributions.get("np")?,
            verb_phrases: distributions.get("vp")?,
            prepositions: distributions.get("prepositions")?,
            terminators: distributions.get("terminators")?,
            articles: distributions.get("articles")?,
            adjectives: distributions.get("adjectives")?,
            adverbs: distributions.get("adverbs")?,
            nouns: distributions.get("nouns")?,
            verbs: distributions.get("verbs")?,
            auxiliaries: distributions.get("auxillaries")?,
        })
    }

    /// Sentence productions are space separated single-letter symbols
    fn sentence(&self, random: &mut RowRandomInt, buffer: &mut SentenceBuffer) -> Result<()> {
        let syntax = self.sentences.random_value(random)?;
        for symbol in syntax.bytes().step_by(2) {
            match symbol {
                b'V' => self.verb_phrase(random, buffer)?,
                b'N' => self.noun_phrase(random, buffer)?,
                b'P' => {
                    buffer.append(self.prepositions.random_value(random)?);
                    buffer.append(" the ");
                    self.noun_phrase(random, buffer)?;
                }
                b'T' => {
                    buffer.erase(1);
                    buffer.append(self.terminators.random_value(random)?);
                }
                other => return Err(grammar_error(self.sentences, other)),
            }
            buffer.ensure_space();
        }
        Ok(())
    }

    fn verb_phrase(&self, random: &mut RowRandomInt, buffer: &mut SentenceBuffer) -> Result<()> {
        let syntax = self.verb_phrases.random_value(random)?;
        for symbol in syntax.bytes().step_by(2) {
            let source = match symbol {
                b'D' => self.adverbs,
                b'V' => self.verbs,
                b'X' => self.auxiliaries,
                other => return Err(grammar_error(self.verb_phrases, other)),
            };
            buffer.append(source.random_value(random)?);
            buffer.append(" ");
        }
        Ok(())
    }

    /// Noun productions are read byte by byte; `,` replaces the last separator
    fn noun_phrase(&self, random: &mut RowRandomInt, buffer: &mut SentenceBuffer) -> Result<()> {
        let syntax = self.noun_phrases.random_value(random)?;
        for symbol in syntax.bytes() {
            let source = match symbol {
                b'A' => self.articles,
                b'J' => self.adjectives,
                b'D' => self.adverbs,
                b'N' => self.nouns,
                b',' => {
                    buffer.erase(1);
                    buffer.append(", ");
                    continue;
                }
                b' ' => continue,
                other => return Err(grammar_error(self.noun_phrases, other)),
            };
            buffer.append(source.random_value(random)?);
            buffer.append(" ");
        }
        Ok(())
    }
}

fn grammar_error(distribution: &Distribution, symbol: u8) -> GenError {
    GenError::Grammar {
        distribution: distribution.name().to_string(),
        symbol: symbol as char,
    }
}
