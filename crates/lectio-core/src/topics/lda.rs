//! Latent Dirichlet allocation by collapsed Gibbs sampling.
//!
//! The document-topic prior is asymmetric and the topic-word prior symmetric;
//! both are re-estimated after every pass with Minka's fixed-point update.

use std::collections::{BTreeSet, HashMap};

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

const PRIOR_MIN: f64 = 1e-4;
const PRIOR_MAX: f64 = 10.0;

/// Term ids for one document. Ids follow lexical order of the terms.
#[derive(Debug, Clone, Default)]
pub struct Dictionary {
    words: Vec<String>,
    ids: HashMap<String, usize>,
}

impl Dictionary {
    #[must_use]
    pub fn from_tokens(tokens: &[String]) -> Self {
        let unique: BTreeSet<&str> = tokens.iter().map(String::as_str).collect();
        let words: Vec<String> = unique.into_iter().map(str::to_string).collect();
        let ids = words
            .iter()
            .enumerate()
            .map(|(id, word)| (word.clone(), id))
            .collect();
        Self { words, ids }
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.words.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.words.is_empty()
    }

    #[must_use]
    pub fn word(&self, id: usize) -> Option<&str> {
        self.words.get(id).map(String::as_str)
    }

    /// `(term id, count)` pairs sorted by id. Unknown tokens are ignored.
    #[must_use]
    pub fn doc2bow(&self, tokens: &[String]) -> Vec<(usize, usize)> {
        let mut counts = vec![0usize; self.words.len()];
        for token in tokens {
            if let Some(&id) = self.ids.get(token) {
                counts[id] += 1;
            }
        }
        counts
            .into_iter()
            .enumerate()
            .filter(|&(_, count)| count > 0)
            .collect()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LdaParams {
    pub num_topics: usize,
    pub passes: usize,
    pub iterations: usize,
    pub seed: u64,
}

#[derive(Debug, Clone, PartialEq)]
pub struct LdaModel {
    /// Row `k` is the word distribution of topic `k`.
    pub topic_word: Vec<Vec<f64>>,
    pub alpha: Vec<f64>,
    pub eta: f64,
}

impl LdaModel {
    /// Fit over a single bag of words. `num_topics` must be non-zero.
    #[must_use]
    pub fn fit(bow: &[(usize, usize)], vocab_size: usize, params: &LdaParams) -> Self {
        let k = params.num_topics;
        let v = vocab_size as f64;
        let mut rng = StdRng::seed_from_u64(params.seed);

        let words: Vec<usize> = bow
            .iter()
            .flat_map(|&(id, count)| std::iter::repeat_n(id, count))
            .collect();

        let mut alpha = vec![1.0 / k as f64; k];
        let mut eta = 1.0 / k as f64;

        let mut doc_topic = vec![0usize; k];
        let mut topic_word = vec![vec![0usize; vocab_size]; k];
        let mut topic_total = vec![0usize; k];
        let mut assignment = Vec::with_capacity(words.len());

        for &w in &words {
            let t = rng.random_range(0..k);
            assignment.push(t);
            doc_topic[t] += 1;
            topic_word[t][w] += 1;
            topic_total[t] += 1;
        }

        let mut cumulative = vec![0.0; k];
        for _ in 0..params.passes {
            for _ in 0..params.iterations {
                for (i, &w) in words.iter().enumerate() {
                    let old = assignment[i];
                    doc_topic[old] -= 1;
                    topic_word[old][w] -= 1;
                    topic_total[old] -= 1;

                    let mut total = 0.0;
                    for t in 0..k {
                        total += (doc_topic[t] as f64 + alpha[t])
                            * (topic_word[t][w] as f64 + eta)
                            / (topic_total[t] as f64 + v * eta);
                        cumulative[t] = total;
                    }

                    let u = rng.random::<f64>() * total;
                    let new = cumulative.iter().position(|&c| u < c).unwrap_or(k - 1);

                    assignment[i] = new;
                    doc_topic[new] += 1;
                    topic_word[new][w] += 1;
                    topic_total[new] += 1;
                }
            }

            alpha = update_alpha(&alpha, &doc_topic, words.len());
            eta = update_eta(eta, &topic_word, &topic_total);
        }

        let topic_word = topic_word
            .iter()
            .zip(&topic_total)
            .map(|(row, &total)| {
                row.iter()
                    .map(|&count| (count as f64 + eta) / (total as f64 + v * eta))
                    .collect()
            })
            .collect();

        Self {
            topic_word,
            alpha,
            eta,
        }
    }

    #[must_use]
    pub fn num_topics(&self) -> usize {
        self.topic_word.len()
    }

    /// The `n` most probable term ids of `topic`, ties broken by lower id.
    #[must_use]
    pub fn top_terms(&self, topic: usize, n: usize) -> Vec<(usize, f64)> {
        let Some(row) = self.topic_word.get(topic) else {
            return Vec::new();
        };

        let mut terms: Vec<(usize, f64)> = row.iter().copied().enumerate().collect();
        terms.sort_by(|a, b| b.1.total_cmp(&a.1).then(a.0.cmp(&b.0)));
        terms.truncate(n);
        terms
    }
}

fn update_alpha(alpha: &[f64], doc_topic: &[usize], doc_len: usize) -> Vec<f64> {
    let sum: f64 = alpha.iter().sum();
    let denominator = digamma(doc_len as f64 + sum) - digamma(sum);
    if denominator <= 0.0 {
        return alpha.to_vec();
    }

    alpha
        .iter()
        .zip(doc_topic)
        .map(|(&a, &count)| {
            (a * (digamma(count as f64 + a) - digamma(a)) / denominator).clamp(PRIOR_MIN, PRIOR_MAX)
        })
        .collect()
}

fn update_eta(eta: f64, topic_word: &[Vec<usize>], topic_total: &[usize]) -> f64 {
    let v = topic_word.first().map_or(0, Vec::len) as f64;

    let numerator: f64 = topic_word
        .iter()
        .flatten()
        .filter(|&&count| count > 0)
        .map(|&count| digamma(count as f64 + eta) - digamma(eta))
        .sum();
    let denominator: f64 = v * topic_total
        .iter()
        .map(|&total| digamma(total as f64 + v * eta) - digamma(v * eta))
        .sum::<f64>();

    if denominator <= 0.0 {
        return eta;
    }
    (eta * numerator / denominator).clamp(PRIOR_MIN, PRIOR_MAX)
}

/// Digamma via the recurrence up to `x >= 6` and the asymptotic series.
pub fn digamma(mut x: f64) -> f64 {
    let mut result = 0.0;
    while x < 6.0 {
        result -= 1.0 / x;
        x += 1.0;
    }

    let f = 1.0 / (x * x);
    result + x.ln()
        - 0.5 / x
        - f * (1.0 / 12.0 - f * (1.0 / 120.0 - f * (1.0 / 252.0 - f * (1.0 / 240.0 - f / 132.0))))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn tokens(words: &[&str]) -> Vec<String> {
        words.iter().map(|w| (*w).to_string()).collect()
    }

    fn params(num_topics: usize) -> LdaParams {
        LdaParams {
            num_topics,
            passes: 5,
            iterations: 20,
            seed: 7,
        }
    }

    #[test]
    fn test_digamma() {
        assert!((digamma(1.0) + 0.577_215_664_901_532_9).abs() < 1e-9);
        assert!((digamma(0.5) + 1.963_510_026_021_423_5).abs() < 1e-9);
        assert!((digamma(10.0) - 2.251_752_589_066_721).abs() < 1e-9);
    }

    #[test]
    fn test_dictionary() {
        let toks = tokens(&["roma", "impero", "roma", "legione"]);
        let dict = Dictionary::from_tokens(&toks);

        assert_eq!(dict.len(), 3);
        assert_eq!(dict.word(0), Some("impero"));
        assert_eq!(dict.doc2bow(&toks), vec![(0, 1), (1, 1), (2, 2)]);
        assert!(dict.doc2bow(&tokens(&["cartagine"])).is_empty());
    }

    #[test]
    fn test_single_topic_is_a_distribution() {
        let toks = tokens(&["roma", "impero", "roma", "legione", "roma"]);
        let dict = Dictionary::from_tokens(&toks);
        let model = LdaModel::fit(&dict.doc2bow(&toks), dict.len(), &params(1));

        let row = &model.topic_word[0];
        assert!((row.iter().sum::<f64>() - 1.0).abs() < 1e-9);
        assert_eq!(model.top_terms(0, 1)[0].0, 2);
    }

    #[test]
    fn test_fit_is_deterministic_for_a_seed() {
        let toks = tokens(&["a", "b", "c", "a", "b", "d", "e", "a"]);
        let dict = Dictionary::from_tokens(&toks);
        let bow = dict.doc2bow(&toks);

        let first = LdaModel::fit(&bow, dict.len(), &params(3));
        let second = LdaModel::fit(&bow, dict.len(), &params(3));
        assert_eq!(first, second);
        assert_eq!(first.num_topics(), 3);
        assert!(first
            .alpha
            .iter()
            .all(|a| (PRIOR_MIN..=PRIOR_MAX).contains(a)));
    }

    #[test]
    fn test_top_terms_bounds() {
        let toks = tokens(&["x", "y"]);
        let dict = Dictionary::from_tokens(&toks);
        let model = LdaModel::fit(&dict.doc2bow(&toks), dict.len(), &params(1));

        assert_eq!(model.top_terms(0, 10).len(), 2);
        assert!(model.top_terms(5, 10).is_empty());
    }
}
