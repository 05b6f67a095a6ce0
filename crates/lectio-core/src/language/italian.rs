//! Rule-based Italian pipeline.
//!
//! Structural signals do most of the work: capitalization opens a name,
//! elision apostrophes and abbreviation dots shape tokens, suffixes give a
//! rough part of speech. A few small lexicons (closed-class words, a place
//! gazetteer, head words such as `Regno` or `Mar`) cover the cases structure
//! cannot decide.

use std::collections::HashSet;
use std::ops::Range;
use std::sync::{Arc, LazyLock};

use super::lexicon;
use super::{
    AnalyzedText, EntitySpan, LanguageError, LanguagePipeline, LanguageResult, PartOfSpeech,
    Sentence, SharedPipeline, Token,
};
use crate::entity::EntityLabel;

const DEFAULT_MAX_LENGTH: usize = 1_000_000;

const INFINITIVE_SUFFIXES: &[&str] = &["are", "ere", "ire", "arsi", "ersi", "irsi"];
const FINITE_SUFFIXES: &[&str] = &[
    "ando", "endo", "arono", "erono", "irono", "avano", "evano", "ivano", "ava", "eva", "ò",
];
const PARTICIPLE_SUFFIXES: &[&str] = &[
    "ato", "ata", "ati", "ate", "ito", "ita", "iti", "ite", "uto", "uta", "uti", "ute",
];
const ADJECTIVE_SUFFIXES: &[&str] = &[
    "oso", "osa", "osi", "ose", "evole", "evoli", "ibile", "ibili", "abile", "abili", "issimo",
    "issima", "issimi", "issime",
];

static SHARED: LazyLock<Arc<HeuristicItalianPipeline>> =
    LazyLock::new(|| Arc::new(HeuristicItalianPipeline::new()));

#[derive(Debug, Clone)]
pub struct HeuristicItalianPipeline {
    max_length: usize,
}

impl Default for HeuristicItalianPipeline {
    fn default() -> Self {
        Self {
            max_length: DEFAULT_MAX_LENGTH,
        }
    }
}

impl HeuristicItalianPipeline {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Refuse inputs longer than `max_length` characters.
    #[must_use]
    pub fn with_max_length(max_length: usize) -> Self {
        Self { max_length }
    }

    /// Process-wide instance. The lexicons behind it are built on first use
    /// and never change afterwards.
    #[must_use]
    pub fn shared() -> SharedPipeline {
        SHARED.clone()
    }
}

impl LanguagePipeline for HeuristicItalianPipeline {
    fn name(&self) -> &'static str {
        "heuristic-it"
    }

    fn analyze(&self, text: &str) -> LanguageResult<AnalyzedText> {
        let len = text.chars().count();
        if len > self.max_length {
            return Err(LanguageError::InputTooLong {
                len,
                max: self.max_length,
            });
        }

        let scanned = scan(text);
        let sentences = sentences(text, &scanned);
        let names = recognize(&scanned);

        let mut tokens: Vec<Token> = Vec::with_capacity(scanned.len());
        let mut prev_pos = None;
        for tok in &scanned {
            let pos = tag(tok, prev_pos);
            tokens.push(Token {
                text: tok.text.to_string(),
                lemma: lemmatize(tok.bare_lower(), pos),
                pos,
                start: tok.start,
                end: tok.end,
            });
            prev_pos = Some(pos);
        }

        let mut entities = Vec::with_capacity(names.len());
        for (range, label) in names {
            if label != EntityLabel::Date {
                for idx in range.clone() {
                    if is_capitalized(&scanned[idx]) {
                        tokens[idx].pos = PartOfSpeech::Propn;
                    }
                }
            }
            let start = scanned[range.start].start;
            let end = scanned[range.end - 1].end;
            entities.push(EntitySpan {
                text: text[start..end].to_string(),
                label,
                start,
                end,
            });
        }

        Ok(AnalyzedText {
            tokens,
            sentences,
            entities,
        })
    }

    fn is_stopword(&self, word: &str) -> bool {
        lexicon::is_stopword(word.trim_end_matches(['\'', '’']))
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Shape {
    Word,
    Number,
    Punct,
}

#[derive(Debug)]
struct Scanned<'a> {
    text: &'a str,
    lower: String,
    start: usize,
    end: usize,
    shape: Shape,
    sentence: usize,
    sentence_start: bool,
}

impl Scanned<'_> {
    fn bare_lower(&self) -> &str {
        self.lower.trim_end_matches('\'')
    }
}

fn scan(text: &str) -> Vec<Scanned<'_>> {
    let mut out: Vec<Scanned<'_>> = Vec::new();
    let mut sentence = 0;
    let mut awaiting_start = true;
    let mut pos = 0;

    while let Some(c) = text[pos..].chars().next() {
        if c.is_whitespace() {
            pos += c.len_utf8();
            continue;
        }

        let start = pos;
        let (end, shape) = if c.is_alphanumeric() {
            let end = scan_word(text, start);
            (end, word_shape(&text[start..end]))
        } else {
            (start + c.len_utf8(), Shape::Punct)
        };
        pos = end;

        let piece = &text[start..end];
        let sentence_start = awaiting_start && shape != Shape::Punct;
        if sentence_start {
            awaiting_start = false;
        }

        out.push(Scanned {
            text: piece,
            lower: piece.to_lowercase().replace('’', "'"),
            start,
            end,
            shape,
            sentence,
            sentence_start,
        });

        if shape == Shape::Punct && matches!(piece, "." | "!" | "?" | "…") {
            sentence += 1;
            awaiting_start = true;
        }
    }

    out
}

// Words keep elision apostrophes (`dell'`), abbreviation dots (`a.C.`) and
// digit grouping (`1.000`).
fn scan_word(text: &str, start: usize) -> usize {
    let mut end = start;
    let mut abbreviation = false;

    loop {
        let segment_start = end;
        end = skip_alphanumeric(text, end);
        let segment = &text[segment_start..end];

        let mut rest = text[end..].chars();
        match (rest.next(), rest.next()) {
            (Some('.' | ','), Some(next))
                if next.is_ascii_digit() && segment.chars().all(|c| c.is_ascii_digit()) =>
            {
                end += 1;
            }
            (Some('.'), Some(next)) if next.is_alphabetic() && segment.chars().count() <= 2 => {
                abbreviation = true;
                end += 1;
            }
            (Some(apostrophe @ ('\'' | '’')), Some(next))
                if next.is_alphabetic() && !abbreviation =>
            {
                return end + apostrophe.len_utf8();
            }
            _ => break,
        }
    }

    if abbreviation && text[end..].starts_with('.') {
        end += 1;
    }
    end
}

fn skip_alphanumeric(text: &str, mut pos: usize) -> usize {
    for c in text[pos..].chars() {
        if !c.is_alphanumeric() {
            break;
        }
        pos += c.len_utf8();
    }
    pos
}

fn word_shape(word: &str) -> Shape {
    let numeric = word.chars().next().is_some_and(char::is_numeric)
        && word
            .chars()
            .all(|c| c.is_numeric() || c == '.' || c == ',');
    if numeric {
        Shape::Number
    } else {
        Shape::Word
    }
}

fn sentences(text: &str, scanned: &[Scanned<'_>]) -> Vec<Sentence> {
    let mut out = Vec::new();
    let mut first = 0;

    for i in 0..scanned.len() {
        let last_of_sentence = scanned
            .get(i + 1)
            .is_none_or(|next| next.sentence != scanned[i].sentence);
        if last_of_sentence {
            let start = scanned[first].start;
            let end = scanned[i].end;
            out.push(Sentence {
                text: text[start..end].to_string(),
                start,
                end,
                tokens: first..i + 1,
            });
            first = i + 1;
        }
    }

    out
}

fn tag(tok: &Scanned<'_>, prev: Option<PartOfSpeech>) -> PartOfSpeech {
    match tok.shape {
        Shape::Number => return PartOfSpeech::Num,
        Shape::Punct => return PartOfSpeech::Punct,
        Shape::Word => {}
    }

    let word = tok.bare_lower();
    if let Some(pos) = lexicon::closed_class(word) {
        return pos;
    }
    if lexicon::is_irregular_verb(word) {
        return PartOfSpeech::Verb;
    }
    if lexicon::is_adjective(word) {
        return PartOfSpeech::Adj;
    }

    let chars = word.chars().count();
    let has_suffix = |suffixes: &[&str]| {
        suffixes
            .iter()
            .any(|s| word.ends_with(s) && chars > s.chars().count() + 2)
    };

    if word.ends_with("mente") && chars > 6 {
        PartOfSpeech::Adv
    } else if !lexicon::is_noun_exception(word)
        && (has_suffix(INFINITIVE_SUFFIXES) || has_suffix(FINITE_SUFFIXES))
    {
        PartOfSpeech::Verb
    } else if prev == Some(PartOfSpeech::Aux) && has_suffix(PARTICIPLE_SUFFIXES) {
        PartOfSpeech::Verb
    } else if has_suffix(ADJECTIVE_SUFFIXES) {
        PartOfSpeech::Adj
    } else {
        PartOfSpeech::Noun
    }
}

fn lemmatize(word: &str, pos: PartOfSpeech) -> String {
    if let Some(lemma) = lexicon::lemma_override(word) {
        return lemma.to_string();
    }
    if pos == PartOfSpeech::Noun {
        if let Some(lemma) = lexicon::singular(word) {
            return lemma;
        }
    }
    word.to_string()
}

fn is_capitalized(tok: &Scanned<'_>) -> bool {
    tok.shape == Shape::Word && tok.text.chars().next().is_some_and(char::is_uppercase)
}

fn is_function_word(word: &str) -> bool {
    lexicon::is_stopword(word) || lexicon::closed_class(word).is_some()
}

fn is_roman_numeral(word: &str) -> bool {
    word.chars()
        .all(|c| matches!(c, 'I' | 'V' | 'X' | 'L' | 'C' | 'D' | 'M'))
}

fn can_open_name(tok: &Scanned<'_>, lowercase_forms: &HashSet<&str>) -> bool {
    let word = tok.bare_lower();
    if is_function_word(word) || lexicon::is_sentence_starter(word) || lexicon::is_irregular_verb(word)
    {
        return false;
    }
    // A sentence-initial word that also appears in lower case is a common word.
    !(tok.sentence_start
        && lowercase_forms.contains(tok.lower.as_str())
        && lexicon::place_label(word).is_none())
}

fn era_date_end(scanned: &[Scanned<'_>], i: usize) -> Option<usize> {
    let year = &scanned[i];
    let marker = scanned.get(i + 1)?;
    (year.shape == Shape::Number && lexicon::is_era_marker(&marker.lower)).then_some(i + 2)
}

fn recognize(scanned: &[Scanned<'_>]) -> Vec<(Range<usize>, EntityLabel)> {
    let lowercase_forms: HashSet<&str> = scanned
        .iter()
        .filter(|t| t.shape == Shape::Word && t.text.chars().next().is_some_and(char::is_lowercase))
        .map(|t| t.lower.as_str())
        .collect();

    let mut found = Vec::new();
    let mut i = 0;

    while i < scanned.len() {
        if let Some(end) = era_date_end(scanned, i) {
            found.push((i..end, EntityLabel::Date));
            i = end;
            continue;
        }

        let opener = &scanned[i];
        if !is_capitalized(opener) || !can_open_name(opener, &lowercase_forms) {
            i += 1;
            continue;
        }

        let start = i;
        let joins_head = lexicon::head_label(opener.bare_lower()).is_some();
        let same_sentence = |t: &Scanned<'_>| t.sentence == opener.sentence;
        i += 1;

        while let Some(next) = scanned.get(i).filter(|t| same_sentence(t)) {
            if is_capitalized(next) && !is_function_word(next.bare_lower()) {
                i += 1;
                continue;
            }
            let particle = lexicon::NAME_PARTICLES.contains(&next.lower.as_str())
                || (joins_head && lexicon::HEAD_CONNECTORS.contains(&next.lower.as_str()));
            let followed_by_name = scanned
                .get(i + 1)
                .is_some_and(|after| same_sentence(after) && is_capitalized(after));
            if particle && followed_by_name {
                i += 2;
                continue;
            }
            break;
        }

        let prev = start.checked_sub(1).map(|p| scanned[p].bare_lower());
        if let Some(label) = classify(&scanned[start..i], prev) {
            found.push((start..i, label));
        }
    }

    found
}

fn classify(span: &[Scanned<'_>], prev: Option<&str>) -> Option<EntityLabel> {
    if span.iter().all(|t| is_roman_numeral(t.text)) {
        return None;
    }

    let name = span
        .iter()
        .map(Scanned::bare_lower)
        .collect::<Vec<_>>()
        .join(" ");
    if let Some(label) = lexicon::place_label(&name) {
        return Some(label);
    }

    let head = span[0].bare_lower();
    if let Some(label) = lexicon::head_label(head) {
        return Some(label);
    }

    if prev.is_some_and(|p| lexicon::PERSON_TITLES.contains(&p))
        || (span.len() > 1 && lexicon::PERSON_TITLES.contains(&head))
    {
        return Some(EntityLabel::Per);
    }

    if prev.is_some_and(|p| lexicon::LOC_PREPOSITIONS.contains(&p)) {
        return Some(EntityLabel::Gpe);
    }

    Some(EntityLabel::Per)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn analyze(text: &str) -> AnalyzedText {
        HeuristicItalianPipeline::new().analyze(text).unwrap()
    }

    fn labelled(doc: &AnalyzedText, label: EntityLabel) -> Vec<&str> {
        doc.entities
            .iter()
            .filter(|e| e.label == label)
            .map(|e| e.text.as_str())
            .collect()
    }

    #[test]
    fn test_tokenizes_elision_and_abbreviations() {
        let doc = analyze("Dell'impero nel 63 a.C. restano 1.000 statue.");
        let texts: Vec<&str> = doc.tokens.iter().map(|t| t.text.as_str()).collect();
        assert_eq!(
            texts,
            vec!["Dell'", "impero", "nel", "63", "a.C.", "restano", "1.000", "statue", "."]
        );
    }

    #[test]
    fn test_sentences() {
        let doc = analyze("Roma fu fondata. Cesare conquistò la Gallia! Fine");
        let texts: Vec<&str> = doc.sentences.iter().map(|s| s.text.as_str()).collect();
        assert_eq!(
            texts,
            vec!["Roma fu fondata.", "Cesare conquistò la Gallia!", "Fine"]
        );
        assert_eq!(doc.sentences[1].tokens, 4..9);
    }

    #[test]
    fn test_persons_and_places() {
        let doc = analyze("Augusto divenne imperatore. Ottaviano Augusto nacque nel 63 a.C. a Roma.");
        assert_eq!(
            labelled(&doc, EntityLabel::Per),
            vec!["Augusto", "Ottaviano Augusto"]
        );
        assert_eq!(labelled(&doc, EntityLabel::Gpe), vec!["Roma"]);
        assert_eq!(labelled(&doc, EntityLabel::Date), vec!["63 a.C."]);
    }

    #[test]
    fn test_head_words_and_particles() {
        let doc = analyze(
            "Il Regno di Napoli confinava con il Mar Tirreno. Lorenzo de Medici governò Firenze.",
        );
        assert_eq!(labelled(&doc, EntityLabel::Gpe), vec!["Regno di Napoli", "Firenze"]);
        assert_eq!(labelled(&doc, EntityLabel::Loc), vec!["Mar Tirreno"]);
        assert_eq!(labelled(&doc, EntityLabel::Per), vec!["Lorenzo de Medici"]);
    }

    #[test]
    fn test_sentence_starters_are_not_names() {
        let doc = analyze("Dopo la guerra. Inizialmente nessuno. Guerra e pace: la guerra finì.");
        assert!(labelled(&doc, EntityLabel::Per).is_empty());
    }

    #[test]
    fn test_titles_and_prepositions() {
        let doc = analyze("Il re Vittorio Emanuele partì. I soldati marciarono verso Tarso.");
        assert_eq!(labelled(&doc, EntityLabel::Per), vec!["Vittorio Emanuele"]);
        assert_eq!(labelled(&doc, EntityLabel::Gpe), vec!["Tarso"]);
    }

    #[test]
    fn test_roman_numerals_alone_are_skipped() {
        let doc = analyze("III secolo. Napoleone III regnò.");
        assert_eq!(labelled(&doc, EntityLabel::Per), vec!["Napoleone III"]);
    }

    #[test]
    fn test_part_of_speech() {
        let doc = analyze("l'esercito romano aveva conquistato rapidamente la provincia");
        let pos: Vec<PartOfSpeech> = doc.tokens.iter().map(|t| t.pos).collect();
        assert_eq!(
            pos,
            vec![
                PartOfSpeech::Det,
                PartOfSpeech::Noun,
                PartOfSpeech::Adj,
                PartOfSpeech::Aux,
                PartOfSpeech::Verb,
                PartOfSpeech::Adv,
                PartOfSpeech::Det,
                PartOfSpeech::Noun,
            ]
        );
    }

    #[test]
    fn test_entity_tokens_become_proper_nouns() {
        let doc = analyze("Cesare attraversò il Rubicone.");
        assert_eq!(doc.tokens[0].pos, PartOfSpeech::Propn);
        assert_eq!(doc.tokens[3].pos, PartOfSpeech::Propn);
    }

    #[test]
    fn test_lemma_overrides() {
        let doc = analyze("gli imperatori e i consoli");
        let lemmas: Vec<&str> = doc.tokens.iter().map(|t| t.lemma.as_str()).collect();
        assert_eq!(lemmas, vec!["gli", "imperatore", "e", "i", "console"]);
    }

    #[test]
    fn test_regular_plurals_are_singularized() {
        let doc = analyze("le legioni, le leggi, i mercanti, le colonie, i figli, le barche, i laghi, i generali");
        let nouns: Vec<&str> = doc
            .tokens
            .iter()
            .filter(|t| t.pos == PartOfSpeech::Noun)
            .map(|t| t.lemma.as_str())
            .collect();
        assert_eq!(
            nouns,
            vec!["legione", "legge", "mercante", "colonia", "figlio", "barca", "lago", "generale"]
        );
    }

    #[test]
    fn test_singular_and_invariant_nouns_keep_their_form() {
        for word in ["console", "legione", "pace", "crisi", "specie", "napoli", "roma", "anno"] {
            assert_eq!(lemmatize(word, PartOfSpeech::Noun), word);
        }
        assert_eq!(lemmatize("anni", PartOfSpeech::Noun), "anno");
        assert_eq!(lemmatize("portati", PartOfSpeech::Verb), "portati");
    }

    #[test]
    fn test_input_too_long() {
        let pipeline = HeuristicItalianPipeline::with_max_length(5);
        let err = pipeline.analyze("troppo lungo").unwrap_err();
        assert!(matches!(err, LanguageError::InputTooLong { len: 12, max: 5 }));
    }

    #[test]
    fn test_empty_text() {
        let doc = analyze("");
        assert!(doc.tokens.is_empty());
        assert!(doc.sentences.is_empty());
        assert!(doc.entities.is_empty());
    }

    #[test]
    fn test_stopwords() {
        let pipeline = HeuristicItalianPipeline::new();
        assert!(pipeline.is_stopword("della"));
        assert!(pipeline.is_stopword("dell'"));
        assert!(!pipeline.is_stopword("impero"));
    }
}
