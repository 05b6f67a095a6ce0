// Italian word lists for the heuristic pipeline. Everything is lower-case.

use std::collections::{HashMap, HashSet};
use std::sync::LazyLock;

use super::PartOfSpeech;
use crate::entity::EntityLabel;

// NLTK Italian stopword list.
const STOPWORDS: &[&str] = &[
    "ad", "al", "allo", "ai", "agli", "all", "agl", "alla", "alle", "con", "col", "coi", "da",
    "dal", "dallo", "dai", "dagli", "dall", "dagl", "dalla", "dalle", "di", "del", "dello", "dei",
    "degli", "dell", "degl", "della", "delle", "in", "nel", "nello", "nei", "negli", "nell",
    "negl", "nella", "nelle", "su", "sul", "sullo", "sui", "sugli", "sull", "sugl", "sulla",
    "sulle", "per", "tra", "contro", "io", "tu", "lui", "lei", "noi", "voi", "loro", "mio", "mia",
    "miei", "mie", "tuo", "tua", "tuoi", "tue", "suo", "sua", "suoi", "sue", "nostro", "nostra",
    "nostri", "nostre", "vostro", "vostra", "vostri", "vostre", "mi", "ti", "ci", "vi", "lo", "la",
    "li", "le", "gli", "ne", "il", "un", "uno", "una", "ma", "ed", "se", "perché", "anche",
    "come", "dov", "dove", "che", "chi", "cui", "non", "più", "quale", "quanto", "quanti",
    "quanta", "quante", "quello", "quelli", "quella", "quelle", "questo", "questi", "questa",
    "queste", "si", "tutto", "tutti", "a", "c", "e", "i", "l", "o", "ho", "hai", "ha", "abbiamo",
    "avete", "hanno", "abbia", "abbiate", "abbiano", "avrò", "avrai", "avrà", "avremo", "avrete",
    "avranno", "avrei", "avresti", "avrebbe", "avremmo", "avreste", "avrebbero", "avevo", "avevi",
    "aveva", "avevamo", "avevate", "avevano", "ebbi", "avesti", "ebbe", "avemmo", "aveste",
    "ebbero", "avessi", "avesse", "avessimo", "avessero", "avendo", "avuto", "avuta", "avuti",
    "avute", "sono", "sei", "è", "siamo", "siete", "sia", "siate", "siano", "sarò", "sarai",
    "sarà", "saremo", "sarete", "saranno", "sarei", "saresti", "sarebbe", "saremmo", "sareste",
    "sarebbero", "ero", "eri", "era", "eravamo", "eravate", "erano", "fui", "fosti", "fu",
    "fummo", "foste", "furono", "fossi", "fosse", "fossimo", "fossero", "essendo", "faccio",
    "fai", "facciamo", "fanno", "faccia", "facciate", "facciano", "farò", "farai", "farà",
    "faremo", "farete", "faranno", "farei", "faresti", "farebbe", "faremmo", "fareste",
    "farebbero", "facevo", "facevi", "faceva", "facevamo", "facevate", "facevano", "feci",
    "facesti", "fece", "facemmo", "faceste", "fecero", "facessi", "facesse", "facessimo",
    "facessero", "facendo", "sto", "stai", "sta", "stiamo", "stanno", "stia", "stiate", "stiano",
    "starò", "starai", "starà", "staremo", "starete", "staranno", "starei", "staresti",
    "starebbe", "staremmo", "stareste", "starebbero", "stavo", "stavi", "stava", "stavamo",
    "stavate", "stavano", "stetti", "stesti", "stette", "stemmo", "steste", "stettero", "stessi",
    "stesse", "stessimo", "stessero", "stando",
];

const DETERMINERS: &[&str] = &[
    "il", "lo", "la", "i", "gli", "le", "l", "un", "uno", "una", "questo", "questa", "questi",
    "queste", "quello", "quella", "quelli", "quelle", "quel", "quei", "quegli", "ogni", "alcuni",
    "alcune", "alcun", "ciascun", "ciascuno", "qualche", "tale", "tali", "mio", "mia", "miei",
    "mie", "tuo", "tua", "tuoi", "tue", "suo", "sua", "suoi", "sue", "nostro", "nostra", "nostri",
    "nostre", "vostro", "vostra", "vostri", "vostre", "loro", "tutto", "tutta", "tutti", "tutte",
    "altro", "altra", "altri", "altre", "stesso", "stessa", "stessi", "stesse",
];

const ADPOSITIONS: &[&str] = &[
    "di", "d", "a", "ad", "da", "in", "con", "su", "per", "tra", "fra", "del", "dello", "della",
    "dei", "degli", "delle", "dell", "al", "allo", "alla", "ai", "agli", "alle", "all", "dal",
    "dallo", "dalla", "dai", "dagli", "dalle", "dall", "nel", "nello", "nella", "nei", "negli",
    "nelle", "nell", "sul", "sullo", "sulla", "sui", "sugli", "sulle", "sull", "col", "coi",
    "sotto", "sopra", "dopo", "prima", "durante", "contro", "verso", "presso", "senza",
    "attraverso", "entro", "fino", "oltre", "dentro", "fuori", "tramite", "mediante", "circa",
    "de",
];

const CONJUNCTIONS: &[&str] = &[
    "e", "ed", "o", "od", "ma", "però", "se", "che", "perché", "quando", "mentre", "come",
    "poiché", "sebbene", "benché", "quindi", "dunque", "oppure", "né", "neanche", "nemmeno",
    "tuttavia", "infatti", "inoltre", "cioè", "ovvero", "pertanto", "affinché", "finché",
];

const PRONOUNS: &[&str] = &[
    "io", "tu", "lui", "lei", "egli", "ella", "esso", "essa", "noi", "voi", "essi", "esse", "mi",
    "ti", "si", "ci", "vi", "ne", "sé", "chi", "cui", "quale", "quali", "ciò", "nulla", "niente",
    "qualcuno", "qualcosa", "ognuno", "chiunque", "costui", "costoro", "colui", "coloro",
];

const AUXILIARIES: &[&str] = &[
    "sono", "sei", "è", "siamo", "siete", "era", "erano", "ero", "fu", "furono", "fui", "fosse",
    "fossero", "sia", "siano", "sarà", "saranno", "sarebbe", "sarebbero", "essere", "stato",
    "stata", "stati", "state", "ho", "hai", "ha", "abbiamo", "avete", "hanno", "aveva", "avevano",
    "ebbe", "ebbero", "avere", "avuto", "avesse", "avessero", "abbia", "venne", "vennero",
    "viene", "vengono", "veniva", "venivano",
];

const ADVERBS: &[&str] = &[
    "non", "più", "molto", "poco", "già", "ancora", "sempre", "mai", "anche", "così", "poi",
    "allora", "oggi", "ieri", "qui", "qua", "lì", "là", "bene", "male", "quasi", "solo",
    "soltanto", "tanto", "troppo", "insieme", "infine", "subito", "presto", "tardi", "spesso",
    "dove", "ormai", "appena", "invece", "piuttosto", "ecco", "forse", "davvero",
];

const IRREGULAR_VERBS: &[&str] = &[
    "nacque", "nacquero", "morì", "morirono", "divenne", "divennero", "visse", "vissero", "fece",
    "fecero", "disse", "dissero", "prese", "presero", "vinse", "vinsero", "pose", "posero",
    "giunse", "giunsero", "scrisse", "scrissero", "volle", "vollero", "seppe", "dovette",
    "potette", "poté", "rimase", "rimasero", "mise", "misero", "diede", "diedero", "nasce",
    "muore", "diventa",
];

const ADJECTIVES: &[&str] = &[
    "grande", "grandi", "piccolo", "piccola", "piccoli", "piccole", "nuovo", "nuova", "nuovi",
    "nuove", "antico", "antica", "antichi", "antiche", "romano", "romana", "romani", "romane",
    "greco", "greca", "greci", "greche", "primo", "prima", "primi", "prime", "secondo", "seconda",
    "ultimo", "ultima", "ultimi", "ultime", "importante", "importanti", "potente", "potenti",
    "lungo", "lunga", "lunghi", "lunghe", "molti", "molte", "numerosi", "numerose", "vario",
    "varie", "vari", "nemico", "nemica", "nemici", "politico", "politica", "politici",
    "militare", "militari", "civile", "civili", "pubblico", "pubblica", "pubblici", "famoso",
    "famosa", "celebre", "celebri", "lunghissimo",
];

// Capitalized at the start of a sentence without being a name.
const SENTENCE_STARTERS: &[&str] = &[
    "inizialmente", "successivamente", "finalmente", "nonostante", "grazie", "intorno",
    "purtroppo", "probabilmente", "secondo", "verso", "oltre", "eppure", "insomma", "anzitutto",
    "innanzitutto", "comunque", "certamente", "ovviamente", "naturalmente", "ciononostante",
    "capitolo", "paragrafo", "pagina", "figura", "tabella", "esempio", "nota",
];

const MONTHS_AND_DAYS: &[&str] = &[
    "gennaio", "febbraio", "marzo", "aprile", "maggio", "giugno", "luglio", "agosto",
    "settembre", "ottobre", "novembre", "dicembre", "lunedì", "martedì", "mercoledì", "giovedì",
    "venerdì", "sabato", "domenica",
];

// Nouns that look like infinitives.
const NOUN_EXCEPTIONS: &[&str] = &[
    "cavaliere", "cavalieri", "mestiere", "carattere", "potere", "poteri", "piacere",
    "bicchiere", "cantiere", "quartiere", "forestiere", "consigliere", "consiglieri", "dovere",
    "doveri", "sapere", "volere", "genere", "messere", "corriere", "barbiere",
];

const GPE_NAMES: &[&str] = &[
    "roma", "italia", "grecia", "egitto", "gallia", "spagna", "francia", "germania", "britannia",
    "inghilterra", "cartagine", "atene", "sparta", "troia", "alessandria", "costantinopoli",
    "bisanzio", "gerusalemme", "persia", "macedonia", "siria", "giudea", "babilonia", "milano",
    "napoli", "firenze", "venezia", "genova", "torino", "bologna", "pisa", "ravenna", "palermo",
    "siracusa", "pompei", "ercolano", "capua", "taranto", "brindisi", "aquileia", "cina",
    "india", "giappone", "russia", "austria", "prussia", "polonia", "turchia", "stati uniti",
    "portogallo", "olanda", "svizzera", "tebe", "corinto", "micene", "ninive", "gerico",
    "antiochia", "verona", "padova", "mantova", "ostia", "tarquinia", "veio",
];

const LOC_NAMES: &[&str] = &[
    "europa", "asia", "africa", "america", "oceania", "mediterraneo", "alpi", "appennini",
    "tevere", "po", "nilo", "reno", "danubio", "eufrate", "tigri", "rubicone", "sicilia",
    "sardegna", "corsica", "lazio", "campania", "etruria", "toscana", "lombardia", "piemonte",
    "puglia", "calabria", "anatolia", "tracia", "dacia", "illiria", "numidia", "iberia",
    "mesopotamia", "palestina", "arabia", "medio oriente", "oriente", "occidente", "adriatico",
    "tirreno", "egeo", "peloponneso", "attica", "creta", "cipro", "rodi", "magna grecia",
];

// Head words that make a capitalized span a geographic feature.
const GEO_HEADS: &[&str] = &[
    "mar", "mare", "monte", "monti", "fiume", "lago", "golfo", "isola", "isole", "valle",
    "stretto", "capo", "oceano", "deserto", "pianura", "penisola", "colle", "canale",
];

const POLITY_HEADS: &[&str] = &[
    "impero", "regno", "repubblica", "ducato", "contea", "principato", "provincia", "sultanato",
    "califfato", "granducato", "marchesato",
];

const ORG_HEADS: &[&str] = &[
    "senato", "chiesa", "partito", "università", "banca", "società", "compagnia", "ordine",
    "lega", "esercito", "concilio", "accademia", "legione", "parlamento", "assemblea",
];

pub const PERSON_TITLES: &[&str] = &[
    "re", "regina", "imperatore", "imperatrice", "papa", "console", "generale", "dittatore",
    "san", "santo", "santa", "principe", "principessa", "duca", "duchessa", "conte", "contessa",
    "signor", "signore", "signora", "dottor", "dottore", "professor", "professore", "tribuno",
    "faraone", "zar", "senatore", "pretore", "questore", "censore", "sovrano", "sovrana",
];

pub const LOC_PREPOSITIONS: &[&str] = &["in", "verso", "presso", "attraverso", "nell", "dall"];

// Particles allowed inside a multi-word name.
pub const NAME_PARTICLES: &[&str] = &["de", "de'", "d'", "von", "van", "del"];

// Joins a polity or geographic head to its name ("Regno di Napoli").
pub const HEAD_CONNECTORS: &[&str] = &["di", "d'", "del", "della", "dei", "degli", "delle", "dell'"];

const ERA_MARKERS: &[&str] = &["a.c.", "d.c."];

// Irregular plurals and a few forms whose lemma is not the surface.
const LEMMAS: &[(&str, &str)] = &[
    ("uomini", "uomo"),
    ("mogli", "moglie"),
    ("buoi", "bue"),
    ("templi", "tempio"),
    ("ali", "ala"),
    ("braccia", "braccio"),
    ("dita", "dito"),
    ("mura", "muro"),
    ("uova", "uovo"),
    ("ossa", "osso"),
    ("imperatori", "imperatore"),
    ("imperatrici", "imperatrice"),
    ("consoli", "console"),
    ("senatori", "senatore"),
    ("popoli", "popolo"),
    ("guerre", "guerra"),
    ("battaglie", "battaglia"),
    ("province", "provincia"),
    ("legioni", "legione"),
    ("territori", "territorio"),
    ("soldati", "soldato"),
    ("eserciti", "esercito"),
    ("leggi", "legge"),
    ("paesi", "paese"),
];

// Regular noun plurals, most specific first. Feminine `-e` plurals are only
// recognized by ending, since most nouns in `-e` are singular.
const PLURAL_SUFFIXES: &[(&str, &str)] = &[
    ("ioni", "ione"),
    ("trici", "trice"),
    ("tori", "tore"),
    ("nti", "nte"),
    ("ali", "ale"),
    ("gli", "glio"),
    ("chi", "co"),
    ("ghi", "go"),
    ("che", "ca"),
    ("ghe", "ga"),
    ("ezze", "ezza"),
    ("ure", "ura"),
    ("ie", "ia"),
    ("i", "o"),
];

const INVARIANT_NOUNS: &[&str] = &["specie", "serie", "superficie", "effigie", "barbarie"];

fn set(words: &'static [&'static str]) -> HashSet<&'static str> {
    words.iter().copied().collect()
}

static STOPWORD_SET: LazyLock<HashSet<&'static str>> = LazyLock::new(|| set(STOPWORDS));
static STARTER_SET: LazyLock<HashSet<&'static str>> = LazyLock::new(|| {
    SENTENCE_STARTERS
        .iter()
        .chain(MONTHS_AND_DAYS)
        .copied()
        .collect()
});
static NOUN_EXCEPTION_SET: LazyLock<HashSet<&'static str>> =
    LazyLock::new(|| set(NOUN_EXCEPTIONS));
static IRREGULAR_VERB_SET: LazyLock<HashSet<&'static str>> =
    LazyLock::new(|| set(IRREGULAR_VERBS));
static ADJECTIVE_SET: LazyLock<HashSet<&'static str>> = LazyLock::new(|| set(ADJECTIVES));
static LEMMA_MAP: LazyLock<HashMap<&'static str, &'static str>> =
    LazyLock::new(|| LEMMAS.iter().copied().collect());

// A word listed in several tables keeps the first tag.
static CLOSED_CLASS: LazyLock<HashMap<&'static str, PartOfSpeech>> = LazyLock::new(|| {
    let tables: [(&[&str], PartOfSpeech); 6] = [
        (AUXILIARIES, PartOfSpeech::Aux),
        (DETERMINERS, PartOfSpeech::Det),
        (ADPOSITIONS, PartOfSpeech::Adp),
        (CONJUNCTIONS, PartOfSpeech::Conj),
        (PRONOUNS, PartOfSpeech::Pron),
        (ADVERBS, PartOfSpeech::Adv),
    ];
    let mut map = HashMap::new();
    for (words, pos) in tables {
        for word in words {
            map.entry(*word).or_insert(pos);
        }
    }
    map
});

static PLACES: LazyLock<HashMap<&'static str, EntityLabel>> = LazyLock::new(|| {
    let mut map: HashMap<&'static str, EntityLabel> =
        LOC_NAMES.iter().map(|w| (*w, EntityLabel::Loc)).collect();
    map.extend(GPE_NAMES.iter().map(|w| (*w, EntityLabel::Gpe)));
    map
});

pub fn is_stopword(word: &str) -> bool {
    STOPWORD_SET.contains(word)
}

pub fn is_sentence_starter(word: &str) -> bool {
    STARTER_SET.contains(word)
}

pub fn closed_class(word: &str) -> Option<PartOfSpeech> {
    CLOSED_CLASS.get(word).copied()
}

pub fn is_irregular_verb(word: &str) -> bool {
    IRREGULAR_VERB_SET.contains(word)
}

pub fn is_noun_exception(word: &str) -> bool {
    NOUN_EXCEPTION_SET.contains(word)
}

pub fn is_adjective(word: &str) -> bool {
    ADJECTIVE_SET.contains(word)
}

pub fn is_era_marker(word: &str) -> bool {
    ERA_MARKERS.contains(&word)
}

pub fn place_label(name: &str) -> Option<EntityLabel> {
    PLACES.get(name).copied()
}

pub fn head_label(head: &str) -> Option<EntityLabel> {
    if GEO_HEADS.contains(&head) {
        Some(EntityLabel::Loc)
    } else if POLITY_HEADS.contains(&head) {
        Some(EntityLabel::Gpe)
    } else if ORG_HEADS.contains(&head) {
        Some(EntityLabel::Org)
    } else {
        None
    }
}

pub fn lemma_override(word: &str) -> Option<&'static str> {
    LEMMA_MAP.get(word).copied()
}

/// Singular of a regular plural noun, or `None` when `word` does not look
/// like one. Place names and invariant nouns are left alone.
pub fn singular(word: &str) -> Option<String> {
    if word.chars().count() <= 3
        || PLACES.contains_key(word)
        || INVARIANT_NOUNS.contains(&word)
        || word.ends_with("isi")
        || word.ends_with("esi")
    {
        return None;
    }

    PLURAL_SUFFIXES
        .iter()
        .find_map(|(plural, single)| word.strip_suffix(plural).map(|stem| format!("{stem}{single}")))
}
