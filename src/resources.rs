//! Compiled-in resource tables: grapheme names, feature categories, sound
//! classes and the ASCII/IPA equivalence map.
//!
//! The tables mirror the `sounds.tsv` / `features.tsv` / `classes.tsv`
//! contract conceptually, but the data itself is embedded at compile time
//! with `lazy_static!` + `maplit::hashmap!`, the same idiom
//! `accents::genam::sounds` uses for its `SOUNDS` table. No file is read at
//! runtime; loading a TSV directory is an external collaborator's job.

use lazy_static::lazy_static;
use maplit::hashmap;
use std::collections::HashMap;

/// A sound class entry: human description, defining feature words, and an
/// optional explicit grapheme list (empty means "defined by features only").
pub struct ClassEntry {
    /// Prose description, e.g. "any vowel".
    pub description: &'static str,
    /// Space-separated feature words that define class membership.
    pub features: &'static str,
    /// Explicit member graphemes, if the class is extensionally defined.
    pub graphemes: &'static [&'static str],
}

lazy_static! {
    /// `sounds.tsv` equivalent: grapheme -> descriptive feature words.
    pub static ref SOUND_NAMES: HashMap<&'static str, &'static str> = hashmap! {
        "p" => "voiceless bilabial stop consonant",
        "b" => "voiced bilabial stop consonant",
        "t" => "voiceless alveolar stop consonant",
        "d" => "voiced alveolar stop consonant",
        "k" => "voiceless velar stop consonant",
        "ɡ" => "voiced velar stop consonant",
        "m" => "voiced bilabial nasal consonant",
        "n" => "voiced alveolar nasal consonant",
        "ŋ" => "voiced velar nasal consonant",
        "f" => "voiceless labiodental fricative consonant",
        "v" => "voiced labiodental fricative consonant",
        "s" => "voiceless alveolar fricative consonant",
        "z" => "voiced alveolar fricative consonant",
        "ʃ" => "voiceless postalveolar fricative consonant",
        "ʒ" => "voiced postalveolar fricative consonant",
        "h" => "voiceless glottal fricative consonant",
        "l" => "voiced alveolar lateral approximant liquid consonant",
        "r" => "voiced alveolar trill liquid consonant",
        "j" => "voiced palatal approximant glide consonant",
        "w" => "voiced labiovelar approximant glide consonant",
        "a" => "low central unrounded vowel",
        "aː" => "low central unrounded long vowel",
        "e" => "mid front unrounded vowel",
        "eː" => "mid front unrounded long vowel",
        "i" => "high front unrounded vowel",
        "iː" => "high front unrounded long vowel",
        "o" => "mid back rounded vowel",
        "oː" => "mid back rounded long vowel",
        "u" => "high back rounded vowel",
        "uː" => "high back rounded long vowel",
        "ɔ" => "low mid back rounded vowel",
        "ɛ" => "low mid front unrounded vowel",
    };

    /// `features.tsv` equivalent: feature value -> its category.
    ///
    /// Two features in the same category are mutually exclusive under
    /// `add_features` (adding one replaces the other).
    pub static ref FEATURE_CATEGORIES: HashMap<&'static str, &'static str> = hashmap! {
        "voiced" => "voicing",
        "voiceless" => "voicing",
        "bilabial" => "place",
        "labiodental" => "place",
        "alveolar" => "place",
        "postalveolar" => "place",
        "palatal" => "place",
        "velar" => "place",
        "labiovelar" => "place",
        "glottal" => "place",
        "central" => "place",
        "front" => "place",
        "back" => "place",
        "stop" => "manner",
        "nasal" => "manner",
        "fricative" => "manner",
        "lateral" => "manner",
        "trill" => "manner",
        "approximant" => "manner",
        "glide" => "manner",
        "high" => "height",
        "mid" => "height",
        "low" => "height",
        "long" => "length",
        "rounded" => "rounding",
        "unrounded" => "rounding",
        "consonant" => "class",
        "vowel" => "class",
        "liquid" => "manner",
    };

    /// `classes.tsv` equivalent: sound-class name -> entry.
    pub static ref CLASSES: HashMap<&'static str, ClassEntry> = hashmap! {
        "V" => ClassEntry {
            description: "any vowel",
            features: "vowel",
            graphemes: &["a", "aː", "e", "eː", "i", "iː", "o", "oː", "u", "uː", "ɔ", "ɛ"],
        },
        "C" => ClassEntry {
            description: "any consonant",
            features: "consonant",
            graphemes: &["p", "b", "t", "d", "k", "ɡ", "m", "n", "ŋ", "f", "v", "s", "z",
                         "ʃ", "ʒ", "h", "l", "r", "j", "w"],
        },
        "N" => ClassEntry {
            description: "any nasal",
            features: "nasal",
            graphemes: &["m", "n", "ŋ"],
        },
        "L" => ClassEntry {
            description: "any liquid",
            features: "liquid",
            graphemes: &["l", "r"],
        },
        "S" => ClassEntry {
            description: "any fricative sibilant-adjacent obstruent",
            features: "fricative",
            graphemes: &["f", "v", "s", "z", "ʃ", "ʒ", "h"],
        },
    };

    /// Equivalence map: alternate codepoint sequence -> canonical grapheme.
    pub static ref EQUIVALENCES: HashMap<&'static str, &'static str> = hashmap! {
        "g" => "ɡ",
        "'" => "ʼ",
    };

    /// Reverse of [`EQUIVALENCES`]: canonical -> first alternate, used when
    /// normalising output back towards the form a caller may expect.
    pub static ref EQUIVALENCES_REVERSE: HashMap<&'static str, &'static str> = {
        let mut m = HashMap::new();
        for (alt, canon) in EQUIVALENCES.iter() {
            m.entry(*canon).or_insert(*alt);
        }
        m
    };
}

/// Resolve a grapheme to its canonical form via the equivalence table.
/// Unmapped graphemes pass through unchanged.
pub fn canonicalize(grapheme: &str) -> &str {
    EQUIVALENCES.get(grapheme).copied().unwrap_or(grapheme)
}
