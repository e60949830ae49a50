//! Medical abbreviation handling for transcript enhancement.
//!
//! Spoken clinical dictation is dense with abbreviations that general
//! speech models transcribe literally ("patient's BP is one twenty over
//! eighty"). Expanding the unambiguous ones before the enhancement model
//! sees the text gives it cleaner input to correct.

use crate::language::LanguageCode;

/// Abbreviations expanded ahead of enhancement. The table is English
/// clinical shorthand; only entries that are not also ordinary words
/// belong here -- "bid", "sob", and the Roman numeral "iv" collide with
/// prose and must not be listed.
const ABBREVIATIONS: &[(&str, &str)] = &[
    // Vital signs
    ("bp", "blood pressure"),
    ("hr", "heart rate"),
    ("rr", "respiratory rate"),
    ("spo2", "oxygen saturation"),
    // Dosing frequency
    ("tid", "three times daily"),
    ("qid", "four times daily"),
    ("prn", "as needed"),
    // Routes
    ("po", "by mouth"),
    ("im", "intramuscular"),
    // Conditions
    ("chf", "congestive heart failure"),
    ("copd", "chronic obstructive pulmonary disease"),
    ("cva", "cerebrovascular accident"),
    ("mi", "myocardial infarction"),
    ("uti", "urinary tract infection"),
    ("htn", "hypertension"),
    ("dvt", "deep vein thrombosis"),
];

fn lookup(word: &str) -> Option<&'static str> {
    let lower = word.to_lowercase();
    ABBREVIATIONS
        .iter()
        .find(|(abbrev, _)| *abbrev == lower)
        .map(|(_, full)| *full)
}

/// Prepare a transcript for the enhancement model. The abbreviation
/// table only applies to English; text in any other language passes
/// through untouched.
pub fn prepare(text: &str, language: Option<LanguageCode>) -> String {
    match language {
        Some(LanguageCode::English) | None => expand_abbreviations(text),
        Some(_) => text.to_string(),
    }
}

/// Expand known medical abbreviations, matching whole words only. Case,
/// punctuation, and everything unrecognized pass through untouched.
pub fn expand_abbreviations(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    let mut word = String::new();

    for ch in text.chars() {
        if ch.is_alphanumeric() {
            word.push(ch);
        } else {
            flush_word(&mut out, &word);
            word.clear();
            out.push(ch);
        }
    }
    flush_word(&mut out, &word);
    out
}

fn flush_word(out: &mut String, word: &str) {
    if word.is_empty() {
        return;
    }
    match lookup(word) {
        Some(full) => out.push_str(full),
        None => out.push_str(word),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn expands_whole_words() {
        assert_eq!(
            expand_abbreviations("BP stable, HR 72"),
            "blood pressure stable, heart rate 72"
        );
    }

    #[test]
    fn leaves_substrings_alone() {
        // "po" inside "point", "hr" inside "three": not abbreviations.
        assert_eq!(
            expand_abbreviations("three point seven"),
            "three point seven"
        );
    }

    #[test]
    fn handles_punctuation_boundaries() {
        assert_eq!(
            expand_abbreviations("history of CHF."),
            "history of congestive heart failure."
        );
        assert_eq!(
            expand_abbreviations("meds: amoxicillin po, tid"),
            "meds: amoxicillin by mouth, three times daily"
        );
    }

    #[test]
    fn empty_and_unknown_input_pass_through() {
        assert_eq!(expand_abbreviations(""), "");
        assert_eq!(
            expand_abbreviations("no abbreviations here"),
            "no abbreviations here"
        );
    }

    #[test]
    fn non_english_text_is_untouched() {
        // "mi" is an ordinary word in Spanish, never shorthand.
        assert_eq!(
            prepare("mi corazon late fuerte", Some(LanguageCode::Spanish)),
            "mi corazon late fuerte"
        );
        assert_eq!(
            prepare("had an mi last year", Some(LanguageCode::English)),
            "had an myocardial infarction last year"
        );
    }
}
