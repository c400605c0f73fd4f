//! Query and corpus text normalization.
//!
//! Mirrors the cleaning applied when the corpus was prepared: strip
//! everything that is not an ASCII letter, lowercase, then drop
//! stopwords and tokens of two characters or fewer.

/// English stopwords, with apostrophes already stripped the way
/// `clean_text` strips them ("what's" becomes "whats").
const STOPWORDS: &[&str] = &[
    "about", "above", "after", "again", "against", "all", "and", "any", "are", "arent", "because",
    "been", "before", "being", "below", "between", "both", "but", "can", "cant", "could", "couldnt",
    "did", "didnt", "does", "doesnt", "doing", "dont", "down", "during", "each", "few", "for",
    "from", "further", "had", "hadnt", "has", "hasnt", "have", "havent", "having", "her", "here",
    "heres", "hers", "herself", "him", "himself", "his", "how", "hows", "ill", "into", "isnt",
    "its", "itself", "ive", "just", "more", "most", "mustnt", "myself", "nor", "not", "now",
    "off", "once", "only", "other", "ought", "our", "ours", "ourselves", "out", "over", "own",
    "same", "shant", "she", "shes", "should", "shouldnt", "some", "such", "than", "that", "thats",
    "the", "their", "theirs", "them", "themselves", "then", "there", "theres", "these", "they",
    "theyd", "theyll", "theyre", "theyve", "this", "those", "through", "too", "under", "until",
    "very", "was", "wasnt", "were", "werent", "weve", "what", "whats", "when", "whens", "where",
    "wheres", "which", "while", "who", "whom", "whos", "why", "whys", "will", "with", "wont",
    "would", "wouldnt", "you", "youd", "youll", "youre", "yours", "yourself", "yourselves",
    "youve",
];

fn is_stopword(token: &str) -> bool {
    STOPWORDS.binary_search(&token).is_ok()
}

/// Normalize free text into the cleaned form used for embedding.
///
/// Keeps ASCII letters and whitespace only, lowercases, tokenizes on
/// whitespace, drops stopwords and tokens of length <= 2, and rejoins
/// with single spaces. An empty result is valid input for the encoder.
pub fn clean_text(text: &str) -> String {
    let mut stripped = String::with_capacity(text.len());
    for c in text.chars() {
        if c.is_ascii_alphabetic() {
            stripped.push(c.to_ascii_lowercase());
        } else if c.is_whitespace() {
            stripped.push(' ');
        }
    }

    stripped
        .split_whitespace()
        .filter(|t| t.len() > 2 && !is_stopword(t))
        .collect::<Vec<_>>()
        .join(" ")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn stopword_list_is_sorted() {
        // binary_search depends on it
        let mut sorted = STOPWORDS.to_vec();
        sorted.sort_unstable();
        assert_eq!(sorted, STOPWORDS);
    }

    #[test]
    fn strips_punctuation_and_stopwords() {
        assert_eq!(clean_text("What is Anxiety?"), "anxiety");
        assert_eq!(clean_text("what's anxiety"), "anxiety");
    }

    #[test]
    fn drops_digits_and_short_tokens() {
        assert_eq!(clean_text("I am 25 and I cry a lot"), "cry lot");
    }

    #[test]
    fn empty_after_cleaning_is_valid() {
        assert_eq!(clean_text("it is"), "");
        assert_eq!(clean_text("42 !!"), "");
        assert_eq!(clean_text(""), "");
    }

    #[test]
    fn rejoins_with_single_spaces() {
        assert_eq!(
            clean_text("  coping   with\tpanic attacks  "),
            "coping panic attacks"
        );
    }
}
