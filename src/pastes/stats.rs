// src/pastes/stats.rs
//! Line, word and byte counts of paste content, and language shares

use std::collections::HashMap;

use super::models::{LangStat, Paste, PasteStats, Stats};

/// A trailing newline does not start a new line; empty content has no lines
pub fn count(content: &str) -> Stats {
    Stats {
        lines: content.lines().count() as u64,
        words: content.split_whitespace().count() as u64,
        size: content.len() as u64,
    }
}

pub fn paste_stats(paste: &Paste) -> PasteStats {
    let mut stats = PasteStats::default();

    for pasty in &paste.pasties {
        let pasty_stats = count(&pasty.content);
        stats.total.lines += pasty_stats.lines;
        stats.total.words += pasty_stats.words;
        stats.total.size += pasty_stats.size;
        stats.pasties.insert(pasty.id.clone(), pasty_stats);
    }

    stats
}

/// Byte share of each language, largest first. Empty content gives no entries.
pub fn lang_stats(paste: &Paste) -> Vec<LangStat> {
    let mut bytes_per_language: HashMap<&str, usize> = HashMap::new();
    let mut total = 0;

    for pasty in &paste.pasties {
        *bytes_per_language.entry(pasty.language.as_str()).or_insert(0) += pasty.content.len();
        total += pasty.content.len();
    }

    if total == 0 {
        return Vec::new();
    }

    let mut stats: Vec<LangStat> = bytes_per_language
        .into_iter()
        .filter(|(_, bytes)| *bytes > 0)
        .map(|(language, bytes)| LangStat {
            language: language.to_string(),
            percentage: bytes as f32 / total as f32 * 100.0,
        })
        .collect();

    stats.sort_by(|a, b| {
        b.percentage
            .total_cmp(&a.percentage)
            .then_with(|| a.language.cmp(&b.language))
    });
    stats
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pastes::models::{ExpiresIn, Pasty};

    #[test]
    fn test_count_lines_and_words() {
        assert_eq!(
            count("a\nb"),
            Stats {
                lines: 2,
                words: 2,
                size: 3
            }
        );
        assert_eq!(count("hello world\n").lines, 1);
        assert_eq!(count("one  two\tthree\r\nfour").words, 4);
        assert_eq!(count("one  two\tthree\r\nfour").lines, 2);
    }

    #[test]
    fn test_count_empty() {
        assert_eq!(count(""), Stats::default());
    }

    #[test]
    fn test_size_is_bytes() {
        assert_eq!(count("ü").size, 2);
    }

    fn paste_with(pasties: &[(&str, &str)]) -> Paste {
        Paste {
            id: "p".to_string(),
            created_at: chrono::Utc::now(),
            expires_in: ExpiresIn::Never,
            deletes_at: None,
            title: String::new(),
            owner_id: None,
            private: false,
            pasties: pasties
                .iter()
                .enumerate()
                .map(|(i, (language, content))| Pasty {
                    id: i.to_string(),
                    title: String::new(),
                    content: content.to_string(),
                    language: language.to_string(),
                })
                .collect(),
        }
    }

    #[test]
    fn test_lang_stats_groups_and_sorts_by_share() {
        let paste = paste_with(&[("Rust", "aaaaaa"), ("Text", "bb"), ("Rust", "cc")]);

        let stats = lang_stats(&paste);

        assert_eq!(stats.len(), 2);
        assert_eq!(stats[0].language, "Rust");
        assert_eq!(stats[0].percentage, 80.0);
        assert_eq!(stats[1].language, "Text");
        assert_eq!(stats[1].percentage, 20.0);
    }

    #[test]
    fn test_lang_stats_skips_empty_languages() {
        let paste = paste_with(&[("Rust", "fn main() {}"), ("Go", "")]);

        let stats = lang_stats(&paste);

        assert_eq!(stats.len(), 1);
        assert_eq!(stats[0].language, "Rust");
        assert_eq!(stats[0].percentage, 100.0);
    }

    #[test]
    fn test_lang_stats_of_empty_paste() {
        assert!(lang_stats(&paste_with(&[("Rust", ""), ("Text", "")])).is_empty());
    }
}
