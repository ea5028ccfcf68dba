const WORDS_PER_LINE: usize = 2;

/// Breaks a category title into display lines of at most two words.
pub fn wrap_title(title: &str) -> Vec<String> {
    let words = title.split_whitespace().collect::<Vec<_>>();
    if words.is_empty() {
        return vec![String::new()];
    }

    words
        .chunks(WORDS_PER_LINE)
        .map(|line| line.join(" "))
        .collect()
}
