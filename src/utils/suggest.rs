//! Did-you-mean hints for tool names and enum values.

fn normalize(value: &str) -> String {
    value
        .trim()
        .to_lowercase()
        .chars()
        .filter(|c| c.is_ascii_alphanumeric())
        .collect()
}

fn edit_distance(a: &str, b: &str) -> usize {
    let a: Vec<char> = a.chars().collect();
    let b: Vec<char> = b.chars().collect();
    if a.is_empty() || b.is_empty() {
        return a.len().max(b.len());
    }
    let mut prev: Vec<usize> = (0..=b.len()).collect();
    for (i, ca) in a.iter().enumerate() {
        let mut curr = Vec::with_capacity(b.len() + 1);
        curr.push(i + 1);
        for (j, cb) in b.iter().enumerate() {
            let substitution = prev[j] + usize::from(ca != cb);
            curr.push(substitution.min(prev[j + 1] + 1).min(curr[j] + 1));
        }
        prev = curr;
    }
    prev[b.len()]
}

fn tolerance(normalized_len: usize) -> usize {
    match normalized_len {
        0 => 0,
        1..=4 => 1,
        5..=8 => 2,
        n => (n * 35 / 100).max(3),
    }
}

/// Hyphenated names that share a word with the input ("list-client" vs
/// "get-client") count as close even when the edit distance is large.
fn shares_word(input: &str, candidate: &str) -> bool {
    let words: Vec<&str> = input
        .split(|c: char| !c.is_ascii_alphanumeric())
        .filter(|w| w.len() > 3)
        .collect();
    candidate
        .split(|c: char| !c.is_ascii_alphanumeric())
        .any(|w| words.iter().any(|word| word.eq_ignore_ascii_case(w)))
}

pub fn suggest<'a, I>(input: &str, candidates: I, limit: usize) -> Vec<String>
where
    I: IntoIterator<Item = &'a str>,
{
    let needle = normalize(input);
    if needle.is_empty() {
        return Vec::new();
    }
    let allowed = tolerance(needle.len());

    let mut scored: Vec<(usize, &str)> = candidates
        .into_iter()
        .filter_map(|candidate| {
            let hay = normalize(candidate);
            if hay.is_empty() {
                return None;
            }
            let score = if hay == needle {
                0
            } else if hay.contains(&needle) || needle.contains(&hay) {
                1
            } else {
                edit_distance(&needle, &hay)
            };
            if score <= allowed {
                Some((score, candidate))
            } else if shares_word(input, candidate) {
                Some((allowed + 1, candidate))
            } else {
                None
            }
        })
        .collect();

    scored.sort_by(|a, b| {
        a.0.cmp(&b.0)
            .then_with(|| a.1.len().cmp(&b.1.len()))
            .then_with(|| a.1.cmp(b.1))
    });
    scored.dedup_by(|a, b| a.1 == b.1);
    scored
        .into_iter()
        .take(limit.max(1))
        .map(|(_, candidate)| candidate.to_string())
        .collect()
}
