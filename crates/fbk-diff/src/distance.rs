//! Scalar dissimilarity measures.

/// Levenshtein edit distance over Unicode scalar values.
pub fn levenshtein(a: &str, b: &str) -> usize {
    let a: Vec<char> = a.chars().collect();
    let b: Vec<char> = b.chars().collect();
    if a.is_empty() {
        return b.len();
    }
    if b.is_empty() {
        return a.len();
    }

    let mut prev: Vec<usize> = (0..=b.len()).collect();
    let mut curr = vec![0usize; b.len() + 1];

    for (i, ca) in a.iter().enumerate() {
        curr[0] = i + 1;
        for (j, cb) in b.iter().enumerate() {
            let substitution = prev[j] + usize::from(ca != cb);
            curr[j + 1] = substitution.min(prev[j + 1] + 1).min(curr[j] + 1);
        }
        std::mem::swap(&mut prev, &mut curr);
    }

    prev[b.len()]
}

/// Normalized edit distance in `[0, 1]`.
pub fn text_ratio(a: &str, b: &str) -> f64 {
    if a == b {
        return 0.0;
    }
    let (len_a, len_b) = (a.chars().count(), b.chars().count());
    if len_a == 0 || len_b == 0 {
        return 1.0;
    }
    levenshtein(a, b) as f64 / len_a.max(len_b) as f64
}

/// Relative numeric change in `[0, 1]`.
pub fn number_ratio(a: f64, b: f64) -> f64 {
    if a == b {
        return 0.0;
    }
    if a == 0.0 {
        return 1.0;
    }
    let change = (b - a).abs();
    let base = a.abs().max(b.abs());
    (change / base).min(1.0)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn levenshtein_classics() {
        assert_eq!(levenshtein("kitten", "sitting"), 3);
        assert_eq!(levenshtein("", "abc"), 3);
        assert_eq!(levenshtein("flaw", "lawn"), 2);
        assert_eq!(levenshtein("same", "same"), 0);
        assert_eq!(levenshtein("naïve", "naive"), 1);
    }

    #[test]
    fn text_ratio_edges() {
        assert_eq!(text_ratio("", ""), 0.0);
        assert_eq!(text_ratio("", "x"), 1.0);
        assert_eq!(text_ratio("x", ""), 1.0);
        assert_eq!(text_ratio("hello", "world"), 0.8);
    }

    #[test]
    fn text_ratio_grows_with_length_gap() {
        let short = text_ratio("a", &"a".repeat(10));
        let long = text_ratio("a", &"a".repeat(1000));
        assert!(long > short);
        assert!(long > 0.99);
    }

    #[test]
    fn number_ratio_edges() {
        assert_eq!(number_ratio(5.0, 5.0), 0.0);
        assert_eq!(number_ratio(0.0, 7.0), 1.0);
        assert_eq!(number_ratio(7.0, 0.0), 1.0);
        assert_eq!(number_ratio(100.0, 50.0), 0.5);
        assert_eq!(number_ratio(-10.0, 10.0), 1.0);
        assert_eq!(number_ratio(f64::MAX, -f64::MAX), 1.0);
    }
}
