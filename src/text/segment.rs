/// Split normalized text into keystroke-sized units.
///
/// Greedy longest match: at each position the longest run of characters
/// (up to `max_chars`) for which `is_unit` holds becomes one unit. A
/// character no key produces on its own still becomes a unit of one.
pub fn segment<F>(text: &str, max_chars: usize, is_unit: F) -> Vec<String>
where
    F: Fn(&str) -> bool,
{
    let chars: Vec<char> = text.chars().collect();
    let mut units = Vec::new();
    let mut i = 0;
    while i < chars.len() {
        let longest = max_chars.min(chars.len() - i).max(1);
        let mut taken = 1;
        for len in (2..=longest).rev() {
            let candidate: String = chars[i..i + len].iter().collect();
            if is_unit(&candidate) {
                taken = len;
                break;
            }
        }
        units.push(chars[i..i + taken].iter().collect());
        i += taken;
    }
    units
}

#[cfg(test)]
mod tests {
    use std::collections::HashSet;

    use super::*;

    fn vocab(items: &[&str]) -> HashSet<String> {
        items.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn test_single_codepoints_when_nothing_longer_matches() {
        let v = vocab(&["क", "म", "ल"]);
        let units = segment("कमल", 3, |s| v.contains(s));
        assert_eq!(units, vec!["क", "म", "ल"]);
    }

    #[test]
    fn test_prefers_longest_producible_unit() {
        let v = vocab(&["द", "्", "य", "द्य", "स्"]);
        let units = segment("विद्या", 3, |s| v.contains(s));
        assert_eq!(units, vec!["व", "ि", "द्य", "ा"]);
    }

    #[test]
    fn test_unproducible_character_is_its_own_unit() {
        let v = vocab(&["क"]);
        let units = segment("ॐक", 3, |s| v.contains(s));
        assert_eq!(units, vec!["ॐ", "क"]);
    }

    #[test]
    fn test_empty_text() {
        let units = segment("", 3, |_| true);
        assert!(units.is_empty());
    }

    #[test]
    fn test_space_is_a_unit() {
        let v = vocab(&["अ", " ", "ब"]);
        assert_eq!(segment("अब अ", 2, |s| v.contains(s)), vec!["अ", "ब", " ", "अ"]);
    }
}
