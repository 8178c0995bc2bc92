//! Default display labels derived from step keys

/// Turn a step key into a human readable label.
///
/// Splits on camelCase humps, letter/digit boundaries, `_`, `-` and spaces,
/// then capitalizes each word: `stepOne` becomes `Step One`,
/// `billing_info` becomes `Billing Info`, `step2` becomes `Step 2`.
pub fn humanize_key(key: &str) -> String {
    let mut words: Vec<String> = Vec::new();
    let mut current = String::new();
    let mut prev: Option<char> = None;

    for c in key.chars() {
        if c == '_' || c == '-' || c.is_whitespace() {
            flush(&mut words, &mut current);
            prev = None;
            continue;
        }

        let boundary = match prev {
            Some(p) => {
                (p.is_lowercase() && c.is_uppercase())
                    || (p.is_alphabetic() && c.is_ascii_digit())
                    || (p.is_ascii_digit() && c.is_alphabetic())
            }
            None => false,
        };
        if boundary {
            flush(&mut words, &mut current);
        }

        current.push(c);
        prev = Some(c);
    }
    flush(&mut words, &mut current);

    words.join(" ")
}

fn flush(words: &mut Vec<String>, current: &mut String) {
    if current.is_empty() {
        return;
    }
    let mut chars = current.chars();
    if let Some(first) = chars.next() {
        let word: String = first.to_uppercase().chain(chars).collect();
        words.push(word);
    }
    current.clear();
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_camel_case_key() {
        assert_eq!(humanize_key("stepOne"), "Step One");
        assert_eq!(humanize_key("stepThree"), "Step Three");
    }

    #[test]
    fn test_snake_and_kebab_keys() {
        assert_eq!(humanize_key("billing_info"), "Billing Info");
        assert_eq!(humanize_key("shipping-address"), "Shipping Address");
    }

    #[test]
    fn test_digits_split_into_words() {
        assert_eq!(humanize_key("step2"), "Step 2");
    }

    #[test]
    fn test_acronym_stays_together() {
        assert_eq!(humanize_key("confirmURL"), "Confirm URL");
    }

    #[test]
    fn test_empty_and_separator_only_keys() {
        assert_eq!(humanize_key(""), "");
        assert_eq!(humanize_key("__"), "");
    }
}
