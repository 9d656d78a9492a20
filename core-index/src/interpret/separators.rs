//! Splitting of multi-value tags that were written as a single value

/// Characters that split a single tag value into several values.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Separators {
    chars: Vec<char>,
}

impl Separators {
    pub fn new(chars: &str) -> Self {
        let mut chars: Vec<char> = chars.chars().collect();
        chars.sort_unstable();
        chars.dedup();
        Self { chars }
    }

    pub fn is_empty(&self) -> bool {
        self.chars.is_empty()
    }

    /// Split `values` when it holds exactly one value.
    ///
    /// Lists that are already multi-valued came from a format with real
    /// multi-value support and are returned unchanged. A separator preceded by
    /// `\` is kept literally.
    pub fn split(&self, values: &[String]) -> Vec<String> {
        match values {
            [single] if !self.is_empty() => split_escaped(single, |c| self.chars.contains(&c))
                .into_iter()
                .filter_map(|part| {
                    let trimmed = part.trim();
                    (!trimmed.is_empty()).then(|| trimmed.to_string())
                })
                .collect(),
            _ => values.to_vec(),
        }
    }
}

/// Split `value` on every unescaped character matching `is_separator`,
/// keeping whitespace and dropping the escaping backslashes.
pub fn split_escaped(value: &str, is_separator: impl Fn(char) -> bool) -> Vec<String> {
    let mut parts = Vec::new();
    let mut current = String::new();
    let mut chars = value.chars().peekable();

    while let Some(c) = chars.next() {
        match c {
            '\\' if chars.peek().copied().is_some_and(&is_separator) => {
                if let Some(escaped) = chars.next() {
                    current.push(escaped);
                }
            }
            c if is_separator(c) => parts.push(std::mem::take(&mut current)),
            c => current.push(c),
        }
    }
    parts.push(current);
    parts
}

#[cfg(test)]
mod tests {
    use super::*;

    fn strings(values: &[&str]) -> Vec<String> {
        values.iter().map(|v| v.to_string()).collect()
    }

    #[test]
    fn test_split_escaped() {
        assert_eq!(split_escaped("a,b,c", |c| c == ','), ["a", "b", "c"]);
        assert_eq!(split_escaped("a\\,b,c", |c| c == ','), ["a,b", "c"]);
        assert_eq!(
            split_escaped("a , b, c ,  ", |c| c == ','),
            ["a ", " b", " c ", "  "]
        );
        assert_eq!(split_escaped("back\\slash", |c| c == ','), ["back\\slash"]);
    }

    #[test]
    fn test_split_single_value() {
        let separators = Separators::new(";/");
        assert_eq!(
            separators.split(&strings(&["Rock; Pop /Jazz"])),
            ["Rock", "Pop", "Jazz"]
        );
        assert_eq!(separators.split(&strings(&["AC\\/DC"])), ["AC/DC"]);
        assert_eq!(separators.split(&strings(&[" ; "])), Vec::<String>::new());
    }

    #[test]
    fn test_multi_values_left_alone() {
        let separators = Separators::new(";");
        let values = strings(&["A;B", "C"]);
        assert_eq!(separators.split(&values), values);
    }

    #[test]
    fn test_no_separators_configured() {
        let separators = Separators::default();
        assert!(separators.is_empty());
        assert_eq!(separators.split(&strings(&["A;B"])), ["A;B"]);
    }
}
