//! Display names and their sort keys

use core_runtime::config::NamingMode;
use serde::{Deserialize, Serialize};
use std::cmp::Ordering;
use std::fmt;

/// What an unnamed item is shown as.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Placeholder {
    Album,
    Artist,
    Genre,
}

impl Placeholder {
    pub fn label(&self) -> &'static str {
        match self {
            Placeholder::Album => "Unknown Album",
            Placeholder::Artist => "Unknown Artist",
            Placeholder::Genre => "Unknown Genre",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum TokenKind {
    Numeric,
    Lexicographic,
}

/// One comparable run of a name.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Token {
    pub text: String,
    pub kind: TokenKind,
}

impl Token {
    fn new(text: impl Into<String>, kind: TokenKind) -> Self {
        Self {
            text: text.into(),
            kind,
        }
    }
}

impl PartialOrd for Token {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for Token {
    fn cmp(&self, other: &Self) -> Ordering {
        self.kind.cmp(&other.kind).then_with(|| match self.kind {
            // Leading zeros are already gone, so a longer run is a larger number.
            TokenKind::Numeric => self
                .text
                .len()
                .cmp(&other.text.len())
                .then_with(|| self.text.cmp(&other.text)),
            TokenKind::Lexicographic => self
                .text
                .chars()
                .flat_map(char::to_lowercase)
                .cmp(other.text.chars().flat_map(char::to_lowercase)),
        })
    }
}

/// Name of a song, album, artist or genre.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Name {
    Known {
        raw: String,
        sort: Option<String>,
        tokens: Vec<Token>,
    },
    Unknown(Placeholder),
}

impl Name {
    pub fn known(mode: NamingMode, raw: impl Into<String>, sort: Option<String>) -> Name {
        let raw = raw.into();
        let tokens = {
            let source = sort.as_deref().unwrap_or(&raw);
            match mode {
                NamingMode::Intelligent => intelligent_tokens(source),
                NamingMode::Simple => vec![simple_token(source)],
            }
        };
        Name::Known { raw, sort, tokens }
    }

    /// Known name when `raw` is present, the placeholder otherwise.
    pub fn new(
        mode: NamingMode,
        raw: Option<&str>,
        sort: Option<&str>,
        placeholder: Placeholder,
    ) -> Name {
        match raw {
            Some(raw) => Name::known(mode, raw, sort.map(str::to_string)),
            None => Name::Unknown(placeholder),
        }
    }

    pub fn raw(&self) -> Option<&str> {
        match self {
            Name::Known { raw, .. } => Some(raw),
            Name::Unknown(_) => None,
        }
    }

    pub fn tokens(&self) -> &[Token] {
        match self {
            Name::Known { tokens, .. } => tokens,
            Name::Unknown(_) => &[],
        }
    }

    pub fn is_unknown(&self) -> bool {
        matches!(self, Name::Unknown(_))
    }
}

impl fmt::Display for Name {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Name::Known { raw, .. } => f.write_str(raw),
            Name::Unknown(placeholder) => f.write_str(placeholder.label()),
        }
    }
}

impl PartialOrd for Name {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for Name {
    fn cmp(&self, other: &Self) -> Ordering {
        match (self, other) {
            (Name::Unknown(a), Name::Unknown(b)) => (*a as u8).cmp(&(*b as u8)),
            (Name::Unknown(_), Name::Known { .. }) => Ordering::Less,
            (Name::Known { .. }, Name::Unknown(_)) => Ordering::Greater,
            (
                Name::Known {
                    raw: a_raw,
                    tokens: a_tokens,
                    ..
                },
                Name::Known {
                    raw: b_raw,
                    tokens: b_tokens,
                    ..
                },
            ) => a_tokens
                .cmp(b_tokens)
                .then_with(|| a_raw.cmp(b_raw))
                .then_with(|| self.sort_source().cmp(&other.sort_source())),
        }
    }
}

impl Name {
    fn sort_source(&self) -> Option<&str> {
        match self {
            Name::Known { sort, .. } => sort.as_deref(),
            Name::Unknown(_) => None,
        }
    }
}

fn strip_punctuation(name: &str) -> String {
    name.chars().filter(|c| !c.is_ascii_punctuation()).collect()
}

fn simple_token(name: &str) -> Token {
    let stripped = strip_punctuation(name);
    let stripped = stripped.trim();
    let text = if stripped.is_empty() { name } else { stripped };
    Token::new(text, TokenKind::Lexicographic)
}

fn strip_article(name: &str) -> &str {
    for article in ["the ", "an ", "a "] {
        if name.len() > article.len()
            && name
                .get(..article.len())
                .is_some_and(|prefix| prefix.eq_ignore_ascii_case(article))
        {
            return &name[article.len()..];
        }
    }
    name
}

fn intelligent_tokens(name: &str) -> Vec<Token> {
    let stripped = strip_punctuation(name);
    let stripped = if stripped.is_empty() {
        name.to_string()
    } else {
        stripped
    };
    let stripped = strip_article(&stripped);

    let mut tokens = Vec::new();
    let mut rest = stripped;
    while let Some(first) = rest.chars().next() {
        let numeric = first.is_ascii_digit();
        let end = rest
            .find(|c: char| c.is_ascii_digit() != numeric)
            .unwrap_or(rest.len());
        let (run, tail) = rest.split_at(end);
        rest = tail;

        let trimmed = run.trim();
        let token = if trimmed.is_empty() { run } else { trimmed };
        if numeric {
            let digits = token.trim_start_matches('0');
            let digits = if digits.is_empty() { token } else { digits };
            tokens.push(Token::new(digits, TokenKind::Numeric));
        } else {
            tokens.push(Token::new(token, TokenKind::Lexicographic));
        }
    }
    tokens
}

#[cfg(test)]
mod tests {
    use super::*;

    fn lex(text: &str) -> Token {
        Token::new(text, TokenKind::Lexicographic)
    }

    fn num(text: &str) -> Token {
        Token::new(text, TokenKind::Numeric)
    }

    fn intelligent(raw: &str) -> Name {
        Name::known(NamingMode::Intelligent, raw, None)
    }

    #[test]
    fn test_simple_strips_punctuation() {
        let name = Name::known(NamingMode::Simple, "alt-J", None);
        assert_eq!(name.tokens(), &[lex("altJ")]);

        let name = Name::known(NamingMode::Simple, "!!!", None);
        assert_eq!(name.tokens(), &[lex("!!!")]);

        let name = Name::known(NamingMode::Simple, "& Yet & Yet", None);
        assert_eq!(name.tokens(), &[lex("Yet  Yet")]);
    }

    #[test]
    fn test_simple_prefers_sort_name() {
        let name = Name::known(NamingMode::Simple, "The Beatles", Some("Beatles, The".into()));
        assert_eq!(name.tokens(), &[lex("Beatles The")]);
        assert_eq!(name.to_string(), "The Beatles");
    }

    #[test]
    fn test_intelligent_tokens() {
        assert_eq!(intelligent("15 Step").tokens(), &[num("15"), lex("Step")]);
        assert_eq!(
            intelligent("Foo 1 2 Bar").tokens(),
            &[lex("Foo"), num("1"), lex(" "), num("2"), lex("Bar")]
        );
        assert_eq!(intelligent("Error404").tokens(), &[lex("Error"), num("404")]);
        assert_eq!(intelligent("007").tokens(), &[num("7")]);
        assert_eq!(intelligent("000").tokens(), &[num("000")]);
    }

    #[test]
    fn test_intelligent_strips_articles() {
        assert_eq!(intelligent("The National").tokens(), &[lex("National")]);
        assert_eq!(intelligent("An Horse").tokens(), &[lex("Horse")]);
        assert_eq!(intelligent("a ha").tokens(), &[lex("ha")]);
        // Nothing left after the article
        assert_eq!(intelligent("The ").tokens(), &[lex("The")]);
    }

    #[test]
    fn test_numeric_ordering() {
        let mut names = vec![intelligent("Track 10"), intelligent("Track 9"), intelligent("Track 1")];
        names.sort();
        let raws: Vec<_> = names.iter().filter_map(Name::raw).collect();
        assert_eq!(raws, vec!["Track 1", "Track 9", "Track 10"]);
    }

    #[test]
    fn test_numbers_sort_before_words() {
        assert!(intelligent("1999") < intelligent("Abba"));
    }

    #[test]
    fn test_case_insensitive_and_unknown_first() {
        assert!(intelligent("apple") < intelligent("Banana"));
        assert!(Name::Unknown(Placeholder::Artist) < intelligent("Abba"));
        assert_eq!(Name::Unknown(Placeholder::Genre).to_string(), "Unknown Genre");
    }

    #[test]
    fn test_new_with_placeholder() {
        let name = Name::new(NamingMode::Simple, None, Some("x"), Placeholder::Album);
        assert!(name.is_unknown());
        assert!(name.tokens().is_empty());
    }
}
