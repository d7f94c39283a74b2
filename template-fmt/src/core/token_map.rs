//! Ordered placeholder-token to substitute-identifier mapping.
//!
//! Substitution is literal (no patterns) and always walks the pairs in
//! declaration order, in both directions.

use std::collections::HashSet;

use anyhow::{Result, bail};

/// One `(token, substitute)` pair.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TokenPair {
    pub token: String,
    pub substitute: String,
}

impl TokenPair {
    pub fn new(token: impl Into<String>, substitute: impl Into<String>) -> Self {
        Self {
            token: token.into(),
            substitute: substitute.into(),
        }
    }
}

/// Validated token map.
///
/// Construction rejects maps whose reverse pass would be ambiguous:
/// - empty tokens or substitutes
/// - substitutes that are not identifiers
/// - duplicate tokens or duplicate substitutes
/// - a substitute equal to, containing, or contained in any token
/// - a substitute contained in another substitute
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TokenMap {
    pairs: Vec<TokenPair>,
}

impl TokenMap {
    pub fn new(pairs: Vec<TokenPair>) -> Result<Self> {
        let errors = validate_pairs(&pairs);
        if !errors.is_empty() {
            bail!("invalid token map:\n- {}", errors.join("\n- "));
        }
        Ok(Self { pairs })
    }

    pub fn pairs(&self) -> &[TokenPair] {
        &self.pairs
    }

    /// Replace every token with its substitute.
    pub fn substitute(&self, content: &str) -> String {
        let mut out = content.to_string();
        for pair in &self.pairs {
            if out.contains(&pair.token) {
                out = out.replace(&pair.token, &pair.substitute);
            }
        }
        out
    }

    /// Replace every substitute with its original token.
    pub fn reverse(&self, content: &str) -> String {
        let mut out = content.to_string();
        for pair in &self.pairs {
            if out.contains(&pair.substitute) {
                out = out.replace(&pair.substitute, &pair.token);
            }
        }
        out
    }

    /// Substitute `content`, failing if reversing the result would not give
    /// back `content` byte for byte.
    ///
    /// The usual cause is a file that already spells out a substitute
    /// identifier; commit mode would turn it into a token.
    pub fn substitute_reversible(&self, content: &str) -> Result<String> {
        if let Some(pair) = self
            .pairs
            .iter()
            .find(|pair| content.contains(&pair.substitute))
        {
            bail!(
                "content already contains substitute identifier '{}'",
                pair.substitute
            );
        }
        let substituted = self.substitute(content);
        if self.reverse(&substituted) != content {
            bail!("substitution does not round-trip");
        }
        Ok(substituted)
    }
}

fn validate_pairs(pairs: &[TokenPair]) -> Vec<String> {
    let mut errors = Vec::new();
    let mut tokens = HashSet::new();
    let mut substitutes = HashSet::new();

    for pair in pairs {
        if pair.token.is_empty() {
            errors.push("token must not be empty".to_string());
        }
        if pair.substitute.is_empty() {
            errors.push(format!("substitute for '{}' must not be empty", pair.token));
            continue;
        }
        if !is_identifier(&pair.substitute) {
            errors.push(format!(
                "substitute '{}' is not a valid identifier",
                pair.substitute
            ));
        }
        if !pair.token.is_empty() && !tokens.insert(pair.token.as_str()) {
            errors.push(format!("duplicate token '{}'", pair.token));
        }
        if !substitutes.insert(pair.substitute.as_str()) {
            errors.push(format!("duplicate substitute '{}'", pair.substitute));
        }
    }

    for pair in pairs.iter().filter(|pair| !pair.substitute.is_empty()) {
        for other in pairs.iter().filter(|other| !other.token.is_empty()) {
            if other.token.contains(&pair.substitute) || pair.substitute.contains(&other.token) {
                errors.push(format!(
                    "substitute '{}' collides with token '{}'",
                    pair.substitute, other.token
                ));
            }
        }
        for other in pairs {
            if other.substitute != pair.substitute
                && !other.substitute.is_empty()
                && other.substitute.contains(&pair.substitute)
            {
                errors.push(format!(
                    "substitute '{}' is contained in substitute '{}'",
                    pair.substitute, other.substitute
                ));
            }
        }
    }

    errors
}

fn is_identifier(s: &str) -> bool {
    let mut chars = s.chars();
    match chars.next() {
        Some(first) if first == '_' || first.is_alphabetic() => {}
        _ => return false,
    }
    chars.all(|c| c == '_' || c.is_alphanumeric())
}
