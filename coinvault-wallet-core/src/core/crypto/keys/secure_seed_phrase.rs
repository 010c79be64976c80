use std::fmt;
use zeroize::Zeroizing;

/// Secure seed phrase wrapper
///
/// Handed to the caller exactly once, at account creation. Wiped on drop.
pub struct SecureSeedPhrase {
    phrase: Zeroizing<String>,
}

impl SecureSeedPhrase {
    /// Create a new secure seed phrase
    pub fn new(phrase: String) -> Self {
        Self {
            phrase: Zeroizing::new(phrase),
        }
    }

    /// Get the seed phrase as a &str
    pub fn as_str(&self) -> &str {
        &self.phrase
    }

    pub fn as_words(&self) -> Vec<&str> {
        self.phrase.split_whitespace().collect()
    }

    pub fn word_count(&self) -> usize {
        self.phrase.split_whitespace().count()
    }
}

impl fmt::Debug for SecureSeedPhrase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "SecureSeedPhrase([{} words redacted])", self.word_count())
    }
}
