use std::fmt;

/// Identifies one issued request. Tokens from the same cell increase
/// monotonically.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct RequestToken(u64);

impl fmt::Display for RequestToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// A value that only accepts writes carrying the most recently issued token,
/// so a slow response to an old request cannot overwrite a newer one.
#[derive(Debug, Clone)]
pub struct Versioned<T> {
    value: T,
    issued: u64,
}

impl<T> Versioned<T> {
    pub fn new(value: T) -> Self {
        Self {
            value,
            issued: 0,
        }
    }

    pub fn issue(&mut self) -> RequestToken {
        self.issued += 1;
        RequestToken(self.issued)
    }

    pub fn latest(&self) -> Option<RequestToken> {
        (self.issued > 0).then_some(RequestToken(self.issued))
    }

    pub fn is_current(&self, token: RequestToken) -> bool {
        token.0 == self.issued
    }

    /// Returns false (leaving the value untouched) for superseded tokens.
    pub fn apply(&mut self, token: RequestToken, value: T) -> bool {
        if !self.is_current(token) {
            return false;
        }
        self.value = value;
        true
    }

    /// Unconditional write that does not count as a response, e.g. entering
    /// a loading state.
    pub fn set(&mut self, value: T) {
        self.value = value;
    }

    pub fn get(&self) -> &T {
        &self.value
    }

    pub fn get_mut(&mut self) -> &mut T {
        &mut self.value
    }
}

impl<T: Default> Default for Versioned<T> {
    fn default() -> Self {
        Self::new(T::default())
    }
}
