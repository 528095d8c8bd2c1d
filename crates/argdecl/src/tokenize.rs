use std::collections::VecDeque;

/// The end-of-options sentinel.
pub const SEPARATOR: &str = "--";

/// `-[a-zA-Z0-9]{2,}`
fn is_combined_short(token: &str) -> bool {
    let bytes = token.as_bytes();
    bytes.len() >= 3 && bytes[0] == b'-' && bytes[1..].iter().all(u8::is_ascii_alphanumeric)
}

/// Expand combined short flags (`-abc` becomes `-a -b -c`).
///
/// Tokens after the first `--` are left untouched.
pub fn normalize<I, S>(argv: I) -> Vec<String>
where
    I: IntoIterator<Item = S>,
    S: Into<String>,
{
    let mut out = Vec::new();
    let mut after_separator = false;
    for token in argv {
        let token = token.into();
        if after_separator {
            out.push(token);
            continue;
        }
        if token == SEPARATOR {
            after_separator = true;
            out.push(token);
        } else if is_combined_short(&token) {
            out.extend(token[1..].chars().map(|c| format!("-{c}")));
        } else {
            out.push(token);
        }
    }
    out
}

/// Forward-only queue of normalized tokens.
///
/// A subcommand parse continues on the same queue its parent was using.
#[derive(Debug, Clone, Default)]
pub struct Tokens {
    items: VecDeque<String>,
}

impl Tokens {
    pub fn new(items: Vec<String>) -> Self {
        Self {
            items: items.into(),
        }
    }

    /// Normalize `argv` and queue it.
    pub fn from_argv<I, S>(argv: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self::new(normalize(argv))
    }

    pub fn peek(&self) -> Option<&str> {
        self.items.front().map(String::as_str)
    }

    pub fn pop(&mut self) -> Option<String> {
        self.items.pop_front()
    }

    /// Take every remaining token.
    pub fn drain_rest(&mut self) -> Vec<String> {
        self.items.drain(..).collect()
    }

    pub fn discard(&mut self) {
        self.items.clear();
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }
}
