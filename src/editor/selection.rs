/// A selection in the document, measured in char offsets.
///
/// `start == end` is a collapsed cursor. Offsets count Unicode scalar
/// values, not bytes.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub struct Selection {
    pub start: usize,
    pub end: usize,
}

impl Selection {
    pub const fn new(start: usize, end: usize) -> Self {
        Self { start, end }
    }

    /// A collapsed cursor at `offset`.
    pub const fn caret(offset: usize) -> Self {
        Self {
            start: offset,
            end: offset,
        }
    }

    pub const fn is_collapsed(&self) -> bool {
        self.start == self.end
    }

    /// Number of selected chars.
    pub const fn len_chars(&self) -> usize {
        self.end.saturating_sub(self.start)
    }

    /// Swap the ends if needed so `start <= end`.
    #[must_use]
    pub const fn normalize(self) -> Self {
        if self.start <= self.end {
            self
        } else {
            Self {
                start: self.end,
                end: self.start,
            }
        }
    }

    /// Normalize and clamp both ends to `[0, len]`.
    #[must_use]
    pub fn clamp(self, len: usize) -> Self {
        let sel = self.normalize();
        Self {
            start: sel.start.min(len),
            end: sel.end.min(len),
        }
    }
}

impl std::fmt::Display for Selection {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}..{}", self.start, self.end)
    }
}

impl std::str::FromStr for Selection {
    type Err = String;

    /// Parse `start..end` or a single caret offset.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let parse = |part: &str| {
            part.trim()
                .parse::<usize>()
                .map_err(|err| format!("invalid offset {part:?}: {err}"))
        };
        match s.split_once("..") {
            Some((start, end)) => Ok(Self::new(parse(start)?, parse(end)?)),
            None => Ok(Self::caret(parse(s)?)),
        }
    }
}
