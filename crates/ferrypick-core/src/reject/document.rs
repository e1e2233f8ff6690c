//! Line-tagged view of a `.rej` file.

/// One line of a reject hunk, tagged by its first character.
///
/// `text` is the line without its marker and still carries the trailing
/// newline, so changelog bodies can be rebuilt byte for byte.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RejectLine {
    /// `@@ -a,b +c,d @@`
    Header { line: usize, text: String },
    Context { line: usize, text: String },
    Added { line: usize, text: String },
    Removed { line: usize, text: String },
    /// Anything else, including blank lines.
    Unknown { line: usize, text: String },
}

impl RejectLine {
    fn parse(line: usize, raw: &str) -> Self {
        let mut chars = raw.chars();
        let marker = chars.next();
        let text = chars.as_str().to_string();
        match marker {
            Some('@') => RejectLine::Header { line, text },
            Some(' ') => RejectLine::Context { line, text },
            Some('+') => RejectLine::Added { line, text },
            Some('-') => RejectLine::Removed { line, text },
            _ => RejectLine::Unknown {
                line,
                text: raw.to_string(),
            },
        }
    }

    /// 1-based line number in the reject file.
    pub fn line_number(&self) -> usize {
        match self {
            RejectLine::Header { line, .. }
            | RejectLine::Context { line, .. }
            | RejectLine::Added { line, .. }
            | RejectLine::Removed { line, .. }
            | RejectLine::Unknown { line, .. } => *line,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RejectHunk {
    pub lines: Vec<RejectLine>,
}

/// The hunks of a reject file. The preamble before the first `@` line
/// (the `diff a/... b/...` banner) is dropped.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RejectDocument {
    pub hunks: Vec<RejectHunk>,
}

impl RejectDocument {
    pub fn parse(content: &str) -> Self {
        let mut hunks: Vec<RejectHunk> = Vec::new();
        for (idx, raw) in content.split_inclusive('\n').enumerate() {
            let tagged = RejectLine::parse(idx + 1, raw);
            if matches!(tagged, RejectLine::Header { .. }) {
                hunks.push(RejectHunk {
                    lines: vec![tagged],
                });
            } else if let Some(hunk) = hunks.last_mut() {
                hunk.lines.push(tagged);
            }
        }
        Self { hunks }
    }

    pub fn is_empty(&self) -> bool {
        self.hunks.is_empty()
    }

    pub fn lines(&self) -> impl Iterator<Item = &RejectLine> {
        self.hunks.iter().flat_map(|hunk| hunk.lines.iter())
    }
}
