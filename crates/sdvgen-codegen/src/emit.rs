//! Line-oriented C++ emission with hoisted, de-duplicated lookups.
//!
//! The marshaling engine writes into a [`Fragment`], keeping JNI lookup lines
//! (`jclass`, `jmethodID`, `jfieldID`) apart from code. A [`Body`] collects
//! the fragments of one function or lambda, hoists every lookup to its top,
//! and runs [`dedup`] so each lookup is emitted once per scope.

use std::collections::HashSet;

const INDENT: &str = "    ";

/// Identity of a lookup declaration: its first two tokens (type and name).
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct DeclKey(String, String);

impl DeclKey {
    /// Key of `text`, or `None` when it has fewer than two tokens.
    pub fn of(text: &str) -> Option<Self> {
        let mut tokens = text.split_whitespace();
        let first = tokens.next()?;
        let second = tokens.next()?;
        Some(Self(first.to_string(), second.to_string()))
    }
}

/// One emitted line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Line {
    Decl { key: DeclKey, text: String },
    Code(String),
}

impl Line {
    /// Lookup declaration; falls back to plain code when it has no key.
    pub fn decl(text: impl Into<String>) -> Self {
        let text = text.into();
        match DeclKey::of(&text) {
            Some(key) => Line::Decl { key, text },
            None => Line::Code(text),
        }
    }

    pub fn code(text: impl Into<String>) -> Self {
        Line::Code(text.into())
    }

    pub fn text(&self) -> &str {
        match self {
            Line::Decl { text, .. } | Line::Code(text) => text,
        }
    }

    fn is_structural(&self) -> bool {
        let text = self.text();
        text.contains('{') || text.contains('}')
    }
}

/// Remove repeated lines, preserving order.
///
/// A line is dropped when an earlier line has identical text, or when it is
/// a declaration whose key an earlier declaration already used. Lines that
/// open or close a block are always kept.
pub fn dedup(lines: Vec<Line>) -> Vec<Line> {
    let mut seen_text: HashSet<String> = HashSet::new();
    let mut seen_keys: HashSet<DeclKey> = HashSet::new();
    let mut kept = Vec::with_capacity(lines.len());

    for line in lines {
        if line.is_structural() {
            kept.push(line);
            continue;
        }
        let fresh_key = match &line {
            Line::Decl { key, .. } => seen_keys.insert(key.clone()),
            Line::Code(_) => true,
        };
        let fresh_text = seen_text.insert(line.text().to_string());
        if fresh_key && fresh_text {
            kept.push(line);
        }
    }
    kept
}

/// Output of one marshaling path.
#[derive(Debug, Default)]
pub struct Fragment {
    decls: Vec<Line>,
    code: Vec<Line>,
    depth: usize,
}

impl Fragment {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record a lookup declaration; it is hoisted when the fragment is added
    /// to a [`Body`].
    pub fn decl(&mut self, text: impl Into<String>) {
        self.decls.push(Line::decl(text));
    }

    pub fn line(&mut self, text: impl AsRef<str>) {
        self.code
            .push(Line::code(format!("{}{}", INDENT.repeat(self.depth), text.as_ref())));
    }

    /// Emit a line ending in `{` and indent what follows.
    pub fn open(&mut self, text: impl AsRef<str>) {
        self.line(text);
        self.depth += 1;
    }

    pub fn close(&mut self) {
        self.depth = self.depth.saturating_sub(1);
        self.line("}");
    }

    pub fn decls(&self) -> &[Line] {
        &self.decls
    }

    pub fn code(&self) -> &[Line] {
        &self.code
    }
}

/// Body of one function or lambda.
#[derive(Debug, Default)]
pub struct Body {
    prologue: Vec<String>,
    decls: Vec<Line>,
    lines: Vec<String>,
}

impl Body {
    pub fn new() -> Self {
        Self::default()
    }

    /// Line placed before the hoisted lookups
    pub fn prologue(&mut self, text: impl Into<String>) {
        self.prologue.push(text.into());
    }

    pub fn line(&mut self, text: impl Into<String>) {
        self.lines.push(text.into());
    }

    /// Append already-rendered lines (a nested lambda) verbatim
    pub fn lines(&mut self, lines: impl IntoIterator<Item = String>) {
        self.lines.extend(lines);
    }

    /// Hoist the fragment's lookups and append its de-duplicated code.
    pub fn fragment(&mut self, fragment: Fragment) {
        self.decls.extend(fragment.decls);
        self.lines
            .extend(dedup(fragment.code).into_iter().map(|line| line.text().to_string()));
    }

    /// Render at `indent` levels, one line per entry.
    pub fn render(self, indent: usize) -> Vec<String> {
        let prefix = INDENT.repeat(indent);
        let decls = dedup(self.decls);
        self.prologue
            .iter()
            .map(String::as_str)
            .chain(decls.iter().map(Line::text))
            .chain(self.lines.iter().map(String::as_str))
            .map(|text| format!("{prefix}{text}"))
            .collect()
    }
}
