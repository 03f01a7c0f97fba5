use std::collections::BTreeMap;

/// Line insertions collected against the original numbering and applied in
/// one pass, so earlier edits never shift later targets.
#[derive(Debug, Default, Clone)]
pub struct LineEdits {
    before: BTreeMap<usize, Vec<String>>,
    after: BTreeMap<usize, Vec<String>>,
    splices: BTreeMap<usize, Vec<(usize, String)>>,
    replacements: BTreeMap<usize, String>,
}

impl LineEdits {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert_before(&mut self, line: usize, text: impl Into<String>) {
        self.before.entry(line).or_default().push(text.into());
    }

    pub fn insert_after(&mut self, line: usize, text: impl Into<String>) {
        self.after.entry(line).or_default().push(text.into());
    }

    /// Insert `text` into `line` right after byte `col`.
    pub fn splice_after(&mut self, line: usize, col: usize, text: impl Into<String>) {
        self.splices.entry(line).or_default().push((col, text.into()));
    }

    pub fn replace(&mut self, line: usize, text: impl Into<String>) {
        self.replacements.insert(line, text.into());
    }

    /// How many inserted lines end up above original line `line`.
    pub fn shift_of(&self, line: usize) -> usize {
        let before: usize = self.before.range(..=line).map(|(_, v)| v.len()).sum();
        let after: usize = self.after.range(..line).map(|(_, v)| v.len()).sum();
        before + after
    }

    pub fn apply(&self, lines: &[String]) -> Vec<String> {
        let mut out = Vec::with_capacity(lines.len());

        for (i, line) in lines.iter().enumerate() {
            if let Some(texts) = self.before.get(&i) {
                out.extend(texts.iter().cloned());
            }

            let mut text = self
                .replacements
                .get(&i)
                .cloned()
                .unwrap_or_else(|| line.clone());
            if let Some(splices) = self.splices.get(&i) {
                let mut ordered = splices.clone();
                ordered.sort_by(|a, b| b.0.cmp(&a.0));
                for (col, insert) in ordered {
                    let at = (col + 1).min(text.len());
                    text.insert_str(at, &insert);
                }
            }
            out.push(text);

            if let Some(texts) = self.after.get(&i) {
                out.extend(texts.iter().cloned());
            }
        }

        out
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn lines(src: &str) -> Vec<String> {
        src.lines().map(str::to_string).collect()
    }

    #[test]
    fn test_edits_use_original_numbering() {
        let src = lines("a\nb\nc");
        let mut edits = LineEdits::new();
        edits.insert_before(1, "before b");
        edits.insert_after(1, "after b");
        edits.insert_after(2, "after c");
        assert_eq!(
            edits.apply(&src),
            lines("a\nbefore b\nb\nafter b\nc\nafter c")
        );
        assert_eq!(edits.shift_of(0), 0);
        assert_eq!(edits.shift_of(1), 1);
        assert_eq!(edits.shift_of(2), 2);
    }

    #[test]
    fn test_splices_apply_right_to_left() {
        let src = lines("{ { x; } }");
        let mut edits = LineEdits::new();
        edits.splice_after(0, 0, " A;");
        edits.splice_after(0, 2, " B;");
        assert_eq!(edits.apply(&src), lines("{ A; { B; x; } }"));
    }

    #[test]
    fn test_replace_then_splice() {
        let src = lines("old {");
        let mut edits = LineEdits::new();
        edits.replace(0, "new {");
        edits.splice_after(0, 4, " x;");
        assert_eq!(edits.apply(&src), lines("new { x;"));
    }
}
