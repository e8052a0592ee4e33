/// Greedy word wrap.
///
/// Words are the non-empty fragments of `text` split on spaces. Each candidate line is measured
/// with a trailing space; when it exceeds `max_width` and the current line already holds a word,
/// the current line is committed and the word starts a new one. A single word wider than
/// `max_width` stays on its own line. Empty input yields one empty line.
pub fn wrap_lines<M>(text: &str, mut measure: M, max_width: f32) -> Vec<String>
where
    M: FnMut(&str) -> f32,
{
    let mut lines = Vec::new();
    let mut line = String::new();

    for word in text.split(' ').filter(|w| !w.is_empty()) {
        let candidate = format!("{line}{word} ");
        if measure(&candidate) > max_width && !line.is_empty() {
            lines.push(line.trim_end().to_owned());
            line = format!("{word} ");
        } else {
            line = candidate;
        }
    }
    lines.push(line.trim_end().to_owned());
    lines
}

/// Total character count of `lines` including one separator per line break.
pub fn revealed_len(lines: &[String]) -> usize {
    let chars: usize = lines.iter().map(|l| l.chars().count()).sum();
    chars + lines.len().saturating_sub(1)
}

/// Cut `lines` down to a running budget of `visible_chars`.
///
/// Every line break consumes one character of the budget. Lines past the budget come back
/// empty so that the block keeps its height and placement.
pub fn truncate_lines(lines: &[String], visible_chars: usize) -> Vec<String> {
    let mut budget = visible_chars;
    lines
        .iter()
        .map(|line| {
            let len = line.chars().count();
            let shown: String = line.chars().take(budget).collect();
            budget = budget.saturating_sub(len + 1);
            shown
        })
        .collect()
}

#[cfg(test)]
#[path = "../../tests/unit/layout/wrap.rs"]
mod tests;
