//! Escaping and splitting of text embedded in expressions.

/// A piece of a string which may contain `{expression}` interpolations.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Segment {
    /// Literal text, with `\{` and `\}` already turned into braces.
    Text(String),
    /// The source of an embedded expression, without the braces.
    Expr(String),
}

/// A TeX-style command found in text, such as `\var{x}` or
/// `\simplify[all]{x+0}`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TexCommand {
    /// The command name, without the backslash.
    pub name:  String,
    /// The contents of the optional `[...]` argument.
    pub rules: Option<String>,
    /// The contents of the `{...}` argument.
    pub expr:  String,
}

/// Escapes backslashes, braces, quotes and newlines so that `s` can be
/// embedded in a string literal.
///
/// # Example
/// ```
/// use algebrist::interpreter::text::{escape, unescape};
///
/// let s = "say \"{hi}\"\n";
/// assert_eq!(escape(s), r#"say \"\{hi\}\"\n"#);
/// assert_eq!(unescape(&escape(s)), s);
/// ```
#[must_use]
pub fn escape(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    for c in s.chars() {
        match c {
            '\\' => out.push_str("\\\\"),
            '{' => out.push_str("\\{"),
            '}' => out.push_str("\\}"),
            '"' => out.push_str("\\\""),
            '\'' => out.push_str("\\'"),
            '\n' => out.push_str("\\n"),
            c => out.push(c),
        }
    }
    out
}

/// Reverses [`escape`]: `\n` becomes a newline and `\c` becomes `c`.
#[must_use]
pub fn unescape(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    let mut chars = s.chars();
    while let Some(c) = chars.next() {
        if c == '\\' {
            match chars.next() {
                Some('n') => out.push('\n'),
                Some(other) => out.push(other),
                None => out.push('\\'),
            }
        } else {
            out.push(c);
        }
    }
    out
}

/// Unescapes the body of a string literal, keeping `\{` and `\}` escaped so
/// that interpolation can still tell them apart from real delimiters.
pub(crate) fn unescape_literal(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    let mut chars = s.chars();
    while let Some(c) = chars.next() {
        if c == '\\' {
            match chars.next() {
                Some('n') => out.push('\n'),
                Some(brace @ ('{' | '}')) => {
                    out.push('\\');
                    out.push(brace);
                },
                Some(other) => out.push(other),
                None => out.push('\\'),
            }
        } else {
            out.push(c);
        }
    }
    out
}

/// Wraps `s` in double quotes, escaping it.
#[must_use]
pub fn quote(s: &str) -> String {
    format!("\"{}\"", escape(s))
}

/// Copies a balanced `{...}` group starting at `chars[start]` (which must be
/// `{`) and returns the contents and the index just after the closing brace.
fn balanced_group(chars: &[char], start: usize, open: char, close: char) -> Option<(String, usize)> {
    let mut depth = 0usize;
    let mut i = start;
    let mut contents = String::new();
    while i < chars.len() {
        let c = chars[i];
        if c == '\\' && i + 1 < chars.len() {
            if depth > 0 {
                contents.push(c);
                contents.push(chars[i + 1]);
            }
            i += 2;
            continue;
        }
        if c == open {
            if depth > 0 {
                contents.push(c);
            }
            depth += 1;
        } else if c == close {
            depth -= 1;
            if depth == 0 {
                return Some((contents, i + 1));
            }
            contents.push(c);
        } else {
            contents.push(c);
        }
        i += 1;
    }
    None
}

/// Splits a string into literal text and `{expression}` segments.
///
/// Braces preceded by a backslash are literal. A brace group belonging to a
/// TeX command such as `\var{x}` is kept as text.
///
/// # Example
/// ```
/// use algebrist::interpreter::text::{Segment, split_interpolation};
///
/// let parts = split_interpolation(r"x = {x}, \{not\} \var{y}");
/// assert_eq!(parts,
///            vec![Segment::Text("x = ".into()),
///                 Segment::Expr("x".into()),
///                 Segment::Text(r", {not} \var{y}".into())]);
/// ```
#[must_use]
pub fn split_interpolation(s: &str) -> Vec<Segment> {
    let chars: Vec<char> = s.chars().collect();
    let mut segments = Vec::new();
    let mut text = String::new();
    let mut i = 0;

    while i < chars.len() {
        let c = chars[i];
        if c == '\\' && i + 1 < chars.len() {
            let next = chars[i + 1];
            if next == '{' || next == '}' {
                text.push(next);
                i += 2;
                continue;
            }
            if next.is_ascii_alphabetic() {
                let mut j = i + 1;
                while j < chars.len() && chars[j].is_ascii_alphabetic() {
                    j += 1;
                }
                if j < chars.len()
                   && chars[j] == '['
                   && let Some((_, end)) = balanced_group(&chars, j, '[', ']')
                {
                    j = end;
                }
                if j < chars.len()
                   && chars[j] == '{'
                   && let Some((_, end)) = balanced_group(&chars, j, '{', '}')
                {
                    j = end;
                }
                text.extend(&chars[i..j]);
                i = j;
                continue;
            }
            text.push(c);
            i += 1;
            continue;
        }
        if c == '{'
           && let Some((expr, end)) = balanced_group(&chars, i, '{', '}')
        {
            if !text.is_empty() {
                segments.push(Segment::Text(std::mem::take(&mut text)));
            }
            segments.push(Segment::Expr(expr));
            i = end;
            continue;
        }
        text.push(c);
        i += 1;
    }

    if !text.is_empty() {
        segments.push(Segment::Text(text));
    }
    segments
}

/// Finds `\var{...}` and `\simplify[...]{...}` commands in a piece of text.
///
/// # Example
/// ```
/// use algebrist::interpreter::text::tex_commands;
///
/// let cmds = tex_commands(r"\frac{1}{2} \simplify[all]{x + \var{y}} \var{z}");
/// assert_eq!(cmds.len(), 2);
/// assert_eq!(cmds[0].name, "simplify");
/// assert_eq!(cmds[0].rules.as_deref(), Some("all"));
/// assert_eq!(cmds[0].expr, r"x + \var{y}");
/// assert_eq!(cmds[1].expr, "z");
/// ```
#[must_use]
pub fn tex_commands(text: &str) -> Vec<TexCommand> {
    let chars: Vec<char> = text.chars().collect();
    let mut commands = Vec::new();
    let mut i = 0;

    while i < chars.len() {
        if chars[i] != '\\' {
            i += 1;
            continue;
        }
        let mut j = i + 1;
        while j < chars.len() && chars[j].is_ascii_alphabetic() {
            j += 1;
        }
        let name: String = chars[i + 1..j].iter().collect();
        if name != "var" && name != "simplify" {
            i = j.max(i + 1);
            continue;
        }
        let mut rules = None;
        if j < chars.len()
           && chars[j] == '['
           && let Some((inner, end)) = balanced_group(&chars, j, '[', ']')
        {
            rules = Some(inner);
            j = end;
        }
        if j < chars.len()
           && chars[j] == '{'
           && let Some((expr, end)) = balanced_group(&chars, j, '{', '}')
        {
            commands.push(TexCommand { name, rules, expr });
            i = end;
        } else {
            i = j;
        }
    }
    commands
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn escape_round_trips_awkward_strings() {
        for s in ["", "\\", "\\\\n", "{}", "\"'", "a\nb", "\\{x\\}", "trailing\\"] {
            assert_eq!(unescape(&escape(s)), s, "round trip of {s:?}");
        }
    }

    #[test]
    fn literal_unescape_keeps_brace_escapes() {
        assert_eq!(unescape_literal(r#"a\"b\{c\}\n"#), "a\"b\\{c\\}\n");
    }

    #[test]
    fn nested_braces_stay_in_one_expression() {
        let parts = split_interpolation("{[\"a\": {1}]}");
        assert_eq!(parts, vec![Segment::Expr("[\"a\": {1}]".into())]);
    }

    #[test]
    fn unclosed_brace_is_text() {
        assert_eq!(split_interpolation("a {b"), vec![Segment::Text("a {b".into())]);
    }
}
