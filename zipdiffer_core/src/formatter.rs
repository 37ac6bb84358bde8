//! Pretty-printers applied to text before diffing.
//!
//! These are re-indenters, not parsers: they only understand enough of
//! each syntax (strings, comments, brackets, tags) to put one construct per
//! line at a consistent depth. Input they cannot balance is reported as a
//! [`ZipDifferError::Format`] and callers fall back to the original text.

use std::fmt;
use tracing::warn;
use zipdiffer_common::ZipDifferError;

const INDENT: &str = "    ";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Formatter {
    Javascript,
    Css,
    Html,
    Xml,
}

impl Formatter {
    pub fn name(self) -> &'static str {
        match self {
            Formatter::Javascript => "javascript",
            Formatter::Css => "css",
            Formatter::Html => "html",
            Formatter::Xml => "xml",
        }
    }

    pub fn format(self, text: &str) -> Result<String, ZipDifferError> {
        match self {
            Formatter::Javascript => format_javascript(text),
            Formatter::Css => format_css(text),
            Formatter::Html => format_markup(text, true),
            Formatter::Xml => format_markup(text, false),
        }
    }
}

impl fmt::Display for Formatter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Format `text`, or return it unchanged when the formatter rejects it
pub fn format_or_original(formatter: Formatter, text: &str) -> String {
    match formatter.format(text) {
        Ok(formatted) => formatted,
        Err(e) => {
            warn!("{} formatter failed, showing unformatted text: {}", formatter, e);
            text.to_string()
        }
    }
}

fn format_error(message: impl Into<String>) -> ZipDifferError {
    ZipDifferError::Format(message.into())
}

fn push_line(out: &mut String, depth: usize, line: &str) {
    for _ in 0..depth {
        out.push_str(INDENT);
    }
    out.push_str(line);
    out.push('\n');
}

// ---------------------------------------------------------------------------
// CSS
// ---------------------------------------------------------------------------

fn format_css(text: &str) -> Result<String, ZipDifferError> {
    let mut out = String::with_capacity(text.len() + text.len() / 4);
    let mut line = String::new();
    let mut depth = 0usize;
    let mut chars = text.chars().peekable();

    let flush = |out: &mut String, line: &mut String, depth: usize| {
        let trimmed = line.trim();
        if !trimmed.is_empty() {
            push_line(out, depth, trimmed);
        }
        line.clear();
    };

    while let Some(c) = chars.next() {
        match c {
            '"' | '\'' => {
                line.push(c);
                let mut closed = false;
                while let Some(next) = chars.next() {
                    line.push(next);
                    if next == '\\' {
                        if let Some(escaped) = chars.next() {
                            line.push(escaped);
                        }
                    } else if next == c {
                        closed = true;
                        break;
                    }
                }
                if !closed {
                    return Err(format_error("unterminated string in stylesheet"));
                }
            }
            '/' if chars.peek() == Some(&'*') => {
                chars.next();
                line.push_str("/*");
                let mut closed = false;
                while let Some(next) = chars.next() {
                    line.push(next);
                    if next == '*' && chars.peek() == Some(&'/') {
                        chars.next();
                        line.push('/');
                        closed = true;
                        break;
                    }
                }
                if !closed {
                    return Err(format_error("unterminated comment in stylesheet"));
                }
            }
            '{' => {
                let selector = line.trim().to_string();
                line.clear();
                if selector.is_empty() {
                    push_line(&mut out, depth, "{");
                } else {
                    push_line(&mut out, depth, &format!("{} {{", selector));
                }
                depth += 1;
            }
            ';' => {
                line.push(';');
                flush(&mut out, &mut line, depth);
            }
            '}' => {
                flush(&mut out, &mut line, depth);
                depth = depth
                    .checked_sub(1)
                    .ok_or_else(|| format_error("unbalanced '}' in stylesheet"))?;
                push_line(&mut out, depth, "}");
            }
            c if c.is_whitespace() => {
                if !line.is_empty() && !line.ends_with(' ') {
                    line.push(' ');
                }
            }
            c => line.push(c),
        }
    }

    if depth != 0 {
        return Err(format_error("unclosed block in stylesheet"));
    }
    flush(&mut out, &mut line, depth);
    Ok(out)
}

// ---------------------------------------------------------------------------
// JavaScript
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum JsState {
    Code,
    BlockComment,
    Template,
}

fn is_closer(c: char) -> bool {
    matches!(c, '}' | ')' | ']')
}

/// Re-indent line by line by bracket depth. Lines that start inside a
/// template literal are kept verbatim.
fn format_javascript(text: &str) -> Result<String, ZipDifferError> {
    let mut out = String::with_capacity(text.len());
    let mut brackets: Vec<char> = Vec::new();
    let mut state = JsState::Code;

    for raw_line in text.lines() {
        let trimmed = raw_line.trim();
        let depth = brackets.len();

        match state {
            JsState::Template => {
                out.push_str(raw_line);
                out.push('\n');
            }
            JsState::BlockComment => {
                if trimmed.starts_with('*') {
                    push_line(&mut out, depth, &format!(" {}", trimmed));
                } else {
                    push_line(&mut out, depth, trimmed);
                }
            }
            JsState::Code => {
                if trimmed.is_empty() {
                    out.push('\n');
                } else {
                    let leading_closers = trimmed.chars().take_while(|&c| is_closer(c)).count();
                    push_line(&mut out, depth.saturating_sub(leading_closers), trimmed);
                }
            }
        }

        state = scan_javascript_line(raw_line, &mut brackets, state)?;
    }

    match state {
        JsState::Code if brackets.is_empty() => Ok(out),
        JsState::Code => Err(format_error("unbalanced brackets in script")),
        JsState::BlockComment => Err(format_error("unterminated comment in script")),
        JsState::Template => Err(format_error("unterminated template literal in script")),
    }
}

fn scan_javascript_line(
    line: &str,
    brackets: &mut Vec<char>,
    mut state: JsState,
) -> Result<JsState, ZipDifferError> {
    let mut chars = line.chars().peekable();

    while let Some(c) = chars.next() {
        match state {
            JsState::BlockComment => {
                if c == '*' && chars.peek() == Some(&'/') {
                    chars.next();
                    state = JsState::Code;
                }
            }
            JsState::Template => match c {
                '\\' => {
                    chars.next();
                }
                '`' => state = JsState::Code,
                _ => {}
            },
            JsState::Code => match c {
                '/' if chars.peek() == Some(&'/') => break,
                '/' if chars.peek() == Some(&'*') => {
                    chars.next();
                    state = JsState::BlockComment;
                }
                '`' => state = JsState::Template,
                '"' | '\'' => {
                    let mut closed = false;
                    while let Some(next) = chars.next() {
                        if next == '\\' {
                            chars.next();
                        } else if next == c {
                            closed = true;
                            break;
                        }
                    }
                    if !closed && !line.trim_end().ends_with('\\') {
                        return Err(format_error("unterminated string in script"));
                    }
                }
                '{' => brackets.push('}'),
                '(' => brackets.push(')'),
                '[' => brackets.push(']'),
                '}' | ')' | ']' => {
                    if brackets.pop() != Some(c) {
                        return Err(format_error(format!("unbalanced '{}' in script", c)));
                    }
                }
                _ => {}
            },
        }
    }

    Ok(state)
}

// ---------------------------------------------------------------------------
// HTML / XML
// ---------------------------------------------------------------------------

const VOID_ELEMENTS: &[&str] = &[
    "area", "base", "br", "col", "embed", "hr", "img", "input", "link", "meta", "param",
    "source", "track", "wbr",
];

const RAW_TEXT_ELEMENTS: &[&str] = &["script", "style", "pre", "textarea"];

#[derive(Debug, Clone, PartialEq, Eq)]
enum Token {
    Open { name: String, markup: String },
    Close { name: String, markup: String },
    /// Self-closing tags, comments, declarations and processing instructions
    Standalone(String),
    Text(String),
    Raw(String),
}

fn collapse_whitespace(text: &str) -> String {
    text.split_whitespace().collect::<Vec<_>>().join(" ")
}

/// Collapse whitespace inside a tag, leaving quoted attribute values alone
fn normalize_tag(tag: &str) -> String {
    let mut out = String::with_capacity(tag.len());
    let mut quote = None;
    for c in tag.chars() {
        match quote {
            Some(q) => {
                out.push(c);
                if c == q {
                    quote = None;
                }
            }
            None if c == '"' || c == '\'' => {
                quote = Some(c);
                out.push(c);
            }
            None if c.is_whitespace() => {
                if !out.ends_with(' ') {
                    out.push(' ');
                }
            }
            None => out.push(c),
        }
    }
    out.replace(" >", ">").replace(" />", "/>").replace("/>", " />")
}

fn tag_name(tag: &str, html: bool) -> String {
    let name: String = tag
        .trim_start_matches('<')
        .trim_start_matches('/')
        .chars()
        .take_while(|c| !c.is_whitespace() && *c != '/' && *c != '>')
        .collect();
    if html {
        name.to_ascii_lowercase()
    } else {
        name
    }
}

fn find_from(text: &str, start: usize, pattern: &str) -> Option<usize> {
    text[start..].find(pattern).map(|i| start + i)
}

/// End (exclusive) of the tag starting at `start`, skipping `>` inside quotes
fn find_tag_end(text: &str, start: usize) -> Option<usize> {
    let mut quote = None;
    for (i, c) in text[start..].char_indices() {
        match quote {
            Some(q) if c == q => quote = None,
            Some(_) => {}
            None if c == '"' || c == '\'' => quote = Some(c),
            None if c == '>' => return Some(start + i + 1),
            None => {}
        }
    }
    None
}

fn tokenize_markup(text: &str, html: bool) -> Result<Vec<Token>, ZipDifferError> {
    let mut tokens = Vec::new();
    let mut pos = 0;

    while pos < text.len() {
        let Some(lt) = find_from(text, pos, "<") else {
            tokens.push(Token::Text(text[pos..].to_string()));
            break;
        };
        if lt > pos {
            tokens.push(Token::Text(text[pos..lt].to_string()));
        }

        let rest = &text[lt..];
        let (terminator, keep_verbatim) = if rest.starts_with("<!--") {
            ("-->", true)
        } else if rest.starts_with("<![CDATA[") {
            ("]]>", true)
        } else if rest.starts_with("<?") {
            ("?>", false)
        } else {
            (">", false)
        };

        let end = if terminator == ">" {
            find_tag_end(text, lt)
        } else {
            find_from(text, lt, terminator).map(|i| i + terminator.len())
        }
        .ok_or_else(|| format_error("unterminated tag"))?;

        let markup = &text[lt..end];
        pos = end;

        if keep_verbatim {
            tokens.push(Token::Standalone(markup.trim().to_string()));
            continue;
        }

        let markup = normalize_tag(markup);
        if markup.starts_with("</") {
            tokens.push(Token::Close {
                name: tag_name(&markup, html),
                markup,
            });
        } else if markup.starts_with("<!") || markup.starts_with("<?") || markup.ends_with("/>")
        {
            tokens.push(Token::Standalone(markup));
        } else {
            let name = tag_name(&markup, html);
            if html && VOID_ELEMENTS.contains(&name.as_str()) {
                tokens.push(Token::Standalone(markup));
            } else if html && RAW_TEXT_ELEMENTS.contains(&name.as_str()) {
                let close = format!("</{}", name);
                let content_end = text[pos..]
                    .to_ascii_lowercase()
                    .find(&close)
                    .map(|i| pos + i)
                    .ok_or_else(|| format_error(format!("unclosed <{}> element", name)))?;
                let raw = &text[pos..content_end];
                pos = content_end;
                tokens.push(Token::Open { name, markup });
                if !raw.trim().is_empty() {
                    tokens.push(Token::Raw(raw.trim_matches(&['\r', '\n'][..]).to_string()));
                }
            } else {
                tokens.push(Token::Open { name, markup });
            }
        }
    }

    Ok(tokens)
}

fn format_markup(text: &str, html: bool) -> Result<String, ZipDifferError> {
    let tokens = tokenize_markup(text, html)?;
    let mut out = String::with_capacity(text.len());
    let mut open: Vec<String> = Vec::new();
    let mut i = 0;

    while i < tokens.len() {
        match &tokens[i] {
            Token::Open { name, markup } => {
                // <a>text</a> and <a></a> stay on one line
                match (tokens.get(i + 1), tokens.get(i + 2)) {
                    (Some(Token::Close { name: close, markup: end }), _) if close == name => {
                        push_line(&mut out, open.len(), &format!("{}{}", markup, end));
                        i += 2;
                        continue;
                    }
                    (Some(Token::Text(inner)), Some(Token::Close { name: close, markup: end }))
                        if close == name =>
                    {
                        let inner = collapse_whitespace(inner);
                        push_line(&mut out, open.len(), &format!("{}{}{}", markup, inner, end));
                        i += 3;
                        continue;
                    }
                    _ => {}
                }
                push_line(&mut out, open.len(), markup);
                open.push(name.clone());
            }
            Token::Close { name, markup } => {
                match open.iter().rposition(|n| n == name) {
                    Some(index) if index + 1 == open.len() || html => open.truncate(index),
                    Some(_) | None if !html => {
                        return Err(format_error(format!("unexpected closing tag </{}>", name)));
                    }
                    _ => {}
                }
                push_line(&mut out, open.len(), markup);
            }
            Token::Standalone(markup) => push_line(&mut out, open.len(), markup),
            Token::Text(content) => {
                let content = collapse_whitespace(content);
                if !content.is_empty() {
                    push_line(&mut out, open.len(), &content);
                }
            }
            Token::Raw(content) => {
                out.push_str(content);
                out.push('\n');
            }
        }
        i += 1;
    }

    if !html {
        if let Some(name) = open.last() {
            return Err(format_error(format!("unclosed element <{}>", name)));
        }
    }
    Ok(out)
}
