// Markdown parsing and rendering for lesson bodies
//
// Uses pulldown-cmark to parse markdown and convert to styled ratatui Spans.
// Supports: headings, inline code, fenced code blocks (with language label),
// bold, italic, strikethrough, lists, blockquotes, tables, links, images.
//
// Diagram fences never reach this module; the block renderer splits them out
// first and routes them to the diagram renderer.

use crate::theme::Theme;
use pulldown_cmark::{CodeBlockKind, Event, HeadingLevel, Options, Parser, Tag, TagEnd};
use ratatui::style::{Modifier, Style};
use ratatui::text::{Line, Span};
use unicode_width::UnicodeWidthStr;

/// A segment of parsed markdown with semantic meaning
#[derive(Debug, Clone, PartialEq)]
pub enum StyledSegment {
    /// Regular text
    Text(String),
    /// Inline code: `like this`
    InlineCode(String),
    /// Fenced or indented code block with optional language
    CodeBlock { lang: Option<String>, code: String },
    /// Soft break (single newline in source)
    SoftBreak,
    /// Hard break (explicit line break)
    HardBreak,
    /// End of paragraph (adds blank line for spacing)
    ParagraphEnd,
    /// Heading with level
    Heading { level: u8, text: String },
    /// List item marker (bullet or number)
    ListItemStart {
        ordered: bool,
        number: u64,
        depth: usize,
    },
    /// End of list item
    ListItemEnd,
    /// Bold text: **like this**
    Bold(String),
    /// Italic text: *like this*
    Italic(String),
    /// Strikethrough text: ~~like this~~
    Strikethrough(String),
    /// Start of blockquote (> prefix)
    BlockQuoteStart,
    /// End of blockquote
    BlockQuoteEnd,
    /// Horizontal rule (---)
    Rule,
    /// Link: [text](url)
    Link { text: String, url: String },
    /// Image: ![alt](url), shown as its alt text
    Image { alt: String, url: String },
    /// Whole table, so column widths can span every row
    Table {
        head: Vec<String>,
        rows: Vec<Vec<String>>,
    },
}

/// Which inline span is collecting text
#[derive(Debug, Clone, Copy, PartialEq)]
enum Inline {
    Bold,
    Italic,
    Strikethrough,
    Link,
    Image,
}

/// Parse markdown into styled segments
pub fn parse_markdown(markdown: &str) -> Vec<StyledSegment> {
    let mut segments = Vec::new();

    let mut code_block: Option<(Option<String>, String)> = None;
    let mut heading: Option<(u8, String)> = None;
    // Stack of (ordered, next_number) for nested lists
    let mut list_stack: Vec<(bool, u64)> = Vec::new();

    // Innermost inline span wins; nested emphasis collapses into it
    let mut inline: Option<(Inline, String)> = None;
    let mut target_url = String::new();

    // Table being collected: (head, body rows)
    let mut table: Option<(Vec<String>, Vec<Vec<String>>)> = None;
    let mut in_table_head = false;
    let mut current_row: Vec<String> = Vec::new();
    let mut current_cell = String::new();

    let options = Options::ENABLE_STRIKETHROUGH | Options::ENABLE_TABLES;

    for event in Parser::new_ext(markdown, options) {
        match event {
            Event::Start(Tag::CodeBlock(kind)) => {
                let lang = match kind {
                    CodeBlockKind::Fenced(lang) => {
                        // Info strings may carry attributes after the language
                        let lang = lang.split_whitespace().next().unwrap_or_default();
                        (!lang.is_empty()).then(|| lang.to_string())
                    }
                    CodeBlockKind::Indented => None,
                };
                code_block = Some((lang, String::new()));
            }
            Event::End(TagEnd::CodeBlock) => {
                if let Some((lang, code)) = code_block.take() {
                    segments.push(StyledSegment::CodeBlock { lang, code });
                }
            }
            Event::Text(text) if code_block.is_some() => {
                if let Some((_, code)) = code_block.as_mut() {
                    code.push_str(&text);
                }
            }

            Event::Start(Tag::Heading { level, .. }) => {
                let level = match level {
                    HeadingLevel::H1 => 1,
                    HeadingLevel::H2 => 2,
                    HeadingLevel::H3 => 3,
                    HeadingLevel::H4 => 4,
                    HeadingLevel::H5 => 5,
                    HeadingLevel::H6 => 6,
                };
                heading = Some((level, String::new()));
            }
            Event::End(TagEnd::Heading(_)) => {
                if let Some((level, text)) = heading.take() {
                    segments.push(StyledSegment::Heading { level, text });
                }
            }
            Event::Text(text) | Event::Code(text) if heading.is_some() => {
                if let Some((_, content)) = heading.as_mut() {
                    content.push_str(&text);
                }
            }

            Event::Text(text) | Event::Code(text) if table.is_some() => {
                current_cell.push_str(&text);
            }

            Event::Text(text) if inline.is_some() => {
                if let Some((_, content)) = inline.as_mut() {
                    content.push_str(&text);
                }
            }
            Event::Code(code) if inline.is_some() => {
                if let Some((_, content)) = inline.as_mut() {
                    content.push_str(&code);
                }
            }

            Event::Text(text) => segments.push(StyledSegment::Text(text.to_string())),
            Event::Code(code) => segments.push(StyledSegment::InlineCode(code.to_string())),

            Event::Start(Tag::Strong) => open_inline(&mut inline, Inline::Bold),
            Event::Start(Tag::Emphasis) => open_inline(&mut inline, Inline::Italic),
            Event::Start(Tag::Strikethrough) => open_inline(&mut inline, Inline::Strikethrough),
            Event::Start(Tag::Link { dest_url, .. }) => {
                target_url = dest_url.to_string();
                inline = Some((Inline::Link, String::new()));
            }
            Event::Start(Tag::Image { dest_url, .. }) => {
                target_url = dest_url.to_string();
                inline = Some((Inline::Image, String::new()));
            }

            Event::End(TagEnd::Strong) => close_inline(&mut inline, Inline::Bold, &mut segments),
            Event::End(TagEnd::Emphasis) => {
                close_inline(&mut inline, Inline::Italic, &mut segments)
            }
            Event::End(TagEnd::Strikethrough) => {
                close_inline(&mut inline, Inline::Strikethrough, &mut segments)
            }
            Event::End(TagEnd::Link) => {
                if let Some((_, text)) = inline.take() {
                    segments.push(StyledSegment::Link {
                        text,
                        url: std::mem::take(&mut target_url),
                    });
                }
            }
            Event::End(TagEnd::Image) => {
                if let Some((_, alt)) = inline.take() {
                    segments.push(StyledSegment::Image {
                        alt,
                        url: std::mem::take(&mut target_url),
                    });
                }
            }

            Event::End(TagEnd::Paragraph) => segments.push(StyledSegment::ParagraphEnd),

            Event::SoftBreak => {
                if let Some((_, text)) = heading.as_mut() {
                    text.push(' ');
                } else if let Some((_, text)) = inline.as_mut() {
                    text.push(' ');
                } else {
                    segments.push(StyledSegment::SoftBreak);
                }
            }
            Event::HardBreak => segments.push(StyledSegment::HardBreak),

            Event::Start(Tag::List(first_number)) => {
                list_stack.push((first_number.is_some(), first_number.unwrap_or(1)));
            }
            Event::End(TagEnd::List(_)) => {
                list_stack.pop();
                if list_stack.is_empty() {
                    segments.push(StyledSegment::ParagraphEnd);
                }
            }
            Event::Start(Tag::Item) => {
                let depth = list_stack.len();
                if let Some((ordered, number)) = list_stack.last_mut() {
                    segments.push(StyledSegment::ListItemStart {
                        ordered: *ordered,
                        number: *number,
                        depth,
                    });
                    *number += 1;
                }
            }
            Event::End(TagEnd::Item) => segments.push(StyledSegment::ListItemEnd),

            Event::Start(Tag::BlockQuote) => segments.push(StyledSegment::BlockQuoteStart),
            Event::End(TagEnd::BlockQuote) => segments.push(StyledSegment::BlockQuoteEnd),
            Event::Rule => segments.push(StyledSegment::Rule),

            Event::Start(Tag::Table(_)) => table = Some((Vec::new(), Vec::new())),
            Event::End(TagEnd::Table) => {
                if let Some((head, rows)) = table.take() {
                    segments.push(StyledSegment::Table { head, rows });
                }
            }
            Event::Start(Tag::TableHead) => {
                in_table_head = true;
                current_row.clear();
            }
            Event::End(TagEnd::TableHead) => {
                if let Some((head, _)) = table.as_mut() {
                    *head = std::mem::take(&mut current_row);
                }
                in_table_head = false;
            }
            Event::Start(Tag::TableRow) => current_row.clear(),
            Event::End(TagEnd::TableRow) => {
                if !in_table_head {
                    if let Some((_, rows)) = table.as_mut() {
                        rows.push(std::mem::take(&mut current_row));
                    }
                }
            }
            Event::Start(Tag::TableCell) => current_cell.clear(),
            Event::End(TagEnd::TableCell) => {
                current_row.push(std::mem::take(&mut current_cell));
            }

            // Raw HTML in lessons is shown as written
            Event::Html(html) | Event::InlineHtml(html) => {
                segments.push(StyledSegment::Text(html.to_string()));
            }

            _ => {}
        }
    }

    segments
}

fn open_inline(inline: &mut Option<(Inline, String)>, kind: Inline) {
    if inline.is_none() {
        *inline = Some((kind, String::new()));
    }
}

fn close_inline(
    inline: &mut Option<(Inline, String)>,
    kind: Inline,
    segments: &mut Vec<StyledSegment>,
) {
    if !matches!(inline, Some((open, _)) if *open == kind) {
        return;
    }
    if let Some((_, text)) = inline.take() {
        if text.is_empty() {
            return;
        }
        segments.push(match kind {
            Inline::Bold => StyledSegment::Bold(text),
            Inline::Italic => StyledSegment::Italic(text),
            _ => StyledSegment::Strikethrough(text),
        });
    }
}

/// Wrap text to fit within width, breaking at word boundaries
///
/// Leading/trailing whitespace is kept so adjacent segments stay separated.
/// Uses unicode display width for correct handling of emojis, CJK, etc.
fn wrap_text(text: &str, width: usize) -> Vec<String> {
    if width == 0 || text.is_empty() {
        return vec![text.to_string()];
    }

    let leading_space = text.starts_with(char::is_whitespace);
    let trailing_space = text.ends_with(char::is_whitespace);

    let mut result = Vec::new();
    let mut current = String::new();
    let mut current_width = 0usize;

    if leading_space {
        current.push(' ');
        current_width = 1;
    }

    for word in text.split_whitespace() {
        let word_width = word.width();
        let line_is_fresh = current.trim().is_empty() && result.is_empty()
            || current.is_empty();
        if line_is_fresh {
            current.push_str(word);
            current_width += word_width;
        } else if current_width + 1 + word_width <= width {
            current.push(' ');
            current.push_str(word);
            current_width += 1 + word_width;
        } else {
            result.push(std::mem::take(&mut current));
            current.push_str(word);
            current_width = word_width;
        }
    }

    if trailing_space && !current.is_empty() {
        current.push(' ');
    }
    if !current.is_empty() {
        result.push(current);
    }
    if result.is_empty() {
        result.push(text.to_string());
    }

    result
}

/// Line builder that tracks display width for wrapping
struct LineWriter {
    lines: Vec<Line<'static>>,
    spans: Vec<Span<'static>>,
    width: usize,
    used: usize,
    /// Emitted ahead of the first span on each line (blockquotes)
    prefix: Option<Span<'static>>,
}

impl LineWriter {
    fn new(width: usize) -> Self {
        Self {
            lines: Vec::new(),
            spans: Vec::new(),
            width,
            used: 0,
            prefix: None,
        }
    }

    fn flush(&mut self) {
        if !self.spans.is_empty() {
            self.lines.push(Line::from(std::mem::take(&mut self.spans)));
        }
        self.used = 0;
    }

    fn blank(&mut self) {
        self.flush();
        self.lines.push(Line::from(""));
    }

    fn prefix_width(&self) -> usize {
        self.prefix.as_ref().map_or(0, |p| p.content.width())
    }

    /// Place one unbreakable piece, moving to a new line when it does not fit
    fn place(&mut self, piece: String, style: Style, force_new_line: bool) {
        let piece_width = piece.width();
        if !self.spans.is_empty() && (force_new_line || self.used + piece_width > self.width) {
            self.flush();
        }
        if self.spans.is_empty() {
            if let Some(prefix) = self.prefix.clone() {
                self.used = prefix.content.width();
                self.spans.push(prefix);
            }
        }
        self.used += piece_width;
        self.spans.push(Span::styled(piece, style));
    }

    /// Push wrapped text, breaking onto new lines as needed
    fn text(&mut self, text: &str, style: Style) {
        let wrap_width = self.width.saturating_sub(self.prefix_width()).max(1);
        for (i, part) in text.split('\n').enumerate() {
            if i > 0 {
                self.flush();
            }
            if part.is_empty() {
                continue;
            }
            let fits = self.used.max(self.prefix_width()) + part.width() <= self.width;
            let pieces = if fits {
                vec![part.to_string()]
            } else {
                wrap_text(part, wrap_width)
            };
            for (j, piece) in pieces.into_iter().enumerate() {
                self.place(piece, style, j > 0);
            }
        }
    }

    /// Push an unbreakable span
    fn atom(&mut self, text: String, style: Style) {
        self.place(text, style, false);
    }

    fn finish(mut self) -> Vec<Line<'static>> {
        self.flush();
        self.lines
    }
}

/// Convert parsed segments to ratatui Lines for rendering
///
/// Width controls text wrapping so the scroll height is accurate.
pub fn segments_to_lines(
    segments: &[StyledSegment],
    width: usize,
    theme: &Theme,
) -> Vec<Line<'static>> {
    let mut out = LineWriter::new(width);
    let plain = Style::default().fg(theme.foreground);

    for segment in segments {
        match segment {
            StyledSegment::Text(text) => out.text(text, plain),

            StyledSegment::InlineCode(code) => {
                out.atom(code.clone(), Style::default().fg(theme.code_inline));
            }

            StyledSegment::CodeBlock { lang, code } => {
                out.flush();
                let border = Style::default().fg(theme.border);
                let label = lang.as_deref().unwrap_or("code");
                out.lines.push(Line::from(vec![
                    Span::styled("  ┌ ", border),
                    Span::styled(label.to_string(), Style::default().fg(theme.muted)),
                ]));
                for line in code.lines() {
                    out.lines.push(Line::from(vec![
                        Span::styled("  │ ", border),
                        Span::styled(line.to_string(), Style::default().fg(theme.code_block)),
                    ]));
                }
                out.lines.push(Line::from(Span::styled("  └", border)));
                out.lines.push(Line::from(""));
            }

            // Soft break = single newline in source, flows as a space
            StyledSegment::SoftBreak => out.text(" ", plain),
            StyledSegment::HardBreak => out.flush(),
            StyledSegment::ParagraphEnd => out.blank(),

            StyledSegment::Heading { level, text } => {
                out.flush();
                let color = match level {
                    1 => theme.heading1,
                    2 => theme.heading2,
                    _ => theme.heading3,
                };
                let mut style = Style::default().fg(color).add_modifier(Modifier::BOLD);
                if *level == 1 {
                    style = style.add_modifier(Modifier::UNDERLINED);
                }
                for line in wrap_text(text, width) {
                    out.lines.push(Line::from(Span::styled(line, style)));
                }
                out.lines.push(Line::from(""));
            }

            StyledSegment::ListItemStart {
                ordered,
                number,
                depth,
            } => {
                out.flush();
                let indent = "  ".repeat(depth.saturating_sub(1));
                let marker = if *ordered {
                    format!("{}{}. ", indent, number)
                } else {
                    format!("{}• ", indent)
                };
                out.atom(marker, Style::default().fg(theme.muted));
            }
            StyledSegment::ListItemEnd => out.flush(),

            StyledSegment::Bold(text) => out.text(text, plain.add_modifier(Modifier::BOLD)),
            StyledSegment::Italic(text) => out.text(text, plain.add_modifier(Modifier::ITALIC)),
            StyledSegment::Strikethrough(text) => out.text(
                text,
                plain
                    .add_modifier(Modifier::CROSSED_OUT)
                    .add_modifier(Modifier::DIM),
            ),

            StyledSegment::BlockQuoteStart => {
                out.flush();
                out.prefix = Some(Span::styled("│ ", Style::default().fg(theme.quote)));
            }
            StyledSegment::BlockQuoteEnd => {
                out.prefix = None;
                out.flush();
            }

            StyledSegment::Rule => {
                out.flush();
                let rule = "─".repeat(width.saturating_sub(4).max(10));
                out.lines
                    .push(Line::from(Span::styled(rule, Style::default().fg(theme.border))));
                out.lines.push(Line::from(""));
            }

            StyledSegment::Link { text, url } => {
                let style = Style::default()
                    .fg(theme.link)
                    .add_modifier(Modifier::UNDERLINED);
                if text.is_empty() || text == url {
                    out.atom(url.clone(), style);
                } else {
                    out.text(text, style);
                    out.atom(format!(" ({})", url), Style::default().fg(theme.muted));
                }
            }

            StyledSegment::Image { alt, url } => {
                let label = if alt.is_empty() { url } else { alt };
                out.atom(
                    format!("[image: {}]", label),
                    Style::default().fg(theme.muted).add_modifier(Modifier::ITALIC),
                );
            }

            StyledSegment::Table { head, rows } => {
                out.flush();
                out.lines.extend(render_table(head, rows, theme));
                out.lines.push(Line::from(""));
            }
        }
    }

    let mut lines = out.finish();
    // Trailing blank lines add nothing but scroll height
    while lines.last().is_some_and(|l| l.width() == 0) {
        lines.pop();
    }
    lines
}

/// Strip control characters that can cause TUI rendering artifacts
///
/// Removes carriage returns, backspace/delete, ANSI escape sequences
/// and other ASCII control characters except tab and newline.
pub fn sanitize_for_tui(text: &str) -> String {
    let mut result = String::with_capacity(text.len());
    let mut chars = text.chars().peekable();

    while let Some(ch) = chars.next() {
        match ch {
            // ESC [ <params> <letter>
            '\x1b' => {
                if chars.peek() == Some(&'[') {
                    chars.next();
                    for next in chars.by_ref() {
                        if next.is_ascii_alphabetic() {
                            break;
                        }
                    }
                }
            }
            '\t' => result.push_str("    "),
            c if c.is_ascii_control() && c != '\n' => {}
            _ => result.push(ch),
        }
    }

    result
}

/// High-level: parse markdown and convert directly to Lines
pub fn render_markdown(markdown: &str, width: usize, theme: &Theme) -> Vec<Line<'static>> {
    let sanitized = sanitize_for_tui(markdown);
    let segments = parse_markdown(&sanitized);
    segments_to_lines(&segments, width, theme)
}

/// Flatten rendered lines to plain text (headless output)
pub fn lines_to_text(lines: &[Line<'_>]) -> String {
    let mut out = String::new();
    for line in lines {
        for span in &line.spans {
            out.push_str(&span.content);
        }
        out.push('\n');
    }
    out
}

// ============================================================================
// Table Rendering
// ============================================================================

/// Render a whole table with box-drawing characters
///
/// Column widths are the widest cell in each column across all rows.
fn render_table(head: &[String], rows: &[Vec<String>], theme: &Theme) -> Vec<Line<'static>> {
    let columns = rows
        .iter()
        .map(Vec::len)
        .chain(std::iter::once(head.len()))
        .max()
        .unwrap_or(0);
    if columns == 0 {
        return Vec::new();
    }

    let mut widths = vec![3usize; columns];
    for row in std::iter::once(head).chain(rows.iter().map(Vec::as_slice)) {
        for (i, cell) in row.iter().enumerate() {
            widths[i] = widths[i].max(cell.width());
        }
    }

    let border = Style::default().fg(theme.border);
    let header = Style::default()
        .fg(theme.heading2)
        .add_modifier(Modifier::BOLD);
    let body = Style::default().fg(theme.foreground);

    let row_line = |cells: &[String], style: Style| {
        let mut spans = vec![Span::styled("│ ", border)];
        for (i, width) in widths.iter().enumerate() {
            let cell = cells.get(i).map(String::as_str).unwrap_or("");
            let pad = width.saturating_sub(cell.width());
            spans.push(Span::styled(format!("{}{}", cell, " ".repeat(pad)), style));
            spans.push(Span::styled(if i + 1 < columns { " │ " } else { " │" }, border));
        }
        Line::from(spans)
    };

    let mut lines = Vec::with_capacity(rows.len() + 2);
    if !head.is_empty() {
        lines.push(row_line(head, header));
        let sep: Vec<String> = widths.iter().map(|w| "─".repeat(*w)).collect();
        lines.push(Line::from(Span::styled(
            format!("├─{}─┤", sep.join("─┼─")),
            border,
        )));
    }
    for row in rows {
        lines.push(row_line(row, body));
    }
    lines
}

#[cfg(test)]
mod tests {
    use super::*;

    fn text_of(lines: &[Line<'_>]) -> Vec<String> {
        lines
            .iter()
            .map(|l| l.spans.iter().map(|s| s.content.as_ref()).collect())
            .collect()
    }

    #[test]
    fn test_parse_inline_code() {
        let segments = parse_markdown("Check the `main.rs` file");

        assert!(matches!(segments[0], StyledSegment::Text(_)));
        assert!(matches!(segments[1], StyledSegment::InlineCode(_)));
        assert!(matches!(segments[2], StyledSegment::Text(_)));
    }

    #[test]
    fn test_parse_code_block_language() {
        let segments = parse_markdown("```rust ignore\nfn main() {}\n```");

        assert_eq!(
            segments[0],
            StyledSegment::CodeBlock {
                lang: Some("rust".to_string()),
                code: "fn main() {}\n".to_string(),
            }
        );
    }

    #[test]
    fn test_code_block_has_label_and_body() {
        let theme = Theme::default();
        let lines = render_markdown("```python\nprint('hi')\n```", 80, &theme);
        let text = text_of(&lines);

        assert!(text[0].contains("python"));
        assert!(text.iter().any(|l| l.contains("print('hi')")));
    }

    #[test]
    fn test_heading_levels() {
        let segments = parse_markdown("# Title\n\n### Detail with `code`");
        assert_eq!(
            segments[0],
            StyledSegment::Heading {
                level: 1,
                text: "Title".to_string()
            }
        );
        assert_eq!(
            segments[1],
            StyledSegment::Heading {
                level: 3,
                text: "Detail with code".to_string()
            }
        );
    }

    #[test]
    fn test_hard_break_parsing() {
        let md = "**Step 1:** clone  \n**Step 2:** build  \n**Step 3:** run";
        let segments = parse_markdown(md);

        let hard_breaks = segments
            .iter()
            .filter(|s| matches!(s, StyledSegment::HardBreak))
            .count();
        assert_eq!(hard_breaks, 2);

        let theme = Theme::default();
        let lines = segments_to_lines(&segments, 80, &theme);
        assert_eq!(lines.len(), 3);
    }

    #[test]
    fn test_wrapping_respects_width() {
        let theme = Theme::default();
        let md = "one two three four five six seven eight nine ten eleven twelve";
        let lines = render_markdown(md, 20, &theme);

        assert!(lines.len() > 1);
        for line in &lines {
            assert!(line.width() <= 20, "line too wide: {:?}", line);
        }
    }

    #[test]
    fn test_ordered_list_numbers() {
        let theme = Theme::default();
        let lines = render_markdown("3. third\n4. fourth", 80, &theme);
        let text = text_of(&lines);

        assert_eq!(text[0], "3. third");
        assert_eq!(text[1], "4. fourth");
    }

    #[test]
    fn test_table_columns_align_across_rows() {
        let md = "| Name | Role |\n|---|---|\n| a | short |\n| longer name | x |";
        let theme = Theme::default();
        let lines = render_markdown(md, 80, &theme);
        let text = text_of(&lines);

        let rows: Vec<&String> = text.iter().filter(|l| l.starts_with('│')).collect();
        assert_eq!(rows.len(), 3);
        let first_width = rows[0].width();
        assert!(rows.iter().all(|r| r.width() == first_width));
    }

    #[test]
    fn test_link_and_image() {
        let segments = parse_markdown("See [docs](https://example.com) ![arch diagram](arch.png)");

        assert!(segments.contains(&StyledSegment::Link {
            text: "docs".to_string(),
            url: "https://example.com".to_string(),
        }));
        assert!(segments.contains(&StyledSegment::Image {
            alt: "arch diagram".to_string(),
            url: "arch.png".to_string(),
        }));
    }

    #[test]
    fn test_blockquote_prefix_on_every_line() {
        let theme = Theme::default();
        let lines = render_markdown("> quoted words that wrap around the edge", 16, &theme);
        let text = text_of(&lines);

        assert!(text.len() > 1);
        assert!(text.iter().all(|l| l.starts_with("│ ")), "{:?}", text);
    }

    #[test]
    fn test_sanitize_strips_escape_sequences() {
        assert_eq!(sanitize_for_tui("a\x1b[31mred\x1b[0m\r\n"), "ared\n");
        assert_eq!(sanitize_for_tui("\tx"), "    x");
    }

    #[test]
    fn test_lines_to_text() {
        let theme = Theme::default();
        let lines = render_markdown("# Hi\n\nthere", 80, &theme);
        assert_eq!(lines_to_text(&lines), "Hi\n\nthere\n");
    }
}
