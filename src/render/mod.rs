//! Lesson rendering: markdown blocks plus diagram blocks
//!
//! The block renderer splits a lesson body at fences tagged with the diagram
//! tag. Everything else goes through the markdown renderer; diagram blocks are
//! mounted as pending and compiled off the UI task, then applied by id.

pub mod diagram;

use crate::browser::model::LessonContent;
use crate::theme::Theme;
use crate::tui::markdown;
use pulldown_cmark::{CodeBlockKind, Event, Options, Parser, Tag, TagEnd};
use ratatui::style::{Modifier, Style};
use ratatui::text::{Line, Span};

pub use diagram::{
    DiagramId, DiagramJob, DiagramRenderer, DiagramSyntaxError, Graphic, Ink,
    ResizeRegistry, ResizeSubscription,
};

/// One piece of a lesson body
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Block {
    Markdown(String),
    /// Diagram source with its single trailing newline removed
    Diagram(String),
}

/// Splits lesson bodies and renders their blocks
#[derive(Debug, Clone)]
pub struct BlockRenderer {
    diagram_tag: String,
}

impl BlockRenderer {
    pub fn new(diagram_tag: impl Into<String>) -> Self {
        Self {
            diagram_tag: diagram_tag.into(),
        }
    }

    fn is_diagram_fence(&self, info: &str) -> bool {
        info.split_whitespace().next() == Some(self.diagram_tag.as_str())
    }

    /// Split markdown at diagram fences, keeping document order
    pub fn split(&self, body: &str) -> Vec<Block> {
        let mut blocks = Vec::new();
        let mut consumed = 0;
        let mut diagram: Option<(usize, String)> = None;

        let parser = Parser::new_ext(body, Options::ENABLE_TABLES | Options::ENABLE_STRIKETHROUGH);
        for (event, range) in parser.into_offset_iter() {
            match event {
                Event::Start(Tag::CodeBlock(CodeBlockKind::Fenced(info)))
                    if self.is_diagram_fence(&info) =>
                {
                    diagram = Some((range.start, String::new()));
                }
                Event::Text(text) => {
                    if let Some((_, source)) = diagram.as_mut() {
                        source.push_str(&text);
                    }
                }
                Event::End(TagEnd::CodeBlock) => {
                    let Some((start, mut source)) = diagram.take() else {
                        continue;
                    };
                    push_markdown(&mut blocks, &body[consumed..start]);
                    if source.ends_with('\n') {
                        source.pop();
                    }
                    blocks.push(Block::Diagram(source));
                    consumed = range.end;
                }
                _ => {}
            }
        }

        push_markdown(&mut blocks, &body[consumed..]);
        blocks
    }

    /// Render a lesson, mounting its diagrams
    ///
    /// Returns the document and the compile jobs for its diagrams.
    pub fn render(
        &self,
        content: &LessonContent,
        width: usize,
        theme: &Theme,
        registry: &ResizeRegistry,
    ) -> (RenderedDocument, Vec<DiagramJob>) {
        let mut jobs = Vec::new();
        let blocks = self
            .split(&content.body)
            .into_iter()
            .map(|block| match block {
                Block::Markdown(source) => RenderedBlock::Markdown {
                    lines: markdown::render_markdown(&source, width, theme),
                    source,
                },
                Block::Diagram(source) => {
                    let id = DiagramRenderer::next_id();
                    jobs.push(DiagramJob {
                        id,
                        source: source.clone(),
                        width,
                    });
                    RenderedBlock::Diagram {
                        state: DiagramState::Pending,
                        subscription: registry.subscribe(id, source),
                    }
                }
            })
            .collect();

        tracing::debug!(
            path = %content.path,
            diagrams = jobs.len(),
            "Rendered lesson"
        );

        let document = RenderedDocument {
            width,
            blocks,
        };
        (document, jobs)
    }
}

fn push_markdown(blocks: &mut Vec<Block>, text: &str) {
    if !text.trim().is_empty() {
        blocks.push(Block::Markdown(text.to_string()));
    }
}

/// Compile status of one mounted diagram
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DiagramState {
    Pending,
    Ready(Graphic),
    Failed(DiagramSyntaxError),
}

#[derive(Debug)]
enum RenderedBlock {
    Markdown {
        source: String,
        lines: Vec<Line<'static>>,
    },
    Diagram {
        state: DiagramState,
        /// Keeps the diagram registered for resize until this block drops
        subscription: ResizeSubscription,
    },
}

/// A lesson rendered for display at one width
#[derive(Debug)]
pub struct RenderedDocument {
    width: usize,
    blocks: Vec<RenderedBlock>,
}

impl RenderedDocument {
    pub fn width(&self) -> usize {
        self.width
    }

    /// Apply a compile result; stale widths and unknown ids are ignored
    pub fn apply(
        &mut self,
        id: DiagramId,
        width: usize,
        result: Result<Graphic, DiagramSyntaxError>,
    ) -> bool {
        if width != self.width {
            return false;
        }
        for block in &mut self.blocks {
            if let RenderedBlock::Diagram {
                state,
                subscription,
            } = block
            {
                if subscription.id() == id {
                    *state = match result {
                        Ok(graphic) => DiagramState::Ready(graphic),
                        Err(e) => DiagramState::Failed(e),
                    };
                    return true;
                }
            }
        }
        false
    }

    /// Rewrap markdown for a new width
    ///
    /// Diagrams keep their current drawing until the resize jobs land.
    pub fn relayout(&mut self, width: usize, theme: &Theme) {
        if width == self.width {
            return;
        }
        self.width = width;
        for block in &mut self.blocks {
            if let RenderedBlock::Markdown { source, lines } = block {
                *lines = markdown::render_markdown(source, width, theme);
            }
        }
    }

    /// Diagram states in document order
    #[cfg(test)]
    pub fn diagrams(&self) -> Vec<&DiagramState> {
        self.blocks
            .iter()
            .filter_map(|block| match block {
                RenderedBlock::Diagram { state, .. } => Some(state),
                RenderedBlock::Markdown { .. } => None,
            })
            .collect()
    }

    /// Flatten to display lines
    pub fn lines(&self, theme: &Theme) -> Vec<Line<'static>> {
        let mut out = Vec::new();
        for (i, block) in self.blocks.iter().enumerate() {
            if i > 0 {
                out.push(Line::from(""));
            }
            match block {
                RenderedBlock::Markdown { lines, .. } => out.extend(lines.iter().cloned()),
                RenderedBlock::Diagram { state, .. } => out.extend(diagram_lines(state, theme)),
            }
        }
        out
    }
}

fn ink_style(ink: Ink, theme: &Theme) -> Style {
    match ink {
        Ink::Blank => Style::default(),
        Ink::Node => Style::default().fg(theme.diagram_node),
        Ink::Text => Style::default().fg(theme.foreground),
        Ink::Edge => Style::default().fg(theme.diagram_edge),
        Ink::Label => Style::default().fg(theme.diagram_label),
        Ink::Note => Style::default()
            .fg(theme.muted)
            .add_modifier(Modifier::ITALIC),
    }
}

fn diagram_lines(state: &DiagramState, theme: &Theme) -> Vec<Line<'static>> {
    match state {
        DiagramState::Pending => vec![Line::from(Span::styled(
            "Rendering diagram...",
            Style::default()
                .fg(theme.muted)
                .add_modifier(Modifier::ITALIC),
        ))],
        DiagramState::Ready(graphic) => graphic
            .rows
            .iter()
            .map(|row| {
                Line::from(
                    row.iter()
                        .map(|run| Span::styled(run.text.clone(), ink_style(run.ink, theme)))
                        .collect::<Vec<_>>(),
                )
            })
            .collect(),
        DiagramState::Failed(error) => vec![Line::from(vec![
            Span::styled(
                "Diagram error: ",
                Style::default().fg(theme.error).add_modifier(Modifier::BOLD),
            ),
            Span::styled(error.to_string(), Style::default().fg(theme.error)),
        ])],
    }
}
