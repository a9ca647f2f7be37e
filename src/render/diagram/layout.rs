//! Diagram layout onto a character grid
//!
//! Flowcharts are ranked by longest path (cycles broken by DFS back edges,
//! which are listed as notes under the drawing) and drawn layer by layer.
//! When the drawing does not fit the available width it degrades: horizontal
//! charts retry top-down, then everything falls back to a stacked list.

use super::parser::{Diagram, EdgeStroke, Flowchart, NodeShape, Sequence};
use crate::config::GlyphStyle;
use std::collections::VecDeque;
use unicode_width::{UnicodeWidthChar, UnicodeWidthStr};

/// Narrowest width a diagram is laid out for
const MIN_WIDTH: usize = 20;
/// Columns between sibling boxes in a layer
const SIBLING_GAP: usize = 3;
/// Rows from one layer's top to the next in top-down charts
const LAYER_PITCH: usize = 6;

// ─────────────────────────────────────────────────────────────────────────────
// Output
// ─────────────────────────────────────────────────────────────────────────────

/// What a run of characters depicts; mapped to theme colors when displayed
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Ink {
    Blank,
    /// Box outlines
    Node,
    /// Node and participant labels
    Text,
    /// Connectors and arrowheads
    Edge,
    /// Edge labels and message text
    Label,
    /// Annotations under the drawing
    Note,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Run {
    pub text: String,
    pub ink: Ink,
}

/// A compiled diagram: rows of styled runs
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Graphic {
    pub rows: Vec<Vec<Run>>,
    /// Display width of the widest row
    pub width: usize,
}

impl Graphic {
    /// Cut rows wider than `max` columns, marking each cut with `ellipsis`
    fn clip(mut self, max: usize, ellipsis: char) -> Graphic {
        if self.width <= max {
            return self;
        }
        for row in &mut self.rows {
            let row_width: usize = row.iter().map(|run| run.text.width()).sum();
            if row_width <= max {
                continue;
            }
            let mut kept: Vec<Run> = Vec::new();
            let mut used = 0;
            'runs: for run in row.iter() {
                let mut text = String::new();
                for ch in run.text.chars() {
                    let w = ch.width().unwrap_or(0);
                    if used + w + 1 > max {
                        if !text.is_empty() {
                            kept.push(Run { text, ink: run.ink });
                        }
                        break 'runs;
                    }
                    text.push(ch);
                    used += w;
                }
                kept.push(Run { text, ink: run.ink });
            }
            if max > 0 {
                match kept.last_mut() {
                    Some(run) => run.text.push(ellipsis),
                    None => kept.push(Run {
                        text: ellipsis.to_string(),
                        ink: Ink::Note,
                    }),
                }
            }
            *row = kept;
        }
        self.width = self
            .rows
            .iter()
            .map(|row| row.iter().map(|run| run.text.width()).sum())
            .max()
            .unwrap_or(0);
        self
    }

    #[cfg(test)]
    pub fn to_text(&self) -> String {
        self.rows
            .iter()
            .map(|row| row.iter().map(|run| run.text.as_str()).collect::<String>())
            .collect::<Vec<_>>()
            .join("\n")
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Glyphs
// ─────────────────────────────────────────────────────────────────────────────

struct Glyphs {
    square: [char; 4],
    round: [char; 4],
    horizontal: char,
    vertical: char,
    diamond_sides: (char, char),
    circle_sides: (char, char),
    arrow_down: char,
    arrow_right: char,
    arrow_left: char,
    branch: &'static str,
    last_branch: &'static str,
    to: &'static str,
    to_dashed: &'static str,
    back_edge: &'static str,
    ellipsis: char,
}

const UNICODE: Glyphs = Glyphs {
    square: ['┌', '┐', '└', '┘'],
    round: ['╭', '╮', '╰', '╯'],
    horizontal: '─',
    vertical: '│',
    diamond_sides: ('<', '>'),
    circle_sides: ('(', ')'),
    arrow_down: '▼',
    arrow_right: '▶',
    arrow_left: '◀',
    branch: "├─▶ ",
    last_branch: "└─▶ ",
    to: " → ",
    to_dashed: " ⇢ ",
    back_edge: "↺ ",
    ellipsis: '…',
};

const ASCII: Glyphs = Glyphs {
    square: ['+', '+', '+', '+'],
    round: ['/', '\\', '\\', '/'],
    horizontal: '-',
    vertical: '|',
    diamond_sides: ('<', '>'),
    circle_sides: ('(', ')'),
    arrow_down: 'v',
    arrow_right: '>',
    arrow_left: '<',
    branch: "|-> ",
    last_branch: "`-> ",
    to: " -> ",
    to_dashed: " --> ",
    back_edge: "<< ",
    ellipsis: '~',
};

fn glyphs(style: GlyphStyle) -> &'static Glyphs {
    match style {
        GlyphStyle::Unicode => &UNICODE,
        GlyphStyle::Ascii => &ASCII,
    }
}

const UP: u8 = 1;
const DOWN: u8 = 2;
const LEFT: u8 = 4;
const RIGHT: u8 = 8;

fn stroke_weight(stroke: EdgeStroke) -> u8 {
    match stroke {
        EdgeStroke::Dotted => 0,
        EdgeStroke::Solid => 1,
        EdgeStroke::Thick => 2,
    }
}

/// Connector character for a set of joined directions
fn line_char(mask: u8, stroke: EdgeStroke, style: GlyphStyle) -> char {
    let vertical = mask & (LEFT | RIGHT) == 0;
    let horizontal = mask & (UP | DOWN) == 0;

    match style {
        GlyphStyle::Ascii => match (vertical, horizontal, stroke) {
            (true, _, EdgeStroke::Dotted) => ':',
            (true, _, _) => '|',
            (_, true, EdgeStroke::Dotted) => '.',
            (_, true, EdgeStroke::Thick) => '=',
            (_, true, EdgeStroke::Solid) => '-',
            _ => '+',
        },
        GlyphStyle::Unicode => {
            if vertical {
                return match stroke {
                    EdgeStroke::Solid => '│',
                    EdgeStroke::Dotted => '┆',
                    EdgeStroke::Thick => '┃',
                };
            }
            if horizontal {
                return match stroke {
                    EdgeStroke::Solid => '─',
                    EdgeStroke::Dotted => '┄',
                    EdgeStroke::Thick => '━',
                };
            }
            match mask {
                m if m == DOWN | RIGHT => '┌',
                m if m == DOWN | LEFT => '┐',
                m if m == UP | RIGHT => '└',
                m if m == UP | LEFT => '┘',
                m if m == UP | DOWN | RIGHT => '├',
                m if m == UP | DOWN | LEFT => '┤',
                m if m == LEFT | RIGHT | DOWN => '┬',
                m if m == LEFT | RIGHT | UP => '┴',
                _ => '┼',
            }
        }
    }
}

fn truncate(text: &str, max: usize, ellipsis: char) -> String {
    if text.width() <= max {
        return text.to_string();
    }
    let mut out = String::new();
    let mut used = 0;
    for ch in text.chars() {
        let w = ch.width().unwrap_or(0);
        if used + w + 1 > max {
            break;
        }
        out.push(ch);
        used += w;
    }
    out.push(ellipsis);
    out
}

// ─────────────────────────────────────────────────────────────────────────────
// Canvas
// ─────────────────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy)]
enum Cell {
    Blank,
    Glyph(char, Ink),
    /// Second column of a double-width character
    WideTail,
    Line { mask: u8, stroke: EdgeStroke },
}

struct Canvas {
    rows: Vec<Vec<Cell>>,
    style: GlyphStyle,
}

impl Canvas {
    fn new(style: GlyphStyle) -> Self {
        Self {
            rows: Vec::new(),
            style,
        }
    }

    fn height(&self) -> usize {
        self.rows.len()
    }

    fn cell(&mut self, x: usize, y: usize) -> &mut Cell {
        if self.rows.len() <= y {
            self.rows.resize_with(y + 1, Vec::new);
        }
        let row = &mut self.rows[y];
        if row.len() <= x {
            row.resize(x + 1, Cell::Blank);
        }
        &mut row[x]
    }

    fn is_blank(&self, x: usize, y: usize, len: usize) -> bool {
        let Some(row) = self.rows.get(y) else {
            return true;
        };
        (x..x + len).all(|cx| matches!(row.get(cx), None | Some(Cell::Blank)))
    }

    fn glyph(&mut self, x: usize, y: usize, ch: char, ink: Ink) {
        *self.cell(x, y) = Cell::Glyph(ch, ink);
    }

    fn text(&mut self, x: usize, y: usize, text: &str, ink: Ink) {
        let mut cx = x;
        for ch in text.chars() {
            match ch.width() {
                Some(0) | None => continue,
                Some(2) => {
                    self.glyph(cx, y, ch, ink);
                    *self.cell(cx + 1, y) = Cell::WideTail;
                    cx += 2;
                }
                Some(_) => {
                    self.glyph(cx, y, ch, ink);
                    cx += 1;
                }
            }
        }
    }

    /// Join a connector into a cell; boxes, text and arrowheads win
    fn join(&mut self, x: usize, y: usize, bits: u8, stroke: EdgeStroke) {
        let cell = self.cell(x, y);
        match cell {
            Cell::Blank => *cell = Cell::Line { mask: bits, stroke },
            Cell::Line {
                mask,
                stroke: existing,
            } => {
                *mask |= bits;
                if stroke_weight(stroke) > stroke_weight(*existing) {
                    *existing = stroke;
                }
            }
            Cell::Glyph(..) | Cell::WideTail => {}
        }
    }

    /// Straight connector between two points on one row or column
    fn segment(&mut self, a: (usize, usize), b: (usize, usize), stroke: EdgeStroke) {
        if a == b {
            return;
        }
        if a.1 == b.1 {
            let (x0, x1) = (a.0.min(b.0), a.0.max(b.0));
            for x in x0..=x1 {
                let mut bits = 0;
                if x > x0 {
                    bits |= LEFT;
                }
                if x < x1 {
                    bits |= RIGHT;
                }
                self.join(x, a.1, bits, stroke);
            }
        } else {
            let (y0, y1) = (a.1.min(b.1), a.1.max(b.1));
            for y in y0..=y1 {
                let mut bits = 0;
                if y > y0 {
                    bits |= UP;
                }
                if y < y1 {
                    bits |= DOWN;
                }
                self.join(a.0, y, bits, stroke);
            }
        }
    }

    fn path(&mut self, points: &[(usize, usize)], stroke: EdgeStroke) {
        for pair in points.windows(2) {
            self.segment(pair[0], pair[1], stroke);
        }
    }

    fn draw_box(&mut self, x: usize, y: usize, label: &str, shape: NodeShape, g: &Glyphs) {
        let w = label.width() + 4;
        let [tl, tr, bl, br] = match shape {
            NodeShape::Box | NodeShape::Diamond => g.square,
            NodeShape::Round | NodeShape::Circle => g.round,
        };
        let (left, right) = match shape {
            NodeShape::Diamond => g.diamond_sides,
            NodeShape::Circle => g.circle_sides,
            _ => (g.vertical, g.vertical),
        };

        for (row, (first, last)) in [(tl, tr), (left, right), (bl, br)].into_iter().enumerate() {
            self.glyph(x, y + row, first, Ink::Node);
            self.glyph(x + w - 1, y + row, last, Ink::Node);
        }
        for cx in x + 1..x + w - 1 {
            self.glyph(cx, y, g.horizontal, Ink::Node);
            self.glyph(cx, y + 2, g.horizontal, Ink::Node);
        }
        self.text(x + 2, y + 1, label, Ink::Text);
    }

    fn notes(&mut self, notes: &[String]) {
        if notes.is_empty() {
            return;
        }
        let mut y = self.height() + 1;
        for note in notes {
            self.text(0, y, note, Ink::Note);
            y += 1;
        }
    }

    fn finish(self) -> Graphic {
        let style = self.style;
        let mut rows = Vec::with_capacity(self.rows.len());
        let mut width = 0;

        for row in self.rows {
            let end = row
                .iter()
                .rposition(|c| !matches!(c, Cell::Blank))
                .map_or(0, |i| i + 1);

            let mut runs: Vec<Run> = Vec::new();
            let mut row_width = 0;
            for cell in &row[..end] {
                let (ch, ink) = match *cell {
                    Cell::Blank => (' ', Ink::Blank),
                    Cell::WideTail => continue,
                    Cell::Glyph(ch, ink) => (ch, ink),
                    Cell::Line { mask, stroke } => (line_char(mask, stroke, style), Ink::Edge),
                };
                row_width += ch.width().unwrap_or(0);
                match runs.last_mut() {
                    Some(run) if run.ink == ink => run.text.push(ch),
                    _ => runs.push(Run {
                        text: ch.to_string(),
                        ink,
                    }),
                }
            }
            width = width.max(row_width);
            rows.push(runs);
        }

        Graphic { rows, width }
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Entry point
// ─────────────────────────────────────────────────────────────────────────────

/// Lay out a diagram; the result is never wider than `width`
pub fn render(diagram: &Diagram, width: usize, style: GlyphStyle) -> Graphic {
    let layout_width = width.max(MIN_WIDTH);
    let graphic = match diagram {
        Diagram::Flowchart(chart) => render_flowchart(chart, layout_width, style),
        Diagram::Sequence(seq) => render_sequence(seq, layout_width, style),
    };
    graphic.clip(width, glyphs(style).ellipsis)
}

// ─────────────────────────────────────────────────────────────────────────────
// Flowcharts
// ─────────────────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, Default)]
struct Placed {
    x: usize,
    y: usize,
    w: usize,
}

impl Placed {
    fn center_x(&self) -> usize {
        self.x + self.w / 2
    }

    fn right(&self) -> usize {
        self.x + self.w - 1
    }

    fn mid_y(&self) -> usize {
        self.y + 1
    }

    fn bottom(&self) -> usize {
        self.y + 2
    }
}

struct Ranking {
    rank: Vec<usize>,
    back: Vec<bool>,
    layers: Vec<Vec<usize>>,
}

/// Mark edges closing a cycle during DFS in declaration order
fn find_back_edges(chart: &Flowchart) -> Vec<bool> {
    let mut outgoing: Vec<Vec<usize>> = vec![Vec::new(); chart.nodes.len()];
    for (e, edge) in chart.edges.iter().enumerate() {
        outgoing[edge.from].push(e);
    }

    // 0 = unvisited, 1 = on the DFS stack, 2 = finished
    let mut state = vec![0u8; chart.nodes.len()];
    let mut back = vec![false; chart.edges.len()];

    for start in 0..chart.nodes.len() {
        if state[start] != 0 {
            continue;
        }
        // Explicit stack of (node, next outgoing edge position)
        let mut stack = vec![(start, 0usize)];
        state[start] = 1;
        while let Some((node, next)) = stack.last_mut() {
            let node = *node;
            let Some(&e) = outgoing[node].get(*next) else {
                state[node] = 2;
                stack.pop();
                continue;
            };
            *next += 1;
            let target = chart.edges[e].to;
            match state[target] {
                0 => {
                    state[target] = 1;
                    stack.push((target, 0));
                }
                1 => back[e] = true,
                _ => {}
            }
        }
    }

    back
}

fn rank_nodes(chart: &Flowchart) -> Ranking {
    let n = chart.nodes.len();
    let back = find_back_edges(chart);

    let mut indegree = vec![0usize; n];
    for (edge, _) in chart.edges.iter().zip(&back).filter(|(_, b)| !**b) {
        indegree[edge.to] += 1;
    }

    let mut rank = vec![0usize; n];
    let mut queue: VecDeque<usize> = (0..n).filter(|&v| indegree[v] == 0).collect();
    while let Some(u) = queue.pop_front() {
        for (edge, _) in chart.edges.iter().zip(&back).filter(|(e, b)| !**b && e.from == u) {
            rank[edge.to] = rank[edge.to].max(rank[u] + 1);
            indegree[edge.to] -= 1;
            if indegree[edge.to] == 0 {
                queue.push_back(edge.to);
            }
        }
    }

    let depth = rank.iter().copied().max().map_or(0, |r| r + 1);
    let mut layers = vec![Vec::new(); depth];
    for (v, &r) in rank.iter().enumerate() {
        layers[r].push(v);
    }

    Ranking { rank, back, layers }
}

fn render_flowchart(chart: &Flowchart, width: usize, style: GlyphStyle) -> Graphic {
    if chart.nodes.is_empty() {
        let mut canvas = Canvas::new(style);
        canvas.text(0, 0, "(empty diagram)", Ink::Note);
        return canvas.finish();
    }

    let ranking = rank_nodes(chart);

    // Reversed directions are drawn in their forward orientation
    if chart.direction.is_horizontal() {
        let graphic = layout_horizontal(chart, &ranking, style).finish();
        if graphic.width <= width {
            return graphic;
        }
    }
    let graphic = layout_vertical(chart, &ranking, style).finish();
    if graphic.width <= width {
        return graphic;
    }
    layout_stacked(chart, &ranking, width, style).finish()
}

fn box_width(label: &str) -> usize {
    label.width() + 4
}

fn back_edge_notes(chart: &Flowchart, ranking: &Ranking, g: &Glyphs) -> Vec<String> {
    chart
        .edges
        .iter()
        .zip(&ranking.back)
        .filter(|(_, back)| **back)
        .map(|(edge, _)| {
            let mut note = format!(
                "{}{}{}{}",
                g.back_edge, chart.nodes[edge.from].label, g.to, chart.nodes[edge.to].label
            );
            if let Some(label) = &edge.label {
                note.push_str(&format!(" ({})", label));
            }
            note
        })
        .collect()
}

fn layout_vertical(chart: &Flowchart, ranking: &Ranking, style: GlyphStyle) -> Canvas {
    let g = glyphs(style);
    let mut canvas = Canvas::new(style);

    let layer_width = |layer: &[usize]| {
        layer
            .iter()
            .map(|&v| box_width(&chart.nodes[v].label))
            .sum::<usize>()
            + SIBLING_GAP * layer.len().saturating_sub(1)
    };
    let content_width = ranking
        .layers
        .iter()
        .map(|l| layer_width(l.as_slice()))
        .max()
        .unwrap_or(0);

    let mut placed = vec![Placed::default(); chart.nodes.len()];
    for (r, layer) in ranking.layers.iter().enumerate() {
        let mut x = (content_width - layer_width(layer.as_slice())) / 2;
        for &v in layer {
            let w = box_width(&chart.nodes[v].label);
            placed[v] = Placed {
                x,
                y: r * LAYER_PITCH,
                w,
            };
            x += w + SIBLING_GAP;
        }
    }
    for (node, at) in chart.nodes.iter().zip(&placed) {
        canvas.draw_box(at.x, at.y, &node.label, node.shape, g);
    }

    let mut notes = Vec::new();
    let mut channel = content_width + 1;
    for (edge, _) in chart.edges.iter().zip(&ranking.back).filter(|(_, b)| !**b) {
        let (s, t) = (placed[edge.from], placed[edge.to]);
        let (sx, sy) = (s.center_x(), s.bottom() + 1);
        let (tx, ty) = (t.center_x(), t.y - 1);

        let points = if ranking.rank[edge.to] == ranking.rank[edge.from] + 1 {
            let ym = s.bottom() + 2;
            vec![(sx, sy), (sx, ym), (tx, ym), (tx, ty)]
        } else {
            // Skip layers through a channel right of the drawing
            channel += 2;
            let (ys, yd) = (s.bottom() + 2, t.y - 2);
            vec![(sx, sy), (sx, ys), (channel, ys), (channel, yd), (tx, yd), (tx, ty)]
        };
        canvas.path(&points, edge.stroke);
        if edge.arrow {
            canvas.glyph(tx, ty, g.arrow_down, Ink::Edge);
        }

        if let Some(label) = &edge.label {
            let lw = label.width();
            if canvas.is_blank(tx + 2, ty, lw) {
                canvas.text(tx + 2, ty, label, Ink::Label);
            } else if canvas.is_blank(sx + 2, sy, lw) {
                canvas.text(sx + 2, sy, label, Ink::Label);
            } else {
                notes.push(format!(
                    "{}{}{}: {}",
                    chart.nodes[edge.from].label,
                    g.to,
                    chart.nodes[edge.to].label,
                    label
                ));
            }
        }
    }

    notes.extend(back_edge_notes(chart, ranking, g));
    canvas.notes(&notes);
    canvas
}

fn layout_horizontal(chart: &Flowchart, ranking: &Ranking, style: GlyphStyle) -> Canvas {
    let g = glyphs(style);
    let mut canvas = Canvas::new(style);
    let depth = ranking.layers.len();

    let column_width: Vec<usize> = ranking
        .layers
        .iter()
        .map(|layer| {
            layer
                .iter()
                .map(|&v| box_width(&chart.nodes[v].label))
                .max()
                .unwrap_or(0)
        })
        .collect();

    // Gap after each column fits the widest label of edges leaving it
    let mut gap = vec![6usize; depth];
    for (edge, _) in chart.edges.iter().zip(&ranking.back).filter(|(_, b)| !**b) {
        if let Some(label) = &edge.label {
            let r = ranking.rank[edge.from];
            gap[r] = gap[r].max(label.width() + 4);
        }
    }

    let mut column_x = vec![0usize; depth];
    for r in 1..depth {
        column_x[r] = column_x[r - 1] + column_width[r - 1] + gap[r - 1];
    }

    let column_height = |layer: &Vec<usize>| (layer.len() * 4).saturating_sub(1);
    let content_height = ranking.layers.iter().map(column_height).max().unwrap_or(0);

    let mut placed = vec![Placed::default(); chart.nodes.len()];
    for (r, layer) in ranking.layers.iter().enumerate() {
        let top = (content_height - column_height(layer)) / 2;
        for (i, &v) in layer.iter().enumerate() {
            placed[v] = Placed {
                x: column_x[r],
                y: top + i * 4,
                w: box_width(&chart.nodes[v].label),
            };
        }
    }
    for (node, at) in chart.nodes.iter().zip(&placed) {
        canvas.draw_box(at.x, at.y, &node.label, node.shape, g);
    }

    let mut notes = Vec::new();
    let mut channel = content_height + 1;
    for (edge, _) in chart.edges.iter().zip(&ranking.back).filter(|(_, b)| !**b) {
        let (s, t) = (placed[edge.from], placed[edge.to]);
        let (rs, rt) = (ranking.rank[edge.from], ranking.rank[edge.to]);
        let (sx, sy) = (s.right() + 1, s.mid_y());
        let (tx, ty) = (t.x - 1, t.mid_y());
        let bus = column_x[rs] + column_width[rs] + 1;

        let points = if rt == rs + 1 {
            vec![(sx, sy), (bus, sy), (bus, ty), (tx, ty)]
        } else {
            // Skip columns through a channel under the drawing
            channel += 1;
            let entry = column_x[rt] - 2;
            vec![(sx, sy), (bus, sy), (bus, channel), (entry, channel), (entry, ty), (tx, ty)]
        };
        canvas.path(&points, edge.stroke);
        if edge.arrow {
            canvas.glyph(tx, ty, g.arrow_right, Ink::Edge);
        }

        if let Some(label) = &edge.label {
            let lw = label.width();
            if canvas.is_blank(bus + 2, ty - 1, lw) {
                canvas.text(bus + 2, ty - 1, label, Ink::Label);
            } else if canvas.is_blank(bus + 2, ty + 1, lw) {
                canvas.text(bus + 2, ty + 1, label, Ink::Label);
            } else {
                notes.push(format!(
                    "{}{}{}: {}",
                    chart.nodes[edge.from].label,
                    g.to,
                    chart.nodes[edge.to].label,
                    label
                ));
            }
        }
    }

    notes.extend(back_edge_notes(chart, ranking, g));
    canvas.notes(&notes);
    canvas
}

/// One box per node with its outgoing edges listed underneath
fn layout_stacked(
    chart: &Flowchart,
    ranking: &Ranking,
    width: usize,
    style: GlyphStyle,
) -> Canvas {
    let g = glyphs(style);
    let mut canvas = Canvas::new(style);
    let mut y = 0;

    for &v in ranking.layers.iter().flatten() {
        let node = &chart.nodes[v];
        let label = truncate(&node.label, width - 4, g.ellipsis);
        canvas.draw_box(0, y, &label, node.shape, g);
        y += 3;

        let outgoing: Vec<_> = chart.edges.iter().filter(|e| e.from == v).collect();
        for (i, edge) in outgoing.iter().enumerate() {
            let branch = if i + 1 == outgoing.len() {
                g.last_branch
            } else {
                g.branch
            };
            canvas.text(2, y, branch, Ink::Edge);

            let x = 2 + branch.width();
            let room = width.saturating_sub(x);
            let target = truncate(&chart.nodes[edge.to].label, room, g.ellipsis);
            canvas.text(x, y, &target, Ink::Text);
            if let Some(label) = &edge.label {
                let used = target.width() + 1;
                if room > used + 3 {
                    let label = truncate(&format!("({})", label), room - used, g.ellipsis);
                    canvas.text(x + used, y, &label, Ink::Label);
                }
            }
            y += 1;
        }
        y += 1;
    }

    canvas
}

// ─────────────────────────────────────────────────────────────────────────────
// Sequence diagrams
// ─────────────────────────────────────────────────────────────────────────────

fn render_sequence(seq: &Sequence, width: usize, style: GlyphStyle) -> Graphic {
    let graphic = layout_sequence(seq, style).finish();
    if graphic.width <= width {
        return graphic;
    }
    sequence_list(seq, width, style).finish()
}

fn layout_sequence(seq: &Sequence, style: GlyphStyle) -> Canvas {
    let g = glyphs(style);
    let mut canvas = Canvas::new(style);
    let n = seq.participants.len();

    let widths: Vec<usize> = seq.participants.iter().map(|p| box_width(p)).collect();
    let mut gaps: Vec<usize> = (1..n)
        .map(|i| (widths[i - 1] / 2 + widths[i] / 2 + 3).max(8))
        .collect();

    // Widen gaps until every message label fits over its arrow
    for message in &seq.messages {
        let text = message.text.width();
        if message.from == message.to {
            if let Some(gap) = gaps.get_mut(message.from) {
                *gap = (*gap).max(text + 7);
            }
            continue;
        }
        let (a, b) = (message.from.min(message.to), message.from.max(message.to));
        let have: usize = gaps[a..b].iter().sum();
        let need = text + 4;
        if have < need {
            gaps[b - 1] += need - have;
        }
    }

    let mut centers = Vec::with_capacity(n);
    let mut cx = widths[0] / 2;
    for i in 0..n {
        centers.push(cx);
        if let Some(gap) = gaps.get(i) {
            cx += gap;
        }
    }

    for (label, (&cx, &w)) in seq.participants.iter().zip(centers.iter().zip(&widths)) {
        canvas.draw_box(cx - w / 2, 0, label, NodeShape::Box, g);
    }

    let top = 3;
    let bottom = top + seq.messages.len() * 2 + 1;
    for &cx in &centers {
        canvas.path(&[(cx, top), (cx, bottom)], EdgeStroke::Dotted);
    }

    for (k, message) in seq.messages.iter().enumerate() {
        let y = top + 1 + k * 2;
        let arrow_y = y + 1;
        let stroke = if message.dashed {
            EdgeStroke::Dotted
        } else {
            EdgeStroke::Solid
        };
        let (x0, x1) = (centers[message.from], centers[message.to]);

        if message.from == message.to {
            canvas.path(&[(x0, y), (x0 + 3, y), (x0 + 3, arrow_y), (x0 + 1, arrow_y)], stroke);
            canvas.glyph(x0 + 1, arrow_y, g.arrow_left, Ink::Edge);
            canvas.text(x0 + 5, y, &message.text, Ink::Label);
            continue;
        }

        canvas.text(x0.min(x1) + 2, y, &message.text, Ink::Label);
        canvas.path(&[(x0, arrow_y), (x1, arrow_y)], stroke);
        if x1 > x0 {
            canvas.glyph(x1 - 1, arrow_y, g.arrow_right, Ink::Edge);
        } else {
            canvas.glyph(x1 + 1, arrow_y, g.arrow_left, Ink::Edge);
        }
    }

    canvas
}

/// Narrow fallback: one line per message
fn sequence_list(seq: &Sequence, width: usize, style: GlyphStyle) -> Canvas {
    let g = glyphs(style);
    let mut canvas = Canvas::new(style);

    for (y, message) in seq.messages.iter().enumerate() {
        let arrow = if message.dashed { g.to_dashed } else { g.to };
        let mut line = format!(
            "{}{}{}",
            seq.participants[message.from], arrow, seq.participants[message.to]
        );
        if !message.text.is_empty() {
            line.push_str(": ");
            line.push_str(&message.text);
        }
        canvas.text(0, y, &truncate(&line, width, g.ellipsis), Ink::Label);
    }
    if seq.messages.is_empty() {
        let names = seq.participants.join(", ");
        canvas.text(0, 0, &truncate(&names, width, g.ellipsis), Ink::Text);
    }

    canvas
}

#[cfg(test)]
mod tests {
    use super::super::parser::parse;
    use super::*;

    fn draw(source: &str, width: usize, style: GlyphStyle) -> Graphic {
        render(&parse(source).unwrap(), width, style)
    }

    fn row_of(text: &str, needle: &str) -> usize {
        text.lines()
            .position(|l| l.contains(needle))
            .unwrap_or_else(|| panic!("{} not found in\n{}", needle, text))
    }

    #[test]
    fn test_top_down_ranks_downwards() {
        let graphic = draw("graph TD\nA[Start] --> B[Middle]\nB --> C[Finish]", 80, GlyphStyle::Unicode);
        let text = graphic.to_text();

        assert!(row_of(&text, "Start") < row_of(&text, "Middle"));
        assert!(row_of(&text, "Middle") < row_of(&text, "Finish"));
        assert_eq!(text.matches('▼').count(), 2);
    }

    #[test]
    fn test_left_right_shares_rows() {
        let graphic = draw("graph LR\nA[Start] --> B[Finish]", 80, GlyphStyle::Unicode);
        let text = graphic.to_text();

        assert_eq!(row_of(&text, "Start"), row_of(&text, "Finish"));
        assert!(text.contains('▶'));
    }

    #[test]
    fn test_edge_labels_drawn() {
        let graphic = draw(
            "graph TD\nA{Valid?} -->|yes| B[Save]\nA -->|no| C[Reject]",
            80,
            GlyphStyle::Unicode,
        );
        let text = graphic.to_text();

        assert!(text.contains("yes"));
        assert!(text.contains("no"));
        assert!(text.contains("< Valid? >"));
    }

    #[test]
    fn test_cycle_listed_as_note() {
        let graphic = draw("graph TD\nA[Ask] --> B[Answer]\nB -->|again| A", 80, GlyphStyle::Unicode);
        let text = graphic.to_text();

        assert!(text.contains("↺ Answer → Ask (again)"), "{}", text);
        let notes: Vec<&Run> = graphic.rows.iter().flatten().filter(|r| r.ink == Ink::Note).collect();
        assert_eq!(notes.len(), 1);
    }

    #[test]
    fn test_narrow_width_falls_back_to_stacked() {
        let source = "graph LR\nA[Fetch structure] --> B[Select first lesson]\nB --> C[Fetch lesson content]";
        let graphic = draw(source, 22, GlyphStyle::Unicode);

        assert!(graphic.width <= 22, "width {}:\n{}", graphic.width, graphic.to_text());
        assert!(graphic.to_text().contains("└─▶"));
    }

    #[test]
    fn test_ascii_glyphs_only() {
        let source = "graph TD\nA(Round) -.-> B{Pick}\nB ==>|x| C((Done))\nC --> A";
        let wide = draw(source, 80, GlyphStyle::Ascii);
        let narrow = draw(source, 20, GlyphStyle::Ascii);

        assert!(wide.to_text().is_ascii(), "{}", wide.to_text());
        assert!(narrow.to_text().is_ascii(), "{}", narrow.to_text());
    }

    #[test]
    fn test_long_edge_routes_around_layers() {
        let graphic = draw("graph TD\nA --> B\nB --> C\nA --> C", 80, GlyphStyle::Unicode);
        let text = graphic.to_text();

        // A -> C skips a layer through the channel right of the boxes
        assert_eq!(text.matches("│ C │").count(), 1);
        assert!(graphic.width > box_width("A"));
    }

    #[test]
    fn test_sequence_layout() {
        let graphic = draw(
            "sequenceDiagram\nparticipant R as Reader\nparticipant B as Backend\nR->>B: GET structure\nB-->>R: chapters\nB->>B: cache",
            80,
            GlyphStyle::Unicode,
        );
        let text = graphic.to_text();

        assert_eq!(row_of(&text, "Reader"), row_of(&text, "Backend"));
        assert!(row_of(&text, "GET structure") < row_of(&text, "chapters"));
        assert!(text.contains('▶'));
        assert!(text.contains('◀'));
        assert!(text.contains('┄'));
    }

    #[test]
    fn test_sequence_narrow_fallback() {
        let graphic = draw(
            "sequenceDiagram\nAlice->>Bob: a rather long message that cannot fit",
            20,
            GlyphStyle::Unicode,
        );

        assert!(graphic.width <= 20);
        assert!(graphic.to_text().starts_with("Alice → Bob"));
    }

    #[test]
    fn test_output_never_wider_than_requested() {
        let sources = [
            "graph TD",
            "sequenceDiagram\nAlice->>Bob: hi",
            "sequenceDiagram\nparticipant Reader\nparticipant Backend",
            "graph LR\nA[Start] --> B[Finish]",
        ];
        for source in sources {
            let graphic = draw(source, 10, GlyphStyle::Unicode);
            assert!(graphic.width <= 10, "{}:\n{}", source, graphic.to_text());
            for line in graphic.to_text().lines() {
                assert!(line.width() <= 10, "{:?} from {}", line, source);
            }
        }

        let placeholder = draw("graph TD", 10, GlyphStyle::Ascii).to_text();
        assert_eq!(placeholder, "(empty di~");
    }

    #[test]
    fn test_wide_characters_measured() {
        let graphic = draw("graph TD\nA[学習] --> B[完了]", 80, GlyphStyle::Unicode);
        let text = graphic.to_text();

        assert!(text.contains("│ 学習 │"), "{}", text);
    }

    #[test]
    fn test_truncate() {
        assert_eq!(truncate("short", 10, '…'), "short");
        assert_eq!(truncate("a longer label", 6, '…'), "a lon…");
    }
}
