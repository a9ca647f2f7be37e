//! Diagram source parser
//!
//! Accepts the commonly generated mermaid subset: flowcharts (`graph` /
//! `flowchart` with a direction) and sequence diagrams. Styling statements
//! are accepted and ignored.

use super::DiagramSyntaxError;
use regex::Regex;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Direction {
    TopDown,
    BottomUp,
    LeftRight,
    RightLeft,
}

impl Direction {
    fn parse(token: &str) -> Option<Self> {
        match token.to_ascii_uppercase().as_str() {
            "TD" | "TB" => Some(Self::TopDown),
            "BT" => Some(Self::BottomUp),
            "LR" => Some(Self::LeftRight),
            "RL" => Some(Self::RightLeft),
            _ => None,
        }
    }

    pub fn is_horizontal(self) -> bool {
        matches!(self, Self::LeftRight | Self::RightLeft)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NodeShape {
    Box,
    Round,
    Diamond,
    Circle,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Node {
    pub id: String,
    pub label: String,
    pub shape: NodeShape,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EdgeStroke {
    Solid,
    Dotted,
    Thick,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Edge {
    pub from: usize,
    pub to: usize,
    pub label: Option<String>,
    pub stroke: EdgeStroke,
    pub arrow: bool,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Flowchart {
    pub direction: Direction,
    pub nodes: Vec<Node>,
    pub edges: Vec<Edge>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Message {
    pub from: usize,
    pub to: usize,
    pub text: String,
    pub dashed: bool,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Sequence {
    pub participants: Vec<String>,
    pub messages: Vec<Message>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Diagram {
    Flowchart(Flowchart),
    Sequence(Sequence),
}

/// Statements accepted but without effect on the drawing
const FLOWCHART_IGNORED: &[&str] = &[
    "style",
    "classDef",
    "class",
    "linkStyle",
    "click",
    "subgraph",
    "end",
    "direction",
];

const SEQUENCE_IGNORED: &[&str] = &[
    "autonumber",
    "title",
    "note",
    "loop",
    "alt",
    "else",
    "opt",
    "par",
    "and",
    "rect",
    "critical",
    "break",
    "end",
    "activate",
    "deactivate",
];

/// Source lines with comments removed, numbered from 1, blanks skipped
fn significant_lines(source: &str) -> impl Iterator<Item = (usize, &str)> {
    source.lines().enumerate().filter_map(|(i, line)| {
        let line = match line.find("%%") {
            Some(at) => &line[..at],
            None => line,
        };
        let line = line.trim();
        (!line.is_empty()).then_some((i + 1, line))
    })
}

fn first_word(line: &str) -> &str {
    line.split_whitespace().next().unwrap_or_default()
}

pub fn parse(source: &str) -> Result<Diagram, DiagramSyntaxError> {
    let mut lines = significant_lines(source);
    let Some((header_line, header)) = lines.next() else {
        return Err(DiagramSyntaxError::new(None, "empty diagram"));
    };

    let mut words = header.split_whitespace();
    match words.next().unwrap_or_default() {
        "graph" | "flowchart" => {
            let direction = match words.next() {
                None => Direction::TopDown,
                Some(token) => Direction::parse(token.trim_end_matches(';')).ok_or_else(|| {
                    DiagramSyntaxError::at(header_line, format!("unknown direction '{}'", token))
                })?,
            };
            let mut chart = Flowchart {
                direction,
                nodes: Vec::new(),
                edges: Vec::new(),
            };
            for (number, line) in lines {
                parse_flowchart_line(&mut chart, number, line)?;
            }
            Ok(Diagram::Flowchart(chart))
        }
        "sequenceDiagram" => parse_sequence(lines).map(Diagram::Sequence),
        other => Err(DiagramSyntaxError::at(
            header_line,
            format!("unsupported diagram type '{}'", other),
        )),
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Flowcharts
// ─────────────────────────────────────────────────────────────────────────────

fn parse_flowchart_line(
    chart: &mut Flowchart,
    number: usize,
    line: &str,
) -> Result<(), DiagramSyntaxError> {
    if FLOWCHART_IGNORED.contains(&first_word(line)) {
        return Ok(());
    }

    for statement in line.split(';').map(str::trim).filter(|s| !s.is_empty()) {
        let mut cursor = Cursor {
            text: statement,
            pos: 0,
            line: number,
        };

        let mut from = cursor.node(chart)?;
        loop {
            cursor.skip_space();
            if cursor.at_end() {
                break;
            }
            let (stroke, arrow, mut label) = cursor.edge()?;
            cursor.skip_space();
            if label.is_none() {
                label = cursor.pipe_label()?;
            }
            cursor.skip_space();
            if cursor.at_end() {
                return Err(cursor.error("edge has no target node"));
            }
            let to = cursor.node(chart)?;
            chart.edges.push(Edge {
                from,
                to,
                label,
                stroke,
                arrow,
            });
            from = to;
        }
    }
    Ok(())
}

struct Cursor<'a> {
    text: &'a str,
    pos: usize,
    line: usize,
}

impl<'a> Cursor<'a> {
    fn rest(&self) -> &'a str {
        &self.text[self.pos..]
    }

    fn at_end(&self) -> bool {
        self.pos >= self.text.len()
    }

    fn skip_space(&mut self) {
        let rest = self.rest();
        self.pos += rest.len() - rest.trim_start().len();
    }

    fn error(&self, message: impl Into<String>) -> DiagramSyntaxError {
        DiagramSyntaxError::at(self.line, message)
    }

    /// Node reference with optional shape and label; returns its index
    fn node(&mut self, chart: &mut Flowchart) -> Result<usize, DiagramSyntaxError> {
        self.skip_space();
        let rest = self.rest();
        let id_len = rest
            .find(|c: char| !(c.is_alphanumeric() || c == '_'))
            .unwrap_or(rest.len());
        if id_len == 0 {
            return Err(match rest.chars().next() {
                Some(c) => self.error(format!("expected node id, found '{}'", c)),
                None => self.error("expected node id"),
            });
        }
        let id = &rest[..id_len];
        self.pos += id_len;

        let shaped = self.shape()?;
        let index = match chart.nodes.iter().position(|n| n.id == id) {
            Some(index) => index,
            None => {
                chart.nodes.push(Node {
                    id: id.to_string(),
                    label: id.to_string(),
                    shape: NodeShape::Box,
                });
                chart.nodes.len() - 1
            }
        };
        if let Some((shape, label)) = shaped {
            let node = &mut chart.nodes[index];
            node.shape = shape;
            node.label = label;
        }
        Ok(index)
    }

    /// Optional `[..]`, `(..)`, `((..))`, `{..}` or `>..]` right after an id
    fn shape(&mut self) -> Result<Option<(NodeShape, String)>, DiagramSyntaxError> {
        let rest = self.rest();
        let (open, close, shape) = if rest.starts_with("((") {
            ("((", "))", NodeShape::Circle)
        } else if rest.starts_with('[') {
            ("[", "]", NodeShape::Box)
        } else if rest.starts_with('(') {
            ("(", ")", NodeShape::Round)
        } else if rest.starts_with('{') {
            ("{", "}", NodeShape::Diamond)
        } else if rest.starts_with('>') {
            (">", "]", NodeShape::Box)
        } else {
            return Ok(None);
        };

        let body = &rest[open.len()..];
        let Some(end) = body.find(close) else {
            return Err(self.error(format!("unclosed '{}'", open)));
        };
        let label = clean_label(&body[..end]);
        self.pos += open.len() + end + close.len();
        Ok(Some((shape, label)))
    }

    /// Edge operator; `-- text -->` carries its label inline
    fn edge(&mut self) -> Result<(EdgeStroke, bool, Option<String>), DiagramSyntaxError> {
        let rest = self.rest();

        if let Some(after) = rest.strip_prefix("-.") {
            let dashes = after.len() - after.trim_start_matches('-').len();
            if dashes == 0 {
                return Err(self.error("malformed dotted edge"));
            }
            let arrow = after[dashes..].starts_with('>');
            self.pos += 2 + dashes + usize::from(arrow);
            return Ok((EdgeStroke::Dotted, arrow, None));
        }

        if rest.starts_with("==") {
            let equals = rest.len() - rest.trim_start_matches('=').len();
            let arrow = rest[equals..].starts_with('>');
            self.pos += equals + usize::from(arrow);
            return Ok((EdgeStroke::Thick, arrow, None));
        }

        if rest.starts_with("--") {
            let dashes = rest.len() - rest.trim_start_matches('-').len();
            let after = &rest[dashes..];
            if after.starts_with('>') {
                self.pos += dashes + 1;
                return Ok((EdgeStroke::Solid, true, None));
            }
            if dashes >= 3 {
                self.pos += dashes;
                return Ok((EdgeStroke::Solid, false, None));
            }
            // `A -- label --> B`
            let (end, arrow) = match (after.find("-->"), after.find("---")) {
                (Some(a), Some(l)) if l < a => (l, false),
                (Some(a), _) => (a, true),
                (None, Some(l)) => (l, false),
                (None, None) => return Err(self.error("unterminated edge label")),
            };
            let label = clean_label(&after[..end]);
            self.pos += dashes + end + 3;
            return Ok((EdgeStroke::Solid, arrow, (!label.is_empty()).then_some(label)));
        }

        Err(match rest.chars().next() {
            Some(c) => self.error(format!("expected edge, found '{}'", c)),
            None => self.error("expected edge"),
        })
    }

    /// Optional `|label|` after an edge operator
    fn pipe_label(&mut self) -> Result<Option<String>, DiagramSyntaxError> {
        let Some(body) = self.rest().strip_prefix('|') else {
            return Ok(None);
        };
        let Some(end) = body.find('|') else {
            return Err(self.error("unclosed edge label"));
        };
        let label = clean_label(&body[..end]);
        self.pos += end + 2;
        Ok((!label.is_empty()).then_some(label))
    }
}

fn clean_label(raw: &str) -> String {
    let label = raw.trim();
    let label = label
        .strip_prefix('"')
        .and_then(|l| l.strip_suffix('"'))
        .unwrap_or(label);
    label.replace("<br>", " ").replace("<br/>", " ")
}

// ─────────────────────────────────────────────────────────────────────────────
// Sequence diagrams
// ─────────────────────────────────────────────────────────────────────────────

const PARTICIPANT_PATTERN: &str = r"^(?:participant|actor)\s+(\S+)(?:\s+as\s+(.+))?$";
const MESSAGE_PATTERN: &str =
    r"^([^\s:+-]+?)\s*(-->>|->>|-->|->|--x|-x|--\)|-\))\s*[+-]?\s*([^\s:]+)\s*(?::\s*(.*))?$";

fn parse_sequence<'a>(
    lines: impl Iterator<Item = (usize, &'a str)>,
) -> Result<Sequence, DiagramSyntaxError> {
    let compile = |pattern| {
        Regex::new(pattern).map_err(|e| DiagramSyntaxError::new(None, e.to_string()))
    };
    let participant_re = compile(PARTICIPANT_PATTERN)?;
    let message_re = compile(MESSAGE_PATTERN)?;

    // (id, display label)
    let mut participants: Vec<(String, String)> = Vec::new();
    let mut messages = Vec::new();

    let index_of = |participants: &mut Vec<(String, String)>, id: &str| {
        participants
            .iter()
            .position(|(existing, _)| existing == id)
            .unwrap_or_else(|| {
                participants.push((id.to_string(), id.to_string()));
                participants.len() - 1
            })
    };

    for (number, line) in lines {
        let keyword = first_word(line).to_ascii_lowercase();
        if SEQUENCE_IGNORED.contains(&keyword.as_str()) {
            continue;
        }

        if let Some(caps) = participant_re.captures(line) {
            let id = &caps[1];
            let index = index_of(&mut participants, id);
            if let Some(alias) = caps.get(2) {
                participants[index].1 = alias.as_str().trim().to_string();
            }
            continue;
        }

        let Some(caps) = message_re.captures(line) else {
            return Err(DiagramSyntaxError::at(
                number,
                format!("unrecognized statement '{}'", line),
            ));
        };
        let from = index_of(&mut participants, &caps[1]);
        let to = index_of(&mut participants, &caps[3]);
        messages.push(Message {
            from,
            to,
            text: caps.get(4).map(|m| m.as_str().trim().to_string()).unwrap_or_default(),
            dashed: caps[2].starts_with("--"),
        });
    }

    if participants.is_empty() {
        return Err(DiagramSyntaxError::new(None, "sequence diagram has no participants"));
    }

    Ok(Sequence {
        participants: participants.into_iter().map(|(_, label)| label).collect(),
        messages,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn flowchart(source: &str) -> Flowchart {
        match parse(source).unwrap() {
            Diagram::Flowchart(chart) => chart,
            other => panic!("expected flowchart, got {:?}", other),
        }
    }

    #[test]
    fn test_header_and_direction() {
        assert_eq!(flowchart("graph LR\nA-->B").direction, Direction::LeftRight);
        assert_eq!(flowchart("flowchart TB\nA-->B").direction, Direction::TopDown);
        assert_eq!(flowchart("graph\nA-->B").direction, Direction::TopDown);
    }

    #[test]
    fn test_node_shapes_and_labels() {
        let chart = flowchart("graph TD\nA[Box] --> B(Round)\nB --> C{Choice}\nC --> D((Hub))\nD --> E[\"Quoted label\"]");
        let shapes: Vec<NodeShape> = chart.nodes.iter().map(|n| n.shape).collect();
        assert_eq!(
            shapes,
            vec![
                NodeShape::Box,
                NodeShape::Round,
                NodeShape::Diamond,
                NodeShape::Circle,
                NodeShape::Box
            ]
        );
        assert_eq!(chart.nodes[4].label, "Quoted label");
        // Later bare references keep the first label
        assert_eq!(chart.nodes[1].label, "Round");
    }

    #[test]
    fn test_edge_kinds_and_labels() {
        let chart = flowchart(
            "graph TD\nA -->|go| B\nB --- C\nC -.-> D\nD ==> E\nE -- done --> F",
        );
        let kinds: Vec<(EdgeStroke, bool, Option<&str>)> = chart
            .edges
            .iter()
            .map(|e| (e.stroke, e.arrow, e.label.as_deref()))
            .collect();
        assert_eq!(
            kinds,
            vec![
                (EdgeStroke::Solid, true, Some("go")),
                (EdgeStroke::Solid, false, None),
                (EdgeStroke::Dotted, true, None),
                (EdgeStroke::Thick, true, None),
                (EdgeStroke::Solid, true, Some("done")),
            ]
        );
    }

    #[test]
    fn test_chained_edges_and_semicolons() {
        let chart = flowchart("graph LR\nA --> B --> C; C --> A");
        let pairs: Vec<(usize, usize)> = chart.edges.iter().map(|e| (e.from, e.to)).collect();
        assert_eq!(pairs, vec![(0, 1), (1, 2), (2, 0)]);
    }

    #[test]
    fn test_comments_and_styling_ignored() {
        let chart = flowchart(
            "%% generated\ngraph TD\n  A --> B %% trailing\n  style A fill:#f9f\n  classDef warm fill:#fdd\n  subgraph one\n  B --> C\n  end",
        );
        assert_eq!(chart.nodes.len(), 3);
        assert_eq!(chart.edges.len(), 2);
    }

    #[test]
    fn test_errors_point_at_lines() {
        let err = parse("graph TD\nA --> B\nB --> [oops]").unwrap_err();
        assert_eq!(err.line, Some(3));

        let err = parse("graph TD\nA[unclosed --> B").unwrap_err();
        assert_eq!(err.line, Some(2));
        assert!(err.message.contains("unclosed"));

        let err = parse("pie title Pets\n\"Dogs\" : 3").unwrap_err();
        assert_eq!(err.line, Some(1));

        let err = parse("graph XY\nA-->B").unwrap_err();
        assert!(err.message.contains("direction"));
    }

    #[test]
    fn test_empty_source() {
        let err = parse("  \n%% nothing\n").unwrap_err();
        assert_eq!(err.line, None);
    }

    #[test]
    fn test_sequence_diagram() {
        let source = "sequenceDiagram\n  participant C as Client\n  participant S\n  C->>S: GET /lesson\n  Note over S: lookup\n  S-->>C: 200 OK\n  S->>S: cache";
        let Diagram::Sequence(seq) = parse(source).unwrap() else {
            panic!("expected sequence diagram");
        };
        assert_eq!(seq.participants, vec!["Client", "S"]);
        assert_eq!(seq.messages.len(), 3);
        assert_eq!(seq.messages[0].text, "GET /lesson");
        assert!(!seq.messages[0].dashed);
        assert!(seq.messages[1].dashed);
        assert_eq!((seq.messages[2].from, seq.messages[2].to), (1, 1));
    }

    #[test]
    fn test_sequence_bad_statement() {
        let err = parse("sequenceDiagram\nAlice->>Bob: hi\nwhat is this").unwrap_err();
        assert_eq!(err.line, Some(3));
    }
}
