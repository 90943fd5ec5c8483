//! Line-oriented scanner for Mermaid source.
//!
//! This is not a parser. It recognises the header, splits lines on arrow
//! tokens and collects node identifiers, which is enough for counting and
//! for the heuristics in [`crate::heuristic`].

use std::collections::BTreeSet;

use crate::diagram::DiagramKind;

/// Statements that never introduce a node.
const RESERVED: [&str; 27] = [
    "subgraph",
    "end",
    "style",
    "classDef",
    "click",
    "linkStyle",
    "direction",
    "note",
    "Note",
    "loop",
    "alt",
    "else",
    "opt",
    "par",
    "and",
    "rect",
    "critical",
    "break",
    "title",
    "section",
    "autonumber",
    "activate",
    "deactivate",
    "dateFormat",
    "axisFormat",
    "excludes",
    "accTitle",
];

/// Flowchart layout directions.
const DIRECTIONS: [&str; 5] = ["TD", "TB", "LR", "RL", "BT"];

/// Summary of a scanned diagram.
#[derive(Debug, Clone)]
pub struct SourceScan {
    /// Detected kind (`Unknown` without a recognised header).
    pub kind: DiagramKind,
    /// 1-based line number and text of the first significant line.
    pub header: Option<(usize, String)>,
    /// Distinct node identifiers in first-seen order.
    pub nodes: Vec<String>,
    /// Nodes declared with a bracketed label somewhere.
    pub labeled: BTreeSet<String>,
    /// Number of edges, messages or dependencies.
    pub edge_count: usize,
    /// Number of `subgraph` blocks.
    pub subgraph_count: usize,
    /// Deepest `subgraph` nesting.
    pub max_nesting: usize,
    /// A flowchart direction was declared.
    pub has_direction: bool,
    /// `style`/`classDef` statements present.
    pub has_styling: bool,
    /// `%%` comments present.
    pub has_comments: bool,
    /// Significant lines after the header.
    pub body_lines: usize,
}

impl SourceScan {
    fn empty(has_comments: bool) -> Self {
        Self {
            kind: DiagramKind::Unknown,
            header: None,
            nodes: Vec::new(),
            labeled: BTreeSet::new(),
            edge_count: 0,
            subgraph_count: 0,
            max_nesting: 0,
            has_direction: false,
            has_styling: false,
            has_comments,
            body_lines: 0,
        }
    }

    /// Number of distinct nodes.
    #[must_use]
    pub fn node_count(&self) -> usize {
        self.nodes.len()
    }

    /// Nodes that never received a label.
    #[must_use]
    pub fn unlabeled(&self) -> Vec<&str> {
        self.nodes
            .iter()
            .filter(|n| !self.labeled.contains(*n))
            .map(String::as_str)
            .collect()
    }

    fn add_node(&mut self, id: &str) {
        if !self.nodes.iter().any(|n| n == id) {
            self.nodes.push(id.to_string());
        }
    }
}

/// Lines that carry content: non-blank and not `%%` comments.
pub fn significant_lines(source: &str) -> impl Iterator<Item = (usize, &str)> {
    source
        .lines()
        .enumerate()
        .map(|(idx, line)| (idx + 1, line.trim()))
        .filter(|(_, line)| !line.is_empty() && !line.starts_with("%%"))
}

/// Scan Mermaid source.
#[must_use]
pub fn scan(source: &str) -> SourceScan {
    let mut out = SourceScan::empty(source.lines().any(|l| l.trim_start().starts_with("%%")));

    let mut lines = significant_lines(source);
    let Some((header_no, header)) = lines.next() else {
        return out;
    };
    let kind = DiagramKind::from_header(header);
    out.kind = kind;
    out.header = Some((header_no, header.to_string()));
    out.has_direction = header
        .split_whitespace()
        .nth(1)
        .is_some_and(|d| DIRECTIONS.contains(&d));

    let body: Vec<&str> = if kind == DiagramKind::Unknown {
        // Without a header the first line is body content too.
        std::iter::once(header).chain(lines.map(|(_, l)| l)).collect()
    } else {
        lines.map(|(_, l)| l).collect()
    };
    out.body_lines = body.len();

    let mut nesting = 0usize;
    for line in body {
        let first = line.split_whitespace().next().unwrap_or_default();
        match first {
            "subgraph" => {
                out.subgraph_count += 1;
                nesting += 1;
                out.max_nesting = out.max_nesting.max(nesting);
                continue;
            }
            "end" => {
                nesting = nesting.saturating_sub(1);
                continue;
            }
            "style" | "classDef" | "linkStyle" => {
                out.has_styling = true;
                continue;
            }
            "direction" => {
                out.has_direction = true;
                continue;
            }
            _ => {}
        }

        match kind {
            DiagramKind::Gantt => scan_gantt_line(&mut out, line, first),
            DiagramKind::Pie
            | DiagramKind::Journey
            | DiagramKind::Mindmap
            | DiagramKind::Timeline
            | DiagramKind::GitGraph => {
                if !RESERVED.contains(&first) && first != "showData" {
                    let id = line.split(':').next().unwrap_or(line).trim().trim_matches('"');
                    if !id.is_empty() {
                        out.add_node(id);
                    }
                }
            }
            DiagramKind::Flowchart if first == "class" => out.has_styling = true,
            _ => scan_graph_line(&mut out, line, first),
        }
    }

    out
}

fn scan_gantt_line(out: &mut SourceScan, line: &str, first: &str) {
    if RESERVED.contains(&first) || !line.contains(':') {
        return;
    }
    if let Some(task) = line.split(':').next() {
        out.add_node(task.trim());
    }
    out.edge_count += line.matches("after ").count();
}

fn scan_graph_line(out: &mut SourceScan, line: &str, first: &str) {
    if RESERVED.contains(&first) {
        return;
    }
    if matches!(first, "participant" | "actor" | "class" | "state") {
        let rest = line[first.len()..].trim();
        // `participant A as Alice` declares A; `state "Long name" as Id` declares Id.
        let target = match first {
            "participant" | "actor" => rest.split(" as ").next(),
            _ => rest.rsplit(" as ").next(),
        }
        .unwrap_or(rest);
        if let Some(id) = node_id(target) {
            out.add_node(id);
        }
        return;
    }

    let segments = split_arrows(line);
    out.edge_count += segments.len().saturating_sub(1);
    for segment in segments {
        if let Some(id) = node_id(segment) {
            out.add_node(id);
            let after = strip_edge_label(segment.trim())
                .trim_start_matches(|c: char| !is_ident(c) && c != '[')
                .get(id.len()..)
                .unwrap_or_default();
            if after.starts_with(['[', '(', '{', '>']) {
                out.labeled.insert(id.to_string());
            }
        }
    }
}

fn is_ident(c: char) -> bool {
    c.is_alphanumeric() || c == '_'
}

fn is_arrow_char(c: char) -> bool {
    matches!(c, '-' | '=' | '.' | '<' | '>' | '|' | '*')
}

fn is_arrow(run: &str) -> bool {
    run.contains("--") || run.contains("==") || run.contains("..") || run.contains("->")
}

/// Split a line into the segments between arrow tokens.
///
/// Arrows inside brackets or quotes are ignored, so labels such as
/// `A[Loading...]` stay intact.
#[must_use]
pub fn split_arrows(line: &str) -> Vec<&str> {
    let bytes = line.as_bytes();
    let mut segments = Vec::new();
    let mut depth = 0usize;
    let mut in_quotes = false;
    let mut start = 0;
    let mut i = 0;

    while i < bytes.len() {
        let c = char::from(bytes[i]);
        if c == '"' {
            in_quotes = !in_quotes;
            i += 1;
            continue;
        }
        if in_quotes {
            i += 1;
            continue;
        }
        match c {
            '[' | '(' | '{' => {
                depth += 1;
                i += 1;
                continue;
            }
            ']' | ')' | '}' => {
                depth = depth.saturating_sub(1);
                i += 1;
                continue;
            }
            _ => {}
        }

        // A leading `|` belongs to an edge label, not an arrow.
        if depth == 0 && is_arrow_char(c) && c != '|' {
            let mut run_end = bytes[i..]
                .iter()
                .position(|b| !is_arrow_char(char::from(*b)))
                .map_or(bytes.len(), |p| i + p);
            // `-->|label|`: the pipe opens a label unless it is ER cardinality.
            if run_end > i + 1
                && bytes[run_end - 1] == b'|'
                && !matches!(bytes.get(run_end), Some(b'{' | b'}'))
            {
                run_end -= 1;
            }
            let run = &line[i..run_end];
            if is_arrow(run) {
                // ER cardinality on the left: `||--`, `|o--`, `}|..`, `}o--`.
                let arrow_start = if i >= 2
                    && matches!(&bytes[i - 2..i], b"||" | b"|o" | b"}|" | b"}o")
                {
                    i - 2
                } else {
                    i
                };
                let mut end = run_end;
                // Arrow heads: `--x`, `--o`, `-)`, ER cardinality `o{`.
                if let Some(&next) = bytes.get(end) {
                    let next = char::from(next);
                    let after = bytes.get(end + 1).map(|b| char::from(*b));
                    if (next == 'x' || next == 'o') && !after.is_some_and(is_ident) {
                        end += 1;
                    } else if next == ')' && run.ends_with('-') {
                        end += 1;
                    }
                }
                while bytes.get(end).is_some_and(|b| matches!(b, b'{' | b'}' | b'|')) {
                    // `|label|` after an arrow is kept with the next segment.
                    if bytes[end] == b'|' {
                        break;
                    }
                    end += 1;
                }
                segments.push(&line[start..arrow_start]);
                start = end;
                i = end;
                continue;
            }
            i = run_end;
            continue;
        }
        i += 1;
    }
    segments.push(&line[start..]);
    segments
}

fn strip_edge_label(segment: &str) -> &str {
    if let Some(rest) = segment.strip_prefix('|') {
        rest.find('|').map_or(rest, |end| &rest[end + 1..])
    } else {
        segment
    }
}

/// Leading node identifier of a segment, if any.
#[must_use]
pub fn node_id(segment: &str) -> Option<&str> {
    let segment = strip_edge_label(segment.trim()).trim();
    if segment.starts_with("[*]") {
        return Some("[*]");
    }
    let start = segment.find(is_ident)?;
    // Refuse identifiers that start inside a label, e.g. `["text"]`.
    if segment[..start].contains(['[', '(', '{', '"']) {
        return None;
    }
    let rest = &segment[start..];
    let end = rest.find(|c: char| !is_ident(c)).unwrap_or(rest.len());
    Some(&rest[..end])
}

/// Whether a line ends in an arrow with no target.
#[must_use]
pub fn has_dangling_arrow(line: &str) -> bool {
    let segments = split_arrows(line);
    segments.len() > 1 && segments.last().is_some_and(|s| s.trim().is_empty())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_split_simple_edge() {
        assert_eq!(split_arrows("A --> B"), vec!["A ", " B"]);
        assert_eq!(split_arrows("A-->B-->C").len(), 3);
    }

    #[test]
    fn test_arrow_inside_label_ignored() {
        assert_eq!(split_arrows("A[Loading...] --> B").len(), 2);
        assert_eq!(split_arrows("A[\"a --> b\"]").len(), 1);
    }

    #[test]
    fn test_edge_label_kept_with_target() {
        let segments = split_arrows("A -->|yes| B");
        assert_eq!(segments.len(), 2);
        assert_eq!(node_id(segments[1]), Some("B"));
    }

    #[test]
    fn test_sequence_message() {
        let segments = split_arrows("Alice->>Bob: hello");
        assert_eq!(node_id(segments[0]), Some("Alice"));
        assert_eq!(node_id(segments[1]), Some("Bob"));
    }

    #[test]
    fn test_er_relationship() {
        let segments = split_arrows("CUSTOMER ||--o{ ORDER : places");
        assert_eq!(segments.len(), 2);
        assert_eq!(node_id(segments[1]), Some("ORDER"));
    }

    #[test]
    fn test_er_cardinality_excluded_from_segments() {
        assert_eq!(
            split_arrows("CUSTOMER ||--o{ ORDER : places"),
            vec!["CUSTOMER ", " ORDER : places"]
        );
        assert_eq!(
            split_arrows("ORDER }|..|{ LINE_ITEM : contains"),
            vec!["ORDER ", " LINE_ITEM : contains"]
        );
        let segments = split_arrows("PERSON }o--o| ADDRESS : lives");
        assert_eq!(segments[0], "PERSON ");
        assert_eq!(node_id(segments[1]), Some("ADDRESS"));
    }

    #[test]
    fn test_scan_flowchart() {
        let scan = scan("flowchart TD\n    A[Start] --> B{Ok?}\n    B -->|yes| C\n    B -->|no| A\n");
        assert_eq!(scan.kind, DiagramKind::Flowchart);
        assert_eq!(scan.nodes, vec!["A", "B", "C"]);
        assert_eq!(scan.edge_count, 3);
        assert!(scan.has_direction);
        assert_eq!(scan.unlabeled(), vec!["C"]);
    }

    #[test]
    fn test_scan_state_diagram() {
        let scan = scan("stateDiagram-v2\n    [*] --> Idle\n    Idle --> Busy\n    Busy --> [*]\n");
        assert_eq!(scan.kind, DiagramKind::State);
        assert_eq!(scan.node_count(), 3);
        assert_eq!(scan.edge_count, 3);
    }

    #[test]
    fn test_scan_skips_comments_and_blank_lines() {
        let scan = scan("%% intro\n\nsequenceDiagram\n    participant A\n    A->>B: hi\n");
        assert_eq!(scan.header.as_ref().map(|(n, _)| *n), Some(3));
        assert!(scan.has_comments);
        assert_eq!(scan.nodes, vec!["A", "B"]);
    }

    #[test]
    fn test_scan_gantt_dependencies() {
        let scan = scan(
            "gantt\n    dateFormat YYYY-MM-DD\n    section Build\n    Compile :a1, 2024-01-01, 1d\n    Test :a2, after a1, 1d\n",
        );
        assert_eq!(scan.node_count(), 2);
        assert_eq!(scan.edge_count, 1);
    }

    #[test]
    fn test_dangling_arrow() {
        assert!(has_dangling_arrow("A -->"));
        assert!(!has_dangling_arrow("A --> B"));
        assert!(!has_dangling_arrow("A[text]"));
    }

    #[test]
    fn test_subgraph_nesting() {
        let scan = scan("flowchart LR\n subgraph one\n subgraph two\n a-->b\n end\n end\n");
        assert_eq!(scan.subgraph_count, 2);
        assert_eq!(scan.max_nesting, 2);
    }
}
