//! Atom classification over the markdown AST
//!
//! Decides, node by node, whether a node is a container to descend into, an
//! opaque unit that must stay whole, or text that can be broken per line.

use super::atom::Atom;
use super::formula::fill_gap;
use super::lines::LineIndex;
use crate::document::BlockKind;
use crate::markdown::{MdNode, NodeKind};

/// How the segmenter treats a node kind.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NodeClass {
    /// Descend into children; never an atom itself
    Container,
    /// Always one atom over the node's range; splitting would break syntax
    Atomic(BlockKind),
    /// Multi-line ranges are exploded per line (formula spans kept whole)
    Splittable(BlockKind),
    /// Any other node: one atom over its range
    Leaf,
}

/// Classify a node kind.
pub fn node_class(kind: &NodeKind) -> NodeClass {
    match kind {
        NodeKind::Root
        | NodeKind::List { .. }
        | NodeKind::ListItem
        | NodeKind::TaskItem { .. }
        | NodeKind::BlockQuote => NodeClass::Container,
        NodeKind::Table => NodeClass::Atomic(BlockKind::Table),
        NodeKind::Code { .. } => NodeClass::Atomic(BlockKind::Code),
        NodeKind::Html => NodeClass::Atomic(BlockKind::Html),
        NodeKind::Math { .. } => NodeClass::Atomic(BlockKind::Math),
        NodeKind::FrontMatter => NodeClass::Atomic(BlockKind::FrontMatter),
        NodeKind::FootnoteDefinition => NodeClass::Atomic(BlockKind::FootnoteDefinition),
        NodeKind::ThematicBreak => NodeClass::Atomic(BlockKind::ThematicBreak),
        NodeKind::Paragraph => NodeClass::Splittable(BlockKind::Paragraph),
        NodeKind::Heading { .. } => NodeClass::Splittable(BlockKind::Heading),
        // Rows and cells only occur under an atomic table
        NodeKind::TableRow { .. }
        | NodeKind::TableCell
        | NodeKind::Text(_)
        | NodeKind::Break
        | NodeKind::Other => NodeClass::Leaf,
    }
}

/// Collect atoms from the tree rooted at `root`, in document order.
///
/// Uses an explicit worklist so deeply nested lists and quotes cannot exhaust
/// the call stack. Nodes without a usable position are dropped.
pub fn classify(root: &MdNode, lines: &LineIndex) -> Vec<Atom> {
    let mut atoms = Vec::new();
    let mut worklist: Vec<&MdNode> = vec![root];

    while let Some(node) = worklist.pop() {
        let class = node_class(&node.kind);
        if class == NodeClass::Container {
            worklist.extend(node.children.iter().rev());
            continue;
        }

        let Some(span) = node.position.filter(|span| span.is_valid()) else {
            continue;
        };

        match class {
            NodeClass::Atomic(kind) => atoms.push(Atom::new(span, kind)),
            NodeClass::Splittable(_) if span.is_multiline() => {
                atoms.extend(fill_gap(lines, span));
            }
            NodeClass::Splittable(kind) => atoms.push(Atom::new(span, kind)),
            NodeClass::Leaf => atoms.push(Atom::new(span, BlockKind::Other)),
            NodeClass::Container => {}
        }
    }

    atoms
}

// ─────────────────────────────────────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use crate::markdown::{parse_markdown, LineSpan};

    fn classify_text(text: &str) -> Vec<Atom> {
        let lines = LineIndex::new(text);
        classify(&parse_markdown(text), &lines)
    }

    fn code(info: &str) -> NodeKind {
        NodeKind::Code {
            info: info.to_string(),
            literal: String::new(),
        }
    }

    fn ranges(atoms: &[Atom]) -> Vec<(usize, usize)> {
        atoms.iter().map(|a| (a.span.start, a.span.end)).collect()
    }

    #[test]
    fn test_node_class_table() {
        assert_eq!(node_class(&NodeKind::Root), NodeClass::Container);
        assert_eq!(node_class(&NodeKind::ListItem), NodeClass::Container);
        assert_eq!(node_class(&NodeKind::BlockQuote), NodeClass::Container);
        assert_eq!(
            node_class(&NodeKind::TaskItem { checked: true }),
            NodeClass::Container
        );
        assert_eq!(
            node_class(&code("rust")),
            NodeClass::Atomic(BlockKind::Code)
        );
        assert_eq!(
            node_class(&NodeKind::FrontMatter),
            NodeClass::Atomic(BlockKind::FrontMatter)
        );
        assert_eq!(
            node_class(&NodeKind::Heading { level: 2 }),
            NodeClass::Splittable(BlockKind::Heading)
        );
        assert_eq!(node_class(&NodeKind::Other), NodeClass::Leaf);
    }

    #[test]
    fn test_multiline_paragraph_exploded() {
        let atoms = classify_text("one\ntwo\nthree");
        assert_eq!(ranges(&atoms), vec![(1, 1), (2, 2), (3, 3)]);
        assert!(atoms.iter().all(|a| a.kind == BlockKind::Line));
    }

    #[test]
    fn test_single_line_paragraph_keeps_kind() {
        let atoms = classify_text("# Title\n\nbody");
        assert_eq!(atoms[0].kind, BlockKind::Heading);
        assert_eq!(atoms[1].kind, BlockKind::Paragraph);
    }

    #[test]
    fn test_code_block_is_atomic() {
        let atoms = classify_text("```\na\n\nb\n```");
        assert_eq!(ranges(&atoms), vec![(1, 5)]);
        assert_eq!(atoms[0].kind, BlockKind::Code);
    }

    #[test]
    fn test_task_items_recursed() {
        let atoms = classify_text("- [x] a\n- [ ] b");
        assert_eq!(ranges(&atoms), vec![(1, 1), (2, 2)]);
    }

    #[test]
    fn test_list_items_recursed() {
        let atoms = classify_text("- a\n- b\n  - c");
        assert_eq!(ranges(&atoms), vec![(1, 1), (2, 2), (3, 3)]);
    }

    #[test]
    fn test_formula_inside_paragraph_kept_whole() {
        let atoms = classify_text("before\n$$\nx\n$$\nafter");
        assert_eq!(ranges(&atoms), vec![(1, 1), (2, 4), (5, 5)]);
        assert_eq!(atoms[1].kind, BlockKind::Math);
    }

    #[test]
    fn test_node_without_position_dropped() {
        let lines = LineIndex::new("x");
        let root = MdNode::new(NodeKind::Root, Some(LineSpan::new(1, 1))).with_children(vec![
            MdNode::new(NodeKind::ThematicBreak, None),
            MdNode::new(NodeKind::Other, Some(LineSpan::new(1, 1))),
        ]);
        let atoms = classify(&root, &lines);
        assert_eq!(atoms, vec![Atom::new(LineSpan::new(1, 1), BlockKind::Other)]);
    }

    #[test]
    fn test_worklist_preserves_document_order() {
        let lines = LineIndex::new("a\nb\nc\nd");
        let root = MdNode::new(NodeKind::Root, None).with_children(vec![
            MdNode::new(NodeKind::BlockQuote, Some(LineSpan::new(1, 2))).with_children(vec![
                MdNode::new(NodeKind::Paragraph, Some(LineSpan::new(1, 1))),
                MdNode::new(NodeKind::Paragraph, Some(LineSpan::new(2, 2))),
            ]),
            MdNode::new(code(""), Some(LineSpan::new(3, 4))),
        ]);
        assert_eq!(ranges(&classify(&root, &lines)), vec![(1, 1), (2, 2), (3, 4)]);
    }
}
