//! Markdown parser adapter over comrak
//!
//! comrak produces an arena-allocated AST with rich node values. The
//! segmenter only needs node kinds, line positions and children, so this
//! module converts the arena into an owned, closed `MdNode` tree.

use comrak::{
    nodes::{AstNode, ListDelimType, ListType as ComrakListType, NodeValue},
    parse_document, Arena, Options,
};

// ─────────────────────────────────────────────────────────────────────────────
// Parser Options
// ─────────────────────────────────────────────────────────────────────────────

/// Configuration options for markdown parsing.
#[derive(Debug, Clone)]
pub struct MarkdownOptions {
    /// Enable GitHub Flavored Markdown tables
    pub tables: bool,
    /// Enable strikethrough syntax (~~text~~)
    pub strikethrough: bool,
    /// Enable autolink URLs and emails
    pub autolink: bool,
    /// Enable task lists (- [ ] and - [x])
    pub tasklist: bool,
    /// Enable footnotes
    pub footnotes: bool,
    /// Enable `$...$` and `$$...$$` math
    pub math_dollars: bool,
    /// Enable math in code spans (`` $`...`$ ``)
    pub math_code: bool,
    /// Front matter delimiter (`---` by default; `None` disables front matter)
    pub front_matter_delimiter: Option<String>,
    /// Convert quotes and dashes to typographic punctuation
    pub smart: bool,
}

impl Default for MarkdownOptions {
    fn default() -> Self {
        Self {
            tables: true,
            strikethrough: true,
            autolink: true,
            tasklist: true,
            footnotes: true,
            math_dollars: true,
            math_code: true,
            front_matter_delimiter: Some("---".to_string()),
            smart: true,
        }
    }
}

impl MarkdownOptions {
    /// Convert to comrak Options.
    fn to_comrak_options(&self) -> Options {
        let mut options = Options::default();

        options.extension.strikethrough = self.strikethrough;
        options.extension.table = self.tables;
        options.extension.autolink = self.autolink;
        options.extension.tasklist = self.tasklist;
        options.extension.footnotes = self.footnotes;
        options.extension.math_dollars = self.math_dollars;
        options.extension.math_code = self.math_code;
        options.extension.front_matter_delimiter = self.front_matter_delimiter.clone();
        options.parse.smart = self.smart;

        options
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// AST Types
// ─────────────────────────────────────────────────────────────────────────────

/// Inclusive, 1-indexed line range in the source document.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct LineSpan {
    pub start: usize,
    pub end: usize,
}

impl LineSpan {
    pub fn new(start: usize, end: usize) -> Self {
        Self { start, end }
    }

    /// A span covering exactly one line.
    pub fn single(line: usize) -> Self {
        Self::new(line, line)
    }

    /// Number of lines in the span.
    pub fn len(&self) -> usize {
        self.end + 1 - self.start
    }

    /// Whether the span is usable: starts at line 1 or later and does not run backwards.
    pub fn is_valid(&self) -> bool {
        self.start >= 1 && self.end >= self.start
    }

    pub fn is_multiline(&self) -> bool {
        self.end > self.start
    }
}

/// List marker style
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ListType {
    Bullet,
    Ordered { start: usize, delimiter: char },
}

/// Kind of a markdown node, as far as block segmentation and preview care.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum NodeKind {
    /// Document root
    Root,
    /// List container
    List { list_type: ListType },
    /// List item
    ListItem,
    /// Task list item (- [ ] and - [x])
    TaskItem { checked: bool },
    /// Block quote (>)
    BlockQuote,
    /// Paragraph
    Paragraph,
    /// ATX or setext heading
    Heading { level: u8 },
    /// GFM table
    Table,
    /// Table row; the first row of a table is the header
    TableRow { header: bool },
    /// Table cell
    TableCell,
    /// Fenced or indented code block (`info` is empty for indented code)
    Code { info: String, literal: String },
    /// Raw HTML block
    Html,
    /// Math span (`$$...$$` display math is reported as `display: true`)
    Math { display: bool, literal: String },
    /// Front matter between `front_matter_delimiter` lines
    FrontMatter,
    /// Footnote definition
    FootnoteDefinition,
    /// Horizontal rule
    ThematicBreak,
    /// Literal text (plain text and inline code)
    Text(String),
    /// Soft or hard line break
    Break,
    /// Anything the segmenter treats as an opaque leaf
    Other,
}

/// A node in the markdown AST.
#[derive(Debug, Clone, PartialEq)]
pub struct MdNode {
    pub kind: NodeKind,
    /// Source line range; `None` when the parser gave no usable position
    pub position: Option<LineSpan>,
    pub children: Vec<MdNode>,
}

impl MdNode {
    pub fn new(kind: NodeKind, position: Option<LineSpan>) -> Self {
        Self {
            kind,
            position,
            children: Vec::new(),
        }
    }

    /// Attach children, builder style.
    pub fn with_children(mut self, children: Vec<MdNode>) -> Self {
        self.children = children;
        self
    }

    /// Get all text content from this node and its descendants.
    pub fn text_content(&self) -> String {
        let mut text = String::new();
        let mut stack = vec![self];
        while let Some(node) = stack.pop() {
            match &node.kind {
                NodeKind::Text(t) => text.push_str(t),
                NodeKind::Math { literal, .. } => text.push_str(literal),
                NodeKind::Break => text.push(' '),
                _ => {}
            }
            stack.extend(node.children.iter().rev());
        }
        text
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Public API Functions
// ─────────────────────────────────────────────────────────────────────────────

/// Parse markdown text into an AST with default options.
///
/// comrak accepts any input, so parsing cannot fail.
pub fn parse_markdown(markdown: &str) -> MdNode {
    parse_markdown_with_options(markdown, &MarkdownOptions::default())
}

/// Parse markdown text with custom options.
pub fn parse_markdown_with_options(markdown: &str, options: &MarkdownOptions) -> MdNode {
    let arena = Arena::new();
    let comrak_options = options.to_comrak_options();
    let root = parse_document(&arena, markdown, &comrak_options);
    convert_tree(root)
}

/// Render markdown to an HTML fragment with the default options.
pub fn render_html(markdown: &str) -> String {
    comrak::markdown_to_html(markdown, &MarkdownOptions::default().to_comrak_options())
}

// ─────────────────────────────────────────────────────────────────────────────
// Internal Conversion Functions
// ─────────────────────────────────────────────────────────────────────────────

/// A partially converted node whose children are still being visited.
struct Frame<'a> {
    node: MdNode,
    pending: std::vec::IntoIter<&'a AstNode<'a>>,
}

impl<'a> Frame<'a> {
    fn enter(source: &'a AstNode<'a>) -> Self {
        Self {
            node: convert_node(source),
            pending: source.children().collect::<Vec<_>>().into_iter(),
        }
    }
}

/// Convert the comrak tree with an explicit stack so nesting depth is bounded
/// by heap, not by the call stack.
fn convert_tree<'a>(root: &'a AstNode<'a>) -> MdNode {
    let mut stack = vec![Frame::enter(root)];
    loop {
        let next_child = stack.last_mut().and_then(|frame| frame.pending.next());
        if let Some(child) = next_child {
            stack.push(Frame::enter(child));
            continue;
        }

        let Some(done) = stack.pop() else {
            return MdNode::new(NodeKind::Root, None);
        };
        match stack.last_mut() {
            Some(parent) => parent.node.children.push(done.node),
            None => return done.node,
        }
    }
}

/// Convert a single comrak node (without children).
fn convert_node<'a>(node: &'a AstNode<'a>) -> MdNode {
    let ast = node.data.borrow();
    let sourcepos = ast.sourcepos;
    let span = LineSpan::new(sourcepos.start.line, sourcepos.end.line);
    let position = span.is_valid().then_some(span);

    MdNode::new(convert_node_value(&ast.value), position)
}

fn convert_node_value(value: &NodeValue) -> NodeKind {
    match value {
        NodeValue::Document => NodeKind::Root,
        NodeValue::List(list) => NodeKind::List {
            list_type: match list.list_type {
                ComrakListType::Bullet => ListType::Bullet,
                ComrakListType::Ordered => ListType::Ordered {
                    start: list.start,
                    delimiter: if list.delimiter == ListDelimType::Period {
                        '.'
                    } else {
                        ')'
                    },
                },
            },
        },
        NodeValue::Item(_) => NodeKind::ListItem,
        NodeValue::TaskItem(checked) => NodeKind::TaskItem {
            checked: checked.is_some_and(|c| c == 'x' || c == 'X'),
        },
        NodeValue::BlockQuote => NodeKind::BlockQuote,
        NodeValue::Paragraph => NodeKind::Paragraph,
        NodeValue::Heading(heading) => NodeKind::Heading {
            level: heading.level,
        },
        NodeValue::Table(_) => NodeKind::Table,
        NodeValue::TableRow(header) => NodeKind::TableRow { header: *header },
        NodeValue::TableCell => NodeKind::TableCell,
        NodeValue::CodeBlock(code) => NodeKind::Code {
            info: code.info.clone(),
            literal: code.literal.clone(),
        },
        NodeValue::HtmlBlock(_) => NodeKind::Html,
        NodeValue::Math(math) => NodeKind::Math {
            display: math.display_math,
            literal: math.literal.clone(),
        },
        NodeValue::FrontMatter(_) => NodeKind::FrontMatter,
        NodeValue::FootnoteDefinition(_) => NodeKind::FootnoteDefinition,
        NodeValue::ThematicBreak => NodeKind::ThematicBreak,
        NodeValue::Text(text) => NodeKind::Text(text.clone()),
        NodeValue::Code(code) => NodeKind::Text(code.literal.clone()),
        NodeValue::SoftBreak | NodeValue::LineBreak => NodeKind::Break,
        _ => NodeKind::Other,
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────────────────────────────────────
