//! Read-only view of the editor's document tree.
//!
//! The editor owns the tree; the mapper only needs a depth-first walk that
//! yields each node's kind, inline text and start position. `DocNode` is an
//! owned implementation that hosts can deserialize straight from the
//! editor's JSON (`{ "type": "paragraph", "content": [...] }`).

use serde::{Deserialize, Serialize};

// =============================================================================
// Node Kinds
// =============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum NodeKind {
    Doc,
    Paragraph,
    Heading,
    Blockquote,
    CodeBlock,
    BulletList,
    OrderedList,
    ListItem,
    Table,
    TableRow,
    TableCell,
    TableHeader,
    HardBreak,
    Text,
    Other,
}

impl NodeKind {
    /// Map an editor node type name (camelCase or snake_case) to a kind
    pub fn from_type_name(name: &str) -> Self {
        match name {
            "doc" => NodeKind::Doc,
            "paragraph" => NodeKind::Paragraph,
            "heading" => NodeKind::Heading,
            "blockquote" => NodeKind::Blockquote,
            "codeBlock" | "code_block" => NodeKind::CodeBlock,
            "bulletList" | "bullet_list" => NodeKind::BulletList,
            "orderedList" | "ordered_list" => NodeKind::OrderedList,
            "listItem" | "list_item" | "taskItem" | "task_item" => NodeKind::ListItem,
            "table" => NodeKind::Table,
            "tableRow" | "table_row" => NodeKind::TableRow,
            "tableCell" | "table_cell" => NodeKind::TableCell,
            "tableHeader" | "table_header" => NodeKind::TableHeader,
            "hardBreak" | "hard_break" => NodeKind::HardBreak,
            "text" => NodeKind::Text,
            _ => NodeKind::Other,
        }
    }

    /// Block containers whose entry starts a new line in the mirror
    pub fn is_block(self) -> bool {
        matches!(
            self,
            NodeKind::Paragraph
                | NodeKind::Heading
                | NodeKind::Blockquote
                | NodeKind::CodeBlock
                | NodeKind::BulletList
                | NodeKind::OrderedList
                | NodeKind::ListItem
                | NodeKind::Table
        )
    }

    pub fn is_table_cell(self) -> bool {
        matches!(self, NodeKind::TableCell | NodeKind::TableHeader)
    }
}

// =============================================================================
// Tree Walk
// =============================================================================

/// One visited node, in document order
#[derive(Debug, Clone, Copy)]
pub struct NodeVisit<'a> {
    pub kind: NodeKind,
    /// Inline text for text leaves
    pub text: Option<&'a str>,
    /// Structured position of the node start
    pub pos: usize,
    /// Nesting depth below the root (top-level blocks are 0)
    pub depth: usize,
}

/// Depth-first, document-order walk over the descendants of the root
pub trait DocumentTree {
    fn walk(&self, visit: &mut dyn FnMut(NodeVisit<'_>));
}

// =============================================================================
// DocNode
// =============================================================================

/// Owned document node in the editor's JSON shape
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DocNode {
    #[serde(rename = "type")]
    pub node_type: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub text: Option<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub content: Vec<DocNode>,
}

impl DocNode {
    pub fn new(node_type: &str, content: Vec<DocNode>) -> Self {
        Self {
            node_type: node_type.to_string(),
            text: None,
            content,
        }
    }

    pub fn doc(content: Vec<DocNode>) -> Self {
        Self::new("doc", content)
    }

    pub fn paragraph(content: Vec<DocNode>) -> Self {
        Self::new("paragraph", content)
    }

    pub fn text(text: &str) -> Self {
        Self {
            node_type: "text".to_string(),
            text: Some(text.to_string()),
            content: Vec::new(),
        }
    }

    pub fn hard_break() -> Self {
        Self::new("hardBreak", Vec::new())
    }

    /// Paragraph holding a single text run
    pub fn para_text(text: &str) -> Self {
        Self::paragraph(vec![Self::text(text)])
    }

    /// Table built from rows of cell strings
    pub fn table(rows: &[&[&str]]) -> Self {
        let rows = rows
            .iter()
            .map(|cells| {
                let cells = cells
                    .iter()
                    .map(|c| Self::new("tableCell", vec![Self::para_text(c)]))
                    .collect();
                Self::new("tableRow", cells)
            })
            .collect();
        Self::new("table", rows)
    }

    pub fn kind(&self) -> NodeKind {
        NodeKind::from_type_name(&self.node_type)
    }

    /// Text runs and content-less inline nodes (hard breaks, images, mentions)
    fn is_leaf(&self) -> bool {
        let kind = self.kind();
        kind == NodeKind::Text
            || (self.content.is_empty()
                && !kind.is_block()
                && !kind.is_table_cell()
                && !matches!(kind, NodeKind::Doc | NodeKind::TableRow))
    }

    /// Structured size: text length, 1 for leaves, open + content + close otherwise
    pub fn node_size(&self) -> usize {
        match self.kind() {
            NodeKind::Text => self.text.as_deref().map(|t| t.chars().count()).unwrap_or(0),
            _ if self.is_leaf() => 1,
            _ => 2 + self.content_size(),
        }
    }

    pub fn content_size(&self) -> usize {
        self.content.iter().map(DocNode::node_size).sum()
    }

    fn walk_children(&self, start: usize, depth: usize, visit: &mut dyn FnMut(NodeVisit<'_>)) {
        let mut pos = start;
        for child in &self.content {
            visit(NodeVisit {
                kind: child.kind(),
                text: child.text.as_deref(),
                pos,
                depth,
            });
            if !child.is_leaf() {
                child.walk_children(pos + 1, depth + 1, visit);
            }
            pos += child.node_size();
        }
    }
}

impl DocumentTree for DocNode {
    fn walk(&self, visit: &mut dyn FnMut(NodeVisit<'_>)) {
        // The root's content starts at position 0
        self.walk_children(0, 0, visit);
    }
}
