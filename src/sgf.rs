//! Branching game record with SGF serialization.
//!
//! The record is a tree of [`GameNode`]s stored in an arena. The mainline is
//! the path from the root to the current frontier; variations hang off
//! mainline nodes as extra children. Each node owns its children by id and
//! refers back to its parent by id, which is only used for upward walks.
//!
//! A variation requested from the live frontier cannot be attached right
//! away: the mainline continuation must remain the first child of every
//! node. Such branches wait in [`Attachment::PendingAttachAt`] until the
//! next mainline move is appended below their origin.

use std::collections::BTreeMap;

use tracing::debug;

use crate::board::{Color, Point};
use crate::constants::{N, SETUP_COMMENT, SGF_HEADER};
use crate::error::TreeError;

/// Index of a node in the tree arena.
pub type NodeId = usize;

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum NodeKind {
    /// A numbered move.
    Move(Color),
    /// A placeholder for a position that was set up rather than played.
    Setup(String),
}

/// Whether a node is reachable from its parent's children.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Attachment {
    Detached,
    /// Waiting for the mainline to continue below this origin node.
    PendingAttachAt(NodeId),
    Attached,
}

#[derive(Clone, Debug)]
pub struct GameNode {
    kind: NodeKind,
    point: Option<Point>,
    move_number: usize,
    /// Stones of the enclosing variation so far, with their 1-based order.
    labels: Vec<(Point, usize)>,
    parent: Option<NodeId>,
    children: Vec<NodeId>,
    attachment: Attachment,
}

impl GameNode {
    fn new(kind: NodeKind, point: Option<Point>, move_number: usize) -> Self {
        Self {
            kind,
            point,
            move_number,
            labels: Vec::new(),
            parent: None,
            children: Vec::new(),
            attachment: Attachment::Detached,
        }
    }

    pub fn kind(&self) -> &NodeKind {
        &self.kind
    }

    pub fn point(&self) -> Option<Point> {
        self.point
    }

    pub fn move_number(&self) -> usize {
        self.move_number
    }

    pub fn labels(&self) -> &[(Point, usize)] {
        &self.labels
    }

    pub fn parent(&self) -> Option<NodeId> {
        self.parent
    }

    pub fn children(&self) -> &[NodeId] {
        &self.children
    }

    pub fn attachment(&self) -> Attachment {
        self.attachment
    }

    /// Properties of this node, without the leading `;`.
    fn to_sgf(&self) -> String {
        match &self.kind {
            NodeKind::Setup(comment) => format!("C[{comment}]"),
            NodeKind::Move(color) => {
                let mut s = format!(
                    "{}[{}]",
                    move_tag(*color),
                    self.point.map(encode_point).unwrap_or_default()
                );
                if !self.labels.is_empty() {
                    s.push_str("LB");
                    for &(pt, order) in &self.labels {
                        s.push_str(&format!("[{}:{order}]", encode_point(pt)));
                    }
                }
                s
            }
        }
    }
}

fn move_tag(color: Color) -> &'static str {
    match color {
        Color::Black => "B",
        Color::White => "W",
    }
}

fn setup_tag(color: Color) -> &'static str {
    match color {
        Color::Black => "AB",
        Color::White => "AW",
    }
}

/// Encode a point as two lowercase letters, column then row.
pub fn encode_point(pt: Point) -> String {
    let col = (b'a' + pt.0 as u8) as char;
    let row = (b'a' + pt.1 as u8) as char;
    format!("{col}{row}")
}

/// Decode a two-letter SGF coordinate.
pub fn decode_point(s: &str) -> Option<Point> {
    let bytes = s.as_bytes();
    if bytes.len() != 2 {
        return None;
    }
    let col = bytes[0].checked_sub(b'a')? as usize;
    let row = bytes[1].checked_sub(b'a')? as usize;
    (col < N && row < N).then_some((col, row))
}

/// Extract the `B[..]` and `W[..]` moves of a record, in document order.
///
/// Setup (`AB`/`AW`) and label (`LB`) properties are skipped.
pub fn parse_moves(text: &str) -> Vec<(Point, Color)> {
    let mut moves = Vec::new();
    let mut ident = String::new();
    let mut chars = text.chars();
    while let Some(c) = chars.next() {
        match c {
            'A'..='Z' => ident.push(c),
            '[' => {
                let mut value = String::new();
                while let Some(v) = chars.next() {
                    match v {
                        '\\' => value.extend(chars.next()),
                        ']' => break,
                        _ => value.push(v),
                    }
                }
                let color = match ident.as_str() {
                    "B" => Some(Color::Black),
                    "W" => Some(Color::White),
                    _ => None,
                };
                if let (Some(color), Some(pt)) = (color, decode_point(&value)) {
                    moves.push((pt, color));
                }
                // Further values of the same property keep the identifier.
                if !ident.is_empty() {
                    ident.clear();
                    ident.push('_');
                }
            }
            _ => ident.clear(),
        }
    }
    moves
}

/// The record of one game: mainline, variations and initial position.
#[derive(Clone, Debug)]
pub struct GameTree {
    nodes: Vec<GameNode>,
    root: Option<NodeId>,
    current: Option<NodeId>,
    move_count: usize,
    setup: Vec<(Point, Color)>,
    /// Detached branch heads, keyed by origin node, in request order.
    pending: BTreeMap<NodeId, Vec<NodeId>>,
    /// Serialized mainline without the closing parenthesis.
    record: String,
}

impl Default for GameTree {
    fn default() -> Self {
        Self::new()
    }
}

impl GameTree {
    pub fn new() -> Self {
        Self::with_setup(Vec::new())
    }

    /// A tree whose initial position holds the given setup stones.
    pub fn with_setup(setup: Vec<(Point, Color)>) -> Self {
        let mut tree = Self {
            nodes: Vec::new(),
            root: None,
            current: None,
            move_count: 0,
            setup,
            pending: BTreeMap::new(),
            record: String::new(),
        };
        tree.rebuild_record();
        tree
    }

    pub fn move_count(&self) -> usize {
        self.move_count
    }

    pub fn root(&self) -> Option<NodeId> {
        self.root
    }

    /// The mainline frontier.
    pub fn current(&self) -> Option<NodeId> {
        self.current
    }

    pub fn setup(&self) -> &[(Point, Color)] {
        &self.setup
    }

    pub fn node(&self, id: NodeId) -> Option<&GameNode> {
        self.nodes.get(id)
    }

    pub fn pending_count(&self) -> usize {
        self.pending.values().map(Vec::len).sum()
    }

    fn push_node(&mut self, node: GameNode) -> NodeId {
        self.nodes.push(node);
        self.nodes.len() - 1
    }

    fn link(&mut self, parent: NodeId, child: NodeId) {
        self.nodes[parent].children.push(child);
        self.nodes[child].parent = Some(parent);
        self.nodes[child].attachment = Attachment::Attached;
    }

    /// Append a move to the mainline.
    pub fn add_move(&mut self, pt: Point, color: Color) -> NodeId {
        let id = self.push_node(GameNode::new(
            NodeKind::Move(color),
            Some(pt),
            self.move_count + 1,
        ));
        let previous = self.current;
        match previous {
            Some(parent) => self.link(parent, id),
            None => {
                self.nodes[id].attachment = Attachment::Attached;
                self.root = Some(id);
            }
        }
        self.current = Some(id);
        self.move_count += 1;

        self.record.push(';');
        self.record.push_str(&self.nodes[id].to_sgf());

        if let Some(origin) = previous {
            self.attach_pending(origin);
        }
        id
    }

    fn attach_pending(&mut self, origin: NodeId) {
        if let Some(heads) = self.pending.remove(&origin) {
            for head in heads {
                debug!(origin, head, "attaching pending variation");
                self.nodes[origin].children.push(head);
                self.nodes[head].attachment = Attachment::Attached;
            }
        }
    }

    /// Most recent node on the mainline path whose move number is at most
    /// `move_number`.
    pub fn find_node(&self, move_number: usize) -> Option<NodeId> {
        let mut cursor = self.current;
        while let Some(id) = cursor {
            if self.nodes[id].move_number <= move_number {
                return Some(id);
            }
            cursor = self.nodes[id].parent;
        }
        None
    }

    /// Branch `moves` off the mainline after move `from_move_number`.
    ///
    /// Returns the terminal node of the new branch. A branch starting at or
    /// beyond the frontier stays pending until the mainline moves on.
    pub fn add_variation(
        &mut self,
        moves: &[(Point, Color)],
        from_move_number: usize,
    ) -> Result<NodeId, TreeError> {
        if moves.is_empty() {
            return Err(TreeError::EmptyVariation);
        }
        let (origin, pending) = if from_move_number >= self.move_count {
            (self.current, true)
        } else {
            (self.find_node(from_move_number), false)
        };
        let origin = match origin {
            Some(id) => id,
            None => self.insert_placeholder(from_move_number),
        };
        Ok(self.add_variation_from_node(moves, origin, pending))
    }

    /// Give the tree a setup node to branch from when no mainline node
    /// covers `move_number`.
    fn insert_placeholder(&mut self, move_number: usize) -> NodeId {
        let id = self.push_node(GameNode::new(
            NodeKind::Setup(SETUP_COMMENT.to_string()),
            None,
            move_number,
        ));
        self.nodes[id].attachment = Attachment::Attached;
        match self.root {
            None => self.current = Some(id),
            Some(old_root) => self.link(id, old_root),
        }
        self.root = Some(id);
        debug!(node = id, move_number, "inserted setup placeholder");
        self.rebuild_record();
        id
    }

    fn add_variation_from_node(
        &mut self,
        moves: &[(Point, Color)],
        origin: NodeId,
        pending: bool,
    ) -> NodeId {
        let (head, terminal) = self.build_chain(moves, origin);
        if pending {
            self.nodes[head].parent = Some(origin);
            self.nodes[head].attachment = Attachment::PendingAttachAt(origin);
            self.pending.entry(origin).or_default().push(head);
            debug!(origin, head, "variation pending");
        } else {
            self.link(origin, head);
        }
        terminal
    }

    /// Create a detached straight line of nodes continuing `from`.
    /// Returns `(head, terminal)`.
    fn build_chain(&mut self, moves: &[(Point, Color)], from: NodeId) -> (NodeId, NodeId) {
        let base = &self.nodes[from];
        let mut number = base.move_number;
        // Mainline and setup nodes carry no labels, so a fresh branch
        // numbers its stones from 1 and an extension continues its own count.
        let mut labels = base.labels.clone();
        let mut head = None;
        let mut previous = from;
        for &(pt, color) in moves {
            number += 1;
            labels.push((pt, labels.len() + 1));
            let mut node = GameNode::new(NodeKind::Move(color), Some(pt), number);
            node.labels = labels.clone();
            let id = self.push_node(node);
            match head {
                None => head = Some(id),
                Some(_) => self.link(previous, id),
            }
            previous = id;
        }
        (head.unwrap_or(from), previous)
    }

    /// Append `moves` below the terminal node of an existing variation.
    pub fn extend_variation(
        &mut self,
        terminal: NodeId,
        moves: &[(Point, Color)],
    ) -> Result<NodeId, TreeError> {
        if terminal >= self.nodes.len() {
            return Err(TreeError::UnknownNode(terminal));
        }
        if moves.is_empty() {
            return Err(TreeError::EmptyVariation);
        }
        let (head, end) = self.build_chain(moves, terminal);
        self.link(terminal, head);
        Ok(end)
    }

    fn setup_text(&self) -> String {
        self.setup
            .iter()
            .map(|&(pt, color)| format!(";{}[{}]", setup_tag(color), encode_point(pt)))
            .collect()
    }

    /// Nodes from the root down to `id`, following parent links.
    fn path_to(&self, id: NodeId) -> Vec<NodeId> {
        let mut path = vec![id];
        let mut cursor = self.nodes[id].parent;
        while let Some(parent) = cursor {
            path.push(parent);
            cursor = self.nodes[parent].parent;
        }
        path.reverse();
        path
    }

    fn rebuild_record(&mut self) {
        let mut record = format!("{SGF_HEADER}{}", self.setup_text());
        if let Some(current) = self.current {
            for id in self.path_to(current) {
                record.push(';');
                record.push_str(&self.nodes[id].to_sgf());
            }
        }
        self.record = record;
    }

    /// The mainline as a complete record.
    pub fn serialize_mainline(&self) -> String {
        format!("{})", self.record)
    }

    /// A standalone record of the path from the root to `terminal`.
    pub fn branch_text(&self, terminal: NodeId) -> Result<String, TreeError> {
        if terminal >= self.nodes.len() {
            return Err(TreeError::UnknownNode(terminal));
        }
        let mut text = format!("{SGF_HEADER}{}", self.setup_text());
        for id in self.path_to(terminal) {
            text.push(';');
            text.push_str(&self.nodes[id].to_sgf());
        }
        text.push(')');
        Ok(text)
    }

    /// The whole attached tree, with every sibling branch in parentheses.
    pub fn serialize_tree(&self) -> String {
        let mut text = format!("{SGF_HEADER}{}", self.setup_text());
        if let Some(root) = self.root {
            self.render_sequence(root, &mut text);
        }
        text.push(')');
        text
    }

    fn render_sequence(&self, start: NodeId, out: &mut String) {
        let mut id = start;
        loop {
            let node = &self.nodes[id];
            out.push(';');
            out.push_str(&node.to_sgf());
            match node.children.as_slice() {
                [] => break,
                [only] => id = *only,
                children => {
                    for &child in children {
                        out.push('(');
                        self.render_sequence(child, out);
                        out.push(')');
                    }
                    break;
                }
            }
        }
    }
}
