use std::fmt::Debug;
use std::fmt::Display;

use serde::ser::SerializeMap;
use serde::Serialize;
use serde::Serializer;

use crate::data::Token;
use crate::data::TokenType;

#[cfg(test)]
mod tests;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum NodeKind {
    If,
    Repeat,
    Read,
    Write,
    Assign,
    Id,
    Const,
    Op,
}

impl NodeKind {
    pub fn label(self) -> &'static str {
        match self {
            NodeKind::If => "if",
            NodeKind::Repeat => "repeat",
            NodeKind::Read => "read",
            NodeKind::Write => "write",
            NodeKind::Assign => "assign",
            NodeKind::Id => "id",
            NodeKind::Const => "const",
            NodeKind::Op => "op",
        }
    }

    pub fn is_terminal(self) -> bool {
        matches!(self, NodeKind::Id | NodeKind::Const | NodeKind::Op)
    }
}

impl Display for NodeKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.label())
    }
}

/// A parse tree node.
///
/// Statements of one sequence are threaded through `next` rather than held in
/// a list, so the first statement of a program is the whole program. A node
/// owns its children and its `next` statement. There is no parent pointer;
/// [`TreeNode::walk`] reports each node's parent as it goes.
///
/// Clone, comparison, `Debug` and serialization recurse into children only,
/// never along `next`, so their stack use is bounded by [`TreeNode::height`].
pub struct TreeNode {
    kind: NodeKind,
    annotation: Option<String>,
    terminal: bool,
    height: usize,
    children: Vec<TreeNode>,
    next: Option<Box<TreeNode>>,
}

impl TreeNode {
    pub fn new(kind: NodeKind, annotation: Option<String>, children: Vec<TreeNode>) -> Self {
        let height = 1 + children.iter().map(TreeNode::height).max().unwrap_or(0);
        Self {
            kind,
            annotation,
            terminal: kind.is_terminal(),
            height,
            children,
            next: None,
        }
    }

    pub fn id(name: impl Into<String>) -> Self {
        Self::new(NodeKind::Id, Some(name.into()), Vec::new())
    }

    pub fn constant(value: impl Into<String>) -> Self {
        Self::new(NodeKind::Const, Some(value.into()), Vec::new())
    }

    pub fn operator(symbol: impl Into<String>, left: TreeNode, right: TreeNode) -> Self {
        Self::new(NodeKind::Op, Some(symbol.into()), vec![left, right])
    }

    /// Leaf for an operand token, or `None` if the token is not an operand.
    pub fn operand(token: &Token) -> Option<Self> {
        match token.token_type {
            TokenType::Id => Some(Self::id(token.text.as_str())),
            TokenType::Number => Some(Self::constant(token.text.as_str())),
            _ => None,
        }
    }

    pub fn kind(&self) -> NodeKind {
        self.kind
    }

    pub fn annotation(&self) -> Option<&str> {
        self.annotation.as_deref()
    }

    pub fn is_terminal(&self) -> bool {
        self.terminal
    }

    /// Levels of children below and including this node. Following
    /// statements do not count.
    pub fn height(&self) -> usize {
        self.height
    }

    pub fn children(&self) -> &[TreeNode] {
        &self.children
    }

    pub fn child(&self, index: usize) -> Option<&TreeNode> {
        self.children.get(index)
    }

    pub fn next(&self) -> Option<&TreeNode> {
        self.next.as_deref()
    }

    /// Links `statements` into one sequence through their `next` fields and
    /// returns its head.
    pub fn chain(first: TreeNode, rest: Vec<TreeNode>) -> TreeNode {
        let mut tail: Option<Box<TreeNode>> = None;
        for mut statement in rest.into_iter().rev() {
            statement.next = tail;
            tail = Some(Box::new(statement));
        }
        let mut head = first;
        head.next = tail;
        head
    }

    /// This node and the statements that follow it.
    pub fn statements(&self) -> Statements<'_> {
        Statements { node: Some(self) }
    }

    pub fn walk(&self) -> Walk<'_> {
        Walk {
            stack: vec![Visit {
                node: self,
                parent: None,
                link: Link::Root,
                depth: 0,
            }],
        }
    }

    /// Copy of this node alone, without the statements after it.
    fn clone_node(&self) -> TreeNode {
        TreeNode {
            kind: self.kind,
            annotation: self.annotation.clone(),
            terminal: self.terminal,
            height: self.height,
            children: self.children.clone(),
            next: None,
        }
    }

    fn same_node(&self, other: &TreeNode) -> bool {
        self.kind == other.kind
            && self.annotation == other.annotation
            && self.terminal == other.terminal
            && self.children == other.children
    }

    fn serialize_fields<M: SerializeMap>(&self, map: &mut M) -> Result<(), M::Error> {
        map.serialize_entry("kind", &self.kind)?;
        if let Some(annotation) = &self.annotation {
            map.serialize_entry("annotation", annotation)?;
        }
        map.serialize_entry("terminal", &self.terminal)?;
        if !self.children.is_empty() {
            map.serialize_entry("children", &self.children)?;
        }
        Ok(())
    }

    fn describe(&self) -> String {
        match &self.annotation {
            Some(annotation) => format!("{} ({})", self.kind, annotation),
            None => self.kind.to_string(),
        }
    }
}

impl Drop for TreeNode {
    // Detach everything below into a work list so each node is dropped with
    // empty `children` and `next`.
    fn drop(&mut self) {
        let mut pending = std::mem::take(&mut self.children);
        pending.extend(self.next.take().map(|next| *next));
        while let Some(mut node) = pending.pop() {
            pending.append(&mut node.children);
            pending.extend(node.next.take().map(|next| *next));
        }
    }
}

impl Clone for TreeNode {
    fn clone(&self) -> Self {
        let rest = self.statements().skip(1).map(TreeNode::clone_node).collect();
        TreeNode::chain(self.clone_node(), rest)
    }
}

impl PartialEq for TreeNode {
    fn eq(&self, other: &Self) -> bool {
        let mut ours = self.statements();
        let mut theirs = other.statements();
        loop {
            match (ours.next(), theirs.next()) {
                (Some(a), Some(b)) if a.same_node(b) => {}
                (None, None) => return true,
                _ => return false,
            }
        }
    }
}

/// One node without the statements after it.
struct Single<'a>(&'a TreeNode);

impl Debug for Single<'_> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let node = self.0;
        f.debug_struct("TreeNode")
            .field("kind", &node.kind)
            .field("annotation", &node.annotation)
            .field("children", &node.children)
            .finish()
    }
}

impl Serialize for Single<'_> {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(None)?;
        self.0.serialize_fields(&mut map)?;
        map.end()
    }
}

struct Siblings<'a>(&'a TreeNode);

impl Serialize for Siblings<'_> {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_seq(self.0.statements().skip(1).map(Single))
    }
}

impl Debug for TreeNode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        if self.next.is_none() {
            Single(self).fmt(f)
        } else {
            f.debug_list().entries(self.statements().map(Single)).finish()
        }
    }
}

/// A statement sequence serializes as its head, with the statements after
/// it listed flat under `siblings`.
impl Serialize for TreeNode {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(None)?;
        self.serialize_fields(&mut map)?;
        if self.next.is_some() {
            map.serialize_entry("siblings", &Siblings(self))?;
        }
        map.end()
    }
}

impl Display for TreeNode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        for visit in self.walk() {
            writeln!(f, "{:indent$}{}", "", visit.node.describe(), indent = visit.depth * 2)?;
        }
        Ok(())
    }
}

pub struct Statements<'a> {
    node: Option<&'a TreeNode>,
}

impl<'a> Iterator for Statements<'a> {
    type Item = &'a TreeNode;

    fn next(&mut self) -> Option<Self::Item> {
        let node = self.node?;
        self.node = node.next();
        Some(node)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Link {
    Root,
    Child(usize),
    Next,
}

#[derive(Debug, Clone, Copy)]
pub struct Visit<'a> {
    pub node: &'a TreeNode,
    pub parent: Option<&'a TreeNode>,
    pub link: Link,
    /// Nesting level; a `next` statement shares the depth of its predecessor.
    pub depth: usize,
}

/// Pre-order traversal: a node, then its children, then its `next` statement.
pub struct Walk<'a> {
    stack: Vec<Visit<'a>>,
}

impl<'a> Iterator for Walk<'a> {
    type Item = Visit<'a>;

    fn next(&mut self) -> Option<Self::Item> {
        let visit = self.stack.pop()?;
        let node = visit.node;
        if let Some(next) = node.next() {
            self.stack.push(Visit {
                node: next,
                parent: Some(node),
                link: Link::Next,
                depth: visit.depth,
            });
        }
        for (index, child) in node.children.iter().enumerate().rev() {
            self.stack.push(Visit {
                node: child,
                parent: Some(node),
                link: Link::Child(index),
                depth: visit.depth + 1,
            });
        }
        Some(visit)
    }
}
