use super::*;

fn assign(name: &str, value: TreeNode) -> TreeNode {
    TreeNode::new(NodeKind::Assign, Some(name.to_string()), vec![value])
}

fn write(value: TreeNode) -> TreeNode {
    TreeNode::new(NodeKind::Write, None, vec![value])
}

fn read_x() -> TreeNode {
    TreeNode::new(NodeKind::Read, Some("x".to_string()), Vec::new())
}

fn sample() -> TreeNode {
    let read = read_x();
    let condition = TreeNode::operator("<", TreeNode::id("x"), TreeNode::constant("0"));
    let branch = TreeNode::new(
        NodeKind::If,
        None,
        vec![condition, write(TreeNode::id("x"))],
    );
    TreeNode::chain(read, vec![branch])
}

#[test]
fn terminal_follows_kind() {
    assert!(TreeNode::id("x").is_terminal());
    assert!(TreeNode::constant("1").is_terminal());
    assert!(TreeNode::operator("+", TreeNode::id("a"), TreeNode::id("b")).is_terminal());
    assert!(!write(TreeNode::id("x")).is_terminal());
    assert!(!NodeKind::Repeat.is_terminal());
}

#[test]
fn chain_links_in_order() {
    let head = TreeNode::chain(
        assign("a", TreeNode::constant("1")),
        vec![
            assign("b", TreeNode::constant("2")),
            write(TreeNode::id("b")),
        ],
    );
    let kinds: Vec<NodeKind> = head.statements().map(TreeNode::kind).collect();
    assert_eq!(kinds, vec![NodeKind::Assign, NodeKind::Assign, NodeKind::Write]);
    assert_eq!(head.annotation(), Some("a"));
    assert_eq!(head.next().and_then(TreeNode::annotation), Some("b"));
    assert!(head.children().iter().all(|c| c.next().is_none()));
}

#[test]
fn walk_recovers_parents() {
    let root = sample();
    let visits: Vec<Visit> = root.walk().collect();
    let labels: Vec<NodeKind> = visits.iter().map(|v| v.node.kind()).collect();
    assert_eq!(
        labels,
        vec![
            NodeKind::Read,
            NodeKind::If,
            NodeKind::Op,
            NodeKind::Id,
            NodeKind::Const,
            NodeKind::Write,
            NodeKind::Id,
        ]
    );

    assert_eq!(visits[0].link, Link::Root);
    assert!(visits[0].parent.is_none());

    assert_eq!(visits[1].link, Link::Next);
    assert_eq!(visits[1].depth, 0);
    assert_eq!(visits[1].parent.map(TreeNode::kind), Some(NodeKind::Read));

    assert_eq!(visits[5].link, Link::Child(1));
    assert_eq!(visits[5].depth, 1);
    assert_eq!(visits[5].parent.map(TreeNode::kind), Some(NodeKind::If));

    for visit in &visits {
        if let Some(parent) = visit.parent {
            let linked = match visit.link {
                Link::Child(index) => parent.child(index),
                Link::Next => parent.next(),
                Link::Root => None,
            };
            assert!(linked.is_some_and(|node| std::ptr::eq(node, visit.node)));
        }
    }
}

#[test]
fn display_indents_children() {
    let expected = "\
read (x)
if
  op (<)
    id (x)
    const (0)
  write
    id (x)
";
    assert_eq!(sample().to_string(), expected);
}

#[test]
fn height_counts_children_not_siblings() {
    assert_eq!(TreeNode::id("x").height(), 1);
    assert_eq!(write(TreeNode::id("x")).height(), 2);
    let root = sample();
    assert_eq!(root.height(), 1);
    assert_eq!(root.next().map(TreeNode::height), Some(3));
}

#[test]
fn serializes_without_empty_fields() {
    let node = TreeNode::operator("+", TreeNode::id("a"), TreeNode::constant("1"));
    let value = serde_json::to_value(&node).unwrap();
    assert_eq!(
        value,
        serde_json::json!({
            "kind": "op",
            "annotation": "+",
            "terminal": true,
            "children": [
                { "kind": "id", "annotation": "a", "terminal": true },
                { "kind": "const", "annotation": "1", "terminal": true },
            ],
        })
    );
}

#[test]
fn long_chains_drop() {
    let rest = (0..200_000)
        .map(|i| assign("x", TreeNode::constant(i.to_string())))
        .collect();
    let head = TreeNode::chain(write(TreeNode::id("x")), rest);
    assert_eq!(head.statements().count(), 200_001);
    drop(head);
}

#[test]
fn sequences_serialize_flat() {
    let value = serde_json::to_value(sample()).unwrap();
    assert_eq!(value["kind"], "read");
    assert_eq!(value["siblings"][0]["kind"], "if");
    assert!(value["siblings"][0].get("siblings").is_none());
}

#[test]
fn long_chains_clone_compare_and_serialize() {
    let rest = (0..100_000).map(|_| write(TreeNode::id("x"))).collect();
    let head = TreeNode::chain(read_x(), rest);
    let copy = head.clone();
    assert_eq!(copy, head);
    let json = serde_json::to_string(&head).unwrap();
    assert!(json.starts_with(r#"{"kind":"read""#));
    assert!(!format!("{:?}", head).is_empty());
}

#[test]
fn deep_expressions_drop() {
    let mut node = TreeNode::constant("1");
    for _ in 0..100_000 {
        node = TreeNode::operator("+", TreeNode::constant("1"), node);
    }
    assert_eq!(node.height(), 100_001);
    let statement = write(node);
    drop(TreeNode::chain(read_x(), vec![statement]));
}
