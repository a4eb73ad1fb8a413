use std::{collections::HashMap, fmt::Write, ops::Deref};

use crate::api::{Comment, CommentId};

/// A comment along with the replies that point to it, in server order
///
/// Cloning, comparing and dropping walk the tree without recursing, so that
/// arbitrarily deep threads are fine.
#[derive(Debug, Eq)]
pub struct CommentNode {
    pub comment: Comment,
    pub replies: Vec<CommentNode>,
}

impl Clone for CommentNode {
    fn clone(&self) -> CommentNode {
        fn close(root: &mut CommentNode, open: &mut Vec<CommentNode>, depth: usize) {
            while open.len() > depth {
                if let Some(done) = open.pop() {
                    match open.last_mut() {
                        Some(parent) => parent.replies.push(done),
                        None => root.replies.push(done),
                    }
                }
            }
        }

        let mut root = CommentNode {
            comment: self.comment.clone(),
            replies: Vec::new(),
        };
        // path from just below the root to the last visited node
        let mut open = Vec::new();
        for (depth, node) in walk(&self.replies) {
            close(&mut root, &mut open, depth);
            open.push(CommentNode {
                comment: node.comment.clone(),
                replies: Vec::new(),
            });
        }
        close(&mut root, &mut open, 0);
        root
    }
}

impl PartialEq for CommentNode {
    fn eq(&self, other: &CommentNode) -> bool {
        // pre-order with depths fully describes a tree
        walk(std::slice::from_ref(self))
            .map(|(d, n)| (d, &n.comment))
            .eq(walk(std::slice::from_ref(other)).map(|(d, n)| (d, &n.comment)))
    }
}

impl Drop for CommentNode {
    fn drop(&mut self) {
        let mut pending = std::mem::take(&mut self.replies);
        while let Some(mut node) = pending.pop() {
            pending.append(&mut node.replies);
        }
    }
}

impl Deref for CommentNode {
    type Target = Comment;

    fn deref(&self) -> &Comment {
        &self.comment
    }
}

impl CommentNode {
    /// Number of nodes in this subtree, including self
    pub fn count(&self) -> usize {
        walk(std::slice::from_ref(self)).count()
    }

    pub fn find_in<'a>(forest: &'a [CommentNode], id: &CommentId) -> Option<&'a CommentNode> {
        walk(forest).map(|(_, n)| n).find(|n| n.id == *id)
    }
}

/// Rebuild the reply forest out of a flat comment list
///
/// Every comment of `flat` ends up exactly once in the result, and siblings keep
/// the relative order they had in `flat`. Comments whose parent cannot be found
/// in `flat` are promoted to the top level, as are comments whose ancestry loops
/// back on itself.
pub fn build_tree(flat: &[Comment]) -> Vec<CommentNode> {
    // First pass: index every comment. For duplicated ids the first occurrence wins.
    let mut index = HashMap::with_capacity(flat.len());
    for (i, c) in flat.iter().enumerate() {
        index.entry(&c.id).or_insert(i);
    }

    // Second pass: attach each comment to its parent, in input order
    let mut parent = vec![None; flat.len()];
    let mut children = vec![Vec::new(); flat.len()];
    let mut roots = Vec::new();
    for (i, c) in flat.iter().enumerate() {
        match c.parent_id.as_ref().and_then(|p| index.get(p)).copied() {
            Some(p) if p != i => {
                parent[i] = Some(p);
                children[p].push(i);
            }
            Some(_) => {
                tracing::warn!(comment = ?c.id, "comment is its own parent, promoting");
                roots.push(i);
            }
            None => {
                if let Some(p) = &c.parent_id {
                    tracing::debug!(comment = ?c.id, parent = ?p, "orphan comment, promoting");
                }
                roots.push(i);
            }
        }
    }

    // Anything not reachable from a root is part of (or hangs below) a parent cycle
    let mut reached = vec![false; flat.len()];
    mark_reachable(&roots, &children, &mut reached);
    for i in 0..flat.len() {
        if reached[i] {
            continue;
        }
        tracing::warn!(comment = ?flat[i].id, "comment ancestry is cyclic, promoting");
        if let Some(p) = parent[i].take() {
            children[p].retain(|&c| c != i);
        }
        roots.push(i);
        mark_reachable(&[i], &children, &mut reached);
    }
    roots.sort_unstable();

    // Materialize bottom-up, so that deep threads do not recurse
    let mut built: Vec<Option<CommentNode>> = vec![None; flat.len()];
    for i in post_order(&roots, &children) {
        let replies = children[i]
            .iter()
            .filter_map(|&c| built[c].take())
            .collect();
        built[i] = Some(CommentNode {
            comment: flat[i].clone(),
            replies,
        });
    }
    roots.iter().filter_map(|&r| built[r].take()).collect()
}

fn mark_reachable(from: &[usize], children: &[Vec<usize>], reached: &mut [bool]) {
    let mut stack = from.to_vec();
    while let Some(i) = stack.pop() {
        if !reached[i] {
            reached[i] = true;
            stack.extend(children[i].iter().copied());
        }
    }
}

fn post_order(roots: &[usize], children: &[Vec<usize>]) -> Vec<usize> {
    let mut res = Vec::with_capacity(children.len());
    let mut stack = roots.iter().map(|&r| (r, false)).collect::<Vec<_>>();
    while let Some((i, expanded)) = stack.pop() {
        if expanded {
            res.push(i);
        } else {
            stack.push((i, true));
            stack.extend(children[i].iter().map(|&c| (c, false)));
        }
    }
    res
}

/// Depth-first pre-order traversal of a forest, yielding each node with its depth
pub fn walk(forest: &[CommentNode]) -> Walk<'_> {
    Walk {
        stack: forest.iter().rev().map(|n| (0, n)).collect(),
    }
}

pub struct Walk<'a> {
    stack: Vec<(usize, &'a CommentNode)>,
}

impl<'a> Iterator for Walk<'a> {
    type Item = (usize, &'a CommentNode);

    fn next(&mut self) -> Option<Self::Item> {
        let (depth, node) = self.stack.pop()?;
        self.stack
            .extend(node.replies.iter().rev().map(|r| (depth + 1, r)));
        Some((depth, node))
    }
}

/// Plain-text rendering of a forest, one comment per line, indented by depth
pub fn render_text(forest: &[CommentNode]) -> String {
    let mut res = String::new();
    for (depth, node) in walk(forest) {
        let author = node
            .author
            .as_ref()
            .map(|a| a.name.as_str())
            .filter(|n| !n.is_empty())
            .unwrap_or("User");
        // writing into a String cannot fail
        let _ = writeln!(
            res,
            "{:indent$}{}: {} [{} like{}] ({})",
            "",
            author,
            node.text,
            node.likes.len(),
            if node.likes.len() == 1 { "" } else { "s" },
            node.id.0,
            indent = depth * 4,
        );
    }
    res
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::{UserId, UserSummary};

    fn comment(id: &str, parent: Option<&str>) -> Comment {
        Comment {
            id: CommentId::new(id),
            recipe: None,
            text: format!("text of {id}"),
            author: None,
            parent_id: parent.map(CommentId::new),
            likes: Default::default(),
            created_at: chrono::Utc::now(),
        }
    }

    fn ids(forest: &[CommentNode]) -> Vec<&str> {
        forest.iter().map(|n| n.id.0.as_str()).collect()
    }

    #[test]
    fn three_level_nesting() {
        let flat = vec![
            comment("1", None),
            comment("2", Some("1")),
            comment("3", Some("2")),
            comment("4", None),
        ];
        let forest = build_tree(&flat);
        assert_eq!(ids(&forest), vec!["1", "4"]);
        assert_eq!(ids(&forest[0].replies), vec!["2"]);
        assert_eq!(ids(&forest[0].replies[0].replies), vec!["3"]);
        assert!(forest[0].replies[0].replies[0].replies.is_empty());
        assert!(forest[1].replies.is_empty());
    }

    #[test]
    fn orphan_is_promoted() {
        let forest = build_tree(&[comment("1", Some("99"))]);
        assert_eq!(ids(&forest), vec!["1"]);
        assert!(forest[0].replies.is_empty());
    }

    #[test]
    fn reply_listed_before_its_parent() {
        let flat = vec![comment("2", Some("1")), comment("1", None)];
        let forest = build_tree(&flat);
        assert_eq!(ids(&forest), vec!["1"]);
        assert_eq!(ids(&forest[0].replies), vec!["2"]);
    }

    #[test]
    fn siblings_keep_input_order() {
        let flat = vec![
            comment("a", None),
            comment("c", Some("a")),
            comment("b", None),
            comment("e", Some("a")),
            comment("d", Some("a")),
        ];
        let forest = build_tree(&flat);
        assert_eq!(ids(&forest), vec!["a", "b"]);
        assert_eq!(ids(&forest[0].replies), vec!["c", "e", "d"]);
    }

    #[test]
    fn cycles_are_promoted_not_lost() {
        let flat = vec![
            comment("self", Some("self")),
            comment("x", Some("y")),
            comment("y", Some("x")),
            comment("z", Some("y")),
        ];
        let forest = build_tree(&flat);
        assert_eq!(ids(&forest), vec!["self", "x"]);
        assert_eq!(ids(&forest[1].replies), vec!["y"]);
        assert_eq!(ids(&forest[1].replies[0].replies), vec!["z"]);
        assert_eq!(forest.iter().map(|n| n.count()).sum::<usize>(), 4);
    }

    #[test]
    fn duplicated_ids_are_all_kept() {
        let flat = vec![comment("1", None), comment("1", None), comment("2", Some("1"))];
        let forest = build_tree(&flat);
        assert_eq!(ids(&forest), vec!["1", "1"]);
        assert_eq!(ids(&forest[0].replies), vec!["2"]);
        assert!(forest[1].replies.is_empty());
    }

    #[test]
    fn deep_thread_does_not_overflow() {
        let mut flat = vec![comment("0", None)];
        for i in 1..50_000 {
            flat.push(comment(&i.to_string(), Some(&(i - 1).to_string())));
        }
        let forest = build_tree(&flat);
        assert_eq!(forest.len(), 1);
        assert_eq!(walk(&forest).count(), 50_000);
        assert_eq!(walk(&forest).last().map(|(d, _)| d), Some(49_999));
        assert_eq!(forest[0].count(), 50_000);

        let copy = forest.clone();
        assert_eq!(copy, forest);
        assert_eq!(walk(&copy).last().map(|(d, n)| (d, n.id.0.as_str())), Some((49_999, "49999")));

        let mut other = build_tree(&flat);
        flat.last_mut().unwrap().text = String::from("changed");
        assert_eq!(other, forest);
        other = build_tree(&flat);
        assert_ne!(other, forest);
        drop((copy, other, forest));
    }

    #[test]
    fn equality_sees_the_shape() {
        let nested = build_tree(&[comment("1", None), comment("2", Some("1"))]);
        let flat = build_tree(&[comment("1", None), comment("2", Some("99"))]);
        assert_eq!(flat.len(), 2);
        assert_ne!(nested[0], flat[0]);
        assert_eq!(nested[0].clone(), nested[0]);
        assert_eq!(nested[0].clone().replies.len(), 1);
    }

    #[test]
    fn walk_is_pre_order() {
        let flat = vec![
            comment("1", None),
            comment("2", Some("1")),
            comment("3", Some("2")),
            comment("4", None),
            comment("5", Some("1")),
        ];
        let forest = build_tree(&flat);
        let visited = walk(&forest)
            .map(|(d, n)| (d, n.id.0.as_str()))
            .collect::<Vec<_>>();
        assert_eq!(
            visited,
            vec![(0, "1"), (1, "2"), (2, "3"), (1, "5"), (0, "4")]
        );
        assert_eq!(
            CommentNode::find_in(&forest, &CommentId::new("3")).map(|n| n.count()),
            Some(1)
        );
        assert_eq!(
            CommentNode::find_in(&forest, &CommentId::new("1")).map(|n| n.count()),
            Some(4)
        );
        assert!(CommentNode::find_in(&forest, &CommentId::new("42")).is_none());
    }

    #[test]
    fn text_rendering_indents_replies() {
        let mut parent = comment("1", None);
        parent.author = Some(UserSummary {
            id: UserId::new("u1"),
            name: String::from("ann"),
            profile_image: None,
        });
        parent.likes.insert(UserId::new("u2"));
        let mut reply = comment("2", Some("1"));
        reply.text = String::from("thanks");
        let text = render_text(&build_tree(&[parent, reply]));
        assert_eq!(
            text,
            "ann: text of 1 [1 like] (1)\n    User: thanks [0 likes] (2)\n"
        );
    }

    fn batch_from(shape: &[(u8, Option<u8>)]) -> Vec<Comment> {
        shape
            .iter()
            .enumerate()
            .map(|(i, (_, parent))| {
                comment(
                    &i.to_string(),
                    parent.map(|p| (p as usize % (shape.len() + 4)).to_string()).as_deref(),
                )
            })
            .collect()
    }

    #[test]
    fn every_comment_appears_exactly_once() {
        bolero::check!()
            .with_type::<Vec<(u8, Option<u8>)>>()
            .cloned()
            .for_each(|shape| {
                let flat = batch_from(&shape);
                let forest = build_tree(&flat);
                let mut seen = walk(&forest).map(|(_, n)| n.id.clone()).collect::<Vec<_>>();
                seen.sort();
                let mut expected = flat.iter().map(|c| c.id.clone()).collect::<Vec<_>>();
                expected.sort();
                assert_eq!(seen, expected);
            })
    }

    #[test]
    fn siblings_follow_input_order_and_rebuild_is_stable() {
        bolero::check!()
            .with_type::<Vec<(u8, Option<u8>)>>()
            .cloned()
            .for_each(|shape| {
                let flat = batch_from(&shape);
                let before = flat.clone();
                let forest = build_tree(&flat);
                assert_eq!(flat, before, "input was modified");
                assert_eq!(build_tree(&flat), forest);

                let position = |id: &CommentId| id.0.parse::<usize>().expect("numeric id");
                let mut levels = vec![&forest[..]];
                while let Some(level) = levels.pop() {
                    let order = level.iter().map(|n| position(&n.id)).collect::<Vec<_>>();
                    assert!(order.windows(2).all(|w| w[0] < w[1]), "{order:?}");
                    levels.extend(level.iter().map(|n| &n.replies[..]));
                }

                // top-level comments are exactly those without a resolvable parent
                // (or stuck in a cycle, which only adds more roots)
                for n in &forest {
                    if let Some(p) = &n.parent_id {
                        let parent_present = flat.iter().any(|c| c.id == *p);
                        let parent_is_ancestor_of_self = parent_present && {
                            let mut cur = Some(p.clone());
                            let mut steps = 0;
                            let mut looped = false;
                            while let Some(c) = cur.take() {
                                if c == n.id || steps > flat.len() {
                                    looped = true;
                                    break;
                                }
                                steps += 1;
                                cur = flat
                                    .iter()
                                    .find(|x| x.id == c)
                                    .and_then(|x| x.parent_id.clone());
                            }
                            looped
                        };
                        assert!(!parent_present || parent_is_ancestor_of_self);
                    }
                }
            })
    }
}
