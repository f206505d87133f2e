//! Monte Carlo Tree Search over an arena of nodes.
//!
//! Nodes live in a single `Vec` and refer to each other by [`NodeId`].
//! A node owns its children through an index list and keeps a non-owning
//! parent index, which is only followed upward during backpropagation.
//!
//! - UCB1 selection ([`Tree::select_best_child`])
//! - Uniformly random selection for the opponent ([`Tree::select_random_child`])
//! - Lazy expansion once a node reaches `EXPAND_VISITS` visits
//! - Random playouts to the end of the game for evaluation

use std::fmt::Write as _;

use fastrand::Rng;
use log::debug;

use crate::board::{Board, Player};
use crate::constants::{EXPAND_VISITS, EXPLORATION};
use crate::playout::random_playout;
use crate::rules::{Move, apply_move, generate_moves, is_terminal};

/// Index of a node in the tree arena.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct NodeId(pub u32);

impl NodeId {
    #[inline]
    fn index(self) -> usize {
        self.0 as usize
    }
}

/// A node in the search tree.
#[derive(Debug, Clone)]
pub struct TreeNode {
    /// Position at this node
    pub board: Board,
    /// Move that led here (`None` for the root)
    pub mv: Option<Move>,
    /// Number of playouts through this node
    pub visits: u32,
    /// Playouts won by the player who moved into this node
    pub score: f64,
    /// Parent node (`None` for the root)
    pub parent: Option<NodeId>,
    /// Child nodes, in move generation order
    pub children: Vec<NodeId>,
}

impl TreeNode {
    fn new(board: Board, mv: Option<Move>, parent: Option<NodeId>) -> Self {
        Self {
            board,
            mv,
            visits: 0,
            score: 0.0,
            parent,
            children: Vec::new(),
        }
    }

    /// Fraction of playouts credited to this node, or -0.1 if unvisited.
    #[inline]
    pub fn winrate(&self) -> f64 {
        if self.visits > 0 {
            self.score / self.visits as f64
        } else {
            -0.1
        }
    }
}

/// MCTS tree with arena-based node storage.
#[derive(Debug, Clone)]
pub struct Tree {
    nodes: Vec<TreeNode>,
}

impl Tree {
    /// Create a tree rooted at `board`. The root is expanded immediately,
    /// with one child per legal move; every other node starts childless.
    pub fn new(board: Board) -> Self {
        let mut tree = Self {
            nodes: vec![TreeNode::new(board, None, None)],
        };
        let root = tree.root();
        for mv in generate_moves(&tree.get(root).board) {
            let child = apply_move(&tree.get(root).board, &mv);
            tree.add_child(root, child, mv);
        }
        debug!("root created with {} children", tree.get(root).children.len());
        tree
    }

    #[inline]
    pub fn root(&self) -> NodeId {
        NodeId(0)
    }

    #[inline]
    pub fn get(&self, id: NodeId) -> &TreeNode {
        &self.nodes[id.index()]
    }

    #[inline]
    fn get_mut(&mut self, id: NodeId) -> &mut TreeNode {
        &mut self.nodes[id.index()]
    }

    /// Total number of nodes in the tree.
    #[inline]
    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    /// Always false: a tree has at least its root.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    fn add_child(&mut self, parent: NodeId, board: Board, mv: Move) -> NodeId {
        let id = NodeId(self.nodes.len() as u32);
        self.nodes.push(TreeNode::new(board, Some(mv), Some(parent)));
        self.get_mut(parent).children.push(id);
        id
    }

    /// UCB1 score of a node as seen from its parent.
    ///
    /// Unvisited nodes score +infinity. The root has no parent and scores
    /// its plain mean.
    pub fn ucb_score(&self, id: NodeId) -> f64 {
        let node = self.get(id);
        if node.visits == 0 {
            return f64::INFINITY;
        }
        let visits = node.visits as f64;
        let exploitation = node.score / visits;
        match node.parent {
            Some(parent) => {
                let parent_visits = self.get(parent).visits as f64;
                exploitation + EXPLORATION * (parent_visits.ln() / visits).sqrt()
            }
            None => exploitation,
        }
    }

    /// The child with the highest UCB1 score. Ties go to the earliest child.
    pub fn select_best_child(&self, id: NodeId) -> Option<NodeId> {
        let mut best = None;
        let mut best_score = f64::NEG_INFINITY;
        for &child in &self.get(id).children {
            let score = self.ucb_score(child);
            if best.is_none() || score > best_score {
                best = Some(child);
                best_score = score;
            }
        }
        best
    }

    /// A uniformly random child, standing in for the opponent's reply.
    pub fn select_random_child(&self, id: NodeId, rng: &mut Rng) -> Option<NodeId> {
        let children = &self.get(id).children;
        if children.is_empty() {
            return None;
        }
        Some(children[rng.usize(..children.len())])
    }

    /// Add one child per legal move, leaving out moves that end the game
    /// on the spot. Terminal or already expanded nodes are left alone.
    pub fn expand(&mut self, id: NodeId) {
        if !self.get(id).children.is_empty() {
            return;
        }
        let board = self.get(id).board.clone();
        if is_terminal(&board) {
            return;
        }

        let mut skipped = 0;
        for mv in generate_moves(&board) {
            let child = apply_move(&board, &mv);
            if is_terminal(&child) {
                skipped += 1;
                continue;
            }
            self.add_child(id, child, mv);
        }
        debug!(
            "expanded node {} into {} children ({} decisive moves skipped)",
            id.0,
            self.get(id).children.len(),
            skipped
        );
    }

    /// Run a random playout from `id`, then update every node from `id` up
    /// to the root. Returns the winner of the playout.
    ///
    /// Each node on the path gains a visit, and a point when the winner is
    /// not the player to move at that node. A childless non-terminal node that has
    /// reached `EXPAND_VISITS` visits is expanded on the way up.
    pub fn simulate_and_expand(&mut self, id: NodeId, rng: &mut Rng) -> Player {
        let winner = random_playout(&self.get(id).board, rng);

        let mut cursor = Some(id);
        while let Some(current) = cursor {
            let node = self.get_mut(current);
            node.visits += 1;
            if winner != node.board.turn() {
                node.score += 1.0;
            }
            let should_expand = node.children.is_empty()
                && node.visits >= EXPAND_VISITS
                && !is_terminal(&node.board);
            cursor = node.parent;
            if should_expand {
                self.expand(current);
            }
        }

        winner
    }

    /// The most visited child of the root and its move.
    pub fn best_move(&self) -> Option<(NodeId, Move)> {
        let children = &self.get(self.root()).children;
        let mut best: Option<NodeId> = None;
        for &child in children {
            if best.is_none_or(|b| self.get(child).visits > self.get(b).visits) {
                best = Some(child);
            }
        }
        let id = best?;
        Some((id, self.get(id).mv?))
    }

    /// Render the tree as indented text, one edge per line with the move
    /// and the UCB1 score of the node it leads to. Nodes deeper than
    /// `max_depth` edges below the root are left out.
    pub fn render(&self, max_depth: Option<usize>) -> String {
        let mut out = String::new();
        self.render_node(self.root(), "", 0, max_depth, &mut out);
        out
    }

    fn render_node(
        &self,
        id: NodeId,
        prefix: &str,
        depth: usize,
        max_depth: Option<usize>,
        out: &mut String,
    ) {
        let node = self.get(id);
        if let Some(mv) = node.mv {
            // Writing to a String cannot fail.
            let _ = writeln!(out, "{prefix}├──{mv} [{:.6}]", self.ucb_score(id));
        }
        if max_depth.is_some_and(|max| depth >= max) {
            return;
        }

        let child_prefix = if node.mv.is_some() {
            format!("{prefix}│   ")
        } else {
            prefix.to_string()
        };
        for &child in &node.children {
            self.render_node(child, &child_prefix, depth + 1, max_depth, out);
        }
    }
}

/// Print statistics for each child of the root.
pub fn dump_children(tree: &Tree) {
    for &child in &tree.get(tree.root()).children {
        let node = tree.get(child);
        let mv = node.mv.map(|m| m.to_string()).unwrap_or_default();
        eprintln!(
            "move {} v={} w={} wr={:.3}",
            mv,
            node.visits,
            node.score,
            node.winrate()
        );
    }
}
