//! Search tree tests: construction, selection, expansion, backpropagation
//! and reproducibility.

use doubutsu_mcts::board::{Board, Player};
use doubutsu_mcts::constants::EXPAND_VISITS;
use doubutsu_mcts::mcts::{NodeId, Tree};
use doubutsu_mcts::rules::{Move, generate_moves, is_terminal};
use doubutsu_mcts::search::{self, SearchConfig, run_playout, select_leaf};
use fastrand::Rng;

/// Find the root child reached by `text`.
fn root_child(tree: &Tree, text: &str) -> NodeId {
    let mv: Move = text.parse().unwrap();
    tree.get(tree.root())
        .children
        .iter()
        .copied()
        .find(|&id| tree.get(id).mv == Some(mv))
        .unwrap_or_else(|| panic!("no root child for {text}"))
}

/// Visit and score of every node, in arena order.
fn stats(tree: &Tree) -> Vec<(u32, f64, usize)> {
    (0..tree.len() as u32)
        .map(|i| {
            let node = tree.get(NodeId(i));
            (node.visits, node.score, node.children.len())
        })
        .collect()
}

/// P1 Lion one step from a try; P2 Lion one step from a try of its own.
fn race_position() -> Board {
    Board::setup(
        ["-- -- --", "1L -- --", "-- -- 2L", "-- -- --"],
        [&[], &[]],
        Player::Player1,
    )
    .unwrap()
}

#[test]
fn test_root_keeps_decisive_children() {
    let board = race_position();
    let tree = Tree::new(board.clone());
    let root = tree.get(tree.root());
    assert_eq!(root.children.len(), generate_moves(&board).len());
    assert_eq!(root.children.len(), 5);
    let decisive = root
        .children
        .iter()
        .filter(|&&id| is_terminal(&tree.get(id).board))
        .count();
    assert_eq!(decisive, 2);
}

#[test]
fn test_expand_skips_decisive_moves() {
    let mut tree = Tree::new(race_position());
    let node = root_child(&tree, "(1, 0) -> (2, 0)");
    assert!(tree.get(node).children.is_empty());

    tree.expand(node);
    let children = &tree.get(node).children;
    // P2 Lion has five moves, two of which reach row 3
    assert_eq!(children.len(), 3);
    for &child in children {
        assert!(!is_terminal(&tree.get(child).board));
        assert_eq!(tree.get(child).parent, Some(node));
    }
}

#[test]
fn test_expand_terminal_node_is_noop() {
    let mut tree = Tree::new(race_position());
    let node = root_child(&tree, "(1, 0) -> (0, 0)");
    assert!(is_terminal(&tree.get(node).board));
    let before = tree.len();
    tree.expand(node);
    assert_eq!(tree.len(), before);
}

#[test]
fn test_terminal_leaf_never_expands() {
    let mut tree = Tree::new(race_position());
    let node = root_child(&tree, "(1, 0) -> (0, 1)");
    let mut rng = Rng::with_seed(4);
    for _ in 0..EXPAND_VISITS * 2 {
        assert_eq!(tree.simulate_and_expand(node, &mut rng), Player::Player1);
    }
    assert!(tree.get(node).children.is_empty());
    // Player1 moved into the node and won every time
    assert_eq!(tree.get(node).score, 2.0 * EXPAND_VISITS as f64);
    assert_eq!(tree.get(tree.root()).score, 0.0);
}

#[test]
fn test_unvisited_child_selected_first() {
    let mut tree = Tree::new(Board::new());
    let mut rng = Rng::with_seed(8);
    let root = tree.root();
    let first = tree.get(root).children[0];
    tree.simulate_and_expand(first, &mut rng);
    assert_eq!(tree.get(first).visits, 1);

    let best = tree.select_best_child(root).unwrap();
    assert_eq!(tree.get(best).visits, 0);
    assert_eq!(best, tree.get(root).children[1]);
}

#[test]
fn test_every_root_child_tried_once_first() {
    let mut tree = Tree::new(Board::new());
    let mut rng = Rng::with_seed(21);
    let n = tree.get(tree.root()).children.len();
    for _ in 0..n {
        run_playout(&mut tree, &mut rng);
    }
    for &child in &tree.get(tree.root()).children {
        assert_eq!(tree.get(child).visits, 1);
    }
}

#[test]
fn test_root_visits_match_playouts() {
    let mut tree = Tree::new(Board::new());
    let mut rng = Rng::with_seed(13);
    for _ in 0..200 {
        run_playout(&mut tree, &mut rng);
    }
    let root = tree.get(tree.root());
    assert_eq!(root.visits, 200);
    assert!(root.score <= 200.0);
    let child_visits: u32 = root.children.iter().map(|&c| tree.get(c).visits).sum();
    assert_eq!(child_visits, 200);
    assert!(tree.len() > 1 + root.children.len());
}

#[test]
fn test_child_visits_bounded_by_parent() {
    let mut tree = Tree::new(Board::new());
    let mut rng = Rng::with_seed(17);
    for _ in 0..300 {
        run_playout(&mut tree, &mut rng);
    }
    for i in 1..tree.len() as u32 {
        let node = tree.get(NodeId(i));
        let parent = tree.get(node.parent.unwrap());
        assert!(node.visits <= parent.visits);
        assert!(node.score <= node.visits as f64);
    }
}

#[test]
fn test_select_leaf_returns_childless_node() {
    let mut tree = Tree::new(Board::new());
    let mut rng = Rng::with_seed(31);
    for _ in 0..100 {
        let leaf = select_leaf(&tree, &mut rng);
        assert!(tree.get(leaf).children.is_empty());
        tree.simulate_and_expand(leaf, &mut rng);
    }
}

#[test]
fn test_search_is_deterministic() {
    let run = |seed| {
        let mut tree = Tree::new(Board::new());
        let mut rng = Rng::with_seed(seed);
        let winners: Vec<Player> = (0..300).map(|_| run_playout(&mut tree, &mut rng)).collect();
        (winners, stats(&tree))
    };
    let (w1, s1) = run(99);
    let (w2, s2) = run(99);
    assert_eq!(w1, w2);
    assert_eq!(s1, s2);
}

#[test]
fn test_run_is_deterministic() {
    let config = SearchConfig {
        outer_iterations: 4,
        inner_playouts: 25,
        report_period: 1,
        focus: Player::Player1,
    };
    let run = || {
        let mut tree = Tree::new(Board::new());
        let mut rng = Rng::with_seed(5);
        let mut rates = Vec::new();
        let summary = search::run(&mut tree, &config, &mut rng, |p| rates.push(p.batch_win_rate));
        (summary, rates, tree.render(Some(2)))
    };
    let (summary1, rates1, text1) = run();
    let (summary2, rates2, text2) = run();
    assert_eq!(summary1, summary2);
    assert_eq!(rates1, rates2);
    assert_eq!(text1, text2);
    assert_eq!(summary1.playouts, 100);
    assert_eq!(rates1.len(), 4);
}

#[test]
fn test_best_move_is_most_visited() {
    let mut tree = Tree::new(Board::new());
    let mut rng = Rng::with_seed(3);
    for _ in 0..200 {
        run_playout(&mut tree, &mut rng);
    }
    let (best, mv) = tree.best_move().unwrap();
    assert_eq!(tree.get(best).mv, Some(mv));
    let max = tree
        .get(tree.root())
        .children
        .iter()
        .map(|&c| tree.get(c).visits)
        .max()
        .unwrap();
    assert_eq!(tree.get(best).visits, max);
}

#[test]
fn test_render_format() {
    let mut tree = Tree::new(Board::new());
    let mut rng = Rng::with_seed(6);
    for _ in 0..50 {
        run_playout(&mut tree, &mut rng);
    }
    let text = tree.render(None);
    let first = text.lines().next().unwrap();
    assert!(first.starts_with("├──(2, 1) -> (1, 1) ["), "{first}");
    assert!(text.lines().any(|l| l.starts_with("│   ├──")));
    assert_eq!(text.lines().count(), tree.len() - 1);
}
