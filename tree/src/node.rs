/// Index into a [`UctTree`]'s arena.
pub type NodeId = usize;

/// A single node in the UCT tree. `children`/`unapplied` are populated the
/// first time the node is expanded; before that both are empty-or-full per
/// the invariants below.
#[derive(Debug, Clone)]
pub struct Node<St> {
    /// The action that produced this node; `None` for the root.
    pub action: Option<usize>,
    pub state: St,
    pub is_terminal: bool,
    pub parent: Option<NodeId>,
    /// Empty until expanded, then exactly one entry per legal action,
    /// ordered by action index so `children[a]` is the child for action `a`.
    pub children: Vec<NodeId>,
    /// Action indices not yet explored through `select_random_unapplied`.
    /// Populated with the full legal range at construction time, mirroring
    /// the source's node constructor.
    pub unapplied: Vec<usize>,
    pub visits: u32,
    pub avg_score: f64,
    pub visits_amaf: u32,
    pub avg_score_amaf: f64,
}

impl<St> Node<St> {
    fn new(action: Option<usize>, state: St, is_terminal: bool, parent: Option<NodeId>, num_actions: usize) -> Self {
        Self {
            action,
            state,
            is_terminal,
            parent,
            children: Vec::new(),
            unapplied: (0..num_actions).collect(),
            visits: 0,
            avg_score: 0.0,
            visits_amaf: 0,
            avg_score_amaf: 0.0,
        }
    }

    pub fn is_expandable(&self) -> bool {
        !self.is_terminal && !self.unapplied.is_empty()
    }

    pub fn children_created(&self) -> bool {
        !self.children.is_empty()
    }

    fn backup(&mut self, reward: f64) {
        self.visits += 1;
        self.avg_score += (reward - self.avg_score) / self.visits as f64;
    }

    fn backup_amaf(&mut self, reward: f64) {
        self.visits_amaf += 1;
        self.avg_score_amaf += (reward - self.avg_score_amaf) / self.visits_amaf as f64;
    }
}

/// An arena of [`Node`]s, re-rootable by mark-and-sweep: after a decision,
/// every node outside the chosen child's subtree is dropped from the
/// arena, and the chosen child is promoted to root with no parent. This
/// stands in for the source's "preserve one child, destroy the rest"
/// destructor pattern without raw ownership or reference counting.
pub struct UctTree<St> {
    nodes: Vec<Option<Node<St>>>,
    root: NodeId,
    num_actions: usize,
}

impl<St: Clone + PartialEq> UctTree<St> {
    pub fn new(state: St, is_terminal: bool, num_actions: usize) -> Self {
        let root = Node::new(None, state, is_terminal, None, num_actions);
        Self {
            nodes: vec![Some(root)],
            root: 0,
            num_actions,
        }
    }

    pub fn root_id(&self) -> NodeId {
        self.root
    }

    pub fn root_state(&self) -> &St {
        &self.node(self.root).state
    }

    pub fn node(&self, id: NodeId) -> &Node<St> {
        self.nodes[id].as_ref().expect("dangling node id")
    }

    pub fn node_mut(&mut self, id: NodeId) -> &mut Node<St> {
        self.nodes[id].as_mut().expect("dangling node id")
    }

    fn alloc(&mut self, node: Node<St>) -> NodeId {
        self.nodes.push(Some(node));
        self.nodes.len() - 1
    }

    /// Materializes all `num_actions` children of `id` using `make_child`
    /// to simulate one step per action, then removes one action uniformly
    /// at random from `unapplied` and returns the matching child.
    pub fn expand(
        &mut self,
        id: NodeId,
        rng: &mut impl rand::Rng,
        mut make_child: impl FnMut(&St, usize) -> (St, bool),
    ) -> NodeId {
        if !self.node(id).children_created() {
            let parent_state = self.node(id).state.clone();
            let mut child_ids = Vec::with_capacity(self.num_actions);
            for a in 0..self.num_actions {
                let (new_state, is_terminal) = make_child(&parent_state, a);
                let child = Node::new(Some(a), new_state, is_terminal, Some(id), self.num_actions);
                child_ids.push(self.alloc(child));
            }
            self.node_mut(id).children = child_ids;
        }
        self.select_random_unapplied(id, rng)
    }

    fn select_random_unapplied(&mut self, id: NodeId, rng: &mut impl rand::Rng) -> NodeId {
        let node = self.node_mut(id);
        let idx = rng.gen_range(0..node.unapplied.len());
        let action = node.unapplied.swap_remove(idx);
        node.children[action]
    }

    /// UCB1 (optionally AMAF-blended) child selection. `explore_multiplier`
    /// is `c` during the tree policy and `0.0` when picking the best root
    /// child without AMAF.
    pub fn select_max_child(
        &self,
        id: NodeId,
        explore_multiplier: f64,
        amaf: Option<f64>,
    ) -> NodeId {
        let node = self.node(id);
        debug_assert!(!node.is_terminal && !node.children.is_empty());

        let mut best = node.children[0];
        let mut best_score = f64::NEG_INFINITY;
        for &child_id in &node.children {
            let child = self.node(child_id);
            let uct_score = ucb1_score(node.visits, child.visits, child.avg_score, explore_multiplier);
            let score = match amaf {
                Some(rave_param) => {
                    let amaf_score = ucb1_score(
                        node.visits_amaf,
                        child.visits_amaf,
                        child.avg_score_amaf,
                        explore_multiplier,
                    );
                    let alpha = (rave_param - child.visits_amaf as f64) / rave_param;
                    let alpha = alpha.max(0.0);
                    alpha * amaf_score + (1.0 - alpha) * uct_score
                }
                None => uct_score,
            };
            if score > best_score {
                best_score = score;
                best = child_id;
            }
        }
        best
    }

    pub fn select_robust_child(&self, id: NodeId) -> NodeId {
        let node = self.node(id);
        debug_assert!(!node.children.is_empty());
        let mut best = node.children[0];
        let mut best_visits = -1i64;
        for &child_id in &node.children {
            let visits = self.node(child_id).visits as i64;
            if visits > best_visits {
                best_visits = visits;
                best = child_id;
            }
        }
        best
    }

    /// Walks from `leaf` to the root, applying `backup` (and, if `amaf`,
    /// `backup_children_amaf`/`backup_amaf` at the root) with the reward
    /// scaled by `discount^depth` when `discount` is set.
    pub fn backup(&mut self, leaf: NodeId, reward: f64, discount: Option<f64>, use_amaf: bool) {
        let mut current = Some(leaf);
        let mut mult = 1.0;
        while let Some(id) = current {
            let parent = self.node(id).parent;
            let scaled = match discount {
                Some(d) => {
                    let r = reward * mult;
                    mult *= d;
                    r
                }
                None => reward,
            };
            self.node_mut(id).backup(scaled);
            if use_amaf {
                let children = self.node(id).children.clone();
                for child_id in children {
                    self.node_mut(child_id).backup_amaf(scaled);
                }
                if parent.is_none() {
                    self.node_mut(id).backup_amaf(scaled);
                }
            }
            current = parent;
        }
    }

    /// Promotes `chosen` to root, dropping every node outside its subtree.
    pub fn re_root(&mut self, chosen: NodeId) {
        let mut keep = vec![false; self.nodes.len()];
        let mut stack = vec![chosen];
        while let Some(id) = stack.pop() {
            if keep[id] {
                continue;
            }
            keep[id] = true;
            stack.extend(self.node(id).children.iter().copied());
        }
        for (id, slot) in self.nodes.iter_mut().enumerate() {
            if !keep[id] {
                *slot = None;
            }
        }
        self.node_mut(chosen).parent = None;
        self.root = chosen;
    }
}

fn ucb1_score(parent_visits: u32, child_visits: u32, child_avg: f64, explore_multiplier: f64) -> f64 {
    if child_visits == 0 {
        return f64::INFINITY;
    }
    child_avg + explore_multiplier * (2.0 * (parent_visits as f64).ln() / child_visits as f64).sqrt()
}
