//! Dynamic AABB tree broad phase
//!
//! A balanced binary bounding-volume hierarchy over "fat" AABBs. Each leaf
//! holds one proxy: a user payload plus an AABB inflated by a margin and,
//! after a move, stretched along the displacement. Small motions stay inside
//! the fat box and cost nothing; larger ones remove and reinsert the leaf.
//!
//! Nodes live in a contiguous arena. Unused slots are chained into a free
//! list through their `parent` field, and the arena doubles when the list
//! runs dry. Proxy handles carry a generation so a handle to a removed leaf
//! is rejected even after its slot has been reused.

use std::fmt;

use broadleaf_math::Vec3;

use crate::error::TreeError;
use crate::shapes::Aabb;

/// Default inflation applied to every inserted AABB
pub const DEFAULT_MARGIN: f32 = 0.1;
/// Default scale applied to the displacement when extending a moved proxy
pub const DEFAULT_DISPLACEMENT_MULTIPLIER: f32 = 2.0;

const INITIAL_CAPACITY: usize = 16;
const FREE_HEIGHT: i32 = -1;

/// Handle to a leaf of a [`DynamicTree`]
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ProxyId {
    index: u32,
    generation: u32,
}

impl ProxyId {
    pub(crate) const fn new(index: u32, generation: u32) -> Self {
        Self { index, generation }
    }

    /// Arena slot of this proxy
    pub fn index(&self) -> usize {
        self.index as usize
    }

    /// Generation of the slot when this proxy was issued
    pub fn generation(&self) -> u32 {
        self.generation
    }
}

impl fmt::Display for ProxyId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}v{}", self.index, self.generation)
    }
}

#[derive(Clone, Debug)]
struct TreeNode<T> {
    fat_aabb: Aabb,
    user_data: Option<T>,
    /// Parent link while allocated, next free slot while on the free list
    parent: Option<usize>,
    left: Option<usize>,
    right: Option<usize>,
    /// 0 for leaves, -1 for free slots
    height: i32,
    generation: u32,
}

impl<T> TreeNode<T> {
    fn free(next: Option<usize>) -> Self {
        Self {
            fat_aabb: Aabb::new(Vec3::ZERO, Vec3::ZERO),
            user_data: None,
            parent: next,
            left: None,
            right: None,
            height: FREE_HEIGHT,
            generation: 0,
        }
    }

    fn is_leaf(&self) -> bool {
        self.left.is_none()
    }
}

/// Balanced AABB tree with stable, generation-checked proxy handles
#[derive(Clone, Debug)]
pub struct DynamicTree<T> {
    nodes: Vec<TreeNode<T>>,
    root: Option<usize>,
    free_list: Option<usize>,
    node_count: usize,
    proxy_count: usize,
    margin: f32,
    displacement_multiplier: f32,
}

impl<T: Copy> Default for DynamicTree<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T: Copy> DynamicTree<T> {
    /// Create an empty tree with the default margin and displacement multiplier
    pub fn new() -> Self {
        Self::with_parameters(DEFAULT_MARGIN, DEFAULT_DISPLACEMENT_MULTIPLIER)
    }

    /// Create an empty tree with custom fattening parameters
    pub fn with_parameters(margin: f32, displacement_multiplier: f32) -> Self {
        let mut tree = Self {
            nodes: Vec::new(),
            root: None,
            free_list: None,
            node_count: 0,
            proxy_count: 0,
            margin: margin.max(0.0),
            displacement_multiplier: displacement_multiplier.max(0.0),
        };
        tree.grow(INITIAL_CAPACITY);
        tree
    }

    /// Margin added to every side of an inserted AABB
    pub fn margin(&self) -> f32 {
        self.margin
    }

    /// Insert a proxy and return its handle
    pub fn insert(&mut self, aabb: Aabb, user_data: T) -> ProxyId {
        let leaf = self.allocate_node();
        {
            let node = &mut self.nodes[leaf];
            node.fat_aabb = aabb.fattened(self.margin);
            node.user_data = Some(user_data);
            node.height = 0;
        }
        self.insert_leaf(leaf);
        self.proxy_count += 1;
        ProxyId::new(leaf as u32, self.nodes[leaf].generation)
    }

    /// Remove a proxy, returning its payload
    pub fn remove(&mut self, proxy: ProxyId) -> Result<T, TreeError> {
        let leaf = self.leaf_index(proxy)?;
        let data = self.nodes[leaf]
            .user_data
            .ok_or(TreeError::StaleProxy(proxy))?;
        self.remove_leaf(leaf);
        self.free_node(leaf);
        self.proxy_count -= 1;
        Ok(data)
    }

    /// Update a proxy after its object moved
    ///
    /// Returns `Ok(false)` when the stored fat AABB still contains `aabb`.
    /// Otherwise the leaf is reinserted with a fresh fat AABB extended by
    /// `displacement` times the displacement multiplier, and `Ok(true)` is
    /// returned.
    pub fn move_proxy(&mut self, proxy: ProxyId, aabb: Aabb, displacement: Vec3) -> Result<bool, TreeError> {
        let leaf = self.leaf_index(proxy)?;
        if self.nodes[leaf].fat_aabb.contains(&aabb) {
            return Ok(false);
        }

        self.remove_leaf(leaf);
        self.nodes[leaf].fat_aabb = aabb
            .fattened(self.margin)
            .extended_toward(displacement * self.displacement_multiplier);
        self.insert_leaf(leaf);
        Ok(true)
    }

    /// Stored fat AABB of a proxy
    pub fn fat_aabb(&self, proxy: ProxyId) -> Result<Aabb, TreeError> {
        let leaf = self.leaf_index(proxy)?;
        Ok(self.nodes[leaf].fat_aabb)
    }

    /// Payload of a proxy
    pub fn user_data(&self, proxy: ProxyId) -> Result<T, TreeError> {
        let leaf = self.leaf_index(proxy)?;
        self.nodes[leaf].user_data.ok_or(TreeError::StaleProxy(proxy))
    }

    /// Whether `proxy` refers to a live leaf
    pub fn contains(&self, proxy: ProxyId) -> bool {
        self.leaf_index(proxy).is_ok()
    }

    /// Visit every proxy whose fat AABB overlaps `region`
    ///
    /// The visitor returns `false` to stop the traversal early.
    pub fn query<F>(&self, region: &Aabb, mut visitor: F)
    where
        F: FnMut(ProxyId) -> bool,
    {
        let mut stack: Vec<usize> = Vec::with_capacity(64);
        stack.extend(self.root);

        while let Some(index) = stack.pop() {
            let node = &self.nodes[index];
            if !node.fat_aabb.overlaps(region) {
                continue;
            }
            match (node.left, node.right) {
                (Some(left), Some(right)) => {
                    stack.push(left);
                    stack.push(right);
                }
                _ => {
                    if !visitor(ProxyId::new(index as u32, node.generation)) {
                        return;
                    }
                }
            }
        }
    }

    /// Visit every proxy whose fat AABB is hit by the ray within `max_distance`
    ///
    /// `max_distance` is measured in units of `direction`'s length. The
    /// visitor returns `false` to stop the traversal early.
    pub fn ray_cast<F>(&self, origin: Vec3, direction: Vec3, max_distance: f32, visitor: F)
    where
        F: FnMut(ProxyId) -> bool,
    {
        self.sphere_cast(origin, direction, 0.0, max_distance, visitor);
    }

    /// Visit every proxy whose fat AABB, grown by `radius`, is hit by the ray
    ///
    /// A fat box contains its object's bounds, so the grown box contains the
    /// bounds grown by `radius` and no sphere sweep hit is missed.
    pub fn sphere_cast<F>(&self, origin: Vec3, direction: Vec3, radius: f32, max_distance: f32, mut visitor: F)
    where
        F: FnMut(ProxyId) -> bool,
    {
        let radius = radius.max(0.0);
        let mut stack: Vec<usize> = Vec::with_capacity(64);
        stack.extend(self.root);

        while let Some(index) = stack.pop() {
            let node = &self.nodes[index];
            let bounds = node.fat_aabb.fattened(radius);
            if bounds.ray_intersection(origin, direction, max_distance).is_none() {
                continue;
            }
            match (node.left, node.right) {
                (Some(left), Some(right)) => {
                    stack.push(left);
                    stack.push(right);
                }
                _ => {
                    if !visitor(ProxyId::new(index as u32, node.generation)) {
                        return;
                    }
                }
            }
        }
    }

    /// Translate every stored box by `-offset` after a world origin shift
    pub fn shift_origin(&mut self, offset: Vec3) {
        for node in self.nodes.iter_mut().filter(|n| n.height != FREE_HEIGHT) {
            node.fat_aabb = node.fat_aabb.translated(-offset);
        }
    }

    /// Height of the tree (0 for a single leaf or an empty tree)
    pub fn height(&self) -> i32 {
        self.root.map_or(0, |r| self.nodes[r].height)
    }

    /// AABB enclosing every proxy
    pub fn root_aabb(&self) -> Option<Aabb> {
        self.root.map(|r| self.nodes[r].fat_aabb)
    }

    /// Number of allocated nodes (leaves and internal)
    pub fn node_count(&self) -> usize {
        self.node_count
    }

    /// Number of live proxies
    pub fn proxy_count(&self) -> usize {
        self.proxy_count
    }

    pub fn is_empty(&self) -> bool {
        self.proxy_count == 0
    }

    /// Arena size
    pub fn capacity(&self) -> usize {
        self.nodes.len()
    }

    /// Length of the free list
    pub fn free_count(&self) -> usize {
        let mut count = 0;
        let mut cursor = self.free_list;
        while let Some(index) = cursor {
            count += 1;
            cursor = self.nodes[index].parent;
        }
        count
    }

    /// Largest height difference between sibling subtrees
    pub fn max_balance(&self) -> i32 {
        self.nodes
            .iter()
            .filter(|n| n.height > 0)
            .filter_map(|n| match (n.left, n.right) {
                (Some(l), Some(r)) => Some((self.nodes[l].height - self.nodes[r].height).abs()),
                _ => None,
            })
            .max()
            .unwrap_or(0)
    }

    /// Check every structural invariant of the tree
    pub fn validate(&self) -> Result<(), TreeError> {
        let fail = |msg: String| Err(TreeError::InvariantViolated(msg));

        if let Some(root) = self.root {
            if self.nodes[root].parent.is_some() {
                return fail(format!("root {} has a parent", root));
            }
        }

        let mut reachable = 0;
        let mut leaves = 0;
        let mut stack: Vec<usize> = Vec::new();
        stack.extend(self.root);
        while let Some(index) = stack.pop() {
            reachable += 1;
            let node = &self.nodes[index];
            match (node.left, node.right) {
                (None, None) => {
                    leaves += 1;
                    if node.height != 0 {
                        return fail(format!("leaf {} has height {}", index, node.height));
                    }
                    if node.user_data.is_none() {
                        return fail(format!("leaf {} has no payload", index));
                    }
                }
                (Some(left), Some(right)) => {
                    for child in [left, right] {
                        if self.nodes[child].parent != Some(index) {
                            return fail(format!("child {} does not point back to {}", child, index));
                        }
                    }
                    let (hl, hr) = (self.nodes[left].height, self.nodes[right].height);
                    if node.height != 1 + hl.max(hr) {
                        return fail(format!("node {} height {} != 1 + max({}, {})", index, node.height, hl, hr));
                    }
                    if (hl - hr).abs() > 1 {
                        return fail(format!("node {} unbalanced: {} vs {}", index, hl, hr));
                    }
                    let merged = self.nodes[left].fat_aabb.merge(&self.nodes[right].fat_aabb);
                    if merged != node.fat_aabb {
                        return fail(format!("node {} box is not the union of its children", index));
                    }
                    stack.push(left);
                    stack.push(right);
                }
                _ => return fail(format!("node {} has exactly one child", index)),
            }
        }

        if reachable != self.node_count {
            return fail(format!("{} nodes reachable, {} allocated", reachable, self.node_count));
        }
        if leaves != self.proxy_count {
            return fail(format!("{} leaves reachable, {} proxies", leaves, self.proxy_count));
        }
        if self.node_count + self.free_count() != self.capacity() {
            return fail(format!(
                "{} allocated + {} free != capacity {}",
                self.node_count,
                self.free_count(),
                self.capacity()
            ));
        }
        Ok(())
    }

    fn leaf_index(&self, proxy: ProxyId) -> Result<usize, TreeError> {
        match self.nodes.get(proxy.index()) {
            Some(node) if node.generation == proxy.generation && node.height == 0 => Ok(proxy.index()),
            _ => Err(TreeError::StaleProxy(proxy)),
        }
    }

    fn grow(&mut self, new_capacity: usize) {
        let old = self.nodes.len();
        if new_capacity <= old {
            return;
        }
        for i in old..new_capacity {
            let next = if i + 1 < new_capacity { Some(i + 1) } else { self.free_list };
            self.nodes.push(TreeNode::free(next));
        }
        self.free_list = Some(old);
    }

    fn allocate_node(&mut self) -> usize {
        if self.free_list.is_none() {
            let capacity = (self.nodes.len() * 2).max(INITIAL_CAPACITY);
            log::trace!("Dynamic tree growing to {} nodes", capacity);
            self.grow(capacity);
        }
        // grow() always leaves at least one free slot
        let index = self.free_list.unwrap_or(self.nodes.len() - 1);
        let node = &mut self.nodes[index];
        self.free_list = node.parent;
        node.parent = None;
        node.left = None;
        node.right = None;
        node.user_data = None;
        node.height = 0;
        self.node_count += 1;
        index
    }

    fn free_node(&mut self, index: usize) {
        let node = &mut self.nodes[index];
        node.generation = node.generation.wrapping_add(1);
        node.parent = self.free_list;
        node.left = None;
        node.right = None;
        node.user_data = None;
        node.height = FREE_HEIGHT;
        self.free_list = Some(index);
        self.node_count -= 1;
    }

    fn children(&self, index: usize) -> Option<(usize, usize)> {
        let node = &self.nodes[index];
        node.left.zip(node.right)
    }

    fn replace_child(&mut self, parent: usize, old: usize, new: usize) {
        let node = &mut self.nodes[parent];
        if node.left == Some(old) {
            node.left = Some(new);
        } else {
            node.right = Some(new);
        }
    }

    /// Recompute height and box of an internal node from its children
    fn refresh(&mut self, index: usize) {
        if let Some((left, right)) = self.children(index) {
            let height = 1 + self.nodes[left].height.max(self.nodes[right].height);
            let fat_aabb = self.nodes[left].fat_aabb.merge(&self.nodes[right].fat_aabb);
            let node = &mut self.nodes[index];
            node.height = height;
            node.fat_aabb = fat_aabb;
        }
    }

    /// Cost of pushing the new leaf down into `child`
    fn descend_cost(&self, child: usize, leaf_aabb: &Aabb, inheritance_cost: f32) -> f32 {
        let node = &self.nodes[child];
        let merged_area = leaf_aabb.merge(&node.fat_aabb).surface_area();
        if node.is_leaf() {
            merged_area + inheritance_cost
        } else {
            merged_area - node.fat_aabb.surface_area() + inheritance_cost
        }
    }

    fn insert_leaf(&mut self, leaf: usize) {
        let Some(root) = self.root else {
            self.root = Some(leaf);
            self.nodes[leaf].parent = None;
            return;
        };

        // Find the best sibling by the surface area heuristic
        let leaf_aabb = self.nodes[leaf].fat_aabb;
        let mut index = root;
        while let Some((left, right)) = self.children(index) {
            let area = self.nodes[index].fat_aabb.surface_area();
            let combined_area = self.nodes[index].fat_aabb.merge(&leaf_aabb).surface_area();

            // Cost of creating a new parent for this node and the leaf
            let cost = 2.0 * combined_area;
            // Minimum cost of pushing the leaf further down
            let inheritance_cost = 2.0 * (combined_area - area);

            let cost_left = self.descend_cost(left, &leaf_aabb, inheritance_cost);
            let cost_right = self.descend_cost(right, &leaf_aabb, inheritance_cost);

            if cost < cost_left && cost < cost_right {
                break;
            }
            index = if cost_left < cost_right { left } else { right };
        }

        let sibling = index;
        let old_parent = self.nodes[sibling].parent;
        let new_parent = self.allocate_node();
        {
            let fat_aabb = leaf_aabb.merge(&self.nodes[sibling].fat_aabb);
            let height = self.nodes[sibling].height + 1;
            let node = &mut self.nodes[new_parent];
            node.parent = old_parent;
            node.fat_aabb = fat_aabb;
            node.height = height;
            node.left = Some(sibling);
            node.right = Some(leaf);
        }
        match old_parent {
            Some(parent) => self.replace_child(parent, sibling, new_parent),
            None => self.root = Some(new_parent),
        }
        self.nodes[sibling].parent = Some(new_parent);
        self.nodes[leaf].parent = Some(new_parent);

        self.fix_upwards(Some(new_parent));
    }

    fn remove_leaf(&mut self, leaf: usize) {
        if self.root == Some(leaf) {
            self.root = None;
            return;
        }

        let Some(parent) = self.nodes[leaf].parent else {
            return;
        };
        let Some((left, right)) = self.children(parent) else {
            return;
        };
        let sibling = if left == leaf { right } else { left };
        let grandparent = self.nodes[parent].parent;

        match grandparent {
            Some(grand) => {
                self.replace_child(grand, parent, sibling);
                self.nodes[sibling].parent = Some(grand);
                self.free_node(parent);
                self.fix_upwards(Some(grand));
            }
            None => {
                self.root = Some(sibling);
                self.nodes[sibling].parent = None;
                self.free_node(parent);
            }
        }
        self.nodes[leaf].parent = None;
    }

    /// Walk to the root, rebalancing and refreshing each ancestor
    fn fix_upwards(&mut self, start: Option<usize>) {
        let mut cursor = start;
        while let Some(index) = cursor {
            self.refresh(index);
            let index = self.balance(index);
            cursor = self.nodes[index].parent;
        }
    }

    /// Restore the height balance of the subtree rooted at `a`
    ///
    /// Children of `a` must already be balanced and fresh. Returns the new
    /// subtree root, whose height and box are fresh on return.
    fn balance(&mut self, a: usize) -> usize {
        let Some((b, c)) = self.children(a) else {
            return a;
        };
        let diff = self.nodes[c].height - self.nodes[b].height;
        if diff.abs() <= 1 {
            return a;
        }

        let tall = if diff > 1 { c } else { b };
        let top = self.rotate_up(a, tall);
        // `a` now holds the shorter subtrees and may itself be lopsided
        self.balance(a);
        self.refresh(top);
        self.balance(top)
    }

    /// Lift `up` (a child of `a`) into `a`'s place
    ///
    /// `up` keeps its taller child; its shorter child moves under `a` next to
    /// `a`'s other child. Child order carries no meaning in this tree, so a
    /// single rotation covers both the outer and inner cases.
    fn rotate_up(&mut self, a: usize, up: usize) -> usize {
        let (Some((b, c)), Some((f, g))) = (self.children(a), self.children(up)) else {
            return a;
        };
        let stay = if up == b { c } else { b };
        let (keep, moved) = if self.nodes[f].height > self.nodes[g].height {
            (f, g)
        } else {
            (g, f)
        };

        let parent = self.nodes[a].parent;
        self.nodes[up].parent = parent;
        match parent {
            Some(p) => self.replace_child(p, a, up),
            None => self.root = Some(up),
        }

        self.nodes[up].left = Some(a);
        self.nodes[up].right = Some(keep);
        self.nodes[a].parent = Some(up);

        self.nodes[a].left = Some(stay);
        self.nodes[a].right = Some(moved);
        self.nodes[moved].parent = Some(a);

        self.refresh(a);
        self.refresh(up);
        up
    }
}
