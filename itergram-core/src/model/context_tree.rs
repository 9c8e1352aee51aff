use serde::{Deserialize, Serialize};

use super::distribution::Distribution;
use crate::error::{ModelError, Result};
use crate::text::Symbol;

/// Index of a node inside the tree's arena.
pub type NodeId = usize;

const ROOT: NodeId = 0;

/// Frequency table for one backward context.
///
/// `counts[s]` is how many times `s` followed this context. Once the node
/// expands, `children[p]` holds the node for the context extended by the
/// preceding symbol `p`. A `None` slot in an expanded node stands for a
/// child with all-zero counts that has not been materialized yet.
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq, Eq)]
struct Node {
	counts: Vec<u64>,
	/// Sum of `counts`, kept alongside to avoid rescans.
	total: u64,
	/// `None` until the node expands.
	children: Option<Vec<Option<NodeId>>>,
}

impl Node {
	fn empty(vocab_size: usize) -> Self {
		Self { counts: vec![0; vocab_size], total: 0, children: None }
	}

	fn record(&mut self, symbol: Symbol) {
		self.counts[symbol as usize] += 1;
		self.total += 1;
	}
}

/// What a node holds for one preceding symbol.
enum Slot {
	Child(NodeId),
	/// Expanded, but this child has never been reached.
	Vacant,
	Unexpanded,
}

/// Size summary of a fitted tree.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct TreeStats {
	pub nodes: usize,
	pub expanded: usize,
	pub max_depth: usize,
}

/// The adaptive-depth count matrix.
///
/// A tree of frequency tables keyed by symbols read backward from the
/// prediction point. The root holds unconditional counts; a node only starts
/// tracking longer contexts (one child per preceding symbol) once its total
/// count exceeds `threshold`. Frequent contexts therefore get long,
/// symbol-specific histories while rare ones stay flat.
///
/// Nodes live in a flat arena and refer to their children by index, so both
/// update and lookup are iterative walks bounded only by the context length.
///
/// # Invariants
/// - `nodes[0]` is the root (empty context)
/// - every node has `vocab_size` counts and `total == counts.iter().sum()`
/// - every non-root node is referenced by exactly one child slot
/// - counts only grow, children are never removed
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq, Eq)]
#[serde(try_from = "TreeParts")]
pub struct ContextTree {
	vocab_size: usize,
	threshold: u64,
	nodes: Vec<Node>,
}

impl ContextTree {
	/// Creates a tree holding only an all-zero root.
	pub fn new(vocab_size: usize, threshold: u64) -> Self {
		Self { vocab_size, threshold, nodes: vec![Node::empty(vocab_size)] }
	}

	pub fn vocab_size(&self) -> usize {
		self.vocab_size
	}

	pub fn threshold(&self) -> u64 {
		self.threshold
	}

	/// Records that `symbol` followed `context` (most recent symbol last).
	///
	/// Walks from the root toward longer contexts, adding one to
	/// `counts[symbol]` at every node on the way:
	/// - if the node has a child for the next preceding symbol, continue there
	///   (an unreached child of an expanded node is materialized first);
	/// - otherwise, if the node's total now exceeds `threshold`, expand it and
	///   credit this occurrence to the new child for that preceding symbol;
	/// - stop once the context is exhausted.
	///
	/// The credited occurrence stays counted in the parent as well.
	///
	/// # Errors
	/// Returns `SymbolOutOfRange` if `symbol` or any context symbol does not
	/// belong to the vocabulary. The tree is left untouched in that case.
	pub fn increment(&mut self, symbol: Symbol, context: &[Symbol]) -> Result<()> {
		self.check_symbol(symbol)?;
		self.check_context(context)?;

		let mut node = ROOT;
		let mut context = context;
		loop {
			self.nodes[node].record(symbol);
			let Some((&preceding, rest)) = context.split_last() else {
				return Ok(());
			};
			node = match self.slot(node, preceding) {
				Slot::Child(child) => child,
				Slot::Vacant => self.attach(node, preceding, Node::empty(self.vocab_size)),
				Slot::Unexpanded => {
					if self.nodes[node].total > self.threshold {
						self.expand(node, preceding, symbol);
					}
					return Ok(());
				}
			};
			context = rest;
		}
	}

	/// Smoothed next-symbol distribution for `context` (most recent last).
	///
	/// Descends while a child exists for each successive preceding symbol and
	/// uses the deepest node reached:
	/// `p(s) = (counts[s] + 1) / (total + vocab_size)`.
	///
	/// # Errors
	/// Returns `SymbolOutOfRange` for context symbols outside the vocabulary.
	pub fn probabilities(&self, context: &[Symbol]) -> Result<Distribution> {
		self.check_context(context)?;
		Ok(match self.deepest(context) {
			Some(node) => Distribution::smoothed(&node.counts, node.total),
			None => Distribution::uniform(self.vocab_size),
		})
	}

	/// Counts of the node for exactly `context`, if that node is allocated.
	///
	/// Unlike `probabilities`, this does not fall back to a shorter context.
	pub fn counts_at(&self, context: &[Symbol]) -> Option<&[u64]> {
		let mut node = ROOT;
		for &preceding in context.iter().rev() {
			match self.slot(node, preceding) {
				Slot::Child(child) => node = child,
				Slot::Vacant | Slot::Unexpanded => return None,
			}
		}
		Some(&self.nodes[node].counts)
	}

	/// Number of allocated nodes, root included.
	pub fn node_count(&self) -> usize {
		self.nodes.len()
	}

	pub fn stats(&self) -> TreeStats {
		let mut stats = TreeStats { nodes: self.nodes.len(), expanded: 0, max_depth: 0 };
		let mut pending = vec![(ROOT, 0)];
		while let Some((node, depth)) = pending.pop() {
			stats.max_depth = stats.max_depth.max(depth);
			if let Some(children) = &self.nodes[node].children {
				stats.expanded += 1;
				pending.extend(children.iter().flatten().map(|&child| (child, depth + 1)));
			}
		}
		stats
	}

	/// Deepest node reachable along `context`. `None` means the walk ended
	/// on an unreached child of an expanded node, whose counts are all zero.
	fn deepest(&self, context: &[Symbol]) -> Option<&Node> {
		let mut node = ROOT;
		for &preceding in context.iter().rev() {
			match self.slot(node, preceding) {
				Slot::Child(child) => node = child,
				Slot::Vacant => return None,
				Slot::Unexpanded => break,
			}
		}
		Some(&self.nodes[node])
	}

	fn slot(&self, node: NodeId, preceding: Symbol) -> Slot {
		match &self.nodes[node].children {
			None => Slot::Unexpanded,
			Some(children) => match children[preceding as usize] {
				Some(child) => Slot::Child(child),
				None => Slot::Vacant,
			},
		}
	}

	/// Turns `node` into an expanded node and gives the child for
	/// `preceding` the occurrence of `symbol` that triggered the expansion.
	fn expand(&mut self, node: NodeId, preceding: Symbol, symbol: Symbol) {
		self.nodes[node].children = Some(vec![None; self.vocab_size]);
		let mut child = Node::empty(self.vocab_size);
		child.record(symbol);
		self.attach(node, preceding, child);
	}

	fn attach(&mut self, parent: NodeId, preceding: Symbol, child: Node) -> NodeId {
		let id = self.nodes.len();
		self.nodes.push(child);
		if let Some(children) = &mut self.nodes[parent].children {
			children[preceding as usize] = Some(id);
		}
		id
	}

	fn check_symbol(&self, symbol: Symbol) -> Result<()> {
		if (symbol as usize) < self.vocab_size {
			Ok(())
		} else {
			Err(ModelError::SymbolOutOfRange { symbol, vocab_size: self.vocab_size })
		}
	}

	fn check_context(&self, context: &[Symbol]) -> Result<()> {
		context.iter().try_for_each(|&symbol| self.check_symbol(symbol))
	}
}

/// Untrusted shape of a serialized tree, checked before use.
#[derive(Deserialize)]
struct TreeParts {
	vocab_size: usize,
	threshold: u64,
	nodes: Vec<Node>,
}

impl TryFrom<TreeParts> for ContextTree {
	type Error = ModelError;

	fn try_from(parts: TreeParts) -> Result<Self> {
		let TreeParts { vocab_size, threshold, nodes } = parts;
		if nodes.is_empty() {
			return Err(corrupt("tree has no root"));
		}

		for (id, node) in nodes.iter().enumerate() {
			if node.counts.len() != vocab_size {
				return Err(corrupt(format!("node {id} has {} counts, expected {vocab_size}", node.counts.len())));
			}
			if node.counts.iter().sum::<u64>() != node.total {
				return Err(corrupt(format!("node {id} total does not match its counts")));
			}
			if let Some(children) = &node.children {
				if children.len() != vocab_size {
					return Err(corrupt(format!("node {id} has {} child slots", children.len())));
				}
				if let Some(&child) = children.iter().flatten().find(|&&child| child >= nodes.len()) {
					return Err(corrupt(format!("node {id} points to missing node {child}")));
				}
			}
		}

		// Every node reachable from the root exactly once
		let mut seen = vec![false; nodes.len()];
		let mut pending = vec![ROOT];
		while let Some(id) = pending.pop() {
			if std::mem::replace(&mut seen[id], true) {
				return Err(corrupt(format!("node {id} is shared or part of a cycle")));
			}
			if let Some(children) = &nodes[id].children {
				pending.extend(children.iter().flatten().copied());
			}
		}
		if let Some(orphan) = seen.iter().position(|&reached| !reached) {
			return Err(corrupt(format!("node {orphan} is unreachable from the root")));
		}

		Ok(Self { vocab_size, threshold, nodes })
	}
}

fn corrupt(message: impl Into<String>) -> ModelError {
	ModelError::CorruptModel(message.into())
}
