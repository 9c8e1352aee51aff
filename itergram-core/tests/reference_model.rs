//! Cross-checks the arena tree against a direct recursive implementation
//! that allocates every child eagerly on expansion.

use float_cmp::approx_eq;
use itergram_core::model::{ContextTree, fit};
use itergram_core::text::{Symbol, SymbolStream};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use rstest::rstest;

struct EagerNode {
	counts: Vec<u64>,
	/// Increments that reached this node, the expansion credit included.
	visits: u64,
	children: Option<Vec<EagerNode>>,
}

impl EagerNode {
	fn new(vocab_size: usize) -> Self {
		Self { counts: vec![0; vocab_size], visits: 0, children: None }
	}

	fn increment(&mut self, symbol: Symbol, context: &[Symbol], threshold: u64) {
		self.visits += 1;
		self.counts[symbol as usize] += 1;
		let Some((&preceding, rest)) = context.split_last() else {
			return;
		};
		if let Some(children) = &mut self.children {
			children[preceding as usize].increment(symbol, rest, threshold);
			return;
		}
		if self.counts.iter().sum::<u64>() > threshold {
			let vocab_size = self.counts.len();
			let mut children: Vec<EagerNode> = (0..vocab_size).map(|_| EagerNode::new(vocab_size)).collect();
			children[preceding as usize].counts[symbol as usize] = 1;
			children[preceding as usize].visits = 1;
			self.children = Some(children);
		}
	}

	fn probabilities(&self, context: &[Symbol]) -> Vec<f64> {
		let mut node = self;
		for &preceding in context.iter().rev() {
			match &node.children {
				Some(children) => node = &children[preceding as usize],
				None => break,
			}
		}
		let denominator = (node.counts.iter().sum::<u64>() + node.counts.len() as u64) as f64;
		node.counts.iter().map(|&c| (c + 1) as f64 / denominator).collect()
	}

	fn exact(&self, context: &[Symbol]) -> Option<&EagerNode> {
		let mut node = self;
		for &preceding in context.iter().rev() {
			node = &node.children.as_ref()?[preceding as usize];
		}
		Some(node)
	}
}

fn all_contexts(vocab_size: usize, max_len: usize) -> Vec<Vec<Symbol>> {
	let mut contexts = vec![Vec::new()];
	let mut frontier = vec![Vec::new()];
	for _ in 0..max_len {
		let mut next = Vec::new();
		for context in &frontier {
			for symbol in 0..vocab_size as Symbol {
				let mut longer: Vec<Symbol> = context.clone();
				longer.insert(0, symbol);
				next.push(longer);
			}
		}
		contexts.extend(next.iter().cloned());
		frontier = next;
	}
	contexts
}

fn random_stream(vocab_size: usize, len: usize, seed: u64) -> SymbolStream {
	let mut rng = StdRng::seed_from_u64(seed);
	// skewed so that some contexts are frequent and others rare
	let symbols: Vec<Symbol> = (0..len)
		.map(|_| {
			let r: f64 = rng.random_range(0.0..1.0);
			((r * r) * vocab_size as f64) as Symbol
		})
		.collect();
	SymbolStream::from(symbols)
}

#[rstest]
#[case(3, 1, 0, 1)]
#[case(3, 2, 2, 2)]
#[case(4, 3, 5, 3)]
#[case(5, 2, 20, 4)]
#[case(2, 4, 1, 5)]
fn arena_matches_eager_tree(#[case] vocab_size: usize, #[case] n: usize, #[case] threshold: u64, #[case] seed: u64) {
	let stream = random_stream(vocab_size, 400, seed);
	let mut tree = ContextTree::new(vocab_size, threshold);
	let mut eager = EagerNode::new(vocab_size);

	for _ in 0..2 {
		fit(&stream, n, &mut tree).unwrap();
		for (context, target) in stream.positions(n) {
			eager.increment(target, context, threshold);
		}
	}

	for context in all_contexts(vocab_size, n) {
		let expected = eager.probabilities(&context);
		let actual = tree.probabilities(&context).unwrap();
		for (symbol, p) in actual.iter() {
			assert!(
				approx_eq!(f64, p, expected[symbol as usize], ulps = 4),
				"context {context:?}, symbol {symbol}: {p} vs {}",
				expected[symbol as usize]
			);
		}

		match (tree.counts_at(&context), eager.exact(&context)) {
			(Some(counts), Some(node)) => {
				assert_eq!(counts, &node.counts[..], "context {context:?}");
				assert_eq!(counts.iter().sum::<u64>(), node.visits, "context {context:?}");
			}
			// unmaterialized children are exactly the never-reached ones
			(None, Some(node)) => assert_eq!(node.visits, 0, "context {context:?}"),
			(None, None) => {}
			(Some(_), None) => panic!("arena has a node the eager tree lacks: {context:?}"),
		}
	}
}
