use log::{debug, info};

use super::context_tree::ContextTree;
use crate::error::{ModelError, Result};
use crate::text::SymbolStream;

/// Streams `stream` through `tree` once.
///
/// For every position `i` in `[n, len)` the target `stream[i]` is recorded
/// under the context `stream[i - n..i]`. Earlier positions lack history and
/// are skipped.
///
/// Returns the number of positions recorded.
pub fn fit(stream: &SymbolStream, n: usize, tree: &mut ContextTree) -> Result<usize> {
	let mut positions = 0;
	for (context, target) in stream.positions(n) {
		tree.increment(target, context)?;
		positions += 1;
	}
	Ok(positions)
}

/// Runs `iterations` sequential passes of [`fit`] over the same stream.
///
/// Repeating a pass weights a small corpus against a much larger one that
/// was fitted only once, without interleaving the two.
///
/// # Errors
/// Returns `InvalidConfig` when `iterations` is zero.
pub fn fit_passes(stream: &SymbolStream, n: usize, tree: &mut ContextTree, iterations: usize) -> Result<usize> {
	if iterations == 0 {
		return Err(ModelError::InvalidConfig("at least one fitting pass is required".to_owned()));
	}

	let mut positions = 0;
	for pass in 1..=iterations {
		positions += fit(stream, n, tree)?;
		let stats = tree.stats();
		info!("pass {pass}/{iterations}: {} nodes, {} expanded, depth {}", stats.nodes, stats.expanded, stats.max_depth);
	}
	debug!("fitted {positions} positions over {iterations} passes");
	Ok(positions)
}
