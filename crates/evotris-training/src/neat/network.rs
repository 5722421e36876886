use std::collections::HashMap;

use super::genome::{Genome, NodeKind};

#[derive(Debug, Clone)]
struct NodeEval {
    slot: usize,
    bias: f32,
    links: Vec<(usize, f32)>,
}

/// Phenotype of a [`Genome`]: its enabled connections evaluated in topological order with
/// a `tanh` activation on every hidden and output node.
///
/// Disabled connections are ignored. A node without incoming connections outputs
/// `tanh(bias)`.
#[derive(Debug, Clone)]
pub struct FeedForwardNetwork {
    num_inputs: usize,
    num_outputs: usize,
    num_slots: usize,
    evals: Vec<NodeEval>,
}

impl FeedForwardNetwork {
    #[must_use]
    pub fn new(genome: &Genome) -> Self {
        // slots follow node order, so inputs occupy the first slots and outputs the next
        let slots: HashMap<_, _> = genome
            .nodes()
            .iter()
            .enumerate()
            .map(|(slot, node)| (node.id, slot))
            .collect();

        let mut incoming: HashMap<usize, Vec<(usize, f32)>> = HashMap::new();
        for conn in genome.connections().iter().filter(|c| c.enabled) {
            let (Some(&from), Some(&to)) = (slots.get(&conn.input), slots.get(&conn.output)) else {
                continue;
            };
            incoming.entry(to).or_default().push((from, conn.weight));
        }

        let evals = genome
            .topological_order()
            .into_iter()
            .filter_map(|id| {
                let node = genome.node(id)?;
                if node.kind == NodeKind::Input {
                    return None;
                }
                let slot = slots[&id];
                Some(NodeEval {
                    slot,
                    bias: node.bias,
                    links: incoming.remove(&slot).unwrap_or_default(),
                })
            })
            .collect();

        Self {
            num_inputs: genome.num_inputs(),
            num_outputs: genome.num_outputs(),
            num_slots: genome.nodes().len(),
            evals,
        }
    }

    #[must_use]
    pub fn num_inputs(&self) -> usize {
        self.num_inputs
    }

    #[must_use]
    pub fn num_outputs(&self) -> usize {
        self.num_outputs
    }

    /// Runs the network once and returns one value in `(-1, 1)` per output node.
    ///
    /// Missing inputs read as zero and surplus inputs are ignored.
    #[must_use]
    pub fn activate(&self, inputs: &[f32]) -> Vec<f32> {
        let mut values = vec![0.0f32; self.num_slots];
        let n = inputs.len().min(self.num_inputs);
        values[..n].copy_from_slice(&inputs[..n]);

        for eval in &self.evals {
            let sum = eval
                .links
                .iter()
                .fold(eval.bias, |acc, &(from, weight)| acc + values[from] * weight);
            values[eval.slot] = sum.tanh();
        }

        values[self.num_inputs..self.num_inputs + self.num_outputs].to_vec()
    }
}
