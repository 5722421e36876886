use std::collections::HashMap;

use super::genome::NodeId;

/// Innovation number of a connection gene.
pub type Innovation = u64;

/// Assigns innovation numbers and hidden node ids for one population.
///
/// The same structural mutation always gets the same number: connecting `a → b` yields
/// one innovation, and splitting a given connection yields one hidden node id, no matter
/// which genome performs it. This keeps genes of independently mutated genomes aligned for
/// crossover and compatibility distance.
#[derive(Debug, Clone, Default)]
pub struct InnovationTracker {
    next_innovation: Innovation,
    next_node_id: NodeId,
    connections: HashMap<(NodeId, NodeId), Innovation>,
    splits: HashMap<Innovation, NodeId>,
}

impl InnovationTracker {
    /// Creates a tracker for genomes whose first `reserved_nodes` ids are inputs and outputs.
    #[must_use]
    pub fn new(reserved_nodes: usize) -> Self {
        Self {
            next_node_id: reserved_nodes,
            ..Self::default()
        }
    }

    pub fn connection(&mut self, input: NodeId, output: NodeId) -> Innovation {
        *self.connections.entry((input, output)).or_insert_with(|| {
            let innovation = self.next_innovation;
            self.next_innovation += 1;
            innovation
        })
    }

    /// Id of the hidden node created by splitting the connection `innovation`.
    pub fn split_node(&mut self, innovation: Innovation) -> NodeId {
        *self.splits.entry(innovation).or_insert_with(|| {
            let id = self.next_node_id;
            self.next_node_id += 1;
            id
        })
    }
}
