use std::{
    collections::{HashMap, HashSet},
    ops::Range,
};

use rand::{Rng, seq::IndexedRandom};
use rand_distr::{Distribution, Normal};
use serde::{Deserialize, Serialize};

use super::{
    innovation::{Innovation, InnovationTracker},
    params::NeatParams,
};

/// Identifier of a node gene. Inputs use `0..num_inputs`, outputs the next `num_outputs`
/// ids, hidden nodes anything above.
pub type NodeId = usize;

const ADD_CONNECTION_ATTEMPTS: usize = 20;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum NodeKind {
    Input,
    Output,
    Hidden,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct NodeGene {
    pub id: NodeId,
    pub kind: NodeKind,
    pub bias: f32,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ConnectionGene {
    pub innovation: Innovation,
    pub input: NodeId,
    pub output: NodeId,
    pub weight: f32,
    pub enabled: bool,
}

/// Structural problems found by [`Genome::validate`].
#[derive(Debug, Clone, PartialEq, Eq, derive_more::Display, derive_more::Error)]
pub enum GenomeError {
    #[display("genome needs at least one input and one output")]
    Empty,
    #[display("node {id} is out of order or has the wrong kind")]
    MisplacedNode { id: NodeId },
    #[display("connection {innovation} is duplicated or out of order")]
    UnorderedConnection { innovation: Innovation },
    #[display("connection {innovation} links {input} -> {output}, which is not allowed")]
    InvalidConnection {
        innovation: Innovation,
        input: NodeId,
        output: NodeId,
    },
    #[display("connections form a cycle")]
    Cycle,
}

/// A NEAT genome: node genes sorted by id and connection genes sorted by innovation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Genome {
    num_inputs: usize,
    num_outputs: usize,
    nodes: Vec<NodeGene>,
    connections: Vec<ConnectionGene>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    fitness: Option<f64>,
}

fn gaussian<R>(stdev: f32, rng: &mut R) -> f32
where
    R: Rng + ?Sized,
{
    Normal::new(0.0, stdev).map_or(0.0, |normal| normal.sample(rng))
}

impl Genome {
    /// Creates a genome with every input connected to every output.
    pub fn fully_connected<R>(
        num_inputs: usize,
        num_outputs: usize,
        tracker: &mut InnovationTracker,
        params: &NeatParams,
        rng: &mut R,
    ) -> Self
    where
        R: Rng + ?Sized,
    {
        let inputs = (0..num_inputs).map(|id| NodeGene {
            id,
            kind: NodeKind::Input,
            bias: 0.0,
        });
        let outputs = (num_inputs..num_inputs + num_outputs).map(|id| NodeGene {
            id,
            kind: NodeKind::Output,
            bias: gaussian(params.init_stdev, rng),
        });
        let nodes = inputs.chain(outputs).collect::<Vec<_>>();

        let mut connections = Vec::with_capacity(num_inputs * num_outputs);
        for input in 0..num_inputs {
            for output in num_inputs..num_inputs + num_outputs {
                connections.push(ConnectionGene {
                    innovation: tracker.connection(input, output),
                    input,
                    output,
                    weight: gaussian(params.init_stdev, rng),
                    enabled: true,
                });
            }
        }
        connections.sort_by_key(|c| c.innovation);

        Self {
            num_inputs,
            num_outputs,
            nodes,
            connections,
            fitness: None,
        }
    }

    /// Assembles a genome from explicit genes, sorting them and checking the structure.
    pub fn from_parts(
        num_inputs: usize,
        num_outputs: usize,
        mut nodes: Vec<NodeGene>,
        mut connections: Vec<ConnectionGene>,
    ) -> Result<Self, GenomeError> {
        nodes.sort_by_key(|n| n.id);
        connections.sort_by_key(|c| c.innovation);
        let genome = Self {
            num_inputs,
            num_outputs,
            nodes,
            connections,
            fitness: None,
        };
        genome.validate()?;
        Ok(genome)
    }

    #[must_use]
    pub fn num_inputs(&self) -> usize {
        self.num_inputs
    }

    #[must_use]
    pub fn num_outputs(&self) -> usize {
        self.num_outputs
    }

    #[must_use]
    pub fn input_ids(&self) -> Range<NodeId> {
        0..self.num_inputs
    }

    #[must_use]
    pub fn output_ids(&self) -> Range<NodeId> {
        self.num_inputs..self.num_inputs + self.num_outputs
    }

    #[must_use]
    pub fn nodes(&self) -> &[NodeGene] {
        &self.nodes
    }

    #[must_use]
    pub fn connections(&self) -> &[ConnectionGene] {
        &self.connections
    }

    #[must_use]
    pub fn node(&self, id: NodeId) -> Option<&NodeGene> {
        self.nodes
            .binary_search_by_key(&id, |n| n.id)
            .ok()
            .map(|i| &self.nodes[i])
    }

    #[must_use]
    pub fn fitness(&self) -> Option<f64> {
        self.fitness
    }

    pub fn set_fitness(&mut self, fitness: f64) {
        self.fitness = Some(fitness);
    }

    pub fn clear_fitness(&mut self) {
        self.fitness = None;
    }

    #[must_use]
    pub fn num_hidden(&self) -> usize {
        self.nodes.len() - self.num_inputs - self.num_outputs
    }

    #[must_use]
    pub fn num_enabled_connections(&self) -> usize {
        self.connections.iter().filter(|c| c.enabled).count()
    }

    /// Checks node layout, connection ordering and endpoints, and acyclicity.
    pub fn validate(&self) -> Result<(), GenomeError> {
        if self.num_inputs == 0 || self.num_outputs == 0 {
            return Err(GenomeError::Empty);
        }
        let reserved = self.num_inputs + self.num_outputs;
        if self.nodes.len() < reserved {
            return Err(GenomeError::Empty);
        }
        for (i, node) in self.nodes.iter().enumerate() {
            let expected_kind = if self.input_ids().contains(&node.id) {
                NodeKind::Input
            } else if self.output_ids().contains(&node.id) {
                NodeKind::Output
            } else {
                NodeKind::Hidden
            };
            let in_order = if i < reserved {
                node.id == i
            } else {
                node.id > self.nodes[i - 1].id
            };
            if !in_order || node.kind != expected_kind {
                return Err(GenomeError::MisplacedNode { id: node.id });
            }
        }

        let mut seen = HashSet::new();
        for (i, conn) in self.connections.iter().enumerate() {
            if i > 0 && conn.innovation <= self.connections[i - 1].innovation {
                return Err(GenomeError::UnorderedConnection {
                    innovation: conn.innovation,
                });
            }
            let valid_input = self
                .node(conn.input)
                .is_some_and(|n| n.kind != NodeKind::Output);
            let valid_output = self
                .node(conn.output)
                .is_some_and(|n| n.kind != NodeKind::Input);
            if !valid_input || !valid_output || !seen.insert((conn.input, conn.output)) {
                return Err(GenomeError::InvalidConnection {
                    innovation: conn.innovation,
                    input: conn.input,
                    output: conn.output,
                });
            }
        }

        if self.topological_order().len() != self.nodes.len() {
            return Err(GenomeError::Cycle);
        }
        Ok(())
    }

    /// Node ids ordered so that every connection (enabled or not) points forward.
    ///
    /// Nodes on a cycle are left out, so a shorter result means the graph is cyclic.
    pub(crate) fn topological_order(&self) -> Vec<NodeId> {
        let mut indegree: HashMap<NodeId, usize> = self.nodes.iter().map(|n| (n.id, 0)).collect();
        let mut outgoing: HashMap<NodeId, Vec<NodeId>> = HashMap::new();
        for conn in &self.connections {
            if let Some(d) = indegree.get_mut(&conn.output) {
                *d += 1;
            }
            outgoing.entry(conn.input).or_default().push(conn.output);
        }

        let mut ready: Vec<NodeId> = self
            .nodes
            .iter()
            .filter(|n| indegree[&n.id] == 0)
            .map(|n| n.id)
            .rev()
            .collect();
        let mut order = Vec::with_capacity(self.nodes.len());
        while let Some(id) = ready.pop() {
            order.push(id);
            for next in outgoing.get(&id).into_iter().flatten() {
                if let Some(d) = indegree.get_mut(next) {
                    *d -= 1;
                    if *d == 0 {
                        ready.push(*next);
                    }
                }
            }
        }
        order
    }

    fn has_connection(&self, input: NodeId, output: NodeId) -> bool {
        self.connections
            .iter()
            .any(|c| c.input == input && c.output == output)
    }

    /// Returns `true` if adding `input → output` would close a cycle.
    #[must_use]
    pub fn creates_cycle(&self, input: NodeId, output: NodeId) -> bool {
        if input == output {
            return true;
        }
        let mut visited = HashSet::new();
        let mut stack = vec![output];
        while let Some(id) = stack.pop() {
            if id == input {
                return true;
            }
            if !visited.insert(id) {
                continue;
            }
            stack.extend(
                self.connections
                    .iter()
                    .filter(|c| c.input == id)
                    .map(|c| c.output),
            );
        }
        false
    }

    /// Applies every mutation operator with its configured probability.
    pub fn mutate<R>(&mut self, tracker: &mut InnovationTracker, params: &NeatParams, rng: &mut R)
    where
        R: Rng + ?Sized,
    {
        if rng.random_bool(params.add_node_prob) {
            self.mutate_add_node(tracker, rng);
        }
        if rng.random_bool(params.add_connection_prob) {
            self.mutate_add_connection(tracker, params, rng);
        }
        if rng.random_bool(params.toggle_enable_prob) {
            self.mutate_toggle_enable(rng);
        }
        self.mutate_weights(params, rng);
        self.mutate_biases(params, rng);
    }

    pub fn mutate_weights<R>(&mut self, params: &NeatParams, rng: &mut R)
    where
        R: Rng + ?Sized,
    {
        let limit = params.weight_limit;
        for conn in &mut self.connections {
            if !rng.random_bool(params.weight_mutate_rate) {
                continue;
            }
            let weight = if rng.random_bool(params.weight_replace_rate) {
                gaussian(params.init_stdev, rng)
            } else {
                conn.weight + gaussian(params.weight_perturb_power, rng)
            };
            conn.weight = weight.clamp(-limit, limit);
        }
    }

    pub fn mutate_biases<R>(&mut self, params: &NeatParams, rng: &mut R)
    where
        R: Rng + ?Sized,
    {
        let limit = params.weight_limit;
        for node in &mut self.nodes {
            if node.kind == NodeKind::Input || !rng.random_bool(params.bias_mutate_rate) {
                continue;
            }
            node.bias = (node.bias + gaussian(params.bias_perturb_power, rng)).clamp(-limit, limit);
        }
    }

    /// Adds a new connection between two unconnected nodes; returns `false` if no
    /// acceptable pair was found.
    pub fn mutate_add_connection<R>(
        &mut self,
        tracker: &mut InnovationTracker,
        params: &NeatParams,
        rng: &mut R,
    ) -> bool
    where
        R: Rng + ?Sized,
    {
        let sources: Vec<NodeId> = self
            .nodes
            .iter()
            .filter(|n| n.kind != NodeKind::Output)
            .map(|n| n.id)
            .collect();
        let targets: Vec<NodeId> = self
            .nodes
            .iter()
            .filter(|n| n.kind != NodeKind::Input)
            .map(|n| n.id)
            .collect();

        for _ in 0..ADD_CONNECTION_ATTEMPTS {
            let (Some(&input), Some(&output)) = (sources.choose(rng), targets.choose(rng)) else {
                return false;
            };
            if self.has_connection(input, output) || self.creates_cycle(input, output) {
                continue;
            }
            self.connections.push(ConnectionGene {
                innovation: tracker.connection(input, output),
                input,
                output,
                weight: gaussian(params.init_stdev, rng),
                enabled: true,
            });
            self.connections.sort_by_key(|c| c.innovation);
            return true;
        }
        false
    }

    /// Splits a random enabled connection `a → b` into `a → new → b`.
    ///
    /// The old connection is disabled, `a → new` gets weight 1 and `new → b` the old
    /// weight. Returns `false` if there is nothing to split.
    pub fn mutate_add_node<R>(&mut self, tracker: &mut InnovationTracker, rng: &mut R) -> bool
    where
        R: Rng + ?Sized,
    {
        let enabled: Vec<usize> = (0..self.connections.len())
            .filter(|&i| self.connections[i].enabled)
            .collect();
        let Some(&index) = enabled.choose(rng) else {
            return false;
        };
        let old = self.connections[index];
        let id = tracker.split_node(old.innovation);
        if self.node(id).is_some() {
            return false;
        }

        self.connections[index].enabled = false;
        self.nodes.push(NodeGene {
            id,
            kind: NodeKind::Hidden,
            bias: 0.0,
        });
        self.nodes.sort_by_key(|n| n.id);
        self.connections.push(ConnectionGene {
            innovation: tracker.connection(old.input, id),
            input: old.input,
            output: id,
            weight: 1.0,
            enabled: true,
        });
        self.connections.push(ConnectionGene {
            innovation: tracker.connection(id, old.output),
            input: id,
            output: old.output,
            weight: old.weight,
            enabled: true,
        });
        self.connections.sort_by_key(|c| c.innovation);
        true
    }

    pub fn mutate_toggle_enable<R>(&mut self, rng: &mut R)
    where
        R: Rng + ?Sized,
    {
        if self.connections.is_empty() {
            return;
        }
        let index = rng.random_range(0..self.connections.len());
        self.connections[index].enabled ^= true;
    }

    /// Breeds two genomes.
    ///
    /// Matching genes are inherited from either parent at random; disjoint and excess genes
    /// come from the fitter parent (the first one on a tie), so the child has the fitter
    /// parent's structure.
    pub fn crossover<R>(parent1: &Self, parent2: &Self, params: &NeatParams, rng: &mut R) -> Self
    where
        R: Rng + ?Sized,
    {
        let fitness = |g: &Self| g.fitness.unwrap_or(f64::MIN);
        let (fitter, other) = if fitness(parent2) > fitness(parent1) {
            (parent2, parent1)
        } else {
            (parent1, parent2)
        };

        let other_connections: HashMap<Innovation, &ConnectionGene> = other
            .connections
            .iter()
            .map(|c| (c.innovation, c))
            .collect();
        let connections = fitter
            .connections
            .iter()
            .map(|gene| {
                let Some(&matching) = other_connections.get(&gene.innovation) else {
                    return *gene;
                };
                let mut child = if rng.random_bool(0.5) { *gene } else { *matching };
                if !gene.enabled || !matching.enabled {
                    child.enabled = !rng.random_bool(params.inherit_disabled_prob);
                }
                child
            })
            .collect();

        let nodes = fitter
            .nodes
            .iter()
            .map(|node| match other.node(node.id) {
                Some(matching) if rng.random_bool(0.5) => NodeGene {
                    bias: matching.bias,
                    ..*node
                },
                _ => *node,
            })
            .collect();

        Self {
            num_inputs: fitter.num_inputs,
            num_outputs: fitter.num_outputs,
            nodes,
            connections,
            fitness: None,
        }
    }

    /// Compatibility distance `c1 · (E + D) / N + c3 · W̄`.
    ///
    /// `E + D` counts connection genes present in only one genome, `N` is the larger
    /// connection count, and `W̄` is the mean absolute weight difference of matching genes.
    #[expect(clippy::cast_precision_loss)]
    #[must_use]
    pub fn distance(&self, other: &Self, params: &NeatParams) -> f64 {
        let mut a = self.connections.iter().peekable();
        let mut b = other.connections.iter().peekable();
        let mut matching = 0usize;
        let mut unmatched = 0usize;
        let mut weight_diff = 0.0f64;

        loop {
            let gene = |c: &&ConnectionGene| (c.innovation, c.weight);
            match (a.peek().map(gene), b.peek().map(gene)) {
                (Some((x, wx)), Some((y, wy))) if x == y => {
                    matching += 1;
                    weight_diff += f64::from((wx - wy).abs());
                    a.next();
                    b.next();
                }
                (Some((x, _)), Some((y, _))) => {
                    unmatched += 1;
                    if x < y {
                        a.next();
                    } else {
                        b.next();
                    }
                }
                (Some(_), None) => {
                    unmatched += 1;
                    a.next();
                }
                (None, Some(_)) => {
                    unmatched += 1;
                    b.next();
                }
                (None, None) => break,
            }
        }

        let n = self.connections.len().max(other.connections.len()).max(1) as f64;
        let mean_weight_diff = if matching == 0 {
            0.0
        } else {
            weight_diff / matching as f64
        };
        params.excess_coefficient * unmatched as f64 / n
            + params.weight_coefficient * mean_weight_diff
    }
}

#[cfg(test)]
mod tests {
    use rand::SeedableRng as _;
    use rand_pcg::Pcg32;

    use super::*;

    fn fresh(num_inputs: usize, num_outputs: usize, seed: u64) -> (Genome, InnovationTracker) {
        let mut tracker = InnovationTracker::new(num_inputs + num_outputs);
        let mut rng = Pcg32::seed_from_u64(seed);
        let genome = Genome::fully_connected(
            num_inputs,
            num_outputs,
            &mut tracker,
            &NeatParams::default(),
            &mut rng,
        );
        (genome, tracker)
    }

    #[test]
    fn test_fully_connected_layout() {
        let (genome, _) = fresh(3, 2, 0);
        assert_eq!(genome.nodes().len(), 5);
        assert_eq!(genome.connections().len(), 6);
        assert_eq!(genome.num_hidden(), 0);
        assert_eq!(genome.validate(), Ok(()));
        assert!(genome.connections().iter().all(|c| c.enabled));
    }

    #[test]
    fn test_add_node_splits_connection() {
        let (mut genome, mut tracker) = fresh(2, 1, 1);
        let mut rng = Pcg32::seed_from_u64(1);
        assert!(genome.mutate_add_node(&mut tracker, &mut rng));

        assert_eq!(genome.num_hidden(), 1);
        assert_eq!(genome.connections().len(), 4);
        assert_eq!(genome.num_enabled_connections(), 3);
        let disabled = genome.connections().iter().find(|c| !c.enabled).unwrap();
        let hidden = genome.nodes().last().unwrap().id;
        let into = genome
            .connections()
            .iter()
            .find(|c| c.output == hidden)
            .unwrap();
        let out_of = genome
            .connections()
            .iter()
            .find(|c| c.input == hidden)
            .unwrap();
        assert_eq!((into.input, into.weight), (disabled.input, 1.0));
        assert_eq!((out_of.output, out_of.weight), (disabled.output, disabled.weight));
        assert_eq!(genome.validate(), Ok(()));
    }

    #[test]
    fn test_repeated_mutation_stays_acyclic() {
        let (mut genome, mut tracker) = fresh(4, 2, 2);
        let mut rng = Pcg32::seed_from_u64(2);
        let params = NeatParams {
            add_node_prob: 0.5,
            add_connection_prob: 0.9,
            toggle_enable_prob: 0.3,
            ..NeatParams::default()
        };
        for _ in 0..300 {
            genome.mutate(&mut tracker, &params, &mut rng);
            assert_eq!(genome.validate(), Ok(()));
        }
        assert!(genome.num_hidden() > 0);
    }

    #[test]
    fn test_creates_cycle() {
        let (mut genome, mut tracker) = fresh(1, 1, 3);
        let mut rng = Pcg32::seed_from_u64(3);
        genome.mutate_add_node(&mut tracker, &mut rng);
        let hidden = genome.nodes().last().unwrap().id;
        let output = genome.output_ids().start;
        assert!(genome.creates_cycle(output, hidden));
        assert!(genome.creates_cycle(hidden, hidden));
        assert!(!genome.creates_cycle(0, output));
    }

    #[test]
    fn test_crossover_keeps_fitter_structure() {
        let (mut a, mut tracker) = fresh(3, 2, 4);
        let mut rng = Pcg32::seed_from_u64(4);
        let mut b = Genome::fully_connected(3, 2, &mut tracker, &NeatParams::default(), &mut rng);
        a.mutate_add_node(&mut tracker, &mut rng);
        b.mutate_add_node(&mut tracker, &mut rng);
        b.mutate_add_node(&mut tracker, &mut rng);
        a.set_fitness(10.0);
        b.set_fitness(20.0);

        let child = Genome::crossover(&a, &b, &NeatParams::default(), &mut rng);
        let innovations = |g: &Genome| g.connections().iter().map(|c| c.innovation).collect::<Vec<_>>();
        assert_eq!(innovations(&child), innovations(&b));
        assert_eq!(child.nodes().len(), b.nodes().len());
        assert_eq!(child.fitness(), None);
        assert_eq!(child.validate(), Ok(()));
    }

    #[test]
    fn test_distance() {
        let params = NeatParams::default();
        let (a, mut tracker) = fresh(2, 1, 5);
        assert_eq!(a.distance(&a, &params), 0.0);

        let mut b = a.clone();
        let mut rng = Pcg32::seed_from_u64(5);
        b.mutate_add_node(&mut tracker, &mut rng);
        // two new genes unmatched out of four
        assert!((a.distance(&b, &params) - 0.5).abs() < 1e-9);
        assert_eq!(a.distance(&b, &params), b.distance(&a, &params));
    }

    #[test]
    fn test_validate_rejects_bad_structure() {
        let nodes = vec![
            NodeGene { id: 0, kind: NodeKind::Input, bias: 0.0 },
            NodeGene { id: 1, kind: NodeKind::Output, bias: 0.0 },
            NodeGene { id: 2, kind: NodeKind::Hidden, bias: 0.0 },
        ];
        let conn = |innovation, input, output| ConnectionGene {
            innovation,
            input,
            output,
            weight: 1.0,
            enabled: true,
        };

        let ok = Genome::from_parts(1, 1, nodes.clone(), vec![conn(0, 0, 2), conn(1, 2, 1)]);
        assert!(ok.is_ok());

        let into_input = Genome::from_parts(1, 1, nodes.clone(), vec![conn(0, 2, 0)]);
        assert!(matches!(into_input, Err(GenomeError::InvalidConnection { .. })));

        let dangling = Genome::from_parts(1, 1, nodes.clone(), vec![conn(0, 0, 7)]);
        assert!(matches!(dangling, Err(GenomeError::InvalidConnection { .. })));

        let mut looped = nodes.clone();
        looped.push(NodeGene { id: 3, kind: NodeKind::Hidden, bias: 0.0 });
        let cycle = Genome::from_parts(
            1,
            1,
            looped,
            vec![conn(0, 2, 3), conn(1, 3, 2), conn(2, 3, 1)],
        );
        assert_eq!(cycle, Err(GenomeError::Cycle));

        assert_eq!(Genome::from_parts(0, 1, vec![], vec![]), Err(GenomeError::Empty));
    }
}
