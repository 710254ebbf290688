//! The dependence graph (C5, §4.5): one node per primitive gate plus
//! SOURCE/SINK sentinels, with labelled arcs derived from the
//! read/write/controlled event each gate produces on each operand it
//! touches.

use petgraph::algo::is_cyclic_directed;
use petgraph::graph::{DiGraph, NodeIndex};
use rustc_hash::FxHashMap;

use xbar_ir::{ClbitId, Gate, InstrType, Operand, QubitId, SiteIndex};

use crate::error::{CompileError, CompileResult};

/// The event a gate produces on one of its operands (§4.5's row/column
/// labels).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EventKind {
    /// Write: exclusive, never commutes with anything.
    Write,
    /// Read: commutes with other reads unless commutation is disabled.
    Read,
    /// Controlled-access (e.g. a `cnot`'s control operand): commutes
    /// with other controlled-accesses unless commutation is disabled.
    Controlled,
}

/// The labelled dependence kind of one arc, derived from the transition
/// table in §4.5.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DepKind {
    Waw,
    War,
    Wad,
    Raw,
    Rad,
    Daw,
    Dar,
    Rar,
    Dad,
}

/// What a graph node represents.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DepNodeKind {
    /// Implicit write on every operand, inserted before the first gate.
    Source,
    /// Implicit write closing every operand's chain.
    Sink,
    /// A primitive gate, by index into the slice passed to [`DependenceGraph::build`].
    Gate(usize),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DepNode {
    pub kind: DepNodeKind,
}

/// The operand (or classical bit) whose conflicting access produced an
/// arc (§3) — the same key the per-operand frontier is tracked by.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DepCause {
    Site(SiteIndex),
    Qubit(QubitId),
    Clbit(ClbitId),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DepEdge {
    pub kind: DepKind,
    /// `⌈src.duration / cycle_time⌉`, the minimum cycle gap the
    /// scheduler must respect between the source and target gates.
    pub weight: u64,
    /// The operand this arc was derived from.
    pub cause: DepCause,
}

/// The dependence graph over one sub-kernel's primitive gates.
pub struct DependenceGraph {
    pub graph: DiGraph<DepNode, DepEdge>,
    pub source: NodeIndex,
    pub sink: NodeIndex,
    /// `gate_nodes[i]` is the node for `gates[i]` passed to [`Self::build`].
    pub gate_nodes: Vec<NodeIndex>,
}

impl DependenceGraph {
    /// Build the dependence graph for `gates` in program order.
    ///
    /// `commute` turns off R/R and D/D commutation when `false`,
    /// forcing `RAR`/`DAD` arcs instead of treating repeated reads or
    /// controlled-accesses as independent.
    pub fn build(gates: &[Gate], cycle_time_ns: f64, commute: bool) -> CompileResult<Self> {
        let mut graph = DiGraph::new();
        let source = graph.add_node(DepNode { kind: DepNodeKind::Source });
        let sink = graph.add_node(DepNode { kind: DepNodeKind::Sink });

        // Per-operand frontier: the set of not-yet-superseded (node, event,
        // duration_cycles) triples a new event on that operand must arc
        // from.
        let mut frontier: FxHashMap<OperandKey, Vec<(NodeIndex, EventKind, u64)>> = FxHashMap::default();
        let mut gate_nodes = Vec::with_capacity(gates.len());

        for (i, gate) in gates.iter().enumerate() {
            let node = graph.add_node(DepNode { kind: DepNodeKind::Gate(i) });
            gate_nodes.push(node);
            let node_duration = gate.duration_cycles(cycle_time_ns);

            for (key, event) in events_for(gate) {
                let entry = frontier.entry(key).or_insert_with(|| vec![(source, EventKind::Write, 0)]);

                for &(src_node, src_kind, src_duration) in entry.iter() {
                    if let Some(kind) = transition(src_kind, event, commute) {
                        graph.add_edge(src_node, node, DepEdge { kind, weight: src_duration, cause: cause_from_key(key) });
                    }
                }

                let next_frontier = match event {
                    EventKind::Write => vec![(node, EventKind::Write, node_duration)],
                    EventKind::Read => {
                        let mut v: Vec<_> = entry.iter().filter(|(_, k, _)| *k == EventKind::Read).copied().collect();
                        v.push((node, EventKind::Read, node_duration));
                        v
                    }
                    EventKind::Controlled => {
                        let mut v: Vec<_> =
                            entry.iter().filter(|(_, k, _)| *k == EventKind::Controlled).copied().collect();
                        v.push((node, EventKind::Controlled, node_duration));
                        v
                    }
                };
                *entry = next_frontier;
            }
        }

        for (&key, entries) in &frontier {
            for &(src_node, src_kind, src_duration) in entries {
                if let Some(kind) = transition(src_kind, EventKind::Write, commute) {
                    graph.add_edge(src_node, sink, DepEdge { kind, weight: src_duration, cause: cause_from_key(key) });
                }
            }
        }

        if is_cyclic_directed(&graph) {
            return Err(CompileError::IllegalState {
                component: "DependenceGraph",
                message: "constructed dependence graph contains a cycle".into(),
            });
        }

        Ok(Self { graph, source, sink, gate_nodes })
    }

    /// The gate index a node represents, if it is neither SOURCE nor SINK.
    #[must_use]
    pub fn gate_index(&self, node: NodeIndex) -> Option<usize> {
        match self.graph[node].kind {
            DepNodeKind::Gate(i) => Some(i),
            _ => None,
        }
    }

    #[must_use]
    pub fn is_dag(&self) -> bool {
        !is_cyclic_directed(&self.graph)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
enum OperandKey {
    Site(u32),
    Qubit(u32),
    Clbit(u32),
}

fn operand_key(op: Operand) -> OperandKey {
    match op {
        Operand::Site(s) => OperandKey::Site(s.0),
        Operand::Qubit(q) => OperandKey::Qubit(q.0),
    }
}

fn cause_from_key(key: OperandKey) -> DepCause {
    match key {
        OperandKey::Site(s) => DepCause::Site(SiteIndex(s)),
        OperandKey::Qubit(q) => DepCause::Qubit(QubitId(q)),
        OperandKey::Clbit(c) => DepCause::Clbit(ClbitId(c)),
    }
}

/// The operand events a gate produces, per the §4.5 event table. Our
/// closed primitive set never emits an asymmetric controlled gate
/// (`cnot`), so two-qubit natives (`cz`, `sqswap`) always use the
/// symmetric "R on both" rule the table gives for `cz`/`cphase`.
fn events_for(gate: &Gate) -> Vec<(OperandKey, EventKind)> {
    match gate.instr_type {
        InstrType::TwoQubitGate => gate.operands.iter().map(|&op| (operand_key(op), EventKind::Read)).collect(),
        InstrType::MeasurementGate | InstrType::ClassicalGate => {
            let mut events: Vec<_> =
                gate.operands.iter().map(|&op| (operand_key(op), EventKind::Write)).collect();
            events.extend(gate.creg_operands.iter().map(|c| (OperandKey::Clbit(c.0), EventKind::Write)));
            events
        }
        InstrType::Shuttle | InstrType::SingleQubitGate => {
            gate.operands.iter().map(|&op| (operand_key(op), EventKind::Write)).collect()
        }
        InstrType::Dummy | InstrType::Wait => vec![],
    }
}

fn transition(src: EventKind, cur: EventKind, commute: bool) -> Option<DepKind> {
    use EventKind::{Controlled, Read, Write};
    match (src, cur) {
        (Write, Write) => Some(DepKind::Waw),
        (Write, Read) => Some(DepKind::War),
        (Write, Controlled) => Some(DepKind::Wad),
        (Read, Write) => Some(DepKind::Raw),
        (Read, Read) => (!commute).then_some(DepKind::Rar),
        (Read, Controlled) => Some(DepKind::Rad),
        (Controlled, Write) => Some(DepKind::Daw),
        (Controlled, Read) => Some(DepKind::Dar),
        (Controlled, Controlled) => (!commute).then_some(DepKind::Dad),
    }
}
