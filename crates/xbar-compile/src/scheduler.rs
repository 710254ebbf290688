//! The critical-path list scheduler (C7, §4.7): assigns every primitive
//! gate a cycle, respecting both the dependence graph and the resource
//! manager, in forward (ASAP) or backward (ALAP) mode.

use std::cmp::Reverse;
use std::collections::HashMap;

use petgraph::graph::NodeIndex;
use petgraph::Direction as GraphDirection;
use tracing::{debug, instrument, warn};

use xbar_hal::{BufferClass, PlatformDescription};
use xbar_ir::Gate;

use crate::dependence::{DepNodeKind, DependenceGraph};
use crate::error::{CompileError, CompileResult};
use crate::resources::ResourceManager;

/// Runaway guard: if `curr_cycle` exceeds this before the schedule
/// terminates, scheduling is aborted as a fatal error (§4.7, §5).
pub const MAX_CYCLE: u64 = 1_000_000;

/// The sentinel cycle SINK is initialized to in backward (ALAP) mode,
/// before the final rebase that puts SOURCE back at 0 (§4.7).
pub const ALAP_SINK_CYCLE: u64 = MAX_CYCLE / 2;

/// Which end of the dependence graph the scheduler starts from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScheduleDirection {
    /// SOURCE at cycle 0, scheduling proceeds toward SINK (ASAP).
    Forward,
    /// SINK at `ALAP_SINK_CYCLE`, scheduling proceeds toward SOURCE,
    /// then cycles are rebased so SOURCE lands at 0 (ALAP).
    Backward,
}

/// A critical-path list scheduler over one sub-kernel's dependence
/// graph and gate stream.
pub struct Scheduler<'a> {
    platform: &'a PlatformDescription,
    direction: ScheduleDirection,
}

impl<'a> Scheduler<'a> {
    #[must_use]
    pub fn new(platform: &'a PlatformDescription, direction: ScheduleDirection) -> Self {
        Self { platform, direction }
    }

    /// Assign every gate in `gates` a cycle, committing each as it's
    /// placed against `resources`. Applies latency compensation
    /// afterward.
    #[instrument(skip(self, dg, gates, resources), fields(gates = gates.len()))]
    pub fn schedule(&self, dg: &DependenceGraph, gates: &mut [Gate], resources: &mut ResourceManager) -> CompileResult<()> {
        let forward = matches!(self.direction, ScheduleDirection::Forward);
        let remaining = compute_remaining(dg, forward);

        let mut cycles: HashMap<NodeIndex, u64> = HashMap::default();
        let mut pending_preds: HashMap<NodeIndex, usize> = HashMap::default();
        let succ_dir = if forward { GraphDirection::Outgoing } else { GraphDirection::Incoming };
        let pred_dir = if forward { GraphDirection::Incoming } else { GraphDirection::Outgoing };

        for node in dg.graph.node_indices() {
            pending_preds.insert(node, dg.graph.neighbors_directed(node, pred_dir).count());
        }

        let root = if forward { dg.source } else { dg.sink };
        let root_cycle = if forward { 0 } else { ALAP_SINK_CYCLE };
        cycles.insert(root, root_cycle);

        let mut available: Vec<NodeIndex> = Vec::new();
        let mut insertion_order: HashMap<NodeIndex, u64> = HashMap::default();
        let mut next_insertion = 0u64;
        let mut push_available = |node: NodeIndex, available: &mut Vec<NodeIndex>, insertion_order: &mut HashMap<NodeIndex, u64>, next_insertion: &mut u64| {
            insertion_order.insert(node, *next_insertion);
            *next_insertion += 1;
            available.push(node);
        };

        for succ in dg.graph.neighbors_directed(root, succ_dir).collect::<Vec<_>>() {
            if let Some(count) = pending_preds.get_mut(&succ) {
                *count -= 1;
                if *count == 0 {
                    let tentative = tentative_cycle(succ, &cycles, dg, forward);
                    cycles.insert(succ, tentative);
                    push_available(succ, &mut available, &mut insertion_order, &mut next_insertion);
                }
            }
        }

        let mut curr_cycle = root_cycle;
        let mut deadlock_retry = false;

        loop {
            if available.is_empty() && cycles.contains_key(&if forward { dg.sink } else { dg.source }) {
                break;
            }
            if curr_cycle > MAX_CYCLE {
                return Err(CompileError::ScheduleOverflow { max_cycle: MAX_CYCLE });
            }

            sort_available(&mut available, &remaining, dg, forward, &insertion_order);

            let pick = available.iter().position(|&node| {
                self.dependence_complete(node, &cycles, dg, forward, curr_cycle)
                    && self.resource_ok(node, dg, gates, resources, curr_cycle).unwrap_or(false)
            });

            let Some(pos) = pick else {
                let still_executing = gates.iter().any(|g| {
                    g.cycle.is_some_and(|c| {
                        let duration = g.duration_cycles(self.platform.cycle_time);
                        if forward {
                            c <= curr_cycle && curr_cycle < c + duration
                        } else {
                            c >= curr_cycle && curr_cycle + duration > c
                        }
                    })
                });
                if !still_executing && !available.is_empty() {
                    if deadlock_retry {
                        let node = available[0];
                        let name = dg.gate_index(node).map_or_else(|| "SINK/SOURCE".to_string(), |i| gates[i].name.clone());
                        return Err(CompileError::ResourceDeadlock { cycle: curr_cycle, gate_name: name });
                    }
                    warn!(cycle = curr_cycle, "scheduler deadlocked, retrying highest-priority node next cycle");
                    deadlock_retry = true;
                }
                curr_cycle += 1;
                continue;
            };
            deadlock_retry = false;

            let node = available.remove(pos);
            self.commit(node, curr_cycle, dg, gates, resources)?;
            cycles.insert(node, curr_cycle);

            for succ in dg.graph.neighbors_directed(node, succ_dir).collect::<Vec<_>>() {
                let Some(count) = pending_preds.get_mut(&succ) else { continue };
                *count -= 1;
                if *count == 0 {
                    let tentative = tentative_cycle(succ, &cycles, dg, forward);
                    cycles.insert(succ, tentative);
                    push_available(succ, &mut available, &mut insertion_order, &mut next_insertion);
                }
            }
        }

        self.apply_latency_compensation(gates);
        if !forward {
            self.rebase_backward(gates, &cycles, dg)?;
        }
        debug!(final_cycle = curr_cycle, "scheduling complete");
        Ok(())
    }

    fn dependence_complete(&self, node: NodeIndex, cycles: &HashMap<NodeIndex, u64>, _dg: &DependenceGraph, forward: bool, curr_cycle: u64) -> bool {
        let Some(&tentative) = cycles.get(&node) else { return false };
        if forward {
            tentative <= curr_cycle
        } else {
            tentative >= curr_cycle
        }
    }

    fn resource_ok(&self, node: NodeIndex, dg: &DependenceGraph, gates: &[Gate], resources: &ResourceManager, curr_cycle: u64) -> CompileResult<bool> {
        let Some(i) = dg.gate_index(node) else { return Ok(true) };
        let gate = &gates[i];
        let duration = gate.duration_cycles(self.platform.cycle_time);
        resources.available(curr_cycle, gate, duration)
    }

    fn commit(&self, node: NodeIndex, curr_cycle: u64, dg: &DependenceGraph, gates: &mut [Gate], resources: &mut ResourceManager) -> CompileResult<()> {
        let Some(i) = dg.gate_index(node) else { return Ok(()) };
        let duration = gates[i].duration_cycles(self.platform.cycle_time);
        resources.reserve(curr_cycle, &gates[i], duration)?;
        gates[i].cycle = Some(curr_cycle);
        Ok(())
    }

    fn apply_latency_compensation(&self, gates: &mut [Gate]) {
        for gate in gates.iter_mut() {
            if gate.latency_ns == 0.0 {
                continue;
            }
            let shift = (gate.latency_ns.abs() / self.platform.cycle_time).ceil() as i64 * gate.latency_ns.signum() as i64;
            if let Some(cycle) = gate.cycle {
                gate.cycle = Some((cycle as i64 + shift).max(0) as u64);
            }
        }
    }

    fn rebase_backward(&self, gates: &mut [Gate], cycles: &HashMap<NodeIndex, u64>, dg: &DependenceGraph) -> CompileResult<()> {
        let source_cycle = *cycles.get(&dg.source).ok_or_else(|| CompileError::IllegalState {
            component: "Scheduler",
            message: "SOURCE was never scheduled in backward mode".into(),
        })?;
        for gate in gates.iter_mut() {
            if let Some(cycle) = gate.cycle {
                gate.cycle = Some(cycle.saturating_sub(source_cycle));
            }
        }
        Ok(())
    }
}

/// Longest weighted distance to SINK (forward) or from SOURCE
/// (backward), one topological pass (§4.7's criticality metric).
fn compute_remaining(dg: &DependenceGraph, forward: bool) -> HashMap<NodeIndex, i64> {
    let mut remaining: HashMap<NodeIndex, i64> = HashMap::default();
    let order = petgraph::algo::toposort(&dg.graph, None).unwrap_or_default();
    let iter: Box<dyn Iterator<Item = &NodeIndex>> =
        if forward { Box::new(order.iter().rev()) } else { Box::new(order.iter()) };

    for &node in iter {
        let dir = if forward { GraphDirection::Outgoing } else { GraphDirection::Incoming };
        let best = dg
            .graph
            .edges_directed(node, dir)
            .map(|edge| {
                let other = if forward { edge.target() } else { edge.source() };
                i64::try_from(edge.weight().weight).unwrap_or(i64::MAX) + remaining.get(&other).copied().unwrap_or(0)
            })
            .max()
            .unwrap_or(0);
        remaining.insert(node, best);
    }
    remaining
}

fn tentative_cycle(node: NodeIndex, cycles: &HashMap<NodeIndex, u64>, dg: &DependenceGraph, forward: bool) -> u64 {
    let dir = if forward { GraphDirection::Incoming } else { GraphDirection::Outgoing };
    dg.graph
        .edges_directed(node, dir)
        .filter_map(|edge| {
            let other = if forward { edge.source() } else { edge.target() };
            cycles.get(&other).map(|&c| {
                if forward {
                    c + edge.weight().weight
                } else {
                    c.saturating_sub(edge.weight().weight)
                }
            })
        })
        .max()
        .unwrap_or(0)
}

/// "Deep criticality" ordering (§4.7): highest `remaining` first,
/// tie-broken by the remaining-values of each node's direct successors
/// (largest first), and finally by insertion order.
fn sort_available(available: &mut [NodeIndex], remaining: &HashMap<NodeIndex, i64>, dg: &DependenceGraph, forward: bool, insertion_order: &HashMap<NodeIndex, u64>) {
    let dir = if forward { GraphDirection::Outgoing } else { GraphDirection::Incoming };
    let children_key = |n: NodeIndex| -> Vec<Reverse<i64>> {
        let mut v: Vec<Reverse<i64>> =
            dg.graph.neighbors_directed(n, dir).map(|c| Reverse(remaining.get(&c).copied().unwrap_or(0))).collect();
        v.sort();
        v
    };
    available.sort_by(|&a, &b| {
        let ra = remaining.get(&a).copied().unwrap_or(0);
        let rb = remaining.get(&b).copied().unwrap_or(0);
        rb.cmp(&ra)
            .then_with(|| children_key(b).cmp(&children_key(a)))
            .then_with(|| insertion_order[&a].cmp(&insertion_order[&b]))
    });
}

/// A forward pass accumulating buffer-buffer delay between
/// consecutively-cycled gates (§4.7's last rule). Operates directly on
/// the already-scheduled gate stream, grouping by distinct cycle value
/// the way the bundler later will.
pub fn apply_buffer_buffer_delays(gates: &mut [Gate], platform: &PlatformDescription) {
    let mut order: Vec<(u64, usize)> = (0..gates.len()).filter_map(|i| gates[i].cycle.map(|c| (c, i))).collect();
    order.sort_by_key(|&(cycle, _)| cycle);

    let mut shift: i64 = 0;
    let mut prev_classes: Vec<BufferClass> = Vec::new();
    let mut prev_cycle: Option<u64> = None;

    let mut i = 0;
    while i < order.len() {
        let cycle = order[i].0;
        let mut group_end = i;
        while group_end < order.len() && order[group_end].0 == cycle {
            group_end += 1;
        }
        let group: Vec<usize> = order[i..group_end].iter().map(|&(_, idx)| idx).collect();
        let classes: Vec<BufferClass> =
            group.iter().map(|&idx| BufferClass::parse(&gates[idx].op_type).unwrap_or(BufferClass::None)).collect();

        if prev_cycle.is_some() {
            let delay = prev_classes
                .iter()
                .flat_map(|&prev| classes.iter().map(move |&curr| platform.buffer_settings.delay(prev, curr)))
                .max()
                .unwrap_or(0);
            shift += delay as i64;
        }

        for &idx in &group {
            gates[idx].cycle = Some((cycle as i64 + shift).max(0) as u64);
        }

        prev_classes = classes;
        prev_cycle = Some(cycle);
        i = group_end;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use xbar_hal::PlatformDescription;
    use xbar_ir::{InstrType, Operand, QubitId, SiteIndex};

    use crate::crossbar::CrossbarState;

    fn platform() -> PlatformDescription {
        let value = json!({
            "qubit_number": 2,
            "cycle_time": 20.0,
            "topology": {
                "x_size": 3, "y_size": 1,
                "init_configuration": {
                    "0": {"type": "data", "position": [0, 0]},
                    "1": {"type": "data", "position": [0, 2]},
                }
            },
            "instruction_settings": {
                "shuttle_left": {"duration": 20.0, "cc_light_instr_type": "shuttle"},
                "shuttle_right": {"duration": 20.0, "cc_light_instr_type": "shuttle"},
                "cz": {"duration": 40.0, "type": "flux", "cc_light_instr_type": "two_qubit_gate"},
            }
        });
        PlatformDescription::from_json(&value).unwrap()
    }

    fn grid() -> CrossbarState {
        let mut state = CrossbarState::new(1, 3);
        state.add_qubit(0, 0, QubitId(0), false).unwrap();
        state.add_qubit(0, 2, QubitId(1), false).unwrap();
        state
    }

    #[test]
    fn test_two_independent_shuttles_schedule_at_cycle_zero() {
        let platform = platform();
        let state = grid();
        let mut gates = vec![
            Gate::new("shuttle_right", vec![Operand::Site(SiteIndex(0))], vec![], 20.0, "shuttle", "none", InstrType::Shuttle),
            Gate::new("shuttle_left", vec![Operand::Site(SiteIndex(2))], vec![], 20.0, "shuttle", "none", InstrType::Shuttle),
        ];
        let dg = DependenceGraph::build(&gates, platform.cycle_time, true).unwrap();
        let mut resources = ResourceManager::new(1, 3, state, true, platform.resources);
        let scheduler = Scheduler::new(&platform, ScheduleDirection::Forward);
        scheduler.schedule(&dg, &mut gates, &mut resources).unwrap();
        assert_eq!(gates[0].cycle, Some(0));
        assert_eq!(gates[1].cycle, Some(0));
    }

    #[test]
    fn test_same_site_chain_serializes() {
        let platform = platform();
        let state = grid();
        let mut gates = vec![
            Gate::new("shuttle_right", vec![Operand::Site(SiteIndex(0))], vec![], 20.0, "shuttle", "none", InstrType::Shuttle),
            Gate::new("shuttle_right", vec![Operand::Site(SiteIndex(1))], vec![], 20.0, "shuttle", "none", InstrType::Shuttle),
        ];
        let dg = DependenceGraph::build(&gates, platform.cycle_time, true).unwrap();
        let mut resources = ResourceManager::new(1, 3, state, true, platform.resources);
        let scheduler = Scheduler::new(&platform, ScheduleDirection::Forward);
        scheduler.schedule(&dg, &mut gates, &mut resources).unwrap();
        assert!(gates[0].cycle.unwrap() < gates[1].cycle.unwrap());
    }

    #[test]
    fn test_backward_schedule_rebases_source_to_zero() {
        let platform = platform();
        let state = grid();
        let mut gates =
            vec![Gate::new("shuttle_right", vec![Operand::Site(SiteIndex(0))], vec![], 20.0, "shuttle", "none", InstrType::Shuttle)];
        let dg = DependenceGraph::build(&gates, platform.cycle_time, true).unwrap();
        let mut resources = ResourceManager::new(1, 3, state, false, platform.resources);
        let scheduler = Scheduler::new(&platform, ScheduleDirection::Backward);
        scheduler.schedule(&dg, &mut gates, &mut resources).unwrap();
        assert_eq!(gates[0].cycle, Some(0));
    }
}
