//! The bundler (C8, §4.8): turns a cycle-assigned gate stream into an
//! ordered list of [`Bundle`]s and renders the final assembly text.

use tracing::instrument;

use xbar_ir::{Gate, Operand};

/// One parallel group of gates all starting at the same cycle, possibly
/// merged with an adjacent section sharing the same leading
/// architectural name (§4.8).
#[derive(Debug, Clone, Default)]
pub struct ParallelSection {
    pub gates: Vec<Gate>,
}

impl ParallelSection {
    fn leading_name(&self) -> Option<&str> {
        self.gates.first().map(|g| g.name.as_str())
    }
}

/// `{start_cycle, duration_in_cycles, parallel_sections}` (§4.3).
#[derive(Debug, Clone)]
pub struct Bundle {
    pub start_cycle: u64,
    pub duration_in_cycles: u64,
    pub parallel_sections: Vec<ParallelSection>,
}

/// Groups a cycle-assigned gate stream into bundles, one per distinct
/// cycle, stably sorted, with adjacent same-named parallel sections
/// spliced together.
pub struct Bundler {
    cycle_time_ns: f64,
}

impl Bundler {
    #[must_use]
    pub fn new(cycle_time_ns: f64) -> Self {
        Self { cycle_time_ns }
    }

    /// Bundle every gate in `gates` that has been assigned a cycle.
    /// Gates with `cycle == None` (e.g. SOURCE/SINK sentinels, which
    /// never reach this stage) are skipped.
    #[instrument(skip(self, gates), fields(gates = gates.len()))]
    pub fn bundle(&self, gates: &[Gate]) -> Vec<Bundle> {
        let mut scheduled: Vec<(u64, &Gate)> = gates.iter().filter_map(|g| g.cycle.map(|c| (c, g))).collect();
        scheduled.sort_by_key(|(cycle, _)| *cycle);

        let mut bundles: Vec<Bundle> = Vec::new();
        let mut i = 0;
        while i < scheduled.len() {
            let cycle = scheduled[i].0;
            let mut members = Vec::new();
            while i < scheduled.len() && scheduled[i].0 == cycle {
                members.push(scheduled[i].1.clone());
                i += 1;
            }
            let duration = members.iter().map(|g| g.duration_cycles(self.cycle_time_ns)).max().unwrap_or(1);
            bundles.push(Bundle {
                start_cycle: cycle,
                duration_in_cycles: duration,
                parallel_sections: vec![ParallelSection { gates: members }],
            });
        }

        self.merge_adjacent_sections(&mut bundles);
        bundles
    }

    /// Splice adjacent parallel sections (within the same bundle) whose
    /// first gate shares the same architectural `name`; discards any
    /// section left empty (§4.8).
    fn merge_adjacent_sections(&self, bundles: &mut [Bundle]) {
        for bundle in bundles.iter_mut() {
            let mut merged: Vec<ParallelSection> = Vec::new();
            for section in std::mem::take(&mut bundle.parallel_sections) {
                if section.gates.is_empty() {
                    continue;
                }
                if let Some(prev) = merged.last_mut() {
                    if prev.leading_name() == section.leading_name() {
                        prev.gates.extend(section.gates);
                        continue;
                    }
                }
                merged.push(section);
            }
            bundle.parallel_sections = merged;
        }
    }
}

fn render_operand(op: Operand) -> String {
    match op {
        Operand::Qubit(q) => format!("q{}", q.0),
        Operand::Site(s) => format!("q{}", s.0),
    }
}

fn render_gate(gate: &Gate) -> String {
    let operands: Vec<String> = gate.operands.iter().copied().map(render_operand).collect();
    if operands.is_empty() {
        gate.op_name.clone()
    } else {
        format!("{} {}", gate.op_name, operands.join(","))
    }
}

fn render_section(section: &ParallelSection) -> String {
    if section.gates.len() == 1 {
        render_gate(&section.gates[0])
    } else {
        let parts: Vec<String> = section.gates.iter().map(render_gate).collect();
        format!("{{ {} }}", parts.join(" | "))
    }
}

/// Renders `bundles` into the final assembly text (§6): the three
/// literal header lines, a `wait <k>` line for any inter-bundle gap
/// greater than one cycle, one line per bundle, a trailing `wait`, and
/// a `# Total depth: <D>` footer. Purely a `String` builder — no file
/// is opened, consistent with output file writing being out of scope
/// for this crate.
#[must_use]
pub fn render_qasm(bundles: &[Bundle], qubit_number: u32) -> String {
    let mut out = String::new();
    out.push_str("version 1.0\n");
    out.push_str("# this file has been automatically generated by the OpenQL compiler please do not modify it manually.\n");
    out.push_str(&format!("qubits {qubit_number}\n\n"));
    out.push_str(".all_kernels\n");

    let mut prev_end: Option<u64> = None;
    for bundle in bundles {
        if let Some(end) = prev_end {
            let gap = bundle.start_cycle.saturating_sub(end);
            if gap > 1 {
                out.push_str(&format!("    wait {gap}\n"));
            }
        }
        let line = bundle
            .parallel_sections
            .iter()
            .map(render_section)
            .collect::<Vec<_>>()
            .join(" | ");
        out.push_str("    ");
        out.push_str(&line);
        out.push('\n');
        prev_end = Some(bundle.start_cycle + bundle.duration_in_cycles);
    }

    let trailing = bundles.last().map_or(0, |b| b.duration_in_cycles.saturating_sub(1));
    out.push_str(&format!("    wait {trailing}\n"));

    let depth = match (bundles.first(), bundles.last()) {
        (Some(first), Some(last)) => (last.start_cycle + last.duration_in_cycles).saturating_sub(first.start_cycle),
        _ => 0,
    };
    out.push_str(&format!("# Total depth: {depth}\n"));
    out
}
