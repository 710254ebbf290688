//! The platform description: the external, consumed-not-produced
//! document (§6) describing a crossbar device's grid, initial qubit
//! placement and instruction catalogue.
//!
//! Parsing is deliberately permissive about the source shape (any
//! JSON-like document) but strict about the fields this crate actually
//! reads — missing or ill-typed fields are reported as
//! [`HalError::MissingField`]/[`HalError::InvalidField`] rather than
//! silently defaulted, matching `ConfigurationError`'s fatal,
//! non-recoverable treatment in the core (§7).

use rustc_hash::FxHashMap;
use serde_json::Value;

use crate::error::{HalError, HalResult};

/// A fully parsed platform description.
#[derive(Debug, Clone)]
pub struct PlatformDescription {
    /// Total number of qubits declared by the platform.
    pub qubit_number: u32,
    /// Cycle duration in nanoseconds.
    pub cycle_time: f64,
    /// The 2D grid and initial qubit placement.
    pub topology: Topology,
    /// Per-instruction-name settings, keyed by the source gate name
    /// (e.g. `"x"`, `"cz"`, `"measure"`).
    pub instruction_settings: FxHashMap<String, InstructionSetting>,
    /// Platform-wide resource parameters (currently: the wave duration).
    pub resources: ResourceSettings,
    /// Buffer-buffer delay table (`hardware_settings.<a>_<b>_buffer`).
    pub buffer_settings: BufferSettings,
}

impl PlatformDescription {
    /// Parse a platform description from an already-deserialized JSON
    /// value.
    pub fn from_json(value: &Value) -> HalResult<Self> {
        let root = value.as_object().ok_or(HalError::NotAnObject)?;

        let qubit_number = get_u32(root, "qubit_number")?;
        let cycle_time = get_f64(root, "cycle_time")?;

        let topology_value = root
            .get("topology")
            .ok_or_else(|| HalError::MissingField {
                field: "topology".into(),
            })?;
        let topology = Topology::from_json(topology_value)?;

        let instruction_settings = match root.get("instruction_settings") {
            Some(value) => parse_instruction_settings(value)?,
            None => FxHashMap::default(),
        };

        let resources = match root.get("resources") {
            Some(value) => ResourceSettings::from_json(value)?,
            None => ResourceSettings::default(),
        };

        let buffer_settings = match root.get("hardware_settings") {
            Some(value) => BufferSettings::from_json(value)?,
            None => BufferSettings::default(),
        };

        Ok(Self {
            qubit_number,
            cycle_time,
            topology,
            instruction_settings,
            resources,
            buffer_settings,
        })
    }

    /// Parse a platform description from a raw JSON string.
    pub fn from_str(text: &str) -> HalResult<Self> {
        let value: Value = serde_json::from_str(text)?;
        Self::from_json(&value)
    }

    /// Look up an instruction's settings, if the catalogue declares one.
    #[must_use]
    pub fn instruction(&self, name: &str) -> Option<&InstructionSetting> {
        self.instruction_settings.get(name)
    }
}

/// The device's 2D grid and initial qubit placement.
#[derive(Debug, Clone)]
pub struct Topology {
    /// Grid width (number of columns).
    pub x_size: u32,
    /// Grid height (number of rows).
    pub y_size: u32,
    /// Initial placement, keyed by qubit id.
    pub init_configuration: FxHashMap<u32, QubitPlacement>,
}

impl Topology {
    fn from_json(value: &Value) -> HalResult<Self> {
        let obj = value.as_object().ok_or_else(|| HalError::InvalidField {
            field: "topology".into(),
            message: "expected an object".into(),
        })?;

        let x_size = get_u32(obj, "x_size")?;
        let y_size = get_u32(obj, "y_size")?;

        let init_obj = obj
            .get("init_configuration")
            .ok_or_else(|| HalError::MissingField {
                field: "topology.init_configuration".into(),
            })?
            .as_object()
            .ok_or_else(|| HalError::InvalidField {
                field: "topology.init_configuration".into(),
                message: "expected an object keyed by qubit id".into(),
            })?;

        let mut init_configuration = FxHashMap::default();
        for (key, entry) in init_obj {
            let qubit: u32 = key.parse().map_err(|_| HalError::InvalidField {
                field: format!("topology.init_configuration.{key}"),
                message: "qubit id key is not an integer".into(),
            })?;
            init_configuration.insert(qubit, QubitPlacement::from_json(key, entry)?);
        }

        Ok(Self {
            x_size,
            y_size,
            init_configuration,
        })
    }
}

/// Where a single qubit starts, and whether it is a data or ancilla qubit.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct QubitPlacement {
    /// Data or ancilla.
    pub kind: QubitKind,
    /// `(row, col)`.
    pub position: (u32, u32),
}

impl QubitPlacement {
    fn from_json(qubit_key: &str, value: &Value) -> HalResult<Self> {
        let obj = value.as_object().ok_or_else(|| HalError::InvalidField {
            field: format!("topology.init_configuration.{qubit_key}"),
            message: "expected an object".into(),
        })?;

        let kind = match obj.get("type").and_then(Value::as_str) {
            Some("data") => QubitKind::Data,
            Some("ancilla") => QubitKind::Ancilla,
            Some(other) => {
                return Err(HalError::InvalidField {
                    field: format!("topology.init_configuration.{qubit_key}.type"),
                    message: format!("expected \"data\" or \"ancilla\", got \"{other}\""),
                })
            }
            None => {
                return Err(HalError::MissingField {
                    field: format!("topology.init_configuration.{qubit_key}.type"),
                })
            }
        };

        let position_arr = obj
            .get("position")
            .and_then(Value::as_array)
            .ok_or_else(|| HalError::MissingField {
                field: format!("topology.init_configuration.{qubit_key}.position"),
            })?;
        let [row, col] = <[Value; 2]>::try_from(position_arr.clone()).map_err(|_| {
            HalError::InvalidField {
                field: format!("topology.init_configuration.{qubit_key}.position"),
                message: "expected a 2-element [row, col] array".into(),
            }
        })?;
        let row = row.as_u64().ok_or_else(|| HalError::InvalidField {
            field: format!("topology.init_configuration.{qubit_key}.position[0]"),
            message: "expected a non-negative integer".into(),
        })? as u32;
        let col = col.as_u64().ok_or_else(|| HalError::InvalidField {
            field: format!("topology.init_configuration.{qubit_key}.position[1]"),
            message: "expected a non-negative integer".into(),
        })? as u32;

        Ok(Self {
            kind,
            position: (row, col),
        })
    }
}

/// Whether a qubit is a data qubit or an ancilla reserved for
/// measurement decomposition (§3).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum QubitKind {
    /// Carries circuit data.
    Data,
    /// Reserved for Bell-measurement ancilla shuttling.
    Ancilla,
}

/// The declared behaviour of one instruction name in the catalogue.
#[derive(Debug, Clone)]
pub struct InstructionSetting {
    /// Duration in nanoseconds.
    pub duration_ns: f64,
    /// Buffer-delay class (`type`), e.g. `"mw"`, `"flux"`, `"readout"`.
    pub buffer_type: String,
    /// Primitive name used by the resource manager (`cc_light_instr`).
    pub cc_light_instr: String,
    /// Categorical instruction kind (`cc_light_instr_type`).
    pub cc_light_instr_type: InstrTypeTag,
    /// Declared latency offset in nanoseconds (may be negative).
    pub latency_ns: f64,
    /// The 1-qubit gate matrix, if declared. Carried through verbatim;
    /// gate-matrix algebra is out of scope for this crate.
    pub matrix: Option<Vec<(f64, f64)>>,
}

/// The `cc_light_instr_type` tag distinguishing instruction categories.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InstrTypeTag {
    /// An elementary nearest-neighbour displacement.
    Shuttle,
    /// A single-qubit primitive.
    SingleQubitGate,
    /// A native two-qubit primitive.
    TwoQubitGate,
    /// A measurement primitive.
    MeasurementGate,
}

impl InstrTypeTag {
    fn parse(instr: &str, raw: &str) -> HalResult<Self> {
        match raw {
            "shuttle" => Ok(Self::Shuttle),
            "single_qubit_gate" => Ok(Self::SingleQubitGate),
            "two_qubit_gate" => Ok(Self::TwoQubitGate),
            "measurement_gate" => Ok(Self::MeasurementGate),
            other => Err(HalError::UnknownInstructionType {
                instr: instr.into(),
                kind: other.into(),
            }),
        }
    }
}

fn parse_instruction_settings(value: &Value) -> HalResult<FxHashMap<String, InstructionSetting>> {
    let obj = value.as_object().ok_or_else(|| HalError::InvalidField {
        field: "instruction_settings".into(),
        message: "expected an object keyed by instruction name".into(),
    })?;

    let mut settings = FxHashMap::default();
    for (name, entry) in obj {
        settings.insert(name.clone(), parse_instruction_setting(name, entry)?);
    }
    Ok(settings)
}

fn parse_instruction_setting(name: &str, value: &Value) -> HalResult<InstructionSetting> {
    let obj = value.as_object().ok_or_else(|| HalError::InvalidField {
        field: format!("instruction_settings.{name}"),
        message: "expected an object".into(),
    })?;

    let duration_ns = obj
        .get("duration")
        .and_then(Value::as_f64)
        .unwrap_or(0.0);
    let buffer_type = obj
        .get("type")
        .and_then(Value::as_str)
        .unwrap_or("none")
        .to_string();
    let cc_light_instr = obj
        .get("cc_light_instr")
        .and_then(Value::as_str)
        .unwrap_or(name)
        .to_string();
    let cc_light_instr_type = match obj.get("cc_light_instr_type").and_then(Value::as_str) {
        Some(raw) => InstrTypeTag::parse(name, raw)?,
        None => {
            return Err(HalError::MissingField {
                field: format!("instruction_settings.{name}.cc_light_instr_type"),
            })
        }
    };
    let latency_ns = obj.get("latency").and_then(Value::as_f64).unwrap_or(0.0);
    let matrix = obj.get("matrix").and_then(Value::as_array).map(|arr| {
        arr.iter()
            .filter_map(|pair| {
                let pair = pair.as_array()?;
                let re = pair.first()?.as_f64()?;
                let im = pair.get(1)?.as_f64()?;
                Some((re, im))
            })
            .collect()
    });

    Ok(InstructionSetting {
        duration_ns,
        buffer_type,
        cc_light_instr,
        cc_light_instr_type,
        latency_ns,
        matrix,
    })
}

/// Platform-wide resource parameters declared outside the instruction
/// catalogue.
#[derive(Debug, Clone, Copy)]
pub struct ResourceSettings {
    /// Duration of one global wave pulse, in cycles. Sizes the two
    /// pulse windows `WaveResource`/`BarrierResource` reserve for a
    /// global single-qubit gate, independent of that gate's own
    /// declared instruction duration.
    pub wave_duration_cycles: u64,
    /// Duration of the shuttle separating a global wave's two pulse
    /// windows, in cycles.
    pub shuttle_duration_cycles: u64,
}

impl Default for ResourceSettings {
    fn default() -> Self {
        Self {
            wave_duration_cycles: 1,
            shuttle_duration_cycles: 1,
        }
    }
}

impl ResourceSettings {
    fn from_json(value: &Value) -> HalResult<Self> {
        let wave_duration_cycles = value
            .get("wave")
            .and_then(|wave| wave.get("wave_duration"))
            .and_then(Value::as_u64)
            .unwrap_or(1);
        let shuttle_duration_cycles = value
            .get("wave")
            .and_then(|wave| wave.get("shuttle_duration"))
            .and_then(Value::as_u64)
            .unwrap_or(1);
        Ok(Self {
            wave_duration_cycles,
            shuttle_duration_cycles,
        })
    }
}

/// The buffer class of an instruction, used to look up
/// buffer-buffer delays between consecutive bundles (§4.8).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum BufferClass {
    /// No buffer required.
    None,
    /// Microwave control pulses.
    Mw,
    /// Flux control pulses.
    Flux,
    /// Readout pulses.
    Readout,
}

impl BufferClass {
    /// Parse a `hardware_settings`/`instruction_settings.<name>.type`
    /// buffer class string. `None` for anything not in `{none, mw,
    /// flux, readout}`.
    #[must_use]
    pub fn parse(raw: &str) -> Option<Self> {
        match raw {
            "none" => Some(Self::None),
            "mw" => Some(Self::Mw),
            "flux" => Some(Self::Flux),
            "readout" => Some(Self::Readout),
            _ => None,
        }
    }

    /// The string form used as a `hardware_settings.<a>_<b>_buffer` key
    /// component.
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::None => "none",
            Self::Mw => "mw",
            Self::Flux => "flux",
            Self::Readout => "readout",
        }
    }
}

/// The `hardware_settings.<a>_<b>_buffer` delay table (§4.8, §6).
#[derive(Debug, Clone, Default)]
pub struct BufferSettings {
    delays: FxHashMap<(BufferClass, BufferClass), u64>,
}

impl BufferSettings {
    fn from_json(value: &Value) -> HalResult<Self> {
        let obj = value.as_object().ok_or_else(|| HalError::InvalidField {
            field: "hardware_settings".into(),
            message: "expected an object".into(),
        })?;

        let mut delays = FxHashMap::default();
        for (key, entry) in obj {
            let Some(stem) = key.strip_suffix("_buffer") else {
                continue;
            };
            let Some((a, b)) = stem.split_once('_') else {
                continue;
            };
            let (Some(a), Some(b)) = (BufferClass::parse(a), BufferClass::parse(b)) else {
                continue;
            };
            if let Some(cycles) = entry.as_u64() {
                delays.insert((a, b), cycles);
            }
        }
        Ok(Self { delays })
    }

    /// The delay, in cycles, required between an instruction of class
    /// `prev` and a following instruction of class `curr`. Zero if the
    /// document declares no entry for the pair.
    #[must_use]
    pub fn delay(&self, prev: BufferClass, curr: BufferClass) -> u64 {
        self.delays.get(&(prev, curr)).copied().unwrap_or(0)
    }
}

fn get_u32(obj: &serde_json::Map<String, Value>, field: &str) -> HalResult<u32> {
    obj.get(field)
        .and_then(Value::as_u64)
        .map(|n| n as u32)
        .ok_or_else(|| HalError::MissingField {
            field: field.into(),
        })
}

fn get_f64(obj: &serde_json::Map<String, Value>, field: &str) -> HalResult<f64> {
    obj.get(field)
        .and_then(Value::as_f64)
        .ok_or_else(|| HalError::MissingField {
            field: field.into(),
        })
}
