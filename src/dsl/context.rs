//! Translation context threaded through the tree walk.

use std::collections::{HashMap, HashSet};

use super::ast::Sheet;
use crate::event::timing::Slot;

pub const DEFAULT_BPM: u32 = 120;
pub const DEFAULT_CHANNEL: u8 = 0;
pub const DEFAULT_OCTAVE: u32 = 5;
pub const DEFAULT_VELOCITY: u8 = 127;
pub const DEFAULT_DIVIDER: f64 = 1.0;

/// The sounding part of the last note, used as the base for intervals.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Tone {
    pub channel: u8,
    pub pitch: u8,
    pub velocity: u8,
}

/// A labeled sheet and the divider in effect where it was written.
#[derive(Debug, Clone, Copy)]
pub struct Definition<'a> {
    pub sheet: &'a Sheet,
    pub divider: f64,
}

#[derive(Debug)]
pub struct Context<'a> {
    pub bpm: u32,
    /// Absolute position in ticks.
    pub offset: u64,
    pub channel: u8,
    pub octave: u32,
    pub velocity: u8,
    pub divider: f64,
    pub legato: bool,
    /// Interval base. Survives rests.
    pub last_note: Option<Tone>,
    /// Index of the note event a tie extends. Cleared by rests.
    pub last_tone: Option<usize>,
    namespace: Vec<String>,
    registry: HashMap<String, Definition<'a>>,
    active: HashSet<String>,
    replaying: usize,
    precision_warned: bool,
}

impl Default for Context<'_> {
    fn default() -> Self {
        Self {
            bpm: DEFAULT_BPM,
            offset: 0,
            channel: DEFAULT_CHANNEL,
            octave: DEFAULT_OCTAVE,
            velocity: DEFAULT_VELOCITY,
            divider: DEFAULT_DIVIDER,
            legato: false,
            last_note: None,
            last_tone: None,
            namespace: Vec::new(),
            registry: HashMap::new(),
            active: HashSet::new(),
            replaying: 0,
            precision_warned: false,
        }
    }
}

impl<'a> Context<'a> {
    pub fn new() -> Self {
        Self::default()
    }

    /// Slot length under the current divider.
    ///
    /// Logs a warning the first time a slot does not fall on a whole tick.
    pub fn slot(&mut self) -> Slot {
        let slot = Slot::for_divider(self.divider);
        if !slot.exact && !self.precision_warned {
            self.precision_warned = true;
            log::warn!(
                "divider {} does not fit the tick grid, note lengths are truncated",
                self.divider
            );
        }
        slot
    }

    pub fn advance(&mut self, ticks: u64) {
        self.offset = self.offset.saturating_add(ticks);
    }

    pub fn enter_namespace(&mut self, label: &str) {
        self.namespace.push(label.to_string());
    }

    pub fn leave_namespace(&mut self) {
        self.namespace.pop();
    }

    /// The dotted path of the innermost namespace.
    pub fn current_path(&self) -> String {
        self.namespace.join(".")
    }

    /// Make the dotted `path` the current namespace, returning the one it replaces.
    ///
    /// A replayed sheet resolves labels where it was written, not where it is referenced.
    pub fn enter_scope(&mut self, path: &str) -> Vec<String> {
        let scope = path.split('.').map(str::to_string).collect();
        std::mem::replace(&mut self.namespace, scope)
    }

    pub fn leave_scope(&mut self, outer: Vec<String>) {
        self.namespace = outer;
    }

    /// Record a labeled sheet. The first definition of a path wins.
    pub fn register(&mut self, path: String, definition: Definition<'a>) -> bool {
        if self.registry.contains_key(&path) {
            log::debug!("sheet {path} is already defined, keeping the first definition");
            return false;
        }
        log::debug!("defined sheet {path}");
        self.registry.insert(path, definition);
        true
    }

    /// Look `label` up from the current namespace outwards.
    ///
    /// Inside `a.b`, the label `x` is tried as `a.b.x`, then `a.x`, then `x`.
    pub fn resolve(&self, label: &str) -> Option<(String, Definition<'a>)> {
        (0..=self.namespace.len()).rev().find_map(|depth| {
            let path = if depth == 0 {
                label.to_string()
            } else {
                format!("{}.{label}", self.namespace[..depth].join("."))
            };
            self.registry.get(&path).map(|def| (path, *def))
        })
    }

    pub fn is_active(&self, path: &str) -> bool {
        self.active.contains(path)
    }

    pub fn activate(&mut self, path: &str) {
        self.active.insert(path.to_string());
    }

    pub fn deactivate(&mut self, path: &str) {
        self.active.remove(path);
    }

    /// Inside a reference replay labels are pushed as namespaces but not registered.
    pub fn is_replaying(&self) -> bool {
        self.replaying > 0
    }

    pub fn begin_replay(&mut self) {
        self.replaying += 1;
    }

    pub fn end_replay(&mut self) {
        self.replaying = self.replaying.saturating_sub(1);
    }
}
