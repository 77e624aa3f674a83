//! Lowering of the notation tree to a flat, time-ordered event sequence.
//!
//! The walk never fails: anything that cannot be performed (an undefined
//! reference, a tie with nothing to tie, a sheet with a zero ratio) degrades
//! to a no-op and is logged.

use super::ast::{Node, Note, Reference, Repeat, Sheet};
use super::context::{Context, Definition, Tone};
use super::pitch::{clamp_channel, midi_pitch, transpose, velocity_from_code};
use crate::event::{Event, EventSequence};

/// Translate a parsed tree into events.
pub fn translate(root: &Node) -> EventSequence {
    let mut translator = Translator::default();
    translator.node(root);
    EventSequence::new(translator.events)
}

#[derive(Default)]
struct Translator<'a> {
    ctx: Context<'a>,
    events: Vec<Event>,
}

impl<'a> Translator<'a> {
    fn node(&mut self, node: &'a Node) {
        match node {
            Node::Bpm(bpm) => self.bpm(*bpm),
            Node::Note(note) => self.note(note),
            Node::Interval(delta) => self.interval(*delta),
            Node::Rest => {
                let slot = self.ctx.slot();
                self.ctx.last_tone = None;
                self.ctx.advance(slot.ticks);
            }
            Node::Tie => {
                let slot = self.ctx.slot();
                if let Some(event) = self.ctx.last_tone.and_then(|i| self.events.get_mut(i)) {
                    event.extend(slot.ticks);
                } else {
                    log::debug!("tie at tick {} has no tone to extend", self.ctx.offset);
                }
                self.ctx.advance(slot.ticks);
            }
            Node::Divider => {}
            Node::Controller { param, value } => self.events.push(Event::controller(
                self.ctx.offset,
                self.ctx.channel,
                *param,
                *value,
            )),
            Node::Program(program) => self.events.push(Event::program_change(
                self.ctx.offset,
                self.ctx.channel,
                *program,
            )),
            Node::Legato(nodes) => self.legato(nodes),
            Node::Sheet(sheet) => self.sheet(sheet),
            Node::Reference(reference) => self.reference(reference),
            Node::Crate(nodes) => {
                for child in nodes {
                    self.node(child);
                }
            }
            Node::Eof => self.events.push(Event::end(self.ctx.offset)),
        }
    }

    fn bpm(&mut self, bpm: u32) {
        if bpm == 0 {
            log::warn!("ignoring tempo of 0 bpm at tick {}", self.ctx.offset);
            return;
        }
        self.events.push(Event::tempo(self.ctx.offset, bpm));
        self.ctx.bpm = bpm;
    }

    fn note(&mut self, note: &Note) {
        let channel = note.channel.map_or(self.ctx.channel, clamp_channel);
        let octave = note.octave.unwrap_or(self.ctx.octave);
        let velocity = note.velocity.map_or(self.ctx.velocity, velocity_from_code);

        self.ctx.channel = channel;
        self.ctx.octave = octave;
        self.ctx.velocity = velocity;

        self.tone(Tone {
            channel,
            pitch: midi_pitch(note.letter, &note.accidental, octave),
            velocity,
        });
    }

    fn interval(&mut self, delta: i32) {
        match self.ctx.last_note {
            Some(base) => self.tone(Tone {
                pitch: transpose(base.pitch, delta),
                ..base
            }),
            None => {
                log::debug!("interval at tick {} has no base note", self.ctx.offset);
                let slot = self.ctx.slot();
                self.ctx.advance(slot.ticks);
            }
        }
    }

    /// Emit a note for `tone` at the current offset and advance by one slot.
    fn tone(&mut self, tone: Tone) {
        let slot = self.ctx.slot();
        self.events.push(Event::note(
            self.ctx.offset,
            tone.channel,
            tone.pitch,
            tone.velocity,
            slot.note_duration(self.ctx.legato),
        ));
        self.ctx.last_note = Some(tone);
        self.ctx.last_tone = Some(self.events.len() - 1);
        self.ctx.advance(slot.ticks);
    }

    fn legato(&mut self, nodes: &'a [Node]) {
        let outer = self.ctx.legato;
        let last = nodes
            .iter()
            .rposition(|n| matches!(n, Node::Note(_) | Node::Interval(_)));
        for (i, child) in nodes.iter().enumerate() {
            self.ctx.legato = last.is_some_and(|last| i < last);
            self.node(child);
        }
        self.ctx.legato = outer;
    }

    fn sheet(&mut self, sheet: &'a Sheet) {
        let Some(ratio) = sheet.ratio() else {
            log::warn!(
                "skipping sheet {}{}{{...}} with a zero ratio",
                sheet.units,
                sheet.duration
            );
            return;
        };

        // replays push labels but never register them
        let mut guarded = None;
        if let Some(label) = sheet.label.as_deref() {
            self.ctx.enter_namespace(label);
            let path = self.ctx.current_path();
            let fresh = if self.ctx.is_replaying() {
                !self.ctx.is_active(&path)
            } else {
                let definition = Definition {
                    sheet,
                    divider: self.ctx.divider,
                };
                self.ctx.register(path.clone(), definition)
            };
            if fresh {
                self.ctx.activate(&path);
                guarded = Some(path);
            }
        }

        self.repeat(sheet.repeat, self.ctx.divider * ratio, &sheet.nodes);

        if let Some(path) = guarded {
            self.ctx.deactivate(&path);
        }
        if sheet.label.is_some() {
            self.ctx.leave_namespace();
        }
    }

    fn reference(&mut self, reference: &Reference) {
        let Some((path, definition)) = self.ctx.resolve(&reference.label) else {
            log::debug!("reference to undefined sheet {}", reference.label);
            return;
        };
        if self.ctx.is_active(&path) {
            log::warn!("sheet {path} references itself, skipping");
            return;
        }
        let Some(ratio) = definition.sheet.ratio() else {
            return;
        };

        self.ctx.activate(&path);
        self.ctx.begin_replay();
        let caller = self.ctx.enter_scope(&path);
        self.repeat(
            reference.repeat,
            definition.divider * ratio,
            &definition.sheet.nodes,
        );
        self.ctx.leave_scope(caller);
        self.ctx.end_replay();
        self.ctx.deactivate(&path);
    }

    /// Translate `body` under `divider` according to `repeat`.
    fn repeat(&mut self, repeat: Repeat, divider: f64, body: &'a [Node]) {
        let outer = self.ctx.divider;
        match repeat {
            Repeat::Times(n) => {
                for _ in 0..n {
                    self.body(divider, body);
                }
            }
            Repeat::DryRun => {
                let mark = self.events.len();
                let offset = self.ctx.offset;
                self.body(divider, body);
                self.events.truncate(mark);
                self.ctx.offset = offset;
                if self.ctx.last_tone.is_some_and(|i| i >= mark) {
                    self.ctx.last_tone = None;
                }
            }
            Repeat::Forever => {
                let mark = self.events.len();
                let offset = self.ctx.offset;
                self.body(divider, body);
                self.close_loop(mark, offset);
            }
        }
        self.ctx.divider = outer;
    }

    fn body(&mut self, divider: f64, body: &'a [Node]) {
        for child in body {
            self.ctx.divider = divider;
            self.node(child);
        }
    }

    /// Flag the events emitted since `mark` as one endlessly repeated body.
    fn close_loop(&mut self, mark: usize, offset_before: u64) {
        let span = self.ctx.offset - offset_before;
        if self.events.len() == mark || span == 0 {
            log::debug!("loop body at tick {offset_before} is empty, playing it once");
            return;
        }
        if self.events[mark..].iter().any(|e| e.end_loop) {
            log::debug!("loop at tick {offset_before} encloses a closed loop, leaving it open");
            return;
        }
        let last = self.events.len() - 1;
        self.events[mark].start_loop = true;
        self.events[last].end_loop = true;
        self.events[last].loop_offset = span;
    }
}
