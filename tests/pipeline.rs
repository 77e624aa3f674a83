//! Notation → events tests: what `--print-events` shows, and the shape of looped sequences.

use pretty_assertions::assert_eq;

use korlessa::dsl::Compiler;
use korlessa::event::{EventKind, EventSequence};

fn compile(src: &str) -> EventSequence {
    Compiler::compile("test", src).expect("compile failed")
}

fn printed(src: &str) -> String {
    compile(src).to_string()
}

fn pitches(seq: &EventSequence) -> Vec<u8> {
    seq.events()
        .iter()
        .filter_map(|e| match e.kind {
            EventKind::Note { pitch, .. } => Some(pitch),
            _ => None,
        })
        .collect()
}

// =============================================================================
// Printed events
// =============================================================================

#[test]
fn print_events_format() {
    assert_eq!(
        printed("8{c}loop"),
        "(NOTE L-START-END t:0 ch:0 d:44 n:60 v:127)"
    );
    assert_eq!(
        printed("100bpm 8{c d}"),
        "(TEMPO t:0 bpm:100) (NOTE t:0 ch:0 d:44 n:60 v:127) (NOTE t:48 ch:0 d:44 n:62 v:127) (END t:96)"
    );
}

#[test]
fn eighth_note_slot() {
    let seq = compile("8{c d e f}");
    let ticks: Vec<u64> = seq.events().iter().map(|e| e.tick).collect();
    assert_eq!(ticks, vec![0, 48, 96, 144, 192]);
}

#[test]
fn sequence_without_loop_ends_with_end() {
    let seq = compile("4{c} 8{d e}x2 2{.}");
    assert!(!seq.is_cyclic());
    assert_eq!(seq.last().map(|e| e.kind), Some(EventKind::End));
    assert_eq!(seq.last().map(|e| e.tick), Some(96 + 4 * 48 + 192));
}

// =============================================================================
// A small song
// =============================================================================

const SONG: &str = r#"
// tempo, then a riff defined once and replayed
90bpm
pgm33
riff:8{c3 e3 g3 +5}
{riff}x2
outro:4{(c d) . e-}
"#;

#[test]
fn song_events() {
    let seq = compile(SONG);
    assert_eq!(
        pitches(&seq),
        vec![36, 40, 43, 48, 36, 40, 43, 48, 36, 40, 43, 48, 36, 38, 40]
    );
    assert_eq!(seq.events()[0].kind, EventKind::Tempo { bpm: 90 });
    assert_eq!(seq.last().map(|e| e.tick), Some(3 * 192 + 4 * 96));
}

#[test]
fn song_keeps_octave_across_sheets() {
    // the outro inherits octave 3 from the riff
    let seq = compile(SONG);
    let outro: Vec<u8> = pitches(&seq)[12..].to_vec();
    assert_eq!(outro, vec![36, 38, 40]);
}

#[test]
fn song_tie_extends_last_note() {
    let seq = compile(SONG);
    let last_note = seq.events().iter().rev().find(|e| e.is_note()).unwrap();
    // e on the fourth quarter, tied into a fifth slot
    assert_eq!(
        last_note.kind,
        EventKind::Note {
            channel: 0,
            pitch: 40,
            velocity: 127,
            duration: 92 + 96
        }
    );
}

// =============================================================================
// Loops through the full pipeline
// =============================================================================

#[test]
fn looped_song_plays_forever() {
    let seq = compile("intro:4{c} main:8{d e}loop");
    assert!(seq.is_cyclic());
    let ticks: Vec<u64> = seq.walk().take(7).map(|e| e.tick).collect();
    assert_eq!(ticks, vec![0, 96, 144, 192, 240, 288, 336]);
    let replayed: Vec<u8> = seq
        .walk()
        .take(5)
        .filter_map(|e| match e.kind {
            EventKind::Note { pitch, .. } => Some(pitch),
            _ => None,
        })
        .collect();
    assert_eq!(replayed, vec![60, 62, 64, 62, 64]);
}

#[test]
fn looped_reference() {
    let seq = compile("beat:16{c . c c}x0 {beat}loop");
    let edge = seq.loop_edge().unwrap();
    assert_eq!(edge.start, 0);
    assert_eq!(edge.end, 2);
    assert_eq!(edge.offset, 96);
}

#[test]
fn nothing_follows_a_loop() {
    let seq = compile("8{c}loop 4{d e f} 200bpm");
    assert_eq!(seq.len(), 1);
}
