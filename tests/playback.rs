//! Playback through the software sequencer into a capturing MIDI sink.
//!
//! Tempos are high so each piece lasts a few milliseconds.

use std::thread;
use std::time::Duration;

use pretty_assertions::assert_eq;

use korlessa::dsl::Compiler;
use korlessa::midi::{MidiError, MidiMessage, MidiSink};
use korlessa::player::{
    CancellationToken, Player, PlayerError, PlayerSettings, PlayerState, SequencerTransport,
};

#[derive(Default)]
struct Capture {
    sent: Vec<MidiMessage>,
}

impl MidiSink for Capture {
    fn send(&mut self, message: &MidiMessage) -> Result<(), MidiError> {
        self.sent.push(*message);
        Ok(())
    }
}

struct Broken;

impl MidiSink for Broken {
    fn send(&mut self, _message: &MidiMessage) -> Result<(), MidiError> {
        Err(MidiError::Send("device unplugged".into()))
    }
}

fn fast() -> PlayerSettings {
    PlayerSettings {
        bpm: 3000,
        queue_size: 8,
        drain_size: 4,
        poll_timeout: Duration::from_millis(5),
        settle: Duration::ZERO,
    }
}

fn player<S: MidiSink>(src: &str, sink: S) -> Player<SequencerTransport<S>> {
    let sequence = Compiler::compile("test", src).expect("compile failed");
    Player::new(sequence, SequencerTransport::new(sink), fast())
}

fn count(sent: &[MidiMessage], on: bool) -> usize {
    sent.iter()
        .filter(|m| match m {
            MidiMessage::NoteOn { .. } => on,
            MidiMessage::NoteOff { .. } => !on,
            _ => false,
        })
        .count()
}

// =============================================================================
// Finite pieces
// =============================================================================

#[test]
fn plays_notes_in_order_and_stops() {
    let mut player = player("16{c d e f}", Capture::default());
    player.run(&CancellationToken::new()).unwrap();
    assert_eq!(player.state(), PlayerState::Closed);

    let transport = player.into_transport();
    assert!(!transport.is_running());
    let mut expected = Vec::new();
    for note in [60, 62, 64, 65] {
        expected.push(MidiMessage::NoteOn {
            channel: 0,
            note,
            velocity: 127,
        });
        expected.push(MidiMessage::NoteOff { channel: 0, note });
    }
    assert_eq!(transport.into_sink().sent, expected);
}

#[test]
fn controllers_reach_the_device() {
    let mut player = player("pgm5 4{cc7:90 c}", Capture::default());
    player.run(&CancellationToken::new()).unwrap();
    let sent = player.into_transport().into_sink().sent;
    assert_eq!(sent[0], MidiMessage::program_change(0, 5));
    assert_eq!(sent[1], MidiMessage::control_change(0, 7, 90));
    assert_eq!(count(&sent, true), 1);
}

#[test]
fn tempo_events_retune_the_transport() {
    let mut player = player("6000bpm 16{c d}", Capture::default());
    player.run(&CancellationToken::new()).unwrap();
    let transport = player.into_transport();
    assert_eq!(transport.bpm(), 6000);
    assert_eq!(count(&transport.into_sink().sent, true), 2);
}

#[test]
fn long_piece_is_fed_in_windows() {
    // more events than one priming window holds
    let mut player = player("32{c d e f g a b c6}x4", Capture::default());
    player.run(&CancellationToken::new()).unwrap();
    let sent = player.into_transport().into_sink().sent;
    assert_eq!(count(&sent, true), 32);
    assert_eq!(count(&sent, false), 32);
}

// =============================================================================
// Loops and cancellation
// =============================================================================

#[test]
fn loop_plays_until_cancelled() {
    let mut player = player("8{c}loop", Capture::default());
    assert!(player.sequence().is_cyclic());

    let cancel = CancellationToken::new();
    let trigger = cancel.clone();
    let canceller = thread::spawn(move || {
        thread::sleep(Duration::from_millis(60));
        trigger.cancel();
    });
    player.run(&cancel).unwrap();
    canceller.join().unwrap();

    assert!(!player.sequence().is_cyclic());
    let sent = player.into_transport().into_sink().sent;
    assert!(count(&sent, true) > 1, "{sent:?}");
    // every note that sounded was silenced
    assert_eq!(count(&sent, true), count(&sent, false));
}

#[test]
fn cancelled_before_start_sends_nothing() {
    let cancel = CancellationToken::new();
    cancel.cancel();
    let mut player = player("4{c d e}", Capture::default());
    player.run(&cancel).unwrap();
    assert!(player.into_transport().into_sink().sent.is_empty());
}

#[test]
fn player_runs_once() {
    let mut player = player("16{c}", Capture::default());
    player.run(&CancellationToken::new()).unwrap();
    assert!(matches!(
        player.run(&CancellationToken::new()),
        Err(PlayerError::AlreadyRun)
    ));
}

// =============================================================================
// Failures
// =============================================================================

#[test]
fn device_failure_stops_playback() {
    let mut player = player("16{c d}", Broken);
    let err = player.run(&CancellationToken::new()).unwrap_err();
    assert!(
        matches!(
            err,
            PlayerError::Transport {
                state: PlayerState::Running,
                ..
            }
        ),
        "{err}"
    );
    assert_eq!(player.state(), PlayerState::Closed);
}
