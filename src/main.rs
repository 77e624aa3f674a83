//! Korlessa: read notation, translate it, and play it to a MIDI port.

use std::io::Read;
use std::process::ExitCode;

use clap::Parser;

use korlessa::cli::Cli;
use korlessa::config::Config;
use korlessa::dsl::{translate, Compiler};
use korlessa::midi::{self, MidiOutput};
use korlessa::player::{CancellationToken, Player, SequencerTransport};
use korlessa::{logging, Error, Result};

fn main() -> ExitCode {
    let cli = Cli::parse();
    if let Err(e) = logging::init(cli.debug) {
        eprintln!("failed to install logger: {e}");
    }

    match run(&cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("{e}");
            ExitCode::FAILURE
        }
    }
}

fn run(cli: &Cli) -> Result<()> {
    let config = Config::resolve(cli.config.as_deref())?;

    if cli.list {
        return list_ports(&config);
    }

    let target = cli.target(&config)?;
    if target.is_none() && cli.needs_device() {
        return Err(Error::NoTarget);
    }

    let (name, source) = read_source(cli)?;
    let tree = Compiler::parse(&name, &source)?;
    if cli.print_ast {
        println!("{tree}");
        return Ok(());
    }

    let sequence = translate(&tree);
    if cli.print_events {
        println!("{sequence}");
        return Ok(());
    }

    let target = target.ok_or(Error::NoTarget)?;
    let output = MidiOutput::connect(&config.midi.client_name, &target)?;

    let cancel = CancellationToken::new();
    let handler = cancel.clone();
    ctrlc::set_handler(move || handler.cancel())?;

    let mut player = Player::new(
        sequence,
        SequencerTransport::new(output),
        config.player_settings(),
    );
    player.run(&cancel)?;
    Ok(())
}

fn list_ports(config: &Config) -> Result<()> {
    let ports = midi::list_ports(&config.midi.client_name)?;
    if ports.is_empty() {
        println!("no MIDI output ports available");
    }
    for port in ports {
        println!("{:>3}  {}", port.index, port.name);
    }
    Ok(())
}

/// The notation text and the name used for it in error messages.
fn read_source(cli: &Cli) -> Result<(String, String)> {
    if let Some(source) = &cli.source {
        return Ok(("<arg>".to_string(), source.clone()));
    }
    if let Some(path) = &cli.file {
        let source = std::fs::read_to_string(path).map_err(|source| Error::Read {
            path: path.clone(),
            source,
        })?;
        return Ok((path.display().to_string(), source));
    }
    let mut source = String::new();
    std::io::stdin()
        .read_to_string(&mut source)
        .map_err(Error::Stdin)?;
    Ok(("<stdin>".to_string(), source))
}
