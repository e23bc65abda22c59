use clap::Parser;
use crossbeam_channel::{RecvTimeoutError, unbounded};
use speedy::config::{RcConfig, RcLoader};
use speedy::controller::{CommandOutcome, CommandRunner, Session};
use std::io::{self, BufRead};
use std::path::PathBuf;
use std::thread;
use std::time::Duration;

/// Line-oriented front end for the speedy editing engine.
#[derive(Parser, Debug)]
#[command(name = "speedy", version, about = "Line-oriented text editor with remote sync")]
struct Args {
    /// Files to open
    files: Vec<PathBuf>,

    /// Settings file to use instead of ./.speedyrc or ~/.speedyrc
    #[arg(long)]
    config: Option<PathBuf>,

    /// Sync peer address
    #[arg(long)]
    server: Option<String>,

    /// Sync peer port
    #[arg(long)]
    port: Option<u16>,

    /// Autosave interval in milliseconds (0 disables autosave)
    #[arg(long = "autosave-ms")]
    autosave_ms: Option<u64>,

    /// Print a sample settings file and exit
    #[arg(long)]
    sample_rc: bool,
}

impl Args {
    fn load_config(&self) -> RcConfig {
        let mut config = match &self.config {
            Some(path) => RcLoader::load_from_path(path),
            None => RcLoader::load_config(),
        };
        if let Some(server) = &self.server {
            config.sync_server = Some(server.clone());
        }
        if let Some(port) = self.port {
            config.sync_port = port;
        }
        if let Some(interval) = self.autosave_ms {
            config.autosave_interval_ms = interval;
        }
        config
    }
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    env_logger::Builder::new()
        .filter_level(log::LevelFilter::Info)
        .parse_default_env()
        .init();

    let args = Args::parse();
    if args.sample_rc {
        print!("{}", RcLoader::generate_sample_rc());
        return Ok(());
    }

    let config = args.load_config();
    let autosave_ms = config.autosave_interval_ms;
    let mut session = Session::new(config);

    for file in &args.files {
        session.open_file(file);
    }
    if session.buffer_count() == 0 {
        session.new_document();
    }

    if session.connect_sync()? && autosave_ms > 0 {
        session.begin_autosave(Duration::from_millis(autosave_ms));
    }

    // Stdin is read on its own thread so sync results keep arriving while
    // the user is idle.
    let (lines_tx, lines_rx) = unbounded();
    thread::spawn(move || {
        for line in io::stdin().lock().lines() {
            let Ok(line) = line else { break };
            if lines_tx.send(line).is_err() {
                break;
            }
        }
    });

    let mut runner = CommandRunner::new();
    loop {
        match lines_rx.recv_timeout(Duration::from_millis(50)) {
            Ok(line) => match runner.execute_line(&mut session, &line) {
                CommandOutcome::Continue(message) if !message.is_empty() => println!("{message}"),
                CommandOutcome::Continue(_) => {}
                CommandOutcome::Quit => break,
            },
            Err(RecvTimeoutError::Timeout) => {}
            Err(RecvTimeoutError::Disconnected) => break,
        }
        session.process_events();
    }

    Ok(())
}
