use std::io;
use std::process::ExitCode;
use std::sync::atomic::AtomicBool;
use std::sync::Arc;

use clap::Parser;
use log::warn;
use signal_hook::consts::{SIGINT, SIGTERM};
use signal_hook::flag;

use rping::cli::Args;
use rping::driver::ping_destination;
use rping::{Identifier, Prober, RawSocket};

fn register_stop_flag() -> Arc<AtomicBool> {
    let term = Arc::new(AtomicBool::new(false));
    for signal in [SIGINT, SIGTERM] {
        // A second signal while the first is still pending exits right away.
        let registered = flag::register_conditional_shutdown(signal, 1, Arc::clone(&term))
            .and_then(|_| flag::register(signal, Arc::clone(&term)));
        if let Err(e) = registered {
            warn!("cannot install handler for signal {}: {}", signal, e);
        }
    }
    term
}

fn main() -> ExitCode {
    env_logger::init();
    let args = Args::parse();
    let term = register_stop_flag();

    let prober = Prober::new(RawSocket::open, Identifier::random());
    let stdout = io::stdout();
    match ping_destination(&prober, &args.destination, args.count, &term, &mut stdout.lock()) {
        Ok(_) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("Error: {}", e);
            ExitCode::FAILURE
        }
    }
}
