#![warn(clippy::all)]

use std::io::{self, Write as _};
use std::process;

use structopt::StructOpt;

use cfick::Opt;

fn main() {
    let opt = Opt::from_args();
    opt.init_tracing();
    if let Err(err) = opt.run() {
        let _ = io::stdout().flush();
        eprintln!();
        eprintln!("Error: {:?}", err);
        process::exit(1);
    }
}
