use std::env;
use std::fs;
use std::process::ExitCode;

use mova::repl::{self, ReplConfig};

const EXIT_USAGE: u8 = 64;
const EXIT_NO_INPUT: u8 = 66;
const EXIT_IO: u8 = 74;

fn main() -> ExitCode {
    let args: Vec<String> = env::args().skip(1).collect();
    match args.as_slice() {
        [] => match repl::start(ReplConfig::from_env()) {
            Ok(()) => ExitCode::SUCCESS,
            Err(err) => {
                eprintln!("Readline Error: {:?}", err);
                ExitCode::from(EXIT_IO)
            }
        },
        [path] => run_file(path),
        _ => {
            println!("Usage: mova [script]");
            ExitCode::from(EXIT_USAGE)
        }
    }
}

fn run_file(path: &str) -> ExitCode {
    let source = match fs::read_to_string(path) {
        Ok(source) => source,
        Err(err) => {
            eprintln!("Could not read '{}': {}", path, err);
            return ExitCode::from(EXIT_NO_INPUT);
        }
    };

    match mova::run(&source) {
        Ok(value) => {
            println!("{}", value);
            ExitCode::SUCCESS
        }
        Err(error) => {
            if error.pretty_print(path, &source).is_err() {
                eprintln!("{}", error);
            }
            ExitCode::from(error.exit_code())
        }
    }
}
