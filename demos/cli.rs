//! Read one equation per line from stdin and solve them.
//!
//! ```console
//! $ printf '2x + 3y = 7\nx - y = 0\n' | cargo run --example cli -- 2
//! x = 1.4000, y = 1.4000
//! ```

use linear_equations::{LinearSystem, SystemConfig};
use log::{info, LevelFilter};
use simplelog::{ColorChoice, Config, TerminalMode, TermLogger};
use std::io::{BufRead, BufReader};

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let mut verbose = false;
    let mut num_variables = None;

    for arg in std::env::args().skip(1) {
        match arg.as_str() {
            "-v" | "--verbose" => verbose = true,
            other => num_variables = Some(other.parse::<usize>()?),
        }
    }

    let level = if verbose {
        LevelFilter::Debug
    } else {
        LevelFilter::Info
    };
    TermLogger::init(
        level,
        Config::default(),
        TerminalMode::Stderr,
        ColorChoice::Auto,
    )?;

    let stdin = std::io::stdin();
    let mut lines = Vec::new();

    for line in BufReader::new(stdin.lock()).lines() {
        let line = line?;
        if !line.trim().is_empty() {
            lines.push(line);
        }
    }

    let num_variables = num_variables.unwrap_or(lines.len());
    let config = SystemConfig::new(num_variables, lines.len())?;
    info!(
        "Solving {} equations with {} unknowns",
        config.num_equations(),
        config.num_variables()
    );

    let mut system = LinearSystem::new(config);

    for (i, line) in lines.iter().enumerate() {
        if let Err(e) = system.set_equation(i, line) {
            eprintln!("Unable to parse \"{}\": {}", line, e);
            if let Some(cause) = std::error::Error::source(&e) {
                eprintln!("  caused by: {}", cause);
            }
            std::process::exit(1);
        }
    }

    println!("{}", system.solve());

    Ok(())
}
