use std::process::ExitCode;

use clap::Parser;

use decrat::config::Config;
use decrat::math::{operation::Operation, parsefmt};

/// One-shot exact decimal-rational calculator.
#[derive(Parser)]
#[command()]
pub struct Args {
    /// left operand: a decimal ("150.5") or fraction ("1/3") literal
    lhs: String,
    /// one of + - * /
    op: String,
    /// right operand
    rhs: String,
    /// also print the value as a rounded float
    #[arg(short, long)]
    float: bool,
    /// decimal digits for --float (defaults to the configured value)
    #[arg(short, long)]
    digits: Option<i32>,
    /// print the canonical (significand, base, denominator) triple
    #[arg(short, long)]
    parts: bool,
}

fn main() -> ExitCode {
    let args = Args::parse();
    let config = Config::load();
    match run(&args, &config) {
        Ok(out) => {
            println!("{out}");
            ExitCode::SUCCESS
        }
        Err(message) => {
            eprintln!("{message}");
            ExitCode::FAILURE
        }
    }
}

fn run(args: &Args, config: &Config) -> Result<String, String> {
    let lhs = parsefmt::parse(&args.lhs).ok_or_else(|| format!("invalid operand: {}", args.lhs))?;
    let rhs = parsefmt::parse(&args.rhs).ok_or_else(|| format!("invalid operand: {}", args.rhs))?;
    let op =
        Operation::from_str(&args.op).ok_or_else(|| format!("invalid operation: {}", args.op))?;
    let result = op.apply(&lhs, &rhs).map_err(|e| e.to_string())?;

    let mut out = parsefmt::fmt(&result);
    if args.float {
        let digits = args.digits.unwrap_or(config.float_digits);
        out += &format!(" ~ {}", result.to_float(Some(digits)));
    }
    if args.parts || config.show_parts {
        let (significand, base, denominator) = result.to_parts();
        out += &format!(" [{significand}, {base}, {denominator}]");
    }
    Ok(out)
}
