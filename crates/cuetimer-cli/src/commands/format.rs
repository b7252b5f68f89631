use cuetimer_core::{format_clock, parse_duration_input};

pub fn run(value: &str) -> Result<(), Box<dyn std::error::Error>> {
    println!("{}", format_clock(parse_duration_input(value)));
    Ok(())
}
