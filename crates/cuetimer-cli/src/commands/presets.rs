use cuetimer_core::{format_clock, PRESETS};

pub fn run() -> Result<(), Box<dyn std::error::Error>> {
    for preset in PRESETS {
        println!("{:<5} {}", preset.label, format_clock(preset.duration_secs));
    }
    Ok(())
}
