//! Preset demo: factory presets, validation, TOML and offline playback.
//!
//! Run with: cargo run -p voltseq-config --example preset_demo

use voltseq_config::{
    StepLane, factory_preset_names, get_factory_preset, render, schedule,
    validate_preset,
};
use voltseq_routing::TrackId;

fn main() {
    println!("=== Factory Presets ===\n");
    for name in factory_preset_names() {
        let Some(preset) = get_factory_preset(name) else {
            continue;
        };
        let status = match validate_preset(&preset) {
            Ok(()) => "valid".to_string(),
            Err(e) => format!("invalid: {e}"),
        };
        println!(
            "  {:<18} {} tracks, {} channels, {} lanes ({status})",
            name,
            preset.tracks.len(),
            preset.channels.len(),
            preset.lanes.len()
        );
    }

    println!("\n=== Tresillo Pluck as TOML ===\n");
    let Some(mut preset) = get_factory_preset("tresillo-pluck") else {
        return;
    };
    match preset.to_toml() {
        Ok(toml) => println!("{toml}"),
        Err(e) => eprintln!("serialize failed: {e}"),
    }

    println!("=== First bar of events ===\n");
    let bar_ms = preset.step_ms() * 8.0;
    for event in schedule(&preset, bar_ms) {
        println!(
            "  {:>7.1} ms  {} {}  vel {:.2}  note {:?}",
            event.timestamp_ms,
            event.track_id,
            if event.gate_on { "on " } else { "off" },
            event.velocity,
            event.note
        );
    }

    println!("\n=== Channel voltages every 50 ms ===\n");
    match render(&preset, bar_ms) {
        Ok(frames) => {
            for frame in frames.iter().step_by(50) {
                let volts: Vec<String> = frame
                    .voltages
                    .iter()
                    .map(|v| format!("{:+.3}", v.volts))
                    .collect();
                println!("  {:>6.0} ms  {}", frame.time_ms, volts.join("  "));
            }
        }
        Err(e) => eprintln!("render failed: {e}"),
    }

    println!("\n=== Validation of a broken edit ===\n");
    preset.bpm = 1000.0;
    preset.lanes.push(StepLane::euclidean(TrackId(9), 4, 6, 0));
    if let Err(e) = validate_preset(&preset) {
        println!("  {e}");
    }
}
