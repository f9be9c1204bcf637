//! Preset management commands.
//!
//! Provides commands to list, show and export sequencer presets.

use clap::{Args, Subcommand};
use std::path::PathBuf;
use voltseq_config::{
    SequencerPreset, ensure_user_presets_dir, factory_presets, get_factory_preset,
    list_user_presets, preset_name_from_path, user_presets_dir,
};

use super::common::{load_preset, pattern_string};

#[derive(Args)]
pub struct PresetsArgs {
    #[command(subcommand)]
    command: PresetsCommand,
}

#[derive(Subcommand)]
enum PresetsCommand {
    /// List available presets (factory and user)
    List {
        /// Show only factory presets
        #[arg(long)]
        factory: bool,

        /// Show only user presets
        #[arg(long)]
        user: bool,
    },

    /// Show details of a preset
    Show {
        /// Preset name or path
        name: String,
    },

    /// Print a preset as TOML, or write it to a file
    Export {
        /// Preset name or path
        name: String,

        /// Output file (default: stdout)
        #[arg(short, long)]
        output: Option<PathBuf>,
    },

    /// Copy a factory preset to user presets for customization
    Copy {
        /// Factory preset name
        source: String,

        /// New preset name (uses the source name if not given)
        #[arg(short, long)]
        name: Option<String>,

        /// Overwrite if the user preset already exists
        #[arg(long)]
        force: bool,
    },

    /// Show preset directories
    Paths,
}

pub fn run(args: PresetsArgs) -> anyhow::Result<()> {
    match args.command {
        PresetsCommand::List { factory, user } => list_presets(factory, user),
        PresetsCommand::Show { name } => show_preset(&name),
        PresetsCommand::Export { name, output } => export_preset(&name, output),
        PresetsCommand::Copy {
            source,
            name,
            force,
        } => copy_preset(&source, name.as_deref(), force),
        PresetsCommand::Paths => {
            println!("User presets: {}", user_presets_dir().display());
            Ok(())
        }
    }
}

fn list_presets(factory_only: bool, user_only: bool) -> anyhow::Result<()> {
    if !user_only {
        println!("Factory Presets:");
        println!("================");
        for (id, preset) in voltseq_config::factory_preset_names()
            .into_iter()
            .zip(factory_presets())
        {
            let desc = preset.description.as_deref().unwrap_or("");
            println!("  {id:20} - {desc}");
        }
        println!();
    }

    if !factory_only {
        println!("User Presets:");
        println!("=============");
        let user_presets = list_user_presets();
        if user_presets.is_empty() {
            println!("  (none)");
            println!();
            println!("  Start from a factory preset with: voltseq presets copy <name>\n");
        } else {
            for path in user_presets {
                let name = preset_name_from_path(&path).unwrap_or_else(|| "unknown".to_string());
                match SequencerPreset::load(&path) {
                    Ok(preset) => {
                        let desc = preset.description.as_deref().unwrap_or("");
                        println!("  {name:20} - {desc}");
                    }
                    Err(e) => {
                        tracing::debug!(path = %path.display(), error = %e, "unreadable preset");
                        println!("  {name:20} - (error loading)");
                    }
                }
            }
            println!();
        }
    }

    Ok(())
}

fn show_preset(name: &str) -> anyhow::Result<()> {
    let preset = load_preset(name)?;

    println!("Preset: {}", preset.name);
    println!("{}", "=".repeat(8 + preset.name.len()));
    println!();
    if let Some(desc) = &preset.description {
        println!("Description: {desc}");
        println!();
    }

    println!(
        "Tempo: {} bpm, {} steps/beat ({:.1} ms steps), tick rate {} Hz",
        preset.bpm,
        preset.steps_per_beat,
        preset.step_ms(),
        preset.tick_rate_hz
    );
    let iface = &preset.interface;
    println!(
        "Interface: {} ({} outputs, {:+} V to {:+} V)",
        iface.name, iface.output_count, iface.voltage_min, iface.voltage_max
    );
    println!();

    println!("Tracks ({}):", preset.tracks.len());
    for track in &preset.tracks {
        let env = &track.envelope;
        let source = track
            .source_track_id
            .map(|s| format!(" <- {s}"))
            .unwrap_or_default();
        let disabled = if track.is_enabled { "" } else { " [DISABLED]" };
        println!(
            "  {} {:16} out {}  {} x{:+.2}{source}{disabled}",
            track.id,
            track.name,
            track.output_channel,
            track.modulation_destination.label(),
            track.modulation_amount
        );
        println!(
            "      A {} ms  D {} ms  S {}  R {} ms{}",
            env.attack_ms,
            env.decay_ms,
            env.sustain,
            env.release_ms,
            if env.loop_enabled {
                format!("  loop {:?}", env.loop_point)
            } else {
                String::new()
            }
        );
    }
    println!();

    println!("Channels ({}):", preset.channels.len());
    for ch in &preset.channels {
        let track = ch
            .track_id
            .map(|t| t.to_string())
            .unwrap_or_else(|| "by output".to_string());
        println!(
            "  {:>2}  {:10} {:>14}  {:+} V/unit {:+} V{}",
            ch.output_channel,
            ch.output_type.name(),
            track,
            ch.voltage_scale,
            ch.voltage_offset,
            if ch.slew > 0.0 {
                format!("  slew {} V/ms", ch.slew)
            } else {
                String::new()
            }
        );
    }
    println!();

    println!("Lanes ({}):", preset.lanes.len());
    for lane in &preset.lanes {
        println!("  {}  {}", lane.track_id, pattern_string(&lane.pattern()));
    }

    Ok(())
}

fn export_preset(name: &str, output: Option<PathBuf>) -> anyhow::Result<()> {
    let preset = load_preset(name)?;
    match output {
        Some(path) => {
            preset.save(&path)?;
            println!("Wrote '{}' to {}", preset.name, path.display());
        }
        None => print!("{}", preset.to_toml()?),
    }
    Ok(())
}

fn copy_preset(source: &str, new_name: Option<&str>, force: bool) -> anyhow::Result<()> {
    let preset = get_factory_preset(source)
        .ok_or_else(|| anyhow::anyhow!("Factory preset '{source}' not found."))?;

    let target_name = new_name.unwrap_or(source);
    let dir = ensure_user_presets_dir()?;
    let preset_path = dir.join(format!("{target_name}.toml"));

    if preset_path.exists() && !force {
        anyhow::bail!(
            "Preset '{target_name}' already exists in user presets. Use --force or choose a different --name."
        );
    }

    let mut copy = preset;
    copy.name = target_name.to_string();
    copy.save(&preset_path)?;

    println!("Copied factory preset '{source}' to user preset '{target_name}'");
    println!("Path: {}", preset_path.display());
    Ok(())
}
