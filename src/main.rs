use std::path::PathBuf;

use anyhow::{anyhow, Context, Result};
use clap::{Parser, Subcommand, ValueEnum};

use pitchgrid::datalink::{TuningDataReceiver, TuningDataSender, TUNING_FRAME_LEN};
use pitchgrid::grid::rational::closest_rational;
use pitchgrid::{keyboard, voct, wav, BlackKeyMap, LatticeVector, TuningPreset, TuningSession, SAMPLE_RATE};

/// Lattice tunings for isomorphic hex keyboards
#[derive(Parser, Debug)]
#[command(version, about, long_about = None)]
struct Args {
    #[command(subcommand)]
    command: Commands,
}

#[derive(clap::Args, Debug)]
struct TuningOpts {
    /// Tuning preset
    #[arg(long, value_enum, default_value_t = TuningPreset::Tet12)]
    preset: TuningPreset,

    /// Scale system as "large,small" step counts
    #[arg(long, default_value = "2,5", allow_hyphen_values = true)]
    system: LatticeVector,

    /// Scale mode (1 is major for the diatonic system)
    #[arg(long, default_value_t = 1)]
    mode: i32,
}

impl TuningOpts {
    fn session(&self) -> Result<TuningSession> {
        let mut session = TuningSession::with_preset(self.preset)?;
        session
            .select_scale_system(self.system)
            .with_context(|| format!("invalid scale system {}", self.system))?;
        session.set_scale_mode(self.mode);
        Ok(session)
    }
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// List the built-in tunings
    Presets,
    /// Print the degrees of a scale
    Scale {
        #[command(flatten)]
        tuning: TuningOpts,

        /// Print JSON instead of a table
        #[arg(long)]
        json: bool,
    },
    /// Print the keyboard with the note each key plays
    Layout {
        #[command(flatten)]
        tuning: TuningOpts,
    },
    /// Find the closest simple ratio to a frequency ratio
    Approx {
        /// Frequency ratio
        ratio: f64,

        /// Accept the first convergent within 1/bound
        #[arg(long, default_value_t = 35.0)]
        bound: f64,
    },
    /// Map 12-TET 1V/oct voltages onto the lattice and retune them
    Voct {
        /// Input voltages, 0V being middle C
        #[arg(required = true, allow_negative_numbers = true)]
        voltages: Vec<f32>,

        #[command(flatten)]
        tuning: TuningOpts,

        /// Spelling of the black keys
        #[arg(long, value_enum, default_value_t = BlackKeyMap::FSharp)]
        black_keys: BlackKeyMap,
    },
    /// Record a tuning data-link stream to a WAV file
    Link {
        /// Output WAV path
        output: PathBuf,

        #[command(flatten)]
        tuning: TuningOpts,

        /// Number of frames to record
        #[arg(long, default_value_t = 4)]
        frames: usize,

        /// Sample rate written to the WAV header
        #[arg(long, default_value_t = SAMPLE_RATE)]
        sample_rate: u32,
    },
    /// Replay a recorded stream into a receiver and print what arrived
    Decode {
        /// Input WAV path
        input: PathBuf,

        /// Print JSON instead of text
        #[arg(long)]
        json: bool,
    },
}

fn main() -> Result<()> {
    env_logger::init();

    let args = Args::parse();

    match args.command {
        Commands::Presets => {
            for preset in TuningPreset::ALL {
                let value_name = preset
                    .to_possible_value()
                    .map(|v| v.get_name().to_string())
                    .unwrap_or_default();
                println!("{:<18} {:<26} {}", value_name, preset.name(), preset.tuning());
            }
        }
        Commands::Scale { tuning, json } => {
            let session = tuning.session()?;
            let degrees = session.scale().degrees(session.tuning());
            if json {
                println!("{}", serde_json::to_string_pretty(&degrees)?);
            } else {
                println!("{}: {}", tuning.preset.name(), session.tuning());
                println!(
                    "scale system {}, mode {}, {} notes",
                    session.scale().scale_system(),
                    session.scale().mode(),
                    session.scale().n()
                );
                for d in degrees {
                    println!(
                        "{:>3}  {:<8} {:<5} {:>8.1}ct  {:<12} {:>7.3}V",
                        d.seq_nr,
                        d.coord.to_string(),
                        d.name,
                        d.cents,
                        d.ratio,
                        d.voltage
                    );
                }
            }
        }
        Commands::Layout { tuning } => {
            let session = tuning.session()?;
            for row in keyboard::rows().iter().rev() {
                // short rows sit half a key in
                let mut line = String::new();
                if row.len() < 6 {
                    line.push_str("   ");
                }
                for &id in row {
                    let label = match session.note_info(id) {
                        Some(info) if info.seq_nr.is_some() => info.name,
                        Some(_) => "·".to_string(),
                        None => continue,
                    };
                    line.push_str(&format!("{:>2}:{:<3} ", id, label));
                }
                println!("{}", line.trim_end());
            }
        }
        Commands::Approx { ratio, bound } => {
            if !(ratio.is_finite() && ratio > 0.0) {
                return Err(anyhow!("ratio must be a positive number (got {})", ratio));
            }
            let approx = closest_rational(ratio, bound);
            let error_cents = 1200.0 * (ratio / approx.to_f64()).log2();
            println!("{} ~ {} ({:+.2}ct)", ratio, approx, error_cents);
        }
        Commands::Voct {
            voltages,
            tuning,
            black_keys,
        } => {
            let mut session = tuning.session()?;
            session.set_black_key_map(black_keys);
            for voltage in voltages {
                let coord = voct::voltage_to_coord(voltage, black_keys);
                println!(
                    "{:>8.4}V  {:<9} {:<5} {:>8.4}V",
                    voltage,
                    coord.to_string(),
                    session.scale().canonical_name_for_coord(coord, session.tuning()),
                    session.mapped_voltage(voltage)
                );
            }
        }
        Commands::Link {
            output,
            tuning,
            frames,
            sample_rate,
        } => {
            let session = tuning.session()?;
            let mut sender = TuningDataSender::new(session.tuning(), session.scale());
            let samples: Vec<f32> = (0..frames * TUNING_FRAME_LEN).map(|_| sender.tick()).collect();

            let wav_data = wav::encode_stream(&samples, sample_rate)?;
            std::fs::write(&output, wav_data)
                .with_context(|| format!("writing '{}'", output.display()))?;
            println!(
                "wrote {} frames ({} samples) of {} to {}",
                frames,
                samples.len(),
                session.tuning(),
                output.display()
            );
        }
        Commands::Decode { input, json } => {
            let bytes =
                std::fs::read(&input).with_context(|| format!("reading '{}'", input.display()))?;
            let samples = wav::decode_stream(&bytes)?;

            let mut receiver = TuningDataReceiver::new();
            for sample in samples {
                receiver.tick(sample);
            }
            let snapshot = receiver
                .snapshot()
                .ok_or_else(|| anyhow!("no complete frame in '{}'", input.display()))?;

            let mut session = TuningSession::new()?;
            session
                .apply_snapshot(&snapshot)
                .context("received snapshot is not a valid tuning")?;

            if json {
                println!("{}", serde_json::to_string_pretty(&snapshot)?);
            } else {
                println!("frames received: {}", receiver.frames_received());
                println!("tuning: {}", session.tuning());
                println!(
                    "scale system {}, mode {}",
                    session.scale().scale_system(),
                    session.scale().mode()
                );
            }
        }
    }

    Ok(())
}
