use pitchgrid::datalink::{TuningDataReceiver, TuningDataSender, END_SENTINEL, START_SENTINEL, TUNING_FRAME_LEN};
use pitchgrid::{RegularScale, TuningPreset};

fn main() -> anyhow::Result<()> {
    env_logger::init();

    let tuning = TuningPreset::QuarterCommaMeantone.tuning();
    let scale = RegularScale::default();
    let mut sender = TuningDataSender::new(&tuning, &scale);
    let mut receiver = TuningDataReceiver::new();

    // Join three ticks into the first frame, like a receiver patched in late
    println!("=== Late join ===");
    for _ in 0..3 {
        sender.tick();
    }

    for tick in 0..3 * TUNING_FRAME_LEN {
        let sample = sender.tick();
        let bits = sample.to_bits();
        let label = match bits {
            START_SENTINEL => "START".to_string(),
            END_SENTINEL => "END".to_string(),
            _ => format!("{:e}", sample),
        };
        let committed = receiver.tick(sample);
        println!(
            "tick {:>2}: {:#010x} {:<14} frames={}{}",
            tick,
            bits,
            label,
            receiver.frames_received(),
            if committed { " <- commit" } else { "" }
        );
    }

    let snapshot = receiver
        .snapshot()
        .ok_or_else(|| anyhow::anyhow!("receiver never locked on"))?;
    println!("\nReceived: {:?}", snapshot);
    println!("Sent tuning: {}", tuning);

    Ok(())
}
