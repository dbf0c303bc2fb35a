use std::io::Write;

use pitchgrid::datalink::{TuningDataReceiver, TuningDataSender, TUNING_FRAME_LEN};
use pitchgrid::{wav, TuningSession, SAMPLE_RATE};

mod common;
use common::v;

#[test]
fn smoke_test() {
    let mut session = TuningSession::new().unwrap();
    session.select_interval(v(0, 0));
    session.retune_interval_by_amount(-300.0).unwrap();
    session.select_scale_system(v(3, 4)).unwrap();

    let mut sender = TuningDataSender::new(session.tuning(), session.scale());
    let samples: Vec<f32> = (0..3 * TUNING_FRAME_LEN).map(|_| sender.tick()).collect();

    let wav_data = wav::encode_stream(&samples, SAMPLE_RATE).unwrap();
    let mut file = tempfile::NamedTempFile::new().unwrap();
    file.write_all(&wav_data).unwrap();
    file.flush().unwrap();

    let bytes = std::fs::read(file.path()).unwrap();
    assert_eq!(wav::stream_sample_rate(&bytes).unwrap(), SAMPLE_RATE);
    let decoded = wav::decode_stream(&bytes).unwrap();
    assert_eq!(decoded.len(), samples.len());

    let mut receiver = TuningDataReceiver::new();
    for sample in decoded {
        receiver.tick(sample);
    }
    assert_eq!(receiver.frames_received(), 3);
    assert_eq!(receiver.snapshot(), Some(session.snapshot()));
}
