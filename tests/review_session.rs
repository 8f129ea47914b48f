use subsync::player::{IncomingFile, ManualClock, Player, UploadSlot};
use subsync::{format_time, parse, parse_with_diagnostics, resolve_active};

const TWO_CUES: &str =
    "1\n00:00:01,000 --> 00:00:03,000\nHello\n\n2\n00:00:04,000 --> 00:00:06,000\nWorld";

#[test]
fn two_cue_file_end_to_end() {
    let track = parse(TWO_CUES);
    assert_eq!(track.len(), 2);

    let at = |time: f64| resolve_active(&track, time).map(|i| (i, track[i].text.as_str()));
    assert_eq!(at(2.0), Some((0, "Hello")));
    assert_eq!(at(3.5), None);
    assert_eq!(at(5.0), Some((1, "World")));
}

#[test]
fn timing_converts_to_exact_seconds() {
    let track = parse("1\n01:02:03,500 --> 01:02:04,000\ntext");
    assert_eq!(track[0].start_time, 3723.5);
    assert_eq!(track[0].end_time, 3724.0);
}

#[test]
fn many_blocks_keep_order_and_fields() {
    let mut input = String::new();
    for i in 0..50u32 {
        input.push_str(&format!(
            "{}\n00:{:02}:{:02},250 --> 00:{:02}:{:02},750\nline {}\nsecond {}\n\n",
            i + 1,
            i / 60,
            i % 60,
            i / 60,
            i % 60,
            i,
            i
        ));
    }
    let track = parse(&input);

    assert_eq!(track.len(), 50);
    for (i, entry) in track.iter().enumerate() {
        assert_eq!(entry.sequence_number, Some(i as i64 + 1));
        assert_eq!(entry.start_time, i as f64 + 0.25);
        assert_eq!(entry.end_time, i as f64 + 0.75);
        assert_eq!(entry.text, format!("line {}\nsecond {}", i, i));
    }
}

#[test]
fn each_malformed_block_removes_exactly_one_entry() {
    let input = "1\n00:00:01,000 --> 00:00:02,000\na\n\n\
                 2\n00:00:03 --> 00:00:04\nb\n\n\
                 3\n00:00:05,000 --> 00:00:06,000\nc\n\n\
                 4\n00:00:07 --> 00:00:08\nd\n\n\
                 5\n00:00:09,000 --> 00:00:10,000\ne";
    let outcome = parse_with_diagnostics(input);

    let texts: Vec<&str> = outcome.track.iter().map(|e| e.text.as_str()).collect();
    assert_eq!(texts, vec!["a", "c", "e"]);
    let lines: Vec<usize> = outcome.diagnostics.iter().map(|d| d.line).collect();
    assert_eq!(lines, vec![5, 13]);
}

#[test]
fn overlapping_cues_prefer_the_earlier_one() {
    let track = parse(
        "1\n00:00:00,000 --> 00:00:10,000\nA\n\n2\n00:00:05,000 --> 00:00:15,000\nB",
    );
    assert_eq!(resolve_active(&track, 7.0), Some(0));
    assert_eq!(resolve_active(&track, 7.0), resolve_active(&track, 7.0));
}

#[test]
fn clock_display() {
    assert_eq!(format_time(0.0), "0:00");
    assert_eq!(format_time(61.0), "1:01");
    assert_eq!(format_time(3599.0), "59:59");
    assert_eq!(format_time(90.7), "1:30");
}

#[test]
fn review_session_follows_seeks() {
    let mut player = Player::new(ManualClock::with_duration(10.0));
    player
        .upload(
            UploadSlot::Audio,
            IncomingFile::new("lecture.ogg", "audio/ogg", vec![1, 2, 3]),
        )
        .unwrap();
    player
        .upload(
            UploadSlot::Subtitles,
            IncomingFile::new("lecture.srt", "", TWO_CUES.as_bytes().to_vec()),
        )
        .unwrap();
    player.loaded_metadata();
    assert_eq!(player.duration(), 10.0);

    for &(time, expected) in &[(5.0, Some("World")), (2.0, Some("Hello")), (9.0, None)] {
        player.seek(time).unwrap();
        assert_eq!(player.active_caption().map(|c| c.text.as_str()), expected);
    }
}
