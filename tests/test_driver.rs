mod common;

use common::*;
use log::Level;

fn run<A: weighlog::FrameAnalyzer>(
    source: &mut ScriptedSource,
    analyzer: &A,
    driver: &DriverConfig,
    sink: &MemorySink,
) -> weighlog::VideoReport {
    process_video(source, start_clock(), analyzer, driver, &SegmentationConfig::default(), sink)
}

#[test]
fn test_every_third_frame_is_sampled() {
    let mut source = ScriptedSource::frames(30.0, 30);
    let analyzer = ScriptedAnalyzer::new(|_| vec![1, 2, 5]);
    let sink = MemorySink::new();

    let report = run(&mut source, &analyzer, &DriverConfig::default(), &sink);

    let expected: Vec<u64> = (1..=10).map(|i| i * 3).collect();
    assert_eq!(analyzer.seen(), expected);
    let indices: Vec<u64> = report.records.iter().map(|r| r.frame_index).collect();
    assert_eq!(indices, expected);
    assert!(report.records.iter().all(|r| r.number == 12.5));
    assert_eq!(report.frames_read, 30);
    assert!(!report.stopped_early);
}

#[test]
fn test_stops_after_180_consecutive_failures() {
    let mut source = ScriptedSource::frames(30.0, 10).then_forever(Step::Fail);
    let analyzer = ScriptedAnalyzer::new(|_| vec![4, 0]);
    let sink = MemorySink::new();

    let report = run(&mut source, &analyzer, &DriverConfig::default(), &sink);

    assert_eq!(source.reads, 190);
    assert!(report.stopped_early);
    assert_eq!(report.read_failures, 180);
    assert_eq!(report.frames_read, 10);
    let indices: Vec<u64> = report.records.iter().map(|r| r.frame_index).collect();
    assert_eq!(indices, vec![3, 6, 9]);
    assert_eq!(sink.count(Level::Warn), 180);
    assert!(sink.contains("no frame read"));
    assert!(sink.contains("stopping video processing"));
}

#[test]
fn test_successful_read_resets_failure_count() {
    let driver = DriverConfig { sample_interval: 3, max_consecutive_failures: 3 };
    let steps = vec![
        Step::Frame, Step::Fail, Step::Fail,
        Step::Frame, Step::Fail, Step::Fail,
        Step::Frame,
    ];
    let mut source = ScriptedSource::new(30.0, steps);
    let analyzer = ScriptedAnalyzer::new(|_| vec![2, 0]);
    let sink = MemorySink::new();

    let report = run(&mut source, &analyzer, &driver, &sink);

    assert!(!report.stopped_early);
    assert_eq!(report.frames_read, 3);
    assert_eq!(report.read_failures, 4);
    assert_eq!(source.reads, 8);
}

#[test]
fn test_consecutive_failures_hit_the_limit() {
    let driver = DriverConfig { sample_interval: 3, max_consecutive_failures: 3 };
    let steps = vec![Step::Frame, Step::Fail, Step::Fail, Step::Fail, Step::Frame];
    let mut source = ScriptedSource::new(30.0, steps);
    let analyzer = ScriptedAnalyzer::new(|_| vec![2, 0]);
    let sink = MemorySink::new();

    let report = run(&mut source, &analyzer, &driver, &sink);

    assert!(report.stopped_early);
    assert_eq!(source.reads, 4);
    assert_eq!(report.frames_read, 1);
}

#[test]
fn test_clock_ticks_once_per_second_of_frames() {
    let mut source = ScriptedSource::frames(3.0, 9);
    let analyzer = ScriptedAnalyzer::new(|_| vec![3, 3]);
    let sink = MemorySink::new();

    let report = run(&mut source, &analyzer, &DriverConfig::default(), &sink);

    let stamps: Vec<&str> = report.records.iter().map(|r| r.timestamp.as_str()).collect();
    assert_eq!(
        stamps,
        vec!["2024-03-15-08:30:01", "2024-03-15-08:30:02", "2024-03-15-08:30:03"]
    );
}

#[test]
fn test_fractional_frame_rate_ticks_on_whole_frames() {
    // 29.97 fps ticks every 29 frames
    let mut source = ScriptedSource::frames(29.97, 60);
    let analyzer = ScriptedAnalyzer::new(|_| vec![3, 3]);
    let sink = MemorySink::new();

    let report = run(&mut source, &analyzer, &DriverConfig::default(), &sink);

    let stamp = |frame: u64| {
        report
            .records
            .iter()
            .find(|r| r.frame_index == frame)
            .map(|r| r.timestamp.clone())
            .unwrap()
    };
    assert_eq!(stamp(27), "2024-03-15-08:30:00");
    assert_eq!(stamp(30), "2024-03-15-08:30:01");
    assert_eq!(stamp(57), "2024-03-15-08:30:01");
    assert_eq!(stamp(60), "2024-03-15-08:30:02");
}

#[test]
fn test_retries_at_a_tick_boundary_tick_once() {
    let steps = vec![
        Step::Frame, Step::Frame,
        Step::Fail, Step::Fail, Step::Fail,
        Step::Frame,
    ];
    let mut source = ScriptedSource::new(3.0, steps);
    let analyzer = ScriptedAnalyzer::new(|_| vec![3, 3]);
    let sink = MemorySink::new();

    let report = run(&mut source, &analyzer, &DriverConfig::default(), &sink);

    assert_eq!(report.records.len(), 1);
    assert_eq!(report.records[0].frame_index, 3);
    assert_eq!(report.records[0].timestamp, "2024-03-15-08:30:01");
    assert_eq!(report.read_failures, 3);
    assert_eq!(source.reads, 7);
}

#[test]
fn test_detection_error_records_failure_sentinel() {
    let mut source = ScriptedSource::frames(30.0, 6);
    let analyzer = FailingAnalyzer::default();
    let sink = MemorySink::new();

    let report = run(&mut source, &analyzer, &DriverConfig::default(), &sink);

    assert_eq!(analyzer.calls.get(), 2);
    assert!(report.records.iter().all(|r| r.number == -1.0));
    assert_eq!(report.records.len(), 2);
    assert_eq!(sink.count(Level::Error), 2);
    assert!(sink.contains("detection failed"));
}

#[test]
fn test_no_glyphs_records_failure_sentinel() {
    let mut source = ScriptedSource::frames(30.0, 3);
    let analyzer = ScriptedAnalyzer::new(|_| Vec::new());
    let sink = MemorySink::new();

    let report = run(&mut source, &analyzer, &DriverConfig::default(), &sink);

    assert_eq!(report.records.len(), 1);
    assert_eq!(report.records[0].number, -1.0);
    assert!(sink.contains("no glyphs detected"));
}

#[test]
fn test_reading_at_rest_is_clamped_to_zero() {
    let mut source = ScriptedSource::frames(30.0, 3);
    let analyzer = ScriptedAnalyzer::new(|_| vec![1, 0]);
    let sink = MemorySink::new();

    let report = run(&mut source, &analyzer, &DriverConfig::default(), &sink);

    assert_eq!(report.records[0].number, 0.0);
}

#[test]
fn test_empty_video() {
    let mut source = ScriptedSource::frames(30.0, 0);
    let analyzer = ScriptedAnalyzer::new(|_| vec![1, 2]);
    let sink = MemorySink::new();

    let report = run(&mut source, &analyzer, &DriverConfig::default(), &sink);

    assert!(report.records.is_empty());
    assert!(report.measurements.is_empty());
    assert_eq!(source.reads, 1);
    assert!(sink.contains("Video processing completed"));
}

#[test]
fn test_weighing_is_found_end_to_end() {
    // Samples 36..=75 show 12.5, everything else shows an empty scale
    let mut source = ScriptedSource::frames(30.0, 330);
    let analyzer = ScriptedAnalyzer::new(|frame| {
        let sample = frame / 3;
        if (36..=75).contains(&sample) { vec![1, 2, 5] } else { vec![0] }
    });
    let sink = MemorySink::new();

    let report = run(&mut source, &analyzer, &DriverConfig::default(), &sink);

    assert_eq!(report.records.len(), 110);
    assert_eq!(report.measurements.len(), 1);
    let event = &report.measurements[0];
    assert_eq!(event.sequence_index, 1);
    assert_eq!(event.value, 12.5);
    assert_eq!(event.timestamp, report.records[74].timestamp);
    assert_eq!(event.timestamp, "2024-03-15-08:30:07");
}
