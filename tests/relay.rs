//! Producer-to-consumer relay over the real transports.

use std::time::Duration;

use glam::{Mat4, Vec3};
use rigfeed::{
    ConsumerConfig, ProducerConfig, ProducerDriver, ReplaySource, Rigfeed, TransformSample,
};

fn translated(z: f32) -> Mat4 {
    Mat4::from_translation(Vec3::new(0.0, 0.0, z))
}

#[tokio::test]
async fn udp_relay_delivers_faded_updates() {
    const PORT: u16 = 47563;

    let receiver = Rigfeed::receive(ConsumerConfig { udp_port: PORT, receive_udp: true })
        .await
        .expect("bind consumer");

    let mut publisher = Rigfeed::publisher(ProducerConfig {
        udp_ip: "127.0.0.1".to_string(),
        udp_port: PORT,
        send_udp: true,
        fill_mmf: false,
        ..ProducerConfig::default()
    });
    publisher.start_sending().expect("start publisher");

    // ~0.5 s of frames at 100 Hz.
    for frame in 0..50u32 {
        let consumed = publisher.process_transform(translated(frame as f32 * 0.01), 0.01);
        assert!(consumed);
        publisher.send_filtered_data().expect("publish");
        tokio::time::sleep(Duration::from_millis(10)).await;
    }

    assert!(receiver.is_connected());
    assert!(receiver.is_running());

    let update = receiver.current().expect("at least one update arrived");
    // Inside the 2 s start-up dead window every channel is forced to zero.
    assert_eq!(update.get("speed"), Some(0.0));
    assert_eq!(update.get("local_velocity_z"), Some(0.0));
    // By-name lookup and direct access see the same record.
    assert_eq!(update.raw_record().speed(), 0.0);
    assert!(receiver.schema().has_channel("suspension_position_fr"));

    receiver.stop();
}

#[tokio::test]
async fn shared_memory_cold_connect_retries_until_producer_appears() {
    // A mapping left behind by an aborted run would spoil the cold start.
    let _ = std::fs::remove_file(std::env::temp_dir().join(rigfeed::MAPPING_NAME));

    // Consumer first: the mapping does not exist yet.
    let mut receiver = Rigfeed::receive(ConsumerConfig::default()).await.expect("connect");
    tokio::time::sleep(Duration::from_millis(200)).await;
    assert!(!receiver.is_connected());
    assert!(receiver.current().is_none());

    // Producer shows up and starts publishing.
    let mut publisher = Rigfeed::publisher(ProducerConfig {
        send_udp: false,
        fill_mmf: true,
        ..ProducerConfig::default()
    });
    publisher.start_sending().expect("start publisher");

    for frame in 0..180u32 {
        publisher.process_transform(translated(frame as f32 * 0.01), 0.01);
        publisher.send_filtered_data().expect("publish");
        tokio::time::sleep(Duration::from_millis(10)).await;
    }

    // The 1 s open retry has fired by now.
    assert!(receiver.is_connected());
    let update = receiver.current().expect("updates flowing");
    // Still inside the consumer's start-up dead window: strictly zero.
    assert_eq!(update.get("speed"), Some(0.0));

    receiver.shutdown().await;
}

#[tokio::test]
async fn subscription_stream_yields_updates() {
    use futures::StreamExt;

    const PORT: u16 = 47571;

    let receiver = Rigfeed::receive(ConsumerConfig { udp_port: PORT, receive_udp: true })
        .await
        .expect("bind consumer");
    let mut updates = receiver.subscribe();

    let mut publisher = Rigfeed::publisher(ProducerConfig {
        udp_ip: "127.0.0.1".to_string(),
        udp_port: PORT,
        send_udp: true,
        fill_mmf: false,
        ..ProducerConfig::default()
    });
    publisher.start_sending().expect("start publisher");

    let feed = tokio::spawn(async move {
        for frame in 0..40u32 {
            publisher.process_transform(translated(frame as f32 * 0.01), 0.01);
            publisher.send_filtered_data().expect("publish");
            tokio::time::sleep(Duration::from_millis(10)).await;
        }
    });

    let update = tokio::time::timeout(Duration::from_secs(2), updates.next())
        .await
        .expect("update within two seconds")
        .expect("stream alive");
    assert!(update.get("paused").is_some());

    feed.await.expect("feed task");
}

#[tokio::test]
async fn producer_driver_replays_a_source_end_to_end() {
    const PORT: u16 = 47577;

    let receiver = Rigfeed::receive(ConsumerConfig { udp_port: PORT, receive_udp: true })
        .await
        .expect("bind consumer");

    let samples: Vec<TransformSample> = (0..40)
        .map(|frame| TransformSample { transform: translated(frame as f32 * 0.01), dt: 0.01 })
        .collect();
    let source = ReplaySource::new(samples, 100.0);

    let publisher = Rigfeed::publisher(ProducerConfig {
        udp_ip: "127.0.0.1".to_string(),
        udp_port: PORT,
        send_udp: true,
        fill_mmf: false,
        ..ProducerConfig::default()
    });

    let handle = ProducerDriver::spawn(source, publisher);

    // Give the replay time to run out (40 frames at 100 Hz).
    tokio::time::sleep(Duration::from_millis(800)).await;
    assert!(receiver.is_connected());
    assert!(receiver.current().is_some(), "driver-published updates should arrive");

    handle.stop();
    assert!(handle.cancellation_token().is_cancelled());
}
