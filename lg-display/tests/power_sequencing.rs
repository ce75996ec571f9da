//! Power lifecycle and deferred input switching


use std::time::Duration;

use lg_display::feedback::{CoolingDown, PowerOn, WarmingUp};
use lg_display::{DisplayError, FeedbackTarget, PowerState, Property};
use mock_transport::{display_from_json, serial_display, settle, MockTransport, MockWake};
use tokio::time::sleep;

#[tokio::test(start_paused = true)]
async fn test_power_report_starts_warm_up() {
    let transport = MockTransport::serial();
    let display = display_from_json(
        r#"{ "id": "01", "warmingTimeMs": 3000 }"#,
        transport,
        MockWake::new(),
    );

    display.process_response("a 1 OK01x");

    let state = display.state();
    assert!(state.power_on);
    assert!(state.warming_up);
    assert_eq!(display.power_state(), PowerState::WarmingUp);

    sleep(Duration::from_millis(2999)).await;
    assert_eq!(display.power_state(), PowerState::WarmingUp);

    sleep(Duration::from_millis(2)).await;
    assert_eq!(display.power_state(), PowerState::On);
    assert_eq!(
        display.feedback().get::<WarmingUp>(&FeedbackTarget::Device),
        Some(WarmingUp(false))
    );
}

#[tokio::test(start_paused = true)]
async fn test_repeated_power_report_is_idempotent() {
    let (display, _transport) = serial_display();
    let feedback = display.feedback();
    for key in [PowerOn::KEY, WarmingUp::KEY, CoolingDown::KEY] {
        feedback.subscribe(FeedbackTarget::Device, key);
    }
    let events = feedback.iter();

    display.process_response("a 01 OK01");
    assert_eq!(events.try_iter().count(), 2);

    sleep(Duration::from_secs(5)).await;
    display.process_response("a 01 OK01");
    assert_eq!(events.try_iter().count(), 0);

    // Warm-up was not restarted by the second report
    sleep(Duration::from_millis(5001)).await;
    assert_eq!(display.power_state(), PowerState::On);
    let keys: Vec<_> = events.try_iter().map(|e| e.property_key).collect();
    assert_eq!(keys, vec![WarmingUp::KEY]);
}

#[tokio::test(start_paused = true)]
async fn test_power_off_report_cools_down() {
    let transport = MockTransport::serial();
    let display = display_from_json(r#"{ "coolingTimeMs": 4000 }"#, transport, MockWake::new());

    display.process_response("a 01 OK01");
    sleep(Duration::from_secs(11)).await;
    assert_eq!(display.power_state(), PowerState::On);

    display.process_response("a 01 OK00");
    assert_eq!(display.power_state(), PowerState::CoolingDown);
    assert!(!display.state().warming_up);

    sleep(Duration::from_millis(4001)).await;
    assert_eq!(display.power_state(), PowerState::Off);
}

#[tokio::test(start_paused = true)]
async fn test_power_off_during_warm_up() {
    let (display, _transport) = serial_display();

    display.process_response("a 01 OK01");
    sleep(Duration::from_secs(2)).await;
    display.process_response("a 01 OK00");

    let state = display.state();
    assert!(!state.warming_up);
    assert!(state.cooling_down);

    // The cancelled warm-up timer never fires
    sleep(Duration::from_secs(20)).await;
    assert_eq!(display.power_state(), PowerState::Off);
    assert!(!display.state().warming_up);
}

#[tokio::test(start_paused = true)]
async fn test_switch_while_off_runs_once_after_warm_up() {
    let (display, transport) = serial_display();

    display.select_input(2).await.unwrap();
    assert_eq!(transport.sent(), vec!["ka 01 01"]);
    assert_eq!(display.power_state(), PowerState::WarmingUp);
    assert!(display.pending_switch().is_some());

    // A second request while warming up replaces the first
    display.select_input(3).await.unwrap();
    assert_eq!(transport.sent(), vec!["ka 01 01"]);

    sleep(Duration::from_millis(10_001)).await;
    assert_eq!(transport.sent(), vec!["ka 01 01", "xb 01 92"]);
    assert!(display.pending_switch().is_none());

    sleep(Duration::from_secs(30)).await;
    assert_eq!(transport.sent().len(), 2);
}

#[tokio::test(start_paused = true)]
async fn test_switch_while_on_sends_immediately() {
    let (display, transport) = serial_display();
    display.process_response("a 01 OK01");
    sleep(Duration::from_secs(11)).await;

    display.select_input_key("displayPortIn").await.unwrap();
    assert_eq!(transport.sent(), vec!["xb 01 C0"]);
}

#[tokio::test(start_paused = true)]
async fn test_power_off_discards_deferred_switch() {
    let (display, transport) = serial_display();

    display.select_input(1).await.unwrap();
    display.process_response("a 01 OK00");
    assert!(display.pending_switch().is_none());

    sleep(Duration::from_secs(30)).await;
    assert_eq!(transport.sent(), vec!["ka 01 01"]);
}

#[tokio::test(start_paused = true)]
async fn test_power_on_cancels_cool_down() {
    let (display, transport) = serial_display();
    display.process_response("a 01 OK01");
    sleep(Duration::from_secs(11)).await;
    display.process_response("a 01 OK00");
    assert_eq!(display.power_state(), PowerState::CoolingDown);

    display.select_input(4).await.unwrap();
    let state = display.state();
    assert!(state.warming_up);
    assert!(!state.cooling_down);
    assert_eq!(transport.sent(), vec!["ka 01 01"]);

    sleep(Duration::from_millis(10_001)).await;
    assert_eq!(transport.sent(), vec!["ka 01 01", "xb 01 C0"]);
}

#[tokio::test(start_paused = true)]
async fn test_power_off_waits_for_acknowledgement() {
    let (display, transport) = serial_display();
    display.process_response("a 01 OK01");

    display.power_off().await.unwrap();
    assert_eq!(transport.sent(), vec!["ka 01 00"]);
    assert!(display.state().power_on);
}

#[tokio::test(start_paused = true)]
async fn test_small_display_dialect() {
    let transport = MockTransport::serial();
    let display = display_from_json(r#"{ "smallDisplay": true }"#, transport.clone(), MockWake::new());

    display.power_on().await.unwrap();
    display.mute_on().await.unwrap();
    display.video_mute_on().await.unwrap();
    assert_eq!(transport.sent(), vec!["ka 01 1", "ke 01 0", "kd 01 1"]);
}

#[tokio::test(start_paused = true)]
async fn test_network_power_on_sends_magic_packet() {
    let transport = MockTransport::network();
    let wake = MockWake::new();
    let display = display_from_json(
        r#"{ "macAddress": "AA:BB:CC:DD:EE:FF" }"#,
        transport.clone(),
        wake.clone(),
    );

    display.power_on().await.unwrap();

    assert!(transport.sent().is_empty());
    let packets = wake.packets();
    assert_eq!(packets.len(), 1);
    assert_eq!(packets[0].len(), 102);
    assert_eq!(&packets[0][..6], &[0xFF; 6]);
    assert!(packets[0][6..]
        .chunks(6)
        .all(|chunk| chunk == [0xAA, 0xBB, 0xCC, 0xDD, 0xEE, 0xFF]));
    assert_eq!(display.power_state(), PowerState::WarmingUp);
}

#[tokio::test(start_paused = true)]
async fn test_network_power_on_with_override() {
    let transport = MockTransport::network();
    let wake = MockWake::new();
    let display = display_from_json(
        r#"{ "macAddress": "AA:BB:CC:DD:EE:FF", "overrideWol": true }"#,
        transport.clone(),
        wake.clone(),
    );

    display.power_on().await.unwrap();
    assert_eq!(transport.sent(), vec!["ka 01 01"]);
    assert!(wake.packets().is_empty());
}

#[tokio::test(start_paused = true)]
async fn test_network_power_on_without_mac() {
    let transport = MockTransport::network();
    let display = display_from_json("{}", transport, MockWake::new());

    assert!(matches!(display.power_on().await, Err(DisplayError::Wake(_))));
    assert_eq!(display.power_state(), PowerState::Off);
}

#[tokio::test(start_paused = true)]
async fn test_failed_wake_withdraws_switch() {
    let transport = MockTransport::network();
    let display = display_from_json("{}", transport.clone(), MockWake::new());

    assert!(matches!(display.select_input(2).await, Err(DisplayError::Wake(_))));
    assert!(display.pending_switch().is_none());

    display.process_response("a 01 OK01x");
    sleep(Duration::from_millis(10_001)).await;
    assert!(transport.sent().is_empty());
}

#[tokio::test(start_paused = true)]
async fn test_failed_power_on_send_withdraws_switch() {
    let (display, transport) = serial_display();
    transport.fail_sends(true);

    assert!(matches!(
        display.select_input(2).await,
        Err(DisplayError::Transport(_))
    ));
    assert!(display.pending_switch().is_none());
    assert_eq!(display.power_state(), PowerState::Off);

    transport.fail_sends(false);
    display.process_response("a 01 OK01x");
    sleep(Duration::from_millis(10_001)).await;
    assert!(transport.sent().is_empty());
}

#[tokio::test(start_paused = true)]
async fn test_power_toggle() {
    let (display, transport) = serial_display();

    display.power_toggle().await.unwrap();
    settle().await;
    display.power_toggle().await.unwrap();
    assert_eq!(transport.sent(), vec!["ka 01 01", "ka 01 00"]);
}
