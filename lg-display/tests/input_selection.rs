//! Input selection bounds and friendly-name directives


use std::time::Duration;

use lg_display::{DisplayError, PowerState};
use mock_transport::{display_from_json, serial_display, MockTransport, MockWake};
use rstest::rstest;
use tokio::time::sleep;

#[rstest]
#[case(0)]
#[case(5)]
#[case(usize::MAX)]
#[tokio::test(start_paused = true)]
async fn test_out_of_range_selection(#[case] number: usize) {
    let (display, transport) = serial_display();

    let result = display.select_input(number).await;

    assert!(matches!(
        result,
        Err(DisplayError::OutOfRangeSelection { requested, available: 4 }) if requested == number
    ));
    assert!(transport.sent().is_empty());
    assert_eq!(display.power_state(), PowerState::Off);
    assert!(display.pending_switch().is_none());
}

#[tokio::test(start_paused = true)]
async fn test_hidden_input_is_not_selectable() {
    let transport = MockTransport::serial();
    let display = display_from_json(
        r#"{ "friendlyNames": [ { "inputKey": "hdmiIn2", "name": "Spare", "hideInput": true } ] }"#,
        transport.clone(),
        MockWake::new(),
    );
    assert_eq!(display.inputs().len(), 3);

    assert!(matches!(
        display.select_input(4).await,
        Err(DisplayError::OutOfRangeSelection { requested: 4, available: 3 })
    ));
    assert!(matches!(
        display.select_input_key("hdmiIn2").await,
        Err(DisplayError::InputNotFound(_))
    ));
    assert!(matches!(
        display.select_input_key("91").await,
        Err(DisplayError::InputNotFound(_))
    ));
    assert!(transport.sent().is_empty());

    // Input 2 is now what used to be input 3
    display.process_response("a 01 OK01");
    sleep(Duration::from_secs(11)).await;
    display.select_input(2).await.unwrap();
    assert_eq!(transport.sent(), vec!["xb 01 92"]);
}

#[tokio::test(start_paused = true)]
async fn test_hidden_input_report_is_not_mapped() {
    let display = display_from_json(
        r#"{ "friendlyNames": [ { "inputKey": "91", "name": "Spare", "hideInput": true } ] }"#,
        MockTransport::serial(),
        MockWake::new(),
    );

    display.process_response("b 01 OK91");
    let state = display.state();
    assert_eq!(state.current_input, None);
    assert_eq!(state.current_item.as_deref(), Some("91"));
}

#[rstest]
#[case("hdmiIn1", "xb 01 90")]
#[case("HDMIIN3", "xb 01 92")]
#[case("c0", "xb 01 C0")]
#[tokio::test(start_paused = true)]
async fn test_select_by_key_or_code(#[case] key: &str, #[case] expected: &str) {
    let (display, transport) = serial_display();
    display.process_response("a 01 OK01");
    sleep(Duration::from_secs(11)).await;

    display.select_input_key(key).await.unwrap();
    assert_eq!(transport.sent(), vec![expected]);
}

#[tokio::test(start_paused = true)]
async fn test_unknown_key() {
    let (display, transport) = serial_display();
    assert!(matches!(
        display.select_input_key("vga").await,
        Err(DisplayError::InputNotFound(key)) if key == "vga"
    ));
    assert!(transport.sent().is_empty());
}
