//! Property-based tests for the protocol codec

use lg_protocol::{
    Command, CommandKind, DeviceAddress, Dialect, MacAddress, MagicPacket, Response,
    ResponseFramer,
};
use proptest::prelude::*;

fn dialect_strategy() -> impl Strategy<Value = Dialect> {
    prop_oneof![Just(Dialect::Standard), Just(Dialect::SmallDisplay)]
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(200))]

    /// Leading zeros never affect address equality
    #[test]
    fn prop_address_normalization(a in 0u16..1000, b in 0u16..1000, pad_a in 0usize..3, pad_b in 0usize..3) {
        let token_a = format!("{}{}", "0".repeat(pad_a), a);
        let token_b = format!("{}{}", "0".repeat(pad_b), b);

        let address = DeviceAddress::parse(&token_a).unwrap();
        prop_assert_eq!(address.matches_token(&token_b), a == b);
    }

    /// Every encoded command is one CR-terminated line of three tokens
    #[test]
    fn prop_encoded_frame_shape(id in 0u16..100, percent in 0u8..=255, dialect in dialect_strategy()) {
        let address = DeviceAddress::new(id);
        for command in [
            Command::volume(address, percent),
            Command::power(address, percent % 2 == 0),
            Command::poll(CommandKind::Mute, address),
        ] {
            let frame = command.encode(dialect);
            prop_assert!(frame.ends_with('\r'));
            prop_assert_eq!(frame.matches('\r').count(), 1);
            prop_assert_eq!(frame.trim_end().split(' ').count(), 3);
        }
    }

    /// An echoed acknowledgement decodes back to the command's letter and ID
    #[test]
    fn prop_ack_decodes_to_command(id in 1u16..100, value in 0u8..=100) {
        let address = DeviceAddress::new(id);
        let command = Command::volume(address, value);
        let ack = format!("{} {} OK{:02x}x", command.kind.letter(), id, value);

        let response = Response::decode(&ack).unwrap();
        prop_assert_eq!(response.kind(), Some(CommandKind::Volume));
        prop_assert!(response.is_from(address));
        prop_assert_eq!(lg_protocol::parse_hex(&response.value).unwrap(), value as u16);
    }

    /// Framing is independent of how the text is chunked
    #[test]
    fn prop_framing_chunk_independent(split in 0usize..40) {
        let stream = "a 01 OK01x\r\nb 01 OK90x\r\nf 01 OK32x\r\n";
        let split = split.min(stream.len());

        let mut framer = ResponseFramer::new();
        let mut frames = framer.push(&stream[..split]);
        frames.extend(framer.push(&stream[split..]));

        prop_assert_eq!(frames, vec!["a 01 OK01", "b 01 OK90", "f 01 OK32"]);
    }

    /// Magic packets always repeat the address sixteen times
    #[test]
    fn prop_magic_packet(octets in any::<[u8; 6]>()) {
        let packet = MagicPacket::for_address(&MacAddress::new(octets));
        let bytes = packet.as_bytes();
        prop_assert_eq!(bytes.len(), 102);
        prop_assert!(bytes[..6].iter().all(|b| *b == 0xFF));
        prop_assert!(bytes[6..].chunks(6).all(|c| c == octets));
    }
}

#[test]
fn test_ng_anywhere_rejects_frame() {
    for raw in ["a 01 NG00x", "NG a 01 01", "f 01 OKng"] {
        assert!(Response::decode(raw).is_err(), "{raw} should be rejected");
    }
}
