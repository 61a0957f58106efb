use std::net::Ipv4Addr;

use artnode_core::protocols::artnet::{DmxPacket, layout};
use artnode_core::{AddressCommand, ArtAddress, Outcome, Session, build_data_frame, classify};
use proptest::prelude::*;

fn locked_session(holder: Ipv4Addr, levels: &[u8]) -> Session {
    let mut session = Session::new(Ipv4Addr::new(10, 0, 0, 1));
    let payload = DmxPacket {
        sequence: 1,
        universe: 0,
        levels,
    }
    .encode();
    let Outcome::DataFrame(dmx) = classify(&payload, holder, &session) else {
        panic!("fixture frame must classify");
    };
    assert!(session.accept(&dmx.frame, dmx.sender));
    session
}

proptest! {
    /// Anything not starting with the exact signature is rejected.
    #[test]
    fn prop_foreign_prefix_is_not_protocol(
        prefix in prop::array::uniform8(any::<u8>()),
        rest in prop::collection::vec(any::<u8>(), 0..600),
        universe in any::<u8>(),
    ) {
        prop_assume!(&prefix != layout::ARTNET_ID);
        let mut payload = prefix.to_vec();
        payload.extend_from_slice(&rest);
        let mut session = Session::new(Ipv4Addr::LOCALHOST);
        session.set_universe(universe);
        prop_assert_eq!(classify(&payload, Ipv4Addr::LOCALHOST, &session), Outcome::NotProtocol);
    }

    /// Arbitrary bytes after a valid signature never panic.
    #[test]
    fn prop_classify_total(rest in prop::collection::vec(any::<u8>(), 0..600)) {
        let mut payload = layout::ARTNET_ID.to_vec();
        payload.extend_from_slice(&rest);
        let session = Session::new(Ipv4Addr::LOCALHOST);
        let _ = classify(&payload, Ipv4Addr::LOCALHOST, &session);
    }

    /// Declaring more slots than were received is never partially accepted.
    #[test]
    fn prop_truncated_frames_rejected(
        levels in prop::collection::vec(any::<u8>(), 1..=512),
        cut in 1usize..=512,
    ) {
        let cut = cut.min(levels.len());
        let mut payload = DmxPacket { sequence: 9, universe: 0, levels: &levels }.encode();
        payload.truncate(payload.len() - cut);
        let session = Session::new(Ipv4Addr::LOCALHOST);
        prop_assert_eq!(classify(&payload, Ipv4Addr::LOCALHOST, &session), Outcome::NotProtocol);
    }

    /// A locked session ignores any number of frames from other senders.
    #[test]
    fn prop_merge_lock_holds(
        others in prop::collection::vec(
            (any::<[u8; 4]>(), prop::collection::vec(any::<u8>(), 1..64)),
            1..32,
        ),
    ) {
        let holder = Ipv4Addr::new(10, 0, 0, 5);
        let mut session = locked_session(holder, &[10, 20, 30]);
        let before = session.frame().clone();

        for (octets, levels) in others {
            let sender = Ipv4Addr::from(octets);
            if sender == holder {
                continue;
            }
            let payload = DmxPacket { sequence: 1, universe: 0, levels: &levels }.encode();
            if let Outcome::DataFrame(dmx) = classify(&payload, sender, &session) {
                prop_assert!(!session.accept(&dmx.frame, dmx.sender));
            }
        }
        prop_assert_eq!(session.frame(), &before);
        prop_assert_eq!(session.merge_lock(), Some(holder));
    }

    /// After cancel-merge the next sender, whoever it is, takes the lock.
    #[test]
    fn prop_cancel_merge_releases(octets in any::<[u8; 4]>(), level in any::<u8>()) {
        let mut session = locked_session(Ipv4Addr::new(10, 0, 0, 5), &[1]);
        session.apply_address_config(&ArtAddress {
            short_name: String::new(),
            long_name: String::new(),
            universe_select: layout::SELECT_NO_CHANGE,
            subnet_select: layout::SELECT_NO_CHANGE,
            command: AddressCommand::CancelMerge,
        });

        let next = Ipv4Addr::from(octets);
        let payload = DmxPacket { sequence: 1, universe: 0, levels: &[level] }.encode();
        let Outcome::DataFrame(dmx) = classify(&payload, next, &session) else {
            panic!("frame must classify");
        };
        prop_assert!(session.accept(&dmx.frame, dmx.sender));
        prop_assert_eq!(session.merge_lock(), Some(next));
        prop_assert_eq!(session.slot(1), Some(level));
    }

    /// Outbound length is always the header plus the active slots.
    #[test]
    fn prop_data_frame_length(count in 0u16..=512, calls in 1usize..300) {
        let mut session = Session::new(Ipv4Addr::LOCALHOST);
        session.set_slot_count(count).unwrap();
        for _ in 0..calls {
            let payload = build_data_frame(&mut session);
            prop_assert_eq!(payload.len(), 18 + usize::from(count));
            prop_assert_ne!(payload[layout::SEQUENCE_OFFSET], 0);
        }
    }
}
