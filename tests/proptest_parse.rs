use chrono::{DateTime, Utc};
use proptest::prelude::*;

use dhcpd_leases::{Blocks, parse, timestamp};

fn block(ip: [u8; 4], statements: &[String]) -> String {
    let mut text = format!("lease {}.{}.{}.{} {{\n", ip[0], ip[1], ip[2], ip[3]);
    for statement in statements {
        text.push_str("  ");
        text.push_str(statement);
        text.push('\n');
    }
    text.push_str("}\n");
    text
}

fn state_token() -> impl Strategy<Value = String> {
    "[a-z][a-z-]{0,20}"
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(2000))]

    #[test]
    fn parse_never_panics_on_arbitrary_bytes(data: Vec<u8>) {
        let _ = parse(&data[..]);
    }

    #[test]
    fn parse_never_panics_on_block_shaped_text(
        body in "[ -~\n\t]{0,400}"
    ) {
        let input = format!("lease 10.0.0.1 {{\n{}\n}}\nhost x {{ {} }}", body, body);
        let leases = parse(input.as_bytes()).unwrap();
        prop_assert!(leases.len() <= input.matches("lease ").count() + input.matches("host ").count());
    }

    #[test]
    fn timestamp_format_then_decode_is_identity(seconds in -62_135_596_800i64..253_402_300_799i64) {
        let time = DateTime::<Utc>::from_timestamp(seconds, 0).unwrap();
        prop_assert_eq!(timestamp::decode(&timestamp::format(&time)), Some(time));
    }

    #[test]
    fn binding_states_never_cross_contaminate(
        current in state_token(),
        next in state_token(),
        rewind in state_token(),
        order in 0usize..6,
    ) {
        let mut statements = vec![
            format!("binding state {};", current),
            format!("next binding state {};", next),
            format!("rewind binding state {};", rewind),
        ];
        statements.rotate_left(order % 3);
        if order >= 3 {
            statements.reverse();
        }

        let leases = parse(block([10, 0, 0, 1], &statements).as_bytes()).unwrap();
        prop_assert_eq!(leases.len(), 1);
        prop_assert_eq!(leases[0].binding_state.as_deref(), Some(current.as_str()));
        prop_assert_eq!(leases[0].next_binding_state.as_deref(), Some(next.as_str()));
        prop_assert_eq!(leases[0].rewind_binding_state.as_deref(), Some(rewind.as_str()));
    }

    #[test]
    fn blocks_preserve_file_order(ips in prop::collection::vec(any::<[u8; 4]>(), 0..20)) {
        let input: String = ips.iter().map(|ip| block(*ip, &[])).collect();
        let leases = parse(input.as_bytes()).unwrap();
        prop_assert_eq!(leases.len(), ips.len());
        for (lease, ip) in leases.iter().zip(&ips) {
            prop_assert_eq!(lease.ip, Some(std::net::IpAddr::from(*ip)));
        }
    }

    #[test]
    fn truncated_tail_is_dropped(
        count in 0usize..5,
        tail in "[ -|~\n]{0,80}",
    ) {
        let mut input: String = (0..count).map(|index| block([10, 0, 0, index as u8], &[])).collect();
        input.push_str("lease 10.9.9.9 {\n");
        input.push_str(&tail);

        let blocks: Vec<_> = Blocks::new(input.as_bytes()).collect::<Result<_, _>>().unwrap();
        prop_assert_eq!(blocks.len(), count);
    }
}
