//! Property-based tests for the scanner state.
//!
//! Verifies, over randomly generated reachable states:
//! 1. Round trip: deserialize(serialize(state)) == state
//! 2. Depth law: depth after any push/pop sequence equals the net pushes
//! 3. Idempotence: a no-match scan never mutates either stack

#![allow(clippy::unwrap_used, clippy::expect_used, reason = "Tests can panic")]
#![allow(
    clippy::disallowed_types,
    clippy::uninlined_format_args,
    reason = "Proptest macros generate code with these patterns"
)]

use proptest::prelude::*;
use raku_scanner::{
    InterpFlags, ScannerError, ScannerState, StackKind, StrLexer, ValidTokens,
};

// -- Strategies --

/// Opening delimiters, weighted towards registered brackets.
fn delimiter_strategy() -> impl Strategy<Value = char> {
    prop_oneof![
        3 => prop::sample::select(vec!['(', '[', '{', '<', '«', '「', '‘', '/', '!', '|']),
        1 => any::<char>(),
    ]
}

fn flags_strategy() -> impl Strategy<Value = InterpFlags> {
    (0u32..32).prop_map(InterpFlags::from_bits_truncate)
}

fn heredoc_strategy() -> impl Strategy<Value = (String, InterpFlags)> {
    (any::<String>(), flags_strategy())
}

fn state_strategy() -> impl Strategy<Value = ScannerState> {
    (
        prop::collection::vec(delimiter_strategy(), 0..24),
        prop::collection::vec(heredoc_strategy(), 0..6),
    )
        .prop_map(|(braces, heredocs)| {
            let mut state = ScannerState::new();
            for c in braces {
                state.braces_mut().push(c).unwrap();
            }
            for (sentinel, flags) in heredocs {
                state.declare_heredoc(&sentinel, flags).unwrap();
            }
            state
        })
}

#[derive(Clone, Debug)]
enum StackOp {
    PushBrace(char),
    PopBrace,
    PushHeredoc(String),
    PopHeredoc,
    PopOldestHeredoc,
}

fn op_strategy() -> impl Strategy<Value = StackOp> {
    prop_oneof![
        delimiter_strategy().prop_map(StackOp::PushBrace),
        Just(StackOp::PopBrace),
        "[A-Z]{1,6}".prop_map(StackOp::PushHeredoc),
        Just(StackOp::PopHeredoc),
        Just(StackOp::PopOldestHeredoc),
    ]
}

fn check_heredoc_pop(
    result: Result<(), ScannerError>,
    pending: &mut usize,
) -> Result<(), TestCaseError> {
    match result {
        Ok(()) => *pending -= 1,
        Err(err) => {
            prop_assert_eq!(*pending, 0);
            prop_assert_eq!(err, ScannerError::StackUnderflow(StackKind::Heredoc));
        }
    }
    Ok(())
}

// -- Properties --

proptest! {
    #[test]
    fn serialize_round_trips(state in state_strategy()) {
        let mut buf = vec![0u8; 64 * 1024];
        let len = state.serialize(&mut buf).unwrap();
        let restored = ScannerState::deserialize(&buf[..len]).unwrap();
        prop_assert_eq!(restored, state);
    }

    #[test]
    fn overflow_never_writes(state in state_strategy(), capacity in 0usize..64) {
        let mut buf = vec![0xEEu8; capacity];
        match state.serialize(&mut buf) {
            Ok(len) => prop_assert!(len <= capacity),
            Err(ScannerError::SerializationOverflow { needed, capacity: reported }) => {
                prop_assert!(needed > capacity);
                prop_assert_eq!(reported, capacity);
                prop_assert!(buf.iter().all(|&b| b == 0xEE));
            }
            Err(other) => prop_assert!(false, "unexpected error {}", other),
        }
    }

    #[test]
    fn arbitrary_bytes_never_panic(bytes in prop::collection::vec(any::<u8>(), 1..256)) {
        if let Ok(state) = ScannerState::deserialize(&bytes) {
            let mut buf = vec![0u8; 64 * 1024];
            let len = state.serialize(&mut buf).unwrap();
            prop_assert_eq!(&buf[..len], &bytes[..]);
        }
    }

    #[test]
    fn depth_equals_net_pushes(ops in prop::collection::vec(op_strategy(), 0..64)) {
        let mut state = ScannerState::new();
        let mut braces = 0usize;
        let mut heredocs = 0usize;
        for op in ops {
            match op {
                StackOp::PushBrace(c) => {
                    state.braces_mut().push(c).unwrap();
                    braces += 1;
                }
                StackOp::PopBrace => match state.braces_mut().pop() {
                    Ok(_) => braces -= 1,
                    Err(err) => {
                        prop_assert_eq!(braces, 0);
                        prop_assert_eq!(err, ScannerError::StackUnderflow(StackKind::Brace));
                    }
                },
                StackOp::PushHeredoc(sentinel) => {
                    state.declare_heredoc(&sentinel, InterpFlags::empty()).unwrap();
                    heredocs += 1;
                }
                StackOp::PopHeredoc => {
                    check_heredoc_pop(state.heredocs_mut().pop().map(|_| ()), &mut heredocs)?;
                }
                StackOp::PopOldestHeredoc => {
                    check_heredoc_pop(state.heredocs_mut().pop_oldest().map(|_| ()), &mut heredocs)?;
                }
            }
            prop_assert_eq!(state.braces().depth(), braces);
            prop_assert_eq!(state.heredocs().pending_count(), heredocs);
        }
    }

    #[test]
    fn no_match_scan_leaves_stacks_untouched(
        state in state_strategy(),
        source in "[a-z0-9 _]{0,12}",
        valid in (0u8..16).prop_map(ValidTokens::from_bits_truncate),
    ) {
        let mut scanned = state.clone();
        let mut lexer = StrLexer::new(&source);
        let token = scanned.scan(&mut lexer, valid).unwrap();
        if token.is_none() {
            prop_assert_eq!(scanned, state);
        }
    }
}
