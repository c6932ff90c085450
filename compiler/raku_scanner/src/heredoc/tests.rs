use super::*;
use pretty_assertions::assert_eq;

fn sentinel_of(frame: &HeredocFrame) -> String {
    frame.sentinel().iter().collect()
}

// === Flags ===

#[test]
fn flag_bits_are_stable() {
    assert_eq!(InterpFlags::CLOSURE.bits(), 0b00001);
    assert_eq!(InterpFlags::SCALAR.bits(), 0b00010);
    assert_eq!(InterpFlags::ARRAY.bits(), 0b00100);
    assert_eq!(InterpFlags::HASH.bits(), 0b01000);
    assert_eq!(InterpFlags::FUNCTION.bits(), 0b10000);
    assert_eq!(InterpFlags::QQ.bits(), 0b11111);
}

#[test]
fn adverbs_q_and_to_do_not_interpolate() {
    assert_eq!(InterpFlags::from_adverbs("q:to"), InterpFlags::empty());
    assert_eq!(InterpFlags::from_adverbs(":heredoc"), InterpFlags::empty());
    assert!(!InterpFlags::from_adverbs("Q:to").interpolates());
}

#[test]
fn adverb_qq_interpolates_everything() {
    assert_eq!(InterpFlags::from_adverbs("qq:to"), InterpFlags::QQ);
}

#[test]
fn single_adverbs_combine() {
    assert_eq!(
        InterpFlags::from_adverbs(":s:a:to"),
        InterpFlags::SCALAR | InterpFlags::ARRAY
    );
    assert_eq!(
        InterpFlags::from_adverbs("q:hash:function:closure:to"),
        InterpFlags::HASH | InterpFlags::FUNCTION | InterpFlags::CLOSURE
    );
}

#[test]
fn sigils_map_to_flags() {
    assert_eq!(InterpFlags::for_sigil('$'), Some(InterpFlags::SCALAR));
    assert_eq!(InterpFlags::for_sigil('@'), Some(InterpFlags::ARRAY));
    assert_eq!(InterpFlags::for_sigil('%'), Some(InterpFlags::HASH));
    assert_eq!(InterpFlags::for_sigil('&'), Some(InterpFlags::FUNCTION));
    assert_eq!(InterpFlags::for_sigil('{'), None);
}

// === Stack ===

#[test]
fn push_copies_sentinel_and_flags() {
    let mut stack = HeredocStack::new();
    let source = String::from("END");
    assert!(stack.push(&source, InterpFlags::SCALAR).is_ok());
    drop(source);

    assert_eq!(stack.pending_count(), 1);
    let top = stack.top().map(|f| (sentinel_of(f), f.flags()));
    assert_eq!(top, Some(("END".to_string(), InterpFlags::SCALAR)));
}

#[test]
fn oldest_is_first_declared() {
    let mut stack = HeredocStack::new();
    assert!(stack.push("END1", InterpFlags::empty()).is_ok());
    assert!(stack.push("END2", InterpFlags::QQ).is_ok());

    assert_eq!(stack.oldest().map(sentinel_of).as_deref(), Some("END1"));
    assert_eq!(stack.top().map(sentinel_of).as_deref(), Some("END2"));
}

#[test]
fn pop_oldest_consumes_in_declaration_order() {
    let mut stack = HeredocStack::new();
    for s in ["A", "B", "C"] {
        assert!(stack.push(s, InterpFlags::empty()).is_ok());
    }
    let order: Vec<String> = std::iter::from_fn(|| stack.pop_oldest().ok())
        .map(|f| sentinel_of(&f))
        .collect();
    assert_eq!(order, vec!["A", "B", "C"]);
    assert_eq!(stack.pending_count(), 0);
}

#[test]
fn pop_removes_newest() {
    let mut stack = HeredocStack::new();
    assert!(stack.push("OUTER", InterpFlags::empty()).is_ok());
    assert!(stack.push("INNER", InterpFlags::empty()).is_ok());
    assert_eq!(stack.pop().map(|f| sentinel_of(&f)), Ok("INNER".to_string()));
    assert_eq!(stack.pending_count(), 1);
}

#[test]
fn pops_at_root_underflow() {
    let mut stack = HeredocStack::new();
    assert_eq!(
        stack.pop(),
        Err(ScannerError::StackUnderflow(StackKind::Heredoc))
    );
    assert_eq!(
        stack.pop_oldest(),
        Err(ScannerError::StackUnderflow(StackKind::Heredoc))
    );
}

#[test]
fn frames_report_contiguous_depths() {
    let mut stack = HeredocStack::new();
    assert!(stack.push("X", InterpFlags::empty()).is_ok());
    assert!(stack.push("Y", InterpFlags::empty()).is_ok());
    assert!(stack.pop_oldest().is_ok());
    assert!(stack.push("Z", InterpFlags::empty()).is_ok());

    let depths: Vec<(usize, String)> = stack
        .frames()
        .map(|(depth, frame)| (depth, sentinel_of(frame)))
        .collect();
    assert_eq!(depths, vec![(1, "Y".to_string()), (2, "Z".to_string())]);
}

#[test]
fn unicode_sentinel_is_stored_per_codepoint() {
    let mut stack = HeredocStack::new();
    assert!(stack.push("終わり", InterpFlags::empty()).is_ok());
    assert_eq!(stack.top().map(|f| f.sentinel().len()), Some(3));
}

#[test]
fn clear_returns_to_root() {
    let mut stack = HeredocStack::new();
    assert!(stack.push("END", InterpFlags::empty()).is_ok());
    stack.clear();
    assert_eq!(stack, HeredocStack::new());
}

// === Nesting levels ===

fn levels(stack: &HeredocStack) -> Vec<(String, u32)> {
    stack
        .frames()
        .map(|(_, frame)| (sentinel_of(frame), frame.level()))
        .collect()
}

fn body_sentinel(stack: &HeredocStack, at_line_start: bool) -> Option<String> {
    stack
        .body_frame(at_line_start)
        .map(|(_, frame)| sentinel_of(frame))
}

#[test]
fn same_line_declarations_share_a_level() {
    let mut stack = HeredocStack::new();
    assert!(stack.push("A", InterpFlags::QQ).is_ok());
    assert!(stack.push("B", InterpFlags::empty()).is_ok());
    assert_eq!(levels(&stack), vec![("A".to_string(), 0), ("B".to_string(), 0)]);
    assert_eq!(body_sentinel(&stack, true).as_deref(), Some("A"));
}

#[test]
fn declaration_inside_a_body_nests_one_level() {
    let mut stack = HeredocStack::new();
    assert!(stack.push("A", InterpFlags::QQ).is_ok());
    stack.mark_body_started(0);
    assert!(stack.push("B", InterpFlags::empty()).is_ok());
    assert!(stack.push("C", InterpFlags::empty()).is_ok());
    assert_eq!(
        levels(&stack),
        vec![("A".to_string(), 0), ("B".to_string(), 1), ("C".to_string(), 1)]
    );

    // The rest of A's line is still A's; the nested group starts next line.
    assert_eq!(body_sentinel(&stack, false).as_deref(), Some("A"));
    assert_eq!(body_sentinel(&stack, true).as_deref(), Some("B"));

    // Once B is under way it owns its lines until it terminates.
    stack.mark_body_started(1);
    assert_eq!(body_sentinel(&stack, true).as_deref(), Some("B"));
    assert!(stack.terminate(1).is_ok());
    assert_eq!(body_sentinel(&stack, true).as_deref(), Some("C"));
    assert!(stack.terminate(1).is_ok());
    assert_eq!(body_sentinel(&stack, true).as_deref(), Some("A"));
}

#[test]
fn declaration_after_nested_group_drains_keeps_levels_ordered() {
    let mut stack = HeredocStack::new();
    assert!(stack.push("A", InterpFlags::QQ).is_ok());
    stack.mark_body_started(0);
    assert!(stack.push("B", InterpFlags::empty()).is_ok());
    assert!(stack.pop_oldest().is_ok());
    assert!(stack.push("C", InterpFlags::empty()).is_ok());
    assert_eq!(levels(&stack), vec![("B".to_string(), 1), ("C".to_string(), 1)]);
}

#[test]
fn terminate_out_of_range_underflows() {
    let mut stack = HeredocStack::new();
    assert_eq!(
        stack.terminate(0),
        Err(ScannerError::StackUnderflow(StackKind::Heredoc))
    );
}
