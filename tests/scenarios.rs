//! End-to-end coverage of the documented parse/query/iterate scenarios,
//! plus the boundary conditions around the arena's fixed capacities.

use skc::{parse, query, Error, PrefixIter, SharedConfig};

fn init_logging() {
    let _ = env_logger::try_init();
}

#[test]
fn dotted_keys_merge_across_statements() {
    init_logging();
    let mut text = "a.b.c = 1; a.b.d = 2;".to_string();
    let arena = parse(&mut text).unwrap();

    assert_eq!(query::find_value(&arena, None, "a.b.c").unwrap().0, "1");
    assert_eq!(query::find_value(&arena, None, "a.b.d").unwrap().0, "2");

    // Both live under the same "b" node rather than two separate ones.
    let b = query::find_child(&arena, None, "a.b").unwrap();
    let words: Vec<&str> = arena.children(Some(b)).map(|id| arena.data(id)).collect();
    assert_eq!(words, vec!["c", "d"]);
}

#[test]
fn brace_blocks_scope_their_contents() {
    init_logging();
    let mut text = "a { b = 1; c = 2; }".to_string();
    let arena = parse(&mut text).unwrap();

    assert_eq!(query::find_value(&arena, None, "a.b").unwrap().0, "1");
    assert_eq!(query::find_value(&arena, None, "a.c").unwrap().0, "2");
    assert!(query::find_value(&arena, None, "b").is_none());
}

#[test]
fn arrays_preserve_declaration_order() {
    init_logging();
    let mut text = "list = \"x\", \"y\", \"z\";".to_string();
    let arena = parse(&mut text).unwrap();

    let list = query::find_child(&arena, None, "list").unwrap();
    let first = arena.child(list).unwrap();
    let values: Vec<&str> = arena.siblings(first).map(|v| arena.data(v)).collect();
    assert_eq!(values, vec!["x", "y", "z"]);
}

#[test]
fn comments_terminate_at_newline_without_eating_the_next_statement() {
    init_logging();
    let mut text = "# top-level\nk = 1 # trailing\n; j=2;".to_string();
    let arena = parse(&mut text).unwrap();

    assert_eq!(query::find_value(&arena, None, "k").unwrap().0, "1");
    assert_eq!(query::find_value(&arena, None, "j").unwrap().0, "2");
}

#[test]
fn prefix_iteration_yields_only_the_matching_subtree() {
    init_logging();
    let mut text = "a.b.x=1;a.b.y=2;a.c=3;".to_string();
    let arena = parse(&mut text).unwrap();

    let mut it = PrefixIter::start(&arena, "a.b");
    let mut got = Vec::new();
    while let Some((v, _)) = it.next() {
        got.push(v.to_string());
    }
    assert_eq!(got, vec!["1", "2"]);
}

#[test]
fn prefix_iteration_over_the_whole_document_visits_every_value() {
    init_logging();
    let mut text = "a.b.x=1;a.b.y=2;a.c=3;".to_string();
    let arena = parse(&mut text).unwrap();

    let mut it = PrefixIter::start(&arena, "a");
    let mut got = Vec::new();
    while let Some((v, _)) = it.next() {
        got.push(v.to_string());
    }
    assert_eq!(got, vec!["1", "2", "3"]);
}

#[test]
fn zero_length_input_is_out_of_range() {
    init_logging();
    let mut text = String::new();
    assert!(matches!(parse(&mut text), Err(Error::OutOfRange)));
}

#[test]
fn input_just_under_the_data_cap_parses() {
    init_logging();
    // One key whose value pads the document out to just below DATA_MAX.
    let pad = skc::DATA_MAX - 1 - "k = \"\";".len();
    let mut text = format!("k = \"{}\";", "x".repeat(pad));
    assert!(text.len() <= skc::DATA_MAX - 1);
    let arena = parse(&mut text).unwrap();
    assert_eq!(query::find_value(&arena, None, "k").unwrap().0.len(), pad);
}

#[test]
fn exhausting_distinct_keys_runs_out_of_node_capacity() {
    init_logging();
    // The root occupies one of NODE_MAX slots, so only NODE_MAX - 1 distinct
    // top-level keys fit; the next one reports NoMem.
    let mut src = String::new();
    for i in 0..skc::NODE_MAX {
        src.push_str(&format!("k{i};"));
    }
    let mut text = src;
    assert!(matches!(parse(&mut text), Err(Error::NoMem)));
}

#[test]
fn invalid_key_character_is_reported_with_its_offset() {
    init_logging();
    let mut text = "a.b$c = 1;".to_string();
    match parse(&mut text) {
        Err(Error::InvalidKey { offset }) => assert_eq!(offset, 2),
        other => panic!("expected InvalidKey, got {other:?}"),
    }
}

#[test]
fn unterminated_quoted_value_is_rejected() {
    init_logging();
    let mut text = "a = \"unterminated".to_string();
    assert!(matches!(parse(&mut text), Err(Error::NoClosingQuote { .. })));
}

#[test]
fn stray_closing_brace_is_rejected() {
    init_logging();
    let mut text = "a = 1; }".to_string();
    assert!(matches!(parse(&mut text), Err(Error::UnexpectedBrace { .. })));
}

#[test]
fn an_open_brace_with_no_matching_close_is_rejected() {
    init_logging();
    let mut text = "a { b = 1;".to_string();
    assert!(matches!(parse(&mut text), Err(Error::NoClosingBrace)));
}

#[test]
fn shared_config_refuses_a_second_parse() {
    init_logging();
    static CONFIG: SharedConfig = SharedConfig::new();
    let first: &'static mut str = Box::leak("a = 1;".to_string().into_boxed_str());
    assert!(CONFIG.parse(first).is_ok());

    let second: &'static mut str = Box::leak("b = 2;".to_string().into_boxed_str());
    assert!(matches!(CONFIG.parse(second), Err(Error::Busy)));

    assert_eq!(query::find_value(CONFIG.get().unwrap(), None, "a").unwrap().0, "1");
}

#[test]
fn pack_append_find_and_delete_round_trip() {
    init_logging();
    let mut file = b"cpio-archive-bytes".to_vec();
    skc::pack::append(&mut file, b"k = \"v\";\0");

    let trailer = skc::pack::find_trailer(&file).expect("trailer should be found");
    let payload = &file[trailer.payload_start..trailer.payload_start + trailer.payload_len];
    let mut payload_text = std::str::from_utf8(payload).unwrap().trim_end_matches('\0').to_string();
    let arena = parse(&mut payload_text).unwrap();
    assert_eq!(query::find_value(&arena, None, "k").unwrap().0, "v");

    assert!(skc::pack::delete(&mut file));
    assert_eq!(file, b"cpio-archive-bytes");
}

#[test]
fn dump_tree_and_kv_list_agree_on_the_same_document() {
    init_logging();
    let mut text = "a { b = 1; c = 2; }".to_string();
    let arena = parse(&mut text).unwrap();

    let mut tree = String::new();
    skc::dump::write_tree(&arena, &mut tree).unwrap();
    assert_eq!(tree, "a {\n\tb = \"1\";\n\tc = \"2\";\n}\n");

    let mut kv = String::new();
    skc::dump::write_kv_list(&arena, &mut kv).unwrap();
    assert_eq!(kv, "a.b = \"1\";\na.c = \"2\";\n");
}

#[test]
fn empty_bare_value_between_delimiters_is_rejected() {
    init_logging();
    let mut text = "k = ;".to_string();
    assert!(matches!(parse(&mut text), Err(Error::NoDelimiter { .. })));
}
