use ion_kit::{
    Catalog, IonType, Reader, ReaderOptions, SymbolTable, Writer, WriterOptions,
};
use std::sync::Arc;

fn shared(name: &str, version: u32, symbols: &[&str]) -> Arc<SymbolTable> {
    let mut table = SymbolTable::new_shared(name, version);
    for s in symbols {
        table.add_symbol(s).unwrap();
    }
    table.lock();
    Arc::new(table)
}

fn options_with(catalog: Catalog) -> ReaderOptions {
    ReaderOptions {
        catalog: Some(Arc::new(catalog)),
        ..ReaderOptions::default()
    }
}

#[test]
fn shared_table_unload_load_round_trip() {
    let mut original = SymbolTable::new_shared("com.example.test", 3);
    for s in ["alpha", "beta", "gamma"] {
        original.add_symbol(s).unwrap();
    }
    original.lock();

    let mut w = Writer::new(WriterOptions::default());
    w.write_symbol_table(&original).unwrap();
    let text = w.finish().unwrap();

    let mut r = Reader::for_bytes(text, ReaderOptions::default()).unwrap();
    assert_eq!(r.next().unwrap(), Some(IonType::Struct));
    let loaded = r.load_symbol_table().unwrap();
    assert!(loaded.is_shared());
    assert_eq!(loaded.name(), Some("com.example.test"));
    assert_eq!(loaded.version(), 3);
    assert_eq!(loaded.max_sid(), original.max_sid());
    for sid in 1..=original.max_sid() {
        assert_eq!(loaded.find_by_sid(sid), original.find_by_sid(sid));
    }
}

#[test]
fn local_table_with_catalog_import() {
    let mut catalog = Catalog::new();
    catalog.add(shared("com.example.animals", 1, &["cat", "dog", "mouse"]));

    let text = br#"
        $ion_symbol_table::{
            imports: [{name: "com.example.animals", version: 1, max_id: 3}],
            symbols: ["local"]
        }
        $10 $12 $13 cat
    "#;
    let mut r = Reader::for_slice(text, options_with(catalog)).unwrap();
    r.next().unwrap();
    assert_eq!(r.read_symbol().unwrap().text(), Some("cat"));
    r.next().unwrap();
    assert_eq!(r.read_symbol().unwrap().text(), Some("mouse"));
    r.next().unwrap();
    assert_eq!(r.read_symbol().unwrap().text(), Some("local"));
    r.next().unwrap();
    let token = r.read_symbol().unwrap();
    assert_eq!(token.text(), Some("cat"));
    assert_eq!(token.sid, Some(10));
}

#[test]
fn missing_import_with_max_id_substitutes_unknown_text() {
    let text = br#"
        $ion_symbol_table::{
            imports: [{name: "com.example.absent", version: 2, max_id: 2}],
            symbols: ["after"]
        }
        $10 $12
    "#;
    let mut r = Reader::for_slice(text, ReaderOptions::default()).unwrap();
    r.next().unwrap();
    let unknown = r.read_symbol().unwrap();
    assert_eq!(unknown.text(), None);
    assert_eq!(unknown.sid, Some(10));
    r.next().unwrap();
    assert_eq!(r.read_symbol().unwrap().text(), Some("after"));
}

#[test]
fn missing_import_without_max_id_fails() {
    let text = br#"
        $ion_symbol_table::{
            imports: [{name: "com.example.absent", version: 2}]
        }
        1
    "#;
    let mut r = Reader::for_slice(text, ReaderOptions::default()).unwrap();
    assert_eq!(r.next(), Err(ion_kit::IonError::ImportNotFound));
}

#[test]
fn inexact_import_resolves_in_catalog_order_and_pads_to_declared_width() {
    // Version 2 is absent. The first same-name catalog entry becomes the
    // candidate and version 5 does not displace it (it is not <= the
    // candidate's version), so the import binds to version 1 and the
    // declared max_id pads the tail with unknown text.
    let mut catalog = Catalog::new();
    catalog.add(shared("t", 1, &["one"]));
    catalog.add(shared("t", 5, &["one", "two", "three"]));

    let text = br#"
        $ion_symbol_table::{
            imports: [{name: "t", version: 2, max_id: 2}]
        }
        $10 $11
    "#;
    let mut r = Reader::for_slice(text, options_with(catalog)).unwrap();
    r.next().unwrap();
    let first = r.read_symbol().unwrap();
    assert_eq!((first.text(), first.sid), (Some("one"), Some(10)));
    r.next().unwrap();
    let padded = r.read_symbol().unwrap();
    assert_eq!((padded.text(), padded.sid), (None, Some(11)));
    assert_eq!(r.symbol_table().max_sid(), 11);
}

#[test]
fn inexact_import_with_reversed_catalog_order_binds_the_wider_table() {
    // Same tables, opposite insertion order: version 5 is the first
    // candidate and version 1 cannot displace it, so both declared SIDs
    // carry text.
    let mut catalog = Catalog::new();
    catalog.add(shared("t", 5, &["one", "two", "three"]));
    catalog.add(shared("t", 1, &["one"]));

    let text = br#"
        $ion_symbol_table::{
            imports: [{name: "t", version: 2, max_id: 2}]
        }
        $10 $11
    "#;
    let mut r = Reader::for_slice(text, options_with(catalog)).unwrap();
    r.next().unwrap();
    assert_eq!(r.read_symbol().unwrap().text(), Some("one"));
    r.next().unwrap();
    assert_eq!(r.read_symbol().unwrap().text(), Some("two"));
    assert_eq!(r.symbol_table().max_sid(), 11);
}

#[test]
fn empty_local_table_has_the_system_max_id() {
    let text = b"$ion_symbol_table::{} 1";
    let mut r = Reader::for_slice(text, ReaderOptions::default()).unwrap();
    assert_eq!(r.next().unwrap(), Some(IonType::Int));
    assert_eq!(r.symbol_table().max_sid(), 9);
}

#[test]
fn duplicate_recognized_fields_fail() {
    let text = br#"$ion_symbol_table::{symbols:["a"], symbols:["b"]} 1"#;
    let mut r = Reader::for_slice(text, ReaderOptions::default()).unwrap();
    assert_eq!(r.next(), Err(ion_kit::IonError::InvalidSymbolTable));
}

#[test]
fn unknown_fields_are_ignored() {
    let text = br#"$ion_symbol_table::{comment: "hm", symbols:["a"]} $10"#;
    let mut r = Reader::for_slice(text, ReaderOptions::default()).unwrap();
    r.next().unwrap();
    assert_eq!(r.read_symbol().unwrap().text(), Some("a"));
}

#[test]
fn every_sid_maps_back_or_is_substituted() {
    let text = br#"
        $ion_symbol_table::{
            imports: [{name: "gone", version: 1, max_id: 2}],
            symbols: ["x", "y"]
        }
        1
    "#;
    let mut r = Reader::for_slice(text, ReaderOptions::default()).unwrap();
    r.next().unwrap();
    let table = r.symbol_table();
    assert_eq!(table.max_sid(), 13);
    for sid in 1..=table.max_sid() {
        match table.find_by_sid(sid) {
            Some(text) => assert_eq!(table.find_by_name(text), Some(sid), "sid {sid}"),
            None => assert!(
                (10..=11).contains(&sid),
                "only the substituted range may lack text, got {sid}"
            ),
        }
    }
}

#[test]
fn local_symbols_list_is_positional() {
    // A duplicate entry still claims its own SID.
    let text = br#"$ion_symbol_table::{symbols:["a", "a"]} $10 $11"#;
    let mut r = Reader::for_slice(text, ReaderOptions::default()).unwrap();
    r.next().unwrap();
    let first = r.read_symbol().unwrap();
    assert_eq!((first.text(), first.sid), (Some("a"), Some(10)));
    r.next().unwrap();
    assert_eq!(r.read_symbol().unwrap().text(), Some("a"));
    assert_eq!(r.symbol_table().find_by_name("a"), Some(10));
}

#[test]
fn non_string_symbol_entries_reserve_sids_without_text() {
    let text = br#"$ion_symbol_table::{symbols:["a", 42, "b"]} $11 $12"#;
    let mut r = Reader::for_slice(text, ReaderOptions::default()).unwrap();
    r.next().unwrap();
    assert_eq!(r.read_symbol().unwrap().text(), None);
    r.next().unwrap();
    assert_eq!(r.read_symbol().unwrap().text(), Some("b"));
}

#[test]
fn unknown_sids_round_trip_as_sid_literals_in_text() {
    let text = br#"
        $ion_symbol_table::{imports: [{name: "gone", version: 1, max_id: 1}]}
        $10
    "#;
    let mut r = Reader::for_slice(text, ReaderOptions::default()).unwrap();
    let mut w = Writer::new(WriterOptions::default());
    w.write_all_values(&mut r).unwrap();
    let out = String::from_utf8(w.finish().unwrap()).unwrap();
    assert_eq!(out, "$10");
}
