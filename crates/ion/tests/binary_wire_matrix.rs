use ion_kit::{Element, IonType, Reader, ReaderOptions, Value, Writer, WriterOptions};

fn binary_writer() -> Writer {
    Writer::new(WriterOptions {
        output_as_binary: true,
        ..WriterOptions::default()
    })
}

fn encode_one(build: impl FnOnce(&mut Writer)) -> Vec<u8> {
    let mut w = binary_writer();
    build(&mut w);
    w.finish().unwrap()
}

#[test]
fn scalar_wire_images() {
    // IVM followed by the minimal image of each scalar.
    assert_eq!(
        encode_one(|w| w.write_null(IonType::Null).unwrap()),
        [0xe0, 0x01, 0x00, 0xea, 0x0f]
    );
    assert_eq!(
        encode_one(|w| w.write_bool(true).unwrap()),
        [0xe0, 0x01, 0x00, 0xea, 0x11]
    );
    assert_eq!(
        encode_one(|w| w.write_bool(false).unwrap()),
        [0xe0, 0x01, 0x00, 0xea, 0x10]
    );
    assert_eq!(
        encode_one(|w| w.write_i64(0).unwrap()),
        [0xe0, 0x01, 0x00, 0xea, 0x20]
    );
    assert_eq!(
        encode_one(|w| w.write_i64(-1).unwrap()),
        [0xe0, 0x01, 0x00, 0xea, 0x31, 0x01]
    );
    assert_eq!(
        encode_one(|w| w.write_f64(0.0).unwrap()),
        [0xe0, 0x01, 0x00, 0xea, 0x40]
    );
    assert_eq!(
        encode_one(|w| w.write_string("abc").unwrap()),
        [0xe0, 0x01, 0x00, 0xea, 0x83, b'a', b'b', b'c']
    );
    assert_eq!(
        encode_one(|w| w.write_blob(&[1, 2]).unwrap()),
        [0xe0, 0x01, 0x00, 0xea, 0xa2, 1, 2]
    );
}

#[test]
fn typed_nulls_have_their_own_descriptors() {
    let pairs: &[(IonType, u8)] = &[
        (IonType::Bool, 0x1f),
        (IonType::Int, 0x2f),
        (IonType::Float, 0x4f),
        (IonType::Decimal, 0x5f),
        (IonType::Timestamp, 0x6f),
        (IonType::Symbol, 0x7f),
        (IonType::String, 0x8f),
        (IonType::Clob, 0x9f),
        (IonType::Blob, 0xaf),
        (IonType::List, 0xbf),
        (IonType::Sexp, 0xcf),
        (IonType::Struct, 0xdf),
    ];
    for (ty, descriptor) in pairs {
        let bytes = encode_one(|w| w.write_null(*ty).unwrap());
        assert_eq!(bytes[4], *descriptor, "null.{ty}");
        let mut r = Reader::for_bytes(bytes, ReaderOptions::default()).unwrap();
        assert_eq!(r.next().unwrap(), Some(*ty));
        assert!(r.is_null());
    }
}

#[test]
fn variable_length_values_use_varuint_lengths() {
    let long = "x".repeat(20);
    let bytes = encode_one(|w| w.write_string(&long).unwrap());
    // Nibble 14 announces a VarUInt length; 20 is one octet, end bit set.
    assert_eq!(bytes[4], 0x8e);
    assert_eq!(bytes[5], 0x80 | 20);
}

#[test]
fn sorted_struct_nibble_is_accepted_on_read() {
    // {$4: 1} with the sorted-struct marker: nibble 1, VarUInt length.
    let bytes = [0xe0, 0x01, 0x00, 0xea, 0xd1, 0x83, 0x84, 0x21, 0x01];
    let mut r = Reader::for_bytes(bytes.to_vec(), ReaderOptions::default()).unwrap();
    assert_eq!(r.next().unwrap(), Some(IonType::Struct));
    r.step_in().unwrap();
    assert_eq!(r.next().unwrap(), Some(IonType::Int));
    assert_eq!(r.field_name().unwrap().unwrap().text(), Some("name"));
    assert_eq!(r.read_i64().unwrap(), 1);
}

#[test]
fn timestamps_round_trip_at_every_precision() {
    for text in [
        "2020T",
        "2020-06T",
        "2020-06-15",
        "2020-06-15T10:30Z",
        "2020-06-15T10:30:45-08:00",
        "2020-06-15T10:30:45.007Z",
        "2020-06-15T10:30-00:00",
    ] {
        let mut r = Reader::for_slice(text.as_bytes(), ReaderOptions::default()).unwrap();
        let mut w = binary_writer();
        w.write_all_values(&mut r).unwrap();
        let bytes = w.finish().unwrap();
        let mut back = Reader::for_bytes(bytes, ReaderOptions::default()).unwrap();
        back.next().unwrap();
        let ts = back.read_timestamp().unwrap();
        assert_eq!(ts.to_text(), text, "input {text}");
    }
}

#[test]
fn deeply_nested_containers_round_trip() {
    let mut w = binary_writer();
    for _ in 0..9 {
        w.step_in(IonType::List).unwrap();
    }
    w.write_i64(7).unwrap();
    for _ in 0..9 {
        w.step_out().unwrap();
    }
    let bytes = w.finish().unwrap();
    let mut r = Reader::for_bytes(bytes, ReaderOptions::default()).unwrap();
    let mut depth = 0;
    loop {
        match r.next().unwrap() {
            Some(IonType::List) => {
                r.step_in().unwrap();
                depth += 1;
            }
            Some(IonType::Int) => {
                assert_eq!(depth, 9);
                assert_eq!(r.read_i64().unwrap(), 7);
                break;
            }
            other => panic!("unexpected {other:?}"),
        }
    }
}

#[test]
fn annotations_survive_binary_round_trips() {
    let mut w = binary_writer();
    w.add_annotation("first").unwrap();
    w.add_annotation("second").unwrap();
    w.write_i64(5).unwrap();
    let bytes = w.finish().unwrap();
    let mut r = Reader::for_bytes(bytes, ReaderOptions::default()).unwrap();
    r.next().unwrap();
    let annotations = r.annotations().unwrap();
    assert_eq!(annotations.len(), 2);
    assert_eq!(annotations[0].text(), Some("first"));
    assert_eq!(annotations[1].text(), Some("second"));
    assert_eq!(r.read_i64().unwrap(), 5);
}

#[test]
fn empty_flush_writes_nothing_and_flush_is_segmenting() {
    let mut w = binary_writer();
    w.flush().unwrap();
    w.flush().unwrap();
    let bytes = w.finish().unwrap();
    assert!(bytes.is_empty());
}

#[test]
fn struct_field_order_is_preserved() {
    let source = br#"{z:1, a:2, m:3}"#;
    let mut r = Reader::for_slice(source, ReaderOptions::default()).unwrap();
    let mut w = binary_writer();
    w.write_all_values(&mut r).unwrap();
    let bytes = w.finish().unwrap();
    let mut back = Reader::for_bytes(bytes, ReaderOptions::default()).unwrap();
    back.next().unwrap();
    let element = Element::read_from(&mut back).unwrap();
    match element.value {
        Value::Struct(fields) => {
            let names: Vec<_> = fields.iter().map(|(n, _)| n.text().unwrap()).collect();
            assert_eq!(names, ["z", "a", "m"]);
        }
        other => panic!("expected struct, got {other:?}"),
    }
}

#[test]
fn truncated_streams_fail_cleanly() {
    // A string that promises 5 bytes but delivers 2.
    let bytes = [0xe0, 0x01, 0x00, 0xea, 0x85, b'a', b'b'];
    let mut r = Reader::for_bytes(bytes.to_vec(), ReaderOptions::default()).unwrap();
    assert_eq!(r.next().unwrap(), Some(IonType::String));
    assert_eq!(r.read_string(), Err(ion_kit::IonError::UnexpectedEof));
}
