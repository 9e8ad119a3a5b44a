use tagwatch::error::ClientError;
use tagwatch::source::{demo_tags, DataSource, LoopbackSource, SimulatedSource};

#[test]
fn loopback_echoes_the_last_written_value() {
    let mut source = LoopbackSource::new();
    source.connect("opc.tcp://localhost:4840").expect("connect");
    assert!(source.is_connected());

    assert!(source.read_value("ns=2;i=1").expect("initial read").abs() < f64::EPSILON);

    source.write_value("ns=2;i=1", 21.5).expect("write");
    assert!((source.read_value("ns=2;i=1").expect("echo read") - 21.5).abs() < f64::EPSILON);

    // Other nodes are unaffected.
    assert!(source.read_value("ns=2;i=2").expect("other node").abs() < f64::EPSILON);
}

#[test]
fn disconnected_sources_refuse_io() {
    let mut source = LoopbackSource::new();
    assert_eq!(
        source.read_value("ns=2;i=1").expect_err("read while down"),
        ClientError::NotConnected
    );
    assert_eq!(
        source.write_value("ns=2;i=1", 1.0).expect_err("write while down"),
        ClientError::NotConnected
    );

    source.connect("opc.tcp://localhost:4840").expect("connect");
    source.disconnect();
    assert!(!source.is_connected());
    assert!(source.read_value("ns=2;i=1").is_err());
}

#[test]
fn malformed_node_ids_are_read_failures() {
    let mut source = LoopbackSource::new();
    source.connect("opc.tcp://localhost:4840").expect("connect");
    assert!(matches!(
        source.read_value("not-an-address").expect_err("bad id"),
        ClientError::InvalidNodeId(_)
    ));
}

#[test]
fn simulated_values_stay_inside_the_band() {
    let mut source = SimulatedSource::new();
    source.connect("opc.tcp://localhost:4840").expect("connect");

    for _ in 0..50 {
        let value = source.read_value("ns=2;i=1").expect("sim read");
        assert!((0.0..=100.0).contains(&value), "value {value} out of band");
    }
    for _ in 0..50 {
        let value = source.read_value("ns=2;i=2").expect("sim read");
        assert!((0.0..=500.0).contains(&value), "value {value} out of band");
    }
}

#[test]
fn simulated_writes_move_the_walk() {
    let mut source = SimulatedSource::new();
    source.connect("opc.tcp://localhost:4840").expect("connect");

    source.write_value("ns=2;i=1", 50.0).expect("sim write");
    let value = source.read_value("ns=2;i=1").expect("read after write");
    // One walk step of at most 2 % of the band away from the written value.
    assert!((value - 50.0).abs() <= 2.0, "value {value} strayed too far");
}

#[test]
fn demo_tag_set_matches_the_classic_pair() {
    let tags = demo_tags();
    assert_eq!(tags.len(), 2);
    assert_eq!(tags[0].name, "Temperature");
    assert_eq!(tags[0].node_id, "ns=2;i=1");
    assert_eq!(tags[1].name, "Voltage");
    assert!((tags[1].max_hint - 500.0).abs() < f64::EPSILON);
}
