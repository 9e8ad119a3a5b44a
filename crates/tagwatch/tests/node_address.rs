use tagwatch::error::ClientError;
use tagwatch::source::NodeAddress;

#[test]
fn parses_namespace_and_numeric_id() {
    let address = NodeAddress::parse("ns=2;i=3").expect("plain address");
    assert_eq!(address.namespace, 2);
    assert_eq!(address.id, 3);

    let address = NodeAddress::parse("  ns=0;i=2096  ").expect("padded address");
    assert_eq!(address.namespace, 0);
    assert_eq!(address.id, 2096);

    let address = NodeAddress::parse("ns=65535;i=4294967295").expect("max address");
    assert_eq!(address.namespace, u16::MAX);
    assert_eq!(address.id, u32::MAX);
}

#[test]
fn rejects_malformed_addresses() {
    for text in [
        "",
        "foo",
        "ns=2",
        "ns=2;",
        "ns=2;x=3",
        "i=3;ns=2",
        "ns=a;i=1",
        "ns=2;i=",
        "ns=2;i=abc",
        "ns=70000;i=1",
        "ns=2;i=-1",
        "ns=-2;i=1",
    ] {
        let err = NodeAddress::parse(text).expect_err(text);
        assert!(matches!(err, ClientError::InvalidNodeId(_)), "{text}");
    }
}
